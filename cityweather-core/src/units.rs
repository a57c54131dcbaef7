//! Temperature conversion helpers.

/// Convert Fahrenheit to Celsius, rounded to two decimals.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    round2((fahrenheit - 32.0) * 5.0 / 9.0)
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
