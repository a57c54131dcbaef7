use cityweather_core::{CityOption, Place, ProviderId, WeatherSummary};

pub fn render_options(options: &[CityOption]) -> String {
    if options.is_empty() {
        return "No matching cities.".to_string();
    }

    options
        .iter()
        .enumerate()
        .map(|(i, opt)| format!("{:>2}. {}  [{}]", i + 1, opt.label, opt.value))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_summary(place: &Place, provider: ProviderId, summary: &WeatherSummary) -> String {
    let mut lines = vec![
        format!("Weather for {} (provider: {provider})", place.name),
        format!("  Temperature:   {:.2} °C", summary.temperature),
        format!("  Minimum:       {:.2} °C", summary.min_temperature),
        format!("  Maximum:       {:.2} °C", summary.max_temperature),
    ];

    if let Some(prcp) = summary.precipitation {
        lines.push(format!("  Precipitation: {prcp:.2} mm"));
    }
    if let Some(wspd) = summary.wind_speed {
        lines.push(format!("  Wind speed:    {wspd:.2} km/h"));
    }

    lines.join("\n")
}
