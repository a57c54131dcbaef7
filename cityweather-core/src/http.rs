use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::{config::ProviderConfig, error::FetchError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with timeout, using defaults: {e}");
            Client::new()
        })
}

/// GET request carrying the RapidAPI key/host header pair.
pub(crate) fn rapidapi_get(http: &Client, config: &ProviderConfig, url: &str) -> RequestBuilder {
    http.get(url)
        .header("X-RapidAPI-Key", config.api_key.as_str())
        .header("X-RapidAPI-Host", config.host.as_str())
}

/// Check the status, then decode the body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    res: Response,
) -> Result<T, FetchError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(FetchError::Status { service, status, body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(|e| FetchError::Parse { service, message: e.to_string() })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn long_bodies_are_cut_on_a_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
