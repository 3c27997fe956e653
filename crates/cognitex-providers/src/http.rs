//! HTTP plumbing shared by the hosted providers.

use std::time::Duration;

use anyhow::Context;

use crate::error::ProviderError;

/// Build a client with a whole-request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Map a transport failure to a provider error.
pub(crate) fn send_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

/// Turn non-success statuses into provider errors; pass successes through.
///
/// `extract_message` pulls a readable message out of the provider's error
/// body, falling back to the raw body.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
    extract_message: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            .saturating_mul(1000);
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or(body);
    match status {
        401 | 403 => Err(ProviderError::AuthenticationFailed(message)),
        404 => Err(ProviderError::ModelNotFound(model.to_string())),
        _ => Err(ProviderError::ApiError { status, message }),
    }
}

/// Error-body parser for APIs shaped like `{"error": {"message": "..."}}`.
pub(crate) fn nested_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
