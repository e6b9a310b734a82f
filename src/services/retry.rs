//! Retry loop shared by the HTTP service clients

use crate::error::ServiceError;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum number of retry attempts for transient failures.
pub(super) const MAX_RETRIES: u32 = 3;

/// Initial delay between retries (doubles with each attempt).
pub(super) const INITIAL_RETRY_DELAY_MS: u64 = 1000;

/// Send a request, retrying 5xx responses and transient network errors with
/// exponential backoff. Returns the first successful response.
pub(super) async fn send_with_retry<F>(
    service: &str,
    build_request: F,
) -> Result<reqwest::Response, ServiceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<ServiceError> = None;
    let mut retry_delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS);

    for attempt in 0..=MAX_RETRIES {
        if attempt > 0 {
            warn!(
                service,
                attempt,
                max_retries = MAX_RETRIES,
                delay_ms = retry_delay.as_millis(),
                "Retrying request after transient failure"
            );
            tokio::time::sleep(retry_delay).await;
            retry_delay *= 2;
        }

        match build_request().send().await {
            Ok(response) => {
                if response.status().is_success() {
                    if attempt > 0 {
                        info!(service, attempt, "Request succeeded after retry");
                    }
                    return Ok(response);
                }

                let status = response.status().as_u16();
                let message = response.text().await.unwrap_or_default();
                let error = ServiceError::ServerError { status, message };

                if is_retryable_status(status) && attempt < MAX_RETRIES {
                    warn!(service, status, attempt, "Server error, will retry");
                    last_error = Some(error);
                    continue;
                }

                return Err(error);
            }
            Err(e) => {
                if is_retryable_error(&e) && attempt < MAX_RETRIES {
                    warn!(service, error = %e, attempt, "Network error, will retry");
                    last_error = Some(ServiceError::Network(e));
                    continue;
                }

                return Err(ServiceError::Network(e));
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| ServiceError::InvalidResponse("Unexpected retry loop exit".into())))
}

fn is_retryable_status(status: u16) -> bool {
    (500..600).contains(&status)
}

/// Check if a reqwest error is retryable (transient).
fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_server_errors_are_retryable() {
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(429));
        assert!(!is_retryable_status(200));
    }
}
