//! Generic HTTP request plumbing
//!
//! Reusable request handling shared by every remote method: sending,
//! logging, status classification, and response-body reading. The panel
//! backend keeps full control over URL construction and body shape and
//! hands a configured `RequestBuilder` in.
//!
//! Retries are opt-in per call site: idempotent reads (get/list/count) go
//! through [`HttpUtils::execute_request_with_retry`], while creation calls
//! use the non-retrying path so a duplicate-resource conflict is surfaced
//! instead of compounded.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ClientError;

/// HTTP helper function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the response text.
    ///
    /// Unified handling: send, log, classify transport-level failures.
    ///
    /// # Arguments
    /// * `request_builder` - configured request (URL, headers, body)
    /// * `method_name` - remote method name (for logs and error context)
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` on success
    /// * `Err(ClientError::Network | Timeout | RateLimited)` on transport failure
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
    ) -> Result<(u16, String), ClientError> {
        log::debug!("[{method_name}] POST");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    method: method_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ClientError::Network {
                    method: method_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{method_name}] Response Status: {status_code}");

        // Extract Retry-After before consuming the body
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{method_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ClientError::RateLimited {
                method: method_name.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        // 502/503/504 come from the web server in front of the panel, not
        // from the remoting layer itself; treat as retryable network faults.
        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{method_name}] Server error (HTTP {status_code})");
            return Err(ClientError::Network {
                method: method_name.to_string(),
                detail: format!("HTTP {status_code}: {body}"),
            });
        }

        let response_text = response.text().await.map_err(|e| ClientError::Network {
            method: method_name.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

        log::trace!("[{method_name}] Response Body: {response_text}");

        Ok((status_code, response_text))
    }

    /// Parse a JSON response body.
    pub fn parse_json<T>(response_text: &str, method_name: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{method_name}] JSON parse failed: {e}");
            log::error!("[{method_name}] Raw response: {response_text}");
            ClientError::Parse {
                method: method_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Performs an HTTP request with transient-failure retries.
    ///
    /// Only network errors, timeouts and throttling are retried; remote
    /// faults (duplicate resource, bad credentials, missing resource) are
    /// returned immediately.
    ///
    /// # Retry strategy
    /// - Exponential backoff: 100ms, 200ms, 400ms, ... capped at 10s
    /// - A `Retry-After` hint from the server overrides the backoff (capped at 30s)
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        method_name: &str,
        max_retries: u32,
    ) -> Result<(u16, String), ClientError> {
        if max_retries == 0 {
            return Self::execute_request(request_builder, method_name).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            // RequestBuilder is single-use; clone per attempt
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[{method_name}] Cannot clone request, disabling retry");
                return Self::execute_request(request_builder, method_name).await;
            };

            match Self::execute_request(req, method_name).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_transient() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        method_name,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::Network {
            method: method_name.to_string(),
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

/// Calculate the retry delay.
///
/// Uses the server's `Retry-After` hint (capped at 30s) when the error is
/// `RateLimited`, exponential backoff otherwise.
fn retry_delay(error: &ClientError, attempt: u32) -> Duration {
    if let ClientError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// Exponential backoff delay: 100ms, 200ms, 400ms, ... capped at 10s.
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // keep 2^attempt in range
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    let delay_ms = delay_ms.min(10_000);
    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::time::Duration;

    // ---- backoff_delay ----

    #[test]
    fn backoff_attempt_0() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
    }

    #[test]
    fn backoff_attempt_3() {
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn backoff_capped_at_10s() {
        // attempt 7: 100 * 2^7 = 12800ms, capped to 10000ms
        assert_eq!(backoff_delay(7), Duration::from_millis(10_000));
    }

    // ---- retry_delay ----

    #[test]
    fn retry_delay_uses_retry_after_hint() {
        let e = ClientError::RateLimited {
            method: "t".into(),
            retry_after: Some(5),
            raw_message: None,
        };
        assert_eq!(retry_delay(&e, 0), Duration::from_secs(5));
    }

    #[test]
    fn retry_delay_caps_retry_after_at_30s() {
        let e = ClientError::RateLimited {
            method: "t".into(),
            retry_after: Some(600),
            raw_message: None,
        };
        assert_eq!(retry_delay(&e, 0), Duration::from_secs(30));
    }

    #[test]
    fn retry_delay_falls_back_to_backoff() {
        let e = ClientError::Network {
            method: "t".into(),
            detail: "x".into(),
        };
        assert_eq!(retry_delay(&e, 2), Duration::from_millis(400));
    }

    // ---- parse_json ----

    #[test]
    fn parse_json_valid() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Foo {
            x: i32,
        }
        let result: Result<Foo, ClientError> = HttpUtils::parse_json(r#"{"x":42}"#, "test");
        assert!(
            matches!(&result, Ok(Foo { x: 42 })),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn parse_json_invalid() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Foo {
            x: i32,
        }
        let result: Result<Foo, ClientError> = HttpUtils::parse_json("not json", "test");
        assert!(
            matches!(&result, Err(ClientError::Parse { .. })),
            "unexpected parse result: {result:?}"
        );
    }
}
