use serde::{Deserialize, Serialize};

/// Unified error type for all remote panel operations.
///
/// Each variant carries the remote API `method` that produced it (e.g.
/// `"sites_web_domain_add"`), plus variant-specific context. The original
/// error text from the panel is always preserved so per-item failures stay
/// diagnosable. All variants are serializable for structured error reporting.
///
/// # Transient Errors
///
/// The following variants represent failures that may succeed on retry:
/// - [`Network`](Self::Network) — connectivity issues
/// - [`Timeout`](Self::Timeout) — request timed out
/// - [`RateLimited`](Self::RateLimited) — throttled by a proxy in front of the panel
///
/// The built-in HTTP helper retries these with exponential backoff for
/// idempotent reads; creation calls are never retried automatically (a
/// repeated create against a panel that already processed the first attempt
/// fails with a duplicate-resource error instead of succeeding).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ClientError {
    /// A network-level error occurred (DNS failure, connection refused, etc.).
    Network {
        /// Remote method that produced the error.
        method: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Remote method that produced the error.
        method: String,
        /// Error details.
        detail: String,
    },

    /// Login was rejected: bad username/password or the remote user is disabled.
    InvalidCredentials {
        /// Original error message from the panel, if available.
        raw_message: Option<String>,
    },

    /// The session id is no longer valid on the server.
    SessionExpired {
        /// Remote method that produced the error.
        method: String,
        /// Original error message from the panel, if available.
        raw_message: Option<String>,
    },

    /// A resource with the same name already exists on the panel.
    ///
    /// Creation calls are not idempotent; this is the conflict the caller is
    /// expected to recover from by looking the resource up by name.
    ResourceExists {
        /// Remote method that produced the error.
        method: String,
        /// Name of the conflicting resource.
        resource: String,
        /// Original error message from the panel, if available.
        raw_message: Option<String>,
    },

    /// The requested resource does not exist on the panel.
    ResourceNotFound {
        /// Remote method that produced the error.
        method: String,
        /// Identifier or name that was not found.
        resource: String,
        /// Original error message from the panel, if available.
        raw_message: Option<String>,
    },

    /// A request parameter is invalid or missing.
    InvalidParameter {
        /// Remote method that produced the error.
        method: String,
        /// Name of the offending parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The authenticated remote user lacks permission for this function.
    PermissionDenied {
        /// Remote method that produced the error.
        method: String,
        /// Original error message from the panel, if available.
        raw_message: Option<String>,
    },

    /// Throttled (HTTP 429 or equivalent). Transient.
    RateLimited {
        /// Remote method that produced the error.
        method: String,
        /// Suggested wait in seconds before retrying, if provided.
        retry_after: Option<u64>,
        /// Original error message, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the panel's response.
    Parse {
        /// Remote method that produced the error.
        method: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    Serialization {
        /// Remote method that produced the error.
        method: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized fault from the panel.
    ///
    /// Catch-all for remote faults not yet mapped to a specific variant; the
    /// raw message is kept verbatim.
    RemoteFault {
        /// Remote method that produced the error.
        method: String,
        /// Raw fault code from the panel, if available.
        raw_code: Option<String>,
        /// Raw fault message from the panel.
        raw_message: String,
    },
}

impl ClientError {
    /// Whether the failure may succeed on retry (connectivity blip, timeout,
    /// throttling). Business faults (bad credentials, duplicate resource,
    /// missing resource) are never transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Whether this is expected behavior (user input, resource state), used
    /// for log-level selection.
    ///
    /// `true` should log at `warn`, `false` at `error`.
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::SessionExpired { .. }
                | Self::ResourceExists { .. }
                | Self::ResourceNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::PermissionDenied { .. }
        )
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network { method, detail } => {
                write!(f, "[{method}] Network error: {detail}")
            }
            Self::Timeout { method, detail } => {
                write!(f, "[{method}] Request timeout: {detail}")
            }
            Self::InvalidCredentials { raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[login] Invalid credentials: {msg}")
                } else {
                    write!(f, "[login] Invalid credentials")
                }
            }
            Self::SessionExpired {
                method,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{method}] Session expired: {msg}")
                } else {
                    write!(f, "[{method}] Session expired")
                }
            }
            Self::ResourceExists {
                method, resource, ..
            } => {
                write!(f, "[{method}] '{resource}' already exists")
            }
            Self::ResourceNotFound {
                method, resource, ..
            } => {
                write!(f, "[{method}] '{resource}' not found")
            }
            Self::InvalidParameter {
                method,
                param,
                detail,
            } => {
                write!(f, "[{method}] Invalid parameter '{param}': {detail}")
            }
            Self::PermissionDenied {
                method,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{method}] Permission denied: {msg}")
                } else {
                    write!(f, "[{method}] Permission denied")
                }
            }
            Self::RateLimited {
                method,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{method}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{method}] Rate limited")
                }
            }
            Self::Parse { method, detail } => {
                write!(f, "[{method}] Parse error: {detail}")
            }
            Self::Serialization { method, detail } => {
                write!(f, "[{method}] Serialization error: {detail}")
            }
            Self::RemoteFault {
                method,
                raw_message,
                ..
            } => {
                write!(f, "[{method}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ClientError {}

/// Convenience type alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
