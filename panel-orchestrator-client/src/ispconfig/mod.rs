//! ISPConfig JSON remote API backend
//!
//! Talks to `remote/json.php` on an ISPConfig panel. Every call is an HTTP
//! POST with the remote function name in the query string and a JSON body;
//! responses use a `{ code, message, response }` envelope where
//! `code == "ok"` signals success.
//!
//! [`IspconfigClient::login`] exchanges the configured credentials for a
//! session id and returns an [`IspconfigSession`], which carries the id in
//! every subsequent call and invalidates it again via
//! [`IspconfigSession::logout`].

mod api;
mod error;
mod http;
mod types;

use reqwest::Client;

use crate::error::{ClientError, Result};
use crate::http_client::HttpUtils;
use crate::types::PanelConfig;

use types::RemoteResponse;

/// Default connect timeout (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Retries for idempotent reads (get/list). Creates are never retried.
pub(crate) const READ_MAX_RETRIES: u32 = 2;

/// Build the HTTP client used for all panel requests.
///
/// `insecure_tls` disables certificate verification for panels that only
/// present a self-signed certificate.
fn create_http_client(insecure_tls: bool) -> Result<Client> {
    let mut builder = Client::builder()
        .connect_timeout(std::time::Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(std::time::Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

    if insecure_tls {
        log::warn!("TLS certificate verification disabled for panel endpoint");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(|e| ClientError::Network {
        method: "client_init".to_string(),
        detail: e.to_string(),
    })
}

/// Unauthenticated handle to an ISPConfig panel.
pub struct IspconfigClient {
    client: Client,
    config: PanelConfig,
}

impl IspconfigClient {
    pub fn new(config: PanelConfig) -> Result<Self> {
        let client = create_http_client(config.insecure_tls)?;
        Ok(Self { client, config })
    }

    /// Authenticate and obtain a session.
    ///
    /// Consumes the client: the session becomes the sole owner of the
    /// connection for the rest of the run.
    pub async fn login(self) -> Result<IspconfigSession> {
        #[derive(serde::Serialize)]
        struct LoginBody<'a> {
            username: &'a str,
            password: &'a str,
        }

        let url = format!("{}?login", self.config.endpoint);
        let request = self.client.post(&url).json(&LoginBody {
            username: &self.config.username,
            password: &self.config.password,
        });

        let (_, body) = HttpUtils::execute_request_with_retry(request, "login", READ_MAX_RETRIES)
            .await?;
        let envelope: RemoteResponse = HttpUtils::parse_json(&body, "login")?;
        let session_id: String = envelope.into_result("login", error::FaultContext::default())?;

        if session_id.is_empty() {
            return Err(ClientError::InvalidCredentials {
                raw_message: Some("empty session id returned".to_string()),
            });
        }

        log::debug!("[login] Session established");

        Ok(IspconfigSession {
            client: self.client,
            endpoint: self.config.endpoint,
            session_id,
        })
    }
}

/// An authenticated ISPConfig session.
///
/// Holds the HTTP client and the remote session id; implements
/// [`ProvisioningClient`](crate::ProvisioningClient). The session should be
/// released with [`logout`](Self::logout) on every exit path once
/// authentication has succeeded.
pub struct IspconfigSession {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
    pub(crate) session_id: String,
}

impl IspconfigSession {
    /// Invalidate the session on the server.
    ///
    /// Returns whether the server confirmed the logout. Safe to call from a
    /// cleanup path: failures are reported, never panicked on.
    pub async fn logout(&self) -> Result<bool> {
        #[derive(serde::Serialize)]
        struct Empty {}

        let confirmed: bool = self.call("logout", &Empty {}).await?;
        log::debug!("[logout] Session released (confirmed: {confirmed})");
        Ok(confirmed)
    }
}
