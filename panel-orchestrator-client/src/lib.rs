//! # panel-orchestrator-client
//!
//! Remote control-panel API boundary for the Panel Orchestrator: a typed,
//! session-scoped client for bulk-provisioning hosting resources (web
//! domains, database users, databases) on an ISPConfig server via its JSON
//! remote API.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use panel_orchestrator_client::{
//!     CreateWebDomainRequest, IspconfigClient, PanelConfig, ProvisioningClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PanelConfig {
//!         endpoint: "https://panel.example.com:8080/remote/json.php".to_string(),
//!         username: "remote_user".to_string(),
//!         password: "secret".to_string(),
//!         insecure_tls: false,
//!     };
//!
//!     // Acquire a session; release it with logout() when done.
//!     let session = IspconfigClient::new(config)?.login().await?;
//!
//!     let request = CreateWebDomainRequest {
//!         domain: "example.com".to_string(),
//!         ..Default::default()
//!     };
//!     let domain_id = session.create_web_domain(1, &request).await?;
//!     println!("created domain {domain_id}");
//!
//!     // Creation is asynchronous server-side: poll the job queue before
//!     // treating the resource as usable.
//!     let pending = session.pending_job_count(0).await?;
//!     println!("{pending} jobs pending");
//!
//!     session.logout().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ClientError>`](ClientError). The enum
//! distinguishes the failure modes the orchestration layer branches on:
//!
//! - [`ClientError::ResourceExists`] — creation conflict, recoverable by
//!   name lookup
//! - [`ClientError::InvalidCredentials`] — authentication failed (fatal)
//! - [`ClientError::Network`] / [`ClientError::Timeout`] — transient,
//!   retried for idempotent reads
//!
//! The raw remote fault text is preserved on every variant.

mod error;
mod http_client;
mod ispconfig;
mod traits;
mod types;

// Re-export error types
pub use error::{ClientError, Result};

// Re-export the client trait and the concrete backend
pub use ispconfig::{IspconfigClient, IspconfigSession};
pub use traits::ProvisioningClient;

// Re-export types
pub use types::{
    CreateDatabaseRequest, CreateDatabaseUserRequest, CreateWebDomainRequest, Database,
    DatabaseUser, PanelConfig, WebDomain,
};
