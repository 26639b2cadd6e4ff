use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CreateDatabaseRequest, CreateDatabaseUserRequest, CreateWebDomainRequest, Database,
    DatabaseUser, WebDomain,
};

/// The remote provisioning boundary: everything the orchestration layer is
/// allowed to ask of the panel.
///
/// All operations are synchronous request/response against an authenticated
/// session. Creation is asynchronous on the *server* side: a successful
/// create call only means a job was enqueued — the resource is usable once
/// the job queue has drained (see [`pending_job_count`](Self::pending_job_count)).
///
/// Creation calls are not idempotent: re-creating an existing resource
/// fails with [`ResourceExists`](crate::ClientError::ResourceExists) rather
/// than succeeding.
#[async_trait]
pub trait ProvisioningClient: Send + Sync {
    /// Create a web domain; returns the new domain id.
    async fn create_web_domain(&self, client_id: i64, req: &CreateWebDomainRequest)
        -> Result<i64>;

    /// Create a database user; returns the new user id.
    async fn create_database_user(
        &self,
        client_id: i64,
        req: &CreateDatabaseUserRequest,
    ) -> Result<i64>;

    /// Create a database attached to a domain and a user; returns the new
    /// database id.
    async fn create_database(&self, client_id: i64, req: &CreateDatabaseRequest) -> Result<i64>;

    /// Fetch a single web domain by id.
    async fn get_web_domain(&self, domain_id: i64) -> Result<WebDomain>;

    /// Fetch a single database user by id.
    async fn get_database_user(&self, database_user_id: i64) -> Result<DatabaseUser>;

    /// Fetch a single database by id.
    async fn get_database(&self, database_id: i64) -> Result<Database>;

    /// List the web domains owned by a panel system user/group.
    async fn list_web_domains(&self, sys_userid: i64, sys_groupid: i64)
        -> Result<Vec<WebDomain>>;

    /// List all database users.
    async fn list_database_users(&self) -> Result<Vec<DatabaseUser>>;

    /// List the databases belonging to a client.
    async fn list_databases(&self, client_id: i64) -> Result<Vec<Database>>;

    /// Delete a web domain; returns the number of affected rows.
    async fn delete_web_domain(&self, domain_id: i64) -> Result<u64>;

    /// Number of pending jobs in the panel's job queue.
    ///
    /// `server_id == 0` queries across all servers.
    async fn pending_job_count(&self, server_id: i64) -> Result<u64>;
}
