//! `ProvisioningClient` implementation for an ISPConfig session
//!
//! Remote function names follow ISPConfig's `<module>_<entity>_<verb>`
//! scheme. Single-record `get` functions double as list functions when
//! passed `primary_id = -1`.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::traits::ProvisioningClient;
use crate::types::{
    CreateDatabaseRequest, CreateDatabaseUserRequest, CreateWebDomainRequest, Database,
    DatabaseUser, WebDomain,
};

use super::error::FaultContext;
use super::types::{IspcDatabase, IspcDatabaseUser, IspcWebDomain, RemoteCount, RemoteId};
use super::IspconfigSession;

/// Sentinel `primary_id` that turns a get call into a list call.
const ALL_RECORDS: i64 = -1;

#[derive(Serialize)]
struct CreateBody<'a, P: Serialize> {
    client_id: i64,
    params: &'a P,
}

#[derive(Serialize)]
struct CreateDomainBody<'a> {
    client_id: i64,
    params: &'a CreateWebDomainRequest,
    // sites_web_domain_add takes an extra readonly flag
    readonly: bool,
}

#[derive(Serialize)]
struct PrimaryIdBody {
    primary_id: i64,
}

#[derive(Serialize)]
struct SitesByUserBody {
    sys_userid: i64,
    sys_groupid: i64,
}

#[derive(Serialize)]
struct DatabasesByClientBody {
    client_id: i64,
}

#[derive(Serialize)]
struct JobQueueBody {
    server_id: i64,
}

#[async_trait]
impl ProvisioningClient for IspconfigSession {
    async fn create_web_domain(
        &self,
        client_id: i64,
        req: &CreateWebDomainRequest,
    ) -> Result<i64> {
        let body = CreateDomainBody {
            client_id,
            params: req,
            readonly: false,
        };
        let id: RemoteId = self
            .call_with_context(
                "sites_web_domain_add",
                &body,
                FaultContext::resource(&req.domain),
            )
            .await?;
        Ok(id.0)
    }

    async fn create_database_user(
        &self,
        client_id: i64,
        req: &CreateDatabaseUserRequest,
    ) -> Result<i64> {
        let body = CreateBody {
            client_id,
            params: req,
        };
        let id: RemoteId = self
            .call_with_context(
                "sites_database_user_add",
                &body,
                FaultContext::resource(&req.database_user),
            )
            .await?;
        Ok(id.0)
    }

    async fn create_database(&self, client_id: i64, req: &CreateDatabaseRequest) -> Result<i64> {
        let body = CreateBody {
            client_id,
            params: req,
        };
        let id: RemoteId = self
            .call_with_context(
                "sites_database_add",
                &body,
                FaultContext::resource(&req.database_name),
            )
            .await?;
        Ok(id.0)
    }

    async fn get_web_domain(&self, domain_id: i64) -> Result<WebDomain> {
        let row: IspcWebDomain = self
            .call_read(
                "sites_web_domain_get",
                &PrimaryIdBody {
                    primary_id: domain_id,
                },
            )
            .await?;
        Ok(row.into())
    }

    async fn get_database_user(&self, database_user_id: i64) -> Result<DatabaseUser> {
        let row: IspcDatabaseUser = self
            .call_read(
                "sites_database_user_get",
                &PrimaryIdBody {
                    primary_id: database_user_id,
                },
            )
            .await?;
        Ok(row.into())
    }

    async fn get_database(&self, database_id: i64) -> Result<Database> {
        let row: IspcDatabase = self
            .call_read(
                "sites_database_get",
                &PrimaryIdBody {
                    primary_id: database_id,
                },
            )
            .await?;
        Ok(row.into())
    }

    async fn list_web_domains(
        &self,
        sys_userid: i64,
        sys_groupid: i64,
    ) -> Result<Vec<WebDomain>> {
        let rows: Vec<IspcWebDomain> = self
            .call_read(
                "client_get_sites_by_user",
                &SitesByUserBody {
                    sys_userid,
                    sys_groupid,
                },
            )
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_database_users(&self) -> Result<Vec<DatabaseUser>> {
        let rows: Vec<IspcDatabaseUser> = self
            .call_read(
                "sites_database_user_get",
                &PrimaryIdBody {
                    primary_id: ALL_RECORDS,
                },
            )
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_databases(&self, client_id: i64) -> Result<Vec<Database>> {
        let rows: Vec<IspcDatabase> = self
            .call_read("sites_database_get_all_by_user", &DatabasesByClientBody { client_id })
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_web_domain(&self, domain_id: i64) -> Result<u64> {
        let affected: RemoteCount = self
            .call(
                "sites_web_domain_delete",
                &PrimaryIdBody {
                    primary_id: domain_id,
                },
            )
            .await?;
        Ok(affected.0)
    }

    async fn pending_job_count(&self, server_id: i64) -> Result<u64> {
        // No transport retry here: the job-queue monitor owns its own
        // transient-failure backoff and elapsed-time accounting.
        let count: RemoteCount = self
            .call("monitor_jobqueue_count", &JobQueueBody { server_id })
            .await?;
        Ok(count.0)
    }
}
