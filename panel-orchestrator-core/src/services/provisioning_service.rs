//! Provisioning orchestrator
//!
//! Sequences the full pipeline: snapshot prefetch, then domains → users →
//! databases, with a job-queue convergence wait after every stage. Strictly
//! sequential by design — the panel's job queue is a shared resource, and
//! concurrent submissions would make stability-based convergence detection
//! meaningless.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use panel_orchestrator_client::ProvisioningClient;

use crate::error::CoreResult;
use crate::jobqueue::{await_drain, DrainConfig, DrainOutcome};
use crate::stages::{run_stage, DatabaseStage, DatabaseUserStage, WebDomainStage};
use crate::types::{MigrationItem, ResourceSnapshot, StageReport};

/// Run-wide parameters.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Panel client the resources are created for.
    pub client_id: i64,
    /// Server the resources are created on.
    pub server_id: i64,
    /// System user/group whose sites the domain snapshot is fetched for.
    pub sys_userid: i64,
    pub sys_groupid: i64,
    /// Job-queue scope for the convergence waits (0 = all servers).
    pub queue_scope: i64,
    /// Fixed delay after each remote creation attempt.
    pub pacing: Duration,
    /// Convergence wait tuning, shared by all three waits.
    pub drain: DrainConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            client_id: 1,
            server_id: 1,
            sys_userid: 1,
            sys_groupid: 1,
            queue_scope: 0,
            pacing: Duration::from_secs(1),
            drain: DrainConfig::default(),
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub domains: StageReport,
    pub users: StageReport,
    pub databases: StageReport,
    /// Outcomes of the three convergence waits, in stage order.
    pub drains: Vec<DrainOutcome>,
    /// The working list, enriched with every identifier the run obtained.
    pub items: Vec<MigrationItem>,
}

/// The provisioning pipeline service.
///
/// Owns the authenticated session (via the client handle) and the working
/// list for the duration of [`run`](Self::run).
pub struct ProvisioningService {
    client: Arc<dyn ProvisioningClient>,
    options: RunOptions,
}

impl ProvisioningService {
    #[must_use]
    pub fn new(client: Arc<dyn ProvisioningClient>, options: RunOptions) -> Self {
        Self { client, options }
    }

    /// Run the full pipeline over `items`.
    ///
    /// Fatal errors (snapshot prefetch failure) abort before any creation
    /// call. Per-item failures never abort; a convergence timeout is
    /// recorded in the report and the pipeline proceeds — queue draining is
    /// pacing, not a correctness precondition, since the panel queues new
    /// requests onto whatever backlog exists.
    pub async fn run(&self, mut items: Vec<MigrationItem>) -> CoreResult<RunReport> {
        let opts = &self.options;

        // One prefetch per resource kind; never refreshed mid-run, so
        // resources created by this very run stay invisible to fallback
        // resolution (accepted limitation).
        log::info!("Fetching existing resources");
        let domain_snapshot = ResourceSnapshot::from_domains(
            self.client
                .list_web_domains(opts.sys_userid, opts.sys_groupid)
                .await?,
        );
        let user_snapshot =
            ResourceSnapshot::from_database_users(self.client.list_database_users().await?);
        let database_snapshot =
            ResourceSnapshot::from_databases(self.client.list_databases(opts.client_id).await?);
        log::info!(
            "Found {} domains, {} database users, {} databases",
            domain_snapshot.len(),
            user_snapshot.len(),
            database_snapshot.len()
        );

        let mut drains = Vec::with_capacity(3);

        log::info!("Step 1/3: Creating web domains");
        let stage = WebDomainStage::new(domain_snapshot, opts.client_id, opts.server_id);
        let domains = run_stage(self.client.as_ref(), &stage, &mut items, opts.pacing).await;
        drains.push(self.wait_for_queue().await);

        log::info!("Step 2/3: Creating database users");
        let stage = DatabaseUserStage::new(user_snapshot, opts.client_id, opts.server_id);
        let users = run_stage(self.client.as_ref(), &stage, &mut items, opts.pacing).await;
        drains.push(self.wait_for_queue().await);

        log::info!("Step 3/3: Creating databases");
        let stage = DatabaseStage::new(database_snapshot, opts.client_id, opts.server_id);
        let databases = run_stage(self.client.as_ref(), &stage, &mut items, opts.pacing).await;
        drains.push(self.wait_for_queue().await);

        Ok(RunReport {
            domains,
            users,
            databases,
            drains,
            items,
        })
    }

    async fn wait_for_queue(&self) -> DrainOutcome {
        log::info!("Waiting for job queue");
        let outcome = await_drain(
            self.client.as_ref(),
            self.options.queue_scope,
            &self.options.drain,
        )
        .await;
        if !outcome.converged() {
            log::warn!("Job queue did not converge; proceeding with the next step");
        }
        outcome
    }
}
