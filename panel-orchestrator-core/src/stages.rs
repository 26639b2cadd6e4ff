//! Stage runner
//!
//! One stage is one pass over the whole working list, creating one resource
//! kind per item. The runner owns the recovery policy shared by all stages:
//! a failed create falls back to name resolution against the pre-fetched
//! snapshot, a failed fallback marks the item failed but never aborts the
//! pass, and every remote attempt is followed by a fixed pacing delay so
//! the panel's job queue is fed at a bounded rate.

use std::time::Duration;

use async_trait::async_trait;

use panel_orchestrator_client::{
    ClientError, CreateDatabaseRequest, CreateDatabaseUserRequest, CreateWebDomainRequest,
    ProvisioningClient, Result as ClientResult,
};

use crate::resolver;
use crate::types::{ItemOutcome, ItemResult, MigrationItem, ResourceSnapshot, StageReport, StageStats};

/// One resource kind's slice of the pipeline: how to create it, how to look
/// it up in the snapshot, and where its identifier lands on the item.
#[async_trait]
pub trait ProvisionStage: Send + Sync {
    /// Stage label for logs and reports.
    fn name(&self) -> &'static str;

    /// The item field this stage keys on (domain name, user name, database
    /// name).
    fn display_key<'a>(&self, item: &'a MigrationItem) -> &'a str;

    /// Check that the item carries everything this stage needs. A failing
    /// precondition means the stage must not issue a remote call for the
    /// item.
    fn precondition(&self, _item: &MigrationItem) -> Result<(), String> {
        Ok(())
    }

    /// Issue the creation call.
    async fn create(
        &self,
        client: &dyn ProvisioningClient,
        item: &MigrationItem,
    ) -> ClientResult<i64>;

    /// Look the item up in this stage's snapshot of pre-existing resources.
    fn resolve(&self, item: &MigrationItem) -> Option<i64>;

    /// Store the obtained identifier on the item.
    fn apply(&self, item: &mut MigrationItem, id: i64);
}

// ============ Stage 1: web domains ============

pub struct WebDomainStage {
    snapshot: ResourceSnapshot,
    client_id: i64,
    server_id: i64,
}

impl WebDomainStage {
    pub fn new(snapshot: ResourceSnapshot, client_id: i64, server_id: i64) -> Self {
        Self {
            snapshot,
            client_id,
            server_id,
        }
    }
}

#[async_trait]
impl ProvisionStage for WebDomainStage {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn display_key<'a>(&self, item: &'a MigrationItem) -> &'a str {
        &item.name
    }

    async fn create(
        &self,
        client: &dyn ProvisioningClient,
        item: &MigrationItem,
    ) -> ClientResult<i64> {
        let request = CreateWebDomainRequest {
            domain: item.name.clone(),
            server_id: self.server_id,
            ..Default::default()
        };
        client.create_web_domain(self.client_id, &request).await
    }

    fn resolve(&self, item: &MigrationItem) -> Option<i64> {
        resolver::resolve(&self.snapshot, &item.name)
    }

    fn apply(&self, item: &mut MigrationItem, id: i64) {
        item.domain_id = Some(id);
    }
}

// ============ Stage 2: database users ============

// Independent of stage 1: a user is created even when the item's domain
// stage produced nothing.
pub struct DatabaseUserStage {
    snapshot: ResourceSnapshot,
    client_id: i64,
    server_id: i64,
}

impl DatabaseUserStage {
    pub fn new(snapshot: ResourceSnapshot, client_id: i64, server_id: i64) -> Self {
        Self {
            snapshot,
            client_id,
            server_id,
        }
    }
}

#[async_trait]
impl ProvisionStage for DatabaseUserStage {
    fn name(&self) -> &'static str {
        "database user"
    }

    fn display_key<'a>(&self, item: &'a MigrationItem) -> &'a str {
        &item.db_user
    }

    async fn create(
        &self,
        client: &dyn ProvisioningClient,
        item: &MigrationItem,
    ) -> ClientResult<i64> {
        let request = CreateDatabaseUserRequest {
            database_user: item.db_user.clone(),
            database_password: item.db_password.clone(),
            server_id: self.server_id,
        };
        client.create_database_user(self.client_id, &request).await
    }

    fn resolve(&self, item: &MigrationItem) -> Option<i64> {
        resolver::resolve(&self.snapshot, &item.db_user)
    }

    fn apply(&self, item: &mut MigrationItem, id: i64) {
        item.db_user_id = Some(id);
    }
}

// ============ Stage 3: databases ============

pub struct DatabaseStage {
    snapshot: ResourceSnapshot,
    client_id: i64,
    server_id: i64,
}

impl DatabaseStage {
    pub fn new(snapshot: ResourceSnapshot, client_id: i64, server_id: i64) -> Self {
        Self {
            snapshot,
            client_id,
            server_id,
        }
    }
}

#[async_trait]
impl ProvisionStage for DatabaseStage {
    fn name(&self) -> &'static str {
        "database"
    }

    fn display_key<'a>(&self, item: &'a MigrationItem) -> &'a str {
        &item.db_name
    }

    /// A database attaches to both a domain and a user; submitting with
    /// either id absent would be a malformed request.
    fn precondition(&self, item: &MigrationItem) -> Result<(), String> {
        match (item.domain_id, item.db_user_id) {
            (Some(_), Some(_)) => Ok(()),
            (None, Some(_)) => Err("missing domain id from stage 1".to_string()),
            (Some(_), None) => Err("missing database user id from stage 2".to_string()),
            (None, None) => Err("missing domain id and database user id".to_string()),
        }
    }

    async fn create(
        &self,
        client: &dyn ProvisioningClient,
        item: &MigrationItem,
    ) -> ClientResult<i64> {
        // The runner checks the precondition first; this guards the direct path.
        let (Some(parent_domain_id), Some(database_user_id)) = (item.domain_id, item.db_user_id)
        else {
            return Err(ClientError::InvalidParameter {
                method: "sites_database_add".to_string(),
                param: "parent_domain_id/database_user_id".to_string(),
                detail: "upstream identifiers missing".to_string(),
            });
        };

        let request = CreateDatabaseRequest {
            database_name: item.db_name.clone(),
            database_user_id,
            parent_domain_id,
            server_id: self.server_id,
            ..Default::default()
        };
        client.create_database(self.client_id, &request).await
    }

    fn resolve(&self, item: &MigrationItem) -> Option<i64> {
        resolver::resolve(&self.snapshot, &item.db_name)
    }

    fn apply(&self, item: &mut MigrationItem, id: i64) {
        item.db_id = Some(id);
    }
}

// ============ Runner ============

/// Run one stage over every item, in input order, strictly sequentially.
///
/// Per item: precondition → create → on failure, fallback resolution →
/// record the outcome. Fallback resolutions count as `ok` (the pipeline can
/// proceed with the recovered id); fallback misses and precondition skips
/// count as `err`. The pacing delay follows every item that issued a remote
/// call.
pub async fn run_stage<S: ProvisionStage>(
    client: &dyn ProvisioningClient,
    stage: &S,
    items: &mut [MigrationItem],
    pacing: Duration,
) -> StageReport {
    let mut stats = StageStats::default();
    let mut results = Vec::with_capacity(items.len());

    for item in items.iter_mut() {
        let key = stage.display_key(item).to_string();

        if let Err(reason) = stage.precondition(item) {
            log::warn!("  Create {} {key} - SKIPPED ({reason})", stage.name());
            stats.err += 1;
            results.push(ItemResult {
                name: key,
                outcome: ItemOutcome::Skipped { reason },
            });
            continue;
        }

        let outcome = match stage.create(client, item).await {
            Ok(id) => {
                stage.apply(item, id);
                stats.ok += 1;
                log::info!("  Create {} {key} - OK (ID: {id})", stage.name());
                ItemOutcome::Created { id }
            }
            Err(e) => {
                let level = if e.is_expected() {
                    log::Level::Warn
                } else {
                    log::Level::Error
                };
                log::log!(level, "  Create {} {key} - ERR ({e})", stage.name());

                match stage.resolve(item) {
                    Some(id) => {
                        stage.apply(item, id);
                        stats.ok += 1;
                        log::info!(
                            "  Search existing {} {key} - OK (ID: {id})",
                            stage.name()
                        );
                        ItemOutcome::Resolved { id }
                    }
                    None => {
                        stats.err += 1;
                        log::warn!("  Search existing {} {key} - NOT FOUND", stage.name());
                        ItemOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
        };

        results.push(ItemResult { name: key, outcome });
        tokio::time::sleep(pacing).await;
    }

    log::info!("  Summary: {}/{} successful", stats.ok, stats.total());

    StageReport {
        stage: stage.name(),
        stats,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{exists_error, items_from_names, MockClient};
    use crate::types::SnapshotEntry;

    const NO_PACING: Duration = Duration::ZERO;

    fn snapshot(entries: &[(i64, &str)]) -> ResourceSnapshot {
        ResourceSnapshot::new(
            entries
                .iter()
                .map(|(id, name)| SnapshotEntry {
                    id: *id,
                    name: (*name).to_string(),
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn successful_create_sets_id_and_counts_ok() {
        let client = MockClient::new();
        client.push_domain_result(Ok(11));
        let mut items = items_from_names(&["a.com"]);
        let stage = WebDomainStage::new(ResourceSnapshot::default(), 1, 1);

        let report = run_stage(&client, &stage, &mut items, NO_PACING).await;

        assert_eq!(items[0].domain_id, Some(11));
        assert_eq!(report.stats.ok, 1);
        assert_eq!(report.stats.err, 0);
        assert!(matches!(
            report.results[0].outcome,
            ItemOutcome::Created { id: 11 }
        ));
    }

    #[tokio::test]
    async fn failed_create_resolves_from_snapshot() {
        let client = MockClient::new();
        client.push_domain_result(Err(exists_error("a.com")));
        let mut items = items_from_names(&["a.com"]);
        let stage = WebDomainStage::new(snapshot(&[(7, "a.com")]), 1, 1);

        let report = run_stage(&client, &stage, &mut items, NO_PACING).await;

        assert_eq!(items[0].domain_id, Some(7));
        assert_eq!(report.stats.ok, 1);
        assert_eq!(report.stats.err, 0);
        assert!(matches!(
            report.results[0].outcome,
            ItemOutcome::Resolved { id: 7 }
        ));
    }

    #[tokio::test]
    async fn failed_create_and_fallback_miss_leaves_id_unset() {
        let client = MockClient::new();
        client.push_domain_result(Err(exists_error("a.com")));
        let mut items = items_from_names(&["a.com"]);
        let stage = WebDomainStage::new(snapshot(&[(7, "other.com")]), 1, 1);

        let report = run_stage(&client, &stage, &mut items, NO_PACING).await;

        assert_eq!(items[0].domain_id, None);
        assert_eq!(report.stats.ok, 0);
        assert_eq!(report.stats.err, 1);
        assert!(matches!(
            &report.results[0].outcome,
            ItemOutcome::Failed { reason } if reason.contains("already exists")
        ));
    }

    #[tokio::test]
    async fn items_run_in_input_order() {
        let client = MockClient::new();
        client.push_domain_result(Ok(1));
        client.push_domain_result(Ok(2));
        let mut items = items_from_names(&["a.com", "b.com"]);
        let stage = WebDomainStage::new(ResourceSnapshot::default(), 1, 1);

        run_stage(&client, &stage, &mut items, NO_PACING).await;

        assert_eq!(
            client.created_domains(),
            vec!["a.com".to_string(), "b.com".to_string()]
        );
        assert_eq!(items[0].domain_id, Some(1));
        assert_eq!(items[1].domain_id, Some(2));
    }

    #[tokio::test]
    async fn user_stage_runs_without_domain_id() {
        let client = MockClient::new();
        client.push_user_result(Ok(5));
        let mut items = items_from_names(&["a.com"]);
        // Stage 1 produced nothing for this item
        assert_eq!(items[0].domain_id, None);
        let stage = DatabaseUserStage::new(ResourceSnapshot::default(), 1, 1);

        let report = run_stage(&client, &stage, &mut items, NO_PACING).await;

        assert_eq!(items[0].db_user_id, Some(5));
        assert_eq!(report.stats.ok, 1);
    }

    #[tokio::test]
    async fn database_stage_skips_item_missing_upstream_ids() {
        let client = MockClient::new();
        let mut items = items_from_names(&["a.com"]);
        items[0].db_user_id = Some(5); // domain_id still missing
        let stage = DatabaseStage::new(ResourceSnapshot::default(), 1, 1);

        let report = run_stage(&client, &stage, &mut items, NO_PACING).await;

        // The remote create must never have been attempted
        assert!(client.created_databases().is_empty());
        assert_eq!(items[0].db_id, None);
        assert_eq!(report.stats.ok, 0);
        assert_eq!(report.stats.err, 1);
        assert!(matches!(
            &report.results[0].outcome,
            ItemOutcome::Skipped { reason } if reason.contains("domain id")
        ));
    }

    #[tokio::test]
    async fn database_stage_creates_with_both_ids_present() {
        let client = MockClient::new();
        client.push_database_result(Ok(33));
        let mut items = items_from_names(&["a.com"]);
        items[0].domain_id = Some(9);
        items[0].db_user_id = Some(5);
        let stage = DatabaseStage::new(ResourceSnapshot::default(), 1, 1);

        let report = run_stage(&client, &stage, &mut items, NO_PACING).await;

        assert_eq!(items[0].db_id, Some(33));
        assert_eq!(report.stats.ok, 1);
        assert_eq!(client.created_databases(), vec!["d_a.com".to_string()]);
    }

    #[tokio::test]
    async fn mixed_outcomes_tally_independently() {
        let client = MockClient::new();
        client.push_domain_result(Ok(1));
        client.push_domain_result(Err(exists_error("b.com")));
        client.push_domain_result(Err(exists_error("c.com")));
        let mut items = items_from_names(&["a.com", "b.com", "c.com"]);
        let stage = WebDomainStage::new(snapshot(&[(20, "b.com")]), 1, 1);

        let report = run_stage(&client, &stage, &mut items, NO_PACING).await;

        // created + resolved count ok, fallback miss counts err
        assert_eq!(report.stats.ok, 2);
        assert_eq!(report.stats.err, 1);
        assert_eq!(items[0].domain_id, Some(1));
        assert_eq!(items[1].domain_id, Some(20));
        assert_eq!(items[2].domain_id, None);
    }
}
