//! Pre-fetched views of existing remote resources

use panel_orchestrator_client::{Database, DatabaseUser, WebDomain};

/// One existing remote resource, reduced to what fallback resolution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub id: i64,
    pub name: String,
}

/// A point-in-time list of the existing resources of one kind, fetched once
/// before the first stage and consulted read-only for the rest of the run.
///
/// Because the snapshot is never refreshed, a resource created earlier in
/// the *same* run by a different item is invisible here. That is accepted:
/// the snapshot exists to recover pre-existing resources, not to track the
/// run's own output.
#[derive(Debug, Clone, Default)]
pub struct ResourceSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl ResourceSnapshot {
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_domains(domains: Vec<WebDomain>) -> Self {
        Self::new(
            domains
                .into_iter()
                .map(|d| SnapshotEntry {
                    id: d.domain_id,
                    name: d.domain,
                })
                .collect(),
        )
    }

    pub fn from_database_users(users: Vec<DatabaseUser>) -> Self {
        Self::new(
            users
                .into_iter()
                .map(|u| SnapshotEntry {
                    id: u.database_user_id,
                    name: u.database_user,
                })
                .collect(),
        )
    }

    pub fn from_databases(databases: Vec<Database>) -> Self {
        Self::new(
            databases
                .into_iter()
                .map(|d| SnapshotEntry {
                    id: d.database_id,
                    name: d.database_name,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_domains_preserving_order() {
        let snapshot = ResourceSnapshot::from_domains(vec![
            WebDomain {
                domain_id: 7,
                domain: "a.com".to_string(),
            },
            WebDomain {
                domain_id: 3,
                domain: "b.com".to_string(),
            },
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.entries()[0].id, 7);
        assert_eq!(snapshot.entries()[1].name, "b.com");
    }

    #[test]
    fn empty_by_default() {
        assert!(ResourceSnapshot::default().is_empty());
    }
}
