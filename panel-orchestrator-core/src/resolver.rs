//! Fallback resolution
//!
//! When a creation call fails because the resource already exists, the
//! pipeline recovers the existing resource's identifier by name lookup
//! against the snapshot fetched before the run began. Pure and local: no
//! network, no mutation.

use crate::types::ResourceSnapshot;

/// Find the identifier of an existing resource by exact, case-sensitive
/// name match.
///
/// Returns the *first* match in snapshot order; if the panel permits
/// duplicate names only the first is ever resolved.
#[must_use]
pub fn resolve(snapshot: &ResourceSnapshot, name: &str) -> Option<i64> {
    snapshot
        .entries()
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnapshotEntry;

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

    #[test]
    fn finds_exact_match() {
        let snap = snapshot(&[(1, "a.com"), (7, "b.com")]);
        assert_eq!(resolve(&snap, "b.com"), Some(7));
    }

    #[test]
    fn returns_none_for_miss() {
        let snap = snapshot(&[(1, "a.com")]);
        assert_eq!(resolve(&snap, "c.com"), None);
    }

    #[test]
    fn match_is_case_sensitive() {
        let snap = snapshot(&[(1, "Example.com")]);
        assert_eq!(resolve(&snap, "example.com"), None);
        assert_eq!(resolve(&snap, "Example.com"), Some(1));
    }

    #[test]
    fn first_of_duplicate_names_wins() {
        let snap = snapshot(&[(1, "a.com"), (2, "a.com")]);
        assert_eq!(resolve(&snap, "a.com"), Some(1));
    }

    #[test]
    fn empty_snapshot_resolves_nothing() {
        assert_eq!(resolve(&ResourceSnapshot::default(), "a.com"), None);
    }
}
