//! Per-stage and per-run result records
//!
//! Progress is logged live as the stages run; these records exist so the
//! created / resolved / failed distinction stays recoverable for the final
//! report and for tests without parsing log output.

use serde::Serialize;

/// Per-stage success/failure tally. Purely observational; never drives
/// control flow.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StageStats {
    pub ok: u32,
    pub err: u32,
}

impl StageStats {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.ok + self.err
    }
}

/// What happened to one item in one stage.
///
/// `Resolved` counts toward `ok` in [`StageStats`] — the pipeline can
/// proceed with the recovered id — but remains distinguishable from
/// `Created` here.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Creation succeeded; id is the panel's new identifier.
    Created { id: i64 },
    /// Creation failed, but the name matched an existing resource in the
    /// pre-fetched snapshot.
    Resolved { id: i64 },
    /// Creation failed and the name matched nothing in the snapshot; the
    /// item's identifier stays unset.
    Failed { reason: String },
    /// A required upstream identifier was missing; no remote call was made.
    Skipped { reason: String },
}

impl ItemOutcome {
    /// Whether the stage ended with a usable identifier for this item.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Resolved { .. })
    }

    /// The identifier this outcome produced, if any.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Created { id } | Self::Resolved { id } => Some(*id),
            Self::Failed { .. } | Self::Skipped { .. } => None,
        }
    }
}

/// The outcome of one stage for one item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    /// The stage's display key for the item (domain name, user name or
    /// database name).
    pub name: String,
    pub outcome: ItemOutcome,
}

/// Everything one stage pass produced.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    /// Stage label ("domain", "database user", "database").
    pub stage: &'static str,
    pub stats: StageStats,
    pub results: Vec<ItemResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_counts_as_ok_outcome() {
        assert!(ItemOutcome::Resolved { id: 7 }.is_ok());
        assert!(ItemOutcome::Created { id: 1 }.is_ok());
        assert!(!ItemOutcome::Failed {
            reason: "x".to_string()
        }
        .is_ok());
        assert!(!ItemOutcome::Skipped {
            reason: "x".to_string()
        }
        .is_ok());
    }

    #[test]
    fn outcome_id_only_for_usable_outcomes() {
        assert_eq!(ItemOutcome::Resolved { id: 7 }.id(), Some(7));
        assert_eq!(
            ItemOutcome::Skipped {
                reason: "x".to_string()
            }
            .id(),
            None
        );
    }

    #[test]
    fn stats_total() {
        let stats = StageStats { ok: 3, err: 2 };
        assert_eq!(stats.total(), 5);
    }
}
