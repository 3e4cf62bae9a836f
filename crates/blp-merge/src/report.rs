//! Merge reports.

use blp_edit::{EditAction, SkipReason};
use serde::Serialize;

/// An action from a replayed script that did not apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedAction {
    pub action: EditAction,
    pub reason: SkipReason,
}

/// What happened to one contributed entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntityOutcome {
    /// First sight of the id: cloned into both catalogs.
    Added,
    /// The script against the base was replayed onto the output.
    Merged {
        script: Vec<EditAction>,
        skipped: Vec<SkippedAction>,
    },
    /// The replayed script removed the entity from the output.
    Removed { script: Vec<EditAction> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub id: String,
    #[serde(flatten)]
    pub outcome: EntityOutcome,
}

/// Results for one source, entities in processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub rank: usize,
    pub entities: Vec<EntityReport>,
}

impl SourceReport {
    pub fn added(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Added))
    }

    pub fn merged(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Merged { .. }))
    }

    pub fn removed(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Removed { .. }))
    }

    /// Number of replayed actions that were skipped.
    pub fn skipped_actions(&self) -> usize {
        self.entities
            .iter()
            .map(|e| match &e.outcome {
                EntityOutcome::Merged { skipped, .. } => skipped.len(),
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&EntityOutcome) -> bool) -> usize {
        self.entities.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Results for a whole run, sources in merge order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub sources: Vec<SourceReport>,
}

impl MergeReport {
    pub fn entity_count(&self) -> usize {
        self.sources.iter().map(|s| s.entities.len()).sum()
    }

    pub fn skipped_actions(&self) -> usize {
        self.sources.iter().map(SourceReport::skipped_actions).sum()
    }
}
