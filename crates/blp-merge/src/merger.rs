//! The merge orchestrator.

use blp_diff::DiffProvider;
use blp_edit::Patcher;
use blp_tree::{Element, Node, TreeError};

use crate::error::{MergeError, MergeResult};
use crate::report::{EntityOutcome, EntityReport, MergeReport, SkippedAction, SourceReport};
use crate::session::MergeSession;
use crate::source::Source;

/// Merges sources into a [`MergeSession`].
///
/// For every contributed entity: an id the base catalog has never seen is
/// cloned into both catalogs; a known id is diffed against its base version
/// and the script is replayed onto the output version in place. Base
/// versions are never patched, so a long chain of overrides is always diffed
/// against the same reference while the patches pile up in the output.
pub struct Merger<D> {
    differ: D,
    patcher: Patcher,
}

impl<D: DiffProvider> Merger<D> {
    pub fn new(differ: D) -> Self {
        Self {
            differ,
            patcher: Patcher::new(),
        }
    }

    /// Merge every source, lowest rank first. Equal ranks keep slice order.
    ///
    /// Stops at the first fatal error; the session must then be discarded.
    pub fn run(&self, session: &mut MergeSession, sources: &[Source]) -> MergeResult<MergeReport> {
        let mut ordered: Vec<&Source> = sources.iter().collect();
        ordered.sort_by_key(|source| source.rank());

        let mut report = MergeReport::default();
        for source in ordered {
            report.sources.push(self.merge_source(session, source)?);
        }
        Ok(report)
    }

    /// Merge one source's entities in document order.
    pub fn merge_source(&self, session: &mut MergeSession, source: &Source) -> MergeResult<SourceReport> {
        tracing::info!(
            source = source.id(),
            rank = source.rank(),
            entities = source.entity_count(),
            "merging source"
        );

        let mut entities = Vec::with_capacity(source.entity_count());
        for entity in source.entities() {
            entities.push(self.merge_entity(session, entity)?);
        }
        session.merged_sources.push(source.id().to_string());

        let report = SourceReport {
            source: source.id().to_string(),
            rank: source.rank(),
            entities,
        };
        tracing::info!(
            source = source.id(),
            added = report.added(),
            merged = report.merged(),
            skipped_actions = report.skipped_actions(),
            "source merged"
        );
        Ok(report)
    }

    /// Merge a single contributed entity.
    pub fn merge_entity(&self, session: &mut MergeSession, entity: &Element) -> MergeResult<EntityReport> {
        let id = entity.id().ok_or_else(|| TreeError::MissingEntityId {
            tag: entity.tag.clone(),
        })?;
        let wrapper_tag = session.base.root().tag.clone();

        let Some(base_entity) = session.base.get(id) else {
            session.base.insert(entity.clone())?;
            session.output.insert(entity.clone())?;
            tracing::debug!(id, "added");
            return Ok(EntityReport {
                id: id.to_string(),
                outcome: EntityOutcome::Added,
            });
        };

        let script = self.differ.diff(
            &wrap(&wrapper_tag, base_entity.clone()),
            &wrap(&wrapper_tag, entity.clone()),
        );
        for action in &script {
            tracing::debug!(id, %action, "computed edit action");
        }

        let accumulated = session
            .output
            .get_mut(id)
            .map(std::mem::take)
            .ok_or_else(|| MergeError::MissingOutputEntity { id: id.to_string() })?;
        let mut tree = wrap(&wrapper_tag, accumulated);
        let patch = self.patcher.patch_in_place(&script, &mut tree);
        let skipped: Vec<SkippedAction> = patch
            .skipped()
            .map(|(index, reason)| SkippedAction {
                action: script[index].clone(),
                reason: reason.clone(),
            })
            .collect();

        let mut survivors = tree.children.into_iter().filter_map(Node::into_element);
        let outcome = match survivors.next() {
            Some(patched) => {
                if survivors.next().is_some() {
                    tracing::debug!(id, "script added siblings next to the entity, dropping them");
                }
                let renamed = patched.id() != Some(id);
                if let Some(slot) = session.output.get_mut(id) {
                    *slot = patched;
                }
                if renamed {
                    tracing::warn!(id, "script changed the entity id, reindexing output");
                    session.output.reindex();
                }
                tracing::debug!(id, actions = script.len(), skipped = skipped.len(), "merged");
                EntityOutcome::Merged { script, skipped }
            }
            None => {
                session.output.remove(id);
                tracing::warn!(id, "script deleted the entity from the output");
                EntityOutcome::Removed { script }
            }
        };

        Ok(EntityReport {
            id: id.to_string(),
            outcome,
        })
    }
}

fn wrap(tag: &str, entity: Element) -> Element {
    Element::new(tag).with_child(entity)
}
