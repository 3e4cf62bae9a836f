//! Per-run merge state.

use blp_tree::Catalog;

/// State of one merge run.
///
/// `base` holds one reference version per entity id: the canonical base
/// definitions plus the first definition of every id a source introduced.
/// It is never patched, so every source is diffed against the same
/// reference. `output` starts as a copy of the canonical base and
/// accumulates every replayed script. Both catalogs are private to the
/// session and only change through [`crate::Merger`].
#[derive(Clone, Debug)]
pub struct MergeSession {
    pub(crate) base: Catalog,
    pub(crate) output: Catalog,
    pub(crate) merged_sources: Vec<String>,
}

impl MergeSession {
    /// Start a session from the canonical base catalog.
    pub fn new(base: Catalog) -> Self {
        let output = base.clone();
        Self {
            base,
            output,
            merged_sources: Vec::new(),
        }
    }

    pub fn base(&self) -> &Catalog {
        &self.base
    }

    pub fn output(&self) -> &Catalog {
        &self.output
    }

    /// Ids of the sources merged so far, in merge order.
    pub fn merged_sources(&self) -> &[String] {
        &self.merged_sources
    }

    /// End the session, keeping the output catalog and the merge order.
    pub fn finish(self) -> (Catalog, Vec<String>) {
        (self.output, self.merged_sources)
    }
}
