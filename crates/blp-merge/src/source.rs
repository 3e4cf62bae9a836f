//! Sources: the contributors whose overrides are merged.

use blp_tree::{Catalog, Element};

/// One contributor of entity overrides.
///
/// A source holds one catalog per contributed document, in the order the
/// documents were declared. Its `rank` is its position in the load order;
/// lower ranks are merged first.
#[derive(Clone, Debug)]
pub struct Source {
    id: String,
    rank: usize,
    documents: Vec<Catalog>,
}

impl Source {
    pub fn new(id: impl Into<String>, rank: usize) -> Self {
        Self {
            id: id.into(),
            rank,
            documents: Vec::new(),
        }
    }

    /// Builder: add a contributed document.
    pub fn with_document(mut self, document: Catalog) -> Self {
        self.documents.push(document);
        self
    }

    pub fn push_document(&mut self, document: Catalog) {
        self.documents.push(document);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn documents(&self) -> &[Catalog] {
        &self.documents
    }

    /// Every contributed entity, document by document, in document order.
    ///
    /// A document that repeats an id contributes each definition, so a later
    /// one is replayed over an earlier one.
    pub fn entities(&self) -> impl Iterator<Item = &Element> {
        self.documents.iter().flat_map(Catalog::occurrences)
    }

    pub fn entity_count(&self) -> usize {
        self.entities().count()
    }
}
