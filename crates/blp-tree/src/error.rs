//! Error types for the tree crate.

/// Errors that can occur while building trees, addresses, or catalogs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// An address string could not be parsed.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// An entity was added to a catalog without an `id` attribute.
    #[error("<{tag}> entity has no id attribute")]
    MissingEntityId { tag: String },

    /// An element of the wrong kind was added to a catalog.
    #[error("expected <{expected}> entity, got <{actual}>")]
    UnexpectedEntityTag { expected: String, actual: String },

    /// The catalog already holds an entity with this id.
    #[error("duplicate entity id: {0}")]
    DuplicateEntity(String),
}

impl TreeError {
    pub(crate) fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
