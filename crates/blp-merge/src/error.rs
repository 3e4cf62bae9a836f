//! Error types for the merge crate.

use blp_tree::TreeError;

/// Fatal merge errors. Any of these aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A replay targeted an entity the output catalog never received.
    #[error("entity '{id}' is in the base catalog but missing from the output catalog")]
    MissingOutputEntity { id: String },

    /// A catalog rejected an entity.
    #[error("catalog error: {0}")]
    Catalog(#[from] TreeError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
