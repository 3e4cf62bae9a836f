//! Merge orchestrator for blpatch.
//!
//! Merges entity overrides from an ordered list of sources. Each contributed
//! entity is diffed against the one base version established for its id and
//! the resulting script is replayed onto the accumulated output, so
//! independently authored overrides combine without knowing about each
//! other. Where two sources edit the same spot, the later one wins.
//!
//! # Key Types
//!
//! - [`Source`] -- One contributor's entity documents and load-order rank
//! - [`MergeSession`] -- The base and output catalogs of one merge run
//! - [`Merger`] -- Drives sources through a session
//! - [`MergeReport`] / [`SourceReport`] / [`EntityReport`] -- What happened to every entity

pub mod error;
pub mod merger;
pub mod report;
pub mod session;
pub mod source;

pub use error::{MergeError, MergeResult};
pub use merger::Merger;
pub use report::{EntityOutcome, EntityReport, MergeReport, SkippedAction, SourceReport};
pub use session::MergeSession;
pub use source::Source;
