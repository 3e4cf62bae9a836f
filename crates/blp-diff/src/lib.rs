//! Diff provider for blpatch.
//!
//! Computes edit scripts between two element trees such that replaying the
//! script onto a copy of the first tree yields a tree equivalent to the
//! second.
//!
//! # Key Types
//!
//! - [`DiffProvider`] -- The interface the merge orchestrator consumes
//! - [`TreeDiffer`] / [`DiffOptions`] -- Default implementation, aligning children with `similar`

pub mod differ;

pub use differ::{DiffOptions, DiffProvider, TreeDiffer};
