//! Edit actions and the patch engine.
//!
//! An edit script is an ordered list of [`EditAction`]s. The [`Patcher`]
//! replays a script onto a tree one action at a time, re-resolving every
//! address against the tree as left by the previous action. Actions whose
//! addresses miss are skipped and reported; they never abort the script.
//!
//! # Key Types
//!
//! - [`EditAction`] -- The closed set of primitive tree edits
//! - [`Patcher`] -- Applies scripts in place or onto a copy
//! - [`PatchReport`] / [`ActionOutcome`] / [`SkipReason`] -- Per-action results

pub mod action;
pub mod patch;

pub use action::EditAction;
pub use patch::{ActionOutcome, PatchReport, Patcher, SkipReason};
