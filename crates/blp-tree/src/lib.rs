//! Tree model for blpatch.
//!
//! Provides the mutable in-memory document tree that every other crate
//! operates on, the positional addressing scheme used to locate nodes inside
//! a tree at edit time, and the entity catalog that indexes records by id.
//!
//! # Key Types
//!
//! - [`Element`] / [`Node`] / [`Comment`] -- Owned, mutable document tree
//! - [`Address`] / [`Step`] -- Structural path such as `/Items/Item[2]/Flag[1]`
//! - [`NodePath`] -- Raw child indices of a resolved node, valid until the next mutation
//! - [`Catalog`] -- Ordered collection of entity elements indexed by `id`

pub mod address;
pub mod catalog;
pub mod element;
pub mod error;

pub use address::{Address, NodePath, Step};
pub use catalog::{Catalog, ENTITY_ID_ATTR};
pub use element::{normalize_text, Comment, Element, Node};
pub use error::{TreeError, TreeResult};
