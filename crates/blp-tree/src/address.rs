//! Positional addressing of nodes inside a tree.
//!
//! An [`Address`] names a node by the chain of tags leading to it and the
//! node's 1-based position among same-tag element siblings, written
//! `/Items/Item[2]/Flag[1]`. Addresses are resolved against a live tree each
//! time they are used, so the same address can be replayed onto any tree of a
//! similar shape. Resolution yields a [`NodePath`] of raw child indices, which
//! is only valid until the tree is next mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{TreeError, TreeResult};

/// One segment of an address: a tag and a 1-based position among siblings
/// that share that tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub tag: String,
    pub position: usize,
}

impl Step {
    pub fn new(tag: impl Into<String>, position: usize) -> Self {
        Self {
            tag: tag.into(),
            position,
        }
    }
}

/// A structural path from the root of a tree to one element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    steps: Vec<Step>,
}

impl Address {
    /// Address of a root element with the given tag.
    pub fn root(tag: impl Into<String>) -> Self {
        Self {
            steps: vec![Step::new(tag, 1)],
        }
    }

    /// Build an address from explicit steps. The first step names the root.
    pub fn from_steps(steps: Vec<Step>) -> TreeResult<Self> {
        let address = Self { steps };
        address.validate()?;
        Ok(address)
    }

    /// Extend this address by one step.
    pub fn child(mut self, tag: impl Into<String>, position: usize) -> Self {
        self.steps.push(Step::new(tag, position));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Compute the address of the element at `path` in `root`.
    ///
    /// Returns `None` when `path` does not land on an element.
    pub fn of(root: &Element, path: &NodePath) -> Option<Self> {
        let mut steps = vec![Step::new(root.tag.clone(), 1)];
        let mut node = root;
        for &index in path.indices() {
            let child = node.children.get(index)?.as_element()?;
            let position = node.children[..index]
                .iter()
                .filter_map(|n| n.as_element())
                .filter(|e| e.tag == child.tag)
                .count()
                + 1;
            steps.push(Step::new(child.tag.clone(), position));
            node = child;
        }
        Some(Self { steps })
    }

    /// Resolve this address against `root`.
    ///
    /// A missing tag or an out-of-range position is a miss, not an error.
    pub fn resolve(&self, root: &Element) -> Option<NodePath> {
        let (first, rest) = self.steps.split_first()?;
        if first.tag != root.tag || first.position != 1 {
            return None;
        }

        let mut indices = Vec::with_capacity(rest.len());
        let mut node = root;
        for step in rest {
            let (index, child) = node
                .children
                .iter()
                .enumerate()
                .filter_map(|(i, n)| n.as_element().map(|e| (i, e)))
                .filter(|(_, e)| e.tag == step.tag)
                .nth(step.position.checked_sub(1)?)?;
            indices.push(index);
            node = child;
        }
        Some(NodePath(indices))
    }

    fn validate(&self) -> TreeResult<()> {
        if self.steps.is_empty() {
            return Err(TreeError::invalid_address("", "address has no steps"));
        }
        for step in &self.steps {
            if step.tag.is_empty() || step.tag.contains(['/', '[', ']']) {
                return Err(TreeError::invalid_address(self.to_string(), format!("invalid tag {:?}", step.tag)));
            }
            if step.position == 0 {
                return Err(TreeError::invalid_address(self.to_string(), "positions are 1-based"));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{}[{}]", step.tag, step.position)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = TreeError;

    fn from_str(s: &str) -> TreeResult<Self> {
        let body = s
            .strip_prefix('/')
            .ok_or_else(|| TreeError::invalid_address(s, "must start with '/'"))?;

        let mut steps = Vec::new();
        for segment in body.split('/') {
            let step = match segment.split_once('[') {
                Some((tag, rest)) => {
                    let digits = rest
                        .strip_suffix(']')
                        .ok_or_else(|| TreeError::invalid_address(s, "unterminated '['"))?;
                    let position = digits.parse::<usize>().map_err(|_| {
                        TreeError::invalid_address(s, format!("bad position {digits:?}"))
                    })?;
                    Step::new(tag, position)
                }
                None => Step::new(segment, 1),
            };
            steps.push(step);
        }

        let address = Self { steps };
        address.validate().map_err(|_| TreeError::invalid_address(s, "malformed step"))?;
        Ok(address)
    }
}

impl TryFrom<String> for Address {
    type Error = TreeError;

    fn try_from(value: String) -> TreeResult<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Raw child indices from a root down to one node.
///
/// Unlike an [`Address`], a path counts comments and is invalidated by any
/// structural mutation above or beside the node it names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The empty path, naming the root itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path to the child at raw index `index`.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Split into the parent path and this node's index in the parent.
    pub fn split_last(&self) -> Option<(Self, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((Self(parent.to_vec()), last))
    }

    /// Whether `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Adjust this path for the removal of the node at `removed`.
    ///
    /// Later siblings of the removed node, and anything beneath them, shift
    /// one index to the left.
    pub fn after_removal_of(&self, removed: &NodePath) -> Self {
        let mut indices = self.0.clone();
        if let Some((parent, index)) = removed.split_last() {
            let depth = parent.0.len();
            if indices.len() > depth && indices.starts_with(&parent.0) && indices[depth] > index {
                indices[depth] -= 1;
            }
        }
        Self(indices)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}
