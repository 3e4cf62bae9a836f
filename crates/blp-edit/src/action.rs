//! The closed set of primitive tree edits.

use std::fmt;

use blp_tree::Address;
use serde::{Deserialize, Serialize};

/// One atomic structural change to a tree.
///
/// Every field that designates a node holds an [`Address`], never a
/// reference, so a script computed against one tree can be replayed onto
/// another of a similar shape. Positions are raw child indices of the target
/// (comments included) and are clamped to the end when too large.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum EditAction {
    /// Insert an empty element with `tag` into `target` at `position`.
    InsertNode {
        target: Address,
        position: usize,
        tag: String,
    },
    /// Remove `node` from its parent.
    DeleteNode { node: Address },
    /// Change the tag of `node`.
    RenameNode { node: Address, tag: String },
    /// Detach `node` and insert it into `target` at `position`.
    ///
    /// Both addresses are resolved against the tree before the move;
    /// `position` counts the target's children after the node is detached.
    MoveNode {
        node: Address,
        target: Address,
        position: usize,
    },
    /// Set the text before the first child of `node`.
    UpdateTextIn { node: Address, text: Option<String> },
    /// Set the text following `node` in its parent.
    UpdateTextAfter { node: Address, text: Option<String> },
    /// Set an existing attribute.
    UpdateAttrib {
        node: Address,
        name: String,
        value: String,
    },
    /// Add a new attribute.
    InsertAttrib {
        node: Address,
        name: String,
        value: String,
    },
    /// Remove an attribute.
    DeleteAttrib { node: Address, name: String },
    /// Rename an attribute. Never applied; see [`crate::Patcher`].
    RenameAttrib {
        node: Address,
        old_name: String,
        new_name: String,
    },
    /// Insert a comment into `target` at `position`.
    InsertComment {
        target: Address,
        position: usize,
        text: String,
    },
}

impl EditAction {
    /// The variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsertNode { .. } => "InsertNode",
            Self::DeleteNode { .. } => "DeleteNode",
            Self::RenameNode { .. } => "RenameNode",
            Self::MoveNode { .. } => "MoveNode",
            Self::UpdateTextIn { .. } => "UpdateTextIn",
            Self::UpdateTextAfter { .. } => "UpdateTextAfter",
            Self::UpdateAttrib { .. } => "UpdateAttrib",
            Self::InsertAttrib { .. } => "InsertAttrib",
            Self::DeleteAttrib { .. } => "DeleteAttrib",
            Self::RenameAttrib { .. } => "RenameAttrib",
            Self::InsertComment { .. } => "InsertComment",
        }
    }

    /// The primary address the action operates on.
    pub fn address(&self) -> &Address {
        match self {
            Self::InsertNode { target, .. } | Self::InsertComment { target, .. } => target,
            Self::DeleteNode { node }
            | Self::RenameNode { node, .. }
            | Self::MoveNode { node, .. }
            | Self::UpdateTextIn { node, .. }
            | Self::UpdateTextAfter { node, .. }
            | Self::UpdateAttrib { node, .. }
            | Self::InsertAttrib { node, .. }
            | Self::DeleteAttrib { node, .. }
            | Self::RenameAttrib { node, .. } => node,
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertNode { target, position, tag } => {
                write!(f, "InsertNode(target='{target}', tag='{tag}', position={position})")
            }
            Self::DeleteNode { node } => write!(f, "DeleteNode(node='{node}')"),
            Self::RenameNode { node, tag } => write!(f, "RenameNode(node='{node}', tag='{tag}')"),
            Self::MoveNode { node, target, position } => {
                write!(f, "MoveNode(node='{node}', target='{target}', position={position})")
            }
            Self::UpdateTextIn { node, text } => {
                write!(f, "UpdateTextIn(node='{node}', text={text:?})")
            }
            Self::UpdateTextAfter { node, text } => {
                write!(f, "UpdateTextAfter(node='{node}', text={text:?})")
            }
            Self::UpdateAttrib { node, name, value } => {
                write!(f, "UpdateAttrib(node='{node}', name='{name}', value='{value}')")
            }
            Self::InsertAttrib { node, name, value } => {
                write!(f, "InsertAttrib(node='{node}', name='{name}', value='{value}')")
            }
            Self::DeleteAttrib { node, name } => {
                write!(f, "DeleteAttrib(node='{node}', name='{name}')")
            }
            Self::RenameAttrib { node, old_name, new_name } => write!(
                f,
                "RenameAttrib(node='{node}', oldname='{old_name}', newname='{new_name}')"
            ),
            Self::InsertComment { target, position, text } => {
                write!(f, "InsertComment(target='{target}', position={position}, text={text:?})")
            }
        }
    }
}
