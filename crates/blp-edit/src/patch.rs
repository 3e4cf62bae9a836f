//! The patch engine: ordered, best-effort replay of edit scripts.

use std::fmt;

use blp_tree::{Address, Comment, Element, Node, NodePath};
use serde::Serialize;

use crate::action::EditAction;

/// Why an action was not applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// An address did not match anything in the current tree.
    Unresolved { address: Address },
    /// The action kind is never executed.
    Unsupported { kind: &'static str },
    /// The action would detach the root of the tree.
    DetachRoot { address: Address },
    /// The move target is the moved node itself or lies inside it.
    MoveIntoSelf { node: Address, target: Address },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { address } => write!(f, "no node at {address}"),
            Self::Unsupported { kind } => write!(f, "{kind} is not supported"),
            Self::DetachRoot { address } => write!(f, "cannot detach root {address}"),
            Self::MoveIntoSelf { node, target } => {
                write!(f, "cannot move {node} into its own subtree at {target}")
            }
        }
    }
}

/// The result of applying one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Skipped(SkipReason),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Per-action results of one patch call, in script order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub outcomes: Vec<ActionOutcome>,
}

impl PatchReport {
    /// Number of actions that changed the tree.
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    /// Skipped actions as `(script index, reason)`.
    pub fn skipped(&self) -> impl Iterator<Item = (usize, &SkipReason)> {
        self.outcomes.iter().enumerate().filter_map(|(i, o)| match o {
            ActionOutcome::Skipped(reason) => Some((i, reason)),
            ActionOutcome::Applied => None,
        })
    }

    /// Returns `true` if every action was applied.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(ActionOutcome::is_applied)
    }
}

/// Applies edit scripts to element trees.
///
/// Actions are applied strictly in order and each one resolves its addresses
/// against the tree as mutated by the actions before it, so a script is not
/// commutative and must be replayed exactly as produced. An action whose
/// address misses is skipped with no partial effect and the rest of the
/// script still runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Patcher;

impl Patcher {
    pub fn new() -> Self {
        Self
    }

    /// Apply a script to a copy of `tree`, leaving the input untouched.
    pub fn patch(&self, actions: &[EditAction], tree: &Element) -> (Element, PatchReport) {
        let mut result = tree.clone();
        let report = self.patch_in_place(actions, &mut result);
        (result, report)
    }

    /// Apply a script to `tree` in place.
    pub fn patch_in_place(&self, actions: &[EditAction], tree: &mut Element) -> PatchReport {
        let outcomes = actions
            .iter()
            .map(|action| self.apply_action(action, tree))
            .collect();
        PatchReport { outcomes }
    }

    /// Apply a single action.
    pub fn apply_action(&self, action: &EditAction, tree: &mut Element) -> ActionOutcome {
        let result = match action {
            EditAction::InsertNode { target, position, tag } => {
                insert_child(tree, target, *position, Node::Element(Element::new(tag.clone())))
            }
            EditAction::DeleteNode { node } => delete_node(tree, node),
            EditAction::RenameNode { node, tag } => {
                with_element(tree, node, |e| e.tag = tag.clone())
            }
            EditAction::MoveNode { node, target, position } => {
                move_node(tree, node, target, *position)
            }
            EditAction::UpdateTextIn { node, text } => {
                with_element(tree, node, |e| e.text = text.clone())
            }
            EditAction::UpdateTextAfter { node, text } => {
                with_element(tree, node, |e| e.tail = text.clone())
            }
            EditAction::UpdateAttrib { node, name, value }
            | EditAction::InsertAttrib { node, name, value } => {
                with_element(tree, node, |e| e.set_attr(name.clone(), value.clone()))
            }
            EditAction::DeleteAttrib { node, name } => with_element(tree, node, |e| {
                e.remove_attr(name);
            }),
            EditAction::RenameAttrib { node, old_name, .. } => {
                // A rename can collide with an existing attribute name.
                tracing::warn!(node = %node, old_name = %old_name, "renaming attributes is not supported, skipping");
                Err(SkipReason::Unsupported {
                    kind: action.kind(),
                })
            }
            EditAction::InsertComment { target, position, text } => {
                insert_child(tree, target, *position, Node::Comment(Comment::new(text.clone())))
            }
        };

        match result {
            Ok(()) => ActionOutcome::Applied,
            Err(reason) => {
                tracing::debug!(action = %action, %reason, "skipped edit action");
                ActionOutcome::Skipped(reason)
            }
        }
    }
}

fn resolve(tree: &Element, address: &Address) -> Result<NodePath, SkipReason> {
    address.resolve(tree).ok_or_else(|| SkipReason::Unresolved {
        address: address.clone(),
    })
}

fn with_element(
    tree: &mut Element,
    address: &Address,
    edit: impl FnOnce(&mut Element),
) -> Result<(), SkipReason> {
    let path = resolve(tree, address)?;
    let element = tree
        .descendant_mut(&path)
        .ok_or_else(|| SkipReason::Unresolved {
            address: address.clone(),
        })?;
    edit(element);
    Ok(())
}

fn insert_child(
    tree: &mut Element,
    target: &Address,
    position: usize,
    child: Node,
) -> Result<(), SkipReason> {
    with_element(tree, target, |parent| {
        parent.insert_child(position, child);
    })
}

fn delete_node(tree: &mut Element, address: &Address) -> Result<(), SkipReason> {
    let path = resolve(tree, address)?;
    if path.is_root() {
        return Err(SkipReason::DetachRoot {
            address: address.clone(),
        });
    }
    tree.remove_descendant(&path)
        .map(|_| ())
        .ok_or_else(|| SkipReason::Unresolved {
            address: address.clone(),
        })
}

fn move_node(
    tree: &mut Element,
    node: &Address,
    target: &Address,
    position: usize,
) -> Result<(), SkipReason> {
    // Both ends must resolve before anything is detached.
    let node_path = resolve(tree, node)?;
    let target_path = resolve(tree, target)?;
    if node_path.is_root() {
        return Err(SkipReason::DetachRoot {
            address: node.clone(),
        });
    }
    if target_path.starts_with(&node_path) {
        return Err(SkipReason::MoveIntoSelf {
            node: node.clone(),
            target: target.clone(),
        });
    }

    let target_path = target_path.after_removal_of(&node_path);
    let detached = tree
        .remove_descendant(&node_path)
        .ok_or_else(|| SkipReason::Unresolved {
            address: node.clone(),
        })?;
    match tree.descendant_mut(&target_path) {
        Some(parent) => {
            parent.insert_child(position, detached);
            Ok(())
        }
        None => {
            // Unreachable for a resolved target; put the node back untouched.
            if let Some((parent, index)) = node_path.split_last() {
                if let Some(parent) = tree.descendant_mut(&parent) {
                    parent.insert_child(index, detached);
                }
            }
            Err(SkipReason::Unresolved {
                address: target.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    fn items() -> Element {
        Element::new("Items").with_child(
            Element::new("Item")
                .with_attr("id", "sword_01")
                .with_attr("price", "100")
                .with_child(Element::new("Flag").with_attr("name", "melee"))
                .with_child(Element::new("Pieces"))
                .with_child(Element::new("Flag").with_attr("name", "sharp")),
        )
    }

    fn item(tree: &Element) -> &Element {
        tree.first_element().unwrap()
    }

    #[test]
    fn insert_node_clamps_position() {
        let mut tree = items();
        let report = Patcher::new().patch_in_place(
            &[EditAction::InsertNode {
                target: addr("/Items/Item"),
                position: 99,
                tag: "Flag".into(),
            }],
            &mut tree,
        );
        assert!(report.is_clean());
        let last = item(&tree).elements().last().unwrap();
        assert_eq!(last.tag, "Flag");
        assert!(last.attributes.is_empty());
    }

    #[test]
    fn delete_and_rename_nodes() {
        let mut tree = items();
        let report = Patcher::new().patch_in_place(
            &[
                EditAction::DeleteNode { node: addr("/Items/Item/Flag[1]") },
                EditAction::RenameNode {
                    node: addr("/Items/Item/Pieces"),
                    tag: "Components".into(),
                },
            ],
            &mut tree,
        );
        assert_eq!(report.applied(), 2);
        let tags: Vec<_> = item(&tree).elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["Components", "Flag"]);
    }

    #[test]
    fn later_actions_see_earlier_mutations() {
        let mut tree = items();
        // After deleting Flag[1], the remaining flag is Flag[1].
        let report = Patcher::new().patch_in_place(
            &[
                EditAction::DeleteNode { node: addr("/Items/Item/Flag[1]") },
                EditAction::UpdateAttrib {
                    node: addr("/Items/Item/Flag[1]"),
                    name: "name".into(),
                    value: "blunt".into(),
                },
                EditAction::DeleteAttrib {
                    node: addr("/Items/Item/Flag[2]"),
                    name: "name".into(),
                },
            ],
            &mut tree,
        );
        assert_eq!(report.applied(), 2);
        assert_eq!(
            report.skipped().collect::<Vec<_>>(),
            vec![(2, &SkipReason::Unresolved { address: addr("/Items/Item/Flag[2]") })]
        );
        let flags: Vec<_> = item(&tree).elements().filter(|e| e.tag == "Flag").collect();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].attr("name"), Some("blunt"));
    }

    #[test]
    fn attribute_actions() {
        let mut tree = items();
        let node = addr("/Items/Item");
        Patcher::new().patch_in_place(
            &[
                EditAction::UpdateAttrib { node: node.clone(), name: "price".into(), value: "150".into() },
                EditAction::InsertAttrib { node: node.clone(), name: "weight".into(), value: "2".into() },
                EditAction::DeleteAttrib { node: node.clone(), name: "missing".into() },
                EditAction::DeleteAttrib { node: node.clone(), name: "id".into() },
            ],
            &mut tree,
        );
        let item = item(&tree);
        assert_eq!(item.attr("price"), Some("150"));
        assert_eq!(item.attr("weight"), Some("2"));
        assert_eq!(item.id(), None);
    }

    #[test]
    fn text_actions() {
        let mut tree = items();
        let report = Patcher::new().patch_in_place(
            &[
                EditAction::UpdateTextIn { node: addr("/Items/Item/Pieces"), text: Some("iron".into()) },
                EditAction::UpdateTextAfter { node: addr("/Items/Item/Pieces"), text: Some("\n".into()) },
                EditAction::UpdateTextIn { node: addr("/Items/Item/Pieces"), text: None },
            ],
            &mut tree,
        );
        assert!(report.is_clean());
        let pieces = item(&tree).elements().nth(1).unwrap();
        assert_eq!(pieces.text, None);
        assert_eq!(pieces.tail.as_deref(), Some("\n"));
    }

    #[test]
    fn rename_attrib_is_reported_and_skipped() {
        let mut tree = items();
        let before = tree.clone();
        let report = Patcher::new().patch_in_place(
            &[EditAction::RenameAttrib {
                node: addr("/Items/Item"),
                old_name: "price".into(),
                new_name: "value".into(),
            }],
            &mut tree,
        );
        assert_eq!(
            report.outcomes,
            vec![ActionOutcome::Skipped(SkipReason::Unsupported { kind: "RenameAttrib" })]
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn move_node_within_parent() {
        let mut tree = items();
        let report = Patcher::new().patch_in_place(
            &[EditAction::MoveNode {
                node: addr("/Items/Item/Flag[2]"),
                target: addr("/Items/Item"),
                position: 0,
            }],
            &mut tree,
        );
        assert!(report.is_clean());
        let names: Vec<_> = item(&tree).elements().map(|e| e.attr("name").unwrap_or(e.tag.as_str())).collect();
        assert_eq!(names, vec!["sharp", "melee", "Pieces"]);
    }

    #[test]
    fn move_node_into_later_sibling() {
        let mut tree = items();
        let report = Patcher::new().patch_in_place(
            &[EditAction::MoveNode {
                node: addr("/Items/Item/Flag[1]"),
                target: addr("/Items/Item/Pieces"),
                position: 0,
            }],
            &mut tree,
        );
        assert!(report.is_clean());
        let pieces = item(&tree).elements().find(|e| e.tag == "Pieces").unwrap();
        assert_eq!(pieces.first_element().unwrap().attr("name"), Some("melee"));
        assert_eq!(item(&tree).elements().count(), 2);
    }

    #[test]
    fn move_node_requires_both_addresses() {
        let mut tree = items();
        let before = tree.clone();
        let report = Patcher::new().patch_in_place(
            &[
                EditAction::MoveNode {
                    node: addr("/Items/Item/Flag[1]"),
                    target: addr("/Items/Item/Missing"),
                    position: 0,
                },
                EditAction::MoveNode {
                    node: addr("/Items/Item"),
                    target: addr("/Items/Item/Pieces"),
                    position: 0,
                },
            ],
            &mut tree,
        );
        assert_eq!(report.applied(), 0);
        assert!(matches!(report.outcomes[1], ActionOutcome::Skipped(SkipReason::MoveIntoSelf { .. })));
        assert_eq!(tree, before);
    }

    #[test]
    fn root_cannot_be_deleted() {
        let mut tree = items();
        let report = Patcher::new().patch_in_place(&[EditAction::DeleteNode { node: addr("/Items") }], &mut tree);
        assert!(matches!(report.outcomes[0], ActionOutcome::Skipped(SkipReason::DetachRoot { .. })));
    }

    #[test]
    fn comments_are_invisible_to_addresses() {
        let mut tree = items();
        let report = Patcher::new().patch_in_place(
            &[
                EditAction::InsertComment {
                    target: addr("/Items/Item"),
                    position: 0,
                    text: "patched".into(),
                },
                EditAction::UpdateAttrib {
                    node: addr("/Items/Item/Flag[1]"),
                    name: "name".into(),
                    value: "ranged".into(),
                },
            ],
            &mut tree,
        );
        assert!(report.is_clean());
        let item = item(&tree);
        assert!(matches!(&item.children[0], Node::Comment(c) if c.text == "patched"));
        assert_eq!(item.first_element().unwrap().attr("name"), Some("ranged"));
    }

    #[test]
    fn patch_copy_leaves_input_untouched() {
        let tree = items();
        let (patched, report) = Patcher::new().patch(
            &[EditAction::DeleteNode { node: addr("/Items/Item") }],
            &tree,
        );
        assert!(report.is_clean());
        assert_eq!(patched.elements().count(), 0);
        assert_eq!(tree, items());
    }

    fn arb_address() -> impl Strategy<Value = Address> {
        (
            prop::sample::select(vec!["Other", "Nope", "Item", "Flag"]),
            1usize..4,
        )
            .prop_map(|(tag, position)| Address::root("Items").child("Missing", 1).child(tag, position))
    }

    fn arb_action() -> impl Strategy<Value = EditAction> {
        (arb_address(), arb_address(), 0usize..3).prop_flat_map(|(node, target, position)| {
            prop_oneof![
                Just(EditAction::DeleteNode { node: node.clone() }),
                Just(EditAction::RenameNode { node: node.clone(), tag: "X".into() }),
                Just(EditAction::InsertNode { target: target.clone(), position, tag: "X".into() }),
                Just(EditAction::MoveNode { node: node.clone(), target: target.clone(), position }),
                Just(EditAction::UpdateTextIn { node: node.clone(), text: Some("t".into()) }),
                Just(EditAction::UpdateAttrib { node: node.clone(), name: "a".into(), value: "b".into() }),
                Just(EditAction::DeleteAttrib { node: node.clone(), name: "price".into() }),
                Just(EditAction::InsertComment { target: target.clone(), position, text: "c".into() }),
            ]
        })
    }

    proptest! {
        /// Scripts whose addresses never resolve leave the tree unchanged.
        #[test]
        fn unresolved_scripts_are_noops(script in prop::collection::vec(arb_action(), 0..12)) {
            let tree = items();
            let (patched, report) = Patcher::new().patch(&script, &tree);
            prop_assert_eq!(patched, tree);
            prop_assert_eq!(report.applied(), 0);
            prop_assert_eq!(report.outcomes.len(), script.len());
        }
    }
}
