//! Tree diff: compute an ordered edit script between two element trees.
//!
//! The differ works on a scratch copy of the base tree and applies each
//! action to it as soon as the action is emitted. Every address in the script
//! is therefore computed against exactly the tree state the action will see
//! when the script is replayed from the start.

use blp_edit::{EditAction, Patcher};
use blp_tree::{normalize_text, Address, Element, NodePath};
use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffOp};

/// Computes edit scripts between trees.
///
/// Implementations must be deterministic for a given pair of trees, and the
/// actions they return must be valid against `base` at the time of the call.
pub trait DiffProvider {
    /// Return the actions that transform `base` into `modified`.
    fn diff(&self, base: &Element, modified: &Element) -> Vec<EditAction>;
}

/// Options for [`TreeDiffer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Treat whitespace-only text and tails as absent.
    pub normalize_whitespace: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
        }
    }
}

/// The default [`DiffProvider`].
///
/// Element children are aligned with a Myers diff over their tag and `id`
/// attribute. Unmatched base children are deleted, unmatched
/// modified children are inserted and then populated, matched pairs are
/// compared recursively. Comments are not diffed.
#[derive(Clone, Debug, Default)]
pub struct TreeDiffer {
    options: DiffOptions,
}

impl TreeDiffer {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    fn text_differs(&self, old: Option<&str>, new: Option<&str>) -> bool {
        if self.options.normalize_whitespace {
            normalize_text(old) != normalize_text(new)
        } else {
            old != new
        }
    }

    fn sync(&self, script: &mut Script, path: &NodePath, target: &Element) -> Option<()> {
        if script.element(path)?.tag != target.tag {
            let node = script.address(path)?;
            script.emit(EditAction::RenameNode {
                node,
                tag: target.tag.clone(),
            });
        }

        let node = script.address(path)?;
        let current = script.element(path)?;

        let mut actions = Vec::new();
        for name in current.attributes.keys() {
            if !target.attributes.contains_key(name) {
                actions.push(EditAction::DeleteAttrib {
                    node: node.clone(),
                    name: name.clone(),
                });
            }
        }
        for (name, value) in &target.attributes {
            match current.attr(name) {
                Some(old) if old == value => {}
                Some(_) => actions.push(EditAction::UpdateAttrib {
                    node: node.clone(),
                    name: name.clone(),
                    value: value.clone(),
                }),
                None => actions.push(EditAction::InsertAttrib {
                    node: node.clone(),
                    name: name.clone(),
                    value: value.clone(),
                }),
            }
        }
        if self.text_differs(current.text.as_deref(), target.text.as_deref()) {
            actions.push(EditAction::UpdateTextIn {
                node: node.clone(),
                text: target.text.clone(),
            });
        }
        if self.text_differs(current.tail.as_deref(), target.tail.as_deref()) {
            actions.push(EditAction::UpdateTextAfter {
                node,
                text: target.tail.clone(),
            });
        }
        for action in actions {
            script.emit(action);
        }

        self.sync_children(script, path, target)
    }

    fn sync_children(&self, script: &mut Script, path: &NodePath, target: &Element) -> Option<()> {
        let current = script.element(path)?;
        let old_raw = current.element_indices();
        let old_keys: Vec<MatchKey<'_>> = current.elements().map(MatchKey::of).collect();
        let new_children: Vec<&Element> = target.elements().collect();
        let new_keys: Vec<MatchKey<'_>> = new_children.iter().map(|e| MatchKey::of(e)).collect();

        let (old_matched, new_matched) = align(&old_keys, &new_keys);

        // Delete from the back so earlier raw indices stay valid.
        for (i, raw) in old_raw.iter().enumerate().rev() {
            if !old_matched[i] {
                let node = script.address(&path.child(*raw))?;
                script.emit(EditAction::DeleteNode { node });
            }
        }

        // Element children 0..j now mirror the target's; the remaining ones
        // are the matched base children, still in order.
        for (j, child) in new_children.iter().enumerate() {
            let elements = script.element(path)?.element_indices();
            if new_matched[j] {
                let raw = *elements.get(j)?;
                self.sync(script, &path.child(raw), child)?;
            } else {
                let position = match elements.get(j) {
                    Some(&raw) => raw,
                    None => script.element(path)?.children.len(),
                };
                let target_address = script.address(path)?;
                script.emit(EditAction::InsertNode {
                    target: target_address,
                    position,
                    tag: child.tag.clone(),
                });
                self.sync(script, &path.child(position), child)?;
            }
        }
        Some(())
    }
}

impl DiffProvider for TreeDiffer {
    fn diff(&self, base: &Element, modified: &Element) -> Vec<EditAction> {
        let mut script = Script::new(base.clone());
        if self.sync(&mut script, &NodePath::root(), modified).is_none() {
            tracing::warn!(root = %base.tag, "diff lost track of its scratch tree, script is partial");
        }
        script.actions
    }
}

/// Mark which items of `old` and `new` are kept by a Myers diff of the two.
fn align<T: Eq + std::hash::Hash + Ord>(old: &[T], new: &[T]) -> (Vec<bool>, Vec<bool>) {
    let mut old_matched = vec![false; old.len()];
    let mut new_matched = vec![false; new.len()];
    for op in capture_diff_slices(Algorithm::Myers, old, new) {
        if let DiffOp::Equal {
            old_index,
            new_index,
            len,
        } = op
        {
            old_matched[old_index..old_index + len].fill(true);
            new_matched[new_index..new_index + len].fill(true);
        }
    }
    (old_matched, new_matched)
}

/// Identity used to align children: the tag and, when present, the id.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct MatchKey<'a> {
    tag: &'a str,
    id: Option<&'a str>,
}

impl<'a> MatchKey<'a> {
    fn of(element: &'a Element) -> Self {
        Self {
            tag: &element.tag,
            id: element.id(),
        }
    }
}

/// The script under construction and the scratch tree it has been applied to.
struct Script {
    scratch: Element,
    actions: Vec<EditAction>,
    patcher: Patcher,
}

impl Script {
    fn new(scratch: Element) -> Self {
        Self {
            scratch,
            actions: Vec::new(),
            patcher: Patcher::new(),
        }
    }

    fn element(&self, path: &NodePath) -> Option<&Element> {
        self.scratch.descendant(path)
    }

    fn address(&self, path: &NodePath) -> Option<Address> {
        Address::of(&self.scratch, path)
    }

    fn emit(&mut self, action: EditAction) {
        self.patcher.apply_action(&action, &mut self.scratch);
        self.actions.push(action);
    }
}
