//! Owned document tree: elements, comments, and their text.
//!
//! Text follows the usual XML infoset split: an element's `text` is the
//! character data before its first child, and each child's `tail` is the
//! character data between that child's end and the next sibling.

use indexmap::IndexMap;

use crate::address::NodePath;

/// A child of an element: either another element or a comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Comment(Comment),
}

impl Node {
    /// Borrow the node as an element, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Comment(_) => None,
        }
    }

    /// Mutably borrow the node as an element, if it is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Comment(_) => None,
        }
    }

    /// Consume the node, returning the element it holds.
    pub fn into_element(self) -> Option<Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Comment(_) => None,
        }
    }

    /// The character data following this node in its parent.
    pub fn tail(&self) -> Option<&str> {
        match self {
            Self::Element(element) => element.tail.as_deref(),
            Self::Comment(comment) => comment.tail.as_deref(),
        }
    }

    /// Replace the character data following this node.
    pub fn set_tail(&mut self, tail: Option<String>) {
        match self {
            Self::Element(element) => element.tail = tail,
            Self::Comment(comment) => comment.tail = tail,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Comment> for Node {
    fn from(comment: Comment) -> Self {
        Self::Comment(comment)
    }
}

/// A comment node. Comments carry no attributes and are invisible to
/// address resolution and entity lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub tail: Option<String>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tail: None,
        }
    }
}

/// A tagged element with ordered attributes, text, tail, and children.
///
/// Attribute equality is order-insensitive; the order is kept only so
/// documents serialize back the way they were read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder: set an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: set the leading text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: set the trailing text.
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, creating it at the end if absent.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute, keeping the order of the remaining ones.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// The `id` attribute, if present.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Iterate over element children, skipping comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Raw child indices of the element children, in order.
    pub fn element_indices(&self) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Element(_)))
            .map(|(index, _)| index)
            .collect()
    }

    /// The first element child, if any.
    pub fn first_element(&self) -> Option<&Element> {
        self.elements().next()
    }

    /// Every element below this one, depth first in document order.
    pub fn descendants(&self) -> impl Iterator<Item = &Element> {
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let start = stack.len();
            stack.extend(next.elements());
            stack[start..].reverse();
            Some(next)
        })
    }

    /// Insert a child at `position`, clamping to the end of the child list.
    ///
    /// Returns the index the child actually landed at.
    pub fn insert_child(&mut self, position: usize, child: impl Into<Node>) -> usize {
        let index = position.min(self.children.len());
        self.children.insert(index, child.into());
        index
    }

    /// Follow raw child indices down from this element.
    ///
    /// Every index must land on an element; an empty path is `self`.
    pub fn descendant(&self, path: &NodePath) -> Option<&Element> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.children.get(index)?.as_element())
    }

    /// Mutable variant of [`Element::descendant`].
    pub fn descendant_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        path.indices().iter().try_fold(self, |node, &index| {
            node.children.get_mut(index)?.as_element_mut()
        })
    }

    /// Detach the node at `path` from its parent.
    ///
    /// The root cannot be detached, so an empty path yields `None`.
    pub fn remove_descendant(&mut self, path: &NodePath) -> Option<Node> {
        let (parent, index) = path.split_last()?;
        let parent = self.descendant_mut(&parent)?;
        if index < parent.children.len() {
            Some(parent.children.remove(index))
        } else {
            None
        }
    }

    /// Structural equivalence used for diff round-trips.
    ///
    /// Comments are ignored. With `normalize_whitespace`, text and tails
    /// made only of whitespace compare equal to absent text.
    pub fn equivalent(&self, other: &Element, normalize_whitespace: bool) -> bool {
        let text_eq = |a: Option<&str>, b: Option<&str>| {
            if normalize_whitespace {
                normalize_text(a) == normalize_text(b)
            } else {
                a == b
            }
        };

        self.tag == other.tag
            && self.attributes == other.attributes
            && text_eq(self.text.as_deref(), other.text.as_deref())
            && text_eq(self.tail.as_deref(), other.tail.as_deref())
            && self.elements().count() == other.elements().count()
            && self
                .elements()
                .zip(other.elements())
                .all(|(a, b)| a.equivalent(b, normalize_whitespace))
    }

    /// Strip whitespace-only text and tails from the whole subtree.
    pub fn strip_whitespace(&mut self) {
        if normalize_text(self.text.as_deref()).is_none() {
            self.text = None;
        }
        if normalize_text(self.tail.as_deref()).is_none() {
            self.tail = None;
        }
        for child in &mut self.children {
            match child {
                Node::Element(element) => element.strip_whitespace(),
                Node::Comment(comment) => {
                    if normalize_text(comment.tail.as_deref()).is_none() {
                        comment.tail = None;
                    }
                }
            }
        }
    }
}

/// Treat whitespace-only text as absent.
pub fn normalize_text(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}
