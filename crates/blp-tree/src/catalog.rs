//! Entity catalogs: a document root plus an id index over its entities.

use indexmap::IndexMap;

use crate::address::NodePath;
use crate::element::{Element, Node};
use crate::error::{TreeError, TreeResult};

/// Attribute that identifies an entity.
pub const ENTITY_ID_ATTR: &str = "id";

/// An ordered collection of entity elements under one root.
///
/// Entities are elements whose tag equals the catalog's entity tag and that
/// carry an `id` attribute. The id index finds them anywhere below the root,
/// but not inside another entity, and holds at most one entity per id: when a
/// document repeats an id, the first occurrence wins. [`Catalog::occurrences`]
/// sees every entity element, repeats and nested ones included.
#[derive(Clone, Debug)]
pub struct Catalog {
    root: Element,
    entity_tag: String,
    index: IndexMap<String, NodePath>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(root_tag: impl Into<String>, entity_tag: impl Into<String>) -> Self {
        Self::from_root(Element::new(root_tag), entity_tag)
    }

    /// Wrap an existing document root and index its entities.
    pub fn from_root(root: Element, entity_tag: impl Into<String>) -> Self {
        let mut catalog = Self {
            root,
            entity_tag: entity_tag.into(),
            index: IndexMap::new(),
        };
        catalog.reindex();
        catalog
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        let path = self.index.get(id)?;
        self.root.descendant(path)
    }

    /// Mutable access to an entity.
    ///
    /// If the caller changes the entity's `id`, it must call
    /// [`Catalog::reindex`] afterwards.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        let path = self.index.get(id)?;
        self.root.descendant_mut(path)
    }

    /// Every entity element in document order, depth first.
    ///
    /// Unlike the id index, repeated ids and entities nested inside other
    /// entities are all yielded.
    pub fn occurrences(&self) -> impl Iterator<Item = &Element> {
        self.root
            .descendants()
            .filter(move |e| e.tag == self.entity_tag && e.attr(ENTITY_ID_ATTR).is_some())
    }

    /// Append an entity to the end of the root.
    pub fn insert(&mut self, entity: Element) -> TreeResult<()> {
        if entity.tag != self.entity_tag {
            return Err(TreeError::UnexpectedEntityTag {
                expected: self.entity_tag.clone(),
                actual: entity.tag,
            });
        }
        let id = entity
            .id()
            .ok_or_else(|| TreeError::MissingEntityId {
                tag: entity.tag.clone(),
            })?
            .to_string();
        if self.index.contains_key(&id) {
            return Err(TreeError::DuplicateEntity(id));
        }

        let path = NodePath::root().child(self.root.children.len());
        self.root.children.push(Node::Element(entity));
        self.index.insert(id, path);
        Ok(())
    }

    /// Detach an entity from the document.
    pub fn remove(&mut self, id: &str) -> Option<Element> {
        let path = self.index.get(id)?.clone();
        let removed = self.root.remove_descendant(&path)?.into_element();
        self.reindex();
        removed
    }

    /// Rebuild the id index from the document.
    pub fn reindex(&mut self) {
        self.index.clear();
        collect_entities(&self.root, &NodePath::root(), &self.entity_tag, &mut self.index);
    }
}

fn collect_entities(
    node: &Element,
    path: &NodePath,
    entity_tag: &str,
    index: &mut IndexMap<String, NodePath>,
) {
    for (i, child) in node.children.iter().enumerate() {
        let Node::Element(element) = child else {
            continue;
        };
        let child_path = path.child(i);
        if element.tag == entity_tag {
            if let Some(id) = element.attr(ENTITY_ID_ATTR) {
                index.entry(id.to_string()).or_insert(child_path);
                continue;
            }
        }
        collect_entities(element, &child_path, entity_tag, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Comment;

    fn item(id: &str) -> Element {
        Element::new("Item").with_attr("id", id)
    }

    fn document() -> Element {
        Element::new("Items")
            .with_child(Comment::new("weapons"))
            .with_child(item("sword_01").with_attr("price", "100"))
            .with_child(Element::new("Group").with_child(item("bow_02")))
            .with_child(item("sword_01").with_attr("price", "999"))
            .with_child(Element::new("Item"))
    }

    #[test]
    fn indexes_nested_entities_first_wins() {
        let catalog = Catalog::from_root(document(), "Item");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["sword_01", "bow_02"]);
        assert_eq!(catalog.get("sword_01").unwrap().attr("price"), Some("100"));
        assert!(catalog.contains("bow_02"));
        assert!(!catalog.contains("shield_07"));
    }

    #[test]
    fn occurrences_include_repeats_and_nested() {
        let root = document().with_child(item("bundle").with_child(item("arrow_04")));
        let catalog = Catalog::from_root(root, "Item");
        let seen: Vec<_> = catalog
            .occurrences()
            .map(|e| (e.id().unwrap(), e.attr("price")))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("sword_01", Some("100")),
                ("bow_02", None),
                ("sword_01", Some("999")),
                ("bundle", None),
                ("arrow_04", None),
            ]
        );
        assert!(!catalog.contains("arrow_04"));
    }

    #[test]
    fn insert_appends_and_indexes() {
        let mut catalog = Catalog::new("Items", "Item");
        assert!(catalog.is_empty());
        catalog.insert(item("shield_07")).unwrap();
        catalog.insert(item("axe_03")).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.root().children.len(), 2);
        assert_eq!(catalog.get("axe_03").unwrap().id(), Some("axe_03"));
    }

    #[test]
    fn insert_rejects_bad_entities() {
        let mut catalog = Catalog::from_root(document(), "Item");
        assert_eq!(
            catalog.insert(item("sword_01")),
            Err(TreeError::DuplicateEntity("sword_01".into()))
        );
        assert!(matches!(
            catalog.insert(Element::new("Item")),
            Err(TreeError::MissingEntityId { .. })
        ));
        assert!(matches!(
            catalog.insert(Element::new("Horse").with_attr("id", "h")),
            Err(TreeError::UnexpectedEntityTag { .. })
        ));
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut catalog = Catalog::from_root(document(), "Item");
        catalog.get_mut("bow_02").unwrap().set_attr("price", "40");
        let group = catalog.root().descendant(&NodePath::from(vec![2])).unwrap();
        assert_eq!(group.first_element().unwrap().attr("price"), Some("40"));
    }

    #[test]
    fn remove_reindexes_siblings() {
        let mut catalog = Catalog::from_root(document(), "Item");
        let removed = catalog.remove("sword_01").unwrap();
        assert_eq!(removed.attr("price"), Some("100"));
        // The duplicate further down becomes the indexed sword_01.
        assert_eq!(catalog.get("sword_01").unwrap().attr("price"), Some("999"));
        assert_eq!(catalog.get("bow_02").unwrap().id(), Some("bow_02"));
        assert!(catalog.remove("missing").is_none());
    }

    #[test]
    fn reindex_after_id_change() {
        let mut catalog = Catalog::from_root(document(), "Item");
        catalog.get_mut("bow_02").unwrap().set_attr("id", "bow_03");
        catalog.reindex();
        assert!(catalog.contains("bow_03"));
        assert!(!catalog.contains("bow_02"));
    }
}
