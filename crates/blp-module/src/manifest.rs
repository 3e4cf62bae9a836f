//! Module manifests (`SubModule.xml`).

use std::path::{Path, PathBuf};

use blp_tree::Element;

use crate::error::{ModuleError, ModuleResult};

pub const MANIFEST_FILE: &str = "SubModule.xml";

/// The parts of a module manifest the merge needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleManifest {
    pub dir: PathBuf,
    pub id: Option<String>,
    /// Official modules ship with the game and are never merged as sources.
    pub official: bool,
    /// Items documents declared by the module, in declaration order.
    pub items: Vec<PathBuf>,
}

impl ModuleManifest {
    /// Read `<dir>/SubModule.xml`.
    pub fn load(dir: impl AsRef<Path>) -> ModuleResult<Self> {
        let dir = dir.as_ref();
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(ModuleError::MissingManifest(path));
        }
        let root = blp_xml::parse_file(&path)?;
        Ok(Self::from_root(dir, &root))
    }

    pub fn from_root(dir: impl Into<PathBuf>, root: &Element) -> Self {
        let dir = dir.into();
        let mut items = Vec::new();
        collect_items(root, &dir, &mut items);
        Self {
            id: value_of(root, "Id").map(str::to_string),
            official: value_of(root, "Official") == Some("true"),
            items,
            dir,
        }
    }
}

/// `<Tag value="..."/>` directly under the manifest root.
fn value_of<'a>(root: &'a Element, tag: &str) -> Option<&'a str> {
    root.elements().find(|e| e.tag == tag)?.attr("value")
}

fn collect_items(element: &Element, dir: &Path, items: &mut Vec<PathBuf>) {
    for child in element.elements() {
        if child.tag == "XmlName" && child.attr("id") == Some("Items") {
            if let Some(path) = child.attr("path") {
                items.push(dir.join("ModuleData").join(format!("{path}.xml")));
            }
        }
        collect_items(child, dir, items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Module>
    <Name value="Better Swords"/>
    <Id value="BetterSwords"/>
    <Official value="false"/>
    <Xmls>
        <XmlNode>
            <XmlName id="Items" path="swords"/>
        </XmlNode>
        <XmlNode>
            <XmlName id="NPCCharacters" path="lords"/>
        </XmlNode>
        <XmlNode>
            <XmlName id="Items" path="shields"/>
        </XmlNode>
    </Xmls>
</Module>
"#;

    #[test]
    fn reads_items_documents_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), MANIFEST).unwrap();

        let manifest = ModuleManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.id.as_deref(), Some("BetterSwords"));
        assert!(!manifest.official);
        assert_eq!(
            manifest.items,
            vec![
                dir.path().join("ModuleData").join("swords.xml"),
                dir.path().join("ModuleData").join("shields.xml"),
            ]
        );
    }

    #[test]
    fn official_flag() {
        let root = blp_xml::parse_str(r#"<Module><Id value="Native"/><Official value="true"/></Module>"#).unwrap();
        let manifest = ModuleManifest::from_root("Native", &root);
        assert!(manifest.official);
        assert!(manifest.items.is_empty());
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModuleManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ModuleError::MissingManifest(p) if p.ends_with(MANIFEST_FILE)));
    }
}
