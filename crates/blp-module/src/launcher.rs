//! The launcher's selection record (`LauncherData.xml`).
//!
//! The launcher stores every known single-player module as a `UserModData`
//! entry under `SingleplayerData/ModDatas`, in load order, with an
//! `IsSelected` flag. The whole document is kept so that saving it back
//! only changes the entries we touch.

use std::path::{Path, PathBuf};

use blp_tree::{Element, Node};
use blp_xml::WriteOptions;

use crate::error::{ModuleError, ModuleResult};
use crate::manifest::ModuleManifest;

const USER_MOD_DATA: &str = "UserModData";

/// One module entry in the selection record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModSelection {
    pub id: String,
    pub selected: bool,
}

#[derive(Clone, Debug)]
pub struct LauncherData {
    path: PathBuf,
    root: Element,
}

impl LauncherData {
    pub fn load(path: impl AsRef<Path>) -> ModuleResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModuleError::MissingLauncherData(path.to_path_buf()));
        }
        let root = blp_xml::parse_file(path)?;
        Ok(Self::from_root(path, root))
    }

    pub fn from_root(path: impl Into<PathBuf>, root: Element) -> Self {
        Self {
            path: path.into(),
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Module entries in load order. Entries without an id are ignored.
    pub fn entries(&self) -> Vec<ModSelection> {
        let Some(mod_datas) = self.mod_datas() else {
            return Vec::new();
        };
        mod_datas
            .elements()
            .filter(|e| e.tag == USER_MOD_DATA)
            .filter_map(|entry| {
                Some(ModSelection {
                    id: child_text(entry, "Id")?.to_string(),
                    selected: child_text(entry, "IsSelected") == Some("true"),
                })
            })
            .collect()
    }

    /// Selected, non-official modules in load order, excluding the generated
    /// module itself.
    ///
    /// Modules without a manifest under `modules_dir` are skipped with a
    /// warning; the launcher remembers modules that have since been removed.
    pub fn selected_sources(&self, modules_dir: &Path, patch_name: &str) -> ModuleResult<Vec<String>> {
        let mut sources = Vec::new();
        for entry in self.entries() {
            if !entry.selected || entry.id == patch_name {
                continue;
            }
            let manifest = match ModuleManifest::load(modules_dir.join(&entry.id)) {
                Ok(manifest) => manifest,
                Err(ModuleError::MissingManifest(path)) => {
                    tracing::warn!(module = %entry.id, path = %path.display(), "module manifest not found, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if manifest.official {
                tracing::debug!(module = %entry.id, "skipping official module");
                continue;
            }
            sources.push(entry.id);
        }
        Ok(sources)
    }

    /// Make `patch_name` the last selected entry, replacing any previous
    /// entry for it.
    pub fn register(&mut self, patch_name: &str) -> ModuleResult<()> {
        let path = self.path.clone();
        let mod_datas = self
            .mod_datas_mut()
            .ok_or_else(|| ModuleError::InvalidLauncherData {
                path,
                reason: "no SingleplayerData/ModDatas section".to_string(),
            })?;

        mod_datas.children.retain(|node| {
            !node
                .as_element()
                .is_some_and(|e| e.tag == USER_MOD_DATA && child_text(e, "Id") == Some(patch_name))
        });
        mod_datas.children.push(
            Element::new(USER_MOD_DATA)
                .with_child(Element::new("Id").with_text(patch_name))
                .with_child(Element::new("IsSelected").with_text("true"))
                .into(),
        );
        tracing::debug!(patch_name, "registered generated module");
        Ok(())
    }

    /// Write the record back to where it was loaded from.
    pub fn save(&self) -> ModuleResult<()> {
        blp_xml::write_file(&self.path, &self.root, &WriteOptions::default())?;
        Ok(())
    }

    fn mod_datas(&self) -> Option<&Element> {
        self.root
            .elements()
            .find(|e| e.tag == "SingleplayerData")?
            .elements()
            .find(|e| e.tag == "ModDatas")
    }

    fn mod_datas_mut(&mut self) -> Option<&mut Element> {
        child_mut(child_mut(&mut self.root, "SingleplayerData")?, "ModDatas")
    }
}

fn child_text<'a>(element: &'a Element, tag: &str) -> Option<&'a str> {
    element
        .elements()
        .find(|e| e.tag == tag)?
        .text
        .as_deref()
        .map(str::trim)
}

fn child_mut<'a>(element: &'a mut Element, tag: &str) -> Option<&'a mut Element> {
    element
        .children
        .iter_mut()
        .filter_map(Node::as_element_mut)
        .find(|e| e.tag == tag)
}
