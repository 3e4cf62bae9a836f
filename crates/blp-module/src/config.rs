use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModuleError, ModuleResult};

/// Modules the game ships with. The generated module depends on all of them.
pub const BASE_MODULES: [&str; 5] = ["Native", "SandBoxCore", "SandBox", "CustomBattle", "StoryMode"];

/// Configuration for a merge run.
///
/// Every field has a default, so a config file only needs to name what it
/// changes. Command-line flags are applied on top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Game installation directory (the one containing `Modules`).
    pub base_dir: PathBuf,
    /// Id and directory name of the generated module.
    pub patch_name: String,
    /// Modules the generated module depends on ahead of the merged sources.
    pub base_modules: Vec<String>,
    /// Canonical items document, relative to `Modules`.
    pub base_items: PathBuf,
    /// Tag of the records being merged.
    pub entity_tag: String,
    /// Launcher data location. Falls back to [`default_launcher_data`].
    pub launcher_data: Option<PathBuf>,
    /// Treat whitespace-only text as absent when diffing.
    pub normalize_whitespace: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(r"C:\Program Files (x86)\Steam\steamapps\common\Mount & Blade II Bannerlord"),
            patch_name: "zzzzMergedPatch".to_string(),
            base_modules: BASE_MODULES.iter().map(|m| m.to_string()).collect(),
            base_items: ["SandBoxCore", "ModuleData", "spitems.xml"].iter().collect(),
            entity_tag: "Item".to_string(),
            launcher_data: None,
            normalize_whitespace: true,
        }
    }
}

impl MergeConfig {
    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ModuleResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ModuleError::io(path, e))?;
        toml::from_str(&raw).map_err(|source| ModuleError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.base_dir.join("Modules")
    }

    pub fn base_items_path(&self) -> PathBuf {
        self.modules_dir().join(&self.base_items)
    }

    pub fn launcher_data_path(&self) -> ModuleResult<PathBuf> {
        match &self.launcher_data {
            Some(path) => Ok(path.clone()),
            None => default_launcher_data().ok_or(ModuleError::NoDocumentsDir),
        }
    }

    /// Check that the game directory and the base items document exist.
    pub fn validate(&self) -> ModuleResult<()> {
        if !self.base_dir.is_dir() {
            return Err(ModuleError::InvalidBaseDir(self.base_dir.clone()));
        }
        let base_items = self.base_items_path();
        if !base_items.is_file() {
            return Err(ModuleError::MissingBaseDocument(base_items));
        }
        Ok(())
    }
}

/// Where the launcher keeps its selection record on this system.
pub fn default_launcher_data() -> Option<PathBuf> {
    dirs::document_dir().map(|docs| {
        docs.join("Mount and Blade II Bannerlord")
            .join("Configs")
            .join("LauncherData.xml")
    })
}
