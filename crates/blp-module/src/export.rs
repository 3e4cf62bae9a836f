//! Writing a merged catalog out as a game module.

use std::path::{Path, PathBuf};

use blp_tree::{Catalog, Element};
use blp_xml::WriteOptions;

use crate::error::{ModuleError, ModuleResult};
use crate::manifest::MANIFEST_FILE;

/// Name (without extension) of the items document inside the generated module.
pub const ITEMS_DOCUMENT: &str = "patchitems";

const GAME_TYPES: [&str; 3] = ["Campaign", "CampaignStoryMode", "CustomGame"];

/// What the generated artifact is called and what it must load after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportMetadata {
    /// Module id and directory name.
    pub name: String,
    /// Human readable name shown by the launcher.
    pub display_name: String,
    /// Base modules followed by the merged sources, in merge order.
    pub dependencies: Vec<String>,
}

impl ExportMetadata {
    /// Metadata with a display name stamped with the current local time.
    pub fn new(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        Self {
            name: name.into(),
            display_name: format!("Generated Items Patch ({stamp})"),
            dependencies,
        }
    }
}

/// Publishes a merged catalog.
pub trait CatalogExporter {
    /// Write `catalog` and return where it landed.
    fn export(&self, catalog: &Catalog, metadata: &ExportMetadata) -> ModuleResult<PathBuf>;
}

/// Exports a catalog as `<modules_dir>/<name>/` with a `SubModule.xml`
/// manifest and a single items document.
#[derive(Clone, Debug)]
pub struct ModuleExporter {
    modules_dir: PathBuf,
    options: WriteOptions,
}

impl ModuleExporter {
    pub fn new(modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            modules_dir: modules_dir.into(),
            options: WriteOptions::default(),
        }
    }

    pub fn module_dir(&self, name: &str) -> PathBuf {
        self.modules_dir.join(name)
    }
}

impl CatalogExporter for ModuleExporter {
    fn export(&self, catalog: &Catalog, metadata: &ExportMetadata) -> ModuleResult<PathBuf> {
        let out = self.module_dir(&metadata.name);
        if out.exists() {
            tracing::info!(path = %out.display(), "removing existing patch module");
            std::fs::remove_dir_all(&out).map_err(|e| ModuleError::io(&out, e))?;
        }

        let data_dir = out.join("ModuleData");
        create_dir(&data_dir)?;
        blp_xml::write_file(out.join(MANIFEST_FILE), &manifest_document(metadata), &self.options)?;
        blp_xml::write_file(
            data_dir.join(format!("{ITEMS_DOCUMENT}.xml")),
            catalog.root(),
            &self.options,
        )?;

        tracing::info!(
            module = %metadata.name,
            entities = catalog.len(),
            dependencies = metadata.dependencies.len(),
            "wrote patch module"
        );
        Ok(out)
    }
}

fn create_dir(path: &Path) -> ModuleResult<()> {
    std::fs::create_dir_all(path).map_err(|e| ModuleError::io(path, e))
}

fn value(tag: &str, value: &str) -> Element {
    Element::new(tag).with_attr("value", value)
}

/// Build the `SubModule.xml` for the generated module.
pub fn manifest_document(metadata: &ExportMetadata) -> Element {
    let dependencies = metadata
        .dependencies
        .iter()
        .fold(Element::new("DependedModules"), |deps, id| {
            deps.with_child(Element::new("DependedModule").with_attr("Id", id.as_str()))
        });
    let game_types = GAME_TYPES
        .iter()
        .fold(Element::new("IncludedGameTypes"), |types, game_type| {
            types.with_child(value("GameType", game_type))
        });

    Element::new("Module")
        .with_child(value("Name", &metadata.display_name))
        .with_child(value("Id", &metadata.name))
        .with_child(value("Version", "v1.4.0"))
        .with_child(value("SingleplayerModule", "true"))
        .with_child(value("MultiplayerModule", "false"))
        .with_child(value("Official", "false"))
        .with_child(dependencies)
        .with_child(Element::new("SubModules"))
        .with_child(
            Element::new("Xmls").with_child(
                Element::new("XmlNode")
                    .with_child(
                        Element::new("XmlName")
                            .with_attr("id", "Items")
                            .with_attr("path", ITEMS_DOCUMENT),
                    )
                    .with_child(game_types),
            ),
        )
}
