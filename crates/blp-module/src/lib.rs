//! Glue between the merge engine and an installed game.
//!
//! - [`MergeConfig`]: where the game lives and what the generated module is called
//! - [`ModuleManifest`]: a module's `SubModule.xml` and the items documents it declares
//! - [`LauncherData`]: the launcher's record of selected modules and their load order
//! - [`load_base`] / [`load_source`]: turn documents on disk into catalogs and sources
//! - [`ModuleExporter`]: write the merged catalog out as a loadable module

pub mod config;
pub mod error;
pub mod export;
pub mod launcher;
pub mod loader;
pub mod manifest;

pub use config::{default_launcher_data, MergeConfig, BASE_MODULES};
pub use error::{ModuleError, ModuleResult};
pub use export::{manifest_document, CatalogExporter, ExportMetadata, ModuleExporter, ITEMS_DOCUMENT};
pub use launcher::{LauncherData, ModSelection};
pub use loader::{load_base, load_source, load_sources};
pub use manifest::{ModuleManifest, MANIFEST_FILE};
