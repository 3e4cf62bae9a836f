//! Loading catalogs and sources from an installed game.

use std::path::Path;

use blp_merge::Source;
use blp_tree::Catalog;

use crate::config::MergeConfig;
use crate::error::{ModuleError, ModuleResult};
use crate::manifest::ModuleManifest;

/// Load the canonical base catalog named by `config`.
pub fn load_base(config: &MergeConfig) -> ModuleResult<Catalog> {
    let path = config.base_items_path();
    if !path.is_file() {
        return Err(ModuleError::MissingBaseDocument(path));
    }
    let catalog = blp_xml::read_catalog(&path, &config.entity_tag)?;
    tracing::info!(path = %path.display(), entities = catalog.len(), "loaded base catalog");
    Ok(catalog)
}

/// Load every items document module `id` declares.
///
/// Declared documents that don't exist are skipped with a warning.
pub fn load_source(modules_dir: &Path, id: &str, rank: usize, entity_tag: &str) -> ModuleResult<Source> {
    let manifest = ModuleManifest::load(modules_dir.join(id))?;
    let mut source = Source::new(id, rank);
    for path in &manifest.items {
        if !path.is_file() {
            tracing::warn!(module = id, path = %path.display(), "declared items document not found, skipping");
            continue;
        }
        source.push_document(blp_xml::read_catalog(path, entity_tag)?);
    }
    tracing::debug!(
        module = id,
        documents = source.documents().len(),
        entities = source.entity_count(),
        "loaded source"
    );
    Ok(source)
}

/// Load `ids` as sources ranked in the given order.
pub fn load_sources(modules_dir: &Path, ids: &[String], entity_tag: &str) -> ModuleResult<Vec<Source>> {
    ids.iter()
        .enumerate()
        .map(|(rank, id)| load_source(modules_dir, id, rank, entity_tag))
        .collect()
}
