use std::path::PathBuf;

use blp_tree::TreeError;
use blp_xml::XmlError;

/// Errors raised while locating, reading or writing game modules.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("{} doesn't appear to be a valid game directory", .0.display())]
    InvalidBaseDir(PathBuf),

    #[error("base items document {} doesn't exist", .0.display())]
    MissingBaseDocument(PathBuf),

    #[error("couldn't find launcher data at {}; run the launcher once to generate it", .0.display())]
    MissingLauncherData(PathBuf),

    #[error("no documents directory on this system; pass the launcher data path explicitly")]
    NoDocumentsDir,

    #[error("module manifest {} not found", .0.display())]
    MissingManifest(PathBuf),

    #[error("launcher data {}: {reason}", path.display())]
    InvalidLauncherData { path: PathBuf, reason: String },

    #[error("config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Catalog(#[from] TreeError),
}

impl ModuleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ModuleResult<T> = Result<T, ModuleError>;
