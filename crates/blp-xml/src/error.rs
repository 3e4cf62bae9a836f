//! Error types for XML persistence.

use std::path::PathBuf;

/// Errors that can occur while reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// Reading or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not well-formed.
    #[error("malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),

    /// An attribute could not be parsed.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A name or comment is not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The document ended with elements still open.
    #[error("unclosed element <{0}>")]
    Unclosed(String),

    /// A closing tag with no matching opening tag.
    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    /// More than one top-level element.
    #[error("document has more than one root element (second is <{0}>)")]
    MultipleRoots(String),

    /// No root element at all.
    #[error("document has no root element")]
    Empty,

    /// Serialization failed.
    #[error("write error: {0}")]
    Write(String),
}

impl XmlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for XML results.
pub type XmlResult<T> = Result<T, XmlError>;
