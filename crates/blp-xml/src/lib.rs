//! XML persistence for blpatch.
//!
//! Reads documents into [`blp_tree::Element`] trees and writes them back.
//! Elements, attributes (in document order), text, tails, CDATA and comments
//! survive a read/write cycle; declarations, processing instructions and
//! doctypes are dropped on read and a UTF-8 declaration is always written.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{XmlError, XmlResult};
pub use reader::{parse_file, parse_str, read_catalog};
pub use writer::{indent, to_string, write_file, WriteOptions};
