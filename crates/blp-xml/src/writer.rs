//! Serializing element trees.

use std::path::Path;

use blp_tree::{normalize_text, Element, Node};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{XmlError, XmlResult};

/// Output formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Re-indent the tree before writing. Only whitespace-only or missing
    /// text and tails are touched.
    pub pretty: bool,
    /// One level of indentation.
    pub indent: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "    ".to_string(),
        }
    }
}

impl WriteOptions {
    /// Write the tree exactly as it is.
    pub fn verbatim() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }
}

/// Serialize a tree with a UTF-8 declaration.
pub fn to_string(root: &Element, options: &WriteOptions) -> XmlResult<String> {
    let indented;
    let root = if options.pretty {
        let mut copy = root.clone();
        indent(&mut copy, &options.indent);
        indented = copy;
        &indented
    } else {
        root
    };

    let mut writer = Writer::new(Vec::new());
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    emit(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;
    write_element(&mut writer, root, false)?;
    emit(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
}

/// Serialize a tree and write it to `path`, replacing any existing file.
pub fn write_file(path: impl AsRef<Path>, root: &Element, options: &WriteOptions) -> XmlResult<()> {
    let path = path.as_ref();
    let output = to_string(root, options)?;
    std::fs::write(path, output).map_err(|e| XmlError::io(path, e))?;
    tracing::debug!(path = %path.display(), root = %root.tag, "wrote document");
    Ok(())
}

/// Re-indent `root` in place, one `space` per nesting level.
pub fn indent(root: &mut Element, space: &str) {
    indent_children(root, space, 0);
}

fn indent_children(element: &mut Element, space: &str, level: usize) {
    if element.children.is_empty() {
        return;
    }
    let child_indent = format!("\n{}", space.repeat(level + 1));
    if normalize_text(element.text.as_deref()).is_none() {
        element.text = Some(child_indent.clone());
    }

    let last = element.children.len() - 1;
    for (i, child) in element.children.iter_mut().enumerate() {
        if let Node::Element(nested) = child {
            indent_children(nested, space, level + 1);
        }
        if normalize_text(child.tail()).is_none() {
            let tail = if i == last {
                format!("\n{}", space.repeat(level))
            } else {
                child_indent.clone()
            };
            child.set_tail(Some(tail));
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element, with_tail: bool) -> XmlResult<()> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        emit(writer, Event::Empty(start))?;
    } else {
        emit(writer, Event::Start(start))?;
        if let Some(text) = &element.text {
            emit(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &element.children {
            match child {
                Node::Element(nested) => write_element(writer, nested, true)?,
                Node::Comment(comment) => {
                    emit(writer, Event::Comment(BytesText::from_escaped(comment.text.as_str())))?;
                    if let Some(tail) = &comment.tail {
                        emit(writer, Event::Text(BytesText::new(tail)))?;
                    }
                }
            }
        }
        emit(writer, Event::End(BytesEnd::new(element.tag.as_str())))?;
    }

    if with_tail {
        if let Some(tail) = &element.tail {
            emit(writer, Event::Text(BytesText::new(tail)))?;
        }
    }
    Ok(())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> XmlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}
