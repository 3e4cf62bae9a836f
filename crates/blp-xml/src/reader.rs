//! Parsing documents into element trees.

use std::path::Path;

use blp_tree::{Catalog, Comment, Element, Node};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{XmlError, XmlResult};

/// Parse a document from a string.
///
/// Whitespace is kept verbatim in `text` and `tail` so that a document can be
/// written back without losing its layout. Text outside the root element is
/// discarded.
pub fn parse_str(input: &str) -> XmlResult<Element> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                attach(&mut stack, &mut root, element.into())?;
            }
            Event::End(end) => {
                let name = std::str::from_utf8(end.name().as_ref())?.to_string();
                let element = stack.pop().ok_or(XmlError::UnexpectedEnd(name))?;
                attach(&mut stack, &mut root, element.into())?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                append_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)?;
                append_text(&mut stack, text);
            }
            Event::Comment(comment) => {
                let text = std::str::from_utf8(&comment)?;
                attach(&mut stack, &mut root, Comment::new(text).into())?;
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.tag));
    }
    root.ok_or(XmlError::Empty)
}

/// Read and parse a document from disk.
pub fn parse_file(path: impl AsRef<Path>) -> XmlResult<Element> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|e| XmlError::io(path, e))?;
    let root = parse_str(&input)?;
    tracing::debug!(path = %path.display(), root = %root.tag, "parsed document");
    Ok(root)
}

/// Read a document and index its `entity_tag` elements by id.
pub fn read_catalog(path: impl AsRef<Path>, entity_tag: &str) -> XmlResult<Catalog> {
    let catalog = Catalog::from_root(parse_file(path)?, entity_tag);
    tracing::debug!(entities = catalog.len(), entity_tag, "indexed catalog");
    Ok(catalog)
}

fn element_from(start: &BytesStart<'_>) -> XmlResult<Element> {
    let name = start.name();
    let tag = std::str::from_utf8(name.as_ref())?;
    let mut element = Element::new(tag);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let name = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.set_attr(name, value);
    }
    Ok(element)
}

/// Hand a finished node to its parent, or make it the document root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> XmlResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    // Top level: comments are dropped, the first element is the root.
    let Node::Element(element) = node else {
        return Ok(());
    };
    match root {
        Some(_) => Err(XmlError::MultipleRoots(element.tag)),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

/// Text belongs to the open element until it has children, then to the
/// last child's tail.
fn append_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    match parent.children.last_mut() {
        Some(child) => {
            let tail = format!("{}{}", child.tail().unwrap_or_default(), text);
            child.set_tail(Some(tail));
        }
        None => parent.text.get_or_insert_with(String::new).push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attributes_in_order() {
        let root = parse_str(r#"<Items><Item id="sword_01" price="100" weight="3"/></Items>"#).unwrap();
        let item = root.first_element().unwrap();
        let names: Vec<_> = item.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id", "price", "weight"]);
        assert_eq!(item.id(), Some("sword_01"));
    }

    #[test]
    fn element_names_survive_nesting() {
        let root = parse_str("<Items><Item id=\"a\"><ItemComponent><Weapon/></ItemComponent></Item></Items>").unwrap();
        assert_eq!(root.tag, "Items");
        let item = root.first_element().unwrap();
        assert_eq!(item.tag, "Item");
        let component = item.first_element().unwrap();
        assert_eq!(component.tag, "ItemComponent");
        assert_eq!(component.first_element().unwrap().tag, "Weapon");
    }

    #[test]
    fn text_and_tails_are_kept() {
        let root = parse_str("<a>head<b>inner</b>tail<!-- note -->after</a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("head"));
        let b = root.first_element().unwrap();
        assert_eq!(b.text.as_deref(), Some("inner"));
        assert_eq!(b.tail.as_deref(), Some("tail"));
        match &root.children[1] {
            Node::Comment(c) => {
                assert_eq!(c.text, " note ");
                assert_eq!(c.tail.as_deref(), Some("after"));
            }
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        let root = parse_str(r#"<a title="x &amp; y">1 &lt; 2<![CDATA[<raw>]]></a>"#).unwrap();
        assert_eq!(root.attr("title"), Some("x & y"));
        assert_eq!(root.text.as_deref(), Some("1 < 2<raw>"));
    }

    #[test]
    fn prolog_is_skipped() {
        let root = parse_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- header -->\n<Items/>\n").unwrap();
        assert_eq!(root.tag, "Items");
        assert!(root.children.is_empty());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(parse_str(""), Err(XmlError::Empty)));
        assert!(matches!(parse_str("<a><b></a>"), Err(XmlError::Malformed(_))));
        assert!(matches!(
            parse_str("<a>"),
            Err(XmlError::Unclosed(_) | XmlError::Malformed(_))
        ));
        assert!(matches!(parse_str("<a/><b/>"), Err(XmlError::MultipleRoots(tag)) if tag == "b"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xml");
        let err = parse_file(&path).unwrap_err();
        assert!(matches!(err, XmlError::Io { path: ref p, .. } if p == &path));
    }

    #[test]
    fn read_catalog_indexes_entities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.xml");
        std::fs::write(&path, r#"<Items><Item id="a"/><Item id="b"/></Items>"#).unwrap();
        let catalog = read_catalog(&path, "Item").unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("b"));
    }
}
