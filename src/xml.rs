//! A namespace-aware XML element tree.
//!
//! The parsers in this crate never tokenize XML themselves; they consume
//! an [`ElementNode`] tree materialized once per document by
//! [`ElementNode::parse`]. The tree is immutable after construction and
//! holds no references back into the source bytes.

use crate::errors::{ParseError, ParseResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::error::Error;

/// The namespace bound to the predeclared `xml:` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A namespace-qualified attribute of an [`ElementNode`].
///
/// Unprefixed attributes carry an empty namespace.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    namespace: String,
    name: String,
    value: String,
}

impl Attribute {
    /// The namespace URI, empty when the attribute is unprefixed.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The local attribute name, prefix stripped.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Clone, Debug, PartialEq)]
enum XmlNode {
    Element(ElementNode),
    Text(String),
}

/// An immutable, ordered, namespace-qualified XML element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementNode {
    name: String,
    namespace: String,
    attributes: Vec<Attribute>,
    children: Vec<XmlNode>,
}

impl ElementNode {
    /// Materializes the element tree of an XML document.
    ///
    /// Namespace prefixes (elements and attributes alike) are resolved
    /// during this pass; `xmlns` declarations are consumed by the
    /// resolver and do not appear as attributes.
    pub fn parse(data: &[u8]) -> ParseResult<Self> {
        let mut reader = NsReader::from_reader(data);
        let mut stack: Vec<ElementNode> = Vec::new();

        loop {
            match reader.read_resolved_event().map_err(box_error)? {
                (resolve, Event::Start(el)) => {
                    let namespace = resolved_namespace(&resolve)?;
                    let element = build_element(&reader, namespace, &el)?;
                    stack.push(element);
                }
                (resolve, Event::Empty(el)) => {
                    let namespace = resolved_namespace(&resolve)?;
                    let element = build_element(&reader, namespace, &el)?;
                    if let Some(root) = attach(&mut stack, element) {
                        return Ok(root);
                    }
                }
                (_, Event::End(_)) => {
                    if let Some(element) = stack.pop()
                        && let Some(root) = attach(&mut stack, element)
                    {
                        return Ok(root);
                    }
                }
                (_, Event::Text(text)) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = text.unescape().map_err(box_error)?;
                        parent.children.push(XmlNode::Text(value.into_owned()));
                    }
                }
                (_, Event::CData(data)) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = data
                            .decode()
                            .unwrap_or_else(|_| String::from_utf8_lossy(data.as_ref()));
                        parent.children.push(XmlNode::Text(value.into_owned()));
                    }
                }
                (_, Event::Eof) => return Err(ParseError::NoRootElement),
                _ => {}
            }
        }
    }

    /// The local element name, prefix stripped.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace URI, empty when the element has none.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The unqualified `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// The value of the unqualified attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attr_ns(name, "")
    }

    /// The value of the attribute `name` within `namespace`.
    pub fn attr_ns(&self, name: &str, namespace: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name && attr.namespace == namespace)
            .map(|attr| attr.value.as_str())
    }

    /// All attributes, in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Direct element children, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct element children matching `name` within `namespace`.
    pub fn get<'a, 'b>(
        &'a self,
        name: &'b str,
        namespace: &'b str,
    ) -> impl Iterator<Item = &'a ElementNode> + use<'a, 'b> {
        self.elements()
            .filter(move |el| el.name == name && el.namespace == namespace)
    }

    /// The first direct element child matching `name` within `namespace`.
    pub fn first(&self, name: &str, namespace: &str) -> Option<&ElementNode> {
        self.get(name, namespace).next()
    }

    /// Descendant elements matching `name` within `namespace`,
    /// at any depth, in document order.
    pub fn collect(&self, name: &str, namespace: &str) -> Vec<&ElementNode> {
        let mut found = Vec::new();
        self.collect_into(name, namespace, &mut found);
        found
    }

    fn collect_into<'a>(&'a self, name: &str, namespace: &str, found: &mut Vec<&'a ElementNode>) {
        for el in self.elements() {
            if el.name == name && el.namespace == namespace {
                found.push(el);
            }
            el.collect_into(name, namespace, found);
        }
    }

    /// Text directly within this element, untrimmed,
    /// child elements excluded.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Text of this element and all descendants,
    /// concatenated in document order.
    pub fn collect_text(&self) -> String {
        let mut out = String::new();
        self.collect_text_into(&mut out);
        out
    }

    fn collect_text_into(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(el) => el.collect_text_into(out),
            }
        }
    }
}

/// Pushes `element` onto its parent, or returns it when it is the root.
fn attach(stack: &mut Vec<ElementNode>, element: ElementNode) -> Option<ElementNode> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            None
        }
        None => Some(element),
    }
}

fn build_element(
    reader: &NsReader<&[u8]>,
    namespace: String,
    el: &BytesStart,
) -> ParseResult<ElementNode> {
    let mut attributes = Vec::new();

    for attr in el.attributes().filter_map(Result::ok) {
        // Namespace declarations are consumed by the resolver.
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolve, local) = reader.resolve_attribute(attr.key);
        let value = attr.unescape_value().map_err(box_error)?;

        attributes.push(Attribute {
            namespace: resolved_namespace(&resolve)?,
            name: String::from_utf8(local.as_ref().to_vec())?,
            value: value.into_owned(),
        });
    }

    Ok(ElementNode {
        name: String::from_utf8(el.local_name().as_ref().to_vec())?,
        namespace,
        attributes,
        children: Vec::new(),
    })
}

fn resolved_namespace(resolve: &ResolveResult) -> ParseResult<String> {
    Ok(match resolve {
        ResolveResult::Bound(namespace) => String::from_utf8(namespace.as_ref().to_vec())?,
        _ => String::new(),
    })
}

fn box_error(error: impl Error + Send + Sync + 'static) -> ParseError {
    ParseError::Unparsable(Box::new(error))
}

#[cfg(test)]
mod tests {
    use super::ElementNode;

    const DOC: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
        <root xmlns="urn:example:default" xmlns:x="urn:example:x" id="r">
            <a x:kind="first">one &amp; two</a>
            <b><a>nested</a></b>
            <x:a/>
            trailing
        </root>"#;

    #[test]
    fn test_namespaces_and_attributes() {
        let root = ElementNode::parse(DOC).unwrap();

        assert_eq!("root", root.name());
        assert_eq!("urn:example:default", root.namespace());
        assert_eq!(Some("r"), root.id());

        let a = root.first("a", "urn:example:default").unwrap();
        assert_eq!(Some("first"), a.attr_ns("kind", "urn:example:x"));
        assert_eq!(None, a.attr("kind"));
        assert_eq!("one & two", a.text());

        assert!(root.first("a", "urn:example:x").is_some());
    }

    #[test]
    fn test_collect_descends_at_any_depth() {
        let root = ElementNode::parse(DOC).unwrap();
        let found = root.collect("a", "urn:example:default");

        assert_eq!(2, found.len());
        assert_eq!("nested", found[1].text());
    }

    #[test]
    fn test_collect_text() {
        let root = ElementNode::parse(b"<r>a<b>b<c>c</c></b>d</r>").unwrap();
        assert_eq!("abcd", root.collect_text());
        assert_eq!("ad", root.text());
    }

    #[test]
    fn test_empty_document_is_an_error() {
        assert!(ElementNode::parse(b"  ").is_err());
    }
}
