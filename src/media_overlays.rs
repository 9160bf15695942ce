//! Media-overlay narration trees and fragment lookup.
//!
//! A [`MediaOverlays`] tree is built once from a SMIL document and is
//! read-only thereafter. `<seq>` sequences become *section* nodes:
//! transparent containers that lookups recurse through but never match
//! directly.

use crate::epub::ns;
use crate::url::Url;
use crate::xml::ElementNode;

/// An audio clip time range within a narration resource.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    /// The narration audio resource.
    pub audio: Url,
    /// Clip start, in seconds.
    pub start: Option<f64>,
    /// Clip end, in seconds.
    pub end: Option<f64>,
}

/// One node of a narration tree.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaOverlayNode {
    /// Fragment-bearing reference into the text content, used for
    /// fragment lookup.
    pub text: Url,
    /// The audio clip; section nodes carry none.
    pub clip: Option<Clip>,
    pub children: Vec<MediaOverlayNode>,
    /// Roles; `section` marks a transparent grouping node.
    pub role: Vec<String>,
}

impl MediaOverlayNode {
    /// A leaf narration node.
    pub fn new(text: Url, clip: Option<Clip>) -> Self {
        Self {
            text,
            clip,
            children: Vec::new(),
            role: Vec::new(),
        }
    }

    /// A grouping node holding `children`.
    pub fn section(text: Url, children: Vec<MediaOverlayNode>) -> Self {
        Self {
            text,
            clip: None,
            children,
            role: vec!["section".to_string()],
        }
    }

    fn is_section(&self) -> bool {
        self.role.iter().any(|role| role == "section")
    }

    /// First non-section descendant in pre-order, recursing through
    /// nested all-section chains.
    fn first_non_section(&self) -> Option<&MediaOverlayNode> {
        for child in &self.children {
            if child.is_section() {
                if let Some(found) = child.first_non_section() {
                    return Some(found);
                }
            } else {
                return Some(child);
            }
        }
        None
    }
}

/// A read-only narration tree built from one SMIL document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaOverlays {
    nodes: Vec<MediaOverlayNode>,
}

impl MediaOverlays {
    pub fn new(nodes: Vec<MediaOverlayNode>) -> Self {
        Self { nodes }
    }

    /// Parses a SMIL document located at `file_path`.
    ///
    /// Returns [`None`] when the mandatory `<body>` element is missing.
    pub fn parse(document: &ElementNode, file_path: &Url) -> Option<Self> {
        let body = document.first("body", ns::SMIL)?;
        Some(Self {
            nodes: parse_seq(body, file_path),
        })
    }

    /// The top-level narration nodes.
    pub fn nodes(&self) -> &[MediaOverlayNode] {
        &self.nodes
    }

    /// The audio clip of the node matching `reference`
    /// ([`None`] acts as a wildcard: the first narration node).
    pub fn clip(&self, reference: Option<&Url>) -> Option<&Clip> {
        self.node_for_fragment(reference)?.clip.as_ref()
    }

    /// The node matching `reference`; the first structural match wins.
    pub fn node_for_fragment(&self, reference: Option<&Url>) -> Option<&MediaOverlayNode> {
        find_node(reference, &self.nodes)
    }

    /// The node logically following the one matching `reference`, in
    /// document order, crossing section boundaries transparently.
    pub fn node_after(&self, reference: Option<&Url>) -> Option<&MediaOverlayNode> {
        find_next_node(reference, &self.nodes).found
    }
}

fn matches(node: &MediaOverlayNode, reference: Option<&Url>) -> bool {
    match reference {
        Some(target) => node.text.is_equivalent(target),
        None => true,
    }
}

fn find_node<'a>(
    reference: Option<&Url>,
    nodes: &'a [MediaOverlayNode],
) -> Option<&'a MediaOverlayNode> {
    for node in nodes {
        if node.is_section() {
            // Sections are never matched directly.
            return find_node(reference, &node.children);
        }
        if matches(node, reference) {
            return Some(node);
        }
    }
    None
}

/// Successor-search state passed back up to the enclosing scope:
/// either the successor itself, or the fact that the matched node was
/// the last entry of the scope and the parent must continue at its own
/// sibling level.
struct NextNodeResult<'a> {
    found: Option<&'a MediaOverlayNode>,
    prev_found: bool,
}

fn find_next_node<'a>(
    reference: Option<&Url>,
    nodes: &'a [MediaOverlayNode],
) -> NextNodeResult<'a> {
    let mut prev_found = false;

    for node in nodes {
        if prev_found {
            // The matched node was the previous entry of this scope;
            // a section successor contributes its first playable leaf.
            let next = if node.is_section() {
                node.first_non_section()
            } else {
                Some(node)
            };
            if let Some(found) = next {
                return NextNodeResult {
                    found: Some(found),
                    prev_found: false,
                };
            }
        } else if node.is_section() {
            let result = find_next_node(reference, &node.children);
            if result.found.is_some() {
                return result;
            }
            prev_found = result.prev_found;
        } else if matches(node, reference) {
            prev_found = true;
        }
    }

    NextNodeResult {
        found: None,
        prev_found,
    }
}

fn parse_seq(element: &ElementNode, file_path: &Url) -> Vec<MediaOverlayNode> {
    let mut children = Vec::new();

    for child in element.elements() {
        if child.namespace() != ns::SMIL {
            continue;
        }
        match child.name() {
            "par" => children.extend(parse_par(child, file_path)),
            "seq" => children.append(&mut parse_seq(child, file_path)),
            _ => {}
        }
    }

    // A sequence materializes as a grouping node only when it anchors
    // into the text; otherwise its children are spliced into the parent.
    let textref = element
        .attr_ns("textref", ns::OPS)
        .and_then(Url::from_epub_href)
        .map(|href| file_path.resolve(&href));

    match textref {
        Some(text) => vec![MediaOverlayNode::section(text, children)],
        None => children,
    }
}

fn parse_par(element: &ElementNode, file_path: &Url) -> Option<MediaOverlayNode> {
    let text = element
        .first("text", ns::SMIL)?
        .attr("src")
        .and_then(Url::from_epub_href)
        .map(|href| file_path.resolve(&href))?;
    let clip = element.first("audio", ns::SMIL).and_then(|audio| {
        let src = audio
            .attr("src")
            .and_then(Url::from_epub_href)
            .map(|href| file_path.resolve(&href))?;
        Some(Clip {
            audio: src,
            start: audio.attr("clipBegin").and_then(parse_clock_value),
            end: audio.attr("clipEnd").and_then(parse_clock_value),
        })
    });

    Some(MediaOverlayNode::new(text, clip))
}

/// Parses a SMIL clock value into seconds: full/partial clock form
/// (`hh:mm:ss.fff`, `mm:ss`) or timecount form (`12.5s`, `250ms`,
/// `3h`, `2min`, bare seconds).
fn parse_clock_value(value: &str) -> Option<f64> {
    let value = value.trim();

    if value.contains(':') {
        let parts: Option<Vec<f64>> = value
            .split(':')
            .map(|part| part.parse::<f64>().ok())
            .collect();
        return match parts?.as_slice() {
            [minutes, seconds] => Some(minutes * 60.0 + seconds),
            [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
            _ => None,
        };
    }
    if let Some(rest) = value.strip_suffix("ms") {
        return rest.parse::<f64>().ok().map(|v| v / 1000.0);
    }
    if let Some(rest) = value.strip_suffix("min") {
        return rest.parse::<f64>().ok().map(|v| v * 60.0);
    }
    if let Some(rest) = value.strip_suffix('h') {
        return rest.parse::<f64>().ok().map(|v| v * 3600.0);
    }
    if let Some(rest) = value.strip_suffix('s') {
        return rest.parse::<f64>().ok();
    }
    value.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{MediaOverlayNode, MediaOverlays, parse_clock_value};
    use crate::url::Url;
    use crate::xml::ElementNode;

    fn text(fragment: &str) -> Url {
        Url::parse(&format!("chapter1.xhtml#{fragment}")).unwrap()
    }

    fn leaf(fragment: &str) -> MediaOverlayNode {
        MediaOverlayNode::new(text(fragment), None)
    }

    #[test]
    fn test_find_node_by_fragment() {
        let overlays = MediaOverlays::new(vec![leaf("par1"), leaf("par2")]);

        let found = overlays.node_for_fragment(Some(&text("par2"))).unwrap();
        assert_eq!(text("par2"), found.text);

        // Wildcard: the first narration node.
        let first = overlays.node_for_fragment(None).unwrap();
        assert_eq!(text("par1"), first.text);
    }

    #[test]
    fn test_sections_are_never_matched_directly() {
        let section = MediaOverlayNode::section(
            Url::parse("chapter1.xhtml").unwrap(),
            vec![leaf("par1")],
        );
        let overlays = MediaOverlays::new(vec![section]);

        let found = overlays
            .node_for_fragment(Some(&Url::parse("chapter1.xhtml").unwrap()))
            .unwrap();
        assert_eq!(text("par1"), found.text);
    }

    #[test]
    fn test_node_after_descends_into_section_successor() {
        // [A, B(section: [C, D])]: the successor of A is C, not B.
        let nodes = vec![
            leaf("a"),
            MediaOverlayNode::section(
                Url::parse("chapter2.xhtml").unwrap(),
                vec![
                    MediaOverlayNode::new(Url::parse("chapter2.xhtml#c").unwrap(), None),
                    MediaOverlayNode::new(Url::parse("chapter2.xhtml#d").unwrap(), None),
                ],
            ),
        ];
        let overlays = MediaOverlays::new(nodes);

        let next = overlays.node_after(Some(&text("a"))).unwrap();
        assert_eq!(Url::parse("chapter2.xhtml#c").unwrap(), next.text);
    }

    #[test]
    fn test_node_after_crosses_section_boundary_upward() {
        // The match is the last leaf of a section; its successor lives
        // at the parent's sibling level.
        let nodes = vec![
            MediaOverlayNode::section(
                Url::parse("chapter1.xhtml").unwrap(),
                vec![leaf("par1"), leaf("par2")],
            ),
            MediaOverlayNode::new(Url::parse("chapter2.xhtml#par1").unwrap(), None),
        ];
        let overlays = MediaOverlays::new(nodes);

        let next = overlays.node_after(Some(&text("par2"))).unwrap();
        assert_eq!(Url::parse("chapter2.xhtml#par1").unwrap(), next.text);
    }

    #[test]
    fn test_wildcard_on_all_section_tree_is_absent() {
        // An all-section chain with no playable leaf has no
        // well-defined first node.
        let nodes = vec![MediaOverlayNode::section(
            Url::parse("chapter1.xhtml").unwrap(),
            vec![MediaOverlayNode::section(
                Url::parse("chapter1.xhtml#s1").unwrap(),
                Vec::new(),
            )],
        )];
        let overlays = MediaOverlays::new(nodes);

        assert!(overlays.node_for_fragment(None).is_none());
        assert!(overlays.node_after(None).is_none());
    }

    #[test]
    fn test_parse_smil() {
        let smil = br#"<smil xmlns="http://www.w3.org/ns/SMIL"
                             xmlns:epub="http://www.idpf.org/2007/ops" version="3.0">
            <body>
                <seq epub:textref="chapter1.xhtml">
                    <par id="p1">
                        <text src="chapter1.xhtml#par1"/>
                        <audio src="audio/chapter1.mp3" clipBegin="0:00:01" clipEnd="12.5s"/>
                    </par>
                    <par id="p2">
                        <text src="chapter1.xhtml#par2"/>
                        <audio src="audio/chapter1.mp3" clipBegin="12.5s" clipEnd="250ms"/>
                    </par>
                </seq>
            </body>
        </smil>"#;
        let document = ElementNode::parse(smil).unwrap();
        let path = Url::parse("OEBPS/overlays/chapter1.smil").unwrap();
        let overlays = MediaOverlays::parse(&document, &path).unwrap();

        assert_eq!(1, overlays.nodes().len());
        let section = &overlays.nodes()[0];
        assert_eq!(Url::parse("OEBPS/overlays/chapter1.xhtml").unwrap(), section.text);
        assert_eq!(2, section.children.len());

        let query = Url::parse("OEBPS/overlays/chapter1.xhtml#par1").unwrap();
        let clip = overlays.clip(Some(&query)).unwrap();
        assert_eq!(
            Url::parse("OEBPS/overlays/audio/chapter1.mp3").unwrap(),
            clip.audio,
        );
        assert_eq!(Some(1.0), clip.start);
        assert_eq!(Some(12.5), clip.end);
    }

    #[test]
    fn test_parse_smil_without_body() {
        let document = ElementNode::parse(br#"<smil xmlns="http://www.w3.org/ns/SMIL"/>"#).unwrap();
        let path = Url::parse("c1.smil").unwrap();

        assert!(MediaOverlays::parse(&document, &path).is_none());
    }

    #[test]
    fn test_clock_values() {
        assert_eq!(Some(3723.5), parse_clock_value("1:02:03.5"));
        assert_eq!(Some(62.0), parse_clock_value("1:02"));
        assert_eq!(Some(12.5), parse_clock_value("12.5s"));
        assert_eq!(Some(0.25), parse_clock_value("250ms"));
        assert_eq!(Some(7200.0), parse_clock_value("2h"));
        assert_eq!(Some(90.0), parse_clock_value("1.5min"));
        assert_eq!(Some(42.0), parse_clock_value("42"));
        assert_eq!(None, parse_clock_value("later"));
    }
}
