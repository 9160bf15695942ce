//! EPUB 3 navigation-document parsing.

use crate::epub::ns;
use crate::epub::vocab::{self, DefaultVocab, PrefixMap, vocabularies};
use crate::link::Link;
use crate::url::Url;
use crate::xml::ElementNode;
use std::collections::{BTreeSet, HashMap};

/// Parser for XHTML navigation documents.
///
/// Produces a mapping of navigation role (`toc`, `landmarks`,
/// `page-list`, or the full term URI for foreign vocabularies) to its
/// ordered link hierarchy. A role without surviving links is absent
/// from the map, never an empty list; callers can tell "no nav of that
/// type" apart from "nav present but empty".
pub struct NavigationDocumentParser;

impl NavigationDocumentParser {
    /// Parses the `<nav>` elements of the document located at `file_path`.
    pub fn parse(document: &ElementNode, file_path: &Url) -> HashMap<String, Vec<Link>> {
        let mut prefix_map = vocab::content_reserved_prefixes();
        if let Some(declared) = document.attr_ns("prefix", ns::OPS) {
            prefix_map.extend(vocab::parse_prefixes(declared));
        }

        let Some(body) = document.first("body", ns::XHTML) else {
            return HashMap::new();
        };
        let mut navigation = HashMap::new();

        // A nav may sit at any depth below body.
        for nav in body.collect("nav", ns::XHTML) {
            let Some((roles, links)) = Self::parse_nav_element(nav, file_path, &prefix_map) else {
                continue;
            };
            for role in roles {
                // Terms of the default structure vocabulary go by their
                // short name; foreign terms keep the full URI.
                let key = match role.strip_prefix(vocabularies::TYPE) {
                    Some(short) => short.to_string(),
                    None => role.clone(),
                };
                navigation.insert(key, links.clone());
            }
        }
        navigation
    }

    fn parse_nav_element(
        nav: &ElementNode,
        file_path: &Url,
        prefix_map: &PrefixMap,
    ) -> Option<(Vec<String>, Vec<Link>)> {
        let type_attr = nav.attr_ns("type", ns::OPS)?;
        let roles: Vec<String> = vocab::parse_properties(type_attr)
            .filter_map(|token| vocab::resolve_property(token, prefix_map, DefaultVocab::Type))
            .collect();
        let links = Self::parse_ol_element(nav.first("ol", ns::XHTML)?, file_path, prefix_map);

        (!roles.is_empty() && !links.is_empty()).then_some((roles, links))
    }

    fn parse_ol_element(
        element: &ElementNode,
        file_path: &Url,
        prefix_map: &PrefixMap,
    ) -> Vec<Link> {
        element
            .get("li", ns::XHTML)
            .filter_map(|li| Self::parse_li_element(li, file_path, prefix_map))
            .collect()
    }

    fn parse_li_element(
        element: &ElementNode,
        file_path: &Url,
        prefix_map: &PrefixMap,
    ) -> Option<Link> {
        // The first child element is expected to be <a>, <span>, or <ol>.
        let first = element.elements().next()?;
        let title = if first.name() == "ol" {
            String::new()
        } else {
            collapse_whitespace(&first.collect_text())
        };
        let href = (first.name() == "a")
            .then(|| first.attr("href"))
            .flatten()
            .filter(|href| !href.trim().is_empty())
            .and_then(Url::from_epub_href)
            .map(|href| file_path.resolve(&href));
        let rels: BTreeSet<String> =
            vocab::parse_properties(first.attr_ns("type", ns::OPS).unwrap_or_default())
                .filter_map(|token| vocab::resolve_property(token, prefix_map, DefaultVocab::Type))
                .collect();
        let children = element
            .first("ol", ns::XHTML)
            .map(|ol| Self::parse_ol_element(ol, file_path, prefix_map))
            .unwrap_or_default();

        // Unlinked or untitled leaf entries carry no navigable value;
        // an entry with children is always retained.
        if children.is_empty() && (href.is_none() || title.is_empty()) {
            return None;
        }
        Some(Link {
            title: Some(title),
            href: href.unwrap_or_else(Url::empty_fragment),
            media_type: None,
            rels,
            children,
        })
    }
}

/// Collapses whitespace runs (newlines included) to single spaces and
/// trims the ends.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for token in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::collapse_whitespace;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            "A link with new lines",
            collapse_whitespace("A link with\n   new lines"),
        );
        assert_eq!("", collapse_whitespace(" \n\t "));
        assert_eq!("plain", collapse_whitespace("plain"));
    }
}
