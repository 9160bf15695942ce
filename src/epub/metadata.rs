//! Flat package-metadata items.

use crate::epub::ns;
use crate::epub::vocab::{self, DefaultVocab, PrefixMap};
use crate::xml::{ElementNode, XML_NAMESPACE};

/// One metadata entry of a package document, in document order.
///
/// Refinement chaining is left to the caller; the raw [`refines`]
/// reference is retained as-is.
///
/// [`refines`]: Self::refines
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataItem {
    /// Fully-qualified property: the Dublin Core element URI, the
    /// resolved `meta[property]` term, or the resolved first `link[rel]`
    /// term. Legacy EPUB 2 `meta[name]` values stay verbatim.
    pub property: String,
    pub value: String,
    pub id: Option<String>,
    /// Target id of a refinement, leading `#` stripped.
    pub refines: Option<String>,
    pub lang: Option<String>,
}

/// Parses `<metadata>` into an ordered, flat item list.
///
/// Returns [`None`] when the element is missing; the package document
/// is not parseable without it.
pub(super) fn parse(document: &ElementNode, prefix_map: &PrefixMap) -> Option<Vec<MetadataItem>> {
    let metadata = document.first("metadata", ns::OPF)?;

    Some(
        metadata
            .elements()
            .filter_map(|el| parse_element(el, prefix_map))
            .collect(),
    )
}

fn parse_element(element: &ElementNode, prefix_map: &PrefixMap) -> Option<MetadataItem> {
    match element.namespace() {
        ns::DC => parse_dc_element(element),
        ns::OPF if element.name() == "meta" => parse_meta_element(element, prefix_map),
        ns::OPF if element.name() == "link" => parse_link_element(element, prefix_map),
        _ => None,
    }
}

fn parse_dc_element(element: &ElementNode) -> Option<MetadataItem> {
    let value = element.text().trim().to_string();
    if value.is_empty() {
        return None;
    }
    Some(MetadataItem {
        property: format!("{}{}", ns::DC, element.name()),
        value,
        id: element.id().map(str::to_string),
        refines: None,
        lang: element.attr_ns("lang", XML_NAMESPACE).map(str::to_string),
    })
}

fn parse_meta_element(element: &ElementNode, prefix_map: &PrefixMap) -> Option<MetadataItem> {
    if let Some(property) = element.attr("property") {
        // EPUB 3 meta
        let property = vocab::resolve_property(property.trim(), prefix_map, DefaultVocab::Meta)?;
        let value = element.text().trim().to_string();
        if value.is_empty() {
            return None;
        }
        Some(MetadataItem {
            property,
            value,
            id: element.id().map(str::to_string),
            refines: element
                .attr("refines")
                .map(|refines| refines.trim_start_matches('#').to_string()),
            lang: element.attr_ns("lang", XML_NAMESPACE).map(str::to_string),
        })
    } else {
        // Legacy EPUB 2 meta
        let name = element.attr("name")?;
        let value = element.attr("content")?.trim().to_string();
        if value.is_empty() {
            return None;
        }
        Some(MetadataItem {
            property: name.to_string(),
            value,
            id: element.id().map(str::to_string),
            refines: None,
            lang: None,
        })
    }
}

/// A metadata `<link>` becomes an item keyed by its first resolved
/// `rel` term, with the raw href as value.
fn parse_link_element(element: &ElementNode, prefix_map: &PrefixMap) -> Option<MetadataItem> {
    let property = vocab::parse_properties(element.attr("rel")?)
        .filter_map(|token| vocab::resolve_property(token, prefix_map, DefaultVocab::Link))
        .next()?;
    let value = element.attr("href").filter(|href| !href.is_empty())?;

    Some(MetadataItem {
        property,
        value: value.to_string(),
        id: element.id().map(str::to_string),
        refines: element
            .attr("refines")
            .map(|refines| refines.trim_start_matches('#').to_string()),
        lang: None,
    })
}
