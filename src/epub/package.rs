//! OPF package-document parsing.

use crate::epub::metadata::{self, MetadataItem};
use crate::epub::ns;
use crate::epub::vocab::{self, DefaultVocab, PrefixMap};
use crate::link::{Link, ReadingProgression};
use crate::url::Url;
use crate::xml::ElementNode;

/// One parsed OPF package document.
///
/// Referential integrity between spine and manifest is not validated
/// here; itemrefs keep their raw `idref` and resolution against the
/// manifest is a downstream concern.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageDocument {
    /// The document's own location, base for relative hrefs.
    pub path: Url,
    /// `package[version]`; `1.2` when absent or unparsable.
    pub epub_version: f64,
    /// `package[unique-identifier]`, verbatim. Whether the referenced
    /// metadata item exists is not checked at this stage.
    pub unique_identifier_id: Option<String>,
    /// Ordered metadata items.
    pub metadata: Vec<MetadataItem>,
    /// Ordered manifest items. Entries without a resolvable href do
    /// not appear here.
    pub manifest: Vec<Item>,
    pub spine: Spine,
    /// Legacy `<guide>` references.
    ///
    /// EPUB 3 dropped the guide element, but a non-conformant EPUB 3
    /// file that still carries one is parsed all the same; ignoring it
    /// is the assembly stage's version-gated decision.
    pub guide: Vec<Link>,
}

impl PackageDocument {
    /// Parses an OPF package document located at `path`.
    ///
    /// Returns [`None`] when any of the mandatory `metadata`,
    /// `manifest`, or `spine` elements is missing.
    pub fn parse(document: &ElementNode, path: &Url) -> Option<Self> {
        // Document-declared prefixes override the reserved set.
        let mut prefix_map = vocab::package_reserved_prefixes();
        if let Some(declared) = document.attr("prefix") {
            prefix_map.extend(vocab::parse_prefixes(declared));
        }

        let epub_version = document
            .attr("version")
            .and_then(|version| version.parse().ok())
            .unwrap_or(1.2);
        let metadata = metadata::parse(document, &prefix_map)?;
        let manifest = document.first("manifest", ns::OPF)?;
        let spine = document.first("spine", ns::OPF)?;

        Some(Self {
            path: path.clone(),
            epub_version,
            unique_identifier_id: document.attr("unique-identifier").map(str::to_string),
            metadata,
            manifest: manifest
                .get("item", ns::OPF)
                .filter_map(|el| Item::parse(el, path, &prefix_map))
                .collect(),
            spine: Spine::parse(spine, &prefix_map, epub_version),
            guide: parse_guide(document.first("guide", ns::OPF), path, &prefix_map),
        })
    }
}

/// One manifest entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// Absolute-resolved location.
    pub href: Url,
    pub id: Option<String>,
    /// Id of the fallback item.
    pub fallback: Option<String>,
    /// Id of the associated media-overlay item.
    pub media_overlay: Option<String>,
    pub media_type: Option<String>,
    /// Fully resolved vocabulary terms.
    pub properties: Vec<String>,
}

impl Item {
    /// An item without a resolvable href is not constructible;
    /// such entries vanish from the manifest without failing it.
    fn parse(element: &ElementNode, file_path: &Url, prefix_map: &PrefixMap) -> Option<Self> {
        let href = element
            .attr("href")
            .and_then(Url::from_epub_href)
            .map(|href| file_path.resolve(&href))?;
        let properties = vocab::parse_properties(element.attr("properties").unwrap_or_default())
            .filter_map(|token| vocab::resolve_property(token, prefix_map, DefaultVocab::Item))
            .collect();

        Some(Self {
            href,
            id: element.id().map(str::to_string),
            fallback: element.attr("fallback").map(str::to_string),
            media_overlay: element.attr("media-overlay").map(str::to_string),
            media_type: element.attr("media-type").map(str::to_string),
            properties,
        })
    }
}

/// The spine: the publication's ordered reading sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Spine {
    pub itemrefs: Vec<Itemref>,
    /// `page-progression-direction`; absent for `default`.
    pub direction: Option<ReadingProgression>,
    /// Legacy NCX manifest id from `spine[toc]`.
    pub toc: Option<String>,
}

impl Spine {
    fn parse(element: &ElementNode, prefix_map: &PrefixMap, epub_version: f64) -> Self {
        let itemrefs = element
            .get("itemref", ns::OPF)
            .filter_map(|el| Itemref::parse(el, prefix_map))
            .collect();
        let direction = match element.attr("page-progression-direction") {
            Some("rtl") => Some(ReadingProgression::Rtl),
            Some("ltr") => Some(ReadingProgression::Ltr),
            // absent or "default"
            _ => None,
        };
        // The toc attribute no longer exists in EPUB 3.
        let toc = if epub_version < 3.0 {
            element.attr("toc").map(str::to_string)
        } else {
            None
        };

        Self {
            itemrefs,
            direction,
            toc,
        }
    }
}

/// One spine entry, referencing a manifest item by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Itemref {
    pub idref: String,
    /// `false` only for the literal attribute value `"no"`.
    pub linear: bool,
    /// Fully resolved vocabulary terms.
    pub properties: Vec<String>,
}

impl Itemref {
    fn parse(element: &ElementNode, prefix_map: &PrefixMap) -> Option<Self> {
        let idref = element.attr("idref")?.to_string();
        let linear = element.attr("linear") != Some("no");
        let properties = vocab::parse_properties(element.attr("properties").unwrap_or_default())
            .filter_map(|token| vocab::resolve_property(token, prefix_map, DefaultVocab::Itemref))
            .collect();

        Some(Self {
            idref,
            linear,
            properties,
        })
    }
}

fn parse_guide(element: Option<&ElementNode>, file_path: &Url, prefix_map: &PrefixMap) -> Vec<Link> {
    let Some(element) = element else {
        return Vec::new();
    };

    element
        .get("reference", ns::OPF)
        .filter_map(|node| {
            let href = node
                .attr("href")
                .and_then(Url::from_epub_href)
                .map(|href| file_path.resolve(&href))?;
            // A missing type yields an empty relation set, not an error.
            let rels = node
                .attr("type")
                .and_then(|reference_type| map_to_epub3_type(reference_type, prefix_map))
                .into_iter()
                .collect();

            Some(Link {
                title: node.attr("title").map(str::to_string),
                href,
                media_type: None,
                rels,
                children: Vec::new(),
            })
        })
        .collect()
}

/// Remaps EPUB 2 guide reference types onto their EPUB 3
/// structural-semantics equivalents before vocabulary resolution.
fn map_to_epub3_type(reference_type: &str, prefix_map: &PrefixMap) -> Option<String> {
    let remapped = match reference_type {
        "title-page" => "titlepage",
        "text" => "bodymatter",
        // American English
        "acknowledgements" => "acknowledgments",
        // endnotes or footnotes; endnotes is the closer term
        "notes" => "endnotes",
        other => other,
    };
    vocab::resolve_property(remapped, prefix_map, DefaultVocab::Type)
}

#[cfg(test)]
mod tests {
    use crate::epub::vocab;

    #[test]
    fn test_guide_type_remap() {
        let prefixes = vocab::package_reserved_prefixes();
        let expected = [
            ("titlepage", "title-page"),
            ("bodymatter", "text"),
            ("acknowledgments", "acknowledgements"),
            ("endnotes", "notes"),
            ("cover", "cover"),
        ];

        for (epub3_term, epub2_type) in expected {
            assert_eq!(
                Some(format!("http://idpf.org/epub/vocab/structure/#{epub3_term}")),
                super::map_to_epub3_type(epub2_type, &prefixes),
            );
        }
    }
}
