//! Property vocabularies and prefix resolution.
//!
//! `properties` and `type` attribute values are short tokens, optionally
//! prefixed; each resolves to a term under a full vocabulary URI. The
//! prefix table merges a built-in reserved set with per-document
//! `prefix` declarations, the latter winning for the same key.

use std::collections::HashMap;

/// Fully-qualified vocabulary URIs.
pub(crate) mod vocabularies {
    pub(crate) const META: &str = "http://idpf.org/epub/vocab/package/meta/#";
    pub(crate) const LINK: &str = "http://idpf.org/epub/vocab/package/link/#";
    pub(crate) const ITEM: &str = "http://idpf.org/epub/vocab/package/item/#";
    pub(crate) const ITEMREF: &str = "http://idpf.org/epub/vocab/package/itemref/#";
    pub(crate) const TYPE: &str = "http://idpf.org/epub/vocab/structure/#";

    pub(crate) const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub(crate) const MEDIA: &str = "http://www.idpf.org/epub/vocab/overlays/#";
    pub(crate) const RENDITION: &str = "http://www.idpf.org/vocab/rendition/#";
    pub(crate) const A11Y: &str = "http://www.idpf.org/epub/vocab/package/a11y/#";
    pub(crate) const MARC: &str = "http://id.loc.gov/vocabulary/";
    pub(crate) const ONIX: &str =
        "http://www.editeur.org/ONIX/book/codelists/onix.html#codelist";
    pub(crate) const SCHEMA: &str = "http://schema.org/";
    pub(crate) const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    pub(crate) const MSV: &str = "http://www.idpf.org/epub/vocab/structure/magazine/#";
    pub(crate) const PRISM: &str =
        "http://www.prismstandard.org/specifications/3.0/PRISM_CV_Spec_3.0.htm#";
}

/// Mapping of prefix token to vocabulary URI.
pub(crate) type PrefixMap = HashMap<String, String>;

/// The vocabulary applied to unprefixed property tokens,
/// selected by the attribute's host element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DefaultVocab {
    /// `meta[property]`.
    Meta,
    /// `link[rel]` / `link[properties]`.
    Link,
    /// Manifest `item[properties]`.
    Item,
    /// Spine `itemref[properties]`.
    Itemref,
    /// `epub:type` and guide reference types.
    Type,
}

impl DefaultVocab {
    pub(crate) fn uri(self) -> &'static str {
        match self {
            Self::Meta => vocabularies::META,
            Self::Link => vocabularies::LINK,
            Self::Item => vocabularies::ITEM,
            Self::Itemref => vocabularies::ITEMREF,
            Self::Type => vocabularies::TYPE,
        }
    }
}

/// Prefixes usable without declaration in a package document.
pub(crate) fn package_reserved_prefixes() -> PrefixMap {
    prefix_map(&[
        ("dcterms", vocabularies::DCTERMS),
        ("media", vocabularies::MEDIA),
        ("rendition", vocabularies::RENDITION),
        ("a11y", vocabularies::A11Y),
        ("marc", vocabularies::MARC),
        ("onix", vocabularies::ONIX),
        ("schema", vocabularies::SCHEMA),
        ("xsd", vocabularies::XSD),
    ])
}

/// Prefixes usable without declaration in EPUB content documents.
pub(crate) fn content_reserved_prefixes() -> PrefixMap {
    prefix_map(&[("msv", vocabularies::MSV), ("prism", vocabularies::PRISM)])
}

fn prefix_map(pairs: &[(&str, &str)]) -> PrefixMap {
    pairs
        .iter()
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect()
}

/// Resolves a single property token to its fully-qualified term.
///
/// Unprefixed tokens resolve under `default_vocab`; prefixed tokens
/// resolve through `prefix_map`. A token with an unknown prefix yields
/// [`None`] and is dropped by callers, never guessed.
pub(crate) fn resolve_property(
    property: &str,
    prefix_map: &PrefixMap,
    default_vocab: DefaultVocab,
) -> Option<String> {
    let mut parts = property.splitn(2, ':').filter(|part| !part.is_empty());

    match (parts.next(), parts.next()) {
        (Some(local), None) => Some(format!("{}{local}", default_vocab.uri())),
        (Some(prefix), Some(local)) => prefix_map.get(prefix).map(|uri| format!("{uri}{local}")),
        _ => None,
    }
}

/// Splits a whitespace-delimited `properties` attribute value into
/// tokens, order preserved, without deduplication.
pub(crate) fn parse_properties(attr: &str) -> impl Iterator<Item = &str> {
    attr.split_whitespace()
}

/// Parses a `prefix` declaration attribute (`prefix: uri` pairs).
///
/// Malformed pairs (no `:`, invalid prefix characters, missing URI) are
/// skipped individually.
pub(crate) fn parse_prefixes(attr: &str) -> PrefixMap {
    let mut prefixes = PrefixMap::new();
    let mut tokens = attr.split_whitespace();

    while let Some(token) = tokens.next() {
        let Some(colon) = token.find(':') else {
            continue;
        };
        let prefix = &token[..colon];
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_alphanumeric() || c == '_') {
            continue;
        }
        // The URI either follows the colon directly or is the next token.
        let uri = match &token[colon + 1..] {
            "" => match tokens.next() {
                Some(uri) => uri,
                None => continue,
            },
            uri => uri,
        };
        prefixes.insert(prefix.to_string(), uri.to_string());
    }
    prefixes
}
