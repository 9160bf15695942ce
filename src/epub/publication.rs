//! Publication model assembly.

use crate::epub::metadata::MetadataItem;
use crate::epub::package::{Item, PackageDocument};
use crate::link::{Link, ReadingProgression};
use std::collections::{BTreeSet, HashMap};

/// The assembled publication manifest, combining a parsed package
/// document with parsed navigation tables.
///
/// Assembly treats both inputs as immutable values; nothing is
/// re-parsed or mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Publication {
    pub metadata: Vec<MetadataItem>,
    /// Linear spine entries, joined against the manifest by id.
    pub reading_order: Vec<Link>,
    /// Manifest items absent from the reading order, non-linear spine
    /// entries included.
    pub resources: Vec<Link>,
    pub toc: Vec<Link>,
    pub page_list: Vec<Link>,
    pub landmarks: Vec<Link>,
    pub direction: Option<ReadingProgression>,
}

impl Publication {
    /// Combines `package` with the role-keyed `navigation` tables of
    /// its navigation document, when one exists.
    ///
    /// Version-dependent rules live here: an EPUB 2 publication with
    /// no `landmarks` nav falls back to its legacy guide, while EPUB 3
    /// ignores the guide even when a non-conformant file carries one.
    pub fn from_parts(
        package: PackageDocument,
        navigation: Option<HashMap<String, Vec<Link>>>,
    ) -> Self {
        let mut navigation = navigation.unwrap_or_default();

        let index_by_id: HashMap<&str, usize> = package
            .manifest
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.id.as_deref().map(|id| (id, index)))
            .collect();
        let mut in_reading_order = vec![false; package.manifest.len()];
        let mut reading_order = Vec::new();

        for itemref in &package.spine.itemrefs {
            let Some(&index) = index_by_id.get(itemref.idref.as_str()) else {
                // Dangling idref; integrity is not enforced here.
                continue;
            };
            if !itemref.linear || in_reading_order[index] {
                continue;
            }
            in_reading_order[index] = true;
            reading_order.push(item_link(&package.manifest[index], &itemref.properties));
        }

        let resources = package
            .manifest
            .iter()
            .enumerate()
            .filter(|(index, _)| !in_reading_order[*index])
            .map(|(_, item)| item_link(item, &[]))
            .collect();

        let toc = navigation.remove("toc").unwrap_or_default();
        let page_list = navigation.remove("page-list").unwrap_or_default();
        let landmarks = match navigation.remove("landmarks") {
            Some(links) => links,
            None if package.epub_version < 3.0 => package.guide,
            None => Vec::new(),
        };

        Self {
            metadata: package.metadata,
            reading_order,
            resources,
            toc,
            page_list,
            landmarks,
            direction: package.spine.direction,
        }
    }
}

fn item_link(item: &Item, itemref_properties: &[String]) -> Link {
    let mut rels: BTreeSet<String> = item.properties.iter().cloned().collect();
    rels.extend(itemref_properties.iter().cloned());

    Link {
        title: None,
        href: item.href.clone(),
        media_type: item.media_type.clone(),
        rels,
        children: Vec::new(),
    }
}
