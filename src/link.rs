//! Hyperlink structures shared by the publication model.

use crate::url::Url;
use std::collections::BTreeSet;

/// A link to a publication resource, possibly carrying nested child
/// links (hierarchical table-of-contents entries).
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    /// Human-readable label.
    pub title: Option<String>,
    /// Resolved target. Unlinked structural navigation entries carry
    /// the bare fragment `#`.
    pub href: Url,
    /// MIME type of the target, when known.
    pub media_type: Option<String>,
    /// Fully resolved relation terms.
    pub rels: BTreeSet<String>,
    /// Ordered child links.
    pub children: Vec<Link>,
}

impl Link {
    /// A bare link to `href`, without title, relations, or children.
    pub fn new(href: Url) -> Self {
        Self {
            title: None,
            href,
            media_type: None,
            rels: BTreeSet::new(),
            children: Vec::new(),
        }
    }
}

/// Spine traversal direction.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ReadingProgression {
    /// Left-to-right (`ltr`).
    Ltr,
    /// Right-to-left (`rtl`).
    Rtl,
}
