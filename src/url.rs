//! A lightweight URL value type for EPUB hrefs.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::fmt::{self, Display};

/// A relative or absolute resource locator with an optional fragment.
///
/// Equality is structural. [`Url::is_equivalent`] additionally treats an
/// absent fragment as matching any fragment, which is the comparison
/// media-overlay lookup relies on.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Url {
    /// Resource part, query included, fragment excluded.
    resource: String,
    /// Fragment identifier, `#` excluded.
    fragment: Option<String>,
}

impl Url {
    /// Parses an already-decoded URL string.
    ///
    /// Returns [`None`] for an empty string.
    pub fn parse(url: &str) -> Option<Self> {
        if url.is_empty() {
            return None;
        }
        let (resource, fragment) = split_fragment(url);
        Some(Self {
            resource: resource.to_string(),
            fragment: fragment.map(str::to_string),
        })
    }

    /// Parses an href as found in EPUB documents, decoding its
    /// percent-encoding.
    ///
    /// Returns [`None`] when the href is empty, carries an invalid
    /// percent-encoded sequence, or does not decode to UTF-8.
    pub fn from_epub_href(href: &str) -> Option<Self> {
        if href.is_empty() || !has_valid_percent_encoding(href) {
            return None;
        }
        let (resource, fragment) = split_fragment(href);
        Some(Self {
            resource: decode(resource)?.into_owned(),
            fragment: match fragment {
                Some(fragment) => Some(decode(fragment)?.into_owned()),
                None => None,
            },
        })
    }

    /// A url consisting of only an empty fragment (`#`),
    /// the href given to unlinked navigation entries.
    pub fn empty_fragment() -> Self {
        Self {
            resource: String::new(),
            fragment: Some(String::new()),
        }
    }

    /// The resource part, query included, fragment excluded.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The fragment identifier, without the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Resolves `relative` against this url, treating `self` as a file
    /// location: resolution starts at its parent directory.
    ///
    /// Absolute references and references carrying a scheme are
    /// returned as-is; fragment-only references point into `self`.
    pub fn resolve(&self, relative: &Url) -> Url {
        if relative.resource.starts_with('/') || relative.resource.contains(':') {
            return relative.clone();
        }
        if relative.resource.is_empty() {
            return Url {
                resource: self.resource.clone(),
                fragment: relative.fragment.clone(),
            };
        }
        // A query may contain `/`; keep it out of path normalization.
        let (path, query) = match relative.resource.find('?') {
            Some(index) => relative.resource.split_at(index),
            None => (relative.resource.as_str(), ""),
        };
        let mut resource = join(parent(&self.resource), path);
        resource.push_str(query);

        Url {
            resource,
            fragment: relative.fragment.clone(),
        }
    }

    /// Fragment-equivalence: the same resource, with fragments either
    /// equal or absent on at least one side.
    pub fn is_equivalent(&self, other: &Url) -> bool {
        self.resource == other.resource
            && match (&self.fragment, &other.fragment) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl PartialEq<&str> for Url {
    fn eq(&self, other: &&str) -> bool {
        let (resource, fragment) = split_fragment(other);
        self.resource == resource && self.fragment.as_deref() == fragment
    }
}

impl PartialEq<Url> for &str {
    fn eq(&self, other: &Url) -> bool {
        other == self
    }
}

fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.find('#') {
        Some(index) => (&url[..index], Some(&url[index + 1..])),
        None => (url, None),
    }
}

fn decode(encoded: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(encoded).decode_utf8().ok()
}

/// Every `%` must introduce a two-digit hex escape.
fn has_valid_percent_encoding(href: &str) -> bool {
    let bytes = href.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'%' {
            if index + 2 >= bytes.len()
                || !bytes[index + 1].is_ascii_hexdigit()
                || !bytes[index + 2].is_ascii_hexdigit()
            {
                return false;
            }
            index += 3;
        } else {
            index += 1;
        }
    }
    true
}

fn parent(href: &str) -> &str {
    href.rfind('/')
        .map_or("", |index| if index == 0 { "/" } else { &href[..index] })
}

/// Joins `relative` onto `parent_dir`, collapsing `.` and `..`
/// segments. Excess `..` segments never escape above the root.
fn join(parent_dir: &str, relative: &str) -> String {
    let absolute = parent_dir.starts_with('/');
    let mut stack: Vec<&str> = Vec::new();

    for segment in parent_dir.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            _ => stack.push(segment),
        }
    }
    let joined = stack.join("/");

    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}
