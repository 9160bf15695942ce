//! # navpack
//!
//! A parsing core for EPUB package documents (OPF), EPUB 3 navigation
//! documents, and SMIL media overlays.
//!
//! The crate consumes already-materialized XML trees
//! ([`xml::ElementNode`]) and produces owned, immutable models:
//! [`PackageDocument`], role-keyed navigation link tables, and
//! [`MediaOverlays`] narration trees. Fetching bytes, archive handling,
//! and rendering are the caller's concern; parsing here is synchronous,
//! pure, and free of shared state.
//!
//! Malformed individual entries (an unresolvable href, an unknown
//! vocabulary prefix) are dropped silently while the rest of the
//! document parses; missing mandatory structure surfaces as [`None`].
//!
//! ## Examples
//! Parsing a package document:
//! ```
//! use navpack::xml::ElementNode;
//! use navpack::{PackageDocument, Url};
//!
//! # fn main() -> Result<(), navpack::errors::ParseError> {
//! let opf = br#"<package xmlns="http://www.idpf.org/2007/opf"
//!                        xmlns:dc="http://purl.org/dc/elements/1.1/"
//!                        version="3.0" unique-identifier="uid">
//!     <metadata>
//!         <dc:identifier id="uid">urn:uuid:cafe</dc:identifier>
//!         <dc:title>Example</dc:title>
//!     </metadata>
//!     <manifest>
//!         <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>
//!     </manifest>
//!     <spine>
//!         <itemref idref="c1"/>
//!     </spine>
//! </package>"#;
//!
//! let document = ElementNode::parse(opf)?;
//! let path = Url::parse("OEBPS/package.opf").unwrap();
//! let package = PackageDocument::parse(&document, &path).unwrap();
//!
//! assert_eq!(3.0, package.epub_version);
//! assert_eq!("OEBPS/c1.xhtml", package.manifest[0].href);
//! assert!(package.spine.itemrefs[0].linear);
//! # Ok(())
//! # }
//! ```

mod epub;
mod link;
mod media_overlays;
mod url;

pub mod errors;
pub mod xml;

pub use self::epub::{
    Item, Itemref, MetadataItem, NavigationDocumentParser, PackageDocument, Publication, Spine,
};
pub use self::link::{Link, ReadingProgression};
pub use self::media_overlays::{Clip, MediaOverlayNode, MediaOverlays};
pub use self::url::Url;
