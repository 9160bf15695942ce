//! EPUB package-document and navigation-document parsing.

mod metadata;
mod navigation;
mod package;
mod publication;
pub(crate) mod vocab;

pub use metadata::MetadataItem;
pub use navigation::NavigationDocumentParser;
pub use package::{Item, Itemref, PackageDocument, Spine};
pub use publication::Publication;

/// XML namespaces encountered across EPUB documents.
pub(crate) mod ns {
    pub(crate) const OPF: &str = "http://www.idpf.org/2007/opf";
    pub(crate) const DC: &str = "http://purl.org/dc/elements/1.1/";
    pub(crate) const OPS: &str = "http://www.idpf.org/2007/ops";
    pub(crate) const XHTML: &str = "http://www.w3.org/1999/xhtml";
    pub(crate) const SMIL: &str = "http://www.w3.org/ns/SMIL";
}
