use navpack::xml::ElementNode;
use navpack::{PackageDocument, ReadingProgression, Url};

fn parse(opf: &str) -> Option<PackageDocument> {
    let document = ElementNode::parse(opf.as_bytes()).unwrap();
    let path = Url::parse("OEBPS/package.opf").unwrap();

    PackageDocument::parse(&document, &path)
}

fn opf(attributes: &str, body: &str) -> String {
    format!(
        r#"<package xmlns="http://www.idpf.org/2007/opf"
                    xmlns:dc="http://purl.org/dc/elements/1.1/" {attributes}>
            <metadata>
                <dc:identifier id="uid">urn:uuid:0</dc:identifier>
                <dc:title>Fixture</dc:title>
            </metadata>
            {body}
        </package>"#
    )
}

const MINIMAL_BODY: &str = r#"
    <manifest>
        <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine>
        <itemref idref="c1"/>
    </spine>"#;

#[test]
fn missing_manifest_yields_absent() {
    let document = opf("version=\"3.0\"", "<spine><itemref idref=\"c1\"/></spine>");
    assert!(parse(&document).is_none());
}

#[test]
fn missing_spine_yields_absent() {
    let document = opf(
        "version=\"3.0\"",
        "<manifest><item id=\"c1\" href=\"c1.xhtml\"/></manifest>",
    );
    assert!(parse(&document).is_none());
}

#[test]
fn missing_metadata_yields_absent() {
    let document = format!(
        r#"<package xmlns="http://www.idpf.org/2007/opf" version="3.0">{MINIMAL_BODY}</package>"#
    );
    assert!(parse(&document).is_none());
}

#[test]
fn version_defaults_to_legacy_when_absent_or_unparsable() {
    assert_eq!(1.2, parse(&opf("", MINIMAL_BODY)).unwrap().epub_version);
    assert_eq!(
        1.2,
        parse(&opf("version=\"next\"", MINIMAL_BODY))
            .unwrap()
            .epub_version,
    );
    assert_eq!(
        3.0,
        parse(&opf("version=\"3.0\"", MINIMAL_BODY))
            .unwrap()
            .epub_version,
    );
}

#[test]
fn unique_identifier_is_kept_verbatim() {
    let package = parse(&opf(
        "version=\"3.0\" unique-identifier=\"no-such-id\"",
        MINIMAL_BODY,
    ))
    .unwrap();

    // No existence check against the metadata at this stage.
    assert_eq!(Some("no-such-id"), package.unique_identifier_id.as_deref());
}

#[test]
fn items_without_a_resolvable_href_are_dropped() {
    let package = parse(&opf(
        "version=\"3.0\"",
        r#"<manifest>
               <item id="c1" href="c1.xhtml"/>
               <item id="broken" href=""/>
               <item id="encoded" href="file%20name.xhtml"/>
               <item id="invalid" href="bad%zz.xhtml"/>
               <item id="nohref"/>
           </manifest>
           <spine><itemref idref="c1"/></spine>"#,
    ))
    .unwrap();

    let ids: Vec<&str> = package
        .manifest
        .iter()
        .filter_map(|item| item.id.as_deref())
        .collect();
    assert_eq!(vec!["c1", "encoded"], ids);
    assert_eq!("OEBPS/file name.xhtml", package.manifest[1].href);
}

#[test]
fn item_attributes_are_parsed() {
    let package = parse(&opf(
        "version=\"3.0\"",
        r#"<manifest>
               <item id="c1" href="text/c1.xhtml" media-type="application/xhtml+xml"
                     fallback="c2" media-overlay="mo1" properties="nav scripted"/>
           </manifest>
           <spine><itemref idref="c1"/></spine>"#,
    ))
    .unwrap();
    let item = &package.manifest[0];

    assert_eq!("OEBPS/text/c1.xhtml", item.href);
    assert_eq!(Some("c2"), item.fallback.as_deref());
    assert_eq!(Some("mo1"), item.media_overlay.as_deref());
    assert_eq!(Some("application/xhtml+xml"), item.media_type.as_deref());
    assert_eq!(
        vec![
            "http://idpf.org/epub/vocab/package/item/#nav".to_string(),
            "http://idpf.org/epub/vocab/package/item/#scripted".to_string(),
        ],
        item.properties,
    );
}

#[test]
fn linear_requires_the_exact_literal_no() {
    let package = parse(&opf(
        "version=\"3.0\"",
        r#"<manifest><item id="c1" href="c1.xhtml"/></manifest>
           <spine>
               <itemref idref="a" linear="no"/>
               <itemref idref="b" linear="NO"/>
               <itemref idref="c" linear="false"/>
               <itemref idref="d"/>
               <itemref/>
           </spine>"#,
    ))
    .unwrap();
    let itemrefs = &package.spine.itemrefs;

    // The itemref without an idref is dropped.
    assert_eq!(4, itemrefs.len());
    assert!(!itemrefs[0].linear);
    assert!(itemrefs[1].linear);
    assert!(itemrefs[2].linear);
    assert!(itemrefs[3].linear);
}

#[test]
fn spine_toc_is_version_gated() {
    let spine = r#"<manifest><item id="c1" href="c1.xhtml"/></manifest>
                   <spine toc="ncx1"><itemref idref="c1"/></spine>"#;

    let epub2 = parse(&opf("version=\"2.0\"", spine)).unwrap();
    assert_eq!(Some("ncx1"), epub2.spine.toc.as_deref());

    let epub3 = parse(&opf("version=\"3.0\"", spine)).unwrap();
    assert_eq!(None, epub3.spine.toc);
}

#[test]
fn reading_progression_direction() {
    let body = |direction: &str| {
        format!(
            r#"<manifest><item id="c1" href="c1.xhtml"/></manifest>
               <spine page-progression-direction="{direction}"><itemref idref="c1"/></spine>"#
        )
    };

    let rtl = parse(&opf("version=\"3.0\"", &body("rtl"))).unwrap();
    assert_eq!(Some(ReadingProgression::Rtl), rtl.spine.direction);

    let default = parse(&opf("version=\"3.0\"", &body("default"))).unwrap();
    assert_eq!(None, default.spine.direction);

    let absent = parse(&opf("version=\"3.0\"", MINIMAL_BODY)).unwrap();
    assert_eq!(None, absent.spine.direction);
}

#[test]
fn guide_types_are_remapped_to_epub3_terms() {
    let package = parse(&opf(
        "version=\"2.0\"",
        r#"<manifest><item id="c1" href="c1.xhtml"/></manifest>
           <spine><itemref idref="c1"/></spine>
           <guide>
               <reference type="text" title="Begin" href="c1.xhtml"/>
               <reference type="title-page" href="titlepage.xhtml"/>
               <reference href="untyped.xhtml"/>
               <reference type="cover"/>
           </guide>"#,
    ))
    .unwrap();

    // The reference without an href is dropped.
    assert_eq!(3, package.guide.len());

    let begin = &package.guide[0];
    assert_eq!("OEBPS/c1.xhtml", begin.href);
    assert_eq!(Some("Begin"), begin.title.as_deref());
    assert!(
        begin
            .rels
            .contains("http://idpf.org/epub/vocab/structure/#bodymatter")
    );
    assert!(
        package.guide[1]
            .rels
            .contains("http://idpf.org/epub/vocab/structure/#titlepage")
    );
    // A missing type yields an empty relation set, not an error.
    assert!(package.guide[2].rels.is_empty());
}

#[test]
fn guide_is_still_parsed_for_nonconformant_epub3() {
    // EPUB 3 dropped the guide element, but the parser stays
    // permissive; ignoring the guide is the assembly stage's call.
    let package = parse(&opf(
        "version=\"3.0\"",
        r#"<manifest><item id="c1" href="c1.xhtml"/></manifest>
           <spine><itemref idref="c1"/></spine>
           <guide><reference type="text" href="c1.xhtml"/></guide>"#,
    ))
    .unwrap();

    assert_eq!(1, package.guide.len());
}

#[test]
fn declared_prefixes_override_reserved_ones() {
    let document = format!(
        r#"<package xmlns="http://www.idpf.org/2007/opf"
                    xmlns:dc="http://purl.org/dc/elements/1.1/"
                    version="3.0"
                    prefix="media: http://example.com/media# custom: http://example.com/custom#">
            <metadata><dc:title>Fixture</dc:title></metadata>
            <manifest>
                <item id="c1" href="c1.xhtml" properties="media:active custom:flag unknown:flag"/>
            </manifest>
            <spine><itemref idref="c1"/></spine>
        </package>"#
    );
    let package = parse(&document).unwrap();

    assert_eq!(
        vec![
            "http://example.com/media#active".to_string(),
            "http://example.com/custom#flag".to_string(),
        ],
        package.manifest[0].properties,
    );
}

#[test]
fn itemref_properties_resolve_against_the_itemref_vocabulary() {
    let package = parse(&opf(
        "version=\"3.0\"",
        r#"<manifest><item id="c1" href="c1.xhtml"/></manifest>
           <spine>
               <itemref idref="c1" properties="page-spread-left"/>
           </spine>"#,
    ))
    .unwrap();

    assert_eq!(
        vec!["http://idpf.org/epub/vocab/package/itemref/#page-spread-left".to_string()],
        package.spine.itemrefs[0].properties,
    );
}
