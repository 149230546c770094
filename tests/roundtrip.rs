mod common;
use crate::common::*;

use folia::*;

#[test]
fn serialisation_is_stable() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let first = doc.to_xml_string()?;
    let reparsed = Document::from_xml(&first, Config::default())?;
    let second = reparsed.to_xml_string()?;
    assert_eq!(first, second);
    assert!(first.contains(&format!("generator=\"{}\"", GENERATOR)));
    Ok(())
}

#[test]
fn serialisation_uses_defaults() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let xml = doc.to_xml_string()?;
    //sets and annotators equal to the declaration defaults are implicit
    assert!(xml.contains("<pos class=\"INTJ\"/>"));
    assert!(xml.contains("<t>Hello</t>"));
    assert!(xml.contains(
        "<pos-annotation set=\"https://example.org/pos\" annotator=\"tagger\" annotatortype=\"auto\""
    ));
    Ok(())
}

#[test]
fn explicit_mode() -> Result<(), FoliaError> {
    let doc = Document::from_xml(EXAMPLE_XML, Config::default().with_explicit(true))?;
    let xml = doc.to_xml_string()?;
    assert_eq!(xml.matches("<pos set=\"https://example.org/pos\"").count(), 3);
    assert!(xml.contains("<t class=\"current\">Hello</t>"));
    assert!(xml.contains("annotator=\"tagger\""));
    //and it still parses to the same document
    let reparsed = Document::from_xml(&xml, Config::default())?;
    assert_eq!(reparsed.to_xml_string()?, example_document()?.to_xml_string()?);
    Ok(())
}

#[test]
fn strip_mode() -> Result<(), FoliaError> {
    let mut doc = example_document()?;
    doc.set_mode("strip")?;
    let xml = doc.to_xml_string()?;
    assert!(!xml.contains("generator="));
    //stripped output is still valid
    let reparsed = Document::from_xml(&xml, Config::default())?;
    let s1 = reparsed.resolve("example.p.1.s.1")?;
    assert_eq!(reparsed.text(s1, "current", false)?, "Hello world.");
    Ok(())
}

#[test]
fn canonical_mode() -> Result<(), FoliaError> {
    //sentence text after the words
    let xml = EXAMPLE_XML.replace("        <t>Hello world.</t>\n", "").replace(
        "        <entities>",
        "        <t>Hello world.</t>\n        <entities>",
    );
    let doc = Document::from_xml(&xml, Config::default())?;
    let out = doc.to_xml_string()?;
    let text = out.find("<t>Hello world.</t>").expect("sentence text");
    let word = out.find("xml:id=\"example.p.1.s.1.w.1\"").expect("first word");
    assert!(word < text);

    let doc = Document::from_xml(&xml, Config::default().with_canonical(true))?;
    let out = doc.to_xml_string()?;
    let text = out.find("<t>Hello world.</t>").expect("sentence text");
    let word = out.find("xml:id=\"example.p.1.s.1.w.1\"").expect("first word");
    let entities = out.find("<entities>").expect("layer");
    assert!(text < word);
    assert!(word < entities);
    Ok(())
}

#[test]
fn namespace_label() -> Result<(), FoliaError> {
    let doc = Document::from_xml(
        EXAMPLE_XML,
        Config::default().with_ns_label(Some("folia".to_string())),
    )?;
    let xml = doc.to_xml_string()?;
    assert!(xml.contains("<folia:FoLiA xmlns:folia=\"http://ilk.uvt.nl/folia\""));
    assert!(xml.contains("<folia:w xml:id=\"example.p.1.s.1.w.1\">"));
    assert!(xml.ends_with("</folia:FoLiA>\n"));
    let reparsed = Document::from_xml(&xml, Config::default())?;
    assert_eq!(reparsed.len(), doc.len());
    let root = reparsed.root().expect("root");
    assert_eq!(
        reparsed.text(root, "current", false)?,
        "Hello world.\n\nGoodbye now"
    );
    Ok(())
}

#[test]
fn no_indentation() -> Result<(), FoliaError> {
    let doc = Document::from_xml(EXAMPLE_XML, Config::default().with_indent(0))?;
    let xml = doc.to_xml_string()?;
    assert!(xml.contains("\n<p xml:id=\"example.p.1\">\n"));
    assert!(!xml.contains("\n "));
    Ok(())
}

#[test]
fn save_and_load() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let mut path = std::env::temp_dir();
    path.push("folia_roundtrip.folia.xml");
    let filename = path.to_string_lossy().into_owned();
    doc.save(&filename)?;
    let loaded = Document::from_file(&filename, Config::default())?;
    assert_eq!(loaded.filename(), Some(filename.as_str()));
    assert_eq!(loaded.id(), "example");
    assert_eq!(loaded.to_xml_string()?, doc.to_xml_string()?);
    Ok(())
}

#[test]
fn write_to_buffer() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let mut buffer: Vec<u8> = Vec::new();
    doc.write_to(&mut buffer)?;
    assert_eq!(String::from_utf8_lossy(&buffer), doc.to_xml_string()?);
    Ok(())
}

#[test]
fn built_document_roundtrip() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("The", true), ("cat", false), (".", true)])?;
    for (word, class) in words.iter().zip(["DET", "NOUN", "PUNCT"]) {
        doc.add(
            *word,
            ElementBuilder::new(ElementType::PosAnnotation).with_class(class),
        )?;
    }
    let xml = doc.to_xml_string()?;
    let reparsed = Document::from_xml(&xml, Config::default())?;
    assert_eq!(reparsed.id(), "test");
    let s = reparsed.resolve("test.s.1")?;
    assert_eq!(reparsed.text(s, "current", false)?, "The cat.");
    let word = reparsed.element_by_id("test.s.1.w.2")?;
    assert_eq!(
        word.annotation(ElementType::PosAnnotation, Some(POS_SET))?.class(),
        Some("NOUN")
    );
    assert_eq!(reparsed.to_xml_string()?, xml);
    Ok(())
}

#[test]
fn element_to_xml() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let word = doc.element_by_id("example.p.1.s.1.w.3")?;
    assert_eq!(
        word.to_xml()?,
        "<w xml:id=\"example.p.1.s.1.w.3\">\n  <t>.</t>\n  <pos class=\"PUNCT\"/>\n</w>\n"
    );
    Ok(())
}
