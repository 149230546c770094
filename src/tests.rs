/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

#[cfg(test)]
use crate::*;

#[cfg(test)]
use crate::text::ContentKind;

#[cfg(test)]
fn sentence_doc() -> Result<(Document, ElementHandle), FoliaError> {
    let mut doc = Document::new(Some("unit"), Config::default())?;
    let body = doc.add_body(ElementBuilder::new(ElementType::Text).with_id("unit.text"))?;
    let sentence = doc.add(
        body,
        ElementBuilder::new(ElementType::Sentence).with_id("unit.s.1"),
    )?;
    Ok((doc, sentence))
}

#[test]
fn schema_accepts() {
    assert!(accepts(ElementType::Text, ElementType::Paragraph));
    assert!(accepts(ElementType::Paragraph, ElementType::Sentence));
    assert!(accepts(ElementType::Sentence, ElementType::Word));
    assert!(accepts(ElementType::Word, ElementType::PosAnnotation));
    assert!(accepts(ElementType::Word, ElementType::TextContent));
    assert!(accepts(ElementType::TextContent, ElementType::XmlText));
    assert!(accepts(ElementType::EntitiesLayer, ElementType::Entity));
    assert!(accepts(ElementType::Entity, ElementType::Word));
    assert!(!accepts(ElementType::Sentence, ElementType::Sentence));
    assert!(!accepts(ElementType::Word, ElementType::Sentence));
    assert!(!accepts(ElementType::PosAnnotation, ElementType::Word));
}

#[test]
fn schema_tags() {
    for elementtype in ElementType::ALL.iter().filter(|t| !t.is_raw()) {
        assert_eq!(
            ElementType::from_tag(elementtype.xmltag()),
            Some(*elementtype),
            "tag {} must map back to its kind",
            elementtype.xmltag()
        );
    }
    assert_eq!(ElementType::from_tag("w"), Some(ElementType::Word));
    assert_eq!(ElementType::from_tag("s"), Some(ElementType::Sentence));
    assert_eq!(ElementType::from_tag("nonexistent"), None);
}

#[test]
fn attribute_names() {
    assert_eq!(Attrib::from_attribute_name("xml:id"), Some(Attrib::ID));
    assert_eq!(Attrib::from_attribute_name("annotatortype"), Some(Attrib::ANNOTATOR));
    assert_eq!(Attrib::from_attribute_name("head"), None);
    assert!(properties(ElementType::Word).allowed().contains(Attrib::SPACE));
}

#[test]
fn schema_properties() {
    assert_eq!(properties(ElementType::Word).textdelimiter, Some(" "));
    assert_eq!(properties(ElementType::Sentence).textdelimiter, Some(" "));
    assert_eq!(properties(ElementType::Paragraph).textdelimiter, Some("\n\n"));
    assert_eq!(
        properties(ElementType::Entity).layer,
        Some(ElementType::EntitiesLayer)
    );
    assert_eq!(
        ElementType::Word.annotationtype(),
        AnnotationType::Token
    );
    assert_eq!(
        ElementType::EntitiesLayer.annotationtype(),
        AnnotationType::Entity
    );
    assert_eq!(ElementType::Word.family(), ElementFamily::Structure);
    assert!(ElementType::Entity.is_cross_referencing());
    assert!(!ElementType::Sentence.is_cross_referencing());
    assert!(ElementType::Word.is_wrefable());
    assert!(is_subkind(ElementType::Entity, ElementFamily::SpanAnnotation));
}

#[test]
fn feature_shorthand_lookup() {
    assert_eq!(
        feature_for_subset(ElementType::PosAnnotation, "head"),
        Some(ElementType::HeadFeature)
    );
    assert_eq!(feature_for_subset(ElementType::Word, "head"), None);
}

#[test]
fn valid_ids() {
    assert!(is_valid_id("s1"));
    assert!(is_valid_id("example.p.1.s.1.w.3"));
    assert!(is_valid_id("_x-y"));
    assert!(!is_valid_id(""));
    assert!(!is_valid_id("1abc"));
    assert!(!is_valid_id("a b"));
    assert!(!is_valid_id("a:b"));
}

#[test]
fn annotationtype_names() {
    assert_eq!(
        AnnotationType::from_declaration_tag("pos-annotation"),
        Some(AnnotationType::Pos)
    );
    assert_eq!(AnnotationType::Token.declaration_tag(), "token-annotation");
    assert_eq!(AnnotationType::from_declaration_tag("pos"), None);
    assert_eq!(AnnotationType::from_name("none"), Some(AnnotationType::NoAnnotation));
}

#[test]
fn datetime_roundtrip() -> Result<(), FoliaError> {
    let datetime = parse_datetime("2023-05-01T12:30:00")?;
    assert_eq!(format_datetime(&datetime), "2023-05-01T12:30:00");
    assert!(parse_datetime("yesterday").is_err());
    Ok(())
}

#[test]
fn config_defaults() {
    let config = Config::default();
    assert!(!config.permissive());
    assert!(config.checktext());
    assert!(!config.autodeclare());
    assert!(config.generate_ids());
    assert_eq!(config.indent(), 2);
    assert_eq!(config.ns_label(), None);
}

#[test]
fn config_modes() -> Result<(), FoliaError> {
    let mut config = Config::default();
    config.set_mode("permissive, nochecktext,autodeclare")?;
    assert!(config.permissive());
    assert!(!config.checktext());
    assert!(config.autodeclare());
    let modes = config.mode();
    let mut other = Config::default();
    other.set_mode(&modes)?;
    assert_eq!(other.mode(), modes);
    assert!(config.set_mode("bogus").is_err());
    Ok(())
}

#[test]
fn declarations_idempotent() {
    let mut declarations = Declarations::new();
    assert!(declarations.add(Declaration::new(AnnotationType::Pos, Some("set1"))));
    assert!(!declarations.add(Declaration::new(AnnotationType::Pos, Some("set1"))));
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations.default_set(AnnotationType::Pos), Some("set1"));
    assert!(declarations.add(Declaration::new(AnnotationType::Pos, Some("set2"))));
    assert_eq!(declarations.default_set(AnnotationType::Pos), None);
    assert!(declarations.is_declared(AnnotationType::Pos, Some("set2")));
    assert!(!declarations.is_declared(AnnotationType::Lemma, Some("set2")));
    assert!(declarations.is_declared(AnnotationType::NoAnnotation, None));
}

#[test]
fn declarations_alias_and_defaults() {
    let mut declarations = Declarations::new();
    declarations.add(
        Declaration::new(AnnotationType::Pos, Some("https://example.org/pos"))
            .with_alias("pos")
            .with_annotator("tagger")
            .with_annotatortype(AnnotatorType::Auto),
    );
    assert_eq!(
        declarations.resolve_alias(AnnotationType::Pos, "pos"),
        Some("https://example.org/pos")
    );
    assert_eq!(
        declarations.default_annotator(AnnotationType::Pos, None),
        Some("tagger")
    );
    //a conflicting default makes the default ambiguous
    declarations.add(
        Declaration::new(AnnotationType::Pos, Some("https://example.org/pos")).with_annotator("other"),
    );
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations.default_annotator(AnnotationType::Pos, None), None);
}

#[test]
fn selector_defaults() {
    let selector = Selector::new(ElementType::Word);
    assert!(selector.recursive);
    assert!(selector.exclude.contains(&ElementType::Original));
    assert!(selector.exclude.contains(&ElementType::Suggestion));
    let selector = selector.with_recursion(false).also_exclude(ElementType::Quote);
    assert!(!selector.recursive);
    assert!(selector.exclude.contains(&ElementType::Quote));
}

#[test]
fn generate_ids_sequential() -> Result<(), FoliaError> {
    let (mut doc, sentence) = sentence_doc()?;
    assert_eq!(doc.generate_id(sentence, "w")?, "unit.s.1.w.1");
    assert_eq!(doc.generate_id(sentence, "w")?, "unit.s.1.w.2");
    assert_eq!(doc.generate_id(sentence, "correction")?, "unit.s.1.correction.1");
    Ok(())
}

#[test]
fn generate_ids_seeded_from_existing() -> Result<(), FoliaError> {
    let (mut doc, sentence) = sentence_doc()?;
    doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word).with_id("unit.s.1.w.7"),
    )?;
    assert_eq!(doc.generate_id(sentence, "w")?, "unit.s.1.w.8");
    Ok(())
}

#[test]
fn store_handles_are_generational() -> Result<(), FoliaError> {
    let (mut doc, sentence) = sentence_doc()?;
    let word = doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word).with_id("unit.s.1.w.1"),
    )?;
    doc.remove(sentence, word, true)?;
    assert!(doc.get_element(word).is_err());
    assert!(doc.resolve("unit.s.1.w.1").is_err());
    let other = doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word).with_id("unit.s.1.w.1"),
    )?;
    assert_ne!(word, other);
    assert!(doc.get_element(word).is_err());
    assert!(doc.get_element(other).is_ok());
    Ok(())
}

#[test]
fn content_child_by_class() -> Result<(), FoliaError> {
    let (mut doc, sentence) = sentence_doc()?;
    let word = doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word)
            .with_text("hello")
            .with_text_in_class("helo", "original"),
    )?;
    assert!(doc.content_child(word, "current", ContentKind::Text).is_some());
    assert!(doc.content_child(word, "original", ContentKind::Text).is_some());
    assert!(doc.content_child(word, "other", ContentKind::Text).is_none());
    assert!(doc.content_child(word, "current", ContentKind::Phon).is_none());
    Ok(())
}

#[test]
fn delimiters() -> Result<(), FoliaError> {
    let (mut doc, sentence) = sentence_doc()?;
    let word = doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word)
            .with_text("cat")
            .with_space(false),
    )?;
    assert_eq!(doc.get_delimiter(word, false)?, "");
    assert_eq!(doc.get_delimiter(word, true)?, " ");
    assert_eq!(doc.get_delimiter(sentence, false)?, " ");
    Ok(())
}

#[test]
fn xml_cursor_depth_and_index() -> Result<(), FoliaError> {
    let xml = r#"<a><b x="1"><c/></b><!-- note --><d>text</d></a>"#;
    let mut cursor = XmlCursor::new(xml.as_bytes());
    let mut elements = Vec::new();
    while cursor.read()? {
        if cursor.nodetype() == NodeType::Element {
            elements.push((cursor.local_name().to_string(), cursor.depth()));
        }
    }
    assert_eq!(
        elements,
        vec![
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            ("c".to_string(), 2),
            ("d".to_string(), 1)
        ]
    );
    assert_eq!(cursor.elements_read(), 4);
    Ok(())
}

#[test]
fn xml_cursor_invalid_utf8() {
    let xml: &[u8] = b"<a><!-- caf\xe9 --><b/></a>";
    let mut cursor = XmlCursor::new(xml);
    let result = loop {
        match cursor.read() {
            Ok(true) => continue,
            other => break other,
        }
    };
    assert!(matches!(result, Err(FoliaError::XmlFormatError(..))));
}

#[test]
fn xml_tree_parse() -> Result<(), FoliaError> {
    let xml = r#"<root xmlns="urn:x"><child key="value">some <b>bold</b> text</child></root>"#;
    let root = XmlTree::parse(xml.as_bytes())?;
    assert_eq!(root.name, "root");
    assert_eq!(root.namespace.as_deref(), Some("urn:x"));
    let child = root.elements().next().expect("child element");
    assert_eq!(child.attribute("key"), Some("value"));
    //only direct text children
    assert_eq!(child.text(), "some  text");
    Ok(())
}

#[test]
fn provenance_generated_ids() -> Result<(), FoliaError> {
    let mut doc = Document::new(Some("unit"), Config::default())?;
    let tok = doc.add_processor(ProcessorBuilder::new("tokeniser"), None)?;
    doc.add_processor(ProcessorBuilder::new("sub"), Some(tok))?;
    assert_eq!(doc.provenance().len(), 2);
    let names: Vec<&str> = doc
        .provenance()
        .iter_depthfirst()
        .map(|p| p.name())
        .collect();
    assert_eq!(names, vec!["tokeniser", "sub"]);
    let ids: Vec<&str> = doc
        .provenance()
        .iter_depthfirst()
        .map(|p| p.id())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    Ok(())
}

#[test]
fn config_to_json() -> Result<(), FoliaError> {
    let config = Config::default().with_permissive(true);
    let json = config.to_json_string(false)?;
    assert!(json.contains("\"permissive\""));
    Ok(())
}

#[test]
fn config_from_file() -> Result<(), FoliaError> {
    let mut path = std::env::temp_dir();
    path.push("folia_config.json");
    std::fs::write(&path, r#"{ "permissive": true, "indent": 4 }"#)
        .map_err(|e| FoliaError::IOError(e, String::new(), "writing test config"))?;
    let config = Config::from_file(&path.to_string_lossy())?;
    assert!(config.permissive());
    assert_eq!(config.indent(), 4);
    //unspecified fields keep their defaults
    assert!(config.checktext());
    assert!(!config.strip());
    Ok(())
}
