use std::fs;

mod common;
use crate::common::*;

use folia::*;

fn ids(doc: &Document, handles: &[ElementHandle]) -> Result<Vec<String>, FoliaError> {
    handles
        .iter()
        .map(|h| {
            doc.get_element(*h)
                .map(|e| e.id().unwrap_or("").to_string())
        })
        .collect()
}

#[test]
fn engine_returns_elements_of_interest() -> Result<(), FoliaError> {
    let mut engine = Engine::new(EXAMPLE_XML.as_bytes(), Config::default(), [ElementType::Word])?;
    let mut texts = Vec::new();
    while let Some(word) = engine.next_node()? {
        assert_eq!(
            engine.document().get_element(word)?.elementtype(),
            ElementType::Word
        );
        texts.push(engine.document().text(word, "current", false)?);
    }
    assert_eq!(texts, vec!["Hello", "world", ".", "Goodbye", "now"]);
    Ok(())
}

#[test]
fn engine_reads_metadata() -> Result<(), FoliaError> {
    let engine = Engine::new(EXAMPLE_XML.as_bytes(), Config::default(), [ElementType::Sentence])?;
    let doc = engine.document();
    assert_eq!(doc.id(), "example");
    assert_eq!(doc.declarations().len(), 7);
    assert_eq!(doc.metadata().get("language"), Some("en"));
    assert_eq!(
        doc.root()
            .and_then(|root| doc.get_element(root).ok())
            .and_then(|body| body.id()),
        Some("example.text")
    );
    Ok(())
}

#[test]
fn engine_builds_context() -> Result<(), FoliaError> {
    let mut engine = Engine::new(EXAMPLE_XML.as_bytes(), Config::default(), [ElementType::Word])?;
    let word = engine.next_node()?.expect("a word");
    let doc = engine.document();
    //the ancestors are there, the following siblings are not yet
    let ancestors = ids(doc, &doc.ancestors(word).collect::<Vec<_>>())?;
    assert_eq!(
        ancestors,
        vec!["example.p.1.s.1", "example.p.1", "example.text"]
    );
    assert_eq!(doc.next_sibling(word), None);
    //the annotations of the word are complete
    let pos = doc.annotation(word, ElementType::PosAnnotation, None)?;
    assert_eq!(doc.get_element(pos)?.class(), Some("INTJ"));
    Ok(())
}

#[test]
fn engine_iterator() -> Result<(), FoliaError> {
    let engine = Engine::new(
        EXAMPLE_XML.as_bytes(),
        Config::default(),
        [ElementType::Sentence, ElementType::Entity],
    )?;
    let handles: Vec<ElementHandle> = engine.collect::<Result<_, _>>()?;
    assert_eq!(handles.len(), 2);
    Ok(())
}

#[test]
fn engine_equals_full_parse() -> Result<(), FoliaError> {
    let full = example_document()?;
    let engine = Engine::new(EXAMPLE_XML.as_bytes(), Config::default(), [ElementType::Word])?;
    let streamed = engine.finish()?;
    assert_eq!(streamed.to_xml_string()?, full.to_xml_string()?);
    Ok(())
}

#[test]
fn engine_flush_writes_output() -> Result<(), FoliaError> {
    let full = example_document()?;
    let mut path = std::env::temp_dir();
    path.push("folia_engine_flush.folia.xml");
    let filename = path.to_string_lossy().into_owned();
    let mut engine = Engine::new(
        EXAMPLE_XML.as_bytes(),
        Config::default(),
        [ElementType::Paragraph],
    )?
    .with_output_file(&filename)?;
    let mut paragraphs = 0;
    while let Some(_paragraph) = engine.next_node()? {
        paragraphs += 1;
        engine.flush()?;
        //only the body remains in memory
        let doc = engine.document();
        let root = doc.root().expect("root");
        assert_eq!(doc.children(root).count(), 0);
    }
    assert_eq!(paragraphs, 2);
    let doc = engine.finish()?;
    assert_eq!(doc.len(), 1);
    let written = fs::read_to_string(&filename).map_err(|e| {
        FoliaError::IOError(e, filename.clone(), "reading engine output")
    })?;
    assert_eq!(written, full.to_xml_string()?);
    //the output is a valid document again
    let reparsed = Document::from_xml(&written, Config::default())?;
    let s1 = reparsed.resolve("example.p.1.s.1")?;
    assert_eq!(reparsed.text(s1, "current", false)?, "Hello world.");
    Ok(())
}

#[test]
fn engine_modifications_are_written() -> Result<(), FoliaError> {
    let mut path = std::env::temp_dir();
    path.push("folia_engine_modify.folia.xml");
    let filename = path.to_string_lossy().into_owned();
    let mut engine = Engine::new(EXAMPLE_XML.as_bytes(), Config::default(), [ElementType::Word])?
        .with_output_file(&filename)?;
    while let Some(word) = engine.next_node()? {
        let doc = engine.document_mut();
        if doc.annotations(word, ElementType::LemmaAnnotation, None).is_empty() {
            let text = doc.text(word, "current", false)?.to_lowercase();
            doc.add(
                word,
                ElementBuilder::new(ElementType::LemmaAnnotation).with_class(text),
            )?;
        }
    }
    engine.finish()?;
    let doc = Document::from_file(&filename, Config::default())?;
    let word = doc.element_by_id("example.p.2.s.1.w.1")?;
    assert_eq!(
        word.annotation(ElementType::LemmaAnnotation, None)?.class(),
        Some("goodbye")
    );
    Ok(())
}

#[test]
fn engine_forward_reference() -> Result<(), FoliaError> {
    //the entity refers to a word in a later paragraph
    let xml = EXAMPLE_XML.replace(
        "<wref id=\"example.p.1.s.1.w.2\" t=\"world\"/>",
        "<wref id=\"example.p.2.s.1.w.1\" t=\"Goodbye\"/>",
    );
    //a full parse resolves it
    let doc = Document::from_xml(&xml, Config::default())?;
    let entity = doc.element_by_id("example.p.1.s.1.entity.1")?;
    assert_eq!(entity.wrefs().count(), 1);
    //the engine can not
    let mut engine = Engine::new(xml.as_bytes(), Config::default(), [ElementType::Paragraph])?;
    assert!(matches!(
        engine.next_node(),
        Err(FoliaError::EngineError(..))
    ));
    Ok(())
}

#[test]
fn engine_from_file() -> Result<(), FoliaError> {
    let filename = write_temp_file("folia_engine_input.folia.xml", EXAMPLE_XML);
    let engine = Engine::from_file(&filename, Config::default(), [ElementType::Word])?;
    assert_eq!(engine.count(), 5);
    Ok(())
}

#[test]
fn engine_memory_stays_bounded() -> Result<(), FoliaError> {
    let xml = generate_xml(50, 5, 10);
    let mut engine = Engine::new(xml.as_bytes(), Config::default(), [ElementType::Paragraph])?;
    let mut peak = 0;
    let mut count = 0;
    while let Some(_paragraph) = engine.next_node()? {
        peak = peak.max(engine.document().len());
        engine.flush()?;
        count += 1;
    }
    assert_eq!(count, 50);
    //about one paragraph at a time: 5 sentences of 10 words with text and pos
    let paragraph = 1 + 5 * (1 + 10 * 4);
    assert!(peak < 2 * paragraph);
    assert_eq!(engine.document().len(), 1);
    Ok(())
}

#[test]
fn text_index() -> Result<(), FoliaError> {
    let index = TextIndex::build(EXAMPLE_XML.as_bytes())?;
    let root = index.get(0).expect("root");
    assert_eq!(root.tag, "FoLiA");
    assert_eq!(root.depth, 0);
    assert_eq!(root.parent, None);
    let body = (0..index.len())
        .filter_map(|i| index.get(i))
        .find(|n| n.tag == "text")
        .expect("body");
    assert_eq!(body.depth, 1);
    let parents = index.enumerate_text_parents("current");
    assert_eq!(parents.len(), 5);
    for (i, next) in parents.iter() {
        assert_eq!(index.get(*i).map(|n| n.tag.as_str()), Some("w"));
        if let Some(next) = next {
            assert!(next > i);
        }
    }
    //the last word is the last element
    assert_eq!(parents.last().and_then(|(_, next)| *next), None);
    assert!(index.enumerate_text_parents("original").is_empty());
    Ok(())
}

#[test]
fn text_engine_equals_text_parents() -> Result<(), FoliaError> {
    let full = example_document()?;
    let root = full.root().expect("root");
    let expected = ids(&full, &full.text_parents(root, "current"))?;

    let mut engine = TextEngine::from_xml(EXAMPLE_XML, Config::default(), "current")?;
    assert_eq!(engine.text_parents().len(), 5);
    let mut streamed = Vec::new();
    let mut texts = Vec::new();
    while let Some(handle) = engine.next_text_parent()? {
        let doc = engine.document();
        streamed.push(doc.get_element(handle)?.id().unwrap_or("").to_string());
        texts.push(doc.text(handle, "current", false)?);
    }
    assert_eq!(streamed, expected);
    assert_eq!(texts, vec!["Hello", "world", ".", "Goodbye", "now"]);
    Ok(())
}

#[test]
fn text_engine_sentence_level() -> Result<(), FoliaError> {
    //without token-level text, sentences hold the text
    let xml = generate_xml(2, 2, 3).replace("<t>", "<t class=\"ocr\">");
    let mut xml = xml;
    xml = xml.replace(
        "<s xml:id=\"generated.p.1.s.1\">",
        "<s xml:id=\"generated.p.1.s.1\"><t>word1 word2 word3</t>",
    );
    let doc = Document::from_xml(&xml, Config::default())?;
    let root = doc.root().expect("root");
    let expected = ids(&doc, &doc.text_parents(root, "current"))?;
    assert_eq!(expected, vec!["generated.p.1.s.1"]);
    let engine = TextEngine::from_xml(&xml, Config::default(), "current")?;
    let handles: Vec<ElementHandle> = engine.collect::<Result<_, _>>()?;
    assert_eq!(handles.len(), 1);
    Ok(())
}

#[test]
fn text_engine_body_level() -> Result<(), FoliaError> {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<FoLiA xmlns="http://ilk.uvt.nl/folia" xml:id="d" version="2.5.0">
  <metadata type="native"><annotations/></metadata>
  <text xml:id="d.text"><t>Hello world.</t></text>
</FoLiA>"#;
    let doc = Document::from_xml(xml, Config::default())?;
    let root = doc.root().expect("root");
    let expected = ids(&doc, &doc.text_parents(root, "current"))?;
    assert_eq!(expected, vec!["d.text"]);

    let mut engine = TextEngine::from_xml(xml, Config::default(), "current")?;
    let mut streamed = Vec::new();
    while let Some(handle) = engine.next_text_parent()? {
        let doc = engine.document();
        streamed.push(doc.get_element(handle)?.id().unwrap_or("").to_string());
        assert_eq!(doc.text(handle, "current", false)?, "Hello world.");
    }
    assert_eq!(streamed, expected);
    Ok(())
}

#[test]
fn text_engine_from_file() -> Result<(), FoliaError> {
    let filename = write_temp_file("folia_textengine_input.folia.xml", EXAMPLE_XML);
    let engine = TextEngine::from_file(&filename, Config::default(), "current")?;
    assert_eq!(engine.count(), 5);
    Ok(())
}

#[test]
fn engine_meminfo() -> Result<(), FoliaError> {
    let xml = generate_xml(20, 5, 10);
    let full = Document::from_xml(&xml, Config::default())?;
    let mut engine = Engine::new(xml.as_bytes(), Config::default(), [ElementType::Paragraph])?;
    while let Some(_paragraph) = engine.next_node()? {
        engine.flush()?;
    }
    assert!(engine.meminfo() > 0);
    assert!(engine.meminfo() < full.meminfo());
    Ok(())
}
