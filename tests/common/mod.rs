#![allow(dead_code)]
use std::env;
use std::fs::File;
use std::io::prelude::*;

use folia::*;

pub const POS_SET: &str = "https://example.org/pos";
pub const LEMMA_SET: &str = "https://example.org/lemma";
pub const ENTITY_SET: &str = "https://example.org/entities";
pub const CORRECTION_SET: &str = "https://example.org/corrections";

/// A small document with two paragraphs: the first has sentence-level text, tokens with part-of-speech
/// and lemma annotations and a named entity, the second only has token-level text.
pub const EXAMPLE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FoLiA xmlns="http://ilk.uvt.nl/folia" xmlns:xlink="http://www.w3.org/1999/xlink" xml:id="example" version="2.5.0">
  <metadata type="native">
    <annotations>
      <token-annotation/>
      <sentence-annotation/>
      <paragraph-annotation/>
      <pos-annotation set="https://example.org/pos" annotator="tagger" annotatortype="auto"/>
      <lemma-annotation set="https://example.org/lemma"/>
      <entity-annotation set="https://example.org/entities"/>
      <correction-annotation set="https://example.org/corrections"/>
    </annotations>
    <meta id="language">en</meta>
  </metadata>
  <text xml:id="example.text">
    <p xml:id="example.p.1">
      <s xml:id="example.p.1.s.1">
        <t>Hello world.</t>
        <w xml:id="example.p.1.s.1.w.1">
          <t>Hello</t>
          <pos class="INTJ"/>
          <lemma class="hello"/>
        </w>
        <w xml:id="example.p.1.s.1.w.2" space="no">
          <t>world</t>
          <pos class="NOUN"/>
          <lemma class="world"/>
        </w>
        <w xml:id="example.p.1.s.1.w.3">
          <t>.</t>
          <pos class="PUNCT"/>
        </w>
        <entities>
          <entity xml:id="example.p.1.s.1.entity.1" class="misc">
            <wref id="example.p.1.s.1.w.2" t="world"/>
          </entity>
        </entities>
      </s>
    </p>
    <p xml:id="example.p.2">
      <s xml:id="example.p.2.s.1">
        <w xml:id="example.p.2.s.1.w.1">
          <t>Goodbye</t>
        </w>
        <w xml:id="example.p.2.s.1.w.2">
          <t>now</t>
        </w>
      </s>
    </p>
  </text>
</FoLiA>
"#;

pub fn example_document() -> Result<Document, FoliaError> {
    Document::from_xml(EXAMPLE_XML, Config::default())
}

/// Writes content to a file in the temporary directory and returns its path
pub fn write_temp_file(filename: &str, content: &str) -> String {
    let mut path = env::temp_dir();
    path.push(filename);
    let mut f = File::create(&path).expect("creating temporary file");
    f.write_all(content.as_bytes())
        .expect("writing temporary file");
    path.to_string_lossy().into_owned()
}

/// A new document with a body and one sentence, with the token, sentence and pos types declared
pub fn setup_document() -> Result<(Document, ElementHandle), FoliaError> {
    let mut doc = Document::new(Some("test"), Config::default())?;
    doc.declare(AnnotationType::Token, None, None, None, None)?;
    doc.declare(AnnotationType::Sentence, None, None, None, None)?;
    doc.declare(AnnotationType::Pos, Some(POS_SET), None, None, None)?;
    let body = doc.add_body(ElementBuilder::new(ElementType::Text).with_id("test.text"))?;
    let sentence = doc.add(
        body,
        ElementBuilder::new(ElementType::Sentence).with_id("test.s.1"),
    )?;
    Ok((doc, sentence))
}

/// Adds words to a sentence; each word is given as its text and whether it is followed by a space
pub fn add_words(
    doc: &mut Document,
    sentence: ElementHandle,
    words: &[(&str, bool)],
) -> Result<Vec<ElementHandle>, FoliaError> {
    let mut handles = Vec::with_capacity(words.len());
    for (text, space) in words {
        let id = doc.generate_id(sentence, "w")?;
        handles.push(doc.add(
            sentence,
            ElementBuilder::new(ElementType::Word)
                .with_id(id)
                .with_text(*text)
                .with_space(*space),
        )?);
    }
    Ok(handles)
}

/// Generates a larger document for throughput tests
pub fn generate_xml(paragraphs: usize, sentences: usize, words: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?>
<FoLiA xmlns="http://ilk.uvt.nl/folia" xml:id="generated" version="2.5.0">
  <metadata type="native">
    <annotations>
      <token-annotation/>
      <sentence-annotation/>
      <paragraph-annotation/>
      <pos-annotation set="https://example.org/pos"/>
    </annotations>
  </metadata>
  <text xml:id="generated.text">
"#,
    );
    for p in 1..=paragraphs {
        xml += &format!("    <p xml:id=\"generated.p.{}\">\n", p);
        for s in 1..=sentences {
            xml += &format!("      <s xml:id=\"generated.p.{}.s.{}\">\n", p, s);
            for w in 1..=words {
                xml += &format!(
                    "        <w xml:id=\"generated.p.{}.s.{}.w.{}\"><t>word{}</t><pos class=\"N\"/></w>\n",
                    p, s, w, w
                );
            }
            xml += "      </s>\n";
        }
        xml += "    </p>\n";
    }
    xml += "  </text>\n</FoLiA>\n";
    xml
}
