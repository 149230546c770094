use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use folia::{Config, Document, ElementType, Engine, Selector, TextEngine};

/// Generates a document with the given number of paragraphs, sentences per paragraph and words per sentence
fn generate_xml(paragraphs: usize, sentences: usize, words: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?>
<FoLiA xmlns="http://ilk.uvt.nl/folia" xml:id="bench" version="2.5.0">
  <metadata type="native">
    <annotations>
      <token-annotation/>
      <sentence-annotation/>
      <paragraph-annotation/>
      <pos-annotation set="https://example.org/pos"/>
    </annotations>
  </metadata>
  <text xml:id="bench.text">
"#,
    );
    for p in 1..=paragraphs {
        xml += &format!("    <p xml:id=\"bench.p.{}\">\n", p);
        for s in 1..=sentences {
            xml += &format!("      <s xml:id=\"bench.p.{}.s.{}\">\n", p, s);
            for w in 1..=words {
                xml += &format!(
                    "        <w xml:id=\"bench.p.{}.s.{}.w.{}\"><t>word{}</t><pos class=\"N\"/></w>\n",
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

pub fn bench_document(c: &mut Criterion) {
    let xml = generate_xml(20, 10, 20);

    let mut group = c.benchmark_group("document");
    group.throughput(Throughput::Bytes(xml.len() as u64));
    group.bench_function("parse", |b| {
        b.iter(|| {
            let doc = Document::from_xml(black_box(&xml), Config::default()).unwrap();
            assert!(doc.len() > 0);
        })
    });

    let doc = Document::from_xml(&xml, Config::default()).unwrap();
    let root = doc.root().unwrap();
    group.bench_function("text", |b| {
        b.iter(|| {
            let text = doc.text(black_box(root), "current", false).unwrap();
            assert!(!text.is_empty());
        })
    });
    group.bench_function("select_words", |b| {
        b.iter(|| {
            let count = doc
                .select(black_box(root), Selector::new(ElementType::Word))
                .count();
            assert_eq!(count, 20 * 10 * 20);
        })
    });
    group.bench_function("serialise", |b| {
        b.iter(|| {
            let out = doc.to_xml_string().unwrap();
            assert!(!out.is_empty());
        })
    });
    group.finish();
}

pub fn bench_streaming(c: &mut Criterion) {
    let xml = generate_xml(20, 10, 20);

    let mut group = c.benchmark_group("streaming");
    group.throughput(Throughput::Bytes(xml.len() as u64));
    group.bench_function("engine_sentences", |b| {
        b.iter(|| {
            let mut engine = Engine::new(
                black_box(xml.as_bytes()),
                Config::default(),
                [ElementType::Sentence],
            )
            .unwrap();
            let mut count = 0;
            while engine.next_node().unwrap().is_some() {
                engine.flush().unwrap();
                count += 1;
            }
            assert_eq!(count, 20 * 10);
        })
    });
    group.bench_function("text_engine", |b| {
        b.iter(|| {
            let engine =
                TextEngine::from_xml(black_box(&xml), Config::default(), "current").unwrap();
            assert_eq!(engine.count(), 20 * 10 * 20);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_document, bench_streaming);
criterion_main!(benches);
