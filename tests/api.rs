mod common;
use crate::common::*;

use folia::*;

#[test]
fn parse_example() -> Result<(), FoliaError> {
    let doc = example_document()?;
    assert_eq!(doc.id(), "example");
    assert_eq!(doc.version(), "2.5.0");
    assert_eq!(doc.metadata().metadatatype(), "native");
    assert_eq!(doc.metadata().get("language"), Some("en"));
    assert_eq!(doc.declarations().len(), 7);
    assert_eq!(doc.default_set(AnnotationType::Pos), Some(POS_SET));
    assert!(doc.is_declared(AnnotationType::Entity, Some(ENTITY_SET)));
    assert!(!doc.is_declared(AnnotationType::Entity, Some(POS_SET)));
    let body = doc.body().expect("document must have a body");
    assert_eq!(body.id(), Some("example.text"));
    assert_eq!(body.elementtype(), ElementType::Text);
    assert_eq!(doc.warning_count(), 0);
    Ok(())
}

#[test]
fn parse_selects_words() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let root = doc.root().expect("root");
    let words: Vec<_> = doc
        .select(root, Selector::new(ElementType::Word))
        .map(|h| doc.get_element(h).map(|w| w.id().unwrap_or("").to_string()))
        .collect::<Result<_, _>>()?;
    assert_eq!(
        words,
        vec![
            "example.p.1.s.1.w.1",
            "example.p.1.s.1.w.2",
            "example.p.1.s.1.w.3",
            "example.p.2.s.1.w.1",
            "example.p.2.s.1.w.2",
        ]
    );
    Ok(())
}

#[test]
fn text_reconstruction() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let s1 = doc.resolve("example.p.1.s.1")?;
    let s2 = doc.resolve("example.p.2.s.1")?;
    let p1 = doc.resolve("example.p.1")?;
    assert_eq!(doc.text(s1, "current", false)?, "Hello world.");
    assert_eq!(doc.text(s2, "current", false)?, "Goodbye now");
    assert_eq!(doc.text(p1, "current", false)?, "Hello world.");
    let root = doc.root().expect("root");
    assert_eq!(
        doc.text(root, "current", false)?,
        "Hello world.\n\nGoodbye now"
    );
    Ok(())
}

#[test]
fn text_in_other_class_is_independent() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("the", true), ("cat", true)])?;
    assert_eq!(doc.text(sentence, "current", false)?, "the cat");
    doc.set_text(words[1], "x", "other")?;
    assert_eq!(doc.text(sentence, "current", false)?, "the cat");
    assert_eq!(doc.text(words[1], "other", false)?, "x");
    Ok(())
}

#[test]
fn text_in_missing_class() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let s1 = doc.resolve("example.p.1.s.1")?;
    assert!(matches!(
        doc.text(s1, "original", false),
        Err(FoliaError::NoTextError(..))
    ));
    assert!(!doc.has_text(s1, "original"));
    assert!(matches!(doc.phon(s1, "current"), Err(FoliaError::NoPhonError(..))));
    Ok(())
}

#[test]
fn declaration_defaults_inherited() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let word = doc.element_by_id("example.p.1.s.1.w.1")?;
    let pos = word.annotation(ElementType::PosAnnotation, None)?;
    assert_eq!(pos.class(), Some("INTJ"));
    assert_eq!(pos.set(), Some(POS_SET));
    assert_eq!(pos.as_ref().annotator(), Some("tagger"));
    assert_eq!(pos.as_ref().annotatortype(), AnnotatorType::Auto);
    Ok(())
}

#[test]
fn annotation_lookup() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let word = doc.element_by_id("example.p.1.s.1.w.3")?;
    assert_eq!(
        word.annotation(ElementType::PosAnnotation, Some(POS_SET))?
            .class(),
        Some("PUNCT")
    );
    assert!(matches!(
        word.annotation(ElementType::LemmaAnnotation, None),
        Err(FoliaError::NoSuchAnnotationError(..))
    ));
    assert_eq!(
        word.annotations(ElementType::PosAnnotation, Some(LEMMA_SET))
            .count(),
        0
    );
    //annotations of words are not annotations of the sentence
    let sentence = doc.element_by_id("example.p.1.s.1")?;
    assert_eq!(
        sentence
            .annotations(ElementType::PosAnnotation, None)
            .count(),
        0
    );
    Ok(())
}

#[test]
fn navigation() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let word = doc.element_by_id("example.p.1.s.1.w.2")?;
    assert_eq!(
        word.parent().and_then(|p| p.id()),
        Some("example.p.1.s.1")
    );
    assert_eq!(
        word.ancestor(ElementType::Paragraph).and_then(|p| p.id()),
        Some("example.p.1")
    );
    assert_eq!(
        word.next_sibling().and_then(|w| w.id()),
        Some("example.p.1.s.1.w.3")
    );
    assert_eq!(
        word.previous_sibling().and_then(|w| w.id()),
        Some("example.p.1.s.1.w.1")
    );
    assert_eq!(word.text_current()?, "world");
    assert_eq!(word.ancestors().count(), 3);
    Ok(())
}

#[test]
fn sentence_in_sentence_is_rejected() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let before = doc.len();
    let result = doc.add(sentence, ElementBuilder::new(ElementType::Sentence));
    assert!(matches!(result, Err(FoliaError::StructureError(..))));
    assert_eq!(doc.len(), before);
    assert_eq!(doc.children(sentence).count(), 0);
    Ok(())
}

#[test]
fn ambiguous_set_is_rejected() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.declare(
        AnnotationType::Pos,
        Some("https://example.org/otherpos"),
        None,
        None,
        None,
    )?;
    let words = add_words(&mut doc, sentence, &[("dog", true)])?;
    let result = doc.add(
        words[0],
        ElementBuilder::new(ElementType::PosAnnotation).with_class("noun"),
    );
    assert!(matches!(result, Err(FoliaError::DeclarationError(..))));
    //with an explicit set it is fine
    doc.add(
        words[0],
        ElementBuilder::new(ElementType::PosAnnotation)
            .with_set(POS_SET)
            .with_class("noun"),
    )?;
    Ok(())
}

#[test]
fn undeclared_set_is_rejected() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("dog", true)])?;
    let result = doc.add(
        words[0],
        ElementBuilder::new(ElementType::LemmaAnnotation).with_class("dog"),
    );
    assert!(matches!(result, Err(FoliaError::DeclarationError(..))));
    Ok(())
}

#[test]
fn autodeclare() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.set_mode("autodeclare")?;
    let words = add_words(&mut doc, sentence, &[("dog", true)])?;
    doc.add(
        words[0],
        ElementBuilder::new(ElementType::LemmaAnnotation)
            .with_set(LEMMA_SET)
            .with_class("dog"),
    )?;
    assert!(doc.is_declared(AnnotationType::Lemma, Some(LEMMA_SET)));
    assert!(doc.warning_count() > 0);
    Ok(())
}

#[test]
fn no_space_joins_tokens() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    add_words(&mut doc, sentence, &[("cat", false), ("s", true)])?;
    assert_eq!(doc.text(sentence, "current", false)?, "cats");
    assert_eq!(doc.text(sentence, "current", true)?, "cat s");
    Ok(())
}

#[test]
fn occurrences_per_set() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("dog", true)])?;
    doc.add(
        words[0],
        ElementBuilder::new(ElementType::PosAnnotation).with_class("N"),
    )?;
    let result = doc.add(
        words[0],
        ElementBuilder::new(ElementType::PosAnnotation).with_class("V"),
    );
    assert!(matches!(result, Err(FoliaError::LimitExceededError(..))));
    Ok(())
}

#[test]
fn duplicate_text_class() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("dog", true)])?;
    let content = doc.build(
        ElementBuilder::new(ElementType::TextContent).with_child(ElementBuilder::text_node("cat")),
    )?;
    assert!(matches!(
        doc.append(words[0], content),
        Err(FoliaError::LimitExceededError(..))
    ));
    //set_text replaces instead
    doc.set_text(words[0], "cat", "current")?;
    assert_eq!(doc.text(words[0], "current", false)?, "cat");
    Ok(())
}

#[test]
fn duplicate_id() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word).with_id("dup"),
    )?;
    let result = doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word).with_id("dup"),
    );
    assert!(matches!(result, Err(FoliaError::DuplicateIdError(..))));
    assert!(matches!(
        doc.add(sentence, ElementBuilder::new(ElementType::Word).with_id("not valid")),
        Err(FoliaError::AttributeError(..))
    ));
    Ok(())
}

#[test]
fn ownership_is_exclusive() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("a", true)])?;
    let body = doc.root().expect("root");
    let other = doc.add(body, ElementBuilder::new(ElementType::Sentence))?;
    assert!(matches!(
        doc.append(other, words[0]),
        Err(FoliaError::OwnershipError(..))
    ));
    //move it properly
    doc.remove(sentence, words[0], false)?;
    assert_eq!(doc.pending_deletion_count(), 1);
    doc.append(other, words[0])?;
    assert_eq!(doc.pending_deletion_count(), 0);
    assert_eq!(doc.parent_of(words[0]), Some(other));
    Ok(())
}

#[test]
fn remove_and_destroy() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("a", true), ("b", true)])?;
    let before = doc.len();
    doc.remove(sentence, words[0], true)?;
    //the word and its text content (with text node) are gone
    assert_eq!(doc.len(), before - 3);
    assert!(doc.get_element(words[0]).is_err());
    assert_eq!(doc.text(sentence, "current", false)?, "b");
    Ok(())
}

#[test]
fn replace_element() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("a", true), ("b", true)])?;
    let new = doc.build(ElementBuilder::new(ElementType::Word).with_text("c"))?;
    let old = doc.replace(sentence, words[0], new)?;
    assert_eq!(old, words[0]);
    assert_eq!(doc.index_of(sentence, new), Some(0));
    assert_eq!(doc.text(sentence, "current", false)?, "c b");
    Ok(())
}

#[test]
fn correction_replaces_in_place() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.declare(AnnotationType::Correction, Some(CORRECTION_SET), None, None, None)?;
    let words = add_words(&mut doc, sentence, &[("A", true), ("C", true)])?;
    let new = doc.build(
        ElementBuilder::new(ElementType::Word)
            .with_id("test.s.1.w.new")
            .with_text("B"),
    )?;
    let correction = doc.correct(
        sentence,
        &[words[0]],
        &[],
        &[new],
        &[],
        CorrectionOptions::new().with_class("spelling"),
    )?;
    assert_eq!(doc.index_of(sentence, correction), Some(0));
    assert_eq!(doc.index_of(sentence, words[1]), Some(1));
    assert_eq!(doc.correction_state(correction)?, CorrectionState::NewAndOriginal);
    let newwrapper = doc.new_of(correction).expect("new");
    let originalwrapper = doc.original_of(correction).expect("original");
    assert_eq!(doc.children(newwrapper).collect::<Vec<_>>(), vec![new]);
    assert_eq!(
        doc.children(originalwrapper).collect::<Vec<_>>(),
        vec![words[0]]
    );
    assert_eq!(doc.parent_of(words[0]), Some(originalwrapper));
    let c = doc.get_element(correction)?;
    assert_eq!(c.set(), Some(CORRECTION_SET));
    assert_eq!(c.class(), Some("spelling"));
    assert_eq!(c.id(), Some("test.s.1.correction.1"));
    assert_eq!(doc.text(sentence, "current", false)?, "B C");
    //originals are not selected by default
    assert_eq!(
        doc.select(sentence, Selector::new(ElementType::Word)).count(),
        2
    );
    Ok(())
}

#[test]
fn correction_of_annotation_infers_original() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("run", true)])?;
    let oldpos = doc.add(
        words[0],
        ElementBuilder::new(ElementType::PosAnnotation).with_class("N"),
    )?;
    let newpos = doc.build(ElementBuilder::new(ElementType::PosAnnotation).with_class("V"))?;
    let correction = doc.correct(
        words[0],
        &[],
        &[],
        &[newpos],
        &[],
        CorrectionOptions::new(),
    )?;
    let originalwrapper = doc.original_of(correction).expect("original");
    assert_eq!(doc.parent_of(oldpos), Some(originalwrapper));
    let pos = doc.annotation(words[0], ElementType::PosAnnotation, None)?;
    assert_eq!(pos, newpos);
    assert_eq!(doc.get_element(pos)?.class(), Some("V"));
    Ok(())
}

#[test]
fn correction_with_suggestions() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("teh", true), ("cat", true)])?;
    let first = doc.build(ElementBuilder::new(ElementType::Word).with_text("the"))?;
    let second = doc.build(ElementBuilder::new(ElementType::Word).with_text("tea"))?;
    let correction = doc.correct(
        sentence,
        &[],
        &[words[0]],
        &[],
        &[vec![first], vec![second]],
        CorrectionOptions::new(),
    )?;
    assert_eq!(
        doc.correction_state(correction)?,
        CorrectionState::CurrentWithSuggestions
    );
    assert_eq!(doc.suggestions_of(correction).len(), 2);
    //suggestions do not change the text
    assert_eq!(doc.text(sentence, "current", false)?, "teh cat");
    Ok(())
}

#[test]
fn correction_new_and_current_exclusive() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("a", true)])?;
    let new = doc.build(ElementBuilder::new(ElementType::Word).with_text("b"))?;
    let result = doc.correct(
        sentence,
        &[],
        &[words[0]],
        &[new],
        &[],
        CorrectionOptions::new(),
    );
    assert!(matches!(result, Err(FoliaError::StructureError(..))));
    //nothing changed
    assert_eq!(doc.parent_of(words[0]), Some(sentence));
    assert_eq!(doc.text(sentence, "current", false)?, "a");
    Ok(())
}

#[test]
fn correction_original_and_current() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("a", true), ("b", true)])?;
    let correction = doc.correct(
        sentence,
        &[words[0]],
        &[words[1]],
        &[],
        &[],
        CorrectionOptions::new(),
    )?;
    assert!(doc.new_of(correction).is_none());
    let originalwrapper = doc.original_of(correction).expect("original");
    let currentwrapper = doc.current_of(correction).expect("current");
    assert_eq!(doc.parent_of(words[0]), Some(originalwrapper));
    assert_eq!(doc.parent_of(words[1]), Some(currentwrapper));
    assert_eq!(doc.correction_state(correction)?, CorrectionState::CurrentOnly);
    assert_eq!(doc.text(sentence, "current", false)?, "b");
    Ok(())
}

#[test]
fn reuse_correction_promotes_current() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("teh", true)])?;
    let suggestion = doc.build(ElementBuilder::new(ElementType::Word).with_text("the"))?;
    let correction = doc.correct(
        sentence,
        &[],
        &[words[0]],
        &[],
        &[vec![suggestion]],
        CorrectionOptions::new(),
    )?;
    let new = doc.build(ElementBuilder::new(ElementType::Word).with_text("the"))?;
    doc.correct(
        sentence,
        &[],
        &[],
        &[new],
        &[],
        CorrectionOptions::new().with_reuse(correction),
    )?;
    assert_eq!(doc.correction_state(correction)?, CorrectionState::NewAndOriginal);
    assert!(doc.current_of(correction).is_none());
    let originalwrapper = doc.original_of(correction).expect("original");
    assert_eq!(doc.parent_of(words[0]), Some(originalwrapper));
    assert_eq!(doc.suggestions_of(correction).len(), 1);
    assert_eq!(doc.text(sentence, "current", false)?, "the");
    Ok(())
}

#[test]
fn split_word() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("tothe", true), ("end", true)])?;
    let correction = doc.split_word(
        words[0],
        vec![
            ElementBuilder::new(ElementType::Word).with_text("to"),
            ElementBuilder::new(ElementType::Word).with_text("the"),
        ],
        CorrectionOptions::new(),
    )?;
    assert_eq!(doc.index_of(sentence, correction), Some(0));
    assert_eq!(doc.text(sentence, "current", false)?, "to the end");
    Ok(())
}

#[test]
fn merge_words() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("some", true), ("thing", true), ("else", true)])?;
    let correction = doc.merge_words(
        &words[0..2],
        ElementBuilder::new(ElementType::Word).with_text("something"),
        CorrectionOptions::new(),
    )?;
    assert_eq!(doc.index_of(sentence, correction), Some(0));
    let originalwrapper = doc.original_of(correction).expect("original");
    assert_eq!(doc.children(originalwrapper).count(), 2);
    assert_eq!(doc.text(sentence, "current", false)?, "something else");
    Ok(())
}

#[test]
fn insert_words() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("a", true), ("c", true)])?;
    doc.insert_word_after(
        words[0],
        ElementBuilder::new(ElementType::Word).with_text("b"),
        CorrectionOptions::new(),
    )?;
    assert_eq!(doc.text(sentence, "current", false)?, "a b c");
    doc.insert_word_before(
        words[0],
        ElementBuilder::new(ElementType::Word).with_text("0"),
        CorrectionOptions::new(),
    )?;
    assert_eq!(doc.text(sentence, "current", false)?, "0 a b c");
    Ok(())
}

#[test]
fn delete_word() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("a", true), ("a", true), ("b", true)])?;
    let correction = doc.delete_word(words[1], CorrectionOptions::new())?;
    let newwrapper = doc.new_of(correction).expect("new");
    assert_eq!(doc.children(newwrapper).count(), 0);
    assert_eq!(doc.text(sentence, "current", false)?, "a b");
    Ok(())
}

#[test]
fn failed_split_leaves_no_trace() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("ab", true)])?;
    let before = doc.len();
    let result = doc.split_word(
        words[0],
        vec![
            ElementBuilder::new(ElementType::Word).with_text("a"),
            ElementBuilder::new(ElementType::EntitiesLayer),
        ],
        CorrectionOptions::new(),
    );
    assert!(result.is_err());
    assert_eq!(doc.len(), before);
    assert_eq!(doc.text(sentence, "current", false)?, "ab");
    Ok(())
}

#[test]
fn spans_in_example() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let entity = doc.element_by_id("example.p.1.s.1.entity.1")?;
    assert_eq!(entity.class(), Some("misc"));
    assert_eq!(entity.set(), Some(ENTITY_SET));
    let wrefs: Vec<_> = entity.wrefs().filter_map(|w| w.id()).collect();
    assert_eq!(wrefs, vec!["example.p.1.s.1.w.2"]);
    let word = doc.element_by_id("example.p.1.s.1.w.2")?;
    assert_eq!(word.spans(ElementType::Entity).count(), 1);
    let other = doc.element_by_id("example.p.1.s.1.w.1")?;
    assert_eq!(other.spans(ElementType::Entity).count(), 0);
    //the reference does not change ownership
    assert_eq!(word.parent().and_then(|p| p.id()), Some("example.p.1.s.1"));
    Ok(())
}

#[test]
fn add_span() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.declare(AnnotationType::Entity, Some(ENTITY_SET), None, None, None)?;
    let words = add_words(&mut doc, sentence, &[("New", true), ("York", true), ("rocks", true)])?;
    let span = doc.add_span(
        sentence,
        ElementBuilder::new(ElementType::Entity)
            .with_class("location")
            .with_references(words[0..2].iter().copied()),
    )?;
    assert_eq!(doc.wrefs(span), words[0..2].to_vec());
    assert_eq!(doc.spans_for(words[0], ElementType::Entity), vec![span]);
    assert!(doc.spans_for(words[2], ElementType::Entity).is_empty());
    let layer = doc.parent_of(span).expect("layer");
    assert_eq!(doc.get_element(layer)?.elementtype(), ElementType::EntitiesLayer);
    //a second span reuses the layer
    let second = doc.add_span(
        sentence,
        ElementBuilder::new(ElementType::Entity)
            .with_class("misc")
            .with_reference(words[2]),
    )?;
    assert_eq!(doc.parent_of(second), Some(layer));
    assert_eq!(
        doc.children_of_type(sentence, ElementType::EntitiesLayer).count(),
        1
    );
    //references do not count as text
    assert_eq!(doc.text(sentence, "current", false)?, "New York rocks");
    Ok(())
}

#[test]
fn span_can_not_own_tokens() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.declare(AnnotationType::Entity, Some(ENTITY_SET), None, None, None)?;
    let result = doc.add_span(
        sentence,
        ElementBuilder::new(ElementType::Entity)
            .with_class("location")
            .with_child(ElementBuilder::new(ElementType::Word).with_text("x")),
    );
    assert!(matches!(result, Err(FoliaError::StructureError(..))));
    Ok(())
}

#[test]
fn text_parents_prefer_descendants() -> Result<(), FoliaError> {
    let doc = example_document()?;
    let root = doc.root().expect("root");
    let ids: Vec<String> = doc
        .text_parents(root, "current")
        .into_iter()
        .map(|h| doc.get_element(h).map(|e| e.id().unwrap_or("").to_string()))
        .collect::<Result<_, _>>()?;
    assert_eq!(
        ids,
        vec![
            "example.p.1.s.1.w.1",
            "example.p.1.s.1.w.2",
            "example.p.1.s.1.w.3",
            "example.p.2.s.1.w.1",
            "example.p.2.s.1.w.2",
        ]
    );
    Ok(())
}

#[test]
fn inconsistent_text() -> Result<(), FoliaError> {
    let xml = EXAMPLE_XML.replace("<t>Hello world.</t>", "<t>Hello there.</t>");
    assert!(matches!(
        Document::from_xml(&xml, Config::default()),
        Err(FoliaError::InconsistentTextError(..))
    ));
    let doc = Document::from_xml(&xml, Config::default().with_checktext(false))?;
    let s1 = doc.resolve("example.p.1.s.1")?;
    assert_eq!(doc.text(s1, "current", false)?, "Hello there.");
    Ok(())
}

#[test]
fn text_offsets() -> Result<(), FoliaError> {
    let correct = EXAMPLE_XML.replace("<t>world</t>", "<t offset=\"6\">world</t>");
    let doc = Document::from_xml(&correct, Config::default())?;
    let word = doc.resolve("example.p.1.s.1.w.2")?;
    let content = doc
        .children_of_type(word, ElementType::TextContent)
        .next()
        .expect("text content");
    assert_eq!(doc.get_element(content)?.offset(), Some(6));

    let wrong = EXAMPLE_XML.replace("<t>world</t>", "<t offset=\"3\">world</t>");
    assert!(matches!(
        Document::from_xml(&wrong, Config::default()),
        Err(FoliaError::InconsistentTextError(..))
    ));
    let doc = Document::from_xml(&wrong, Config::default().with_fixtext(true))?;
    assert!(doc.warning_count() >= 1);
    let word = doc.resolve("example.p.1.s.1.w.2")?;
    let content = doc
        .children_of_type(word, ElementType::TextContent)
        .next()
        .expect("text content");
    assert_eq!(doc.get_element(content)?.offset(), Some(6));
    assert!(doc.to_xml_string()?.contains("<t offset=\"6\">world</t>"));
    Ok(())
}

#[test]
fn unknown_attribute_permissive() -> Result<(), FoliaError> {
    let xml = EXAMPLE_XML.replace(
        "<w xml:id=\"example.p.2.s.1.w.1\">",
        "<w xml:id=\"example.p.2.s.1.w.1\" colour=\"blue\">",
    );
    assert!(matches!(
        Document::from_xml(&xml, Config::default()),
        Err(FoliaError::AttributeError(..))
    ));
    let doc = Document::from_xml(&xml, Config::default().with_permissive(true))?;
    assert!(doc.warning_count() >= 1);
    let word = doc.element_by_id("example.p.2.s.1.w.1")?;
    assert_eq!(word.as_ref().extra_attribute("colour"), Some("blue"));
    assert!(doc.to_xml_string()?.contains("colour=\"blue\""));
    Ok(())
}

#[test]
fn unknown_element_permissive() -> Result<(), FoliaError> {
    let xml = EXAMPLE_XML.replace(
        "<t>Goodbye</t>",
        "<t>Goodbye</t><sparkle/>",
    );
    assert!(matches!(
        Document::from_xml(&xml, Config::default()),
        Err(FoliaError::XmlFormatError(..))
    ));
    let doc = Document::from_xml(&xml, Config::default().with_permissive(true))?;
    assert!(doc.warning_count() > 0);
    let word = doc.element_by_id("example.p.2.s.1.w.1")?;
    assert_eq!(word.text_current()?, "Goodbye");
    Ok(())
}

#[test]
fn phonetic_content() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word)
            .with_text("hello")
            .with_phon("həˈləʊ"),
    )?;
    doc.add(
        sentence,
        ElementBuilder::new(ElementType::Word)
            .with_text("world")
            .with_phon("wɜːld"),
    )?;
    assert_eq!(doc.phon(sentence, "current")?, "həˈləʊ wɜːld");
    Ok(())
}

#[test]
fn feature_shorthand() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("dogs", true)])?;
    let pos = doc.add(
        words[0],
        ElementBuilder::new(ElementType::PosAnnotation)
            .with_class("N(plural)")
            .with_attrib("head", "N"),
    )?;
    let features: Vec<_> = doc
        .children(pos)
        .map(|h| doc.get_element(h).map(|f| (f.elementtype(), f.class().map(|c| c.to_string()))))
        .collect::<Result<_, _>>()?;
    assert_eq!(
        features,
        vec![(ElementType::HeadFeature, Some("N".to_string()))]
    );
    Ok(())
}

#[test]
fn feature_shorthand_not_committed_on_error() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    let words = add_words(&mut doc, sentence, &[("dogs", true)])?;
    let pos = doc.add(
        words[0],
        ElementBuilder::new(ElementType::PosAnnotation)
            .with_class("N(plural)")
            .with_attrib("head", "N"),
    )?;
    let count = doc.len();
    let result = doc.set_attributes(
        pos,
        [("class", "V"), ("head", "V"), ("confidence", "2.0")],
    );
    assert!(matches!(result, Err(FoliaError::AttributeError(..))));
    assert_eq!(doc.len(), count);
    assert_eq!(doc.children(pos).count(), 1);
    assert_eq!(doc.get_element(pos)?.class(), Some("N(plural)"));
    Ok(())
}

#[test]
fn processors() -> Result<(), FoliaError> {
    let (mut doc, sentence) = setup_document()?;
    doc.add_processor(
        ProcessorBuilder::new("tagger")
            .with_id("proc.tagger")
            .with_annotatortype(AnnotatorType::Auto),
        None,
    )?;
    doc.add_declaration(
        Declaration::new(AnnotationType::Lemma, Some(LEMMA_SET)).with_processor("proc.tagger"),
    )?;
    assert!(matches!(
        doc.add_declaration(
            Declaration::new(AnnotationType::Lemma, Some(LEMMA_SET)).with_processor("nonexistent"),
        ),
        Err(FoliaError::DeclarationError(..))
    ));
    let words = add_words(&mut doc, sentence, &[("dogs", true)])?;
    let lemma = doc.add(
        words[0],
        ElementBuilder::new(ElementType::LemmaAnnotation).with_class("dog"),
    )?;
    let lemma = doc.element(lemma)?;
    let processor = lemma.processor().expect("processor from the declaration");
    assert_eq!(processor.id(), Some("proc.tagger"));
    assert_eq!(lemma.as_ref().annotator(), Some("tagger"));
    assert_eq!(lemma.as_ref().annotatortype(), AnnotatorType::Auto);
    assert_eq!(processor.elements().count(), 1);
    assert_eq!(doc.processors().count(), 1);
    Ok(())
}

#[test]
fn comments_are_preserved() -> Result<(), FoliaError> {
    let xml = EXAMPLE_XML.replace(
        "<t>Goodbye</t>",
        "<t>Goodbye</t><!-- checked -->",
    );
    let doc = Document::from_xml(&xml, Config::default())?;
    assert!(doc.to_xml_string()?.contains("<!-- checked -->"));
    Ok(())
}
