/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module implements corrections. A correction element groups the new version of some
//! content with the original it replaces, or the current (uncorrected) content with suggestions
//! for its correction. All corrections are made with [`Document::correct()`]; the word-level
//! operations (split, merge, insert, delete) are expressed in terms of it.

use chrono::NaiveDateTime;

use crate::document::Document;
use crate::element::{Element, ElementBuilder, ElementHandle};
use crate::error::FoliaError;
use crate::schema::{accepts, ElementType};
use crate::store::*;
use crate::types::*;

/// Options for [`Document::correct()`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionOptions {
    pub(crate) id: Option<String>,
    pub(crate) set: Option<String>,
    pub(crate) class: Option<String>,
    pub(crate) annotator: Option<String>,
    pub(crate) annotatortype: Option<AnnotatorType>,
    pub(crate) confidence: Option<f64>,
    pub(crate) datetime: Option<NaiveDateTime>,
    pub(crate) processor: Option<String>,
    /// Re-open this existing correction rather than creating a new one
    pub(crate) reuse: Option<ElementHandle>,
    /// Position under the parent when there are no originals to replace
    pub(crate) insert_index: Option<usize>,
}

impl CorrectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_annotator(mut self, annotator: impl Into<String>) -> Self {
        self.annotator = Some(annotator.into());
        self
    }

    pub fn with_annotatortype(mut self, annotatortype: AnnotatorType) -> Self {
        self.annotatortype = Some(annotatortype);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_datetime(mut self, datetime: NaiveDateTime) -> Self {
        self.datetime = Some(datetime);
        self
    }

    pub fn with_processor(mut self, processor: impl Into<String>) -> Self {
        self.processor = Some(processor.into());
        self
    }

    pub fn with_reuse(mut self, correction: ElementHandle) -> Self {
        self.reuse = Some(correction);
        self
    }

    pub fn with_insert_index(mut self, index: usize) -> Self {
        self.insert_index = Some(index);
        self
    }

    fn attributes(&self) -> Vec<(String, String)> {
        let mut attributes = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                attributes.push((key.to_string(), value));
            }
        };
        push("id", self.id.clone());
        push("set", self.set.clone());
        push("class", self.class.clone());
        push("annotator", self.annotator.clone());
        push(
            "annotatortype",
            self.annotatortype.map(|t| t.as_str().to_string()),
        );
        push("confidence", self.confidence.map(|c| c.to_string()));
        push("datetime", self.datetime.as_ref().map(format_datetime));
        push("processor", self.processor.clone());
        attributes
    }
}

/// The state of a correction, determined by the wrappers it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionState {
    /// Not a correction, or an empty one
    NoCorrection,
    CurrentOnly,
    NewOnly,
    NewAndOriginal,
    CurrentWithSuggestions,
    SuggestionsOnly,
}

impl Document {
    /// Makes a correction under `parent`.
    ///
    /// * `original` - existing children of `parent` that are being corrected. If empty while `new` is
    ///   not, the originals are inferred: existing annotations of the same kind and set as the new ones.
    /// * `current` - existing children of `parent` that stay current, typically along with suggestions
    /// * `new` - detached elements (see [`Document::build()`]) that form the corrected version
    /// * `suggestions` - groups of detached elements, each group becomes one suggestion
    ///
    /// `new` and `current` are mutually exclusive. The correction takes the position of the first
    /// original (or current) element. Without `new`, `current` or `suggestions`, the originals are
    /// deleted. Returns the handle of the correction.
    pub fn correct(
        &mut self,
        parent: ElementHandle,
        original: &[ElementHandle],
        current: &[ElementHandle],
        new: &[ElementHandle],
        suggestions: &[Vec<ElementHandle>],
        options: CorrectionOptions,
    ) -> Result<ElementHandle, FoliaError> {
        if !new.is_empty() && !current.is_empty() {
            return Err(FoliaError::StructureError(
                "a correction can not have both new and current content".to_string(),
                "correct",
            ));
        }
        let mut original = original.to_vec();
        if original.is_empty() && current.is_empty() && options.reuse.is_none() {
            for n in new {
                for replaceable in self.find_replaceables(parent, *n)? {
                    if !original.contains(&replaceable) {
                        original.push(replaceable);
                    }
                }
            }
        }
        self.validate_correction(parent, &original, current, new, suggestions, &options)?;
        debug(&self.config, || {
            format!(
                "correct: parent={:?} original={:?} current={:?} new={:?} suggestions={}",
                parent,
                original,
                current,
                new,
                suggestions.len()
            )
        });
        if let Some(correction) = options.reuse {
            return self.reuse_correction(correction, &original, current, new, suggestions);
        }

        let position = original
            .iter()
            .chain(current.iter())
            .filter_map(|h| self.index_of(parent, *h))
            .min()
            .or(options.insert_index)
            .unwrap_or(self.get(parent)?.data.len());

        let correction = self.insert(Element::new(ElementType::Correction))?;
        let mut attributes = options.attributes();
        if options.id.is_none() && self.config.generate_ids() {
            let id = self.generate_id(parent, "correction")?;
            attributes.push(("id".to_string(), id));
        }
        if let Err(e) = self.set_attributes(correction, attributes) {
            let _ = self.destroy(correction);
            return Err(e);
        }

        // detach everything that moves into the correction
        for h in original.iter().chain(current.iter()) {
            self.remove(parent, *h, false)?;
        }

        if !new.is_empty()
            || (suggestions.is_empty() && current.is_empty() && !original.is_empty())
        {
            self.add_wrapper(correction, ElementType::New, new)?;
        }
        if !original.is_empty() || !new.is_empty() {
            self.add_wrapper(correction, ElementType::Original, &original)?;
        }
        if !current.is_empty() {
            self.add_wrapper(correction, ElementType::Current, current)?;
        }
        for suggestion in suggestions {
            self.add_wrapper(correction, ElementType::Suggestion, suggestion)?;
        }

        let position = position.min(self.get(parent)?.data.len());
        self.insert_child(parent, position, correction)?;
        Ok(correction)
    }

    /// Checks all preconditions of a correction before anything is changed
    fn validate_correction(
        &self,
        parent: ElementHandle,
        original: &[ElementHandle],
        current: &[ElementHandle],
        new: &[ElementHandle],
        suggestions: &[Vec<ElementHandle>],
        options: &CorrectionOptions,
    ) -> Result<(), FoliaError> {
        let parenttype = self.get(parent)?.elementtype;
        match options.reuse {
            Some(correction) => {
                let c = self.get(correction)?;
                if c.elementtype != ElementType::Correction {
                    return Err(FoliaError::StructureError(
                        format!("can not reuse <{}> as a correction", c.elementtype),
                        "correct",
                    ));
                }
                if !current.is_empty() && self.new_of(correction).is_some() {
                    return Err(FoliaError::StructureError(
                        "correction already has new content, it can not get current content"
                            .to_string(),
                        "correct",
                    ));
                }
            }
            None => {
                if !accepts(parenttype, ElementType::Correction) {
                    return Err(FoliaError::StructureError(
                        format!("<{}> does not accept corrections", parenttype),
                        "correct",
                    ));
                }
            }
        }
        for h in original.iter().chain(current.iter()) {
            if self.get(*h)?.parent != Some(parent) {
                return Err(FoliaError::StructureError(
                    format!("{:?} is not a child of the element being corrected", h),
                    "correct",
                ));
            }
        }
        let wrapped = [
            (ElementType::Original, original),
            (ElementType::Current, current),
            (ElementType::New, new),
        ];
        let suggested = suggestions
            .iter()
            .map(|group| (ElementType::Suggestion, group.as_slice()));
        for (wrappertype, elements) in wrapped.into_iter().chain(suggested) {
            for h in elements {
                let element = self.get(*h)?;
                if !accepts(wrappertype, element.elementtype) {
                    return Err(FoliaError::StructureError(
                        format!("<{}> can not be corrected", element.elementtype),
                        "correct",
                    ));
                }
                if matches!(wrappertype, ElementType::New | ElementType::Suggestion)
                    && element.parent.is_some()
                {
                    return Err(FoliaError::OwnershipError(
                        format!(
                            "new or suggested <{}> must be detached",
                            element.elementtype
                        ),
                        "correct",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Creates a wrapper (new, original, current or suggestion) holding the given elements and
    /// appends it to the correction
    fn add_wrapper(
        &mut self,
        correction: ElementHandle,
        wrappertype: ElementType,
        elements: &[ElementHandle],
    ) -> Result<ElementHandle, FoliaError> {
        let wrapper = self.insert(Element::new(wrappertype))?;
        for h in elements {
            self.append(wrapper, *h)?;
        }
        self.append(correction, wrapper)
    }

    fn reuse_correction(
        &mut self,
        correction: ElementHandle,
        original: &[ElementHandle],
        current: &[ElementHandle],
        new: &[ElementHandle],
        suggestions: &[Vec<ElementHandle>],
    ) -> Result<ElementHandle, FoliaError> {
        let parent = self.parent_of(correction);
        for h in original.iter().chain(current.iter()) {
            if let Some(parent) = parent {
                self.remove(parent, *h, false)?;
            }
        }
        if !new.is_empty() {
            // the current content becomes the original
            if let Some(currentwrapper) = self.current_of(correction) {
                let transplant: Vec<ElementHandle> = self.children(currentwrapper).collect();
                for h in transplant.iter() {
                    self.remove(currentwrapper, *h, false)?;
                }
                self.destroy(currentwrapper)?;
                match self.original_of(correction) {
                    Some(originalwrapper) => {
                        for h in transplant {
                            self.append(originalwrapper, h)?;
                        }
                    }
                    None => {
                        self.add_wrapper(correction, ElementType::Original, &transplant)?;
                    }
                }
            }
            match self.new_of(correction) {
                Some(newwrapper) => {
                    let old: Vec<ElementHandle> = self.children(newwrapper).collect();
                    for h in old {
                        self.remove(newwrapper, h, true)?;
                    }
                    for h in new {
                        self.append(newwrapper, *h)?;
                    }
                }
                None => {
                    self.add_wrapper(correction, ElementType::New, new)?;
                }
            }
        }
        if !original.is_empty() {
            match self.original_of(correction) {
                Some(originalwrapper) => {
                    for h in original {
                        self.append(originalwrapper, *h)?;
                    }
                }
                None => {
                    self.add_wrapper(correction, ElementType::Original, original)?;
                }
            }
        }
        if !current.is_empty() {
            match self.current_of(correction) {
                Some(currentwrapper) => {
                    for h in current {
                        self.append(currentwrapper, *h)?;
                    }
                }
                None => {
                    self.add_wrapper(correction, ElementType::Current, current)?;
                }
            }
        }
        for suggestion in suggestions {
            self.add_wrapper(correction, ElementType::Suggestion, suggestion)?;
        }
        Ok(correction)
    }

    /// Finds the existing children of `parent` that a new element would replace: annotations of
    /// the same kind and set, or text content in the same class. Structural elements replace nothing.
    pub fn find_replaceables(
        &self,
        parent: ElementHandle,
        new: ElementHandle,
    ) -> Result<Vec<ElementHandle>, FoliaError> {
        let n = self.get(new)?;
        if n.elementtype.is_structure() {
            return Ok(Vec::new());
        }
        Ok(self
            .children(parent)
            .filter(|h| match self.get(*h) {
                Ok(c) => {
                    c.elementtype == n.elementtype
                        && c.set == n.set
                        && (!c.elementtype.is_content() || c.content_class() == n.content_class())
                }
                Err(_) => false,
            })
            .collect())
    }

    /// The state of a correction
    pub fn correction_state(&self, handle: ElementHandle) -> Result<CorrectionState, FoliaError> {
        if self.get(handle)?.elementtype != ElementType::Correction {
            return Ok(CorrectionState::NoCorrection);
        }
        let new = self.new_of(handle).is_some();
        let original = self.original_of(handle).is_some();
        let current = self.current_of(handle).is_some();
        let suggestions = !self.suggestions_of(handle).is_empty();
        Ok(match (new, original, current, suggestions) {
            (true, true, _, _) => CorrectionState::NewAndOriginal,
            (true, false, _, _) => CorrectionState::NewOnly,
            (false, _, true, true) => CorrectionState::CurrentWithSuggestions,
            (false, _, true, false) => CorrectionState::CurrentOnly,
            (false, _, false, true) => CorrectionState::SuggestionsOnly,
            (false, _, false, false) => CorrectionState::NoCorrection,
        })
    }

    /// The new wrapper of a correction
    pub fn new_of(&self, correction: ElementHandle) -> Option<ElementHandle> {
        self.children_of_type(correction, ElementType::New).next()
    }

    /// The original wrapper of a correction
    pub fn original_of(&self, correction: ElementHandle) -> Option<ElementHandle> {
        self.children_of_type(correction, ElementType::Original).next()
    }

    /// The current wrapper of a correction
    pub fn current_of(&self, correction: ElementHandle) -> Option<ElementHandle> {
        self.children_of_type(correction, ElementType::Current).next()
    }

    /// The suggestion wrappers of a correction
    pub fn suggestions_of(&self, correction: ElementHandle) -> Vec<ElementHandle> {
        self.children_of_type(correction, ElementType::Suggestion)
            .collect()
    }

    fn word_parent(&self, word: ElementHandle) -> Result<ElementHandle, FoliaError> {
        self.parent_of(word).ok_or_else(|| {
            FoliaError::StructureError("word has no parent".to_string(), "word correction")
        })
    }

    fn build_all(
        &mut self,
        builders: Vec<ElementBuilder>,
    ) -> Result<Vec<ElementHandle>, FoliaError> {
        let mut result = Vec::with_capacity(builders.len());
        for builder in builders {
            match self.build(builder) {
                Ok(h) => result.push(h),
                Err(e) => {
                    for h in result {
                        let _ = self.destroy(h);
                    }
                    return Err(e);
                }
            }
        }
        Ok(result)
    }

    /// Corrects a word by splitting it into multiple new words
    pub fn split_word(
        &mut self,
        word: ElementHandle,
        newwords: Vec<ElementBuilder>,
        options: CorrectionOptions,
    ) -> Result<ElementHandle, FoliaError> {
        let parent = self.word_parent(word)?;
        let new = self.build_all(newwords)?;
        self.correct_or_rollback(parent, &[word], &new, options)
    }

    /// Corrects multiple adjacent words by merging them into one new word
    pub fn merge_words(
        &mut self,
        words: &[ElementHandle],
        newword: ElementBuilder,
        options: CorrectionOptions,
    ) -> Result<ElementHandle, FoliaError> {
        let first = words.first().copied().ok_or_else(|| {
            FoliaError::StructureError("no words to merge".to_string(), "merge_words")
        })?;
        let parent = self.word_parent(first)?;
        let new = self.build_all(vec![newword])?;
        self.correct_or_rollback(parent, words, &new, options)
    }

    /// Inserts a new word before an existing one, as a correction
    pub fn insert_word_before(
        &mut self,
        word: ElementHandle,
        newword: ElementBuilder,
        options: CorrectionOptions,
    ) -> Result<ElementHandle, FoliaError> {
        self.insert_word(word, newword, options, 0)
    }

    /// Inserts a new word after an existing one, as a correction
    pub fn insert_word_after(
        &mut self,
        word: ElementHandle,
        newword: ElementBuilder,
        options: CorrectionOptions,
    ) -> Result<ElementHandle, FoliaError> {
        self.insert_word(word, newword, options, 1)
    }

    fn insert_word(
        &mut self,
        word: ElementHandle,
        newword: ElementBuilder,
        options: CorrectionOptions,
        shift: usize,
    ) -> Result<ElementHandle, FoliaError> {
        let parent = self.word_parent(word)?;
        let index = self.index_of(parent, word).ok_or_else(|| {
            FoliaError::StructureError("word not found in parent".to_string(), "insert_word")
        })?;
        let new = self.build_all(vec![newword])?;
        self.correct_or_rollback(parent, &[], &new, options.with_insert_index(index + shift))
    }

    /// Deletes a word, as a correction
    pub fn delete_word(
        &mut self,
        word: ElementHandle,
        options: CorrectionOptions,
    ) -> Result<ElementHandle, FoliaError> {
        let parent = self.word_parent(word)?;
        self.correct_or_rollback(parent, &[word], &[], options)
    }

    fn correct_or_rollback(
        &mut self,
        parent: ElementHandle,
        original: &[ElementHandle],
        new: &[ElementHandle],
        options: CorrectionOptions,
    ) -> Result<ElementHandle, FoliaError> {
        match self.correct(parent, original, &[], new, &[], options) {
            Ok(correction) => Ok(correction),
            Err(e) => {
                for h in new {
                    if self.parent_of(*h).is_none() {
                        let _ = self.destroy(*h);
                    }
                }
                Err(e)
            }
        }
    }
}
