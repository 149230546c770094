/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module implements the reconstruction of text and phonetic content from the element tree,
//! along with the helpers to set text content and to verify text consistency.

use crate::document::Document;
use crate::element::{ElementBuilder, ElementHandle};
use crate::error::FoliaError;
use crate::schema::{ElementFamily, ElementType, Properties};
use crate::store::*;
use crate::tree::Selector;
use crate::types::*;

/// Text or phonetic content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentKind {
    Text,
    Phon,
}

impl ContentKind {
    pub(crate) fn elementtype(&self) -> ElementType {
        match self {
            Self::Text => ElementType::TextContent,
            Self::Phon => ElementType::PhonContent,
        }
    }

    fn visible(&self, properties: &Properties) -> bool {
        !properties.hidden
            && match self {
                Self::Text => properties.printable,
                Self::Phon => properties.speakable,
            }
    }

    fn missing(&self, message: String) -> FoliaError {
        match self {
            Self::Text => FoliaError::NoTextError(message, "text"),
            Self::Phon => FoliaError::NoPhonError(message, "phon"),
        }
    }
}

impl Document {
    /// Reconstructs the text of an element in the given text class (usually `current`).
    ///
    /// If the element carries text content in that class, that content is returned. Otherwise the
    /// text is reconstructed from the children, joined by their delimiters. Unless
    /// `retain_tokenization` is set, tokens marked with `space="no"` are not followed by a space.
    pub fn text(
        &self,
        handle: ElementHandle,
        textclass: &str,
        retain_tokenization: bool,
    ) -> Result<String, FoliaError> {
        self.content(handle, textclass, retain_tokenization, ContentKind::Text)
    }

    /// Reconstructs the phonetic content of an element in the given class, see [`Document::text()`]
    pub fn phon(&self, handle: ElementHandle, phonclass: &str) -> Result<String, FoliaError> {
        self.content(handle, phonclass, false, ContentKind::Phon)
    }

    /// Does this element have text in the given class?
    pub fn has_text(&self, handle: ElementHandle, textclass: &str) -> bool {
        self.text(handle, textclass, false).is_ok()
    }

    pub(crate) fn content(
        &self,
        handle: ElementHandle,
        class: &str,
        retain_tokenization: bool,
        kind: ContentKind,
    ) -> Result<String, FoliaError> {
        let element = self.get(handle)?;
        match element.elementtype {
            ElementType::XmlText => return Ok(element.value.clone().unwrap_or_default()),
            ElementType::TextContent | ElementType::PhonContent => {
                return Ok(self.content_string(handle))
            }
            ElementType::Correction => {
                return self.correction_content(handle, class, retain_tokenization, kind)
            }
            t if t.is_textmarkup() => return Ok(self.content_string(handle)),
            _ => {}
        }
        if let Some(content) = self.content_child(handle, class, kind) {
            return Ok(self.content_string(content));
        }
        let result = self.reconstruct(handle, class, retain_tokenization, kind)?;
        if result.is_empty() {
            Err(kind.missing(format!(
                "no content in class '{}' for <{}> {}",
                class,
                element.elementtype,
                element.id().unwrap_or("")
            )))
        } else {
            Ok(result)
        }
    }

    /// Returns the direct text or phonetic content child in the given class
    pub(crate) fn content_child(
        &self,
        handle: ElementHandle,
        class: &str,
        kind: ContentKind,
    ) -> Option<ElementHandle> {
        let contenttype = kind.elementtype();
        self.children(handle).find(|h| match self.get(*h) {
            Ok(c) => c.elementtype == contenttype && c.content_class() == class,
            Err(_) => false,
        })
    }

    /// The literal string held by a content or markup element
    fn content_string(&self, handle: ElementHandle) -> String {
        let mut result = String::new();
        for child in self.children(handle) {
            if let Ok(c) = self.get(child) {
                match c.elementtype {
                    ElementType::XmlText => result += c.value().unwrap_or(""),
                    ElementType::LineBreak => result.push('\n'),
                    ElementType::TextMarkupHSpace => result.push(' '),
                    t if t.is_textmarkup() => result += &self.content_string(child),
                    _ => {}
                }
            }
        }
        result
    }

    /// Joins the text of the children of an element
    fn reconstruct(
        &self,
        handle: ElementHandle,
        class: &str,
        retain_tokenization: bool,
        kind: ContentKind,
    ) -> Result<String, FoliaError> {
        let mut parts: Vec<(String, String)> = Vec::new();
        for child in self.children(handle) {
            let c = self.get(child)?;
            if !kind.visible(c.properties()) || !contributes_content(c.elementtype) {
                continue;
            }
            match self.content(child, class, retain_tokenization, kind) {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        parts.push((
                            text.to_string(),
                            self.get_delimiter(child, retain_tokenization)?,
                        ));
                    }
                }
                Err(e) if e.is_lookup_error() => continue,
                Err(e) => return Err(e),
            }
        }
        let mut result = String::new();
        let count = parts.len();
        for (i, (text, delimiter)) in parts.into_iter().enumerate() {
            result += &text;
            if i + 1 < count {
                result += &delimiter;
            }
        }
        Ok(result)
    }

    /// Text of a correction: new, else current, else original. An empty new (a deletion) has empty text.
    fn correction_content(
        &self,
        handle: ElementHandle,
        class: &str,
        retain_tokenization: bool,
        kind: ContentKind,
    ) -> Result<String, FoliaError> {
        for wrappertype in [ElementType::New, ElementType::Current, ElementType::Original] {
            if let Some(wrapper) = self.children_of_type(handle, wrappertype).next() {
                if wrappertype == ElementType::New && self.get(wrapper)?.is_empty() {
                    return Ok(String::new());
                }
                match self.content(wrapper, class, retain_tokenization, kind) {
                    Ok(text) => return Ok(text),
                    Err(e) if e.is_lookup_error() => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        Err(kind.missing(format!("no content in class '{}' in correction", class)))
    }

    /// Returns the delimiter that follows the text of this element when joined with its siblings
    pub fn get_delimiter(
        &self,
        handle: ElementHandle,
        retain_tokenization: bool,
    ) -> Result<String, FoliaError> {
        let element = self.get(handle)?;
        if matches!(
            element.elementtype,
            ElementType::Word | ElementType::Hiddenword
        ) && !element.space
            && !retain_tokenization
        {
            return Ok(String::new());
        }
        if let Some(delimiter) = element.properties().textdelimiter {
            return Ok(delimiter.to_string());
        }
        let last = if element.elementtype == ElementType::Correction {
            [ElementType::New, ElementType::Current, ElementType::Original]
                .into_iter()
                .find_map(|t| self.children_of_type(handle, t).next())
        } else {
            self.children(handle)
                .filter(|h| match self.get(*h) {
                    Ok(c) => contributes_content(c.elementtype),
                    Err(_) => false,
                })
                .last()
        };
        match last {
            Some(last) => self.get_delimiter(last, retain_tokenization),
            None => Ok(String::new()),
        }
    }

    /// Sets the text content of an element in the given class, replacing existing content in that class
    pub fn set_text(
        &mut self,
        handle: ElementHandle,
        text: &str,
        textclass: &str,
    ) -> Result<ElementHandle, FoliaError> {
        self.set_content(handle, text, textclass, ContentKind::Text)
    }

    /// Sets the phonetic content of an element in the given class, replacing existing content in that class
    pub fn set_phon(
        &mut self,
        handle: ElementHandle,
        phon: &str,
        phonclass: &str,
    ) -> Result<ElementHandle, FoliaError> {
        self.set_content(handle, phon, phonclass, ContentKind::Phon)
    }

    fn set_content(
        &mut self,
        handle: ElementHandle,
        value: &str,
        class: &str,
        kind: ContentKind,
    ) -> Result<ElementHandle, FoliaError> {
        let content = self.build(
            ElementBuilder::new(kind.elementtype())
                .with_class(class)
                .with_child(ElementBuilder::text_node(value)),
        )?;
        let result = match self.content_child(handle, class, kind) {
            Some(existing) => self.replace(handle, existing, content),
            None => self.append(handle, content),
        };
        match result {
            Ok(_) => Ok(content),
            Err(e) => {
                let _ = self.destroy(content);
                Err(e)
            }
        }
    }

    /// Verifies that, for every element holding text content, the text reconstructed from its
    /// children agrees with it, and that text offsets are correct. In `fixtext` mode, wrong offsets
    /// are repaired (with a warning) instead of raising an error.
    pub fn check_text(&mut self) -> Result<(), FoliaError> {
        let root = match self.root {
            Some(root) => root,
            None => return Ok(()),
        };
        let contents: Vec<ElementHandle> = self
            .select(root, Selector::new(ElementType::TextContent))
            .collect();
        for content in contents {
            let parent = match self.parent_of(content) {
                Some(parent) => parent,
                None => continue,
            };
            let class = self.get(content)?.content_class().to_string();
            let parenttype = self.get(parent)?.elementtype;
            if !parenttype.is_structure() {
                continue;
            }
            let own = self.content_string(content);
            if let Ok(reconstructed) = self.reconstruct(parent, &class, false, ContentKind::Text) {
                if !reconstructed.is_empty()
                    && normalize_spaces(&reconstructed) != normalize_spaces(&own)
                {
                    return Err(FoliaError::InconsistentTextError(
                        format!(
                            "text of <{}> {} in class '{}' ('{}') does not match text of its children ('{}')",
                            parenttype,
                            self.get(parent)?.id().unwrap_or(""),
                            class,
                            own,
                            reconstructed
                        ),
                        "check_text",
                    ));
                }
            }
            self.check_offset(content, parent, &class, &own)?;
        }
        Ok(())
    }

    /// Verifies the offset of a text content against the text of the nearest structural ancestor with text in the same class
    fn check_offset(
        &mut self,
        content: ElementHandle,
        parent: ElementHandle,
        class: &str,
        own: &str,
    ) -> Result<(), FoliaError> {
        let offset = match self.get(content)?.offset {
            Some(offset) => offset,
            None => return Ok(()),
        };
        let reference = self
            .ancestors(parent)
            .filter(|h| self.get(*h).map(|e| e.elementtype.is_structure()).unwrap_or(false))
            .find_map(|h| self.content_child(h, class, ContentKind::Text));
        let reference = match reference {
            Some(reference) => self.content_string(reference),
            None => return Ok(()),
        };
        let actual: String = reference.chars().skip(offset).take(own.chars().count()).collect();
        if actual == own {
            return Ok(());
        }
        if self.config.fixtext() {
            let fixed = reference
                .find(own)
                .map(|byteoffset| reference[..byteoffset].chars().count());
            self.warn(format_args!(
                "text offset {} of '{}' is wrong, fixed to {:?}",
                offset, own, fixed
            ));
            self.get_mut(content)?.offset = fixed;
            Ok(())
        } else {
            Err(FoliaError::InconsistentTextError(
                format!(
                    "text offset {} of '{}' is wrong, found '{}' instead",
                    offset, own, actual
                ),
                "check_text",
            ))
        }
    }

    /// Finds the nearest elements that hold text in the given class, in document order. Text held by
    /// a descendant takes precedence over text held by an ancestor. This is the same selection as
    /// done by [`crate::TextEngine`] on a stream.
    pub fn text_parents(&self, handle: ElementHandle, textclass: &str) -> Vec<ElementHandle> {
        let mut result = Vec::new();
        self.collect_text_parents(handle, textclass, &mut result);
        result
    }

    fn collect_text_parents(
        &self,
        handle: ElementHandle,
        textclass: &str,
        result: &mut Vec<ElementHandle>,
    ) -> bool {
        let before = result.len();
        self.collect_from_children(handle, textclass, result);
        if result.len() > before {
            return true;
        }
        if self.content_child(handle, textclass, ContentKind::Text).is_some() {
            result.push(handle);
            return true;
        }
        false
    }

    fn collect_from_children(
        &self,
        handle: ElementHandle,
        textclass: &str,
        result: &mut Vec<ElementHandle>,
    ) {
        for child in self.children(handle) {
            match self.get(child).map(|c| c.elementtype) {
                Ok(ElementType::Correction | ElementType::New | ElementType::Current) => {
                    self.collect_from_children(child, textclass, result)
                }
                Ok(t) if t.family() == ElementFamily::Structure && !TEXT_PARENT_IGNORE.contains(&t) => {
                    self.collect_text_parents(child, textclass, result);
                }
                _ => {}
            }
        }
    }
}

/// Kinds never considered when searching text parents
const TEXT_PARENT_IGNORE: &[ElementType] = &[
    ElementType::Original,
    ElementType::Suggestion,
    ElementType::Alternative,
    ElementType::AlternativeLayers,
    ElementType::ForeignData,
    ElementType::TextContent,
    ElementType::PhonContent,
];

/// Can an element kind contribute to the text of its parent?
fn contributes_content(elementtype: ElementType) -> bool {
    matches!(
        elementtype.family(),
        ElementFamily::Structure | ElementFamily::Subtoken | ElementFamily::CorrectionChild
    ) || elementtype == ElementType::Correction
}
