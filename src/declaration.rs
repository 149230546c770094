/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the annotation declaration registry. Every annotation type and set that is
//! used in a document is declared once, optionally with default annotator information that
//! applies to all annotations of that type and set that do not specify otherwise.

use chrono::NaiveDateTime;
use sealed::sealed;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::FoliaError;
use crate::json::ToJson;
use crate::types::*;

/// A default value in a declaration. Declaring the same type and set twice with different values
/// makes the default ambiguous, after which it no longer applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DefaultValue<T> {
    Unset,
    Value(T),
    Ambiguous,
}

impl<T> Default for DefaultValue<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T: PartialEq> DefaultValue<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    fn merge(&mut self, other: Option<T>) {
        if let Some(other) = other {
            match self {
                Self::Unset => *self = Self::Value(other),
                Self::Value(v) if *v != other => *self = Self::Ambiguous,
                _ => {}
            }
        }
    }
}

/// A single annotation declaration: an annotation type plus a set, with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub(crate) annotationtype: AnnotationType,
    pub(crate) set: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) format: Option<String>,
    pub(crate) annotator: DefaultValue<String>,
    pub(crate) annotatortype: DefaultValue<AnnotatorType>,
    #[serde(skip)]
    pub(crate) datetime: DefaultValue<NaiveDateTime>,
    /// Processors that produced annotations of this type and set, in order of declaration
    pub(crate) processors: Vec<String>,
}

impl Declaration {
    pub fn new(annotationtype: AnnotationType, set: Option<&str>) -> Self {
        Self {
            annotationtype,
            set: set.filter(|s| !s.is_empty()).map(|s| s.to_string()),
            alias: None,
            format: None,
            annotator: DefaultValue::Unset,
            annotatortype: DefaultValue::Unset,
            datetime: DefaultValue::Unset,
            processors: Vec::new(),
        }
    }

    pub fn with_annotator(mut self, annotator: impl Into<String>) -> Self {
        self.annotator = DefaultValue::Value(annotator.into());
        self
    }

    pub fn with_annotatortype(mut self, annotatortype: AnnotatorType) -> Self {
        if !annotatortype.is_undefined() {
            self.annotatortype = DefaultValue::Value(annotatortype);
        }
        self
    }

    pub fn with_datetime(mut self, datetime: NaiveDateTime) -> Self {
        self.datetime = DefaultValue::Value(datetime);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_processor(mut self, processor: impl Into<String>) -> Self {
        let processor = processor.into();
        if !self.processors.contains(&processor) {
            self.processors.push(processor);
        }
        self
    }

    pub fn annotationtype(&self) -> AnnotationType {
        self.annotationtype
    }

    pub fn set(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// The default annotator, if one unambiguous default was declared
    pub fn annotator(&self) -> Option<&str> {
        self.annotator.get().map(|s| s.as_str())
    }

    pub fn annotatortype(&self) -> Option<AnnotatorType> {
        self.annotatortype.get().copied()
    }

    pub fn datetime(&self) -> Option<&NaiveDateTime> {
        self.datetime.get()
    }

    pub fn processors(&self) -> &[String] {
        &self.processors
    }

    /// The single default processor, only if exactly one was declared
    pub fn default_processor(&self) -> Option<&str> {
        if self.processors.len() == 1 {
            self.processors.first().map(|s| s.as_str())
        } else {
            None
        }
    }

    fn key(&self) -> (AnnotationType, String) {
        (self.annotationtype, self.set.clone().unwrap_or_default())
    }

    /// Merges another declaration of the same type and set into this one
    fn merge(&mut self, other: Declaration) {
        if self.alias.is_none() {
            self.alias = other.alias;
        }
        if self.format.is_none() {
            self.format = other.format;
        }
        if let DefaultValue::Value(v) = other.annotator {
            self.annotator.merge(Some(v));
        }
        if let DefaultValue::Value(v) = other.annotatortype {
            self.annotatortype.merge(Some(v));
        }
        if let DefaultValue::Value(v) = other.datetime {
            self.datetime.merge(Some(v));
        }
        for processor in other.processors {
            if !self.processors.contains(&processor) {
                self.processors.push(processor);
            }
        }
    }
}

/// The declaration registry of a document, keyed by annotation type and set.
/// A declaration without a set is stored under the empty set name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Declarations {
    #[serde(serialize_with = "serialize_declarations")]
    entries: BTreeMap<(AnnotationType, String), Declaration>,
}

fn serialize_declarations<S>(
    entries: &BTreeMap<(AnnotationType, String), Declaration>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(entries.values())
}

#[sealed]
impl TypeInfo for Declarations {
    fn typeinfo() -> Type {
        Type::Declaration
    }
}

impl ToJson for Declarations {}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration. Declaring an identical declaration twice is a no-op; declaring the same
    /// type and set with different defaults keeps a single entry in which the conflicting defaults
    /// become ambiguous. Returns `true` if a new entry was created.
    pub fn add(&mut self, declaration: Declaration) -> bool {
        if declaration.annotationtype == AnnotationType::NoAnnotation {
            return false;
        }
        let key = declaration.key();
        if let Some(existing) = self.entries.get_mut(&key) {
            existing.merge(declaration);
            false
        } else {
            self.entries.insert(key, declaration);
            true
        }
    }

    /// Is the type and set declared? The `none` annotation type is always declared.
    /// A `None` set only matches a declaration without a set.
    pub fn is_declared(&self, annotationtype: AnnotationType, set: Option<&str>) -> bool {
        if annotationtype == AnnotationType::NoAnnotation {
            return true;
        }
        self.entries
            .contains_key(&(annotationtype, set.unwrap_or("").to_string()))
    }

    /// Returns the declaration for a type and set
    pub fn get(&self, annotationtype: AnnotationType, set: Option<&str>) -> Option<&Declaration> {
        self.entries
            .get(&(annotationtype, set.unwrap_or("").to_string()))
    }

    /// Returns the declaration for a type and set, or the single declaration of the type when no set is given
    pub fn get_default(
        &self,
        annotationtype: AnnotationType,
        set: Option<&str>,
    ) -> Option<&Declaration> {
        match set {
            Some(set) => self.get(annotationtype, Some(set)),
            None => {
                let mut iter = self.of_type(annotationtype);
                match (iter.next(), iter.next()) {
                    (Some(declaration), None) => Some(declaration),
                    _ => None,
                }
            }
        }
    }

    /// Iterate over all declarations of a type
    pub fn of_type(&self, annotationtype: AnnotationType) -> impl Iterator<Item = &Declaration> {
        self.entries
            .range((annotationtype, String::new())..)
            .take_while(move |((t, _), _)| *t == annotationtype)
            .map(|(_, declaration)| declaration)
    }

    /// Returns the default set for an annotation type, if and only if exactly one set is declared.
    /// An empty string is returned if the only declaration has no set.
    pub fn default_set(&self, annotationtype: AnnotationType) -> Option<&str> {
        self.get_default(annotationtype, None)
            .map(|declaration| declaration.set().unwrap_or(""))
    }

    /// Resolves a set name or alias to the full set name
    pub fn resolve_alias(&self, annotationtype: AnnotationType, set: &str) -> Option<&str> {
        self.of_type(annotationtype)
            .find(|d| d.alias() == Some(set))
            .and_then(|d| d.set())
    }

    pub fn default_annotator(&self, annotationtype: AnnotationType, set: Option<&str>) -> Option<&str> {
        self.get_default(annotationtype, set)
            .and_then(|d| d.annotator())
    }

    pub fn default_annotatortype(
        &self,
        annotationtype: AnnotationType,
        set: Option<&str>,
    ) -> Option<AnnotatorType> {
        self.get_default(annotationtype, set)
            .and_then(|d| d.annotatortype())
    }

    pub fn default_datetime(
        &self,
        annotationtype: AnnotationType,
        set: Option<&str>,
    ) -> Option<&NaiveDateTime> {
        self.get_default(annotationtype, set)
            .and_then(|d| d.datetime())
    }

    pub fn default_processor(&self, annotationtype: AnnotationType, set: Option<&str>) -> Option<&str> {
        self.get_default(annotationtype, set)
            .and_then(|d| d.default_processor())
    }

    /// Removes a declaration
    pub fn remove(
        &mut self,
        annotationtype: AnnotationType,
        set: Option<&str>,
    ) -> Result<Declaration, FoliaError> {
        self.entries
            .remove(&(annotationtype, set.unwrap_or("").to_string()))
            .ok_or_else(|| {
                FoliaError::DeclarationError(
                    format!("{} with set {:?} is not declared", annotationtype, set),
                    "Declarations::remove",
                )
            })
    }

    /// Iterate over all declarations in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
