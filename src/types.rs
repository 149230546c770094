/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains some common types and helper functions that are used throughout the library.

use chrono::{NaiveDateTime, NaiveTime};
use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::FoliaError;

/// The type of the annotator that produced an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotatorType {
    Undefined,
    Auto,
    Manual,
    Generator,
    DataSource,
}

impl Default for AnnotatorType {
    fn default() -> Self {
        Self::Undefined
    }
}

impl AnnotatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "",
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Generator => "generator",
            Self::DataSource => "datasource",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl FromStr for AnnotatorType {
    type Err = FoliaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            "generator" => Ok(Self::Generator),
            "datasource" => Ok(Self::DataSource),
            "" => Ok(Self::Undefined),
            other => Err(FoliaError::AttributeError(
                format!("invalid annotatortype: {}", other),
                "AnnotatorType::from_str",
            )),
        }
    }
}

impl fmt::Display for AnnotatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An annotation category. Several element types may serve one category (for instance
/// [`crate::ElementType::Entity`] and [`crate::ElementType::EntitiesLayer`] are both
/// [`AnnotationType::Entity`]). Declarations are made per category and set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    NoAnnotation,
    Text,
    Token,
    Division,
    Paragraph,
    Head,
    List,
    Figure,
    Whitespace,
    LineBreak,
    Sentence,
    Pos,
    Lemma,
    Domain,
    Sense,
    Syntax,
    Chunking,
    Entity,
    Subjectivity,
    Morphological,
    ErrorDetection,
    Correction,
    Alternative,
    Phon,
    Phonological,
    Dependency,
    Timesegment,
    Gap,
    Quote,
    Note,
    Reference,
    Relation,
    Spanrelation,
    Coreference,
    Semrole,
    Metric,
    Lang,
    String,
    Table,
    Style,
    Part,
    Utterance,
    Entry,
    Term,
    Definition,
    Example,
    Sentiment,
    Statement,
    Observation,
    Modality,
    Event,
    Predicate,
    Hiddentoken,
    Hyphenation,
    Comment,
    Description,
}

impl AnnotationType {
    /// All annotation types that can be declared, in canonical order
    pub const ALL: &'static [AnnotationType] = &[
        Self::Text,
        Self::Token,
        Self::Division,
        Self::Paragraph,
        Self::Head,
        Self::List,
        Self::Figure,
        Self::Whitespace,
        Self::LineBreak,
        Self::Sentence,
        Self::Pos,
        Self::Lemma,
        Self::Domain,
        Self::Sense,
        Self::Syntax,
        Self::Chunking,
        Self::Entity,
        Self::Subjectivity,
        Self::Morphological,
        Self::ErrorDetection,
        Self::Correction,
        Self::Alternative,
        Self::Phon,
        Self::Phonological,
        Self::Dependency,
        Self::Timesegment,
        Self::Gap,
        Self::Quote,
        Self::Note,
        Self::Reference,
        Self::Relation,
        Self::Spanrelation,
        Self::Coreference,
        Self::Semrole,
        Self::Metric,
        Self::Lang,
        Self::String,
        Self::Table,
        Self::Style,
        Self::Part,
        Self::Utterance,
        Self::Entry,
        Self::Term,
        Self::Definition,
        Self::Example,
        Self::Sentiment,
        Self::Statement,
        Self::Observation,
        Self::Modality,
        Self::Event,
        Self::Predicate,
        Self::Hiddentoken,
        Self::Hyphenation,
        Self::Comment,
        Self::Description,
    ];

    /// Returns the name as used in the declaration block (`<name-annotation>`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAnnotation => "none",
            Self::Text => "text",
            Self::Token => "token",
            Self::Division => "division",
            Self::Paragraph => "paragraph",
            Self::Head => "head",
            Self::List => "list",
            Self::Figure => "figure",
            Self::Whitespace => "whitespace",
            Self::LineBreak => "linebreak",
            Self::Sentence => "sentence",
            Self::Pos => "pos",
            Self::Lemma => "lemma",
            Self::Domain => "domain",
            Self::Sense => "sense",
            Self::Syntax => "syntax",
            Self::Chunking => "chunking",
            Self::Entity => "entity",
            Self::Subjectivity => "subjectivity",
            Self::Morphological => "morphological",
            Self::ErrorDetection => "errordetection",
            Self::Correction => "correction",
            Self::Alternative => "alternative",
            Self::Phon => "phon",
            Self::Phonological => "phonological",
            Self::Dependency => "dependency",
            Self::Timesegment => "timesegment",
            Self::Gap => "gap",
            Self::Quote => "quote",
            Self::Note => "note",
            Self::Reference => "reference",
            Self::Relation => "relation",
            Self::Spanrelation => "spanrelation",
            Self::Coreference => "coreference",
            Self::Semrole => "semrole",
            Self::Metric => "metric",
            Self::Lang => "lang",
            Self::String => "string",
            Self::Table => "table",
            Self::Style => "style",
            Self::Part => "part",
            Self::Utterance => "utterance",
            Self::Entry => "entry",
            Self::Term => "term",
            Self::Definition => "definition",
            Self::Example => "example",
            Self::Sentiment => "sentiment",
            Self::Statement => "statement",
            Self::Observation => "observation",
            Self::Modality => "modality",
            Self::Event => "event",
            Self::Predicate => "predicate",
            Self::Hiddentoken => "hiddentoken",
            Self::Hyphenation => "hyphenation",
            Self::Comment => "comment",
            Self::Description => "description",
        }
    }

    /// Parses the name as used in the declaration block, without the `-annotation` suffix
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "none" {
            return Some(Self::NoAnnotation);
        }
        Self::ALL.iter().find(|t| t.as_str() == name).copied()
    }

    /// Parses the tag of a declaration element (`pos-annotation`)
    pub fn from_declaration_tag(tag: &str) -> Option<Self> {
        tag.strip_suffix("-annotation").and_then(Self::from_name)
    }

    /// Returns the tag of a declaration element (`pos-annotation`)
    pub fn declaration_tag(&self) -> String {
        format!("{}-annotation", self.as_str())
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies the kind of top-level structure, used in introspection and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Document,
    Element,
    Processor,
    Declaration,
    Config,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Document => "Document",
            Self::Element => "Element",
            Self::Processor => "Processor",
            Self::Declaration => "Declaration",
            Self::Config => "Config",
        };
        write!(f, "{}", s)
    }
}

#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait TypeInfo {
    fn typeinfo() -> Type;
}

/// The datetime format used for all datetime attributes
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a datetime attribute value. Accepts an optional fractional second part and an optional
/// trailing `Z`.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, FoliaError> {
    let trimmed = value.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT))
        .map_err(|e| {
            FoliaError::AttributeError(
                format!("invalid datetime '{}': {}", value, e),
                "parse_datetime",
            )
        })
}

/// Formats a datetime for output
pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// Validates a begintime/endtime value (`HH:MM:SS` with optional fractional seconds)
pub fn parse_time(value: &str) -> Result<NaiveTime, FoliaError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            FoliaError::AttributeError(format!("invalid time '{}'", value), "parse_time")
        })
}

/// Parses a yes/no attribute value
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, FoliaError> {
    match value {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        _ => Err(FoliaError::AttributeError(
            format!("invalid value for {}: '{}', expected yes or no", key, value),
            "parse_bool",
        )),
    }
}

/// Emits a debug message through the logging facade, the message closure is only
/// evaluated when debug mode is enabled in the configuration.
pub(crate) fn debug<F>(config: &Config, message_func: F)
where
    F: FnOnce() -> String,
{
    if config.debug() {
        log::debug!("[folia] {}", message_func());
    }
}

/// Collapses all consecutive whitespace to a single space and trims the result.
/// Used for comparing texts in consistency checks.
pub(crate) fn normalize_spaces(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}
