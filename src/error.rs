/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module defines the single error type used throughout the library: [`FoliaError`].

use thiserror::Error;

/// All errors this library can produce. Each variant carries a detail message and a static
/// context string naming the operation that raised it.
#[derive(Error, Debug)]
pub enum FoliaError {
    /// A child element of this kind is not accepted under the parent
    #[error("StructureError: {0} ({1})")]
    StructureError(String, &'static str),

    /// Adding the element would exceed the maximum number of occurrences
    #[error("LimitExceededError: {0} ({1})")]
    LimitExceededError(String, &'static str),

    /// The element is already owned by another parent
    #[error("OwnershipError: {0} ({1})")]
    OwnershipError(String, &'static str),

    /// A required attribute is missing, an attribute is not supported, or its value is invalid
    #[error("AttributeError: {0} ({1})")]
    AttributeError(String, &'static str),

    /// The ID already exists in the document
    #[error("DuplicateIdError: ID already exists: {0} ({1})")]
    DuplicateIdError(String, &'static str),

    /// A class or set was used for an annotation type that is not declared (or ambiguously declared)
    #[error("DeclarationError: {0} ({1})")]
    DeclarationError(String, &'static str),

    /// A typed annotation lookup yielded no results
    #[error("NoSuchAnnotationError: {0} ({1})")]
    NoSuchAnnotationError(String, &'static str),

    /// No text could be found in the requested text class
    #[error("NoTextError: {0} ({1})")]
    NoTextError(String, &'static str),

    /// No phonetic content could be found in the requested class
    #[error("NoPhonError: {0} ({1})")]
    NoPhonError(String, &'static str),

    /// The operation is not meaningful for this kind of element
    #[error("NotImplementedError: {0} ({1})")]
    NotImplementedError(String, &'static str),

    /// Malformed XML or XML that is not valid FoLiA
    #[error("XmlFormatError: {0} ({1})")]
    XmlFormatError(String, &'static str),

    /// Text content of an element does not match the text reconstructed from its children
    #[error("InconsistentTextError: {0} ({1})")]
    InconsistentTextError(String, &'static str),

    /// No element or processor with this ID exists
    #[error("IdNotFoundError: No such ID: {0} ({1})")]
    IdNotFoundError(String, &'static str),

    /// The handle does not point to a live item (it may have been destroyed)
    #[error("HandleError: Invalid handle ({0})")]
    HandleError(&'static str),

    /// The streaming engine is in a state where it can not continue
    #[error("EngineError: {0} ({1})")]
    EngineError(String, &'static str),

    #[error("IOError: {0} ({1}, {2})")]
    IOError(std::io::Error, String, &'static str),

    #[error("JsonError: {0} ({1}, {2})")]
    JsonError(
        serde_path_to_error::Error<serde_json::Error>,
        String,
        &'static str,
    ),

    #[error("SerializationError: {0}")]
    SerializationError(String),
}

impl FoliaError {
    /// Is this a lookup-style error that callers may recover from?
    /// These are routinely caught to implement fallback searches.
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::NoSuchAnnotationError(..) | Self::NoTextError(..) | Self::NoPhonError(..)
        )
    }
}

impl From<quick_xml::Error> for FoliaError {
    fn from(err: quick_xml::Error) -> Self {
        FoliaError::XmlFormatError(format!("{}", err), "XML reader")
    }
}

impl From<quick_xml::escape::EscapeError> for FoliaError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        FoliaError::XmlFormatError(format!("{}", err), "XML unescape")
    }
}

pub type FoliaResult<T> = Result<T, FoliaError>;
