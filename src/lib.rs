/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! ## Introduction
//!
//! FoLiA (Format for Linguistic Annotation) is an XML-based format for rich linguistic annotation
//! of text and speech. This library parses, validates, manipulates, streams and serialises FoLiA
//! documents.
//!
//! **What can you do with this library?**
//!
//! * Load a FoLiA document fully into memory ([`Document::from_file()`], [`Document::from_xml()`])
//!   and save it again ([`Document::save()`], [`Document::to_xml_string()`]).
//! * Build documents programmatically with [`ElementBuilder`], where every mutation is validated
//!   against the schema: which elements may nest where, which attributes are allowed or required,
//!   and how often elements may occur.
//! * Declare annotation sets ([`Document::declare()`]), and let elements inherit default
//!   annotators, annotator types and processors from their declaration.
//! * Reconstruct text and phonetic content from the document structure ([`Document::text()`],
//!   [`Document::phon()`]), honouring delimiters and tokenisation.
//! * Record corrections of any part of a document ([`Document::correct()`]) and query them.
//! * Process documents that are too large for memory with the streaming [`Engine`] and
//!   [`TextEngine`], flushing processed content to output as you go.
//!
//! The library consists of a low-level API working with handles ([`ElementHandle`]) on a
//! [`Document`], and a high-level API (implemented in `api/*.rs`) around [`ResultItem`]:
//! * [`ResultItem<Element>`](struct.ResultItem.html#impl-ResultItem<'doc,+Element>)
//! * [`ResultItem<Processor>`](struct.ResultItem.html#impl-ResultItem<'doc,+Processor>)
//!
//! Example:
//!
//! ```
//! # use folia::*;
//! # fn main() -> Result<(), FoliaError> {
//! let mut doc = Document::new(Some("example"), Config::default())?;
//! doc.declare(AnnotationType::Pos, Some("https://example.org/pos"), None, None, None)?;
//! let body = doc.add_body(ElementBuilder::new(ElementType::Text).with_id("example.text"))?;
//! let sentence = doc.add(body, ElementBuilder::new(ElementType::Sentence).with_id("s1"))?;
//! for (i, word) in ["hello", "world"].iter().enumerate() {
//!     doc.add(
//!         sentence,
//!         ElementBuilder::new(ElementType::Word)
//!             .with_id(format!("s1.w{}", i + 1))
//!             .with_text(*word)
//!             .with_child(ElementBuilder::new(ElementType::PosAnnotation).with_class("X")),
//!     )?;
//! }
//! assert_eq!(doc.text(sentence, "current", false)?, "hello world");
//! # Ok(())
//! # }
//! ```

mod api;
mod attributes;
mod config;
mod correction;
mod declaration;
mod document;
mod element;
mod engine;
mod error;
mod file;
mod json;
mod parser;
mod provenance;
mod schema;
mod serialize;
mod span;
mod store;
mod text;
mod tree;
mod types;
mod xmlreader;

// Our internal crate structure is not very relevant to the outside world,
// expose all structs and traits in the root namespace, and be explicit about it:

pub use api::*;
pub use attributes::is_valid_id;
pub use config::{Config, Configurable};
pub use correction::{CorrectionOptions, CorrectionState};
pub use declaration::{Declaration, Declarations};
pub use document::{Document, Metadata, FOLIA_VERSION, NSFOLIA, NSXLINK};
pub use element::{Element, ElementBuilder, ElementHandle};
pub use engine::{Engine, IndexNode, Interest, TextEngine, TextIndex};
pub use error::{FoliaError, FoliaResult};
pub use json::ToJson;
pub use provenance::{Processor, ProcessorBuilder, ProcessorHandle, Provenance};
pub use schema::{
    accepts, accepts_family, feature_for_subset, is_subkind, properties, Accept, Attrib,
    ElementFamily, ElementType, Properties,
};
pub use serialize::GENERATOR;
pub use store::{Handle, IdMap, Storable, Store, StoreFor};
pub use tree::{SelectIter, Selector, DEFAULT_EXCLUDE};
pub use types::*;
pub use xmlreader::{NodeType, XmlCursor, XmlElement, XmlNode, XmlTree};

mod tests;
