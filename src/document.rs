/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Document`], the root ownership context holding the element tree,
//! the annotation declarations, the provenance and the native metadata.

use chrono::NaiveDateTime;
use datasize::data_size;
use sealed::sealed;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use crate::attributes::is_valid_id;
use crate::config::{Config, Configurable};
use crate::declaration::{Declaration, Declarations};
use crate::element::{Element, ElementHandle};
use crate::error::FoliaError;
use crate::provenance::{Processor, ProcessorBuilder, ProcessorHandle, Provenance};
use crate::store::*;
use crate::types::*;

/// The FoLiA version this library implements and writes
pub const FOLIA_VERSION: &str = "2.5.0";

/// The FoLiA XML namespace
pub const NSFOLIA: &str = "http://ilk.uvt.nl/folia";

/// The XLink namespace
pub const NSXLINK: &str = "http://www.w3.org/1999/xlink";

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    /// The metadata type, `native` unless an external format is used
    pub(crate) metadatatype: Option<String>,
    /// External metadata file
    pub(crate) src: Option<String>,
    /// Native metadata as ordered key/value pairs
    pub(crate) data: Vec<(String, String)>,
}

impl Metadata {
    pub fn metadatatype(&self) -> &str {
        self.metadatatype.as_deref().unwrap_or("native")
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A FoLiA document. This is the root ownership context: it owns all elements (in an arena,
/// addressed by [`ElementHandle`]), the ID index, the annotation declarations, the provenance, and
/// the document modes (held in its [`Config`]).
#[derive(Debug)]
pub struct Document {
    pub(crate) id: String,
    pub(crate) version: String,
    pub(crate) elements: Store<Element>,
    pub(crate) idmap: IdMap<ElementHandle>,
    /// The body (`text` or `speech`)
    pub(crate) root: Option<ElementHandle>,
    pub(crate) declarations: Declarations,
    pub(crate) provenance: Provenance,
    pub(crate) metadata: Metadata,
    pub(crate) config: Config,
    /// Elements detached without being destroyed, released when the document is dropped
    pub(crate) pending_deletion: BTreeSet<ElementHandle>,
    /// Counters for ID generation, per identified ancestor and tag
    pub(crate) id_counters: HashMap<(ElementHandle, String), usize>,
    pub(crate) warnings: Cell<usize>,
    pub(crate) filename: Option<String>,
}

#[sealed]
impl TypeInfo for Document {
    fn typeinfo() -> Type {
        Type::Document
    }
}

#[sealed]
impl StoreFor<Element> for Document {
    fn store(&self) -> &Store<Element> {
        &self.elements
    }
    fn store_mut(&mut self) -> &mut Store<Element> {
        &mut self.elements
    }
    fn idmap(&self) -> Option<&IdMap<ElementHandle>> {
        Some(&self.idmap)
    }
    fn idmap_mut(&mut self) -> Option<&mut IdMap<ElementHandle>> {
        Some(&mut self.idmap)
    }
    fn store_typeinfo() -> &'static str {
        "Element in Document"
    }
}

impl Configurable for Document {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn set_config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }
}

impl Document {
    /// Creates a new empty document. If no ID is given and the configuration allows it, an ID is generated.
    pub fn new(id: Option<&str>, config: Config) -> Result<Self, FoliaError> {
        let id = match id {
            Some(id) => {
                if !is_valid_id(id) {
                    return Err(FoliaError::AttributeError(
                        format!("invalid document ID: {}", id),
                        "Document::new",
                    ));
                }
                id.to_string()
            }
            None if config.generate_ids() => format!("doc.{}", nanoid::nanoid!(10, &ID_ALPHABET)),
            None => {
                return Err(FoliaError::AttributeError(
                    "document ID is required".to_string(),
                    "Document::new",
                ))
            }
        };
        debug(&config, || format!("Document::new: id={}", id));
        Ok(Self {
            id,
            version: FOLIA_VERSION.to_string(),
            elements: Store::new(),
            idmap: IdMap::new(),
            root: None,
            declarations: Declarations::new(),
            provenance: Provenance::new(),
            metadata: Metadata::default(),
            config,
            pending_deletion: BTreeSet::new(),
            id_counters: HashMap::new(),
            warnings: Cell::new(0),
            filename: None,
        })
    }

    /// The document ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The FoLiA version the document was written in
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The file the document was loaded from, if any
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// The body element (`text` or `speech`)
    pub fn root(&self) -> Option<ElementHandle> {
        self.root
    }

    /// Sets one or more document modes from a comma separated string, see [`Config::set_mode()`]
    pub fn set_mode(&mut self, modes: &str) -> Result<(), FoliaError> {
        self.config.set_mode(modes)
    }

    /// Returns the document modes as a comma separated string
    pub fn mode(&self) -> String {
        self.config.mode()
    }

    /// Number of warnings issued while parsing or manipulating the document
    pub fn warning_count(&self) -> usize {
        self.warnings.get()
    }

    /// Logs a warning and counts it
    pub(crate) fn warn(&self, message: impl Display) {
        self.warnings.set(self.warnings.get() + 1);
        log::warn!("[folia] {}: {}", self.id, message);
    }

    /// Number of live elements in the arena
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Low-level access to an element
    pub fn get_element(&self, handle: ElementHandle) -> Result<&Element, FoliaError> {
        self.get(handle)
    }

    /// Resolves an element ID to a handle
    pub fn resolve(&self, id: &str) -> Result<ElementHandle, FoliaError> {
        self.resolve_id(id)
    }

    /// Native metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Sets a native metadata field, replacing an existing value for the same key
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.metadata.data.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.metadata.data.push((key, value));
        }
    }

    /// The annotation declarations
    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    /// Declares an annotation type and set with optional defaults. Idempotent.
    pub fn declare(
        &mut self,
        annotationtype: AnnotationType,
        set: Option<&str>,
        annotator: Option<&str>,
        annotatortype: Option<AnnotatorType>,
        datetime: Option<NaiveDateTime>,
    ) -> Result<(), FoliaError> {
        let mut declaration = Declaration::new(annotationtype, set);
        if let Some(annotator) = annotator {
            declaration = declaration.with_annotator(annotator);
        }
        if let Some(annotatortype) = annotatortype {
            declaration = declaration.with_annotatortype(annotatortype);
        }
        if let Some(datetime) = datetime {
            declaration = declaration.with_datetime(datetime);
        }
        self.add_declaration(declaration)
    }

    /// Adds a full declaration (with alias, format and processors). Processors must exist.
    pub fn add_declaration(&mut self, declaration: Declaration) -> Result<(), FoliaError> {
        for processor in declaration.processors() {
            if !self.provenance.has_id(processor) {
                return Err(FoliaError::DeclarationError(
                    format!(
                        "declaration of {} refers to unknown processor {}",
                        declaration.annotationtype(),
                        processor
                    ),
                    "Document::add_declaration",
                ));
            }
        }
        debug(&self.config, || {
            format!(
                "Document::add_declaration: {} {:?}",
                declaration.annotationtype(),
                declaration.set()
            )
        });
        self.declarations.add(declaration);
        Ok(())
    }

    /// Is the type and set declared?
    pub fn is_declared(&self, annotationtype: AnnotationType, set: Option<&str>) -> bool {
        self.declarations.is_declared(annotationtype, set)
    }

    /// The unique default set for an annotation type, `None` if there are no or multiple declarations
    pub fn default_set(&self, annotationtype: AnnotationType) -> Option<&str> {
        self.declarations.default_set(annotationtype)
    }

    /// The provenance data
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Adds a processor to the provenance, generating an ID if none was provided
    pub fn add_processor(
        &mut self,
        builder: ProcessorBuilder,
        parent: Option<ProcessorHandle>,
    ) -> Result<ProcessorHandle, FoliaError> {
        self.provenance.add(builder, parent)
    }

    /// Looks up a processor by ID
    pub fn get_processor(&self, id: &str) -> Result<&Processor, FoliaError> {
        self.provenance.get_by_id(id)
    }

    /// Reports heap memory used by the element arena, in bytes
    pub fn meminfo(&self) -> usize {
        let elements: usize = self
            .elements
            .iter_with_handles::<ElementHandle>()
            .map(|(_, element)| data_size(element))
            .sum();
        elements
            + self.elements.slots() * std::mem::size_of::<Element>()
            + self.idmap.len() * std::mem::size_of::<(String, ElementHandle)>()
    }

    /// Number of elements detached but not yet released
    pub fn pending_deletion_count(&self) -> usize {
        self.pending_deletion.len()
    }

    /// Releases all elements pending deletion (that were not re-attached in the meantime)
    pub(crate) fn release_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending_deletion);
        for handle in pending {
            if let Ok(element) = self.get(handle) {
                if element.parent.is_none() && Some(handle) != self.root {
                    //ignore errors, items may have been destroyed as part of another subtree
                    let _ = self.destroy(handle);
                }
            }
        }
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if !self.pending_deletion.is_empty() {
            debug(&self.config, || {
                format!(
                    "Document::drop: releasing {} pending elements",
                    self.pending_deletion.len()
                )
            });
            self.release_pending();
        }
    }
}

const ID_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
