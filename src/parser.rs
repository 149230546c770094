/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module constructs documents from XML. The same construction routines are used by the
//! full parser ([`Document::from_file()`], [`Document::from_xml()`]) and by the streaming engines.

use std::collections::HashMap;
use std::io::BufRead;

use crate::config::Config;
use crate::declaration::Declaration;
use crate::document::{Document, NSFOLIA};
use crate::element::{Element, ElementHandle};
use crate::error::FoliaError;
use crate::file::*;
use crate::provenance::{ProcessorBuilder, ProcessorHandle};
use crate::schema::{accepts, ElementType};
use crate::store::*;
use crate::types::*;
use crate::xmlreader::{is_namespace_declaration, XmlElement, XmlNode, XmlTree};

/// A reference to an element that was not yet parsed when the referring element was built
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingReference {
    pub(crate) parent: ElementHandle,
    pub(crate) index: usize,
    pub(crate) id: String,
}

/// Is the element in the FoLiA namespace? Elements without namespace are accepted as well.
pub(crate) fn is_folia(namespace: Option<&str>) -> bool {
    match namespace {
        Some(namespace) => namespace == NSFOLIA,
        None => true,
    }
}

impl Document {
    /// Loads a document from a FoLiA XML file, `-` reads standard input
    pub fn from_file(filename: &str, config: Config) -> Result<Self, FoliaError> {
        debug(&config, || format!("Document::from_file: {}", filename));
        let reader = open_file_reader(filename, &config)?;
        let mut doc = Self::from_reader(reader, config)?;
        doc.filename = Some(filename.to_string());
        Ok(doc)
    }

    /// Parses a document from a string holding FoLiA XML
    pub fn from_xml(xml: &str, config: Config) -> Result<Self, FoliaError> {
        Self::from_reader(xml.as_bytes(), config)
    }

    /// Parses a document from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R, config: Config) -> Result<Self, FoliaError> {
        let root = XmlTree::parse(reader)?;
        let mut doc = Self::from_root(
            &root.name,
            root.namespace.as_deref(),
            &root.attributes,
            config,
        )?;
        let mut pending = Vec::new();
        for child in root.elements() {
            match child.name.as_str() {
                "metadata" => doc.parse_metadata(child)?,
                "text" | "speech" => {
                    let body = doc.build_element(child, &mut pending)?;
                    doc.root = body;
                }
                other => doc.unknown(&format!("unexpected element <{}> in root", other))?,
            }
        }
        doc.resolve_pending(pending)?;
        if doc.config.checktext() {
            doc.check_text()?;
        }
        debug(&doc.config, || {
            format!(
                "Document::from_reader: parsed {} with {} elements",
                doc.id,
                doc.len()
            )
        });
        Ok(doc)
    }

    /// Creates a new document from the attributes of the root element
    pub(crate) fn from_root(
        name: &str,
        namespace: Option<&str>,
        attributes: &[(String, String)],
        config: Config,
    ) -> Result<Self, FoliaError> {
        if name != "FoLiA" {
            return Err(FoliaError::XmlFormatError(
                format!("root element must be <FoLiA>, got <{}>", name),
                "parse",
            ));
        }
        if namespace != Some(NSFOLIA) {
            return Err(FoliaError::XmlFormatError(
                format!("root element is not in the FoLiA namespace ({:?})", namespace),
                "parse",
            ));
        }
        let id = attributes
            .iter()
            .find(|(k, _)| k == "xml:id")
            .map(|(_, v)| v.as_str());
        let mut doc = Self::new(id, config)?;
        if let Some((_, version)) = attributes.iter().find(|(k, _)| k == "version") {
            doc.version = version.clone();
        }
        Ok(doc)
    }

    /// Handles something unknown: a warning in permissive mode, an error otherwise
    pub(crate) fn unknown(&self, message: &str) -> Result<(), FoliaError> {
        if self.config.permissive() {
            self.warn(message);
            Ok(())
        } else {
            Err(FoliaError::XmlFormatError(message.to_string(), "parse"))
        }
    }

    /// Parses the metadata block: provenance, annotation declarations and native metadata
    pub(crate) fn parse_metadata(&mut self, xml: &XmlElement) -> Result<(), FoliaError> {
        self.metadata.metadatatype = xml.attribute("type").map(|s| s.to_string());
        self.metadata.src = xml.attribute("src").map(|s| s.to_string());
        // provenance first, declarations may refer to processors
        for child in xml.elements().filter(|e| e.name == "provenance") {
            for processor in child.elements().filter(|e| e.name == "processor") {
                self.parse_processor(processor, None)?;
            }
        }
        for child in xml.elements() {
            match child.name.as_str() {
                "provenance" => {}
                "annotations" => {
                    for declaration in child.elements() {
                        self.parse_declaration(declaration)?;
                    }
                }
                "meta" => {
                    let key = child.attribute("id").ok_or_else(|| {
                        FoliaError::XmlFormatError(
                            "<meta> requires an id".to_string(),
                            "parse_metadata",
                        )
                    })?;
                    let value = child.text();
                    self.set_metadata(key, value);
                }
                "foreign-data" | "submetadata" => {
                    self.warn(format_args!("skipping <{}> in metadata", child.name));
                }
                other => self.unknown(&format!("unexpected element <{}> in metadata", other))?,
            }
        }
        Ok(())
    }

    fn parse_processor(
        &mut self,
        xml: &XmlElement,
        parent: Option<ProcessorHandle>,
    ) -> Result<(), FoliaError> {
        let mut builder = ProcessorBuilder::default();
        for (key, value) in xml.attributes.iter() {
            if let Err(e) = builder.set_attribute(key, value) {
                if self.config.permissive() {
                    self.warn(e);
                } else {
                    return Err(e);
                }
            }
        }
        for meta in xml.elements().filter(|e| e.name == "meta") {
            if let Some(key) = meta.attribute("id") {
                builder.metadata.push((key.to_string(), meta.text()));
            }
        }
        let handle = self.add_processor(builder, parent)?;
        for child in xml.elements().filter(|e| e.name == "processor") {
            self.parse_processor(child, Some(handle))?;
        }
        Ok(())
    }

    fn parse_declaration(&mut self, xml: &XmlElement) -> Result<(), FoliaError> {
        let annotationtype = match AnnotationType::from_declaration_tag(&xml.name) {
            Some(annotationtype) => annotationtype,
            None => {
                return self.unknown(&format!("unknown annotation declaration <{}>", xml.name))
            }
        };
        let mut declaration = Declaration::new(annotationtype, xml.attribute("set"));
        if let Some(alias) = xml.attribute("alias") {
            declaration = declaration.with_alias(alias);
        }
        if let Some(format) = xml.attribute("format") {
            declaration = declaration.with_format(format);
        }
        if let Some(annotator) = xml.attribute("annotator") {
            declaration = declaration.with_annotator(annotator);
        }
        if let Some(annotatortype) = xml.attribute("annotatortype") {
            declaration = declaration.with_annotatortype(annotatortype.parse()?);
        }
        if let Some(datetime) = xml.attribute("datetime") {
            declaration = declaration.with_datetime(parse_datetime(datetime)?);
        }
        for annotator in xml.elements().filter(|e| e.name == "annotator") {
            if let Some(processor) = annotator.attribute("processor") {
                declaration = declaration.with_processor(processor);
            }
        }
        self.add_declaration(declaration)
    }

    /// Builds a detached element (and its subtree) from XML. References to elements that do not
    /// exist yet are recorded in `pending`. Returns `None` if the element was skipped.
    pub(crate) fn build_element(
        &mut self,
        xml: &XmlElement,
        pending: &mut Vec<PendingReference>,
    ) -> Result<Option<ElementHandle>, FoliaError> {
        if !is_folia(xml.namespace.as_deref()) {
            self.unknown(&format!(
                "element <{}> is not in the FoLiA namespace",
                xml.qualified_name()
            ))?;
            return Ok(None);
        }
        let elementtype = match ElementType::from_tag(&xml.name) {
            Some(elementtype) => elementtype,
            None => {
                self.unknown(&format!("unknown element <{}>", xml.name))?;
                return Ok(None);
            }
        };
        let handle = self.insert(Element::new(elementtype))?;
        match self.build_element_into(handle, elementtype, xml, pending) {
            Ok(()) => Ok(Some(handle)),
            Err(e) => {
                let _ = self.destroy(handle);
                Err(e)
            }
        }
    }

    fn build_element_into(
        &mut self,
        handle: ElementHandle,
        elementtype: ElementType,
        xml: &XmlElement,
        pending: &mut Vec<PendingReference>,
    ) -> Result<(), FoliaError> {
        self.set_attributes(
            handle,
            xml.attributes
                .iter()
                .filter(|(k, _)| !is_namespace_declaration(k))
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )?;
        if elementtype == ElementType::ForeignData {
            // kept verbatim
            let mut value = String::new();
            for node in xml.children.iter() {
                node.write_xml(&mut value);
            }
            self.get_mut(handle)?.value = Some(value);
            return Ok(());
        }
        let accepts_text = accepts(elementtype, ElementType::XmlText);
        for node in xml.children.iter() {
            match node {
                XmlNode::Text(text) => {
                    if accepts_text {
                        let child = self.insert(Element::new_text(text.as_str()))?;
                        self.append(handle, child)?;
                    } else if !text.trim().is_empty() {
                        return Err(FoliaError::XmlFormatError(
                            format!("unexpected text in <{}>: '{}'", elementtype, text.trim()),
                            "parse",
                        ));
                    }
                }
                XmlNode::Comment(comment) => {
                    let child = self.insert(Element::new_comment(comment.as_str()))?;
                    self.append(handle, child)?;
                }
                XmlNode::Element(child) if child.name == "wref" && is_folia(child.namespace.as_deref()) => {
                    let id = child.attribute("id").ok_or_else(|| {
                        FoliaError::XmlFormatError("<wref> requires an id".to_string(), "parse")
                    })?;
                    match self.resolve_id(id) {
                        Ok(target) => {
                            self.append(handle, target)?;
                        }
                        Err(_) => pending.push(PendingReference {
                            parent: handle,
                            index: self.get(handle)?.data.len(),
                            id: id.to_string(),
                        }),
                    }
                }
                XmlNode::Element(child) => {
                    if let Some(child) = self.build_element(child, pending)? {
                        if let Err(e) = self.append(handle, child) {
                            let _ = self.destroy(child);
                            return Err(e);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolves references that were pending at the time their parent was built
    pub(crate) fn resolve_pending(
        &mut self,
        pending: Vec<PendingReference>,
    ) -> Result<(), FoliaError> {
        let mut inserted: HashMap<ElementHandle, usize> = HashMap::new();
        for reference in pending {
            let target = self.resolve_id(&reference.id).map_err(|_| {
                FoliaError::XmlFormatError(
                    format!("reference to unknown ID {}", reference.id),
                    "parse",
                )
            })?;
            let shift = inserted.entry(reference.parent).or_insert(0);
            let index = reference.index + *shift;
            *shift += 1;
            self.insert_child(reference.parent, index, target)?;
        }
        Ok(())
    }
}
