/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module serialises documents to FoLiA XML. Serialisation is split into a header (XML
//! declaration, root element and metadata), elements, and a footer, so the streaming engine can
//! write a document piece by piece.

use once_cell::unsync::OnceCell;
use quick_xml::escape::escape;
use std::io::Write;

use crate::declaration::Declaration;
use crate::document::{Document, NSFOLIA, NSXLINK};
use crate::element::{Element, ElementHandle};
use crate::error::FoliaError;
use crate::file::*;
use crate::provenance::Processor;
use crate::schema::{accepts, ElementFamily, ElementType};
use crate::store::*;
use crate::types::*;

/// The generator string written on the root element
pub const GENERATOR: &str = concat!("folia-rs-", env!("CARGO_PKG_VERSION"));

/// Serialises a single document. One serializer is used for one serialisation pass.
pub(crate) struct Serializer<'a> {
    doc: &'a Document,
    /// Prefix for element names (e.g. `folia:`), computed once per pass
    prefix: OnceCell<String>,
}

impl<'a> Serializer<'a> {
    pub(crate) fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            prefix: OnceCell::new(),
        }
    }

    fn prefix(&self) -> &str {
        self.prefix.get_or_init(|| match self.doc.config.ns_label() {
            Some(label) if !label.is_empty() => format!("{}:", label),
            _ => String::new(),
        })
    }

    fn tag(&self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }

    fn indent(&self, depth: usize) -> String {
        " ".repeat(depth * self.doc.config.indent())
    }

    fn strip(&self) -> bool {
        self.doc.config.strip()
    }

    fn explicit(&self) -> bool {
        self.doc.config.explicit()
    }

    /// Writes the XML declaration, the opening root tag and the metadata block
    pub(crate) fn write_header(&self, out: &mut String) -> Result<(), FoliaError> {
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        out.push('<');
        out.push_str(&self.tag("FoLiA"));
        match self.doc.config.ns_label() {
            Some(label) if !label.is_empty() => {
                push_attribute(out, &format!("xmlns:{}", label), NSFOLIA)
            }
            _ => push_attribute(out, "xmlns", NSFOLIA),
        }
        push_attribute(out, "xmlns:xlink", NSXLINK);
        push_attribute(out, "xml:id", &self.doc.id);
        push_attribute(out, "version", &self.doc.version);
        if !self.strip() {
            push_attribute(out, "generator", GENERATOR);
        }
        out.push_str(">\n");
        self.write_metadata(out)
    }

    fn write_metadata(&self, out: &mut String) -> Result<(), FoliaError> {
        let indent = self.indent(1);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.tag("metadata"));
        push_attribute(out, "type", self.doc.metadata.metadatatype());
        if let Some(src) = self.doc.metadata.src() {
            push_attribute(out, "src", src);
        }
        out.push_str(">\n");

        self.open_block(out, "annotations", 2, self.doc.declarations.is_empty());
        for declaration in self.doc.declarations.iter() {
            self.write_declaration(declaration, out);
        }
        self.close_block(out, "annotations", 2, self.doc.declarations.is_empty());

        if !self.doc.provenance.is_empty() {
            self.open_block(out, "provenance", 2, false);
            for root in self.doc.provenance.roots() {
                let processor: &Processor = self.doc.provenance.get(*root)?;
                self.write_processor(processor, 3, out)?;
            }
            self.close_block(out, "provenance", 2, false);
        }

        for (key, value) in self.doc.metadata.iter() {
            self.write_meta(key, value, 2, out);
        }
        out.push_str(&indent);
        out.push_str("</");
        out.push_str(&self.tag("metadata"));
        out.push_str(">\n");
        Ok(())
    }

    fn open_block(&self, out: &mut String, name: &str, depth: usize, empty: bool) {
        out.push_str(&self.indent(depth));
        out.push('<');
        out.push_str(&self.tag(name));
        out.push_str(if empty { "/>\n" } else { ">\n" });
    }

    fn close_block(&self, out: &mut String, name: &str, depth: usize, empty: bool) {
        if !empty {
            out.push_str(&self.indent(depth));
            out.push_str("</");
            out.push_str(&self.tag(name));
            out.push_str(">\n");
        }
    }

    fn write_meta(&self, key: &str, value: &str, depth: usize, out: &mut String) {
        out.push_str(&self.indent(depth));
        out.push('<');
        out.push_str(&self.tag("meta"));
        push_attribute(out, "id", key);
        out.push('>');
        out.push_str(&escape(value));
        out.push_str("</");
        out.push_str(&self.tag("meta"));
        out.push_str(">\n");
    }

    fn write_declaration(&self, declaration: &Declaration, out: &mut String) {
        let tag = self.tag(&declaration.annotationtype().declaration_tag());
        out.push_str(&self.indent(3));
        out.push('<');
        out.push_str(&tag);
        if let Some(set) = declaration.set() {
            push_attribute(out, "set", set);
        }
        if let Some(alias) = declaration.alias() {
            push_attribute(out, "alias", alias);
        }
        if let Some(format) = declaration.format() {
            push_attribute(out, "format", format);
        }
        if !self.strip() {
            if let Some(annotator) = declaration.annotator() {
                push_attribute(out, "annotator", annotator);
            }
            if let Some(annotatortype) = declaration.annotatortype() {
                push_attribute(out, "annotatortype", annotatortype.as_str());
            }
            if let Some(datetime) = declaration.datetime() {
                push_attribute(out, "datetime", &format_datetime(datetime));
            }
        }
        if declaration.processors().is_empty() {
            out.push_str("/>\n");
        } else {
            out.push_str(">\n");
            for processor in declaration.processors() {
                out.push_str(&self.indent(4));
                out.push('<');
                out.push_str(&self.tag("annotator"));
                push_attribute(out, "processor", processor);
                out.push_str("/>\n");
            }
            out.push_str(&self.indent(3));
            out.push_str("</");
            out.push_str(&tag);
            out.push_str(">\n");
        }
    }

    fn write_processor(
        &self,
        processor: &Processor,
        depth: usize,
        out: &mut String,
    ) -> Result<(), FoliaError> {
        out.push_str(&self.indent(depth));
        out.push('<');
        out.push_str(&self.tag("processor"));
        push_attribute(out, "xml:id", processor.id());
        push_attribute(out, "name", processor.name());
        push_attribute(out, "type", processor.annotatortype().as_str());
        let optional = [
            ("version", processor.version()),
            ("document_version", processor.document_version()),
            ("command", processor.command()),
            ("folia_version", processor.folia_version()),
            ("src", processor.src()),
            ("format", processor.format()),
            ("resourcelink", processor.resourcelink()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                push_attribute(out, key, value);
            }
        }
        if !self.strip() {
            for (key, value) in [("host", processor.host()), ("user", processor.user())] {
                if let Some(value) = value {
                    push_attribute(out, key, value);
                }
            }
            if let Some(datetime) = processor.begindatetime() {
                push_attribute(out, "begindatetime", &format_datetime(datetime));
            }
            if let Some(datetime) = processor.enddatetime() {
                push_attribute(out, "enddatetime", &format_datetime(datetime));
            }
        }
        if processor.metadata().is_empty() && processor.children().is_empty() {
            out.push_str("/>\n");
            return Ok(());
        }
        out.push_str(">\n");
        for (key, value) in processor.metadata() {
            self.write_meta(key, value, depth + 1, out);
        }
        for child in processor.children() {
            let child: &Processor = self.doc.provenance.get(*child)?;
            self.write_processor(child, depth + 1, out)?;
        }
        out.push_str(&self.indent(depth));
        out.push_str("</");
        out.push_str(&self.tag("processor"));
        out.push_str(">\n");
        Ok(())
    }

    /// Writes the closing root tag
    pub(crate) fn write_footer(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.tag("FoLiA"));
        out.push_str(">\n");
    }

    /// Writes only the opening tag of an element on its own line
    pub(crate) fn write_start_tag(
        &self,
        handle: ElementHandle,
        depth: usize,
        out: &mut String,
    ) -> Result<(), FoliaError> {
        let element = self.doc.get(handle)?;
        out.push_str(&self.indent(depth));
        self.write_open(element, out)?;
        out.push_str(">\n");
        Ok(())
    }

    /// Writes only the closing tag of an element on its own line
    pub(crate) fn write_end_tag(
        &self,
        handle: ElementHandle,
        depth: usize,
        out: &mut String,
    ) -> Result<(), FoliaError> {
        let element = self.doc.get(handle)?;
        out.push_str(&self.indent(depth));
        out.push_str("</");
        out.push_str(&self.tag(element.elementtype.xmltag()));
        out.push_str(">\n");
        Ok(())
    }

    /// Writes `<tag attributes` (without closing the tag)
    fn write_open(&self, element: &Element, out: &mut String) -> Result<(), FoliaError> {
        out.push('<');
        out.push_str(&self.tag(element.elementtype.xmltag()));
        for (key, value) in self.attributes(element)? {
            push_attribute(out, key, &value);
        }
        for (key, value) in element.extra_attributes() {
            push_attribute(out, key, value);
        }
        Ok(())
    }

    /// Writes an element with all its children. `inline` elements are part of mixed content and
    /// get no indentation or newlines.
    pub(crate) fn write_element(
        &self,
        handle: ElementHandle,
        depth: usize,
        inline: bool,
        out: &mut String,
    ) -> Result<(), FoliaError> {
        let element = self.doc.get(handle)?;
        match element.elementtype {
            ElementType::XmlText => {
                out.push_str(&escape(element.value().unwrap_or("")));
                return Ok(());
            }
            ElementType::XmlComment => {
                if !inline {
                    out.push_str(&self.indent(depth));
                }
                out.push_str("<!--");
                out.push_str(element.value().unwrap_or(""));
                out.push_str("-->");
                if !inline {
                    out.push('\n');
                }
                return Ok(());
            }
            _ => {}
        }
        if !inline {
            out.push_str(&self.indent(depth));
        }
        self.write_open(element, out)?;
        let children = self.ordered_children(handle, element);
        let raw = element.value().filter(|_| element.elementtype == ElementType::ForeignData);
        if children.is_empty() && raw.is_none() {
            out.push_str("/>");
        } else if let Some(raw) = raw {
            out.push('>');
            out.push_str(raw);
            self.write_close(element, out);
        } else if inline || accepts(element.elementtype, ElementType::XmlText) {
            out.push('>');
            for child in children {
                self.write_child(handle, child, depth + 1, true, out)?;
            }
            self.write_close(element, out);
        } else {
            out.push_str(">\n");
            for child in children {
                self.write_child(handle, child, depth + 1, false, out)?;
            }
            out.push_str(&self.indent(depth));
            self.write_close(element, out);
        }
        if !inline {
            out.push('\n');
        }
        Ok(())
    }

    fn write_close(&self, element: &Element, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.tag(element.elementtype.xmltag()));
        out.push('>');
    }

    fn write_child(
        &self,
        parent: ElementHandle,
        child: ElementHandle,
        depth: usize,
        inline: bool,
        out: &mut String,
    ) -> Result<(), FoliaError> {
        if self.doc.parent_of(child) == Some(parent) {
            return self.write_element(child, depth, inline, out);
        }
        // a reference
        let target = self.doc.get(child)?;
        let id = target.id().ok_or_else(|| {
            FoliaError::SerializationError(format!(
                "can not refer to <{}> without an ID",
                target.elementtype
            ))
        })?;
        if !inline {
            out.push_str(&self.indent(depth));
        }
        out.push('<');
        out.push_str(&self.tag("wref"));
        push_attribute(out, "id", id);
        if let Ok(text) = self.doc.text(child, "current", false) {
            push_attribute(out, "t", &text);
        }
        out.push_str("/>");
        if !inline {
            out.push('\n');
        }
        Ok(())
    }

    /// Children in output order: document order, or canonical order in canonical mode
    fn ordered_children(&self, handle: ElementHandle, element: &Element) -> Vec<ElementHandle> {
        let mut children: Vec<ElementHandle> = element.data.to_vec();
        if self.doc.config.canonical()
            && matches!(
                element.elementtype.family(),
                ElementFamily::Structure | ElementFamily::Subtoken
            )
        {
            children.sort_by_key(|child| {
                if self.doc.parent_of(*child) != Some(handle) {
                    return 1;
                }
                self.doc
                    .get(*child)
                    .map(|c| canonical_rank(c.elementtype))
                    .unwrap_or(4)
            });
        }
        children
    }

    /// The attributes to write for an element, in order
    fn attributes(&self, element: &Element) -> Result<Vec<(&'static str, String)>, FoliaError> {
        let mut attributes: Vec<(&'static str, String)> = Vec::new();
        let doc = self.doc;
        let annotationtype = element.elementtype.annotationtype();
        let declared_set = element.set.as_deref();
        let declaration = doc.declarations.get(annotationtype, declared_set);
        let explicit = self.explicit();
        let strip = self.strip();

        if let Some(id) = element.id() {
            attributes.push(("xml:id", id.to_string()));
        }
        if let Some(set) = element.set() {
            let is_default = doc.declarations.default_set(annotationtype) == Some(set);
            if explicit || !is_default {
                let alias = declaration.and_then(|d| d.alias()).unwrap_or(set);
                attributes.push(("set", alias.to_string()));
            }
        }
        if let Some(class) = element.class() {
            if explicit || !(element.elementtype.is_content() && class == "current") {
                attributes.push(("class", class.to_string()));
            }
        }
        if !strip {
            let processor = element
                .processor()
                .and_then(|id| doc.provenance.get_by_id(id).ok());
            if let Some(annotator) = element.annotator() {
                let is_default = declaration.and_then(|d| d.annotator()) == Some(annotator)
                    || processor.map(|p| p.name()) == Some(annotator);
                if explicit || !is_default {
                    attributes.push(("annotator", annotator.to_string()));
                }
            }
            if !element.annotatortype().is_undefined() {
                let annotatortype = element.annotatortype();
                let is_default = declaration.and_then(|d| d.annotatortype()) == Some(annotatortype)
                    || processor.map(|p| p.annotatortype()) == Some(annotatortype);
                if explicit || !is_default {
                    attributes.push(("annotatortype", annotatortype.as_str().to_string()));
                }
            }
        }
        if let Some(confidence) = element.confidence() {
            attributes.push(("confidence", confidence.to_string()));
        }
        if let Some(n) = element.n() {
            attributes.push(("n", n.to_string()));
        }
        if !strip {
            if let Some(datetime) = element.datetime() {
                let is_default = declaration.and_then(|d| d.datetime()) == Some(datetime);
                if explicit || !is_default {
                    attributes.push(("datetime", format_datetime(datetime)));
                }
            }
        }
        let optional = [
            ("begintime", element.begintime()),
            ("endtime", element.endtime()),
            ("src", element.src()),
            ("speaker", element.speaker()),
            ("textclass", element.textclass()),
            ("metadata", element.metadata()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                attributes.push((key, value.to_string()));
            }
        }
        if !element.space() {
            attributes.push(("space", "no".to_string()));
        }
        if let Some(tag) = element.tag() {
            attributes.push(("tag", tag.to_string()));
        }
        if !strip {
            if let Some(processor) = element.processor() {
                let is_default =
                    declaration.and_then(|d| d.default_processor()) == Some(processor);
                if explicit || !is_default {
                    attributes.push(("processor", processor.to_string()));
                }
            }
        }
        if !element.auth() {
            attributes.push(("auth", "no".to_string()));
        }
        if let Some(subset) = element.subset() {
            if element.elementtype == ElementType::Feature {
                attributes.push(("subset", subset.to_string()));
            }
        }
        if let Some(offset) = element.offset() {
            attributes.push(("offset", offset.to_string()));
        }
        Ok(attributes)
    }
}

/// Rank of an element kind in canonical order
fn canonical_rank(elementtype: ElementType) -> u8 {
    match elementtype.family() {
        ElementFamily::Content => 0,
        ElementFamily::Structure | ElementFamily::Subtoken => 1,
        ElementFamily::InlineAnnotation => 2,
        ElementFamily::AnnotationLayer => 3,
        _ => 4,
    }
}

fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

impl Document {
    /// Serialises the document to a FoLiA XML string
    pub fn to_xml_string(&self) -> Result<String, FoliaError> {
        let serializer = Serializer::new(self);
        let mut out = String::new();
        serializer.write_header(&mut out)?;
        if let Some(root) = self.root {
            serializer.write_element(root, 1, false, &mut out)?;
        }
        serializer.write_footer(&mut out);
        Ok(out)
    }

    /// Serialises a single element (and its subtree) to XML
    pub fn element_to_xml(&self, handle: ElementHandle) -> Result<String, FoliaError> {
        let serializer = Serializer::new(self);
        let mut out = String::new();
        serializer.write_element(handle, 0, false, &mut out)?;
        Ok(out)
    }

    /// Writes the document as FoLiA XML to any writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), FoliaError> {
        let xml = self.to_xml_string()?;
        writer
            .write_all(xml.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| FoliaError::IOError(e, String::new(), "Writing document failed"))
    }

    /// Saves the document to a file, `-` writes to standard output
    pub fn save(&self, filename: &str) -> Result<(), FoliaError> {
        debug(&self.config, || format!("Document::save: {}", filename));
        let writer = open_file_writer(filename, &self.config)?;
        self.write_to(writer)
    }
}
