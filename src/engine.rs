/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the streaming engines, which process documents that are too large to
//! hold in memory. An [`Engine`] reads a document with a forward-only cursor and only builds the
//! structure leading up to the elements of interest, which are expanded in full and returned one
//! by one. Processed content can be written out and released from memory with
//! [`Engine::flush()`]. A body that is itself of interest is expanded in full.
//!
//! A [`TextEngine`] returns the elements holding text in a given text class (the nearest
//! ancestor of each text fragment, see [`Document::text_parents()`]). It reads the document
//! twice: once to build a lightweight index, once to construct the elements.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use crate::config::{Config, Configurable};
use crate::document::Document;
use crate::element::{Element, ElementHandle};
use crate::error::FoliaError;
use crate::file::*;
use crate::parser::is_folia;
use crate::schema::{ElementFamily, ElementType};
use crate::serialize::Serializer;
use crate::store::*;
use crate::types::*;
use crate::xmlreader::{is_namespace_declaration, NodeType, XmlCursor};

/// Determines which elements are returned by an [`Engine`]
#[derive(Debug, Clone, PartialEq)]
pub enum Interest {
    /// Elements of these kinds
    Tags(BTreeSet<ElementType>),
    /// Elements with these sequential indices in the XML stream
    Indices(BTreeSet<usize>),
}

impl Interest {
    fn contains(&self, elementtype: ElementType, index: usize) -> bool {
        match self {
            Self::Tags(tags) => tags.contains(&elementtype),
            Self::Indices(indices) => indices.contains(&index),
        }
    }
}

/// A streaming engine returning elements of interest one by one, see the module documentation
pub struct Engine<R: BufRead> {
    cursor: XmlCursor<R>,
    doc: Document,
    interest: Interest,
    output: Option<Box<dyn Write>>,
    /// The open (shallowly built) elements: their depth in the XML stream and their handle
    open: Vec<(usize, ElementHandle)>,
    header_written: bool,
    /// Sequential index of the last returned element
    last_index: Option<usize>,
    /// The body, when it is itself of interest and not yet returned
    body_ready: Option<(usize, ElementHandle)>,
}

impl Engine<Box<dyn BufRead>> {
    /// Opens an engine on a file, `-` reads standard input
    pub fn from_file(
        filename: &str,
        config: Config,
        tags: impl IntoIterator<Item = ElementType>,
    ) -> Result<Self, FoliaError> {
        let source = open_file_reader(filename, &config)?;
        Engine::new(source, config, tags)
    }
}

impl<R: BufRead> Engine<R> {
    /// Opens an engine on a reader. The engine will return all elements of the given kinds.
    pub fn new(
        source: R,
        config: Config,
        tags: impl IntoIterator<Item = ElementType>,
    ) -> Result<Self, FoliaError> {
        Self::with_interest(source, config, Interest::Tags(tags.into_iter().collect()))
    }

    pub(crate) fn with_interest(
        source: R,
        config: Config,
        interest: Interest,
    ) -> Result<Self, FoliaError> {
        let mut cursor = XmlCursor::new(source);
        if !cursor.next_element()? {
            return Err(FoliaError::XmlFormatError(
                "no root element".to_string(),
                "Engine::new",
            ));
        }
        let mut doc = Document::from_root(
            cursor.local_name(),
            cursor.namespace(),
            cursor.attributes(),
            config,
        )?;
        let mut open = Vec::new();
        let mut body_ready = None;
        loop {
            if !cursor.next_element()? {
                return Err(FoliaError::XmlFormatError(
                    "document has no body".to_string(),
                    "Engine::new",
                ));
            }
            match cursor.local_name() {
                "metadata" => {
                    let xml = cursor.expand()?;
                    doc.parse_metadata(&xml)?;
                }
                "text" | "speech" => {
                    let elementtype = ElementType::from_tag(cursor.local_name()).ok_or_else(|| {
                        FoliaError::XmlFormatError("invalid body".to_string(), "Engine::new")
                    })?;
                    let index = cursor.elements_read() - 1;
                    if interest.contains(elementtype, index) {
                        let xml = cursor.expand()?;
                        let mut pending = Vec::new();
                        let body = doc.build_element(&xml, &mut pending)?.ok_or_else(|| {
                            FoliaError::XmlFormatError("invalid body".to_string(), "Engine::new")
                        })?;
                        doc.root = Some(body);
                        doc.resolve_pending(pending)?;
                        body_ready = Some((index, body));
                    } else {
                        let body = build_shallow(&mut doc, &cursor, elementtype)?;
                        doc.root = Some(body);
                        if !cursor.is_empty() {
                            open.push((cursor.depth(), body));
                        }
                    }
                    break;
                }
                other => {
                    doc.unknown(&format!("unexpected element <{}> in root", other))?;
                    cursor.skip_subtree()?;
                }
            }
        }
        debug(doc.config(), || {
            format!("Engine::new: document {}, interest {:?}", doc.id(), interest)
        });
        Ok(Self {
            cursor,
            doc,
            interest,
            output: None,
            open,
            header_written: false,
            last_index: None,
            body_ready,
        })
    }

    /// Sets a writer to which processed content is written by [`Engine::flush()`] and [`Engine::finish()`]
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = Some(output);
        self
    }

    /// Writes processed content to a file, `-` writes to standard output
    pub fn with_output_file(self, filename: &str) -> Result<Self, FoliaError> {
        let output = open_file_writer(filename, self.doc.config())?;
        Ok(self.with_output(output))
    }

    /// The document being built
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The document being built, elements returned by the engine may be modified before they are flushed
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Heap memory currently used by the elements in memory
    pub fn meminfo(&self) -> usize {
        self.doc.meminfo()
    }

    /// Sequential index (in the XML stream) of the last returned element
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Number of elements read from the stream so far
    pub fn elements_read(&self) -> usize {
        self.cursor.elements_read()
    }

    /// Returns the next element of interest, fully built and attached to the tree. Returns `None`
    /// at the end of the document.
    pub fn next_node(&mut self) -> Result<Option<ElementHandle>, FoliaError> {
        if let Some((index, body)) = self.body_ready.take() {
            self.last_index = Some(index);
            return Ok(Some(body));
        }
        while self.cursor.read()? {
            match self.cursor.nodetype() {
                NodeType::Element => {
                    let depth = self.cursor.depth();
                    let index = self.cursor.elements_read() - 1;
                    // walk up to the parent of the new element
                    while matches!(self.open.last(), Some((d, _)) if *d >= depth) {
                        self.open.pop();
                    }
                    let parent = match self.open.last() {
                        Some((_, parent)) => *parent,
                        None => {
                            self.doc.unknown(&format!(
                                "unexpected element <{}> after the body",
                                self.cursor.local_name()
                            ))?;
                            self.cursor.skip_subtree()?;
                            continue;
                        }
                    };
                    let elementtype = match ElementType::from_tag(self.cursor.local_name())
                        .filter(|_| is_folia(self.cursor.namespace()))
                    {
                        Some(elementtype) => elementtype,
                        None => {
                            self.doc.unknown(&format!(
                                "unknown element <{}>",
                                self.cursor.local_name()
                            ))?;
                            self.cursor.skip_subtree()?;
                            continue;
                        }
                    };
                    if self.interest.contains(elementtype, index) {
                        if let Some(handle) = self.expand_into(parent)? {
                            self.last_index = Some(index);
                            return Ok(Some(handle));
                        }
                    } else if is_shallow(elementtype) && !self.cursor.is_empty() {
                        let handle = build_shallow(&mut self.doc, &self.cursor, elementtype)?;
                        if let Err(e) = self.doc.append(parent, handle) {
                            let _ = self.doc.destroy(handle);
                            return Err(e);
                        }
                        self.open.push((depth, handle));
                    } else {
                        self.expand_into(parent)?;
                    }
                }
                NodeType::EndElement => {
                    let depth = self.cursor.depth();
                    if matches!(self.open.last(), Some((d, _)) if *d == depth) {
                        self.open.pop();
                    }
                }
                NodeType::Text => {
                    if !self.cursor.text().trim().is_empty() && !self.open.is_empty() {
                        return Err(FoliaError::XmlFormatError(
                            format!("unexpected text: '{}'", self.cursor.text().trim()),
                            "Engine::next_node",
                        ));
                    }
                }
                NodeType::Comment => {
                    if let Some((_, parent)) = self.open.last() {
                        let parent = *parent;
                        let comment = self.doc.insert(Element::new_comment(self.cursor.text()))?;
                        self.doc.append(parent, comment)?;
                    }
                }
                NodeType::EndOfFile => break,
            }
        }
        Ok(None)
    }

    /// Expands the current element in full and appends it to `parent`
    fn expand_into(&mut self, parent: ElementHandle) -> Result<Option<ElementHandle>, FoliaError> {
        let xml = self.cursor.expand()?;
        let mut pending = Vec::new();
        let handle = match self.doc.build_element(&xml, &mut pending)? {
            Some(handle) => handle,
            None => return Ok(None),
        };
        if let Some(reference) = pending.first() {
            let id = reference.id.clone();
            let _ = self.doc.destroy(handle);
            return Err(FoliaError::EngineError(
                format!("reference to {}, which has not been read", id),
                "Engine::next_node",
            ));
        }
        if let Err(e) = self.doc.append(parent, handle) {
            let _ = self.doc.destroy(handle);
            return Err(e);
        }
        Ok(Some(handle))
    }

    fn write(&mut self, out: &str) -> Result<(), FoliaError> {
        if let Some(output) = self.output.as_mut() {
            output.write_all(out.as_bytes()).map_err(|e| {
                FoliaError::IOError(e, String::new(), "Writing engine output failed")
            })?;
        }
        Ok(())
    }

    /// Writes all completed content of the body to the output (if any) and releases it from
    /// memory. Elements returned earlier become invalid once flushed.
    pub fn flush(&mut self) -> Result<(), FoliaError> {
        let body = match self.doc.root {
            Some(body) => body,
            None => return Ok(()),
        };
        let inprogress = self.open.get(1).map(|(_, h)| *h);
        let completed: Vec<ElementHandle> = self
            .doc
            .children(body)
            .filter(|h| Some(*h) != inprogress)
            .collect();
        let mut out = String::new();
        {
            let serializer = Serializer::new(&self.doc);
            if self.output.is_some() {
                if !self.header_written {
                    serializer.write_header(&mut out)?;
                    serializer.write_start_tag(body, 1, &mut out)?;
                }
                for child in completed.iter() {
                    serializer.write_element(*child, 2, false, &mut out)?;
                }
            }
        }
        self.header_written = true;
        self.write(&out)?;
        for child in completed {
            self.doc.destroy(child)?;
        }
        debug(self.doc.config(), || {
            format!("Engine::flush: {} elements remain in memory", self.doc.len())
        });
        Ok(())
    }

    /// Reads the remainder of the input, writes everything not yet written, and returns the
    /// document (which no longer holds flushed content)
    pub fn finish(mut self) -> Result<Document, FoliaError> {
        while self.next_node()?.is_some() {}
        self.open.clear();
        if self.output.is_some() {
            let mut out = String::new();
            {
                let serializer = Serializer::new(&self.doc);
                if let Some(body) = self.doc.root {
                    if !self.header_written {
                        serializer.write_header(&mut out)?;
                        serializer.write_start_tag(body, 1, &mut out)?;
                    }
                    for child in self.doc.children(body) {
                        serializer.write_element(child, 2, false, &mut out)?;
                    }
                    serializer.write_end_tag(body, 1, &mut out)?;
                } else if !self.header_written {
                    serializer.write_header(&mut out)?;
                }
                serializer.write_footer(&mut out);
            }
            self.header_written = true;
            self.write(&out)?;
            if let Some(output) = self.output.as_mut() {
                output.flush().map_err(|e| {
                    FoliaError::IOError(e, String::new(), "Writing engine output failed")
                })?;
            }
        }
        Ok(self.doc)
    }
}

impl<R: BufRead> Iterator for Engine<R> {
    type Item = Result<ElementHandle, FoliaError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().transpose()
    }
}

/// Kinds that are built shallowly (without their children) when not of interest
fn is_shallow(elementtype: ElementType) -> bool {
    elementtype.family() == ElementFamily::Structure
        || matches!(
            elementtype,
            ElementType::Correction | ElementType::New | ElementType::Current
        )
}

/// Builds a detached element from the current cursor position, without children
fn build_shallow<R: BufRead>(
    doc: &mut Document,
    cursor: &XmlCursor<R>,
    elementtype: ElementType,
) -> Result<ElementHandle, FoliaError> {
    let handle = doc.insert(Element::new(elementtype))?;
    let attributes = cursor
        .attributes()
        .iter()
        .filter(|(k, _)| !is_namespace_declaration(k))
        .map(|(k, v)| (k.as_str(), v.as_str()));
    if let Err(e) = doc.set_attributes(handle, attributes) {
        let _ = doc.destroy(handle);
        return Err(e);
    }
    Ok(handle)
}

/// A node in the lightweight index of a [`TextEngine`]
#[derive(Debug, Clone, PartialEq)]
pub struct IndexNode {
    /// Depth in the XML stream, the root element has depth 0
    pub depth: usize,
    /// Sequential index in the XML stream
    pub index: usize,
    pub tag: String,
    /// The text class, for text content
    pub textclass: Option<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Lightweight index of all elements in an XML stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextIndex {
    nodes: Vec<IndexNode>,
}

impl TextIndex {
    /// Builds the index in a single forward pass
    pub fn build<R: BufRead>(source: R) -> Result<Self, FoliaError> {
        let mut cursor = XmlCursor::new(source);
        let mut nodes: Vec<IndexNode> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        while cursor.read()? {
            if cursor.nodetype() != NodeType::Element {
                continue;
            }
            let depth = cursor.depth();
            stack.truncate(depth);
            let index = nodes.len();
            let parent = stack.last().copied();
            let textclass = if cursor.local_name() == "t" {
                Some(cursor.attribute("class").unwrap_or("current").to_string())
            } else {
                None
            };
            nodes.push(IndexNode {
                depth,
                index,
                tag: cursor.local_name().to_string(),
                textclass,
                parent,
                children: Vec::new(),
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }
            if !cursor.is_empty() {
                stack.push(index);
            }
        }
        Ok(Self { nodes })
    }

    pub fn get(&self, index: usize) -> Option<&IndexNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The index of the element following this one (and its subtree) in document order
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let mut current = index;
        loop {
            let node = self.nodes.get(current)?;
            let parent = self.nodes.get(node.parent?)?;
            let position = parent.children.iter().position(|c| *c == current)?;
            if let Some(next) = parent.children.get(position + 1) {
                return Some(*next);
            }
            current = parent.index;
        }
    }

    /// Finds the nearest elements holding text in the given class, in document order, as pairs of
    /// the element's index and the index of the element following it
    pub fn enumerate_text_parents(&self, textclass: &str) -> Vec<(usize, Option<usize>)> {
        let mut result = Vec::new();
        let body = self
            .nodes
            .iter()
            .find(|n| n.depth == 1 && (n.tag == "text" || n.tag == "speech"));
        if let Some(body) = body {
            self.collect(body.index, textclass, &mut result);
        }
        result
    }

    fn collect(&self, index: usize, textclass: &str, result: &mut Vec<(usize, Option<usize>)>) -> bool {
        let before = result.len();
        self.collect_children(index, textclass, result);
        if result.len() > before {
            return true;
        }
        let has_text = self.nodes[index]
            .children
            .iter()
            .any(|c| self.nodes[*c].textclass.as_deref() == Some(textclass));
        if has_text {
            result.push((index, self.next_index(index)));
        }
        has_text
    }

    fn collect_children(
        &self,
        index: usize,
        textclass: &str,
        result: &mut Vec<(usize, Option<usize>)>,
    ) {
        for child in self.nodes[index].children.iter() {
            let node = &self.nodes[*child];
            match node.tag.as_str() {
                "correction" | "new" | "current" => self.collect_children(*child, textclass, result),
                tag => {
                    if ElementType::from_tag(tag).map(|t| t.family()) == Some(ElementFamily::Structure) {
                        self.collect(*child, textclass, result);
                    }
                }
            }
        }
    }
}

/// A streaming engine returning the elements that hold text in a given class, see the module documentation
pub struct TextEngine<R: BufRead> {
    engine: Engine<R>,
    hits: Vec<(usize, Option<usize>)>,
    position: usize,
}

impl TextEngine<Box<dyn BufRead>> {
    /// Opens a text engine on a file (which is read twice)
    pub fn from_file(filename: &str, config: Config, textclass: &str) -> Result<Self, FoliaError> {
        let readconfig = config.clone();
        TextEngine::new(
            || open_file_reader(filename, &readconfig),
            config,
            textclass,
        )
    }
}

impl<'a> TextEngine<&'a [u8]> {
    /// Opens a text engine on a string holding FoLiA XML
    pub fn from_xml(xml: &'a str, config: Config, textclass: &str) -> Result<Self, FoliaError> {
        TextEngine::new(|| Ok(xml.as_bytes()), config, textclass)
    }
}

impl<R: BufRead> TextEngine<R> {
    /// Opens a text engine. `open` is called twice to obtain the source, once for indexing and
    /// once for construction.
    pub fn new<F>(open: F, config: Config, textclass: &str) -> Result<Self, FoliaError>
    where
        F: Fn() -> Result<R, FoliaError>,
    {
        let index = TextIndex::build(open()?)?;
        let hits = index.enumerate_text_parents(textclass);
        debug(&config, || {
            format!(
                "TextEngine::new: {} elements indexed, {} text parents in class '{}'",
                index.len(),
                hits.len(),
                textclass
            )
        });
        let interest = Interest::Indices(hits.iter().map(|(index, _)| *index).collect());
        let engine = Engine::with_interest(open()?, config, interest)?;
        Ok(Self {
            engine,
            hits,
            position: 0,
        })
    }

    /// The (index, next index) pairs of all text parents
    pub fn text_parents(&self) -> &[(usize, Option<usize>)] {
        &self.hits
    }

    /// Returns the next element that holds text in the requested class
    pub fn next_text_parent(&mut self) -> Result<Option<ElementHandle>, FoliaError> {
        let handle = match self.engine.next_node()? {
            Some(handle) => handle,
            None => return Ok(None),
        };
        let (index, next_index) = self.hits.get(self.position).copied().ok_or_else(|| {
            FoliaError::EngineError(
                "more text parents than indexed".to_string(),
                "TextEngine::next_text_parent",
            )
        })?;
        if self.engine.last_index() != Some(index) {
            return Err(FoliaError::EngineError(
                format!(
                    "expected element {}, got {:?}",
                    index,
                    self.engine.last_index()
                ),
                "TextEngine::next_text_parent",
            ));
        }
        if let Some(next_index) = next_index {
            if self.engine.elements_read() != next_index {
                return Err(FoliaError::EngineError(
                    format!(
                        "expected the next element to be {}, but {} elements were read",
                        next_index,
                        self.engine.elements_read()
                    ),
                    "TextEngine::next_text_parent",
                ));
            }
        }
        self.position += 1;
        Ok(Some(handle))
    }

    pub fn document(&self) -> &Document {
        self.engine.document()
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.engine.document_mut()
    }

    /// See [`Engine::with_output()`]
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.engine = self.engine.with_output(output);
        self
    }

    /// See [`Engine::flush()`]
    pub fn flush(&mut self) -> Result<(), FoliaError> {
        self.engine.flush()
    }

    /// See [`Engine::finish()`]
    pub fn finish(self) -> Result<Document, FoliaError> {
        self.engine.finish()
    }
}

impl<R: BufRead> Iterator for TextEngine<R> {
    type Item = Result<ElementHandle, FoliaError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_text_parent().transpose()
    }
}
