/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the XML reader used by both the full parser and the streaming engines.
//! [`XmlCursor`] is a forward-only cursor over the nodes of an XML stream that can expand the
//! current element to an owned [`XmlElement`] tree or skip past it.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::io::BufRead;

use crate::error::FoliaError;

/// The type of the node the cursor is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Start of an element (or an empty element)
    Element,
    EndElement,
    Text,
    Comment,
    EndOfFile,
}

/// A node in an expanded XML tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

/// An expanded XML element with all its descendants
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Local name
    pub name: String,
    pub prefix: Option<String>,
    /// Namespace URI the element is in, if any
    pub namespace: Option<String>,
    /// Attributes by qualified name, namespace declarations included
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Writes the node back as XML
    pub fn write_xml(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape(text.as_str())),
            Self::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Self::Element(element) => element.write_xml(out),
        }
    }
}

/// Is this attribute a namespace declaration?
pub fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

impl XmlElement {
    /// The name including the prefix
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    /// Writes the element back as XML
    pub fn write_xml(&self, out: &mut String) {
        let name = self.qualified_name();
        out.push('<');
        out.push_str(&name);
        for (key, value) in self.attributes.iter() {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
        } else {
            out.push('>');
            for child in self.children.iter() {
                child.write_xml(out);
            }
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// The concatenation of all direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Forward-only cursor over an XML stream
pub struct XmlCursor<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    nodetype: NodeType,
    depth: usize,
    /// The last read element was a start tag, so the next node is one level deeper
    opened: bool,
    empty: bool,
    name: String,
    prefix: Option<String>,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    text: String,
    elements_read: usize,
}

impl<R: BufRead> XmlCursor<R> {
    pub fn new(source: R) -> Self {
        let mut reader = NsReader::from_reader(source);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            nodetype: NodeType::EndOfFile,
            depth: 0,
            opened: false,
            empty: false,
            name: String::new(),
            prefix: None,
            namespace: None,
            attributes: Vec::new(),
            text: String::new(),
            elements_read: 0,
        }
    }

    /// Reads the next node. Returns `false` at the end of the stream.
    pub fn read(&mut self) -> Result<bool, FoliaError> {
        if self.opened {
            self.depth += 1;
            self.opened = false;
        }
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?;
            match event {
                Event::Start(e) => {
                    let (name, prefix, namespace, attributes) = element_info(&self.reader, &e)?;
                    self.set_element(name, prefix, namespace, attributes, false);
                    self.opened = true;
                    return Ok(true);
                }
                Event::Empty(e) => {
                    let (name, prefix, namespace, attributes) = element_info(&self.reader, &e)?;
                    self.set_element(name, prefix, namespace, attributes, true);
                    return Ok(true);
                }
                Event::End(e) => {
                    self.depth = self.depth.checked_sub(1).ok_or_else(|| {
                        FoliaError::XmlFormatError(
                            "unexpected end tag".to_string(),
                            "XmlCursor::read",
                        )
                    })?;
                    self.name = utf8(e.local_name().as_ref(), "end tag")?;
                    self.nodetype = NodeType::EndElement;
                    self.empty = false;
                    return Ok(true);
                }
                Event::Text(e) => {
                    self.text = e.unescape()?.into_owned();
                    self.nodetype = NodeType::Text;
                    return Ok(true);
                }
                Event::CData(e) => {
                    self.text = utf8(&e, "CDATA")?;
                    self.nodetype = NodeType::Text;
                    return Ok(true);
                }
                Event::Comment(e) => {
                    self.text = utf8(&e, "comment")?;
                    self.nodetype = NodeType::Comment;
                    return Ok(true);
                }
                Event::Eof => {
                    self.nodetype = NodeType::EndOfFile;
                    return Ok(false);
                }
                _ => continue,
            }
        }
    }

    fn set_element(
        &mut self,
        name: String,
        prefix: Option<String>,
        namespace: Option<String>,
        attributes: Vec<(String, String)>,
        empty: bool,
    ) {
        self.name = name;
        self.prefix = prefix;
        self.namespace = namespace;
        self.attributes = attributes;
        self.empty = empty;
        self.nodetype = NodeType::Element;
        self.elements_read += 1;
    }

    pub fn nodetype(&self) -> NodeType {
        self.nodetype
    }

    /// Depth of the current node, the root element has depth 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Local name of the current element
    pub fn local_name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Text of the current text or comment node
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Is the current element an empty element (`<x/>`)?
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Number of elements read so far, the sequential index of the current element is one less
    pub fn elements_read(&self) -> usize {
        self.elements_read
    }

    fn current_element(&self) -> Result<XmlElement, FoliaError> {
        if self.nodetype != NodeType::Element {
            return Err(FoliaError::XmlFormatError(
                "cursor is not on an element".to_string(),
                "XmlCursor::expand",
            ));
        }
        Ok(XmlElement {
            name: self.name.clone(),
            prefix: self.prefix.clone(),
            namespace: self.namespace.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        })
    }

    /// Expands the current element to a full tree, the cursor is left on its end tag
    pub fn expand(&mut self) -> Result<XmlElement, FoliaError> {
        let mut element = self.current_element()?;
        if self.empty {
            return Ok(element);
        }
        let depth = self.depth;
        while self.read()? {
            match self.nodetype {
                NodeType::Element => element.children.push(XmlNode::Element(self.expand()?)),
                NodeType::Text => element
                    .children
                    .push(XmlNode::Text(std::mem::take(&mut self.text))),
                NodeType::Comment => element
                    .children
                    .push(XmlNode::Comment(std::mem::take(&mut self.text))),
                NodeType::EndElement if self.depth == depth => return Ok(element),
                _ => {}
            }
        }
        Err(FoliaError::XmlFormatError(
            format!("unexpected end of file in <{}>", element.name),
            "XmlCursor::expand",
        ))
    }

    /// Skips to the end tag of the current element
    pub fn skip_subtree(&mut self) -> Result<(), FoliaError> {
        if self.nodetype != NodeType::Element || self.empty {
            return Ok(());
        }
        let depth = self.depth;
        while self.read()? {
            if self.nodetype == NodeType::EndElement && self.depth == depth {
                return Ok(());
            }
        }
        Err(FoliaError::XmlFormatError(
            format!("unexpected end of file in <{}>", self.name),
            "XmlCursor::skip_subtree",
        ))
    }

    /// Reads until the next element start (or the end of the stream)
    pub fn next_element(&mut self) -> Result<bool, FoliaError> {
        while self.read()? {
            if self.nodetype == NodeType::Element {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn utf8(bytes: &[u8], context: &'static str) -> Result<String, FoliaError> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|err| FoliaError::XmlFormatError(err.to_string(), context))
}

type ElementInfo = (String, Option<String>, Option<String>, Vec<(String, String)>);

fn element_info<R>(reader: &NsReader<R>, e: &BytesStart) -> Result<ElementInfo, FoliaError> {
    let (resolved, local) = reader.resolve_element(e.name());
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(utf8(ns.as_ref(), "namespace")?),
        _ => None,
    };
    let name = utf8(local.as_ref(), "element name")?;
    let prefix = e
        .name()
        .prefix()
        .map(|p| utf8(p.as_ref(), "namespace prefix"))
        .transpose()?;
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr =
            attr.map_err(|err| FoliaError::XmlFormatError(err.to_string(), "XML attributes"))?;
        let key = utf8(attr.key.as_ref(), "attribute name")?;
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok((name, prefix, namespace, attributes))
}

/// Parses a complete XML document to an owned tree, returning the root element
pub struct XmlTree;

impl XmlTree {
    pub fn parse<R: BufRead>(source: R) -> Result<XmlElement, FoliaError> {
        let mut cursor = XmlCursor::new(source);
        if !cursor.next_element()? {
            return Err(FoliaError::XmlFormatError(
                "no root element".to_string(),
                "XmlTree::parse",
            ));
        }
        cursor.expand()
    }
}
