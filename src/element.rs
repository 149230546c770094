/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Element`], the node type of the element tree, along with its
//! [`ElementHandle`] and the [`ElementBuilder`] used to construct elements (and entire subtrees)
//! before they are added to a [`crate::Document`].

use chrono::NaiveDateTime;
use datasize::DataSize;
use sealed::sealed;
use smallvec::SmallVec;

use crate::schema::{ElementType, Properties};
use crate::store::*;
use crate::types::*;

/// A node in the element tree. All fields are private, they are set through
/// [`crate::Document::set_attributes()`] which validates them against the schema and the annotation
/// declarations.
#[derive(Debug, Clone, DataSize)]
pub struct Element {
    #[data_size(skip)]
    pub(crate) elementtype: ElementType,
    pub(crate) id: Option<String>,
    pub(crate) set: Option<String>,
    pub(crate) class: Option<String>,
    pub(crate) annotator: Option<String>,
    #[data_size(skip)]
    pub(crate) annotatortype: AnnotatorType,
    pub(crate) confidence: Option<f64>,
    pub(crate) n: Option<String>,
    #[data_size(skip)]
    pub(crate) datetime: Option<NaiveDateTime>,
    pub(crate) begintime: Option<String>,
    pub(crate) endtime: Option<String>,
    pub(crate) src: Option<String>,
    pub(crate) speaker: Option<String>,
    pub(crate) textclass: Option<String>,
    pub(crate) metadata: Option<String>,
    /// Is this token followed by a space? (words only)
    pub(crate) space: bool,
    pub(crate) tag: Option<String>,
    pub(crate) processor: Option<String>,
    /// Authoritative, false for non-authoritative annotations (`auth="no"`)
    pub(crate) auth: bool,
    pub(crate) subset: Option<String>,
    pub(crate) offset: Option<usize>,

    /// The literal value of raw text nodes and comments
    pub(crate) value: Option<String>,

    /// Kind specific attributes and, in permissive mode, unrecognised ones
    #[data_size(skip)]
    pub(crate) extra: Vec<(String, String)>,

    /// Ordered children. An entry whose parent is not this element is a reference.
    pub(crate) data: SmallVec<[ElementHandle; 4]>,
    pub(crate) parent: Option<ElementHandle>,
    pub(crate) handle: Option<ElementHandle>,

    /// The number of references (from span annotations) that point to this element
    pub(crate) refcount: usize,
}

/// Handle to an [`Element`] in a [`crate::Document`]. It consists of a slot index and a generation,
/// a handle to an element that has been destroyed will not resolve anymore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, DataSize)]
pub struct ElementHandle {
    index: u32,
    generation: u32,
}

#[sealed]
impl Handle for ElementHandle {
    fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }
    fn index(&self) -> usize {
        self.index as usize
    }
    fn generation(&self) -> u32 {
        self.generation
    }
}

#[sealed]
impl TypeInfo for Element {
    fn typeinfo() -> Type {
        Type::Element
    }
}

#[sealed]
impl Storable for Element {
    type HandleType = ElementHandle;

    fn handle(&self) -> Option<ElementHandle> {
        self.handle
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_handle(&mut self, handle: ElementHandle) {
        self.handle = Some(handle);
    }
}

impl Element {
    /// Creates a new, unbound element of the given kind without any attributes
    pub(crate) fn new(elementtype: ElementType) -> Self {
        Self {
            elementtype,
            id: None,
            set: None,
            class: None,
            annotator: None,
            annotatortype: AnnotatorType::Undefined,
            confidence: None,
            n: None,
            datetime: None,
            begintime: None,
            endtime: None,
            src: None,
            speaker: None,
            textclass: None,
            metadata: None,
            space: true,
            tag: None,
            processor: None,
            auth: true,
            subset: None,
            offset: None,
            value: None,
            extra: Vec::new(),
            data: SmallVec::new(),
            parent: None,
            handle: None,
            refcount: 0,
        }
    }

    /// Creates a raw text node
    pub(crate) fn new_text(value: impl Into<String>) -> Self {
        let mut element = Self::new(ElementType::XmlText);
        element.value = Some(value.into());
        element
    }

    /// Creates a raw XML comment
    pub(crate) fn new_comment(value: impl Into<String>) -> Self {
        let mut element = Self::new(ElementType::XmlComment);
        element.value = Some(value.into());
        element
    }

    pub fn elementtype(&self) -> ElementType {
        self.elementtype
    }

    /// Returns the static schema properties for this element's kind
    pub fn properties(&self) -> &'static Properties {
        self.elementtype.properties()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn annotator(&self) -> Option<&str> {
        self.annotator.as_deref()
    }

    pub fn annotatortype(&self) -> AnnotatorType {
        self.annotatortype
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn n(&self) -> Option<&str> {
        self.n.as_deref()
    }

    pub fn datetime(&self) -> Option<&NaiveDateTime> {
        self.datetime.as_ref()
    }

    pub fn begintime(&self) -> Option<&str> {
        self.begintime.as_deref()
    }

    pub fn endtime(&self) -> Option<&str> {
        self.endtime.as_deref()
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    pub fn textclass(&self) -> Option<&str> {
        self.textclass.as_deref()
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// Whether the token is followed by a space, always true for non-tokens
    pub fn space(&self) -> bool {
        self.space
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn processor(&self) -> Option<&str> {
        self.processor.as_deref()
    }

    pub fn auth(&self) -> bool {
        self.auth
    }

    pub fn subset(&self) -> Option<&str> {
        self.subset.as_deref()
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// The literal value of a raw text node or XML comment
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Kind specific and (in permissive mode) unrecognised attributes, in input order
    pub fn extra_attributes(&self) -> &[(String, String)] {
        &self.extra
    }

    /// Look up a kind specific or preserved attribute
    pub fn extra_attribute(&self, key: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn parent(&self) -> Option<ElementHandle> {
        self.parent
    }

    /// Raw access to all children, owned ones and references alike
    pub fn data(&self) -> &[ElementHandle] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn refcount(&self) -> usize {
        self.refcount
    }

    /// The text class this element is in, for text and phonetic content and markup
    pub(crate) fn content_class(&self) -> &str {
        self.class.as_deref().unwrap_or("current")
    }
}

/// Builds a new element, possibly with children, prior to adding it to a document with
/// [`crate::Document::add()`] or [`crate::Document::build()`]. Attributes are only validated
/// when the element is built.
///
/// Example:
///
/// ```
/// # use folia::*;
/// let word = ElementBuilder::new(ElementType::Word)
///     .with_id("s1.w1")
///     .with_text("hello")
///     .with_child(ElementBuilder::new(ElementType::PosAnnotation).with_class("INTJ"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBuilder {
    pub(crate) elementtype: ElementType,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<ElementBuilder>,
    pub(crate) references: Vec<ElementHandle>,
    pub(crate) text: Vec<(String, String)>,
    pub(crate) phon: Vec<(String, String)>,
    pub(crate) value: Option<String>,
}

impl ElementBuilder {
    pub fn new(elementtype: ElementType) -> Self {
        Self {
            elementtype,
            attributes: Vec::new(),
            children: Vec::new(),
            references: Vec::new(),
            text: Vec::new(),
            phon: Vec::new(),
            value: None,
        }
    }

    /// Builder for a raw text node, used inside text content and markup
    pub fn text_node(value: impl Into<String>) -> Self {
        let mut builder = Self::new(ElementType::XmlText);
        builder.value = Some(value.into());
        builder
    }

    pub fn elementtype(&self) -> ElementType {
        self.elementtype
    }

    /// Sets an arbitrary attribute by name, as it would appear in XML. Unknown names may be feature
    /// shorthands (e.g. `head` on a part-of-speech annotation).
    pub fn with_attrib(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attrib("id", id)
    }

    pub fn with_set(self, set: impl Into<String>) -> Self {
        self.with_attrib("set", set)
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attrib("class", class)
    }

    pub fn with_annotator(self, annotator: impl Into<String>) -> Self {
        self.with_attrib("annotator", annotator)
    }

    pub fn with_annotatortype(self, annotatortype: AnnotatorType) -> Self {
        self.with_attrib("annotatortype", annotatortype.as_str())
    }

    pub fn with_confidence(self, confidence: f64) -> Self {
        self.with_attrib("confidence", confidence.to_string())
    }

    pub fn with_n(self, n: impl Into<String>) -> Self {
        self.with_attrib("n", n)
    }

    pub fn with_datetime(self, datetime: &NaiveDateTime) -> Self {
        self.with_attrib("datetime", format_datetime(datetime))
    }

    pub fn with_processor(self, processor: impl Into<String>) -> Self {
        self.with_attrib("processor", processor)
    }

    /// Sets whether a token is followed by a space
    pub fn with_space(self, space: bool) -> Self {
        self.with_attrib("space", if space { "yes" } else { "no" })
    }

    /// Adds text content in the `current` class
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_text_in_class(text, "current")
    }

    /// Adds text content in the given class
    pub fn with_text_in_class(mut self, text: impl Into<String>, textclass: impl Into<String>) -> Self {
        self.text.push((text.into(), textclass.into()));
        self
    }

    /// Adds phonetic content in the `current` class
    pub fn with_phon(mut self, phon: impl Into<String>) -> Self {
        self.phon.push((phon.into(), "current".to_string()));
        self
    }

    /// Adds a child to be built along with this element
    pub fn with_child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Adds a reference to an existing element (for span annotations)
    pub fn with_reference(mut self, target: ElementHandle) -> Self {
        self.references.push(target);
        self
    }

    /// Adds multiple references to existing elements (for span annotations)
    pub fn with_references(mut self, targets: impl IntoIterator<Item = ElementHandle>) -> Self {
        self.references.extend(targets);
        self
    }

    /// Returns the value of an attribute that was set on the builder
    pub fn attrib(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(k, _)| k == key || (key == "id" && k == "xml:id"))
            .map(|(_, v)| v.as_str())
    }
}
