/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

use crate::api::ResultItem;
use crate::correction::CorrectionState;
use crate::document::Document;
use crate::element::{Element, ElementHandle};
use crate::error::FoliaError;
use crate::schema::ElementType;
use crate::store::*;
use crate::tree::{Selector, DEFAULT_EXCLUDE};

/// Selector for annotations of an element: does not descend into structure, alternatives,
/// morphology or phonology
fn annotation_selector(elementtype: ElementType, set: Option<&str>) -> Selector {
    let mut selector = Selector::new(elementtype).with_exclude(
        DEFAULT_EXCLUDE
            .iter()
            .copied()
            .chain([ElementType::MorphologyLayer, ElementType::PhonologyLayer])
            .chain(ElementType::ALL.iter().copied().filter(|t| t.is_structure())),
    );
    if let Some(set) = set {
        selector = selector.with_set(set);
    }
    selector
}

impl Document {
    /// Returns the element as a [`ResultItem`] (high-level API)
    pub fn element(&self, handle: ElementHandle) -> Result<ResultItem<'_, Element>, FoliaError> {
        let element = self.get(handle)?;
        Ok(ResultItem::new(element, handle, self))
    }

    /// Returns the element with the given ID as a [`ResultItem`] (high-level API)
    pub fn element_by_id(&self, id: &str) -> Result<ResultItem<'_, Element>, FoliaError> {
        let handle = self.resolve_id(id)?;
        self.element(handle)
    }

    /// The body of the document (high-level API)
    pub fn body(&self) -> Option<ResultItem<'_, Element>> {
        self.root.and_then(|root| self.element(root).ok())
    }

    /// All annotations of the given kind (and optionally set) on an element. Annotations inside
    /// nested structure, alternatives, originals, suggestions, morphology and phonology are not
    /// considered. A set alias may be used.
    pub fn annotations(
        &self,
        handle: ElementHandle,
        elementtype: ElementType,
        set: Option<&str>,
    ) -> Vec<ElementHandle> {
        let set = set.map(|set| {
            self.declarations
                .resolve_alias(elementtype.annotationtype(), set)
                .unwrap_or(set)
        });
        self.select(handle, annotation_selector(elementtype, set))
            .collect()
    }

    /// The annotation of the given kind (and optionally set) on an element. If there are multiple,
    /// the first is returned. Fails with [`FoliaError::NoSuchAnnotationError`] if there is none.
    pub fn annotation(
        &self,
        handle: ElementHandle,
        elementtype: ElementType,
        set: Option<&str>,
    ) -> Result<ElementHandle, FoliaError> {
        self.annotations(handle, elementtype, set)
            .into_iter()
            .next()
            .ok_or_else(|| {
                FoliaError::NoSuchAnnotationError(
                    format!("no <{}> annotation found", elementtype),
                    "Document::annotation",
                )
            })
    }
}

impl<'doc> ResultItem<'doc, Element> {
    fn wrap(&self, handle: ElementHandle) -> Option<ResultItem<'doc, Element>> {
        self.document().element(handle).ok()
    }

    fn wrap_all(
        &self,
        handles: impl IntoIterator<Item = ElementHandle> + 'doc,
    ) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        handles.into_iter().filter_map(move |h| doc.element(h).ok())
    }

    pub fn elementtype(&self) -> ElementType {
        self.as_ref().elementtype()
    }

    pub fn set(&self) -> Option<&'doc str> {
        self.as_ref().set()
    }

    pub fn class(&self) -> Option<&'doc str> {
        self.as_ref().class()
    }

    /// The parent element, `None` for the body and for detached elements
    pub fn parent(&self) -> Option<ResultItem<'doc, Element>> {
        self.as_ref().parent().and_then(|parent| self.wrap(parent))
    }

    /// The owned children, in order
    pub fn children(&self) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        self.wrap_all(doc.children(self.handle()))
    }

    /// Elements this element refers to but does not own
    pub fn references(&self) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        self.wrap_all(doc.references(self.handle()))
    }

    /// Selects elements in the subtree, see [`Document::select()`]
    pub fn select(&self, selector: Selector) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        self.wrap_all(doc.select(self.handle(), selector))
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        self.wrap_all(doc.ancestors(self.handle()))
    }

    /// The nearest ancestor of the given kind
    pub fn ancestor(&self, elementtype: ElementType) -> Option<ResultItem<'doc, Element>> {
        self.document()
            .ancestor_of_type(self.handle(), elementtype)
            .and_then(|h| self.wrap(h))
    }

    pub fn next_sibling(&self) -> Option<ResultItem<'doc, Element>> {
        self.document()
            .next_sibling(self.handle())
            .and_then(|h| self.wrap(h))
    }

    pub fn previous_sibling(&self) -> Option<ResultItem<'doc, Element>> {
        self.document()
            .previous_sibling(self.handle())
            .and_then(|h| self.wrap(h))
    }

    /// The text in the given class, see [`Document::text()`]
    pub fn text(&self, textclass: &str) -> Result<String, FoliaError> {
        self.document().text(self.handle(), textclass, false)
    }

    /// The text in the `current` class
    pub fn text_current(&self) -> Result<String, FoliaError> {
        self.text("current")
    }

    /// The phonetic content in the given class, see [`Document::phon()`]
    pub fn phon(&self, phonclass: &str) -> Result<String, FoliaError> {
        self.document().phon(self.handle(), phonclass)
    }

    /// The annotation of the given kind, see [`Document::annotation()`]
    pub fn annotation(
        &self,
        elementtype: ElementType,
        set: Option<&str>,
    ) -> Result<ResultItem<'doc, Element>, FoliaError> {
        let handle = self
            .document()
            .annotation(self.handle(), elementtype, set)?;
        self.document().element(handle)
    }

    /// All annotations of the given kind, see [`Document::annotations()`]
    pub fn annotations(
        &self,
        elementtype: ElementType,
        set: Option<&str>,
    ) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        self.wrap_all(doc.annotations(self.handle(), elementtype, set))
    }

    /// The state of a correction, [`CorrectionState::NoCorrection`] for other elements
    pub fn correction_state(&self) -> CorrectionState {
        self.document()
            .correction_state(self.handle())
            .unwrap_or(CorrectionState::NoCorrection)
    }

    /// The tokens a span annotation refers to
    pub fn wrefs(&self) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        self.wrap_all(doc.wrefs(self.handle()))
    }

    /// The spans of the given kind that refer to this token
    pub fn spans(&self, spantype: ElementType) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        self.wrap_all(doc.spans_for(self.handle(), spantype))
    }

    /// Serializes this element (and its subtree) to XML
    pub fn to_xml(&self) -> Result<String, FoliaError> {
        self.document().element_to_xml(self.handle())
    }
}
