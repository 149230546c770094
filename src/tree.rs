/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module implements the structural operations on the element tree: appending, inserting,
//! removing, replacing and destroying elements, building elements from an [`ElementBuilder`],
//! selection and ID generation. Every structural mutation is validated against the schema first,
//! nothing is changed if validation fails.

use crate::document::Document;
use crate::element::{Element, ElementBuilder, ElementHandle};
use crate::error::FoliaError;
use crate::schema::{accepts, ElementFamily, ElementType};
use crate::store::*;
use crate::types::*;

/// Element kinds whose content is not part of the normal view of the document
pub const DEFAULT_EXCLUDE: &[ElementType] = &[
    ElementType::Original,
    ElementType::Suggestion,
    ElementType::Alternative,
    ElementType::AlternativeLayers,
    ElementType::ForeignData,
];

/// Selects elements in a subtree, see [`Document::select()`]
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub(crate) elementtype: Option<ElementType>,
    pub(crate) family: Option<ElementFamily>,
    pub(crate) set: Option<String>,
    pub(crate) exclude: Vec<ElementType>,
    pub(crate) recursive: bool,
}

impl Selector {
    /// Selects elements of a particular kind. By default the selection is recursive and does not
    /// descend into originals, suggestions, alternatives and foreign data.
    pub fn new(elementtype: ElementType) -> Self {
        Self {
            elementtype: Some(elementtype),
            family: None,
            set: None,
            exclude: DEFAULT_EXCLUDE.to_vec(),
            recursive: true,
        }
    }

    /// Selects elements of any kind in a family
    pub fn family(family: ElementFamily) -> Self {
        Self {
            elementtype: None,
            family: Some(family),
            ..Self::new(ElementType::Text)
        }
    }

    /// Selects all elements (raw text nodes and comments excluded)
    pub fn all() -> Self {
        Self {
            elementtype: None,
            family: None,
            ..Self::new(ElementType::Text)
        }
    }

    /// Only select elements in this set
    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    /// Sets the element kinds that are not descended into
    pub fn with_exclude(mut self, exclude: impl IntoIterator<Item = ElementType>) -> Self {
        self.exclude = exclude.into_iter().collect();
        self
    }

    /// Adds an element kind that is not descended into
    pub fn also_exclude(mut self, elementtype: ElementType) -> Self {
        if !self.exclude.contains(&elementtype) {
            self.exclude.push(elementtype);
        }
        self
    }

    pub fn with_recursion(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn matches(&self, element: &Element) -> bool {
        if element.elementtype.is_raw() {
            return false;
        }
        if let Some(elementtype) = self.elementtype {
            if element.elementtype != elementtype {
                return false;
            }
        }
        if let Some(family) = self.family {
            if element.elementtype.family() != family {
                return false;
            }
        }
        if let Some(set) = self.set.as_deref() {
            if element.set.as_deref() != Some(set) {
                return false;
            }
        }
        true
    }
}

/// Iterator over selected elements in document order, references are skipped
pub struct SelectIter<'a> {
    doc: &'a Document,
    stack: Vec<ElementHandle>,
    selector: Selector,
}

impl<'a> Iterator for SelectIter<'a> {
    type Item = ElementHandle;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.stack.pop() {
            if let Ok(element) = self.doc.get(handle) {
                if self.selector.recursive && !self.selector.exclude.contains(&element.elementtype)
                {
                    push_owned_children(self.doc, handle, element, &mut self.stack);
                }
                if self.selector.matches(element) {
                    return Some(handle);
                }
            }
        }
        None
    }
}

fn push_owned_children(
    doc: &Document,
    handle: ElementHandle,
    element: &Element,
    stack: &mut Vec<ElementHandle>,
) {
    for child in element.data.iter().rev() {
        if let Ok(c) = doc.get(*child) {
            if c.parent == Some(handle) {
                stack.push(*child);
            }
        }
    }
}

impl Document {
    /// Builds an element (and its children) from a builder, without attaching it to the tree.
    /// The element is fully validated. On failure, nothing remains in the document.
    pub fn build(&mut self, builder: ElementBuilder) -> Result<ElementHandle, FoliaError> {
        let mut element = Element::new(builder.elementtype);
        if builder.elementtype.is_raw() {
            element.value = builder.value.clone();
        }
        let handle = self.insert(element)?;
        match self.build_into(handle, builder) {
            Ok(()) => Ok(handle),
            Err(e) => {
                let _ = self.destroy(handle);
                Err(e)
            }
        }
    }

    fn build_into(&mut self, handle: ElementHandle, builder: ElementBuilder) -> Result<(), FoliaError> {
        self.set_attributes(handle, builder.attributes)?;
        for (text, textclass) in builder.text {
            self.set_text(handle, &text, &textclass)?;
        }
        for (phon, phonclass) in builder.phon {
            self.set_phon(handle, &phon, &phonclass)?;
        }
        for child in builder.children {
            let child = self.build(child)?;
            if let Err(e) = self.append(handle, child) {
                let _ = self.destroy(child);
                return Err(e);
            }
        }
        for reference in builder.references {
            self.append(handle, reference)?;
        }
        Ok(())
    }

    /// Builds an element from a builder and appends it to `parent`. This is the main way to add
    /// new content to a document. Returns the handle of the new element.
    pub fn add(
        &mut self,
        parent: ElementHandle,
        builder: ElementBuilder,
    ) -> Result<ElementHandle, FoliaError> {
        let child = self.build(builder)?;
        if let Err(e) = self.append(parent, child) {
            let _ = self.destroy(child);
            return Err(e);
        }
        Ok(child)
    }

    /// Adds the body element (`text` or `speech`) to a document that does not have one yet
    pub fn add_body(&mut self, builder: ElementBuilder) -> Result<ElementHandle, FoliaError> {
        if !matches!(builder.elementtype, ElementType::Text | ElementType::Speech) {
            return Err(FoliaError::StructureError(
                format!("the body must be <text> or <speech>, not <{}>", builder.elementtype),
                "Document::add_body",
            ));
        }
        if self.root.is_some() {
            return Err(FoliaError::StructureError(
                "document already has a body".to_string(),
                "Document::add_body",
            ));
        }
        let handle = self.build(builder)?;
        self.root = Some(handle);
        Ok(handle)
    }

    /// Appends `child` to `parent`. The child must be detached, unless it is a token that is
    /// being referenced from a span annotation. Returns the handle of the child.
    pub fn append(
        &mut self,
        parent: ElementHandle,
        child: ElementHandle,
    ) -> Result<ElementHandle, FoliaError> {
        let index = self.get(parent)?.data.len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` into `parent` at the given position among its children
    pub fn insert_child(
        &mut self,
        parent: ElementHandle,
        index: usize,
        child: ElementHandle,
    ) -> Result<ElementHandle, FoliaError> {
        if index > self.get(parent)?.data.len() {
            return Err(FoliaError::StructureError(
                format!("index {} out of bounds", index),
                "insert_child",
            ));
        }
        let is_reference = self.check_append(parent, child, None)?;
        debug(&self.config, || {
            format!(
                "insert_child: parent={:?} index={} child={:?} reference={}",
                parent, index, child, is_reference
            )
        });
        self.get_mut(parent)?.data.insert(index, child);
        if is_reference {
            self.get_mut(child)?.refcount += 1;
        } else {
            self.get_mut(child)?.parent = Some(parent);
            self.pending_deletion.remove(&child);
            self.post_append(child)?;
        }
        Ok(child)
    }

    /// Validates whether `child` may be appended to `parent`, as if `replacing` were not there.
    /// Returns whether the child will be added as a reference.
    pub(crate) fn check_append(
        &self,
        parent: ElementHandle,
        child: ElementHandle,
        replacing: Option<ElementHandle>,
    ) -> Result<bool, FoliaError> {
        let p = self.get(parent)?;
        let c = self.get(child)?;
        if parent == child {
            return Err(FoliaError::StructureError(
                "can not append an element to itself".to_string(),
                "append",
            ));
        }
        if !accepts(p.elementtype, c.elementtype) {
            return Err(FoliaError::StructureError(
                format!("<{}> does not accept <{}>", p.elementtype, c.elementtype),
                "append",
            ));
        }
        if c.parent.is_some() {
            if p.elementtype.is_cross_referencing() && c.elementtype.is_wrefable() {
                return Ok(true);
            }
            return Err(FoliaError::OwnershipError(
                format!(
                    "<{}> {} already has a parent",
                    c.elementtype,
                    c.id().unwrap_or("(no id)")
                ),
                "append",
            ));
        }
        if Some(child) == self.root {
            return Err(FoliaError::OwnershipError(
                "the body can not be appended anywhere".to_string(),
                "append",
            ));
        }
        if p.elementtype.is_cross_referencing() && c.elementtype.is_wrefable() {
            return Err(FoliaError::StructureError(
                format!(
                    "<{}> can only refer to existing tokens, it can not own <{}>",
                    p.elementtype, c.elementtype
                ),
                "append",
            ));
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(FoliaError::StructureError(
                "can not append an element to its own descendant".to_string(),
                "append",
            ));
        }

        let properties = c.properties();
        let siblings = move || {
            p.data.iter().filter_map(move |h| {
                if Some(*h) == replacing {
                    return None;
                }
                self.get(*h)
                    .ok()
                    .filter(|s| s.parent == Some(parent) && s.elementtype == c.elementtype)
            })
        };
        if let Some(max) = properties.occurrences {
            if siblings().count() >= max {
                return Err(FoliaError::LimitExceededError(
                    format!(
                        "<{}> accepts at most {} <{}>",
                        p.elementtype, max, c.elementtype
                    ),
                    "append",
                ));
            }
        }
        if let Some(max) = properties.occurrences_per_set {
            if siblings().filter(|s| s.set == c.set).count() >= max {
                return Err(FoliaError::LimitExceededError(
                    format!(
                        "<{}> accepts at most {} <{}> per set (set {:?})",
                        p.elementtype, max, c.elementtype, c.set
                    ),
                    "append",
                ));
            }
        }
        if c.elementtype.is_content() {
            let class = c.content_class();
            if siblings().any(|s| s.content_class() == class) {
                return Err(FoliaError::LimitExceededError(
                    format!(
                        "<{}> already has <{}> content in class '{}'",
                        p.elementtype, c.elementtype, class
                    ),
                    "append",
                ));
            }
        }
        Ok(false)
    }

    /// Called after an element was attached to a parent
    fn post_append(&mut self, child: ElementHandle) -> Result<(), FoliaError> {
        let element = self.get_mut(child)?;
        if element.elementtype.is_content() && element.class.is_none() {
            element.class = Some("current".to_string());
        }
        Ok(())
    }

    /// Removes `child` from `parent`. If `destroy` is false, the child is kept in the document
    /// (pending deletion) so it may be re-attached elsewhere; it is released when the document is dropped.
    /// Removing a reference only removes the reference.
    pub fn remove(
        &mut self,
        parent: ElementHandle,
        child: ElementHandle,
        destroy: bool,
    ) -> Result<(), FoliaError> {
        let position = self
            .get(parent)?
            .data
            .iter()
            .position(|h| *h == child)
            .ok_or_else(|| {
                FoliaError::StructureError(
                    format!("{:?} is not a child of {:?}", child, parent),
                    "remove",
                )
            })?;
        let owned = self.get(child)?.parent == Some(parent);
        self.get_mut(parent)?.data.remove(position);
        if owned {
            self.get_mut(child)?.parent = None;
            if destroy {
                self.destroy_subtree(child)?;
            } else {
                self.pending_deletion.insert(child);
            }
        } else {
            let element = self.get_mut(child)?;
            element.refcount = element.refcount.saturating_sub(1);
        }
        Ok(())
    }

    /// Detaches an element from its parent, keeping it in the document (pending deletion)
    pub fn detach(&mut self, child: ElementHandle) -> Result<(), FoliaError> {
        match self.get(child)?.parent {
            Some(parent) => self.remove(parent, child, false),
            None => Ok(()),
        }
    }

    /// Replaces `old` by `new` at the same position under `parent`. The new element must be
    /// detached. The old element is kept pending deletion. Returns the old element.
    pub fn replace(
        &mut self,
        parent: ElementHandle,
        old: ElementHandle,
        new: ElementHandle,
    ) -> Result<ElementHandle, FoliaError> {
        let position = self
            .get(parent)?
            .data
            .iter()
            .position(|h| *h == old)
            .ok_or_else(|| {
                FoliaError::StructureError(
                    format!("{:?} is not a child of {:?}", old, parent),
                    "replace",
                )
            })?;
        if self.get(old)?.parent != Some(parent) {
            return Err(FoliaError::StructureError(
                "can not replace a reference".to_string(),
                "replace",
            ));
        }
        if self.check_append(parent, new, Some(old))? {
            return Err(FoliaError::OwnershipError(
                "replacement must be detached".to_string(),
                "replace",
            ));
        }
        self.get_mut(parent)?.data[position] = new;
        self.get_mut(new)?.parent = Some(parent);
        self.pending_deletion.remove(&new);
        self.post_append(new)?;
        self.get_mut(old)?.parent = None;
        self.pending_deletion.insert(old);
        Ok(old)
    }

    /// Destroys an element and all elements it owns, detaching it from its parent first.
    /// References held by the element are released.
    pub fn destroy(&mut self, handle: ElementHandle) -> Result<(), FoliaError> {
        if let Some(parent) = self.get(handle)?.parent {
            if let Ok(p) = self.get_mut(parent) {
                p.data.retain(|h| *h != handle);
            }
        }
        self.destroy_subtree(handle)
    }

    fn destroy_subtree(&mut self, handle: ElementHandle) -> Result<(), FoliaError> {
        let element: Element = StoreFor::<Element>::remove(self, handle)?;
        self.pending_deletion.remove(&handle);
        if self.root == Some(handle) {
            self.root = None;
        }
        for child in element.data {
            let owned = match self.get_mut(child) {
                Ok(c) if c.parent == Some(handle) => true,
                Ok(c) => {
                    c.refcount = c.refcount.saturating_sub(1);
                    false
                }
                Err(_) => false,
            };
            if owned {
                self.destroy_subtree(child)?;
            }
        }
        Ok(())
    }

    /// Selects elements in the subtree under `handle` (the element itself excluded), in document order
    pub fn select(&self, handle: ElementHandle, selector: Selector) -> SelectIter<'_> {
        let mut stack = Vec::new();
        if let Ok(element) = self.get(handle) {
            push_owned_children(self, handle, element, &mut stack);
        }
        SelectIter {
            doc: self,
            stack,
            selector,
        }
    }

    /// The parent of an element
    pub fn parent_of(&self, handle: ElementHandle) -> Option<ElementHandle> {
        self.get(handle).ok().and_then(|e| e.parent)
    }

    /// The owned children of an element (references excluded), in order
    pub fn children(&self, handle: ElementHandle) -> impl Iterator<Item = ElementHandle> + '_ {
        self.get(handle)
            .map(|e| e.data.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(move |h| self.parent_of(*h) == Some(handle))
    }

    /// The elements referred to by an element (span annotations), in order
    pub fn references(&self, handle: ElementHandle) -> impl Iterator<Item = ElementHandle> + '_ {
        self.get(handle)
            .map(|e| e.data.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(move |h| match self.get(*h) {
                Ok(c) => c.parent != Some(handle),
                Err(_) => false,
            })
    }

    /// The owned children of an element of a particular kind
    pub fn children_of_type(
        &self,
        handle: ElementHandle,
        elementtype: ElementType,
    ) -> impl Iterator<Item = ElementHandle> + '_ {
        self.children(handle)
            .filter(move |h| self.get(*h).ok().map(|e| e.elementtype) == Some(elementtype))
    }

    /// Position of a child in its parent's children (references included)
    pub fn index_of(&self, parent: ElementHandle, child: ElementHandle) -> Option<usize> {
        self.get(parent)
            .ok()
            .and_then(|p| p.data.iter().position(|h| *h == child))
    }

    /// Iterates over all ancestors, nearest first
    pub fn ancestors(&self, handle: ElementHandle) -> impl Iterator<Item = ElementHandle> + '_ {
        let mut current = self.parent_of(handle);
        std::iter::from_fn(move || {
            let result = current;
            if let Some(handle) = current {
                current = self.parent_of(handle);
            }
            result
        })
    }

    /// The nearest ancestor of a particular kind
    pub fn ancestor_of_type(
        &self,
        handle: ElementHandle,
        elementtype: ElementType,
    ) -> Option<ElementHandle> {
        self.ancestors(handle)
            .find(|h| self.get(*h).ok().map(|e| e.elementtype) == Some(elementtype))
    }

    /// The next owned sibling
    pub fn next_sibling(&self, handle: ElementHandle) -> Option<ElementHandle> {
        let parent = self.parent_of(handle)?;
        let mut iter = self.children(parent).skip_while(|h| *h != handle);
        iter.next();
        iter.next()
    }

    /// The previous owned sibling
    pub fn previous_sibling(&self, handle: ElementHandle) -> Option<ElementHandle> {
        let parent = self.parent_of(handle)?;
        let mut previous = None;
        for h in self.children(parent) {
            if h == handle {
                return previous;
            }
            previous = Some(h);
        }
        None
    }

    /// Generates a new unique ID for a child of `handle` with the given tag: the ID of the nearest
    /// identified element (the element itself or an ancestor, else the document), followed by the
    /// tag and a sequence number. The sequence number is seeded from IDs already present.
    pub fn generate_id(&mut self, handle: ElementHandle, tag: &str) -> Result<String, FoliaError> {
        let mut base: Option<(ElementHandle, String)> = None;
        let mut current = Some(handle);
        while let Some(h) = current {
            let element = self.get(h)?;
            if let Some(id) = element.id() {
                base = Some((h, id.to_string()));
                break;
            }
            current = element.parent;
        }
        let (anchor, prefix) = match base {
            Some(base) => base,
            None => match self.root {
                Some(root) => (root, self.id.clone()),
                None => (handle, self.id.clone()),
            },
        };
        let key = (anchor, tag.to_string());
        let mut counter = match self.id_counters.get(&key) {
            Some(counter) => *counter,
            None => self.seed_counter(anchor, &prefix, tag),
        };
        let mut id;
        loop {
            counter += 1;
            id = format!("{}.{}.{}", prefix, tag, counter);
            if !self.idmap.contains(&id) {
                break;
            }
        }
        self.id_counters.insert(key, counter);
        Ok(id)
    }

    /// Finds the highest sequence number in use for generated IDs under an anchor
    fn seed_counter(&self, anchor: ElementHandle, prefix: &str, tag: &str) -> usize {
        let pattern = format!("{}.{}.", prefix, tag);
        self.select(anchor, Selector::all().with_exclude(Vec::new()))
            .filter_map(|h| self.get(h).ok().and_then(|e| e.id()))
            .filter_map(|id| id.strip_prefix(pattern.as_str()))
            .filter_map(|n| n.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
    }
}
