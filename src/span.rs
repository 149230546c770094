/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! Span annotations refer to tokens instead of containing them. They live in an annotation
//! layer (e.g. `<entities>`) under a structural element, and point at their tokens with
//! references (`<wref>` in XML).

use crate::document::Document;
use crate::element::{ElementBuilder, ElementHandle};
use crate::error::FoliaError;
use crate::schema::ElementFamily;
use crate::schema::ElementType;
use crate::store::*;
use crate::tree::Selector;

impl Document {
    /// Adds a span annotation under `structure`, in the layer for its kind. An existing layer with
    /// the same set is reused, otherwise a new layer is added. Returns the handle of the span.
    pub fn add_span(
        &mut self,
        structure: ElementHandle,
        builder: ElementBuilder,
    ) -> Result<ElementHandle, FoliaError> {
        let spantype = builder.elementtype();
        let layertype = spantype.properties().layer.ok_or_else(|| {
            FoliaError::StructureError(
                format!("<{}> is not a span annotation that lives in a layer", spantype),
                "Document::add_span",
            )
        })?;
        let set = builder.attrib("set").map(|set| {
            self.declarations
                .resolve_alias(spantype.annotationtype(), set)
                .unwrap_or(set)
                .to_string()
        });
        let existing = self.children_of_type(structure, layertype).find(|layer| {
            match (self.get(*layer).ok().and_then(|l| l.set()), set.as_deref()) {
                (Some(layerset), Some(set)) => layerset == set,
                (None, _) | (_, None) => true,
            }
        });
        let layer = match existing {
            Some(layer) => layer,
            None => {
                let mut layerbuilder = ElementBuilder::new(layertype);
                if let Some(set) = set.as_deref() {
                    layerbuilder = layerbuilder.with_set(set);
                }
                self.add(structure, layerbuilder)?
            }
        };
        self.add(layer, builder)
    }

    /// The tokens a span refers to, in order. References held by span roles are included.
    pub fn wrefs(&self, span: ElementHandle) -> Vec<ElementHandle> {
        let mut result = Vec::new();
        self.collect_wrefs(span, &mut result);
        result
    }

    fn collect_wrefs(&self, handle: ElementHandle, result: &mut Vec<ElementHandle>) {
        let element = match self.get(handle) {
            Ok(element) => element,
            Err(_) => return,
        };
        for child in element.data.iter() {
            match self.get(*child) {
                Ok(c) if c.parent != Some(handle) => {
                    if !result.contains(child) {
                        result.push(*child);
                    }
                }
                Ok(c) if c.elementtype.family() == ElementFamily::SpanRole => {
                    self.collect_wrefs(*child, result);
                }
                _ => {}
            }
        }
    }

    /// Finds all spans of the given kind that refer to a token
    pub fn spans_for(&self, token: ElementHandle, spantype: ElementType) -> Vec<ElementHandle> {
        let root = match self.root {
            Some(root) => root,
            None => return Vec::new(),
        };
        match self.get(token) {
            Ok(element) if element.refcount > 0 => {}
            _ => return Vec::new(),
        }
        self.select(root, Selector::new(spantype))
            .filter(|span| self.wrefs(*span).contains(&token))
            .collect()
    }
}
