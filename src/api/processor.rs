/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

use crate::api::ResultItem;
use crate::document::Document;
use crate::element::Element;
use crate::error::FoliaError;
use crate::provenance::{Processor, ProcessorHandle};
use crate::store::*;
use crate::types::AnnotatorType;

impl Document {
    /// Returns a processor as a [`ResultItem`] (high-level API)
    pub fn processor(
        &self,
        handle: ProcessorHandle,
    ) -> Result<ResultItem<'_, Processor>, FoliaError> {
        let processor = self.provenance.get(handle)?;
        Ok(ResultItem::new(processor, handle, self))
    }

    /// Returns the processor with the given ID as a [`ResultItem`] (high-level API)
    pub fn processor_by_id(&self, id: &str) -> Result<ResultItem<'_, Processor>, FoliaError> {
        let handle = self.provenance.resolve_id(id)?;
        self.processor(handle)
    }

    /// Iterates over all processors in depth-first order (high-level API)
    pub fn processors(&self) -> impl Iterator<Item = ResultItem<'_, Processor>> {
        self.provenance
            .iter_depthfirst()
            .filter_map(move |processor| {
                processor
                    .handle()
                    .map(|handle| ResultItem::new(processor, handle, self))
            })
    }
}

impl<'doc> ResultItem<'doc, Processor> {
    pub fn name(&self) -> &'doc str {
        self.as_ref().name()
    }

    pub fn annotatortype(&self) -> AnnotatorType {
        self.as_ref().annotatortype()
    }

    /// The processor this is a sub-processor of
    pub fn parent(&self) -> Option<ResultItem<'doc, Processor>> {
        self.as_ref()
            .parent()
            .and_then(|parent| self.document().processor(parent).ok())
    }

    /// Sub-processors, in order
    pub fn children(&self) -> impl Iterator<Item = ResultItem<'doc, Processor>> + 'doc {
        let doc = self.document();
        self.as_ref()
            .children()
            .iter()
            .filter_map(move |child| doc.processor(*child).ok())
    }

    /// All elements in the document that were produced by this processor
    pub fn elements(&self) -> impl Iterator<Item = ResultItem<'doc, Element>> + 'doc {
        let doc = self.document();
        let id = self.as_ref().id();
        doc.elements
            .iter_with_handles()
            .filter(move |(_, element)| element.processor() == Some(id))
            .map(move |(handle, element)| ResultItem::new(element, handle, doc))
    }
}

impl<'doc> ResultItem<'doc, Element> {
    /// The processor that produced this element, if any
    pub fn processor(&self) -> Option<ResultItem<'doc, Processor>> {
        self.as_ref()
            .processor()
            .and_then(|id| self.document().processor_by_id(id).ok())
    }
}
