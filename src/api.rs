/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

mod element;
mod processor;

pub use element::*;
pub use processor::*;

use std::fmt;

use crate::document::Document;
use crate::store::*;

// This root module contains the structures shared by the higher-level API.
// See api/* for the high-level API implementations for each type of item.

/// A fat pointer to an item in a [`Document`]: the item itself together with a reference to the
/// document it lives in, which gives access to everything related to it. This is what the
/// high-level API returns.
pub struct ResultItem<'doc, T>
where
    T: Storable,
{
    item: &'doc T,
    handle: T::HandleType,
    doc: &'doc Document,
}

impl<'doc, T> Clone for ResultItem<'doc, T>
where
    T: Storable,
{
    fn clone(&self) -> Self {
        Self {
            item: self.item,
            handle: self.handle,
            doc: self.doc,
        }
    }
}

impl<'doc, T> fmt::Debug for ResultItem<'doc, T>
where
    T: Storable,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultItem")
            .field("handle", &self.handle)
            .field("id", &self.item.id())
            .finish()
    }
}

impl<'doc, T> PartialEq for ResultItem<'doc, T>
where
    T: Storable,
{
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && std::ptr::eq(self.doc, other.doc)
    }
}

impl<'doc, T> ResultItem<'doc, T>
where
    T: Storable,
{
    pub(crate) fn new(item: &'doc T, handle: T::HandleType, doc: &'doc Document) -> Self {
        Self { item, handle, doc }
    }

    /// The handle of the underlying item
    pub fn handle(&self) -> T::HandleType {
        self.handle
    }

    /// The public ID of the underlying item, if any
    pub fn id(&self) -> Option<&'doc str> {
        self.item.id()
    }

    /// The underlying item (low-level API)
    pub fn as_ref(&self) -> &'doc T {
        self.item
    }

    /// The document this item belongs to
    pub fn document(&self) -> &'doc Document {
        self.doc
    }
}
