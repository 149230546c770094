/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module implements the arena in which elements and processors are stored. Items are
//! addressed by lightweight generational handles; ownership relations between items are
//! expressed by handles only.

use sealed::sealed;
use std::collections::HashMap;
use std::hash::Hash;
use std::slice::Iter;

use crate::error::FoliaError;
use crate::types::*;

/// The handle trait is implemented on various handle types. They have in common that they refer to a
/// [`Storable`] item in a [`Store`] by index and generation. Types implementing this are lightweight and do not
/// borrow anything, they can be passed and copied freely. A handle to an item that has been removed
/// from the store is stale: the slot may be reused but the generation will differ.
/// This is a sealed trait, not implementable outside this crate.
#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait Handle:
    Clone + Copy + core::fmt::Debug + PartialEq + Eq + PartialOrd + Ord + Hash
{
    /// Create a new handle. You shouldn't need to use this as handles will always be generated for you by higher-level functions.
    fn new(index: usize, generation: u32) -> Self;
    /// Returns the slot index for this handle
    fn index(&self) -> usize;
    /// Returns the generation of the slot this handle was created for
    fn generation(&self) -> u32;
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: Option<T>,
    generation: u32,
}

/// Generational arena. Removed items free their slot, which is reused by the next insertion
/// under a new generation, so the store does not grow when items are continuously added and
/// removed (as happens when streaming).
#[derive(Debug, Clone)]
pub struct Store<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots, live or free
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Returns the handle that the next inserted item will get
    pub(crate) fn next_handle<H: Handle>(&self) -> H {
        if let Some(index) = self.free.last() {
            H::new(*index, self.slots[*index].generation)
        } else {
            H::new(self.slots.len(), 0)
        }
    }

    pub(crate) fn push<H: Handle>(&mut self, item: T) -> H {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.item = Some(item);
            H::new(index, slot.generation)
        } else {
            self.slots.push(Slot {
                item: Some(item),
                generation: 0,
            });
            H::new(self.slots.len() - 1, 0)
        }
    }

    pub(crate) fn get<H: Handle>(&self, handle: H) -> Option<&T> {
        match self.slots.get(handle.index()) {
            Some(slot) if slot.generation == handle.generation() => slot.item.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn get_mut<H: Handle>(&mut self, handle: H) -> Option<&mut T> {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if slot.generation == handle.generation() => slot.item.as_mut(),
            _ => None,
        }
    }

    /// Takes the item out of the store, freeing its slot for reuse
    pub(crate) fn take<H: Handle>(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() || slot.item.is_none() {
            return None;
        }
        let item = slot.item.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.len -= 1;
        item
    }

    /// Iterate over all live items along with their handles
    pub(crate) fn iter_with_handles<H: Handle>(&self) -> impl Iterator<Item = (H, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.item
                .as_ref()
                .map(|item| (H::new(index, slot.generation), item))
        })
    }
}

/// A map mapping public IDs to handles, implemented as a HashMap.
/// Used to resolve public IDs to internal ones.
#[derive(Debug, Clone)]
pub struct IdMap<HandleType> {
    /// The actual map
    data: HashMap<String, HandleType>,
}

impl<HandleType> Default for IdMap<HandleType>
where
    HandleType: Handle,
{
    fn default() -> Self {
        Self {
            data: HashMap::new(),
        }
    }
}

impl<HandleType> IdMap<HandleType>
where
    HandleType: Handle,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<HandleType> {
        self.data.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.data.contains_key(id)
    }

    pub(crate) fn insert(&mut self, id: String, handle: HandleType) -> Option<HandleType> {
        self.data.insert(id, handle)
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<HandleType> {
        self.data.remove(id)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait Storable: TypeInfo
where
    Self: Sized,
{
    type HandleType: Handle;

    /// Retrieve the handle. This is `None` only in the initial stage when the item is not bound to a store yet.
    fn handle(&self) -> Option<Self::HandleType>;

    /// Like [`Self::handle()`] but returns a [`FoliaError::HandleError`] if there is no handle.
    fn handle_or_err(&self) -> Result<Self::HandleType, FoliaError> {
        self.handle()
            .ok_or(FoliaError::HandleError("item is not bound to a store"))
    }

    /// Get the public ID
    fn id(&self) -> Option<&str> {
        None
    }

    /// Set the handle. Called once when the item is bound.
    fn set_handle(&mut self, handle: Self::HandleType);
}

/// This trait is implemented on types that provide storage for a certain other generic type (T)
/// It is a sealed trait, not implementable outside this crate.
#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait StoreFor<T: Storable> {
    /// Get a reference to the entire store for the associated type
    fn store(&self) -> &Store<T>;
    /// Get a mutable reference to the entire store for the associated type
    fn store_mut(&mut self) -> &mut Store<T>;
    /// Get a reference to the id map for the associated type, mapping public ids to handles
    fn idmap(&self) -> Option<&IdMap<T::HandleType>> {
        None
    }
    /// Get a mutable reference to the id map for the associated type
    fn idmap_mut(&mut self) -> Option<&mut IdMap<T::HandleType>> {
        None
    }

    fn store_typeinfo() -> &'static str;

    /// Adds an item to the store. Returns a handle to it upon success.
    fn insert(&mut self, mut item: T) -> Result<T::HandleType, FoliaError> {
        if item.handle().is_some() {
            return Err(FoliaError::HandleError("item is already bound"));
        }
        let handle: T::HandleType = self.store().next_handle();

        if let Some(id) = item.id() {
            //check if public ID does not already exist
            if self.has_id(id) {
                return Err(FoliaError::DuplicateIdError(
                    id.to_string(),
                    Self::store_typeinfo(),
                ));
            }
        }

        item.set_handle(handle);
        self.preinsert(&mut item)?;

        if let Some(id) = item.id().map(|s| s.to_string()) {
            if let Some(idmap) = self.idmap_mut() {
                idmap.insert(id, handle);
            }
        }

        let pushed: T::HandleType = self.store_mut().push(item);
        debug_assert_eq!(handle, pushed, "handle must match allocated slot");

        self.inserted(handle)?;
        Ok(handle)
    }

    /// Called prior to inserting an item into to the store
    /// If it returns an error, the insert will be cancelled.
    #[allow(unused_variables)]
    fn preinsert(&self, item: &mut T) -> Result<(), FoliaError> {
        //default implementation does nothing
        Ok(())
    }

    /// Called after an item was inserted to the store
    #[allow(unused_variables)]
    fn inserted(&mut self, handle: T::HandleType) -> Result<(), FoliaError> {
        //default implementation does nothing
        Ok(())
    }

    /// Returns true if the store has a live item for this handle
    fn has(&self, handle: T::HandleType) -> bool {
        self.store().get(handle).is_some()
    }

    /// Returns true if the store has an item with the specified public ID
    fn has_id(&self, id: &str) -> bool {
        if let Some(idmap) = self.idmap() {
            idmap.contains(id)
        } else {
            false
        }
    }

    /// Get a reference to an item from the store
    fn get(&self, handle: T::HandleType) -> Result<&T, FoliaError> {
        self.store()
            .get(handle)
            .ok_or(FoliaError::HandleError(Self::store_typeinfo()))
    }

    /// Get a mutable reference to an item from the store
    fn get_mut(&mut self, handle: T::HandleType) -> Result<&mut T, FoliaError> {
        self.store_mut()
            .get_mut(handle)
            .ok_or(FoliaError::HandleError(Self::store_typeinfo()))
    }

    /// Get a reference to an item from the store by its public ID
    fn get_by_id(&self, id: &str) -> Result<&T, FoliaError> {
        let handle = self.resolve_id(id)?;
        self.get(handle)
    }

    /// Removes an item by handle and returns it
    fn remove(&mut self, handle: T::HandleType) -> Result<T, FoliaError> {
        //callback to remove the item from relation maps, may return an error and refuse to remove an item
        self.preremove(handle)?;

        let id: Option<String> = self.get(handle)?.id().map(|x| x.to_string());
        if let Some(id) = id {
            if let Some(idmap) = self.idmap_mut() {
                idmap.remove(id.as_str());
            }
        }

        self.store_mut()
            .take(handle)
            .ok_or(FoliaError::HandleError("Unable to remove non-existing handle"))
    }

    /// Called before an item is removed from the store
    #[allow(unused_variables)]
    fn preremove(&mut self, handle: T::HandleType) -> Result<(), FoliaError> {
        //default implementation does nothing
        Ok(())
    }

    /// Resolves an ID to a handle
    fn resolve_id(&self, id: &str) -> Result<T::HandleType, FoliaError> {
        if let Some(idmap) = self.idmap() {
            idmap
                .get(id)
                .ok_or_else(|| FoliaError::IdNotFoundError(id.to_string(), Self::store_typeinfo()))
        } else {
            Err(FoliaError::IdNotFoundError(
                id.to_string(),
                Self::store_typeinfo(),
            ))
        }
    }

    /// Iterate over all live items in the store (in slot order, not document order)
    fn iter<'a>(&'a self) -> StoreIter<'a, T>
    where
        T: 'a,
    {
        StoreIter {
            iter: self.store().slots.iter(),
        }
    }
}

/// Iterator over the live items in a [`Store`], skipping freed slots
pub struct StoreIter<'a, T> {
    iter: Iter<'a, Slot<T>>,
}

impl<'a, T> Iterator for StoreIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.iter.next() {
                Some(Slot { item: Some(item), .. }) => return Some(item),
                Some(_) => continue,
                None => return None,
            }
        }
    }
}
