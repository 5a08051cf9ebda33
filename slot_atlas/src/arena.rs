// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A growable by-value record store addressed by [`SlotId`].

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

/// Handle to a slot of an [`SlotAllocator`](crate::SlotAllocator).
///
/// Handles are plain values. A handle returned by
/// [`allocate`](crate::SlotAllocator::allocate) stays valid until it is passed to
/// [`deallocate`](crate::SlotAllocator::deallocate); afterwards the same value may
/// be handed out again for an unrelated rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u32);

impl SlotId {
    /// Rebuild a handle from a value obtained with [`SlotId::as_u32`].
    pub const fn from_u32(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("slot arena exceeded the u32 handle space"))
    }
}

#[derive(Clone, Debug)]
enum Entry<T> {
    Free,
    Occupied(T),
}

/// Backing storage for slot records.
///
/// Removed records leave a [`Entry::Free`] hole that is handed out again before the
/// store grows. `first_free` is a low-water mark: every entry below it is occupied,
/// so the lowest hole is always found by scanning forward from there.
///
/// The arena does no reachability tracking. Callers must unlink a record from
/// every structure that refers to it before removing it.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    entries: Vec<Entry<T>>,
    first_free: usize,
    live: usize,
}

impl<T> Arena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            first_free: 0,
            live: 0,
        }
    }

    /// Store `value` in the lowest free entry, or append it.
    pub(crate) fn insert(&mut self, value: T) -> SlotId {
        self.live += 1;
        let hole = self.entries[self.first_free..]
            .iter()
            .position(|entry| matches!(entry, Entry::Free))
            .map(|offset| self.first_free + offset);

        match hole {
            Some(index) => {
                self.entries[index] = Entry::Occupied(value);
                self.first_free = index + 1;
                SlotId::from_index(index)
            }
            None => {
                let id = SlotId::from_index(self.entries.len());
                self.entries.push(Entry::Occupied(value));
                self.first_free = self.entries.len();
                id
            }
        }
    }

    /// Release the record behind `id` and return it.
    ///
    /// # Panics
    ///
    /// If `id` does not refer to a live record.
    #[track_caller]
    pub(crate) fn remove(&mut self, id: SlotId) -> T {
        let index = id.index();
        match core::mem::replace(&mut self.entries[index], Entry::Free) {
            Entry::Occupied(value) => {
                self.live -= 1;
                self.first_free = self.first_free.min(index);
                value
            }
            Entry::Free => panic!("slot {id:?} released twice"),
        }
    }

    pub(crate) fn get(&self, id: SlotId) -> Option<&T> {
        match self.entries.get(id.index()) {
            Some(Entry::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.entries.get_mut(id.index()) {
            Some(Entry::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Iterate over the live records.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                Entry::Occupied(value) => Some((SlotId::from_index(index), value)),
                Entry::Free => None,
            })
    }

    /// Number of entries, live or free. Every valid handle is below this.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of live records.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.first_free = 0;
        self.live = 0;
    }
}

impl<T> Index<SlotId> for Arena<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, id: SlotId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("slot {id:?} is not live"),
        }
    }
}

impl<T> IndexMut<SlotId> for Arena<T> {
    #[track_caller]
    fn index_mut(&mut self, id: SlotId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("slot {id:?} is not live"),
        }
    }
}
