// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The atlas allocator: a guillotine partition tree with merge-on-free coalescing.

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::arena::{Arena, SlotId};
use crate::config::AllocatorConfig;
use crate::error::{ConfigError, InvariantError, SlotError};
use crate::free_list::{side_class, FreeLists, NUM_SIZE_CLASSES};
use crate::geometry::{Area, Axis};
use crate::slot::{Prev, Slot, SlotKind, SlotState};

/// Usage statistics for an atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasUsageStats {
    /// Total allocated area in texels.
    pub allocated_area: u64,
    /// Total available area in texels.
    pub total_area: u64,
    /// Number of live allocations.
    pub allocated_count: u32,
}

impl AtlasUsageStats {
    /// Calculate usage percentage (0.0 to 1.0).
    pub fn usage_percentage(&self) -> f32 {
        if self.total_area == 0 {
            0.0
        } else {
            self.allocated_area as f32 / self.total_area as f32
        }
    }
}

/// A dynamic texture atlas allocator.
///
/// The atlas is partitioned into a tree of slots. The slots of each level form a
/// doubly linked chain that tiles the parent exactly; leaves are either handed out
/// (used) or free (empty), and a container is subdivided into at least two
/// children.
///
/// Allocation picks the smallest empty slot that fits from size-classed free
/// lists and carves the request out of its top-left corner with up to two
/// guillotine cuts. Deallocation merges the freed slot with empty neighbours and
/// collapses containers whose children have merged back into one, cascading up
/// the tree.
///
/// `T` is an optional caller payload stored alongside each allocation. The
/// allocator never inspects it.
pub struct SlotAllocator<T = ()> {
    slots: Arena<Slot<T>>,
    free_lists: FreeLists,
    /// First slot of the top level.
    root: SlotId,
    config: AllocatorConfig,
    stats: AtlasUsageStats,
}

impl<T> SlotAllocator<T> {
    /// Create an allocator for a `width` x `height` atlas.
    ///
    /// # Panics
    ///
    /// If either side is zero or larger than [`MAX_ATLAS_SIDE`](crate::MAX_ATLAS_SIDE).
    #[track_caller]
    pub fn new(width: u32, height: u32) -> Self {
        match Self::with_config(AllocatorConfig::new(width, height)) {
            Ok(allocator) => allocator,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create an allocator from a configuration.
    pub fn with_config(config: AllocatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut allocator = Self {
            slots: Arena::with_capacity(config.slot_capacity),
            free_lists: FreeLists::default(),
            root: SlotId::from_u32(0),
            config,
            stats: AtlasUsageStats {
                allocated_area: 0,
                total_area: u64::from(config.width) * u64::from(config.height),
                allocated_count: 0,
            },
        };
        allocator.plant_root();
        Ok(allocator)
    }

    /// The configuration this allocator was created with.
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Width and height of the atlas.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Current usage statistics.
    pub fn stats(&self) -> &AtlasUsageStats {
        &self.stats
    }

    /// Whether no rectangle is currently allocated.
    pub fn is_empty(&self) -> bool {
        self.stats.allocated_count == 0
    }

    /// Number of live slot records, including containers and unswept tombstones.
    pub fn slot_count(&self) -> usize {
        self.slots.live()
    }

    /// Drop every allocation, returning the atlas to a single free rectangle.
    ///
    /// All previously returned handles become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_lists.clear();
        self.stats.allocated_area = 0;
        self.stats.allocated_count = 0;
        self.plant_root();
    }

    /// Allocate a `width` x `height` rectangle.
    ///
    /// Returns `None` if no free region is large enough, which callers are expected
    /// to handle (by evicting, using another atlas, or not caching). Zero-sized
    /// requests also return `None`.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<SlotId> {
        if width == 0 || height == 0 {
            debug!("refusing zero-sized allocation {width}x{height}");
            return None;
        }

        let Some(chosen) = self.free_lists.find_best(&mut self.slots, width, height) else {
            debug!("no free slot can hold {width}x{height}");
            return None;
        };

        let id = if self.splits_width_first(chosen) {
            let id = self.split_dimension(chosen, Axis::X, width, false);
            self.split_dimension(id, Axis::Y, height, true)
        } else {
            let id = self.split_dimension(chosen, Axis::Y, height, false);
            self.split_dimension(id, Axis::X, width, true)
        };

        let slot = &mut self.slots[id];
        slot.state = SlotState::Used { user_data: None };
        let area = slot.area;
        self.stats.allocated_area += area.area();
        self.stats.allocated_count += 1;

        trace!("allocated {id:?} at {area:?}");
        Some(id)
    }

    /// Free the rectangle behind `id`, returning its payload if one was set.
    ///
    /// # Panics
    ///
    /// If `id` is not currently allocated.
    #[track_caller]
    pub fn deallocate(&mut self, id: SlotId) -> Option<T> {
        match self.try_deallocate(id) {
            Ok(user_data) => user_data,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`deallocate`](Self::deallocate), but reports invalid handles instead of
    /// panicking.
    pub fn try_deallocate(&mut self, id: SlotId) -> Result<Option<T>, SlotError> {
        let slot = self.used_slot_mut(id)?;
        let area = slot.area;
        let user_data = slot.payload_mut().take();

        self.stats.allocated_area -= area.area();
        self.stats.allocated_count -= 1;
        self.make_empty(id);

        trace!("deallocated {id:?} at {area:?}");
        Ok(user_data)
    }

    /// The rectangle behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` is not currently allocated.
    #[track_caller]
    pub fn area(&self, id: SlotId) -> Area {
        self.expect_used(id).area
    }

    /// Like [`area`](Self::area), but reports invalid handles instead of panicking.
    pub fn try_area(&self, id: SlotId) -> Result<Area, SlotError> {
        self.used_slot(id).map(|slot| slot.area)
    }

    /// The payload attached to `id`, if any.
    ///
    /// # Panics
    ///
    /// If `id` is not currently allocated.
    #[track_caller]
    pub fn user_data(&self, id: SlotId) -> Option<&T> {
        self.expect_used(id).payload()
    }

    /// Like [`user_data`](Self::user_data), but reports invalid handles instead of
    /// panicking.
    pub fn try_user_data(&self, id: SlotId) -> Result<Option<&T>, SlotError> {
        self.used_slot(id).map(Slot::payload)
    }

    /// Mutable access to the payload attached to `id`, if any.
    ///
    /// # Panics
    ///
    /// If `id` is not currently allocated.
    #[track_caller]
    pub fn user_data_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.expect_used_mut(id).payload_mut().as_mut()
    }

    /// Attach `user_data` to `id`, returning the previous payload.
    ///
    /// # Panics
    ///
    /// If `id` is not currently allocated.
    #[track_caller]
    pub fn set_user_data(&mut self, id: SlotId, user_data: T) -> Option<T> {
        self.expect_used_mut(id).payload_mut().replace(user_data)
    }

    /// Detach and return the payload of `id`.
    ///
    /// # Panics
    ///
    /// If `id` is not currently allocated.
    #[track_caller]
    pub fn take_user_data(&mut self, id: SlotId) -> Option<T> {
        self.expect_used_mut(id).payload_mut().take()
    }

    /// Invoke `f` on every allocated rectangle.
    pub fn for_each_allocated_rectangle(&self, mut f: impl FnMut(SlotId, Area)) {
        self.visit_leaves(|id, slot| {
            if let SlotState::Used { .. } = slot.state {
                f(id, slot.area);
            }
        });
    }

    /// Invoke `f` on every free rectangle.
    pub fn for_each_free_rectangle(&self, mut f: impl FnMut(Area)) {
        self.visit_leaves(|_, slot| {
            if slot.is_empty() {
                f(slot.area);
            }
        });
    }

    /// Verify the structure of the partition tree and the free lists.
    ///
    /// This walks every slot and is meant for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.slots.len();

        let mut listed = vec![false; len];
        for class in 0..NUM_SIZE_CLASSES {
            let mut cursor = self.free_lists.head(class);
            while let Some(id) = cursor {
                let slot = self.slots.get(id).ok_or(InvariantError::Dangling { id })?;
                if core::mem::replace(&mut listed[id.index()], true) {
                    return Err(InvariantError::ListedTwice { id });
                }
                cursor = match slot.state {
                    SlotState::Tombstone { next_free } => next_free,
                    SlotState::Empty { next_free } => {
                        let expected = side_class(slot.area.min_side());
                        if expected != class {
                            return Err(InvariantError::WrongClass {
                                id,
                                class,
                                expected,
                            });
                        }
                        next_free
                    }
                    _ => {
                        return Err(InvariantError::ListedNotFree {
                            id,
                            state: slot.kind(),
                        })
                    }
                };
            }
        }

        let mut reachable = vec![false; len];
        let mut allocated_area = 0_u64;
        let mut levels = vec![(self.root, Prev::Root, self.bounds())];
        while let Some((first, head_prev, parent_area)) = levels.pop() {
            let mut level: Vec<SlotId> = Vec::new();
            let mut covered = 0_u64;
            let mut expected_prev = head_prev;
            let mut previous_empty = None;
            let mut cursor = Some(first);

            while let Some(id) = cursor {
                let slot = self.slots.get(id).ok_or(InvariantError::Dangling { id })?;
                if core::mem::replace(&mut reachable[id.index()], true)
                    || slot.prev != expected_prev
                {
                    return Err(InvariantError::BrokenLink { id });
                }
                if slot.area.is_empty() || !parent_area.contains(&slot.area) {
                    return Err(InvariantError::OutOfBounds { id });
                }
                if let Some(&other) = level
                    .iter()
                    .find(|other| self.slots[**other].area.intersects(&slot.area))
                {
                    return Err(InvariantError::Overlap {
                        first: other,
                        second: id,
                    });
                }

                match slot.state {
                    SlotState::Container { first_child } => {
                        levels.push((first_child, Prev::Parent(id), slot.area));
                    }
                    SlotState::Used { .. } => allocated_area += slot.area.area(),
                    SlotState::Empty { .. } => {
                        if !listed[id.index()] {
                            return Err(InvariantError::Unlisted { id });
                        }
                        if let Some(earlier) = previous_empty {
                            return Err(InvariantError::AdjacentEmpty {
                                first: earlier,
                                second: id,
                            });
                        }
                    }
                    SlotState::Tombstone { .. } => {
                        return Err(InvariantError::UnexpectedState {
                            id,
                            state: SlotKind::Tombstone,
                        });
                    }
                }

                previous_empty = slot.is_empty().then_some(id);
                covered += slot.area.area();
                level.push(id);
                expected_prev = Prev::Sibling(id);
                cursor = slot.next;
            }

            if covered != parent_area.area() {
                return Err(InvariantError::Gap {
                    covered,
                    expected: parent_area.area(),
                });
            }
            if let Prev::Parent(parent) = head_prev {
                if level.len() < 2 {
                    return Err(InvariantError::SingleChild { id: parent });
                }
            }
        }

        for (id, slot) in self.slots.iter() {
            let index = id.index();
            match slot.state {
                SlotState::Tombstone { .. } if listed[index] => {}
                SlotState::Empty { .. } if listed[index] && !reachable[index] => {
                    return Err(InvariantError::Detached { id });
                }
                _ if !reachable[index] => return Err(InvariantError::Leaked { id }),
                _ => {}
            }
        }

        if allocated_area != self.stats.allocated_area {
            return Err(InvariantError::StatsMismatch {
                reported: self.stats.allocated_area,
                actual: allocated_area,
            });
        }
        Ok(())
    }

    // ----- internal helpers -----

    fn bounds(&self) -> Area {
        Area::new(0, 0, self.config.width, self.config.height)
    }

    /// Insert the whole-atlas empty slot into an empty arena.
    fn plant_root(&mut self) {
        let root = self.slots.insert(Slot::empty(self.bounds(), Prev::Root, None));
        self.free_lists.push(&mut self.slots, root);
        self.root = root;
    }

    fn used_slot(&self, id: SlotId) -> Result<&Slot<T>, SlotError> {
        let len = self.slots.len();
        if id.index() >= len {
            return Err(SlotError::OutOfRange { id, len });
        }
        match self.slots.get(id) {
            Some(slot) if matches!(slot.state, SlotState::Used { .. }) => Ok(slot),
            Some(slot) => Err(SlotError::NotAllocated {
                id,
                state: slot.kind(),
            }),
            None => Err(SlotError::NotAllocated {
                id,
                state: SlotKind::Free,
            }),
        }
    }

    fn used_slot_mut(&mut self, id: SlotId) -> Result<&mut Slot<T>, SlotError> {
        self.used_slot(id)?;
        Ok(&mut self.slots[id])
    }

    #[track_caller]
    fn expect_used(&self, id: SlotId) -> &Slot<T> {
        match self.used_slot(id) {
            Ok(slot) => slot,
            Err(err) => panic!("{err}"),
        }
    }

    #[track_caller]
    fn expect_used_mut(&mut self, id: SlotId) -> &mut Slot<T> {
        if let Err(err) = self.used_slot(id) {
            panic!("{err}");
        }
        &mut self.slots[id]
    }

    /// Pick the cut order for `id`.
    ///
    /// The first cut runs along the sibling chain, so it must follow the chain's
    /// direction: a neighbour on the same row means the chain runs along x. A slot
    /// without neighbours has no direction yet and starts with the width.
    fn splits_width_first(&self, id: SlotId) -> bool {
        let slot = &self.slots[id];
        let neighbor = match slot.prev {
            Prev::Sibling(prev) => Some(prev),
            Prev::Root | Prev::Parent(_) => slot.next,
        };
        neighbor.map_or(true, |neighbor| self.slots[neighbor].area.y == slot.area.y)
    }

    /// Shrink `id` to `size` along `axis`, returning the slot holding the kept part.
    ///
    /// The remainder becomes a new empty sibling right after the kept part. When
    /// `opposite` is set the cut runs across the sibling chain, so the slot is first
    /// turned into a container and its single child is cut instead.
    fn split_dimension(&mut self, id: SlotId, axis: Axis, size: u32, opposite: bool) -> SlotId {
        let extent = self.slots[id].area.extent(axis);
        debug_assert!(size <= extent, "split larger than the slot");
        if extent == size {
            return id;
        }

        let target = if opposite { self.nest(id) } else { id };
        let slot = &mut self.slots[target];
        let (kept, rest) = slot.area.split(axis, size);
        slot.area = kept;
        let next = slot.next;

        let rest_id = self
            .slots
            .insert(Slot::empty(rest, Prev::Sibling(target), next));
        if let Some(next) = next {
            self.slots[next].prev = Prev::Sibling(rest_id);
        }
        self.slots[target].next = Some(rest_id);
        self.free_lists.push(&mut self.slots, rest_id);
        target
    }

    /// Turn `id` into a container with one child spanning the same area.
    fn nest(&mut self, id: SlotId) -> SlotId {
        let area = self.slots[id].area;
        let child = self.slots.insert(Slot::empty(area, Prev::Parent(id), None));
        self.slots[id].state = SlotState::Container { first_child: child };
        child
    }

    /// Return `id` to the free space, merging it with its empty neighbours.
    ///
    /// When the merged slot ends up as the only child of its container, the child is
    /// released and the container is freed in turn, walking up the tree.
    fn make_empty(&mut self, mut id: SlotId) {
        loop {
            if let Prev::Sibling(prev) = self.slots[id].prev {
                if self.slots[prev].is_empty() {
                    self.absorb_prev(id, prev);
                }
            }
            if let Some(next) = self.slots[id].next {
                if self.slots[next].is_empty() {
                    self.absorb_next(id, next);
                }
            }

            let slot = &self.slots[id];
            match (slot.prev, slot.next) {
                (Prev::Parent(parent), None) => {
                    debug_assert_eq!(
                        slot.area, self.slots[parent].area,
                        "an only child must span its parent"
                    );
                    self.slots.remove(id);
                    debug!("collapsing container {parent:?}");
                    id = parent;
                }
                _ => {
                    self.free_lists.push(&mut self.slots, id);
                    return;
                }
            }
        }
    }

    /// Merge the empty predecessor `prev` into `id`.
    fn absorb_prev(&mut self, id: SlotId, prev: SlotId) {
        let absorbed = &self.slots[prev];
        let (area, before) = (absorbed.area, absorbed.prev);

        let slot = &mut self.slots[id];
        slot.area = slot.area.union(&area);
        slot.prev = before;
        match before {
            Prev::Root => self.root = id,
            Prev::Parent(parent) => {
                self.slots[parent].state = SlotState::Container { first_child: id };
            }
            Prev::Sibling(before) => self.slots[before].next = Some(id),
        }
        self.slots[prev].bury();
    }

    /// Merge the empty successor `next` into `id`.
    fn absorb_next(&mut self, id: SlotId, next: SlotId) {
        let absorbed = &self.slots[next];
        let (area, after) = (absorbed.area, absorbed.next);

        let slot = &mut self.slots[id];
        slot.area = slot.area.union(&area);
        slot.next = after;
        if let Some(after) = after {
            self.slots[after].prev = Prev::Sibling(id);
        }
        self.slots[next].bury();
    }

    /// Call `f` on every leaf of the tree.
    fn visit_leaves(&self, mut f: impl FnMut(SlotId, &Slot<T>)) {
        let mut levels = vec![self.root];
        while let Some(first) = levels.pop() {
            let mut cursor = Some(first);
            while let Some(id) = cursor {
                let slot = &self.slots[id];
                match slot.state {
                    SlotState::Container { first_child } => levels.push(first_child),
                    _ => f(id, slot),
                }
                cursor = slot.next;
            }
        }
    }
}

impl<T> Default for SlotAllocator<T> {
    fn default() -> Self {
        Self::with_config(AllocatorConfig::default())
            .expect("default configuration describes a valid atlas")
    }
}

impl<T> core::fmt::Debug for SlotAllocator<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotAllocator")
            .field("size", &self.size())
            .field("stats", &self.stats)
            .field("slot_count", &self.slots.live())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
