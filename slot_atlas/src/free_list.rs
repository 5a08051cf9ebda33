// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Size-classed free lists of empty slots.
//!
//! Each list is singly linked through the `next_free` field of its members, so
//! pushing is O(1) but unlinking an arbitrary member is not. Removal is therefore
//! lazy: a slot that is merged into a neighbour is turned into a tombstone and left
//! where it is. The next [`FreeLists::find_best`] scan that walks past it unlinks
//! it and releases its record to the arena. Tombstoning is O(1) and each tombstone
//! costs one extra step of a later scan.

use log::debug;

use crate::arena::{Arena, SlotId};
use crate::slot::{Slot, SlotState};

/// Number of size classes.
pub const NUM_SIZE_CLASSES: usize = 8;

/// Size class of a `width` x `height` rectangle: `floor(log2(min side))`, clamped
/// to the available classes.
///
/// Classing by the shorter side means every member of a class at or above the class
/// of a request is at least as large as the request's shorter side.
pub fn size_class(width: u32, height: u32) -> usize {
    side_class(width.min(height))
}

/// Size class of a rectangle whose shorter side is `side`.
pub(crate) fn side_class(side: u32) -> usize {
    match side.checked_ilog2() {
        Some(log) => (log as usize).min(NUM_SIZE_CLASSES - 1),
        None => 0,
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FreeLists {
    heads: [Option<SlotId>; NUM_SIZE_CLASSES],
}

impl FreeLists {
    /// Mark `id` empty and push it onto the list of its size class.
    pub(crate) fn push<T>(&mut self, slots: &mut Arena<Slot<T>>, id: SlotId) {
        let slot = &mut slots[id];
        let class = side_class(slot.area.min_side());
        slot.state = SlotState::Empty {
            next_free: self.heads[class],
        };
        self.heads[class] = Some(id);
    }

    /// Unlink and return the smallest empty slot that can hold `width` x `height`.
    ///
    /// Scans the class of the request and every class above it, sweeping any
    /// tombstones met on the way. The returned slot is still empty but no longer
    /// listed.
    pub(crate) fn find_best<T>(
        &mut self,
        slots: &mut Arena<Slot<T>>,
        width: u32,
        height: u32,
    ) -> Option<SlotId> {
        let requested = u64::from(width) * u64::from(height);
        // (class, predecessor, slot, area)
        let mut best: Option<(usize, Option<SlotId>, SlotId, u64)> = None;
        let mut swept = 0_usize;

        'classes: for class in size_class(width, height)..NUM_SIZE_CLASSES {
            let mut prev = None;
            let mut cursor = self.heads[class];

            while let Some(id) = cursor {
                let slot = &slots[id];
                let next = slot.next_free();
                if let SlotState::Tombstone { .. } = slot.state {
                    self.relink(slots, class, prev, next);
                    slots.remove(id);
                    swept += 1;
                    cursor = next;
                    continue;
                }

                let area = slot.area;
                if area.width >= width && area.height >= height {
                    let candidate = area.area();
                    if best.map_or(true, |(.., best_area)| candidate < best_area) {
                        best = Some((class, prev, id, candidate));
                        if candidate == requested {
                            break 'classes;
                        }
                    }
                }
                prev = Some(id);
                cursor = next;
            }
        }

        if swept > 0 {
            debug!("swept {swept} tombstones from the free lists");
        }

        let (class, prev, id, _) = best?;
        let next = slots[id].next_free();
        self.relink(slots, class, prev, next);
        slots[id].set_next_free(None);
        Some(id)
    }

    /// Point `prev` (or the head of `class`) at `next`.
    fn relink<T>(
        &mut self,
        slots: &mut Arena<Slot<T>>,
        class: usize,
        prev: Option<SlotId>,
        next: Option<SlotId>,
    ) {
        match prev {
            Some(prev) => slots[prev].set_next_free(next),
            None => self.heads[class] = next,
        }
    }

    /// First member of `class`, possibly a tombstone.
    pub(crate) fn head(&self, class: usize) -> Option<SlotId> {
        self.heads[class]
    }

    pub(crate) fn clear(&mut self) {
        self.heads = [None; NUM_SIZE_CLASSES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Area;
    use crate::slot::Prev;
    use alloc::vec::Vec;

    fn listed(lists: &FreeLists, slots: &Arena<Slot<()>>, class: usize) -> Vec<SlotId> {
        core::iter::successors(lists.head(class), |id| slots[*id].next_free()).collect()
    }

    fn add(
        lists: &mut FreeLists,
        slots: &mut Arena<Slot<()>>,
        width: u32,
        height: u32,
    ) -> SlotId {
        let id = slots.insert(Slot::empty(
            Area::new(0, 0, width, height),
            Prev::Root,
            None,
        ));
        lists.push(slots, id);
        id
    }

    #[test]
    fn size_class_uses_shorter_side() {
        assert_eq!(size_class(1, 1), 0);
        assert_eq!(size_class(0, 100), 0);
        assert_eq!(size_class(3, 1000), 1);
        assert_eq!(size_class(16, 16), 4);
        assert_eq!(size_class(31, 64), 4);
        assert_eq!(size_class(128, 200), 7);
        assert_eq!(size_class(4096, 4096), NUM_SIZE_CLASSES - 1);
    }

    #[test]
    fn push_files_by_shorter_side() {
        let mut slots = Arena::with_capacity(0);
        let mut lists = FreeLists::default();
        let wide = add(&mut lists, &mut slots, 500, 5);
        let tall = add(&mut lists, &mut slots, 5, 500);
        assert_eq!(listed(&lists, &slots, side_class(5)), [tall, wide]);
        assert_eq!(side_class(slots[wide].area.min_side()), 2);
    }

    #[test]
    fn push_prepends_to_class() {
        let mut slots = Arena::with_capacity(0);
        let mut lists = FreeLists::default();
        let a = add(&mut lists, &mut slots, 8, 8);
        let b = add(&mut lists, &mut slots, 9, 12);
        assert_eq!(listed(&lists, &slots, 3), [b, a]);
        assert!(listed(&lists, &slots, 2).is_empty());
    }

    #[test]
    fn picks_smallest_fitting_area_across_classes() {
        let mut slots = Arena::with_capacity(0);
        let mut lists = FreeLists::default();
        let large = add(&mut lists, &mut slots, 200, 200);
        let tall = add(&mut lists, &mut slots, 20, 300);
        let snug = add(&mut lists, &mut slots, 40, 30);
        let _too_narrow = add(&mut lists, &mut slots, 10, 10);

        assert_eq!(lists.find_best(&mut slots, 15, 25), Some(snug));
        assert_eq!(lists.find_best(&mut slots, 15, 25), Some(tall));
        assert_eq!(lists.find_best(&mut slots, 15, 25), Some(large));
        assert_eq!(lists.find_best(&mut slots, 15, 25), None);
    }

    #[test]
    fn rejects_slots_narrower_than_request() {
        let mut slots = Arena::with_capacity(0);
        let mut lists = FreeLists::default();
        add(&mut lists, &mut slots, 7, 100);
        assert_eq!(lists.find_best(&mut slots, 8, 8), None);
        assert_eq!(lists.find_best(&mut slots, 7, 101), None);
        assert!(lists.find_best(&mut slots, 7, 100).is_some());
    }

    #[test]
    fn winner_is_unlinked_from_middle() {
        let mut slots = Arena::with_capacity(0);
        let mut lists = FreeLists::default();
        let a = add(&mut lists, &mut slots, 16, 40);
        let b = add(&mut lists, &mut slots, 16, 16);
        let c = add(&mut lists, &mut slots, 16, 50);
        assert_eq!(listed(&lists, &slots, 4), [c, b, a]);

        assert_eq!(lists.find_best(&mut slots, 16, 16), Some(b));
        assert_eq!(listed(&lists, &slots, 4), [c, a]);
        assert!(slots[b].is_empty());
        assert_eq!(slots[b].next_free(), None);
    }

    #[test]
    fn tombstones_are_swept_on_scan() {
        let mut slots = Arena::with_capacity(0);
        let mut lists = FreeLists::default();
        let a = add(&mut lists, &mut slots, 32, 32);
        let b = add(&mut lists, &mut slots, 32, 32);
        let c = add(&mut lists, &mut slots, 32, 32);
        slots[b].bury();
        slots[c].bury();

        assert_eq!(slots.live(), 3);
        assert_eq!(lists.find_best(&mut slots, 32, 32), Some(a));
        assert_eq!(slots.live(), 1);
        assert!(listed(&lists, &slots, 5).is_empty());
        assert!(slots.get(b).is_none());
        assert!(slots.get(c).is_none());
    }
}
