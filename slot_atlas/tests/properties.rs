// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavioural properties of the allocator, observed through its public API.

use slot_atlas::{Area, SlotAllocator, SlotId};

/// Assert that allocated and free rectangles tile the atlas exactly.
fn assert_tiles<T>(alloc: &SlotAllocator<T>) {
    let (width, height) = alloc.size();
    let bounds = Area::new(0, 0, width, height);

    let mut leaves = Vec::new();
    alloc.for_each_allocated_rectangle(|_, area| leaves.push(area));
    alloc.for_each_free_rectangle(|area| leaves.push(area));

    let covered: u64 = leaves.iter().map(Area::area).sum();
    assert_eq!(covered, bounds.area(), "leaves must cover the atlas");
    for (i, a) in leaves.iter().enumerate() {
        assert!(bounds.contains(a), "{a:?} sticks out of the atlas");
        for b in &leaves[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
    if let Err(err) = alloc.check_invariants() {
        panic!("invariant violated: {err}");
    }
}

fn assert_whole_atlas_free(alloc: &mut SlotAllocator) {
    let (width, height) = alloc.size();
    let full = alloc
        .allocate(width, height)
        .expect("whole atlas should be allocatable");
    assert_eq!(alloc.area(full), Area::new(0, 0, width, height));
    alloc.deallocate(full);
}

/// Every permutation of `0..n`, in lexicographic order.
fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for first in 0..n {
        for rest in permutations(n - 1) {
            let mut order = vec![first];
            order.extend(rest.into_iter().map(|i| if i >= first { i + 1 } else { i }));
            out.push(order);
        }
    }
    out
}

#[test]
fn full_atlas_allocation_blocks_everything() {
    let mut alloc: SlotAllocator = SlotAllocator::new(512, 512);
    let a = alloc.allocate(512, 512).unwrap();
    assert_eq!(alloc.area(a), Area::new(0, 0, 512, 512));
    assert!(alloc.allocate(1, 1).is_none());
    assert_tiles(&alloc);
}

#[test]
fn two_frees_restore_whole_atlas() {
    let mut alloc: SlotAllocator = SlotAllocator::new(512, 512);
    let a = alloc.allocate(100, 100).unwrap();
    let b = alloc.allocate(100, 100).unwrap();
    assert_tiles(&alloc);
    alloc.deallocate(a);
    alloc.deallocate(b);
    assert_tiles(&alloc);
    assert!(alloc.allocate(512, 512).is_some());
}

#[test]
fn quadrants_drain_in_every_order() {
    for order in permutations(4) {
        let mut alloc: SlotAllocator = SlotAllocator::new(256, 256);
        let ids: Vec<SlotId> = (0..4)
            .map(|_| alloc.allocate(128, 128).expect("quadrant fits"))
            .collect();
        assert!(alloc.allocate(1, 1).is_none());
        assert_tiles(&alloc);

        for &i in &order {
            alloc.deallocate(ids[i]);
            assert_tiles(&alloc);
        }
        let full = alloc.allocate(256, 256);
        assert!(full.is_some(), "drain order {order:?} left the atlas split");
    }
}

#[test]
fn oversized_in_one_dimension_fails() {
    let mut alloc: SlotAllocator = SlotAllocator::new(512, 512);
    assert!(alloc.allocate(600, 10).is_none());
    assert!(alloc.allocate(10, 600).is_none());
    assert_tiles(&alloc);
}

#[test]
fn allocate_then_free_round_trips() {
    for (w, h) in [(1, 1), (7, 300), (300, 7), (511, 512), (256, 100), (512, 1)] {
        let mut alloc: SlotAllocator = SlotAllocator::new(512, 512);
        let id = alloc.allocate(w, h).unwrap();
        assert_eq!(alloc.area(id), Area::new(0, 0, w, h));
        assert_tiles(&alloc);
        alloc.deallocate(id);
        assert_whole_atlas_free(&mut alloc);
    }
}

#[test]
fn exact_hole_is_reused_unchanged() {
    let mut alloc: SlotAllocator = SlotAllocator::new(300, 200);
    let a = alloc.allocate(100, 200).unwrap();
    let b = alloc.allocate(100, 200).unwrap();
    let c = alloc.allocate(100, 200).unwrap();
    let hole = alloc.area(b);
    alloc.deallocate(b);

    let slots = alloc.slot_count();
    let again = alloc.allocate(100, 200).unwrap();
    assert_eq!(alloc.area(again), hole);
    assert_eq!(alloc.slot_count(), slots);

    for id in [a, again, c] {
        alloc.deallocate(id);
    }
    assert_whole_atlas_free(&mut alloc);
}

#[test]
fn grid_drains_in_any_order() {
    let mut alloc: SlotAllocator = SlotAllocator::new(256, 256);
    let mut ids = Vec::new();
    while let Some(id) = alloc.allocate(32, 32) {
        ids.push(id);
    }
    assert_eq!(ids.len(), 64);
    assert_eq!(alloc.stats().allocated_area, 256 * 256);
    assert_tiles(&alloc);

    // Interleave from both ends of the allocation order.
    let mut order = Vec::new();
    let (mut lo, mut hi) = (0, ids.len());
    while lo < hi {
        hi -= 1;
        order.push(ids[hi]);
        if lo < hi {
            order.push(ids[lo]);
            lo += 1;
        }
    }
    for id in order {
        alloc.deallocate(id);
    }
    assert_tiles(&alloc);
    assert!(alloc.is_empty());
    assert_whole_atlas_free(&mut alloc);
}

#[test]
fn live_handles_keep_their_area() {
    // Widths 8..=19 sum to 162, so every request still fits beside the ones
    // already placed along the top edge.
    let mut alloc: SlotAllocator<usize> = SlotAllocator::new(256, 256);
    let mut live = Vec::new();
    for i in 0..12_u32 {
        let id = alloc.allocate(8 + i, 16 - i).unwrap();
        alloc.set_user_data(id, i as usize);
        live.push((id, alloc.area(id)));
    }
    for (id, _) in live.iter().step_by(3) {
        alloc.deallocate(*id);
    }
    for (n, (id, area)) in live.iter().enumerate() {
        if n % 3 != 0 {
            assert_eq!(alloc.area(*id), *area);
            assert_eq!(alloc.user_data(*id), Some(&n));
        }
    }
    assert_tiles(&alloc);
}

#[test]
fn too_wide_for_any_strip_is_refused() {
    // Widths 8..=17 leave a 3 texel column on the right, and each free strip
    // below a placed rectangle is only as wide as that rectangle.
    let mut alloc: SlotAllocator = SlotAllocator::new(128, 128);
    for i in 0..10_u32 {
        assert!(alloc.allocate(8 + i, 16 - i).is_some(), "request {i} fits");
    }
    let mut widest = 0;
    alloc.for_each_free_rectangle(|area| widest = widest.max(area.width));
    assert!(widest < 18);
    assert!(alloc.allocate(18, 6).is_none());
    assert_tiles(&alloc);
}
