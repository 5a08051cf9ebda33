// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seeded random workloads, checking the tree after every mutation.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use slot_atlas::{Area, SlotAllocator, SlotId};

fn check(alloc: &SlotAllocator<u32>) {
    if let Err(err) = alloc.check_invariants() {
        panic!("invariant violated: {err}");
    }
}

fn run_churn(seed: u64, size: u32, max_side: u32, steps: usize) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut alloc: SlotAllocator<u32> = SlotAllocator::new(size, size);
    let mut live: Vec<(SlotId, Area, u32)> = Vec::new();

    for step in 0..steps {
        if !live.is_empty() && rng.random_range(0..5) > 2 {
            let nth = rng.random_range(0..live.len());
            let (id, area, tag) = live.swap_remove(nth);
            assert_eq!(alloc.area(id), area);
            assert_eq!(alloc.deallocate(id), Some(tag));
        } else {
            let w = rng.random_range(1..=max_side);
            let h = rng.random_range(1..=max_side);
            if let Some(id) = alloc.allocate(w, h) {
                let area = alloc.area(id);
                assert_eq!((area.width, area.height), (w, h));
                let tag = u32::try_from(step).unwrap();
                alloc.set_user_data(id, tag);
                live.push((id, area, tag));
            }
        }
        check(&alloc);
    }
    assert_eq!(alloc.stats().allocated_count as usize, live.len());

    live.shuffle(&mut rng);
    for (id, area, tag) in live {
        assert_eq!(alloc.area(id), area);
        assert_eq!(alloc.deallocate(id), Some(tag));
        check(&alloc);
    }

    assert!(alloc.is_empty());
    let full = alloc.allocate(size, size).expect("drained atlas is whole again");
    assert_eq!(alloc.area(full), Area::new(0, 0, size, size));
}

#[test]
fn churn_small_rectangles() {
    run_churn(1, 256, 40, 3_000);
}

#[test]
fn churn_mixed_rectangles() {
    run_churn(7, 512, 200, 3_000);
}

#[test]
fn churn_under_pressure() {
    run_churn(42, 128, 128, 3_000);
}

#[test]
fn live_allocations_never_overlap() {
    let mut rng = SmallRng::seed_from_u64(99);
    let mut alloc: SlotAllocator<u32> = SlotAllocator::new(300, 300);
    for _ in 0..200 {
        let w = rng.random_range(1..=60);
        let h = rng.random_range(1..=60);
        alloc.allocate(w, h);
    }

    let mut areas = Vec::new();
    alloc.for_each_allocated_rectangle(|_, area| areas.push(area));
    for (i, a) in areas.iter().enumerate() {
        for b in &areas[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
    check(&alloc);
}
