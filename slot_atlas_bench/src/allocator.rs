// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{black_box, BatchSize, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use slot_atlas::{SlotAllocator, SlotId};

use crate::SEED;

pub fn allocator(c: &mut Criterion) {
    best_fit_over_checkerboard(c);
    drain_and_sweep(c);
    two_cut_placement(c);
}

/// Fill `size` x `size` with `tile` squares, returning the handles in placement order.
fn tiled(size: u32, tile: u32) -> (SlotAllocator, Vec<SlotId>) {
    let mut atlas = SlotAllocator::new(size, size);
    let mut ids = Vec::new();
    while let Some(id) = atlas.allocate(tile, tile) {
        ids.push(id);
    }
    (atlas, ids)
}

/// Best-fit lookups against hundreds of scattered holes.
///
/// Every other tile of a full 32x32 grid is freed, so most free lists hold many
/// entries and each request walks several classes before settling.
fn best_fit_over_checkerboard(c: &mut Criterion) {
    let mut rng = SmallRng::from_seed(SEED);
    let sides = [2, 5, 9, 17, 30];
    let requests: Vec<(u32, u32)> = (0..256)
        .map(|_| {
            let w = sides[rng.random_range(0..sides.len())];
            let h = sides[rng.random_range(0..sides.len())];
            (w, h)
        })
        .collect();

    let mut g = c.benchmark_group("allocator");
    g.bench_function("best_fit_checkerboard_256", |b| {
        b.iter_batched(
            || {
                let (mut atlas, ids) = tiled(1024, 32);
                for id in ids.into_iter().step_by(2) {
                    atlas.deallocate(id);
                }
                atlas
            },
            |mut atlas| {
                for &(w, h) in &requests {
                    black_box(atlas.allocate(w, h));
                }
                atlas
            },
            BatchSize::LargeInput,
        );
    });
    g.finish();
}

/// Drain a full grid so merges tombstone slot after slot and containers collapse
/// level by level, then let one scan sweep every list.
fn drain_and_sweep(c: &mut Criterion) {
    let mut g = c.benchmark_group("allocator");
    g.sample_size(20);
    g.bench_function("drain_1024_tiles_then_sweep", |b| {
        b.iter_batched(
            || {
                let (atlas, ids) = tiled(512, 16);
                // Alternate between both ends so merges happen on either side.
                let mut order = Vec::with_capacity(ids.len());
                let (mut lo, mut hi) = (0, ids.len());
                while lo < hi {
                    hi -= 1;
                    order.push(ids[hi]);
                    if lo < hi {
                        order.push(ids[lo]);
                        lo += 1;
                    }
                }
                (atlas, order)
            },
            |(mut atlas, order)| {
                for id in order {
                    atlas.deallocate(id);
                }
                black_box(atlas.allocate(1, 1));
                atlas
            },
            BatchSize::LargeInput,
        );
    });
    g.finish();
}

/// Requests smaller than their hole in both directions, so nearly every placement
/// takes the second cut and nests a new container.
fn two_cut_placement(c: &mut Criterion) {
    let mut rng = SmallRng::from_seed(SEED);
    let requests: Vec<(u32, u32)> = (0..2000)
        .map(|_| (rng.random_range(3..=48), rng.random_range(3..=48)))
        .collect();

    let mut g = c.benchmark_group("allocator");
    g.bench_function("two_cut_2000_small", |b| {
        b.iter(|| {
            let mut atlas: SlotAllocator = SlotAllocator::new(2048, 2048);
            let mut placed = 0_u32;
            for &(w, h) in &requests {
                if atlas.allocate(w, h).is_some() {
                    placed += 1;
                }
            }
            black_box((placed, atlas.slot_count()));
        });
    });
    g.finish();
}
