// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rectangle allocator for texture atlases.
//!
//! [`SlotAllocator`] manages the free space of a fixed-size atlas, such as the
//! backing texture of a glyph or icon cache. Callers request rectangles with
//! [`allocate`](SlotAllocator::allocate), receive a [`SlotId`] handle, look up its
//! [`Area`] and release it with [`deallocate`](SlotAllocator::deallocate). Each
//! allocation may carry a caller payload.
//!
//! # Usage
//!
//! ```
//! use slot_atlas::{Area, SlotAllocator};
//!
//! let mut atlas: SlotAllocator<&str> = SlotAllocator::new(512, 512);
//! let glyph = atlas.allocate(100, 100).expect("empty atlas has room");
//! assert_eq!(atlas.area(glyph), Area::new(0, 0, 100, 100));
//! atlas.set_user_data(glyph, "A");
//!
//! // A failed allocation is an ordinary outcome: evict, grow, or skip caching.
//! assert!(atlas.allocate(600, 10).is_none());
//!
//! assert_eq!(atlas.deallocate(glyph), Some("A"));
//! assert!(atlas.allocate(512, 512).is_some());
//! ```
//!
//! # Design
//!
//! The atlas is an implicit binary partition: every slot is a node of a tree whose
//! siblings tile their parent exactly. Free leaves are kept in eight singly linked
//! lists keyed by `floor(log2(shorter side))`. Allocation takes the smallest free
//! leaf that fits and splits it with at most two guillotine cuts; deallocation
//! merges the freed leaf with free neighbours and collapses containers that are
//! left with a single child. Slots merged away are tombstoned in place and
//! released the next time their free list is scanned.
//!
//! The allocator is single-threaded and performs no internal locking.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![no_std]

extern crate alloc;

mod allocator;
mod arena;
mod config;
mod error;
mod free_list;
mod geometry;
mod slot;

pub use allocator::{AtlasUsageStats, SlotAllocator};
pub use arena::SlotId;
pub use config::{AllocatorConfig, MAX_ATLAS_SIDE};
pub use error::{ConfigError, InvariantError, SlotError};
pub use free_list::{size_class, NUM_SIZE_CLASSES};
pub use geometry::Area;
pub use slot::SlotKind;
