// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

use crate::arena::SlotId;
use crate::slot::SlotKind;

/// A handle was used in a way its current state does not allow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SlotError {
    /// The handle was never issued by this allocator.
    #[error("slot {id:?} is out of range (arena holds {len} records)")]
    OutOfRange {
        /// The offending handle.
        id: SlotId,
        /// Number of records in the arena.
        len: usize,
    },
    /// The handle does not refer to an allocated rectangle.
    #[error("slot {id:?} is not allocated (it is {state})")]
    NotAllocated {
        /// The offending handle.
        id: SlotId,
        /// What the handle currently refers to.
        state: SlotKind,
    },
}

/// An [`AllocatorConfig`](crate::AllocatorConfig) that cannot describe an atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One of the dimensions is zero.
    #[error("atlas size {width}x{height} is empty")]
    EmptyAtlas {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// One of the dimensions exceeds [`MAX_ATLAS_SIDE`](crate::MAX_ATLAS_SIDE).
    #[error("atlas size {width}x{height} exceeds the maximum side of {max}")]
    AtlasTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// The largest supported side.
        max: u32,
    },
}

/// A structural defect found by
/// [`SlotAllocator::check_invariants`](crate::SlotAllocator::check_invariants).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// A slot reachable from the tree is not live in the arena.
    #[error("slot {id:?} is linked but not live")]
    Dangling {
        /// The dangling handle.
        id: SlotId,
    },
    /// A slot's `prev` link does not match its position in the chain.
    #[error("slot {id:?} has a broken back link")]
    BrokenLink {
        /// The slot with the wrong link.
        id: SlotId,
    },
    /// A slot reachable from the tree is in a state leaves and containers never have.
    #[error("slot {id:?} is {state} but reachable from the tree")]
    UnexpectedState {
        /// The slot.
        id: SlotId,
        /// Its state.
        state: SlotKind,
    },
    /// A container has fewer than two children.
    #[error("container {id:?} has a single child")]
    SingleChild {
        /// The container.
        id: SlotId,
    },
    /// A slot sticks out of its parent (or of the atlas).
    #[error("slot {id:?} is not inside its parent")]
    OutOfBounds {
        /// The slot.
        id: SlotId,
    },
    /// Two siblings overlap.
    #[error("slots {first:?} and {second:?} overlap")]
    Overlap {
        /// One sibling.
        first: SlotId,
        /// The other sibling.
        second: SlotId,
    },
    /// The children of a level do not cover their parent.
    #[error("children cover {covered} of {expected} texels")]
    Gap {
        /// Texels covered by the children.
        covered: u64,
        /// Texels of the parent.
        expected: u64,
    },
    /// An empty slot is missing from the free lists.
    #[error("empty slot {id:?} is not in any free list")]
    Unlisted {
        /// The slot.
        id: SlotId,
    },
    /// Two neighbouring siblings are both empty and should have been merged.
    #[error("neighbouring slots {first:?} and {second:?} are both empty")]
    AdjacentEmpty {
        /// The earlier sibling.
        first: SlotId,
        /// The later sibling.
        second: SlotId,
    },
    /// An empty slot is listed as free but is not part of the tree.
    #[error("empty slot {id:?} is listed but detached from the tree")]
    Detached {
        /// The slot.
        id: SlotId,
    },
    /// A live record is neither in the tree nor a listed tombstone.
    #[error("slot {id:?} is live but unreachable")]
    Leaked {
        /// The slot.
        id: SlotId,
    },
    /// A slot sits in the free list of the wrong size class.
    #[error("slot {id:?} is listed in class {class} instead of {expected}")]
    WrongClass {
        /// The slot.
        id: SlotId,
        /// The class it was found in.
        class: usize,
        /// The class its area belongs to.
        expected: usize,
    },
    /// A slot appears more than once in the free lists.
    #[error("slot {id:?} is listed twice")]
    ListedTwice {
        /// The slot.
        id: SlotId,
    },
    /// A free list holds a slot that is neither empty nor a tombstone.
    #[error("slot {id:?} is {state} but listed as free")]
    ListedNotFree {
        /// The slot.
        id: SlotId,
        /// Its state.
        state: SlotKind,
    },
    /// The tracked usage statistics disagree with the tree.
    #[error("statistics report {reported} allocated texels, the tree holds {actual}")]
    StatsMismatch {
        /// Texels according to the statistics.
        reported: u64,
        /// Texels according to the tree.
        actual: u64,
    },
}
