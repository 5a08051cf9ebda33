// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node record of the partition tree.

use crate::arena::SlotId;
use crate::geometry::Area;

/// What precedes a slot in its sibling chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Prev {
    /// First slot of the top level, which tiles the whole atlas.
    Root,
    /// First child of the given container.
    Parent(SlotId),
    /// Any later slot in a chain.
    Sibling(SlotId),
}

/// Per-state payload of a slot.
#[derive(Clone, Debug)]
pub(crate) enum SlotState<T> {
    /// Merged into a neighbour, still linked in a free list until the next scan of
    /// that list unlinks and releases it.
    Tombstone { next_free: Option<SlotId> },
    /// A free leaf. `next_free` is the successor in its size class list.
    Empty { next_free: Option<SlotId> },
    /// An internal node whose children tile its area.
    Container { first_child: SlotId },
    /// A leaf handed out to a caller, with the caller's payload.
    Used { user_data: Option<T> },
}

/// Observable state of a handle, used in diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// The handle refers to no live record.
    Free,
    /// The record was merged away and awaits release.
    Tombstone,
    /// The record is a free rectangle.
    Empty,
    /// The record is subdivided into children.
    Container,
    /// The record is allocated.
    Used,
}

impl core::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Free => "free",
            Self::Tombstone => "tombstone",
            Self::Empty => "empty",
            Self::Container => "container",
            Self::Used => "used",
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Slot<T> {
    pub(crate) area: Area,
    pub(crate) prev: Prev,
    pub(crate) next: Option<SlotId>,
    pub(crate) state: SlotState<T>,
}

impl<T> Slot<T> {
    /// A new unlisted empty slot.
    pub(crate) fn empty(area: Area, prev: Prev, next: Option<SlotId>) -> Self {
        Self {
            area,
            prev,
            next,
            state: SlotState::Empty { next_free: None },
        }
    }

    pub(crate) fn kind(&self) -> SlotKind {
        match self.state {
            SlotState::Tombstone { .. } => SlotKind::Tombstone,
            SlotState::Empty { .. } => SlotKind::Empty,
            SlotState::Container { .. } => SlotKind::Container,
            SlotState::Used { .. } => SlotKind::Used,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self.state, SlotState::Empty { .. })
    }

    /// Free list successor of an empty or tombstoned slot.
    pub(crate) fn next_free(&self) -> Option<SlotId> {
        match self.state {
            SlotState::Tombstone { next_free } | SlotState::Empty { next_free } => next_free,
            _ => unreachable!("{} slot is not in a free list", self.kind()),
        }
    }

    pub(crate) fn set_next_free(&mut self, next: Option<SlotId>) {
        match &mut self.state {
            SlotState::Tombstone { next_free } | SlotState::Empty { next_free } => {
                *next_free = next;
            }
            _ => unreachable!("{} slot is not in a free list", self.kind()),
        }
    }

    pub(crate) fn payload(&self) -> Option<&T> {
        match &self.state {
            SlotState::Used { user_data } => user_data.as_ref(),
            _ => unreachable!("{} slot carries no user data", self.kind()),
        }
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Option<T> {
        let kind = self.kind();
        match &mut self.state {
            SlotState::Used { user_data } => user_data,
            _ => unreachable!("{kind} slot carries no user data"),
        }
    }

    /// Turn an empty slot into a tombstone, keeping its free list link.
    pub(crate) fn bury(&mut self) {
        match self.state {
            SlotState::Empty { next_free } => self.state = SlotState::Tombstone { next_free },
            _ => unreachable!("only empty slots are merged away, found {}", self.kind()),
        }
    }
}
