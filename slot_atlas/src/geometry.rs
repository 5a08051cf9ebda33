// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer rectangles in atlas space.

/// An axis of the atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Axis {
    /// Along the width.
    X,
    /// Along the height.
    Y,
}

/// A rectangle inside an atlas, in texels, with its origin at the top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Area {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Extent along the x axis.
    pub width: u32,
    /// Extent along the y axis.
    pub height: u32,
}

impl Area {
    /// Create a new area.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The exclusive right edge.
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// The exclusive bottom edge.
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// The shorter of the two sides.
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Number of texels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether the area covers no texels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the interiors of `self` and `other` overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The smallest area containing both `self` and `other`.
    ///
    /// For two neighbours sharing a full edge this is exactly their union.
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub(crate) fn extent(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Cut along `axis` at `size` texels from the origin.
    ///
    /// Returns the leading part of extent `size` and the trailing remainder.
    pub(crate) fn split(&self, axis: Axis, size: u32) -> (Self, Self) {
        debug_assert!(size < self.extent(axis), "split must leave a remainder");
        match axis {
            Axis::X => (
                Self::new(self.x, self.y, size, self.height),
                Self::new(self.x + size, self.y, self.width - size, self.height),
            ),
            Axis::Y => (
                Self::new(self.x, self.y, self.width, size),
                Self::new(self.x, self.y + size, self.width, self.height - size),
            ),
        }
    }
}
