// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Allocator configuration.

use crate::error::ConfigError;

/// Largest supported atlas side.
///
/// Every texel coordinate up to this bound is exactly representable as an `f32`,
/// which keeps texture coordinates derived from allocations exact.
pub const MAX_ATLAS_SIDE: u32 = 1 << 24;

/// Configuration for a [`SlotAllocator`](crate::SlotAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Width of the atlas in texels.
    pub width: u32,
    /// Height of the atlas in texels.
    pub height: u32,
    /// Number of slot records to reserve up front.
    pub slot_capacity: usize,
}

impl AllocatorConfig {
    /// Configuration for a `width` x `height` atlas with the default capacity.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Check that the configuration describes a usable atlas.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyAtlas { width, height });
        }
        if width > MAX_ATLAS_SIDE || height > MAX_ATLAS_SIDE {
            return Err(ConfigError::AtlasTooLarge {
                width,
                height,
                max: MAX_ATLAS_SIDE,
            });
        }
        Ok(())
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            slot_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(AllocatorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_side_is_rejected() {
        assert_eq!(
            AllocatorConfig::new(0, 10).validate(),
            Err(ConfigError::EmptyAtlas {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn oversized_side_is_rejected() {
        let config = AllocatorConfig::new(16, MAX_ATLAS_SIDE + 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AtlasTooLarge { .. })
        ));
        assert_eq!(AllocatorConfig::new(MAX_ATLAS_SIDE, 1).validate(), Ok(()));
    }
}
