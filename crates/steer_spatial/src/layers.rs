//! Collision layers and query masks
//!
//! Every proxy lives on exactly one layer. Queries carry a mask selecting
//! the layers that take part, so "obstacles to avoid" and "neighbours to
//! flock with" are separate queries over the same backend.

use serde::{Deserialize, Serialize};

/// A collision layer identifier (0..32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Default layer
    pub const DEFAULT: Self = Self(0);
    /// Static environment layer
    pub const ENVIRONMENT: Self = Self(1);
    /// Flocking agents
    pub const FLOCK: Self = Self(2);
    /// Roaming agents (wanderers, pursuers, evaders)
    pub const AGENTS: Self = Self(3);

    /// Get the layer as a bitmask
    pub const fn as_mask(&self) -> LayerMask {
        LayerMask(1 << (self.0 & 31))
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Bitmask of collision layers taking part in a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer
    pub const ALL: Self = Self(u32::MAX);
    /// No layer
    pub const NONE: Self = Self(0);

    /// Mask containing only `layer`
    pub const fn only(layer: CollisionLayer) -> Self {
        layer.as_mask()
    }

    /// Every layer except `layer`
    pub const fn all_except(layer: CollisionLayer) -> Self {
        Self(!layer.as_mask().0)
    }

    /// Check if `layer` takes part in queries with this mask
    #[inline]
    pub const fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer.as_mask().0 != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}
