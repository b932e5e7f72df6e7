//! Lane geometry and axis-aligned collision boxes
//!
//! The road is a vertical strip of `lane_count` equal-width lanes; entities
//! scroll toward the player along +y. Geometry is always passed in through
//! `ViewportConfig` - never read from ambient globals.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Viewport and lane layout for one session
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Road width in world units
    pub width: f32,
    /// Visible road length in world units
    pub height: f32,
    /// Number of lanes (fixed per session, >= 2)
    pub lane_count: usize,
}

impl ViewportConfig {
    pub fn new(width: f32, height: f32, lane_count: usize) -> Self {
        debug_assert!(lane_count >= 2, "lane_count must be at least 2");
        Self {
            width,
            height,
            lane_count,
        }
    }

    /// Width of a single lane
    #[inline]
    pub fn lane_width(&self) -> f32 {
        self.width / self.lane_count as f32
    }

    /// X coordinate of a lane's centerline
    #[inline]
    pub fn lane_center_x(&self, lane: usize) -> f32 {
        debug_assert!(lane < self.lane_count);
        (lane as f32 + 0.5) * self.lane_width()
    }

    /// Y coordinate where the player car sits (near the bottom edge)
    #[inline]
    pub fn player_y(&self) -> f32 {
        self.height - 120.0
    }

    /// Y coordinate where freshly spawned entities enter (above the top edge)
    #[inline]
    pub fn spawn_y(&self) -> f32 {
        -60.0
    }

    /// Y past which an entity is gone for good and can be despawned
    #[inline]
    pub fn despawn_y(&self) -> f32 {
        self.height + 80.0
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::new(480.0, 800.0, 6)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build a box from its center and full extents
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width / 2.0, height / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Overlap test (touching edges do not count as overlap)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }
}
