//! Interiors, windows, and the exterior<->local coordinate projection
//!
//! Each building interior is its own coordinate space, scaled onto the
//! building's exterior footprint by a linear projection. Windows are the
//! only bridge between spaces, and they carry perception only - never
//! movement or sound.

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::types::{Facing, InteriorId, Vec2};
use crate::world::objects::Obstacle;

/// A window in an interior wall
///
/// Anchored at a cell center on the interior side; the exterior look point
/// sits half a unit outside the faced wall in world space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    /// Which wall the window faces out of (cardinal only)
    pub facing: Facing,
    /// Anchor point in the interior's local coordinates (cell center)
    pub interior_anchor: Vec2,
}

/// One building interior with its own local coordinate space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interior {
    pub id: InteriorId,
    pub name: String,
    /// Top-left corner of the building footprint in world coordinates
    pub exterior_origin: Vec2,
    /// Size of the building footprint in world units
    pub exterior_extent: Vec2,
    /// Size of the local coordinate space
    pub interior_extent: Vec2,
    /// Door position in local coordinates (flee fallback target)
    pub door: Vec2,
    pub windows: Vec<Window>,
    /// Sight-blocking fixtures (stoves) in local coordinates
    pub obstacles: Vec<Obstacle>,
}

impl Interior {
    /// Project a local position onto the building's world footprint
    pub fn interior_to_world(&self, local: Vec2) -> Vec2 {
        Vec2::new(
            self.exterior_origin.x + local.x / self.interior_extent.x * self.exterior_extent.x,
            self.exterior_origin.y + local.y / self.interior_extent.y * self.exterior_extent.y,
        )
    }

    /// Inverse of `interior_to_world`
    pub fn world_to_interior(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            (world.x - self.exterior_origin.x) / self.exterior_extent.x * self.interior_extent.x,
            (world.y - self.exterior_origin.y) / self.exterior_extent.y * self.interior_extent.y,
        )
    }

    /// Whether a world position falls inside the building footprint
    pub fn contains_world(&self, world: Vec2) -> bool {
        world.x >= self.exterior_origin.x
            && world.x <= self.exterior_origin.x + self.exterior_extent.x
            && world.y >= self.exterior_origin.y
            && world.y <= self.exterior_origin.y + self.exterior_extent.y
    }

    /// A window's anchor projected into world coordinates
    pub fn window_world_anchor(&self, window: &Window) -> Vec2 {
        self.interior_to_world(window.interior_anchor)
    }

    /// The point half a unit outside the faced wall, in world coordinates
    pub fn window_exterior_look(&self, window: &Window) -> Vec2 {
        self.window_world_anchor(window) + window.facing.unit() * 0.5
    }

    /// Is a local-space position near the window's interior side?
    pub fn is_near_window_interior(&self, window: &Window, local: Vec2) -> bool {
        window.interior_anchor.distance(&local) <= config().window_near_distance
    }

    /// Is a world-space position near the window's exterior side?
    pub fn is_near_window_exterior(&self, window: &Window, world: Vec2) -> bool {
        self.window_exterior_look(window).distance(&world) <= config().window_near_distance
    }

    /// The interior cell farthest from a threat that is not blocked by a
    /// fixture - used when fleeing inside the same interior as the threat.
    pub fn farthest_open_point(&self, from: Vec2) -> Vec2 {
        let corners = [
            Vec2::new(0.5, 0.5),
            Vec2::new(self.interior_extent.x - 0.5, 0.5),
            Vec2::new(0.5, self.interior_extent.y - 0.5),
            Vec2::new(self.interior_extent.x - 0.5, self.interior_extent.y - 0.5),
        ];
        corners
            .into_iter()
            .filter(|c| !self.obstacles.iter().any(|o| o.position.distance(c) <= o.radius))
            .max_by(|a, b| {
                a.distance(&from)
                    .partial_cmp(&b.distance(&from))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(self.door)
    }
}
