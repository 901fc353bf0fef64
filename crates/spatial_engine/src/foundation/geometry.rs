//! Axis-aligned boxes for spatial queries
//!
//! Boxes use screen orientation: `min` is the top-left corner and `max` the
//! bottom-right one, so the quadrant names (north = smaller y) read the way
//! the scene is drawn.

use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AABB {
    /// Top-left corner of the bounding box
    pub min: Vec2,
    /// Bottom-right corner of the bounding box
    pub max: Vec2,
}

impl AABB {
    /// Create a new AABB from two corners, ordering them per axis
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create an AABB from its top-left corner and size
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position, position + size)
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Width of the box
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the box
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// True when the box has zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Check if this AABB contains a point (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if this AABB wholly contains another one (edges inclusive)
    pub fn contains(&self, other: &AABB) -> bool {
        other.min.x >= self.min.x && other.max.x <= self.max.x &&
        other.min.y >= self.min.y && other.max.y <= self.max.y
    }

    /// Check if this AABB intersects another AABB (touching edges count)
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Split the box at its center into NW, NE, SE, SW quadrants
    pub fn quadrants(&self) -> [AABB; 4] {
        let center = self.center();
        let center_left = Vec2::new(self.min.x, center.y);
        let center_right = Vec2::new(self.max.x, center.y);
        let center_top = Vec2::new(center.x, self.min.y);
        let center_bottom = Vec2::new(center.x, self.max.y);

        [
            AABB { min: self.min, max: center },
            AABB { min: center_top, max: center_right },
            AABB { min: center, max: self.max },
            AABB { min: center_left, max: center_bottom },
        ]
    }
}
