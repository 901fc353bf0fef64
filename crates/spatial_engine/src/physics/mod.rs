//! Collision detection
//!
//! Hulls (points, circles and convex polygons) are registered with a
//! [`CollisionManager`] under a caller-chosen id and a collision group.
//! Each [`CollisionManager::update`] buckets hulls into a uniform grid,
//! tests neighbouring hulls from different groups with an exact shape test
//! and reports the pairs whose overlap began in that step.

mod cell_grid;
mod collision_hull;
mod collision_manager;
pub mod narrow_phase;

#[cfg(test)]
mod tests;

pub use cell_grid::{BroadPhaseGrid, CellGrid, CellRef, GridConfig, NEIGHBOURHOOD_SIZE};
pub use collision_hull::{
    CircleHull, CollisionGroup, CollisionHull, HullId, HullShape, PointHull, PolygonHull, ShapeKind,
};
pub use collision_manager::{CollisionError, CollisionManager, CollisionPair};
