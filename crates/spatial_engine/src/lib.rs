//! # Spatial Engine
//!
//! 2D spatial queries and collision detection for the game layer.
//!
//! ## Features
//!
//! - **Quad Tree**: Recursive quadrant subdivision answering "what overlaps
//!   this region/point" for visibility culling and picking
//! - **Collision Manager**: Grid broad-phase plus exact narrow-phase tests
//!   between points, circles and convex polygons
//! - **Onset Tracking**: Collided pairs are reported once, on the step their
//!   overlap begins
//! - **Configuration**: TOML/RON loadable settings for both subsystems
//!
//! ## Quick Start
//!
//! ```rust
//! use spatial_engine::prelude::*;
//!
//! let mut collisions = CollisionManager::new();
//! collisions.register_circle(1, 1, Vec2::new(0.0, 0.0), 5.0).unwrap();
//! collisions.register_circle(2, 2, Vec2::new(9.0, 0.0), 5.0).unwrap();
//!
//! collisions.update();
//! assert_eq!(collisions.collided_pairs(), &[CollisionPair::new(2, 1)]);
//!
//! let mut tree: QuadTree<u32> = QuadTree::new(QuadTreeConfig::default());
//! tree.create(AABB::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0)));
//! tree.insert_object(7, AABB::new(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0))).unwrap();
//!
//! let mut visible = Vec::new();
//! tree.query_point(Vec2::new(15.0, 15.0), &mut visible);
//! assert_eq!(visible, vec![7]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SpatialConfig},
        foundation::{
            geometry::AABB,
            math::{Mat3, Mat3Ext, Vec2},
        },
        physics::{
            CellGrid, CollisionError, CollisionGroup, CollisionHull, CollisionManager,
            CollisionPair, GridConfig, HullId, ShapeKind,
        },
        spatial::{IdentityKey, KeyFn, KeyPolicy, QuadTree, QuadTreeConfig, QuadTreeError},
    };
}
