//! Side-scrolling scene driven by the spatial engine
//!
//! A falling circle (the flyer) hops through columns scrolling in from the
//! right. Every column is a pair of box obstacles with a gap between them and
//! a pickup point in the middle of the gap. Screen coordinates, y grows down.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_engine::prelude::*;

/// Scene constants
pub mod tuning {
    /// Visible area width
    pub const SCREEN_WIDTH: f32 = 480.0;
    /// Visible area height
    pub const SCREEN_HEIGHT: f32 = 640.0;
    /// Top of the ground strip
    pub const GROUND_LEVEL: f32 = 560.0;
    /// Horizontal distance between consecutive columns
    pub const COLUMN_SPACING: f32 = 220.0;
    /// Column width
    pub const COLUMN_WIDTH: f32 = 64.0;
    /// Height of the gap the flyer passes through
    pub const GAP_HEIGHT: f32 = 170.0;
    /// Columns alive at once
    pub const COLUMN_COUNT: usize = 4;
    /// Scroll speed (negative: leftwards)
    pub const SCROLL_VELOCITY: f32 = -120.0;
    /// Flyer radius
    pub const FLYER_RADIUS: f32 = 12.0;
    /// Downward acceleration
    pub const GRAVITY: f32 = 900.0;
    /// Velocity set by a flap
    pub const FLAP_VELOCITY: f32 = -320.0;
    /// Pickup box half size, used for culling only
    pub const PICKUP_EXTENT: f32 = 4.0;
}

use tuning::*;

const FLYER_GROUP: CollisionGroup = 2;
const SCENERY_GROUP: CollisionGroup = 1;
const FLYER_ID: HullId = 1;

/// Errors raised while driving the scene
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Hull registration or transform failed
    #[error("collision error: {0}")]
    Collision(#[from] CollisionError),

    /// Culling index rejected an object
    #[error("quad tree error: {0}")]
    QuadTree(#[from] QuadTreeError),

    /// Settings could not be used
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Flyer,
    Obstacle,
    Pickup,
}

#[derive(Debug)]
struct Column {
    x: f32,
    gap_center: f32,
    upper: HullId,
    lower: HullId,
    pickup: Option<HullId>,
}

impl Column {
    fn upper_box(&self) -> AABB {
        AABB::new(
            Vec2::new(self.x - COLUMN_WIDTH * 0.5, 0.0),
            Vec2::new(self.x + COLUMN_WIDTH * 0.5, self.gap_center - GAP_HEIGHT * 0.5),
        )
    }

    fn lower_box(&self) -> AABB {
        AABB::new(
            Vec2::new(self.x - COLUMN_WIDTH * 0.5, self.gap_center + GAP_HEIGHT * 0.5),
            Vec2::new(self.x + COLUMN_WIDTH * 0.5, GROUND_LEVEL),
        )
    }

    fn pickup_position(&self) -> Vec2 {
        Vec2::new(self.x, self.gap_center)
    }
}

/// Totals gathered over a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SceneStats {
    /// Steps simulated
    pub steps: u32,
    /// Obstacle collisions reported
    pub obstacle_hits: u32,
    /// Pickups collected
    pub pickups: u32,
    /// Columns that scrolled off screen
    pub columns_passed: u32,
    /// Largest number of objects visible in a single step
    pub peak_visible: usize,
}

/// The running scene
pub struct Scene {
    collisions: CollisionManager,
    culling: QuadTree<HullId>,
    columns: Vec<Column>,
    roles: std::collections::HashMap<HullId, Role>,
    rng: StdRng,
    next_id: HullId,
    flyer_y: f32,
    flyer_velocity: f32,
    stats: SceneStats,
}

/// Unit square, scaled and placed by a transform every step
fn unit_square() -> Vec<Vec2> {
    vec![
        Vec2::new(-0.5, -0.5),
        Vec2::new(0.5, -0.5),
        Vec2::new(0.5, 0.5),
        Vec2::new(-0.5, 0.5),
    ]
}

fn box_transform(bounds: &AABB) -> Mat3 {
    Mat3::translation(bounds.center())
        * Mat3::new_nonuniform_scaling(&Vec2::new(bounds.width(), bounds.height()))
}

fn flyer_x() -> f32 {
    SCREEN_WIDTH * 0.3
}

/// Smallest grid cell that keeps the flyer and any column it touches in
/// neighbouring cells; hulls are bucketed by centroid only
pub fn min_cell_size() -> f32 {
    let tallest_column = GROUND_LEVEL - GAP_HEIGHT * 1.5;
    (tallest_column * 0.5).max(COLUMN_WIDTH * 0.5) + FLYER_RADIUS
}

impl Scene {
    /// Build the scene and spawn the first columns
    pub fn new(config: &SpatialConfig, seed: u64) -> Result<Self, SceneError> {
        config.validate()?;

        let mut culling = QuadTree::new(config.quad_tree.clone());
        let margin = COLUMN_SPACING;
        culling.create(AABB::new(
            Vec2::new(-margin, -margin),
            Vec2::new(SCREEN_WIDTH + COLUMN_SPACING * COLUMN_COUNT as f32 + margin, SCREEN_HEIGHT + margin),
        ));

        let mut grid = config.collision_grid.clone();
        if grid.cell_size < min_cell_size() {
            log::warn!(
                "Collision cell size {} too small for the columns, using {}",
                grid.cell_size,
                min_cell_size()
            );
            grid.cell_size = min_cell_size();
        }

        let mut scene = Self {
            collisions: CollisionManager::with_config(&grid)?,
            culling,
            columns: Vec::with_capacity(COLUMN_COUNT),
            roles: std::collections::HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
            next_id: FLYER_ID + 1,
            flyer_y: SCREEN_HEIGHT * 0.4,
            flyer_velocity: 0.0,
            stats: SceneStats::default(),
        };

        let flyer = Vec2::new(flyer_x(), scene.flyer_y);
        scene.collisions.register_circle(FLYER_ID, FLYER_GROUP, flyer, FLYER_RADIUS)?;
        scene.culling.insert_object(FLYER_ID, scene.flyer_box())?;
        scene.roles.insert(FLYER_ID, Role::Flyer);

        for index in 0..COLUMN_COUNT {
            scene.spawn_column(SCREEN_WIDTH + COLUMN_SPACING * index as f32)?;
        }

        log::info!("Scene ready: {} hulls, {} culled objects", scene.collisions.len(), scene.culling.len());
        Ok(scene)
    }

    fn allocate_id(&mut self) -> HullId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn flyer_box(&self) -> AABB {
        AABB::from_center_extents(Vec2::new(flyer_x(), self.flyer_y), Vec2::new(FLYER_RADIUS, FLYER_RADIUS))
    }

    fn spawn_column(&mut self, x: f32) -> Result<(), SceneError> {
        let lowest = GAP_HEIGHT;
        let highest = GROUND_LEVEL - GAP_HEIGHT;
        let gap_center = self.rng.gen_range(lowest..highest);

        let column = Column {
            x,
            gap_center,
            upper: self.allocate_id(),
            lower: self.allocate_id(),
            pickup: Some(self.allocate_id()),
        };

        for (id, bounds) in [(column.upper, column.upper_box()), (column.lower, column.lower_box())] {
            self.collisions.register_polygon(id, SCENERY_GROUP, unit_square())?;
            self.collisions.transform_object(id, &box_transform(&bounds))?;
            self.culling.insert_object(id, bounds)?;
            self.roles.insert(id, Role::Obstacle);
        }

        if let Some(pickup) = column.pickup {
            let position = column.pickup_position();
            self.collisions.register_point(pickup, SCENERY_GROUP, position)?;
            self.culling.insert_object(pickup, Self::pickup_box(position))?;
            self.roles.insert(pickup, Role::Pickup);
        }

        log::debug!("Spawned column at x={x:.1} with gap at y={gap_center:.1}");
        self.columns.push(column);
        Ok(())
    }

    fn pickup_box(position: Vec2) -> AABB {
        AABB::from_center_extents(position, Vec2::new(PICKUP_EXTENT, PICKUP_EXTENT))
    }

    fn despawn(&mut self, id: HullId) {
        self.collisions.unregister(id);
        self.culling.remove_object(&id);
        self.roles.remove(&id);
    }

    fn step_flyer(&mut self, dt: f32) -> Result<(), SceneError> {
        self.flyer_velocity += GRAVITY * dt;

        // flap when sinking below the next gap
        let target = self
            .columns
            .iter()
            .find(|column| column.x + COLUMN_WIDTH * 0.5 >= flyer_x())
            .map_or(SCREEN_HEIGHT * 0.5, |column| column.gap_center);
        if self.flyer_y > target + GAP_HEIGHT * 0.2 && self.flyer_velocity > 0.0 && self.rng.gen_bool(0.5) {
            self.flyer_velocity = FLAP_VELOCITY;
        }

        self.place_flyer(self.flyer_y + self.flyer_velocity * dt)
    }

    fn place_flyer(&mut self, y: f32) -> Result<(), SceneError> {
        let next = y.clamp(FLYER_RADIUS, GROUND_LEVEL - FLYER_RADIUS);
        let offset = next - self.flyer_y;
        self.flyer_y = next;

        self.collisions.move_object(FLYER_ID, Vec2::new(0.0, offset), false)?;
        self.culling.update_object(FLYER_ID, self.flyer_box())?;
        Ok(())
    }

    fn step_columns(&mut self, dt: f32) -> Result<(), SceneError> {
        let offset = SCROLL_VELOCITY * dt;

        for column in &mut self.columns {
            column.x += offset;
            for (id, bounds) in [(column.upper, column.upper_box()), (column.lower, column.lower_box())] {
                self.collisions.transform_object(id, &box_transform(&bounds))?;
                self.culling.update_object(id, bounds)?;
            }
            if let Some(pickup) = column.pickup {
                self.collisions.move_object(pickup, Vec2::new(offset, 0.0), false)?;
                self.culling.update_object(pickup, Self::pickup_box(column.pickup_position()))?;
            }
        }

        let deadline = -COLUMN_WIDTH;
        while self.columns.first().is_some_and(|column| column.x < deadline) {
            let column = self.columns.remove(0);
            for id in [column.upper, column.lower].into_iter().chain(column.pickup) {
                self.despawn(id);
            }
            self.stats.columns_passed += 1;

            let x = self.columns.last().map_or(SCREEN_WIDTH, |last| last.x) + COLUMN_SPACING;
            self.spawn_column(x)?;
        }
        Ok(())
    }

    fn resolve_collisions(&mut self) {
        let pairs = self.collisions.collided_pairs().to_vec();
        for pair in pairs {
            if !pair.involves(FLYER_ID) {
                continue;
            }
            let other = if pair.first == FLYER_ID { pair.second } else { pair.first };

            match self.roles.get(&other) {
                Some(Role::Obstacle) => {
                    self.stats.obstacle_hits += 1;
                    log::warn!("Flyer hit obstacle {other}");
                }
                Some(Role::Pickup) => {
                    self.stats.pickups += 1;
                    log::info!("Pickup {other} collected");
                    self.despawn(other);
                    for column in &mut self.columns {
                        if column.pickup == Some(other) {
                            column.pickup = None;
                        }
                    }
                }
                Some(Role::Flyer) | None => {}
            }
        }
    }

    fn count_visible(&self) -> usize {
        let screen = AABB::new(Vec2::zeros(), Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT));
        let mut visible = Vec::new();
        self.culling.query_rect(&screen, &mut visible);
        visible.len()
    }

    /// Advance the scene by `dt` seconds
    pub fn step(&mut self, dt: f32) -> Result<(), SceneError> {
        self.step_flyer(dt)?;
        self.step_columns(dt)?;

        self.collisions.update();
        self.resolve_collisions();

        let visible = self.count_visible();
        self.stats.peak_visible = self.stats.peak_visible.max(visible);
        self.stats.steps += 1;
        log::trace!("Step {}: {visible} visible objects", self.stats.steps);
        Ok(())
    }

    /// Totals so far
    pub fn stats(&self) -> SceneStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_spawns_columns() {
        let scene = Scene::new(&SpatialConfig::default(), 7).unwrap();
        assert_eq!(scene.columns.len(), COLUMN_COUNT);
        // flyer plus two obstacles and a pickup per column
        assert_eq!(scene.collisions.len(), 1 + COLUMN_COUNT * 3);
        assert_eq!(scene.culling.len(), scene.collisions.len());
    }

    #[test]
    fn test_columns_recycle() {
        let mut scene = Scene::new(&SpatialConfig::default(), 7).unwrap();
        for _ in 0..600 {
            scene.step(1.0 / 60.0).unwrap();
        }
        let stats = scene.stats();
        assert_eq!(stats.steps, 600);
        assert!(stats.columns_passed > 0);
        assert_eq!(scene.columns.len(), COLUMN_COUNT);
        assert!(stats.peak_visible > 0);
    }

    #[test]
    fn test_flyer_on_gap_edge_counts_hit() {
        let mut scene = Scene::new(&SpatialConfig::default(), 11).unwrap();
        scene.columns[0].x = flyer_x();
        scene.step_columns(0.0).unwrap();

        let edge = scene.columns[0].upper_box().max.y;
        scene.place_flyer(edge + FLYER_RADIUS * 0.5).unwrap();
        scene.collisions.update();
        scene.resolve_collisions();

        assert_eq!(scene.stats().obstacle_hits, 1);
    }

    #[test]
    fn test_tallest_column_fits_neighbourhood() {
        // flyer on the gap edge of the tallest possible upper column
        let mut manager = CollisionManager::new();
        let grid = GridConfig {
            cell_size: min_cell_size(),
            ..GridConfig::default()
        };
        let mut manager_sized = CollisionManager::with_config(&grid).unwrap();

        let column = Column {
            x: 100.0,
            gap_center: GROUND_LEVEL - GAP_HEIGHT,
            upper: 2,
            lower: 3,
            pickup: None,
        };
        let bounds = column.upper_box();
        let flyer = Vec2::new(column.x, bounds.max.y + FLYER_RADIUS * 0.5);

        for collisions in [&mut manager, &mut manager_sized] {
            collisions.register_polygon(2, SCENERY_GROUP, unit_square()).unwrap();
            collisions.transform_object(2, &box_transform(&bounds)).unwrap();
            collisions.register_circle(FLYER_ID, FLYER_GROUP, flyer, FLYER_RADIUS).unwrap();
            collisions.update();
        }

        assert!(manager.collided_pairs().is_empty());
        assert_eq!(manager_sized.collided_pairs(), &[CollisionPair::new(FLYER_ID, 2)]);
    }

    #[test]
    fn test_obstacle_hull_matches_box() {
        let scene = Scene::new(&SpatialConfig::default(), 3).unwrap();
        let column = &scene.columns[0];
        let bounds = column.upper_box();

        let hull = scene.collisions.hull(column.upper).unwrap();
        assert!((hull.position() - bounds.center()).norm() < 1e-3);
    }
}
