//! Collision manager
//!
//! Owns every registered hull, keeps the broad-phase grid in sync with hull
//! positions and reports pairs whose overlap began during the latest
//! [`CollisionManager::update`].

use std::collections::{BTreeMap, HashSet};

use super::cell_grid::{BroadPhaseGrid, CellGrid, GridConfig, NEIGHBOURHOOD_SIZE};
use super::collision_hull::{
    CircleHull, CollisionGroup, CollisionHull, HullId, HullShape, PointHull, PolygonHull,
};
use super::narrow_phase;
use crate::config::ConfigError;
use crate::foundation::math::{Mat3, Vec2};

/// Collision manager errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// Id zero is reserved
    #[error("Hull id must be positive")]
    InvalidId,

    /// Group zero is reserved
    #[error("Collision group must be positive")]
    InvalidGroup,

    /// Id already registered
    #[error("Hull {0} is already registered")]
    DuplicateId(HullId),

    /// Id not registered
    #[error("Hull {0} is not registered")]
    UnknownId(HullId),

    /// Radius or vertex list unusable
    #[error("Invalid hull geometry: {0}")]
    InvalidGeometry(String),
}

/// Unordered pair of hull ids, stored larger id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// Larger id
    pub first: HullId,
    /// Smaller id
    pub second: HullId,
}

impl CollisionPair {
    /// Canonical pair for two ids in either order
    pub fn new(a: HullId, b: HullId) -> Self {
        Self {
            first: a.max(b),
            second: a.min(b),
        }
    }

    /// Order-independent 64-bit key: larger id in the high half
    pub fn hash_key(&self) -> u64 {
        (u64::from(self.first) << 32) | u64::from(self.second)
    }

    /// Whether `id` is one of the two members
    pub fn involves(&self, id: HullId) -> bool {
        self.first == id || self.second == id
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_hash_key(key: u64) -> Self {
        Self {
            first: (key >> 32) as HullId,
            second: key as HullId,
        }
    }
}

impl From<CollisionPair> for (HullId, HullId) {
    fn from(pair: CollisionPair) -> Self {
        (pair.first, pair.second)
    }
}

/// Registry of collision hulls with per-step onset detection
pub struct CollisionManager {
    grid: Box<dyn BroadPhaseGrid>,
    hulls: BTreeMap<HullId, CollisionHull>,
    overlapping: HashSet<u64>,
    pairs: Vec<CollisionPair>,
}

impl CollisionManager {
    /// Manager with the default grid
    pub fn new() -> Self {
        Self::with_grid(Box::new(CellGrid::default()))
    }

    /// Manager with a grid built from `config`
    pub fn with_config(config: &GridConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_grid(Box::new(CellGrid::new(config.clone())?)))
    }

    /// Manager using a caller-supplied broad phase
    pub fn with_grid(grid: Box<dyn BroadPhaseGrid>) -> Self {
        Self {
            grid,
            hulls: BTreeMap::new(),
            overlapping: HashSet::new(),
            pairs: Vec::new(),
        }
    }

    fn check_registration(&self, id: HullId, group: CollisionGroup) -> Result<(), CollisionError> {
        if id == 0 {
            return Err(CollisionError::InvalidId);
        }
        if group == 0 {
            return Err(CollisionError::InvalidGroup);
        }
        if self.hulls.contains_key(&id) {
            log::warn!("Rejected registration of hull {id}: id already in use");
            return Err(CollisionError::DuplicateId(id));
        }
        Ok(())
    }

    fn register(&mut self, id: HullId, group: CollisionGroup, shape: HullShape) {
        log::debug!("Registered {:?} hull {id} in group {group}", shape.kind());
        self.grid.place(shape.position(), id);
        self.hulls.insert(id, CollisionHull::new(id, group, shape));
    }

    /// Register a point hull
    pub fn register_point(&mut self, id: HullId, group: CollisionGroup, position: Vec2) -> Result<(), CollisionError> {
        self.check_registration(id, group)?;
        self.register(id, group, HullShape::Point(PointHull::new(position)));
        Ok(())
    }

    /// Register a circle hull; the radius must be positive
    pub fn register_circle(
        &mut self,
        id: HullId,
        group: CollisionGroup,
        center: Vec2,
        radius: f32,
    ) -> Result<(), CollisionError> {
        self.check_registration(id, group)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(CollisionError::InvalidGeometry(format!("circle radius {radius}")));
        }
        self.register(id, group, HullShape::Circle(CircleHull::new(center, radius)));
        Ok(())
    }

    /// Register a convex polygon hull with at least three vertices
    pub fn register_polygon(
        &mut self,
        id: HullId,
        group: CollisionGroup,
        vertices: Vec<Vec2>,
    ) -> Result<(), CollisionError> {
        self.check_registration(id, group)?;
        if vertices.len() < 3 {
            return Err(CollisionError::InvalidGeometry(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        self.register(id, group, HullShape::Polygon(PolygonHull::new(vertices)));
        Ok(())
    }

    /// Remove a hull; returns false if the id was not registered
    pub fn unregister(&mut self, id: HullId) -> bool {
        if self.hulls.remove(&id).is_none() {
            return false;
        }
        self.grid.remove(id);
        self.overlapping.retain(|&key| !CollisionPair::from_hash_key(key).involves(id));
        log::debug!("Unregistered hull {id}");
        true
    }

    fn with_hull_mut(&mut self, id: HullId, change: impl FnOnce(&mut CollisionHull)) -> Result<(), CollisionError> {
        let Some(hull) = self.hulls.get_mut(&id) else {
            log::warn!("Hull {id} is not registered");
            return Err(CollisionError::UnknownId(id));
        };
        change(hull);
        self.grid.place(hull.position(), id);
        Ok(())
    }

    /// Translate a hull; absolute offsets apply to its initial geometry
    pub fn move_object(&mut self, id: HullId, offset: Vec2, absolute: bool) -> Result<(), CollisionError> {
        self.with_hull_mut(id, |hull| hull.move_object(offset, absolute))
    }

    /// Rotate a hull about the world origin (degrees, counter-clockwise)
    pub fn rotate_object(&mut self, id: HullId, degrees: f32, absolute: bool) -> Result<(), CollisionError> {
        self.with_hull_mut(id, |hull| hull.rotate_object(degrees, absolute))
    }

    /// Set a hull's current geometry to `matrix` applied to its initial geometry
    pub fn transform_object(&mut self, id: HullId, matrix: &Mat3) -> Result<(), CollisionError> {
        self.with_hull_mut(id, |hull| hull.transform_object(matrix))
    }

    /// Run one detection step
    ///
    /// Pairs whose overlap starts in this step are collected into
    /// [`collided_pairs`](Self::collided_pairs). A pair that keeps
    /// overlapping is not reported again until it has separated once.
    pub fn update(&mut self) {
        self.pairs.clear();

        let mut closed: HashSet<HullId> = HashSet::with_capacity(self.hulls.len());
        let mut evaluated: HashSet<u64> = HashSet::new();

        for (&id_a, hull_a) in &self.hulls {
            let cell = self.grid.cell_at(hull_a.position());

            for index in 0..NEIGHBOURHOOD_SIZE {
                let Some(neighbour) = self.grid.sibling(cell, index) else {
                    continue;
                };

                for &id_b in self.grid.objects_in(neighbour) {
                    if id_b == id_a || closed.contains(&id_b) {
                        continue;
                    }
                    let Some(hull_b) = self.hulls.get(&id_b) else {
                        continue;
                    };
                    if hull_a.group() == hull_b.group() {
                        continue;
                    }

                    let pair = CollisionPair::new(id_a, id_b);
                    let key = pair.hash_key();
                    evaluated.insert(key);

                    if narrow_phase::intersects(hull_a.shape(), hull_b.shape()) {
                        if self.overlapping.insert(key) {
                            log::debug!("Collision began between {} and {}", pair.first, pair.second);
                            self.pairs.push(pair);
                        }
                    } else {
                        self.overlapping.remove(&key);
                    }
                }
            }

            closed.insert(id_a);
        }

        // pairs that drifted out of range separated without being tested
        self.overlapping.retain(|key| evaluated.contains(key));
    }

    /// Pairs that started overlapping during the latest update
    pub fn collided_pairs(&self) -> &[CollisionPair] {
        &self.pairs
    }

    /// Whether a pair is currently remembered as overlapping
    pub fn is_overlapping(&self, a: HullId, b: HullId) -> bool {
        self.overlapping.contains(&CollisionPair::new(a, b).hash_key())
    }

    /// Narrow-phase test between two registered hulls, ignoring groups
    pub fn intersects(&self, a: HullId, b: HullId) -> Result<bool, CollisionError> {
        let hull_a = self.hulls.get(&a).ok_or(CollisionError::UnknownId(a))?;
        let hull_b = self.hulls.get(&b).ok_or(CollisionError::UnknownId(b))?;
        Ok(narrow_phase::intersects(hull_a.shape(), hull_b.shape()))
    }

    /// Look up a hull
    pub fn hull(&self, id: HullId) -> Option<&CollisionHull> {
        self.hulls.get(&id)
    }

    /// All hulls in id order
    pub fn hulls(&self) -> impl Iterator<Item = &CollisionHull> {
        self.hulls.values()
    }

    /// Number of registered hulls
    pub fn len(&self) -> usize {
        self.hulls.len()
    }

    /// Whether no hulls are registered
    pub fn is_empty(&self) -> bool {
        self.hulls.is_empty()
    }

    /// Drop every hull and all overlap state
    pub fn clear(&mut self) {
        self.grid.clear();
        self.hulls.clear();
        self.overlapping.clear();
        self.pairs.clear();
    }
}

impl Default for CollisionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CollisionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionManager")
            .field("hulls", &self.hulls.len())
            .field("overlapping", &self.overlapping.len())
            .field("pairs", &self.pairs)
            .finish()
    }
}
