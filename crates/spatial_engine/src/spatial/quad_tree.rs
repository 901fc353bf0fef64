//! Quad tree spatial index
//!
//! Facade over a [`NodePool`]: owns the root node and a key → node lookup
//! table, so removing or moving an object never has to search the tree.
//! Used by the scene layer for visibility culling and point picking.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::foundation::geometry::AABB;
use crate::foundation::math::Vec2;
use crate::spatial::key_policy::{IdentityKey, KeyPolicy};
use crate::spatial::quad_tree_node::{NodeKey, NodePool};

/// Configuration for quad tree behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Maximum subdivision depth; nodes at this depth keep everything they accept
    pub max_depth: u32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}

impl QuadTreeConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("quad_tree.max_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Reasons an object could not be inserted
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadTreeError {
    /// `create` has not been called, or the tree was destroyed
    #[error("Quad tree has no root node")]
    NotCreated,

    /// Zero width or zero height box
    #[error("Object box has zero width or height")]
    DegenerateBounds,

    /// Box not contained by the world area
    #[error("Object box lies outside the world area")]
    OutOfBounds,

    /// An equal object already sits in the node that would store this one
    #[error("Object is already stored in its target node")]
    DuplicateObject,

    /// The lookup table already holds the object's key
    #[error("Object key is already indexed")]
    DuplicateKey,
}

/// Quad tree spatial partitioning structure
///
/// `P` derives the lookup key from a payload; by default the payload is its
/// own key.
pub struct QuadTree<T, P = IdentityKey>
where
    P: KeyPolicy<T>,
{
    pool: NodePool<T>,
    root: Option<NodeKey>,
    lookup: HashMap<P::Key, NodeKey>,
    key_policy: P,
}

impl<T> QuadTree<T>
where
    T: Clone + Eq + Hash,
{
    /// Create an empty tree keyed by the payload itself
    pub fn new(config: QuadTreeConfig) -> Self {
        Self::with_key_policy(config, IdentityKey)
    }
}

impl<T, P> QuadTree<T, P>
where
    P: KeyPolicy<T>,
{
    /// Create an empty tree with a custom key policy
    ///
    /// No root exists until [`create`](Self::create) is called.
    pub fn with_key_policy(config: QuadTreeConfig, key_policy: P) -> Self {
        Self {
            pool: NodePool::new(config.max_depth),
            root: None,
            lookup: HashMap::new(),
            key_policy,
        }
    }

    /// Discard any previous tree and start a fresh one covering `world_area`
    pub fn create(&mut self, world_area: AABB) {
        log::info!(
            "QuadTree::create [world area: ({:.2}, {:.2}) - ({:.2}, {:.2})]",
            world_area.min.x, world_area.min.y, world_area.max.x, world_area.max.y
        );

        self.destroy();

        let root = self.pool.create_node(AABB::default(), 0);
        self.pool.set_bounds(root, world_area);
        self.root = Some(root);
    }

    /// Release every node and clear the lookup table
    pub fn destroy(&mut self) {
        if let Some(root) = self.root.take() {
            log::info!("QuadTree::destroy [{} nodes, {} objects]", self.pool.len(), self.lookup.len());
            self.pool.release(root);
        }
        self.lookup.clear();
    }

    /// Remove every stored object, keeping the node structure
    ///
    /// The lookup table is cleared too, so every object can be inserted again.
    pub fn remove_all_objects(&mut self) {
        if let Some(root) = self.root {
            self.pool.remove_all_objects(root);
        }
        self.lookup.clear();
    }

    /// Number of indexed objects
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// True when no object is indexed
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Box passed to the last `create`, None before it
    pub fn world_bounds(&self) -> Option<AABB> {
        self.root.and_then(|root| self.pool.get(root)).map(|node| node.bounds())
    }

    /// Number of allocated nodes
    pub fn node_count(&self) -> usize {
        self.pool.len()
    }

    /// Check whether an object with the same key is indexed
    pub fn contains(&self, object: &T) -> bool {
        self.lookup.contains_key(&self.key_policy.key_of(object))
    }

    /// Direct access to the node arena (for visualization, etc.)
    pub fn nodes(&self) -> &NodePool<T> {
        &self.pool
    }

    /// Handle of the root node
    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }
}

impl<T, P> QuadTree<T, P>
where
    T: PartialEq,
    P: KeyPolicy<T>,
{
    /// Insert an object with its box
    ///
    /// Nothing changes when an error is returned.
    pub fn insert_object(&mut self, object: T, bounds: AABB) -> Result<(), QuadTreeError> {
        if bounds.is_degenerate() {
            log::warn!("could not insert zero sized object");
            return Err(QuadTreeError::DegenerateBounds);
        }
        let root = self.root.ok_or(QuadTreeError::NotCreated)?;

        let key = self.key_policy.key_of(&object);
        if self.lookup.contains_key(&key) {
            log::warn!("object key already indexed, insert skipped");
            return Err(QuadTreeError::DuplicateKey);
        }

        match self.pool.insert_object(root, object, bounds) {
            Ok(node) => {
                self.lookup.insert(key, node);
                Ok(())
            }
            Err(_) => {
                let fits_world = self.world_bounds().is_some_and(|world| world.contains(&bounds));
                if fits_world {
                    Err(QuadTreeError::DuplicateObject)
                } else {
                    log::warn!(
                        "object box ({:.2}, {:.2}) - ({:.2}, {:.2}) outside world area",
                        bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
                    );
                    Err(QuadTreeError::OutOfBounds)
                }
            }
        }
    }

    /// Remove an object; false when its key was never indexed
    pub fn remove_object(&mut self, object: &T) -> bool {
        let key = self.key_policy.key_of(object);
        match self.lookup.remove(&key) {
            Some(node) => self.pool.remove_object(node, object),
            None => false,
        }
    }

    /// Move an object to a new box (remove, then insert)
    ///
    /// On error the object stays where it was.
    pub fn update_object(&mut self, object: T, bounds: AABB) -> Result<(), QuadTreeError> {
        if bounds.is_degenerate() {
            log::warn!("could not move object to a zero sized box");
            return Err(QuadTreeError::DegenerateBounds);
        }
        let root = self.root.ok_or(QuadTreeError::NotCreated)?;
        if !self.world_bounds().is_some_and(|world| world.contains(&bounds)) {
            log::warn!(
                "object box ({:.2}, {:.2}) - ({:.2}, {:.2}) outside world area, update skipped",
                bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
            );
            return Err(QuadTreeError::OutOfBounds);
        }

        let key = self.key_policy.key_of(&object);
        let previous = self
            .lookup
            .get(&key)
            .and_then(|&node| self.pool.get(node))
            .and_then(|node| node.items().iter().find(|item| item.object == object))
            .map(|item| item.bounds);
        if !self.remove_object(&object) {
            log::trace!("update_object: object was not indexed before");
        }

        match self.pool.insert_object(root, object, bounds) {
            Ok(node) => {
                self.lookup.insert(key, node);
                Ok(())
            }
            Err(object) => {
                // an equal object already sits in the target node; put this one back
                if let Some(node) = previous.and_then(|old| self.pool.insert_object(root, object, old).ok()) {
                    self.lookup.insert(key, node);
                }
                Err(QuadTreeError::DuplicateObject)
            }
        }
    }
}

impl<T, P> QuadTree<T, P>
where
    T: Clone,
    P: KeyPolicy<T>,
{
    /// Collect objects whose box overlaps `query`
    pub fn query_rect(&self, query: &AABB, out: &mut Vec<T>) {
        if let Some(root) = self.root {
            self.pool.query_rect(root, query, out);
        }
    }

    /// Collect objects whose box contains `point`
    pub fn query_point(&self, point: Vec2, out: &mut Vec<T>) {
        if let Some(root) = self.root {
            self.pool.query_point(root, point, out);
        }
    }

    /// Collect every stored object
    pub fn query_all(&self, out: &mut Vec<T>) {
        if let Some(root) = self.root {
            self.pool.collect_all(root, out);
        }
    }
}
