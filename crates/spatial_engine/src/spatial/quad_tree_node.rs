//! Quad tree nodes and the arena that owns them
//!
//! Nodes live in a slot map so the tree's lookup table can point straight at
//! the node holding an object. A node is either a leaf or has exactly four
//! children created together; its own item list only keeps objects that do
//! not fit wholly inside any single child.

use crate::foundation::geometry::AABB;
use crate::foundation::math::Vec2;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to a node inside a [`NodePool`]
    pub struct NodeKey;
}

/// Child slot of a subdivided node, in insertion-attempt order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Top-left quarter
    NorthWest = 0,
    /// Top-right quarter
    NorthEast = 1,
    /// Bottom-right quarter
    SouthEast = 2,
    /// Bottom-left quarter
    SouthWest = 3,
}

impl Quadrant {
    /// All quadrants in insertion-attempt order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthEast,
        Quadrant::SouthWest,
    ];
}

/// An object stored in a node together with its box
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTreeItem<T> {
    /// The stored payload
    pub object: T,
    /// Box the payload was inserted with
    pub bounds: AABB,
}

/// Single node in the quad tree hierarchy
#[derive(Debug, Clone)]
pub struct QuadTreeNode<T> {
    bounds: AABB,
    depth: u32,
    children: Option<[NodeKey; 4]>,
    items: Vec<QuadTreeItem<T>>,
}

impl<T> QuadTreeNode<T> {
    fn new(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            children: None,
            items: Vec::new(),
        }
    }

    /// World-space bounds of this node
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Child handle for a quadrant, None on leaves
    pub fn child(&self, quadrant: Quadrant) -> Option<NodeKey> {
        self.children.map(|children| children[quadrant as usize])
    }

    /// Objects stored directly in this node
    pub fn items(&self) -> &[QuadTreeItem<T>] {
        &self.items
    }
}

/// Arena owning every node of one tree
#[derive(Debug, Clone)]
pub struct NodePool<T> {
    nodes: SlotMap<NodeKey, QuadTreeNode<T>>,
    max_depth: u32,
}

impl<T> NodePool<T> {
    /// Create an empty pool; nodes at `max_depth` never subdivide
    pub fn new(max_depth: u32) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            max_depth,
        }
    }

    /// Allocate a detached leaf node
    pub fn create_node(&mut self, bounds: AABB, depth: u32) -> NodeKey {
        self.nodes.insert(QuadTreeNode::new(bounds, depth))
    }

    /// Look up a node
    pub fn get(&self, key: NodeKey) -> Option<&QuadTreeNode<T>> {
        self.nodes.get(key)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node is allocated
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Maximum subdivision depth
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Free every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Free a node and its whole subtree
    pub fn release(&mut self, key: NodeKey) {
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                if let Some(children) = node.children {
                    pending.extend(children);
                }
            }
        }
    }

    /// Assign a node's box, recomputing the quadrant boxes of any children
    pub fn set_bounds(&mut self, key: NodeKey, bounds: AABB) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.bounds = bounds;
        let children = node.children;

        if let Some(children) = children {
            for (child, quadrant) in children.into_iter().zip(bounds.quadrants()) {
                self.set_bounds(child, quadrant);
            }
        }
    }

    fn subdivide(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if node.children.is_some() || node.depth >= self.max_depth {
            return;
        }
        let (bounds, depth) = (node.bounds, node.depth);

        log::trace!("subdividing node at depth {}", depth);
        let children: [NodeKey; 4] =
            std::array::from_fn(|_| self.nodes.insert(QuadTreeNode::new(AABB::default(), depth + 1)));
        if let Some(node) = self.nodes.get_mut(key) {
            node.children = Some(children);
        }
        self.set_bounds(key, bounds);
    }

    /// Remove every object from a node and its descendants
    pub fn remove_all_objects(&mut self, key: NodeKey) {
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(next) {
                node.items.clear();
                if let Some(children) = node.children {
                    pending.extend(children);
                }
            }
        }
    }
}

impl<T: PartialEq> NodePool<T> {
    /// Insert an object into the subtree rooted at `key`
    ///
    /// Returns the node that now holds the object, or hands the object back
    /// when the box does not fit this node or an equal object already sits in
    /// the node that would have stored it.
    ///
    /// Leaves above `max_depth` never hold items, so a node split by this
    /// call has an empty list and always accepts the object. A rejected
    /// insert therefore never leaves new nodes behind.
    pub fn insert_object(&mut self, key: NodeKey, object: T, bounds: AABB) -> Result<NodeKey, T> {
        let Some(node) = self.nodes.get(key) else {
            return Err(object);
        };
        if !node.bounds.contains(&bounds) {
            return Err(object);
        }
        if node.is_leaf() {
            self.subdivide(key);
        }

        let mut object = object;
        let children = self.nodes.get(key).and_then(|node| node.children);
        if let Some(children) = children {
            for child in children {
                match self.insert_object(child, object, bounds) {
                    Ok(owner) => return Ok(owner),
                    Err(rejected) => object = rejected,
                }
            }
        }

        let Some(node) = self.nodes.get_mut(key) else {
            return Err(object);
        };
        if node.items.iter().any(|item| item.object == object) {
            log::trace!("object already stored in node at depth {}", node.depth);
            return Err(object);
        }

        node.items.push(QuadTreeItem { object, bounds });
        Ok(key)
    }

    /// Remove an object from this node's own item list (children untouched)
    pub fn remove_object(&mut self, key: NodeKey, object: &T) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        if let Some(index) = node.items.iter().position(|item| item.object == *object) {
            node.items.remove(index);
            return true;
        }
        false
    }
}

impl<T: Clone> NodePool<T> {
    /// Collect every object of a node and its descendants
    pub fn collect_all(&self, key: NodeKey, out: &mut Vec<T>) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        out.extend(node.items.iter().map(|item| item.object.clone()));

        if let Some(children) = node.children {
            for child in children {
                self.collect_all(child, out);
            }
        }
    }

    /// Collect objects whose box overlaps the query box
    pub fn query_rect(&self, key: NodeKey, query: &AABB, out: &mut Vec<T>) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };

        // Whole node covered: take everything below without testing
        if query.contains(&node.bounds) {
            self.collect_all(key, out);
            return;
        }

        if !node.bounds.intersects(query) && !node.bounds.contains(query) {
            return;
        }

        out.extend(
            node.items
                .iter()
                .filter(|item| {
                    query.contains(&item.bounds)
                        || item.bounds.contains(query)
                        || query.intersects(&item.bounds)
                })
                .map(|item| item.object.clone()),
        );

        if let Some(children) = node.children {
            for child in children {
                self.query_rect(child, query, out);
            }
        }
    }

    /// Collect objects whose box contains the point
    pub fn query_point(&self, key: NodeKey, point: Vec2, out: &mut Vec<T>) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if !node.bounds.contains_point(point) {
            return;
        }

        out.extend(
            node.items
                .iter()
                .filter(|item| item.bounds.contains_point(point))
                .map(|item| item.object.clone()),
        );

        if let Some(children) = node.children {
            for child in children {
                self.query_point(child, point, out);
            }
        }
    }
}
