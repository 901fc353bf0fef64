//! Spatial partitioning data structures
//!
//! Provides a region quad tree for visibility culling and picking in 2D
//! space. Objects are stored in the deepest node whose box wholly contains
//! them; a key lookup table gives O(1) removal.

mod key_policy;
mod quad_tree;
mod quad_tree_node;

pub use key_policy::{IdentityKey, KeyFn, KeyPolicy};
pub use quad_tree::{QuadTree, QuadTreeConfig, QuadTreeError};
pub use quad_tree_node::{NodeKey, NodePool, QuadTreeItem, QuadTreeNode, Quadrant};
