//! Spatial indexing.
//!
//! A region quadtree over the board. Leaves hold up to `capacity` items and
//! split into four quadrants when they overflow; an item straddling a
//! quadrant border is stored in every quadrant it touches.

mod node;
mod quadtree;

pub use node::QuadTreeNode;
pub use quadtree::{QuadItem, QuadTree, ShapeKind};
