//! A single quadtree node.

use super::QuadItem;
use crate::shape::{Rectangle, Shape};

/// A node of the region quadtree.
///
/// A node is either a leaf holding items, or split into exactly four
/// children with no items of its own.
#[derive(Debug)]
pub struct QuadTreeNode {
    bounds: Rectangle,
    capacity: usize,
    max_depth: u32,
    depth: u32,
    items: Vec<QuadItem>,
    children: Option<Box<[QuadTreeNode; 4]>>,
}

impl QuadTreeNode {
    pub fn new(bounds: Rectangle, capacity: usize, max_depth: u32, depth: u32) -> Self {
        Self {
            bounds,
            capacity,
            max_depth,
            depth,
            items: Vec::with_capacity(capacity.min(64)),
            children: None,
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Rectangle {
        &self.bounds
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_split(&self) -> bool {
        self.children.is_some()
    }

    /// Items stored directly in this node (always empty once split).
    #[inline]
    pub fn items(&self) -> &[QuadItem] {
        &self.items
    }

    pub fn children(&self) -> Option<&[QuadTreeNode; 4]> {
        self.children.as_deref()
    }

    #[inline]
    fn overlaps(&self, shape: &Shape) -> bool {
        Shape::Rectangle(self.bounds).collides(shape)
    }

    /// Store `item` in every leaf it overlaps.
    ///
    /// Returns false when the item lies entirely outside this node.
    pub fn insert(&mut self, item: QuadItem) -> bool {
        if !self.overlaps(&item.shape) {
            return false;
        }

        if self.children.is_none() {
            if self.items.len() < self.capacity || self.depth >= self.max_depth {
                self.items.push(item);
                return true;
            }
            self.split();
        }

        self.insert_into_children(item)
    }

    fn insert_into_children(&mut self, item: QuadItem) -> bool {
        let Some(children) = self.children.as_deref_mut() else {
            return false;
        };
        // Every child must see the item, so no short-circuiting here.
        let mut accepted = false;
        for child in children.iter_mut() {
            accepted |= child.insert(item);
        }
        accepted
    }

    /// Create the four quadrants and move this node's items into them.
    fn split(&mut self) {
        let depth = self.depth + 1;
        let [q0, q1, q2, q3] = self.bounds.quadrants();
        self.children = Some(Box::new([
            QuadTreeNode::new(q0, self.capacity, self.max_depth, depth),
            QuadTreeNode::new(q1, self.capacity, self.max_depth, depth),
            QuadTreeNode::new(q2, self.capacity, self.max_depth, depth),
            QuadTreeNode::new(q3, self.capacity, self.max_depth, depth),
        ]));

        for item in std::mem::take(&mut self.items) {
            self.insert_into_children(item);
        }
    }

    /// Remove the item with `item.id`, using its stored shape to find the
    /// leaves that hold it.
    pub fn remove(&mut self, item: &QuadItem) -> bool {
        if !self.overlaps(&item.shape) {
            return false;
        }

        if let Some(pos) = self.items.iter().position(|stored| stored.id == item.id) {
            self.items.swap_remove(pos);
            return true;
        }

        let Some(children) = self.children.as_deref_mut() else {
            return false;
        };
        let mut removed = false;
        for child in children.iter_mut() {
            removed |= child.remove(item);
        }
        removed
    }

    /// Append every stored item that collides with `shape` to `out`.
    ///
    /// Items stored in several leaves are appended once per leaf.
    pub fn query(&self, shape: &Shape, out: &mut Vec<QuadItem>) {
        if !self.overlaps(shape) {
            return;
        }

        match self.children.as_deref() {
            Some(children) => {
                for child in children {
                    child.query(shape, out);
                }
            }
            None => {
                out.extend(self.items.iter().filter(|item| shape.collides(&item.shape)));
            }
        }
    }

    /// Drop all items and children.
    pub fn clear(&mut self) {
        self.items.clear();
        self.children = None;
    }

    /// Number of stored entries, counting duplicates across leaves.
    pub fn entry_count(&self) -> usize {
        self.items.len()
            + self
                .children()
                .map(|children| children.iter().map(QuadTreeNode::entry_count).sum())
                .unwrap_or(0)
    }
}
