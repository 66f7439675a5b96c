//! Region quadtree over every shape on the board.
//!
//! Besides answering overlap queries, the root records which items were
//! inserted and removed since the last drain. The room turns those two
//! lists into the per-tick diff sent to clients.

use super::QuadTreeNode;
use crate::entity::PlayerId;
use crate::shape::{Rectangle, Shape, ShapeId};

/// What a stored shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// An uncollected power-up pickup.
    PowerUp,
    /// One trail segment of `owner`.
    Tail { owner: PlayerId },
    /// A player's head.
    Player(PlayerId),
}

impl ShapeKind {
    /// Query results are ordered power-ups first, then tails, then heads.
    #[inline]
    pub fn rank(&self) -> u8 {
        match self {
            ShapeKind::PowerUp => 0,
            ShapeKind::Tail { .. } => 1,
            ShapeKind::Player(_) => 2,
        }
    }
}

/// An entry of the quadtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadItem {
    pub id: ShapeId,
    pub shape: Shape,
    pub kind: ShapeKind,
}

impl QuadItem {
    pub fn new(id: ShapeId, shape: impl Into<Shape>, kind: ShapeKind) -> Self {
        Self {
            id,
            shape: shape.into(),
            kind,
        }
    }
}

/// Quadtree root with insertion and removal tracking.
#[derive(Debug)]
pub struct QuadTree {
    root: QuadTreeNode,
    inserted: Vec<QuadItem>,
    removed: Vec<QuadItem>,
}

impl QuadTree {
    pub fn new(bounds: Rectangle, capacity: usize, max_depth: u32) -> Self {
        Self {
            root: QuadTreeNode::new(bounds, capacity.max(1), max_depth, 0),
            inserted: Vec::new(),
            removed: Vec::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Rectangle {
        self.root.bounds()
    }

    #[inline]
    pub fn root(&self) -> &QuadTreeNode {
        &self.root
    }

    /// Insert an item. Items entirely outside the bounds are rejected and
    /// not recorded.
    pub fn insert(&mut self, item: QuadItem) -> bool {
        let stored = self.root.insert(item);
        if stored {
            self.inserted.push(item);
        }
        stored
    }

    /// Remove an item by id.
    ///
    /// An item inserted and removed before the next drain cancels out and
    /// appears in neither list.
    pub fn remove(&mut self, item: &QuadItem) -> bool {
        let found = self.root.remove(item);
        if found {
            if let Some(pos) = self.inserted.iter().position(|i| i.id == item.id) {
                self.inserted.remove(pos);
            } else {
                self.removed.push(*item);
            }
        }
        found
    }

    /// Every distinct item overlapping `shape`, power-ups first, then
    /// tails, then heads, each group by ascending id.
    pub fn query(&self, shape: &Shape) -> Vec<QuadItem> {
        let mut hits = Vec::new();
        self.root.query(shape, &mut hits);
        hits.sort_by_key(|item| (item.kind.rank(), item.id));
        hits.dedup_by_key(|item| item.id);
        hits
    }

    /// Take the items inserted since the last call.
    pub fn drain_inserted(&mut self) -> Vec<QuadItem> {
        std::mem::take(&mut self.inserted)
    }

    /// Take the items removed since the last call.
    pub fn drain_removed(&mut self) -> Vec<QuadItem> {
        std::mem::take(&mut self.removed)
    }

    /// Empty the tree and forget pending changes.
    pub fn clear(&mut self) {
        self.root.clear();
        self.inserted.clear();
        self.removed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Circle, Line};
    use glam::Vec2;

    fn tree() -> QuadTree {
        QuadTree::new(Rectangle::new(0.0, 0.0, 800.0, 800.0), 4, 5)
    }

    fn segment(id: u32, x: f32) -> QuadItem {
        QuadItem::new(
            ShapeId(id),
            Line::new(Vec2::new(x, 100.0), Vec2::new(x, 110.0), 3.0),
            ShapeKind::Tail { owner: PlayerId(1) },
        )
    }

    #[test]
    fn test_query_finds_inserted_shape() {
        let mut t = tree();
        for id in 0..40 {
            assert!(t.insert(segment(id, 10.0 + id as f32 * 15.0)));
        }
        for id in 0..40 {
            let item = segment(id, 10.0 + id as f32 * 15.0);
            let hits = t.query(&item.shape);
            assert!(hits.iter().any(|hit| hit.id == item.id), "segment {id}");
        }
    }

    #[test]
    fn test_query_deduplicates_and_orders() {
        let mut t = tree();
        for id in 0..10 {
            t.insert(segment(id, 395.0 + id as f32));
        }
        let head = QuadItem::new(
            ShapeId(50),
            Circle::new(Vec2::new(400.0, 105.0), 3.0),
            ShapeKind::Player(PlayerId(2)),
        );
        let pickup = QuadItem::new(
            ShapeId(60),
            Circle::new(Vec2::new(400.0, 105.0), 10.0),
            ShapeKind::PowerUp,
        );
        t.insert(head);
        t.insert(pickup);

        let hits = t.query(&Shape::Circle(Circle::new(Vec2::new(400.0, 105.0), 20.0)));
        assert_eq!(hits.len(), 12);
        assert_eq!(hits[0].kind, ShapeKind::PowerUp);
        assert_eq!(hits[11].kind, ShapeKind::Player(PlayerId(2)));
        let tails: Vec<u32> = hits[1..11].iter().map(|h| h.id.0).collect();
        assert_eq!(tails, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_outside_item_not_recorded() {
        let mut t = tree();
        let far = QuadItem::new(
            ShapeId(1),
            Circle::new(Vec2::new(-50.0, -50.0), 5.0),
            ShapeKind::PowerUp,
        );
        assert!(!t.insert(far));
        assert!(t.drain_inserted().is_empty());
    }

    #[test]
    fn test_insert_then_remove_cancels() {
        let mut t = tree();
        let kept = segment(1, 50.0);
        let transient = segment(2, 60.0);
        t.insert(kept);
        t.insert(transient);
        assert!(t.remove(&transient));

        let inserted = t.drain_inserted();
        assert_eq!(inserted, vec![kept]);
        assert!(t.drain_removed().is_empty());

        // Drained lists start over.
        assert!(t.drain_inserted().is_empty());
        assert!(t.remove(&kept));
        assert_eq!(t.drain_removed(), vec![kept]);
        assert!(t.query(&kept.shape).is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut t = tree();
        assert!(!t.remove(&segment(9, 50.0)));
        assert!(t.drain_removed().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut t = tree();
        for id in 0..30 {
            t.insert(segment(id, 20.0 * id as f32 + 5.0));
        }
        t.clear();
        assert!(!t.root().is_split());
        assert!(t.drain_inserted().is_empty());
        assert!(t.drain_removed().is_empty());
        assert!(t.query(&Shape::Rectangle(*t.bounds())).is_empty());
    }
}
