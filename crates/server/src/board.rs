//! Board state management.
//!
//! Owns every shape of a room: an arena keyed by [`ShapeId`] plus the
//! quadtree used for collision queries and diff tracking.

use crate::config::BoardConfig;
use crate::shape::{Rectangle, Shape, ShapeId};
use crate::spatial::{QuadItem, QuadTree, ShapeKind};
use glam::Vec2;
use rand::Rng;
use std::collections::HashMap;

/// The playing field of one room.
#[derive(Debug)]
pub struct Board {
    /// Next shape id to hand out. Never reset, so ids stay unique for the
    /// room's lifetime.
    next_shape_id: u32,
    shapes: HashMap<ShapeId, QuadItem>,
    tree: QuadTree,
    /// Active teleporter effects. Heads wrap around instead of dying while
    /// this is non-zero.
    teleporters: u32,
}

impl Board {
    pub fn new(config: &BoardConfig) -> Self {
        let bounds = Rectangle::new(0.0, 0.0, config.width, config.height);
        Self {
            next_shape_id: 1,
            shapes: HashMap::with_capacity(1024),
            tree: QuadTree::new(bounds, config.quad_capacity, config.quad_max_depth),
            teleporters: 0,
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Rectangle {
        self.tree.bounds()
    }

    /// Allocate a fresh shape id.
    pub fn next_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_shape_id);
        self.next_shape_id = self.next_shape_id.wrapping_add(1).max(1);
        id
    }

    /// Allocate an id for `shape` and index it.
    ///
    /// Returns `None` when the shape lies entirely off the board.
    pub fn add(&mut self, shape: impl Into<Shape>, kind: ShapeKind) -> Option<QuadItem> {
        let item = QuadItem::new(self.next_id(), shape, kind);
        self.place(item).then_some(item)
    }

    /// Index `item`, replacing any stored shape with the same id.
    pub fn place(&mut self, item: QuadItem) -> bool {
        self.remove(item.id);
        if !self.tree.insert(item) {
            return false;
        }
        self.shapes.insert(item.id, item);
        true
    }

    /// Remove a shape by id, returning what was stored.
    pub fn remove(&mut self, id: ShapeId) -> Option<QuadItem> {
        let item = self.shapes.remove(&id)?;
        self.tree.remove(&item);
        Some(item)
    }

    #[inline]
    pub fn get(&self, id: ShapeId) -> Option<&QuadItem> {
        self.shapes.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Distinct shapes overlapping `shape`, power-ups first, then trail
    /// segments, then heads.
    pub fn query(&self, shape: &Shape) -> Vec<QuadItem> {
        self.tree.query(shape)
    }

    pub fn drain_inserted(&mut self) -> Vec<QuadItem> {
        self.tree.drain_inserted()
    }

    pub fn drain_removed(&mut self) -> Vec<QuadItem> {
        self.tree.drain_removed()
    }

    /// Drop every shape and pending change. Ids keep counting up.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.tree.clear();
    }

    #[inline]
    pub fn teleporters(&self) -> u32 {
        self.teleporters
    }

    pub fn add_teleporter(&mut self) {
        self.teleporters += 1;
    }

    pub fn remove_teleporter(&mut self) {
        self.teleporters = self.teleporters.saturating_sub(1);
    }

    /// Map a point that left the board onto the opposite edge.
    pub fn wrap(&self, point: Vec2) -> Vec2 {
        let bounds = self.bounds();
        let size = Vec2::new(bounds.width, bounds.height);
        (point - bounds.position).rem_euclid(size) + bounds.position
    }

    /// A uniformly random point at least `margin` away from every edge.
    ///
    /// Falls back to the center when the margin leaves no room.
    pub fn random_position<R: Rng>(&self, rng: &mut R, margin: f32) -> Vec2 {
        let min = self.bounds().min() + Vec2::splat(margin);
        let max = self.bounds().max() - Vec2::splat(margin);
        if min.x >= max.x || min.y >= max.y {
            return self.bounds().center();
        }
        Vec2::new(rng.random_range(min.x..max.x), rng.random_range(min.y..max.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PlayerId;
    use crate::shape::{Circle, Line};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board() -> Board {
        Board::new(&BoardConfig::default())
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut b = board();
        let first = b.add(Circle::new(Vec2::new(10.0, 10.0), 2.0), ShapeKind::PowerUp).unwrap();
        b.remove(first.id);
        b.clear();
        let second = b.add(Circle::new(Vec2::new(10.0, 10.0), 2.0), ShapeKind::PowerUp).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_place_replaces_same_id() {
        let mut b = board();
        let id = b.next_id();
        let kind = ShapeKind::Player(PlayerId(1));
        assert!(b.place(QuadItem::new(id, Circle::new(Vec2::new(100.0, 100.0), 3.0), kind)));
        assert!(b.place(QuadItem::new(id, Circle::new(Vec2::new(300.0, 300.0), 3.0), kind)));
        assert_eq!(b.len(), 1);
        assert!(b.query(&Shape::Dot(Vec2::new(100.0, 100.0))).is_empty());
        assert_eq!(b.query(&Shape::Dot(Vec2::new(300.0, 300.0))).len(), 1);
    }

    #[test]
    fn test_off_board_shape_rejected() {
        let mut b = board();
        let line = Line::new(Vec2::new(-20.0, -20.0), Vec2::new(-10.0, -10.0), 3.0);
        assert!(b.add(line, ShapeKind::Tail { owner: PlayerId(1) }).is_none());
        assert!(b.is_empty());
        assert!(b.drain_inserted().is_empty());
    }

    #[test]
    fn test_wrap() {
        let b = board();
        assert_eq!(b.wrap(Vec2::new(801.0, 400.0)), Vec2::new(1.0, 400.0));
        assert_eq!(b.wrap(Vec2::new(-2.0, -1.0)), Vec2::new(798.0, 799.0));
        assert_eq!(b.wrap(Vec2::new(12.0, 34.0)), Vec2::new(12.0, 34.0));
    }

    #[test]
    fn test_teleporter_counter_saturates() {
        let mut b = board();
        b.add_teleporter();
        b.add_teleporter();
        b.remove_teleporter();
        assert_eq!(b.teleporters(), 1);
        b.remove_teleporter();
        b.remove_teleporter();
        assert_eq!(b.teleporters(), 0);
    }

    #[test]
    fn test_random_position_respects_margin() {
        let b = board();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = b.random_position(&mut rng, 80.0);
            assert!(p.x >= 80.0 && p.x < 720.0 && p.y >= 80.0 && p.y < 720.0);
        }
        assert_eq!(b.random_position(&mut rng, 500.0), Vec2::new(400.0, 400.0));
    }
}
