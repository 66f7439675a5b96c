//! A player's trail.

use super::PlayerId;
use crate::board::Board;
use crate::shape::{Circle, Line, Shape, ShapeId};
use crate::spatial::{QuadItem, ShapeKind};
use std::collections::{BTreeSet, VecDeque};

/// Ordered trail segments owned by one player.
///
/// Segment ids come from a monotonic counter, so id order is draw order.
/// The most recent segments still touching the owner's head are guarded:
/// they are indexed and visible to everyone, but cannot kill their owner.
#[derive(Debug, Clone)]
pub struct Tail {
    owner: PlayerId,
    segments: BTreeSet<ShapeId>,
    /// Oldest first. Always a suffix of `segments`.
    guarded: VecDeque<ShapeId>,
}

impl Tail {
    pub fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            segments: BTreeSet::new(),
            guarded: VecDeque::new(),
        }
    }

    #[inline]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment ids in draw order.
    pub fn segments(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.segments.iter().copied()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.segments.contains(&id)
    }

    /// True while `id` is one of the freshly drawn segments still under
    /// the owner's head.
    pub fn is_guarded(&self, id: ShapeId) -> bool {
        self.guarded.contains(&id)
    }

    /// Draw a new segment and index it.
    ///
    /// Segments entirely off the board are dropped.
    pub fn append(&mut self, board: &mut Board, line: Line) -> Option<QuadItem> {
        let item = board.add(line, ShapeKind::Tail { owner: self.owner })?;
        self.segments.insert(item.id);
        self.guarded.push_back(item.id);
        Some(item)
    }

    /// Stop guarding the oldest segments once `head` has moved off them.
    pub fn release_guard(&mut self, board: &Board, head: &Circle) {
        let head = Shape::Circle(*head);
        while let Some(&oldest) = self.guarded.front() {
            match board.get(oldest) {
                Some(item) if item.shape.collides(&head) => break,
                _ => {
                    self.guarded.pop_front();
                }
            }
        }
    }

    /// Extend the guard backwards over every recent segment touching
    /// `head`. Needed after the head grows.
    pub fn reguard(&mut self, board: &Board, head: &Circle) {
        let head = Shape::Circle(*head);
        let run: Vec<ShapeId> = self
            .segments
            .iter()
            .rev()
            .take_while(|&&id| {
                self.guarded.contains(&id)
                    || board.get(id).is_some_and(|item| item.shape.collides(&head))
            })
            .copied()
            .collect();
        self.guarded = run.into_iter().rev().collect();
    }

    /// Remove one segment from the trail and the board.
    pub fn remove(&mut self, board: &mut Board, id: ShapeId) -> bool {
        if !self.segments.remove(&id) {
            return false;
        }
        self.guarded.retain(|&guarded| guarded != id);
        board.remove(id);
        true
    }

    /// Remove every segment from the board. Returns how many were dropped.
    pub fn clear(&mut self, board: &mut Board) -> usize {
        let count = self.segments.len();
        for id in std::mem::take(&mut self.segments) {
            board.remove(id);
        }
        self.guarded.clear();
        count
    }

    /// Forget every segment without touching the board, for when the board
    /// itself was just cleared.
    pub fn forget(&mut self) {
        self.segments.clear();
        self.guarded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use glam::Vec2;

    fn setup() -> (Board, Tail) {
        (Board::new(&BoardConfig::default()), Tail::new(PlayerId(1)))
    }

    fn seg(x1: f32, x2: f32) -> Line {
        Line::new(Vec2::new(x1, 100.0), Vec2::new(x2, 100.0), 3.0)
    }

    #[test]
    fn test_fresh_segment_guarded_until_head_leaves() {
        let (mut board, mut tail) = setup();
        let first = tail.append(&mut board, seg(100.0, 101.5)).unwrap();
        tail.release_guard(&board, &Circle::new(Vec2::new(101.5, 100.0), 3.0));
        assert!(tail.is_guarded(first.id));

        tail.release_guard(&board, &Circle::new(Vec2::new(104.5, 100.0), 3.0));
        assert!(!tail.is_guarded(first.id));
        assert!(board.contains(first.id));
    }

    #[test]
    fn test_guard_releases_oldest_first() {
        let (mut board, mut tail) = setup();
        let ids: Vec<ShapeId> = (0..6)
            .map(|i| {
                let x = 100.0 + i as f32 * 1.5;
                tail.append(&mut board, seg(x, x + 1.5)).unwrap().id
            })
            .collect();
        tail.release_guard(&board, &Circle::new(Vec2::new(109.0, 100.0), 3.0));
        // Segments ending at least a radius behind the head are released.
        assert!(!tail.is_guarded(ids[0]));
        assert!(!tail.is_guarded(ids[2]));
        assert!(tail.is_guarded(ids[4]));
        assert!(tail.is_guarded(ids[5]));
    }

    #[test]
    fn test_reguard_after_growth() {
        let (mut board, mut tail) = setup();
        let ids: Vec<ShapeId> = (0..6)
            .map(|i| {
                let x = 100.0 + i as f32 * 1.5;
                tail.append(&mut board, seg(x, x + 1.5)).unwrap().id
            })
            .collect();
        let head = Vec2::new(109.0, 100.0);
        tail.release_guard(&board, &Circle::new(head, 3.0));
        assert!(!tail.is_guarded(ids[2]));

        tail.reguard(&board, &Circle::new(head, 6.0));
        assert!(tail.is_guarded(ids[2]));
        assert!(!tail.is_guarded(ids[0]));
    }

    #[test]
    fn test_remove_and_clear() {
        let (mut board, mut tail) = setup();
        let a = tail.append(&mut board, seg(100.0, 110.0)).unwrap();
        let b = tail.append(&mut board, seg(110.0, 120.0)).unwrap();
        assert!(tail.remove(&mut board, a.id));
        assert!(!tail.remove(&mut board, a.id));
        assert!(!board.contains(a.id));
        assert_eq!(tail.segments().collect::<Vec<_>>(), vec![b.id]);

        assert_eq!(tail.clear(&mut board), 1);
        assert!(tail.is_empty());
        assert!(board.is_empty());
    }
}
