//! Player state and movement.

use super::{PlayerId, Tail};
use crate::board::Board;
use crate::config::PlayerConfig;
use crate::shape::{Circle, Line, ShapeId};
use crate::spatial::{QuadItem, ShapeKind};
use glam::Vec2;
use protocol::Color;
use protocol::packets::Steer;
use rand::Rng;
use std::f32::consts::TAU;

/// A room member and the head they steer.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub alive: bool,
    /// Signed: hitting your own old trail costs a point.
    pub points: i32,
    pub position: Vec2,
    /// Radians, kept in `[0, 2π)`.
    pub heading: f32,
    pub steer: Steer,
    pub speed: f32,
    pub radius: f32,
    pub line_width: f32,
    /// Stacked effect depths; an effect is on while its depth is non-zero.
    pub inverted: u32,
    pub invincible: u32,
    pub breaker: u32,
    /// Ticks left in the current trail gap.
    gap_ticks: u32,
    head_id: ShapeId,
    pub tail: Tail,
}

impl Player {
    pub fn new(id: PlayerId, name: String, head_id: ShapeId, config: &PlayerConfig) -> Self {
        Self {
            id,
            name,
            color: Color::default(),
            alive: false,
            points: 0,
            position: Vec2::ZERO,
            heading: 0.0,
            steer: Steer::Forward,
            speed: config.speed,
            radius: config.head_radius,
            line_width: config.line_width,
            inverted: 0,
            invincible: 0,
            breaker: 0,
            gap_ticks: 0,
            head_id,
            tail: Tail::new(id),
        }
    }

    #[inline]
    pub fn head(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    #[inline]
    pub fn head_id(&self) -> ShapeId {
        self.head_id
    }

    pub fn head_item(&self) -> QuadItem {
        QuadItem::new(self.head_id, self.head(), ShapeKind::Player(self.id))
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.inverted > 0
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible > 0
    }

    #[inline]
    pub fn is_breaker(&self) -> bool {
        self.breaker > 0
    }

    #[inline]
    pub fn in_gap(&self) -> bool {
        self.gap_ticks > 0
    }

    /// Put the player back on the board with fresh stats for a new round.
    ///
    /// The board is expected to have been cleared already.
    pub fn spawn(&mut self, board: &mut Board, position: Vec2, heading: f32, config: &PlayerConfig) {
        self.alive = true;
        self.position = position;
        self.heading = heading.rem_euclid(TAU);
        self.steer = Steer::Forward;
        self.speed = config.speed;
        self.radius = config.head_radius;
        self.line_width = config.line_width;
        self.inverted = 0;
        self.invincible = 0;
        self.breaker = 0;
        self.gap_ticks = 0;
        self.tail.forget();
        board.place(self.head_item());
    }

    /// Mark the player dead and take the head off the board. The trail
    /// stays until the next round.
    pub fn kill(&mut self, board: &mut Board) {
        self.alive = false;
        board.remove(self.head_id);
    }

    /// Remove the head and the whole trail from the board.
    pub fn remove_from(&mut self, board: &mut Board) {
        self.tail.clear(board);
        board.remove(self.head_id);
    }

    /// Advance one tick: steer, roll the gap timer, move, re-index the
    /// head and draw a segment from the old position.
    ///
    /// Returns the segment drawn this tick, if any.
    pub fn tick<R: Rng>(&mut self, board: &mut Board, rng: &mut R, config: &PlayerConfig) -> Option<QuadItem> {
        if !self.alive {
            return None;
        }

        let turn = match self.steer {
            Steer::Forward => 0.0,
            Steer::Left => -config.turn_rate,
            Steer::Right => config.turn_rate,
        };
        let sign = if self.is_inverted() { -1.0 } else { 1.0 };
        self.heading = (self.heading + turn * sign).rem_euclid(TAU);

        if self.gap_ticks == 0 && rng.random_bool(config.gap_chance.clamp(0.0, 1.0)) {
            self.gap_ticks = config.gap_duration;
        }
        let in_gap = self.gap_ticks > 0;
        if in_gap {
            self.gap_ticks -= 1;
        }

        let old = self.position;
        let mut next = old + Vec2::from_angle(self.heading) * self.speed;
        let mut wrapped = false;
        if board.teleporters() > 0 && !board.bounds().contains(next) {
            next = board.wrap(next);
            wrapped = true;
        }
        self.position = next;
        board.place(self.head_item());

        let segment = if in_gap || wrapped || self.is_invincible() {
            None
        } else {
            self.tail.append(board, Line::new(old, next, self.line_width))
        };
        self.tail.release_guard(board, &self.head());
        segment
    }

    pub fn scale_speed(&mut self, factor: f32) {
        self.speed *= factor;
    }

    /// Resize the head, keeping the board and the trail guard in sync.
    pub fn scale_radius(&mut self, factor: f32, board: &mut Board) {
        self.radius *= factor;
        if self.alive {
            board.place(self.head_item());
            self.tail.reguard(board, &self.head());
        }
    }

    pub fn scale_line_width(&mut self, factor: f32) {
        self.line_width *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn no_gaps() -> PlayerConfig {
        PlayerConfig {
            gap_chance: 0.0,
            ..PlayerConfig::default()
        }
    }

    fn spawned(board: &mut Board, config: &PlayerConfig) -> Player {
        let head_id = board.next_id();
        let mut player = Player::new(PlayerId(1), "ada".into(), head_id, config);
        player.spawn(board, Vec2::new(400.0, 400.0), 0.0, config);
        player
    }

    #[test]
    fn test_straight_move_draws_segment() {
        let config = no_gaps();
        let mut board = Board::new(&BoardConfig::default());
        let mut player = spawned(&mut board, &config);
        let mut rng = StdRng::seed_from_u64(1);

        let segment = player.tick(&mut board, &mut rng, &config).unwrap();
        assert_eq!(player.position, Vec2::new(401.5, 400.0));
        assert_eq!(segment.kind, ShapeKind::Tail { owner: PlayerId(1) });
        assert!(player.tail.is_guarded(segment.id));
        assert!(board.contains(player.head_id()));
    }

    #[test]
    fn test_inverted_steering() {
        let config = no_gaps();
        let mut board = Board::new(&BoardConfig::default());
        let mut player = spawned(&mut board, &config);
        let mut rng = StdRng::seed_from_u64(1);

        player.steer = Steer::Right;
        player.tick(&mut board, &mut rng, &config);
        assert!((player.heading - config.turn_rate).abs() < 1e-6);

        player.inverted = 1;
        player.tick(&mut board, &mut rng, &config);
        player.tick(&mut board, &mut rng, &config);
        assert!((player.heading - (TAU - config.turn_rate)).abs() < 1e-5);
    }

    #[test]
    fn test_gap_suppresses_trail() {
        let config = PlayerConfig {
            gap_chance: 1.0,
            gap_duration: 3,
            ..PlayerConfig::default()
        };
        let mut board = Board::new(&BoardConfig::default());
        let mut player = spawned(&mut board, &config);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..3 {
            assert!(player.tick(&mut board, &mut rng, &config).is_none());
        }
        assert!(player.tail.is_empty());
    }

    #[test]
    fn test_invincible_leaves_no_trail() {
        let config = no_gaps();
        let mut board = Board::new(&BoardConfig::default());
        let mut player = spawned(&mut board, &config);
        let mut rng = StdRng::seed_from_u64(1);
        player.invincible = 2;
        assert!(player.tick(&mut board, &mut rng, &config).is_none());
        assert_eq!(player.position, Vec2::new(401.5, 400.0));
    }

    #[test]
    fn test_teleporter_wraps_without_segment() {
        let config = no_gaps();
        let mut board = Board::new(&BoardConfig::default());
        let mut player = spawned(&mut board, &config);
        let mut rng = StdRng::seed_from_u64(1);
        board.add_teleporter();
        player.spawn(&mut board, Vec2::new(799.0, 400.0), 0.0, &config);

        assert!(player.tick(&mut board, &mut rng, &config).is_none());
        assert!((player.position.x - 0.5).abs() < 1e-4);
        assert!(player.tick(&mut board, &mut rng, &config).is_some());
    }

    #[test]
    fn test_kill_removes_head_only() {
        let config = no_gaps();
        let mut board = Board::new(&BoardConfig::default());
        let mut player = spawned(&mut board, &config);
        let mut rng = StdRng::seed_from_u64(1);
        let segment = player.tick(&mut board, &mut rng, &config).unwrap();

        player.kill(&mut board);
        assert!(!player.alive);
        assert!(!board.contains(player.head_id()));
        assert!(board.contains(segment.id));
        assert!(player.tick(&mut board, &mut rng, &config).is_none());
    }
}
