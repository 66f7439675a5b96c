//! Power-ups: map pickups with timed, reversible effects.
//!
//! Each kind maps to an (apply, unapply) pair of plain functions. Player
//! effects run once per targeted player; board effects run once on the
//! room's board and roster.

mod manager;

pub use manager::PowerUpManager;

use crate::board::Board;
use crate::entity::Player;
use crate::roster::Roster;
use crate::shape::{Circle, ShapeId};

/// Every kind of power-up that can spawn.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    SpeedIncrease = 0,
    SpeedDecrease = 1,
    HeadIncrease = 2,
    HeadDecrease = 3,
    LineIncrease = 4,
    LineDecrease = 5,
    Inverted = 6,
    Invincible = 7,
    /// Trails break on contact instead of killing.
    Breaker = 8,
    /// Wipes every trail off the board.
    ClearBoard = 9,
    /// Heads wrap around the board edges instead of dying.
    Teleporter = 10,
}

impl PowerUpKind {
    /// Spawn catalogue.
    pub const ALL: [PowerUpKind; 11] = [
        PowerUpKind::SpeedIncrease,
        PowerUpKind::SpeedDecrease,
        PowerUpKind::HeadIncrease,
        PowerUpKind::HeadDecrease,
        PowerUpKind::LineIncrease,
        PowerUpKind::LineDecrease,
        PowerUpKind::Inverted,
        PowerUpKind::Invincible,
        PowerUpKind::Breaker,
        PowerUpKind::ClearBoard,
        PowerUpKind::Teleporter,
    ];

    /// Wire code sent to clients.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn effect(self) -> Effect {
        use PowerUpKind::*;
        match self {
            SpeedIncrease => Effect::player(speed_double, speed_halve),
            SpeedDecrease => Effect::player(speed_halve, speed_double),
            HeadIncrease => Effect::player(head_grow, head_shrink),
            HeadDecrease => Effect::player(head_shrink, head_grow),
            LineIncrease => Effect::player(line_widen, line_narrow),
            LineDecrease => Effect::player(line_narrow, line_widen),
            Inverted => Effect::player(invert_on, invert_off),
            Invincible => Effect::player(invincible_on, invincible_off),
            Breaker => Effect::player(breaker_on, breaker_off),
            ClearBoard => Effect::board(clear_trails, board_noop),
            Teleporter => Effect::board(teleporter_on, teleporter_off),
        }
    }

    pub fn targets_board(self) -> bool {
        matches!(self.effect(), Effect::Board { .. })
    }
}

pub type PlayerEffectFn = fn(&mut Player, &mut Board);
pub type BoardEffectFn = fn(&mut Board, &mut Roster);

/// An effect and its exact reversal.
#[derive(Debug, Clone, Copy)]
pub enum Effect {
    Player {
        apply: PlayerEffectFn,
        unapply: PlayerEffectFn,
    },
    Board {
        apply: BoardEffectFn,
        unapply: BoardEffectFn,
    },
}

impl Effect {
    fn player(apply: PlayerEffectFn, unapply: PlayerEffectFn) -> Self {
        Effect::Player { apply, unapply }
    }

    fn board(apply: BoardEffectFn, unapply: BoardEffectFn) -> Self {
        Effect::Board { apply, unapply }
    }
}

/// An uncollected power-up lying on the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUp {
    pub id: ShapeId,
    pub kind: PowerUpKind,
    pub circle: Circle,
    /// Targets every other member instead of the picker. Rolled at spawn.
    pub others: bool,
}

fn speed_double(player: &mut Player, _: &mut Board) {
    player.scale_speed(2.0);
}

fn speed_halve(player: &mut Player, _: &mut Board) {
    player.scale_speed(0.5);
}

fn head_grow(player: &mut Player, board: &mut Board) {
    player.scale_radius(2.0, board);
}

fn head_shrink(player: &mut Player, board: &mut Board) {
    player.scale_radius(0.5, board);
}

fn line_widen(player: &mut Player, _: &mut Board) {
    player.scale_line_width(2.0);
}

fn line_narrow(player: &mut Player, _: &mut Board) {
    player.scale_line_width(0.5);
}

fn invert_on(player: &mut Player, _: &mut Board) {
    player.inverted += 1;
}

fn invert_off(player: &mut Player, _: &mut Board) {
    player.inverted = player.inverted.saturating_sub(1);
}

fn invincible_on(player: &mut Player, _: &mut Board) {
    player.invincible += 1;
}

fn invincible_off(player: &mut Player, _: &mut Board) {
    player.invincible = player.invincible.saturating_sub(1);
}

fn breaker_on(player: &mut Player, _: &mut Board) {
    player.breaker += 1;
}

fn breaker_off(player: &mut Player, _: &mut Board) {
    player.breaker = player.breaker.saturating_sub(1);
}

fn clear_trails(board: &mut Board, roster: &mut Roster) {
    for player in roster.iter_mut() {
        player.tail.clear(board);
    }
}

fn board_noop(_: &mut Board, _: &mut Roster) {}

fn teleporter_on(board: &mut Board, _: &mut Roster) {
    board.add_teleporter();
}

fn teleporter_off(board: &mut Board, _: &mut Roster) {
    board.remove_teleporter();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_catalogue_order() {
        for (index, kind) in PowerUpKind::ALL.iter().enumerate() {
            assert_eq!(kind.code() as usize, index);
        }
    }

    #[test]
    fn test_board_kinds() {
        let board_kinds: Vec<_> = PowerUpKind::ALL
            .into_iter()
            .filter(|kind| kind.targets_board())
            .collect();
        assert_eq!(board_kinds, vec![PowerUpKind::ClearBoard, PowerUpKind::Teleporter]);
    }
}
