//! Power-up spawning, pickup and expiry.

use super::{Effect, PowerUp, PowerUpKind};
use crate::board::Board;
use crate::config::Config;
use crate::entity::PlayerId;
use crate::roster::Roster;
use crate::shape::{Circle, ShapeId};
use crate::spatial::ShapeKind;
use glam::Vec2;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// An effect currently in force.
#[derive(Debug, Clone)]
struct ActivePowerUp {
    kind: PowerUpKind,
    /// Players the effect was applied to; empty for board effects.
    targets: Vec<PlayerId>,
    remaining_ticks: u32,
}

/// Tracks power-ups on the board and effects in force for one room.
#[derive(Debug)]
pub struct PowerUpManager {
    on_board: BTreeMap<ShapeId, PowerUp>,
    active: Vec<ActivePowerUp>,
    spawn_chance: f64,
    radius: f32,
    max_on_board: usize,
    duration_ticks: u32,
}

impl PowerUpManager {
    pub fn new(config: &Config) -> Self {
        Self {
            on_board: BTreeMap::new(),
            active: Vec::new(),
            spawn_chance: config.power_up.spawn_chance.clamp(0.0, 1.0),
            radius: config.power_up.radius,
            max_on_board: config.power_up.max_on_board,
            duration_ticks: config.power_up_ticks(),
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<&PowerUp> {
        self.on_board.get(&id)
    }

    /// Uncollected power-ups, by id.
    pub fn on_board(&self) -> impl Iterator<Item = &PowerUp> {
        self.on_board.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Put a power-up of `kind` on the board at `position`.
    pub fn place(&mut self, board: &mut Board, kind: PowerUpKind, position: Vec2, others: bool) -> Option<PowerUp> {
        let circle = Circle::new(position, self.radius);
        let item = board.add(circle, ShapeKind::PowerUp)?;
        let power_up = PowerUp {
            id: item.id,
            kind,
            circle,
            others: others && !kind.targets_board(),
        };
        self.on_board.insert(power_up.id, power_up);
        Some(power_up)
    }

    /// Roll the per-tick spawn chance and, on success, place a random kind
    /// at a random spot.
    pub fn spawn<R: Rng>(&mut self, board: &mut Board, rng: &mut R) -> Option<PowerUp> {
        if self.on_board.len() >= self.max_on_board || !rng.random_bool(self.spawn_chance) {
            return None;
        }
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        let others = rng.random_bool(0.5);
        let position = board.random_position(rng, self.radius);
        let spawned = self.place(board, kind, position, others);
        if let Some(power_up) = &spawned {
            debug!("Spawned {:?} power-up {} (others: {})", kind, power_up.id.0, others);
        }
        spawned
    }

    /// `picker` touched the power-up `id`: take it off the board, apply
    /// its effect and start its timer.
    pub fn collide(&mut self, id: ShapeId, picker: PlayerId, roster: &mut Roster, board: &mut Board) -> Option<PowerUp> {
        let power_up = self.on_board.remove(&id)?;
        board.remove(id);

        let targets = match power_up.kind.effect() {
            Effect::Player { apply, .. } => {
                let targets: Vec<PlayerId> = if power_up.others {
                    roster.iter().map(|p| p.id).filter(|&other| other != picker).collect()
                } else {
                    vec![picker]
                };
                for target in &targets {
                    if let Some(player) = roster.get_mut(*target) {
                        apply(player, board);
                    }
                }
                targets
            }
            Effect::Board { apply, .. } => {
                apply(board, roster);
                Vec::new()
            }
        };

        debug!("Player {} picked up {:?}, affecting {:?}", picker, power_up.kind, targets);
        self.active.push(ActivePowerUp {
            kind: power_up.kind,
            targets,
            remaining_ticks: self.duration_ticks,
        });
        Some(power_up)
    }

    /// Count down active effects and reverse the ones that ran out.
    ///
    /// Returns how many effects expired.
    pub fn tick(&mut self, roster: &mut Roster, board: &mut Board) -> usize {
        let mut expired = 0;
        let mut still_active = Vec::with_capacity(self.active.len());
        for mut active in std::mem::take(&mut self.active) {
            active.remaining_ticks = active.remaining_ticks.saturating_sub(1);
            if active.remaining_ticks == 0 {
                unapply(&active, roster, board);
                expired += 1;
            } else {
                still_active.push(active);
            }
        }
        self.active = still_active;
        expired
    }

    /// Reverse every active effect and forget every pickup.
    pub fn reset(&mut self, roster: &mut Roster, board: &mut Board) {
        for active in std::mem::take(&mut self.active) {
            unapply(&active, roster, board);
        }
        for id in std::mem::take(&mut self.on_board).into_keys() {
            board.remove(id);
        }
    }
}

fn unapply(active: &ActivePowerUp, roster: &mut Roster, board: &mut Board) {
    match active.kind.effect() {
        Effect::Player { unapply, .. } => {
            for target in &active.targets {
                // Players who left keep nothing to reverse.
                if let Some(player) = roster.get_mut(*target) {
                    unapply(player, board);
                }
            }
        }
        Effect::Board { unapply, .. } => unapply(board, roster),
    }
}
