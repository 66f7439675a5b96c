//! The per-tick simulation step.

use super::{Room, RoomEvent, diff};
use crate::entity::PlayerId;
use crate::shape::{Shape, ShapeId};
use crate::spatial::{QuadItem, ShapeKind};
use tracing::debug;

/// Scheduling state of a room's simulation.
///
/// `start` and `stop` are idempotent.
#[derive(Debug, Default)]
pub struct TickEngine {
    running: bool,
    tick: u64,
    /// Ticks left before the next round starts.
    restart_in: Option<u32>,
}

impl TickEngine {
    pub fn start(&mut self) {
        self.running = true;
        self.restart_in = None;
    }

    /// Returns whether the engine was running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulated ticks since the room was created.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn schedule_restart(&mut self, ticks: u32) {
        self.restart_in = Some(ticks.max(1));
    }

    #[inline]
    pub fn restart_pending(&self) -> bool {
        self.restart_in.is_some()
    }

    /// Count one tick off the restart delay. True once it runs out.
    pub fn count_down(&mut self) -> bool {
        match self.restart_in {
            Some(left) if left > 1 => {
                self.restart_in = Some(left - 1);
                false
            }
            Some(_) => {
                self.restart_in = None;
                true
            }
            None => false,
        }
    }
}

impl Room {
    /// Move everyone, resolve collisions, score, run power-ups, then queue
    /// the diff and check for the end of the round.
    pub(super) fn step(&mut self) {
        let tick = self.engine.advance();

        for player in self.roster.iter_mut() {
            player.tick(&mut self.board, &mut self.rng, &self.config.player);
        }

        let deaths = self.resolve_collisions();
        if deaths > 0 {
            for player in self.roster.iter_mut().filter(|p| p.alive) {
                player.points += deaths as i32;
            }
        }

        self.power_ups.tick(&mut self.roster, &mut self.board);
        self.power_ups.spawn(&mut self.board, &mut self.rng);

        let inserted = self.board.drain_inserted();
        let removed = self.board.drain_removed();
        let diff = diff::collect(tick, &inserted, &removed, &self.roster, &self.power_ups);
        if !diff.is_empty() {
            self.outbox.push(RoomEvent::Tick(diff));
        }
        if deaths > 0 {
            self.push_leaderboard();
        }

        if self.roster.alive_count() < 2 {
            self.end_round();
        }
    }

    /// Resolve every living player's collisions in roster order.
    ///
    /// Returns the number of players who died this tick.
    fn resolve_collisions(&mut self) -> usize {
        self.dead_this_tick.clear();
        self.dead_this_tick.grow(self.roster.len());

        for index in 0..self.roster.len() {
            let player = &self.roster.players()[index];
            if !player.alive {
                continue;
            }
            let id = player.id;
            let head = player.head();

            if self.board.teleporters() == 0 && self.board.bounds().is_outside(&head) {
                debug!("Player {} left the board", id);
                self.kill(index);
                continue;
            }
            if player.is_invincible() {
                continue;
            }

            // Pickups below may change the player and the board; hits are
            // judged against the state at the start of this resolution.
            let breaker = player.is_breaker();
            let probe = if breaker {
                head.inflate(self.config.player.breaker_margin)
            } else {
                head
            };
            let real_head = Shape::Circle(head);
            let hits: Vec<QuadItem> = self
                .board
                .query(&Shape::Circle(probe))
                .into_iter()
                .filter(|hit| match hit.kind {
                    // Own segments count only when unguarded and touched by
                    // the real head, not a breaker's widened probe.
                    ShapeKind::Tail { owner } if owner == id => {
                        !player.tail.is_guarded(hit.id) && hit.shape.collides(&real_head)
                    }
                    ShapeKind::Player(other) => other != id,
                    _ => true,
                })
                .collect();

            for hit in hits {
                if !self.roster.players()[index].alive {
                    break;
                }
                match hit.kind {
                    ShapeKind::PowerUp => {
                        self.power_ups
                            .collide(hit.id, id, &mut self.roster, &mut self.board);
                    }
                    ShapeKind::Tail { owner } => self.hit_trail(index, owner, hit.id, breaker),
                    ShapeKind::Player(other) => self.hit_head(index, other, breaker),
                }
            }
        }

        self.dead_this_tick.count_ones(..)
    }

    fn kill(&mut self, index: usize) {
        let player = &mut self.roster.players_mut()[index];
        player.kill(&mut self.board);
        self.dead_this_tick.insert(index);
    }

    /// `breaker` is the player's mode before this tick's pickups. A segment
    /// a pickup already cleared still kills.
    fn hit_trail(&mut self, index: usize, owner: PlayerId, segment: ShapeId, breaker: bool) {
        let id = self.roster.players()[index].id;
        if breaker {
            let cut = match self.roster.get_mut(owner) {
                Some(victim) => victim.tail.remove(&mut self.board, segment),
                None => self.board.remove(segment).is_some(),
            };
            if cut {
                debug!("Player {} broke through {}'s trail", id, owner);
            }
            return;
        }

        self.kill(index);
        if owner == id {
            debug!("Player {} ran into their own trail", id);
            self.roster.players_mut()[index].points -= 1;
        } else if let Some(killer) = self.roster.get_mut(owner) {
            debug!("Player {} ran into {}'s trail", id, owner);
            killer.points += 1;
        }
    }

    fn hit_head(&mut self, index: usize, other: PlayerId, mine: bool) {
        let Some(other_index) = self.roster.index_of(other) else {
            return;
        };
        let players = self.roster.players();
        // Invincible heads are ghosts to everyone.
        if !players[other_index].alive || players[other_index].is_invincible() {
            return;
        }
        let theirs = players[other_index].is_breaker();
        debug!(
            "Head-on between {} and {}",
            players[index].id, players[other_index].id
        );

        match (mine, theirs) {
            (false, false) => {
                self.kill(index);
                self.kill(other_index);
            }
            (true, false) => {
                self.kill(other_index);
                self.roster.players_mut()[index].points += 1;
            }
            (false, true) => {
                self.kill(index);
                self.roster.players_mut()[other_index].points += 1;
            }
            (true, true) => {
                self.kill(index);
                self.kill(other_index);
                self.roster.players_mut()[index].points += 1;
                self.roster.players_mut()[other_index].points += 1;
            }
        }
    }
}
