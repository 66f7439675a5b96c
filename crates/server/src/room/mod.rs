//! Room state machine.
//!
//! A room owns its roster, board, power-ups and tick engine, and never does
//! I/O: every visible outcome is queued as a [`RoomEvent`] and drained by
//! whoever drives the room.

pub mod diff;
mod tick;


pub use tick::TickEngine;

use crate::board::Board;
use crate::config::Config;
use crate::entity::{Player, PlayerId};
use crate::error::RoomError;
use crate::powerup::PowerUpManager;
use crate::roster::Roster;
use fixedbitset::FixedBitSet;
use glam::Vec2;
use protocol::packets::{LeaderboardEntry, RoomInfo, Steer, TickDiff};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Room identifier, a v4 UUID string.
pub type RoomId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Accepting players, nothing simulated.
    Waiting,
    /// A round is running or about to restart.
    Playing,
    /// Frozen by the moderator.
    Paused,
}

impl RoomStatus {
    /// Wire code used in room listings.
    pub fn code(self) -> u8 {
        match self {
            RoomStatus::Waiting => 0,
            RoomStatus::Playing => 1,
            RoomStatus::Paused => 2,
        }
    }
}

/// Something every member of the room should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    RoundStart,
    RoundEnd,
    Tick(TickDiff),
    Leaderboard(Vec<LeaderboardEntry>),
    Paused,
    Resumed,
    Kicked { player_id: PlayerId },
}

/// One game room.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    /// Seconds since the Unix epoch.
    created: u64,
    status: RoomStatus,
    config: Config,
    roster: Roster,
    board: Board,
    power_ups: PowerUpManager,
    engine: TickEngine,
    rng: StdRng,
    outbox: Vec<RoomEvent>,
    /// Roster slots killed during the current tick.
    dead_this_tick: FixedBitSet,
    /// Set once the last member leaves. A closed room takes no new members.
    closed: bool,
}

impl Room {
    pub fn new(id: RoomId, config: &Config, seed: u64) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            id,
            created,
            status: RoomStatus::Waiting,
            config: config.clone(),
            roster: Roster::new(config.room.max_players),
            board: Board::new(&config.board),
            power_ups: PowerUpManager::new(config),
            engine: TickEngine::default(),
            rng: StdRng::seed_from_u64(seed),
            outbox: Vec::new(),
            dead_this_tick: FixedBitSet::with_capacity(config.room.max_players),
            closed: false,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn status(&self) -> RoomStatus {
        self.status
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn power_ups(&self) -> &PowerUpManager {
        &self.power_ups
    }

    #[inline]
    pub fn engine(&self) -> &TickEngine {
        &self.engine
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.get(id)
    }

    /// Lobby listing row.
    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id.clone(),
            players: self.roster.len() as u32,
            max_players: self.roster.max_players() as u32,
            created: self.created,
            status: self.status.code(),
        }
    }

    /// Take every event queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<RoomEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn push_leaderboard(&mut self) {
        self.outbox.push(RoomEvent::Leaderboard(self.roster.leaderboard()));
    }

    /// Add a member. Players joining mid-round sit out until the next one.
    pub fn join(&mut self, id: PlayerId, name: String) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::RoomClosed);
        }
        if self.roster.is_full() {
            return Err(RoomError::RoomFull);
        }
        let head_id = self.board.next_id();
        let player = Player::new(id, name, head_id, &self.config.player);
        let joined = self.roster.add(player).map_err(|_| RoomError::RoomFull)?;
        info!(
            "Player {} ({}) joined room {} as {}",
            joined.id, joined.name, self.id, joined.color
        );
        self.push_leaderboard();
        Ok(())
    }

    /// Remove a member along with their head and trail.
    pub fn leave(&mut self, id: PlayerId) -> Option<Player> {
        let mut player = self.roster.remove(id)?;
        player.remove_from(&mut self.board);
        info!("Player {} ({}) left room {}", player.id, player.name, self.id);

        if self.roster.is_empty() {
            self.engine.stop();
            self.status = RoomStatus::Waiting;
            self.closed = true;
            info!("Room {} closed", self.id);
        } else {
            self.push_leaderboard();
        }
        Some(player)
    }

    /// Steering input; takes effect on the next tick.
    pub fn set_direction(&mut self, id: PlayerId, steer: Steer) -> Result<(), RoomError> {
        let player = self.roster.get_mut(id).ok_or(RoomError::UnknownPlayer)?;
        player.steer = steer;
        Ok(())
    }

    fn ensure_moderator(&self, id: PlayerId) -> Result<(), RoomError> {
        if self.roster.is_moderator(id) {
            Ok(())
        } else {
            Err(RoomError::NotModerator)
        }
    }

    /// Start the first round. Moderator only.
    pub fn start(&mut self, by: PlayerId) -> Result<(), RoomError> {
        self.ensure_moderator(by)?;
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::AlreadyStarted);
        }
        if self.roster.len() < self.config.room.min_players.max(2) {
            return Err(RoomError::NotEnoughPlayers);
        }
        self.start_round();
        Ok(())
    }

    /// Flip between playing and paused. Moderator only.
    pub fn toggle_pause(&mut self, by: PlayerId) -> Result<RoomStatus, RoomError> {
        self.ensure_moderator(by)?;
        match self.status {
            RoomStatus::Waiting => return Err(RoomError::NotStarted),
            RoomStatus::Playing => {
                self.status = RoomStatus::Paused;
                self.outbox.push(RoomEvent::Paused);
            }
            RoomStatus::Paused => {
                self.status = RoomStatus::Playing;
                self.outbox.push(RoomEvent::Resumed);
            }
        }
        info!("Room {} is now {:?}", self.id, self.status);
        Ok(self.status)
    }

    /// Remove `target` from the room. Moderator only.
    pub fn kick(&mut self, by: PlayerId, target: PlayerId) -> Result<Player, RoomError> {
        self.ensure_moderator(by)?;
        if self.roster.get(target).is_none() {
            return Err(RoomError::UnknownPlayer);
        }
        info!("Player {} kicked {} from room {}", by, target, self.id);
        self.outbox.push(RoomEvent::Kicked { player_id: target });
        self.leave(target).ok_or(RoomError::UnknownPlayer)
    }

    /// Reset the board and every player, then start the tick engine.
    fn start_round(&mut self) {
        self.power_ups.reset(&mut self.roster, &mut self.board);
        self.board.clear();

        let margin = self.config.player.spawn_margin;
        let ids: Vec<PlayerId> = self.roster.iter().map(|p| p.id).collect();
        for id in ids {
            let position = self.board.random_position(&mut self.rng, margin);
            let heading = self.rng.random_range(0.0..TAU);
            self.spawn_player(id, position, heading);
        }

        self.status = RoomStatus::Playing;
        self.engine.start();
        info!(
            "Room {} started a round with {} players",
            self.id,
            self.roster.len()
        );
        self.outbox.push(RoomEvent::RoundStart);
        self.push_leaderboard();
    }

    /// Place a member on the board at `position`, alive and with fresh stats.
    pub(crate) fn spawn_player(&mut self, id: PlayerId, position: Vec2, heading: f32) -> bool {
        match self.roster.get_mut(id) {
            Some(player) => {
                player.spawn(&mut self.board, position, heading, &self.config.player);
                true
            }
            None => false,
        }
    }

    /// Advance the room by one tick.
    ///
    /// Waiting and paused rooms do nothing. After a round ends, ticks count
    /// down the restart delay instead of simulating.
    pub fn tick(&mut self) {
        if self.status != RoomStatus::Playing {
            return;
        }

        if self.engine.restart_pending() {
            if self.engine.count_down() {
                if self.roster.len() >= self.config.room.min_players.max(2) {
                    self.start_round();
                } else {
                    info!("Room {} waiting for players", self.id);
                    self.status = RoomStatus::Waiting;
                }
            }
            return;
        }

        if self.engine.is_running() {
            self.step();
        }
    }

    fn end_round(&mut self) {
        self.engine.stop();
        self.engine.schedule_restart(self.config.restart_delay_ticks());
        let winner = self.roster.iter().find(|p| p.alive).map(|p| p.name.clone());
        info!(
            "Round ended in room {} after {} ticks (winner: {})",
            self.id,
            self.engine.tick(),
            winner.as_deref().unwrap_or("none")
        );
        self.outbox.push(RoomEvent::RoundEnd);
    }
}
