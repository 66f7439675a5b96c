//! Room membership, colors and moderator election.

use crate::entity::{Player, PlayerId};
use protocol::Color;
use protocol::packets::LeaderboardEntry;

/// Player colors, handed out first-unused in this order.
pub const PALETTE: [Color; 8] = [
    Color::from_hex(0xFF0000),
    Color::from_hex(0x00FF00),
    Color::from_hex(0x0000FF),
    Color::from_hex(0xFFFF00),
    Color::from_hex(0x00FFFF),
    Color::from_hex(0xFF00FF),
    Color::from_hex(0xFFFFFF),
    Color::from_hex(0xFFA500),
];

/// Color used once the palette is exhausted.
pub const FALLBACK_COLOR: Color = Color::from_hex(0x000000);

/// Players of one room, in join order.
#[derive(Debug)]
pub struct Roster {
    players: Vec<Player>,
    moderator: Option<PlayerId>,
    max_players: usize,
}

impl Roster {
    pub fn new(max_players: usize) -> Self {
        Self {
            players: Vec::with_capacity(max_players),
            moderator: None,
            max_players,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    #[inline]
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    #[inline]
    pub fn moderator(&self) -> Option<PlayerId> {
        self.moderator
    }

    pub fn is_moderator(&self, id: PlayerId) -> bool {
        self.moderator == Some(id)
    }

    /// Add a player, assigning the first free palette color. The first
    /// player in becomes moderator.
    ///
    /// Hands the player back when the roster is full.
    pub fn add(&mut self, mut player: Player) -> Result<&mut Player, Player> {
        if self.is_full() {
            return Err(player);
        }
        player.color = self.free_color();
        if self.moderator.is_none() {
            self.moderator = Some(player.id);
        }
        self.players.push(player);
        let last = self.players.len() - 1;
        Ok(&mut self.players[last])
    }

    fn free_color(&self) -> Color {
        PALETTE
            .into_iter()
            .find(|color| self.players.iter().all(|p| p.color != *color))
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Remove a player. A departing moderator hands over to the next
    /// member in join order.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.index_of(id)?;
        let removed = self.players.remove(index);
        if self.moderator == Some(id) {
            self.moderator = self.players.first().map(|p| p.id);
        }
        Some(removed)
    }

    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    #[inline]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[inline]
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Leaderboard rows in join order.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.players
            .iter()
            .map(|p| LeaderboardEntry {
                id: p.id.0,
                name: p.name.clone(),
                color: p.color,
                is_moderator: self.is_moderator(p.id),
                alive: p.alive,
                points: p.points,
            })
            .collect()
    }
}
