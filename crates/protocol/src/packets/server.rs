//! Server -> Client packet building.

use crate::{BinaryWriter, Color};

/// A trail segment as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireLine {
    pub id: u32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub width: f32,
}

/// A player's head this tick, with the segment it drew (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerUpdate {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
    pub new_tail: Option<WireLine>,
}

/// Trail segments of one player that left the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailRemoval {
    pub player_id: u32,
    pub parts: Vec<u32>,
}

/// A power-up that appeared on the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpSpawn {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub kind: u8,
    /// Whether the effect targets every other player instead of the picker.
    pub others: bool,
}

/// Everything that changed on the board during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickDiff {
    pub tick: u64,
    pub players: Vec<PlayerUpdate>,
    pub removed_tails: Vec<TailRemoval>,
    pub power_ups_added: Vec<PowerUpSpawn>,
    pub power_ups_removed: Vec<u32>,
}

impl TickDiff {
    /// True when nothing changed and the diff can be skipped.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
            && self.removed_tails.is_empty()
            && self.power_ups_added.is_empty()
            && self.power_ups_removed.is_empty()
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: u32,
    pub name: String,
    pub color: Color,
    pub is_moderator: bool,
    pub alive: bool,
    pub points: i32,
}

/// Lobby listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: String,
    pub players: u32,
    pub max_players: u32,
    /// Creation time in seconds since the Unix epoch.
    pub created: u64,
    pub status: u8,
}

fn put_color(w: &mut BinaryWriter, color: Color) {
    w.put_u8(color.r);
    w.put_u8(color.g);
    w.put_u8(color.b);
}

fn put_line(w: &mut BinaryWriter, line: &WireLine) {
    w.put_u32(line.id);
    w.put_f32(line.x1);
    w.put_f32(line.y1);
    w.put_f32(line.x2);
    w.put_f32(line.y2);
    w.put_f32(line.width);
}

/// Build a JoinResult packet (0x01).
pub fn build_join_result(ok: bool, room_id: &str, player_id: u32) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(6 + room_id.len() + 1);
    w.put_u8(0x01);
    w.put_bool(ok);
    w.put_u32(player_id);
    w.put_string(room_id);
    w
}

/// Build a RoomList packet (0x02).
pub fn build_room_list(rooms: &[RoomInfo]) -> BinaryWriter {
    let mut w = BinaryWriter::new();
    w.put_u8(0x02);
    w.put_len(rooms.len());
    for room in rooms {
        w.put_string(&room.id);
        w.put_u32(room.players);
        w.put_u32(room.max_players);
        w.put_u64(room.created);
        w.put_u8(room.status);
    }
    w
}

/// Build a TickDiff packet (0x10).
pub fn build_tick_diff(diff: &TickDiff) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(32 + diff.players.len() * 48);
    w.put_u8(0x10);
    w.put_u64(diff.tick);

    w.put_len(diff.players.len());
    for player in &diff.players {
        w.put_u32(player.id);
        w.put_f32(player.x);
        w.put_f32(player.y);
        w.put_f32(player.radius);
        put_color(&mut w, player.color);
        match &player.new_tail {
            Some(line) => {
                w.put_bool(true);
                put_line(&mut w, line);
            }
            None => w.put_bool(false),
        }
    }

    w.put_len(diff.removed_tails.len());
    for removal in &diff.removed_tails {
        w.put_u32(removal.player_id);
        w.put_len(removal.parts.len());
        for &part in &removal.parts {
            w.put_u32(part);
        }
    }

    w.put_len(diff.power_ups_added.len());
    for power_up in &diff.power_ups_added {
        w.put_u32(power_up.id);
        w.put_f32(power_up.x);
        w.put_f32(power_up.y);
        w.put_f32(power_up.radius);
        w.put_u8(power_up.kind);
        w.put_bool(power_up.others);
    }

    w.put_len(diff.power_ups_removed.len());
    for &id in &diff.power_ups_removed {
        w.put_u32(id);
    }
    w
}

/// Build a Leaderboard packet (0x30).
pub fn build_leaderboard(entries: &[LeaderboardEntry]) -> BinaryWriter {
    let mut w = BinaryWriter::new();
    w.put_u8(0x30);
    w.put_len(entries.len());
    for entry in entries {
        w.put_u32(entry.id);
        w.put_string(&entry.name);
        put_color(&mut w, entry.color);
        w.put_bool(entry.is_moderator);
        w.put_bool(entry.alive);
        w.put_i32(entry.points);
    }
    w
}

/// Build a single-opcode packet with no payload.
fn build_signal(opcode: u8) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(1);
    w.put_u8(opcode);
    w
}

/// Build a RoundStart packet (0x40).
pub fn build_round_start() -> BinaryWriter {
    build_signal(0x40)
}

/// Build a RoundEnd packet (0x41).
pub fn build_round_end() -> BinaryWriter {
    build_signal(0x41)
}

/// Build a Paused packet (0x42).
pub fn build_paused() -> BinaryWriter {
    build_signal(0x42)
}

/// Build a Resumed packet (0x43).
pub fn build_resumed() -> BinaryWriter {
    build_signal(0x43)
}

/// Build a StartResult packet (0x50).
pub fn build_start_result(ok: bool) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(2);
    w.put_u8(0x50);
    w.put_bool(ok);
    w
}

/// Build a PauseResult packet (0x51).
pub fn build_pause_result(status: u8) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(2);
    w.put_u8(0x51);
    w.put_u8(status);
    w
}

/// Build a Kicked packet (0x60).
pub fn build_kicked() -> BinaryWriter {
    build_signal(0x60)
}

/// Build a Pong packet (0xFE).
pub fn build_pong() -> BinaryWriter {
    build_signal(0xFE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryReader;

    #[test]
    fn test_tick_diff_layout() {
        let diff = TickDiff {
            tick: 3,
            players: vec![PlayerUpdate {
                id: 7,
                x: 1.0,
                y: 2.0,
                radius: 3.0,
                color: Color::new(255, 0, 0),
                new_tail: None,
            }],
            removed_tails: vec![TailRemoval { player_id: 7, parts: vec![11, 12] }],
            power_ups_added: Vec::new(),
            power_ups_removed: vec![40],
        };

        let mut r = BinaryReader::new(build_tick_diff(&diff).finish());
        assert_eq!(r.get_u8(), Ok(0x10));
        assert_eq!(r.get_u64(), Ok(3));
        assert_eq!(r.get_u32(), Ok(1));
        assert_eq!(r.get_u32(), Ok(7));
        assert_eq!(r.get_f32(), Ok(1.0));
        assert_eq!(r.get_f32(), Ok(2.0));
        assert_eq!(r.get_f32(), Ok(3.0));
        assert_eq!(r.get_u8(), Ok(255));
        assert_eq!(r.get_u8(), Ok(0));
        assert_eq!(r.get_u8(), Ok(0));
        assert_eq!(r.get_bool(), Ok(false));
        // removed tails
        assert_eq!(r.get_u32(), Ok(1));
        assert_eq!(r.get_u32(), Ok(7));
        assert_eq!(r.get_u32(), Ok(2));
        assert_eq!(r.get_u32(), Ok(11));
        assert_eq!(r.get_u32(), Ok(12));
        // power-ups
        assert_eq!(r.get_u32(), Ok(0));
        assert_eq!(r.get_u32(), Ok(1));
        assert_eq!(r.get_u32(), Ok(40));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_leaderboard_negative_points() {
        let entries = vec![LeaderboardEntry {
            id: 1,
            name: "thomas".into(),
            color: Color::new(0, 255, 0),
            is_moderator: true,
            alive: false,
            points: -2,
        }];
        let mut r = BinaryReader::new(build_leaderboard(&entries).finish());
        assert_eq!(r.get_u8(), Ok(0x30));
        assert_eq!(r.get_u32(), Ok(1));
        assert_eq!(r.get_u32(), Ok(1));
        assert_eq!(r.get_string(), "thomas");
        r.get_u8().unwrap();
        r.get_u8().unwrap();
        r.get_u8().unwrap();
        assert_eq!(r.get_bool(), Ok(true));
        assert_eq!(r.get_bool(), Ok(false));
        assert_eq!(r.get_i32(), Ok(-2));
    }
}
