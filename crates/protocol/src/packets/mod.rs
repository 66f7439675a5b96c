//! Packet definitions for the kurve protocol.
//!
//! This module contains both client->server and server->client packet types.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Opcodes for client -> server packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOpcode {
    /// Create a new room and join it as moderator.
    CreateRoom = 0x00,
    /// Join an existing room by id.
    JoinRoom = 0x01,
    /// Request the list of open rooms.
    ListRooms = 0x02,
    /// Steering input.
    Direction = 0x10,
    /// Start the round (moderator only).
    Start = 0x20,
    /// Toggle pause (moderator only).
    Pause = 0x21,
    /// Kick a member (moderator only).
    Kick = 0x22,
    /// Latency probe.
    Ping = 0xFE,
}

/// Opcodes for server -> client packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOpcode {
    /// Answer to CreateRoom / JoinRoom.
    JoinResult = 0x01,
    /// Answer to ListRooms.
    RoomList = 0x02,
    /// Incremental board diff for one tick.
    TickDiff = 0x10,
    /// Leaderboard snapshot.
    Leaderboard = 0x30,
    /// A new round began.
    RoundStart = 0x40,
    /// Fewer than two players remain alive.
    RoundEnd = 0x41,
    /// Simulation paused by the moderator.
    Paused = 0x42,
    /// Simulation resumed by the moderator.
    Resumed = 0x43,
    /// Answer to Start.
    StartResult = 0x50,
    /// Answer to Pause, carrying the resulting status.
    PauseResult = 0x51,
    /// The receiving connection was kicked.
    Kicked = 0x60,
    /// Answer to Ping.
    Pong = 0xFE,
}
