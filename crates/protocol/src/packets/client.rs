//! Client -> Server packet parsing.

use crate::{BinaryReader, ProtocolError};

/// Steering input sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Forward,
    Left,
    Right,
}

impl TryFrom<u8> for Steer {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Steer::Forward),
            1 => Ok(Steer::Left),
            2 => Ok(Steer::Right),
            other => Err(ProtocolError::InvalidDirection(other)),
        }
    }
}

/// Parsed client packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    /// Create a room (0x00) with the creator's display name.
    CreateRoom { name: String },
    /// Join a room (0x01).
    JoinRoom { room_id: String, name: String },
    /// List rooms (0x02).
    ListRooms,
    /// Steering input (0x10).
    Direction(Steer),
    /// Start round (0x20).
    Start,
    /// Toggle pause (0x21).
    Pause,
    /// Kick member (0x22).
    Kick { player_id: u32 },
    /// Ping (0xFE).
    Ping,
}

impl ClientPacket {
    /// Parse a client packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.get_u8()?;

        match opcode {
            0x00 => Ok(ClientPacket::CreateRoom {
                name: reader.get_string(),
            }),
            0x01 => {
                let room_id = reader.get_string();
                let name = reader.get_string();
                Ok(ClientPacket::JoinRoom { room_id, name })
            }
            0x02 => Ok(ClientPacket::ListRooms),
            0x10 => Ok(ClientPacket::Direction(Steer::try_from(reader.get_u8()?)?)),
            0x20 => Ok(ClientPacket::Start),
            0x21 => Ok(ClientPacket::Pause),
            0x22 => Ok(ClientPacket::Kick {
                player_id: reader.get_u32()?,
            }),
            0xFE => Ok(ClientPacket::Ping),
            _ => Err(ProtocolError::InvalidOpcode(opcode)),
        }
    }
}
