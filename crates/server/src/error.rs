//! Room request rejections.

use thiserror::Error;

/// Why a room refused a request. None of these change room state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    #[error("room is full")]
    RoomFull,
    #[error("room is closed")]
    RoomClosed,
    #[error("only the moderator can do that")]
    NotModerator,
    #[error("not enough players to start")]
    NotEnoughPlayers,
    #[error("round already started")]
    AlreadyStarted,
    #[error("no round in progress")]
    NotStarted,
    #[error("unknown player")]
    UnknownPlayer,
}
