//! Native Kurve game server library.

pub mod board;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod powerup;
pub mod registry;
pub mod room;
pub mod roster;
pub mod server;
pub mod shape;
pub mod spatial;

// Re-export commonly used types
pub use config::Config;
pub use entity::PlayerId;
pub use error::RoomError;
pub use registry::{RoomHandle, RoomRegistry};
pub use room::{Room, RoomEvent, RoomId, RoomStatus};
pub use server::run;
