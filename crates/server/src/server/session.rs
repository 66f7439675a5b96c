//! Per-connection protocol state.

use crate::entity::PlayerId;
use crate::registry::{RoomHandle, RoomRegistry};
use crate::room::RoomEvent;
use protocol::BinaryWriter;
use protocol::packets::{self, ClientPacket};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Longest display name kept, in characters.
const MAX_NAME_CHARS: usize = 24;
const DEFAULT_NAME: &str = "Player";

/// A connection's player identity and, once joined, its room.
#[derive(Debug)]
pub struct Session {
    player_id: PlayerId,
    room: Option<Joined>,
}

#[derive(Debug)]
struct Joined {
    handle: Arc<RoomHandle>,
    events: broadcast::Receiver<RoomEvent>,
}

impl Session {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            room: None,
        }
    }

    #[inline]
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|joined| joined.handle.id())
    }

    /// Next event of the joined room. Pends forever while in the lobby.
    pub async fn next_event(&mut self) -> Result<RoomEvent, broadcast::error::RecvError> {
        match &mut self.room {
            Some(joined) => joined.events.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Handle one client packet and return the direct replies.
    pub async fn handle_packet(&mut self, registry: &Arc<RoomRegistry>, packet: ClientPacket) -> Vec<BinaryWriter> {
        match packet {
            ClientPacket::Ping => vec![packets::build_pong()],
            ClientPacket::ListRooms => vec![packets::build_room_list(&registry.list().await)],
            ClientPacket::CreateRoom { name } => vec![self.create(registry, name).await],
            ClientPacket::JoinRoom { room_id, name } => vec![self.join(registry, &room_id, name).await],
            packet => {
                let Some(joined) = &self.room else {
                    debug!("Player {} sent {:?} outside a room", self.player_id, packet);
                    return Vec::new();
                };
                let handle = &joined.handle;
                let mut room = handle.lock().await;
                let reply = match packet {
                    ClientPacket::Direction(steer) => {
                        if let Err(e) = room.set_direction(self.player_id, steer) {
                            debug!("Direction from player {} ignored: {}", self.player_id, e);
                        }
                        None
                    }
                    ClientPacket::Start => {
                        let started = room.start(self.player_id);
                        if let Err(e) = &started {
                            info!("Player {} could not start room {}: {}", self.player_id, handle.id(), e);
                        }
                        Some(packets::build_start_result(started.is_ok()))
                    }
                    ClientPacket::Pause => {
                        let status = match room.toggle_pause(self.player_id) {
                            Ok(status) => status,
                            Err(e) => {
                                info!("Player {} could not pause room {}: {}", self.player_id, handle.id(), e);
                                room.status()
                            }
                        };
                        Some(packets::build_pause_result(status.code()))
                    }
                    ClientPacket::Kick { player_id } => {
                        if let Err(e) = room.kick(self.player_id, PlayerId(player_id)) {
                            info!("Player {} could not kick {}: {}", self.player_id, player_id, e);
                        }
                        None
                    }
                    _ => None,
                };
                handle.publish(&mut room);
                reply.into_iter().collect()
            }
        }
    }

    async fn create(&mut self, registry: &Arc<RoomRegistry>, name: String) -> BinaryWriter {
        if self.room.is_some() {
            return packets::build_join_result(false, "", self.player_id.0);
        }
        match registry.create(self.player_id, clean_name(&name)).await {
            Ok(handle) => {
                let events = handle.subscribe();
                handle.publish(&mut *handle.lock().await);
                let reply = packets::build_join_result(true, handle.id(), self.player_id.0);
                self.room = Some(Joined { handle, events });
                reply
            }
            Err(e) => {
                info!("Player {} could not create a room: {}", self.player_id, e);
                packets::build_join_result(false, "", self.player_id.0)
            }
        }
    }

    async fn join(&mut self, registry: &Arc<RoomRegistry>, room_id: &str, name: String) -> BinaryWriter {
        if self.room.is_some() {
            return packets::build_join_result(false, room_id, self.player_id.0);
        }
        let Some(handle) = registry.get(room_id).await else {
            debug!("Player {} asked for unknown room {}", self.player_id, room_id);
            return packets::build_join_result(false, room_id, self.player_id.0);
        };

        // Subscribe first so the join's own leaderboard reaches us.
        let events = handle.subscribe();
        let joined = {
            let mut room = handle.lock().await;
            let joined = room.join(self.player_id, clean_name(&name));
            handle.publish(&mut room);
            joined
        };
        match joined {
            Ok(()) => {
                self.room = Some(Joined { handle, events });
                packets::build_join_result(true, room_id, self.player_id.0)
            }
            Err(e) => {
                info!("Player {} could not join room {}: {}", self.player_id, room_id, e);
                packets::build_join_result(false, room_id, self.player_id.0)
            }
        }
    }

    /// Drop the room subscription without touching the room.
    pub fn detach(&mut self) {
        self.room = None;
    }

    /// Leave the joined room, removing it from the registry once empty.
    pub async fn leave(&mut self, registry: &RoomRegistry) {
        let Some(joined) = self.room.take() else {
            return;
        };
        let empty = {
            let mut room = joined.handle.lock().await;
            room.leave(self.player_id);
            joined.handle.publish(&mut room);
            room.is_empty()
        };
        if empty {
            registry.remove(joined.handle.id()).await;
        }
    }
}

/// Trim a display name and cap its length.
fn clean_name(name: &str) -> String {
    let name: String = name.trim().chars().filter(|c| !c.is_control()).take(MAX_NAME_CHARS).collect();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    }
}

/// Wire packet for a room event, or `None` when `me` should not see it.
pub fn encode_event(event: &RoomEvent, me: PlayerId) -> Option<BinaryWriter> {
    let packet = match event {
        RoomEvent::RoundStart => packets::build_round_start(),
        RoomEvent::RoundEnd => packets::build_round_end(),
        RoomEvent::Tick(diff) => packets::build_tick_diff(diff),
        RoomEvent::Leaderboard(entries) => packets::build_leaderboard(entries),
        RoomEvent::Paused => packets::build_paused(),
        RoomEvent::Resumed => packets::build_resumed(),
        RoomEvent::Kicked { player_id } if *player_id == me => packets::build_kicked(),
        RoomEvent::Kicked { .. } => return None,
    };
    Some(packet)
}
