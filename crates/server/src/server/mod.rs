//! WebSocket server.

use crate::config::Config;
use crate::entity::PlayerId;
use crate::registry::RoomRegistry;
use crate::room::RoomEvent;
use futures_util::{SinkExt, StreamExt};
use protocol::packets::ClientPacket;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, broadcast};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

mod session;

pub use session::{Session, encode_event};

/// Player ids are unique for the lifetime of the process.
static NEXT_PLAYER_ID: AtomicU32 = AtomicU32::new(1);

/// Connection tracking state (shared across connection handlers).
struct ConnectionState {
    total_connections: usize,
}

impl ConnectionState {
    fn new() -> Self {
        Self { total_connections: 0 }
    }

    /// Try to add a connection, returns true if allowed.
    fn try_add_connection(&mut self, max_total: usize) -> bool {
        if self.total_connections >= max_total {
            return false;
        }
        self.total_connections += 1;
        true
    }

    fn remove_connection(&mut self) {
        self.total_connections = self.total_connections.saturating_sub(1);
    }
}

/// Run the game server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{} at {} ticks/s", addr, config.server.tick_rate);

    let max_connections = config.server.max_connections;
    let registry = RoomRegistry::new(Arc::new(config));
    let conn_state = Arc::new(RwLock::new(ConnectionState::new()));

    loop {
        let (stream, addr) = listener.accept().await?;

        if !conn_state.write().await.try_add_connection(max_connections) {
            warn!("Connection rejected (limit reached): {}", addr);
            continue;
        }

        let registry = Arc::clone(&registry);
        let conn_state = Arc::clone(&conn_state);
        tokio::spawn(async move {
            let result = handle_connection(stream, addr, registry).await;

            // Always remove from connection tracking when done
            conn_state.write().await.remove_connection();

            if let Err(e) = result {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, registry: Arc<RoomRegistry>) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let player_id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
    info!("New connection from {} as player {}", addr, player_id);

    let (mut write, mut read) = ws_stream.split();
    let mut session = Session::new(player_id);

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Binary(data))) => {
                        let packet = match ClientPacket::parse(&data) {
                            Ok(packet) => packet,
                            Err(e) => {
                                warn!("Packet error from {}: {}", addr, e);
                                continue;
                            }
                        };
                        let mut failed = false;
                        for reply in session.handle_packet(&registry, packet).await {
                            if let Err(e) = write.send(Message::Binary(reply.finish().to_vec().into())).await {
                                warn!("Failed to send reply to {}: {}", addr, e);
                                failed = true;
                                break;
                            }
                        }
                        if failed {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", addr);
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    None => {
                        break;
                    }
                    _ => {}
                }
            }
            event = session.next_event() => {
                match event {
                    Ok(event) => {
                        let kicked = matches!(event, RoomEvent::Kicked { player_id: target } if target == player_id);
                        if let Some(packet) = encode_event(&event, player_id) {
                            if let Err(e) = write.send(Message::Binary(packet.finish().to_vec().into())).await {
                                warn!("Failed to send room event to {}: {}", addr, e);
                                break;
                            }
                        }
                        if kicked {
                            // The room already dropped us.
                            session.detach();
                            info!("Player {} was kicked, closing {}", player_id, addr);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Client {} lagged behind by {} room events", addr, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Room of player {} closed", player_id);
                        session.detach();
                    }
                }
            }
        }
    }

    session.leave(&registry).await;
    let _ = write.send(Message::Close(None)).await;
    Ok(())
}
