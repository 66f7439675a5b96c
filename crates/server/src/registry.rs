//! Room registry and the per-room tick loop.

use crate::config::Config;
use crate::entity::PlayerId;
use crate::error::RoomError;
use crate::room::{Room, RoomEvent, RoomId};
use protocol::packets::RoomInfo;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, MutexGuard, RwLock, broadcast};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Capacity of each room's event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A live room plus the channel its events are published on.
#[derive(Debug)]
pub struct RoomHandle {
    id: RoomId,
    room: Mutex<Room>,
    events: broadcast::Sender<RoomEvent>,
}

impl RoomHandle {
    fn new(room: Room) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            id: room.id().to_string(),
            room: Mutex::new(room),
            events,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn lock(&self) -> MutexGuard<'_, Room> {
        self.room.lock().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    /// Send every queued event of `room` to the subscribers.
    pub fn publish(&self, room: &mut Room) {
        for event in room.drain_events() {
            // No subscribers just means nobody is listening right now.
            let _ = self.events.send(event);
        }
    }
}

/// Every room of the server, by id.
#[derive(Debug)]
pub struct RoomRegistry {
    config: Arc<Config>,
    rooms: RwLock<HashMap<RoomId, Arc<RoomHandle>>>,
}

impl RoomRegistry {
    pub fn new(config: Arc<Config>) -> Arc<Self> {
        Arc::new(Self {
            config,
            rooms: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a room with `player` as its first member and moderator, and
    /// start its tick loop.
    ///
    /// The join leaves a leaderboard event queued; publish it once the
    /// creator has subscribed.
    pub async fn create(self: &Arc<Self>, player: PlayerId, name: String) -> Result<Arc<RoomHandle>, RoomError> {
        let id = Uuid::new_v4().to_string();
        let mut room = Room::new(id.clone(), &self.config, rand::random());
        room.join(player, name)?;

        let handle = Arc::new(RoomHandle::new(room));
        self.rooms.write().await.insert(id.clone(), Arc::clone(&handle));
        info!("Room {} created by player {}", id, player);

        let registry = Arc::clone(self);
        let loop_handle = Arc::clone(&handle);
        tokio::spawn(async move {
            run_room_loop(registry, loop_handle).await;
        });
        Ok(handle)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<RoomHandle>> {
        self.rooms.read().await.get(id).cloned()
    }

    /// Listing rows for every room, oldest first.
    pub async fn list(&self) -> Vec<RoomInfo> {
        let handles: Vec<Arc<RoomHandle>> = self.rooms.read().await.values().cloned().collect();
        let mut rooms = Vec::with_capacity(handles.len());
        for handle in handles {
            rooms.push(handle.lock().await.info());
        }
        rooms.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        rooms
    }

    pub async fn remove(&self, id: &str) -> Option<Arc<RoomHandle>> {
        let removed = self.rooms.write().await.remove(id);
        if removed.is_some() {
            info!("Room {} removed", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }
}

/// Drive one room at the configured tick rate until its last member
/// leaves, then drop it from the registry.
pub async fn run_room_loop(registry: Arc<RoomRegistry>, handle: Arc<RoomHandle>) {
    let tick_interval = registry.config().tick_interval();
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let tick_start = Instant::now();
        {
            let mut room = handle.lock().await;
            if room.is_empty() {
                break;
            }
            room.tick();
            handle.publish(&mut room);
        }

        let elapsed = tick_start.elapsed();
        if elapsed > tick_interval.mul_f32(0.9) {
            warn!(
                "Slow tick in room {}: {:.3}ms (budget: {:.3}ms)",
                handle.id(),
                elapsed.as_secs_f64() * 1000.0,
                tick_interval.as_secs_f64() * 1000.0
            );
        }
    }

    debug!("Tick loop of room {} finished", handle.id());
    registry.remove(handle.id()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn registry() -> Arc<RoomRegistry> {
        let mut config = Config::default();
        config.server.tick_rate = 1000;
        RoomRegistry::new(Arc::new(config))
    }

    #[tokio::test]
    async fn test_create_lists_and_gets() {
        let registry = registry();
        let handle = registry.create(PlayerId(1), "alice".into()).await.unwrap();
        assert!(Uuid::parse_str(handle.id()).is_ok());

        let rooms = registry.list().await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, handle.id());
        assert_eq!(rooms[0].players, 1);
        assert_eq!(rooms[0].max_players, 8);

        let found = registry.get(handle.id()).await.unwrap();
        assert!(Arc::ptr_eq(&found, &handle));
        assert!(registry.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let registry = registry();
        let handle = registry.create(PlayerId(1), "alice".into()).await.unwrap();
        let mut events = handle.subscribe();
        {
            let mut room = handle.lock().await;
            room.join(PlayerId(2), "bob".into()).unwrap();
            handle.publish(&mut room);
        }
        match events.recv().await.unwrap() {
            RoomEvent::Leaderboard(rows) => assert_eq!(rows[0].name, "alice"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_room_is_dropped() {
        let registry = registry();
        let handle = registry.create(PlayerId(1), "alice".into()).await.unwrap();
        handle.lock().await.leave(PlayerId(1));

        for _ in 0..100 {
            if registry.len().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_stale_handle_cannot_join_closed_room() {
        let registry = registry();
        let handle = registry.create(PlayerId(1), "alice".into()).await.unwrap();
        let stale = registry.get(handle.id()).await.unwrap();

        handle.lock().await.leave(PlayerId(1));
        registry.remove(handle.id()).await;

        let joined = stale.lock().await.join(PlayerId(2), "bob".into());
        assert_eq!(joined, Err(RoomError::RoomClosed));
        assert!(stale.lock().await.is_empty());
        assert!(registry.get(handle.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = registry();
        let handle = registry.create(PlayerId(1), "alice".into()).await.unwrap();
        assert!(registry.remove(handle.id()).await.is_some());
        assert!(registry.remove(handle.id()).await.is_none());
    }
}
