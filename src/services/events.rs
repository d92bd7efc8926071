//! Per-room event bus
//!
//! Handlers publish typed [`RoomEvent`]s; each room WebSocket task holds a
//! broadcast receiver for its room only, so there is no cross-room ordering
//! coupling. Channels are created lazily and dropped once the last
//! subscriber is gone.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::models::event::RoomEvent;

/// Capacity per room channel; slow consumers that lag past this are dropped
/// by the broadcast channel and resync on reconnect
const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct RoomEventBus {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<RoomEvent>>>>,
}

impl RoomEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event to a room's subscribers. A room nobody is watching
    /// has no channel; the event is dropped, which is fine since every
    /// event carries absolute state and reconnects start from a snapshot.
    pub async fn publish(&self, room_id: Uuid, event: RoomEvent) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&room_id) {
            // Ignore errors if no subscribers
            let _ = tx.send(event);
        }
    }

    /// Subscribe to a room's feed, creating the channel on first use.
    pub async fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<RoomEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop channels with no remaining subscribers. Called when a socket
    /// disconnects and by the presence sweep.
    pub async fn gc(&self) {
        let mut channels = self.channels.write().await;
        let before = channels.len();
        channels.retain(|_, tx| tx.receiver_count() > 0);
        let dropped = before - channels.len();
        if dropped > 0 {
            debug!("Dropped {} idle room channels", dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = RoomEventBus::new();
        let room_id = Uuid::new_v4();
        let mut rx = bus.subscribe(room_id).await;

        bus.publish(
            room_id,
            RoomEvent::TimeframesChanged {
                room_id,
                timeframes: vec!["1D".to_string()],
            },
        )
        .await;

        match rx.recv().await.unwrap() {
            RoomEvent::TimeframesChanged { timeframes, .. } => {
                assert_eq!(timeframes, vec!["1D".to_string()]);
            }
            _ => panic!("wrong event"),
        }
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let bus = RoomEventBus::new();
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();
        let mut rx_b = bus.subscribe(room_b).await;

        bus.publish(
            room_a,
            RoomEvent::TimeframesChanged {
                room_id: room_a,
                timeframes: vec![],
            },
        )
        .await;

        assert!(matches!(
            rx_b.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = RoomEventBus::new();
        bus.publish(
            Uuid::new_v4(),
            RoomEvent::TimeframesChanged {
                room_id: Uuid::new_v4(),
                timeframes: vec![],
            },
        )
        .await;
    }

    #[tokio::test]
    async fn test_gc_drops_abandoned_channels() {
        let bus = RoomEventBus::new();
        let room_id = Uuid::new_v4();
        let rx = bus.subscribe(room_id).await;
        drop(rx);
        bus.gc().await;
        assert!(bus.channels.read().await.is_empty());
    }
}
