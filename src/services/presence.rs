//! In-memory presence registry
//!
//! Tracks who is connected to each room's feed. Sockets register on
//! connect, refresh on heartbeat and deregister on close; the sweep job
//! expires entries whose socket died without a clean close.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::event::PresenceUser;

#[derive(Debug, Clone)]
struct PresenceEntry {
    username: Option<String>,
    online_at: DateTime<Utc>,
    last_seen: Instant,
}

#[derive(Clone, Default)]
pub struct PresenceRegistry {
    rooms: Arc<RwLock<HashMap<Uuid, HashMap<String, PresenceEntry>>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in a room. Re-joining refreshes the entry rather
    /// than duplicating it.
    pub async fn join(&self, room_id: Uuid, user_id: &str, username: Option<String>) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(room_id).or_default().insert(
            user_id.to_string(),
            PresenceEntry {
                username,
                online_at: Utc::now(),
                last_seen: Instant::now(),
            },
        );
    }

    /// Refresh a user's liveness without changing their join time.
    pub async fn heartbeat(&self, room_id: Uuid, user_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(users) = rooms.get_mut(&room_id) {
            if let Some(entry) = users.get_mut(user_id) {
                entry.last_seen = Instant::now();
            }
        }
    }

    /// Remove a user from a room. Returns true when the roster changed.
    pub async fn leave(&self, room_id: Uuid, user_id: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(users) = rooms.get_mut(&room_id) else {
            return false;
        };
        let removed = users.remove(user_id).is_some();
        if users.is_empty() {
            rooms.remove(&room_id);
        }
        removed
    }

    /// Current roster for a room.
    pub async fn snapshot(&self, room_id: Uuid) -> Vec<PresenceUser> {
        let rooms = self.rooms.read().await;
        let Some(users) = rooms.get(&room_id) else {
            return Vec::new();
        };
        let mut online: Vec<PresenceUser> = users
            .iter()
            .map(|(user_id, entry)| PresenceUser {
                user_id: user_id.clone(),
                username: entry.username.clone(),
                online_at: entry.online_at,
            })
            .collect();
        online.sort_by(|a, b| a.online_at.cmp(&b.online_at));
        online
    }

    /// Number of users present in a room.
    pub async fn count(&self, room_id: Uuid) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(&room_id).map(|u| u.len()).unwrap_or(0)
    }

    /// Expire entries not refreshed within `ttl`. Returns the rooms whose
    /// roster changed so the caller can broadcast corrections.
    pub async fn sweep(&self, ttl: Duration) -> Vec<Uuid> {
        let mut rooms = self.rooms.write().await;
        let mut changed = Vec::new();
        rooms.retain(|room_id, users| {
            let before = users.len();
            users.retain(|_, entry| entry.last_seen.elapsed() < ttl);
            if users.len() != before {
                changed.push(*room_id);
            }
            !users.is_empty()
        });
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_and_snapshot() {
        let registry = PresenceRegistry::new();
        let room_id = Uuid::new_v4();
        registry.join(room_id, "u1", Some("ada".to_string())).await;
        registry.join(room_id, "u2", None).await;

        let online = registry.snapshot(room_id).await;
        assert_eq!(online.len(), 2);
        assert_eq!(registry.count(room_id).await, 2);
    }

    #[tokio::test]
    async fn test_rejoin_does_not_duplicate() {
        let registry = PresenceRegistry::new();
        let room_id = Uuid::new_v4();
        registry.join(room_id, "u1", None).await;
        registry.join(room_id, "u1", Some("ada".to_string())).await;
        assert_eq!(registry.count(room_id).await, 1);
    }

    #[tokio::test]
    async fn test_leave_clears_empty_rooms() {
        let registry = PresenceRegistry::new();
        let room_id = Uuid::new_v4();
        registry.join(room_id, "u1", None).await;
        assert!(registry.leave(room_id, "u1").await);
        assert!(!registry.leave(room_id, "u1").await);
        assert_eq!(registry.count(room_id).await, 0);
    }

    #[tokio::test]
    async fn test_sweep_expires_stale_entries() {
        let registry = PresenceRegistry::new();
        let room_id = Uuid::new_v4();
        registry.join(room_id, "u1", None).await;

        // Nothing is stale yet
        assert!(registry.sweep(Duration::from_secs(60)).await.is_empty());

        // With a zero TTL everything is stale
        let changed = registry.sweep(Duration::ZERO).await;
        assert_eq!(changed, vec![room_id]);
        assert_eq!(registry.count(room_id).await, 0);
    }
}
