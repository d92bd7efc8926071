use tokio::time::{interval, Duration};

use crate::models::event::RoomEvent;
use crate::services::events::RoomEventBus;
use crate::services::presence::PresenceRegistry;

/// Entries not refreshed within this window are considered gone
const PRESENCE_TTL: Duration = Duration::from_secs(90);
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically expire presence entries whose socket died without a clean
/// close, broadcast corrected rosters and drop idle room channels.
pub async fn start_presence_sweep_job(presence: PresenceRegistry, events: RoomEventBus) {
    tokio::spawn(async move {
        let mut ticker = interval(SWEEP_INTERVAL);

        loop {
            ticker.tick().await;

            let changed = presence.sweep(PRESENCE_TTL).await;
            for room_id in changed {
                tracing::debug!("Presence sweep expired entries in room {}", room_id);
                let online = presence.snapshot(room_id).await;
                events
                    .publish(room_id, RoomEvent::Presence { room_id, online })
                    .await;
            }

            events.gc().await;
        }
    });
}
