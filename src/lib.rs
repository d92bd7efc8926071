// src/lib.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::{events::RoomEventBus, presence::PresenceRegistry};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub events: RoomEventBus,
    pub presence: PresenceRegistry,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            events: RoomEventBus::new(),
            presence: PresenceRegistry::new(),
        }
    }
}

pub mod entities {
    pub mod achievements;
    pub mod direct_messages;
    pub mod favorite_rooms;
    pub mod friendships;
    pub mod notifications;
    pub mod profiles;
    pub mod room_bias;
    pub mod room_bias_votes;
    pub mod room_members;
    pub mod room_messages;
    pub mod room_sessions;
    pub mod rooms;
    pub mod user_achievements;
    pub mod user_stats;
}

pub mod services {
    pub mod achievements;
    pub mod bias;
    pub mod events;
    pub mod invite;
    pub mod notify;
    pub mod presence;
    pub mod stats;
    pub mod timeframes;
}

pub mod models {
    pub mod bias;
    pub mod chat;
    pub mod error;
    pub mod event;
    pub mod friend;
    pub mod notification;
    pub mod profile;
    pub mod room;
    pub mod session;
    pub mod stats;
    pub mod vote;
}

pub mod handlers {
    pub mod auth;
    pub mod bias;
    pub mod chat;
    pub mod friends;
    pub mod notifications;
    pub mod profile;
    pub mod room_ws;
    pub mod rooms;
    pub mod sessions;
    pub mod stats;
    pub mod votes;
}

pub mod jobs {
    pub mod presence_sweep;
}

/// Assemble the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/rooms", post(handlers::rooms::create_room))
        .route("/api/rooms", get(handlers::rooms::list_rooms))
        .route("/api/rooms/join", post(handlers::rooms::join_room))
        .route("/api/rooms/{id}", get(handlers::rooms::get_room))
        .route("/api/rooms/{id}", delete(handlers::rooms::delete_room))
        .route("/api/rooms/{id}/members", get(handlers::rooms::list_members))
        .route("/api/rooms/{id}/bias", get(handlers::bias::get_bias))
        .route(
            "/api/rooms/{id}/bias/advance",
            post(handlers::bias::advance_bias),
        )
        .route(
            "/api/rooms/{id}/bias/reset",
            post(handlers::bias::reset_bias),
        )
        .route(
            "/api/rooms/{id}/timeframes",
            post(handlers::bias::add_timeframe),
        )
        .route(
            "/api/rooms/{id}/timeframes/{label}",
            delete(handlers::bias::remove_timeframe),
        )
        .route("/api/timeframes/presets", get(handlers::bias::presets))
        .route(
            "/api/rooms/{id}/votes/{timeframe}",
            get(handlers::votes::get_tally),
        )
        .route("/api/rooms/{id}/votes", post(handlers::votes::cast_vote))
        .route(
            "/api/rooms/{id}/messages",
            get(handlers::chat::room_history),
        )
        .route(
            "/api/rooms/{id}/messages",
            post(handlers::chat::send_message),
        )
        .route(
            "/api/rooms/{id}/sessions",
            post(handlers::sessions::start_session),
        )
        .route(
            "/api/rooms/{id}/sessions",
            get(handlers::sessions::list_sessions),
        )
        .route(
            "/api/rooms/{id}/sessions/end",
            post(handlers::sessions::end_session),
        )
        .route("/api/rooms/{id}/ws", get(handlers::room_ws::room_websocket))
        .route("/api/favorites", get(handlers::rooms::list_favorites))
        .route(
            "/api/favorites/{room_id}",
            post(handlers::rooms::add_favorite),
        )
        .route(
            "/api/favorites/{room_id}",
            delete(handlers::rooms::remove_favorite),
        )
        .route("/api/friends", get(handlers::friends::list_friends))
        .route(
            "/api/friends/requests",
            post(handlers::friends::send_request),
        )
        .route(
            "/api/friends/requests",
            get(handlers::friends::pending_requests),
        )
        .route(
            "/api/friends/requests/{id}/accept",
            post(handlers::friends::accept_request),
        )
        .route(
            "/api/friends/requests/{id}/decline",
            post(handlers::friends::decline_request),
        )
        .route(
            "/api/friends/{peer_id}",
            delete(handlers::friends::remove_friend),
        )
        .route("/api/dm/{peer_id}", get(handlers::chat::dm_conversation))
        .route("/api/dm/{peer_id}", post(handlers::chat::send_dm))
        .route("/api/notifications", get(handlers::notifications::list))
        .route(
            "/api/notifications/read_all",
            post(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/{id}/read",
            post(handlers::notifications::mark_read),
        )
        .route("/api/profile", get(handlers::profile::get_own))
        .route("/api/profile", put(handlers::profile::update_own))
        .route("/api/profiles/{user_id}", get(handlers::profile::get_public))
        .route("/api/stats", get(handlers::stats::get_stats))
        .route(
            "/api/achievements",
            get(handlers::stats::get_achievements),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
