mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value as DbValue};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tower::ServiceExt;
use uuid::Uuid;

use biasrooms_backend::entities::{
    achievements, room_bias_votes, room_members, rooms, user_stats,
};

use crate::common::{anonymous_request, app_without_db, authed_request, mock_app};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_room(owner_id: &str) -> rooms::Model {
    rooms::Model {
        id: Uuid::new_v4(),
        name: "Futures desk".to_string(),
        owner_id: owner_id.to_string(),
        invite_code: "abcd1234".to_string(),
        timeframes: json!(["1D", "4H", "1H"]),
        created_at: Utc::now().fixed_offset(),
    }
}

fn vote_row(
    room_id: Uuid,
    timeframe: &str,
    user_id: &str,
    vote_type: &str,
) -> room_bias_votes::Model {
    room_bias_votes::Model {
        id: Uuid::new_v4(),
        room_id,
        timeframe: timeframe.to_string(),
        user_id: user_id.to_string(),
        vote_type: vote_type.to_string(),
        created_at: Utc::now().fixed_offset(),
    }
}

/// Result row the way SELECT COUNT(*) comes back through the paginator.
fn count_row(n: i64) -> BTreeMap<&'static str, DbValue> {
    BTreeMap::from([("num_items", DbValue::BigInt(Some(n)))])
}

fn fresh_stats(user_id: &str) -> user_stats::Model {
    let now = Utc::now().fixed_offset();
    user_stats::Model {
        user_id: user_id.to_string(),
        total_votes: 1,
        messages_sent: 0,
        rooms_visited: 0,
        current_streak: 1,
        longest_streak: 1,
        last_active_date: Some(Utc::now().date_naive()),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_presets_endpoint() {
    let app = app_without_db();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/timeframes/presets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let presets = json["presets"].as_array().unwrap();
    assert_eq!(presets.len(), 17);
    assert!(presets.iter().any(|p| p == "1D"));
    assert!(presets.iter().any(|p| p == "15m"));
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = app_without_db();

    let response = app
        .oneshot(anonymous_request(Method::GET, "/api/rooms", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_blank_identity_is_unauthorized() {
    let app = app_without_db();

    let response = app
        .oneshot(authed_request(
            Method::GET,
            "/api/notifications",
            "   ",
            Body::empty(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_room_requires_name() {
    let app = app_without_db();

    let body = Body::from(json!({ "name": "   " }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, "/api/rooms", "u1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_room_rejects_bad_timeframe() {
    let app = app_without_db();

    let body = Body::from(
        json!({ "name": "Futures desk", "timeframes": ["1D", "7x"] }).to_string(),
    );
    let response = app
        .oneshot(authed_request(Method::POST, "/api/rooms", "u1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("7x"));
}

#[tokio::test]
async fn test_create_room_rejects_too_many_timeframes() {
    let app = app_without_db();

    let labels: Vec<String> = (1..=8).map(|n| format!("{}h", n)).collect();
    let body = Body::from(json!({ "name": "Desk", "timeframes": labels }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, "/api/rooms", "u1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_requires_invite_code() {
    let app = app_without_db();

    let body = Body::from(json!({ "invite_code": "  " }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, "/api/rooms/join", "u1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_room_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<rooms::Model>::new()]);
    let app = mock_app(db);

    let uri = format!("/api/rooms/{}", Uuid::new_v4());
    let response = app
        .oneshot(authed_request(Method::GET, &uri, "u1", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_default_to_zero() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user_stats::Model>::new()]);
    let app = mock_app(db);

    let response = app
        .oneshot(authed_request(Method::GET, "/api/stats", "u1", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_votes"], 0);
    assert_eq!(json["current_streak"], 0);
    assert!(json["last_active_date"].is_null());
}

#[tokio::test]
async fn test_profile_username_rules_enforced() {
    let app = app_without_db();

    let body = Body::from(json!({ "username": "x" }).to_string());
    let response = app
        .oneshot(authed_request(Method::PUT, "/api/profile", "u1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dm_to_self_rejected() {
    let app = app_without_db();

    let body = Body::from(json!({ "message": "hi" }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, "/api/dm/u1", "u1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vote_same_verdict_toggles_off() {
    let room = sample_room("owner");
    let existing = vote_row(room.id, "4H", "owner", "agree");
    let uri = format!("/api/rooms/{}/votes", room.id);

    // Room lookup, own-vote read, delete (exec), two tallies, own-vote re-read
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![room]])
        .append_query_results([vec![existing]])
        .append_query_results([vec![count_row(0)], vec![count_row(0)]])
        .append_query_results([Vec::<room_bias_votes::Model>::new()])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
    let app = mock_app(db);

    let body = Body::from(json!({ "timeframe": "4H", "vote": "agree" }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, &uri, "owner", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["agree"], 0);
    assert_eq!(json["disagree"], 0);
    assert!(json["your_vote"].is_null());
}

#[tokio::test]
async fn test_vote_different_verdict_replaces() {
    let room = sample_room("owner");
    let existing = vote_row(room.id, "4H", "owner", "agree");
    let flipped = vote_row(room.id, "4H", "owner", "disagree");
    let uri = format!("/api/rooms/{}/votes", room.id);

    // Room lookup; own-vote read then the update's returned row; tallies;
    // own-vote re-read; stats row creation; achievement catalog scan
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![room]])
        .append_query_results([vec![existing], vec![flipped.clone()]])
        .append_query_results([vec![count_row(0)], vec![count_row(1)]])
        .append_query_results([vec![flipped]])
        .append_query_results([Vec::<user_stats::Model>::new()])
        .append_query_results([vec![fresh_stats("owner")]])
        .append_query_results([Vec::<achievements::Model>::new()]);
    let app = mock_app(db);

    let body = Body::from(json!({ "timeframe": "4H", "vote": "disagree" }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, &uri, "owner", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["agree"], 0);
    assert_eq!(json["disagree"], 1);
    assert_eq!(json["your_vote"], "disagree");
}

#[tokio::test]
async fn test_double_join_is_idempotent() {
    let room = sample_room("owner");
    let room_id = room.id;
    let membership = room_members::Model {
        id: Uuid::new_v4(),
        room_id,
        user_id: "u2".to_string(),
        joined_at: Utc::now().fixed_offset(),
    };

    // Invite-code lookup, then the existing membership row
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![room]])
        .append_query_results([vec![membership]]);
    let app = mock_app(db);

    let body = Body::from(json!({ "invite_code": "abcd1234" }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, "/api/rooms/join", "u2", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["already_member"], true);
    assert_eq!(json["room_id"], room_id.to_string());
}

#[tokio::test]
async fn test_join_race_reports_already_member() {
    let room = sample_room("owner");

    // No membership row on the read, then the conflict-swallowed insert
    // returns nothing, which surfaces as RecordNotInserted
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![room]])
        .append_query_results([Vec::<room_members::Model>::new()])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }]);
    let app = mock_app(db);

    let body = Body::from(json!({ "invite_code": "abcd1234" }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, "/api/rooms/join", "u2", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["already_member"], true);
}

#[tokio::test]
async fn test_sixth_owned_room_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(5)]]);
    let app = mock_app(db);

    let body = Body::from(json!({ "name": "Sixth" }).to_string());
    let response = app
        .oneshot(authed_request(Method::POST, "/api/rooms", "u1", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("maximum"));
}

#[tokio::test]
async fn test_tally_rejects_unknown_timeframe() {
    let room = sample_room("owner");
    let uri = format!("/api/rooms/{}/votes/2Y", room.id);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![room]]);
    let app = mock_app(db);

    let response = app
        .oneshot(authed_request(Method::GET, &uri, "owner", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("2Y"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_without_db();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
