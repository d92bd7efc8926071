use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use sea_orm::{DatabaseBackend, MockDatabase};

use biasrooms_backend::handlers::auth::USER_ID_HEADER;
use biasrooms_backend::{router, AppState};

/// Build an app over a mock Postgres connection pre-loaded with the given
/// query results. Suitable for endpoints whose query sequence is known.
pub fn mock_app(db: MockDatabase) -> Router {
    router(AppState::new(db.into_connection()))
}

/// App over an empty mock connection, for endpoints that fail validation or
/// authentication before touching the database.
pub fn app_without_db() -> Router {
    mock_app(MockDatabase::new(DatabaseBackend::Postgres))
}

/// Request with the identity header set, the way the auth gateway would.
pub fn authed_request(method: Method, uri: &str, user_id: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user_id)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

#[allow(dead_code)]
pub fn anonymous_request(method: Method, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}
