use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::{mpsc, oneshot};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{
    analytics::AnalyticsRequest, notifications::NotificationRequest, ratings::RatingRequest,
    rides::RideServiceRequest, tokens::TokenRequest, users::UserRequest, ServiceError,
};
use crate::error::DomainError;

pub mod analytics;
pub mod notifications;
pub mod ratings;
pub mod rides;
pub mod tokens;
pub mod users;

#[derive(Clone)]
pub struct AppState {
    pub ride_channel: mpsc::Sender<RideServiceRequest>,
    pub rating_channel: mpsc::Sender<RatingRequest>,
    pub token_channel: mpsc::Sender<TokenRequest>,
    pub user_channel: mpsc::Sender<UserRequest>,
    pub notification_channel: mpsc::Sender<NotificationRequest>,
    pub analytics_channel: mpsc::Sender<AnalyticsRequest>,
}

pub type ApiResponse = (StatusCode, Json<Value>);

/// Sends a request built around a fresh oneshot sender to `channel` and waits
/// for the service's answer.
pub async fn dispatch<T, R>(
    channel: &mpsc::Sender<T>,
    service: &str,
    build: impl FnOnce(oneshot::Sender<Result<R, ServiceError>>) -> T,
) -> Result<R, ServiceError> {
    let (response_tx, response_rx) = oneshot::channel();

    channel
        .send(build(response_tx))
        .await
        .map_err(|e| ServiceError::Communication(service.to_string(), e.to_string()))?;

    response_rx
        .await
        .map_err(|e| ServiceError::Communication(service.to_string(), e.to_string()))?
}

pub fn status_for(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Domain(domain) => match domain {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::InvalidState(_)
            | DomainError::Validation(_)
            | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ServiceError::Communication(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(error: ServiceError) -> ApiResponse {
    error_response_with_status(status_for(&error), error)
}

pub fn error_response_with_status(status: StatusCode, error: ServiceError) -> ApiResponse {
    let kind = match &error {
        ServiceError::Domain(domain) => domain.kind(),
        ServiceError::Communication(_, _) => "communication",
    };

    if status.is_server_error() {
        log::error!("Request failed: {}", error);
    }

    (
        status,
        Json(json!({
            "error": kind,
            "details": error.to_string()
        })),
    )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/signup", post(users::signup))
        .route("/auth/login", post(users::login))
        .route("/auth/me/{user_id}", get(users::get_user))
        .route("/admin/pending", get(users::pending_approvals))
        .route("/admin/approve/{user_id}", post(users::approve_user))
        .route("/admin/reject/{user_id}", post(users::reject_user))
        .route("/request/create", get(rides::create_request))
        .route("/request/check", get(rides::check_status))
        .route("/request/history", get(rides::consumer_history))
        .route("/puller/requests", get(rides::pending_requests))
        .route("/puller/accept", post(rides::accept_ride))
        .route("/puller/reject", post(rides::reject_ride))
        .route("/puller/complete", post(rides::complete_ride))
        .route("/puller/accepted", get(rides::accepted_rides))
        .route("/puller/completed", get(rides::completed_rides))
        .route("/puller/history", get(rides::puller_history))
        .route("/rating/submit", post(ratings::submit_rating))
        .route("/rating/puller/{puller_id}", get(ratings::puller_ratings))
        .route("/notifications/{user_id}", get(notifications::list))
        .route("/notifications/mark-read/{id}", post(notifications::mark_read))
        .route(
            "/notifications/mark-all-read/{user_id}",
            post(notifications::mark_all_read),
        )
        .route(
            "/notifications/unread-count/{user_id}",
            get(notifications::unread_count),
        )
        .route("/analytics/dashboard", get(analytics::dashboard))
        .route("/analytics/rides-by-status", get(analytics::rides_by_status))
        .route(
            "/analytics/popular-destinations",
            get(analytics::popular_destinations),
        )
        .route("/analytics/recent-activity", get(analytics::recent_activity))
        .route(
            "/manager/create-token/{issuer_id}/{token}",
            post(tokens::issue_token),
        )
        .route("/manager/used/token", get(tokens::used_tokens))
        .route("/manager/unused/token", get(tokens::unused_tokens))
        .route("/student/use/{redeemer_id}/{token}", post(tokens::redeem_token))
        .route("/student/used/{redeemer_id}", get(tokens::owned_tokens))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(listen: &str, state: AppState) -> Result<(), anyhow::Error> {
    let app = build_router(state);

    let listener = TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("HTTP server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl+C, shutting down."),
            Err(e) => {
                log::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down.");
            }
            Err(e) => {
                log::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::repositories::store::MemoryStore;
    use crate::repositories::users::credentials::Argon2Hasher;
    use crate::services::spawn_services;

    fn app() -> Router {
        let state = spawn_services(Arc::new(MemoryStore::new()), Arc::new(Argon2Hasher), 16);
        build_router(state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    async fn signup(app: &Router, identifier: &str, role: &str) -> i64 {
        let (status, body) = call(
            app,
            Method::POST,
            "/auth/signup",
            Some(json!({
                "identifier": identifier,
                "password": "hunter22",
                "role": role
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let app = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ride_flow_over_http() {
        let app = app();
        let consumer = signup(&app, "consumer@campus", "consumer").await;
        let puller = signup(&app, "puller@campus", "puller").await;

        let (status, created) = call(
            &app,
            Method::GET,
            &format!("/request/create?destination=PAHARTALI&consumer_id={}", consumer),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["status"], "pending");
        let ride_id = created["request_id"].as_i64().unwrap();

        let (status, check) = call(
            &app,
            Method::GET,
            &format!("/request/check?id={}", ride_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(check, json!("pending"));

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/puller/accept?ride_id={}&puller_id={}", ride_id, puller),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/puller/accept?ride_id={}&puller_id={}", ride_id, puller),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_state");

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/puller/complete?ride_id={}&puller_id={}", ride_id, puller + 100),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/puller/complete?ride_id={}&puller_id={}", ride_id, puller),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points_awarded"], 100);

        let (status, body) = call(
            &app,
            Method::POST,
            "/rating/submit",
            Some(json!({"ride_id": ride_id, "rating": 6})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");

        let (status, _) = call(
            &app,
            Method::POST,
            "/rating/submit",
            Some(json!({"ride_id": ride_id, "rating": 4, "review": "smooth"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, check) = call(
            &app,
            Method::GET,
            &format!("/request/check?id={}", ride_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(check, "completed");

        let (_, unread) = call(
            &app,
            Method::GET,
            &format!("/notifications/unread-count/{}", consumer),
            None,
        )
        .await;
        assert_eq!(unread["unread_count"], 2);
    }

    #[tokio::test]
    async fn unknown_ride_is_not_found() {
        let app = app();

        let (status, body) = call(&app, Method::GET, "/request/check?id=42", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn token_routes_follow_status_table() {
        let app = app();
        let manager = signup(&app, "manager@campus", "manager").await;
        let student = signup(&app, "student@campus", "student").await;

        let (status, token) = call(
            &app,
            Method::POST,
            &format!("/manager/create-token/{}/ABC123", manager),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(token["is_used"], false);

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/manager/create-token/{}/ABC123", manager),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "conflict");

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/student/use/{}/NOPE", student),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "not_found");

        let (status, redeemed) = call(
            &app,
            Method::POST,
            &format!("/student/use/{}/ABC123", student),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(redeemed["owned_by"], student);

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/student/use/{}/ABC123", student),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, used) = call(&app, Method::GET, "/manager/used/token", None).await;
        assert_eq!(used.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn login_requires_approval_for_pullers() {
        let app = app();
        let puller = signup(&app, "puller@campus", "puller").await;
        let credentials = json!({"identifier": "puller@campus", "password": "hunter22"});

        let (status, _) = call(&app, Method::POST, "/auth/login", Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/admin/approve/{}", puller),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, profile) = call(&app, Method::POST, "/auth/login", Some(credentials)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["role"], "puller");
        assert!(profile.get("credential_hash").is_none());

        let (status, _) = call(
            &app,
            Method::POST,
            "/auth/login",
            Some(json!({"identifier": "puller@campus", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
