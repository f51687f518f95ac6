use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::{dispatch, error_response, ApiResponse, AppState};
use crate::services::notifications::NotificationRequest;

const SERVICE: &str = "notification service";

pub async fn list(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResponse {
    let result = dispatch(&state.notification_channel, SERVICE, |response| {
        NotificationRequest::List { user_id, response }
    })
    .await;

    match result {
        Ok(notifications) => (StatusCode::OK, Json(json!(notifications))),
        Err(e) => error_response(e),
    }
}

pub async fn mark_read(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResponse {
    let result = dispatch(&state.notification_channel, SERVICE, |response| {
        NotificationRequest::MarkRead { id, response }
    })
    .await;

    match result {
        Ok(notification) => (StatusCode::OK, Json(json!(notification))),
        Err(e) => error_response(e),
    }
}

pub async fn mark_all_read(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResponse {
    let result = dispatch(&state.notification_channel, SERVICE, |response| {
        NotificationRequest::MarkAllRead { user_id, response }
    })
    .await;

    match result {
        Ok(marked) => (StatusCode::OK, Json(json!({ "marked": marked }))),
        Err(e) => error_response(e),
    }
}

pub async fn unread_count(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResponse {
    let result = dispatch(&state.notification_channel, SERVICE, |response| {
        NotificationRequest::UnreadCount { user_id, response }
    })
    .await;

    match result {
        Ok(count) => (StatusCode::OK, Json(json!({ "unread_count": count }))),
        Err(e) => error_response(e),
    }
}
