use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::{dispatch, error_response, ApiResponse, AppState};
use crate::models::server::{LoginBody, SignupBody, UserProfile};
use crate::services::users::UserRequest;

const SERVICE: &str = "user service";

pub async fn signup(State(state): State<AppState>, Json(body): Json<SignupBody>) -> ApiResponse {
    let result = dispatch(&state.user_channel, SERVICE, |response| UserRequest::Signup {
        identifier: body.identifier,
        display_name: body.display_name,
        password: body.password,
        role: body.role,
        response,
    })
    .await;

    match result {
        Ok(user) => (StatusCode::CREATED, Json(json!(UserProfile::from(user)))),
        Err(e) => error_response(e),
    }
}

pub async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> ApiResponse {
    let result = dispatch(&state.user_channel, SERVICE, |response| UserRequest::Login {
        identifier: body.identifier,
        password: body.password,
        response,
    })
    .await;

    match result {
        Ok(user) => (StatusCode::OK, Json(json!(UserProfile::from(user)))),
        Err(e) => error_response(e),
    }
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResponse {
    let result = dispatch(&state.user_channel, SERVICE, |response| UserRequest::GetUser {
        id: user_id,
        response,
    })
    .await;

    match result {
        Ok(user) => (StatusCode::OK, Json(json!(UserProfile::from(user)))),
        Err(e) => error_response(e),
    }
}

pub async fn pending_approvals(State(state): State<AppState>) -> ApiResponse {
    let result = dispatch(&state.user_channel, SERVICE, |response| {
        UserRequest::PendingApprovals { response }
    })
    .await;

    match result {
        Ok(users) => {
            let profiles: Vec<UserProfile> = users.into_iter().map(UserProfile::from).collect();
            (StatusCode::OK, Json(json!(profiles)))
        }
        Err(e) => error_response(e),
    }
}

pub async fn approve_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResponse {
    let result = dispatch(&state.user_channel, SERVICE, |response| {
        UserRequest::ApproveUser {
            id: user_id,
            response,
        }
    })
    .await;

    match result {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "message": "User approved",
                "user": UserProfile::from(user)
            })),
        ),
        Err(e) => error_response(e),
    }
}

pub async fn reject_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResponse {
    let result = dispatch(&state.user_channel, SERVICE, |response| {
        UserRequest::RejectUser {
            id: user_id,
            response,
        }
    })
    .await;

    match result {
        Ok(user) => (
            StatusCode::OK,
            Json(json!({
                "message": "User rejected",
                "user_id": user.id
            })),
        ),
        Err(e) => error_response(e),
    }
}
