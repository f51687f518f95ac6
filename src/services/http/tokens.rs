use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::{dispatch, error_response, error_response_with_status, ApiResponse, AppState};
use crate::error::DomainError;
use crate::services::tokens::TokenRequest;
use crate::services::ServiceError;

const SERVICE: &str = "token service";

pub async fn issue_token(
    State(state): State<AppState>,
    Path((issuer_id, token)): Path<(i64, String)>,
) -> ApiResponse {
    let result = dispatch(&state.token_channel, SERVICE, |response| {
        TokenRequest::IssueToken {
            issuer_id,
            token_value: token,
            response,
        }
    })
    .await;

    match result {
        Ok(token) => (StatusCode::CREATED, Json(json!(token))),
        Err(e) => error_response(e),
    }
}

pub async fn redeem_token(
    State(state): State<AppState>,
    Path((redeemer_id, token)): Path<(i64, String)>,
) -> ApiResponse {
    let result = dispatch(&state.token_channel, SERVICE, |response| {
        TokenRequest::RedeemToken {
            redeemer_id,
            token_value: token,
            response,
        }
    })
    .await;

    match result {
        Ok(token) => (StatusCode::OK, Json(json!(token))),
        // An unknown token value is a bad request, not a missing resource.
        Err(e @ ServiceError::Domain(DomainError::NotFound { entity: "Token", .. })) => {
            error_response_with_status(StatusCode::BAD_REQUEST, e)
        }
        Err(e) => error_response(e),
    }
}

pub async fn used_tokens(State(state): State<AppState>) -> ApiResponse {
    tokens_by_usage(state, true).await
}

pub async fn unused_tokens(State(state): State<AppState>) -> ApiResponse {
    tokens_by_usage(state, false).await
}

async fn tokens_by_usage(state: AppState, is_used: bool) -> ApiResponse {
    let result = dispatch(&state.token_channel, SERVICE, |response| {
        TokenRequest::ListByUsage { is_used, response }
    })
    .await;

    match result {
        Ok(tokens) => (StatusCode::OK, Json(json!(tokens))),
        Err(e) => error_response(e),
    }
}

pub async fn owned_tokens(
    State(state): State<AppState>,
    Path(redeemer_id): Path<i64>,
) -> ApiResponse {
    let result = dispatch(&state.token_channel, SERVICE, |response| {
        TokenRequest::OwnedBy {
            redeemer_id,
            response,
        }
    })
    .await;

    match result {
        Ok(tokens) => (StatusCode::OK, Json(json!(tokens))),
        Err(e) => error_response(e),
    }
}
