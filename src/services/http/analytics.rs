use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::{dispatch, error_response, ApiResponse, AppState};
use crate::models::server::RecentActivityQuery;
use crate::repositories::analytics::DEFAULT_RECENT_ACTIVITY;
use crate::services::analytics::AnalyticsRequest;

const SERVICE: &str = "analytics service";

pub async fn dashboard(State(state): State<AppState>) -> ApiResponse {
    let result = dispatch(&state.analytics_channel, SERVICE, |response| {
        AnalyticsRequest::Dashboard { response }
    })
    .await;

    match result {
        Ok(stats) => (StatusCode::OK, Json(json!(stats))),
        Err(e) => error_response(e),
    }
}

pub async fn rides_by_status(State(state): State<AppState>) -> ApiResponse {
    let result = dispatch(&state.analytics_channel, SERVICE, |response| {
        AnalyticsRequest::RidesByStatus { response }
    })
    .await;

    match result {
        Ok(counts) => (StatusCode::OK, Json(json!(counts))),
        Err(e) => error_response(e),
    }
}

pub async fn popular_destinations(State(state): State<AppState>) -> ApiResponse {
    let result = dispatch(&state.analytics_channel, SERVICE, |response| {
        AnalyticsRequest::PopularDestinations { response }
    })
    .await;

    match result {
        Ok(destinations) => (StatusCode::OK, Json(json!(destinations))),
        Err(e) => error_response(e),
    }
}

pub async fn recent_activity(
    State(state): State<AppState>,
    Query(query): Query<RecentActivityQuery>,
) -> ApiResponse {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_ACTIVITY);
    let result = dispatch(&state.analytics_channel, SERVICE, |response| {
        AnalyticsRequest::RecentActivity { limit, response }
    })
    .await;

    match result {
        Ok(rides) => (StatusCode::OK, Json(json!(rides))),
        Err(e) => error_response(e),
    }
}
