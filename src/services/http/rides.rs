use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::{dispatch, error_response, ApiResponse, AppState};
use crate::models::rides::{NewRideRequest, RideStatus};
use crate::models::server::{
    CompletedRide, ConsumerQuery, CreatedRide, PullerQuery, RideAction, RideActionQuery,
    RideIdQuery,
};
use crate::services::rides::RideServiceRequest;

const SERVICE: &str = "ride service";

pub async fn create_request(
    State(state): State<AppState>,
    Query(request): Query<NewRideRequest>,
) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::CreateRequest { request, response }
    })
    .await;

    match result {
        Ok(ride) => (StatusCode::OK, Json(json!(CreatedRide::from(ride)))),
        Err(e) => error_response(e),
    }
}

pub async fn check_status(
    State(state): State<AppState>,
    Query(query): Query<RideIdQuery>,
) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::GetRide {
            ride_id: query.id,
            response,
        }
    })
    .await;

    match result {
        // The consumer device compares the body against the bare status string.
        Ok(ride) => (StatusCode::OK, Json(json!(ride.status))),
        Err(e) => error_response(e),
    }
}

pub async fn consumer_history(
    State(state): State<AppState>,
    Query(query): Query<ConsumerQuery>,
) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::ConsumerHistory {
            consumer_id: query.consumer_id,
            response,
        }
    })
    .await;

    match result {
        Ok(rides) => (StatusCode::OK, Json(json!(rides))),
        Err(e) => error_response(e),
    }
}

pub async fn pending_requests(State(state): State<AppState>) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::PendingRequests { response }
    })
    .await;

    match result {
        Ok(rides) => (StatusCode::OK, Json(json!(rides))),
        Err(e) => error_response(e),
    }
}

pub async fn accept_ride(
    State(state): State<AppState>,
    Query(query): Query<RideActionQuery>,
) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::AcceptRide {
            ride_id: query.ride_id,
            puller_id: query.puller_id,
            response,
        }
    })
    .await;

    match result {
        Ok(ride) => {
            let action = RideAction {
                message: "Ride accepted".to_string(),
                ride_id: ride.id,
                status: ride.status,
            };
            (StatusCode::OK, Json(json!(action)))
        }
        Err(e) => error_response(e),
    }
}

pub async fn reject_ride(
    State(state): State<AppState>,
    Query(query): Query<RideActionQuery>,
) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::RejectRide {
            ride_id: query.ride_id,
            puller_id: query.puller_id,
            response,
        }
    })
    .await;

    match result {
        Ok(ride) => {
            let action = RideAction {
                message: "Ride rejected".to_string(),
                ride_id: ride.id,
                status: ride.status,
            };
            (StatusCode::OK, Json(json!(action)))
        }
        Err(e) => error_response(e),
    }
}

pub async fn complete_ride(
    State(state): State<AppState>,
    Query(query): Query<RideActionQuery>,
) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::CompleteRide {
            ride_id: query.ride_id,
            puller_id: query.puller_id,
            response,
        }
    })
    .await;

    match result {
        Ok(completed) => {
            let body = CompletedRide {
                message: "Ride completed".to_string(),
                ride_id: completed.ride.id,
                points_awarded: completed.points_awarded,
            };
            (StatusCode::OK, Json(json!(body)))
        }
        Err(e) => error_response(e),
    }
}

pub async fn accepted_rides(
    State(state): State<AppState>,
    Query(query): Query<PullerQuery>,
) -> ApiResponse {
    puller_rides(state, query.puller_id, Some(RideStatus::Accepted)).await
}

pub async fn completed_rides(
    State(state): State<AppState>,
    Query(query): Query<PullerQuery>,
) -> ApiResponse {
    puller_rides(state, query.puller_id, Some(RideStatus::Completed)).await
}

pub async fn puller_history(
    State(state): State<AppState>,
    Query(query): Query<PullerQuery>,
) -> ApiResponse {
    puller_rides(state, query.puller_id, None).await
}

async fn puller_rides(state: AppState, puller_id: i64, status: Option<RideStatus>) -> ApiResponse {
    let result = dispatch(&state.ride_channel, SERVICE, |response| {
        RideServiceRequest::PullerRides {
            puller_id,
            status,
            response,
        }
    })
    .await;

    match result {
        Ok(rides) => (StatusCode::OK, Json(json!(rides))),
        Err(e) => error_response(e),
    }
}
