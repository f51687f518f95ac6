use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::{dispatch, error_response, ApiResponse, AppState};
use crate::models::ratings::average_rating;
use crate::models::server::RatingBody;
use crate::services::ratings::RatingRequest;

const SERVICE: &str = "rating service";

pub async fn submit_rating(State(state): State<AppState>, Json(body): Json<RatingBody>) -> ApiResponse {
    let result = dispatch(&state.rating_channel, SERVICE, |response| {
        RatingRequest::SubmitRating {
            ride_id: body.ride_id,
            rating: body.rating,
            review: body.review,
            response,
        }
    })
    .await;

    match result {
        Ok(ride) => (
            StatusCode::OK,
            Json(json!({
                "message": "Rating submitted",
                "ride_id": ride.id,
                "rating": ride.rating
            })),
        ),
        Err(e) => error_response(e),
    }
}

pub async fn puller_ratings(
    State(state): State<AppState>,
    Path(puller_id): Path<i64>,
) -> ApiResponse {
    let result = dispatch(&state.rating_channel, SERVICE, |response| {
        RatingRequest::PullerRatings {
            puller_id,
            response,
        }
    })
    .await;

    match result {
        Ok(ratings) => {
            let values: Vec<i32> = ratings.iter().map(|r| r.rating).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "puller_id": puller_id,
                    "average_rating": average_rating(&values).unwrap_or(0.0),
                    "total_ratings": ratings.len(),
                    "ratings": ratings
                })),
            )
        }
        Err(e) => error_response(e),
    }
}
