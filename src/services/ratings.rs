use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::ratings::RatedRide;
use crate::models::rides::RideRequest;
use crate::repositories::ratings::RatingRepository;
use crate::repositories::store::Store;

pub enum RatingRequest {
    SubmitRating {
        ride_id: i64,
        rating: i32,
        review: Option<String>,
        response: oneshot::Sender<Result<RideRequest, ServiceError>>,
    },
    PullerRatings {
        puller_id: i64,
        response: oneshot::Sender<Result<Vec<RatedRide>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct RatingRequestHandler {
    repository: RatingRepository,
}

impl RatingRequestHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let repository = RatingRepository::new(store);

        RatingRequestHandler { repository }
    }

    async fn submit_rating(
        &self,
        ride_id: i64,
        rating: i32,
        review: Option<String>,
    ) -> Result<RideRequest, ServiceError> {
        Ok(self
            .repository
            .submit_rating(ride_id, rating, review)
            .await?)
    }

    async fn puller_ratings(&self, puller_id: i64) -> Result<Vec<RatedRide>, ServiceError> {
        Ok(self.repository.puller_ratings(puller_id).await?)
    }
}

#[async_trait]
impl RequestHandler<RatingRequest> for RatingRequestHandler {
    async fn handle_request(&self, request: RatingRequest) {
        match request {
            RatingRequest::SubmitRating {
                ride_id,
                rating,
                review,
                response,
            } => {
                let result = self.submit_rating(ride_id, rating, review).await;
                let _ = response.send(result);
            }
            RatingRequest::PullerRatings {
                puller_id,
                response,
            } => {
                let result = self.puller_ratings(puller_id).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct RatingService;

impl RatingService {
    pub fn new() -> Self {
        RatingService {}
    }
}

#[async_trait]
impl Service<RatingRequest, RatingRequestHandler> for RatingService {}
