use std::sync::Arc;

use super::notifications::emit;
use super::store::{RideFilter, Store};
use crate::error::DomainError;
use crate::models::notifications::NewNotification;
use crate::models::ratings::{average_rating, RatedRide};
use crate::models::rides::RideRequest;

#[derive(Clone)]
pub struct RatingRepository {
    store: Arc<dyn Store>,
}

impl RatingRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Stores the rating on the ride and recomputes the puller's average over
    /// every rated ride they ever served.
    pub async fn submit_rating(
        &self,
        ride_id: i64,
        rating: i32,
        review: Option<String>,
    ) -> Result<RideRequest, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut ride = uow
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ride", ride_id))?;

        let rating = ride.rate(rating, review)?;

        let Some(puller_id) = ride.puller_id else {
            uow.save_ride(&ride).await?;
            uow.commit().await?;
            return Ok(ride);
        };

        // The puller row stays locked until commit; ratings for one puller
        // are aggregated one at a time.
        let puller = uow.lock_user(puller_id).await?;
        uow.save_ride(&ride).await?;

        match puller {
            Some(mut puller) => {
                let ratings = uow.ratings_for_puller(puller_id).await?;
                if let Some(average) = average_rating(&ratings) {
                    puller.rating = average;
                    uow.save_user(&puller).await?;
                    emit(
                        uow.as_mut(),
                        Some(NewNotification::rating_received(puller_id, rating.value())),
                    )
                    .await?;

                    log::info!(
                        "Puller {} rating is now {} over {} rides.",
                        puller_id,
                        average,
                        ratings.len()
                    );
                }
            }
            None => {
                // TODO: settle whether a missing puller record means a soft-deleted
                // account or a dangling reference that should be rejected.
                log::warn!(
                    "Puller {} of ride {} has no user record, rating not aggregated.",
                    puller_id,
                    ride.id
                );
            }
        }

        uow.commit().await?;

        log::info!("Ride {} rated {}.", ride.id, rating.value());
        Ok(ride)
    }

    pub async fn puller_ratings(&self, puller_id: i64) -> Result<Vec<RatedRide>, DomainError> {
        let filter = RideFilter::default().for_puller(puller_id).rated();
        let rides = self.store.list_rides(&filter).await?;

        Ok(rides
            .into_iter()
            .filter_map(|ride| {
                ride.rating.map(|rating| RatedRide {
                    ride_id: ride.id,
                    rating,
                    review: ride.review,
                    destination: ride.destination,
                    completed_at: ride.completed_at,
                })
            })
            .collect())
    }
}
