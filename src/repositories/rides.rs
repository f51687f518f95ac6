use std::sync::Arc;

use chrono::Utc;

use super::notifications::emit;
use super::store::{RideFilter, Store};
use crate::error::DomainError;
use crate::models::rides::{NewRideRequest, RideRequest, RideStatus};

#[derive(Clone, Debug)]
pub struct CompletedRide {
    pub ride: RideRequest,
    pub points_awarded: i64,
}

#[derive(Clone)]
pub struct RideRepository {
    store: Arc<dyn Store>,
}

impl RideRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_request(&self, request: NewRideRequest) -> Result<RideRequest, DomainError> {
        let mut uow = self.store.begin().await?;
        let ride = uow.insert_ride(request, Utc::now()).await?;
        uow.commit().await?;

        log::info!("Created ride request {} to {}.", ride.id, ride.destination);
        Ok(ride)
    }

    pub async fn accept_ride(&self, ride_id: i64, puller_id: i64) -> Result<RideRequest, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut ride = uow
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ride", ride_id))?;

        let notification = ride.accept(puller_id, Utc::now())?;
        uow.save_ride(&ride).await?;
        emit(uow.as_mut(), notification).await?;
        uow.commit().await?;

        log::info!("Ride {} accepted by puller {}.", ride.id, puller_id);
        Ok(ride)
    }

    pub async fn reject_ride(&self, ride_id: i64, puller_id: i64) -> Result<RideRequest, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut ride = uow
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ride", ride_id))?;

        let notification = ride.reject(puller_id)?;
        uow.save_ride(&ride).await?;
        emit(uow.as_mut(), notification).await?;
        uow.commit().await?;

        log::info!("Ride {} rejected by puller {}.", ride.id, puller_id);
        Ok(ride)
    }

    /// Completes the ride and credits the puller in the same unit of work.
    pub async fn complete_ride(
        &self,
        ride_id: i64,
        puller_id: i64,
    ) -> Result<CompletedRide, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut ride = uow
            .lock_ride(ride_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ride", ride_id))?;

        let notification = ride.complete(puller_id, Utc::now())?;
        uow.save_ride(&ride).await?;

        let points_awarded = match uow.lock_user(puller_id).await? {
            Some(mut puller) => {
                let points = puller.credit_completed_ride();
                uow.save_user(&puller).await?;
                points
            }
            None => {
                log::warn!(
                    "Puller {} of ride {} has no user record, no points awarded.",
                    puller_id,
                    ride.id
                );
                0
            }
        };

        emit(uow.as_mut(), notification).await?;
        uow.commit().await?;

        log::info!(
            "Ride {} completed by puller {} ({} points).",
            ride.id,
            puller_id,
            points_awarded
        );
        Ok(CompletedRide {
            ride,
            points_awarded,
        })
    }

    pub async fn get_ride(&self, ride_id: i64) -> Result<RideRequest, DomainError> {
        self.store
            .get_ride(ride_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ride", ride_id))
    }

    pub async fn ride_status(&self, ride_id: i64) -> Result<RideStatus, DomainError> {
        Ok(self.get_ride(ride_id).await?.status)
    }

    pub async fn pending_requests(&self) -> Result<Vec<RideRequest>, DomainError> {
        let filter = RideFilter::default().with_status(RideStatus::Pending);
        Ok(self.store.list_rides(&filter).await?)
    }

    pub async fn puller_rides(
        &self,
        puller_id: i64,
        status: Option<RideStatus>,
    ) -> Result<Vec<RideRequest>, DomainError> {
        let mut filter = RideFilter::default().for_puller(puller_id).newest_first();
        filter.status = status;

        Ok(self.store.list_rides(&filter).await?)
    }

    pub async fn consumer_history(&self, consumer_id: i64) -> Result<Vec<RideRequest>, DomainError> {
        let filter = RideFilter::default()
            .for_consumer(consumer_id)
            .newest_first();

        Ok(self.store.list_rides(&filter).await?)
    }
}
