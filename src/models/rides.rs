use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::notifications::NewNotification;
use super::ratings::Rating;
use crate::error::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::Rejected => "rejected",
            RideStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RideStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RideStatus::Pending),
            "accepted" => Ok(RideStatus::Accepted),
            "rejected" => Ok(RideStatus::Rejected),
            "completed" => Ok(RideStatus::Completed),
            other => Err(DomainError::Validation(format!(
                "Unknown ride status: {}",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RideRequest {
    pub id: i64,
    pub destination: String,
    pub status: RideStatus,
    pub consumer_id: Option<i64>,
    pub puller_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub pickup_location: Option<String>,
    pub distance_km: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewRideRequest {
    #[serde(default)]
    pub destination: String,
    pub consumer_id: Option<i64>,
    pub pickup_location: Option<String>,
    pub distance_km: Option<f64>,
}

impl NewRideRequest {
    pub fn into_ride(self, id: i64, created_at: DateTime<Utc>) -> RideRequest {
        RideRequest {
            id,
            destination: self.destination,
            status: RideStatus::Pending,
            consumer_id: self.consumer_id,
            puller_id: None,
            created_at,
            accepted_at: None,
            completed_at: None,
            rating: None,
            review: None,
            pickup_location: self.pickup_location,
            distance_km: self.distance_km,
        }
    }
}

// Transitions mutate in place and hand back the notification to record
// alongside them; `None` when the ride has no consumer to notify.
impl RideRequest {
    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status != RideStatus::Pending {
            return Err(DomainError::InvalidState(format!(
                "Ride {} already processed ({})",
                self.id, self.status
            )));
        }

        Ok(())
    }

    pub fn accept(
        &mut self,
        puller_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<NewNotification>, DomainError> {
        self.ensure_pending()?;

        self.status = RideStatus::Accepted;
        self.puller_id = Some(puller_id);
        self.accepted_at = Some(now);

        Ok(self
            .consumer_id
            .map(|consumer| NewNotification::ride_accepted(consumer, &self.destination)))
    }

    /// Rejection is terminal; the puller is still recorded for audit.
    pub fn reject(&mut self, puller_id: i64) -> Result<Option<NewNotification>, DomainError> {
        self.ensure_pending()?;

        self.status = RideStatus::Rejected;
        self.puller_id = Some(puller_id);

        Ok(self
            .consumer_id
            .map(|consumer| NewNotification::ride_rejected(consumer, &self.destination)))
    }

    pub fn complete(
        &mut self,
        puller_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<NewNotification>, DomainError> {
        if self.puller_id != Some(puller_id) {
            return Err(DomainError::Forbidden(format!(
                "Ride {} is not assigned to puller {}",
                self.id, puller_id
            )));
        }

        if self.status != RideStatus::Accepted {
            return Err(DomainError::InvalidState(format!(
                "Ride {} not in accepted state ({})",
                self.id, self.status
            )));
        }

        self.status = RideStatus::Completed;
        self.completed_at = Some(now);

        Ok(self
            .consumer_id
            .map(|consumer| NewNotification::ride_completed(consumer, &self.destination)))
    }

    /// Resubmitting overwrites the previous rating and review.
    pub fn rate(&mut self, rating: i32, review: Option<String>) -> Result<Rating, DomainError> {
        if self.status != RideStatus::Completed {
            return Err(DomainError::InvalidState(format!(
                "Can only rate completed rides, ride {} is {}",
                self.id, self.status
            )));
        }

        let rating = Rating::new(rating)?;
        self.rating = Some(rating.value());
        self.review = review;

        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_ride(consumer_id: Option<i64>) -> RideRequest {
        NewRideRequest {
            destination: "PAHARTALI".to_string(),
            consumer_id,
            pickup_location: None,
            distance_km: None,
        }
        .into_ride(7, Utc::now())
    }

    #[test]
    fn accept_then_complete() {
        let mut ride = pending_ride(Some(1));
        let now = Utc::now();

        let notification = ride.accept(3, now).unwrap().unwrap();
        assert_eq!(ride.status, RideStatus::Accepted);
        assert_eq!(ride.puller_id, Some(3));
        assert_eq!(ride.accepted_at, Some(now));
        assert_eq!(notification.user_id, 1);

        ride.complete(3, now).unwrap();
        assert_eq!(ride.status, RideStatus::Completed);
        assert!(ride.completed_at.is_some());
        assert!(ride.accepted_at.is_some());
    }

    #[test]
    fn pending_only_leaves_once() {
        let mut ride = pending_ride(None);
        ride.reject(3).unwrap();
        assert_eq!(ride.status, RideStatus::Rejected);
        assert_eq!(ride.puller_id, Some(3));
        assert!(ride.accepted_at.is_none());

        assert!(matches!(
            ride.accept(4, Utc::now()),
            Err(DomainError::InvalidState(_))
        ));
        assert!(matches!(ride.reject(4), Err(DomainError::InvalidState(_))));
    }

    #[test]
    fn no_notification_without_consumer() {
        let mut ride = pending_ride(None);
        assert!(ride.accept(3, Utc::now()).unwrap().is_none());
    }

    #[test]
    fn complete_checks_ownership_before_state() {
        let mut ride = pending_ride(Some(1));
        assert!(matches!(
            ride.complete(3, Utc::now()),
            Err(DomainError::Forbidden(_))
        ));

        ride.accept(3, Utc::now()).unwrap();
        assert!(matches!(
            ride.complete(4, Utc::now()),
            Err(DomainError::Forbidden(_))
        ));

        ride.complete(3, Utc::now()).unwrap();
        assert!(matches!(
            ride.complete(3, Utc::now()),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn rating_requires_completion() {
        let mut ride = pending_ride(Some(1));
        assert!(matches!(
            ride.rate(4, None),
            Err(DomainError::InvalidState(_))
        ));

        ride.accept(3, Utc::now()).unwrap();
        ride.complete(3, Utc::now()).unwrap();

        assert!(matches!(ride.rate(0, None), Err(DomainError::Validation(_))));
        assert!(ride.rating.is_none());

        ride.rate(4, Some("smooth".to_string())).unwrap();
        ride.rate(2, None).unwrap();
        assert_eq!(ride.rating, Some(2));
        assert_eq!(ride.review, None);
    }
}
