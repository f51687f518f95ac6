use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    RideAccepted,
    RideRejected,
    RideCompleted,
    RatingReceived,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::RideAccepted => "ride_accepted",
            NotificationType::RideRejected => "ride_rejected",
            NotificationType::RideCompleted => "ride_completed",
            NotificationType::RatingReceived => "rating_received",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ride_accepted" => Ok(NotificationType::RideAccepted),
            "ride_rejected" => Ok(NotificationType::RideRejected),
            "ride_completed" => Ok(NotificationType::RideCompleted),
            "rating_received" => Ok(NotificationType::RatingReceived),
            other => Err(DomainError::Validation(format!(
                "Unknown notification type: {}",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub notification_type: NotificationType,
}

/// A notification that has not been recorded yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub message: String,
    pub notification_type: NotificationType,
}

impl NewNotification {
    pub fn ride_accepted(consumer_id: i64, destination: &str) -> Self {
        Self {
            user_id: consumer_id,
            message: format!("Your ride to {} has been accepted!", destination),
            notification_type: NotificationType::RideAccepted,
        }
    }

    pub fn ride_rejected(consumer_id: i64, destination: &str) -> Self {
        Self {
            user_id: consumer_id,
            message: format!(
                "Your ride to {} was not available. Please try again.",
                destination
            ),
            notification_type: NotificationType::RideRejected,
        }
    }

    pub fn ride_completed(consumer_id: i64, destination: &str) -> Self {
        Self {
            user_id: consumer_id,
            message: format!(
                "Your ride to {} has been completed. Please rate your experience!",
                destination
            ),
            notification_type: NotificationType::RideCompleted,
        }
    }

    pub fn rating_received(puller_id: i64, rating: i32) -> Self {
        Self {
            user_id: puller_id,
            message: format!("You received a {}-star rating!", rating),
            notification_type: NotificationType::RatingReceived,
        }
    }
}
