//! Request and response payloads of the HTTP surface.

use serde::{Deserialize, Serialize};

use super::rides::{RideRequest, RideStatus};
use super::users::{Role, User};

#[derive(Clone, Debug, Deserialize)]
pub struct SignupBody {
    pub identifier: String,
    pub display_name: Option<String>,
    pub password: String,
    pub role: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginBody {
    pub identifier: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub identifier: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_approved: bool,
    pub points: i64,
    pub rating: f64,
    pub total_rides: i64,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            identifier: user.identifier,
            display_name: user.display_name,
            role: user.role,
            is_approved: user.is_approved,
            points: user.points,
            rating: user.rating,
            total_rides: user.total_rides,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RideActionQuery {
    pub ride_id: i64,
    pub puller_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PullerQuery {
    pub puller_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConsumerQuery {
    pub consumer_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RideIdQuery {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RecentActivityQuery {
    pub limit: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreatedRide {
    pub request_id: i64,
    pub status: RideStatus,
    pub destination: String,
}

impl From<RideRequest> for CreatedRide {
    fn from(ride: RideRequest) -> Self {
        Self {
            request_id: ride.id,
            status: ride.status,
            destination: ride.destination,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RideAction {
    pub message: String,
    pub ride_id: i64,
    pub status: RideStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompletedRide {
    pub message: String,
    pub ride_id: i64,
    pub points_awarded: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RatingBody {
    pub ride_id: i64,
    pub rating: i32,
    pub review: Option<String>,
}
