use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rides::RideStatus;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TopPuller {
    pub id: i64,
    pub identifier: String,
    pub rating: f64,
    pub total_rides: i64,
    pub points: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DashboardStats {
    pub total_rides: i64,
    pub completed_rides: i64,
    pub pending_rides: i64,
    pub active_pullers: i64,
    pub total_points_awarded: i64,
    pub completion_rate: f64,
    pub top_pullers: Vec<TopPuller>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub accepted: i64,
    pub rejected: i64,
    pub completed: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: RideStatus) {
        match status {
            RideStatus::Pending => self.pending += 1,
            RideStatus::Accepted => self.accepted += 1,
            RideStatus::Rejected => self.rejected += 1,
            RideStatus::Completed => self.completed += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DestinationCount {
    pub destination: String,
    pub count: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecentRide {
    pub id: i64,
    pub destination: String,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
