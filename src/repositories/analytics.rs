use std::collections::HashMap;
use std::sync::Arc;

use super::store::{RideFilter, Store};
use crate::error::DomainError;
use crate::models::analytics::{
    DashboardStats, DestinationCount, RecentRide, StatusCounts, TopPuller,
};
use crate::models::users::Role;

const TOP_PULLERS: usize = 5;
const TOP_DESTINATIONS: usize = 10;
pub const DEFAULT_RECENT_ACTIVITY: i64 = 20;

#[derive(Clone)]
pub struct AnalyticsRepository {
    store: Arc<dyn Store>,
}

impl AnalyticsRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, DomainError> {
        let counts = self.rides_by_status().await?;
        let total_rides = counts.pending + counts.accepted + counts.rejected + counts.completed;

        let pullers = self.store.list_users_by_role(Role::Puller).await?;
        let active_pullers = pullers.iter().filter(|p| p.is_approved).count() as i64;
        let total_points_awarded = pullers.iter().map(|p| p.points).sum();

        let completion_rate = if total_rides > 0 {
            (counts.completed as f64 / total_rides as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        let mut rated: Vec<_> = pullers.into_iter().filter(|p| p.rating > 0.0).collect();
        rated.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.id.cmp(&b.id)));
        let top_pullers = rated
            .into_iter()
            .take(TOP_PULLERS)
            .map(|p| TopPuller {
                id: p.id,
                identifier: p.identifier,
                rating: p.rating,
                total_rides: p.total_rides,
                points: p.points,
            })
            .collect();

        Ok(DashboardStats {
            total_rides,
            completed_rides: counts.completed,
            pending_rides: counts.pending,
            active_pullers,
            total_points_awarded,
            completion_rate,
            top_pullers,
        })
    }

    pub async fn rides_by_status(&self) -> Result<StatusCounts, DomainError> {
        let rides = self.store.list_rides(&RideFilter::default()).await?;

        let mut counts = StatusCounts::default();
        for ride in &rides {
            counts.add(ride.status);
        }

        Ok(counts)
    }

    pub async fn popular_destinations(&self) -> Result<Vec<DestinationCount>, DomainError> {
        let rides = self.store.list_rides(&RideFilter::default()).await?;

        let mut counts: HashMap<String, i64> = HashMap::new();
        for ride in rides {
            *counts.entry(ride.destination).or_default() += 1;
        }

        let mut destinations: Vec<DestinationCount> = counts
            .into_iter()
            .map(|(destination, count)| DestinationCount { destination, count })
            .collect();
        destinations.sort_by(|a, b| b.count.cmp(&a.count).then(a.destination.cmp(&b.destination)));
        destinations.truncate(TOP_DESTINATIONS);

        Ok(destinations)
    }

    pub async fn recent_activity(&self, limit: i64) -> Result<Vec<RecentRide>, DomainError> {
        let filter = RideFilter::default().newest_first().limit(limit);
        let rides = self.store.list_rides(&filter).await?;

        Ok(rides
            .into_iter()
            .map(|r| RecentRide {
                id: r.id,
                destination: r.destination,
                status: r.status,
                created_at: r.created_at,
                completed_at: r.completed_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rides::NewRideRequest;
    use crate::repositories::store::MemoryStore;
    use crate::repositories::rides::RideRepository;

    #[tokio::test]
    async fn completion_rate_is_a_rounded_percentage() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let rides = RideRepository::new(store.clone());

        for destination in ["GATE", "GATE", "HALL"] {
            rides
                .create_request(NewRideRequest {
                    destination: destination.to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        rides.accept_ride(1, 3).await.unwrap();
        rides.complete_ride(1, 3).await.unwrap();

        let analytics = AnalyticsRepository::new(store);
        let stats = analytics.dashboard().await.unwrap();
        assert_eq!(stats.total_rides, 3);
        assert_eq!(stats.completed_rides, 1);
        assert_eq!(stats.pending_rides, 2);
        assert_eq!(stats.completion_rate, 33.33);

        let destinations = analytics.popular_destinations().await.unwrap();
        assert_eq!(
            destinations[0],
            DestinationCount {
                destination: "GATE".to_string(),
                count: 2
            }
        );
    }

    #[tokio::test]
    async fn empty_store_has_zero_completion_rate() {
        let analytics = AnalyticsRepository::new(Arc::new(MemoryStore::new()));
        let stats = analytics.dashboard().await.unwrap();

        assert_eq!(stats.total_rides, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert!(stats.top_pullers.is_empty());
        assert_eq!(
            analytics.rides_by_status().await.unwrap(),
            StatusCounts::default()
        );
    }
}
