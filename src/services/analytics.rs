use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::analytics::{DashboardStats, DestinationCount, RecentRide, StatusCounts};
use crate::repositories::analytics::AnalyticsRepository;
use crate::repositories::store::Store;

pub enum AnalyticsRequest {
    Dashboard {
        response: oneshot::Sender<Result<DashboardStats, ServiceError>>,
    },
    RidesByStatus {
        response: oneshot::Sender<Result<StatusCounts, ServiceError>>,
    },
    PopularDestinations {
        response: oneshot::Sender<Result<Vec<DestinationCount>, ServiceError>>,
    },
    RecentActivity {
        limit: i64,
        response: oneshot::Sender<Result<Vec<RecentRide>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct AnalyticsRequestHandler {
    repository: AnalyticsRepository,
}

impl AnalyticsRequestHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let repository = AnalyticsRepository::new(store);

        AnalyticsRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<AnalyticsRequest> for AnalyticsRequestHandler {
    async fn handle_request(&self, request: AnalyticsRequest) {
        match request {
            AnalyticsRequest::Dashboard { response } => {
                let stats = self.repository.dashboard().await;
                let _ = response.send(stats.map_err(ServiceError::from));
            }
            AnalyticsRequest::RidesByStatus { response } => {
                let counts = self.repository.rides_by_status().await;
                let _ = response.send(counts.map_err(ServiceError::from));
            }
            AnalyticsRequest::PopularDestinations { response } => {
                let destinations = self.repository.popular_destinations().await;
                let _ = response.send(destinations.map_err(ServiceError::from));
            }
            AnalyticsRequest::RecentActivity { limit, response } => {
                let rides = self.repository.recent_activity(limit).await;
                let _ = response.send(rides.map_err(ServiceError::from));
            }
        }
    }
}

pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        AnalyticsService {}
    }
}

#[async_trait]
impl Service<AnalyticsRequest, AnalyticsRequestHandler> for AnalyticsService {}
