use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::rides::{NewRideRequest, RideRequest, RideStatus};
use crate::repositories::rides::{CompletedRide, RideRepository};
use crate::repositories::store::Store;

type Reply<T> = oneshot::Sender<Result<T, ServiceError>>;

pub enum RideServiceRequest {
    CreateRequest {
        request: NewRideRequest,
        response: Reply<RideRequest>,
    },
    AcceptRide {
        ride_id: i64,
        puller_id: i64,
        response: Reply<RideRequest>,
    },
    RejectRide {
        ride_id: i64,
        puller_id: i64,
        response: Reply<RideRequest>,
    },
    CompleteRide {
        ride_id: i64,
        puller_id: i64,
        response: Reply<CompletedRide>,
    },
    GetRide {
        ride_id: i64,
        response: Reply<RideRequest>,
    },
    PendingRequests {
        response: Reply<Vec<RideRequest>>,
    },
    PullerRides {
        puller_id: i64,
        status: Option<RideStatus>,
        response: Reply<Vec<RideRequest>>,
    },
    ConsumerHistory {
        consumer_id: i64,
        response: Reply<Vec<RideRequest>>,
    },
}

#[derive(Clone)]
pub struct RideRequestHandler {
    repository: RideRepository,
}

impl RideRequestHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let repository = RideRepository::new(store);

        RideRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<RideServiceRequest> for RideRequestHandler {
    async fn handle_request(&self, request: RideServiceRequest) {
        match request {
            RideServiceRequest::CreateRequest { request, response } => {
                let result = self.repository.create_request(request).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            RideServiceRequest::AcceptRide {
                ride_id,
                puller_id,
                response,
            } => {
                let result = self.repository.accept_ride(ride_id, puller_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            RideServiceRequest::RejectRide {
                ride_id,
                puller_id,
                response,
            } => {
                let result = self.repository.reject_ride(ride_id, puller_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            RideServiceRequest::CompleteRide {
                ride_id,
                puller_id,
                response,
            } => {
                let result = self.repository.complete_ride(ride_id, puller_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            RideServiceRequest::GetRide { ride_id, response } => {
                let result = self.repository.get_ride(ride_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            RideServiceRequest::PendingRequests { response } => {
                let result = self.repository.pending_requests().await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            RideServiceRequest::PullerRides {
                puller_id,
                status,
                response,
            } => {
                let result = self.repository.puller_rides(puller_id, status).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            RideServiceRequest::ConsumerHistory {
                consumer_id,
                response,
            } => {
                let result = self.repository.consumer_history(consumer_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
        }
    }
}

pub struct RideService;

impl RideService {
    pub fn new() -> Self {
        RideService {}
    }
}

#[async_trait]
impl Service<RideServiceRequest, RideRequestHandler> for RideService {}
