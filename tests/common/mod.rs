#![allow(dead_code)]

use std::sync::Arc;

use campus_rides::models::rides::{NewRideRequest, RideRequest};
use campus_rides::models::users::User;
use campus_rides::repositories::rides::RideRepository;
use campus_rides::repositories::store::{MemoryStore, Store};
use campus_rides::repositories::users::credentials::CredentialHasher;
use campus_rides::repositories::users::UserRepository;

/// Reversible stand-in for Argon2 so account tests stay fast.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, anyhow::Error> {
        Ok(format!("plain${}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, anyhow::Error> {
        Ok(hash == format!("plain${}", password))
    }
}

pub fn store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

pub fn users(store: &Arc<dyn Store>) -> UserRepository {
    UserRepository::new(store.clone(), Arc::new(PlainHasher))
}

pub async fn signup(store: &Arc<dyn Store>, identifier: &str, role: &str) -> User {
    users(store)
        .signup(identifier, None, "secret", role)
        .await
        .unwrap()
}

pub async fn request_ride(
    rides: &RideRepository,
    destination: &str,
    consumer_id: Option<i64>,
) -> RideRequest {
    rides
        .create_request(NewRideRequest {
            destination: destination.to_string(),
            consumer_id,
            ..Default::default()
        })
        .await
        .unwrap()
}

/// Walks a fresh ride through accept and complete for `puller_id`.
pub async fn completed_ride(
    rides: &RideRepository,
    destination: &str,
    consumer_id: Option<i64>,
    puller_id: i64,
) -> RideRequest {
    let ride = request_ride(rides, destination, consumer_id).await;
    rides.accept_ride(ride.id, puller_id).await.unwrap();
    rides.complete_ride(ride.id, puller_id).await.unwrap().ride
}
