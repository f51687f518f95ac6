use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::DomainError;
use crate::repositories::store::Store;
use crate::repositories::users::credentials::{Argon2Hasher, CredentialHasher};
use crate::settings::Settings;

pub mod analytics;
pub mod http;
pub mod notifications;
pub mod ratings;
pub mod rides;
pub mod tokens;
pub mod users;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Spawns one task per service over `store` and returns the channels the
/// HTTP layer talks to.
pub fn spawn_services(
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
    channel_capacity: usize,
) -> http::AppState {
    let (ride_tx, mut ride_rx) = mpsc::channel(channel_capacity);
    let (rating_tx, mut rating_rx) = mpsc::channel(channel_capacity);
    let (token_tx, mut token_rx) = mpsc::channel(channel_capacity);
    let (user_tx, mut user_rx) = mpsc::channel(channel_capacity);
    let (notification_tx, mut notification_rx) = mpsc::channel(channel_capacity);
    let (analytics_tx, mut analytics_rx) = mpsc::channel(channel_capacity);

    log::info!("Starting ride service.");
    let ride_store = store.clone();
    tokio::spawn(async move {
        let mut service = rides::RideService::new();
        service
            .run(rides::RideRequestHandler::new(ride_store), &mut ride_rx)
            .await;
    });

    log::info!("Starting rating service.");
    let rating_store = store.clone();
    tokio::spawn(async move {
        let mut service = ratings::RatingService::new();
        service
            .run(ratings::RatingRequestHandler::new(rating_store), &mut rating_rx)
            .await;
    });

    log::info!("Starting token service.");
    let token_store = store.clone();
    tokio::spawn(async move {
        let mut service = tokens::TokenService::new();
        service
            .run(tokens::TokenRequestHandler::new(token_store), &mut token_rx)
            .await;
    });

    log::info!("Starting user service.");
    let user_store = store.clone();
    tokio::spawn(async move {
        let mut service = users::UserService::new();
        service
            .run(users::UserRequestHandler::new(user_store, hasher), &mut user_rx)
            .await;
    });

    log::info!("Starting notification service.");
    let notification_store = store.clone();
    tokio::spawn(async move {
        let mut service = notifications::NotificationService::new();
        service
            .run(
                notifications::NotificationRequestHandler::new(notification_store),
                &mut notification_rx,
            )
            .await;
    });

    log::info!("Starting analytics service.");
    tokio::spawn(async move {
        let mut service = analytics::AnalyticsService::new();
        service
            .run(analytics::AnalyticsRequestHandler::new(store), &mut analytics_rx)
            .await;
    });

    http::AppState {
        ride_channel: ride_tx,
        rating_channel: rating_tx,
        token_channel: token_tx,
        user_channel: user_tx,
        notification_channel: notification_tx,
        analytics_channel: analytics_tx,
    }
}

pub async fn start_services(store: Arc<dyn Store>, settings: Settings) -> Result<(), anyhow::Error> {
    let state = spawn_services(
        store,
        Arc::new(Argon2Hasher),
        settings.services.channel_capacity,
    );

    log::info!("Starting HTTP server.");
    http::start_http_server(&settings.server.listen, state).await
}
