use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::notifications::Notification;
use crate::repositories::notifications::NotificationRepository;
use crate::repositories::store::Store;

pub enum NotificationRequest {
    List {
        user_id: i64,
        response: oneshot::Sender<Result<Vec<Notification>, ServiceError>>,
    },
    MarkRead {
        id: i64,
        response: oneshot::Sender<Result<Notification, ServiceError>>,
    },
    MarkAllRead {
        user_id: i64,
        response: oneshot::Sender<Result<u64, ServiceError>>,
    },
    UnreadCount {
        user_id: i64,
        response: oneshot::Sender<Result<usize, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct NotificationRequestHandler {
    repository: NotificationRepository,
}

impl NotificationRequestHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let repository = NotificationRepository::new(store);

        NotificationRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<NotificationRequest> for NotificationRequestHandler {
    async fn handle_request(&self, request: NotificationRequest) {
        match request {
            NotificationRequest::List { user_id, response } => {
                let result = self.repository.for_user(user_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            NotificationRequest::MarkRead { id, response } => {
                let result = self.repository.mark_read(id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            NotificationRequest::MarkAllRead { user_id, response } => {
                let result = self.repository.mark_all_read(user_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
            NotificationRequest::UnreadCount { user_id, response } => {
                let result = self.repository.unread_count(user_id).await;
                let _ = response.send(result.map_err(ServiceError::from));
            }
        }
    }
}

pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        NotificationService {}
    }
}

#[async_trait]
impl Service<NotificationRequest, NotificationRequestHandler> for NotificationService {}
