use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::users::User;
use crate::repositories::store::Store;
use crate::repositories::users::credentials::CredentialHasher;
use crate::repositories::users::UserRepository;

pub enum UserRequest {
    Signup {
        identifier: String,
        display_name: Option<String>,
        password: String,
        role: String,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    Login {
        identifier: String,
        password: String,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    GetUser {
        id: i64,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    PendingApprovals {
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
    ApproveUser {
        id: i64,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    RejectUser {
        id: i64,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct UserRequestHandler {
    repository: UserRepository,
}

impl UserRequestHandler {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn CredentialHasher>) -> Self {
        let repository = UserRepository::new(store, hasher);

        UserRequestHandler { repository }
    }

    async fn signup(
        &self,
        identifier: &str,
        display_name: Option<String>,
        password: &str,
        role: &str,
    ) -> Result<User, ServiceError> {
        Ok(self
            .repository
            .signup(identifier, display_name, password, role)
            .await?)
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<User, ServiceError> {
        Ok(self.repository.login(identifier, password).await?)
    }

    async fn get_user(&self, id: i64) -> Result<User, ServiceError> {
        Ok(self.repository.get_user(id).await?)
    }

    async fn pending_approvals(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.repository.pending_approvals().await?)
    }

    async fn approve_user(&self, id: i64) -> Result<User, ServiceError> {
        Ok(self.repository.approve_user(id).await?)
    }

    async fn reject_user(&self, id: i64) -> Result<User, ServiceError> {
        Ok(self.repository.reject_user(id).await?)
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::Signup {
                identifier,
                display_name,
                password,
                role,
                response,
            } => {
                let user = self
                    .signup(&identifier, display_name, &password, &role)
                    .await;
                let _ = response.send(user);
            }
            UserRequest::Login {
                identifier,
                password,
                response,
            } => {
                let user = self.login(&identifier, &password).await;
                let _ = response.send(user);
            }
            UserRequest::GetUser { id, response } => {
                let user = self.get_user(id).await;
                let _ = response.send(user);
            }
            UserRequest::PendingApprovals { response } => {
                let users = self.pending_approvals().await;
                let _ = response.send(users);
            }
            UserRequest::ApproveUser { id, response } => {
                let user = self.approve_user(id).await;
                let _ = response.send(user);
            }
            UserRequest::RejectUser { id, response } => {
                let user = self.reject_user(id).await;
                let _ = response.send(user);
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}
