use std::sync::Arc;

use chrono::Utc;

use super::store::Store;
use crate::error::DomainError;
use crate::models::users::{NewUser, Role, User};

pub mod credentials;

use credentials::CredentialHasher;

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    pub async fn signup(
        &self,
        identifier: &str,
        display_name: Option<String>,
        password: &str,
        role: &str,
    ) -> Result<User, DomainError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(DomainError::Validation(
                "Identifier must not be empty".to_string(),
            ));
        }

        let role: Role = role.parse()?;
        let credential_hash = self.hasher.hash(password)?;
        let new_user = NewUser::new(identifier.to_string(), display_name, credential_hash, role);

        let mut uow = self.store.begin().await?;
        let user = uow
            .insert_user(new_user, Utc::now())
            .await?
            .ok_or_else(|| {
                DomainError::Conflict(format!("Identifier {} already registered", identifier))
            })?;
        uow.commit().await?;

        log::info!(
            "Registered user {} as {} (approved: {}).",
            user.id,
            user.role,
            user.is_approved
        );
        Ok(user)
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .store
            .find_user_by_identifier(identifier.trim())
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid credentials".to_string()))?;

        if !self.hasher.verify(password, &user.credential_hash)? {
            return Err(DomainError::Unauthorized("Invalid credentials".to_string()));
        }

        if !user.is_approved {
            return Err(DomainError::Forbidden(
                "Account not approved yet".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub async fn pending_approvals(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.store.list_unapproved_users().await?)
    }

    pub async fn approve_user(&self, id: i64) -> Result<User, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut user = uow
            .lock_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        user.approve()?;
        uow.save_user(&user).await?;
        uow.commit().await?;

        log::info!("Approved user {} ({}).", user.id, user.role);
        Ok(user)
    }

    /// Rejection removes the account entirely.
    pub async fn reject_user(&self, id: i64) -> Result<User, DomainError> {
        let mut uow = self.store.begin().await?;
        let user = uow
            .lock_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        uow.delete_user(id).await?;
        uow.commit().await?;

        log::info!("Rejected and removed user {} ({}).", user.id, user.role);
        Ok(user)
    }
}
