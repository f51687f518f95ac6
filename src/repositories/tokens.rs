use std::sync::Arc;

use chrono::Utc;

use super::store::{Store, TokenFilter};
use crate::error::DomainError;
use crate::models::tokens::{NewToken, Token};

#[derive(Clone)]
pub struct TokenRepository {
    store: Arc<dyn Store>,
}

impl TokenRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Token values are chosen by the issuer; a value that already exists is
    /// refused.
    pub async fn issue_token(&self, issuer_id: i64, token_value: &str) -> Result<Token, DomainError> {
        if token_value.is_empty() {
            return Err(DomainError::Validation(
                "Token value must not be empty".to_string(),
            ));
        }

        let mut uow = self.store.begin().await?;
        if uow.lock_user(issuer_id).await?.is_none() {
            return Err(DomainError::not_found("User", issuer_id));
        }

        let new_token = NewToken {
            token_value: token_value.to_string(),
            issued_by: issuer_id,
        };
        let token = uow
            .insert_token(new_token, Utc::now())
            .await?
            .ok_or_else(|| DomainError::Conflict(format!("Token {} already exists", token_value)))?;
        uow.commit().await?;

        log::info!("User {} issued token {}.", issuer_id, token.id);
        Ok(token)
    }

    /// Any existing user may redeem any unused token, including its issuer.
    pub async fn redeem_token(&self, redeemer_id: i64, token_value: &str) -> Result<Token, DomainError> {
        let mut uow = self.store.begin().await?;
        let mut token = uow
            .lock_token(token_value)
            .await?
            .ok_or_else(|| DomainError::not_found("Token", token_value))?;

        token.redeem(redeemer_id, Utc::now())?;

        if uow.lock_user(redeemer_id).await?.is_none() {
            return Err(DomainError::not_found("User", redeemer_id));
        }

        uow.save_token(&token).await?;
        uow.commit().await?;

        log::info!("User {} redeemed token {}.", redeemer_id, token.id);
        Ok(token)
    }

    pub async fn tokens_by_usage(&self, is_used: bool) -> Result<Vec<Token>, DomainError> {
        let filter = TokenFilter {
            is_used: Some(is_used),
            ..Default::default()
        };

        Ok(self.store.list_tokens(&filter).await?)
    }

    pub async fn tokens_owned_by(&self, redeemer_id: i64) -> Result<Vec<Token>, DomainError> {
        let filter = TokenFilter {
            owned_by: Some(redeemer_id),
            ..Default::default()
        };

        Ok(self.store.list_tokens(&filter).await?)
    }
}
