use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::tokens::Token;
use crate::repositories::store::Store;
use crate::repositories::tokens::TokenRepository;

pub enum TokenRequest {
    IssueToken {
        issuer_id: i64,
        token_value: String,
        response: oneshot::Sender<Result<Token, ServiceError>>,
    },
    RedeemToken {
        redeemer_id: i64,
        token_value: String,
        response: oneshot::Sender<Result<Token, ServiceError>>,
    },
    ListByUsage {
        is_used: bool,
        response: oneshot::Sender<Result<Vec<Token>, ServiceError>>,
    },
    OwnedBy {
        redeemer_id: i64,
        response: oneshot::Sender<Result<Vec<Token>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct TokenRequestHandler {
    repository: TokenRepository,
}

impl TokenRequestHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let repository = TokenRepository::new(store);

        TokenRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<TokenRequest> for TokenRequestHandler {
    async fn handle_request(&self, request: TokenRequest) {
        match request {
            TokenRequest::IssueToken {
                issuer_id,
                token_value,
                response,
            } => {
                let token = self
                    .repository
                    .issue_token(issuer_id, &token_value)
                    .await
                    .map_err(ServiceError::from);
                let _ = response.send(token);
            }
            TokenRequest::RedeemToken {
                redeemer_id,
                token_value,
                response,
            } => {
                let token = self
                    .repository
                    .redeem_token(redeemer_id, &token_value)
                    .await
                    .map_err(ServiceError::from);
                let _ = response.send(token);
            }
            TokenRequest::ListByUsage { is_used, response } => {
                let tokens = self
                    .repository
                    .tokens_by_usage(is_used)
                    .await
                    .map_err(ServiceError::from);
                let _ = response.send(tokens);
            }
            TokenRequest::OwnedBy {
                redeemer_id,
                response,
            } => {
                let tokens = self
                    .repository
                    .tokens_owned_by(redeemer_id)
                    .await
                    .map_err(ServiceError::from);
                let _ = response.send(tokens);
            }
        }
    }
}

pub struct TokenService;

impl TokenService {
    pub fn new() -> Self {
        TokenService {}
    }
}

#[async_trait]
impl Service<TokenRequest, TokenRequestHandler> for TokenService {}
