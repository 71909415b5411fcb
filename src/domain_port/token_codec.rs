use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token invalid")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct TokenVerifyResult {
    pub user_id: UserId,
    pub jti: Option<String>,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        user: &UserId,
        jti: Option<String>,
    ) -> Result<(AccessToken, DateTime<Utc>), TokenError>;
    async fn issue_refresh_token(
        &self,
        user: &UserId,
        jti: String,
    ) -> Result<(RefreshToken, DateTime<Utc>), TokenError>;
    async fn verify_access_token(&self, token: &AccessToken)
    -> Result<TokenVerifyResult, TokenError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, TokenError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, TokenError>;
}
