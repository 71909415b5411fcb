use crate::application_port::ErrorKind;
use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("user not found")]
    UserNotFound,
    #[error("unable to reach server: {0}")]
    Transport(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ProfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProfileError::Unauthenticated => ErrorKind::Authentication,
            ProfileError::UserNotFound => ErrorKind::NotFound,
            ProfileError::Transport(_) => ErrorKind::Transport,
            ProfileError::Store(_) => ErrorKind::Internal,
        }
    }
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_profile(&self, user: &UserId) -> Result<UserProfile, ProfileError>;
    async fn search_users(&self, term: Option<&str>) -> Result<Vec<UserProfile>, ProfileError>;
}
