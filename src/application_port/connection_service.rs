use crate::application_port::ErrorKind;
use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("user not found")]
    UserNotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("unable to reach server: {0}")]
    Transport(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ConnectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectionError::Unauthenticated => ErrorKind::Authentication,
            ConnectionError::UserNotFound => ErrorKind::NotFound,
            ConnectionError::Conflict(_) => ErrorKind::Conflict,
            ConnectionError::Transport(_) => ErrorKind::Transport,
            ConnectionError::Store(_) => ErrorKind::Internal,
        }
    }
}

#[async_trait::async_trait]
pub trait ConnectionService: Send + Sync {
    async fn send_request(&self, target: &UserId) -> Result<ConnectionStatus, ConnectionError>;
    async fn accept_request(&self, requester: &UserId)
    -> Result<ConnectionStatus, ConnectionError>;
    async fn reject_request(&self, requester: &UserId)
    -> Result<ConnectionStatus, ConnectionError>;
    /// Connections of the caller, or of `user` when given.
    async fn connections(
        &self,
        status: RequestStatus,
        user: Option<&UserId>,
    ) -> Result<Vec<Connection>, ConnectionError>;
    /// Accepted connections shared by the caller and `user`, excluding both.
    async fn mutual_connections(&self, user: &UserId) -> Result<Vec<User>, ConnectionError>;
    /// Inbound pending requests, `user_from` carrying the requester's profile.
    async fn pending_connections(&self) -> Result<Vec<Connection>, ConnectionError>;
    async fn search_connections(
        &self,
        term: &str,
        status: RequestStatus,
    ) -> Result<Vec<Connection>, ConnectionError>;
}
