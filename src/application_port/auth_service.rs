use crate::application_port::ErrorKind;
use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unable to fetch user")]
    Unauthenticated,
    #[error("registration failed")]
    Validation(FieldErrors),
    #[error("registration failed")]
    RegistrationFailed(String),
    #[error("unable to reach server: {0}")]
    Transport(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                ErrorKind::Authentication
            }
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::RegistrationFailed(_) => ErrorKind::Validation,
            AuthError::Transport(_) => ErrorKind::Transport,
            AuthError::Store(_) | AuthError::InternalError(_) => ErrorKind::Internal,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AuthError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Fetches the authenticated profile; does not touch the session.
    async fn current_user(&self) -> Result<User, AuthError>;
    /// Exchanges credentials for tokens and caches the profile.
    ///
    /// The session is written only after both steps succeed.
    async fn login(&self, input: LoginInput) -> Result<User, AuthError>;
    /// Creates an account without logging in.
    async fn register(&self, input: RegisterInput) -> Result<User, AuthError>;
    async fn logout(&self);
}
