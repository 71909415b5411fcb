use crate::application_impl::SessionStore;
use crate::application_impl::mock_session::with_session;
use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_memory::{MockBackend, MockBackendError};
use std::sync::Arc;
use tracing::info;

pub struct MockAuthService {
    backend: Arc<MockBackend>,
    session: Arc<SessionStore>,
}

impl MockAuthService {
    pub fn new(backend: Arc<MockBackend>, session: Arc<SessionStore>) -> Self {
        Self { backend, session }
    }
}

#[async_trait::async_trait]
impl AuthService for MockAuthService {
    async fn current_user(&self) -> Result<User, AuthError> {
        let backend = &self.backend;
        with_session(&self.session, |token| async move {
            backend.current_user(token.as_ref()).await
        })
        .await
        .map_err(|e| match e {
            MockBackendError::InternalError(e) => AuthError::InternalError(e),
            _ => AuthError::Unauthenticated,
        })
    }

    async fn login(&self, input: LoginInput) -> Result<User, AuthError> {
        let tokens = self.backend.login(&input).await.map_err(|e| match e {
            MockBackendError::InternalError(e) => AuthError::InternalError(e),
            _ => AuthError::InvalidCredentials,
        })?;

        let user = self
            .backend
            .current_user(Some(&tokens.access))
            .await
            .map_err(|e| match e {
                MockBackendError::InternalError(e) => AuthError::InternalError(e),
                _ => AuthError::Unauthenticated,
            })?;

        self.session
            .replace(&Session::authenticated(tokens, user.clone()))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        info!(user_id = %user.id, "logged in (mock)");
        Ok(user)
    }

    async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        self.backend.register(&input).await.map_err(|e| match e {
            MockBackendError::Validation(fields) => AuthError::Validation(fields),
            other => AuthError::RegistrationFailed(other.to_string()),
        })
    }

    async fn logout(&self) {
        self.session.clear().await;
        info!("logged out (mock)");
    }
}
