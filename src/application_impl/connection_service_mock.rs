use crate::application_impl::SessionStore;
use crate::application_impl::connection_service_api::normalize_mutual;
use crate::application_impl::mock_session::with_session;
use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_memory::{MockBackend, MockBackendError};
use std::sync::Arc;

impl From<MockBackendError> for ConnectionError {
    fn from(err: MockBackendError) -> Self {
        match err {
            MockBackendError::Unauthorized | MockBackendError::InvalidCredentials => {
                ConnectionError::Unauthenticated
            }
            MockBackendError::UserNotFound | MockBackendError::PostNotFound => {
                ConnectionError::UserNotFound
            }
            MockBackendError::Conflict(detail) => ConnectionError::Conflict(detail),
            MockBackendError::Validation(fields) => ConnectionError::Conflict(fields.to_string()),
            MockBackendError::InternalError(e) => ConnectionError::Store(e),
        }
    }
}

pub struct MockConnectionService {
    backend: Arc<MockBackend>,
    session: Arc<SessionStore>,
}

impl MockConnectionService {
    pub fn new(backend: Arc<MockBackend>, session: Arc<SessionStore>) -> Self {
        Self { backend, session }
    }
}

#[async_trait::async_trait]
impl ConnectionService for MockConnectionService {
    async fn send_request(&self, target: &UserId) -> Result<ConnectionStatus, ConnectionError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.send_request(token.as_ref(), target).await
        })
        .await?)
    }

    async fn accept_request(
        &self,
        requester: &UserId,
    ) -> Result<ConnectionStatus, ConnectionError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.accept_request(token.as_ref(), requester).await
        })
        .await?)
    }

    async fn reject_request(
        &self,
        requester: &UserId,
    ) -> Result<ConnectionStatus, ConnectionError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.reject_request(token.as_ref(), requester).await
        })
        .await?)
    }

    async fn connections(
        &self,
        status: RequestStatus,
        user: Option<&UserId>,
    ) -> Result<Vec<Connection>, ConnectionError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.connections(token.as_ref(), status, user).await
        })
        .await?)
    }

    async fn mutual_connections(&self, user: &UserId) -> Result<Vec<User>, ConnectionError> {
        let backend = &self.backend;
        let (me, users) = with_session(&self.session, |token| async move {
            let me = backend.current_user(token.as_ref()).await?;
            let users = backend.mutual_connections(token.as_ref(), user).await?;
            Ok::<_, MockBackendError>((me.id, users))
        })
        .await?;
        Ok(normalize_mutual(users, &me, user))
    }

    async fn pending_connections(&self) -> Result<Vec<Connection>, ConnectionError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.pending_connections(token.as_ref()).await
        })
        .await?)
    }

    async fn search_connections(
        &self,
        term: &str,
        status: RequestStatus,
    ) -> Result<Vec<Connection>, ConnectionError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.search_connections(token.as_ref(), term, status).await
        })
        .await?)
    }
}
