use crate::application_impl::SessionStore;
use crate::application_impl::mock_session::with_session;
use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_memory::{MockBackend, MockBackendError};
use std::sync::Arc;

impl From<MockBackendError> for ProfileError {
    fn from(err: MockBackendError) -> Self {
        match err {
            MockBackendError::Unauthorized | MockBackendError::InvalidCredentials => {
                ProfileError::Unauthenticated
            }
            MockBackendError::UserNotFound | MockBackendError::PostNotFound => {
                ProfileError::UserNotFound
            }
            other => ProfileError::Store(other.to_string()),
        }
    }
}

pub struct MockProfileService {
    backend: Arc<MockBackend>,
    session: Arc<SessionStore>,
}

impl MockProfileService {
    pub fn new(backend: Arc<MockBackend>, session: Arc<SessionStore>) -> Self {
        Self { backend, session }
    }
}

#[async_trait::async_trait]
impl ProfileService for MockProfileService {
    async fn get_profile(&self, user: &UserId) -> Result<UserProfile, ProfileError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.profile(token.as_ref(), user).await
        })
        .await?)
    }

    async fn search_users(&self, term: Option<&str>) -> Result<Vec<UserProfile>, ProfileError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.search_users(token.as_ref(), term).await
        })
        .await?)
    }
}
