use crate::application_impl::SessionStore;
use crate::application_impl::mock_session::with_session;
use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_memory::{MockBackend, MockBackendError};
use std::sync::Arc;

impl From<MockBackendError> for PostError {
    fn from(err: MockBackendError) -> Self {
        match err {
            MockBackendError::Unauthorized | MockBackendError::InvalidCredentials => {
                PostError::Unauthenticated
            }
            MockBackendError::PostNotFound => PostError::PostNotFound,
            MockBackendError::UserNotFound => PostError::UserNotFound,
            MockBackendError::Validation(fields) => PostError::Validation(fields),
            other => PostError::Store(other.to_string()),
        }
    }
}

pub struct MockPostService {
    backend: Arc<MockBackend>,
    session: Arc<SessionStore>,
}

impl MockPostService {
    pub fn new(backend: Arc<MockBackend>, session: Arc<SessionStore>) -> Self {
        Self { backend, session }
    }
}

#[async_trait::async_trait]
impl PostService for MockPostService {
    async fn list_posts(&self, visibility: Option<Visibility>) -> Result<Vec<Post>, PostError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.list_posts(token.as_ref(), visibility).await
        })
        .await?)
    }

    async fn user_posts(&self, user: &UserId) -> Result<Vec<Post>, PostError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.user_posts(token.as_ref(), user).await
        })
        .await?)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, PostError> {
        let backend = &self.backend;
        let post = &post;
        Ok(with_session(&self.session, |token| async move {
            backend.create_post(token.as_ref(), post).await
        })
        .await?)
    }

    async fn like_post(&self, post: &PostId) -> Result<Post, PostError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.like_post(token.as_ref(), post).await
        })
        .await?)
    }

    async fn unlike_post(&self, post: &PostId) -> Result<Post, PostError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.unlike_post(token.as_ref(), post).await
        })
        .await?)
    }

    async fn add_comment(&self, post: &PostId, content: &str) -> Result<Comment, PostError> {
        let backend = &self.backend;
        Ok(with_session(&self.session, |token| async move {
            backend.add_comment(token.as_ref(), post, content).await
        })
        .await?)
    }
}
