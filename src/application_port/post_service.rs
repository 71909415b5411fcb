use crate::application_port::ErrorKind;
use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("post not found")]
    PostNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("failed to create post")]
    Validation(FieldErrors),
    #[error("unable to reach server: {0}")]
    Transport(String),
    #[error("store error: {0}")]
    Store(String),
}

impl PostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PostError::Unauthenticated => ErrorKind::Authentication,
            PostError::PostNotFound | PostError::UserNotFound => ErrorKind::NotFound,
            PostError::Validation(_) => ErrorKind::Validation,
            PostError::Transport(_) => ErrorKind::Transport,
            PostError::Store(_) => ErrorKind::Internal,
        }
    }
}

#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    async fn list_posts(&self, visibility: Option<Visibility>) -> Result<Vec<Post>, PostError>;
    async fn user_posts(&self, user: &UserId) -> Result<Vec<Post>, PostError>;
    async fn create_post(&self, post: NewPost) -> Result<Post, PostError>;
    async fn like_post(&self, post: &PostId) -> Result<Post, PostError>;
    async fn unlike_post(&self, post: &PostId) -> Result<Post, PostError>;
    async fn add_comment(&self, post: &PostId, content: &str) -> Result<Comment, PostError>;
}
