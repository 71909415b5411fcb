use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_http::{ApiClient, Credentials, ErrorBody, HttpError, PostList};
use reqwest::multipart::{Form, Part};
use std::sync::Arc;

impl From<HttpError> for PostError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Unauthorized => PostError::Unauthenticated,
            HttpError::NotFound(_) => PostError::PostNotFound,
            HttpError::BadRequest(ErrorBody::Fields(fields)) => PostError::Validation(fields),
            HttpError::BadRequest(ErrorBody::Detail(detail)) => {
                let mut fields = FieldErrors::new();
                fields.add("non_field_errors", detail);
                PostError::Validation(fields)
            }
            other => PostError::Transport(other.to_string()),
        }
    }
}

pub(crate) fn check_content(content: &str) -> Result<(), PostError> {
    if content.trim().is_empty() {
        let mut fields = FieldErrors::new();
        fields.add("content", "This field may not be blank.");
        return Err(PostError::Validation(fields));
    }
    Ok(())
}

pub struct ApiPostService {
    client: Arc<ApiClient>,
}

impl ApiPostService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl PostService for ApiPostService {
    async fn list_posts(&self, visibility: Option<Visibility>) -> Result<Vec<Post>, PostError> {
        let query: Vec<(&str, String)> = visibility
            .map(|v| vec![("visibility", v.as_str().to_string())])
            .unwrap_or_default();
        let list: PostList = self.client.get("post/", &query, Credentials::Session).await?;
        Ok(list.into_vec())
    }

    async fn user_posts(&self, user: &UserId) -> Result<Vec<Post>, PostError> {
        let list: PostList = self
            .client
            .get(&format!("users/{user}/post/"), &[], Credentials::Session)
            .await
            .map_err(|e| match e {
                HttpError::NotFound(_) => PostError::UserNotFound,
                other => PostError::from(other),
            })?;
        Ok(list.into_vec())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, PostError> {
        check_content(&post.content)?;
        let me = self.client.caller_id().await?;

        let mut form = Form::new()
            .text("userId", me.to_string())
            .text("content", post.content)
            .text("visibility", post.visibility.as_str());
        if let Some(image) = post.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)
                .map_err(|e| {
                    let mut fields = FieldErrors::new();
                    fields.add("image", e.to_string());
                    PostError::Validation(fields)
                })?;
            form = form.part("image", part);
        }

        Ok(self
            .client
            .post_multipart("post/", form, Credentials::Session)
            .await?)
    }

    async fn like_post(&self, post: &PostId) -> Result<Post, PostError> {
        Ok(self
            .client
            .post(
                &format!("post/{post}/like/"),
                &serde_json::json!({}),
                Credentials::Session,
            )
            .await?)
    }

    async fn unlike_post(&self, post: &PostId) -> Result<Post, PostError> {
        Ok(self
            .client
            .post(
                &format!("post/{post}/unlike/"),
                &serde_json::json!({}),
                Credentials::Session,
            )
            .await?)
    }

    async fn add_comment(&self, post: &PostId, content: &str) -> Result<Comment, PostError> {
        check_content(content)?;
        Ok(self
            .client
            .post(
                &format!("post/{post}/comments/"),
                &serde_json::json!({ "content": content }),
                Credentials::Session,
            )
            .await?)
    }
}
