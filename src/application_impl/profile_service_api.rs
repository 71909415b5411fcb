use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_http::{ApiClient, Credentials, HttpError, ProfileList};
use std::sync::Arc;

impl From<HttpError> for ProfileError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Unauthorized => ProfileError::Unauthenticated,
            HttpError::NotFound(_) => ProfileError::UserNotFound,
            other => ProfileError::Transport(other.to_string()),
        }
    }
}

pub struct ApiProfileService {
    client: Arc<ApiClient>,
}

impl ApiProfileService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ProfileService for ApiProfileService {
    async fn get_profile(&self, user: &UserId) -> Result<UserProfile, ProfileError> {
        Ok(self
            .client
            .get(&format!("users/{user}/"), &[], Credentials::Session)
            .await?)
    }

    async fn search_users(&self, term: Option<&str>) -> Result<Vec<UserProfile>, ProfileError> {
        let query: Vec<(&str, String)> = term
            .map(|t| vec![("search", t.to_string())])
            .unwrap_or_default();
        let list: ProfileList = self
            .client
            .get("users/", &query, Credentials::Session)
            .await?;
        Ok(list
            .into_vec()
            .into_iter()
            .filter(|p| term.map(|t| p.user.matches(t)).unwrap_or(true))
            .collect())
    }
}
