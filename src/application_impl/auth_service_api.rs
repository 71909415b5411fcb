use crate::application_impl::SessionStore;
use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_http::{ApiClient, Credentials, ErrorBody, HttpError};
use std::sync::Arc;
use tracing::{debug, info};

/// Only a rejected token is an authentication failure; an unhealthy or
/// garbled response is reported as a transport problem.
fn profile_error(e: HttpError) -> AuthError {
    match e {
        HttpError::Transport(e) => AuthError::Transport(e),
        HttpError::Status(..) | HttpError::Decode(_) => AuthError::Transport(e.to_string()),
        HttpError::InvalidUrl(e) => AuthError::InternalError(e),
        _ => AuthError::Unauthenticated,
    }
}

pub struct ApiAuthService {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl ApiAuthService {
    pub fn new(client: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { client, session }
    }
}

#[async_trait::async_trait]
impl AuthService for ApiAuthService {
    async fn current_user(&self) -> Result<User, AuthError> {
        if self.session.access_token().await.is_none() {
            return Err(AuthError::Unauthenticated);
        }
        self.client
            .get("users/me/", &[], Credentials::Session)
            .await
            .map_err(profile_error)
    }

    async fn login(&self, input: LoginInput) -> Result<User, AuthError> {
        let tokens: AuthTokens = self
            .client
            .post("users/login/", &input, Credentials::Anonymous)
            .await
            .map_err(|e| match e {
                HttpError::Transport(e) => AuthError::Transport(e),
                other => {
                    debug!("login rejected: {other}");
                    AuthError::InvalidCredentials
                }
            })?;

        // the new token is not stored yet, so it travels as an explicit header
        let user: User = self
            .client
            .get(
                "users/me/",
                &[],
                Credentials::Bearer(tokens.access.clone()),
            )
            .await
            .map_err(profile_error)?;

        self.session
            .replace(&Session::authenticated(tokens, user.clone()))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        self.client
            .post("users/register/", &input, Credentials::Anonymous)
            .await
            .map_err(|e| match e {
                HttpError::BadRequest(ErrorBody::Fields(fields)) => AuthError::Validation(fields),
                HttpError::Transport(e) => AuthError::Transport(e),
                HttpError::BadRequest(body) => AuthError::RegistrationFailed(body.detail()),
                other => AuthError::RegistrationFailed(other.to_string()),
            })
    }

    async fn logout(&self) {
        self.session.clear().await;
        info!("logged out");
    }
}
