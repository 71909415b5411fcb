use crate::application_impl::SessionStore;
use crate::domain_model::*;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Which bearer token, if any, a request carries.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// The access token currently held by the session store, when there is one.
    Session,
    /// No Authorization header at all.
    Anonymous,
    /// A caller-supplied token. The session store is neither read nor
    /// cleared for such requests.
    Bearer(AccessToken),
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Detail(String),
    Fields(FieldErrors),
}

impl ErrorBody {
    pub fn parse(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => return ErrorBody::Detail(raw.trim().to_string()),
        };
        if let Some(fields) = FieldErrors::from_json(&value) {
            return ErrorBody::Fields(fields);
        }
        let detail = ["detail", "error", "message"]
            .iter()
            .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());
        ErrorBody::Detail(detail)
    }

    pub fn detail(&self) -> String {
        match self {
            ErrorBody::Detail(detail) => detail.clone(),
            ErrorBody::Fields(fields) => fields.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {}", .0.detail())]
    BadRequest(ErrorBody),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unexpected status {0}: {1}")]
    Status(u16, String),
    #[error("undecodable response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed = ErrorBody::parse(body);
        match status {
            StatusCode::BAD_REQUEST => HttpError::BadRequest(parsed),
            StatusCode::UNAUTHORIZED => HttpError::Unauthorized,
            StatusCode::FORBIDDEN => HttpError::Forbidden(parsed.detail()),
            StatusCode::NOT_FOUND => HttpError::NotFound(parsed.detail()),
            StatusCode::CONFLICT => HttpError::Conflict(parsed.detail()),
            other => HttpError::Status(other.as_u16(), parsed.detail()),
        }
    }
}

/// JSON-over-HTTP adapter for the REST backend.
///
/// Owns the bearer-token policy: session requests carry the stored access
/// token, and a 401 answer to one of them wipes the session.
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, HttpError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        Ok(Self {
            base,
            client,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Id of the signed-in user, from the cached profile when there is one.
    pub async fn caller_id(&self) -> Result<UserId, HttpError> {
        if let Some(user) = self.session.get().await.user {
            return Ok(user.id);
        }
        let me: User = self.get("users/me/", &[], Credentials::Session).await?;
        Ok(me.id)
    }

    fn url(&self, path: &str) -> Result<Url, HttpError> {
        // a leading slash would discard the base path on join
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        credentials: Credentials,
    ) -> Result<T, HttpError> {
        let builder = self.client.get(self.url(path)?).query(query);
        let resp = self.execute(builder, &credentials).await?;
        decode(resp).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        credentials: Credentials,
    ) -> Result<T, HttpError> {
        let builder = self.client.post(self.url(path)?).json(body);
        let resp = self.execute(builder, &credentials).await?;
        decode(resp).await
    }

    /// POST without a body; whatever the backend answers with is discarded.
    pub async fn post_empty(&self, path: &str, credentials: Credentials) -> Result<(), HttpError> {
        let builder = self.client.post(self.url(path)?);
        self.execute(builder, &credentials).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        credentials: Credentials,
    ) -> Result<T, HttpError> {
        let builder = self.client.post(self.url(path)?).multipart(form);
        let resp = self.execute(builder, &credentials).await?;
        decode(resp).await
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        credentials: &Credentials,
    ) -> Result<Response, HttpError> {
        let builder = match credentials {
            Credentials::Session => match self.session.access_token().await {
                Some(token) => builder.bearer_auth(&token.0),
                None => builder,
            },
            Credentials::Anonymous => builder,
            Credentials::Bearer(token) => builder.bearer_auth(&token.0),
        };
        let request = builder
            .build()
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        debug!(
            method = %request.method(),
            url = %request.url(),
            authorized = request.headers().contains_key(AUTHORIZATION),
            "api request"
        );

        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::UNAUTHORIZED {
            if matches!(credentials, Credentials::Session) {
                warn!("access token rejected, clearing session");
                self.session.clear().await;
            }
            return Err(HttpError::Unauthorized);
        }

        let body = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "api error response");
        Err(HttpError::from_response(status, &body))
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, HttpError> {
    let raw = resp
        .bytes()
        .await
        .map_err(|e| HttpError::Transport(e.to_string()))?;
    serde_json::from_slice(&raw).map_err(|e| HttpError::Decode(e.to_string()))
}
