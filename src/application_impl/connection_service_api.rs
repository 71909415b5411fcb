use crate::application_port::*;
use crate::domain_model::*;
use crate::infra_http::{ApiClient, ConnectionList, Credentials, HttpError, UserList, UserRef, WireConnection};
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

impl From<HttpError> for ConnectionError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Unauthorized => ConnectionError::Unauthenticated,
            HttpError::NotFound(_) => ConnectionError::UserNotFound,
            HttpError::BadRequest(body) => ConnectionError::Conflict(body.detail()),
            HttpError::Conflict(detail) | HttpError::Forbidden(detail) => {
                ConnectionError::Conflict(detail)
            }
            other => ConnectionError::Transport(other.to_string()),
        }
    }
}

pub struct ApiConnectionService {
    client: Arc<ApiClient>,
}

impl ApiConnectionService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn post_action(&self, user: &UserId, action: &str) -> Result<(), ConnectionError> {
        let path = format!("users/{user}/{action}_connection_request/");
        self.client.post_empty(&path, Credentials::Session).await?;
        debug!(%user, action, "connection request updated");
        Ok(())
    }

    async fn list(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Connection>, ConnectionError> {
        let list: ConnectionList = self.client.get(path, query, Credentials::Session).await?;
        // all-or-nothing: one failed profile lookup fails the listing
        try_join_all(list.into_vec().into_iter().map(|c| self.resolve(c))).await
    }

    async fn resolve(&self, wire: WireConnection) -> Result<Connection, ConnectionError> {
        let (user_from, user_to) =
            tokio::try_join!(self.resolve_user(wire.user_from), self.resolve_user(wire.user_to))?;
        Ok(Connection {
            user_from,
            user_to,
            status: wire.status,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        })
    }

    async fn resolve_user(&self, user: UserRef) -> Result<User, ConnectionError> {
        match user {
            UserRef::Full(user) => Ok(user),
            UserRef::Id(id) => Ok(self
                .client
                .get(&format!("users/{id}/"), &[], Credentials::Session)
                .await?),
        }
    }
}

#[async_trait::async_trait]
impl ConnectionService for ApiConnectionService {
    async fn send_request(&self, target: &UserId) -> Result<ConnectionStatus, ConnectionError> {
        self.post_action(target, "send").await?;
        Ok(ConnectionStatus::Pending)
    }

    async fn accept_request(
        &self,
        requester: &UserId,
    ) -> Result<ConnectionStatus, ConnectionError> {
        self.post_action(requester, "accept").await?;
        Ok(ConnectionStatus::Accepted)
    }

    async fn reject_request(
        &self,
        requester: &UserId,
    ) -> Result<ConnectionStatus, ConnectionError> {
        self.post_action(requester, "reject").await?;
        Ok(ConnectionStatus::Rejected)
    }

    async fn connections(
        &self,
        status: RequestStatus,
        user: Option<&UserId>,
    ) -> Result<Vec<Connection>, ConnectionError> {
        let mut query = vec![("status", status.to_string())];
        if let Some(user) = user {
            query.push(("user", user.to_string()));
        }
        self.list("users/connections/", &query).await
    }

    async fn mutual_connections(&self, user: &UserId) -> Result<Vec<User>, ConnectionError> {
        let me = self.client.caller_id().await?;
        let path = format!("users/{user}/mutual_connections/");
        let list: UserList = self.client.get(&path, &[], Credentials::Session).await?;
        Ok(normalize_mutual(list.into_vec(), &me, user))
    }

    async fn pending_connections(&self) -> Result<Vec<Connection>, ConnectionError> {
        self.list("users/pending_connections/", &[]).await
    }

    async fn search_connections(
        &self,
        term: &str,
        status: RequestStatus,
    ) -> Result<Vec<Connection>, ConnectionError> {
        let me = self.client.caller_id().await?;
        let query = [("search", term.to_string()), ("status", status.to_string())];
        let connections = self.list("users/connections/", &query).await?;
        // older backends ignore `search`
        Ok(connections
            .into_iter()
            .filter(|c| c.counterpart(&me).matches(term))
            .collect())
    }
}

/// Drops both parties and duplicates, ordered by id.
pub(crate) fn normalize_mutual(mut users: Vec<User>, me: &UserId, other: &UserId) -> Vec<User> {
    users.retain(|u| &u.id != me && &u.id != other);
    users.sort_by(|a, b| a.id.cmp(&b.id));
    users.dedup_by(|a, b| a.id == b.id);
    users
}
