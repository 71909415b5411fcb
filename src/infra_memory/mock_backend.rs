use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::seed;
use crate::infra_memory::{Argon2PasswordHasher, JwtConfig, JwtHs256Codec};
use chrono::{DateTime, Utc};
use nanoid::nanoid;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum MockBackendError {
    #[error("authentication credentials were not provided or are invalid")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("post not found")]
    PostNotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<TokenError> for MockBackendError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => MockBackendError::Unauthorized,
            TokenError::InternalError(e) => MockBackendError::InternalError(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockBackendConfig {
    /// Artificial delay applied before every operation.
    pub latency: Duration,
    pub signing_key: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for MockBackendConfig {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            signing_key: b"connectly-mock-signing-key".to_vec(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

struct MockUser {
    user: User,
    password_hash: String,
    /// Accepted connections and when they were established. Always symmetric.
    connections: BTreeMap<UserId, DateTime<Utc>>,
}

/// A pending or rejected request. Accepted requests are folded into the
/// users' connection maps and removed from the request table.
struct RequestEdge {
    requester: UserId,
    status: RequestStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct MockPost {
    id: PostId,
    author: UserId,
    content: String,
    image: Option<String>,
    visibility: Visibility,
    created_at: DateTime<Utc>,
    likes: Vec<UserId>,
    comments: Vec<Comment>,
}

#[derive(Default)]
struct MockState {
    users: Vec<MockUser>,
    /// At most one edge per unordered pair.
    requests: HashMap<UserPair, RequestEdge>,
    posts: Vec<MockPost>,
}

impl MockState {
    fn find(&self, id: &UserId) -> Option<&MockUser> {
        self.users.iter().find(|u| &u.user.id == id)
    }

    fn find_mut(&mut self, id: &UserId) -> Option<&mut MockUser> {
        self.users.iter_mut().find(|u| &u.user.id == id)
    }

    fn user(&self, id: &UserId) -> Result<&User, MockBackendError> {
        self.find(id)
            .map(|u| &u.user)
            .ok_or(MockBackendError::UserNotFound)
    }

    fn is_connected(&self, a: &UserId, b: &UserId) -> bool {
        self.find(a)
            .map(|u| u.connections.contains_key(b))
            .unwrap_or(false)
    }

    fn status_between(&self, me: &UserId, other: &UserId) -> ConnectionStatus {
        if self.is_connected(me, other) {
            return ConnectionStatus::Accepted;
        }
        self.requests
            .get(&UserPair::new(me.clone(), other.clone()))
            .map(|edge| ConnectionStatus::from(edge.status))
            .unwrap_or(ConnectionStatus::None)
    }

    fn next_user_id(&self) -> UserId {
        let max = self
            .users
            .iter()
            .filter_map(|u| u.user.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        UserId((max + 1).to_string())
    }

    fn link(&mut self, a: &UserId, b: &UserId, since: DateTime<Utc>) {
        if let Some(user) = self.find_mut(a) {
            user.connections.insert(b.clone(), since);
        }
        if let Some(user) = self.find_mut(b) {
            user.connections.insert(a.clone(), since);
        }
    }

    fn accepted_connections(&self, subject: &MockUser) -> Vec<Connection> {
        subject
            .connections
            .iter()
            .filter_map(|(other, since)| {
                self.find(other).map(|o| Connection {
                    user_from: subject.user.clone(),
                    user_to: o.user.clone(),
                    status: RequestStatus::Accepted,
                    created_at: Some(*since),
                    updated_at: Some(*since),
                })
            })
            .collect()
    }

    fn outbound_requests(&self, subject: &MockUser, status: RequestStatus) -> Vec<Connection> {
        let mut out: Vec<Connection> = self
            .requests
            .iter()
            .filter(|(_, edge)| edge.requester == subject.user.id && edge.status == status)
            .filter_map(|(pair, edge)| {
                self.find(pair.other(&subject.user.id)).map(|o| Connection {
                    user_from: subject.user.clone(),
                    user_to: o.user.clone(),
                    status: edge.status,
                    created_at: Some(edge.created_at),
                    updated_at: Some(edge.updated_at),
                })
            })
            .collect();
        out.sort_by(|a, b| a.user_to.id.cmp(&b.user_to.id));
        out
    }

    fn connections_of(
        &self,
        subject: &UserId,
        status: RequestStatus,
    ) -> Result<Vec<Connection>, MockBackendError> {
        let subject = self.find(subject).ok_or(MockBackendError::UserNotFound)?;
        Ok(match status {
            RequestStatus::Accepted => self.accepted_connections(subject),
            RequestStatus::Pending | RequestStatus::Rejected => {
                self.outbound_requests(subject, status)
            }
        })
    }

    fn can_see(&self, viewer: &UserId, post: &MockPost) -> bool {
        match post.visibility {
            Visibility::Public => true,
            Visibility::Private => &post.author == viewer,
            Visibility::Connections => {
                &post.author == viewer || self.is_connected(viewer, &post.author)
            }
        }
    }

    fn to_post(&self, post: &MockPost) -> Result<Post, MockBackendError> {
        let author = self
            .find(&post.author)
            .ok_or_else(|| {
                MockBackendError::InternalError(format!("post {} has no author", post.id))
            })?
            .user
            .clone();
        Ok(Post {
            id: post.id.clone(),
            author,
            content: post.content.clone(),
            image: post.image.clone(),
            visibility: post.visibility,
            created_at: post.created_at,
            likes: post.likes.clone(),
            comments: post.comments.clone(),
        })
    }

    fn post(&self, id: &PostId) -> Result<&MockPost, MockBackendError> {
        self.posts
            .iter()
            .find(|p| &p.id == id)
            .ok_or(MockBackendError::PostNotFound)
    }

    fn visible_post_mut(
        &mut self,
        viewer: &UserId,
        id: &PostId,
    ) -> Result<&mut MockPost, MockBackendError> {
        let index = self
            .posts
            .iter()
            .position(|p| &p.id == id)
            .ok_or(MockBackendError::PostNotFound)?;
        if !self.can_see(viewer, &self.posts[index]) {
            return Err(MockBackendError::PostNotFound);
        }
        Ok(&mut self.posts[index])
    }
}

/// In-process stand-in for the REST backend.
///
/// Every operation takes the caller's access token exactly as an HTTP
/// request would carry it, so identity flows through issued tokens rather
/// than through any shared "current user".
pub struct MockBackend {
    state: RwLock<MockState>,
    token_codec: Arc<dyn TokenCodec>,
    credential_hasher: Arc<dyn CredentialHasher>,
    latency: Duration,
}

impl MockBackend {
    /// A backend with no users or posts.
    pub fn empty(config: MockBackendConfig) -> Self {
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "connectly.mock".to_string(),
            audience: "connectly-client".to_string(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            signing_key: config.signing_key,
        }));
        Self {
            state: RwLock::new(MockState::default()),
            token_codec,
            credential_hasher: Arc::new(Argon2PasswordHasher::demo()),
            latency: config.latency,
        }
    }

    /// A backend preloaded with the demo users and posts.
    pub async fn seeded(config: MockBackendConfig) -> Result<Self, MockBackendError> {
        let backend = Self::empty(config);
        let password_hash = backend
            .credential_hasher
            .hash_password(seed::SEED_PASSWORD)
            .await?;

        {
            let mut state = backend.state.write().await;
            let users = seed::users();
            let since = users
                .iter()
                .filter_map(|u| u.user.created_at)
                .max()
                .unwrap_or_else(Utc::now);
            for seed_user in users {
                state.users.push(MockUser {
                    connections: seed_user
                        .connections
                        .iter()
                        .map(|id| (UserId::new(*id), since))
                        .collect(),
                    user: seed_user.user,
                    password_hash: password_hash.clone(),
                });
            }
            for post in seed::posts() {
                state.posts.push(MockPost {
                    id: PostId(post.id.to_string()),
                    author: UserId::new(post.author),
                    content: post.content.to_string(),
                    image: post.image.map(str::to_string),
                    visibility: post.visibility,
                    created_at: post.created_at,
                    likes: post.likes.iter().map(|id| UserId::new(*id)).collect(),
                    comments: post.comments,
                });
            }
        }

        Ok(backend)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Resolves the caller behind an access token.
    async fn caller(&self, access: Option<&AccessToken>) -> Result<UserId, MockBackendError> {
        self.delay().await;
        let token = access.ok_or(MockBackendError::Unauthorized)?;
        let verified = self.token_codec.verify_access_token(token).await?;
        if self.state.read().await.find(&verified.user_id).is_none() {
            return Err(MockBackendError::Unauthorized);
        }
        Ok(verified.user_id)
    }

    // region auth

    pub async fn register(&self, input: &RegisterInput) -> Result<User, MockBackendError> {
        self.delay().await;

        let mut errors = FieldErrors::new();
        if input.name.trim().is_empty() {
            errors.add("name", "This field may not be blank.");
        }
        if input.mobile.trim().is_empty() {
            errors.add("mobile", "This field may not be blank.");
        }
        if !input.email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }
        if input.password.chars().count() < 8 {
            errors.add("password", "Ensure this field has at least 8 characters.");
        }
        self.check_unique(&*self.state.read().await, input, &mut errors);
        if !errors.is_empty() {
            return Err(MockBackendError::Validation(errors));
        }

        let password_hash = self
            .credential_hasher
            .hash_password(&input.password)
            .await?;

        let mut state = self.state.write().await;
        // re-check: another registration may have landed while hashing
        self.check_unique(&state, input, &mut errors);
        if !errors.is_empty() {
            return Err(MockBackendError::Validation(errors));
        }

        let user = User {
            id: state.next_user_id(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            mobile: input.mobile.trim().to_string(),
            created_at: Some(Utc::now()),
        };
        state.users.push(MockUser {
            user: user.clone(),
            password_hash,
            connections: BTreeMap::new(),
        });
        debug!(user_id = %user.id, "mock user registered");
        Ok(user)
    }

    fn check_unique(&self, state: &MockState, input: &RegisterInput, errors: &mut FieldErrors) {
        let mobile = input.mobile.trim();
        let email = input.email.trim().to_lowercase();
        if !mobile.is_empty() && state.users.iter().any(|u| u.user.mobile == mobile) {
            errors.add("mobile", "A user with this mobile number already exists.");
        }
        if state
            .users
            .iter()
            .any(|u| u.user.email.to_lowercase() == email)
        {
            errors.add("email", "A user with this email already exists.");
        }
    }

    pub async fn login(&self, input: &LoginInput) -> Result<AuthTokens, MockBackendError> {
        self.delay().await;

        let (user_id, password_hash) = {
            let state = self.state.read().await;
            let rec = state
                .users
                .iter()
                .find(|u| u.user.mobile == input.mobile.trim())
                .ok_or(MockBackendError::InvalidCredentials)?;
            (rec.user.id.clone(), rec.password_hash.clone())
        };

        let ok = self
            .credential_hasher
            .verify_password(&input.password, &password_hash)
            .await?;
        if !ok {
            return Err(MockBackendError::InvalidCredentials);
        }

        let jti = uuid::Uuid::new_v4().to_string();
        let (access, _) = self
            .token_codec
            .issue_access_token(&user_id, Some(jti.clone()))
            .await?;
        let (refresh, _) = self.token_codec.issue_refresh_token(&user_id, jti).await?;
        Ok(AuthTokens { access, refresh })
    }

    pub async fn current_user(
        &self,
        access: Option<&AccessToken>,
    ) -> Result<User, MockBackendError> {
        let me = self.caller(access).await?;
        Ok(self.state.read().await.user(&me)?.clone())
    }

    // endregion

    // region profiles

    pub async fn profile(
        &self,
        access: Option<&AccessToken>,
        id: &UserId,
    ) -> Result<UserProfile, MockBackendError> {
        let me = self.caller(access).await?;
        let state = self.state.read().await;
        Ok(UserProfile {
            user: state.user(id)?.clone(),
            connection_status: state.status_between(&me, id),
        })
    }

    pub async fn search_users(
        &self,
        access: Option<&AccessToken>,
        term: Option<&str>,
    ) -> Result<Vec<UserProfile>, MockBackendError> {
        let me = self.caller(access).await?;
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| term.map(|t| u.user.matches(t)).unwrap_or(true))
            .map(|u| UserProfile {
                user: u.user.clone(),
                connection_status: state.status_between(&me, &u.user.id),
            })
            .collect())
    }

    // endregion

    // region connections

    pub async fn send_request(
        &self,
        access: Option<&AccessToken>,
        target: &UserId,
    ) -> Result<ConnectionStatus, MockBackendError> {
        let me = self.caller(access).await?;
        let mut state = self.state.write().await;
        state.user(target)?;

        if &me == target {
            return Err(MockBackendError::Conflict(
                "You cannot send a connection request to yourself.".to_string(),
            ));
        }
        if state.is_connected(&me, target) {
            return Err(MockBackendError::Conflict(
                "You are already connected with this user.".to_string(),
            ));
        }

        let pair = UserPair::new(me.clone(), target.clone());
        if let Some(edge) = state.requests.get(&pair) {
            if edge.status == RequestStatus::Pending {
                let detail = if edge.requester == me {
                    "Connection request already exists."
                } else {
                    "This user has already sent you a connection request."
                };
                return Err(MockBackendError::Conflict(detail.to_string()));
            }
        }

        // a rejected edge in either direction is replaced, never duplicated
        let now = Utc::now();
        state.requests.insert(
            pair,
            RequestEdge {
                requester: me.clone(),
                status: RequestStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        );
        debug!(from = %me, to = %target, "connection request sent");
        Ok(ConnectionStatus::Pending)
    }

    pub async fn accept_request(
        &self,
        access: Option<&AccessToken>,
        requester: &UserId,
    ) -> Result<ConnectionStatus, MockBackendError> {
        let me = self.caller(access).await?;
        let mut state = self.state.write().await;
        state.user(requester)?;

        let pair = UserPair::new(me.clone(), requester.clone());
        let pending = matches!(
            state.requests.get(&pair),
            Some(edge) if edge.status == RequestStatus::Pending && &edge.requester == requester
        );
        if !pending {
            return Err(no_pending_request());
        }

        state.requests.remove(&pair);
        state.link(&me, requester, Utc::now());
        debug!(from = %requester, to = %me, "connection request accepted");
        Ok(ConnectionStatus::Accepted)
    }

    pub async fn reject_request(
        &self,
        access: Option<&AccessToken>,
        requester: &UserId,
    ) -> Result<ConnectionStatus, MockBackendError> {
        let me = self.caller(access).await?;
        let mut state = self.state.write().await;
        state.user(requester)?;

        let pair = UserPair::new(me.clone(), requester.clone());
        match state.requests.get_mut(&pair) {
            Some(edge) if edge.status == RequestStatus::Pending && &edge.requester == requester => {
                edge.status = RequestStatus::Rejected;
                edge.updated_at = Utc::now();
            }
            _ => return Err(no_pending_request()),
        }
        debug!(from = %requester, to = %me, "connection request rejected");
        Ok(ConnectionStatus::Rejected)
    }

    pub async fn connections(
        &self,
        access: Option<&AccessToken>,
        status: RequestStatus,
        user: Option<&UserId>,
    ) -> Result<Vec<Connection>, MockBackendError> {
        let me = self.caller(access).await?;
        let subject = user.unwrap_or(&me);
        self.state.read().await.connections_of(subject, status)
    }

    pub async fn pending_connections(
        &self,
        access: Option<&AccessToken>,
    ) -> Result<Vec<Connection>, MockBackendError> {
        let me = self.caller(access).await?;
        let state = self.state.read().await;
        let me_user = state.user(&me)?.clone();

        let mut out: Vec<Connection> = state
            .requests
            .iter()
            .filter(|(pair, edge)| {
                edge.status == RequestStatus::Pending
                    && edge.requester != me
                    && pair.contains(&me)
            })
            .filter_map(|(_, edge)| {
                state.find(&edge.requester).map(|requester| Connection {
                    user_from: requester.user.clone(),
                    user_to: me_user.clone(),
                    status: RequestStatus::Pending,
                    created_at: Some(edge.created_at),
                    updated_at: Some(edge.updated_at),
                })
            })
            .collect();
        out.sort_by(|a, b| a.user_from.id.cmp(&b.user_from.id));
        Ok(out)
    }

    pub async fn search_connections(
        &self,
        access: Option<&AccessToken>,
        term: &str,
        status: RequestStatus,
    ) -> Result<Vec<Connection>, MockBackendError> {
        let me = self.caller(access).await?;
        let connections = self.state.read().await.connections_of(&me, status)?;
        Ok(connections
            .into_iter()
            .filter(|c| c.counterpart(&me).matches(term))
            .collect())
    }

    pub async fn mutual_connections(
        &self,
        access: Option<&AccessToken>,
        user: &UserId,
    ) -> Result<Vec<User>, MockBackendError> {
        let me = self.caller(access).await?;
        let state = self.state.read().await;
        let mine = &state.find(&me).ok_or(MockBackendError::Unauthorized)?.connections;
        let theirs = &state
            .find(user)
            .ok_or(MockBackendError::UserNotFound)?
            .connections;

        Ok(mine
            .keys()
            .filter(|id| theirs.contains_key(*id) && *id != &me && *id != user)
            .filter_map(|id| state.find(id).map(|u| u.user.clone()))
            .collect())
    }

    // endregion

    // region posts

    pub async fn list_posts(
        &self,
        access: Option<&AccessToken>,
        visibility: Option<Visibility>,
    ) -> Result<Vec<Post>, MockBackendError> {
        let me = self.caller(access).await?;
        let state = self.state.read().await;
        let mut posts = state
            .posts
            .iter()
            .filter(|p| state.can_see(&me, p))
            .filter(|p| visibility.map(|v| p.visibility == v).unwrap_or(true))
            .map(|p| state.to_post(p))
            .collect::<Result<Vec<_>, _>>()?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn user_posts(
        &self,
        access: Option<&AccessToken>,
        user: &UserId,
    ) -> Result<Vec<Post>, MockBackendError> {
        let me = self.caller(access).await?;
        let state = self.state.read().await;
        state.user(user)?;
        let mut posts = state
            .posts
            .iter()
            .filter(|p| &p.author == user && state.can_see(&me, p))
            .map(|p| state.to_post(p))
            .collect::<Result<Vec<_>, _>>()?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn create_post(
        &self,
        access: Option<&AccessToken>,
        post: &NewPost,
    ) -> Result<Post, MockBackendError> {
        let me = self.caller(access).await?;
        if post.content.trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("content", "This field may not be blank.");
            return Err(MockBackendError::Validation(errors));
        }

        let mut state = self.state.write().await;
        let created = MockPost {
            id: PostId(nanoid!(10)),
            author: me,
            content: post.content.clone(),
            image: post
                .image
                .as_ref()
                .map(|image| format!("memory://posts/{}", image.file_name)),
            visibility: post.visibility,
            created_at: Utc::now(),
            likes: Vec::new(),
            comments: Vec::new(),
        };
        let out = state.to_post(&created)?;
        state.posts.push(created);
        Ok(out)
    }

    pub async fn like_post(
        &self,
        access: Option<&AccessToken>,
        id: &PostId,
    ) -> Result<Post, MockBackendError> {
        let me = self.caller(access).await?;
        let mut state = self.state.write().await;
        let post = state.visible_post_mut(&me, id)?;
        if !post.likes.contains(&me) {
            post.likes.push(me);
        }
        let post = state.post(id)?;
        state.to_post(post)
    }

    pub async fn unlike_post(
        &self,
        access: Option<&AccessToken>,
        id: &PostId,
    ) -> Result<Post, MockBackendError> {
        let me = self.caller(access).await?;
        let mut state = self.state.write().await;
        let post = state.visible_post_mut(&me, id)?;
        post.likes.retain(|u| u != &me);
        let post = state.post(id)?;
        state.to_post(post)
    }

    pub async fn add_comment(
        &self,
        access: Option<&AccessToken>,
        id: &PostId,
        content: &str,
    ) -> Result<Comment, MockBackendError> {
        let me = self.caller(access).await?;
        if content.trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("content", "This field may not be blank.");
            return Err(MockBackendError::Validation(errors));
        }

        let mut state = self.state.write().await;
        let post = state.visible_post_mut(&me, id)?;
        let comment = Comment {
            id: CommentId(nanoid!(10)),
            author: Some(me),
            content: content.to_string(),
            created_at: Some(Utc::now()),
        };
        post.comments.push(comment.clone());
        Ok(comment)
    }

    // endregion
}

fn no_pending_request() -> MockBackendError {
    MockBackendError::Conflict("No pending connection request found.".to_string())
}
