use crate::domain_model::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

/// Token pair as issued by `users/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: AccessToken,
    pub refresh: RefreshToken,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionPhase {
    Anonymous,
    /// Tokens are held but the profile has not been cached yet.
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
    pub user: Option<User>,
}

impl Session {
    pub fn authenticated(tokens: AuthTokens, user: User) -> Self {
        Session {
            access_token: Some(tokens.access),
            refresh_token: Some(tokens.refresh),
            user: Some(user),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.access_token, &self.user) {
            (None, _) => SessionPhase::Anonymous,
            (Some(_), None) => SessionPhase::Authenticating,
            (Some(_), Some(_)) => SessionPhase::Authenticated,
        }
    }
}
