//! Session store
//!
//! The session is derived locally from the persisted token; no request is
//! made to find out who the user is. A token that cannot be decoded, or has
//! expired, is wiped and the session falls back to anonymous.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;

use crate::client::AuthApi;
use crate::client::models::Credentials;
use crate::error::{ApiError, Error, Result};

/// Where the raw token lives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// In-memory token store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: std::sync::Mutex::new(Some(token.into())),
        }
    }

    pub fn peek(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.peek())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

/// Role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Decoded identity of the current user, or anonymous
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: String,
    pub username: Option<String>,
    pub role: Role,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && !self.user_id.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role == Role::Admin
    }

    /// Name to show in the UI
    pub fn display_name(&self) -> &str {
        match &self.username {
            Some(name) => name.as_str(),
            None if self.is_authenticated() => self.user_id.as_str(),
            None => "anonymous",
        }
    }

    /// Bearer token, or an auth error naming the attempted action
    pub fn require_token(&self, action: &str) -> Result<&str> {
        match &self.token {
            Some(token) if self.is_authenticated() => Ok(token.as_str()),
            _ => Err(ApiError::Unauthorized(format!("You must be logged in to {}.", action)).into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(alias = "userId", alias = "sub")]
    user_id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode a JWT payload into a session without verifying the signature.
///
/// The server verifies signatures; the client only needs identity and
/// expiry to decide what to show.
pub fn decode_token(token: &str, now: DateTime<Utc>) -> Result<Session> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ApiError::InvalidToken.into());
    }

    // JWT segments are unpadded base64url, but tolerate padding
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|_| ApiError::InvalidToken)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| ApiError::InvalidToken)?;

    if claims.user_id.is_empty() {
        return Err(ApiError::InvalidToken.into());
    }

    let expires_at = match claims.exp {
        Some(exp) => Some(DateTime::from_timestamp(exp, 0).ok_or(ApiError::InvalidToken)?),
        None => None,
    };
    if matches!(expires_at, Some(exp) if exp <= now) {
        return Err(ApiError::InvalidToken.into());
    }

    let role = match claims.role.as_deref() {
        Some(r) if r.eq_ignore_ascii_case("admin") => Role::Admin,
        _ => Role::User,
    };

    Ok(Session {
        token: Some(token.to_string()),
        user_id: claims.user_id,
        username: claims.username,
        role,
        expires_at,
    })
}

/// Owns the persisted token and derives the session from it.
pub struct SessionStore<T: TokenStore> {
    tokens: T,
    api: Arc<dyn AuthApi>,
}

impl<T: TokenStore> SessionStore<T> {
    pub fn new(tokens: T, api: Arc<dyn AuthApi>) -> Self {
        Self { tokens, api }
    }

    /// Log in, persist the token and return the decoded session.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let token = self.api.login(credentials).await?;
        let session = decode_token(&token, Utc::now()).map_err(|_| {
            Error::from(ApiError::Unauthorized(
                "Server returned an unreadable session token".to_string(),
            ))
        })?;

        self.tokens.save(&token)?;
        debug!("Logged in as {}", session.user_id);
        Ok(session)
    }

    /// Create an account. The caller must log in afterwards.
    pub async fn signup(&self, credentials: &Credentials) -> Result<()> {
        if credentials.username.trim().is_empty() {
            return Err(ApiError::Unauthorized("Username is required.".to_string()).into());
        }
        if credentials.password.is_empty() {
            return Err(ApiError::Unauthorized("Password is required.".to_string()).into());
        }

        match self.api.signup(credentials).await {
            Err(Error::Api(ApiError::Conflict(msg))) => Err(ApiError::Unauthorized(msg).into()),
            Err(Error::Api(ApiError::Validation(msg))) => Err(ApiError::Unauthorized(msg).into()),
            other => other,
        }
    }

    /// Drop the persisted token.
    pub fn logout(&self) -> Result<()> {
        self.tokens.clear()
    }

    /// Session for the persisted token, clearing it if it no longer decodes.
    pub fn current_session(&self) -> Session {
        self.current_session_at(Utc::now())
    }

    pub fn current_session_at(&self, now: DateTime<Utc>) -> Session {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => return Session::anonymous(),
            Err(e) => {
                warn!("Could not read stored session: {}", e);
                return Session::anonymous();
            }
        };

        match decode_token(&token, now) {
            Ok(session) => session,
            Err(_) => {
                warn!("Stored session token is invalid or expired; clearing it");
                if let Err(e) = self.tokens.clear() {
                    warn!("Failed to clear stored token: {}", e);
                }
                Session::anonymous()
            }
        }
    }
}
