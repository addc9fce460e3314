//! The backend tokens for a single browser request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

/// The tokens issued by the backend at log-in or refresh.
///
/// Field names follow the backend's OAuth2-style response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// JWT sent with every authenticated backend request.
    pub access_token: String,
    /// Token used to obtain a new access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Lifetime of the refresh token in seconds.
    #[serde(default)]
    pub refresh_expires_in: Option<i64>,
}

impl AuthTokens {
    /// Tokens restored from cookies, without any expiry metadata.
    pub fn new(access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: None,
            expires_in: None,
            refresh_expires_in: None,
        }
    }
}

#[derive(Debug)]
pub(super) struct SessionState {
    pub(super) tokens: AuthTokens,
    /// Set once a refresh has been attempted, successful or not.
    pub(super) refresh_attempted: bool,
    /// Set when the tokens were replaced and need writing back to cookies.
    pub(super) refreshed: bool,
    /// Set when the user has to log in again.
    pub(super) expired: bool,
}

/// The session shared by every backend call made while handling one request.
///
/// Cloning a [Session] shares the same state. The lock serialises refresh
/// attempts, so concurrent calls that all get a 401 refresh at most once.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(tokens: AuthTokens) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                tokens,
                refresh_attempted: false,
                refreshed: false,
                expired: false,
            })),
        }
    }

    /// A snapshot of the current tokens.
    pub async fn tokens(&self) -> AuthTokens {
        self.inner.lock().await.tokens.clone()
    }

    /// The new tokens if a refresh happened during this request.
    pub async fn refreshed_tokens(&self) -> Option<AuthTokens> {
        let state = self.inner.lock().await;

        state.refreshed.then(|| state.tokens.clone())
    }

    pub async fn is_expired(&self) -> bool {
        self.inner.lock().await.expired
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().await
    }
}
