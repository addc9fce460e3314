//! Logging in and out, registration, and the guard for protected routes.
//!
//! The backend issues the tokens. This module only keeps them in private
//! cookies and hands them to route handlers as a [crate::api::Session].

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use time::Duration;

use crate::{AppState, api::ApiClient};

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register_user;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use register_user::{get_register_page, register_user};

/// The state needed to log in, register and guard routes.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the token cookies last when the backend does not say.
    pub cookie_duration: Duration,
    /// The client for the REST backend.
    pub api: ApiClient,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            api: state.api.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}
