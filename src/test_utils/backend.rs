//! A stand-in for the REST backend.
//!
//! Tests build an axum [Router] with just the backend routes they need and
//! serve it on an ephemeral port with [spawn_backend].

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{
    AppState,
    api::{ApiClient, AuthTokens, Session},
};

pub(crate) const VALID_ACCESS_TOKEN: &str = "valid-access";
pub(crate) const VALID_REFRESH_TOKEN: &str = "valid-refresh";
pub(crate) const REFRESHED_ACCESS_TOKEN: &str = "refreshed-access";

/// Serve `router` on 127.0.0.1 and return its base URL.
pub(crate) async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind fake backend");
    let address = listener
        .local_addr()
        .expect("Could not get fake backend address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake backend stopped unexpectedly");
    });

    format!("http://{address}")
}

pub(crate) fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).expect("Could not create API client")
}

pub(crate) fn test_session() -> Session {
    Session::new(AuthTokens::new(
        VALID_ACCESS_TOKEN.to_owned(),
        Some(VALID_REFRESH_TOKEN.to_owned()),
    ))
}

pub(crate) fn test_state(base_url: &str) -> AppState {
    AppState::new("foobar", "Etc/UTC", test_client(base_url))
}

/// The access token the client sent, read from the `accessToken` cookie.
pub(crate) fn access_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .filter_map(|cookie| cookie.trim().split_once('='))
                .find(|(name, _)| *name == "accessToken")
                .map(|(_, value)| value.to_owned())
        })
}

/// Adds `POST /api/auth/login`, accepting "alice" with the password "hunter2".
pub(crate) fn log_in_route(router: Router) -> Router {
    router.route(
        "/api/auth/login",
        post(|Json(body): Json<Value>| async move {
            if body["username"] == "alice" && body["password"] == "hunter2" {
                Json(json!({
                    "access_token": VALID_ACCESS_TOKEN,
                    "token_type": "Bearer",
                    "refresh_token": VALID_REFRESH_TOKEN,
                    "expires_in": 900,
                    "refresh_expires_in": 3600
                }))
                .into_response()
            } else {
                bad_request("Bad credentials")
            }
        }),
    )
}

/// The backend's error body for rejected requests.
pub(crate) fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": 400, "message": message})),
    )
        .into_response()
}

/// Collects what a fake backend route received, e.g. JSON bodies or query strings.
#[derive(Debug)]
pub(crate) struct Recorder<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T: Clone> Recorder<T> {
    pub(crate) fn record(&self, value: T) {
        self.0.lock().expect("Recorder lock poisoned").push(value);
    }

    pub(crate) fn all(&self) -> Vec<T> {
        self.0.lock().expect("Recorder lock poisoned").clone()
    }

    pub(crate) fn last(&self) -> Option<T> {
        self.all().pop()
    }
}
