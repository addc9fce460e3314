//! HTTP client for the Traker REST backend.
//!
//! Authenticated calls send the access token both as the `accessToken`
//! cookie the backend reads and as a bearer token. When the backend answers
//! 401 or 403 the client refreshes the tokens once per session and retries
//! the original request. If that fails too, the session is marked expired.

use std::time::Duration;

use reqwest::{
    Client, Method, RequestBuilder, StatusCode,
    header::{CONTENT_TYPE, COOKIE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    Error,
    api::session::{AuthTokens, Session},
};

/// Backend cookie holding the access token.
const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Backend cookie holding the refresh token.
const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Shared client for the backend REST API.
///
/// Cheap to clone, clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct LogInRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    username: &'a str,
    name: &'a str,
    password: &'a str,
}

/// The error body the backend sends with non-success responses.
#[derive(Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`, e.g. "http://localhost:8080".
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange a username and password for backend tokens.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if the backend rejects the credentials.
    pub async fn log_in(&self, username: &str, password: &str) -> Result<AuthTokens, Error> {
        let response = execute(
            self.client
                .post(self.url("/api/auth/login"))
                .json(&LogInRequest { username, password }),
        )
        .await?;

        match response.status() {
            status if status.is_success() => decode_json(response).await,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::InvalidCredentials)
            }
            _ => Err(error_from_response(response).await),
        }
    }

    /// Get new tokens with a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, Error> {
        let response = execute(
            self.client
                .post(self.url("/api/auth/refresh"))
                .header(COOKIE, format!("{REFRESH_TOKEN_COOKIE}={refresh_token}")),
        )
        .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        decode_json(response).await
    }

    /// Tell the backend the session is over. Failures are logged and ignored
    /// since the local cookies are cleared regardless.
    pub async fn log_out(&self, tokens: &AuthTokens) {
        let request = with_tokens(self.client.post(self.url("/api/auth/logout")), tokens);

        match execute(request).await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!("Backend log-out returned {}", response.status());
            }
            Err(error) => tracing::warn!("Could not log out of the backend: {error}"),
        }
    }

    /// Create a user account.
    ///
    /// The backend expects the caller to log in separately afterwards.
    pub async fn register<T: DeserializeOwned>(
        &self,
        username: &str,
        name: &str,
        password: &str,
    ) -> Result<T, Error> {
        let response = execute(
            self.client
                .post(self.url("/api/users/register"))
                .json(&RegisterRequest {
                    username,
                    name,
                    password,
                }),
        )
        .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        decode_json(response).await
    }

    /// GET `path` and decode the JSON body.
    ///
    /// `query` may repeat keys, e.g. `[("categories", "1"), ("categories", "2")]`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        let response = self
            .send_authorized(session, |tokens| {
                with_tokens(self.client.get(&url).query(query), tokens)
            })
            .await?;

        decode_json(response).await
    }

    /// Send `body` as JSON with `method` and decode the JSON response.
    pub async fn send_json<B, T>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .send_authorized(session, |tokens| {
                with_tokens(self.client.request(method.clone(), &url).json(body), tokens)
            })
            .await?;

        decode_json(response).await
    }

    /// Send `body` as JSON with `method`, ignoring the response body.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path);

        self.send_authorized(session, |tokens| {
            with_tokens(self.client.request(method.clone(), &url).json(body), tokens)
        })
        .await
        .map(|_| ())
    }

    /// Send a DELETE request to `path`.
    pub async fn delete(&self, session: &Session, path: &str) -> Result<(), Error> {
        let url = self.url(path);

        self.send_authorized(session, |tokens| {
            with_tokens(self.client.delete(&url), tokens)
        })
        .await
        .map(|_| ())
    }

    /// Send an authenticated request, refreshing the tokens and retrying once
    /// on 401 or 403.
    async fn send_authorized(
        &self,
        session: &Session,
        build_request: impl Fn(&AuthTokens) -> RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        if session.is_expired().await {
            return Err(Error::SessionExpired);
        }

        let tokens = session.tokens().await;
        let response = execute(build_request(&tokens)).await?;

        let response = if is_auth_failure(response.status()) {
            tracing::debug!("Backend rejected the access token, refreshing");
            let tokens = self.refresh_session(session, &tokens.access_token).await?;
            let retry = execute(build_request(&tokens)).await?;

            if is_auth_failure(retry.status()) {
                tracing::info!("Backend rejected refreshed tokens, ending session");
                session.lock().await.expired = true;
                return Err(Error::SessionExpired);
            }

            retry
        } else {
            response
        };

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response)
    }

    /// Refresh the session's tokens unless another call already did.
    ///
    /// `stale_access_token` is the token that was just rejected. If the
    /// session holds a different one, a concurrent call refreshed it first.
    async fn refresh_session(
        &self,
        session: &Session,
        stale_access_token: &str,
    ) -> Result<AuthTokens, Error> {
        let mut state = session.lock().await;

        if state.expired {
            return Err(Error::SessionExpired);
        }

        if state.tokens.access_token != stale_access_token {
            return Ok(state.tokens.clone());
        }

        if state.refresh_attempted {
            state.expired = true;
            return Err(Error::SessionExpired);
        }

        state.refresh_attempted = true;

        let Some(refresh_token) = state.tokens.refresh_token.clone() else {
            state.expired = true;
            return Err(Error::SessionExpired);
        };

        match self.refresh(&refresh_token).await {
            Ok(mut tokens) => {
                if tokens.refresh_token.is_none() {
                    tokens.refresh_token = Some(refresh_token);
                }

                state.tokens = tokens.clone();
                state.refreshed = true;
                Ok(tokens)
            }
            Err(Error::BackendUnavailable(reason)) => {
                // A later call may retry once the backend is reachable again.
                state.refresh_attempted = false;
                Err(Error::BackendUnavailable(reason))
            }
            Err(error) => {
                tracing::info!("Could not refresh tokens: {error}");
                state.expired = true;
                Err(Error::SessionExpired)
            }
        }
    }
}

fn with_tokens(request: RequestBuilder, tokens: &AuthTokens) -> RequestBuilder {
    request
        .header(
            COOKIE,
            format!("{ACCESS_TOKEN_COOKIE}={}", tokens.access_token),
        )
        .bearer_auth(&tokens.access_token)
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

async fn execute(request: RequestBuilder) -> Result<reqwest::Response, Error> {
    request.send().await.map_err(|error| {
        if error.is_timeout() {
            Error::BackendUnavailable(format!("request timed out: {error}"))
        } else if error.is_connect() {
            Error::BackendUnavailable(format!("could not connect: {error}"))
        } else {
            tracing::error!("Backend request failed: {error}");
            Error::BackendUnavailable(error.to_string())
        }
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let bytes = response
        .bytes()
        .await
        .map_err(|error| Error::InvalidBackendResponse(error.to_string()))?;

    // Endpoints without a response body are decoded from `null`, so unit and
    // `Option` targets still work.
    let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

    serde_json::from_slice(bytes).map_err(|error| {
        tracing::error!("Could not decode backend response: {error}");
        Error::InvalidBackendResponse(error.to_string())
    })
}

async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    let text = response.text().await.unwrap_or_default();

    let message = is_json
        .then(|| serde_json::from_str::<BackendErrorBody>(&text).ok())
        .flatten()
        .and_then(|body| body.message)
        .unwrap_or(text);

    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_owned()
    } else {
        message
    };

    if status.is_server_error() {
        tracing::error!("Backend error {status}: {message}");
    } else {
        tracing::warn!("Backend rejected request with {status}: {message}");
    }

    Error::Backend {
        status: status.as_u16(),
        message,
    }
}
