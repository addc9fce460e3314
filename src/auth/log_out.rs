//! Log-out route handler that ends the backend session and clears the token cookies.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{
        AuthState,
        cookie::{get_tokens_from_cookies, invalidate_auth_cookies},
    },
    endpoints,
};

/// Log out of the backend, invalidate the token cookies and redirect the
/// client to the log-in page.
pub async fn get_log_out(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    if let Some(tokens) = get_tokens_from_cookies(&jar) {
        state.api.log_out(&tokens).await;
    }

    let jar = invalidate_auth_cookies(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use axum::{
        Router,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
        routing::post,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::OffsetDateTime;

    use crate::{
        api::AuthTokens,
        auth::{
            AuthState,
            cookie::{
                COOKIE_ACCESS_TOKEN, COOKIE_REFRESH_TOKEN, DEFAULT_COOKIE_DURATION,
                set_auth_cookies,
            },
        },
        endpoints,
        test_utils::{spawn_backend, test_state},
    };

    use super::get_log_out;

    async fn get_auth_state(backend: Router) -> AuthState {
        let state = test_state(&spawn_backend(backend).await);

        AuthState {
            cookie_key: state.cookie_key,
            cookie_duration: state.cookie_duration,
            api: state.api,
        }
    }

    #[tokio::test]
    async fn log_out_ends_backend_session_and_redirects() {
        let logged_out = Arc::new(AtomicBool::new(false));
        let flag = logged_out.clone();
        let backend = Router::new().route(
            "/api/auth/logout",
            post(move || {
                let flag = flag.clone();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    StatusCode::OK
                }
            }),
        );
        let state = get_auth_state(backend).await;
        let jar = set_auth_cookies(
            PrivateCookieJar::new(state.cookie_key.clone()),
            &AuthTokens::new("access".to_owned(), Some("refresh".to_owned())),
            DEFAULT_COOKIE_DURATION,
        );

        let response = get_log_out(State(state), jar).await;

        assert!(logged_out.load(Ordering::SeqCst));
        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookies_expired(&response);
    }

    #[tokio::test]
    async fn log_out_succeeds_when_backend_fails() {
        let backend = Router::new().route(
            "/api/auth/logout",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let state = get_auth_state(backend).await;
        let jar = set_auth_cookies(
            PrivateCookieJar::new(state.cookie_key.clone()),
            &AuthTokens::new("access".to_owned(), None),
            DEFAULT_COOKIE_DURATION,
        );

        let response = get_log_out(State(state), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookies_expired(&response);
    }

    #[track_caller]
    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_cookies_expired(response: &Response<Body>) {
        let mut expired_cookies = 0;

        for cookie_header in response.headers().get_all(SET_COOKIE) {
            let cookie = Cookie::parse(cookie_header.to_str().unwrap()).unwrap();

            if cookie.name() != COOKIE_ACCESS_TOKEN && cookie.name() != COOKIE_REFRESH_TOKEN {
                continue;
            }

            assert_eq!(
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
                "got expires {:?} for {}",
                cookie.expires_datetime(),
                cookie.name()
            );
            expired_cookies += 1;
        }

        assert_eq!(expired_cookies, 2, "want both token cookies expired");
    }
}
