//! Authentication middleware that restores the backend session from cookies,
//! saves refreshed tokens and handles redirects to the log-in page.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::{
    api::Session,
    auth::{
        AuthState,
        cookie::{get_tokens_from_cookies, invalidate_auth_cookies, set_auth_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
};

/// Copy the `Set-Cookie` headers of `jar` onto `response`.
fn append_cookies(response: Response, jar: PrivateCookieJar) -> Response {
    let (mut parts, body) = response.into_parts();

    for (key, value) in jar.into_response().headers().iter() {
        if key == SET_COOKIE {
            parts.headers.append(key, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

/// Checks for the token cookies and runs the request with a [Session].
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<Session>` to make backend calls.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        tracing::warn!("Could not build a redirect URL from the request. Falling back to dashboard.");

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
    let Some(tokens) = get_tokens_from_cookies(&jar) else {
        return get_redirect(&log_in_redirect_url);
    };

    let session = Session::new(tokens);
    parts.extensions.insert(session.clone());
    let response = next.run(Request::from_parts(parts, body)).await;

    if session.is_expired().await {
        tracing::info!("Backend session expired. Redirecting to log in page.");
        return append_cookies(
            get_redirect(&log_in_redirect_url),
            invalidate_auth_cookies(jar),
        );
    }

    match session.refreshed_tokens().await {
        Some(tokens) => {
            tracing::debug!("Saving refreshed backend tokens.");
            append_cookies(
                response,
                set_auth_cookies(jar, &tokens, state.cookie_duration),
            )
        }
        None => response,
    }
}

/// Middleware for full pages.
///
/// Redirects to the log-in page if the user is not logged in or the backend
/// session could not be refreshed. Pages fetched by htmx, e.g. to reload a
/// table, are redirected with `HX-Redirect` instead.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let is_htmx_request = request.headers().contains_key("hx-request");

    auth_guard_internal(state, request, next, move |redirect_url| {
        if is_htmx_request {
            (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
        } else {
            Redirect::to(redirect_url).into_response()
        }
    })
    .await
}

/// Middleware for htmx endpoints, same as [auth_guard] but redirects with `HX-Redirect`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        middleware,
        response::{Html, IntoResponse, Response},
        routing::{get, post},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        ApiClient,
        api::{AuthTokens, Session},
        auth::{
            AuthState,
            cookie::{COOKIE_ACCESS_TOKEN, COOKIE_REFRESH_TOKEN, set_auth_cookies},
            middleware::{auth_guard, auth_guard_hx},
        },
        endpoints,
        test_utils::{
            REFRESHED_ACCESS_TOKEN, VALID_ACCESS_TOKEN, VALID_REFRESH_TOKEN, access_token,
            spawn_backend, test_state,
        },
    };

    const TEST_LOG_IN_ROUTE: &str = "/test_log_in";
    const TEST_PROTECTED_ROUTE: &str = "/protected";
    const TEST_API_ROUTE: &str = "/api/protected";

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> PrivateCookieJar {
        let tokens = AuthTokens::new(
            VALID_ACCESS_TOKEN.to_owned(),
            Some(VALID_REFRESH_TOKEN.to_owned()),
        );

        set_auth_cookies(jar, &tokens, state.cookie_duration)
    }

    /// Calls the backend so the refresh logic runs.
    async fn test_handler(
        State(api): State<ApiClient>,
        Extension(session): Extension<Session>,
    ) -> Response {
        match api.get_json::<Value>(&session, "/api/users/me", &[]).await {
            Ok(_) => Html("<h1>Hello, World!</h1>").into_response(),
            Err(error) => error.into_response(),
        }
    }

    /// Accepts only the refreshed access token, so every session has to refresh.
    fn refreshing_backend() -> Router {
        Router::new()
            .route(
                "/api/users/me",
                get(|headers: HeaderMap| async move {
                    match access_token(&headers).as_deref() {
                        Some(REFRESHED_ACCESS_TOKEN) => Json(json!({"id": 1})).into_response(),
                        _ => StatusCode::UNAUTHORIZED.into_response(),
                    }
                }),
            )
            .route(
                "/api/auth/refresh",
                post(|| async {
                    Json(json!({
                        "access_token": REFRESHED_ACCESS_TOKEN,
                        "refresh_token": "refreshed-refresh",
                        "refresh_expires_in": 3600
                    }))
                }),
            )
    }

    /// Rejects everything, including refreshes.
    fn rejecting_backend() -> Router {
        Router::new()
            .route("/api/users/me", get(|| async { StatusCode::UNAUTHORIZED }))
            .route(
                "/api/auth/refresh",
                post(|| async { StatusCode::UNAUTHORIZED }),
            )
    }

    async fn get_test_server(backend: Router) -> TestServer {
        let app_state = test_state(&spawn_backend(backend).await);
        let auth_state = AuthState {
            cookie_key: app_state.cookie_key.clone(),
            cookie_duration: app_state.cookie_duration,
            api: app_state.api.clone(),
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(auth_state.clone(), auth_guard))
            .merge(
                Router::new()
                    .route(TEST_API_ROUTE, get(test_handler))
                    .route_layer(middleware::from_fn_with_state(
                        auth_state.clone(),
                        auth_guard_hx,
                    )),
            )
            .with_state(app_state)
            .merge(
                Router::new()
                    .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
                    .with_state(auth_state),
            );

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn expected_log_in_location(target: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", target)]).unwrap();

        format!("{}?{}", endpoints::LOG_IN_VIEW, query)
    }

    #[tokio::test]
    async fn refreshed_tokens_are_saved_to_cookies() {
        let server = get_test_server(refreshing_backend()).await;
        let jar = server.post(TEST_LOG_IN_ROUTE).await.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        response.assert_status_ok();
        let access_cookie = response.cookie(COOKIE_ACCESS_TOKEN);
        let refresh_cookie = response.cookie(COOKIE_REFRESH_TOKEN);
        // The values are encrypted, so only check they were rewritten.
        assert_eq!(access_cookie.secure(), Some(true));
        assert_eq!(access_cookie.http_only(), Some(true));
        assert!(refresh_cookie.expires_datetime().is_some());
    }

    #[tokio::test]
    async fn no_cookies_redirects_to_log_in() {
        let server = get_test_server(refreshing_backend()).await;

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(TEST_PROTECTED_ROUTE)
        );
    }

    #[tokio::test]
    async fn htmx_page_request_without_cookies_uses_hx_redirect() {
        let server = get_test_server(refreshing_backend()).await;

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_header("HX-Request", "true")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            expected_log_in_location(TEST_PROTECTED_ROUTE)
        );
        assert!(response.headers().get("location").is_none());
    }

    #[tokio::test]
    async fn garbage_cookie_redirects_to_log_in() {
        let server = get_test_server(refreshing_backend()).await;

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::new(COOKIE_ACCESS_TOKEN, "FOOBAR"))
            .await;

        response.assert_status_see_other();
    }

    #[tokio::test]
    async fn expired_session_clears_cookies_and_redirects() {
        let server = get_test_server(rejecting_backend()).await;
        let jar = server.post(TEST_LOG_IN_ROUTE).await.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(TEST_PROTECTED_ROUTE)
        );
        let cookie = response.cookie(COOKIE_ACCESS_TOKEN);
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[tokio::test]
    async fn expired_session_on_api_route_uses_hx_redirect() {
        let server = get_test_server(rejecting_backend()).await;
        let jar = server.post(TEST_LOG_IN_ROUTE).await.cookies();
        let current_url = "http://localhost:3000/expenses?from=2025-03-01&to=2025-03-31";

        let response = server
            .get(TEST_API_ROUTE)
            .add_cookies(jar)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            expected_log_in_location("/expenses?from=2025-03-01&to=2025-03-31")
        );
    }
}
