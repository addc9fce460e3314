//! Stores the backend tokens in private cookies.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::api::AuthTokens;

pub(crate) const COOKIE_ACCESS_TOKEN: &str = "access_token";
pub(crate) const COOKIE_REFRESH_TOKEN: &str = "refresh_token";
/// How long the token cookies last if the backend does not send the refresh token lifetime.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::days(7);

fn token_cookie(name: &'static str, value: String, expiry: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the backend tokens to the cookie jar.
///
/// The cookies expire together with the refresh token, or after
/// `default_duration` if its lifetime is unknown. The access token cookie
/// outlives the access token itself so an expired access token can still be
/// refreshed.
pub(crate) fn set_auth_cookies(
    jar: PrivateCookieJar,
    tokens: &AuthTokens,
    default_duration: Duration,
) -> PrivateCookieJar {
    let duration = tokens
        .refresh_expires_in
        .filter(|seconds| *seconds > 0)
        .map(Duration::seconds)
        .unwrap_or(default_duration);
    let expiry = OffsetDateTime::now_utc() + duration;

    let jar = jar.add(token_cookie(
        COOKIE_ACCESS_TOKEN,
        tokens.access_token.clone(),
        expiry,
    ));

    match &tokens.refresh_token {
        Some(refresh_token) => jar.add(token_cookie(
            COOKIE_REFRESH_TOKEN,
            refresh_token.clone(),
            expiry,
        )),
        None => jar,
    }
}

/// Set the token cookies to an invalid value and set their max age to zero,
/// which should delete the cookies on the client side.
pub(crate) fn invalidate_auth_cookies(jar: PrivateCookieJar) -> PrivateCookieJar {
    let deleted = |name| {
        Cookie::build((name, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true)
    };

    jar.add(deleted(COOKIE_ACCESS_TOKEN))
        .add(deleted(COOKIE_REFRESH_TOKEN))
}

/// Read the backend tokens from the cookie jar.
///
/// Returns `None` if there is no usable access token.
pub(crate) fn get_tokens_from_cookies(jar: &PrivateCookieJar) -> Option<AuthTokens> {
    let access_token = jar
        .get(COOKIE_ACCESS_TOKEN)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|token| !token.is_empty() && token != "deleted")?;
    let refresh_token = jar
        .get(COOKIE_REFRESH_TOKEN)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|token| !token.is_empty() && token != "deleted");

    Some(AuthTokens::new(access_token, refresh_token))
}
