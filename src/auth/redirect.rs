//! Where to send the user after they log in.
//!
//! Only same-site paths are accepted as redirect targets. Anything with a
//! scheme or host, protocol-relative URLs and the log-in page itself are
//! rejected so the log-in form cannot be used as an open redirect.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_path(path_and_query: &str) -> bool {
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return false;
    }

    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW && !path.starts_with("/api/")
}

/// Reduce `raw_url` to a safe, same-site path and query.
///
/// Returns `None` for absolute URLs and unsafe paths.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();
    is_safe_redirect_path(path_and_query).then(|| path_and_query.to_owned())
}

/// Like [normalize_redirect_url], but for the absolute URL htmx sends in
/// `HX-Current-URL`. The host is dropped and only the path is kept.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_path(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in URL that sends the user back to the page behind `request`.
///
/// For htmx requests to `/api` routes the page is taken from `HX-Current-URL`.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", redirect_target)])
        .map(|query| format!("{}?{}", endpoints::LOG_IN_VIEW, query))
        .inspect_err(|error| {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}")
        })
        .ok()
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let redirect_url = normalize_hx_current_url(current_url);
    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod redirect_tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn accepts_same_site_paths() {
        assert_eq!(
            normalize_redirect_url("/expenses?from=2025-03-01&to=2025-03-31"),
            Some("/expenses?from=2025-03-01&to=2025-03-31".to_owned())
        );
    }

    #[test]
    fn rejects_unsafe_targets() {
        for url in [
            "https://example.com/dashboard",
            "//example.com",
            "dashboard",
            endpoints::LOG_IN_VIEW,
            "/log_in?redirect_url=%2Fdashboard",
            "/api/expenses/batch",
        ] {
            assert_eq!(normalize_redirect_url(url), None, "accepted {url:?}");
        }
    }

    #[test]
    fn page_request_redirects_back_to_page() {
        let request = Request::builder()
            .uri("/budget?month=2025-03")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some("/log_in?redirect_url=%2Fbudget%3Fmonth%3D2025-03".to_owned())
        );
    }

    #[test]
    fn hx_request_redirects_back_to_current_page() {
        let request = Request::builder()
            .uri("/api/expenses/bulk-delete")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "http://localhost:3000/expenses")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some("/log_in?redirect_url=%2Fexpenses".to_owned())
        );
    }

    #[test]
    fn api_request_without_htmx_headers_has_no_target() {
        let request = Request::builder()
            .uri("/api/expenses/bulk-delete")
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }
}
