//! Traker is a web app for tracking personal finances and working hours.
//!
//! This library serves the HTML pages of the app. All data lives in the
//! Traker REST backend, which this server calls on behalf of the signed-in
//! user. The backend's access and refresh tokens are kept in private cookies
//! and refreshed transparently when they expire.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRedirect;
use axum_server::Handle;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod day_log;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod period;
mod record;
mod routing;
mod status;
mod timezone;
mod user;

#[cfg(test)]
mod test_utils;

pub use api::ApiClient;
pub use app_state::AppState;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The backend rejected the username and password at log-in.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The backend tokens are missing, or the access token was rejected and
    /// could not be refreshed. The user has to log in again.
    #[error("the session has expired")]
    SessionExpired,

    /// The backend could not be reached or did not answer in time.
    #[error("the backend is unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the reason from the backend's error body, if it sent one.
    #[error("the backend responded with status {status}: {message}")]
    Backend {
        /// The HTTP status code returned by the backend.
        status: u16,
        /// The error message returned by the backend.
        message: String,
    },

    /// The backend answered with a body that could not be decoded.
    #[error("could not decode the backend response: {0}")]
    InvalidBackendResponse(String),

    /// User input failed validation before anything was sent to the backend.
    #[error("{0}")]
    Validation(String),

    /// A bulk action was submitted without any selected records.
    #[error("no records are selected")]
    EmptySelection,

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Backend { status: 404, .. } => get_404_not_found_response(),
            Error::SessionExpired => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
            Error::BackendUnavailable(reason) => {
                tracing::error!("Backend unavailable: {reason}");
                InternalServerError {
                    description: "Service Unavailable",
                    fix: "The Traker server could not be reached. Try again in a moment.",
                }
                .into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as a transient alert for htmx requests.
    fn into_alert_response(self) -> Response {
        match self {
            Error::SessionExpired => (
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response(),
            Error::Validation(message) => Alert::Error {
                message: "Check the form".to_owned(),
                details: message,
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::EmptySelection => Alert::ErrorSimple {
                message: "Select at least one record first".to_owned(),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::NotFound | Error::Backend { status: 404, .. } => Alert::Error {
                message: "Not found".to_owned(),
                details: "The item could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                    .to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::Backend { status, message } if (400..500).contains(&status) => {
                let status_code =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);

                Alert::Error {
                    message: "The request was rejected".to_owned(),
                    details: message,
                }
                .into_response_with_status(status_code)
            }
            Error::BackendUnavailable(reason) => {
                tracing::error!("Backend unavailable: {reason}");
                Alert::Error {
                    message: "Service unavailable".to_owned(),
                    details: "The Traker server could not be reached. Try again in a moment."
                        .to_owned(),
                }
                .into_response_with_status(StatusCode::BAD_GATEWAY)
            }
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                }
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error, endpoints,
        test_utils::{assert_hx_redirect, get_header, parse_html_fragment},
    };

    #[test]
    fn session_expired_page_redirects_to_log_in() {
        let response = Error::SessionExpired.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::LOG_IN_VIEW);
    }

    #[test]
    fn session_expired_alert_redirects_htmx_to_log_in() {
        let response = Error::SessionExpired.into_alert_response();

        assert_hx_redirect(&response, endpoints::LOG_IN_VIEW);
    }

    #[tokio::test]
    async fn backend_rejection_shows_backend_message() {
        let response = Error::Backend {
            status: 400,
            message: "Category not found".to_owned(),
        }
        .into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Category not found"), "got {text:?}");
    }

    #[test]
    fn backend_not_found_renders_404_page() {
        let response = Error::Backend {
            status: 404,
            message: String::new(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unavailable_backend_alert_is_bad_gateway() {
        let response = Error::BackendUnavailable("connection refused".to_owned())
            .into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_error_is_bad_request() {
        let response =
            Error::Validation("Amount must be greater than zero".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
