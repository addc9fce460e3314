//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped into the `#alert-container` element of the base page
//! and dismissed by `static/app.js` after a few seconds. Error alerts are
//! returned with an error status code and reach the container through the
//! `hx-target-error` attribute on the triggering element. Success alerts
//! retarget themselves with the `HX-Retarget` header. Both replace only the
//! container's contents, so the container survives for the next alert.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxReswap, HxRetarget, SwapOption};
use maud::{Markup, html};

/// The ID of the element alerts are swapped into.
pub const ALERT_CONTAINER_ID: &str = "alert-container";

/// A transient message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with extra details, e.g. the reason the backend gave.
    Error { message: String, details: String },
    /// An error message without details.
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::SuccessSimple { .. })
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
            Alert::ErrorSimple { message } => (ERROR_STYLE, message, String::new()),
        };

        html! {
            div role="alert" data-alert="true" class=(style)
            {
                p class="font-semibold" { (message) }

                @if !details.is_empty() {
                    p class="mt-1 text-sm" { (details) }
                }
            }
        }
    }

    /// Render the alert with an explicit status code.
    ///
    /// Error alerts should use a 4xx or 5xx status so that the htmx
    /// response-targets extension swaps them into the alert container.
    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        if self.is_success() {
            return (
                status_code,
                HxRetarget(format!("#{ALERT_CONTAINER_ID}")),
                HxReswap(SwapOption::InnerHtml),
                self.into_html(),
            )
                .into_response();
        }

        (status_code, HxReswap(SwapOption::InnerHtml), self.into_html()).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status_code = if self.is_success() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        self.into_response_with_status(status_code)
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 rounded-lg shadow-lg text-green-800 \
    bg-green-50 border border-green-300 dark:bg-gray-800 dark:text-green-400 \
    dark:border-green-800";

const ERROR_STYLE: &str = "p-4 mb-4 rounded-lg shadow-lg text-red-800 \
    bg-red-50 border border-red-300 dark:bg-gray-800 dark:text-red-400 \
    dark:border-red-800";
