//! The signed-in user's profile page.

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    alert::{ALERT_CONTAINER_ID, Alert},
    api::{ApiClient, Session},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base, loading_spinner, text_input,
    },
    navigation::NavBar,
};

/// The minimum password length the backend accepts.
pub(crate) const PASSWORD_MIN_LENGTH: usize = 6;

/// A user account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// ISO date time, e.g. "2025-03-01T12:30:00".
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The partial update the backend expects. Blank fields are left unchanged.
#[derive(Debug, Serialize)]
struct UpdateUser<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    pub name: String,
    /// Leave blank to keep the current password.
    #[serde(default)]
    pub password: String,
}

impl ProfileForm {
    fn validate(&self) -> Result<UpdateUser<'_>, Error> {
        fn non_blank(text: &str) -> Option<&str> {
            let text = text.trim();
            (!text.is_empty()).then_some(text)
        }

        let password = (!self.password.trim().is_empty()).then_some(self.password.as_str());
        if password.is_some_and(|password| password.chars().count() < PASSWORD_MIN_LENGTH) {
            return Err(Error::Validation(format!(
                "The password must be at least {PASSWORD_MIN_LENGTH} characters long"
            )));
        }

        Ok(UpdateUser {
            name: non_blank(&self.name),
            username: non_blank(&self.username),
            password,
        })
    }
}

fn profile_form(form: &ProfileForm, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-put=(endpoints::PROFILE_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class="w-full space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", "text", &form.username, true))
            (text_input("name", "Name", "text", &form.name, true))

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "New password" }

                input
                    type="password"
                    name="password"
                    id="password"
                    placeholder="Leave blank to keep the current password"
                    minlength=(PASSWORD_MIN_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Save profile"
            }
        }
    }
}

/// Display the profile of the signed-in user.
pub async fn get_profile_page(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let user: User = api.get_json(&session, "/api/users/me", &[]).await?;
    let form = ProfileForm {
        username: user.username.clone().unwrap_or_default(),
        name: user.name.clone().unwrap_or_default(),
        password: String::new(),
    };

    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold text-gray-900 dark:text-white" { "Profile" }

                @if let Some(created_at) = &user.created_at {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Member since " (created_at.split('T').next().unwrap_or(created_at))
                    }
                }

                (profile_form(&form, None))
            }
        }
    };

    Ok(base("Profile", &[], &content).into_response())
}

/// Update the signed-in user's name, username or password.
pub async fn update_profile_endpoint(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
        Err(Error::Validation(message)) => {
            return profile_form(&form, Some(&message)).into_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    let result = async {
        let user: User = api.get_json(&session, "/api/users/me", &[]).await?;
        let path = format!("/api/users/profile/{}", user.id);
        api.send(&session, Method::PUT, &path, &update).await
    }
    .await;

    match result {
        Ok(()) => {
            tracing::info!("Updated profile");
            Alert::SuccessSimple {
                message: "Profile saved".to_owned(),
            }
            .into_response()
        }
        Err(Error::Backend { status: 400, message }) => {
            profile_form(&form, Some(&message)).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod profile_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form, Json, Router,
        extract::State,
        http::StatusCode,
        routing::{get, put},
    };
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_status_ok, assert_valid_html, bad_request, must_get_form,
            parse_html_document, parse_html_fragment, spawn_backend, test_client, test_session,
        },
    };

    use super::{ProfileForm, get_profile_page, update_profile_endpoint};

    fn me() -> Json<Value> {
        Json(json!({
            "id": 7,
            "username": "alice",
            "name": "Alice",
            "createdAt": "2025-01-15T08:30:00",
            "updatedAt": "2025-01-15T08:30:00",
            "roles": [{"id": 1, "name": "ROLE_USER"}]
        }))
    }

    #[tokio::test]
    async fn profile_page_shows_current_values() {
        let backend = Router::new().route("/api/users/me", get(|| async { me() }));
        let api = test_client(&spawn_backend(backend).await);

        let response = get_profile_page(State(api), Extension(test_session()))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-put");
        assert_form_input_with_value(&form, "username", "text", "alice");
        assert_form_input_with_value(&form, "name", "text", "Alice");
    }

    #[tokio::test]
    async fn update_sends_only_filled_fields_to_own_profile() {
        let received = Arc::new(Mutex::new(None));
        let sink = received.clone();
        let backend = Router::new()
            .route("/api/users/me", get(|| async { me() }))
            .route(
                "/api/users/profile/7",
                put(move |Json(body): Json<Value>| {
                    let sink = sink.clone();
                    async move {
                        *sink.lock().unwrap() = Some(body);
                        me()
                    }
                }),
            );
        let api = test_client(&spawn_backend(backend).await);
        let form = ProfileForm {
            username: "alice".to_owned(),
            name: " Alice Smith ".to_owned(),
            password: String::new(),
        };

        let response =
            update_profile_endpoint(State(api), Extension(test_session()), Form(form)).await;

        assert_status_ok(&response);
        assert_eq!(
            received.lock().unwrap().clone(),
            Some(json!({"name": "Alice Smith", "username": "alice"}))
        );
    }

    #[tokio::test]
    async fn short_password_is_rejected_before_calling_backend() {
        let api = test_client(&spawn_backend(Router::new()).await);
        let form = ProfileForm {
            username: "alice".to_owned(),
            name: "Alice".to_owned(),
            password: "12345".to_owned(),
        };

        let response =
            update_profile_endpoint(State(api), Extension(test_session()), Form(form)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "The password must be at least 6 characters long");
    }

    #[test]
    fn password_is_sent_as_typed() {
        let form = ProfileForm {
            username: "alice".to_owned(),
            name: "Alice".to_owned(),
            password: " secret1 ".to_owned(),
        };

        let update = form.validate().unwrap();

        assert_eq!(update.password, Some(" secret1 "));
    }

    #[test]
    fn password_length_counts_surrounding_spaces() {
        let form = ProfileForm {
            password: "  abcd  ".to_owned(),
            ..Default::default()
        };

        assert_eq!(form.validate().unwrap().password, Some("  abcd  "));
    }

    #[test]
    fn whitespace_password_keeps_current_password() {
        let form = ProfileForm {
            password: "   ".to_owned(),
            ..Default::default()
        };

        assert_eq!(form.validate().unwrap().password, None);
    }

    #[tokio::test]
    async fn taken_username_shows_backend_message() {
        let backend = Router::new()
            .route("/api/users/me", get(|| async { me() }))
            .route(
                "/api/users/profile/7",
                put(|| async { bad_request("Username bob is already taken") }),
            );
        let api = test_client(&spawn_backend(backend).await);
        let form = ProfileForm {
            username: "bob".to_owned(),
            name: "Alice".to_owned(),
            password: String::new(),
        };

        let response =
            update_profile_endpoint(State(api), Extension(test_session()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Username bob is already taken");
    }
}
