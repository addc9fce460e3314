//! The registration page for creating an account on the backend.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{AuthState, cookie::set_auth_cookies},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        loading_spinner, log_in_register, password_input, text_input,
    },
    user::{PASSWORD_MIN_LENGTH, User},
};

pub fn confirm_password_input(min_length: usize, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// Which field an error message belongs under.
enum FormError<'a> {
    None,
    Form(&'a str),
    Password(&'a str),
    ConfirmPassword(&'a str),
}

fn registration_form(form: &RegisterForm, error: FormError<'_>) -> Markup {
    let (form_error, password_error, confirm_password_error) = match error {
        FormError::None => (None, None, None),
        FormError::Form(message) => (Some(message), None, None),
        FormError::Password(message) => (None, Some(message), None),
        FormError::ConfirmPassword(message) => (None, None, Some(message)),
    };

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", "text", &form.username, true))
            (text_input("name", "Name", "text", &form.name, true))
            (password_input(&form.password, PASSWORD_MIN_LENGTH as u8, password_error))
            (confirm_password_input(PASSWORD_MIN_LENGTH, confirm_password_error))

            @if let Some(message) = form_error
            {
                p class="text-red-500 text-base" { (message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(&RegisterForm::default(), FormError::None);
    let content = log_in_register("Create an account", &registration_form);

    base("Register", &[], &content).into_response()
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create the account on the backend and log the new user in.
pub async fn register_user(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let username = user_data.username.trim();
    let name = user_data.name.trim();

    if username.is_empty() || name.is_empty() {
        return registration_form(
            &user_data,
            FormError::Form("Enter a username and your name"),
        )
        .into_response();
    }

    if user_data.password.chars().count() < PASSWORD_MIN_LENGTH {
        let message = format!("The password must be at least {PASSWORD_MIN_LENGTH} characters long");
        return registration_form(&user_data, FormError::Password(&message)).into_response();
    }

    if user_data.password != user_data.confirm_password {
        return registration_form(&user_data, FormError::ConfirmPassword("Passwords do not match"))
            .into_response();
    }

    let user = match state
        .api
        .register::<User>(username, name, &user_data.password)
        .await
    {
        Ok(user) => user,
        Err(Error::Backend { status: 400, message }) => {
            return registration_form(&user_data, FormError::Form(&message)).into_response();
        }
        Err(error) => {
            tracing::error!("Could not register user {username}: {error}");
            return registration_form(
                &user_data,
                FormError::Form("An internal error occurred. Please try again later."),
            )
            .into_response();
        }
    };

    tracing::info!("Registered user {} ({username})", user.id);

    match state.api.log_in(username, &user_data.password).await {
        Ok(tokens) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            set_auth_cookies(jar, &tokens, state.cookie_duration),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not log in newly registered user {username}: {error}");
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                (),
            )
                .into_response()
        }
    }
}
