//! Editing and deleting a single record.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxRedirect, HxRefresh};
use maud::{Markup, html};
use reqwest::Method;

use crate::{
    Error,
    alert::ALERT_CONTAINER_ID,
    api::{ApiClient, Session},
    category::{Category, category_select, get_categories},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    record::{
        core::{Record, RecordKind, get_record},
        form::RecordForm,
    },
};

/// Render the page for editing one record.
pub async fn get_edit_record_page(
    Path(record_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
) -> Result<Response, Error> {
    let (record, categories) = tokio::try_join!(
        get_record(&api, &session, kind, record_id),
        get_categories(&api, &session, kind),
    )?;

    let form = RecordForm::from_record(&record);
    let nav_bar = NavBar::new(kind.view()).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold text-gray-900 dark:text-white"
                {
                    "Edit " (kind.noun())
                }

                (edit_record_form(kind, record_id, &form, &categories, None))
            }
        }
    };

    Ok(base(&format!("Edit {}", kind.noun()), &[], &content).into_response())
}

fn edit_record_form(
    kind: RecordKind,
    record_id: i64,
    form: &RecordForm,
    categories: &[Category],
    error_message: Option<&str>,
) -> Markup {
    let selected_category = form.category_id.parse().ok();

    html! {
        form
            hx-put=(kind.record_endpoint(record_id))
            hx-swap="outerHTML"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "Title" }
                input id="title" type="text" name="title" value=(form.title) required autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                input id="description" type="text" name="description" value=(form.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input id="amount" type="text" inputmode="decimal" name="amount" value=(form.amount)
                    required class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }
                (category_select("category_id", categories, selected_category, true))
            }

            div class="grid grid-cols-2 gap-4"
            {
                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                    input id="date" type="date" name="date" value=(form.date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="period" class=(FORM_LABEL_STYLE) { "Month" }
                    input id="period" type="month" name="period" value=(form.period)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save " (kind.noun()) }
        }
    }
}

/// Replace a record with the submitted fields.
pub async fn update_record_endpoint(
    Path(record_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Form(form): Form<RecordForm>,
) -> Response {
    let payload = match form.validate(kind, None) {
        Ok(payload) => payload,
        Err(Error::Validation(message)) => {
            return render_form_with_error(&api, &session, kind, record_id, &form, &message).await;
        }
        Err(error) => return error.into_alert_response(),
    };

    let path = format!("{}/{record_id}", kind.api_path());
    let result: Result<Record, Error> = api.send_json(&session, Method::PUT, &path, &payload).await;

    match result {
        Ok(_) => (HxRedirect(kind.view().to_owned()), StatusCode::SEE_OTHER).into_response(),
        Err(Error::Backend {
            status: 400,
            message,
        }) => render_form_with_error(&api, &session, kind, record_id, &form, &message).await,
        Err(error) => {
            tracing::error!("Could not update {kind} {record_id}: {error}");
            error.into_alert_response()
        }
    }
}

async fn render_form_with_error(
    api: &ApiClient,
    session: &Session,
    kind: RecordKind,
    record_id: i64,
    form: &RecordForm,
    message: &str,
) -> Response {
    match get_categories(api, session, kind).await {
        Ok(categories) => {
            edit_record_form(kind, record_id, form, &categories, Some(message)).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Delete a record and refresh the page.
pub async fn delete_record_endpoint(
    Path(record_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
) -> Response {
    let path = format!("{}/{record_id}", kind.api_path());

    match api.delete(&session, &path).await {
        Ok(()) => {
            tracing::info!("Deleted {kind} {record_id}");
            (HxRefresh(true), ()).into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete {kind} {record_id}: {error}");
            error.into_alert_response()
        }
    }
}
