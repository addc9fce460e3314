//! Category editing page and endpoint.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use reqwest::Method;

use crate::{
    Error,
    alert::ALERT_CONTAINER_ID,
    api::{ApiClient, Session},
    category::core::{Category, CategoryForm, category_url, edit_category_url, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    record::RecordKind,
};

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
) -> Result<Response, Error> {
    let category = get_categories(&api, &session, kind)
        .await?
        .into_iter()
        .find(|category| category.id == category_id)
        .ok_or(Error::NotFound)?;

    let form = CategoryForm {
        name: category.name,
        description: category.description.unwrap_or_default(),
    };

    let nav_bar = NavBar::new(&edit_category_url(kind, category_id)).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold text-gray-900 dark:text-white"
                {
                    "Edit " (kind.noun()) " category"
                }

                (edit_category_form(kind, category_id, &form, None))
            }
        }
    };

    Ok(base("Edit Category", &[], &content).into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let request = match form.validate() {
        Ok(request) => request,
        Err(Error::Validation(message)) => {
            return edit_category_form(kind, category_id, &form, Some(&message)).into_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    let path = format!("{}/{category_id}", kind.category_api_path());
    let result: Result<Category, Error> =
        api.send_json(&session, Method::PUT, &path, &request).await;

    match result {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::Backend {
            status: 400,
            message,
        }) => edit_category_form(kind, category_id, &form, Some(&message)).into_response(),
        Err(error) => {
            tracing::error!("Could not update {kind} category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_category_form(
    kind: RecordKind,
    category_id: i64,
    form: &CategoryForm,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-put=(category_url(kind, category_id))
            hx-swap="outerHTML"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(form.name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    value=(form.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update category" }
        }
    }
}

#[cfg(test)]
mod edit_category_tests {
    use axum::{
        Extension, Form, Json, Router,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, put},
    };
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        record::RecordKind,
        test_utils::{
            Recorder, assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, bad_request, must_get_form, parse_html_document,
            parse_html_fragment, spawn_backend, test_client, test_session,
        },
    };

    use super::{CategoryForm, get_edit_category_page, update_category_endpoint};

    fn list_route(router: Router) -> Router {
        router.route(
            "/api/income-categories",
            get(|| async { Json(json!([{"id": 4, "name": "Salary", "description": "Main job"}])) }),
        )
    }

    #[tokio::test]
    async fn edit_page_prefills_form() {
        let api = test_client(&spawn_backend(list_route(Router::new())).await);

        let response = get_edit_category_page(
            Path(4),
            State(api),
            Extension(test_session()),
            Extension(RecordKind::Income),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, "/api/income-categories/4", "hx-put");
        assert_form_input_with_value(&form, "name", "text", "Salary");
        assert_form_input_with_value(&form, "description", "text", "Main job");
    }

    #[tokio::test]
    async fn edit_page_for_unknown_category_is_not_found() {
        let api = test_client(&spawn_backend(list_route(Router::new())).await);

        let response = get_edit_category_page(
            Path(99),
            State(api),
            Extension(test_session()),
            Extension(RecordKind::Income),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_puts_category_and_redirects() {
        let received = Recorder::default();
        let sink = received.clone();
        let backend = Router::new().route(
            "/api/expense-categories/3",
            put(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.record(body);
                    Json(json!({"id": 3, "name": "Groceries", "description": null}))
                }
            }),
        );
        let api = test_client(&spawn_backend(backend).await);
        let form = CategoryForm {
            name: "Groceries".to_owned(),
            description: String::new(),
        };

        let response = update_category_endpoint(
            Path(3),
            State(api),
            Extension(test_session()),
            Extension(RecordKind::Expense),
            Form(form),
        )
        .await;

        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        assert_eq!(
            received.last(),
            Some(json!({"name": "Groceries", "description": null}))
        );
    }

    #[tokio::test]
    async fn duplicate_name_shows_backend_message() {
        let backend = Router::new().route(
            "/api/expense-categories/3",
            put(|| async { bad_request("Category Food already exists") }),
        );
        let api = test_client(&spawn_backend(backend).await);
        let form = CategoryForm {
            name: "Food".to_owned(),
            description: String::new(),
        };

        let response = update_category_endpoint(
            Path(3),
            State(api),
            Extension(test_session()),
            Extension(RecordKind::Expense),
            Form(form),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Category Food already exists");
    }
}
