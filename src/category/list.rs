//! The categories page and the endpoint for creating categories.

use axum::{
    Extension, Form,
    extract::State,
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
    category::core::{
        Category, CategoryForm, category_url, create_category_url, edit_category_url,
        get_categories,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    record::RecordKind,
};

/// Display the expense and income categories side by side.
pub async fn get_categories_page(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let (expense_categories, income_categories) = tokio::try_join!(
        get_categories(&api, &session, RecordKind::Expense),
        get_categories(&api, &session, RecordKind::Income),
    )?;

    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold text-gray-900 dark:text-white mb-4" { "Categories" }

            div class="grid grid-cols-1 lg:grid-cols-2 gap-6 w-full"
            {
                (category_section(RecordKind::Expense, &expense_categories))
                (category_section(RecordKind::Income, &income_categories))
            }
        }
    };

    Ok(base("Categories", &[], &content).into_response())
}

fn category_section(kind: RecordKind, categories: &[Category]) -> Markup {
    let heading = match kind {
        RecordKind::Expense => "Expense categories",
        RecordKind::Income => "Income categories",
    };

    html! {
        section id={ (kind.noun()) "-categories" } class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold text-gray-900 dark:text-white mb-3" { (heading) }

            (create_category_form(kind, &CategoryForm::default(), None))

            @if categories.is_empty() {
                p class="mt-4 text-gray-500 dark:text-gray-400" { "No categories yet." }
            } @else {
                table class={ "mt-4 " (TABLE_STYLE) }
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for category in categories {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (category.name) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (category.description.as_deref().unwrap_or(""))
                                }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    div class="flex gap-4"
                                    {
                                        (edit_delete_action_links(
                                            &edit_category_url(kind, category.id),
                                            &category_url(kind, category.id),
                                            &format!(
                                                "Are you sure you want to delete '{}'?",
                                                category.name
                                            ),
                                        ))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn create_category_form(kind: RecordKind, form: &CategoryForm, error_message: Option<&str>) -> Markup {
    let name_id = format!("{}-category-name", kind.noun());
    let description_id = format!("{}-category-description", kind.noun());

    html! {
        form
            hx-post=(create_category_url(kind))
            hx-swap="outerHTML"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class="space-y-3"
        {
            div
            {
                label for=(name_id) class=(FORM_LABEL_STYLE) { "Name" }
                input
                    id=(name_id)
                    type="text"
                    name="name"
                    value=(form.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for=(description_id) class=(FORM_LABEL_STYLE) { "Description" }
                input
                    id=(description_id)
                    type="text"
                    name="description"
                    value=(form.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add category" }
        }
    }
}

/// Create a category of `kind` and reload the categories page.
pub async fn create_category_endpoint(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let request = match form.validate() {
        Ok(request) => request,
        Err(Error::Validation(message)) => {
            return create_category_form(kind, &form, Some(&message)).into_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    let result: Result<Category, Error> = api
        .send_json(&session, Method::POST, kind.category_api_path(), &request)
        .await;

    match result {
        Ok(category) => {
            tracing::info!("Created {kind} category {}", category.id);
            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::Backend {
            status: 400,
            message,
        }) => create_category_form(kind, &form, Some(&message)).into_response(),
        Err(error) => error.into_alert_response(),
    }
}
