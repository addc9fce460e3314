//! The statuses page and the endpoints for managing statuses.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_htmx::{HxRedirect, HxRefresh};
use maud::{Markup, html};

use crate::{
    Error,
    alert::ALERT_CONTAINER_ID,
    api::{ApiClient, Session},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base,
    },
    navigation::NavBar,
    status::core::{
        Direction, Status, StatusForm, StatusOrder, create_status, delete_status, get_statuses,
        rename_status,
    },
};

/// Display the statuses in the saved order.
pub async fn get_statuses_page(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<Response, Error> {
    let statuses = StatusOrder::from_cookies(&jar).apply(get_statuses(&api, &session).await?);

    let nav_bar = NavBar::new(endpoints::STATUSES_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold text-gray-900 dark:text-white mb-4" { "Statuses" }

            section class={ "w-full max-w-2xl " (CARD_STYLE) }
            {
                (create_status_form(&StatusForm::default(), None))
                (statuses_table(&statuses))
            }
        }
    };

    Ok(base("Statuses", &[], &content).into_response())
}

fn create_status_form(form: &StatusForm, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_STATUS)
            hx-swap="outerHTML"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class="space-y-3"
        {
            div
            {
                label for="status-name" class=(FORM_LABEL_STYLE) { "Name" }
                input
                    id="status-name"
                    type="text"
                    name="name"
                    value=(form.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add status" }
        }
    }
}

fn statuses_table(statuses: &[Status]) -> Markup {
    let last_index = statuses.len().saturating_sub(1);

    html! {
        @if statuses.is_empty() {
            p class="mt-4 text-gray-500 dark:text-gray-400" { "No statuses yet." }
        } @else {
            table id="statuses" class={ "mt-4 " (TABLE_STYLE) }
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Order" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for (index, status) in statuses.iter().enumerate() {
                        tr class=(TABLE_ROW_STYLE) data-status-id=(status.id)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                form
                                    hx-put=(format_endpoint(endpoints::STATUS, status.id))
                                    hx-target-error={ "#" (ALERT_CONTAINER_ID) }
                                    class="flex gap-2"
                                {
                                    input
                                        type="text"
                                        name="name"
                                        value=(status.name)
                                        aria-label="Status name"
                                        required
                                        class=(FORM_TEXT_INPUT_STYLE);

                                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Rename" }
                                }
                            }

                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex gap-2"
                                {
                                    button
                                        type="button"
                                        hx-post=(format_endpoint(endpoints::MOVE_STATUS_UP, status.id))
                                        hx-target-error={ "#" (ALERT_CONTAINER_ID) }
                                        disabled[index == 0]
                                        aria-label="Move up"
                                        class=(BUTTON_SECONDARY_STYLE)
                                    {
                                        "↑"
                                    }

                                    button
                                        type="button"
                                        hx-post=(format_endpoint(endpoints::MOVE_STATUS_DOWN, status.id))
                                        hx-target-error={ "#" (ALERT_CONTAINER_ID) }
                                        disabled[index == last_index]
                                        aria-label="Move down"
                                        class=(BUTTON_SECONDARY_STYLE)
                                    {
                                        "↓"
                                    }
                                }
                            }

                            td class=(TABLE_CELL_STYLE)
                            {
                                button
                                    type="button"
                                    hx-delete=(format_endpoint(endpoints::STATUS, status.id))
                                    hx-confirm={ "Are you sure you want to delete '" (status.name) "'?" }
                                    hx-target-error={ "#" (ALERT_CONTAINER_ID) }
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn reload_statuses_page() -> Response {
    (
        HxRedirect(endpoints::STATUSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

pub async fn create_status_endpoint(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Form(form): Form<StatusForm>,
) -> Response {
    let request = match form.validate() {
        Ok(request) => request,
        Err(Error::Validation(message)) => {
            return create_status_form(&form, Some(&message)).into_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    match create_status(&api, &session, &request).await {
        Ok(status) => {
            tracing::info!("Created status {}", status.id);
            reload_statuses_page()
        }
        Err(Error::Backend {
            status: 400,
            message,
        }) => create_status_form(&form, Some(&message)).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

pub async fn rename_status_endpoint(
    Path(status_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Form(form): Form<StatusForm>,
) -> Response {
    let result = match form.validate() {
        Ok(request) => rename_status(&api, &session, status_id, &request).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(_) => {
            tracing::info!("Renamed status {status_id}");
            reload_statuses_page()
        }
        Err(error) => error.into_alert_response(),
    }
}

pub async fn delete_status_endpoint(
    Path(status_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
) -> Response {
    match delete_status(&api, &session, status_id).await {
        Ok(()) => {
            tracing::info!("Deleted status {status_id}");
            (HxRefresh(true), ()).into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete status {status_id}: {error}");
            error.into_alert_response()
        }
    }
}

pub async fn move_status_up_endpoint(
    Path(status_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Response {
    move_status(&api, &session, jar, status_id, Direction::Up).await
}

pub async fn move_status_down_endpoint(
    Path(status_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Response {
    move_status(&api, &session, jar, status_id, Direction::Down).await
}

async fn move_status(
    api: &ApiClient,
    session: &Session,
    jar: CookieJar,
    status_id: i64,
    direction: Direction,
) -> Response {
    let statuses = match get_statuses(api, session).await {
        Ok(statuses) => StatusOrder::from_cookies(&jar).apply(statuses),
        Err(error) => return error.into_alert_response(),
    };

    match StatusOrder::moved(&statuses, status_id, direction) {
        Ok(order) => (order.save(jar), HxRefresh(true), ()).into_response(),
        Err(error) => error.into_alert_response(),
    }
}
