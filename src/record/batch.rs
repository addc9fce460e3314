//! The page for entering several records at once.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, Query};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use reqwest::Method;
use serde::Deserialize;

use crate::{
    Error,
    alert::ALERT_CONTAINER_ID,
    api::{ApiClient, Session},
    category::{Category, category_select, get_categories},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base,
    },
    navigation::NavBar,
    period::{Month, parse_optional_month},
    record::{
        core::{BatchRequest, RecordKind},
        form::RecordForm,
        list::RecordsState,
    },
    timezone::local_today,
};

/// The number of empty rows on a fresh page.
const DEFAULT_ROW_COUNT: usize = 5;
const BATCH_ROWS_ID: &str = "batch-rows";

#[derive(Debug, Default, Deserialize)]
pub struct NewRecordsQuery {
    /// Return a single empty row instead of the whole page.
    #[serde(default)]
    pub row: bool,
}

/// The batch form. Each field holds one value per row, in row order.
#[derive(Debug, Default, Deserialize)]
pub struct BatchForm {
    #[serde(default)]
    pub default_period: String,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub amount: Vec<String>,
    #[serde(default)]
    pub category_id: Vec<String>,
    #[serde(default)]
    pub date: Vec<String>,
    #[serde(default)]
    pub period: Vec<String>,
}

impl BatchForm {
    /// Split the columns back into rows. Missing trailing values are empty.
    fn rows(&self) -> Vec<RecordForm> {
        let row_count = [
            self.title.len(),
            self.description.len(),
            self.amount.len(),
            self.category_id.len(),
            self.date.len(),
            self.period.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or_default();

        let cell = |column: &[String], index: usize| column.get(index).cloned().unwrap_or_default();

        (0..row_count)
            .map(|index| RecordForm {
                title: cell(&self.title, index),
                description: cell(&self.description, index),
                amount: cell(&self.amount, index),
                category_id: cell(&self.category_id, index),
                date: cell(&self.date, index),
                period: cell(&self.period, index),
            })
            .collect()
    }

    /// Validate every non-blank row.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] naming the first invalid row, or if every row is blank.
    fn validate(&self, kind: RecordKind) -> Result<BatchRequest, Error> {
        let default_period = parse_optional_month(Some(&self.default_period))?;

        let records = self
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_blank())
            .map(|(index, row)| {
                row.validate(kind, default_period).map_err(|error| match error {
                    Error::Validation(message) => {
                        Error::Validation(format!("Row {}: {message}", index + 1))
                    }
                    error => error,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if records.is_empty() {
            return Err(Error::Validation("Add at least one record".to_owned()));
        }

        Ok(BatchRequest {
            kind,
            default_period,
            records,
        })
    }
}

/// Render the batch entry page, or a single empty row when `row=true`.
pub async fn get_new_records_page(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Query(query): Query<NewRecordsQuery>,
) -> Result<Response, Error> {
    let categories = get_categories(&state.api, &session, kind).await?;

    if query.row {
        return Ok(batch_row(&RecordForm::default(), &categories).into_response());
    }

    let today = local_today(&state.local_timezone)?;
    let form = BatchForm {
        default_period: Month::of(today).to_string(),
        ..Default::default()
    };
    let rows = vec![RecordForm::default(); DEFAULT_ROW_COUNT];

    let nav_bar = NavBar::new(kind.view()).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold text-gray-900 dark:text-white mb-4"
            {
                "New " (kind.title().to_lowercase())
            }

            (batch_form(kind, &form.default_period, &rows, &categories, None))
        }
    };

    Ok(base(&format!("New {}", kind.title().to_lowercase()), &[], &content).into_response())
}

fn batch_form(
    kind: RecordKind,
    default_period: &str,
    rows: &[RecordForm],
    categories: &[Category],
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(kind.batch_endpoint())
            hx-swap="outerHTML"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class="w-full space-y-4"
        {
            div class="max-w-xs"
            {
                label for="default_period" class=(FORM_LABEL_STYLE) { "Default month" }
                input
                    id="default_period"
                    type="month"
                    name="default_period"
                    value=(default_period)
                    class=(FORM_TEXT_INPUT_STYLE);
                p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    "Used for rows without a date or month."
                }
            }

            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                    }
                }

                tbody id=(BATCH_ROWS_ID)
                {
                    @for row in rows {
                        (batch_row(row, categories))
                    }
                }
            }

            button
                type="button"
                hx-get={ (kind.new_view()) "?row=true" }
                hx-target={ "#" (BATCH_ROWS_ID) }
                hx-swap="beforeend"
                class=(BUTTON_SECONDARY_STYLE)
            {
                "Add row"
            }

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save " (kind.title().to_lowercase()) }
        }
    }
}

fn batch_row(row: &RecordForm, categories: &[Category]) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class="px-2 py-2"
            {
                input type="text" name="title" value=(row.title) aria-label="Title"
                    class=(FORM_TEXT_INPUT_STYLE);
            }
            td class="px-2 py-2"
            {
                input type="text" name="description" value=(row.description)
                    aria-label="Description" class=(FORM_TEXT_INPUT_STYLE);
            }
            td class="px-2 py-2"
            {
                input type="text" inputmode="decimal" name="amount" value=(row.amount)
                    aria-label="Amount" class=(FORM_TEXT_INPUT_STYLE);
            }
            td class="px-2 py-2"
            {
                (category_select("category_id", categories, row.category_id.parse().ok(), false))
            }
            td class="px-2 py-2"
            {
                input type="date" name="date" value=(row.date) aria-label="Date"
                    class=(FORM_TEXT_INPUT_STYLE);
            }
            td class="px-2 py-2"
            {
                input type="month" name="period" value=(row.period) aria-label="Month"
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}

/// Create every filled-in row of the batch form.
pub async fn create_batch_endpoint(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Form(form): Form<BatchForm>,
) -> Response {
    let request = match form.validate(kind) {
        Ok(request) => request,
        Err(Error::Validation(message)) => {
            return render_form_with_error(&api, &session, kind, &form, &message).await;
        }
        Err(error) => return error.into_alert_response(),
    };

    match api
        .send(&session, Method::POST, &format!("{}/batch", kind.api_path()), &request)
        .await
    {
        Ok(()) => {
            tracing::info!("Created {} {kind} records", request.records.len());
            (HxRedirect(kind.view().to_owned()), StatusCode::SEE_OTHER).into_response()
        }
        Err(Error::Backend {
            status: 400,
            message,
        }) => render_form_with_error(&api, &session, kind, &form, &message).await,
        Err(error) => {
            tracing::error!("Could not create {kind} records: {error}");
            error.into_alert_response()
        }
    }
}

async fn render_form_with_error(
    api: &ApiClient,
    session: &Session,
    kind: RecordKind,
    form: &BatchForm,
    message: &str,
) -> Response {
    match get_categories(api, session, kind).await {
        Ok(categories) => batch_form(
            kind,
            &form.default_period,
            &form.rows(),
            &categories,
            Some(message),
        )
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
