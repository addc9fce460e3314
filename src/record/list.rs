//! The record management page: a filterable table with row selection.
//!
//! The page is one GET form. Row checkboxes re-request the page with htmx,
//! sending the current selection as hidden `selected` fields plus the change
//! (`toggle` and `checked`, or `select_all`). The server applies the change,
//! reconciles the selection against the rows it loaded and the table is
//! swapped in place.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    alert::ALERT_CONTAINER_ID,
    api::{ApiClient, Session},
    category::{Category, category_multi_select, category_select, get_categories},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base, edit_delete_action_links,
        format_currency,
    },
    navigation::NavBar,
    period::{DateRange, PeriodFilter, format_date},
    record::{
        core::{Record, RecordKind, get_records},
        selection::{SelectAllState, Selection},
    },
    timezone::local_today,
};

/// The ID of the element swapped when the selection changes.
const RECORDS_TABLE_ID: &str = "records-table";
/// The ID of the filter form that wraps the table.
const FILTER_FORM_ID: &str = "record-filter";

/// The state needed for the record management pages.
#[derive(Debug, Clone)]
pub struct RecordsState {
    pub api: ApiClient,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of the management page.
#[derive(Debug, Default, Deserialize)]
pub struct RecordListQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub categories: Vec<i64>,
    /// The selection before this request.
    #[serde(default)]
    pub selected: Vec<i64>,
    /// A row whose checkbox was clicked.
    #[serde(default)]
    pub toggle: Option<i64>,
    /// The new state of the clicked row.
    #[serde(default)]
    pub checked: Option<bool>,
    /// The new state of the header checkbox.
    #[serde(default)]
    pub select_all: Option<bool>,
}

/// The filter as shown in the form, either parsed or echoed back on error.
struct FilterValues {
    from: String,
    to: String,
    categories: Vec<i64>,
    error: Option<String>,
}

/// Display the records of `kind` for the chosen dates and categories.
pub async fn get_records_page(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Query(query): Query<RecordListQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let api = &state.api;

    let (records, categories, filter) =
        match DateRange::from_form(query.from.as_deref(), query.to.as_deref(), today) {
            Ok(range) => {
                let period = PeriodFilter::Range {
                    from: Some(range.from()),
                    to: Some(range.to()),
                };
                let (records, categories) = tokio::try_join!(
                    get_records(api, &session, kind, &period, &query.categories),
                    get_categories(api, &session, kind),
                )?;
                let filter = FilterValues {
                    from: format_date(range.from()),
                    to: format_date(range.to()),
                    categories: query.categories.clone(),
                    error: None,
                };

                (records, categories, filter)
            }
            Err(Error::Validation(message)) => {
                let categories = get_categories(api, &session, kind).await?;
                let filter = FilterValues {
                    from: query.from.clone().unwrap_or_default(),
                    to: query.to.clone().unwrap_or_default(),
                    categories: query.categories.clone(),
                    error: Some(message),
                };

                (Vec::new(), categories, filter)
            }
            Err(error) => return Err(error),
        };

    let selection = apply_selection_change(&query, &records);

    Ok(records_view(kind, &records, &categories, &filter, &selection).into_response())
}

/// Apply the checkbox change in `query` and drop IDs that are not in `records`.
fn apply_selection_change(query: &RecordListQuery, records: &[Record]) -> Selection {
    let ids: Vec<i64> = records.iter().map(|record| record.id).collect();
    let mut selection = Selection::new(query.selected.iter().copied());

    if let Some(id) = query.toggle {
        selection.toggle(id, query.checked.unwrap_or(true));
    }

    if let Some(checked) = query.select_all {
        selection.select_all(&ids, checked);
    }

    selection.reconcile(&ids);
    selection
}

fn records_view(
    kind: RecordKind,
    records: &[Record],
    categories: &[Category],
    filter: &FilterValues,
    selection: &Selection,
) -> Markup {
    let nav_bar = NavBar::new(kind.view()).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex w-full justify-between items-center mb-4"
            {
                h1 class="text-2xl font-bold text-gray-900 dark:text-white" { (kind.title()) }

                a href=(kind.new_view()) class=(LINK_STYLE) { "Add " (kind.title().to_lowercase()) }
            }

            form
                id=(FILTER_FORM_ID)
                method="get"
                action=(kind.view())
                hx-target-error={ "#" (ALERT_CONTAINER_ID) }
                class="w-full space-y-4"
            {
                (filter_fields(filter, categories))
                (records_table(kind, records, categories, selection))
            }
        }
    };

    base(kind.title(), &[], &content)
}

fn filter_fields(filter: &FilterValues, categories: &[Category]) -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-4 gap-4 items-end"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input id="from" type="date" name="from" value=(filter.from) class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input id="to" type="date" name="to" value=(filter.to) class=(FORM_TEXT_INPUT_STYLE);
            }

            (category_multi_select("categories", "Categories", categories, &filter.categories))

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply filter" }
        }

        @if let Some(error) = &filter.error {
            p class="text-red-500 text-base" { (error) }
        }
    }
}

fn records_table(
    kind: RecordKind,
    records: &[Record],
    categories: &[Category],
    selection: &Selection,
) -> Markup {
    let select_all_state = selection.select_all_state(records.len());
    let select_all_vals =
        json!({ "select_all": select_all_state != SelectAllState::Checked }).to_string();
    let disabled = !selection.has_selection();

    html! {
        div id=(RECORDS_TABLE_ID) class="w-full space-y-4"
        {
            @for id in selection.ids() {
                input type="hidden" name="selected" value=(id);
            }

            div class="flex flex-wrap items-center gap-4"
            {
                span class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (selection.len()) " selected"
                }

                button
                    type="button"
                    id="bulk-delete"
                    hx-post=(kind.bulk_delete_endpoint())
                    hx-confirm="Delete the selected records?"
                    disabled[disabled]
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete selected"
                }

                div class="w-48" { (category_select("bulk_category_id", categories, None, false)) }

                button
                    type="button"
                    id="bulk-category"
                    hx-put=(kind.bulk_category_endpoint())
                    disabled[disabled]
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Change category"
                }
            }

            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE)
                        {
                            input
                                type="checkbox"
                                id="select-all"
                                aria-label="Select all"
                                checked[select_all_state == SelectAllState::Checked]
                                data-indeterminate=[(select_all_state == SelectAllState::Indeterminate).then_some("true")]
                                hx-get=(kind.view())
                                hx-include={ "#" (FILTER_FORM_ID) }
                                hx-vals=(select_all_vals)
                                hx-select={ "#" (RECORDS_TABLE_ID) }
                                hx-target={ "#" (RECORDS_TABLE_ID) }
                                hx-swap="outerHTML"
                                class=(FORM_CHECKBOX_STYLE);
                        }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for record in records {
                        (record_row(kind, record, selection.is_selected(record.id)))
                    }

                    @if records.is_empty() {
                        tr
                        {
                            td colspan="6" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No " (kind.title().to_lowercase()) " for the selected period"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn record_row(kind: RecordKind, record: &Record, is_selected: bool) -> Markup {
    let toggle_vals = json!({ "toggle": record.id, "checked": !is_selected }).to_string();

    html! {
        tr class=(TABLE_ROW_STYLE) data-record-id=(record.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                input
                    type="checkbox"
                    aria-label={ "Select " (record.title) }
                    checked[is_selected]
                    hx-get=(kind.view())
                    hx-include={ "#" (FILTER_FORM_ID) }
                    hx-vals=(toggle_vals)
                    hx-select={ "#" (RECORDS_TABLE_ID) }
                    hx-target={ "#" (RECORDS_TABLE_ID) }
                    hx-swap="outerHTML"
                    class=(FORM_CHECKBOX_STYLE);
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="font-semibold" { (record.title) }

                @if let Some(description) = &record.description {
                    div class="text-xs text-gray-500 dark:text-gray-400" { (description) }
                }
            }

            td class=(TABLE_CELL_STYLE) { (record.category_label()) }
            td class=(TABLE_CELL_STYLE) { (record.date_label()) }
            td class={ (TABLE_CELL_STYLE) " text-right " (kind.amount_style()) }
            {
                (format_currency(record.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &kind.edit_view(record.id),
                        &kind.record_endpoint(record.id),
                        &format!("Are you sure you want to delete '{}'?", record.title),
                    ))
                }
            }
        }
    }
}
