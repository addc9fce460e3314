//! The expense details section: totals per category and the matching expenses.

use maud::{Markup, html};

use crate::{
    Error,
    api::{ApiClient, Session},
    category::{Category, category_multi_select},
    dashboard::core::{Summary, get_expense_summary},
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, format_currency,
        format_optional_currency,
    },
    period::{DateRange, PeriodFilter, format_date},
    record::{Record, RecordKind, get_records},
};

pub(super) const DETAILS_ID: &str = "expense-details";

/// The expense summary and the expenses for the details filter.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ExpenseDetails {
    pub summary: Summary,
    pub expenses: Vec<Record>,
}

/// The details filter as shown in the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct DetailsFilter {
    pub from: String,
    pub to: String,
    pub categories: Vec<i64>,
    pub error: Option<String>,
}

/// Fetch the summary and the expense list concurrently.
pub(super) async fn get_expense_details(
    api: &ApiClient,
    session: &Session,
    range: DateRange,
    category_ids: &[i64],
) -> Result<ExpenseDetails, Error> {
    let period = PeriodFilter::Range {
        from: Some(range.from()),
        to: Some(range.to()),
    };

    let (summary, expenses) = tokio::try_join!(
        get_expense_summary(api, session, range, category_ids),
        get_records(api, session, RecordKind::Expense, &period, category_ids),
    )?;

    Ok(ExpenseDetails { summary, expenses })
}

impl DetailsFilter {
    pub(super) fn from_range(range: DateRange, categories: Vec<i64>) -> Self {
        Self {
            from: format_date(range.from()),
            to: format_date(range.to()),
            categories,
            error: None,
        }
    }
}

/// The details section. It reloads itself with htmx and keeps the dashboard filter.
pub(super) fn details_view(
    filter: &DetailsFilter,
    details: Option<&ExpenseDetails>,
    categories: &[Category],
    dashboard_filter_id: &str,
) -> Markup {
    html! {
        section id=(DETAILS_ID) class={ "w-full mb-8 " (CARD_STYLE) }
        {
            h2 class="text-xl font-semibold mb-4" { "Expense details" }

            form
                method="get"
                action=(endpoints::DASHBOARD_VIEW)
                hx-get=(endpoints::DASHBOARD_VIEW)
                hx-include={ "#" (dashboard_filter_id) }
                hx-select={ "#" (DETAILS_ID) }
                hx-target={ "#" (DETAILS_ID) }
                hx-swap="outerHTML"
                hx-push-url="true"
                class="grid grid-cols-1 md:grid-cols-4 gap-4 items-end mb-4"
            {
                div
                {
                    label for="details_from" class=(FORM_LABEL_STYLE) { "From" }
                    input id="details_from" type="date" name="details_from" value=(filter.from)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="details_to" class=(FORM_LABEL_STYLE) { "To" }
                    input id="details_to" type="date" name="details_to" value=(filter.to)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (category_multi_select("details_categories", "Categories", categories, &filter.categories))

                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show details" }
            }

            @if let Some(error) = &filter.error {
                p class="text-red-500 text-base" { (error) }
            }

            @if let Some(details) = details {
                p id="details-total" class="mb-4 text-lg"
                {
                    "Total: "
                    span class="font-semibold" { (format_optional_currency(details.summary.total_amount)) }
                }

                (category_totals_table(&details.summary))
                (expenses_table(&details.expenses))
            }
        }
    }
}

fn category_totals_table(summary: &Summary) -> Markup {
    html! {
        table id="details-categories" class={ "mb-6 " (TABLE_STYLE) }
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Total" }
                    th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Share" }
                }
            }

            tbody
            {
                @for total in &summary.totals_by_category {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (total.label()) }
                        td class={ (TABLE_CELL_STYLE) " text-right" } { (format_currency(total.total_amount)) }
                        td class={ (TABLE_CELL_STYLE) " text-right" }
                        {
                            @match total.percentage {
                                Some(percentage) => { (format!("{percentage:.1}%")) }
                                None => { "—" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn expenses_table(expenses: &[Record]) -> Markup {
    html! {
        table id="details-expenses" class=(TABLE_STYLE)
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                }
            }

            tbody
            {
                @for expense in expenses {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (expense.date_label()) }
                        td class=(TABLE_CELL_STYLE) { (expense.title) }
                        td class=(TABLE_CELL_STYLE) { (expense.category_label()) }
                        td class={ (TABLE_CELL_STYLE) " text-right" } { (format_currency(expense.amount)) }
                    }
                }

                @if expenses.is_empty() {
                    tr
                    {
                        td colspan="4" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                        {
                            "No expenses for the selected period"
                        }
                    }
                }
            }
        }
    }
}
