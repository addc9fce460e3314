//! HTTP handlers for the dashboard page.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    api::{ApiClient, Session},
    category::{Category, category_multi_select, get_categories},
    dashboard::{
        cards::summary_cards,
        charts::{ECHARTS_SCRIPT, charts_script, charts_view, dashboard_charts},
        core::{CategoryFilter, FinanceDashboard, get_dashboard},
        details::{DetailsFilter, ExpenseDetails, details_view, get_expense_details},
    },
    endpoints,
    html::{BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, base},
    navigation::NavBar,
    period::{DateRange, Month, PeriodFilter},
    record::RecordKind,
    timezone::local_today,
};

const FILTER_FORM_ID: &str = "dashboard-filter";

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub api: ApiClient,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The dashboard filter and the expense details filter.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub expense_categories: Vec<i64>,
    #[serde(default)]
    pub income_categories: Vec<i64>,
    #[serde(default)]
    pub details_from: Option<String>,
    #[serde(default)]
    pub details_to: Option<String>,
    #[serde(default)]
    pub details_categories: Vec<i64>,
}

/// The dashboard filter as shown in the form.
struct FilterValues<'a> {
    query: &'a DashboardQuery,
    error: Option<String>,
}

/// Display the dashboard: summary cards, charts and the expense details.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
    Query(mut query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let api = &state.api;

    if query.month.is_none() && query.from.is_none() && query.to.is_none() {
        query.month = Some(Month::of(today).to_string());
    }

    let period = validation_message(PeriodFilter::from_form(
        query.month.as_deref(),
        query.from.as_deref(),
        query.to.as_deref(),
    ))?;
    let details_range = validation_message(DateRange::from_form(
        query.details_from.as_deref(),
        query.details_to.as_deref(),
        today,
    ))?;

    let category_filter = CategoryFilter {
        expense: query.expense_categories.clone(),
        income: query.income_categories.clone(),
    };

    let dashboard = async {
        match &period {
            Ok(period) => get_dashboard(api, &session, period, &category_filter)
                .await
                .map(Some),
            Err(_) => Ok::<_, Error>(None),
        }
    };
    let details = async {
        match &details_range {
            Ok(range) => get_expense_details(api, &session, *range, &query.details_categories)
                .await
                .map(Some),
            Err(_) => Ok::<_, Error>(None),
        }
    };

    let (dashboard, details, expense_categories, income_categories) = tokio::try_join!(
        dashboard,
        details,
        get_categories(api, &session, RecordKind::Expense),
        get_categories(api, &session, RecordKind::Income),
    )?;

    let details_filter = match &details_range {
        Ok(range) => DetailsFilter::from_range(*range, query.details_categories.clone()),
        Err(message) => DetailsFilter {
            from: query.details_from.clone().unwrap_or_default(),
            to: query.details_to.clone().unwrap_or_default(),
            categories: query.details_categories.clone(),
            error: Some(message.clone()),
        },
    };
    let filter = FilterValues {
        query: &query,
        error: period.err(),
    };

    Ok(dashboard_view(
        &filter,
        &dashboard.unwrap_or_default(),
        &details_filter,
        details.as_ref(),
        &expense_categories,
        &income_categories,
    )
    .into_response())
}

/// Split validation errors, which are shown in the form, from other errors.
fn validation_message<T>(result: Result<T, Error>) -> Result<Result<T, String>, Error> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(Error::Validation(message)) => Ok(Err(message)),
        Err(error) => Err(error),
    }
}

fn dashboard_view(
    filter: &FilterValues,
    dashboard: &FinanceDashboard,
    details_filter: &DetailsFilter,
    details: Option<&ExpenseDetails>,
    expense_categories: &[Category],
    income_categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let charts = dashboard_charts(
        dashboard.expense_summary.as_ref(),
        dashboard.income_summary.as_ref(),
        &dashboard.budgets,
    );

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h1 class="w-full text-2xl font-bold mb-4" { "Dashboard" }

            (filter_form(filter, expense_categories, income_categories))
            (summary_cards(dashboard))
            (charts_view(&charts))
            (details_view(details_filter, details, expense_categories, FILTER_FORM_ID))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

fn filter_form(
    filter: &FilterValues,
    expense_categories: &[Category],
    income_categories: &[Category],
) -> Markup {
    let query = filter.query;

    html! {
        form
            id=(FILTER_FORM_ID)
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full mb-6 space-y-2"
        {
            div class="grid grid-cols-1 md:grid-cols-3 lg:grid-cols-6 gap-4 items-end"
            {
                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                    input id="month" type="month" name="month"
                        value=(query.month.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="from" class=(FORM_LABEL_STYLE) { "From" }
                    input id="from" type="date" name="from"
                        value=(query.from.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="to" class=(FORM_LABEL_STYLE) { "To" }
                    input id="to" type="date" name="to"
                        value=(query.to.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (category_multi_select(
                    "expense_categories",
                    "Expense categories",
                    expense_categories,
                    &query.expense_categories,
                ))
                (category_multi_select(
                    "income_categories",
                    "Income categories",
                    income_categories,
                    &query.income_categories,
                ))

                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply filter" }
            }

            p class="text-xs text-gray-500 dark:text-gray-400"
            {
                "Choose a month or a date range. Leave both empty to see everything."
            }

            @if let Some(error) = &filter.error {
                p class="text-red-500 text-base" { (error) }
            }
        }
    }
}
