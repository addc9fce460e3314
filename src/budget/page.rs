//! The budget page and the endpoint for saving a month's plan.

use axum::{
    Extension, Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use reqwest::Method;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::ALERT_CONTAINER_ID,
    api::{ApiClient, Session},
    budget::core::{Budget, BudgetForm, get_budget},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, format_currency, format_optional_currency, link,
    },
    navigation::NavBar,
    period::{Month, parse_optional_month},
    timezone::local_today,
};

/// The state needed for the budget page.
#[derive(Debug, Clone)]
pub struct BudgetState {
    pub api: ApiClient,
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    pub month: Option<String>,
}

/// Show the budget for the requested month, defaulting to the current month.
pub async fn get_budget_page(
    State(state): State<BudgetState>,
    Extension(session): Extension<Session>,
    Query(query): Query<BudgetQuery>,
) -> Result<Response, Error> {
    let current_month = Month::of(local_today(&state.local_timezone)?);

    let (month, month_error) = match parse_optional_month(query.month.as_deref()) {
        Ok(month) => (month.unwrap_or(current_month), None),
        Err(Error::Validation(message)) => (current_month, Some(message)),
        Err(error) => return Err(error),
    };

    let budget = get_budget(&state.api, &session, month).await?;
    let form = BudgetForm::new(month, budget.as_ref());

    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex flex-wrap w-full justify-between items-end gap-4 mb-4"
            {
                h1 class="text-2xl font-bold text-gray-900 dark:text-white"
                {
                    "Budget for " (month.label())
                }

                form method="get" action=(endpoints::BUDGET_VIEW) class="flex items-end gap-2"
                {
                    div
                    {
                        label for="month-picker" class=(FORM_LABEL_STYLE) { "Month" }
                        input
                            id="month-picker"
                            type="month"
                            name="month"
                            value=(month)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show" }
                }
            }

            nav id="month-navigation" class="flex w-full justify-between mb-4"
            {
                (link(&budget_month_url(month.previous()), "← Previous month"))
                (link(&budget_month_url(month.next()), "Next month →"))
            }

            @if let Some(message) = month_error {
                p class="text-red-500 text-base mb-4" { (message) }
            }

            @match &budget {
                Some(budget) => (budget_cards(budget)),
                None => {
                    p id="no-budget" class="w-full mb-4 text-gray-500 dark:text-gray-400"
                    {
                        "No budget for this month"
                    }
                }
            }

            section class={ "w-full max-w-xl " (CARD_STYLE) }
            {
                h2 class="text-lg font-semibold text-gray-900 dark:text-white mb-3"
                {
                    @if budget.is_some() { "Update plan" } @else { "Plan this month" }
                }

                (budget_form(&form, None))
            }
        }
    };

    Ok(base("Budget", &[], &content).into_response())
}

fn budget_month_url(month: Month) -> String {
    format!("{}?month={month}", endpoints::BUDGET_VIEW)
}

fn budget_cards(budget: &Budget) -> Markup {
    html! {
        section id="budget-summary" class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 w-full mb-6"
        {
            (summary_card("Income", budget.actual_income, "Plan", budget.planned_income))
            (summary_card("Expense", budget.actual_expense, "Plan", budget.planned_expense))
            (summary_card("Balance", budget.actual_balance, "Plan", budget.planned_balance))
            (summary_card("Savings", budget.savings_progress, "Goal", budget.savings_goal))
        }

        @if let Some(remaining) = budget.remaining_to_spend {
            p class="w-full mb-4 text-sm text-gray-600 dark:text-gray-400"
            {
                "Remaining to spend: " (format_currency(remaining))
            }
        }

        @if let Some(notes) = &budget.notes {
            p class="w-full mb-4 text-sm italic text-gray-600 dark:text-gray-400" { (notes) }
        }
    }
}

fn summary_card(
    title: &str,
    actual: Option<f64>,
    target_label: &str,
    target: Option<f64>,
) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class="mt-1 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                (format_optional_currency(actual))
            }
            p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
            {
                (target_label) ": " (format_optional_currency(target))
            }
        }
    }
}

fn budget_form(form: &BudgetForm, error_message: Option<&str>) -> Markup {
    let amount_input = |id: &str, label: &str, value: &str| {
        html! {
            div
            {
                label for=(id) class=(FORM_LABEL_STYLE) { (label) }
                input
                    id=(id)
                    type="number"
                    name=(id)
                    min="0"
                    step="0.01"
                    value=(value)
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    };

    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-swap="outerHTML"
            hx-target-error={ "#" (ALERT_CONTAINER_ID) }
            class="space-y-4"
        {
            input type="hidden" name="month" value=(form.month);

            (amount_input("planned_income", "Planned income", &form.planned_income))
            (amount_input("planned_expense", "Planned expenses", &form.planned_expense))
            (amount_input("savings_goal", "Savings goal", &form.savings_goal))

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }
                textarea id="notes" name="notes" rows="3" class=(FORM_TEXT_INPUT_STYLE)
                {
                    (form.notes)
                }
            }

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save budget" }
        }
    }
}

/// Create or replace the budget for the submitted month.
pub async fn upsert_budget_endpoint(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let request = match form.validate() {
        Ok(request) => request,
        Err(Error::Validation(message)) => return budget_form(&form, Some(&message)).into_response(),
        Err(error) => return error.into_alert_response(),
    };

    let result: Result<Budget, Error> = api
        .send_json(&session, Method::POST, "/api/budgets", &request)
        .await;

    match result {
        Ok(budget) => {
            tracing::info!("Saved budget for {}", budget.month);
            (HxRedirect(budget_month_url(request.month)), StatusCode::SEE_OTHER).into_response()
        }
        Err(Error::Backend {
            status: 400,
            message,
        }) => budget_form(&form, Some(&message)).into_response(),
        Err(error) => {
            tracing::error!("Could not save budget for {}: {error}", request.month);
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod budget_page_tests {
    use axum::{
        Extension, Form, Json, Router,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use crate::{
        budget::core::BudgetForm,
        test_utils::{
            Recorder, assert_form_error_message, assert_hx_redirect, assert_valid_html,
            count_elements, element_text, must_get_form, must_select, parse_html_document,
            parse_html_fragment, spawn_backend, test_client, test_session,
        },
    };

    use super::{BudgetQuery, BudgetState, get_budget_page, upsert_budget_endpoint};

    async fn budget_state(router: Router) -> BudgetState {
        BudgetState {
            api: test_client(&spawn_backend(router).await),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn shows_budget_cards() {
        let state = budget_state(Router::new().route(
            "/api/budgets/2025-03",
            get(|| async {
                Json(json!({
                    "id": 1, "month": "2025-03",
                    "plannedIncome": 3000, "plannedExpense": 2000, "savingsGoal": 500,
                    "actualIncome": 310, "actualExpense": 180,
                    "plannedBalance": 1000, "actualBalance": 1300,
                    "remainingToSpend": 200, "savingsProgress": 800, "notes": null
                }))
            }),
        ))
        .await;

        let response = get_budget_page(
            State(state),
            Extension(test_session()),
            Query(BudgetQuery {
                month: Some("2025-03".to_owned()),
            }),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(count_elements(&document, "#budget-summary > div"), 4);
        let summary = element_text(&must_select(&document, "#budget-summary"));
        assert!(summary.contains("₽310.00"), "got {summary}");
        assert!(summary.contains("Goal: ₽500.00"), "got {summary}");
        let form = must_get_form(&document);
        assert_eq!(form.value().attr("action"), Some("/budget"));
        assert_eq!(
            count_elements(&document, "#month-navigation a[href='/budget?month=2025-02']"),
            1
        );
        assert_eq!(
            count_elements(&document, "#month-navigation a[href='/budget?month=2025-04']"),
            1
        );
    }

    #[tokio::test]
    async fn missing_budget_shows_message_and_empty_form() {
        let state = budget_state(Router::new().route(
            "/api/budgets/2025-04",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"status": 404, "message": "Budget not found"})),
                )
            }),
        ))
        .await;

        let response = get_budget_page(
            State(state),
            Extension(test_session()),
            Query(BudgetQuery {
                month: Some("2025-04".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_eq!(count_elements(&document, "#no-budget"), 1);
        assert_eq!(count_elements(&document, "form[hx-post='/api/budgets'] input[name=month][value='2025-04']"), 1);
    }

    #[tokio::test]
    async fn upsert_posts_budget_and_redirects_to_month() {
        let received = Recorder::default();
        let sink = received.clone();
        let state = budget_state(Router::new().route(
            "/api/budgets",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.record(body);
                    Json(json!({"id": 3, "month": "2025-05"}))
                }
            }),
        ))
        .await;
        let form = BudgetForm {
            month: "2025-05".to_owned(),
            planned_income: "100".to_owned(),
            ..Default::default()
        };

        let response =
            upsert_budget_endpoint(State(state.api), Extension(test_session()), Form(form)).await;

        assert_hx_redirect(&response, "/budget?month=2025-05");
        assert_eq!(received.last().map(|body| body["plannedIncome"].clone()), Some(json!(100.0)));
    }

    #[tokio::test]
    async fn negative_amount_rerenders_form() {
        let state = budget_state(Router::new()).await;
        let form = BudgetForm {
            month: "2025-05".to_owned(),
            savings_goal: "-20".to_owned(),
            ..Default::default()
        };

        let response = upsert_budget_endpoint(State(state.api), Extension(test_session()), Form(form))
            .await
            .into_response();

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Savings goal cannot be negative");
    }
}
