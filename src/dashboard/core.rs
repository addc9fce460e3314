//! The dashboard data as computed by the backend, and the filters used to request it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::{
    Error,
    api::{ApiClient, Session},
    budget::Budget,
    period::{DateRange, Month, PeriodFilter},
    record::RecordKind,
};

/// A category's share of the total.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub total_amount: f64,
    /// Share of the total in percent.
    #[serde(default)]
    pub percentage: Option<f64>,
}

impl CategoryTotal {
    pub fn label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Uncategorized")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub period: Month,
    #[serde(default)]
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMonthlyTotals {
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub monthly_totals: Vec<MonthTotal>,
}

/// Totals of the expenses or incomes matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub totals_by_category: Vec<CategoryTotal>,
    #[serde(default)]
    pub totals_by_month: Vec<MonthTotal>,
    #[serde(default)]
    pub category_monthly_totals: Vec<CategoryMonthlyTotals>,
}

/// Everything shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceDashboard {
    #[serde(default)]
    pub expense_summary: Option<Summary>,
    #[serde(default)]
    pub income_summary: Option<Summary>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub total_income: Option<f64>,
    #[serde(default)]
    pub total_expenses: Option<f64>,
    #[serde(default)]
    pub net_balance: Option<f64>,
    #[serde(default)]
    pub total_savings_goal: Option<f64>,
    #[serde(default)]
    pub savings_progress: Option<f64>,
}

/// The categories to include on the dashboard. Empty means all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    pub expense: Vec<i64>,
    pub income: Vec<i64>,
}

pub async fn get_dashboard(
    api: &ApiClient,
    session: &Session,
    period: &PeriodFilter,
    categories: &CategoryFilter,
) -> Result<FinanceDashboard, Error> {
    let mut query = period.query_params();
    query.extend(
        categories
            .expense
            .iter()
            .map(|id| ("expenseCategories", id.to_string())),
    );
    query.extend(
        categories
            .income
            .iter()
            .map(|id| ("incomeCategories", id.to_string())),
    );

    api.get_json(session, "/api/budgets/dashboard", &query).await
}

/// Fetch the summary of the expenses in `range` and `category_ids`.
pub async fn get_expense_summary(
    api: &ApiClient,
    session: &Session,
    range: DateRange,
    category_ids: &[i64],
) -> Result<Summary, Error> {
    let mut query = PeriodFilter::Range {
        from: Some(range.from()),
        to: Some(range.to()),
    }
    .query_params();
    query.extend(category_ids.iter().map(|id| ("categories", id.to_string())));

    let path = format!("{}/summary", RecordKind::Expense.api_path());
    api.get_json(session, &path, &query).await
}

/// One line per category over the union of all months. A month a category
/// has no total for counts as zero.
pub fn trend_series(totals: &[CategoryMonthlyTotals]) -> (Vec<Month>, Vec<(String, Vec<f64>)>) {
    let months: Vec<Month> = totals
        .iter()
        .flat_map(|category| category.monthly_totals.iter().map(|total| total.period))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let series = totals
        .iter()
        .map(|category| {
            let by_month: BTreeMap<Month, f64> = category
                .monthly_totals
                .iter()
                .map(|total| (total.period, total.total_amount))
                .collect();
            let values = months
                .iter()
                .map(|month| by_month.get(month).copied().unwrap_or(0.0))
                .collect();
            let name = category
                .category_name
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_owned());

            (name, values)
        })
        .collect();

    (months, series)
}

/// Month labels with the actual income and expense of each budget, zero when unknown.
pub fn cash_flow_series(budgets: &[Budget]) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let mut budgets: Vec<&Budget> = budgets.iter().collect();
    budgets.sort_by_key(|budget| budget.month);

    let labels = budgets.iter().map(|budget| budget.month.label()).collect();
    let income = budgets
        .iter()
        .map(|budget| budget.actual_income.unwrap_or(0.0))
        .collect();
    let expense = budgets
        .iter()
        .map(|budget| budget.actual_expense.unwrap_or(0.0))
        .collect();

    (labels, income, expense)
}
