//! The monthly budget model and its form.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    api::{ApiClient, Session},
    period::{Month, parse_optional_month},
};

/// A month's plan together with the actual totals computed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub id: Option<i64>,
    pub month: Month,
    #[serde(default)]
    pub planned_income: Option<f64>,
    #[serde(default)]
    pub planned_expense: Option<f64>,
    #[serde(default)]
    pub savings_goal: Option<f64>,
    #[serde(default)]
    pub actual_income: Option<f64>,
    #[serde(default)]
    pub actual_expense: Option<f64>,
    #[serde(default)]
    pub planned_balance: Option<f64>,
    #[serde(default)]
    pub actual_balance: Option<f64>,
    #[serde(default)]
    pub remaining_to_spend: Option<f64>,
    /// What is left of the actual balance after the savings goal.
    #[serde(default)]
    pub savings_progress: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fetch the budget for `month`, or `None` if the month has no budget.
pub async fn get_budget(
    api: &ApiClient,
    session: &Session,
    month: Month,
) -> Result<Option<Budget>, Error> {
    let path = format!("/api/budgets/{month}");

    match api.get_json(session, &path, &[]).await {
        Ok(budget) => Ok(Some(budget)),
        Err(Error::Backend { status: 404, .. }) => Ok(None),
        Err(error) => Err(error),
    }
}

/// The budget form as submitted. Amount fields may be left blank.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BudgetForm {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub planned_income: String,
    #[serde(default)]
    pub planned_expense: String,
    #[serde(default)]
    pub savings_goal: String,
    #[serde(default)]
    pub notes: String,
}

/// The body of `POST /api/budgets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    pub month: Month,
    pub planned_income: Option<f64>,
    pub planned_expense: Option<f64>,
    pub savings_goal: Option<f64>,
    pub notes: Option<String>,
}

impl BudgetForm {
    /// Prefill the form for `month`, using the existing budget if there is one.
    pub fn new(month: Month, budget: Option<&Budget>) -> Self {
        let amount = |value: Option<f64>| value.map(|value| format!("{value:.2}")).unwrap_or_default();

        match budget {
            Some(budget) => Self {
                month: month.to_string(),
                planned_income: amount(budget.planned_income),
                planned_expense: amount(budget.planned_expense),
                savings_goal: amount(budget.savings_goal),
                notes: budget.notes.clone().unwrap_or_default(),
            },
            None => Self {
                month: month.to_string(),
                ..Default::default()
            },
        }
    }

    /// # Errors
    ///
    /// Returns [Error::Validation] if the month is missing or an amount is invalid or negative.
    pub fn validate(&self) -> Result<BudgetRequest, Error> {
        let month = parse_optional_month(Some(&self.month))?
            .ok_or_else(|| Error::Validation("Choose a month".to_owned()))?;

        let notes = self.notes.trim();

        Ok(BudgetRequest {
            month,
            planned_income: parse_optional_amount("Planned income", &self.planned_income)?,
            planned_expense: parse_optional_amount("Planned expenses", &self.planned_expense)?,
            savings_goal: parse_optional_amount("Savings goal", &self.savings_goal)?,
            notes: (!notes.is_empty()).then(|| notes.to_owned()),
        })
    }
}

fn parse_optional_amount(field: &str, text: &str) -> Result<Option<f64>, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let amount = text
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::Validation(format!("{field}: \"{text}\" is not a valid amount")))?;

    if amount < 0.0 {
        return Err(Error::Validation(format!("{field} cannot be negative")));
    }

    Ok(Some(amount))
}

#[cfg(test)]
mod budget_form_tests {
    use serde_json::json;

    use crate::Error;

    use super::{Budget, BudgetForm};

    fn form() -> BudgetForm {
        BudgetForm {
            month: "2025-03".to_owned(),
            planned_income: "2000".to_owned(),
            planned_expense: "".to_owned(),
            savings_goal: "250,50".to_owned(),
            notes: "  ".to_owned(),
        }
    }

    #[test]
    fn blank_amounts_are_sent_as_null() {
        let request = form().validate().unwrap();

        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({
                "month": "2025-03",
                "plannedIncome": 2000.0,
                "plannedExpense": null,
                "savingsGoal": 250.5,
                "notes": null
            })
        );
    }

    #[test]
    fn negative_amount_is_rejected() {
        let form = BudgetForm {
            planned_expense: "-1".to_owned(),
            ..form()
        };

        assert_eq!(
            form.validate(),
            Err(Error::Validation("Planned expenses cannot be negative".to_owned()))
        );
    }

    #[test]
    fn zero_amount_is_allowed() {
        let form = BudgetForm {
            savings_goal: "0".to_owned(),
            ..form()
        };

        assert_eq!(form.validate().unwrap().savings_goal, Some(0.0));
    }

    #[test]
    fn month_is_required() {
        let form = BudgetForm {
            month: String::new(),
            ..form()
        };

        assert_eq!(
            form.validate(),
            Err(Error::Validation("Choose a month".to_owned()))
        );
    }

    #[test]
    fn prefills_from_existing_budget() {
        let budget: Budget = serde_json::from_value(json!({
            "id": 1,
            "month": "2025-03",
            "plannedIncome": 2000,
            "plannedExpense": 1500.5,
            "savingsGoal": null,
            "notes": "Holiday"
        }))
        .unwrap();

        let form = BudgetForm::new(budget.month, Some(&budget));

        assert_eq!(form.planned_expense, "1500.50");
        assert_eq!(form.savings_goal, "");
        assert_eq!(form.notes, "Holiday");
    }
}
