//! The record model shared by expenses and incomes.

use std::fmt::Display;

use serde::{Deserialize, Serialize, ser::SerializeMap};
use time::Date;

use crate::{
    Error,
    api::{ApiClient, Session},
    endpoints,
    period::{Month, PeriodFilter, deserialize_optional_date, format_date},
};

/// Whether a record is money going out or coming in.
///
/// The kind selects the backend endpoints, the served routes and the name of
/// the date field in the backend's JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Expense,
    Income,
}

impl RecordKind {
    /// The backend collection path, e.g. "/api/expenses".
    pub fn api_path(self) -> &'static str {
        match self {
            RecordKind::Expense => "/api/expenses",
            RecordKind::Income => "/api/incomes",
        }
    }

    /// The backend path for the categories of this kind.
    pub fn category_api_path(self) -> &'static str {
        match self {
            RecordKind::Expense => "/api/expense-categories",
            RecordKind::Income => "/api/income-categories",
        }
    }

    /// The JSON field holding the record's date.
    pub fn date_field(self) -> &'static str {
        match self {
            RecordKind::Expense => "expenseDate",
            RecordKind::Income => "incomeDate",
        }
    }

    /// The JSON field holding the records of a batch create request.
    pub fn batch_field(self) -> &'static str {
        match self {
            RecordKind::Expense => "expenses",
            RecordKind::Income => "incomes",
        }
    }

    pub fn view(self) -> &'static str {
        match self {
            RecordKind::Expense => endpoints::EXPENSES_VIEW,
            RecordKind::Income => endpoints::INCOMES_VIEW,
        }
    }

    pub fn new_view(self) -> &'static str {
        match self {
            RecordKind::Expense => endpoints::NEW_EXPENSES_VIEW,
            RecordKind::Income => endpoints::NEW_INCOMES_VIEW,
        }
    }

    pub fn edit_view(self, record_id: i64) -> String {
        match self {
            RecordKind::Expense => endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, record_id),
            RecordKind::Income => endpoints::format_endpoint(endpoints::EDIT_INCOME_VIEW, record_id),
        }
    }

    /// The htmx endpoint for updating or deleting one record.
    pub fn record_endpoint(self, record_id: i64) -> String {
        match self {
            RecordKind::Expense => endpoints::format_endpoint(endpoints::EXPENSE, record_id),
            RecordKind::Income => endpoints::format_endpoint(endpoints::INCOME, record_id),
        }
    }

    pub fn batch_endpoint(self) -> &'static str {
        match self {
            RecordKind::Expense => endpoints::EXPENSES_BATCH,
            RecordKind::Income => endpoints::INCOMES_BATCH,
        }
    }

    pub fn bulk_category_endpoint(self) -> &'static str {
        match self {
            RecordKind::Expense => endpoints::EXPENSES_BULK_CATEGORY,
            RecordKind::Income => endpoints::INCOMES_BULK_CATEGORY,
        }
    }

    pub fn bulk_delete_endpoint(self) -> &'static str {
        match self {
            RecordKind::Expense => endpoints::EXPENSES_BULK_DELETE,
            RecordKind::Income => endpoints::INCOMES_BULK_DELETE,
        }
    }

    /// The plural title, e.g. "Expenses".
    pub fn title(self) -> &'static str {
        match self {
            RecordKind::Expense => "Expenses",
            RecordKind::Income => "Incomes",
        }
    }

    /// The singular noun in lower case, e.g. "expense".
    pub fn noun(self) -> &'static str {
        match self {
            RecordKind::Expense => "expense",
            RecordKind::Income => "income",
        }
    }

    /// The text colour for amounts of this kind.
    pub fn amount_style(self) -> &'static str {
        match self {
            RecordKind::Expense => "text-red-600 dark:text-red-400",
            RecordKind::Income => "text-green-600 dark:text-green-400",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.noun())
    }
}

/// An expense or income as returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(
        default,
        alias = "expenseDate",
        alias = "incomeDate",
        deserialize_with = "deserialize_optional_date"
    )]
    pub date: Option<Date>,
    #[serde(default)]
    pub period: Option<Month>,
    /// Set when the record has a month but no exact date.
    #[serde(default)]
    pub month_only: bool,
}

impl Record {
    /// The date if known, otherwise the month, otherwise a dash.
    pub fn date_label(&self) -> String {
        match (self.date, self.period) {
            (Some(date), _) => format_date(date),
            (None, Some(period)) => period.label(),
            (None, None) => "—".to_owned(),
        }
    }

    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Uncategorized")
    }
}

/// A validated record ready to be sent to the backend.
///
/// When both a date and a month are known the date wins and the month is
/// sent as null.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPayload {
    pub kind: RecordKind,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub category_id: i64,
    pub date: Option<Date>,
    pub period: Option<Month>,
}

impl Serialize for RecordPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let period = if self.date.is_some() { None } else { self.period };

        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("description", &self.description)?;
        map.serialize_entry("amount", &self.amount)?;
        map.serialize_entry("categoryId", &self.category_id)?;
        map.serialize_entry(self.kind.date_field(), &self.date.map(format_date))?;
        map.serialize_entry("period", &period)?;
        map.end()
    }
}

/// The body of `POST /api/{kind}/batch`.
#[derive(Debug)]
pub struct BatchRequest {
    pub kind: RecordKind,
    pub default_period: Option<Month>,
    pub records: Vec<RecordPayload>,
}

impl Serialize for BatchRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        if let Some(default_period) = self.default_period {
            map.serialize_entry("defaultPeriod", &default_period)?;
        }
        map.serialize_entry(self.kind.batch_field(), &self.records)?;
        map.end()
    }
}

/// Fetch the records of `kind` matching `period` and `category_ids`.
///
/// An empty `category_ids` does not filter by category.
pub async fn get_records(
    api: &ApiClient,
    session: &Session,
    kind: RecordKind,
    period: &PeriodFilter,
    category_ids: &[i64],
) -> Result<Vec<Record>, Error> {
    let mut query = period.query_params();
    query.extend(category_ids.iter().map(|id| ("categories", id.to_string())));

    api.get_json(session, kind.api_path(), &query).await
}

/// Find a single record. The backend has no lookup by ID, so this searches
/// the unfiltered list.
pub async fn get_record(
    api: &ApiClient,
    session: &Session,
    kind: RecordKind,
    record_id: i64,
) -> Result<Record, Error> {
    get_records(api, session, kind, &PeriodFilter::All, &[])
        .await?
        .into_iter()
        .find(|record| record.id == record_id)
        .ok_or(Error::NotFound)
}
