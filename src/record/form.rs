//! Parsing and validating record form fields.

use serde::Deserialize;

use crate::{
    Error,
    period::{Month, format_date, parse_optional_date, parse_optional_month},
    record::core::{Record, RecordKind, RecordPayload},
};

/// The fields of a single record as submitted by a form.
///
/// Every field is text so that invalid input can be shown back to the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub period: String,
}

impl RecordForm {
    /// Prefill the form from an existing record.
    pub fn from_record(record: &Record) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            amount: format!("{:.2}", record.amount),
            category_id: record
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            date: record.date.map(format_date).unwrap_or_default(),
            period: record
                .period
                .map(|period| period.to_string())
                .unwrap_or_default(),
        }
    }

    /// Whether every field was left empty, e.g. an unused batch row.
    pub fn is_blank(&self) -> bool {
        [
            &self.title,
            &self.description,
            &self.amount,
            &self.category_id,
            &self.date,
            &self.period,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Check the fields and build the payload for the backend.
    ///
    /// `default_period` stands in for a missing date and month. Without it,
    /// one of the two is required.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] describing the first invalid field.
    pub fn validate(
        &self,
        kind: RecordKind,
        default_period: Option<Month>,
    ) -> Result<RecordPayload, Error> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Enter a title".to_owned()));
        }

        let amount = parse_amount(&self.amount)?;

        let category_id = self
            .category_id
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::Validation("Choose a category".to_owned()))?;

        let date = parse_optional_date(Some(&self.date))?;
        let period = parse_optional_month(Some(&self.period))?;

        if date.is_none() && period.is_none() && default_period.is_none() {
            return Err(Error::Validation("Enter a date or a month".to_owned()));
        }

        let description = self.description.trim();

        Ok(RecordPayload {
            kind,
            title: title.to_owned(),
            description: (!description.is_empty()).then(|| description.to_owned()),
            amount,
            category_id,
            date,
            period: if date.is_some() { None } else { period },
        })
    }
}

fn parse_amount(text: &str) -> Result<f64, Error> {
    let amount = text
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| Error::Validation(format!("\"{text}\" is not a valid amount")))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Validation(
            "The amount must be greater than zero".to_owned(),
        ));
    }

    Ok(amount)
}
