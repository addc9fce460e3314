//! Hourly time entries for a single day.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    api::{ApiClient, Session},
    period::format_date,
};

pub(super) const HOURS_PER_DAY: u8 = 24;

/// The status attached to a time entry. Entries refer to statuses by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct EntryStatus {
    pub name: String,
}

/// What was done during one hour of a day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(super) struct TimeEntry {
    pub hour: u8,
    #[serde(default)]
    pub worked: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub status: Option<EntryStatus>,
}

impl TimeEntry {
    fn empty(hour: u8) -> Self {
        Self {
            hour,
            worked: false,
            comment: None,
            status: None,
        }
    }

    pub(super) fn status_name(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.name.as_str())
    }
}

/// One entry per hour of the day, filling the hours the backend has no entry for.
pub(super) fn day_rows(entries: &[TimeEntry]) -> Vec<TimeEntry> {
    (0..HOURS_PER_DAY)
        .map(|hour| {
            entries
                .iter()
                .find(|entry| entry.hour == hour)
                .cloned()
                .unwrap_or_else(|| TimeEntry::empty(hour))
        })
        .collect()
}

/// The form for a single hour row.
///
/// The checkbox is only sent when checked, and an empty status means none.
/// The hour is checked by [TimeEntryForm::validate] so bad values get an alert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntryForm {
    pub hour: String,
    #[serde(default)]
    pub worked: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub(super) struct TimeEntryRequest {
    pub hour: u8,
    pub worked: bool,
    pub comment: String,
    pub status: Option<EntryStatus>,
}

impl TimeEntryForm {
    pub(super) fn validate(&self) -> Result<TimeEntryRequest, Error> {
        let hour = self
            .hour
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|hour| *hour < HOURS_PER_DAY)
            .ok_or_else(|| {
                Error::Validation(format!("Hour must be between 0 and {}", HOURS_PER_DAY - 1))
            })?;

        let status = match self.status.trim() {
            "" => None,
            name => Some(EntryStatus {
                name: name.to_owned(),
            }),
        };

        Ok(TimeEntryRequest {
            hour,
            worked: self.worked.is_some(),
            comment: self.comment.trim().to_owned(),
            status,
        })
    }
}

pub(super) async fn get_day_entries(
    api: &ApiClient,
    session: &Session,
    date: Date,
) -> Result<Vec<TimeEntry>, Error> {
    let path = format!("/api/days/{}", format_date(date));

    api.get_json(session, &path, &[]).await
}

pub(super) async fn save_time_entry(
    api: &ApiClient,
    session: &Session,
    date: Date,
    request: &TimeEntryRequest,
) -> Result<TimeEntry, Error> {
    let path = format!("/api/days/{}", format_date(date));

    api.send_json(session, Method::PUT, &path, request).await
}

/// The number of worked hours on `date`.
pub(super) async fn get_worked_hours(
    api: &ApiClient,
    session: &Session,
    date: Date,
) -> Result<i64, Error> {
    api.get_json(session, "/api/stats/daily", &[("date", format_date(date))])
        .await
}
