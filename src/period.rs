//! Months, dates and date ranges as they appear in forms and backend queries.
//!
//! Dates use the ISO format `yyyy-MM-dd` and months use `yyyy-MM`. Empty
//! form fields are treated as missing values rather than errors.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A calendar month, written as `yyyy-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: time::Month,
}

impl Month {
    /// The month that contains `date`.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        // Day 1 exists in every month, so this cannot fail for a valid year.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        self.next()
            .first_day()
            .previous_day()
            .unwrap_or(Date::MAX)
    }

    /// The month before this one.
    pub fn previous(&self) -> Self {
        let year = if self.month == time::Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.previous(),
        }
    }

    /// The month after this one.
    pub fn next(&self) -> Self {
        let year = if self.month == time::Month::December {
            self.year + 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.next(),
        }
    }
}

impl Month {
    /// A short label for charts and tables, e.g. "Mar 2025".
    pub fn label(&self) -> String {
        let name = self.month.to_string();

        format!("{} {}", &name[..3], self.year)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Validation(format!("Invalid month \"{s}\", expected yyyy-MM"));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = time::Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }
}

impl TryFrom<String> for Month {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(value: Month) -> Self {
        value.to_string()
    }
}

/// Parse an ISO date, e.g. "2025-03-01".
///
/// # Errors
///
/// Returns [Error::Validation] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("Invalid date \"{text}\", expected yyyy-MM-dd")))
}

/// Format a date the way the backend and HTML date inputs expect it.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Deserialize an optional ISO date. Null and empty strings become `None`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let text: Option<String> = Option::deserialize(deserializer)?;

    parse_optional_date(text.as_deref()).map_err(serde::de::Error::custom)
}

/// Parse an optional form value as a date. Blank values are `None`.
pub fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date(text).map(Some),
    }
}

/// Parse an optional form value as a month. Blank values are `None`.
pub fn parse_optional_month(text: Option<&str>) -> Result<Option<Month>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some),
    }
}

/// An inclusive range of dates where `to` is never before `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: Date,
    to: Date,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if `to` is before `from`.
    pub fn new(from: Date, to: Date) -> Result<Self, Error> {
        if to < from {
            return Err(Error::Validation(
                "The end date cannot be before the start date".to_owned(),
            ));
        }

        Ok(Self { from, to })
    }

    /// The first to the last day of the month containing `today`.
    pub fn current_month(today: Date) -> Self {
        let month = Month::of(today);

        Self {
            from: month.first_day(),
            to: month.last_day(),
        }
    }

    /// Build a range from the `from` and `to` form fields.
    ///
    /// Both fields are required. Falls back to the current month when both are blank.
    pub fn from_form(from: Option<&str>, to: Option<&str>, today: Date) -> Result<Self, Error> {
        match (parse_optional_date(from)?, parse_optional_date(to)?) {
            (Some(from), Some(to)) => Self::new(from, to),
            (None, None) => Ok(Self::current_month(today)),
            _ => Err(Error::Validation(
                "Choose both a start and an end date".to_owned(),
            )),
        }
    }

    pub fn from(&self) -> Date {
        self.from
    }

    pub fn to(&self) -> Date {
        self.to
    }
}

/// A period filter that is either a whole month or a date range, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodFilter {
    /// No restriction, the backend decides.
    #[default]
    All,
    /// A single month.
    Month(Month),
    /// A range of dates, either end may be open.
    Range { from: Option<Date>, to: Option<Date> },
}

impl PeriodFilter {
    /// Build a filter from the `month`, `from` and `to` form fields.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if a month and a date are both given, if a
    /// field cannot be parsed, or if `to` is before `from`.
    pub fn from_form(
        month: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, Error> {
        let month = parse_optional_month(month)?;
        let from = parse_optional_date(from)?;
        let to = parse_optional_date(to)?;

        match (month, from, to) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::Validation(
                "Choose either a month or a date range, not both".to_owned(),
            )),
            (Some(month), None, None) => Ok(Self::Month(month)),
            (None, None, None) => Ok(Self::All),
            (None, Some(from), Some(to)) => {
                DateRange::new(from, to)?;
                Ok(Self::Range {
                    from: Some(from),
                    to: Some(to),
                })
            }
            (None, from, to) => Ok(Self::Range { from, to }),
        }
    }

    /// The backend query parameters for this filter.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            PeriodFilter::All => Vec::new(),
            PeriodFilter::Month(month) => vec![("month", month.to_string())],
            PeriodFilter::Range { from, to } => from
                .map(|from| ("from", format_date(from)))
                .into_iter()
                .chain(to.map(|to| ("to", format_date(to))))
                .collect(),
        }
    }
}

#[cfg(test)]
mod month_tests {
    use time::macros::date;

    use crate::Error;

    use super::Month;

    #[test]
    fn parses_and_displays() {
        let month: Month = "2025-03".parse().unwrap();

        assert_eq!(month.to_string(), "2025-03");
        assert_eq!(month.first_day(), date!(2025 - 03 - 01));
        assert_eq!(month.last_day(), date!(2025 - 03 - 31));
    }

    #[test]
    fn last_day_handles_leap_years() {
        let month: Month = "2024-02".parse().unwrap();

        assert_eq!(month.last_day(), date!(2024 - 02 - 29));
    }

    #[test]
    fn rejects_bad_months() {
        for text in ["2025-13", "2025-3", "25-03", "2025/03", ""] {
            assert!(
                matches!(text.parse::<Month>(), Err(Error::Validation(_))),
                "expected {text:?} to be rejected"
            );
        }
    }

    #[test]
    fn steps_across_year_boundaries() {
        let january: Month = "2025-01".parse().unwrap();

        assert_eq!(january.previous().to_string(), "2024-12");
        assert_eq!(january.previous().next(), january);
    }

    #[test]
    fn short_label() {
        let month: Month = "2025-03".parse().unwrap();

        assert_eq!(month.label(), "Mar 2025");
    }

    #[test]
    fn deserializes_from_string() {
        let month: Month = serde_json::from_str("\"2025-11\"").unwrap();

        assert_eq!(month, Month::of(date!(2025 - 11 - 15)));
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2025-11\"");
    }
}

#[cfg(test)]
mod date_range_tests {
    use time::macros::date;

    use crate::Error;

    use super::{DateRange, PeriodFilter};

    #[test]
    fn rejects_end_before_start() {
        let result = DateRange::new(date!(2025 - 03 - 10), date!(2025 - 03 - 01));

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn single_day_range_is_valid() {
        let day = date!(2025 - 03 - 10);

        assert!(DateRange::new(day, day).is_ok());
    }

    #[test]
    fn blank_form_defaults_to_current_month() {
        let range = DateRange::from_form(Some(""), None, date!(2025 - 02 - 14)).unwrap();

        assert_eq!(range.from(), date!(2025 - 02 - 01));
        assert_eq!(range.to(), date!(2025 - 02 - 28));
    }

    #[test]
    fn form_requires_both_ends() {
        let result = DateRange::from_form(Some("2025-02-01"), Some(""), date!(2025 - 02 - 14));

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn period_filter_rejects_month_with_range() {
        let result = PeriodFilter::from_form(Some("2025-02"), Some("2025-02-01"), None);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn period_filter_month_query() {
        let filter = PeriodFilter::from_form(Some("2025-02"), Some(""), Some("")).unwrap();

        assert_eq!(filter.query_params(), vec![("month", "2025-02".to_owned())]);
    }

    #[test]
    fn period_filter_open_range_query() {
        let filter = PeriodFilter::from_form(None, Some("2025-02-01"), None).unwrap();

        assert_eq!(
            filter.query_params(),
            vec![("from", "2025-02-01".to_owned())]
        );
    }

    #[test]
    fn period_filter_rejects_reversed_range() {
        let result = PeriodFilter::from_form(None, Some("2025-02-10"), Some("2025-02-01"));

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
