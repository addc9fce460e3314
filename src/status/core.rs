//! Time entry statuses and their display order.

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    Error,
    api::{ApiClient, Session},
};

/// The cookie holding the display order as comma separated status IDs.
pub(crate) const COOKIE_STATUS_ORDER: &str = "status_order";
const STATUS_ORDER_DURATION: Duration = Duration::days(365);

/// A label for a time entry, e.g. "Meeting".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Status {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub(super) struct StatusRequest<'a> {
    pub(super) name: &'a str,
}

impl StatusForm {
    pub(super) fn validate(&self) -> Result<StatusRequest<'_>, Error> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(Error::Validation(
                "The status name cannot be empty".to_owned(),
            ));
        }

        Ok(StatusRequest { name })
    }
}

pub async fn get_statuses(api: &ApiClient, session: &Session) -> Result<Vec<Status>, Error> {
    api.get_json(session, "/api/statuses/getAllStatuses", &[])
        .await
}

pub(super) async fn create_status(
    api: &ApiClient,
    session: &Session,
    request: &StatusRequest<'_>,
) -> Result<Status, Error> {
    api.send_json(session, Method::POST, "/api/statuses/createStatus", request)
        .await
}

pub(super) async fn rename_status(
    api: &ApiClient,
    session: &Session,
    status_id: i64,
    request: &StatusRequest<'_>,
) -> Result<Status, Error> {
    let path = format!("/api/statuses/updateStatus/{status_id}");

    api.send_json(session, Method::PUT, &path, request).await
}

pub(super) async fn delete_status(
    api: &ApiClient,
    session: &Session,
    status_id: i64,
) -> Result<(), Error> {
    let path = format!("/api/statuses/deleteStatus/{status_id}");

    api.delete(session, &path).await
}

/// The saved display order of the statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusOrder(Vec<i64>);

/// Which way to move a status in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl StatusOrder {
    /// Read the order from the cookie. Malformed entries are skipped.
    pub fn from_cookies(jar: &CookieJar) -> Self {
        let ids = jar
            .get(COOKIE_STATUS_ORDER)
            .map(|cookie| {
                cookie
                    .value()
                    .split(',')
                    .filter_map(|id| id.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        Self(ids)
    }

    /// Store the order in the cookie jar.
    pub fn save(&self, jar: CookieJar) -> CookieJar {
        let value = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        jar.add(
            Cookie::build((COOKIE_STATUS_ORDER, value))
                .path("/")
                .max_age(STATUS_ORDER_DURATION)
                .http_only(true)
                .same_site(SameSite::Lax)
                .build(),
        )
    }

    /// Sort `statuses` by the saved order.
    ///
    /// Statuses in the saved order come first. The rest follow in the order
    /// the backend returned them.
    pub fn apply(&self, mut statuses: Vec<Status>) -> Vec<Status> {
        // The sort is stable, so unknown statuses keep their relative order.
        statuses.sort_by_key(|status| {
            self.0
                .iter()
                .position(|id| *id == status.id)
                .unwrap_or(usize::MAX)
        });

        statuses
    }

    /// Move `status_id` one place in `direction` within the ordered `statuses`.
    ///
    /// The result covers every status, so statuses the saved order did not
    /// know about get a fixed place too.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if `status_id` is not in `statuses`.
    pub fn moved(statuses: &[Status], status_id: i64, direction: Direction) -> Result<Self, Error> {
        let mut ids: Vec<i64> = statuses.iter().map(|status| status.id).collect();
        let index = ids
            .iter()
            .position(|id| *id == status_id)
            .ok_or(Error::NotFound)?;

        match direction {
            Direction::Up if index > 0 => ids.swap(index, index - 1),
            Direction::Down if index + 1 < ids.len() => ids.swap(index, index + 1),
            _ => {}
        }

        Ok(Self(ids))
    }
}
