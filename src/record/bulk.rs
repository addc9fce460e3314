//! Bulk actions on the selected records: delete, or move to another category.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    api::{ApiClient, Session},
    record::core::RecordKind,
};

/// The management form as submitted by the bulk action buttons.
///
/// The filter fields come along so the page can be reloaded with the same filter.
#[derive(Debug, Default, Deserialize)]
pub struct BulkForm {
    #[serde(default)]
    pub selected: Vec<i64>,
    #[serde(default)]
    pub bulk_category_id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub categories: Vec<i64>,
}

impl BulkForm {
    fn selected_ids(&self) -> Result<&[i64], Error> {
        if self.selected.is_empty() {
            Err(Error::EmptySelection)
        } else {
            Ok(&self.selected)
        }
    }

    /// The management page URL with the submitted filter.
    fn return_url(&self, kind: RecordKind) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if !self.from.is_empty() {
            params.push(("from", self.from.clone()));
        }

        if !self.to.is_empty() {
            params.push(("to", self.to.clone()));
        }

        params.extend(self.categories.iter().map(|id| ("categories", id.to_string())));

        match serde_urlencoded::to_string(&params) {
            Ok(query) if !query.is_empty() => format!("{}?{query}", kind.view()),
            _ => kind.view().to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BulkDeleteRequest<'a> {
    ids: &'a [i64],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryUpdate {
    id: i64,
    category_id: i64,
}

#[derive(Debug, Serialize)]
struct BulkUpdateRequest {
    records: Vec<CategoryUpdate>,
}

/// Delete every selected record.
pub async fn bulk_delete_endpoint(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Form(form): Form<BulkForm>,
) -> Response {
    let ids = match form.selected_ids() {
        Ok(ids) => ids,
        Err(error) => return error.into_alert_response(),
    };

    let path = format!("{}/bulk-delete", kind.api_path());
    match api
        .send(&session, Method::POST, &path, &BulkDeleteRequest { ids })
        .await
    {
        Ok(()) => {
            tracing::info!("Deleted {} {kind} records", ids.len());
            (HxRedirect(form.return_url(kind)), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete {kind} records {ids:?}: {error}");
            error.into_alert_response()
        }
    }
}

/// Move every selected record to the chosen category.
pub async fn bulk_category_endpoint(
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
    Form(form): Form<BulkForm>,
) -> Response {
    let ids = match form.selected_ids() {
        Ok(ids) => ids,
        Err(error) => return error.into_alert_response(),
    };

    let category_id = match form.bulk_category_id.trim().parse::<i64>() {
        Ok(category_id) => category_id,
        Err(_) => return Error::Validation("Choose a category".to_owned()).into_alert_response(),
    };

    let request = BulkUpdateRequest {
        records: ids
            .iter()
            .map(|&id| CategoryUpdate { id, category_id })
            .collect(),
    };

    let path = format!("{}/bulk", kind.api_path());
    match api
        .send(&session, Method::PUT, &path, &request)
        .await
    {
        Ok(()) => (HxRedirect(form.return_url(kind)), StatusCode::SEE_OTHER).into_response(),
        Err(error) => {
            tracing::error!("Could not change the category of {kind} records {ids:?}: {error}");
            error.into_alert_response()
        }
    }
}
