//! Category deletion endpoint.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;

use crate::{
    api::{ApiClient, Session},
    record::RecordKind,
};

/// Delete a category and refresh the page.
pub async fn delete_category_endpoint(
    Path(category_id): Path<i64>,
    State(api): State<ApiClient>,
    Extension(session): Extension<Session>,
    Extension(kind): Extension<RecordKind>,
) -> Response {
    let path = format!("{}/{category_id}", kind.category_api_path());

    match api.delete(&session, &path).await {
        Ok(()) => {
            tracing::info!("Deleted {kind} category {category_id}");
            (HxRefresh(true), ()).into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete {kind} category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_category_tests {
    use axum::{
        Extension, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::delete,
    };

    use crate::{
        record::RecordKind,
        test_utils::{bad_request, get_header, spawn_backend, test_client, test_session},
    };

    use super::delete_category_endpoint;

    #[tokio::test]
    async fn deletes_and_refreshes() {
        let backend = Router::new().route(
            "/api/income-categories/2",
            delete(|| async { StatusCode::NO_CONTENT }),
        );
        let api = test_client(&spawn_backend(backend).await);

        let response = delete_category_endpoint(
            Path(2),
            State(api),
            Extension(test_session()),
            Extension(RecordKind::Income),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(get_header(&response, "hx-refresh"), "true");
    }

    #[tokio::test]
    async fn category_in_use_shows_alert() {
        let backend = Router::new().route(
            "/api/expense-categories/2",
            delete(|| async { bad_request("Category is used by existing expenses") }),
        );
        let api = test_client(&spawn_backend(backend).await);

        let response = delete_category_endpoint(
            Path(2),
            State(api),
            Extension(test_session()),
            Extension(RecordKind::Expense),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
