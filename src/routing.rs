//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Extension, Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    budget::{get_budget_page, upsert_budget_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    day_log::{get_day_page, save_time_entry_endpoint},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    record::{
        RecordKind, bulk_category_endpoint, bulk_delete_endpoint, create_batch_endpoint,
        delete_record_endpoint, get_edit_record_page, get_new_records_page, get_records_page,
        update_record_endpoint,
    },
    status::{
        create_status_endpoint, delete_status_endpoint, get_statuses_page,
        move_status_down_endpoint, move_status_up_endpoint, rename_status_endpoint,
    },
    user::{get_profile_page, update_profile_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::BUDGET_VIEW, get(get_budget_page))
        .route(endpoints::DAY_VIEW, get(get_day_page))
        .route(endpoints::STATUSES_VIEW, get(get_statuses_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .merge(record_pages(RecordKind::Expense))
        .merge(record_pages(RecordKind::Income))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_api = Router::new()
        .route(endpoints::BUDGETS_API, post(upsert_budget_endpoint))
        .route(endpoints::DAY_ENTRY, put(save_time_entry_endpoint))
        .route(endpoints::POST_STATUS, post(create_status_endpoint))
        .route(
            endpoints::STATUS,
            put(rename_status_endpoint).delete(delete_status_endpoint),
        )
        .route(endpoints::MOVE_STATUS_UP, post(move_status_up_endpoint))
        .route(endpoints::MOVE_STATUS_DOWN, post(move_status_down_endpoint))
        .route(endpoints::PROFILE_API, put(update_profile_endpoint))
        .merge(record_api(RecordKind::Expense))
        .merge(record_api(RecordKind::Income))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    protected_pages
        .merge(protected_api)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The list, batch entry and edit pages for `kind`, plus its category edit page.
fn record_pages(kind: RecordKind) -> Router<AppState> {
    let (edit_record_view, edit_category_view) = match kind {
        RecordKind::Expense => (
            endpoints::EDIT_EXPENSE_VIEW,
            endpoints::EDIT_EXPENSE_CATEGORY_VIEW,
        ),
        RecordKind::Income => (
            endpoints::EDIT_INCOME_VIEW,
            endpoints::EDIT_INCOME_CATEGORY_VIEW,
        ),
    };

    Router::new()
        .route(kind.view(), get(get_records_page))
        .route(kind.new_view(), get(get_new_records_page))
        .route(edit_record_view, get(get_edit_record_page))
        .route(edit_category_view, get(get_edit_category_page))
        .layer(Extension(kind))
}

/// The htmx endpoints for records and categories of `kind`.
fn record_api(kind: RecordKind) -> Router<AppState> {
    let (record, post_category, category) = match kind {
        RecordKind::Expense => (
            endpoints::EXPENSE,
            endpoints::POST_EXPENSE_CATEGORY,
            endpoints::EXPENSE_CATEGORY,
        ),
        RecordKind::Income => (
            endpoints::INCOME,
            endpoints::POST_INCOME_CATEGORY,
            endpoints::INCOME_CATEGORY,
        ),
    };

    Router::new()
        .route(kind.batch_endpoint(), post(create_batch_endpoint))
        .route(
            record,
            put(update_record_endpoint).delete(delete_record_endpoint),
        )
        .route(kind.bulk_category_endpoint(), put(bulk_category_endpoint))
        .route(kind.bulk_delete_endpoint(), post(bulk_delete_endpoint))
        .route(post_category, post(create_category_endpoint))
        .route(
            category,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .layer(Extension(kind))
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
