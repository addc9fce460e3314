//! The URIs served by the web client.
//!
//! Paths under `/api` are htmx endpoints that return fragments or htmx
//! redirects. Everything else is a full page. For endpoints that take a
//! parameter, e.g. '/expenses/{record_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for managing expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for entering a batch of new expenses.
pub const NEW_EXPENSES_VIEW: &str = "/expenses/new";
/// The page for editing a single expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{record_id}/edit";
/// The page for managing incomes.
pub const INCOMES_VIEW: &str = "/incomes";
/// The page for entering a batch of new incomes.
pub const NEW_INCOMES_VIEW: &str = "/incomes/new";
/// The page for editing a single income.
pub const EDIT_INCOME_VIEW: &str = "/incomes/{record_id}/edit";
/// The page listing expense and income categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for editing an expense category.
pub const EDIT_EXPENSE_CATEGORY_VIEW: &str = "/categories/expense/{category_id}/edit";
/// The page for editing an income category.
pub const EDIT_INCOME_CATEGORY_VIEW: &str = "/categories/income/{category_id}/edit";
/// The page for viewing and planning a monthly budget.
pub const BUDGET_VIEW: &str = "/budget";
/// The page for logging hourly time entries for a day.
pub const DAY_VIEW: &str = "/day";
/// The page for managing time entry statuses.
pub const STATUSES_VIEW: &str = "/statuses";
/// The page for viewing and editing the user's profile.
pub const PROFILE_VIEW: &str = "/profile";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register a new user.
pub const USERS: &str = "/api/users";
/// The route to update the current user's profile.
pub const PROFILE_API: &str = "/api/profile";

/// The route to create a batch of expenses.
pub const EXPENSES_BATCH: &str = "/api/expenses/batch";
/// The route to update or delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{record_id}";
/// The route to change the category of the selected expenses.
pub const EXPENSES_BULK_CATEGORY: &str = "/api/expenses/bulk";
/// The route to delete the selected expenses.
pub const EXPENSES_BULK_DELETE: &str = "/api/expenses/bulk-delete";
/// The route to create a batch of incomes.
pub const INCOMES_BATCH: &str = "/api/incomes/batch";
/// The route to update or delete a single income.
pub const INCOME: &str = "/api/incomes/{record_id}";
/// The route to change the category of the selected incomes.
pub const INCOMES_BULK_CATEGORY: &str = "/api/incomes/bulk";
/// The route to delete the selected incomes.
pub const INCOMES_BULK_DELETE: &str = "/api/incomes/bulk-delete";

/// The route to create an expense category.
pub const POST_EXPENSE_CATEGORY: &str = "/api/expense-categories";
/// The route to update or delete an expense category.
pub const EXPENSE_CATEGORY: &str = "/api/expense-categories/{category_id}";
/// The route to create an income category.
pub const POST_INCOME_CATEGORY: &str = "/api/income-categories";
/// The route to update or delete an income category.
pub const INCOME_CATEGORY: &str = "/api/income-categories/{category_id}";

/// The route to create or update the budget for a month.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to save a time entry for one hour of a day.
pub const DAY_ENTRY: &str = "/api/days/{date}";

/// The route to create a status.
pub const POST_STATUS: &str = "/api/statuses";
/// The route to rename or delete a status.
pub const STATUS: &str = "/api/statuses/{status_id}";
/// The route to move a status one place up in the display order.
pub const MOVE_STATUS_UP: &str = "/api/statuses/{status_id}/up";
/// The route to move a status one place down in the display order.
pub const MOVE_STATUS_DOWN: &str = "/api/statuses/{status_id}/down";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{record_id}', '{record_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
