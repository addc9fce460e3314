//! Expense and income categories.

mod core;
mod delete;
mod edit;
mod list;

pub use core::{Category, category_multi_select, category_select, get_categories};
pub use delete::delete_category_endpoint;
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::{create_category_endpoint, get_categories_page};
