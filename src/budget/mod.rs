//! Monthly budgets: planned income, expenses and savings against the actual totals.

mod core;
mod page;

pub use core::Budget;
pub use page::{BudgetState, get_budget_page, upsert_budget_endpoint};
