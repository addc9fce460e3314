//! Dashboard module
//!
//! Provides an overview page with the finance totals, charts and a breakdown
//! of the expenses for a chosen period.

mod cards;
mod charts;
mod core;
mod details;
mod handlers;

pub use handlers::{DashboardState, get_dashboard_page};
