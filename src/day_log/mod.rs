//! Day log module
//!
//! Tracks what was done in each hour of a day and how many hours were worked.

mod core;
mod page;

pub use page::{DayLogState, get_day_page, save_time_entry_endpoint};
