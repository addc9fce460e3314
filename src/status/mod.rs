//! Statuses label time entries. Their display order is kept per browser in a cookie.

mod core;
mod page;

pub use core::{Status, StatusOrder, get_statuses};
pub use page::{
    create_status_endpoint, delete_status_endpoint, get_statuses_page, move_status_down_endpoint,
    move_status_up_endpoint, rename_status_endpoint,
};
