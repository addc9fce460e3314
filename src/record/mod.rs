//! Expenses and incomes.
//!
//! Both kinds share one implementation. The routes for each kind carry the
//! [RecordKind] as a request extension.

mod batch;
mod bulk;
mod core;
mod edit;
mod form;
mod list;
mod selection;

pub use batch::{create_batch_endpoint, get_new_records_page};
pub use bulk::{bulk_category_endpoint, bulk_delete_endpoint};
pub use core::{Record, RecordKind, get_records};
pub use edit::{delete_record_endpoint, get_edit_record_page, update_record_endpoint};
pub use list::{RecordsState, get_records_page};
pub use selection::{SelectAllState, Selection};
