//! Calls to the Traker REST backend.

mod client;
mod session;

pub use client::ApiClient;
pub use session::{AuthTokens, Session};
