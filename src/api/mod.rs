//! HTTP surface: JSON endpoints over the query engine plus the static browser client.

pub mod assets;
pub mod handlers;
pub mod server;

pub use handlers::{ApiError, AppState};
pub use server::{router, serve};
