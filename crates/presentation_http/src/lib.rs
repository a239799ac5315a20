//! Polyglot HTTP presentation layer
//!
//! Serves the practice page and the JSON API it drives.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{BodyLimits, create_router, create_router_with_limits};
pub use state::AppState;
