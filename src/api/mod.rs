//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;
mod state;

pub use routes::build_router;
pub use state::AppState;
