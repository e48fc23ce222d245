//! HTTP layer: Axum router, handlers, and page selection.
//!
//! Public catalogue listing, admin catalogue editing (`/adminMovie`), account
//! registration and login with role-based profile pages.

mod error;
mod forms;
mod handlers;
mod responses;
mod state;


pub use handlers::router;
pub use state::AppState;
