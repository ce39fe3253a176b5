//! Web layer for the transit board.
//!
//! JSON endpoints over the PRIM client: passages, line status, screen
//! messages, search and line stops.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, MAX_BULK_STOPS, create_router};
pub use state::AppState;
