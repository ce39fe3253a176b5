//! Application state for the web layer.

use std::sync::Arc;

use crate::prim::{PrimClient, RefreshIntervals};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// PRIM API client
    pub prim: Arc<PrimClient>,

    /// Freshness advertised in `Cache-Control`
    pub refresh: RefreshIntervals,
}

impl AppState {
    /// Create a new app state.
    pub fn new(prim: PrimClient, refresh: RefreshIntervals) -> Self {
        Self {
            prim: Arc::new(prim),
            refresh,
        }
    }
}
