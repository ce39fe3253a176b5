//! PRIM (Île-de-France Mobilités) API client.
//!
//! PRIM exposes two generations of upstream data behind one API key:
//! - SIRI Lite (`stop-monitoring`, `general-message`), PascalCase keys,
//!   strings wrapped as `{ "value": ... }`, legacy `STIF:` identifiers
//! - Navitia (`line_reports`, `disruptions_bulk`, `places`, `stop_points`),
//!   snake_case keys, graph `IDFM:` identifiers
//!
//! Every payload is validated structurally before it is deserialized, so
//! upstream drift surfaces as a [`PrimError::Validation`] listing every
//! offending path instead of a single serde message.

mod client;
mod config;
mod convert;
mod error;
mod mock;
pub mod schema;
mod transport;
mod types;

pub use client::PrimClient;
pub use config::{DEFAULT_BASE_URL, Endpoint, PrimConfig, Refresh, RefreshIntervals};
pub use convert::{
    disruption_to_incident, project_incidents, project_line_stops, project_passages,
    project_screen_messages, project_search, project_traffic, simplify_disruption,
};
pub use error::{BODY_EXCERPT_CHARS, PrimError};
pub use mock::{MockTransport, RecordedRequest};
pub use schema::{ValidationIssue, ValidationIssues};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
pub use types::{
    Disruption, GeneralMessageResponse, LineStopsResponse, PlacesResponse,
    StopMonitoringResponse, TrafficResponse,
};
