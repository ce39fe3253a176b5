//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Incident, LateChance, LineStop, Passage, ScreenMessage, SearchResult, TraficInfo,
};

/// Query of `/api/passages/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkPassagesRequest {
    /// Comma-separated stop ids
    pub stops: Option<String>,
}

/// Query of `/api/trafic`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraficRequest {
    /// One of the five transport modes
    pub mode: Option<String>,

    /// A single line, in any supported encoding; wins over `mode`
    pub line_id: Option<String>,
}

/// Query of `/api/messages/trafic`.
#[derive(Debug, Deserialize)]
pub struct TrafficMessagesRequest {
    /// `"true"` to read the bulk disruption feed instead of line reports
    pub bulk: Option<String>,
}

impl TrafficMessagesRequest {
    pub fn is_bulk(&self) -> bool {
        self.bulk.as_deref() == Some("true")
    }
}

/// Query of `/api/messages/affichage`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenMessagesRequest {
    pub line_id: Option<String>,
    pub channel: Option<String>,
}

/// Query of `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Search text, at least two characters
    pub q: Option<String>,

    /// `stop`, `line` or `all` (default)
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Query of `/api/incidents`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentsRequest {
    /// Restrict to one line; the bulk feed otherwise
    pub line_id: Option<String>,
}

/// Query of `/api/late-chance`.
#[derive(Debug, Deserialize)]
pub struct LateChanceRequest {
    /// Comma-separated line codes, e.g. `1,14,B`
    pub lines: Option<String>,
}

/// Passages at one stop.
#[derive(Debug, Serialize)]
pub struct PassagesResponse {
    pub passages: Vec<Passage>,
    pub timestamp: DateTime<Utc>,
}

/// Passages of one line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePassagesResponse {
    pub passages: Vec<Passage>,
    pub line_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome for one stop of a bulk request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStopResult {
    pub stop_id: String,

    /// Empty when the stop failed
    pub passages: Vec<Passage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts over a bulk request.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BulkSummary {
    pub requested: usize,
    pub success: usize,
    pub errors: usize,
}

impl BulkSummary {
    pub fn of(results: &[BulkStopResult]) -> Self {
        let errors = results.iter().filter(|r| r.error.is_some()).count();
        Self {
            requested: results.len(),
            success: results.len() - errors,
            errors,
        }
    }
}

/// Passages at several stops.
#[derive(Debug, Serialize)]
pub struct BulkPassagesResponse {
    pub results: Vec<BulkStopResult>,
    pub summary: BulkSummary,
    pub timestamp: DateTime<Utc>,
}

/// Line statuses, all lines or filtered.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraficResponse {
    pub traffic_info: Vec<TraficInfo>,
    pub timestamp: DateTime<Utc>,

    /// Requested mode, or `"all"`
    pub mode: String,
}

/// Line statuses with the feed they came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficMessagesResponse {
    pub traffic_info: Vec<TraficInfo>,

    /// `"bulk"` or `"line_reports"`
    pub source: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Filters applied to screen messages, echoed back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFilters {
    pub line_id: Option<String>,
    pub channel: Option<String>,
}

/// Screen messages.
#[derive(Debug, Serialize)]
pub struct ScreenMessagesResponse {
    pub messages: Vec<ScreenMessage>,
    pub filters: MessageFilters,
    pub timestamp: DateTime<Utc>,
}

/// Search results.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub query: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub count: usize,
}

/// Stations of one line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStopsResponse {
    pub stops: Vec<LineStop>,
    pub line_id: String,
    pub count: usize,
}

/// Disruptions as incidents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentsResponse {
    pub incidents: Vec<Incident>,
    pub count: usize,

    /// `"bulk"` or `"line_reports"`
    pub source: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Chance of being late on the requested lines.
#[derive(Debug, Serialize)]
pub struct LateChanceResponse {
    #[serde(flatten)]
    pub late_chance: LateChance,
    pub timestamp: DateTime<Utc>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error class
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Upstream status, for upstream errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}
