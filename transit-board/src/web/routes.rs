//! HTTP route handlers.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{MessageChannel, SearchKind, TransportMode, calculate_late_chance};
use crate::prim::{Endpoint, PrimError, Refresh};

use super::dto::*;
use super::state::AppState;

/// Most stops accepted by one bulk passages request.
pub const MAX_BULK_STOPS: usize = 10;

/// Shortest accepted search text, in characters.
const MIN_QUERY_CHARS: usize = 2;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/passages/bulk", get(bulk_passages))
        .route("/api/passages/line/:line_id", get(line_passages))
        .route("/api/passages/:stop_id", get(stop_passages))
        .route("/api/trafic", get(trafic))
        .route("/api/messages/trafic", get(traffic_messages))
        .route("/api/messages/affichage", get(screen_messages))
        .route("/api/search", get(search))
        .route("/api/line-stops/:line_id", get(line_stops))
        .route("/api/incidents", get(incidents))
        .route("/api/late-chance", get(late_chance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON body with the `Cache-Control` of the endpoint it was built from.
fn cached<T: Serialize>(refresh: Refresh, body: T) -> Response {
    (
        [(header::CACHE_CONTROL, refresh.cache_control())],
        Json(body),
    )
        .into_response()
}

/// Non-empty trimmed items of a comma-separated query value.
fn comma_separated(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Next passages at one stop.
async fn stop_passages(
    State(state): State<AppState>,
    Path(stop_id): Path<String>,
) -> Result<Response, AppError> {
    let passages = state.prim.get_next_departures(&stop_id).await?;

    Ok(cached(
        state.refresh.stop_monitoring,
        PassagesResponse {
            passages,
            timestamp: Utc::now(),
        },
    ))
}

/// Next passages at several stops, fetched concurrently.
///
/// A failing stop does not fail the request; its error is reported inline.
async fn bulk_passages(
    State(state): State<AppState>,
    Query(req): Query<BulkPassagesRequest>,
) -> Result<Response, AppError> {
    let stops = req.stops.as_deref().ok_or_else(|| {
        AppError::bad_request("stops query parameter is required (comma-separated list)")
    })?;

    let stop_ids = comma_separated(stops);

    if stop_ids.is_empty() {
        return Err(AppError::bad_request("At least one stop ID is required"));
    }
    if stop_ids.len() > MAX_BULK_STOPS {
        return Err(AppError::bad_request(format!(
            "Maximum {MAX_BULK_STOPS} stops allowed per request"
        )));
    }

    let outcomes = join_all(
        stop_ids
            .iter()
            .map(|stop_id| state.prim.get_next_departures(stop_id)),
    )
    .await;

    let results: Vec<BulkStopResult> = stop_ids
        .iter()
        .zip(outcomes)
        .map(|(stop_id, outcome)| match outcome {
            Ok(passages) => BulkStopResult {
                stop_id: stop_id.to_string(),
                passages,
                error: None,
            },
            Err(e) => {
                warn!(stop_id, error = %e, "bulk passages: stop failed");
                BulkStopResult {
                    stop_id: stop_id.to_string(),
                    passages: Vec::new(),
                    error: Some(bulk_error_message(&e)),
                }
            }
        })
        .collect();

    let summary = BulkSummary::of(&results);
    Ok(cached(
        state.refresh.stop_monitoring,
        BulkPassagesResponse {
            results,
            summary,
            timestamp: Utc::now(),
        },
    ))
}

fn bulk_error_message(e: &PrimError) -> String {
    if let Some(status) = e.status() {
        format!("API Error: {status}")
    } else if e.is_validation() {
        "Invalid response from PRIM API".to_string()
    } else {
        e.to_string()
    }
}

/// Next passages of one line.
async fn line_passages(
    State(state): State<AppState>,
    Path(line_id): Path<String>,
) -> Result<Response, AppError> {
    let passages = state.prim.get_line_passages(&line_id).await?;

    Ok(cached(
        state.refresh.stop_monitoring,
        LinePassagesResponse {
            passages,
            line_id,
            timestamp: Utc::now(),
        },
    ))
}

/// Line statuses, globally, per mode or for one line.
async fn trafic(
    State(state): State<AppState>,
    Query(req): Query<TraficRequest>,
) -> Result<Response, AppError> {
    let mode = req
        .mode
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(TransportMode::from_str)
        .transpose()
        .map_err(|e| {
            let valid: Vec<&str> = TransportMode::ALL.iter().map(|m| m.as_str()).collect();
            AppError::bad_request(format!("{e}, expected one of {}", valid.join(", ")))
        })?;

    let traffic_info = match req.line_id.as_deref().filter(|l| !l.is_empty()) {
        Some(line_id) => state
            .prim
            .get_line_traffic_info(line_id)
            .await?
            .into_iter()
            .collect(),
        None => state.prim.get_traffic_info(mode).await?,
    };

    Ok(cached(
        state.refresh.line_reports,
        TraficResponse {
            traffic_info,
            timestamp: Utc::now(),
            mode: mode.map_or("all", TransportMode::as_str).to_string(),
        },
    ))
}

/// Line statuses from line reports, or from the bulk disruption feed.
async fn traffic_messages(
    State(state): State<AppState>,
    Query(req): Query<TrafficMessagesRequest>,
) -> Result<Response, AppError> {
    let (traffic_info, source, refresh) = if req.is_bulk() {
        (
            state.prim.get_bulk_disruptions().await?,
            "bulk",
            state.refresh.disruptions_bulk,
        )
    } else {
        (
            state.prim.get_traffic_info(None).await?,
            "line_reports",
            state.refresh.line_reports,
        )
    };

    Ok(cached(
        refresh,
        TrafficMessagesResponse {
            traffic_info,
            source,
            timestamp: Utc::now(),
        },
    ))
}

/// Messages shown on station screens.
async fn screen_messages(
    State(state): State<AppState>,
    Query(req): Query<ScreenMessagesRequest>,
) -> Result<Response, AppError> {
    let channel = req
        .channel
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(MessageChannel::from_str)
        .transpose()
        .map_err(|e| {
            AppError::bad_request(format!(
                "{e}, channel must be one of: Information, Perturbation, Commercial"
            ))
        })?;

    let line_id = req.line_id.as_deref().filter(|l| !l.is_empty());
    let mut messages = state.prim.get_screen_messages(line_id).await?;
    if let Some(channel) = &channel {
        messages.retain(|m| &m.channel == channel);
    }

    Ok(cached(
        state.refresh.general_message,
        ScreenMessagesResponse {
            messages,
            filters: MessageFilters {
                line_id: req.line_id,
                channel: req.channel,
            },
            timestamp: Utc::now(),
        },
    ))
}

/// Search stops and lines.
async fn search(
    State(state): State<AppState>,
    Query(req): Query<SearchRequest>,
) -> Result<Response, AppError> {
    let query = req
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| q.chars().count() >= MIN_QUERY_CHARS)
        .ok_or_else(|| {
            AppError::bad_request(
                "Query parameter 'q' is required and must be at least 2 characters",
            )
        })?;

    let kind = match req.kind.as_deref() {
        None | Some("") => SearchKind::default(),
        Some(kind) => SearchKind::from_str(kind).map_err(|e| AppError::bad_request(e.to_string()))?,
    };

    let results = state.prim.search(query, kind).await?;

    Ok(cached(
        state.refresh.search,
        SearchResponse {
            count: results.len(),
            results,
            query: query.to_string(),
            kind: kind.as_str(),
        },
    ))
}

/// Unique stations of one line.
async fn line_stops(
    State(state): State<AppState>,
    Path(line_id): Path<String>,
) -> Result<Response, AppError> {
    let stops = state.prim.get_line_stops(&line_id).await?;

    Ok(cached(
        state.refresh.line_stops,
        LineStopsResponse {
            count: stops.len(),
            stops,
            line_id,
        },
    ))
}

/// Disruptions as incidents, for one line or from the bulk feed.
async fn incidents(
    State(state): State<AppState>,
    Query(req): Query<IncidentsRequest>,
) -> Result<Response, AppError> {
    let line_id = req.line_id.as_deref().filter(|l| !l.trim().is_empty());
    let incidents = state.prim.get_incidents(line_id).await?;
    let (source, refresh) = match line_id {
        Some(_) => ("line_reports", state.refresh.line_reports),
        None => ("bulk", state.refresh.disruptions_bulk),
    };

    Ok(cached(
        refresh,
        IncidentsResponse {
            count: incidents.len(),
            incidents,
            source,
            timestamp: Utc::now(),
        },
    ))
}

/// Chance of being late on a rider's favourite lines.
///
/// Without lines there is nothing to assess and upstream is not called.
async fn late_chance(
    State(state): State<AppState>,
    Query(req): Query<LateChanceRequest>,
) -> Result<Response, AppError> {
    let lines = comma_separated(req.lines.as_deref().unwrap_or_default());
    let traffic = if lines.is_empty() {
        Vec::new()
    } else {
        state.prim.get_traffic_info(None).await?
    };

    Ok(cached(
        state.refresh.line_reports,
        LateChanceResponse {
            late_chance: calculate_late_chance(lines, &traffic),
            timestamp: Utc::now(),
        },
    ))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Prim(PrimError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }
}

impl From<PrimError> for AppError {
    fn from(e: PrimError) -> Self {
        AppError::Prim(e)
    }
}

/// Upstream statuses are passed through when they are errors.
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Bad Request".to_string(),
                        message: Some(message),
                        status: None,
                    },
                )
            }
            AppError::Prim(e) => match e.status() {
                Some(upstream) => {
                    let endpoint = e.endpoint().map_or("-", Endpoint::name);
                    if e.is_rate_limited() {
                        warn!(endpoint, "upstream rate limit, passing 429 on");
                    } else {
                        warn!(endpoint, error = %e, "upstream error");
                    }
                    (
                        upstream_status(upstream),
                        ErrorResponse {
                            error: "API Error".to_string(),
                            message: Some(e.to_string()),
                            status: Some(upstream),
                        },
                    )
                }
                None if e.is_validation() => {
                    error!(
                        endpoint = e.endpoint().map_or("-", Endpoint::name),
                        error = %e,
                        "upstream contract drift"
                    );
                    (
                        StatusCode::BAD_GATEWAY,
                        ErrorResponse {
                            error: "Validation Error".to_string(),
                            message: Some("Invalid response from PRIM API".to_string()),
                            status: None,
                        },
                    )
                }
                None => {
                    error!(
                        endpoint = e.endpoint().map_or("-", Endpoint::name),
                        error = %e,
                        "request failed"
                    );
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorResponse {
                            error: "Internal Server Error".to_string(),
                            message: Some(e.to_string()),
                            status: None,
                        },
                    )
                }
            },
        };

        (status, Json(body)).into_response()
    }
}
