//! PRIM API façade.
//!
//! One async method per capability. Each canonicalizes its identifiers,
//! builds the upstream URL, fetches through the [`Transport`], validates the
//! payload and projects it to domain types. Retries and caching belong to
//! the transport.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::domain::{
    CanonicalLine, CanonicalStop, Incident, LineStop, Passage, ScreenMessage, SearchKind, SearchResult,
    TraficInfo, TransportMode,
};

use super::config::{Endpoint, PrimConfig};
use super::convert::{
    project_incidents, project_line_stops, project_passages, project_screen_messages, project_search,
    project_traffic,
};
use super::error::{PrimError, excerpt};
use super::schema::{self, GENERAL_MESSAGE, LINE_STOPS, PLACES, STOP_MONITORING, Shape, TRAFFIC};
use super::transport::{HttpTransport, Transport};
use super::types::{
    GeneralMessageResponse, LineStopsResponse, PlacesResponse, StopMonitoringResponse,
    TrafficResponse,
};

/// Upstream page size for line reports.
const LINE_REPORTS_COUNT: &str = "100";
/// Upstream page size for stop points; large enough for the longest bus line.
const LINE_STOPS_COUNT: &str = "500";
/// Upstream page size for place search, before filtering by kind.
const PLACES_COUNT: &str = "20";

/// `LineRef` asking for messages of every line.
const ALL_LINES: &str = "ALL";

/// PRIM API client.
///
/// Holds no state beyond its configuration; clone it or share it behind an
/// `Arc`.
#[derive(Clone)]
pub struct PrimClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for PrimClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PrimClient {
    /// Create a client sending its requests through `transport`.
    pub fn new(config: &PrimConfig, transport: Arc<dyn Transport>) -> Result<Self, PrimError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            PrimError::InvalidRequest(format!("invalid base URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PrimError::InvalidRequest(format!(
                "base URL cannot have paths: {}",
                config.base_url
            )));
        }

        Ok(Self {
            transport,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Create a client over a plain [`HttpTransport`].
    pub fn from_config(config: &PrimConfig) -> Result<Self, PrimError> {
        let transport = HttpTransport::new(config).map_err(|e| {
            PrimError::InvalidRequest(format!("failed to build HTTP client: {e}"))
        })?;
        Self::new(config, Arc::new(transport))
    }

    /// Next passages at a stop, in any supported stop encoding.
    pub async fn get_next_departures(&self, stop_id: &str) -> Result<Vec<Passage>, PrimError> {
        let stop = CanonicalStop::parse(stop_id);
        let url = self.url(&["stop-monitoring"], &[("MonitoringRef", stop.monitoring_ref())])?;
        let response: StopMonitoringResponse = self
            .fetch(Endpoint::StopMonitoring, url, &STOP_MONITORING)
            .await?;
        Ok(project_passages(&response, Utc::now()))
    }

    /// Next passages of a line at every monitored stop.
    pub async fn get_line_passages(&self, line_id: &str) -> Result<Vec<Passage>, PrimError> {
        let line = parse_line(line_id);
        let url = self.url(&["stop-monitoring"], &[("LineRef", line.legacy_ref.as_str())])?;
        let response: StopMonitoringResponse = self
            .fetch(Endpoint::StopMonitoring, url, &STOP_MONITORING)
            .await?;
        Ok(project_passages(&response, Utc::now()))
    }

    /// Status of every line, or of every line of one mode.
    pub async fn get_traffic_info(
        &self,
        mode: Option<TransportMode>,
    ) -> Result<Vec<TraficInfo>, PrimError> {
        let url = match mode {
            Some(mode) => {
                let physical_mode = format!("physical_mode:{}", mode.physical_mode());
                self.url(
                    &[
                        "v2",
                        "navitia",
                        "line_reports",
                        "physical_modes",
                        physical_mode.as_str(),
                        "line_reports",
                    ],
                    &[("count", LINE_REPORTS_COUNT)],
                )?
            }
            None => self.url(
                &["v2", "navitia", "line_reports", "line_reports"],
                &[("count", LINE_REPORTS_COUNT)],
            )?,
        };

        let response: TrafficResponse = self.fetch(Endpoint::LineReports, url, &TRAFFIC).await?;
        Ok(project_traffic(&response, Utc::now()))
    }

    /// Status of one line.
    ///
    /// `None` when upstream reports nothing for it.
    pub async fn get_line_traffic_info(
        &self,
        line_id: &str,
    ) -> Result<Option<TraficInfo>, PrimError> {
        let line = parse_line(line_id);
        let response = self.line_reports(&line).await?;
        let mut infos = project_traffic(&response, Utc::now());
        // Reports may also cover lines sharing a disruption with this one
        Ok(infos
            .iter()
            .position(|info| info.line_id == line.graph_ref)
            .map(|position| infos.swap_remove(position)))
    }

    /// Messages shown on station screens, for one line or for all of them.
    pub async fn get_screen_messages(
        &self,
        line_id: Option<&str>,
    ) -> Result<Vec<ScreenMessage>, PrimError> {
        let line_ref = match line_id {
            Some(id) => parse_line(id).legacy_ref,
            None => ALL_LINES.to_string(),
        };
        let url = self.url(&["general-message"], &[("LineRef", line_ref.as_str())])?;
        let response: GeneralMessageResponse = self
            .fetch(Endpoint::GeneralMessage, url, &GENERAL_MESSAGE)
            .await?;
        Ok(project_screen_messages(&response))
    }

    /// Every current disruption, grouped by the lines they impact.
    pub async fn get_bulk_disruptions(&self) -> Result<Vec<TraficInfo>, PrimError> {
        let response = self.disruptions_bulk().await?;
        Ok(project_traffic(&response, Utc::now()))
    }

    /// Disruptions as incidents, for one line or from the bulk feed.
    ///
    /// For one line, its display name is added to each incident's affected
    /// lines.
    pub async fn get_incidents(&self, line_id: Option<&str>) -> Result<Vec<Incident>, PrimError> {
        match line_id {
            Some(line_id) => {
                let line = parse_line(line_id);
                let response = self.line_reports(&line).await?;
                Ok(project_incidents(&response, Some(&line.display_name), Utc::now()))
            }
            None => {
                let response = self.disruptions_bulk().await?;
                Ok(project_incidents(&response, None, Utc::now()))
            }
        }
    }

    /// Unique stations of a line, sorted by name.
    pub async fn get_line_stops(&self, line_id: &str) -> Result<Vec<LineStop>, PrimError> {
        let line = parse_line(line_id);
        let url = self.url(
            &["v2", "navitia", "lines", line.graph_ref.as_str(), "stop_points"],
            &[("count", LINE_STOPS_COUNT)],
        )?;
        let response: LineStopsResponse = self.fetch(Endpoint::LineStops, url, &LINE_STOPS).await?;
        Ok(project_line_stops(&response))
    }

    /// Search stops and lines by name.
    pub async fn search(
        &self,
        query: &str,
        kind: SearchKind,
    ) -> Result<Vec<SearchResult>, PrimError> {
        let url = self.url(&["places"], &[("q", query.trim()), ("count", PLACES_COUNT)])?;
        let response: PlacesResponse = self.fetch(Endpoint::Places, url, &PLACES).await?;
        Ok(project_search(&response, kind))
    }

    /// Base URL plus percent-encoded path segments and query.
    /// Line reports of a single line.
    async fn line_reports(&self, line: &CanonicalLine) -> Result<TrafficResponse, PrimError> {
        let url = self.url(
            &["v2", "navitia", "line_reports", "lines", line.graph_ref.as_str(), "line_reports"],
            &[],
        )?;
        self.fetch(Endpoint::LineReports, url, &TRAFFIC).await
    }

    async fn disruptions_bulk(&self) -> Result<TrafficResponse, PrimError> {
        let url = self.url(&["disruptions_bulk"], &[])?;
        self.fetch(Endpoint::DisruptionsBulk, url, &TRAFFIC).await
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, PrimError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PrimError::InvalidRequest(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Fetch, classify, parse and validate one upstream payload.
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: Url,
        shape: &Shape,
    ) -> Result<T, PrimError> {
        let headers = [
            ("apiKey", self.api_key.as_str()),
            ("Accept", "application/json"),
        ];

        let started = Instant::now();
        let result = self.transport.get(url.as_str(), &headers).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = match result {
            Ok(response) => response,
            Err(source) => {
                warn!(%endpoint, duration_ms, error = %source, "PRIM request failed");
                return Err(PrimError::Transport { endpoint, source });
            }
        };

        let status = response.status;
        if status == 429 {
            warn!(%endpoint, status, duration_ms, "PRIM rate limit exceeded");
            return Err(PrimError::RateLimited { endpoint });
        }
        if !response.is_success() {
            warn!(%endpoint, status, duration_ms, body = %excerpt(&response.body), "PRIM API error");
            return Err(PrimError::upstream(endpoint, status, &response.body));
        }

        let data: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
            warn!(%endpoint, status, duration_ms, error = %e, "PRIM response is not JSON");
            PrimError::Json {
                endpoint,
                message: e.to_string(),
                body: excerpt(&response.body),
            }
        })?;

        let parsed = schema::validate(shape, data).map_err(|issues| {
            warn!(%endpoint, status, duration_ms, %issues, "PRIM response failed validation");
            PrimError::Validation { endpoint, issues }
        })?;

        debug!(%endpoint, status, duration_ms, "PRIM request");
        Ok(parsed)
    }
}

/// Canonicalize a line id, noting when nothing in it looked like a line code.
fn parse_line(line_id: &str) -> CanonicalLine {
    let line = CanonicalLine::parse(line_id);
    if !line.is_recognized() {
        debug!(line_id, "unrecognized line id, sending it as is");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineStatus, MessageChannel};
    use crate::prim::mock::MockTransport;
    use serde_json::json;

    fn client(mock: &MockTransport) -> PrimClient {
        let config = PrimConfig::new("secret").with_base_url("http://prim.test/marketplace");
        PrimClient::new(&config, Arc::new(mock.clone())).unwrap()
    }

    fn empty_stop_monitoring() -> serde_json::Value {
        json!({
            "Siri": { "ServiceDelivery": {
                "ResponseTimestamp": "2024-03-15T13:00:00Z",
                "StopMonitoringDelivery": [{}]
            }}
        })
    }

    #[tokio::test]
    async fn departures_request_shape() {
        let mock = MockTransport::new().with_json("/stop-monitoring", &empty_stop_monitoring());
        let passages = client(&mock)
            .get_next_departures("stop_area:IDFM:22089")
            .await
            .unwrap();
        assert!(passages.is_empty());

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "http://prim.test/marketplace/stop-monitoring?MonitoringRef=STIF%3AStopPoint%3AQ%3A22089%3A"
        );
        assert_eq!(requests[0].header("apiKey"), Some("secret"));
        assert_eq!(requests[0].header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn monomodal_stops_use_graph_ref() {
        let mock = MockTransport::new().with_json("/stop-monitoring", &empty_stop_monitoring());
        client(&mock)
            .get_next_departures("monomodalStopPlace:47918")
            .await
            .unwrap();

        let url = &mock.requests().await[0].url;
        assert!(url.ends_with("MonitoringRef=stop_point%3AIDFM%3AmonomodalStopPlace%3A47918"));
    }

    #[tokio::test]
    async fn line_passages_use_legacy_line_ref() {
        let mock = MockTransport::new().with_json("/stop-monitoring", &empty_stop_monitoring());
        client(&mock).get_line_passages("line:IDFM:C01742").await.unwrap();

        let url = &mock.requests().await[0].url;
        assert!(url.ends_with("LineRef=STIF%3ALine%3A%3AC01742%3A"));
    }

    #[tokio::test]
    async fn traffic_paths() {
        let mock = MockTransport::new().with_json("/line_reports", &json!({"line_reports": []}));
        let client = client(&mock);

        client.get_traffic_info(None).await.unwrap();
        client.get_traffic_info(Some(TransportMode::Rer)).await.unwrap();
        client.get_line_traffic_info("C01742").await.unwrap();

        let urls: Vec<_> = mock.requests().await.into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            [
                "http://prim.test/marketplace/v2/navitia/line_reports/line_reports?count=100",
                "http://prim.test/marketplace/v2/navitia/line_reports/physical_modes/physical_mode:RapidTransit/line_reports?count=100",
                "http://prim.test/marketplace/v2/navitia/line_reports/lines/line:IDFM:C01742/line_reports",
            ]
        );
    }

    #[tokio::test]
    async fn line_traffic_picks_requested_line() {
        let mock = MockTransport::new().with_json(
            "/line_reports",
            &json!({
                "disruptions": [{
                    "id": "d1",
                    "status": "active",
                    "severity": {"name": "bloquante", "effect": "NO_SERVICE"},
                    "impacted_objects": [{"pt_object": {"id": "line:IDFM:C01742", "name": "RER A"}}]
                }],
                "line_reports": [
                    {"line": {"id": "line:IDFM:C01743", "name": "RER B", "code": "B"}},
                    {"line": {"id": "line:IDFM:C01742", "name": "RER A", "code": "A"}}
                ]
            }),
        );

        let info = client(&mock)
            .get_line_traffic_info("STIF:Line::C01742:")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.line_code, "A");
        assert_eq!(info.status(), LineStatus::Interrompu);
    }

    #[tokio::test]
    async fn line_traffic_empty_is_none() {
        let mock = MockTransport::new().with_json("/line_reports", &json!({}));
        let info = client(&mock).get_line_traffic_info("C01742").await.unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn line_traffic_ignores_other_lines() {
        let mock = MockTransport::new().with_json(
            "/line_reports",
            &json!({
                "disruptions": [{
                    "id": "d1",
                    "status": "active",
                    "severity": {"name": "bloquante", "effect": "NO_SERVICE"},
                    "impacted_objects": [{"pt_object": {"id": "line:IDFM:C01743", "name": "RER B"}}]
                }],
                "line_reports": [
                    {"line": {"id": "line:IDFM:C01743", "name": "RER B", "code": "B"}}
                ]
            }),
        );

        let info = client(&mock).get_line_traffic_info("C01742").await.unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn incidents_for_one_line_or_bulk() {
        let body = json!({
            "disruptions": [{
                "id": "d1",
                "status": "active",
                "severity": {"name": "bloquante", "effect": "NO_SERVICE"},
                "messages": [{"text": "Grève des conducteurs"}],
                "impacted_objects": [{"pt_object": {"id": "line:IDFM:C01743", "name": "RER B"}}]
            }]
        });
        let mock = MockTransport::new()
            .with_json("/line_reports", &body)
            .with_json("/disruptions_bulk", &body);
        let client = client(&mock);

        let incidents = client.get_incidents(Some("C01743")).await.unwrap();
        assert_eq!(incidents[0].affected_lines, ["RER B"]);
        assert_eq!(incidents[0].category, crate::domain::IncidentCategory::Strike);

        let incidents = client.get_incidents(None).await.unwrap();
        assert_eq!(incidents.len(), 1);

        let requests = mock.requests().await;
        assert!(requests[0].url.ends_with("/lines/line:IDFM:C01743/line_reports"));
        assert!(requests[1].url.ends_with("/disruptions_bulk"));
    }

    #[tokio::test]
    async fn screen_messages_for_all_or_one_line() {
        let body = json!({
            "Siri": { "ServiceDelivery": {
                "ResponseTimestamp": "2024-03-15T13:00:00Z",
                "GeneralMessageDelivery": [{
                    "InfoMessage": [{
                        "RecordedAtTime": "2024-03-15T12:00:00Z",
                        "InfoMessageIdentifier": "m1",
                        "InfoChannelRef": {"value": "Information"},
                        "Content": {"Message": [{"MessageType": "TEXT_ONLY", "MessageText": {"value": "Bonjour"}}]}
                    }]
                }]
            }}
        });
        let mock = MockTransport::new().with_json("/general-message", &body);
        let client = client(&mock);

        let messages = client.get_screen_messages(None).await.unwrap();
        assert_eq!(messages[0].channel, MessageChannel::Information);
        client.get_screen_messages(Some("C01371")).await.unwrap();

        let requests = mock.requests().await;
        assert!(requests[0].url.ends_with("/general-message?LineRef=ALL"));
        assert!(requests[1].url.ends_with("LineRef=STIF%3ALine%3A%3AC01371%3A"));
    }

    #[tokio::test]
    async fn bulk_and_line_stops_paths() {
        let mock = MockTransport::new()
            .with_json("/disruptions_bulk", &json!({"disruptions": []}))
            .with_json("/stop_points", &json!({"stop_points": []}));
        let client = client(&mock);

        assert!(client.get_bulk_disruptions().await.unwrap().is_empty());
        assert!(client.get_line_stops("1").await.unwrap().is_empty());

        let urls: Vec<_> = mock.requests().await.into_iter().map(|r| r.url).collect();
        assert_eq!(urls[0], "http://prim.test/marketplace/disruptions_bulk");
        // A bare digit is not a line code; it degrades to itself
        assert_eq!(
            urls[1],
            "http://prim.test/marketplace/v2/navitia/lines/line:IDFM:1/stop_points?count=500"
        );
    }

    #[tokio::test]
    async fn degraded_ids_are_escaped() {
        let mock = MockTransport::new().with_json("/stop_points", &json!({}));
        client(&mock).get_line_stops("a/b c").await.unwrap();
        let url = &mock.requests().await[0].url;
        assert!(url.contains("/lines/line:IDFM:a%2Fb%20c/stop_points"));
    }

    #[tokio::test]
    async fn search_query() {
        let mock = MockTransport::new().with_json("/places", &json!({"places": []}));
        client(&mock).search("  gare de lyon ", SearchKind::All).await.unwrap();
        let url = &mock.requests().await[0].url;
        assert!(url.ends_with("/places?q=gare+de+lyon&count=20"));
    }

    #[tokio::test]
    async fn rate_limit_classified() {
        let mock = MockTransport::new().with_response("/places", 429, "slow down");
        let err = client(&mock).search("abc", SearchKind::All).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.endpoint(), Some(Endpoint::Places));
    }

    #[tokio::test]
    async fn upstream_error_classified() {
        let mock = MockTransport::new().with_response("/stop-monitoring", 503, "maintenance");
        let err = client(&mock).get_next_departures("22089").await.unwrap_err();
        match err {
            PrimError::Upstream { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_classified() {
        let mock = MockTransport::new().with_failure("/disruptions_bulk", "connection reset");
        let err = client(&mock).get_bulk_disruptions().await.unwrap_err();
        assert!(matches!(err, PrimError::Transport { endpoint: Endpoint::DisruptionsBulk, .. }));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn bad_json_classified() {
        let mock = MockTransport::new().with_response("/places", 200, "<html>oops</html>");
        let err = client(&mock).search("abc", SearchKind::All).await.unwrap_err();
        assert!(matches!(err, PrimError::Json { .. }));
    }

    #[tokio::test]
    async fn validation_failure_classified() {
        let mock = MockTransport::new().with_json(
            "/stop-monitoring",
            &json!({"Siri": {"ServiceDelivery": {"StopMonitoringDelivery": [{}]}}}),
        );
        let err = client(&mock).get_next_departures("22089").await.unwrap_err();
        let PrimError::Validation { endpoint, issues } = err else {
            panic!("expected validation error");
        };
        assert_eq!(endpoint, Endpoint::StopMonitoring);
        assert!(issues.has_path("Siri.ServiceDelivery.ResponseTimestamp"));
    }

    #[test]
    fn invalid_base_url() {
        let config = PrimConfig::new("k").with_base_url("not a url");
        let err = PrimClient::new(&config, Arc::new(MockTransport::new())).unwrap_err();
        assert!(matches!(err, PrimError::InvalidRequest(_)));
    }

    #[test]
    fn trailing_slash_base() {
        let config = PrimConfig::new("k").with_base_url("http://prim.test/marketplace/");
        let client = PrimClient::new(&config, Arc::new(MockTransport::new())).unwrap();
        let url = client.url(&["places"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://prim.test/marketplace/places");
    }
}
