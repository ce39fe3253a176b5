//! Projection from validated PRIM DTOs to domain types.
//!
//! Every function here is pure. Anything time-relative takes `now` as an
//! argument so results are reproducible.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{
    Coords, DEFAULT_LINE_COLOR, DisruptionStatus, Incident, IncidentCategory, IncidentSource,
    IncidentStatus, LineStop, MAX_SEARCH_RESULTS, MessageChannel, NO_REPORT, Passage,
    ScreenMessage, SearchKind, SearchResult, Severity, SimplifiedDisruption, TraficInfo,
    TransportMode, dedup_and_sort, extract_line_display_name, extract_numeric_stop_id,
    impact_label, incident_severity, minutes_until, palette_color, parse_timestamp,
    upstream_color,
};

use super::types::{
    Disruption, GeneralMessageResponse, LineStopsResponse, NavitiaLine, NavitiaStopPoint, Place,
    PlaceType, PlacesResponse, StopMonitoringResponse, TrafficResponse,
};

const DEFAULT_DESTINATION: &str = "Terminus";
const DEFAULT_DISRUPTION_TITLE: &str = "Information trafic";
const DEFAULT_DISRUPTION_MESSAGE: &str = "Perturbation en cours";
const GRAPH_STOP_POINT_PREFIX: &str = "stop_point:IDFM:";

/// Upstream leaves fields empty as often as it omits them; treat both alike.
fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Convert a stop-monitoring response to passages.
///
/// Visits of every delivery are numbered in order; the index makes ids
/// unique even when a line appears several times.
pub fn project_passages(response: &StopMonitoringResponse, now: DateTime<Utc>) -> Vec<Passage> {
    response
        .siri
        .service_delivery
        .stop_monitoring_delivery
        .iter()
        .flat_map(|delivery| delivery.monitored_stop_visit.as_deref().unwrap_or_default())
        .enumerate()
        .map(|(index, visit)| {
            let journey = &visit.monitored_vehicle_journey;
            let call = &journey.monitored_call;
            let line_ref = journey.line_ref.value.as_str();

            let expected_time = non_empty(call.expected_departure_time.as_deref())
                .or(non_empty(call.expected_arrival_time.as_deref()))
                .and_then(parse_timestamp);
            let aimed_time = non_empty(call.aimed_departure_time.as_deref())
                .or(non_empty(call.aimed_arrival_time.as_deref()))
                .and_then(parse_timestamp);
            let status = non_empty(call.departure_status.as_deref())
                .or(non_empty(call.arrival_status.as_deref()))
                .unwrap_or(NO_REPORT);

            Passage {
                id: format!("{line_ref}-{index}"),
                line_id: line_ref.to_string(),
                line_name: extract_line_display_name(line_ref, None),
                destination: non_empty(journey.destination())
                    .unwrap_or(DEFAULT_DESTINATION)
                    .to_string(),
                direction: non_empty(journey.direction()).unwrap_or_default().to_string(),
                expected_time,
                aimed_time,
                status: status.to_string(),
                waiting_time: expected_time.map(|t| minutes_until(t, now)),
            }
        })
        .collect()
}

/// Reduce a disruption to what a status board shows.
///
/// A missing start means the disruption is treated as starting `now`.
pub fn simplify_disruption(disruption: &Disruption, now: DateTime<Utc>) -> SimplifiedDisruption {
    let message = disruption
        .messages
        .as_ref()
        .and_then(|m| m.first())
        .map(|m| m.text.as_str());
    let message = non_empty(message)
        .or(non_empty(disruption.cause.as_deref()))
        .unwrap_or(DEFAULT_DISRUPTION_MESSAGE);

    let period = disruption
        .application_periods
        .as_ref()
        .and_then(|p| p.first());
    let start_time = period
        .and_then(|p| p.begin.as_deref())
        .and_then(parse_timestamp)
        .unwrap_or(now);
    let end_time = period
        .and_then(|p| p.end.as_deref())
        .and_then(parse_timestamp);

    SimplifiedDisruption {
        id: disruption.id.clone(),
        title: non_empty(disruption.category.as_deref())
            .unwrap_or(DEFAULT_DISRUPTION_TITLE)
            .to_string(),
        message: message.to_string(),
        severity: Severity::from_effect(disruption.severity.effect),
        start_time,
        end_time,
        affected_lines: disruption
            .impacted()
            .iter()
            .map(|o| o.pt_object.name.clone())
            .collect(),
        status: disruption.status,
        effect: disruption.severity.effect,
    }
}

/// Channel whose message text is written for riders rather than staff.
const WEB_CHANNEL: &str = "web";

/// Turn a disruption into an incident for the rider's history.
///
/// `line_code` names the line the disruption was fetched for and is added to
/// the affected lines when upstream does not already list it.
pub fn disruption_to_incident(
    disruption: &Disruption,
    line_code: Option<&str>,
    now: DateTime<Utc>,
) -> Incident {
    let messages = disruption.messages.as_deref().unwrap_or_default();
    let web_message = messages
        .iter()
        .find(|m| {
            m.channel
                .as_ref()
                .and_then(|c| c.name.as_deref())
                .is_some_and(|name| name == WEB_CHANNEL)
        })
        .map(|m| m.text.as_str());
    let message = non_empty(web_message)
        .or(non_empty(messages.first().map(|m| m.text.as_str())))
        .or(non_empty(disruption.cause.as_deref()))
        .unwrap_or(DEFAULT_DISRUPTION_MESSAGE);

    let mut affected_lines: Vec<String> = disruption
        .impacted()
        .iter()
        .map(|o| o.pt_object.name.clone())
        .collect();
    if let Some(code) = non_empty(line_code) {
        if !affected_lines.iter().any(|l| l == code) {
            affected_lines.push(code.to_string());
        }
    }

    let affected_stops = disruption
        .impacted()
        .iter()
        .filter(|o| o.pt_object.embedded_type.as_deref() == Some("stop_point"))
        .map(|o| o.pt_object.id.clone())
        .collect();

    let period = disruption
        .application_periods
        .as_ref()
        .and_then(|p| p.first());
    let effect = disruption.severity.effect;

    Incident {
        id: disruption.id.clone(),
        title: non_empty(disruption.category.as_deref())
            .or(non_empty(Some(disruption.severity.name.as_str())))
            .unwrap_or(DEFAULT_DISRUPTION_TITLE)
            .to_string(),
        message: message.to_string(),
        category: IncidentCategory::detect(message, disruption.cause.as_deref()),
        severity: incident_severity(effect),
        status: match disruption.status {
            DisruptionStatus::Active => IncidentStatus::Active,
            DisruptionStatus::Past | DisruptionStatus::Future => IncidentStatus::Resolved,
        },
        affected_lines,
        affected_stops,
        start_time: period
            .and_then(|p| p.begin.as_deref())
            .and_then(parse_timestamp)
            .unwrap_or(now),
        end_time: period
            .and_then(|p| p.end.as_deref())
            .and_then(parse_timestamp),
        last_update: disruption
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(now),
        cause: non_empty(disruption.cause.as_deref()).map(str::to_string),
        impact: impact_label(effect).to_string(),
        source: IncidentSource::Prim,
    }
}

/// Every disruption of a traffic response as an incident, in upstream order.
pub fn project_incidents(
    response: &TrafficResponse,
    line_code: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<Incident> {
    response
        .disruptions
        .iter()
        .flatten()
        .map(|d| disruption_to_incident(d, line_code, now))
        .collect()
}

/// Upstream colour, then the official palette, then grey.
fn resolve_line_color(line: &NavitiaLine) -> String {
    if let Some(color) = line.color.as_deref().and_then(upstream_color) {
        return color;
    }
    line.code
        .as_deref()
        .and_then(palette_color)
        .unwrap_or(DEFAULT_LINE_COLOR)
        .to_string()
}

fn trafic_info(line: &NavitiaLine, disruptions: &[&Disruption], now: DateTime<Utc>) -> TraficInfo {
    TraficInfo::new(
        line.id.clone(),
        line.name.clone(),
        line.code.clone().unwrap_or_default(),
        resolve_line_color(line),
        disruptions
            .iter()
            .map(|d| simplify_disruption(d, now))
            .collect(),
    )
}

/// Convert a traffic response to per-line status.
///
/// With explicit line reports, each report collects the disruptions whose
/// impacted objects name its line. Without them, lines are rebuilt from the
/// embedded line objects of impacted objects, in first-seen order.
pub fn project_traffic(response: &TrafficResponse, now: DateTime<Utc>) -> Vec<TraficInfo> {
    let disruptions = response.disruptions.as_deref().unwrap_or_default();

    if let Some(reports) = response.line_reports.as_deref().filter(|r| !r.is_empty()) {
        return reports
            .iter()
            .map(|report| {
                let matching: Vec<&Disruption> = disruptions
                    .iter()
                    .filter(|d| d.impacts(&report.line.id))
                    .collect();
                trafic_info(&report.line, &matching, now)
            })
            .collect();
    }

    let mut order: Vec<(&NavitiaLine, Vec<&Disruption>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for disruption in disruptions {
        for impacted in disruption.impacted() {
            let Some(line) = impacted.pt_object.as_line() else {
                continue;
            };
            let slot = *index.entry(line.id.as_str()).or_insert_with(|| {
                order.push((line, Vec::new()));
                order.len() - 1
            });
            let grouped = &mut order[slot].1;
            // A disruption can name the same line through several objects
            if !grouped.iter().any(|d| std::ptr::eq(*d, disruption)) {
                grouped.push(disruption);
            }
        }
    }

    order
        .into_iter()
        .map(|(line, grouped)| trafic_info(line, &grouped, now))
        .collect()
}

/// Convert a general-message response to screen messages.
pub fn project_screen_messages(response: &GeneralMessageResponse) -> Vec<ScreenMessage> {
    response
        .siri
        .service_delivery
        .general_message_delivery
        .iter()
        .flat_map(|delivery| delivery.info_message.as_deref().unwrap_or_default())
        .map(|msg| ScreenMessage {
            id: msg.info_message_identifier.as_str().to_string(),
            channel: MessageChannel::from_tag(msg.info_channel_ref.as_str()),
            message: msg
                .content
                .message
                .first()
                .map(|m| m.message_text.value.clone())
                .unwrap_or_default(),
            valid_until: msg.valid_until_time.as_deref().and_then(parse_timestamp),
            affected_lines: msg
                .content
                .line_ref
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|l| extract_line_display_name(&l.value, None))
                .collect(),
            recorded_at: parse_timestamp(&msg.recorded_at_time),
        })
        .collect()
}

fn wanted(kind: SearchKind, place: PlaceType) -> bool {
    match kind {
        SearchKind::Stop => place == PlaceType::StopArea,
        SearchKind::Line => place == PlaceType::Line,
        SearchKind::All => matches!(place, PlaceType::StopArea | PlaceType::Line),
    }
}

fn search_result(place: &Place) -> SearchResult {
    match place.kind {
        PlaceType::Line => SearchResult::Line {
            id: place.id.clone(),
            name: place.name.clone(),
            code: place.short_name.clone(),
            color: place.color.as_deref().and_then(upstream_color),
            mode: place
                .mode
                .as_ref()
                .and_then(|m| m.first())
                .and_then(|m| TransportMode::from_physical_mode(&m.id)),
        },
        // Filtered out before this point; anything else is shown as a stop
        PlaceType::StopArea | PlaceType::City | PlaceType::Address => SearchResult::Stop {
            id: place.id.clone(),
            numeric_id: extract_numeric_stop_id(&place.id),
            name: place.name.clone(),
            city: place.city.clone(),
            lines: place
                .lines
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|l| non_empty(l.short_name.as_deref()).unwrap_or(&l.id).to_string())
                .collect(),
            // Upstream x is longitude, y is latitude
            coords: match (place.x, place.y) {
                (Some(lon), Some(lat)) => Some(Coords { lat, lon }),
                _ => None,
            },
        },
    }
}

/// Convert a place search to at most [`MAX_SEARCH_RESULTS`] results of the wanted kind.
///
/// Cities and addresses are never returned.
pub fn project_search(response: &PlacesResponse, kind: SearchKind) -> Vec<SearchResult> {
    response
        .places
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|p| wanted(kind, p.kind))
        .take(MAX_SEARCH_RESULTS)
        .map(search_result)
        .collect()
}

fn line_stop(point: &NavitiaStopPoint) -> LineStop {
    let coords = point.coord.as_ref().and_then(|c| {
        let lat = c.lat.trim().parse::<f64>().ok()?;
        let lon = c.lon.trim().parse::<f64>().ok()?;
        Some(Coords { lat, lon })
    });

    LineStop {
        id: point
            .id
            .strip_prefix(GRAPH_STOP_POINT_PREFIX)
            .unwrap_or(&point.id)
            .to_string(),
        name: point.name.clone(),
        coords,
    }
}

/// Convert a line's stop points to its unique stations, sorted by name.
pub fn project_line_stops(response: &LineStopsResponse) -> Vec<LineStop> {
    dedup_and_sort(
        response
            .stop_points
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(line_stop),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisruptionStatus, LineStatus};
    use crate::prim::schema::{self, GENERAL_MESSAGE, LINE_STOPS, PLACES, STOP_MONITORING, TRAFFIC};
    use serde_json::{Value, json};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-15T13:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn stop_monitoring(visits: Value) -> StopMonitoringResponse {
        schema::validate(
            &STOP_MONITORING,
            json!({
                "Siri": { "ServiceDelivery": {
                    "ResponseTimestamp": "2024-03-15T13:00:00Z",
                    "StopMonitoringDelivery": [{ "MonitoredStopVisit": visits }]
                }}
            }),
        )
        .unwrap()
    }

    fn visit(line: &str, call: Value) -> Value {
        json!({
            "MonitoredVehicleJourney": {
                "LineRef": {"value": line},
                "DestinationName": [{"value": "Boissy-Saint-Léger"}],
                "DirectionName": [{"value": "Est"}],
                "MonitoredCall": call
            }
        })
    }

    #[test]
    fn passages_basic() {
        let response = stop_monitoring(json!([visit(
            "STIF:Line::C01742:",
            json!({
                "ExpectedDepartureTime": "2024-03-15T13:04:40.000Z",
                "AimedDepartureTime": "2024-03-15T13:03:00.000Z",
                "DepartureStatus": "delayed"
            })
        )]));

        let passages = project_passages(&response, now());
        assert_eq!(passages.len(), 1);
        let p = &passages[0];
        assert_eq!(p.id, "STIF:Line::C01742:-0");
        assert_eq!(p.line_name, "RER A");
        assert_eq!(p.destination, "Boissy-Saint-Léger");
        assert_eq!(p.direction, "Est");
        assert_eq!(p.status, "delayed");
        assert_eq!(p.waiting_time, Some(5));
        assert!(p.aimed_time.is_some());
    }

    #[test]
    fn passages_fallbacks() {
        let response = stop_monitoring(json!([
            {
                "MonitoredVehicleJourney": {
                    "LineRef": {"value": "STIF:Line::C01371:"},
                    "MonitoredCall": {
                        "ExpectedDepartureTime": "",
                        "ExpectedArrivalTime": "2024-03-15T12:58:00Z",
                        "ArrivalStatus": "onTime"
                    }
                }
            },
            visit("STIF:Line::C01371:", json!({}))
        ]));

        let passages = project_passages(&response, now());
        assert_eq!(passages[0].destination, "Terminus");
        assert_eq!(passages[0].direction, "");
        assert_eq!(passages[0].status, "onTime");
        // Already gone: clamped
        assert_eq!(passages[0].waiting_time, Some(0));

        assert_eq!(passages[1].id, "STIF:Line::C01371:-1");
        assert_eq!(passages[1].status, "noReport");
        assert_eq!(passages[1].expected_time, None);
        assert_eq!(passages[1].waiting_time, None);
    }

    #[test]
    fn passages_empty_delivery() {
        let response: StopMonitoringResponse = schema::validate(
            &STOP_MONITORING,
            json!({
                "Siri": { "ServiceDelivery": {
                    "ResponseTimestamp": "2024-03-15T13:00:00Z",
                    "StopMonitoringDelivery": [{}]
                }}
            }),
        )
        .unwrap();
        assert!(project_passages(&response, now()).is_empty());
    }

    #[test]
    fn unparseable_expected_time_is_unknown() {
        let response = stop_monitoring(json!([visit(
            "C01742",
            json!({"ExpectedDepartureTime": "not a date"})
        )]));
        let passages = project_passages(&response, now());
        assert_eq!(passages[0].expected_time, None);
        assert_eq!(passages[0].waiting_time, None);
    }

    fn disruption(id: &str, status: &str, effect: &str, lines: &[(&str, &str)]) -> Value {
        let impacted: Vec<Value> = lines
            .iter()
            .map(|(line_id, code)| {
                json!({
                    "pt_object": {
                        "id": line_id,
                        "name": format!("Ligne {code}"),
                        "embedded_type": "line",
                        "line": {"id": line_id, "name": format!("Ligne {code}"), "code": code}
                    }
                })
            })
            .collect();
        json!({
            "id": id,
            "status": status,
            "severity": {"name": "s", "effect": effect},
            "impacted_objects": impacted
        })
    }

    fn traffic(data: Value) -> TrafficResponse {
        schema::validate(&TRAFFIC, data).unwrap()
    }

    #[test]
    fn traffic_from_line_reports() {
        let response = traffic(json!({
            "disruptions": [
                disruption("d1", "active", "NO_SERVICE", &[("line:IDFM:C01742", "A")]),
                disruption("d2", "active", "SIGNIFICANT_DELAYS", &[("line:IDFM:C01742", "A")]),
                disruption("d3", "active", "REDUCED_SERVICE", &[("line:IDFM:C01743", "B")])
            ],
            "line_reports": [
                {"line": {"id": "line:IDFM:C01742", "name": "RER A", "code": "A", "color": "E3051C"}},
                {"line": {"id": "line:IDFM:C01371", "name": "Métro 1", "code": "1"}}
            ]
        }));

        let infos = project_traffic(&response, now());
        assert_eq!(infos.len(), 2);

        assert_eq!(infos[0].line_id, "line:IDFM:C01742");
        assert_eq!(infos[0].status(), LineStatus::Interrompu);
        assert_eq!(infos[0].line_color, "#E3051C");
        assert_eq!(infos[0].disruptions().len(), 2);

        // Line report without color falls back to the palette
        assert_eq!(infos[1].status(), LineStatus::Normal);
        assert_eq!(infos[1].line_color, "#FFCE00");
        assert!(infos[1].disruptions().is_empty());
    }

    #[test]
    fn traffic_rebuilt_from_disruptions() {
        let response = traffic(json!({
            "disruptions": [
                disruption("d1", "future", "NO_SERVICE", &[("line:IDFM:C01743", "B")]),
                disruption("d2", "active", "REDUCED_SERVICE", &[
                    ("line:IDFM:C01742", "A"),
                    ("line:IDFM:C01743", "B"),
                    ("line:IDFM:C01742", "A")
                ]),
                disruption("d3", "active", "DETOUR", &[("line:IDFM:C99999", "ZZ")])
            ]
        }));

        let infos = project_traffic(&response, now());
        let ids: Vec<_> = infos.iter().map(|i| i.line_id.as_str()).collect();
        assert_eq!(ids, ["line:IDFM:C01743", "line:IDFM:C01742", "line:IDFM:C99999"]);

        let b = &infos[0];
        assert_eq!(b.status(), LineStatus::Perturbe);
        let b_ids: Vec<_> = b.disruptions().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(b_ids, ["d1", "d2"]);

        let a = &infos[1];
        assert_eq!(a.disruptions().len(), 1);
        assert_eq!(a.line_code, "A");

        let unknown = &infos[2];
        assert_eq!(unknown.status(), LineStatus::Normal);
        assert_eq!(unknown.line_color, "#808080");
    }

    #[test]
    fn traffic_ignores_non_line_objects() {
        let response = traffic(json!({
            "disruptions": [{
                "id": "d1",
                "status": "active",
                "severity": {"name": "s", "effect": "NO_SERVICE"},
                "impacted_objects": [{"pt_object": {"id": "stop_area:IDFM:1", "name": "Châtelet", "embedded_type": "stop_area"}}]
            }]
        }));
        assert!(project_traffic(&response, now()).is_empty());
    }

    #[test]
    fn incident_from_disruption() {
        let response = traffic(json!({
            "disruptions": [{
                "id": "d1",
                "status": "active",
                "severity": {"name": "perturbée", "effect": "DETOUR"},
                "cause": "Colis suspect",
                "updated_at": "20240315T131000",
                "messages": [
                    {"text": "Message agent", "channel": {"name": "email"}},
                    {"text": "Bus déviés, arrêt Nation non desservi", "channel": {"name": "web"}}
                ],
                "application_periods": [{"begin": "20240315T130000"}],
                "impacted_objects": [
                    {"pt_object": {"id": "line:IDFM:C01371", "name": "Métro 1", "embedded_type": "line"}},
                    {"pt_object": {"id": "stop_point:IDFM:22092", "name": "Nation", "embedded_type": "stop_point"}}
                ]
            }]
        }));

        let incidents = project_incidents(&response, Some("1"), now());
        assert_eq!(incidents.len(), 1);
        let incident = &incidents[0];
        assert_eq!(incident.title, "perturbée");
        assert_eq!(incident.message, "Bus déviés, arrêt Nation non desservi");
        assert_eq!(incident.category, IncidentCategory::Intrusion);
        assert_eq!(incident.severity, Severity::Warning);
        assert_eq!(incident.status, IncidentStatus::Active);
        assert_eq!(incident.affected_lines, ["Métro 1", "Nation", "1"]);
        assert_eq!(incident.affected_stops, ["stop_point:IDFM:22092"]);
        assert_eq!(incident.start_time, parse_timestamp("2024-03-15T12:00:00Z").unwrap());
        assert_eq!(incident.end_time, None);
        assert_eq!(incident.last_update, parse_timestamp("2024-03-15T12:10:00Z").unwrap());
        assert_eq!(incident.cause.as_deref(), Some("Colis suspect"));
        assert_eq!(incident.impact, "Déviation");
        assert_eq!(incident.source, IncidentSource::Prim);
    }

    #[test]
    fn incident_defaults() {
        let response = traffic(json!({
            "disruptions": [{
                "id": "d2",
                "status": "past",
                "severity": {"name": ""},
                "impacted_objects": [{"pt_object": {"id": "line:IDFM:C01742", "name": "RER A"}}]
            }]
        }));

        let incident = &project_incidents(&response, Some("RER A"), now())[0];
        assert_eq!(incident.title, "Information trafic");
        assert_eq!(incident.message, "Perturbation en cours");
        assert_eq!(incident.category, IncidentCategory::Other);
        assert_eq!(incident.severity, Severity::Info);
        assert_eq!(incident.status, IncidentStatus::Resolved);
        assert_eq!(incident.affected_lines, ["RER A"]);
        assert!(incident.affected_stops.is_empty());
        assert_eq!(incident.start_time, now());
        assert_eq!(incident.last_update, now());
        assert_eq!(incident.impact, "Information");
    }

    #[test]
    fn incidents_of_empty_response() {
        assert!(project_incidents(&traffic(json!({})), None, now()).is_empty());
    }

    #[test]
    fn simplified_disruption_defaults() {
        let response = traffic(json!({
            "disruptions": [{
                "id": "d1",
                "status": "past",
                "severity": {"name": "info"},
                "messages": [{"text": ""}],
                "application_periods": [{"end": "20240316T050000"}],
                "impacted_objects": [{"pt_object": {"id": "x", "name": "Gare de Lyon"}}]
            }]
        }));
        let d = &response.disruptions.as_ref().unwrap()[0];
        let s = simplify_disruption(d, now());
        assert_eq!(s.title, "Information trafic");
        assert_eq!(s.message, "Perturbation en cours");
        assert_eq!(s.severity, Severity::Info);
        assert_eq!(s.start_time, now());
        assert_eq!(s.end_time, parse_timestamp("2024-03-16T04:00:00Z"));
        assert_eq!(s.affected_lines, ["Gare de Lyon"]);
        assert_eq!(s.status, DisruptionStatus::Past);
    }

    #[test]
    fn simplified_disruption_prefers_message_then_cause() {
        let response = traffic(json!({
            "disruptions": [
                {
                    "id": "d1", "status": "active",
                    "severity": {"name": "s", "effect": "SIGNIFICANT_DELAYS"},
                    "category": "Travaux",
                    "cause": "travaux",
                    "messages": [{"text": "Trafic ralenti"}, {"text": "second"}],
                    "application_periods": [{"begin": "20240315T060000", "end": "20240315T230000"}]
                },
                {
                    "id": "d2", "status": "active",
                    "severity": {"name": "s"},
                    "cause": "Incident technique"
                }
            ]
        }));
        let ds = response.disruptions.as_ref().unwrap();
        let first = simplify_disruption(&ds[0], now());
        assert_eq!(first.title, "Travaux");
        assert_eq!(first.message, "Trafic ralenti");
        assert_eq!(first.severity, Severity::Warning);
        assert_eq!(first.start_time, parse_timestamp("2024-03-15T05:00:00Z").unwrap());

        let second = simplify_disruption(&ds[1], now());
        assert_eq!(second.message, "Incident technique");
    }

    #[test]
    fn screen_messages() {
        let response: GeneralMessageResponse = schema::validate(
            &GENERAL_MESSAGE,
            json!({
                "Siri": { "ServiceDelivery": {
                    "ResponseTimestamp": "2024-03-15T13:00:00Z",
                    "GeneralMessageDelivery": [{
                        "InfoMessage": [
                            {
                                "RecordedAtTime": "2024-03-15T12:00:00Z",
                                "InfoMessageIdentifier": {"value": "IDFM:msg:1"},
                                "InfoChannelRef": {"value": "Perturbation"},
                                "ValidUntilTime": "2024-03-15T23:00:00Z",
                                "Content": {
                                    "Message": [{"MessageType": "TEXT_ONLY", "MessageText": {"value": "Travaux ce soir"}}],
                                    "LineRef": [{"value": "STIF:Line::C01742:"}, {"value": "STIF:Line::C01843:"}]
                                }
                            },
                            {
                                "RecordedAtTime": "garbage",
                                "InfoMessageIdentifier": "IDFM:msg:2",
                                "InfoChannelRef": "Travaux",
                                "Content": {
                                    "Message": [{"MessageType": "SHORT_MESSAGE", "MessageText": {"value": "Court"}}]
                                }
                            }
                        ]
                    }]
                }}
            }),
        )
        .unwrap();

        let messages = project_screen_messages(&response);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "IDFM:msg:1");
        assert_eq!(messages[0].channel, MessageChannel::Perturbation);
        assert_eq!(messages[0].message, "Travaux ce soir");
        assert_eq!(messages[0].affected_lines, ["RER A", "T4"]);
        assert!(messages[0].valid_until.is_some());

        assert_eq!(messages[1].channel, MessageChannel::Other("Travaux".into()));
        assert_eq!(messages[1].recorded_at, None);
        assert!(messages[1].affected_lines.is_empty());
    }

    fn places() -> PlacesResponse {
        let mut list = vec![
            json!({"id": "city:75056", "name": "Paris", "type": "City"}),
            json!({"id": "address:1", "name": "1 rue de Rivoli", "type": "Address"}),
            json!({
                "id": "stop_area:IDFM:71264", "name": "Châtelet", "type": "StopArea",
                "city": "Paris", "x": 2.347, "y": 48.858,
                "lines": [{"id": "line:IDFM:C01371", "shortName": "1"}, {"id": "line:IDFM:C01742"}]
            }),
            json!({
                "id": "line:IDFM:C01742", "name": "RER A", "type": "Line",
                "shortName": "A", "color": "E3051C",
                "mode": [{"id": "physical_mode:RapidTransit", "name": "RER"}]
            }),
        ];
        for i in 0..12 {
            list.push(json!({"id": format!("stop_area:IDFM:{i}"), "name": format!("Arrêt {i}"), "type": "StopArea", "x": 2.0}));
        }
        schema::validate(&PLACES, json!({"places": list})).unwrap()
    }

    #[test]
    fn search_filters_and_caps() {
        let response = places();

        let all = project_search(&response, SearchKind::All);
        assert_eq!(all.len(), MAX_SEARCH_RESULTS);
        assert!(all.iter().all(|r| !r.id().starts_with("city") && !r.id().starts_with("address")));

        let lines = project_search(&response, SearchKind::Line);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            SearchResult::Line {
                id: "line:IDFM:C01742".into(),
                name: "RER A".into(),
                code: Some("A".into()),
                color: Some("#E3051C".into()),
                mode: Some(TransportMode::Rer),
            }
        );

        let stops = project_search(&response, SearchKind::Stop);
        assert_eq!(stops.len(), MAX_SEARCH_RESULTS);
        assert!(stops.iter().all(|r| r.kind() == SearchKind::Stop));
    }

    #[test]
    fn search_stop_axis_swap() {
        let stops = project_search(&places(), SearchKind::Stop);
        let SearchResult::Stop {
            numeric_id,
            coords,
            lines,
            city,
            ..
        } = &stops[0]
        else {
            panic!("expected a stop");
        };
        assert_eq!(numeric_id, "71264");
        assert_eq!(coords, &Some(Coords { lat: 48.858, lon: 2.347 }));
        assert_eq!(lines, &["1", "line:IDFM:C01742"]);
        assert_eq!(city.as_deref(), Some("Paris"));

        // Only one axis: no coordinates
        let SearchResult::Stop { coords, .. } = &stops[1] else {
            panic!("expected a stop");
        };
        assert_eq!(coords, &None);
    }

    #[test]
    fn line_stops_dedup_keeps_first() {
        let response: LineStopsResponse = schema::validate(
            &LINE_STOPS,
            json!({
                "stop_points": [
                    {"id": "stop_point:IDFM:22092", "name": "Nation", "coord": {"lat": "48.848", "lon": "2.395"}},
                    {"id": "stop_point:IDFM:22089", "name": "Châtelet", "coord": {"lat": "48.858", "lon": "2.347"}},
                    {"id": "stop_point:IDFM:22090", "name": "Châtelet", "coord": {"lat": "48.859", "lon": "2.348"}},
                    {"id": "stop_point:IDFM:monomodalStopPlace:47918", "name": "Étoile", "coord": {"lat": "x", "lon": "2.29"}}
                ]
            }),
        )
        .unwrap();

        let stops = project_line_stops(&response);
        let names: Vec<_> = stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Châtelet", "Étoile", "Nation"]);
        assert_eq!(stops[0].id, "22089");
        assert_eq!(stops[0].coords, Some(Coords { lat: 48.858, lon: 2.347 }));
        assert_eq!(stops[1].id, "monomodalStopPlace:47918");
        assert_eq!(stops[1].coords, None);
    }

    #[test]
    fn line_stop_ids_canonicalize_back() {
        let stop = crate::domain::CanonicalStop::parse("monomodalStopPlace:47918");
        assert_eq!(stop.graph_ref, "stop_point:IDFM:monomodalStopPlace:47918");
    }
}
