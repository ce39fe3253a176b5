//! PRIM API response DTOs.
//!
//! These types map directly to the upstream JSON. They are only ever built
//! from payloads that already passed [`super::schema`], so required fields
//! are plain values and optional ones are `Option`. Keys not modeled here
//! are kept in each type's `extra` map.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{DisruptionStatus, Effect};

/// Unmodeled keys of an upstream object.
pub type Extra = Map<String, Value>;

/// SIRI's `{ "value": "..." }` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiriValue {
    pub value: String,
}

/// A string some producers send bare and others wrap in a [`SiriValue`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TextOrValue {
    Text(String),
    Value(SiriValue),
}

impl TextOrValue {
    pub fn as_str(&self) -> &str {
        match self {
            TextOrValue::Text(s) => s,
            TextOrValue::Value(v) => &v.value,
        }
    }
}

fn first_value(values: &Option<Vec<SiriValue>>) -> Option<&str> {
    values
        .as_ref()
        .and_then(|v| v.first())
        .map(|v| v.value.as_str())
}

// Stop monitoring

/// Response from `/stop-monitoring`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopMonitoringResponse {
    pub siri: StopMonitoringSiri,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopMonitoringSiri {
    pub service_delivery: StopMonitoringServiceDelivery,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopMonitoringServiceDelivery {
    pub response_timestamp: String,
    pub producer_ref: Option<String>,
    pub stop_monitoring_delivery: Vec<StopMonitoringDelivery>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopMonitoringDelivery {
    pub response_timestamp: Option<String>,
    /// Absent when nothing is expected at the stop.
    pub monitored_stop_visit: Option<Vec<MonitoredStopVisit>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One predicted vehicle passage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredStopVisit {
    pub monitored_vehicle_journey: MonitoredVehicleJourney,
    pub recorded_at_time: Option<String>,
    pub item_identifier: Option<String>,
    pub monitoring_ref: Option<SiriValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredVehicleJourney {
    pub line_ref: SiriValue,
    pub operator_ref: Option<SiriValue>,
    pub direction_name: Option<Vec<SiriValue>>,
    pub destination_ref: Option<SiriValue>,
    pub destination_name: Option<Vec<SiriValue>>,
    pub destination_short_name: Option<Vec<SiriValue>>,
    pub monitored_call: MonitoredCall,
    #[serde(flatten)]
    pub extra: Extra,
}

impl MonitoredVehicleJourney {
    pub fn destination(&self) -> Option<&str> {
        first_value(&self.destination_name)
    }

    pub fn direction(&self) -> Option<&str> {
        first_value(&self.direction_name)
    }
}

/// Timing and status at the monitored stop. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredCall {
    pub expected_departure_time: Option<String>,
    pub expected_arrival_time: Option<String>,
    pub aimed_departure_time: Option<String>,
    pub aimed_arrival_time: Option<String>,
    pub departure_status: Option<String>,
    pub arrival_status: Option<String>,
    pub stop_point_name: Option<Vec<SiriValue>>,
    pub vehicle_at_stop: Option<bool>,
    pub destination_display: Option<Vec<SiriValue>>,
    #[serde(flatten)]
    pub extra: Extra,
}

// Traffic

/// Response from the line-reports and bulk disruption endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrafficResponse {
    pub disruptions: Option<Vec<Disruption>>,
    pub line_reports: Option<Vec<LineReport>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Disruption {
    pub id: String,
    pub status: DisruptionStatus,
    pub severity: DisruptionSeverity,
    pub messages: Option<Vec<DisruptionMessage>>,
    pub application_periods: Option<Vec<ApplicationPeriod>>,
    pub impacted_objects: Option<Vec<ImpactedObject>>,
    pub cause: Option<String>,
    pub category: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Disruption {
    pub fn impacted(&self) -> &[ImpactedObject] {
        self.impacted_objects.as_deref().unwrap_or_default()
    }

    /// Whether some impacted object is exactly `pt_object_id`.
    pub fn impacts(&self, pt_object_id: &str) -> bool {
        self.impacted().iter().any(|o| o.pt_object.id == pt_object_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisruptionSeverity {
    pub name: String,
    pub effect: Option<Effect>,
    pub priority: Option<f64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisruptionMessage {
    pub text: String,
    pub channel: Option<MessageChannelRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageChannelRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationPeriod {
    pub begin: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImpactedObject {
    pub pt_object: PtObject,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PtObject {
    pub id: String,
    pub name: String,
    pub embedded_type: Option<String>,
    /// Present when `embedded_type` is `"line"`.
    pub line: Option<NavitiaLine>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PtObject {
    /// The embedded line, only when this object is declared to be a line.
    pub fn as_line(&self) -> Option<&NavitiaLine> {
        match self.embedded_type.as_deref() {
            Some("line") => self.line.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavitiaLine {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub physical_modes: Option<Vec<PhysicalMode>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicalMode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineReport {
    pub line: NavitiaLine,
    pub pt_objects: Option<Vec<ReportPtObject>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportPtObject {
    pub id: String,
    pub name: String,
    pub embedded_type: Option<String>,
}

// General message

/// Response from `/general-message`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeneralMessageResponse {
    pub siri: GeneralMessageSiri,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeneralMessageSiri {
    pub service_delivery: GeneralMessageServiceDelivery,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeneralMessageServiceDelivery {
    pub response_timestamp: String,
    pub producer_ref: Option<String>,
    pub general_message_delivery: Vec<GeneralMessageDelivery>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeneralMessageDelivery {
    pub response_timestamp: Option<String>,
    pub info_message: Option<Vec<InfoMessage>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InfoMessage {
    pub recorded_at_time: String,
    pub info_message_identifier: TextOrValue,
    pub info_message_version: Option<f64>,
    pub info_channel_ref: TextOrValue,
    pub valid_until_time: Option<String>,
    pub content: InfoMessageContent,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InfoMessageContent {
    pub message: Vec<InfoMessageText>,
    pub line_ref: Option<Vec<SiriValue>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InfoMessageText {
    pub message_type: String,
    pub message_text: SiriValue,
}

// Places

/// Response from `/places`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacesResponse {
    pub places: Option<Vec<Place>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PlaceType {
    StopArea,
    City,
    Address,
    Line,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PlaceType,
    pub quality: Option<f64>,
    /// Longitude.
    pub x: Option<f64>,
    /// Latitude.
    pub y: Option<f64>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub lines: Option<Vec<PlaceLine>>,
    pub short_name: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub mode: Option<Vec<PhysicalMode>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A line serving a stop-area place.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceLine {
    pub id: String,
    pub short_name: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub mode: Option<Vec<PhysicalMode>>,
}

// Line stops

/// Response from `/lines/{ref}/stop_points`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineStopsResponse {
    pub stop_points: Option<Vec<NavitiaStopPoint>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavitiaStopPoint {
    pub id: String,
    pub name: String,
    pub coord: Option<NavitiaCoord>,
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Navitia sends coordinates as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NavitiaCoord {
    pub lat: String,
    pub lon: String,
}
