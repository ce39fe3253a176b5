//! Structural validation of upstream payloads.
//!
//! Each upstream response is checked against a [`Shape`] before it is
//! deserialized into the DTOs in [`super::types`]. Shapes are strict about
//! the fields the projector reads and open about everything else: unknown
//! keys are never an error and survive into the DTOs' `extra` maps.
//!
//! Validation collects every issue instead of stopping at the first one, so
//! a drifting upstream contract is reported in full.

use std::fmt;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::Effect;

/// One structural problem, located by a dotted path with `[i]` indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub reason: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// The complete, non-empty list of issues found in one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssues(Vec<ValidationIssue>);

impl ValidationIssues {
    /// `None` when there is nothing to report.
    pub fn from_vec(issues: Vec<ValidationIssue>) -> Option<Self> {
        (!issues.is_empty()).then_some(Self(issues))
    }

    pub fn single(issue: ValidationIssue) -> Self {
        Self(vec![issue])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.0.iter()
    }

    /// Whether some issue sits exactly at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.0.iter().any(|i| i.path == path)
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationIssues {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Expected structure of a JSON value.
#[derive(Debug, Clone)]
pub enum Shape {
    String,
    Number,
    Bool,
    /// A string from a fixed set.
    Enum(&'static [&'static str]),
    Array { item: Box<Shape>, min_len: usize },
    /// An object with known fields; other keys are allowed and ignored.
    Object(Vec<Field>),
    /// Any one of several shapes.
    Union(Vec<Shape>),
}

/// A known key of an object shape.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    shape: Shape,
    required: bool,
}

impl Field {
    pub fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: true,
        }
    }

    /// May be absent. When present it must match, so `null` is rejected.
    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

impl Shape {
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Shape::Object(fields.into_iter().collect())
    }

    pub fn array(item: Shape) -> Self {
        Shape::Array {
            item: Box::new(item),
            min_len: 0,
        }
    }

    pub fn non_empty_array(item: Shape) -> Self {
        Shape::Array {
            item: Box::new(item),
            min_len: 1,
        }
    }

    fn describe(&self) -> String {
        match self {
            Shape::String => "string".to_string(),
            Shape::Number => "number".to_string(),
            Shape::Bool => "boolean".to_string(),
            Shape::Enum(allowed) => format!("one of {}", allowed.join("|")),
            Shape::Array { .. } => "array".to_string(),
            Shape::Object(_) => "object".to_string(),
            Shape::Union(options) => options
                .iter()
                .map(Shape::describe)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }

    fn mismatch(&self, path: &str, value: &Value, issues: &mut Vec<ValidationIssue>) {
        issues.push(ValidationIssue::new(
            path,
            format!("expected {}, received {}", self.describe(), kind(value)),
        ));
    }

    fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
        match self {
            Shape::String if value.is_string() => {}
            Shape::Number if value.is_number() => {}
            Shape::Bool if value.is_boolean() => {}
            Shape::String | Shape::Number | Shape::Bool => self.mismatch(path, value, issues),
            Shape::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => {}
                Some(s) => issues.push(ValidationIssue::new(
                    path,
                    format!("expected {}, received \"{s}\"", self.describe()),
                )),
                None => self.mismatch(path, value, issues),
            },
            Shape::Array { item, min_len } => {
                let Some(items) = value.as_array() else {
                    return self.mismatch(path, value, issues);
                };
                if items.len() < *min_len {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("expected at least {min_len} item(s), received {}", items.len()),
                    ));
                }
                for (i, element) in items.iter().enumerate() {
                    item.check(element, &format!("{path}[{i}]"), issues);
                }
            }
            Shape::Object(fields) => {
                let Some(map) = value.as_object() else {
                    return self.mismatch(path, value, issues);
                };
                for field in fields {
                    let field_path = child(path, field.name);
                    match map.get(field.name) {
                        Some(v) => field.shape.check(v, &field_path, issues),
                        None if field.required => {
                            issues.push(ValidationIssue::new(field_path, "required"));
                        }
                        None => {}
                    }
                }
            }
            Shape::Union(options) => {
                if !options.iter().any(|o| o.accepts(value)) {
                    self.mismatch(path, value, issues);
                }
            }
        }
    }

    /// Whether `value` matches without any issue.
    pub fn accepts(&self, value: &Value) -> bool {
        let mut issues = Vec::new();
        self.check(value, "", &mut issues);
        issues.is_empty()
    }

    /// Every issue found in `value`, in document order.
    pub fn issues(&self, value: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check(value, "", &mut issues);
        issues
    }
}

/// Check `data` against `shape`, then deserialize it.
///
/// Unknown keys are kept by the target type's `extra` maps.
pub fn validate<T: DeserializeOwned>(shape: &Shape, data: Value) -> Result<T, ValidationIssues> {
    if let Some(issues) = ValidationIssues::from_vec(shape.issues(&data)) {
        return Err(issues);
    }
    // Shapes and DTOs describe the same fields; a failure here is a mismatch
    // between the two, reported like any other issue.
    serde_json::from_value(data)
        .map_err(|e| ValidationIssues::single(ValidationIssue::new("", e.to_string())))
}

// Shared pieces

/// SIRI's `{ "value": "..." }` wrapper.
fn siri_value() -> Shape {
    Shape::object([Field::required("value", Shape::String)])
}

/// A plain string, or the same string wrapped as a SIRI value.
fn text_or_value() -> Shape {
    Shape::Union(vec![Shape::String, siri_value()])
}

/// SIRI delivery status, sent as a string by some producers and a boolean by others.
fn siri_status() -> Shape {
    Shape::Union(vec![Shape::String, Shape::Bool])
}

fn physical_mode() -> Shape {
    Shape::object([
        Field::required("id", Shape::String),
        Field::required("name", Shape::String),
    ])
}

fn service_delivery(delivery_key: &'static str, delivery: Shape) -> Shape {
    Shape::object([Field::required(
        "Siri",
        Shape::object([Field::required(
            "ServiceDelivery",
            Shape::object([
                Field::required("ResponseTimestamp", Shape::String),
                Field::optional("ProducerRef", Shape::String),
                Field::optional("ResponseMessageIdentifier", Shape::String),
                Field::required(delivery_key, Shape::array(delivery)),
            ]),
        )]),
    )])
}

/// Stop-monitoring envelope (`/stop-monitoring`).
pub static STOP_MONITORING: LazyLock<Shape> = LazyLock::new(|| {
    let call = Shape::object([
        Field::optional("ExpectedDepartureTime", Shape::String),
        Field::optional("ExpectedArrivalTime", Shape::String),
        Field::optional("AimedDepartureTime", Shape::String),
        Field::optional("AimedArrivalTime", Shape::String),
        Field::optional("DepartureStatus", Shape::String),
        Field::optional("ArrivalStatus", Shape::String),
        Field::optional("StopPointName", Shape::array(siri_value())),
        Field::optional("VehicleAtStop", Shape::Bool),
        Field::optional("DestinationDisplay", Shape::array(siri_value())),
    ]);

    let journey = Shape::object([
        Field::required("LineRef", siri_value()),
        Field::optional("OperatorRef", siri_value()),
        Field::optional("DirectionName", Shape::array(siri_value())),
        Field::optional("DestinationRef", siri_value()),
        Field::optional("DestinationName", Shape::array(siri_value())),
        Field::optional("DestinationShortName", Shape::array(siri_value())),
        Field::required("MonitoredCall", call),
    ]);

    let visit = Shape::object([
        Field::required("MonitoredVehicleJourney", journey),
        Field::optional("RecordedAtTime", Shape::String),
        Field::optional("ItemIdentifier", Shape::String),
        Field::optional("MonitoringRef", siri_value()),
    ]);

    let delivery = Shape::object([
        Field::optional("ResponseTimestamp", Shape::String),
        Field::optional("Version", Shape::String),
        Field::optional("Status", siri_status()),
        Field::optional("MonitoredStopVisit", Shape::array(visit)),
    ]);

    service_delivery("StopMonitoringDelivery", delivery)
});

/// Traffic envelope (line reports and bulk disruptions).
pub static TRAFFIC: LazyLock<Shape> = LazyLock::new(|| {
    let embedded_line = Shape::object([
        Field::required("id", Shape::String),
        Field::required("name", Shape::String),
        Field::optional("code", Shape::String),
        Field::optional("color", Shape::String),
        Field::optional("text_color", Shape::String),
    ]);

    let severity = Shape::object([
        Field::required("name", Shape::String),
        Field::optional("effect", Shape::Enum(&Effect::NAMES)),
        Field::optional("priority", Shape::Number),
        Field::optional("color", Shape::String),
    ]);

    let message = Shape::object([
        Field::required("text", Shape::String),
        Field::optional(
            "channel",
            Shape::object([
                Field::optional("id", Shape::String),
                Field::optional("name", Shape::String),
            ]),
        ),
    ]);

    let period = Shape::object([
        Field::optional("begin", Shape::String),
        Field::optional("end", Shape::String),
    ]);

    let impacted = Shape::object([Field::required(
        "pt_object",
        Shape::object([
            Field::required("id", Shape::String),
            Field::required("name", Shape::String),
            Field::optional("embedded_type", Shape::String),
            Field::optional("line", embedded_line),
        ]),
    )]);

    let disruption = Shape::object([
        Field::required("id", Shape::String),
        Field::required("status", Shape::Enum(&["active", "past", "future"])),
        Field::required("severity", severity),
        Field::optional("messages", Shape::array(message)),
        Field::optional("application_periods", Shape::array(period)),
        Field::optional("impacted_objects", Shape::array(impacted)),
        Field::optional("cause", Shape::String),
        Field::optional("category", Shape::String),
        Field::optional("updated_at", Shape::String),
    ]);

    let report = Shape::object([
        Field::required(
            "line",
            Shape::object([
                Field::required("id", Shape::String),
                Field::required("name", Shape::String),
                Field::optional("code", Shape::String),
                Field::optional("color", Shape::String),
                Field::optional("text_color", Shape::String),
                Field::optional("physical_modes", Shape::array(physical_mode())),
            ]),
        ),
        Field::optional(
            "pt_objects",
            Shape::array(Shape::object([
                Field::required("id", Shape::String),
                Field::required("name", Shape::String),
                Field::optional("embedded_type", Shape::String),
            ])),
        ),
    ]);

    Shape::object([
        Field::optional("disruptions", Shape::array(disruption)),
        Field::optional("line_reports", Shape::array(report)),
    ])
});

/// Screen-message envelope (`/general-message`).
pub static GENERAL_MESSAGE: LazyLock<Shape> = LazyLock::new(|| {
    let content = Shape::object([
        Field::required(
            "Message",
            Shape::non_empty_array(Shape::object([
                Field::required("MessageType", Shape::String),
                Field::required("MessageText", siri_value()),
            ])),
        ),
        Field::optional("LineRef", Shape::array(siri_value())),
    ]);

    let info_message = Shape::object([
        Field::required("RecordedAtTime", Shape::String),
        Field::required("InfoMessageIdentifier", text_or_value()),
        Field::optional("InfoMessageVersion", Shape::Number),
        Field::required("InfoChannelRef", text_or_value()),
        Field::optional("ValidUntilTime", Shape::String),
        Field::required("Content", content),
    ]);

    let delivery = Shape::object([
        Field::optional("ResponseTimestamp", Shape::String),
        Field::optional("Version", Shape::String),
        Field::optional("Status", siri_status()),
        Field::optional("InfoMessage", Shape::array(info_message)),
    ]);

    service_delivery("GeneralMessageDelivery", delivery)
});

/// Place-search envelope (`/places`).
pub static PLACES: LazyLock<Shape> = LazyLock::new(|| {
    let place_line = Shape::object([
        Field::required("id", Shape::String),
        Field::optional("shortName", Shape::String),
        Field::optional("color", Shape::String),
        Field::optional("textColor", Shape::String),
        Field::optional("mode", Shape::array(physical_mode())),
    ]);

    let place = Shape::object([
        Field::required("id", Shape::String),
        Field::required("name", Shape::String),
        Field::required("type", Shape::Enum(&["StopArea", "City", "Address", "Line"])),
        Field::optional("quality", Shape::Number),
        Field::optional("x", Shape::Number),
        Field::optional("y", Shape::Number),
        Field::optional("city", Shape::String),
        Field::optional("zipCode", Shape::String),
        Field::optional("insee", Shape::String),
        Field::optional("lines", Shape::array(place_line)),
        Field::optional("modes", Shape::array(Shape::String)),
        Field::optional("shortName", Shape::String),
        Field::optional("color", Shape::String),
        Field::optional("textColor", Shape::String),
        Field::optional("mode", Shape::array(physical_mode())),
    ]);

    Shape::object([Field::optional("places", Shape::array(place))])
});

/// Stop points of a line (`/lines/{ref}/stop_points`).
pub static LINE_STOPS: LazyLock<Shape> = LazyLock::new(|| {
    let stop_point = Shape::object([
        Field::required("id", Shape::String),
        Field::required("name", Shape::String),
        Field::optional(
            "coord",
            Shape::object([
                Field::required("lat", Shape::String),
                Field::required("lon", Shape::String),
            ]),
        ),
        Field::optional("label", Shape::String),
    ]);

    Shape::object([Field::optional("stop_points", Shape::array(stop_point))])
});
