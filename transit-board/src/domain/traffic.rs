//! Line traffic status and simplified disruptions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an upstream disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisruptionStatus {
    Active,
    Past,
    Future,
}

/// Upstream severity effect of a disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    NoService,
    ReducedService,
    SignificantDelays,
    Detour,
    AdditionalService,
    ModifiedService,
    OtherEffect,
    UnknownEffect,
    StopMoved,
}

impl Effect {
    /// Wire names, in the order upstream documents them.
    pub const NAMES: [&'static str; 9] = [
        "NO_SERVICE",
        "REDUCED_SERVICE",
        "SIGNIFICANT_DELAYS",
        "DETOUR",
        "ADDITIONAL_SERVICE",
        "MODIFIED_SERVICE",
        "OTHER_EFFECT",
        "UNKNOWN_EFFECT",
        "STOP_MOVED",
    ];

    /// Three-level severity shown to riders.
    pub fn severity(self) -> Severity {
        match self {
            Effect::NoService => Severity::Critical,
            Effect::SignificantDelays | Effect::ReducedService => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

/// Severity of a single disruption as displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Severity for an optional effect; no effect means informational.
    pub fn from_effect(effect: Option<Effect>) -> Self {
        effect.map_or(Severity::Info, Effect::severity)
    }
}

/// Aggregate status of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Normal,
    Perturbe,
    Interrompu,
}

impl LineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LineStatus::Normal => "normal",
            LineStatus::Perturbe => "perturbe",
            LineStatus::Interrompu => "interrompu",
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate the status of a line from its disruptions.
///
/// Only active disruptions count. Any active `NO_SERVICE` interrupts the line,
/// otherwise any active `SIGNIFICANT_DELAYS` or `REDUCED_SERVICE` disturbs it.
/// Order of the input is irrelevant.
pub fn compute_line_status<I>(disruptions: I) -> LineStatus
where
    I: IntoIterator<Item = (DisruptionStatus, Option<Effect>)>,
{
    disruptions
        .into_iter()
        .filter(|(status, _)| *status == DisruptionStatus::Active)
        .map(|(_, effect)| match effect {
            Some(Effect::NoService) => LineStatus::Interrompu,
            Some(Effect::SignificantDelays | Effect::ReducedService) => LineStatus::Perturbe,
            _ => LineStatus::Normal,
        })
        .max()
        .unwrap_or(LineStatus::Normal)
}

/// A disruption reduced to what a status board shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedDisruption {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Names of the impacted objects, as upstream labels them.
    pub affected_lines: Vec<String>,
    /// Upstream lifecycle, kept so line status stays derivable.
    pub status: DisruptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

/// Traffic status of one line with the disruptions behind it.
///
/// The status is always computed from the disruptions; there is no way to
/// set it independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraficInfo {
    pub line_id: String,
    pub line_name: String,
    pub line_code: String,
    pub line_color: String,
    status: LineStatus,
    disruptions: Vec<SimplifiedDisruption>,
}

impl TraficInfo {
    pub fn new(
        line_id: impl Into<String>,
        line_name: impl Into<String>,
        line_code: impl Into<String>,
        line_color: impl Into<String>,
        disruptions: Vec<SimplifiedDisruption>,
    ) -> Self {
        let status = compute_line_status(disruptions.iter().map(|d| (d.status, d.effect)));
        Self {
            line_id: line_id.into(),
            line_name: line_name.into(),
            line_code: line_code.into(),
            line_color: line_color.into(),
            status,
            disruptions,
        }
    }

    pub fn status(&self) -> LineStatus {
        self.status
    }

    pub fn disruptions(&self) -> &[SimplifiedDisruption] {
        &self.disruptions
    }
}
