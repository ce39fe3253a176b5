//! Incidents: disruptions as a rider's incident history records them.
//!
//! An incident carries more than a [`SimplifiedDisruption`](super::SimplifiedDisruption):
//! a category guessed from the French wording of the message, a human impact
//! label and a resolution state. Severity is also coarser-grained here: any
//! change to the route a rider takes is a warning.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traffic::{Effect, Severity};

/// What caused an incident, as far as the message text tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IncidentCategory {
    #[serde(rename = "technique")]
    Technical,
    #[serde(rename = "voyageur_malade")]
    Passenger,
    #[serde(rename = "intrusion_voies")]
    Intrusion,
    #[serde(rename = "mouvement_social")]
    Strike,
    #[serde(rename = "conditions_meteo")]
    Weather,
    #[serde(rename = "alerte_securite")]
    Security,
    #[serde(rename = "travaux")]
    Maintenance,
    #[serde(rename = "autre")]
    Other,
}

/// Keywords per category, checked in this order; the first hit wins.
const CATEGORY_KEYWORDS: [(IncidentCategory, &[&str]); 7] = [
    (
        IncidentCategory::Passenger,
        &["voyageur malade", "malaise", "personne sur", "personne blessée"],
    ),
    (
        IncidentCategory::Intrusion,
        &["intrusion", "colis suspect", "bagages abandonné"],
    ),
    (
        IncidentCategory::Strike,
        &["mouvement social", "grève", "préavis"],
    ),
    (
        IncidentCategory::Weather,
        &["intempéries", "météo", "inondation", "neige", "verglas"],
    ),
    (
        IncidentCategory::Security,
        &["alerte", "sécurité", "intervention police"],
    ),
    (
        IncidentCategory::Maintenance,
        &["travaux", "maintenance", "rénovation"],
    ),
    (
        IncidentCategory::Technical,
        &[
            "panne",
            "défaillance",
            "incident technique",
            "problème électrique",
            "problème de signalisation",
        ],
    ),
];

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 8] = [
        IncidentCategory::Technical,
        IncidentCategory::Passenger,
        IncidentCategory::Intrusion,
        IncidentCategory::Strike,
        IncidentCategory::Weather,
        IncidentCategory::Security,
        IncidentCategory::Maintenance,
        IncidentCategory::Other,
    ];

    /// Guess the category from a message and its optional upstream cause.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_board::domain::IncidentCategory;
    ///
    /// let category = IncidentCategory::detect("Trafic interrompu", Some("Malaise voyageur"));
    /// assert_eq!(category, IncidentCategory::Passenger);
    /// assert_eq!(IncidentCategory::detect("Bonne journée", None), IncidentCategory::Other);
    /// ```
    pub fn detect(message: &str, cause: Option<&str>) -> Self {
        let text = format!("{message} {}", cause.unwrap_or_default()).to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map_or(IncidentCategory::Other, |(category, _)| *category)
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentCategory::Technical => "technique",
            IncidentCategory::Passenger => "voyageur_malade",
            IncidentCategory::Intrusion => "intrusion_voies",
            IncidentCategory::Strike => "mouvement_social",
            IncidentCategory::Weather => "conditions_meteo",
            IncidentCategory::Security => "alerte_securite",
            IncidentCategory::Maintenance => "travaux",
            IncidentCategory::Other => "autre",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            IncidentCategory::Technical => "Technique",
            IncidentCategory::Passenger => "Voyageur Malade",
            IncidentCategory::Intrusion => "Intrusion",
            IncidentCategory::Strike => "Mouvement Social",
            IncidentCategory::Weather => "Météo",
            IncidentCategory::Security => "Sécurité",
            IncidentCategory::Maintenance => "Travaux",
            IncidentCategory::Other => "Autre",
        }
    }
}

impl fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of an incident.
///
/// Unlike [`Effect::severity`], detours, modified service and moved stops
/// are warnings.
pub fn incident_severity(effect: Option<Effect>) -> Severity {
    match effect {
        Some(Effect::NoService) => Severity::Critical,
        Some(
            Effect::SignificantDelays
            | Effect::ReducedService
            | Effect::Detour
            | Effect::ModifiedService
            | Effect::StopMoved,
        ) => Severity::Warning,
        _ => Severity::Info,
    }
}

/// What an effect means for riders, in French.
pub fn impact_label(effect: Option<Effect>) -> &'static str {
    match effect {
        Some(Effect::NoService) => "Trafic interrompu",
        Some(Effect::SignificantDelays) => "Retards importants",
        Some(Effect::ReducedService) => "Service réduit",
        Some(Effect::Detour) => "Déviation",
        Some(Effect::ModifiedService) => "Service modifié",
        Some(Effect::StopMoved) => "Arrêt déplacé",
        Some(Effect::AdditionalService) => "Service supplémentaire",
        _ => "Information",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Active,
    Resolved,
}

/// Where an incident was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSource {
    Prim,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub message: String,
    pub category: IncidentCategory,
    pub severity: Severity,
    pub status: IncidentStatus,
    /// Impacted object names, plus the line the incident was fetched for.
    pub affected_lines: Vec<String>,
    /// Graph ids of impacted stop points.
    pub affected_stops: Vec<String>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub last_update: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    pub impact: String,
    pub source: IncidentSource,
}

impl Incident {
    /// Freeze this incident for the history.
    ///
    /// A resolved incident with a known end gets a resolution time and a
    /// duration measured from its start.
    pub fn into_stored(self) -> StoredIncident {
        let resolved_at = match self.status {
            IncidentStatus::Resolved => self.end_time,
            IncidentStatus::Active => None,
        };
        let duration_ms = resolved_at.map(|end| (end - self.start_time).num_milliseconds());

        StoredIncident {
            incident: self,
            resolved_at,
            duration_ms,
            archived: false,
        }
    }
}

/// An incident as kept in a rider's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIncident {
    #[serde(flatten)]
    pub incident: Incident,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub archived: bool,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Detection never panics and is stable.
        #[test]
        fn detect_is_deterministic(message in "\\PC{0,60}", cause in proptest::option::of("\\PC{0,30}")) {
            let first = IncidentCategory::detect(&message, cause.as_deref());
            prop_assert_eq!(first, IncidentCategory::detect(&message, cause.as_deref()));
        }

        /// A keyword anywhere in the text, in any case, selects its category
        /// unless an earlier category also matches.
        #[test]
        fn keyword_found_anywhere(
            prefix in "[a-z ]{0,20}",
            suffix in "[a-z ]{0,20}",
            index in 0..CATEGORY_KEYWORDS.len(),
        ) {
            let (category, keywords) = CATEGORY_KEYWORDS[index];
            let message = format!("{prefix}{}{suffix}", keywords[0].to_uppercase());
            let detected = IncidentCategory::detect(&message, None);
            let position = |c: IncidentCategory| CATEGORY_KEYWORDS.iter().position(|(k, _)| *k == c);
            prop_assert!(detected != IncidentCategory::Other);
            prop_assert!(position(detected) <= position(category));
        }

        /// Incident severity is never below the display severity.
        #[test]
        fn never_softer_than_display(index in 0..Effect::NAMES.len()) {
            let effect: Effect = serde_json::from_value(serde_json::json!(Effect::NAMES[index])).unwrap();
            prop_assert!(incident_severity(Some(effect)) >= effect.severity());
        }
    }
}
