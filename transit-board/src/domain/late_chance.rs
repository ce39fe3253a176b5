//! Chance of being late, from the status of a rider's favourite lines.

use std::collections::HashSet;

use serde::Serialize;

use super::traffic::{LineStatus, Severity, TraficInfo};

/// Risk added by an interrupted line.
const INTERRUPTED_RISK: u32 = 40;
/// Risk added by a disturbed line, by its worst disruption.
const CRITICAL_RISK: u32 = 30;
const WARNING_RISK: u32 = 20;
const MINOR_RISK: u32 = 5;

/// Nobody is ever certain to be late.
pub const MAX_LATE_CHANCE: u32 = 95;

/// Characters of a disruption message kept as the impact summary.
const IMPACT_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            0..20 => RiskLevel::Low,
            20..50 => RiskLevel::Moderate,
            50..75 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

/// A favourite line that is not running normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedFavoriteLine {
    pub line_id: String,
    /// Line code, e.g. `B` for RER B.
    pub line_name: String,
    pub severity: Severity,
    pub impact: String,
    pub status: LineStatus,
    #[serde(skip)]
    risk: u32,
}

impl AffectedFavoriteLine {
    /// Contribution of this line to the late chance, in percent.
    pub fn risk(&self) -> u32 {
        self.risk
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LateChance {
    /// 0 to [`MAX_LATE_CHANCE`].
    pub percentage: u32,
    pub risk: RiskLevel,
    pub affected_favorites: Vec<AffectedFavoriteLine>,
    pub recommendation: String,
    pub humor_quote: &'static str,
}

/// Assess one line. `None` when it runs normally.
fn assess(info: &TraficInfo) -> Option<AffectedFavoriteLine> {
    let worst = |severity: Severity| {
        info.disruptions()
            .iter()
            .find(|d| d.severity == severity)
            .map(|d| summarize(&d.message))
    };

    let (risk, severity, impact) = match info.status() {
        LineStatus::Normal => return None,
        LineStatus::Interrompu => (
            INTERRUPTED_RISK,
            Severity::Critical,
            "Trafic interrompu".to_string(),
        ),
        LineStatus::Perturbe => {
            if let Some(impact) = worst(Severity::Critical) {
                (CRITICAL_RISK, Severity::Critical, impact)
            } else if let Some(impact) = worst(Severity::Warning) {
                (WARNING_RISK, Severity::Warning, impact)
            } else {
                (MINOR_RISK, Severity::Info, "Perturbation mineure".to_string())
            }
        }
    };

    Some(AffectedFavoriteLine {
        line_id: info.line_id.clone(),
        line_name: info.line_code.clone(),
        severity,
        impact,
        status: info.status(),
        risk,
    })
}

fn summarize(message: &str) -> String {
    let mut impact: String = message.chars().take(IMPACT_CHARS).collect();
    impact.push_str("...");
    impact
}

/// Chance of being late given the codes of the rider's favourite lines.
///
/// Every favourite line that is not running normally adds risk; the total
/// is capped at [`MAX_LATE_CHANCE`].
pub fn calculate_late_chance<'a>(
    favorite_lines: impl IntoIterator<Item = &'a str>,
    traffic: &[TraficInfo],
) -> LateChance {
    let favorites: HashSet<&str> = favorite_lines.into_iter().collect();
    if favorites.is_empty() {
        return LateChance {
            percentage: 0,
            risk: RiskLevel::Low,
            affected_favorites: Vec::new(),
            recommendation: "Ajoutez des lignes favorites pour voir votre risque de retard."
                .to_string(),
            humor_quote: humor_quote(RiskLevel::Low, &[]),
        };
    }

    let affected: Vec<AffectedFavoriteLine> = traffic
        .iter()
        .filter(|info| favorites.contains(info.line_code.as_str()))
        .filter_map(assess)
        .collect();

    let percentage = affected
        .iter()
        .map(AffectedFavoriteLine::risk)
        .sum::<u32>()
        .min(MAX_LATE_CHANCE);
    let risk = RiskLevel::from_percentage(percentage);

    LateChance {
        percentage,
        risk,
        recommendation: recommendation(risk, &affected),
        humor_quote: humor_quote(risk, &affected),
        affected_favorites: affected,
    }
}

fn recommendation(risk: RiskLevel, affected: &[AffectedFavoriteLine]) -> String {
    match risk {
        RiskLevel::Low => "Trafic normal sur vos lignes. Bon voyage !".to_string(),
        RiskLevel::Moderate => {
            "Quelques perturbations mineures. Prévoyez quelques minutes supplémentaires."
                .to_string()
        }
        RiskLevel::High => {
            let interrupted = affected
                .iter()
                .filter(|l| l.status == LineStatus::Interrompu)
                .count();
            if interrupted > 0 {
                format!(
                    "Attention : {interrupted} ligne(s) interrompue(s). Cherchez un itinéraire alternatif."
                )
            } else {
                "Perturbations significatives. Anticipez des retards importants.".to_string()
            }
        }
        RiskLevel::Critical => {
            "Risque critique de retard. Envisagez un mode de transport alternatif.".to_string()
        }
    }
}

/// A line of comfort for the rider, RER B getting its own.
pub fn humor_quote(risk: RiskLevel, affected: &[AffectedFavoriteLine]) -> &'static str {
    let rer_b = affected.iter().any(|l| l.line_name == "B");
    match risk {
        RiskLevel::Low => "Miracle : tout fonctionne. Méfiance.",
        RiskLevel::Moderate => "Pas encore de quoi perdre son sang-froid.",
        RiskLevel::High if rer_b => "Oui, encore le RER B. Non, personne n'est surpris.",
        RiskLevel::High => "Temps de réviser votre playlist \"coincé dans le métro\".",
        RiskLevel::Critical if rer_b => "Le RER B a décidé de prendre sa journée.",
        RiskLevel::Critical => "Aujourd'hui, c'est vélo.",
    }
}
