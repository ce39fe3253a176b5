//! Domain types for the transit board.
//!
//! Identifier canonicalization and line naming are total: any input string
//! yields a usable value. Everything else here is a plain value type built
//! by the projector in [`crate::prim`].

mod incident;
mod late_chance;
mod line;
mod line_stop;
mod message;
mod mode;
mod palette;
mod passage;
mod search;
mod stop;
mod time;
mod traffic;

pub use incident::{
    Incident, IncidentCategory, IncidentSource, IncidentStatus, StoredIncident, impact_label,
    incident_severity,
};
pub use late_chance::{
    AffectedFavoriteLine, LateChance, MAX_LATE_CHANCE, RiskLevel, calculate_late_chance,
    humor_quote,
};
pub use line::{CanonicalLine, LineFormat, extract_line_code, to_canonical_line};
pub use line_stop::{Coords, LineStop, collation_key, compare_names, dedup_and_sort};
pub use message::{InvalidChannel, MessageChannel, ScreenMessage};
pub use mode::{InvalidMode, TransportMode, detect_transport_mode, extract_line_display_name};
pub use palette::{DEFAULT_LINE_COLOR, line_color, palette_color, upstream_color};
pub use passage::{NO_REPORT, Passage};
pub use search::{InvalidSearchKind, MAX_SEARCH_RESULTS, SearchKind, SearchResult};
pub use stop::{CanonicalStop, StopFormat, extract_numeric_stop_id, to_canonical_stop};
pub use time::{minutes_until, parse_timestamp};
pub use traffic::{
    DisruptionStatus, Effect, LineStatus, Severity, SimplifiedDisruption, TraficInfo,
    compute_line_status,
};
