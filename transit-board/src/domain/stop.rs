//! Stop identifier canonicalization.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Legacy SIRI wire prefix for stop points.
const LEGACY_STOP_PREFIX: &str = "STIF:StopPoint:Q:";

/// Graph (Navitia) prefix for stop points.
const GRAPH_STOP_PREFIX: &str = "stop_point:IDFM:";

/// Marker for monomodal stop places, kept verbatim in graph references.
const MONOMODAL_PREFIX: &str = "monomodalStopPlace:";

static LEGACY_STOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^STIF:StopPoint:Q:([0-9]+):$").expect("valid regex"));

static AREA_GRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^stop_area:IDFM:([0-9]+)$").expect("valid regex"));

static POINT_GRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^stop_point:IDFM:(monomodalStopPlace:)?([0-9]+)$").expect("valid regex")
});

static MONOMODAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^monomodalStopPlace:([0-9]+)$").expect("valid regex"));

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

static ANY_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

static LEGACY_WRAPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^STIF:StopPoint:Q:(.*):$").expect("valid regex"));

/// Which encoding a stop identifier arrived in.
///
/// Variants are listed in detection order; the first matching pattern wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopFormat {
    /// `STIF:StopPoint:Q:22089:`
    Legacy,
    /// `stop_area:IDFM:71264`
    AreaGraph,
    /// `stop_point:IDFM:22089`
    PointGraph,
    /// `stop_point:IDFM:monomodalStopPlace:47918`
    PointGraphMonomodal,
    /// `monomodalStopPlace:47918`
    Monomodal,
    /// `22089`
    Numeric,
    /// Anything else. The numeric id is a best-effort extraction.
    Unrecognized,
}

impl StopFormat {
    /// Whether the graph reference keeps the monomodal marker.
    pub fn is_monomodal(self) -> bool {
        matches!(self, StopFormat::PointGraphMonomodal | StopFormat::Monomodal)
    }
}

/// One physical stop, independent of the encoding that named it.
///
/// Construction never fails: unrecognized input degrades to a best-effort
/// numeric id so that callers can still build upstream requests from it.
///
/// # Examples
///
/// ```
/// use transit_board::domain::CanonicalStop;
///
/// let stop = CanonicalStop::parse("22089");
/// assert_eq!(stop.numeric_id, "22089");
/// assert_eq!(stop.legacy_ref, "STIF:StopPoint:Q:22089:");
/// assert_eq!(stop.graph_ref, "stop_point:IDFM:22089");
///
/// let same = CanonicalStop::parse("stop_point:IDFM:22089");
/// assert_eq!(stop, same);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalStop {
    /// Stable identity: the digits shared by every encoding.
    pub numeric_id: String,
    /// Legacy wire form, `STIF:StopPoint:Q:{id}:`.
    pub legacy_ref: String,
    /// Graph form, `stop_point:IDFM:{id}` (monomodal marker preserved).
    pub graph_ref: String,
    /// Set only when the input was an area-level reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_ref: Option<String>,
    /// Detected encoding of the input.
    pub format: StopFormat,
    /// The input exactly as given, untrimmed.
    pub original: String,
}

impl CanonicalStop {
    /// Canonicalize any supported stop identifier.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let (format, numeric_id) = detect(trimmed);

        let graph_ref = if format.is_monomodal() {
            format!("{GRAPH_STOP_PREFIX}{MONOMODAL_PREFIX}{numeric_id}")
        } else {
            format!("{GRAPH_STOP_PREFIX}{numeric_id}")
        };

        let area_ref = (format == StopFormat::AreaGraph).then(|| trimmed.to_string());

        Self {
            legacy_ref: format!("{LEGACY_STOP_PREFIX}{numeric_id}:"),
            graph_ref,
            area_ref,
            format,
            numeric_id,
            original: input.to_string(),
        }
    }

    /// Reference to send as `MonitoringRef` to the stop-monitoring endpoint.
    ///
    /// Monomodal places are only known upstream under their graph form.
    pub fn monitoring_ref(&self) -> &str {
        if self.format.is_monomodal() {
            &self.graph_ref
        } else {
            &self.legacy_ref
        }
    }
}

/// Two canonical stops are the same stop when their numeric ids agree.
impl PartialEq for CanonicalStop {
    fn eq(&self, other: &Self) -> bool {
        self.numeric_id == other.numeric_id
    }
}

impl Eq for CanonicalStop {}

impl std::hash::Hash for CanonicalStop {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.numeric_id.hash(state);
    }
}

impl fmt::Display for CanonicalStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.legacy_ref)
    }
}

/// Canonicalize a stop identifier. Shorthand for [`CanonicalStop::parse`].
pub fn to_canonical_stop(input: &str) -> CanonicalStop {
    CanonicalStop::parse(input)
}

/// Extract the numeric id from any stop identifier.
pub fn extract_numeric_stop_id(input: &str) -> String {
    detect(input.trim()).1
}

fn capture(re: &Regex, s: &str, group: usize) -> Option<String> {
    re.captures(s)
        .and_then(|c| c.get(group))
        .map(|m| m.as_str().to_string())
}

fn detect(trimmed: &str) -> (StopFormat, String) {
    if let Some(id) = capture(&LEGACY_STOP, trimmed, 1) {
        return (StopFormat::Legacy, id);
    }

    if let Some(id) = capture(&AREA_GRAPH, trimmed, 1) {
        return (StopFormat::AreaGraph, id);
    }

    if let Some(caps) = POINT_GRAPH.captures(trimmed) {
        let format = if caps.get(1).is_some() {
            StopFormat::PointGraphMonomodal
        } else {
            StopFormat::PointGraph
        };
        return (format, caps[2].to_string());
    }

    if let Some(id) = capture(&MONOMODAL, trimmed, 1) {
        return (StopFormat::Monomodal, id);
    }

    if NUMERIC.is_match(trimmed) {
        return (StopFormat::Numeric, trimmed.to_string());
    }

    if let Some(digits) = ANY_DIGITS.find(trimmed) {
        return (StopFormat::Unrecognized, digits.as_str().to_string());
    }

    // No digits anywhere. Unwrap one level of the legacy template so that
    // re-canonicalizing a synthesized legacy ref yields the same id.
    let id = capture(&LEGACY_WRAPPED, trimmed, 1).unwrap_or_else(|| trimmed.to_string());
    (StopFormat::Unrecognized, id)
}
