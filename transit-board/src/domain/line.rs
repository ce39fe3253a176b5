//! Line identifier canonicalization.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::mode::{TransportMode, detect_transport_mode, extract_line_display_name};

const GRAPH_LINE_PREFIX: &str = "line:IDFM:";

static GRAPH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^line:IDFM:([A-Z][0-9]+)$").expect("valid regex"));

static LEGACY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^STIF:Line::([A-Z][0-9]+):$").expect("valid regex"));

static BARE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]+$").expect("valid regex"));

static EMBEDDED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][0-9]+").expect("valid regex"));

/// Which encoding a line identifier arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineFormat {
    /// `line:IDFM:C01742`
    Graph,
    /// `STIF:Line::C01742:`
    Legacy,
    /// `C01742`
    Code,
    /// A code found somewhere inside an otherwise unknown string.
    Embedded,
    /// No code found at all.
    Unrecognized,
}

/// One transit line, independent of the encoding that named it.
///
/// # Examples
///
/// ```
/// use transit_board::domain::{CanonicalLine, TransportMode};
///
/// let line = CanonicalLine::parse("line:IDFM:C01742");
/// assert_eq!(line.code, "C01742");
/// assert_eq!(line.mode, TransportMode::Rer);
/// assert_eq!(line.display_name, "RER A");
/// assert_eq!(line.legacy_ref, "STIF:Line::C01742:");
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalLine {
    /// Stable identity, one letter followed by digits when recognized.
    pub code: String,
    pub graph_ref: String,
    pub legacy_ref: String,
    pub display_name: String,
    pub mode: TransportMode,
    pub format: LineFormat,
    pub original: String,
}

impl CanonicalLine {
    /// Canonicalize any supported line identifier.
    ///
    /// Never fails. Input without any recognizable code degrades to a record
    /// whose code and display name are the trimmed input, classified as a bus.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        let Some((format, code)) = detect(trimmed) else {
            return Self {
                code: trimmed.to_string(),
                graph_ref: format!("{GRAPH_LINE_PREFIX}{trimmed}"),
                legacy_ref: format!("STIF:Line::{trimmed}:"),
                display_name: trimmed.to_string(),
                mode: TransportMode::Bus,
                format: LineFormat::Unrecognized,
                original: input.to_string(),
            };
        };

        Self {
            graph_ref: format!("{GRAPH_LINE_PREFIX}{code}"),
            legacy_ref: format!("STIF:Line::{code}:"),
            display_name: extract_line_display_name(trimmed, Some(&code)),
            mode: detect_transport_mode(&code),
            format,
            code,
            original: input.to_string(),
        }
    }

    /// Whether a code was actually recognized in the input.
    pub fn is_recognized(&self) -> bool {
        self.format != LineFormat::Unrecognized
    }
}

/// Two canonical lines are the same line when their codes agree.
impl PartialEq for CanonicalLine {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for CanonicalLine {}

impl std::hash::Hash for CanonicalLine {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for CanonicalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// Canonicalize a line identifier. Shorthand for [`CanonicalLine::parse`].
pub fn to_canonical_line(input: &str) -> CanonicalLine {
    CanonicalLine::parse(input)
}

/// Extract the short line code from any line identifier, if there is one.
pub fn extract_line_code(line_ref: &str) -> Option<String> {
    detect(line_ref.trim()).map(|(_, code)| code)
}

fn detect(trimmed: &str) -> Option<(LineFormat, String)> {
    if let Some(caps) = GRAPH_LINE.captures(trimmed) {
        return Some((LineFormat::Graph, caps[1].to_string()));
    }

    if let Some(caps) = LEGACY_LINE.captures(trimmed) {
        return Some((LineFormat::Legacy, caps[1].to_string()));
    }

    if BARE_CODE.is_match(trimmed) {
        return Some((LineFormat::Code, trimmed.to_string()));
    }

    EMBEDDED_CODE
        .find(trimmed)
        .map(|m| (LineFormat::Embedded, m.as_str().to_string()))
}
