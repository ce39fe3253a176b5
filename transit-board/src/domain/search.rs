//! Stop and line search results.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::line_stop::Coords;
use super::mode::TransportMode;

/// Maximum number of results returned by one search.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// What a search should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Stop,
    Line,
    #[default]
    All,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Stop => "stop",
            SearchKind::Line => "line",
            SearchKind::All => "all",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown search kind: {0} (expected stop, line or all)")]
pub struct InvalidSearchKind(pub String);

impl FromStr for SearchKind {
    type Err = InvalidSearchKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(SearchKind::Stop),
            "line" => Ok(SearchKind::Line),
            "all" => Ok(SearchKind::All),
            other => Err(InvalidSearchKind(other.to_string())),
        }
    }
}

/// One search hit, either a stop area or a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResult {
    #[serde(rename_all = "camelCase")]
    Stop {
        /// Full upstream reference, e.g. `stop_area:IDFM:71264`.
        id: String,
        numeric_id: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        city: Option<String>,
        /// Short names of the lines serving the stop.
        lines: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        coords: Option<Coords>,
    },
    #[serde(rename_all = "camelCase")]
    Line {
        /// Full upstream reference, e.g. `line:IDFM:C01371`.
        id: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<TransportMode>,
    },
}

impl SearchResult {
    pub fn id(&self) -> &str {
        match self {
            SearchResult::Stop { id, .. } | SearchResult::Line { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SearchResult::Stop { name, .. } | SearchResult::Line { name, .. } => name,
        }
    }

    pub fn kind(&self) -> SearchKind {
        match self {
            SearchResult::Stop { .. } => SearchKind::Stop,
            SearchResult::Line { .. } => SearchKind::Line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses() {
        assert_eq!("stop".parse(), Ok(SearchKind::Stop));
        assert_eq!("all".parse(), Ok(SearchKind::All));
        assert!("address".parse::<SearchKind>().is_err());
        assert_eq!(SearchKind::default(), SearchKind::All);
    }

    #[test]
    fn stop_serializes_tagged() {
        let result = SearchResult::Stop {
            id: "stop_area:IDFM:71264".into(),
            numeric_id: "71264".into(),
            name: "Châtelet".into(),
            city: Some("Paris".into()),
            lines: vec!["1".into(), "A".into()],
            coords: Some(Coords { lat: 48.858, lon: 2.347 }),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "stop");
        assert_eq!(json["numericId"], "71264");
        assert_eq!(json["coords"]["lat"], 48.858);
        assert_eq!(result.kind(), SearchKind::Stop);
    }

    #[test]
    fn line_omits_absent_fields() {
        let result = SearchResult::Line {
            id: "line:IDFM:C01371".into(),
            name: "1".into(),
            code: None,
            color: None,
            mode: Some(TransportMode::Metro),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["mode"], "Metro");
        assert!(json.get("color").is_none());
        assert_eq!(result.name(), "1");
    }
}
