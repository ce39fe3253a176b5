//! Predicted vehicle passages at a stop.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Departure status reported when upstream says nothing.
pub const NO_REPORT: &str = "noReport";

/// A single predicted arrival or departure at a stop.
///
/// `status` is kept as upstream sends it. The usual values are `onTime`,
/// `delayed`, `early`, `cancelled` and `noReport`, but others pass through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    /// `{lineRef}-{index}`, unique within one response.
    pub id: String,
    pub line_id: String,
    pub line_name: String,
    pub destination: String,
    pub direction: String,
    /// `None` when upstream gave no usable expected time.
    pub expected_time: Option<DateTime<Utc>>,
    pub aimed_time: Option<DateTime<Utc>>,
    pub status: String,
    /// Whole minutes until `expected_time`, recomputed at projection time.
    pub waiting_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(expected: Option<&str>, aimed: Option<&str>, status: &str) -> Passage {
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .unwrap()
                .with_timezone(&Utc)
        };
        Passage {
            id: "line:IDFM:C01742-0".into(),
            line_id: "line:IDFM:C01742".into(),
            line_name: "RER A".into(),
            destination: "Marne-la-Vallée".into(),
            direction: String::new(),
            expected_time: expected.map(parse),
            aimed_time: aimed.map(parse),
            status: status.into(),
            waiting_time: None,
        }
    }

    #[test]
    fn serializes_camel_case_with_nulls() {
        let json = serde_json::to_value(passage(None, None, NO_REPORT)).unwrap();
        assert_eq!(json["lineName"], "RER A");
        assert!(json["expectedTime"].is_null());
        assert!(json["waitingTime"].is_null());
        assert_eq!(json["status"], "noReport");
    }
}
