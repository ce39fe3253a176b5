//! Transport mode classification and line display names.
//!
//! Line codes follow the regional numbering scheme (`C01371` is Métro 1,
//! `C01742` is RER A). The ranges below are upstream's real numbering, so
//! the boundaries are kept exactly as published, including the 3bis/7bis
//! special cases and the irregular tramway codes.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::line::extract_line_code;

/// Tramway lines whose codes do not follow the `C013xx` continuation.
///
/// Checked before any numeric rule: several of these look like bus codes.
const IRREGULAR_TRAMWAYS: [(&str, &str); 10] = [
    ("C01843", "T4"),
    ("C02317", "T5"),
    ("C01394", "T6"),
    ("C01774", "T7"),
    ("C01795", "T8"),
    ("C02344", "T9"),
    ("C02528", "T10"),
    ("C01999", "T11"),
    ("C02529", "T12"),
    ("C02530", "T13"),
];

/// RER suffixes within the `C017` block.
const RER_LETTERS: [(&str, &str); 5] = [
    ("42", "A"),
    ("43", "B"),
    ("27", "C"),
    ("28", "D"),
    ("29", "E"),
];

static BUS_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^C01([0-9]{3,4})$").expect("valid regex"));

/// Transport mode of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    Metro,
    #[serde(rename = "RER")]
    Rer,
    Tramway,
    Bus,
    Transilien,
}

impl TransportMode {
    /// All modes, in display order.
    pub const ALL: [TransportMode; 5] = [
        TransportMode::Metro,
        TransportMode::Rer,
        TransportMode::Tramway,
        TransportMode::Bus,
        TransportMode::Transilien,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Metro => "Metro",
            TransportMode::Rer => "RER",
            TransportMode::Tramway => "Tramway",
            TransportMode::Bus => "Bus",
            TransportMode::Transilien => "Transilien",
        }
    }

    /// Physical mode id used by the line-reports endpoint.
    pub fn physical_mode(self) -> &'static str {
        match self {
            TransportMode::Metro => "Metro",
            TransportMode::Rer => "RapidTransit",
            TransportMode::Tramway => "Tramway",
            TransportMode::Bus => "Bus",
            TransportMode::Transilien => "LocalTrain",
        }
    }

    /// Classify an upstream physical mode id such as `physical_mode:RapidTransit`.
    pub fn from_physical_mode(id: &str) -> Option<Self> {
        if id.contains("Metro") {
            Some(TransportMode::Metro)
        } else if id.contains("RapidTransit") {
            Some(TransportMode::Rer)
        } else if id.contains("Tramway") {
            Some(TransportMode::Tramway)
        } else if id.contains("LocalTrain") {
            Some(TransportMode::Transilien)
        } else if id.contains("Bus") {
            Some(TransportMode::Bus)
        } else {
            None
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode: {0}")]
pub struct InvalidMode(pub String);

impl FromStr for TransportMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransportMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InvalidMode(s.to_string()))
    }
}

/// Leading decimal digits of `s`, like `parseInt` on a suffix.
///
/// Saturates instead of overflowing; `None` when `s` has no leading digit.
fn leading_number(s: &str) -> Option<u64> {
    let digits: &str = &s[..s.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    Some(digits.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    }))
}

fn irregular_tramway(code: &str) -> Option<&'static str> {
    IRREGULAR_TRAMWAYS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

fn rer_letter(code: &str) -> Option<&'static str> {
    let suffix = code.strip_prefix("C017")?;
    RER_LETTERS
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, letter)| *letter)
}

/// Detect the transport mode of a line code.
///
/// Total: anything unrecognized, including the empty string, is a bus.
pub fn detect_transport_mode(code: &str) -> TransportMode {
    if irregular_tramway(code).is_some() {
        return TransportMode::Tramway;
    }

    if let Some(suffix) = code.strip_prefix("C013") {
        match leading_number(suffix) {
            Some(71..=84 | 86 | 87) => return TransportMode::Metro,
            Some(n) if n >= 89 => return TransportMode::Tramway,
            _ => {}
        }
    }

    if rer_letter(code).is_some() {
        return TransportMode::Rer;
    }

    if code.starts_with("C02") {
        return TransportMode::Transilien;
    }

    TransportMode::Bus
}

/// Human-readable name of a line, e.g. "Métro 1", "RER A", "T4", "Bus 147".
///
/// `code` overrides extraction from `line_ref` when the caller already has it.
/// Falls back to the code, then to `line_ref` itself; never fails.
pub fn extract_line_display_name(line_ref: &str, code: Option<&str>) -> String {
    let extracted;
    let code = match code {
        Some(c) => c,
        None => match extract_line_code(line_ref) {
            Some(c) => {
                extracted = c;
                extracted.as_str()
            }
            None => return line_ref.to_string(),
        },
    };

    if let Some(name) = irregular_tramway(code) {
        return name.to_string();
    }

    if let Some(suffix) = code.strip_prefix("C013") {
        match leading_number(suffix) {
            Some(n @ 71..=84) => return format!("Métro {}", n - 70),
            Some(86) => return "Métro 3bis".to_string(),
            Some(87) => return "Métro 7bis".to_string(),
            Some(n @ 89..=99) => return format!("T{}", n - 88),
            _ => {}
        }
    }

    if let Some(letter) = rer_letter(code) {
        return format!("RER {letter}");
    }

    // No friendly name without the caller's short name
    if code.starts_with("C02") {
        return code.to_string();
    }

    if let Some(caps) = BUS_CODE.captures(code)
        && let Some(number) = leading_number(&caps[1])
        && number >= 20
    {
        return format!("Bus {number}");
    }

    code.to_string()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Same code, same mode.
        #[test]
        fn mode_is_pure(code in "\\PC{0,12}") {
            prop_assert_eq!(detect_transport_mode(&code), detect_transport_mode(&code));
        }

        /// Display names never panic and are stable.
        #[test]
        fn display_name_is_total(s in "\\PC{0,24}") {
            let a = extract_line_display_name(&s, None);
            let b = extract_line_display_name(&s, None);
            prop_assert_eq!(a, b);
        }

        /// Every C0137x..C01384 code is a metro named after its suffix.
        #[test]
        fn metro_names_follow_suffix(n in 71u64..=84) {
            let code = format!("C013{n}");
            prop_assert_eq!(detect_transport_mode(&code), TransportMode::Metro);
            prop_assert_eq!(extract_line_display_name(&code, None), format!("Métro {}", n - 70));
        }
    }
}
