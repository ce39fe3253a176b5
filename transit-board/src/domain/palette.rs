//! Official line colours, keyed by the short code shown on signage.

/// Colour used when a line has no known colour.
pub const DEFAULT_LINE_COLOR: &str = "#808080";

const PALETTE: &[(&str, &str)] = &[
    // Métro
    ("1", "#FFCE00"),
    ("2", "#0064B0"),
    ("3", "#9F9825"),
    ("3bis", "#98D4E2"),
    ("4", "#C04191"),
    ("5", "#F28E42"),
    ("6", "#83C491"),
    ("7", "#F3A4BA"),
    ("7bis", "#83C491"),
    ("8", "#CEADD2"),
    ("9", "#D5C900"),
    ("10", "#E3B32A"),
    ("11", "#8D5E2A"),
    ("12", "#00814F"),
    ("13", "#98D4E2"),
    ("14", "#662483"),
    // RER
    ("A", "#E3051C"),
    ("B", "#5291CE"),
    ("C", "#FFCE00"),
    ("D", "#00814F"),
    ("E", "#BD76A1"),
    // Tramway
    ("T1", "#0064B0"),
    ("T2", "#C04191"),
    ("T3a", "#F28E42"),
    ("T3b", "#00814F"),
    ("T4", "#F28E42"),
    ("T5", "#6E6E00"),
    ("T6", "#E3051C"),
    ("T7", "#8D5E2A"),
    ("T8", "#837902"),
    ("T9", "#5291CE"),
    ("T10", "#E3B32A"),
    ("T11", "#F28E42"),
    ("T12", "#00814F"),
    ("T13", "#CEADD2"),
    // Transilien
    ("H", "#8D5E2A"),
    ("J", "#D5C900"),
    ("K", "#9F9825"),
    ("L", "#CEADD2"),
    ("N", "#00814F"),
    ("P", "#F28E42"),
    ("R", "#F3A4BA"),
    ("U", "#E3051C"),
];

/// Palette entry for a short line code (`"1"`, `"A"`, `"T3a"`, `"H"`).
pub fn palette_color(short_code: &str) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|(code, _)| *code == short_code)
        .map(|(_, color)| *color)
}

/// Colour for a short line code, grey when unknown.
pub fn line_color(short_code: &str) -> &'static str {
    palette_color(short_code).unwrap_or(DEFAULT_LINE_COLOR)
}

/// Normalise an upstream colour (`"FFCE00"` or `"#FFCE00"`) to `#RRGGBB`.
///
/// Empty strings are treated as absent.
pub fn upstream_color(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_start_matches('#');
    if raw.is_empty() {
        None
    } else {
        Some(format!("#{raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(line_color("1"), "#FFCE00");
        assert_eq!(line_color("7bis"), "#83C491");
        assert_eq!(line_color("A"), "#E3051C");
        assert_eq!(line_color("T3b"), "#00814F");
    }

    #[test]
    fn unknown_is_grey() {
        assert_eq!(line_color("Z"), DEFAULT_LINE_COLOR);
        assert_eq!(line_color(""), DEFAULT_LINE_COLOR);
        assert_eq!(palette_color("C01371"), None);
    }

    #[test]
    fn upstream_colour_normalised() {
        assert_eq!(upstream_color("FFCE00").as_deref(), Some("#FFCE00"));
        assert_eq!(upstream_color("#FFCE00").as_deref(), Some("#FFCE00"));
        assert_eq!(upstream_color(" "), None);
    }
}
