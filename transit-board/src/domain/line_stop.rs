//! Stops served by a line, and French name ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

/// One station on a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStop {
    /// Point-level id, `22089` or `monomodalStopPlace:47918`.
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coords>,
}

/// Identity used to detect duplicate stations: trimmed, case-folded name.
fn dedup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Primary collation key: lowercase with accents removed.
///
/// Covers the Latin-1 and Latin Extended-A letters found in French place
/// names. Apostrophes of every style become `'` and dashes become `-`, so
/// punctuation sorts before letters as it does in French collation.
pub fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => key.push('a'),
            'ç' | 'ć' | 'č' => key.push('c'),
            'ď' | 'đ' => key.push('d'),
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => key.push('e'),
            'ğ' => key.push('g'),
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => key.push('i'),
            'ł' | 'ľ' => key.push('l'),
            'ñ' | 'ń' | 'ň' => key.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => key.push('o'),
            'ř' => key.push('r'),
            'ś' | 'ş' | 'š' => key.push('s'),
            'ţ' | 'ť' => key.push('t'),
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => key.push('u'),
            'ý' | 'ÿ' => key.push('y'),
            'ź' | 'ż' | 'ž' => key.push('z'),
            'œ' => key.push_str("oe"),
            'æ' => key.push_str("ae"),
            'ß' => key.push_str("ss"),
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '\u{2032}' | '`' | '\u{00B4}' => key.push('\''),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => key.push('-'),
            '\u{00A0}' | '\u{202F}' => key.push(' '),
            other => key.push(other),
        }
    }
    key
}

/// Compare station names the way a French reader sorts them.
///
/// Accents and case only break ties, so "Étoile" sorts between "Denfert"
/// and "Faidherbe" rather than after "Zénith".
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Collapse platforms of the same station and sort by name.
///
/// The first entry seen for a name wins, with its id and coordinates; later
/// duplicates are dropped without merging.
pub fn dedup_and_sort(stops: impl IntoIterator<Item = LineStop>) -> Vec<LineStop> {
    let mut seen = HashSet::new();
    let mut unique: Vec<LineStop> = stops
        .into_iter()
        .filter(|stop| seen.insert(dedup_key(&stop.name)))
        .collect();
    unique.sort_by(|a, b| compare_names(&a.name, &b.name));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, name: &str) -> LineStop {
        LineStop {
            id: id.into(),
            name: name.into(),
            coords: None,
        }
    }

    #[test]
    fn keeps_first_duplicate() {
        let stops = dedup_and_sort([
            stop("22089", "Châtelet"),
            stop("22090", "Nation"),
            stop("22091", "châtelet "),
            stop("22092", "Châtelet"),
        ]);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].id, "22089");
        assert_eq!(stops[0].name, "Châtelet");
        assert_eq!(stops[1].name, "Nation");
    }

    #[test]
    fn accents_do_not_push_to_end() {
        let stops = dedup_and_sort([
            stop("1", "Zénith"),
            stop("2", "Étoile"),
            stop("3", "Denfert"),
            stop("4", "Faidherbe"),
        ]);
        let names: Vec<_> = stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Denfert", "Étoile", "Faidherbe", "Zénith"]);
    }

    #[test]
    fn ligatures_fold() {
        assert_eq!(collation_key("Sacré-Cœur"), "sacre-coeur");
        assert_eq!(collation_key("Cœur"), collation_key("Coeur"));
        // Still distinct names, so the order is total
        assert!(compare_names("Cœur", "Coeur").is_ne());
    }

    #[test]
    fn apostrophe_sorts_before_letters() {
        let stops = dedup_and_sort([
            stop("1", "La Défense"),
            stop("2", "L\u{2019}Haÿ-les-Roses"),
            stop("3", "Lamarck - Caulaincourt"),
            stop("4", "L'Île-Saint-Denis"),
        ]);
        let names: Vec<_> = stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "L\u{2019}Haÿ-les-Roses",
                "L'Île-Saint-Denis",
                "La Défense",
                "Lamarck - Caulaincourt",
            ]
        );
    }

    #[test]
    fn apostrophe_styles_share_a_key() {
        assert_eq!(
            collation_key("L\u{2019}Haÿ-les-Roses"),
            collation_key("L'Hay-les-Roses")
        );
        assert_eq!(collation_key("Saint\u{2011}Denis"), "saint-denis");
    }

    #[test]
    fn empty_input() {
        assert!(dedup_and_sort(Vec::new()).is_empty());
    }

    #[test]
    fn coords_kept_from_first() {
        let mut first = stop("1", "Gare");
        first.coords = Some(Coords { lat: 48.0, lon: 2.0 });
        let mut second = stop("2", "Gare");
        second.coords = Some(Coords { lat: 49.0, lon: 3.0 });
        let stops = dedup_and_sort([first, second]);
        assert_eq!(stops[0].coords, Some(Coords { lat: 48.0, lon: 2.0 }));
    }
}
