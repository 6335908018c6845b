//! Spec bullet extraction.
//!
//! Sheet authors put feature text in all sorts of places: numbered columns
//! ("Spec 1", "Feature A"), one multi-line column, or loosely named columns.
//! Four strategies run in precedence order and their candidates are
//! deduplicated case-insensitively, first occurrence wins.

use crate::image_url::looks_like_url;
use crate::normalize::{HeaderMap, Row};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Numbered bullet columns: a known prefix, at most one more word, then a
/// trailing ordinal ("spec 1", "bullet point 2", "feature a").
static NUMBERED_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:spec|feature|bullet|point|highlight|detail|benefit|item)s?(?:[\s_.:#-]+[a-z]+)?(?:\s*[#_.:-]?\s*\d+|[\s_.:#-]+[a-z])$",
    )
    .unwrap()
});

/// Split points for free text. A comma or slash between digits is skipped
/// when the match is inspected.
static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n;|,/•▪◦·—–]|\s-\s").unwrap());

/// Headers that loosely look like feature text.
static FUZZY_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"spec|feature|bullet|point|highlight|detail|benefit").unwrap()
});

/// Headers that never hold bullet text.
static EXCLUDED_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"image|url|link|page|pdf|code|sku|name|title|category|desc").unwrap()
});

/// URLs embedded in free text.
static INLINE_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").unwrap());

/// Single bullet columns, checked in this order.
const SINGLE_COLUMN_PRIORITY: &[&str] = &[
    "bullets",
    "bullet points",
    "specs bullets",
    "spec bullets",
    "specifications",
    "specs",
    "features",
    "key features",
    "highlights",
    "selling points",
    "benefits",
    "key points",
    "notes",
];

const BULLET_GLYPHS: &[char] = &['•', '▪', '◦', '·'];

/// Extract the ordered, deduplicated bullet list for one row.
pub fn extract_bullets(row: &Row<'_>, map: &HeaderMap) -> Vec<String> {
    let mut candidates = numbered_columns(row);
    candidates.extend(single_column(row, map));
    candidates.extend(fuzzy_columns(row));

    let mut bullets = dedup_bullets(candidates);
    if bullets.is_empty() {
        bullets = dedup_bullets(catch_all(row, map));
    }
    bullets
}

/// Strategy 1: every numbered column contributes its whole value.
fn numbered_columns(row: &Row<'_>) -> Vec<String> {
    row.columns()
        .filter(|(_, header, _)| NUMBERED_HEADER_REGEX.is_match(header))
        .map(|(_, _, value)| {
            let without_urls = INLINE_URL_REGEX.replace_all(&value, "");
            strip_leading_markers(&without_urls).to_string()
        })
        .filter(|value| !value.is_empty() && !looks_like_url(value))
        .collect()
}

/// Strategy 2: the first non-empty named bullet column, split.
fn single_column(row: &Row<'_>, map: &HeaderMap) -> Vec<String> {
    let mapped = Some(row.cell(map.specs_bullets)).filter(|v| !v.is_empty());

    let value = mapped.or_else(|| {
        SINGLE_COLUMN_PRIORITY.iter().find_map(|name| {
            row.columns()
                .find(|(_, header, _)| header == name)
                .map(|(_, _, value)| value)
        })
    });

    value.map(|v| split_candidates(&v)).unwrap_or_default()
}

/// Strategy 3: loosely named feature columns, split.
fn fuzzy_columns(row: &Row<'_>) -> Vec<String> {
    row.columns()
        .filter(|(_, header, _)| {
            FUZZY_HEADER_REGEX.is_match(header) && !EXCLUDED_HEADER_REGEX.is_match(header)
        })
        .flat_map(|(_, _, value)| split_candidates(&value))
        .collect()
}

/// Strategy 4: every unclaimed, non-excluded column; then the description.
fn catch_all(row: &Row<'_>, map: &HeaderMap) -> Vec<String> {
    let candidates: Vec<String> = row
        .columns()
        .filter(|(idx, header, _)| !map.is_mapped(*idx) && !EXCLUDED_HEADER_REGEX.is_match(header))
        .flat_map(|(_, _, value)| split_candidates(&value))
        .collect();

    if candidates.is_empty() {
        split_candidates(&row.cell(map.description))
    } else {
        candidates
    }
}

/// Split free text into bullet candidates.
///
/// Separators: newline, `;`, bullet glyphs, `,`, `|`, `/`, em/en dash, and a
/// hyphen surrounded by spaces. A leading hyphen is stripped as a marker. A
/// comma or slash between two digits ("1,200", "3/4") is kept. URLs are
/// removed first.
pub fn split_candidates(text: &str) -> Vec<String> {
    let text = INLINE_URL_REGEX.replace_all(text, "");
    let mut pieces = Vec::new();
    let mut start = 0;

    for sep in SEPARATOR_REGEX.find_iter(&text) {
        if is_numeric_join(&text, sep.start(), sep.end()) {
            continue;
        }
        push_piece(&mut pieces, &text[start..sep.start()]);
        start = sep.end();
    }
    push_piece(&mut pieces, &text[start..]);

    pieces
}

fn is_numeric_join(text: &str, start: usize, end: usize) -> bool {
    matches!(&text[start..end], "," | "/")
        && text[..start].chars().next_back().is_some_and(|c| c.is_ascii_digit())
        && text[end..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn push_piece(pieces: &mut Vec<String>, raw: &str) {
    let piece = strip_leading_markers(raw);
    if piece.is_empty() || is_url_fragment(piece) {
        return;
    }
    pieces.push(piece.to_string());
}

fn strip_leading_markers(text: &str) -> &str {
    text.trim()
        .trim_start_matches(|c: char| {
            BULLET_GLYPHS.contains(&c) || matches!(c, '-' | '–' | '—' | '*') || c.is_whitespace()
        })
        .trim()
}

fn is_url_fragment(piece: &str) -> bool {
    looks_like_url(piece) || piece.to_lowercase().starts_with("www.")
}

/// Case-insensitive dedup of trimmed candidates, keeping the first spelling.
pub fn dedup_bullets(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_header;

    fn bullets_for(headers: &[&str], cells: &[&str]) -> Vec<String> {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        let map = HeaderMap::resolve(&headers);
        extract_bullets(&Row::new(&headers, &cells), &map)
    }

    #[test]
    fn test_dedup_case_insensitive_keeps_order() {
        let bullets = bullets_for(&["Name", "Bullets"], &["Lamp", "Durable\nDurable\nLightweight"]);
        assert_eq!(bullets, vec!["Durable", "Lightweight"]);

        let bullets = bullets_for(&["Name", "Bullets"], &["Lamp", "Durable\ndurable\nLightweight"]);
        assert_eq!(bullets, vec!["Durable", "Lightweight"]);
    }

    #[test]
    fn test_numbered_columns_win_dedup() {
        let bullets = bullets_for(
            &["Name", "Spec 1", "Spec 2", "Key Highlights"],
            &["Lamp", "Dimmable", "LED, 12W", "dimmable; Energy Star"],
        );
        assert_eq!(bullets, vec!["Dimmable", "LED, 12W", "LED", "12W", "Energy Star"]);
    }

    #[test]
    fn test_numbered_header_patterns() {
        for header in [
            "spec 1",
            "spec1",
            "feature a",
            "bullet_2",
            "items 10",
            "highlight #3",
            "bullet point 1",
            "spec item 2",
        ] {
            assert!(NUMBERED_HEADER_REGEX.is_match(header), "{header}");
        }
        for header in [
            "specs",
            "spec sheet",
            "item code",
            "bullet points",
            "features",
            "point of sale",
            "key point b",
        ] {
            assert!(!NUMBERED_HEADER_REGEX.is_match(header), "{header}");
        }
    }

    #[test]
    fn test_multi_word_numbered_columns_keep_raw_value() {
        let bullets = bullets_for(
            &["Name", "Bullet Point 1", "Bullet Point 2"],
            &["Lamp", "LED, 12W", "Dimmable"],
        );
        assert_eq!(bullets, vec!["LED, 12W", "Dimmable", "LED", "12W"]);
    }

    #[test]
    fn test_single_column_priority() {
        let bullets = bullets_for(
            &["Name", "Notes", "Selling Points"],
            &["Lamp", "Ships flat", "Warm glow • Easy install"],
        );
        // "Selling Points" outranks "Notes"; it also matches the fuzzy strategy.
        assert_eq!(bullets, vec!["Warm glow", "Easy install"]);
    }

    #[test]
    fn test_fuzzy_excludes_url_and_name_columns() {
        let bullets = bullets_for(
            &["Name", "Feature Image", "Detail Notes"],
            &["Lamp", "Glossy finish", "Hand blown glass"],
        );
        assert_eq!(bullets, vec!["Hand blown glass"]);
    }

    #[test]
    fn test_catch_all_uses_unclaimed_columns() {
        let bullets = bullets_for(
            &["SKU", "Name", "Material", "Finish"],
            &["A1", "Chair", "Oak", "Matte / Satin"],
        );
        assert_eq!(bullets, vec!["Oak", "Matte", "Satin"]);
    }

    #[test]
    fn test_catch_all_falls_back_to_description() {
        let bullets = bullets_for(
            &["SKU", "Name", "Description"],
            &["A1", "Chair", "Stackable; Outdoor rated"],
        );
        assert_eq!(bullets, vec!["Stackable", "Outdoor rated"]);
    }

    #[test]
    fn test_catch_all_skipped_when_other_strategies_hit() {
        let bullets = bullets_for(
            &["Name", "Features", "Material"],
            &["Chair", "Stackable", "Oak"],
        );
        assert_eq!(bullets, vec!["Stackable"]);
    }

    #[test]
    fn test_urls_never_become_bullets() {
        let bullets = bullets_for(
            &["Name", "Spec 1", "Features"],
            &[
                "Lamp",
                "https://cdn.example/spec.pdf",
                "Warm white, see https://example.com/info",
            ],
        );
        assert_eq!(bullets, vec!["Warm white", "see"]);
    }

    #[test]
    fn test_split_separators() {
        assert_eq!(
            split_candidates("One; Two | Three • Four\n- Five — Six – Seven, Eight"),
            vec!["One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight"]
        );
    }

    #[test]
    fn test_split_keeps_inner_hyphens_and_numbers() {
        assert_eq!(
            split_candidates("Anti-glare lens, 1,200 lumens, 3/4 inch - 120V"),
            vec!["Anti-glare lens", "1,200 lumens", "3/4 inch", "120V"]
        );
    }

    #[test]
    fn test_split_numeric_runs() {
        assert_eq!(
            split_candidates("1,200,300 lumens, 1/2/3 settings"),
            vec!["1,200,300 lumens", "1/2/3 settings"]
        );
        assert_eq!(split_candidates("12, 24"), vec!["12", "24"]);
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        assert!(split_candidates(" ;; ,\n• ").is_empty());
    }

    #[test]
    fn test_extraction_is_uncapped() {
        let text = (1..=12).map(|i| format!("Point {i}")).collect::<Vec<_>>().join("\n");
        let bullets = bullets_for(&["Name", "Bullets"], &["Lamp", &text]);
        assert_eq!(bullets.len(), 12);
    }
}
