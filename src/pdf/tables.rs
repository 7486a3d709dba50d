//! Heading detection and candidate-table parsing for codebook pages.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::download::DatafileType;

// Survey variable codes: uppercase, digits and underscores (STABR,
// POPU_LSA, F_POPLSA, ...).
#[allow(clippy::expect_used)]
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]+$").expect("static pattern"));

// Column gap: a tab or a run of two-plus spaces.
#[allow(clippy::expect_used)]
static COLUMN_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|\s{2,}").expect("static pattern"));

/// Finds, for each datafile kind, every zero-based page index whose text
/// contains that kind's record-layout heading.
///
/// All matching pages are collected, not just the first: the appendix
/// heading repeats on every page its table spans.
pub(crate) fn find_pages_with_tables(
    page_texts: &[String],
) -> IndexMap<DatafileType, Vec<usize>> {
    let mut pages: IndexMap<DatafileType, Vec<usize>> = DatafileType::ALL
        .iter()
        .map(|&kind| (kind, Vec::new()))
        .collect();

    for (index, text) in page_texts.iter().enumerate() {
        for kind in DatafileType::ALL {
            if text.contains(kind.record_layout_heading()) {
                if let Some(matched) = pages.get_mut(&kind) {
                    matched.push(index);
                }
            }
        }
    }

    pages
}

/// Parses candidate table rows `(variable_name, description)` out of one
/// page's text.
///
/// A line is a candidate row when its first column is a variable code and
/// its last column (the description) is populated; everything else on the
/// page (prose, headings, column captions) is dropped.
pub(crate) fn parse_candidate_rows(page_text: &str) -> Vec<(String, String)> {
    let mut rows = Vec::new();

    for line in page_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = COLUMN_GAP
            .split(line)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();

        let (first, last) = match fields.as_slice() {
            [] => continue,
            // Collapsed columns: fall back to a single-space split.
            [only] => match only.split_once(' ') {
                Some((first, rest)) => (first.trim(), rest.trim()),
                None => continue,
            },
            [first, .., last] => (*first, *last),
        };

        if first.is_empty() || last.is_empty() || !CODE_PATTERN.is_match(first) {
            continue;
        }

        rows.push((first.to_string(), last.to_string()));
    }

    rows
}

/// Derives the canonical long name from a variable description: the text
/// before the first punctuation mark in `.,!?()`, hyphens replaced with
/// spaces, each word title-cased, joined with underscores.
#[must_use]
pub fn derive_long_name(description: &str) -> String {
    let first_chunk = description
        .split(['.', ',', '!', '?', '(', ')'])
        .next()
        .unwrap_or_default();

    first_chunk
        .replace('-', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("_")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_pages_collects_all_matching_pages() {
        let pages = vec![
            "Introduction".to_string(),
            format!(
                "Appendix A\n{}\ntable...",
                DatafileType::StateSummary.record_layout_heading()
            ),
            format!("{} (cont.)", DatafileType::StateSummary.record_layout_heading()),
            format!("xx{}yy", DatafileType::SystemData.record_layout_heading()),
            format!("{}", DatafileType::OutletData.record_layout_heading()),
        ];

        let found = find_pages_with_tables(&pages);

        assert_eq!(found[&DatafileType::StateSummary], vec![1, 2]);
        assert_eq!(found[&DatafileType::SystemData], vec![3]);
        assert_eq!(found[&DatafileType::OutletData], vec![4]);
    }

    #[test]
    fn test_find_pages_with_no_headings_is_empty_per_kind() {
        let pages = vec!["nothing here".to_string()];
        let found = find_pages_with_tables(&pages);
        for kind in DatafileType::ALL {
            assert!(found[&kind].is_empty());
        }
    }

    #[test]
    fn test_parse_candidate_rows_keeps_code_and_description() {
        let text = "Data Element   Type   Description\n\
                    STABR   AN   State abbreviation code. Two letters\n\
                    POPU_LSA   N   Population of the legal service area\n\
                    some prose explaining the table layout\n";

        let rows = parse_candidate_rows(text);

        assert_eq!(
            rows,
            vec![
                (
                    "STABR".to_string(),
                    "State abbreviation code. Two letters".to_string()
                ),
                (
                    "POPU_LSA".to_string(),
                    "Population of the legal service area".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_parse_candidate_rows_handles_collapsed_columns() {
        let text = "BKMOB Number of bookmobiles.";
        let rows = parse_candidate_rows(text);
        assert_eq!(
            rows,
            vec![("BKMOB".to_string(), "Number of bookmobiles.".to_string())]
        );
    }

    #[test]
    fn test_parse_candidate_rows_drops_unpopulated_rows() {
        // No description column.
        let rows = parse_candidate_rows("STABR\nCENTLIB   \n");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_derive_long_name_stops_at_first_punctuation() {
        assert_eq!(
            derive_long_name("Total number of computers (public access)."),
            "Total_Number_Of_Computers"
        );
    }

    #[test]
    fn test_derive_long_name_replaces_hyphens() {
        assert_eq!(derive_long_name("a round-ish fruit"), "A_Round_Ish_Fruit");
    }

    #[test]
    fn test_derive_long_name_title_cases_words() {
        assert_eq!(derive_long_name("a yellow fruit"), "A_Yellow_Fruit");
        assert_eq!(derive_long_name("an orange fruit"), "An_Orange_Fruit");
    }

    #[test]
    fn test_derive_long_name_of_empty_description() {
        assert_eq!(derive_long_name(""), "");
        assert_eq!(derive_long_name("(parenthetical only)"), "");
    }
}
