//! Country label normalization.
//!
//! The agent service is inconsistent about how it names actors: `USA`,
//! `United_States`, `u.s.`, `European Union`. Every label is folded
//! (trimmed, lowercased, `_`/`-` read as spaces, runs of whitespace
//! collapsed) and looked up in a closed alias table.

use normsim_types::{Country, Speaker};

/// Closed alias table, compared against folded labels.
const ALIASES: &[(Country, &[&str])] = &[
    (
        Country::Usa,
        &[
            "usa",
            "us",
            "u.s.",
            "u.s.a.",
            "united states",
            "united states of america",
            "america",
        ],
    ),
    (
        Country::China,
        &[
            "china",
            "prc",
            "p.r.c.",
            "people's republic of china",
            "peoples republic of china",
        ],
    ),
    (Country::Russia, &["russia", "russian federation", "rf"]),
    (Country::Eu, &["eu", "e.u.", "european union", "europe"]),
];

/// Fold a raw label into the form used by the alias table.
fn fold(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a label to a canonical country, if it is a known alias.
pub fn country_from_alias(label: &str) -> Option<Country> {
    let folded = fold(label);
    ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&folded.as_str()))
        .map(|(country, _)| *country)
}

/// Normalize a marker label into a [`Speaker`].
///
/// Unknown labels are passed through verbatim (trimmed) rather than
/// dropped, so the consumer can see them.
pub fn normalize_country(label: &str) -> Speaker {
    country_from_alias(label).map_or_else(
        || Speaker::Unrecognized(label.trim().to_owned()),
        Speaker::Country,
    )
}
