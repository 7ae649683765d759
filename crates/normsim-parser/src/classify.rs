//! Single-line classification.
//!
//! Decides which accumulator a line belongs to. All matchers are plain
//! prefix / byte checks on the trimmed line; no regex.
//!
//! Precedence, highest first:
//! 1. blank lines are dropped everywhere
//! 2. inside an analyst block every line continues the block, even one
//!    that looks like a turn marker
//! 3. a line starting with `{` opens a block
//! 4. known CLI / session noise is dropped
//! 5. a `[Label] said: ...` marker opens a country turn
//! 6. anything else continues the open turn

use normsim_types::Speaker;

use crate::normalize::{country_from_alias, normalize_country};

/// Longest label accepted between the marker brackets.
const MAX_LABEL_LEN: usize = 40;

/// Line prefixes emitted by the agent CLI and session plumbing.
const NOISE_PREFIXES: &[&str] = &[
    "log setup complete",
    "to access latest log",
    "running agent",
    "session id:",
    "session:",
    "user:",
    "system:",
    "[user]",
    "[system]",
];

/// Words that, followed by a number, form an iteration echo line.
const ECHO_WORDS: &[&str] = &["iteration", "turn", "round"];

/// Characters that make up banner rules.
const RULE_CHARS: &[char] = &['=', '-', '*', '#', '─', '━'];

/// Verdict for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Opens an analyst block.
    StartsJson,
    /// Continues the open analyst block.
    ContinuesJson,
    /// Opens a new country turn.
    StartsCountryTurn {
        /// Normalized speaker label.
        speaker: Speaker,
        /// Text after the marker and connector, trimmed.
        remainder: &'a str,
    },
    /// Continues the open country turn (or is stray text).
    ContinuesText,
    /// Known non-content line; dropped.
    SystemNoise,
    /// Empty or whitespace-only; dropped.
    Blank,
}

/// Classify one line given whether an analyst block is open.
pub fn classify(line: &str, in_json_block: bool) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if in_json_block {
        return LineKind::ContinuesJson;
    }
    if trimmed.starts_with('{') {
        return LineKind::StartsJson;
    }
    if is_system_noise(trimmed) {
        return LineKind::SystemNoise;
    }
    if let Some((speaker, remainder)) = parse_turn_marker(trimmed) {
        return LineKind::StartsCountryTurn { speaker, remainder };
    }
    LineKind::ContinuesText
}

/// Case-insensitive ASCII prefix strip.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

/// Whether a trimmed line is CLI banner, session echo, or a role prefix.
fn is_system_noise(trimmed: &str) -> bool {
    if NOISE_PREFIXES
        .iter()
        .any(|p| strip_prefix_ci(trimmed, p).is_some())
    {
        return true;
    }
    if trimmed.chars().count() >= 3 && trimmed.chars().all(|c| RULE_CHARS.contains(&c)) {
        return true;
    }
    is_iteration_echo(trimmed)
}

/// `Iteration 2`, `--- Turn 3 ---`, `=== Round 1/3 ===`.
fn is_iteration_echo(trimmed: &str) -> bool {
    let core = trimmed.trim_matches(|c: char| RULE_CHARS.contains(&c) || c.is_whitespace());
    ECHO_WORDS.iter().any(|word| {
        strip_prefix_ci(core, word).is_some_and(|rest| {
            let rest = rest.trim_start_matches([' ', '#']).trim_end_matches(':');
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '/')
        })
    })
}

/// Characters allowed inside a marker label.
fn is_label_char(c: char) -> bool {
    c.is_alphabetic() || matches!(c, ' ' | '.' | '_' | '-' | '\'')
}

/// Parse `[Label] said: text` (connector optional) from a trimmed line.
///
/// Known aliases form a marker with or without a connector. An unknown label
/// only forms one when followed by `said:` / `says:`, so bracketed asides in
/// speech stay continuation text.
fn parse_turn_marker(trimmed: &str) -> Option<(Speaker, &str)> {
    let body = trimmed.trim_start_matches('*').strip_prefix('[')?;
    let close = body.find(']')?;
    let label = body.get(..close)?.trim();
    if label.is_empty() || label.len() > MAX_LABEL_LEN || !label.chars().all(is_label_char) {
        return None;
    }

    let after = body.get(close.checked_add(1)?..)?.trim_start_matches('*');
    let spaced = after.trim_start();
    let (remainder, has_said) = if let Some(rest) =
        strip_prefix_ci(spaced, "said:").or_else(|| strip_prefix_ci(spaced, "says:"))
    {
        (rest, true)
    } else if let Some(rest) = spaced.strip_prefix(':') {
        (rest, false)
    } else if after.is_empty() || after.starts_with(char::is_whitespace) {
        (spaced, false)
    } else {
        return None;
    };

    if country_from_alias(label).is_none() && !has_said {
        return None;
    }
    Some((normalize_country(label), remainder.trim()))
}
