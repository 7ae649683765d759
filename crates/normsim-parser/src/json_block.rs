//! Analyst block accumulation.
//!
//! The analyst agent writes its round summary as a JSON object spread over
//! any number of lines, with no framing. Lines are buffered from the opening
//! `{` until the braces balance, then the buffer is parsed once. A block
//! that fails to parse or lacks a required field is discarded whole; there
//! is no partial recovery.
//!
//! Brace counting skips characters inside JSON string literals, so an
//! `analysis` text containing `{` or `}` does not end the block early. A raw
//! newline cannot occur inside a JSON string, so string state never carries
//! over from one line to the next: an unterminated quote costs at most the
//! rest of its own line.

use std::collections::BTreeMap;

use normsim_types::{AnalystUpdate, Country, NormPatch, NormVector};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::normalize::country_from_alias;

/// Top-level keys an analyst block must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["iteration", "analysis", "norm_updates", "reasoning"];

/// Longest buffer excerpt included in discard logs.
const LOG_EXCERPT_CHARS: usize = 200;

/// Result of feeding one line into the accumulator.
#[derive(Debug)]
pub enum BlockOutcome {
    /// Braces not yet balanced; still buffering.
    Pending,
    /// The block balanced and parsed into an update.
    Complete(AnalystUpdate),
    /// The block balanced but was rejected; the buffer has been dropped.
    Discarded(ParseError),
}

/// Incremental brace counter that ignores braces inside string literals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BraceScanner {
    depth: i64,
    opened: bool,
    in_string: bool,
    escaped: bool,
}

impl BraceScanner {
    /// Advance over a slice of text.
    pub fn scan(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.in_string = false;
                self.escaped = false;
                continue;
            }
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                continue;
            }
            match c {
                '"' => self.in_string = true,
                '{' => {
                    self.opened = true;
                    self.depth = self.depth.saturating_add(1);
                }
                '}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    /// True once at least one `{` was seen and every `{` has its `}`.
    pub const fn is_balanced(&self) -> bool {
        self.opened && self.depth == 0
    }
}

/// Raw block as written by the analyst, before key normalization.
#[derive(Debug, serde::Deserialize)]
struct RawAnalystBlock {
    iteration: u32,
    analysis: String,
    norm_updates: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
    reasoning: BTreeMap<String, String>,
}

/// Buffers one analyst block at a time.
#[derive(Debug, Default)]
pub struct JsonBlockAccumulator {
    buffer: String,
    scanner: BraceScanner,
    active: bool,
}

impl JsonBlockAccumulator {
    /// Create an idle accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a block is currently being buffered.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Begin a new block with its opening line.
    ///
    /// A single-line object completes immediately.
    pub fn start(&mut self, line: &str) -> BlockOutcome {
        self.reset();
        self.active = true;
        self.buffer.push_str(line);
        self.scanner.scan(line);
        self.check()
    }

    /// Append a line to the open block.
    pub fn push(&mut self, line: &str) -> BlockOutcome {
        if !self.active {
            return BlockOutcome::Pending;
        }
        self.buffer.push('\n');
        self.buffer.push_str(line);
        self.scanner.scan("\n");
        self.scanner.scan(line);
        self.check()
    }

    /// Drop an unfinished block. Returns whether anything was buffered.
    pub fn abandon(&mut self) -> bool {
        let had_block = self.active;
        if had_block {
            debug!(
                buffered_bytes = self.buffer.len(),
                "discarding unfinished analyst block at end of stream"
            );
        }
        self.reset();
        had_block
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.scanner = BraceScanner::default();
        self.active = false;
    }

    fn check(&mut self) -> BlockOutcome {
        if !self.scanner.is_balanced() {
            return BlockOutcome::Pending;
        }
        let outcome = match materialize(&self.buffer) {
            Ok(update) => BlockOutcome::Complete(update),
            Err(e) => {
                warn!(
                    error = %e,
                    block = %excerpt(&self.buffer),
                    "discarding malformed analyst block"
                );
                BlockOutcome::Discarded(e)
            }
        };
        self.reset();
        outcome
    }
}

/// Parse a balanced buffer into a validated update.
pub fn materialize(buffer: &str) -> Result<AnalystUpdate, ParseError> {
    let value: serde_json::Value = serde_json::from_str(buffer)?;
    let object = value
        .as_object()
        .ok_or_else(|| ParseError::Shape("top level is not an object".to_owned()))?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingFields(missing));
    }

    let raw: RawAnalystBlock =
        serde_json::from_value(value).map_err(|e| ParseError::Shape(e.to_string()))?;

    Ok(AnalystUpdate {
        iteration: raw.iteration,
        analysis: raw.analysis,
        norm_updates: norm_patches(raw.norm_updates)?,
        reasoning: canonical_keys(raw.reasoning, "reasoning"),
    })
}

/// Re-key a per-country map by canonical country, dropping unknown labels.
fn canonical_keys<T>(entries: BTreeMap<String, T>, field: &str) -> BTreeMap<Country, T> {
    entries
        .into_iter()
        .filter_map(|(label, value)| {
            let country = country_from_alias(&label);
            if country.is_none() {
                warn!(field, label = %label, "dropping analyst entry for unrecognized country");
            }
            country.map(|c| (c, value))
        })
        .collect()
}

/// Convert per-country dimension maps into patches.
///
/// Unknown dimension names are logged and ignored; a non-numeric value is a
/// shape error for the whole block.
fn norm_patches(
    entries: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
) -> Result<BTreeMap<Country, NormPatch>, ParseError> {
    canonical_keys(entries, "norm_updates")
        .into_iter()
        .map(|(country, dimensions)| {
            for name in dimensions
                .keys()
                .filter(|name| !NormVector::DIMENSIONS.contains(&name.as_str()))
            {
                warn!(country = %country, dimension = %name, "ignoring unknown norm dimension");
            }
            serde_json::from_value::<NormPatch>(serde_json::Value::Object(dimensions))
                .map(|patch| (country, patch))
                .map_err(|e| ParseError::Shape(format!("norm_updates.{country}: {e}")))
        })
        .collect()
}

fn excerpt(buffer: &str) -> String {
    buffer.chars().take(LOG_EXCERPT_CHARS).collect()
}
