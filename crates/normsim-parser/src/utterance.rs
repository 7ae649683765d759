//! Country turn accumulation.
//!
//! Holds at most one open [`CountryUtterance`]. Opening a turn closes and
//! returns the previous one, so a turn is never dropped.

use chrono::{DateTime, Utc};
use normsim_types::{CountryUtterance, Speaker};

/// Buffers the lines of the currently open country turn.
#[derive(Debug, Default)]
pub struct UtteranceAccumulator {
    open: Option<CountryUtterance>,
}

impl UtteranceAccumulator {
    /// Create an accumulator with no open turn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a turn is open.
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Open a new turn, returning the one it closes.
    pub fn open(
        &mut self,
        speaker: Speaker,
        remainder: &str,
        iteration: u32,
        timestamp: DateTime<Utc>,
    ) -> Option<CountryUtterance> {
        self.open.replace(CountryUtterance {
            country: speaker,
            message: remainder.trim().to_owned(),
            iteration,
            timestamp,
        })
    }

    /// Append a continuation line to the open turn.
    ///
    /// Returns `false` when no turn is open; the line is dropped.
    pub fn append(&mut self, line: &str) -> bool {
        let Some(utterance) = self.open.as_mut() else {
            return false;
        };
        if !utterance.message.is_empty() {
            utterance.message.push('\n');
        }
        utterance.message.push_str(line.trim());
        true
    }

    /// Close and return the open turn.
    pub fn close(&mut self) -> Option<CountryUtterance> {
        self.open.take()
    }
}
