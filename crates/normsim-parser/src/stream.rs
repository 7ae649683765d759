//! The stream parser: one instance per simulation run.
//!
//! Feeds each line through [`classify`] and the two accumulators and emits
//! at most one [`Record`] per call. State is the tuple
//! `(in analyst block, turn open)`:
//!
//! ```text
//! Idle ──marker──> InCountryTurn ──marker──> InCountryTurn (emits previous turn)
//!  │                    │
//!  └──────{─────────────┴──{──> InJson (emits open turn) ──balanced──> Idle (emits update)
//! ```
//!
//! Nothing here fails. Malformed analyst blocks are logged and dropped,
//! stray text is ignored, and processing always continues with the next
//! line.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use normsim_types::{Record, Speaker};
use tracing::{debug, trace, warn};

use crate::classify::{LineKind, classify};
use crate::json_block::{BlockOutcome, JsonBlockAccumulator};
use crate::lines::LineAssembler;
use crate::utterance::UtteranceAccumulator;

/// Round assumed before the first analyst update arrives.
pub const INITIAL_ITERATION: u32 = 1;

/// Coarse parser state, for callers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserPhase {
    /// Nothing open.
    Idle,
    /// A country turn is open.
    InCountryTurn,
    /// An analyst block is being buffered.
    InJson,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ParserStats {
    /// Lines fed, including blank and noise lines.
    pub lines: usize,
    /// Utterances emitted.
    pub utterances: usize,
    /// Analyst updates emitted.
    pub updates: usize,
    /// Balanced analyst blocks that were rejected.
    pub discarded_blocks: usize,
    /// Noise lines dropped.
    pub noise_lines: usize,
    /// Continuation lines seen with no open turn.
    pub stray_lines: usize,
}

/// Line-oriented transcript parser.
///
/// Construct one per run and drop it after [`StreamParser::finalize`]; it is
/// never shared between runs.
#[derive(Debug)]
pub struct StreamParser {
    json: JsonBlockAccumulator,
    utterance: UtteranceAccumulator,
    current_iteration: u32,
    outbox: VecDeque<Record>,
    lines: LineAssembler,
    clock: fn() -> DateTime<Utc>,
    stats: ParserStats,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    /// Create a parser in the idle state, stamping turns with [`Utc::now`].
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Create a parser with a custom timestamp source.
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            json: JsonBlockAccumulator::new(),
            utterance: UtteranceAccumulator::new(),
            current_iteration: INITIAL_ITERATION,
            outbox: VecDeque::new(),
            lines: LineAssembler::new(),
            clock,
            stats: ParserStats::default(),
        }
    }

    /// The round that the next opened turn will carry.
    pub const fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    /// Current coarse state.
    pub const fn state(&self) -> ParserPhase {
        if self.json.is_active() {
            ParserPhase::InJson
        } else if self.utterance.is_open() {
            ParserPhase::InCountryTurn
        } else {
            ParserPhase::Idle
        }
    }

    /// Counters accumulated so far.
    pub const fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Feed one line (without its trailing newline).
    ///
    /// Returns the record this line closed, if any. When a single line both
    /// closes a turn and completes a one-line analyst block, the turn is
    /// returned now and the update on the next call.
    pub fn feed_line(&mut self, line: &str) -> Option<Record> {
        self.stats.lines = self.stats.lines.saturating_add(1);

        match classify(line, self.json.is_active()) {
            LineKind::Blank => {}
            LineKind::SystemNoise => {
                self.stats.noise_lines = self.stats.noise_lines.saturating_add(1);
                trace!(line, "dropping system noise");
            }
            LineKind::StartsJson => {
                if let Some(closed) = self.utterance.close() {
                    self.emit(closed.into());
                }
                let outcome = self.json.start(line);
                self.settle(outcome);
            }
            LineKind::ContinuesJson => {
                let outcome = self.json.push(line);
                self.settle(outcome);
            }
            LineKind::StartsCountryTurn { speaker, remainder } => {
                if let Speaker::Unrecognized(label) = &speaker {
                    warn!(label = %label, "turn marker with unrecognized country label");
                }
                let timestamp = (self.clock)();
                if let Some(closed) =
                    self.utterance
                        .open(speaker, remainder, self.current_iteration, timestamp)
                {
                    self.emit(closed.into());
                }
            }
            LineKind::ContinuesText => {
                if !self.utterance.append(line) {
                    self.stats.stray_lines = self.stats.stray_lines.saturating_add(1);
                    trace!(line, "dropping text outside any turn");
                }
            }
        }

        self.outbox.pop_front()
    }

    /// Close the stream, returning the still-open turn if there is one.
    ///
    /// An unfinished analyst block is discarded, not parsed. Calling this
    /// again returns `None`.
    pub fn finalize(&mut self) -> Option<Record> {
        if let Some(closed) = self.utterance.close() {
            self.emit(closed.into());
        }
        self.json.abandon();
        self.outbox.pop_front()
    }

    /// Feed a chunk of text that may end mid-line.
    ///
    /// The partial last line is held until a later chunk completes it, so the
    /// output does not depend on where chunks were split.
    pub fn feed_chunk(&mut self, chunk: &str) -> Vec<Record> {
        let lines = self.lines.push_str(chunk);
        self.feed_lines(lines)
    }

    /// Feed a raw byte chunk, tolerating UTF-8 sequences split across chunks.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<Record> {
        let lines = self.lines.push_bytes(chunk);
        self.feed_lines(lines)
    }

    /// Flush the held partial line and finalize.
    pub fn finish(&mut self) -> Vec<Record> {
        let mut records = self
            .lines
            .flush()
            .map(|line| self.feed_lines(vec![line]))
            .unwrap_or_default();
        records.extend(self.finalize());
        records.extend(self.outbox.drain(..));
        records
    }

    fn feed_lines(&mut self, lines: Vec<String>) -> Vec<Record> {
        lines
            .iter()
            .filter_map(|line| self.feed_line(line))
            .collect()
    }

    fn emit(&mut self, record: Record) {
        match &record {
            Record::Utterance(u) => {
                self.stats.utterances = self.stats.utterances.saturating_add(1);
                debug!(
                    country = %u.country,
                    iteration = u.iteration,
                    chars = u.message.len(),
                    "utterance closed"
                );
            }
            Record::Update(u) => {
                self.stats.updates = self.stats.updates.saturating_add(1);
                debug!(
                    iteration = u.iteration,
                    countries = u.norm_updates.len(),
                    "analyst update parsed"
                );
            }
        }
        self.outbox.push_back(record);
    }

    fn settle(&mut self, outcome: BlockOutcome) {
        match outcome {
            BlockOutcome::Pending => {}
            BlockOutcome::Complete(update) => {
                if update.iteration < self.current_iteration {
                    warn!(
                        previous = self.current_iteration,
                        reported = update.iteration,
                        "analyst update moved the round backwards"
                    );
                }
                self.current_iteration = update.iteration;
                self.emit(update.into());
            }
            BlockOutcome::Discarded(_) => {
                self.stats.discarded_blocks = self.stats.discarded_blocks.saturating_add(1);
            }
        }
    }
}

/// Parse a complete transcript with a fresh parser.
pub fn parse_text(text: &str) -> Vec<Record> {
    let mut parser = StreamParser::new();
    let mut records: Vec<Record> = text.lines().filter_map(|l| parser.feed_line(l)).collect();
    records.extend(parser.finalize());
    records
}
