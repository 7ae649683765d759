//! One simulation run: a fresh parser, the records it emits, and the norm
//! board they move.
//!
//! A [`SimulationRun`] owns its [`StreamParser`] outright. It is created per
//! round, fed by a [`crate::source::TextSource`], and consumed by
//! [`SimulationRun::finish`], so no parser state ever outlives its run.

use std::io::Write;

use normsim_parser::{ParserStats, StreamParser};
use normsim_types::{NormBoard, Record, RunId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::RunnerError;

/// Parser, records, and norm board for a single round.
#[derive(Debug)]
pub struct SimulationRun {
    id: RunId,
    parser: StreamParser,
    board: NormBoard,
    records: Vec<Record>,
}

impl Default for SimulationRun {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationRun {
    /// Start a run with a fresh parser and the baseline board.
    pub fn new() -> Self {
        Self {
            id: RunId::new(),
            parser: StreamParser::new(),
            board: NormBoard::new(),
            records: Vec::new(),
        }
    }

    /// Identifier of this run.
    pub const fn id(&self) -> RunId {
        self.id
    }

    /// Feed a text chunk of any size.
    pub fn ingest_text(&mut self, text: &str) {
        for record in self.parser.feed_chunk(text) {
            self.accept(record);
        }
    }

    /// Feed a raw byte chunk of any size.
    pub fn ingest_bytes(&mut self, bytes: &[u8]) {
        for record in self.parser.feed_bytes(bytes) {
            self.accept(record);
        }
    }

    fn accept(&mut self, record: Record) {
        if let Record::Update(update) = &record {
            let changed = self.board.apply(update);
            debug!(
                run_id = %self.id,
                iteration = update.iteration,
                changed,
                "norm board updated"
            );
        }
        self.records.push(record);
    }

    /// Flush the parser and close the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::NoRecords`] when the transcript produced
    /// nothing at all.
    pub fn finish(mut self) -> Result<RunReport, RunnerError> {
        for record in self.parser.finish() {
            self.accept(record);
        }

        let stats = self.parser.stats();
        if self.records.is_empty() {
            warn!(run_id = %self.id, lines = stats.lines, "no records parsed");
            return Err(RunnerError::NoRecords);
        }

        info!(
            run_id = %self.id,
            utterances = stats.utterances,
            updates = stats.updates,
            discarded_blocks = stats.discarded_blocks,
            final_iteration = self.parser.current_iteration(),
            "run complete"
        );

        Ok(RunReport {
            run_id: self.id,
            final_iteration: self.parser.current_iteration(),
            records: self.records,
            stats,
            board: self.board,
        })
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier of the run.
    pub run_id: RunId,
    /// Records in emission order.
    pub records: Vec<Record>,
    /// Parser counters.
    pub stats: ParserStats,
    /// Iteration in effect when the transcript ended.
    pub final_iteration: u32,
    /// Norm postures after every update was applied.
    pub board: NormBoard,
}

/// Closing line of the output stream.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary<'a> {
    kind: &'static str,
    run_id: RunId,
    utterances: usize,
    updates: usize,
    discarded_blocks: usize,
    final_iteration: u32,
    board: &'a NormBoard,
}

impl RunReport {
    /// Write every record as one JSON line, then a summary line.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Serde`] or [`RunnerError::Io`] if writing
    /// fails.
    pub fn write_json_lines<W: Write>(&self, mut out: W) -> Result<(), RunnerError> {
        for record in &self.records {
            serde_json::to_writer(&mut out, record)?;
            writeln!(out)?;
        }

        let summary = RunSummary {
            kind: "summary",
            run_id: self.run_id,
            utterances: self.stats.utterances,
            updates: self.stats.updates,
            discarded_blocks: self.stats.discarded_blocks,
            final_iteration: self.final_iteration,
            board: &self.board,
        };
        serde_json::to_writer(&mut out, &summary)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
