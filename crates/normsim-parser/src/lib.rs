//! Stream classifier and accumulator for normsim agent transcripts.
//!
//! The agent service answers with one unstructured text blob: country turns
//! (`[USA] said: ...`), an analyst round summary embedded as multi-line
//! JSON, CLI noise, and wrapped continuation lines. This crate turns that
//! text into an ordered sequence of typed [`normsim_types::Record`]s.
//!
//! # Architecture
//!
//! ```text
//! text --> lines --> classify --+--> UtteranceAccumulator --+--> Record
//!                               +--> JsonBlockAccumulator --+
//! ```
//!
//! The parser never fails: malformed analyst blocks are logged and dropped,
//! and whether an empty result is an error is left to the caller.
//!
//! # Modules
//!
//! - [`normalize`] -- Country label aliases
//! - [`classify`] -- Per-line verdicts
//! - [`json_block`] -- Analyst block buffering and validation
//! - [`utterance`] -- Country turn buffering
//! - [`lines`] -- Line reassembly from arbitrary chunks
//! - [`stream`] -- The per-run orchestrating parser

pub mod classify;
pub mod error;
pub mod json_block;
pub mod lines;
pub mod normalize;
pub mod stream;
pub mod utterance;

pub use classify::{LineKind, classify};
pub use error::ParseError;
pub use json_block::{BlockOutcome, BraceScanner, JsonBlockAccumulator, REQUIRED_FIELDS};
pub use lines::LineAssembler;
pub use normalize::{country_from_alias, normalize_country};
pub use stream::{INITIAL_ITERATION, ParserPhase, ParserStats, StreamParser, parse_text};
pub use utterance::UtteranceAccumulator;
