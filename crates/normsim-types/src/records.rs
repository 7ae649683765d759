//! Typed records produced from the agent service transcript.
//!
//! The stream parser emits a [`Record`] every time a country turn closes or
//! an analyst block completes. Field names are camelCase on the wire because
//! the consumer is the TypeScript renderer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::country::{Country, Speaker};
use crate::norms::NormPatch;

/// One actor's turn of speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct CountryUtterance {
    /// Who spoke.
    pub country: Speaker,
    /// Message text, continuation lines joined with `\n`.
    pub message: String,
    /// Round in effect when the turn opened.
    pub iteration: u32,
    /// When the turn marker was seen.
    pub timestamp: DateTime<Utc>,
}

/// Structured summary of one round, written by the analyst agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct AnalystUpdate {
    /// Round this update describes. Authoritative for later utterances.
    pub iteration: u32,
    /// Narrative analysis of the round.
    pub analysis: String,
    /// Reported posture changes per country.
    pub norm_updates: BTreeMap<Country, NormPatch>,
    /// Analyst's reasoning per country.
    pub reasoning: BTreeMap<Country, String>,
}

/// Anything the stream parser can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// A closed country turn.
    Utterance(CountryUtterance),
    /// A completed analyst block.
    Update(AnalystUpdate),
}

impl Record {
    /// The round this record belongs to.
    pub const fn iteration(&self) -> u32 {
        match self {
            Self::Utterance(u) => u.iteration,
            Self::Update(u) => u.iteration,
        }
    }

    /// Borrow the utterance, if this is one.
    pub const fn as_utterance(&self) -> Option<&CountryUtterance> {
        match self {
            Self::Utterance(u) => Some(u),
            Self::Update(_) => None,
        }
    }

    /// Borrow the analyst update, if this is one.
    pub const fn as_update(&self) -> Option<&AnalystUpdate> {
        match self {
            Self::Update(u) => Some(u),
            Self::Utterance(_) => None,
        }
    }
}

impl From<CountryUtterance> for Record {
    fn from(utterance: CountryUtterance) -> Self {
        Self::Utterance(utterance)
    }
}

impl From<AnalystUpdate> for Record {
    fn from(update: AnalystUpdate) -> Self {
        Self::Update(update)
    }
}
