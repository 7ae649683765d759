//! Behavioral tests for the transcript stream parser.
//!
//! Each test drives a fresh [`StreamParser`] with literal transcript lines,
//! the way the runner does, and checks the emitted record sequence.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use normsim_parser::{ParserPhase, StreamParser, parse_text};
use normsim_types::{AnalystUpdate, Country, CountryUtterance, NormPatch, Record, Speaker};

const TARIFF_ROUND: &str = include_str!("fixtures/tariff_round.txt");

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn run(lines: &[&str]) -> Vec<Record> {
    let mut parser = StreamParser::with_clock(epoch);
    let mut records: Vec<Record> = lines.iter().filter_map(|l| parser.feed_line(l)).collect();
    records.extend(parser.finalize());
    records
}

fn utterance(country: Country, message: &str, iteration: u32) -> Record {
    Record::Utterance(CountryUtterance {
        country: country.into(),
        message: message.to_owned(),
        iteration,
        timestamp: epoch(),
    })
}

fn speakers(records: &[Record]) -> Vec<Speaker> {
    records
        .iter()
        .filter_map(Record::as_utterance)
        .map(|u| u.country.clone())
        .collect()
}

#[test]
fn scenario_a_turns_then_update() {
    let records = run(&[
        "[USA] said: We condemn this.",
        "[China] said: We reject this.",
        "{",
        "\"iteration\": 1,",
        "\"analysis\": \"test\",",
        "\"norm_updates\": {},",
        "\"reasoning\": {}",
        "}",
    ]);

    assert_eq!(
        records,
        vec![
            utterance(Country::Usa, "We condemn this.", 1),
            utterance(Country::China, "We reject this.", 1),
            Record::Update(AnalystUpdate {
                iteration: 1,
                analysis: "test".to_owned(),
                norm_updates: BTreeMap::new(),
                reasoning: BTreeMap::new(),
            }),
        ]
    );
}

#[test]
fn scenario_b_continuation_joins_until_next_marker() {
    let mut parser = StreamParser::with_clock(epoch);
    assert!(parser.feed_line("[EU] said: Line one.").is_none());
    assert!(parser.feed_line("Line two continues.").is_none());

    let eu = parser.feed_line("[USA] said: Reply.");
    assert_eq!(eu, Some(utterance(Country::Eu, "Line one.\nLine two continues.", 1)));

    assert_eq!(parser.finalize(), Some(utterance(Country::Usa, "Reply.", 1)));
}

#[test]
fn alias_spellings_normalize_to_usa() {
    for line in ["[usa] said: X", "[USA] X", "[US] said: X"] {
        let records = run(&[line]);
        assert_eq!(records, vec![utterance(Country::Usa, "X", 1)], "{line}");
    }
}

#[test]
fn update_waits_for_outer_braces_to_balance() {
    let mut parser = StreamParser::with_clock(epoch);
    let lines = [
        "{",
        "\"iteration\": 3,",
        "\"analysis\": \"nested\",",
        "\"norm_updates\": {",
        "  \"EU\": {\"diffuse_reciprocity\": 0.8}",
        "},",
        "\"reasoning\": {\"EU\": \"steady\"}",
    ];
    for line in lines {
        assert!(parser.feed_line(line).is_none(), "emitted early at {line}");
        assert_eq!(parser.state(), ParserPhase::InJson);
    }

    let update = parser.feed_line("}");
    let update = update.as_ref().and_then(Record::as_update).expect("update on closing line");
    assert_eq!(update.iteration, 3);
    assert_eq!(
        update.norm_updates.get(&Country::Eu).and_then(|p| p.diffuse_reciprocity),
        Some(0.8)
    );
    assert_eq!(parser.state(), ParserPhase::Idle);
}

#[test]
fn new_turn_always_emits_previous() {
    let records = run(&[
        "[USA] said: one",
        "[China] said: two",
        "[Russia] said: three",
        "[EU] said: four",
    ]);
    assert_eq!(
        speakers(&records),
        Country::ALL.iter().map(|&c| Speaker::from(c)).collect::<Vec<_>>()
    );
}

#[test]
fn finalize_is_idempotent() {
    let mut parser = StreamParser::with_clock(epoch);
    let _ = parser.feed_line("[Russia] said: Final word.");
    assert!(parser.finalize().is_some());
    assert!(parser.finalize().is_none());
}

#[test]
fn malformed_block_is_dropped_and_parsing_continues() {
    let records = run(&[
        "{",
        "not valid json",
        "}",
        "[China] said: Still here.",
    ]);
    assert_eq!(records, vec![utterance(Country::China, "Still here.", 1)]);
}

#[test]
fn unterminated_quote_in_block_does_not_swallow_later_turns() {
    let text = "{\n\"analysis\": \"unterminated,\n}\n[USA] said: hi\n[China] said: yo\n";

    let mut parser = StreamParser::with_clock(epoch);
    let mut records: Vec<Record> = text.lines().filter_map(|l| parser.feed_line(l)).collect();
    assert_eq!(parser.state(), ParserPhase::InCountryTurn);
    records.extend(parser.finalize());

    assert_eq!(
        records,
        vec![utterance(Country::Usa, "hi", 1), utterance(Country::China, "yo", 1)]
    );
    assert_eq!(parser.stats().discarded_blocks, 1);
}

#[test]
fn block_missing_fields_produces_nothing() {
    let records = run(&["{", "\"iteration\": 2,", "\"analysis\": \"partial\"", "}"]);
    assert!(records.is_empty());
}

#[test]
fn noise_inside_turn_is_neither_appended_nor_closing() {
    let mut parser = StreamParser::with_clock(epoch);
    let _ = parser.feed_line("[EU] said: We call for calm.");
    assert!(
        parser
            .feed_line("Running agent TariffSimulation, type exit to exit.")
            .is_none()
    );
    assert_eq!(parser.state(), ParserPhase::InCountryTurn);
    let _ = parser.feed_line("Dialogue is the only path.");

    assert_eq!(
        parser.finalize(),
        Some(utterance(Country::Eu, "We call for calm.\nDialogue is the only path.", 1))
    );
}

#[test]
fn marker_inside_block_does_not_open_turn() {
    let records = run(&[
        "{",
        "\"iteration\": 1,",
        "[USA] said: this is not a turn",
        "}",
    ]);
    assert!(records.is_empty());
}

#[test]
fn stray_text_before_any_marker_is_ignored() {
    let records = run(&["Preamble from the model.", "[USA] said: Hello."]);
    assert_eq!(records, vec![utterance(Country::Usa, "Hello.", 1)]);
}

#[test]
fn unrecognized_label_passes_through() {
    let records = run(&["[ASEAN] said: We urge restraint."]);
    assert_eq!(
        speakers(&records),
        vec![Speaker::Unrecognized("ASEAN".to_owned())]
    );
}

#[test]
fn chunk_invariance_at_line_boundaries() {
    let whole = parse_text(TARIFF_ROUND);

    let mut parser = StreamParser::new();
    let mut chunked = Vec::new();
    for line in TARIFF_ROUND.split_inclusive('\n') {
        chunked.extend(parser.feed_chunk(line));
    }
    chunked.extend(parser.finish());

    assert_eq!(strip_timestamps(&whole), strip_timestamps(&chunked));
}

#[test]
fn chunk_invariance_at_arbitrary_byte_splits() {
    let whole = parse_text(TARIFF_ROUND);

    for size in [1_usize, 7, 64, 1024] {
        let mut parser = StreamParser::new();
        let mut chunked = Vec::new();
        for chunk in TARIFF_ROUND.as_bytes().chunks(size) {
            chunked.extend(parser.feed_bytes(chunk));
        }
        chunked.extend(parser.finish());
        assert_eq!(strip_timestamps(&whole), strip_timestamps(&chunked), "chunk size {size}");
    }
}

#[test]
fn full_transcript_round() {
    let records = parse_text(TARIFF_ROUND);

    assert_eq!(
        speakers(&records),
        vec![
            Speaker::from(Country::Usa),
            Speaker::from(Country::China),
            Speaker::from(Country::Russia),
            Speaker::from(Country::Eu),
            Speaker::from(Country::Usa),
            Speaker::from(Country::China),
        ]
    );

    let china = records[1].as_utterance().unwrap();
    assert_eq!(
        china.message,
        "We firmly oppose this unilateral and protectionist act.\nChina will take all necessary countermeasures."
    );

    let update = records[4].as_update().unwrap();
    assert_eq!(update.iteration, 1);
    assert!(update.analysis.contains("{cautiously}"));
    assert_eq!(update.norm_updates.len(), 4);
    assert_eq!(
        update.norm_updates[&Country::Russia],
        NormPatch {
            multilateral_cooperation: Some(-0.35),
            ..NormPatch::default()
        }
    );
    assert_eq!(update.reasoning.len(), 4);

    let last = records[6].as_utterance().unwrap();
    assert_eq!(last.message, "Countermeasures are now in effect on American agriculture.");
    assert_eq!(last.iteration, 1);
}

#[test]
fn later_update_changes_iteration_of_later_turns() {
    let records = run(&[
        r#"{"iteration": 5, "analysis": "a", "norm_updates": {}, "reasoning": {}}"#,
        "[USA] said: Round five.",
    ]);
    assert_eq!(records.iter().map(Record::iteration).collect::<Vec<_>>(), vec![5, 5]);
}

fn strip_timestamps(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .cloned()
        .map(|r| match r {
            Record::Utterance(u) => Record::Utterance(CountryUtterance {
                timestamp: epoch(),
                ..u
            }),
            other => other,
        })
        .collect()
}
