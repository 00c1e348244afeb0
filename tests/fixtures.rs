#![cfg(feature = "std")]

mod support;

use std::path::Path;

use csv::ReaderBuilder;
use frame_join::{join::TransitionTable, stream::JoinConfig, synth};

#[test]
fn synthesize_single_byte_unaligned() {
    validate("fixtures/single-byte-unaligned.json");
}

#[test]
fn synthesize_single_byte_or_empty() {
    validate("fixtures/single-byte-or-empty.json");
}

#[test]
fn synthesize_narrow_single_byte_or_empty() {
    validate("fixtures/narrow-single-byte-or-empty.json");
}

#[test]
fn synthesize_unbounded() {
    validate("fixtures/unbounded.json");
}

#[test]
fn synthesize_unbounded_unaligned() {
    validate("fixtures/unbounded-unaligned.json");
}

#[test]
fn synthesize_two_bytes_unaligned() {
    validate("fixtures/two-bytes-unaligned.json");
}

#[test]
fn synthesize_two_streams() {
    validate("fixtures/two-streams.json");
}

#[test]
fn synthesize_two_optional_streams() {
    validate("fixtures/two-optional-streams.json");
}

#[test]
fn synthesize_two_streams_wide() {
    validate("fixtures/two-streams-wide.json");
}

#[test]
fn synthesize_wide_element_unaligned() {
    validate("fixtures/wide-element-unaligned.json");
}

#[test]
fn synthesize_wide_element_any_offset() {
    validate("fixtures/wide-element-any-offset.json");
}

#[test]
fn synthesize_output_offset() {
    validate("fixtures/output-offset.json");
}

#[test]
fn synthesize_three_streams() {
    validate("fixtures/three-streams.json");
}

#[test]
fn synthesize_three_optional_streams() {
    validate("fixtures/three-optional-streams.json");
}

#[test]
fn synthesize_halfwords_on_words() {
    validate("fixtures/halfwords-on-words.json");
}

#[test]
fn synthesize_header_and_payload() {
    validate("fixtures/header-and-payload.json");
}

/// Synthesize from both entry points and compare against the table stored
/// beside the configuration.
fn validate(path: &str) {
    support::init_tracing();

    let data = std::fs::read(path).unwrap();
    let table = synth::synthesize_slice(&data).unwrap();

    let mut file = std::fs::File::open(path).unwrap();
    assert_eq!(synth::synthesize_reader(&mut file).unwrap(), table);

    let config: JoinConfig = serde_json::from_slice(&data).unwrap();
    assert_eq!(table.state_count(), config.streams.len());
    assert_eq!(table.word_bytes(), config.word_bytes);

    assert_eq!(support::render_table(&table), expected(path));
    assert_selectable(&table);
}

fn expected(path: impl AsRef<Path>) -> Vec<Vec<String>> {
    let path = path.as_ref().with_extension("csv");

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .unwrap();

    reader
        .records()
        .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
        .collect()
}

/// Every transition must be the one selected by register contents meeting
/// its own guard, don't-care bits cleared.
fn assert_selectable(table: &TransitionTable) {
    for t in table.items() {
        let registers: Vec<Vec<_>> = t
            .input()
            .iter()
            .map(|stages| stages.iter().map(support::satisfying).collect())
            .collect();
        assert_eq!(table.select(t.state(), &registers), Some(t));
    }
}
