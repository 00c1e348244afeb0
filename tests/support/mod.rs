#![allow(dead_code)]

pub mod pipeline;

use frame_join::join::{Bit, RegisterGuard, RegisterValue, TransitionItem, TransitionTable};
use tracing_subscriber::EnvFilter;

/// Log to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Render a transition as the columns of a fixture row.
///
/// Registers are written as keep bits, a colon, then the relict and last
/// bits. Pipeline stages are separated by spaces, streams by `|`.
pub fn render(t: &TransitionItem) -> Vec<String> {
    vec![
        t.state().to_string(),
        t.next_state().to_string(),
        per_stage(t.input(), |g| g.to_string()),
        per_stage(t.input_keep_mask(), |m| bits(m)),
        bits(t.input_rd()),
        bits(t.output_keep()),
        t.output_mux()
            .iter()
            .map(|m| m.map_or("-".to_string(), |m| m.to_string()))
            .collect::<Vec<_>>()
            .join(" "),
        bits(&[t.last()]),
    ]
}

pub fn render_table(table: &TransitionTable) -> Vec<Vec<String>> {
    table.items().iter().map(render).collect()
}

/// Parse rows written as a single comma separated string each.
pub fn rows(rows: &[&str]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.split(',').map(str::to_string).collect())
        .collect()
}

/// Register contents meeting `guard`, with every unconstrained bit cleared.
pub fn satisfying(guard: &RegisterGuard) -> RegisterValue {
    RegisterValue {
        keep: guard.keep.iter().map(|&k| k == Bit::One).collect(),
        relict: guard.relict == Bit::One,
        last: guard.last == Bit::One,
    }
}

fn bits(b: &[bool]) -> String {
    b.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

fn per_stage<T>(streams: &[Vec<T>], f: impl Fn(&T) -> String) -> String {
    streams
        .iter()
        .map(|stages| stages.iter().map(&f).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("|")
}
