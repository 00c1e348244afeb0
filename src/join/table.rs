//! The synthesized transition table.

use alloc::{boxed::Box, collections::BTreeSet, vec::Vec};
use core::ops::Range;

use super::{InvariantViolation, MuxSel, RegisterValue, TransitionItem};

/// Transitions of every state of the join state machine.
///
/// Transitions of all states are kept in one vector, each state owning a
/// contiguous, sorted range of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionTable {
    word_bytes: usize,
    max_lookahead_for_input: Vec<usize>,
    items: Vec<TransitionItem>,
    states: Vec<Range<usize>>,
}

impl TransitionTable {
    pub(crate) fn from_states(
        word_bytes: usize,
        max_lookahead_for_input: Vec<usize>,
        states: Vec<BTreeSet<TransitionItem>>,
    ) -> Self {
        let mut items = Vec::with_capacity(states.iter().map(BTreeSet::len).sum());
        let states = states
            .into_iter()
            .map(|transitions| {
                let start = items.len();
                items.extend(transitions);
                start..items.len()
            })
            .collect();

        Self {
            word_bytes,
            max_lookahead_for_input,
            items,
            states,
        }
    }

    pub fn word_bytes(&self) -> usize {
        self.word_bytes
    }

    /// Number of pipeline stages beyond the first of each stream.
    pub fn max_lookahead_for_input(&self) -> &[usize] {
        &self.max_lookahead_for_input
    }

    /// Number of pipeline registers of each stream.
    pub fn register_counts(&self) -> Vec<usize> {
        self.max_lookahead_for_input.iter().map(|l| l + 1).collect()
    }

    /// Width of a pipeline register: keep bits, last and relict.
    pub fn bits_per_register(&self) -> usize {
        self.word_bytes + 2
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Bits needed to encode the state.
    pub fn state_width(&self) -> u32 {
        match self.states.len() {
            0 | 1 => 0,
            n => usize::BITS - (n - 1).leading_zeros(),
        }
    }

    /// Transitions out of `state`, empty for an unknown state.
    pub fn state_trans(&self, state: usize) -> &[TransitionItem] {
        self.states
            .get(state)
            .and_then(|r| self.items.get(r.clone()))
            .unwrap_or_default()
    }

    /// Transitions of each state, in state order.
    pub fn states(&self) -> impl ExactSizeIterator<Item = &[TransitionItem]> + '_ {
        self.states.iter().map(|r| &self.items[r.clone()])
    }

    /// Transitions of all states.
    pub fn items(&self) -> &[TransitionItem] {
        &self.items
    }

    /// The transition out of `state` enabled by `registers`, if any.
    pub fn select(&self, state: usize, registers: &[Vec<RegisterValue>]) -> Option<&TransitionItem> {
        self.state_trans(state).iter().find(|t| t.is_enabled(registers))
    }

    /// Every source selected by each output byte, sorted.
    pub fn output_mux_sources(&self) -> Vec<Vec<MuxSel>> {
        (0..self.word_bytes)
            .map(|byte| self.byte_sources(byte).into_iter().collect())
            .collect()
    }

    /// Selector code of `sel` in the multiplexer of output byte `output_byte`.
    ///
    /// An unselected byte is encoded past the last source.
    pub fn mux_index(&self, output_byte: usize, sel: Option<MuxSel>) -> Option<usize> {
        if output_byte >= self.word_bytes {
            return None;
        }

        let sources = self.byte_sources(output_byte);
        match sel {
            Some(sel) => sources.contains(&sel).then(|| sources.range(..sel).count()),
            None => Some(sources.len()),
        }
    }

    fn byte_sources(&self, output_byte: usize) -> BTreeSet<MuxSel> {
        self.items.iter().filter_map(|t| t.output_mux[output_byte]).collect()
    }

    /// Check that the transitions of each state are mutually exclusive.
    pub(crate) fn check_determinism(&self) -> Result<(), InvariantViolation> {
        for (state, transitions) in self.states().enumerate() {
            for (i, first) in transitions.iter().enumerate() {
                if let Some(second) = transitions[i + 1..].iter().find(|t| !first.excludes(t)) {
                    Err(InvariantViolation::NonDeterministic {
                        state,
                        first: Box::new(first.clone()),
                        second: Box::new(second.clone()),
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Check that every transition leads to a state with transitions.
    pub(crate) fn check_liveness(&self) -> Result<(), InvariantViolation> {
        match self
            .items
            .iter()
            .find(|t| self.state_trans(t.next_state).is_empty())
        {
            Some(t) => Err(InvariantViolation::DeadEnd {
                state: t.state,
                next_state: t.next_state,
            }),
            None => Ok(()),
        }
    }
}
