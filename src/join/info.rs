//! Per sub-state sources of the output bytes.

use alloc::{vec, vec::Vec};

use super::{InvariantViolation, StateLabel};

/// Source of one output byte within a sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Source {
    pub stream: usize,
    /// Pipeline stage holding the byte.
    pub time: usize,
    /// Byte within the input word.
    pub byte: usize,
    pub is_last_word: bool,
}

/// Sources of every byte of one output word of one frame format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInfo {
    label: StateLabel,
    outputs: Vec<Option<Source>>,
}

impl StateInfo {
    pub fn new(label: StateLabel, word_bytes: usize) -> Self {
        Self {
            label,
            outputs: vec![None; word_bytes],
        }
    }

    pub fn label(&self) -> StateLabel {
        self.label
    }

    pub fn outputs(&self) -> &[Option<Source>] {
        &self.outputs
    }

    /// Assign the source of output byte `output_byte`.
    pub fn set_output(&mut self, output_byte: usize, source: Source) -> Result<(), InvariantViolation> {
        match self.outputs.get_mut(output_byte) {
            Some(slot) if slot.is_none() => {
                *slot = Some(source);
                Ok(())
            }
            _ => Err(InvariantViolation::DuplicateSource {
                label: self.label,
                output_byte,
            }),
        }
    }

    /// Index of the least advanced stream contributing to the word.
    pub fn state_index(&self) -> Result<usize, InvariantViolation> {
        self.outputs
            .iter()
            .flatten()
            .map(|s| s.stream)
            .min()
            .ok_or(InvariantViolation::EmptySubState { label: self.label })
    }

    /// Source of the first driven output byte.
    pub fn first_source(&self) -> Option<&Source> {
        self.outputs.iter().flatten().next()
    }
}
