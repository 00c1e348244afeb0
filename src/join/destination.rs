//! Inversion of frame formats into byte destinations.

use alloc::{collections::BTreeSet, vec, vec::Vec};
use core::fmt;

use tracing::debug;

use crate::layout::FrameFormat;

use super::InvariantViolation;

/// Name of a sub-state: one output word of one enumerated frame format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateLabel {
    /// Index of the frame format.
    pub frame: usize,
    /// Index of the output word within the frame format.
    pub word: usize,
}

impl StateLabel {
    /// Label of the following output word of the same frame format.
    pub fn next(self) -> Self {
        Self {
            frame: self.frame,
            word: self.word + 1,
        }
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.frame, self.word)
    }
}

/// A context in which an input byte is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Destination {
    pub label: StateLabel,
    /// Pipeline stages behind the least advanced byte of the same stream.
    pub time: usize,
    /// Position of the byte in the output word.
    pub output_byte: usize,
    /// Whether the input word is the last word of its frame.
    pub is_last_word: bool,
}

/// Destinations of every input byte, indexed by stream then input byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteDestinationMap {
    word_bytes: usize,
    destinations: Vec<Vec<BTreeSet<Destination>>>,
}

impl ByteDestinationMap {
    pub fn word_bytes(&self) -> usize {
        self.word_bytes
    }

    pub fn stream_count(&self) -> usize {
        self.destinations.len()
    }

    /// Destinations of byte `byte` of the words of stream `stream`.
    pub fn get(&self, stream: usize, byte: usize) -> Option<&BTreeSet<Destination>> {
        self.destinations.get(stream)?.get(byte)
    }

    /// Iterate over `(stream, input byte, destination)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Destination)> + '_ {
        self.destinations.iter().enumerate().flat_map(|(stream, bytes)| {
            bytes
                .iter()
                .enumerate()
                .flat_map(move |(byte, set)| set.iter().map(move |d| (stream, byte, d)))
        })
    }

    /// Largest time offset of each stream, zero for a stream never consumed.
    pub fn max_lookahead(&self) -> Vec<usize> {
        self.destinations
            .iter()
            .map(|bytes| bytes.iter().flatten().map(|d| d.time).max().unwrap_or(0))
            .collect()
    }
}

/// Find every context each input byte of `input_cnt` streams is consumed in.
///
/// Frame formats are labelled by their position in `frames`, which must be in
/// a stable order for the result to be reproducible.
pub fn resolve_input_bytes_destinations<'a>(
    word_bytes: usize,
    frames: impl IntoIterator<Item = &'a FrameFormat>,
    input_cnt: usize,
) -> Result<ByteDestinationMap, InvariantViolation> {
    let mut destinations = vec![vec![BTreeSet::new(); word_bytes]; input_cnt];

    for (frame, format) in frames.into_iter().enumerate() {
        for (word, bytes) in format.words().iter().enumerate() {
            let label = StateLabel { frame, word };
            if bytes.len() != word_bytes {
                Err(InvariantViolation::WordWidthMismatch {
                    expected: word_bytes,
                    found: bytes.len(),
                })?;
            }

            let mut first_word = vec![None; input_cnt];
            for b in bytes.iter().flatten() {
                let Some(first) = first_word.get_mut(b.stream) else {
                    return Err(InvariantViolation::StreamCountMismatch {
                        expected: input_cnt,
                        found: b.stream + 1,
                    });
                };
                *first = Some(first.map_or(b.word, |w: usize| w.min(b.word)));
            }

            for (output_byte, b) in bytes.iter().enumerate() {
                let Some(b) = b else { continue };
                let time = first_word[b.stream]
                    .and_then(|first| b.word.checked_sub(first))
                    .ok_or(InvariantViolation::NegativeTimeOffset {
                        label,
                        stream: b.stream,
                    })?;

                destinations[b.stream][b.byte].insert(Destination {
                    label,
                    time,
                    output_byte,
                    is_last_word: b.is_last_word,
                });
            }
        }
    }

    let map = ByteDestinationMap {
        word_bytes,
        destinations,
    };
    debug!(
        streams = input_cnt,
        destinations = map.iter().count(),
        lookahead = ?map.max_lookahead(),
        "Resolved input byte destinations."
    );

    Ok(map)
}
