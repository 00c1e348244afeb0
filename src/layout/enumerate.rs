//! Enumeration of representative frame formats of one or more streams.

use alloc::{collections::BTreeSet, vec::Vec};

use tracing::debug;

use crate::stream::StreamDescriptor;

use super::{FrameFormat, LayoutError, create_frame, important_byte_counts, join_streams};

/// Every representative format of a frame of `stream` placed at `output_offset`.
///
/// One format is built for every legal start offset of the stream and every
/// representative byte count at that offset.
pub fn stream_to_all_possible_frame_formats(
    word_bytes: usize,
    stream: &StreamDescriptor,
    stream_index: usize,
    output_offset: usize,
) -> Result<Vec<FrameFormat>, LayoutError> {
    let element_size = stream.element_bytes();
    let mut formats = Vec::new();

    for &input_offset in &stream.start_offsets {
        let counts = important_byte_counts(
            word_bytes,
            output_offset,
            input_offset,
            element_size,
            stream.length,
        )?;
        for byte_count in counts {
            formats.push(create_frame(
                word_bytes,
                stream_index,
                byte_count,
                output_offset,
                input_offset,
            )?);
        }
    }

    Ok(formats)
}

/// Every representative output frame of `streams` joined in order.
///
/// The formats of each stream are enumerated for every offset at which the
/// previous stream's formats may end. Every combination of one format per
/// stream is then joined into a single frame starting at `output_offset`.
///
/// Fails if the number of combinations exceeds `max_combinations`.
pub fn streams_to_all_possible_frame_formats(
    word_bytes: usize,
    streams: &[StreamDescriptor],
    output_offset: usize,
    max_combinations: usize,
) -> Result<BTreeSet<FrameFormat>, LayoutError> {
    let mut per_stream: Vec<Vec<FrameFormat>> = Vec::with_capacity(streams.len());
    let mut offsets = BTreeSet::from([output_offset]);

    for (stream_index, stream) in streams.iter().enumerate() {
        let mut formats = BTreeSet::new();
        let mut next_offsets = BTreeSet::new();

        for &offset in &offsets {
            for format in stream_to_all_possible_frame_formats(word_bytes, stream, stream_index, offset)? {
                next_offsets.insert(format.end_offset(word_bytes).unwrap_or(offset));
                formats.insert(format);
            }
        }

        debug!(
            stream = stream_index,
            formats = formats.len(),
            offsets = ?next_offsets,
            "Enumerated frame formats."
        );

        per_stream.push(formats.into_iter().collect());
        offsets = next_offsets;
    }

    let combinations = per_stream
        .iter()
        .try_fold(1usize, |n, formats| n.checked_mul(formats.len()))
        .filter(|&n| n <= max_combinations)
        .ok_or_else(|| LayoutError::TooManyCombinations {
            combinations: per_stream
                .iter()
                .fold(1usize, |n, formats| n.saturating_mul(formats.len())),
            limit: max_combinations,
        })?;

    let mut joined = BTreeSet::new();
    let mut picks = Vec::with_capacity(per_stream.len());
    for combination in Combinations::new(&per_stream) {
        picks.clear();
        picks.extend(combination);
        joined.insert(join_streams(word_bytes, &picks, output_offset)?);
    }

    debug!(combinations, frames = joined.len(), "Joined frame formats.");

    Ok(joined)
}

/// Whether each of `streams` may produce a frame holding no bytes.
pub fn can_produce_zero_len_frame(streams: &[StreamDescriptor]) -> Vec<bool> {
    streams.iter().map(StreamDescriptor::can_be_empty).collect()
}

/// Cross product of one choice per set, odometer style.
struct Combinations<'a> {
    sets: &'a [Vec<FrameFormat>],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(sets: &'a [Vec<FrameFormat>]) -> Self {
        Self {
            sets,
            indices: alloc::vec![0; sets.len()],
            done: sets.iter().any(Vec::is_empty),
        }
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<&'a FrameFormat>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = self
            .sets
            .iter()
            .zip(&self.indices)
            .map(|(set, &i)| &set[i])
            .collect();

        // Advance the last position first.
        self.done = true;
        for (set, i) in self.sets.iter().zip(&mut self.indices).rev() {
            *i += 1;
            if *i < set.len() {
                self.done = false;
                break;
            }
            *i = 0;
        }

        Some(item)
    }
}
