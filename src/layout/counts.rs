//! Selection of representative frame byte counts.

use alloc::collections::{BTreeSet, btree_set};
use core::iter::{self, Once};

use either::Either::{self, Left, Right};

use crate::stream::{LengthRange, StreamDescriptor};

use super::{LayoutError, check_offset};

/// Words spanned by the longest representative frame: the first word, two
/// full body words and the last word.
const MAX_REPRESENTATIVE_WORDS: usize = 4;

/// Counts sampled past the minimum of a wide length range, in periods of two
/// words.
const WINDOW_PERIODS: usize = 3;

/// Byte count of the shortest frame laid out like `element_count` elements.
///
/// Frames spanning more than [`MAX_REPRESENTATIVE_WORDS`] words are shortened
/// by whole body words. This keeps the valid bytes of the first and the last
/// word, and every window of two consecutive words a shifted frame is
/// consumed through.
fn representative_size(
    word_bytes: usize,
    offset: usize,
    element_size: usize,
    element_count: usize,
) -> Result<usize, LayoutError> {
    let size = element_size
        .checked_mul(element_count)
        .filter(|size| offset.checked_add(*size).is_some())
        .ok_or(LayoutError::SizeOverflow {
            element_size,
            element_count,
        })?;

    let words = (offset + size).div_ceil(word_bytes);
    let surplus = words.saturating_sub(MAX_REPRESENTATIVE_WORDS);

    Ok(size - surplus * word_bytes)
}

/// Byte counts which together cover every distinct layout of a frame.
///
/// Two lengths are considered equivalent if they produce the same number of
/// valid bytes in the first and the last word, and the same sequence of
/// register contents while the frame is consumed. Long frames are shortened
/// to a representative of at most four words. Beyond a few words this
/// signature repeats with a period of two words, so a wide or unbounded range
/// is only sampled over a window of three periods from its minimum length. A
/// frame of exactly one length yields exactly one count.
///
/// The counts are produced in ascending order.
pub fn important_byte_counts(
    word_bytes: usize,
    output_offset: usize,
    input_offset: usize,
    element_size: usize,
    length: LengthRange,
) -> Result<Either<Once<usize>, btree_set::IntoIter<usize>>, LayoutError> {
    check_offset(output_offset, word_bytes)?;
    check_offset(input_offset, word_bytes)?;
    if element_size == 0 {
        Err(LayoutError::ZeroElementSize)?;
    }

    let offset = output_offset.max(input_offset);
    let size = |count| representative_size(word_bytes, offset, element_size, count);

    if length.is_exact() {
        return Ok(Left(iter::once(size(length.min)?)));
    }

    let window = word_bytes.saturating_mul(2 * WINDOW_PERIODS);
    let last = length.min.saturating_add(window);
    let last = length.max.map_or(last, |max| max.min(last));

    let sizes = (length.min..=last).map(size).collect::<Result<BTreeSet<_>, _>>()?;

    Ok(Right(sizes.into_iter()))
}

/// Output offsets at which a frame following one of `stream` may start.
pub fn next_frame_offsets(stream: &StreamDescriptor, word_bytes: usize) -> BTreeSet<usize> {
    let element_size = stream.element_bytes();
    let mut offsets = BTreeSet::new();
    if word_bytes == 0 {
        return offsets;
    }

    let step = element_size % word_bytes;
    let mut offset = (stream.length.min % word_bytes) * step % word_bytes;
    let mut count = stream.length.min;
    while stream.length.max.is_none_or(|max| count <= max) && offsets.insert(offset) {
        let Some(next) = count.checked_add(1) else {
            break;
        };
        count = next;
        offset = (offset + step) % word_bytes;
    }

    offsets
}
