//! Enumeration of candidate output byte layouts.
//!
//! A frame of a stream may start at several byte offsets and hold any number
//! of elements within its length range. Rather than considering every length,
//! the enumerator picks a small set of representative byte counts which cover
//! every structurally distinct layout: the number of valid bytes in the first
//! and last word, and the full words in between. A long frame is represented
//! by one with only two body words, and the valid bytes of its last word are
//! periodic in the frame length, which keeps the set finite even for unbounded
//! streams.
//!
//! The representative formats of each stream are then composed in order, the
//! end offset of one stream's format determining where the next stream's
//! format starts, and every combination is joined into a single output frame.
//!
//! # Architecture
//!
//! - [`provenance`] holds the value types describing a layout.
//! - [`frame`] places the bytes of one frame, and joins frames of several
//!   streams.
//! - [`counts`] selects the representative byte counts.
//! - [`enumerate`] builds the set of all representative output frames.

pub mod counts;
pub mod enumerate;
pub mod frame;
pub mod provenance;

use thiserror::Error;

pub use counts::{important_byte_counts, next_frame_offsets};
pub use enumerate::{
    can_produce_zero_len_frame, stream_to_all_possible_frame_formats,
    streams_to_all_possible_frame_formats,
};
pub use frame::{create_frame, join_streams};
pub use provenance::{ByteProvenance, FrameFormat, Word};

/// An error laying out bytes of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Offset outside of a word.
    #[error("Offset ({offset}) is outside of a {word_bytes} byte word.")]
    OffsetOutOfRange { offset: usize, word_bytes: usize },
    /// Elements of zero bytes.
    #[error("Element size must be non-zero.")]
    ZeroElementSize,
    /// A frame whose byte size does not fit in `usize`.
    #[error("A frame of {element_count} elements of {element_size} bytes is too large.")]
    SizeOverflow {
        element_size: usize,
        element_count: usize,
    },
    /// Too many frame format combinations to enumerate.
    #[error("Found {combinations} frame format combinations, more than the limit of {limit}.")]
    TooManyCombinations { combinations: usize, limit: usize },
}

/// Check that `offset` addresses a byte within a word.
pub(crate) fn check_offset(offset: usize, word_bytes: usize) -> Result<(), LayoutError> {
    if offset < word_bytes {
        Ok(())
    } else {
        Err(LayoutError::OffsetOutOfRange { offset, word_bytes })
    }
}
