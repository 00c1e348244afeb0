//! Placement of frame bytes into output words.

use alloc::vec::Vec;

use super::{ByteProvenance, FrameFormat, LayoutError, Word, check_offset};

/// Lay out `byte_count` consecutive bytes of a stream.
///
/// The bytes are taken from the stream starting at `input_offset` within its
/// first input word, and placed into output words starting at `output_offset`
/// within the first output word. Incomplete leading and trailing output words
/// are padded. Each byte is flagged if its input word is the last word of the
/// frame.
pub fn create_frame(
    word_bytes: usize,
    stream: usize,
    byte_count: usize,
    output_offset: usize,
    input_offset: usize,
) -> Result<FrameFormat, LayoutError> {
    check_offset(output_offset, word_bytes)?;
    check_offset(input_offset, word_bytes)?;

    if byte_count == 0 {
        return Ok(FrameFormat::default());
    }

    let end = input_offset
        .checked_add(byte_count)
        .ok_or(LayoutError::SizeOverflow {
            element_size: 1,
            element_count: byte_count,
        })?;
    let last_word = (end - 1) / word_bytes;
    let data = (input_offset..end).map(|i| {
        let word = i / word_bytes;
        Some(ByteProvenance {
            stream,
            word,
            byte: i % word_bytes,
            is_last_word: word == last_word,
        })
    });

    let bytes = core::iter::repeat_n(None, output_offset).chain(data);

    Ok(FrameFormat::from_words(into_words(bytes, word_bytes)))
}

/// Join the frames of several streams into one continuous output frame.
///
/// Padding within the frames is dropped and the remaining bytes re-chunked
/// into words, the first word starting at `offset`.
pub fn join_streams(
    word_bytes: usize,
    frames: &[&FrameFormat],
    offset: usize,
) -> Result<FrameFormat, LayoutError> {
    check_offset(offset, word_bytes)?;

    let data = frames.iter().flat_map(|f| f.bytes()).filter(Option::is_some);
    let bytes = core::iter::repeat_n(None, offset).chain(data);

    Ok(FrameFormat::from_words(into_words(bytes, word_bytes)))
}

/// Chunk bytes into words, padding the final word.
fn into_words(bytes: impl Iterator<Item = Option<ByteProvenance>>, word_bytes: usize) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();

    for b in bytes {
        match words.last_mut() {
            Some(word) if word.len() < word_bytes => word.push(b),
            _ => {
                let mut word = Vec::with_capacity(word_bytes);
                word.push(b);
                words.push(word);
            }
        }
    }

    if let Some(word) = words.last_mut() {
        word.resize(word_bytes, None);
    }

    words
}
