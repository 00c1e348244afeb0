//! Value types describing where each output byte comes from.

use alloc::vec::Vec;

/// Source of a single output byte.
///
/// Ordered by stream, then input word, then byte within that word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteProvenance {
    /// Index of the input stream.
    pub stream: usize,
    /// Index of the input word within its frame.
    pub word: usize,
    /// Index of the byte within its input word.
    pub byte: usize,
    /// Whether the input word is the last word of its frame.
    pub is_last_word: bool,
}

/// One output word. Absent bytes are padding.
pub type Word = Vec<Option<ByteProvenance>>;

/// A candidate layout of output bytes, as a sequence of output words.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameFormat {
    words: Vec<Word>,
}

impl FrameFormat {
    pub(crate) fn from_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over every byte position of every word, padding included.
    pub fn bytes(&self) -> impl Iterator<Item = Option<ByteProvenance>> + '_ {
        self.words.iter().flatten().copied()
    }

    /// Offset at which data following this format starts in the output.
    ///
    /// This is the position after the last valid byte of the final word, with
    /// a full word wrapping to zero. Returns `None` for a format without any
    /// valid byte.
    pub fn end_offset(&self, word_bytes: usize) -> Option<usize> {
        let last = self.words.last()?;
        let end = last.iter().rposition(Option::is_some)? + 1;
        Some(end % word_bytes)
    }
}
