//! Descriptions of the input streams and of the joined output.

use alloc::{collections::BTreeSet, vec::Vec};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on the number of frame format combinations.
pub const DEFAULT_MAX_FRAME_FORMATS: usize = 1 << 16;

/// Number of elements a single frame of a stream may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LengthRange {
    /// Minimum element count (inclusive).
    pub min: usize,
    /// Maximum element count (inclusive), `None` if unbounded.
    #[serde(default)]
    pub max: Option<usize>,
}

impl LengthRange {
    /// Frames of exactly `n` elements.
    pub fn exact(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// Frames of `min..=max` elements.
    pub fn bounded(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// Frames of at least `min` elements.
    pub fn unbounded(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Whether every frame holds the same number of elements.
    pub fn is_exact(&self) -> bool {
        self.max == Some(self.min)
    }
}

/// Static description of one input stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Width of a single element, in bits.
    pub element_bits: usize,
    /// Byte offsets within a word at which a frame may start.
    pub start_offsets: BTreeSet<usize>,
    /// Range of frame lengths, in elements.
    pub length: LengthRange,
}

impl StreamDescriptor {
    /// A stream of `element_bits` wide elements, its frames holding `length`
    /// elements and starting at any of `start_offsets`.
    pub fn new(
        element_bits: usize,
        length: LengthRange,
        start_offsets: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            element_bits,
            start_offsets: start_offsets.into_iter().collect(),
            length,
        }
    }

    /// Width of a single element, in bytes.
    pub fn element_bytes(&self) -> usize {
        self.element_bits / 8
    }

    /// Whether a frame of this stream may hold no bytes at all.
    pub fn can_be_empty(&self) -> bool {
        self.length.min == 0
    }

    /// Check that the stream can be joined into words of `word_bytes` bytes.
    pub fn validate(&self, word_bytes: usize) -> Result<(), StreamError> {
        if self.element_bits == 0 {
            Err(ConfigError::ZeroElementWidth)?;
        }
        if self.element_bits % 8 != 0 {
            Err(Unsupported::SubByteElement(self.element_bits))?;
        }
        if self.start_offsets.is_empty() {
            Err(ConfigError::NoStartOffsets)?;
        }
        if let Some(&offset) = self.start_offsets.iter().find(|&&o| o >= word_bytes) {
            Err(ConfigError::StartOffsetOutOfRange { offset, word_bytes })?;
        }
        if let Some(max) = self.length.max {
            if self.length.min > max {
                Err(ConfigError::InvertedLengthRange {
                    min: self.length.min,
                    max,
                })?;
            }
        }

        Ok(())
    }
}

/// Configuration of a complete join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Number of bytes in a single input and output word.
    pub word_bytes: usize,
    /// Byte offset of the first output byte within the first output word.
    #[serde(default)]
    pub output_offset: usize,
    /// Input streams, in output order.
    pub streams: Vec<StreamDescriptor>,
    /// Largest accepted number of frame format combinations.
    #[serde(default = "default_max_frame_formats")]
    pub max_frame_formats: usize,
}

fn default_max_frame_formats() -> usize {
    DEFAULT_MAX_FRAME_FORMATS
}

impl JoinConfig {
    /// Join `streams` into words of `word_bytes` bytes, starting at the first
    /// byte of a word and with the default combination bound.
    pub fn new(word_bytes: usize, streams: Vec<StreamDescriptor>) -> Self {
        Self {
            word_bytes,
            output_offset: 0,
            streams,
            max_frame_formats: DEFAULT_MAX_FRAME_FORMATS,
        }
    }

    /// Start the output frame at byte `output_offset` of its first word.
    pub fn with_output_offset(mut self, output_offset: usize) -> Self {
        self.output_offset = output_offset;
        self
    }

    /// Whether each stream may produce a frame holding no bytes.
    pub fn can_produce_zero_len_frame(&self) -> Vec<bool> {
        self.streams.iter().map(StreamDescriptor::can_be_empty).collect()
    }

    /// Check that the configuration describes a join the synthesizer supports.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.word_bytes == 0 {
            Err(ConfigError::ZeroWordWidth)?;
        }
        if self.output_offset >= self.word_bytes {
            Err(ConfigError::OutputOffsetOutOfRange {
                offset: self.output_offset,
                word_bytes: self.word_bytes,
            })?;
        }
        if self.streams.is_empty() {
            Err(ConfigError::NoStreams)?;
        }

        for (index, stream) in self.streams.iter().enumerate() {
            stream.validate(self.word_bytes).map_err(|e| e.at(index))?;
        }

        Ok(())
    }
}

/// A malformed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Words of zero bytes.
    #[error("Word width must be at least one byte.")]
    ZeroWordWidth,
    /// Output offset outside of the first word.
    #[error("Output offset ({offset}) is outside of a {word_bytes} byte word.")]
    OutputOffsetOutOfRange { offset: usize, word_bytes: usize },
    /// Nothing to join.
    #[error("At least one input stream is required.")]
    NoStreams,
    /// Elements of zero bits.
    #[error("Element width must be non-zero.")]
    ZeroElementWidth,
    /// No offset a frame could start at.
    #[error("At least one start offset is required.")]
    NoStartOffsets,
    /// Start offset outside of a word.
    #[error("Start offset ({offset}) is outside of a {word_bytes} byte word.")]
    StartOffsetOutOfRange { offset: usize, word_bytes: usize },
    /// Minimum frame length above the maximum.
    #[error("Minimum frame length ({min}) exceeds the maximum ({max}).")]
    InvertedLengthRange { min: usize, max: usize },
    /// A frame whose byte size does not fit in `usize`.
    #[error("A frame of {element_count} elements of {element_size} bytes is too large.")]
    FrameTooLarge {
        element_size: usize,
        element_count: usize,
    },
    /// An error in the description of a single stream.
    #[error("Stream {index}: {source}")]
    Stream {
        index: usize,
        #[source]
        source: alloc::boxed::Box<ConfigError>,
    },
}

/// A recognized configuration the synthesizer intentionally does not handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unsupported {
    /// Elements which are not a whole number of bytes.
    #[error("Element width ({0} bits) is not a whole number of bytes.")]
    SubByteElement(usize),
    /// Too many frame format combinations to enumerate.
    #[error("Found {combinations} frame format combinations, more than the limit of {limit}.")]
    TooManyCombinations { combinations: usize, limit: usize },
    /// An unsupported property of a single stream.
    #[error("Stream {index}: {source}")]
    Stream {
        index: usize,
        #[source]
        source: alloc::boxed::Box<Unsupported>,
    },
}

/// Either kind of rejection of a stream configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Unsupported(#[from] Unsupported),
}

impl StreamError {
    /// Attribute the error to the stream at `index`.
    fn at(self, index: usize) -> Self {
        match self {
            Self::Config(source) => Self::Config(ConfigError::Stream {
                index,
                source: source.into(),
            }),
            Self::Unsupported(source) => Self::Unsupported(Unsupported::Stream {
                index,
                source: source.into(),
            }),
        }
    }
}
