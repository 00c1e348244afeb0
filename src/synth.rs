//! One-call synthesis of a join state machine.
//!
//! [`synthesize`] runs every pass on a [`JoinConfig`]: validation, frame
//! format enumeration, byte destination resolution and state machine
//! construction. The [`slice`] and [`reader`] entry points first deserialize
//! the configuration from JSON.

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::synthesize as synthesize_reader;
pub use slice::synthesize as synthesize_slice;

use thiserror::Error;
use tracing::debug;

use crate::{
    join::{InvariantViolation, TransitionTable, build_fsm, resolve_input_bytes_destinations},
    layout::{LayoutError, can_produce_zero_len_frame, streams_to_all_possible_frame_formats},
    stream::{ConfigError, JoinConfig, StreamError, Unsupported},
};

/// Errors occurring while synthesizing a join state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A malformed configuration.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    /// A configuration the synthesizer does not handle.
    #[error("Unsupported configuration: {0}")]
    Unsupported(#[from] Unsupported),
    /// A broken invariant, or a join the state machine cannot express.
    #[error("Synthesis failed: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl From<StreamError> for Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Config(err) => Self::Configuration(err),
            StreamError::Unsupported(err) => Self::Unsupported(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::OffsetOutOfRange { offset, word_bytes } => {
                Self::Configuration(ConfigError::StartOffsetOutOfRange { offset, word_bytes })
            }
            LayoutError::ZeroElementSize => Self::Configuration(ConfigError::ZeroElementWidth),
            LayoutError::SizeOverflow {
                element_size,
                element_count,
            } => Self::Configuration(ConfigError::FrameTooLarge {
                element_size,
                element_count,
            }),
            LayoutError::TooManyCombinations {
                combinations,
                limit,
            } => Self::Unsupported(Unsupported::TooManyCombinations {
                combinations,
                limit,
            }),
        }
    }
}

/// Synthesize the state machine joining the streams of `config`.
pub fn synthesize(config: &JoinConfig) -> Result<TransitionTable, Error> {
    debug!(
        word_bytes = config.word_bytes,
        output_offset = config.output_offset,
        streams = config.streams.len(),
        "Synthesizing join."
    );

    let table = run(config);
    if let Err(err) = &table {
        debug!(error = %err, "Synthesis failed.");
    }
    table
}

fn run(config: &JoinConfig) -> Result<TransitionTable, Error> {
    config.validate()?;

    let word_bytes = config.word_bytes;
    let input_cnt = config.streams.len();

    let frames = streams_to_all_possible_frame_formats(
        word_bytes,
        &config.streams,
        config.output_offset,
        config.max_frame_formats,
    )?;
    let destinations = resolve_input_bytes_destinations(word_bytes, &frames, input_cnt)?;
    let table = build_fsm(
        word_bytes,
        input_cnt,
        &destinations,
        &can_produce_zero_len_frame(&config.streams),
    )?;

    Ok(table)
}
