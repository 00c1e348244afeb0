//! Synthesis from a JSON configuration supplied by a reader.
//!
//! _Requires Cargo feature `std`._

use std::io::Read;

use thiserror::Error;

use crate::{join::TransitionTable, stream::JoinConfig};

/// Errors occurring while synthesizing from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The reader does not supply a configuration.
    #[error("Malformed configuration: {0}.")]
    Json(serde_json::Error),
    #[error(transparent)]
    Synthesis(#[from] super::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Json(err)
        }
    }
}

/// Synthesize the state machine described by a JSON configuration.
///
/// This method is also re-exported as `frame_join::synth::synthesize_reader`.
///
/// _Requires Cargo feature `std`._
pub fn synthesize(r: &mut impl Read) -> Result<TransitionTable, Error> {
    let config: JoinConfig = serde_json::from_reader(r)?;

    Ok(super::synthesize(&config)?)
}
