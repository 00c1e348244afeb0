//! Synthesis from a JSON configuration held in a slice.

use thiserror::Error;

use crate::{join::TransitionTable, stream::JoinConfig};

/// Errors occurring while synthesizing from a slice.
#[derive(Debug, Error)]
pub enum Error {
    /// The slice does not hold a configuration.
    #[error("Malformed configuration: {0}.")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Synthesis(#[from] super::Error),
}

/// Synthesize the state machine described by a JSON configuration.
///
/// This method is also re-exported as `frame_join::synth::synthesize_slice`.
pub fn synthesize(r: &[u8]) -> Result<TransitionTable, Error> {
    let config: JoinConfig = serde_json::from_slice(r)?;

    Ok(super::synthesize(&config)?)
}
