#![no_std]

//! Synthesizer for the control logic of a frame-joining stream pipeline.
//!
//! Given any number of framed input byte streams, each described only by its
//! element width, the byte offsets its frames may start at, and the range of
//! its frame lengths, this crate computes a deterministic finite-state machine
//! which merges the streams into a single output stream. Output bytes keep
//! their order, padding is stripped, and the end of the joined frame is
//! flagged. The machine's size depends only on the alignment configuration,
//! never on the length of the frames.
//!
//! Most users should begin with [`synth::synthesize`], or the JSON entry points
//! in the [`synth`] module. The individual passes are exposed for applications
//! needing finer control:
//!
//! 1. [`layout`] enumerates a representative set of output byte layouts.
//! 2. [`join::resolve_input_bytes_destinations`] inverts those layouts into the
//!    contexts in which every input byte may be consumed.
//! 3. [`join::build_fsm`] merges these contexts into a [`join::TransitionTable`].
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable reader-based configuration loading (default).

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod join;
pub mod layout;
pub mod stream;
pub mod synth;
