//! Synthesis of the join state machine.
//!
//! The enumerated frame formats tell, for every output word of every
//! candidate layout, which input byte lands at which output position. This
//! module turns that knowledge into a finite-state machine driving a register
//! pipeline per input stream and a byte multiplexer per output byte.
//!
//! # Architecture
//!
//! Synthesis happens in two steps.
//!
//! 1. [`resolve_input_bytes_destinations`] inverts the frame formats into a
//!    [`ByteDestinationMap`]: for every input byte position of every stream,
//!    the sub-states (one per output word of one frame format) consuming it,
//!    how many pipeline stages behind the least advanced byte of its stream it
//!    sits, and where it lands in the output word.
//! 2. [`build_fsm`] collects the sub-states back, one [`TransitionItem`] per
//!    sub-state, and merges them into states. The state of the machine is the
//!    index of the least advanced stream contributing to the output word being
//!    assembled, so there are exactly as many states as there are streams.
//!
//! A transition is guarded by a conjunction over the keep, last and relict
//! bits of the pipeline registers, expressed with [`RegisterGuard`]s. After
//! merging, the transitions of each state are deduplicated, sorted, and
//! checked to be mutually exclusive.

pub mod build;
pub mod destination;
pub mod info;
pub mod item;
pub mod table;

use alloc::boxed::Box;

use thiserror::Error;

pub use build::build_fsm;
pub use destination::{
    ByteDestinationMap, Destination, StateLabel, resolve_input_bytes_destinations,
};
pub use info::{Source, StateInfo};
pub use item::{Bit, MuxSel, RegisterGuard, RegisterValue, TransitionItem};
pub use table::TransitionTable;

/// A broken internal invariant of the synthesis.
///
/// None of these is expected for a valid configuration, except
/// [`InvariantViolation::NonDeterministic`] which signals a stream
/// combination the state machine cannot tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A byte of a stream precedes the least advanced byte of that stream.
    #[error("Negative time offset of stream {stream} in sub-state {label}.")]
    NegativeTimeOffset { label: StateLabel, stream: usize },
    /// Two sources for the same output byte.
    #[error("Output byte {output_byte} of sub-state {label} has more than one source.")]
    DuplicateSource { label: StateLabel, output_byte: usize },
    /// Output bytes not in non-decreasing stream order.
    #[error("Output byte {output_byte} of sub-state {label} comes from an earlier stream than its predecessor.")]
    StreamOrder { label: StateLabel, output_byte: usize },
    /// A sub-state without any source byte.
    #[error("Sub-state {label} has no source byte.")]
    EmptySubState { label: StateLabel },
    /// Inputs describing a different number of streams.
    #[error("Expected {expected} streams, found {found}.")]
    StreamCountMismatch { expected: usize, found: usize },
    /// Inputs describing words of a different width.
    #[error("Expected {expected} byte words, found {found}.")]
    WordWidthMismatch { expected: usize, found: usize },
    /// Two transitions of a state which may be enabled at once.
    #[error("State {state} has overlapping transitions.")]
    NonDeterministic {
        state: usize,
        first: Box<TransitionItem>,
        second: Box<TransitionItem>,
    },
    /// A transition into a state without transitions.
    #[error("Transition from state {state} into state {next_state} which has no transitions.")]
    DeadEnd { state: usize, next_state: usize },
}
