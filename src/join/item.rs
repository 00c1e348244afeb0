//! Transitions of the join state machine and their guards.

use alloc::{vec, vec::Vec};
use core::{cmp::Ordering, fmt};

/// Required value of a single register bit.
///
/// Ordered `Zero < One < DontCare`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bit {
    Zero,
    One,
    #[default]
    DontCare,
}

impl Bit {
    /// Whether the bit takes part in a guard.
    pub fn is_care(self) -> bool {
        self != Bit::DontCare
    }

    pub fn accepts(self, value: bool) -> bool {
        match self {
            Bit::Zero => !value,
            Bit::One => value,
            Bit::DontCare => true,
        }
    }

    /// Whether no value satisfies both `self` and `other`.
    pub fn excludes(self, other: Bit) -> bool {
        self.is_care() && other.is_care() && self != other
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bit::Zero => "0",
            Bit::One => "1",
            Bit::DontCare => "X",
        })
    }
}

/// Condition on the contents of one pipeline register.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterGuard {
    /// Validity of each byte of the register.
    pub keep: Vec<Bit>,
    /// Whether the register holds the remainder of a partially consumed last
    /// word.
    pub relict: Bit,
    /// Whether the register holds the last word of a frame.
    pub last: Bit,
}

impl RegisterGuard {
    /// A guard accepting any register contents.
    pub fn dont_care(word_bytes: usize) -> Self {
        Self {
            keep: vec![Bit::DontCare; word_bytes],
            relict: Bit::DontCare,
            last: Bit::DontCare,
        }
    }

    /// A guard matching an empty last word, the whole frame of a stream which
    /// produced no bytes.
    pub fn empty_last_word(word_bytes: usize) -> Self {
        Self {
            keep: vec![Bit::Zero; word_bytes],
            relict: Bit::One,
            last: Bit::One,
        }
    }

    fn bits(&self) -> impl Iterator<Item = Bit> + '_ {
        self.keep.iter().copied().chain([self.relict, self.last])
    }

    pub fn accepts(&self, value: &RegisterValue) -> bool {
        let values = value.keep.iter().copied().chain([value.relict, value.last]);
        self.keep.len() == value.keep.len() && self.bits().zip(values).all(|(b, v)| b.accepts(v))
    }

    /// Whether no register contents satisfy both `self` and `other`.
    pub fn excludes(&self, other: &RegisterGuard) -> bool {
        self.bits().zip(other.bits()).any(|(a, b)| a.excludes(b))
    }

    /// Whether any bit takes part in the guard.
    pub fn is_care(&self) -> bool {
        self.bits().any(Bit::is_care)
    }
}

impl fmt::Display for RegisterGuard {
    /// Keep bits in byte order, then relict and last, e.g. `01:X1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for k in &self.keep {
            write!(f, "{k}")?;
        }
        write!(f, ":{}{}", self.relict, self.last)
    }
}

/// Concrete contents of one pipeline register.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterValue {
    pub keep: Vec<bool>,
    pub relict: bool,
    pub last: bool,
}

/// Selection of an input byte by an output byte multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MuxSel {
    pub stream: usize,
    /// Pipeline stage.
    pub time: usize,
    pub byte: usize,
}

impl fmt::Display for MuxSel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.stream, self.time, self.byte)
    }
}

/// One transition of the join state machine.
///
/// Register data is indexed by stream, then by pipeline stage, then by byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionItem {
    pub(crate) state: usize,
    pub(crate) next_state: usize,
    pub(crate) input: Vec<Vec<RegisterGuard>>,
    pub(crate) input_keep_mask: Vec<Vec<Vec<bool>>>,
    pub(crate) input_rd: Vec<bool>,
    pub(crate) output_keep: Vec<bool>,
    pub(crate) output_mux: Vec<Option<MuxSel>>,
    pub(crate) last: bool,
}

impl TransitionItem {
    /// A transition which requires, consumes and produces nothing.
    ///
    /// `lookahead` holds the number of pipeline stages beyond the first of
    /// each stream.
    pub(crate) fn new(
        state: usize,
        next_state: usize,
        last: bool,
        word_bytes: usize,
        lookahead: &[usize],
    ) -> Self {
        Self {
            state,
            next_state,
            input: lookahead
                .iter()
                .map(|&l| vec![RegisterGuard::dont_care(word_bytes); l + 1])
                .collect(),
            input_keep_mask: lookahead
                .iter()
                .map(|&l| vec![vec![true; word_bytes]; l + 1])
                .collect(),
            input_rd: vec![false; lookahead.len()],
            output_keep: vec![false; word_bytes],
            output_mux: vec![None; word_bytes],
            last,
        }
    }

    pub fn state(&self) -> usize {
        self.state
    }

    pub fn next_state(&self) -> usize {
        self.next_state
    }

    /// Guards on the pipeline registers.
    pub fn input(&self) -> &[Vec<RegisterGuard>] {
        &self.input
    }

    /// Keep masks applied to the pipeline registers once the transition
    /// fires. A cleared bit marks a consumed byte.
    pub fn input_keep_mask(&self) -> &[Vec<Vec<bool>>] {
        &self.input_keep_mask
    }

    /// Read enable of each stream.
    pub fn input_rd(&self) -> &[bool] {
        &self.input_rd
    }

    pub fn output_keep(&self) -> &[bool] {
        &self.output_keep
    }

    /// Source of each output byte.
    pub fn output_mux(&self) -> &[Option<MuxSel>] {
        &self.output_mux
    }

    /// Whether the output word is the last word of the joined frame.
    pub fn last(&self) -> bool {
        self.last
    }

    /// Whether the transition produces an output word.
    ///
    /// A word without any valid byte is produced only for a joined frame
    /// made entirely of empty frames, in which case every stream is read.
    pub fn output_valid(&self) -> bool {
        self.output_keep.iter().any(|&k| k) || self.input_rd.iter().all(|&rd| rd)
    }

    /// Whether the guard of the transition holds for `registers`.
    pub fn is_enabled(&self, registers: &[Vec<RegisterValue>]) -> bool {
        self.input.len() == registers.len()
            && self.input.iter().zip(registers).all(|(guards, values)| {
                guards.len() == values.len()
                    && guards.iter().zip(values).all(|(g, v)| g.accepts(v))
            })
    }

    /// Whether the guards of `self` and `other` are mutually exclusive.
    pub fn excludes(&self, other: &TransitionItem) -> bool {
        self.input
            .iter()
            .zip(&other.input)
            .flat_map(|(a, b)| a.iter().zip(b))
            .any(|(a, b)| a.excludes(b))
    }

    /// Require an empty last word in the first stage of `stream`, and consume
    /// it.
    pub(crate) fn mark_zero_len(&mut self, stream: usize) {
        let word_bytes = self.output_keep.len();
        self.input[stream][0] = RegisterGuard::empty_last_word(word_bytes);
        self.input_rd[stream] = true;
        self.input_keep_mask[stream][0] = vec![false; word_bytes];
    }
}

impl Ord for TransitionItem {
    /// Structural order, with unselected output bytes after selected ones.
    fn cmp(&self, other: &Self) -> Ordering {
        fn mux_key(m: &Option<MuxSel>) -> (bool, Option<MuxSel>) {
            (m.is_none(), *m)
        }

        self.state
            .cmp(&other.state)
            .then_with(|| self.next_state.cmp(&other.next_state))
            .then_with(|| self.input.cmp(&other.input))
            .then_with(|| self.input_keep_mask.cmp(&other.input_keep_mask))
            .then_with(|| self.input_rd.cmp(&other.input_rd))
            .then_with(|| self.output_keep.cmp(&other.output_keep))
            .then_with(|| {
                self.output_mux
                    .iter()
                    .map(mux_key)
                    .cmp(other.output_mux.iter().map(mux_key))
            })
            .then_with(|| self.last.cmp(&other.last))
    }
}

impl PartialOrd for TransitionItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
