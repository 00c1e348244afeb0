//! Cycle model of the input register pipelines driven by a transition table.
//!
//! Each input holds the words of one frame. The registers of an input show
//! its oldest words not yet fully consumed, and an empty register past the
//! end of the frame. Every cycle the enabled transition picks the output
//! bytes, masks out the bytes it consumed, and shifts fully consumed words
//! out of the pipeline.

use frame_join::join::{RegisterValue, TransitionTable};

/// One frame sent on an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub element_bytes: usize,
    pub elements: usize,
    pub start_offset: usize,
}

impl Frame {
    pub fn byte_count(&self) -> usize {
        self.element_bytes * self.elements
    }
}

/// Position of an input byte: stream, then index within its frame.
pub type Byte = (usize, usize);

/// Everything the join produced for one set of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Selected bytes in output order. `None` for a selection of an empty byte.
    pub bytes: Vec<Option<Byte>>,
    /// The `last` flag of each output word.
    pub last: Vec<bool>,
    pub end_state: usize,
}

/// A join which cannot consume all of its frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stall {
    /// No transition is enabled by the register contents.
    NoTransition {
        cycle: usize,
        state: usize,
        registers: Vec<Vec<RegisterValue>>,
    },
    /// Transitions keep firing without consuming the frames.
    NoProgress,
}

#[derive(Debug, Clone)]
struct Word {
    keep: Vec<bool>,
    relict: bool,
    last: bool,
    data: Vec<Option<Byte>>,
}

impl Word {
    fn register(&self) -> RegisterValue {
        RegisterValue {
            keep: self.keep.clone(),
            relict: self.relict,
            last: self.last,
        }
    }
}

/// Split `frame` of `stream` into input words.
///
/// A frame without bytes is a single empty word flagged both last and relict.
fn words(word_bytes: usize, stream: usize, frame: &Frame) -> Vec<Word> {
    let size = frame.byte_count();
    if size == 0 {
        return vec![Word {
            keep: vec![false; word_bytes],
            relict: true,
            last: true,
            data: vec![None; word_bytes],
        }];
    }

    let end = frame.start_offset + size;
    let count = end.div_ceil(word_bytes);
    (0..count)
        .map(|w| {
            let data: Vec<_> = (w * word_bytes..(w + 1) * word_bytes)
                .map(|p| (frame.start_offset..end).contains(&p).then(|| (stream, p - frame.start_offset)))
                .collect();
            Word {
                keep: data.iter().map(Option::is_some).collect(),
                relict: false,
                last: w + 1 == count,
                data,
            }
        })
        .collect()
}

/// The bytes of `frames` in the order a correct join outputs them.
pub fn expected_bytes(frames: &[Frame]) -> Vec<Option<Byte>> {
    frames
        .iter()
        .enumerate()
        .flat_map(|(stream, f)| (0..f.byte_count()).map(move |i| Some((stream, i))))
        .collect()
}

/// Join one frame per input, starting in state 0.
pub fn run(table: &TransitionTable, frames: &[Frame]) -> Result<Output, Stall> {
    let word_bytes = table.word_bytes();
    let register_counts = table.register_counts();
    let mut inputs: Vec<Vec<Word>> = frames
        .iter()
        .enumerate()
        .map(|(stream, f)| words(word_bytes, stream, f))
        .collect();
    let max_cycles = 2 * inputs.iter().map(Vec::len).sum::<usize>() + frames.len();

    let mut output = Output {
        bytes: Vec::new(),
        last: Vec::new(),
        end_state: 0,
    };
    let mut state = 0;

    for cycle in 0..=max_cycles {
        if inputs.iter().all(Vec::is_empty) {
            output.end_state = state;
            return Ok(output);
        }

        let registers: Vec<Vec<RegisterValue>> = inputs
            .iter()
            .zip(&register_counts)
            .map(|(words, &count)| {
                (0..count)
                    .map(|t| match words.get(t) {
                        Some(w) => w.register(),
                        None => RegisterValue {
                            keep: vec![false; word_bytes],
                            relict: false,
                            last: false,
                        },
                    })
                    .collect()
            })
            .collect();

        let Some(t) = table.select(state, &registers) else {
            return Err(Stall::NoTransition {
                cycle,
                state,
                registers,
            });
        };

        for sel in t.output_mux().iter().flatten() {
            let byte = inputs[sel.stream]
                .get(sel.time)
                .and_then(|w| w.data[sel.byte]);
            output.bytes.push(byte);
        }
        output.last.push(t.last());

        for (stream, words) in inputs.iter_mut().enumerate() {
            if !t.input_rd()[stream] {
                continue;
            }
            consume(words, &t.input_keep_mask()[stream], register_counts[stream]);
        }

        state = t.next_state();
    }

    Err(Stall::NoProgress)
}

/// Apply the keep masks of one transition to the registers of an input.
fn consume(words: &mut Vec<Word>, masks: &[Vec<bool>], register_count: usize) {
    let window = words.len().min(register_count);
    let mut had_bytes = Vec::with_capacity(window);
    let mut touched = Vec::with_capacity(window);

    for (w, mask) in words.iter_mut().take(window).zip(masks) {
        let kept: Vec<bool> = w.keep.iter().zip(mask).map(|(&k, &m)| k && m).collect();
        had_bytes.push(w.keep.contains(&true));
        touched.push(kept != w.keep);
        w.keep = kept;
    }

    // The oldest word leaves once empty, younger ones only if emptied now.
    let mut consumed = 0;
    while consumed < window
        && !words[consumed].keep.contains(&true)
        && (consumed == 0 || had_bytes[consumed])
    {
        consumed += 1;
    }
    words.drain(..consumed);

    if touched.get(consumed) == Some(&true) {
        words[0].relict = true;
    }
}
