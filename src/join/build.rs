//! Construction of the transition table from byte destinations.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec,
    vec::Vec,
};

use tracing::{debug, trace};

use super::{
    Bit, ByteDestinationMap, InvariantViolation, MuxSel, Source, StateInfo, StateLabel,
    TransitionItem, TransitionTable,
};

/// Build the join state machine of `input_cnt` streams.
///
/// `can_be_zero_len` tells, per stream, whether a frame may hold no bytes at
/// all. The transitions of each state are deduplicated and sorted, then
/// checked to be mutually exclusive and to lead to states with transitions.
pub fn build_fsm(
    word_bytes: usize,
    input_cnt: usize,
    destinations: &ByteDestinationMap,
    can_be_zero_len: &[bool],
) -> Result<TransitionTable, InvariantViolation> {
    for found in [destinations.stream_count(), can_be_zero_len.len()] {
        if found != input_cnt {
            Err(InvariantViolation::StreamCountMismatch {
                expected: input_cnt,
                found,
            })?;
        }
    }
    if destinations.word_bytes() != word_bytes {
        Err(InvariantViolation::WordWidthMismatch {
            expected: word_bytes,
            found: destinations.word_bytes(),
        })?;
    }

    let sub_states = collect_sub_states(word_bytes, destinations)?;
    let lookahead = destinations.max_lookahead();
    let builder = Builder {
        word_bytes,
        input_cnt,
        lookahead: &lookahead,
        can_be_zero_len,
        sub_states: &sub_states,
    };

    let mut states: Vec<Vec<TransitionItem>> = vec![Vec::new(); input_cnt];
    let mut relicts = BTreeSet::new();
    for info in sub_states.values() {
        let t = builder.transition(info, &mut relicts)?;
        trace!(
            frame = info.label().frame,
            word = info.label().word,
            state = t.state,
            next_state = t.next_state,
            last = t.last,
            "Built transition."
        );
        states[t.state].push(t);
    }

    builder.add_zero_len_prefix(&mut states);

    let table = TransitionTable::from_states(
        word_bytes,
        lookahead,
        states.into_iter().map(BTreeSet::from_iter).collect(),
    );
    table.check_determinism()?;
    table.check_liveness()?;

    debug!(
        states = table.state_count(),
        lookahead = ?table.max_lookahead_for_input(),
        transitions = ?table.states().map(<[_]>::len).collect::<Vec<_>>(),
        "Built transition table."
    );

    Ok(table)
}

/// Invert the destination map into the sources of every sub-state.
fn collect_sub_states(
    word_bytes: usize,
    destinations: &ByteDestinationMap,
) -> Result<BTreeMap<StateLabel, StateInfo>, InvariantViolation> {
    let mut sub_states = BTreeMap::new();

    for (stream, byte, d) in destinations.iter() {
        sub_states
            .entry(d.label)
            .or_insert_with(|| StateInfo::new(d.label, word_bytes))
            .set_output(
                d.output_byte,
                Source {
                    stream,
                    time: d.time,
                    byte,
                    is_last_word: d.is_last_word,
                },
            )?;
    }

    Ok(sub_states)
}

struct Builder<'a> {
    word_bytes: usize,
    input_cnt: usize,
    lookahead: &'a [usize],
    can_be_zero_len: &'a [bool],
    sub_states: &'a BTreeMap<StateLabel, StateInfo>,
}

impl Builder<'_> {
    /// Transition producing the output word of sub-state `info`.
    ///
    /// Sub-states must be visited in label order: `relicts` collects the
    /// sub-states starting with the remainder of a word partially consumed by
    /// their predecessor.
    fn transition(
        &self,
        info: &StateInfo,
        relicts: &mut BTreeSet<StateLabel>,
    ) -> Result<TransitionItem, InvariantViolation> {
        let word_bytes = self.word_bytes;
        let label = info.label();
        let next = self.sub_states.get(&label.next());
        let next_state = next.map(StateInfo::state_index).transpose()?.unwrap_or(0);

        let mut t = TransitionItem::new(
            info.state_index()?,
            next_state,
            next.is_none(),
            word_bytes,
            self.lookahead,
        );

        let outputs = info.outputs();
        let mut prev: Option<&Source> = None;
        for (output_byte, o) in outputs.iter().enumerate() {
            let Some(o) = o else {
                prev = None;
                continue;
            };
            let is_last_out = output_byte == word_bytes - 1;
            let is_last_byte = o.byte == word_bytes - 1;

            let reg = &mut t.input[o.stream][o.time];
            reg.keep[o.byte] = Bit::One;
            reg.last = o.is_last_word.into();
            t.output_mux[output_byte] = Some(MuxSel {
                stream: o.stream,
                time: o.time,
                byte: o.byte,
            });
            t.input_rd[o.stream] = true;
            t.input_keep_mask[o.stream][o.time][o.byte] = false;
            t.output_keep[output_byte] = true;

            let following = if is_last_out {
                next.and_then(|n| n.outputs().first()).and_then(Option::as_ref)
            } else {
                outputs[output_byte + 1].as_ref()
            };
            if following.is_some_and(|f| f.stream < o.stream) {
                Err(InvariantViolation::StreamOrder { label, output_byte })?;
            }

            // The rest of the input word is output by the next sub-state.
            let continues = is_last_out
                && !is_last_byte
                && following.is_some_and(|f| f.stream == o.stream && f.byte == o.byte + 1);
            if continues {
                relicts.insert(label.next());
            }

            let first_of_stream = prev.is_none_or(|p| p.stream != o.stream);
            let last_of_stream = following.is_none_or(|f| f.stream != o.stream);

            if last_of_stream {
                let resumes = following.map_or(self.input_cnt, |f| f.stream);
                for skipped in o.stream + 1..resumes {
                    t.mark_zero_len(skipped);
                }
                if let Some(f) = following.filter(|f| self.can_be_zero_len[f.stream]) {
                    t.input[f.stream][f.time].keep[f.byte] = Bit::One;
                }
            }

            let reg = &mut t.input[o.stream][o.time];
            if first_of_stream {
                reg.keep[..o.byte].fill(Bit::Zero);
            }

            // Presence of the byte after the last one consumed.
            if (last_of_stream || continues || is_last_out)
                && !(o.is_last_word && last_of_stream && is_last_byte)
            {
                let time = if is_last_byte { o.time + 1 } else { o.time };
                if let Some(reg) = t.input[o.stream].get_mut(time) {
                    reg.keep[(o.byte + 1) % word_bytes] = Bit::from(!o.is_last_word || continues);
                }
            }

            prev = Some(o);
        }

        for (guards, masks) in t.input.iter().zip(&mut t.input_keep_mask) {
            for (guard, mask) in guards.iter().zip(masks) {
                for (k, m) in guard.keep.iter().zip(mask) {
                    if *k == Bit::Zero {
                        *m = false;
                    }
                }
            }
        }

        if let Some(s) = info.first_source() {
            let reg = &mut t.input[s.stream][s.time];
            if reg.last == Bit::One {
                reg.relict = relicts.contains(&label).into();
            }
        }

        Ok(t)
    }

    /// Let the leading streams which may be empty produce no bytes.
    ///
    /// Every transition of a state reached by skipping empty streams is copied
    /// into state 0, requiring an empty last word from each skipped stream.
    /// If every stream may be empty, a transition outputting an empty frame is
    /// added too.
    fn add_zero_len_prefix(&self, states: &mut [Vec<TransitionItem>]) {
        let prefix = self.can_be_zero_len.iter().take_while(|&&z| z).count();
        if prefix == 0 {
            return;
        }

        for state in 1..(prefix + 1).min(self.input_cnt) {
            let copies: Vec<_> = states[state]
                .iter()
                .map(|t| {
                    let mut t = t.clone();
                    t.state = 0;
                    for skipped in 0..state {
                        t.mark_zero_len(skipped);
                    }
                    t
                })
                .collect();
            states[0].extend(copies);
        }

        if prefix == self.input_cnt {
            let mut t = TransitionItem::new(0, 0, true, self.word_bytes, self.lookahead);
            for stream in 0..self.input_cnt {
                t.mark_zero_len(stream);
            }
            states[0].push(t);
        }
    }
}
