// SPDX-License-Identifier: Apache-2.0
//! The builder: folds an ordered frame stream into a [`Graph`] via a
//! [`ValueRegistry`] (§4.D).

use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::{Graph, StateId};
use crate::participant::{ParticipantValue, Polarity};
use crate::registry::{RawChange, ValueRegistry};
use crate::snapshot::Snapshot;

/// One observed change to a single participant channel within a [`Frame`].
///
/// The wire format's field names (`participant`, `byte`) are bridged onto
/// idiomatic Rust field names via `serde(rename)` rather than forcing an
/// awkward Rust identifier onto the domain type.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Change {
    /// The participant id this change was observed on.
    pub participant: u16,
    /// The new full byte-vector of that participant (not a delta).
    #[cfg_attr(feature = "serde", serde(rename = "byte"))]
    pub bytes: Vec<u8>,
}

/// One observed I/O frame: a timestamp, a polarity, and the changes it carries.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Microseconds since an arbitrary epoch; monotonically non-decreasing
    /// across a well-formed trace.
    pub timestamp: u64,
    /// `true` if this frame was observed flowing into the device under trace.
    #[cfg_attr(feature = "serde", serde(rename = "input/output"))]
    pub is_input: bool,
    /// The changes carried by this frame.
    #[cfg_attr(feature = "serde", serde(rename = "data"))]
    pub changes: Vec<Change>,
}

impl Frame {
    fn polarity(&self) -> Polarity {
        Polarity::from_is_input(self.is_input)
    }
}

/// Runtime-selected construction toggles (§4.B).
#[derive(Debug, Clone, Copy)]
pub struct BuilderOptions {
    /// If `true`, two states with equal snapshots share identity. If `false`,
    /// every observation becomes a distinct node (a unique sentinel
    /// participant is appended to force snapshot inequality).
    pub combine_states: bool,
    /// If `true`, input frames are silently dropped before reaching the builder.
    pub only_output: bool,
    /// If `true`, a snapshot concatenates the input and output canonical
    /// lists (a full system snapshot). If `false`, snapshots alternate
    /// polarity frame by frame, and `RemoveInputStates` remains available.
    pub combined_states: bool,
    /// Diagnostic: also track raw per-channel repeat-observation counts.
    pub count_duplicates: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            combine_states: true,
            only_output: false,
            combined_states: false,
            count_duplicates: false,
        }
    }
}

/// Builds a [`Graph`] from an ordered frame stream.
///
/// Owns its [`ValueRegistry`] rather than reaching for the process-wide
/// singleton the original source used — an explicitly sanctioned redesign
/// (§9: "a cleaner redesign passes the registry explicitly into the
/// builder; behavior is identical").
#[derive(Debug)]
pub struct Builder {
    registry: ValueRegistry,
    options: BuilderOptions,
}

impl Builder {
    /// Creates a builder with the given options and a fresh, empty registry.
    #[must_use]
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            registry: ValueRegistry::new(options.count_duplicates),
            options,
        }
    }

    /// Consumes `frames` in order, returning the constructed graph.
    pub fn build(mut self, frames: &[Frame]) -> Graph {
        let mut graph = Graph::new();
        let mut previous: Option<StateId> = None;

        for frame in frames {
            if self.options.only_output && frame.is_input {
                continue;
            }

            let polarity = frame.polarity();
            let raw_changes: Vec<RawChange> = frame
                .changes
                .iter()
                .map(|c| RawChange::new(c.participant, c.bytes.clone()))
                .collect();
            self.registry.apply_changes(polarity, &raw_changes);

            let mut values = if self.options.combined_states {
                let mut input_values = self.registry.find_current_values(Polarity::Input);
                let output_values = self.registry.find_current_values(Polarity::Output);
                input_values.extend(output_values);
                input_values
            } else {
                self.registry.find_current_values(polarity)
            };

            if values.is_empty() {
                continue;
            }

            if !self.options.combine_states {
                values.push(Self::sentinel(graph.state_count()));
            }

            let snapshot = Snapshot::new(values);
            let (id, _created) = graph.insert(snapshot);

            if let Some(prev) = previous {
                graph.add_transition(prev, id, frame.timestamp);
            }
            previous = Some(id);
        }

        graph
    }

    /// A synthetic, never-reused participant value appended to force
    /// snapshot inequality when `combineStates` is off.
    fn sentinel(state_count: usize) -> Rc<ParticipantValue> {
        Rc::new(ParticipantValue::new(
            u16::MAX,
            (state_count as u64).to_be_bytes().to_vec(),
            Polarity::Output,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(timestamp: u64, is_input: bool, participant: u16, bytes: &[u8]) -> Frame {
        Frame {
            timestamp,
            is_input,
            changes: vec![Change {
                participant,
                bytes: bytes.to_vec(),
            }],
        }
    }

    /// S1: two frames with identical snapshots (combineStates=true) produce
    /// exactly one node with a self-loop carrying both timestamps.
    #[test]
    fn s1_identical_snapshots_combine_into_a_self_loop() {
        let frames = vec![
            frame(1, false, 0, &[1]),
            frame(2, false, 0, &[1]),
        ];
        let graph = Builder::new(BuilderOptions::default()).build(&frames);
        assert_eq!(graph.state_count(), 1);
        let start = graph.start().unwrap();
        let node = graph.get(start).unwrap();
        assert_eq!(node.transitions()[&start].len(), 2);
    }

    /// S2: snapshots A, B, C, D with timestamps 1..4 build a 4-node chain.
    #[test]
    fn s2_distinct_snapshots_build_a_chain() {
        let frames = vec![
            frame(1, false, 0, &[b'A']),
            frame(2, false, 0, &[b'B']),
            frame(3, false, 0, &[b'C']),
            frame(4, false, 0, &[b'D']),
        ];
        let graph = Builder::new(BuilderOptions::default()).build(&frames);
        assert_eq!(graph.state_count(), 4);
    }

    /// S5: onlyOutput=true over an alternating input/output trace keeps only
    /// the output frames, with their original timestamps intact.
    #[test]
    fn s5_only_output_drops_input_frames() {
        let frames = vec![
            frame(1, true, 0, &[9]),
            frame(2, false, 0, &[b'A']),
            frame(3, true, 0, &[9]),
            frame(4, false, 0, &[b'B']),
        ];
        let options = BuilderOptions {
            only_output: true,
            ..BuilderOptions::default()
        };
        let graph = Builder::new(options).build(&frames);
        assert_eq!(graph.state_count(), 2);
        let start = graph.start().unwrap();
        let node = graph.get(start).unwrap();
        let (_, timestamps) = node.transitions().iter().next().unwrap();
        assert_eq!(timestamps.iter().copied().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn combine_states_off_keeps_identical_snapshots_distinct() {
        let frames = vec![
            frame(1, false, 0, &[1]),
            frame(2, false, 0, &[1]),
        ];
        let options = BuilderOptions {
            combine_states: false,
            ..BuilderOptions::default()
        };
        let graph = Builder::new(options).build(&frames);
        assert_eq!(graph.state_count(), 2);
    }
}
