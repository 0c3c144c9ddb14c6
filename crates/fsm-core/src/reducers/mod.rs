// SPDX-License-Identifier: Apache-2.0
//! The four independent graph-rewriting reducers, plus the renumbering,
//! relative-time, and subgraph-cutting helpers (§4.E).

mod combine_scc;
mod combine_sequences;
mod helpers;
mod merge_circuits;
mod remove_input_states;

pub use combine_scc::combine_scc;
pub use combine_sequences::combine_sequences;
pub use helpers::{cut_to_part, relative_times, renumber_states};
pub use merge_circuits::merge_circuits;
pub use remove_input_states::remove_input_states;

use crate::graph::{Graph, StateId};

/// Walks the unique "earliest-successor" timeline from `start`: repeatedly
/// follows the successor edge with the smallest timestamp strictly greater
/// than the current position, until no such edge exists. Shared by
/// `RemoveInputStates`, `RelativeTimes`, and `PrintTimes`.
///
/// Returns the sequence of `(from, to, timestamp)` edges walked, in order.
pub(crate) fn earliest_timeline_walk(graph: &Graph, start: StateId) -> Vec<(StateId, StateId, u64)> {
    let mut walked = Vec::new();
    let mut current = start;
    let mut current_time: Option<u64> = None;

    while let Some(node) = graph.get(current) {
        let mut best: Option<(StateId, u64)> = None;
        for (&succ, timestamps) in node.transitions() {
            let candidate = match current_time {
                Some(t) => timestamps.iter().copied().find(|&ts| ts > t),
                None => timestamps.iter().copied().next(),
            };
            if let Some(ts) = candidate {
                if best.is_none_or(|(_, best_ts)| ts < best_ts) {
                    best = Some((succ, ts));
                }
            }
        }
        match best {
            Some((succ, ts)) => {
                walked.push((current, succ, ts));
                current = succ;
                current_time = Some(ts);
            }
            None => break,
        }
    }

    walked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Builder, BuilderOptions, Change, Frame};

    fn frame(timestamp: u64, byte: u8) -> Frame {
        Frame {
            timestamp,
            is_input: false,
            changes: vec![Change {
                participant: 0,
                bytes: vec![byte],
            }],
        }
    }

    #[test]
    fn walk_follows_strictly_increasing_timestamps() {
        let frames = vec![frame(1, b'A'), frame(2, b'B'), frame(3, b'C')];
        let graph = Builder::new(BuilderOptions::default()).build(&frames);
        let start = graph.start().unwrap();
        let walked = earliest_timeline_walk(&graph, start);
        let timestamps: Vec<u64> = walked.iter().map(|&(_, _, ts)| ts).collect();
        assert_eq!(timestamps, vec![2, 3]);
    }
}
