// SPDX-License-Identifier: Apache-2.0
//! Property tests for the graph invariants listed in §8 of the spec.
//!
//! Traces are generated over a small alphabet (few participants, few byte
//! values) so that chains, self-loops, and cycles all show up often within
//! proptest's default case budget.

#![allow(missing_docs)]

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use fsm_core::builder::{Builder, BuilderOptions, Change, Frame};
use fsm_core::graph::Graph;
use fsm_core::reducers::{combine_scc, combine_sequences, merge_circuits};

fn frames_strategy() -> impl Strategy<Value = Vec<Frame>> {
    prop::collection::vec((0u16..3, 0u8..3, any::<bool>()), 1..30).prop_map(|steps| {
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (participant, byte, is_input))| Frame {
                timestamp: i as u64 + 1,
                is_input,
                changes: vec![Change {
                    participant,
                    bytes: vec![byte],
                }],
            })
            .collect()
    })
}

fn total_timestamp_count(graph: &Graph) -> usize {
    graph
        .iter()
        .flat_map(|(_, node)| node.transitions().values())
        .map(std::collections::BTreeSet::len)
        .sum()
}

/// Invariant 2: after every reducer pass, every node's in-degree equals the
/// count of distinct predecessor nodes with an edge into it.
fn assert_indegree_consistent(graph: &Graph) -> Result<(), TestCaseError> {
    let ids: Vec<_> = graph.iter().map(|(id, _)| id).collect();
    for &target in &ids {
        let expected = ids
            .iter()
            .filter(|&&n| graph.get(n).is_some_and(|node| node.transitions().contains_key(&target)))
            .count() as u64;
        let actual = graph.get(target).unwrap().indegree();
        prop_assert_eq!(actual, expected, "indegree mismatch at node {:?}", target);
    }
    Ok(())
}

proptest! {
    /// Invariant 1: building twice from the same trace with `combineStates`
    /// on yields the same node count and the same index sequence.
    #[test]
    fn interning_is_deterministic(frames in frames_strategy()) {
        let a = Builder::new(BuilderOptions::default()).build(&frames);
        let b = Builder::new(BuilderOptions::default()).build(&frames);
        prop_assert_eq!(a.state_count(), b.state_count());
        let a_indices: Vec<u64> = a.iter().map(|(id, _)| id.index()).collect();
        let b_indices: Vec<u64> = b.iter().map(|(id, _)| id.index()).collect();
        prop_assert_eq!(a_indices, b_indices);
    }

    /// Invariant 2, checked after the builder and after each of the three
    /// composable reducers (`CombineSequences`, `CombineSCC`, `MergeCircuits`).
    #[test]
    fn indegree_stays_consistent_through_every_reducer(frames in frames_strategy()) {
        let mut graph = Builder::new(BuilderOptions::default()).build(&frames);
        assert_indegree_consistent(&graph)?;

        combine_sequences(&mut graph);
        assert_indegree_consistent(&graph)?;

        combine_scc(&mut graph);
        assert_indegree_consistent(&graph)?;

        merge_circuits(&mut graph);
        assert_indegree_consistent(&graph)?;
    }

    /// Invariant 3: a second application of each reducer deletes nothing
    /// further once the first application has run.
    #[test]
    fn reducers_are_idempotent(frames in frames_strategy()) {
        let mut graph = Builder::new(BuilderOptions::default()).build(&frames);

        combine_sequences(&mut graph);
        prop_assert_eq!(combine_sequences(&mut graph), 0);

        combine_scc(&mut graph);
        prop_assert_eq!(combine_scc(&mut graph), 0);

        merge_circuits(&mut graph);
        prop_assert_eq!(merge_circuits(&mut graph), 0);
    }

    /// Invariant 4: across `CombineSequences` and `CombineSCC`, the total
    /// count of timestamps over all edges never shrinks (timestamps merge
    /// across edges but are never dropped).
    #[test]
    fn combine_sequences_and_combine_scc_preserve_every_timestamp(frames in frames_strategy()) {
        let mut graph = Builder::new(BuilderOptions::default()).build(&frames);
        let before = total_timestamp_count(&graph);

        combine_sequences(&mut graph);
        let after_sequences = total_timestamp_count(&graph);
        prop_assert!(after_sequences >= before);

        combine_scc(&mut graph);
        let after_scc = total_timestamp_count(&graph);
        prop_assert!(after_scc >= after_sequences);
    }
}
