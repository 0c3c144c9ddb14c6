// SPDX-License-Identifier: Apache-2.0
//! `CombineSequences`: linear chain contraction.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{Graph, StateId};

fn is_pass_through(graph: &Graph, id: StateId, start: StateId) -> bool {
    graph
        .get(id)
        .is_some_and(|n| id != start && n.indegree() == 1 && !n.is_terminal())
}

/// Collapses maximal non-branching chains of pass-through nodes into the
/// chain's head. A pass-through is a non-start node with indegree exactly 1
/// and at least one outgoing edge.
///
/// Returns the number of nodes deleted.
pub fn combine_sequences(graph: &mut Graph) -> usize {
    let Some(start) = graph.start() else {
        return 0;
    };

    let pivots: Vec<StateId> = graph
        .iter()
        .filter(|&(id, _)| !is_pass_through(graph, id, start))
        .map(|(id, _)| id)
        .collect();

    for pivot in pivots {
        let Some(node) = graph.get(pivot) else { continue };
        let mut stack: Vec<(StateId, BTreeSet<u64>)> = node
            .transitions()
            .iter()
            .map(|(t, ts)| (*t, ts.clone()))
            .collect();
        let mut new_map: BTreeMap<StateId, BTreeSet<u64>> = BTreeMap::new();
        let mut visited: BTreeSet<StateId> = BTreeSet::new();

        while let Some((t, ts)) = stack.pop() {
            if let Some(existing) = new_map.get_mut(&t) {
                existing.extend(ts);
                if let Some(target) = graph.get_mut(t) {
                    target.indegree = target.indegree.saturating_sub(1);
                }
                let reclassify = graph
                    .get(t)
                    .is_some_and(|target| target.indegree() == 1 && !target.is_terminal() && t != start);
                if reclassify {
                    let carried = new_map.remove(&t).unwrap_or_default();
                    if let Some(target) = graph.get(t) {
                        let succs: Vec<(StateId, BTreeSet<u64>)> = target
                            .transitions()
                            .iter()
                            .map(|(s, sts)| {
                                let mut merged = sts.clone();
                                merged.extend(carried.iter().copied());
                                (*s, merged)
                            })
                            .collect();
                        stack.extend(succs);
                    }
                }
                continue;
            }

            if is_pass_through(graph, t, start) {
                if !visited.insert(t) {
                    // Single-cycle of pass-through nodes: the descent has
                    // already expanded this node once and looped back to it
                    // with no external exit. Drop the branch rather than
                    // loop forever; the orphaned cycle is swept by the final
                    // deletion pass below.
                    continue;
                }
                if let Some(target) = graph.get(t) {
                    let succs: Vec<(StateId, BTreeSet<u64>)> = target
                        .transitions()
                        .iter()
                        .map(|(s, sts)| {
                            let mut merged = sts.clone();
                            merged.extend(ts.iter().copied());
                            (*s, merged)
                        })
                        .collect();
                    stack.extend(succs);
                }
                continue;
            }

            new_map.insert(t, ts);
        }

        if let Some(node) = graph.get_mut(pivot) {
            node.transitions = new_map;
        }
    }

    graph.retain(|id, node| !(id != start && node.indegree() == 1 && !node.is_terminal()))
}
