// SPDX-License-Identifier: Apache-2.0
//! `RenumberStates`, `RelativeTimes`, and `CutToPart`: the three
//! non-reducer helpers of §4.E that reshape a graph without collapsing it.

use std::collections::BTreeSet;

use crate::graph::{Graph, StateId};
use crate::reducers::earliest_timeline_walk;

/// Reassigns every surviving node a dense, zero-based `index` in place of
/// its current one, ordered by the current index. Purely cosmetic: it
/// changes no transition, timestamp, or in-degree.
pub fn renumber_states(graph: &mut Graph) {
    let mut order: Vec<StateId> = graph.iter().map(|(id, _)| id).collect();
    order.sort_by_key(StateId::index);

    let snapshots: std::collections::BTreeMap<StateId, crate::graph::StateNode> = order
        .iter()
        .filter_map(|&id| graph.get(id).map(|node| (id, node.clone())))
        .collect();

    graph.rebuild(order, |old_id| {
        snapshots
            .get(&old_id)
            .cloned()
            .unwrap_or_else(|| unreachable!("rebuild only visits ids from `order`"))
    });
}

/// Rewrites the timestamp walked on each edge of the earliest timeline to
/// the elapsed time since the previous edge (`t - previous`), starting from
/// the start node.
///
/// After this pass the timestamp sets no longer satisfy the global
/// uniqueness/monotonicity invariant (§3 invariant 5) and the graph must not
/// be fed into a reducer that relies on it (`CombineSequences`, `CombineSCC`,
/// `MergeCircuits`, `RemoveInputStates` all assume absolute, unique
/// timestamps).
pub fn relative_times(graph: &mut Graph) {
    let Some(start) = graph.start() else { return };
    let walk = earliest_timeline_walk(graph, start);

    let mut previous = 0u64;
    for (from, to, timestamp) in walk {
        let delta = timestamp - previous;
        previous = timestamp;
        if let Some(node) = graph.get_mut(from) {
            if let Some(timestamps) = node.transitions.get_mut(&to) {
                timestamps.remove(&timestamp);
                timestamps.insert(delta);
            }
        }
    }
}

/// Restricts the graph to the subgraph reachable from the node whose
/// current `index()` is `start_index`, stopping outgoing exploration at the
/// node whose `index()` is `end_index`.
///
/// `ignore_back_edges` drops any surviving edge landing back at the start
/// node; `taboo_state`, if given, drops any edge landing at that index.
/// The terminal node's outgoing transitions are pruned to references that
/// stay inside the surviving set.
pub fn cut_to_part(
    graph: &Graph,
    start_index: u64,
    end_index: u64,
    ignore_back_edges: bool,
    taboo_state: Option<u64>,
) -> Graph {
    let mut out = Graph::new();
    let Some(start_id) = graph.find_by_index(start_index) else {
        return out;
    };
    let Some(end_id) = graph.find_by_index(end_index) else {
        return out;
    };

    let mut reachable: BTreeSet<StateId> = BTreeSet::new();
    let mut stack = vec![start_id];
    reachable.insert(start_id);
    while let Some(id) = stack.pop() {
        if id == end_id {
            continue;
        }
        let Some(node) = graph.get(id) else { continue };
        for &succ in node.transitions.keys() {
            if reachable.insert(succ) {
                stack.push(succ);
            }
        }
    }

    let dropped = |target: StateId| -> bool {
        if !reachable.contains(&target) {
            return true;
        }
        if ignore_back_edges && target == start_id {
            return true;
        }
        if taboo_state == Some(target.index()) {
            return true;
        }
        false
    };

    let mut sorted_order: Vec<StateId> = reachable.iter().copied().collect();
    sorted_order.sort_by_key(StateId::index);

    out.rebuild(sorted_order.clone(), |old_id| {
        let node = graph
            .get(old_id)
            .unwrap_or_else(|| unreachable!("member of reachable set is live"));
        let mut copy = node.clone();
        copy.transitions.retain(|target, _| !dropped(*target));
        if old_id == end_id {
            copy.transitions.retain(|target, _| sorted_order.contains(target));
        }
        copy
    });
    out.set_start(out.find_by_index(start_id.index()));
    out
}
