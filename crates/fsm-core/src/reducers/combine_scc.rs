// SPDX-License-Identifier: Apache-2.0
//! `CombineSCC`: Tarjan's strongly-connected-component collapse.

use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use crate::graph::{Graph, StateId};

/// One stack frame of the DFS: the node under visitation, a snapshot of its
/// successor list taken when the frame was opened, and how far into that
/// list this frame has gotten. Stands in for the original source's explicit
/// `std::stack` of `(weak_ptr<State>, TransitionMap::iterator)` pairs — the
/// iterator becomes `next`, an index into our snapshot instead of a live map
/// cursor, since a node's transitions can be rewritten by `finalize` while
/// other frames are still open.
struct Frame {
    node: StateId,
    successors: Vec<StateId>,
    next: usize,
}

/// Opens a frame for `n`: claims its lowlink (if not already claimed) and
/// snapshots its current successor list.
fn open(graph: &mut Graph, n: StateId) -> Frame {
    if let Some(node) = graph.get_mut(n) {
        if node.lowlink.is_none() {
            node.lowlink = Some(n);
        }
    }
    let successors = graph
        .get(n)
        .map(|node| node.transitions().keys().copied().collect())
        .unwrap_or_default();
    Frame {
        node: n,
        successors,
        next: 0,
    }
}

/// Iterative Tarjan DFS from `start`, using an explicit stack rather than
/// native recursion so arbitrarily long chains can't blow the call stack.
fn visit(graph: &mut Graph, start: StateId) {
    let mut stack = vec![open(graph, start)];

    while let Some(frame) = stack.last_mut() {
        let n = frame.node;
        let mut to_descend = None;

        while frame.next < frame.successors.len() {
            let s = frame.successors[frame.next];
            frame.next += 1;
            let s_lowlink = graph.get(s).and_then(|node| node.lowlink);
            match s_lowlink {
                None if s.index() > n.index() => {
                    to_descend = Some(s);
                    break;
                }
                None => pull_lowlink(graph, n, Some(s)),
                Some(s_ll) => pull_lowlink(graph, n, Some(s_ll)),
            }
        }

        if let Some(child) = to_descend {
            stack.push(open(graph, child));
            continue;
        }

        stack.pop();
        finalize(graph, n);
        if let Some(parent) = stack.last() {
            let n_lowlink = graph.get(n).and_then(|node| node.lowlink);
            pull_lowlink(graph, parent.node, n_lowlink);
        }
    }
}

/// Updates `n.lowlink` toward `candidate` if `candidate` has a smaller index.
fn pull_lowlink(graph: &mut Graph, n: StateId, candidate: Option<StateId>) {
    let Some(candidate) = candidate else { return };
    let current = graph.get(n).and_then(|node| node.lowlink);
    if current.is_none_or(|c| candidate.index() < c.index()) {
        if let Some(node) = graph.get_mut(n) {
            node.lowlink = Some(candidate);
        }
    }
}

/// Relocates `n`'s outgoing transitions onto `n.lowlink`'s transition map,
/// redirecting any edge whose target is itself interior (not an SCC root)
/// to land on that target's own root instead of being dropped — preserving
/// every timestamp across the collapse (§8 invariant 4), rather than the
/// source's behavior of silently discarding a root's edges into interior
/// siblings of a component it does not itself head.
fn finalize(graph: &mut Graph, n: StateId) {
    let Some(lowlink) = graph.get(n).and_then(|node| node.lowlink) else {
        return;
    };

    let old_transitions = graph
        .get_mut(n)
        .map(|node| mem::take(&mut node.transitions))
        .unwrap_or_default();

    let mut by_final_target: BTreeMap<StateId, BTreeSet<u64>> = BTreeMap::new();
    for (target, timestamps) in old_transitions {
        let final_target = graph
            .get(target)
            .and_then(|node| node.lowlink)
            .unwrap_or(target);
        by_final_target.entry(final_target).or_default().extend(timestamps);
    }

    for (final_target, timestamps) in by_final_target {
        let is_new_edge = graph
            .get(lowlink)
            .is_some_and(|node| !node.transitions.contains_key(&final_target));
        if let Some(node) = graph.get_mut(lowlink) {
            node.transitions.entry(final_target).or_default().extend(timestamps);
        }
        if !is_new_edge {
            if let Some(target_node) = graph.get_mut(final_target) {
                target_node.indegree = target_node.indegree.saturating_sub(1);
            }
        }
    }
}

/// Collapses every strongly connected component reachable from the start
/// node into its lowest-index member (the SCC root), via Tarjan's
/// algorithm keyed on the builder-assigned `index` as discovery order.
///
/// Returns the number of nodes deleted.
pub fn combine_scc(graph: &mut Graph) -> usize {
    if let Some(start) = graph.start() {
        visit(graph, start);
    }
    graph.retain(|id, node| node.lowlink == Some(id))
}
