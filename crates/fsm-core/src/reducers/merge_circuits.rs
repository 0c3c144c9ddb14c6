// SPDX-License-Identifier: Apache-2.0
//! `MergeCircuits`: heuristic back-edge induced circuit fusion.
//!
//! Not an algorithmic fixed point (§9): calling it after `CombineSCC` can be
//! a no-op or simplify further, depending on index assignment. It never
//! needs to run to a true fixed point itself — a second call on its own
//! output deletes nothing further (§8 invariant 3), which is all that's
//! asserted of it.

use std::collections::BTreeSet;

use crate::graph::{Graph, StateId, StateNode};

/// A node is "depreciated" once `MergeCircuits` has redirected it: indegree
/// zero and a single tombstone edge (empty timestamp set) pointing at its
/// fusion target.
fn is_depreciated(node: &StateNode) -> bool {
    node.indegree() == 0
        && node.transitions().len() == 1
        && node
            .transitions()
            .values()
            .next()
            .is_some_and(BTreeSet::is_empty)
}

/// Follows a chain of already-depreciated nodes (indegree 0, single outgoing
/// edge) to its canonical, non-depreciated terminus.
fn chase(graph: &Graph, mut node: StateId) -> StateId {
    let mut guard = 0usize;
    loop {
        guard += 1;
        let Some(n) = graph.get(node) else { return node };
        if !is_depreciated(n) || guard > graph.state_count() + 1 {
            return node;
        }
        let (&only_target, _) = n.transitions().iter().next().unwrap_or_else(|| unreachable!());
        node = only_target;
    }
}

fn merge_self_loop(graph: &mut Graph, s: StateId, timestamps: BTreeSet<u64>) {
    let existed = graph.get(s).is_some_and(|n| n.transitions().contains_key(&s));
    if let Some(node) = graph.get_mut(s) {
        node.transitions.entry(s).or_default().extend(timestamps);
    }
    if existed {
        if let Some(node) = graph.get_mut(s) {
            node.indegree = node.indegree.saturating_sub(1);
        }
    }
}

fn move_edge_to(graph: &mut Graph, s: StateId, target: StateId, timestamps: BTreeSet<u64>) {
    let existed = graph.get(s).is_some_and(|n| n.transitions().contains_key(&target));
    if let Some(node) = graph.get_mut(s) {
        node.transitions.entry(target).or_default().extend(timestamps);
    }
    if existed {
        if let Some(node) = graph.get_mut(target) {
            node.indegree = node.indegree.saturating_sub(1);
        }
    }
}

fn drop_edge(graph: &mut Graph, target: StateId) {
    if let Some(node) = graph.get_mut(target) {
        node.indegree = node.indegree.saturating_sub(1);
    }
}

/// Rewrites `m`'s outgoing transitions per the fusion rule and marks it
/// depreciated: edges landing on `s` become the self-loop merge; edges
/// landing past `threshold` (the original pivot's index) move onto `s`; the
/// rest are dropped. `m` itself is left with a single tombstone edge to `s`.
fn depreciate(graph: &mut Graph, m: StateId, s: StateId, threshold: u64) {
    let Some(node) = graph.get(m) else { return };
    let edges: Vec<(StateId, BTreeSet<u64>)> = node
        .transitions()
        .iter()
        .map(|(t, ts)| (*t, ts.clone()))
        .collect();

    for (target, timestamps) in edges {
        if target == s {
            merge_self_loop(graph, s, timestamps);
        } else if target.index() > threshold {
            move_edge_to(graph, s, target, timestamps);
        } else if target != m {
            drop_edge(graph, target);
        }
    }

    if let Some(node) = graph.get_mut(m) {
        node.transitions.clear();
        node.transitions.insert(s, BTreeSet::new());
        node.indegree = 0;
    }
}

/// Rewrites an already-depreciated worklist member's tombstone to point at
/// `s` instead of whatever it previously redirected to.
fn redirect_tombstone(graph: &mut Graph, m: StateId, s: StateId) {
    if let Some(node) = graph.get_mut(m) {
        node.transitions.clear();
        node.transitions.insert(s, BTreeSet::new());
    }
}

fn prune_depreciated_targets(graph: &mut Graph, s: StateId) {
    let stale: Vec<StateId> = graph
        .get(s)
        .map(|node| {
            node.transitions()
                .keys()
                .copied()
                .filter(|&t| graph.get(t).is_some_and(is_depreciated))
                .collect()
        })
        .unwrap_or_default();
    if let Some(node) = graph.get_mut(s) {
        for t in stale {
            node.transitions.remove(&t);
        }
    }
}

fn merge_circuits_at(graph: &mut Graph, n: StateId, start: Option<StateId>) {
    let Some(node) = graph.get(n) else { return };
    if is_depreciated(node) {
        return;
    }
    if node.indegree() == 0 && Some(n) != start {
        return;
    }

    let successors: Vec<StateId> = node.transitions().keys().copied().collect();
    let mut termini: Vec<StateId> = successors
        .into_iter()
        .filter(|succ| succ.index() < n.index())
        .map(|succ| chase(graph, succ))
        .collect();
    if termini.is_empty() {
        return;
    }
    termini.sort_by_key(StateId::index);
    let s = termini[0];

    let mut worklist: Vec<StateId> = termini.into_iter().filter(|&t| t != s).collect();
    if let Some(s_node) = graph.get(s) {
        let intermediates: Vec<StateId> = s_node
            .transitions()
            .keys()
            .copied()
            .filter(|succ| succ.index() > s.index() && succ.index() < n.index())
            .collect();
        worklist.extend(intermediates);
    }

    depreciate(graph, n, s, n.index());

    let mut seen: BTreeSet<StateId> = BTreeSet::from([n, s]);
    while let Some(m) = worklist.pop() {
        if !seen.insert(m) {
            continue;
        }
        let Some(mnode) = graph.get(m) else { continue };
        if is_depreciated(mnode) {
            redirect_tombstone(graph, m, s);
            continue;
        }
        let low_successors: Vec<StateId> = mnode
            .transitions()
            .keys()
            .copied()
            .filter(|succ| succ.index() < n.index() && *succ != s)
            .collect();
        worklist.extend(low_successors);
        depreciate(graph, m, s, n.index());
    }

    prune_depreciated_targets(graph, s);
}

/// Sorts nodes by `index` ascending and fuses every back-edge induced
/// circuit reachable within each node's index window into a self-loop on
/// the numerically smallest terminus of its back-edges.
///
/// Returns the number of nodes deleted.
pub fn merge_circuits(graph: &mut Graph) -> usize {
    let mut order: Vec<StateId> = graph.iter().map(|(id, _)| id).collect();
    order.sort_by_key(StateId::index);
    let start = graph.start();

    for n in order {
        merge_circuits_at(graph, n, start);
    }

    graph.retain(|_, node| !is_depreciated(node))
}
