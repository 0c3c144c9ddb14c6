// SPDX-License-Identifier: Apache-2.0
//! Translates a caller-chosen, ordered list of reducer-pass names into the
//! actual `fsm_core::reducers` calls (§4.G). This string-to-reducer
//! dispatch is the one fallible seam `fsm-core` exposes via `FsmError`; it
//! is deliberately implemented here, at the CLI boundary, rather than in
//! the core crate (§4.H).

use fsm_core::graph::Graph;
use fsm_core::reducers;
use fsm_core::FsmError;
use tracing::info;

/// Applies the named reducer passes to `graph`, in order, logging the
/// state count before and after each one.
pub fn apply_named_passes(mut graph: Graph, names: &[String]) -> Result<Graph, FsmError> {
    for name in names {
        graph = apply_one(graph, name)?;
    }
    Ok(graph)
}

fn apply_one(graph: Graph, name: &str) -> Result<Graph, FsmError> {
    let before = graph.state_count();
    let after = match name {
        "combine-sequences" => {
            let mut graph = graph;
            reducers::combine_sequences(&mut graph);
            graph
        }
        "combine-scc" => {
            let mut graph = graph;
            reducers::combine_scc(&mut graph);
            graph
        }
        "merge-circuits" => {
            let mut graph = graph;
            reducers::merge_circuits(&mut graph);
            graph
        }
        "remove-input-states" => reducers::remove_input_states(&graph),
        "renumber" => {
            let mut graph = graph;
            reducers::renumber_states(&mut graph);
            graph
        }
        "relative-times" => {
            let mut graph = graph;
            reducers::relative_times(&mut graph);
            graph
        }
        other => return Err(FsmError::UnknownPass(other.to_string())),
    };
    info!(pass = name, before, after = after.state_count(), "applied reducer pass");
    Ok(after)
}
