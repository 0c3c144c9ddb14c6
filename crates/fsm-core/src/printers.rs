// SPDX-License-Identifier: Apache-2.0
//! The five textual automaton views (§6): pure reads over a [`Graph`], each
//! returning a plain-text `String`. None of these functions perform I/O —
//! writing the result to stdout or a file is `fsm-cli`'s job.

use crate::graph::Graph;
use crate::reducers::earliest_timeline_walk;

fn seconds(timestamp: u64, precision: usize) -> String {
    format!("{:.precision$}", timestamp as f64 * 1e-6)
}

/// `GetStateValues(i)`: the snapshot and transition-degree summary for the
/// state with index `i`.
///
/// `polarity_tagged` selects whether to print the `" (Input)"`/`" (Output)"`
/// suffix — only meaningful for non-combined (polarity-alternating)
/// snapshots; the caller knows which construction mode produced the graph.
/// Returns an empty string if no state has that index (§7).
#[must_use]
pub fn get_state_values(graph: &Graph, index: u64, polarity_tagged: bool) -> String {
    let Some(id) = graph.find_by_index(index) else {
        return String::new();
    };
    let node = graph.get(id).unwrap_or_else(|| unreachable!("find_by_index returned a live id"));

    let tag = if polarity_tagged {
        match node.snapshot().front() {
            Some(v) if v.is_input() => " (Input)",
            Some(_) => " (Output)",
            None => "",
        }
    } else {
        ""
    };

    let mut out = format!("State {index}{tag}:\n{{\n");
    for value in node.snapshot().values() {
        out.push('\t');
        out.push_str(&value.print());
        out.push('\n');
    }
    out.push_str("}\n");
    out.push_str(&format!("Input Transitions:\t{}\n", node.indegree()));
    out.push_str(&format!("Output Transitions:\t{}", node.transitions().len()));
    out
}

/// `GetTransitionTimes(i)`: every outgoing edge of state `i` with its
/// timestamp set rendered in seconds.
///
/// Returns an empty string if no state has that index (§7).
#[must_use]
pub fn get_transition_times(graph: &Graph, index: u64) -> String {
    let Some(id) = graph.find_by_index(index) else {
        return String::new();
    };
    let node = graph.get(id).unwrap_or_else(|| unreachable!("find_by_index returned a live id"));

    let mut out = format!("State {index}{{\n");
    for (target, timestamps) in node.transitions() {
        let times: Vec<String> = timestamps.iter().map(|&t| format!("{}s", seconds(t, 6))).collect();
        out.push_str(&format!("\t{}:\t{{ {} }}\n", target.index(), times.join(" ")));
    }
    out.push('}');
    out
}

/// `PrintTimes`: narrates the earliest-timeline walk from the start node —
/// for each node visited, its snapshot, absolute arrival time, any
/// self-loop cycle times, and the transition time to the next node.
///
/// Returns a fixed diagnostic string when there is no start node, or the
/// start has no outgoing transitions (§7).
#[must_use]
pub fn print_times(graph: &Graph) -> String {
    let Some(start) = graph.start() else {
        return "No start state.".to_string();
    };
    let walk = earliest_timeline_walk(graph, start);
    if walk.is_empty() {
        return "Start state has no outgoing transitions.".to_string();
    }

    let mut out = String::new();
    let mut elapsed = 0u64;
    for (from, to, timestamp) in walk {
        let Some(node) = graph.get(from) else { continue };
        out.push_str(&format!("State {}:\n", from.index()));
        for value in node.snapshot().values() {
            out.push('\t');
            out.push_str(&value.print());
            out.push('\n');
        }
        out.push_str(&format!("  start: {}s\n", seconds(elapsed, 6)));
        if let Some(self_loop) = node.transitions().get(&from) {
            let cycle: Vec<String> = self_loop.iter().map(|&t| format!("{}s", seconds(t, 6))).collect();
            out.push_str(&format!("  self-loop: {}\n", cycle.join(" ")));
        }
        out.push_str(&format!("  -> State {} at {}s\n", to.index(), seconds(timestamp, 6)));
        elapsed = timestamp;
    }
    out
}

/// `PrintTimeAutomata(start, final, prefix, precision)`: a six-section
/// automaton view with absolute-time-in-seconds edge labels.
#[must_use]
pub fn print_time_automata(graph: &Graph, start_index: u64, final_index: u64, prefix: &str, precision: usize) -> String {
    let mut out = String::new();

    out.push_str("#states\n");
    for (id, _) in graph.iter() {
        out.push_str(&format!("{prefix}{}\n", id.index()));
    }

    out.push_str("#initial\n");
    out.push_str(&format!("{prefix}{start_index}\n"));

    out.push_str("#accepting\n");
    out.push_str(&format!("{prefix}{final_index}\n"));

    let mut alphabet: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    for (_, node) in graph.iter() {
        for timestamps in node.transitions().values() {
            for &t in timestamps {
                alphabet.insert(format!("{}s", seconds(t, precision)));
            }
        }
    }
    out.push_str("#alphabet\n");
    for symbol in &alphabet {
        out.push_str(symbol);
        out.push('\n');
    }

    out.push_str("#transitions\n");
    for (id, node) in graph.iter() {
        for (&target, timestamps) in node.transitions() {
            for &t in timestamps {
                out.push_str(&format!(
                    "{prefix}{}:{}s>{prefix}{}\n",
                    id.index(),
                    seconds(t, precision),
                    target.index()
                ));
            }
        }
    }

    out
}

/// `PrintRegularAutomota`: the same six-section shape as
/// [`print_time_automata`], but alphabet symbols are synthetic labels
/// (`t0, t1, …`, assigned in traversal order) unless `print_procentual_diff`
/// is set, in which case each edge's label is the maximum percentage
/// deviation of its min/max timestamp from its mean.
///
/// The start node is the automaton's sole initial state; terminal nodes
/// (no outgoing transitions) are its accepting states — the view gives no
/// explicit start/final indices of its own, unlike [`print_time_automata`].
#[must_use]
pub fn print_regular_automota(graph: &Graph, prefix: &str, print_procentual_diff: bool) -> String {
    let mut out = String::new();

    out.push_str("#states\n");
    for (id, _) in graph.iter() {
        out.push_str(&format!("{prefix}{}\n", id.index()));
    }

    out.push_str("#initial\n");
    if let Some(start) = graph.start() {
        out.push_str(&format!("{prefix}{}\n", start.index()));
    }

    out.push_str("#accepting\n");
    for (id, node) in graph.iter() {
        if node.is_terminal() {
            out.push_str(&format!("{prefix}{}\n", id.index()));
        }
    }

    let mut labels = Vec::new();
    let mut counter = 0u64;
    for (id, node) in graph.iter() {
        for (&target, timestamps) in node.transitions() {
            let label = if print_procentual_diff {
                percentage_deviation(timestamps)
            } else {
                let l = format!("t{counter}");
                counter += 1;
                l
            };
            labels.push((id.index(), label, target.index()));
        }
    }

    out.push_str("#alphabet\n");
    if print_procentual_diff {
        for (_, label, _) in &labels {
            out.push_str(label);
            out.push('\n');
        }
    } else {
        for i in 0..counter {
            out.push_str(&format!("t{i}\n"));
        }
    }

    out.push_str("#transitions\n");
    for (from, label, to) in labels {
        out.push_str(&format!("{prefix}{from}:{label}>{prefix}{to}\n"));
    }

    out
}

fn percentage_deviation(timestamps: &std::collections::BTreeSet<u64>) -> String {
    let min = *timestamps.iter().next().unwrap_or(&0);
    let max = *timestamps.iter().next_back().unwrap_or(&0);
    let sum: u64 = timestamps.iter().sum();
    let mean = sum as f64 / timestamps.len().max(1) as f64;
    if mean == 0.0 {
        return "0.00%".to_string();
    }
    let low = ((mean - min as f64) / mean * 100.0).abs();
    let high = ((max as f64 - mean) / mean * 100.0).abs();
    format!("{:.2}%", low.max(high))
}

/// `PrintRightLinearGrammar`: one production line per state.
///
/// Per the source's documented operator-precedence bug and its intended
/// fix (§9): when `transition_prefix` is empty, each production's label is
/// its timestamp-set size; otherwise it is `transition_prefix` followed by
/// a running counter assigned in traversal order.
#[must_use]
pub fn print_right_linear_grammar(graph: &Graph, prefix: &str, transition_prefix: &str) -> String {
    let mut out = String::new();
    let mut counter = 0u64;
    for (id, node) in graph.iter() {
        let mut productions = Vec::new();
        for (&target, timestamps) in node.transitions() {
            let label = if transition_prefix.is_empty() {
                timestamps.len().to_string()
            } else {
                let l = format!("{transition_prefix}{counter}");
                counter += 1;
                l
            };
            productions.push(format!("{label} {prefix}{}", target.index()));
        }
        out.push_str(&format!("{prefix}{} -> {}\n", id.index(), productions.join(" | ")));
    }
    out
}
