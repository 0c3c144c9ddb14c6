// SPDX-License-Identifier: Apache-2.0
//! `cycletime-fsm`: the command-line shell around `fsm-core` (§0, §4.G).
//!
//! Owns everything the core deliberately stays out of (§1): reading the
//! trace file from disk, deserializing it, turning flags into
//! `BuilderOptions` and a reducer chain, and writing printer output to
//! stdout or a file.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod passes;
mod trace;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fsm_core::builder::{Builder, BuilderOptions};
use fsm_core::graph::Graph;
use fsm_core::printers;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line shell: loads a JSON I/O trace, builds an FSM, runs reducer
/// passes, and prints automata.
#[derive(Debug, Parser)]
#[command(name = "cycletime-fsm", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a trace and construct the FSM, printing its state count.
    Build(BuildArgs),
    /// Build the FSM and apply an ordered chain of reducer passes.
    Reduce(ReduceArgs),
    /// Build, optionally reduce, and print one of the six automaton views.
    Print(PrintArgs),
}

#[derive(Debug, clap::Args)]
struct BuildOptions {
    /// Path to the JSON trace file.
    #[arg(long)]
    trace: PathBuf,
    /// Disable combining equal snapshots into one state.
    #[arg(long)]
    no_combine_states: bool,
    /// Drop input frames before they reach the builder.
    #[arg(long)]
    only_output: bool,
    /// Concatenate input and output canonical lists into one full-system snapshot.
    #[arg(long)]
    combined_states: bool,
    /// Track raw per-channel repeat-observation counts.
    #[arg(long)]
    count_duplicates: bool,
}

impl BuildOptions {
    fn to_builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            combine_states: !self.no_combine_states,
            only_output: self.only_output,
            combined_states: self.combined_states,
            count_duplicates: self.count_duplicates,
        }
    }

    fn build(&self) -> Result<Graph> {
        let frames = trace::load(&self.trace)?;
        info!(frames = frames.len(), trace = %self.trace.display(), "loaded trace");
        let graph = Builder::new(self.to_builder_options()).build(&frames);
        info!(states = graph.state_count(), "built graph");
        Ok(graph)
    }
}

#[derive(Debug, clap::Args)]
struct BuildArgs {
    #[command(flatten)]
    build: BuildOptions,
}

#[derive(Debug, clap::Args)]
struct ReduceArgs {
    #[command(flatten)]
    build: BuildOptions,
    /// Reducer pass to apply, in order given (repeatable).
    #[arg(long = "pass")]
    passes: Vec<String>,
    /// Restrict the result to `CutToPart(start, end)` after the pass chain, as `start:end`.
    #[arg(long)]
    cut: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    StateValues,
    TransitionTimes,
    Times,
    TimeAutomata,
    RegularAutomota,
    RightLinearGrammar,
}

#[derive(Debug, clap::Args)]
struct PrintArgs {
    #[command(flatten)]
    build: BuildOptions,
    /// Reducer pass to apply, in order given, before printing (repeatable).
    #[arg(long = "pass")]
    passes: Vec<String>,
    /// Which textual view to render.
    #[arg(long, value_enum)]
    format: Format,
    /// State index for `state-values` / `transition-times`.
    #[arg(long)]
    state: Option<u64>,
    /// Initial-state index for `time-automata`.
    #[arg(long, default_value_t = 0)]
    start: u64,
    /// Accepting-state index for `time-automata`.
    #[arg(long, default_value_t = 0)]
    end: u64,
    /// State-label prefix for the automaton views.
    #[arg(long, default_value = "q")]
    prefix: String,
    /// Decimal precision for `time-automata` timestamp labels.
    #[arg(long, default_value_t = 3)]
    precision: usize,
    /// Right-linear-grammar transition label prefix; empty means "label by timestamp-set size".
    #[arg(long, default_value = "")]
    transition_prefix: String,
    /// `regular-automota` only: label edges by percentage timestamp deviation instead of synthetic symbols.
    #[arg(long)]
    procentual_diff: bool,
    /// Write the output to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_cut(spec: &str) -> Result<(u64, u64)> {
    let (start, end) = spec
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("--cut expects `start:end`, got {spec:?}"))?;
    Ok((start.parse()?, end.parse()?))
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => {
            let graph = args.build.build()?;
            println!("{}", graph.state_count());
        }
        Command::Reduce(args) => {
            let graph = args.build.build()?;
            let mut graph = passes::apply_named_passes(graph, &args.passes)?;
            if let Some(cut) = &args.cut {
                let (start, end) = parse_cut(cut)?;
                graph = fsm_core::reducers::cut_to_part(&graph, start, end, false, None);
            }
            println!("{}", graph.state_count());
        }
        Command::Print(args) => {
            let graph = args.build.build()?;
            let graph = passes::apply_named_passes(graph, &args.passes)?;
            let polarity_tagged = !args.build.combined_states;
            let rendered = match args.format {
                Format::StateValues => {
                    let index = args.state.unwrap_or(0);
                    printers::get_state_values(&graph, index, polarity_tagged)
                }
                Format::TransitionTimes => {
                    let index = args.state.unwrap_or(0);
                    printers::get_transition_times(&graph, index)
                }
                Format::Times => printers::print_times(&graph),
                Format::TimeAutomata => {
                    printers::print_time_automata(&graph, args.start, args.end, &args.prefix, args.precision)
                }
                Format::RegularAutomota => {
                    printers::print_regular_automota(&graph, &args.prefix, args.procentual_diff)
                }
                Format::RightLinearGrammar => {
                    printers::print_right_linear_grammar(&graph, &args.prefix, &args.transition_prefix)
                }
            };
            match &args.out {
                Some(path) => fs::write(path, rendered)?,
                None => println!("{rendered}"),
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    run()
}
