// SPDX-License-Identifier: Apache-2.0
//! fsm-core: reconstructs and simplifies a finite-state machine from a
//! timestamped trace of observed I/O frames.
//!
//! The crate is offline and single-threaded (§5): parsing a trace file,
//! the command-line shell, and file I/O are all external collaborators —
//! see `fsm-cli`. This crate owns value interning (§4.B), the state and
//! transition graph (§4.C), the builder that folds a frame stream into it
//! (§4.D), the four structural reducers plus their helpers (§4.E), and the
//! textual automaton printers (§6).
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::cognitive_complexity,
    clippy::option_if_let_else,
    clippy::doc_markdown,
    clippy::too_many_lines,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::similar_names,
    clippy::needless_pass_by_value,
    clippy::multiple_crate_versions
)]

pub mod builder;
pub mod error;
pub mod graph;
pub mod participant;
pub mod printers;
pub mod reducers;
pub mod registry;
pub mod snapshot;

pub use builder::{Builder, BuilderOptions, Change, Frame};
pub use error::FsmError;
pub use graph::{Graph, StateId, StateNode};
pub use participant::{ParticipantValue, Polarity};
pub use snapshot::Snapshot;
