// SPDX-License-Identifier: Apache-2.0
//! The core's narrow error taxonomy (§7, §4.H).
//!
//! Everything inside `fsm-core` proper is a total function over its
//! `Graph`/`StateId` types: missing-state printer lookups return an empty
//! string, not an error, and the reducers have no recoverable failure mode
//! (a violated precondition is a programmer error, asserted via
//! `debug_assert!`, not surfaced as `Result`). The one genuinely fallible
//! seam is `fsm-cli`'s string-to-reducer-name dispatch, which lives here so
//! that seam gets a real typed error instead of a stringly-typed `anyhow::bail!`.

use thiserror::Error;

/// Errors surfaced at the one fallible seam `fsm-core` exposes to its callers.
#[derive(Debug, Error)]
pub enum FsmError {
    /// A caller asked to run a reducer pass by name that doesn't exist.
    #[error("unknown reducer pass: {0}")]
    UnknownPass(String),
}
