// SPDX-License-Identifier: Apache-2.0
//! Loads a JSON I/O trace from disk into the `fsm_core::Frame` DTOs the
//! builder consumes (§6). The parser itself — the `serde_json::from_reader`
//! call — is the external collaborator §1 keeps out of `fsm-core`'s scope;
//! the shape it produces (`Frame`/`Change`) is part of the core's public
//! contract, which is why those types live in `fsm-core` behind its
//! optional `serde` feature.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use fsm_core::Frame;
use serde::Deserialize;

/// The trace file's top-level shape: `{ "frames": [...] }`.
#[derive(Debug, Deserialize)]
struct TraceFile {
    frames: Vec<Frame>,
}

/// Reads and decodes the trace at `path`, returning its ordered frame list.
pub fn load(path: &Path) -> Result<Vec<Frame>> {
    let file = File::open(path).with_context(|| format!("opening trace file {}", path.display()))?;
    let reader = BufReader::new(file);
    let trace: TraceFile = serde_json::from_reader(reader)
        .with_context(|| format!("parsing trace file {}", path.display()))?;
    Ok(trace.frames)
}
