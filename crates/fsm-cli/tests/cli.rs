// SPDX-License-Identifier: Apache-2.0
//! Black-box tests for the `cycletime-fsm` binary: round-trips the `chain.json`
//! fixture (a 4-state linear chain, S2's shape) through `build`, `reduce`, and
//! `print`, asserting on stdout for at least one deterministic case per view.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn cli() -> Command {
    Command::cargo_bin("cycletime-fsm").expect("binary built by cargo")
}

#[test]
fn build_reports_the_raw_state_count() {
    cli()
        .arg("build")
        .arg("--trace")
        .arg(fixture("chain.json"))
        .assert()
        .success()
        .stdout(predicate::eq("4\n"));
}

#[test]
fn reduce_combine_sequences_collapses_the_chain_to_two_states() {
    cli()
        .arg("reduce")
        .arg("--trace")
        .arg(fixture("chain.json"))
        .arg("--pass")
        .arg("combine-sequences")
        .assert()
        .success()
        .stdout(predicate::eq("2\n"));
}

#[test]
fn reduce_rejects_an_unknown_pass_name() {
    cli()
        .arg("reduce")
        .arg("--trace")
        .arg(fixture("chain.json"))
        .arg("--pass")
        .arg("not-a-real-pass")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown reducer pass"));
}

#[test]
fn print_state_values_reports_the_start_states_snapshot() {
    cli()
        .arg("print")
        .arg("--trace")
        .arg(fixture("chain.json"))
        .arg("--format")
        .arg("state-values")
        .arg("--state")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("State 0 (Output):").and(predicate::str::contains("0:\t( 65 )")));
}

#[test]
fn print_time_automata_emits_the_initial_and_accepting_sections() {
    cli()
        .arg("print")
        .arg("--trace")
        .arg(fixture("chain.json"))
        .arg("--format")
        .arg("time-automata")
        .arg("--start")
        .arg("0")
        .arg("--end")
        .arg("3")
        .arg("--prefix")
        .arg("q")
        .assert()
        .success()
        .stdout(predicate::str::contains("#initial\nq0\n").and(predicate::str::contains("#accepting\nq3\n")));
}

#[test]
fn print_writes_to_a_file_when_out_is_given() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("rendered.txt");

    cli()
        .arg("print")
        .arg("--trace")
        .arg(fixture("chain.json"))
        .arg("--format")
        .arg("times")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::eq(""));

    let rendered = std::fs::read_to_string(&out).expect("rendered output file");
    assert!(rendered.contains("State 0:"));
}
