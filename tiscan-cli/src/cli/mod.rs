//! Command-line interface for the tiscan clustering pipeline.
//!
//! The `run` command reads a points file (and optionally ground-truth
//! labels), runs neighbour search, cluster expansion and validity scoring,
//! and can write per-point results and run statistics to an output directory.

mod commands;
mod input;
mod output;

pub use commands::{
    AlgorithmArg, Cli, CliError, Command, ExecutionSummary, NoiseArg, PhaseTimings, RunCommand,
    SearchArg, render_summary, run_cli,
};
pub use input::InputError;
pub use output::{OutputFiles, RunStatistics};

#[cfg(test)]
mod tests;
