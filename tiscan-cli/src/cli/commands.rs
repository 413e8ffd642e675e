//! Argument parsing and command execution for the tiscan CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tiscan_core::{
    AlgorithmKind, NoiseTreatment, RunReport, SearchMode, Tiscan, TiscanBuilder, TiscanError,
};
use tracing::{Span, field, info, instrument};

use super::input::{InputError, read_labels, read_points};
use super::output::{OutputFiles, RunStatistics, file_suffix, write_outputs};

const DEFAULT_K: usize = 3;
const DEFAULT_EPS: f64 = 2.0;
const DEFAULT_MIN_PTS: usize = 4;
const DEFAULT_MINKOWSKI: f64 = 2.0;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "tiscan",
    about = "Density-based clustering with triangle-inequality pruned neighbour search."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster a points file and report validity statistics.
    Run(RunCommand),
}

/// Clustering algorithm selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// Epsilon-radius density clustering.
    Dbscan,
    /// Reverse-nearest-neighbour density clustering.
    Dbscrn,
}

impl From<AlgorithmArg> for AlgorithmKind {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Dbscan => Self::Epsilon,
            AlgorithmArg::Dbscrn => Self::NeighbourCount,
        }
    }
}

/// Neighbour-search strategy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchArg {
    /// Reference-point projection with triangle-inequality pruning.
    Pruned,
    /// Exhaustive pairwise scan.
    Brute,
}

impl From<SearchArg> for SearchMode {
    fn from(value: SearchArg) -> Self {
        match value {
            SearchArg::Pruned => Self::Pruned,
            SearchArg::Brute => Self::BruteForce,
        }
    }
}

/// Davies–Bouldin noise handling selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoiseArg {
    /// Leave noise out of the index.
    Exclude,
    /// Score noise as one extra cluster.
    Include,
}

impl From<NoiseArg> for NoiseTreatment {
    fn from(value: NoiseArg) -> Self {
        match value {
            NoiseArg::Exclude => Self::Exclude,
            NoiseArg::Include => Self::IncludeAsCluster,
        }
    }
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Points file: a `n d` header followed by `n·d` coordinates.
    #[arg(long)]
    pub input: PathBuf,

    /// Optional file of whitespace-separated integer class labels.
    #[arg(long = "ground-truth")]
    pub ground_truth: Option<PathBuf>,

    /// Clustering algorithm.
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Dbscan)]
    pub algorithm: AlgorithmArg,

    /// Nearest neighbours per point for `dbscrn`.
    #[arg(long, default_value_t = DEFAULT_K)]
    pub k: usize,

    /// Neighbourhood radius for `dbscan`.
    #[arg(long, default_value_t = DEFAULT_EPS)]
    pub eps: f64,

    /// Minimum neighbourhood size of a `dbscan` core point, itself included.
    #[arg(long = "min-pts", default_value_t = DEFAULT_MIN_PTS)]
    pub min_pts: usize,

    /// Order of the Minkowski distance.
    #[arg(long, default_value_t = DEFAULT_MINKOWSKI)]
    pub minkowski: f64,

    /// Neighbour-search strategy.
    #[arg(long, value_enum, default_value_t = SearchArg::Pruned)]
    pub search: SearchArg,

    /// Davies–Bouldin noise handling.
    #[arg(long, value_enum, default_value_t = NoiseArg::Exclude)]
    pub noise: NoiseArg,

    /// Skip the quadratic-cost silhouette coefficient.
    #[arg(long = "skip-silhouette")]
    pub skip_silhouette: bool,

    /// Directory receiving the `OUT_`, `DEBUG_` and `STAT_` files.
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
}

impl RunCommand {
    /// Translates the options into a pipeline builder.
    #[must_use]
    pub fn builder(&self) -> TiscanBuilder {
        TiscanBuilder::new()
            .with_algorithm(self.algorithm.into())
            .with_k(self.k)
            .with_eps(self.eps)
            .with_min_pts(self.min_pts)
            .with_minkowski_order(self.minkowski)
            .with_search_mode(self.search.into())
            .with_noise_treatment(self.noise.into())
            .with_silhouette(!self.skip_silhouette)
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An input file was malformed.
    #[error("malformed input `{path}`: {source}")]
    Input {
        /// Offending file.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: InputError,
    },
    /// An output file could not be written.
    #[error("failed to write `{path}`: {source}")]
    Output {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Configuration or clustering failed.
    #[error(transparent)]
    Core(#[from] TiscanError),
}

/// Wall-clock time spent in each phase of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Reading and validating inputs.
    pub load: Duration,
    /// Neighbour search.
    pub search: Duration,
    /// Cluster expansion.
    pub cluster: Duration,
    /// Validity scoring.
    pub validity: Duration,
    /// Whole command, output files included.
    pub total: Duration,
}

/// Outcome of a `run` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name derived from the points file.
    pub data_source: String,
    /// Pipeline outputs.
    pub report: RunReport,
    /// Per-phase wall-clock timings.
    pub timings: PhaseTimings,
    /// Files written, when an output directory was given.
    pub outputs: Option<OutputFiles>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading inputs, clustering or writing outputs
/// fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use tempfile::NamedTempFile;
/// # use tiscan_cli::cli::{Cli, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "4 2\n0 0\n0 1\n1 0\n10 10\n")?;
/// let input = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from([
///     "tiscan", "run", "--input", input.as_str(), "--eps", "1.5", "--min-pts", "3",
/// ])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.report.labels.cluster_count(), 1);
/// assert_eq!(summary.report.stats.noise, 1);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(&run)
        }
    }
}

fn timed<T, E>(stage: impl FnOnce() -> Result<T, E>) -> Result<(T, Duration), E> {
    let started = Instant::now();
    let value = stage()?;
    Ok((value, started.elapsed()))
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        input = %command.input.display(),
        algorithm = field::Empty,
        search = field::Empty,
    ),
)]
pub(super) fn run_command(command: &RunCommand) -> Result<ExecutionSummary, CliError> {
    let started = Instant::now();
    let tiscan = command.builder().build()?;
    let span = Span::current();
    span.record("algorithm", field::display(tiscan.algorithm().kind()));
    span.record("search", field::display(tiscan.search_mode()));

    let mut points = read_points(&command.input)?;
    let truth = command
        .ground_truth
        .as_deref()
        .map(read_labels)
        .transpose()?;
    Tiscan::check_inputs(&points, truth.as_deref())?;
    let load = started.elapsed();

    let (search, search_time) = timed(|| tiscan.search(&mut points))?;
    let (labels, cluster_time) = timed(|| tiscan.cluster(&mut points))?;
    let (stats, validity_time) = timed(|| tiscan.score(&points, &labels, truth.as_deref()))?;
    let report = RunReport {
        search,
        labels,
        stats,
    };

    let mut timings = PhaseTimings {
        load,
        search: search_time,
        cluster: cluster_time,
        validity: validity_time,
        total: Duration::ZERO,
    };
    let data_source = derive_data_source_name(&command.input);
    let outputs = match &command.output_dir {
        Some(dir) => {
            timings.total = started.elapsed();
            let suffix = file_suffix(command, &data_source, &points);
            let statistics = RunStatistics::new(command, &report, &timings);
            Some(write_outputs(dir, &suffix, &points, &report, &statistics)?)
        }
        None => None,
    };
    timings.total = started.elapsed();

    info!(
        data_source = data_source.as_str(),
        clusters = report.labels.cluster_count(),
        noise = report.labels.noise_count(),
        total_ms = timings.total.as_secs_f64() * 1e3,
        "command completed"
    );
    Ok(ExecutionSummary {
        data_source,
        report,
        timings,
        outputs,
    })
}

pub(super) fn derive_data_source_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .filter(|stem| !stem.is_empty())
        .map_or_else(|| "points".to_owned(), ToOwned::to_owned)
}

fn write_metric(writer: &mut impl Write, name: &str, value: Option<f64>) -> io::Result<()> {
    match value {
        Some(value) => writeln!(writer, "{name}: {value:.6}"),
        None => writeln!(writer, "{name}: undefined"),
    }
}

/// Renders `summary` to `writer` as human-readable text.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let RunReport {
        search,
        labels,
        stats,
    } = &summary.report;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "search: {}", search.mode)?;
    writeln!(writer, "points: {} x {}", stats.points, stats.dimensions)?;
    writeln!(writer, "clusters: {}", labels.cluster_count())?;
    writeln!(writer, "noise: {}", labels.noise_count())?;
    writeln!(
        writer,
        "roles: core {}, border {}, non-core {}, noise {}",
        stats.roles.core, stats.roles.border, stats.roles.non_core, stats.roles.noise
    )?;
    writeln!(
        writer,
        "mean distance evaluations: {:.3}",
        stats.mean_distance_evaluations
    )?;
    write_metric(&mut writer, "silhouette", stats.silhouette)?;
    write_metric(&mut writer, "davies-bouldin", stats.davies_bouldin)?;
    if let Some(external) = &stats.external {
        writeln!(writer, "rand index: {:.6}", external.rand_index)?;
        writeln!(writer, "purity: {:.6}", external.purity)?;
    }
    let timings = &summary.timings;
    writeln!(
        writer,
        "timings (ms): load {:.3}, search {:.3}, cluster {:.3}, validity {:.3}, total {:.3}",
        timings.load.as_secs_f64() * 1e3,
        timings.search.as_secs_f64() * 1e3,
        timings.cluster.as_secs_f64() * 1e3,
        timings.validity.as_secs_f64() * 1e3,
        timings.total.as_secs_f64() * 1e3,
    )?;
    if let Some(files) = &summary.outputs {
        for path in [&files.out, &files.debug, &files.stats] {
            writeln!(writer, "wrote: {}", path.display())?;
        }
    }
    Ok(())
}
