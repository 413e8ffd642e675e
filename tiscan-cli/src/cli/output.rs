//! Result, debug and statistics files written after a run.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tiscan_core::{AlgorithmKind, PointRole, PointSet, RunReport};
use tracing::{info, instrument};

use super::commands::{CliError, PhaseTimings, RunCommand};

const SEPARATOR: char = ',';

/// Paths of the files written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Per-point coordinates, evaluation counts, core flags and labels.
    pub out: PathBuf,
    /// Per-point neighbour relations.
    pub debug: PathBuf,
    /// Run parameters, timings and metrics as JSON.
    pub stats: PathBuf,
}

/// Builds the filename suffix shared by the three output files.
///
/// The suffix encodes the search mode, algorithm, dataset name, shape and the
/// density parameters of the selected algorithm.
pub(super) fn file_suffix(command: &RunCommand, data_source: &str, points: &PointSet) -> String {
    let builder = command.builder();
    let algorithm = builder.algorithm();
    let parameters = match algorithm {
        AlgorithmKind::Epsilon => format!("minPts{}_e{}", builder.min_pts(), builder.eps()),
        AlgorithmKind::NeighbourCount => format!("k{}", builder.k()),
    };
    format!(
        "{}-{}_{}_D{}_R{}_{}_minkowski{}",
        builder.search_mode(),
        algorithm,
        data_source,
        points.dimensions(),
        points.len(),
        parameters,
        builder.minkowski_order(),
    )
}

#[derive(Debug, Serialize)]
struct Dataset {
    input: PathBuf,
    dimensions: usize,
    points: usize,
    algorithm: &'static str,
}

#[derive(Debug, Serialize)]
struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_pts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effective_k: Option<usize>,
    minkowski: f64,
    search: &'static str,
    noise_treatment: &'static str,
    reference_point: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct Clustering {
    clusters: usize,
    core_points: usize,
    border_points: usize,
    non_core_points: usize,
    noise_points: usize,
    mean_distance_evaluations: f64,
    distance_evaluations: u64,
    reference_evaluations: u64,
}

#[derive(Debug, Serialize)]
struct TimingsMs {
    load: f64,
    search: f64,
    cluster: f64,
    validity: f64,
    total: f64,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}

impl From<&PhaseTimings> for TimingsMs {
    fn from(timings: &PhaseTimings) -> Self {
        Self {
            load: millis(timings.load),
            search: millis(timings.search),
            cluster: millis(timings.cluster),
            validity: millis(timings.validity),
            total: millis(timings.total),
        }
    }
}

#[derive(Debug, Serialize)]
struct Metrics {
    silhouette: Option<f64>,
    davies_bouldin: Option<f64>,
    true_positives: Option<u64>,
    true_negatives: Option<u64>,
    pairs: u64,
    rand_index: Option<f64>,
    purity: Option<f64>,
}

/// Contents of the `STAT_` file.
#[derive(Debug, Serialize)]
pub struct RunStatistics {
    dataset: Dataset,
    parameters: Parameters,
    clustering: Clustering,
    timings_ms: TimingsMs,
    metrics: Metrics,
}

impl RunStatistics {
    /// Collects the statistics of a finished run.
    #[must_use]
    pub fn new(command: &RunCommand, report: &RunReport, timings: &PhaseTimings) -> Self {
        let builder = command.builder();
        let epsilon = builder.algorithm() == AlgorithmKind::Epsilon;
        let RunReport {
            search,
            labels,
            stats,
        } = report;
        let points = stats.points as u64;
        let external = stats.external.as_ref();
        Self {
            dataset: Dataset {
                input: command.input.clone(),
                dimensions: stats.dimensions,
                points: stats.points,
                algorithm: builder.algorithm().as_str(),
            },
            parameters: Parameters {
                eps: epsilon.then(|| builder.eps()),
                min_pts: epsilon.then(|| builder.min_pts()),
                k: (!epsilon).then(|| builder.k()),
                effective_k: search.effective_k,
                minkowski: builder.minkowski_order(),
                search: search.mode.as_str(),
                noise_treatment: builder.noise_treatment().as_str(),
                reference_point: search
                    .reference
                    .as_ref()
                    .map(|reference| reference.coordinates().to_vec()),
            },
            clustering: Clustering {
                clusters: labels.cluster_count(),
                core_points: stats.roles.core,
                border_points: stats.roles.border,
                non_core_points: stats.roles.non_core,
                noise_points: stats.noise,
                mean_distance_evaluations: stats.mean_distance_evaluations,
                distance_evaluations: search.distance_evaluations,
                reference_evaluations: search.reference_evaluations,
            },
            timings_ms: TimingsMs::from(timings),
            metrics: Metrics {
                silhouette: stats.silhouette,
                davies_bouldin: stats.davies_bouldin,
                true_positives: external.map(|scores| scores.true_positives),
                true_negatives: external.map(|scores| scores.true_negatives),
                pairs: points * points.saturating_sub(1) / 2,
                rand_index: external.map(|scores| scores.rand_index),
                purity: external.map(|scores| scores.purity),
            },
        }
    }
}

fn write_file(
    path: &Path,
    render: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), CliError> {
    let attempt = || -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        render(&mut writer)?;
        writer.flush()
    };
    attempt().map_err(|source| CliError::Output {
        path: path.to_path_buf(),
        source,
    })
}

fn write_out_rows(writer: &mut impl Write, points: &PointSet, report: &RunReport) -> io::Result<()> {
    write!(writer, "id")?;
    for dimension in 0..points.dimensions() {
        write!(writer, "{SEPARATOR}d{dimension}")?;
    }
    writeln!(writer, "{SEPARATOR}distance_calculations{SEPARATOR}is_core{SEPARATOR}cluster_id")?;

    for (point, label) in points.points().iter().zip(report.labels.assignments()) {
        write!(writer, "{}", point.id())?;
        for value in point.coordinates() {
            write!(writer, "{SEPARATOR}{value}")?;
        }
        writeln!(
            writer,
            "{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            point.distance_evaluations(),
            u8::from(point.role() == PointRole::Core),
            label.get(),
        )?;
    }
    Ok(())
}

fn write_id_list(writer: &mut impl Write, ids: impl Iterator<Item = usize>) -> io::Result<()> {
    write!(writer, "[")?;
    for (index, id) in ids.enumerate() {
        if index > 0 {
            write!(writer, " ")?;
        }
        write!(writer, "{id}")?;
    }
    write!(writer, "]")
}

fn write_debug_rows(writer: &mut impl Write, points: &PointSet) -> io::Result<()> {
    writeln!(writer, "id{SEPARATOR}k_distance{SEPARATOR}rnn_count{SEPARATOR}knn{SEPARATOR}rnn")?;
    for point in points.points() {
        write!(writer, "{}{SEPARATOR}", point.id())?;
        if let Some(distance) = point.k_distance() {
            write!(writer, "{distance}")?;
        }
        write!(writer, "{SEPARATOR}{}{SEPARATOR}", point.rnn().len())?;
        write_id_list(writer, point.knn().iter().map(|neighbour| neighbour.id))?;
        write!(writer, "{SEPARATOR}")?;
        write_id_list(writer, point.rnn().iter().copied())?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Writes the `OUT_`, `DEBUG_` and `STAT_` files into `dir`, creating it when
/// missing.
#[instrument(
    name = "cli.write_outputs",
    err,
    skip(points, report, statistics),
    fields(dir = %dir.display()),
)]
pub(super) fn write_outputs(
    dir: &Path,
    suffix: &str,
    points: &PointSet,
    report: &RunReport,
    statistics: &RunStatistics,
) -> Result<OutputFiles, CliError> {
    fs::create_dir_all(dir).map_err(|source| CliError::Output {
        path: dir.to_path_buf(),
        source,
    })?;
    let files = OutputFiles {
        out: dir.join(format!("OUT_{suffix}.csv")),
        debug: dir.join(format!("DEBUG_{suffix}.csv")),
        stats: dir.join(format!("STAT_{suffix}.json")),
    };

    write_file(&files.out, |writer| write_out_rows(writer, points, report))?;
    write_file(&files.debug, |writer| write_debug_rows(writer, points))?;
    write_file(&files.stats, |writer| {
        serde_json::to_writer_pretty(&mut *writer, statistics)?;
        writeln!(writer)
    })?;

    info!(suffix, "output files written");
    Ok(files)
}
