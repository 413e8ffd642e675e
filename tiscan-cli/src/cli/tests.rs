//! Unit tests for argument parsing, input parsing, execution and output files.

use super::commands::{derive_data_source_name, run_command};
use super::input::{parse_labels, parse_points};
use super::output::file_suffix;
use super::{
    AlgorithmArg, Cli, CliError, Command, ExecutionSummary, InputError, NoiseArg, RunCommand,
    SearchArg, render_summary, run_cli,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tiscan_core::{PointSet, TiscanErrorCode};
use tiscan_test_support::tracing::RecordingLayer;
use tracing_subscriber::layer::SubscriberExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const SQUARE_WITH_OUTLIER: &str = "4 2\n0 0\n0 1\n1 0\n10 10\n";

#[fixture]
fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn create_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn command(input: PathBuf) -> RunCommand {
    RunCommand {
        input,
        ground_truth: None,
        algorithm: AlgorithmArg::Dbscan,
        k: 3,
        eps: 1.5,
        min_pts: 3,
        minkowski: 2.0,
        search: SearchArg::Pruned,
        noise: NoiseArg::Exclude,
        skip_silhouette: false,
        output_dir: None,
    }
}

fn run_expecting_error(cmd: &RunCommand, panic_msg: &str) -> CliError {
    match run_command(cmd) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

#[test]
fn parses_run_arguments_with_defaults() -> TestResult {
    let cli = Cli::try_parse_from(["tiscan", "run", "--input", "points.txt"])?;
    let Command::Run(run) = cli.command;
    assert_eq!(run.input, PathBuf::from("points.txt"));
    assert_eq!(run.algorithm, AlgorithmArg::Dbscan);
    assert_eq!(run.k, 3);
    assert_eq!(run.eps, 2.0);
    assert_eq!(run.min_pts, 4);
    assert_eq!(run.minkowski, 2.0);
    assert_eq!(run.search, SearchArg::Pruned);
    assert_eq!(run.noise, NoiseArg::Exclude);
    assert!(!run.skip_silhouette);
    assert!(run.output_dir.is_none());
    Ok(())
}

#[test]
fn parses_neighbour_count_arguments() -> TestResult {
    let cli = Cli::try_parse_from([
        "tiscan",
        "run",
        "--input",
        "points.txt",
        "--algorithm",
        "dbscrn",
        "--k",
        "7",
        "--search",
        "brute",
        "--noise",
        "include",
        "--skip-silhouette",
        "--output-dir",
        "out",
    ])?;
    let Command::Run(run) = cli.command;
    assert_eq!(run.algorithm, AlgorithmArg::Dbscrn);
    assert_eq!(run.k, 7);
    assert_eq!(run.search, SearchArg::Brute);
    assert_eq!(run.noise, NoiseArg::Include);
    assert!(run.skip_silhouette);
    assert_eq!(run.output_dir, Some(PathBuf::from("out")));
    Ok(())
}

#[test]
fn rejects_unknown_algorithm() {
    let parsed = Cli::try_parse_from(["tiscan", "run", "--input", "p", "--algorithm", "optics"]);
    assert!(parsed.is_err());
}

#[rstest]
#[case::rows("2 3\n1 2 3\n4 5 6\n", 3, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])]
#[case::free_layout("2 1 -1.5\n2e1", 1, vec![vec![-1.5], vec![20.0]])]
#[case::empty_body("0 2\n", 2, Vec::new())]
fn parses_points(#[case] text: &str, #[case] dimensions: usize, #[case] rows: Vec<Vec<f64>>) {
    let parsed = parse_points(text).expect("points must parse");
    assert_eq!(parsed, (dimensions, rows));
}

#[rstest]
#[case::empty("", InputError::MissingHeader)]
#[case::half_header("3", InputError::MissingHeader)]
#[case::bad_count("x 2", InputError::InvalidHeader { field: "point count", token: "x".into() })]
#[case::negative_dimensions("2 -1", InputError::InvalidHeader { field: "dimension count", token: "-1".into() })]
#[case::short_body("2 2\n1 2 3", InputError::ValueCount { expected: 4, found: 3 })]
#[case::long_body("1 1\n1 2", InputError::ValueCount { expected: 1, found: 2 })]
#[case::bad_value("1 2\n1 y", InputError::InvalidValue { what: "coordinate", position: 1, token: "y".into() })]
fn rejects_malformed_points(#[case] text: &str, #[case] expected: InputError) {
    assert_eq!(parse_points(text).expect_err("points must be rejected"), expected);
}

#[rstest]
#[case("0 0 1\n2", Ok(vec![0, 0, 1, 2]))]
#[case("", Ok(Vec::new()))]
#[case("1 -2", Err(InputError::InvalidValue { what: "label", position: 1, token: "-2".into() }))]
fn parses_labels(#[case] text: &str, #[case] expected: Result<Vec<u64>, InputError>) {
    assert_eq!(parse_labels(text), expected);
}

#[rstest]
#[case::with_extension("/tmp/blobs.txt", "blobs")]
#[case::without_extension("/tmp/blobs", "blobs")]
#[case::missing_stem("", "points")]
fn derives_data_source_name(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(derive_data_source_name(Path::new(raw)), expected);
}

#[rstest]
fn run_clusters_points_file(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let summary = run_cli(Cli {
        command: Command::Run(command(input)),
    })?;

    let labels: Vec<u64> = summary
        .report
        .labels
        .assignments()
        .iter()
        .map(|id| id.get())
        .collect();
    assert_eq!(labels, vec![1, 1, 1, 0]);
    assert_eq!(summary.data_source, "square");
    assert_eq!(summary.report.stats.roles.core, 3);
    assert!(summary.outputs.is_none());
    assert!(summary.timings.total >= summary.timings.search);
    Ok(())
}

#[rstest]
fn run_scores_against_ground_truth(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let truth = create_file(&temp_dir, "truth.txt", "1 1 1 2\n")?;
    let mut cmd = command(input);
    cmd.ground_truth = Some(truth);

    let summary = run_command(&cmd)?;
    let external = summary
        .report
        .stats
        .external
        .expect("ground truth was supplied");
    assert_eq!(external.rand_index, 1.0);
    assert_eq!(external.purity, 1.0);
    Ok(())
}

#[rstest]
fn run_rejects_short_ground_truth(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let truth = create_file(&temp_dir, "truth.txt", "1 1\n")?;
    let mut cmd = command(input);
    cmd.ground_truth = Some(truth);

    let err = run_expecting_error(&cmd, "short ground truth must fail");
    assert!(matches!(
        err,
        CliError::Core(ref core) if core.code() == TiscanErrorCode::LabelLengthMismatch
    ));
    Ok(())
}

#[rstest]
fn run_rejects_empty_points_file(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "empty.txt", "0 2\n")?;
    let err = run_expecting_error(&command(input), "empty input must fail");
    assert!(matches!(
        err,
        CliError::Core(ref core) if core.code() == TiscanErrorCode::EmptyDataset
    ));
    Ok(())
}

#[rstest]
fn run_reports_missing_input(temp_dir: TempDir) {
    let missing = temp_dir.path().join("absent.txt");
    let err = run_expecting_error(&command(missing.clone()), "missing input must fail");
    match err {
        CliError::Io { path, source } => {
            assert_eq!(path, missing);
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn run_reports_malformed_input_with_path(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "broken.txt", "2 2\n0 0 1\n")?;
    let err = run_expecting_error(&command(input.clone()), "malformed input must fail");
    match err {
        CliError::Input { path, source } => {
            assert_eq!(path, input);
            assert_eq!(source, InputError::ValueCount { expected: 4, found: 3 });
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[rstest]
fn run_rejects_invalid_configuration(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let mut cmd = command(input);
    cmd.minkowski = 0.5;
    let err = run_expecting_error(&cmd, "order below one must fail");
    assert!(matches!(
        err,
        CliError::Core(ref core) if core.code() == TiscanErrorCode::InvalidMetric
    ));
    Ok(())
}

#[test]
fn file_suffix_encodes_run_parameters() {
    let points = PointSet::new(2, vec![vec![0.0, 0.0], vec![1.0, 1.0]]).expect("valid rows");
    let mut cmd = command(PathBuf::from("blobs.txt"));
    assert_eq!(
        file_suffix(&cmd, "blobs", &points),
        "pruned-dbscan_blobs_D2_R2_minPts3_e1.5_minkowski2"
    );

    cmd.algorithm = AlgorithmArg::Dbscrn;
    cmd.search = SearchArg::Brute;
    cmd.k = 5;
    assert_eq!(
        file_suffix(&cmd, "blobs", &points),
        "brute-dbscrn_blobs_D2_R2_k5_minkowski2"
    );
}

#[rstest]
fn run_writes_output_files(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let out_dir = temp_dir.path().join("results");
    let mut cmd = command(input);
    cmd.output_dir = Some(out_dir.clone());

    let summary = run_command(&cmd)?;
    let files = summary.outputs.expect("output directory was given");
    let suffix = "pruned-dbscan_square_D2_R4_minPts3_e1.5_minkowski2";
    assert_eq!(files.out, out_dir.join(format!("OUT_{suffix}.csv")));
    assert_eq!(files.debug, out_dir.join(format!("DEBUG_{suffix}.csv")));
    assert_eq!(files.stats, out_dir.join(format!("STAT_{suffix}.json")));

    let out = fs::read_to_string(&files.out)?;
    let mut lines = out.lines();
    assert_eq!(
        lines.next(),
        Some("id,d0,d1,distance_calculations,is_core,cluster_id")
    );
    let rows: Vec<Vec<&str>> = lines.map(|line| line.split(',').collect()).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][..3], ["0", "0", "0"]);
    assert_eq!(rows[0][4..], ["1", "1"]);
    assert_eq!(rows[3][..3], ["3", "10", "10"]);
    assert_eq!(rows[3][4..], ["0", "0"]);

    let debug = fs::read_to_string(&files.debug)?;
    assert_eq!(
        debug.lines().next(),
        Some("id,k_distance,rnn_count,knn,rnn")
    );
    assert_eq!(debug.lines().nth(1), Some("0,,0,[],[]"));

    let stats: serde_json::Value = serde_json::from_str(&fs::read_to_string(&files.stats)?)?;
    assert_eq!(stats["dataset"]["algorithm"], "dbscan");
    assert_eq!(stats["dataset"]["points"], 4);
    assert_eq!(stats["parameters"]["min_pts"], 3);
    assert_eq!(stats["parameters"]["reference_point"], serde_json::json!([0.0, 0.0]));
    assert!(stats["parameters"].get("k").is_none());
    assert_eq!(stats["clustering"]["clusters"], 1);
    assert_eq!(stats["clustering"]["noise_points"], 1);
    assert_eq!(stats["metrics"]["pairs"], 6);
    assert!(stats["metrics"]["rand_index"].is_null());
    assert!(stats["timings_ms"]["total"].is_number());
    Ok(())
}

#[rstest]
fn neighbour_count_run_writes_relations(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let mut cmd = command(input);
    cmd.algorithm = AlgorithmArg::Dbscrn;
    cmd.k = 1;
    cmd.output_dir = Some(temp_dir.path().to_path_buf());

    let summary = run_command(&cmd)?;
    let files = summary.outputs.expect("output directory was given");
    let debug = fs::read_to_string(&files.debug)?;
    let rows: Vec<&str> = debug.lines().skip(1).collect();
    assert_eq!(
        rows,
        vec![
            "0,1,2,[1],[1 2]",
            "1,1,2,[0],[0 3]",
            "2,1,0,[0],[]",
            "3,13.45362404707371,0,[1],[]",
        ]
    );
    Ok(())
}

#[rstest]
fn render_summary_lists_metrics(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let summary: ExecutionSummary = run_command(&command(input))?;
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;

    assert!(text.starts_with("data source: square\n"));
    assert!(text.contains("search: pruned\n"));
    assert!(text.contains("points: 4 x 2\n"));
    assert!(text.contains("clusters: 1\n"));
    assert!(text.contains("roles: core 3, border 0, non-core 0, noise 1\n"));
    assert!(text.contains("davies-bouldin: undefined\n"));
    assert!(text.contains("timings (ms): load "));
    assert!(!text.contains("rand index"));
    Ok(())
}

#[rstest]
fn run_records_cli_spans(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "square.txt", SQUARE_WITH_OUTLIER)?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, || run_command(&command(input)))?;

    let execute = layer.span("cli.execute").expect("execute span recorded");
    assert_eq!(execute.field("algorithm"), Some("dbscan"));
    assert_eq!(execute.field("search"), Some("pruned"));
    let read = layer.span("cli.read_points").expect("read span recorded");
    assert_eq!(read.field("points"), Some("4"));
    assert!(layer.span("core.neighbour_search").is_some());
    Ok(())
}
