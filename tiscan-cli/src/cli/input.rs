//! Parsing of point and ground-truth files.
//!
//! A points file starts with a `n d` header followed by `n·d`
//! whitespace-separated coordinates in row-major order. A ground-truth file is
//! a whitespace-separated list of non-negative integer class labels.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tiscan_core::PointSet;
use tracing::{Span, debug, field, instrument};

use super::commands::CliError;

/// Malformed input file contents.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum InputError {
    /// The file ended before the `n d` header was complete.
    #[error("missing `n d` header")]
    MissingHeader,
    /// A header field was not a non-negative integer.
    #[error("invalid {field} `{token}` in header")]
    InvalidHeader {
        /// Header field name.
        field: &'static str,
        /// Offending token.
        token: String,
    },
    /// The header describes more values than can be addressed.
    #[error("header `{points} {dimensions}` describes too many values")]
    HeaderOverflow {
        /// Declared point count.
        points: usize,
        /// Declared dimensionality.
        dimensions: usize,
    },
    /// A coordinate or label failed to parse.
    #[error("invalid {what} `{token}` at position {position}")]
    InvalidValue {
        /// Kind of value expected.
        what: &'static str,
        /// Zero-based index of the value after the header.
        position: usize,
        /// Offending token.
        token: String,
    },
    /// The body holds a different number of values than the header declares.
    #[error("expected {expected} coordinate values, found {found}")]
    ValueCount {
        /// Values implied by the header.
        expected: usize,
        /// Values present.
        found: usize,
    },
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and validates a points file.
#[instrument(
    name = "cli.read_points",
    err,
    fields(path = %path.display(), points = field::Empty, dimensions = field::Empty),
)]
pub(super) fn read_points(path: &Path) -> Result<PointSet, CliError> {
    let text = read(path)?;
    let (dimensions, rows) = parse_points(&text).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let points = PointSet::new(dimensions, rows)?;
    let span = Span::current();
    span.record("points", points.len());
    span.record("dimensions", dimensions);
    Ok(points)
}

/// Reads a ground-truth label file.
#[instrument(name = "cli.read_labels", err, fields(path = %path.display()))]
pub(super) fn read_labels(path: &Path) -> Result<Vec<u64>, CliError> {
    let text = read(path)?;
    let labels = parse_labels(&text).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(labels = labels.len(), "ground truth loaded");
    Ok(labels)
}

fn header_field(token: Option<&str>, field: &'static str) -> Result<usize, InputError> {
    let token = token.ok_or(InputError::MissingHeader)?;
    token.parse().map_err(|_| InputError::InvalidHeader {
        field,
        token: token.to_owned(),
    })
}

/// Splits a points file into its dimensionality and rows.
pub(super) fn parse_points(text: &str) -> Result<(usize, Vec<Vec<f64>>), InputError> {
    let mut tokens = text.split_whitespace();
    let points = header_field(tokens.next(), "point count")?;
    let dimensions = header_field(tokens.next(), "dimension count")?;
    let expected = points
        .checked_mul(dimensions)
        .ok_or(InputError::HeaderOverflow { points, dimensions })?;

    let values = tokens
        .enumerate()
        .map(|(position, token)| {
            token.parse::<f64>().map_err(|_| InputError::InvalidValue {
                what: "coordinate",
                position,
                token: token.to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != expected {
        return Err(InputError::ValueCount {
            expected,
            found: values.len(),
        });
    }

    let rows = if dimensions == 0 {
        Vec::new()
    } else {
        values.chunks(dimensions).map(<[f64]>::to_vec).collect()
    };
    Ok((dimensions, rows))
}

/// Parses whitespace-separated class labels.
pub(super) fn parse_labels(text: &str) -> Result<Vec<u64>, InputError> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse().map_err(|_| InputError::InvalidValue {
                what: "label",
                position,
                token: token.to_owned(),
            })
        })
        .collect()
}
