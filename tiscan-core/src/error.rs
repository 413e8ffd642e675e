//! Error types for the Tiscan core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::distance::DistanceError;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while assembling a [`crate::PointSet`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PointSetError {
    /// The dataset declared zero coordinates per point.
    #[error("points must have positive dimension")]
    ZeroDimension,
    /// A row did not match the declared dimensionality.
    #[error("point {index} has {found} coordinates but the dataset declares {expected}")]
    DimensionMismatch {
        /// Row that failed validation.
        index: usize,
        /// Declared dataset dimensionality.
        expected: usize,
        /// Number of coordinates found on the row.
        found: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("point {index} has a non-finite value in dimension {dimension}: {value}")]
    NonFinite {
        /// Row that failed validation.
        index: usize,
        /// Offending coordinate position.
        dimension: usize,
        /// Offending value.
        value: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`PointSetError`] variants.
    enum PointSetErrorCode for PointSetError {
        /// The dataset declared zero coordinates per point.
        ZeroDimension => ZeroDimension => "POINT_SET_ZERO_DIMENSION",
        /// A row did not match the declared dimensionality.
        DimensionMismatch => DimensionMismatch { .. } => "POINT_SET_DIMENSION_MISMATCH",
        /// A coordinate was NaN or infinite.
        NonFinite => NonFinite { .. } => "POINT_SET_NON_FINITE",
    }
}

/// Error type produced when configuring or running a [`crate::Tiscan`]
/// pipeline or one of its stages.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TiscanError {
    /// The neighbour count `k` must be at least one.
    #[error("k must be at least 1 (got {got})")]
    InvalidK {
        /// The rejected neighbour count.
        got: usize,
    },
    /// The neighbourhood radius must be finite and strictly positive.
    #[error("eps must be a finite value greater than zero (got {got})")]
    InvalidEpsilon {
        /// The rejected radius.
        got: f64,
    },
    /// The epsilon variant's density threshold must be at least one.
    #[error("min_pts must be at least 1 (got {got})")]
    InvalidMinPts {
        /// The rejected threshold.
        got: usize,
    },
    /// The reverse-neighbour density factor must be finite and non-negative.
    #[error("density factor must be a finite, non-negative value (got {got})")]
    InvalidDensityFactor {
        /// The rejected factor.
        got: f64,
    },
    /// The distance metric could not be configured.
    #[error("invalid distance metric: {error}")]
    Metric {
        /// Underlying metric configuration error.
        #[from]
        error: DistanceError,
    },
    /// The operation requires at least one point.
    #[error("the dataset contains no points")]
    EmptyDataset,
    /// The point collection failed validation.
    #[error("invalid point set: {error}")]
    PointSet {
        /// Underlying validation error.
        #[from]
        error: PointSetError,
    },
    /// A label vector did not cover exactly the points of the dataset.
    #[error("{what} has {found} labels but the dataset has {expected} points")]
    LabelLengthMismatch {
        /// Which label vector was rejected.
        what: &'static str,
        /// Number of points in the dataset.
        expected: usize,
        /// Number of labels supplied.
        found: usize,
    },
    /// Clustering was requested before the matching neighbour search ran.
    #[error("clustering requires {required}; run the matching neighbour search first")]
    MissingNeighbours {
        /// Description of the neighbour relation the algorithm consumes.
        required: &'static str,
    },
}

define_error_codes! {
    /// Stable codes describing [`TiscanError`] variants.
    enum TiscanErrorCode for TiscanError {
        /// The neighbour count `k` must be at least one.
        InvalidK => InvalidK { .. } => "TISCAN_INVALID_K",
        /// The neighbourhood radius must be finite and strictly positive.
        InvalidEpsilon => InvalidEpsilon { .. } => "TISCAN_INVALID_EPSILON",
        /// The epsilon variant's density threshold must be at least one.
        InvalidMinPts => InvalidMinPts { .. } => "TISCAN_INVALID_MIN_PTS",
        /// The reverse-neighbour density factor must be finite and non-negative.
        InvalidDensityFactor => InvalidDensityFactor { .. } => "TISCAN_INVALID_DENSITY_FACTOR",
        /// The distance metric could not be configured.
        InvalidMetric => Metric { .. } => "TISCAN_INVALID_METRIC",
        /// The operation requires at least one point.
        EmptyDataset => EmptyDataset => "TISCAN_EMPTY_DATASET",
        /// The point collection failed validation.
        InvalidPointSet => PointSet { .. } => "TISCAN_INVALID_POINT_SET",
        /// A label vector did not cover exactly the points of the dataset.
        LabelLengthMismatch => LabelLengthMismatch { .. } => "TISCAN_LABEL_LENGTH_MISMATCH",
        /// Clustering was requested before the matching neighbour search ran.
        MissingNeighbours => MissingNeighbours { .. } => "TISCAN_MISSING_NEIGHBOURS",
    }
}

impl TiscanError {
    /// Retrieve the inner [`PointSetErrorCode`] when the error originated in
    /// point-set validation.
    #[must_use]
    pub const fn point_set_code(&self) -> Option<PointSetErrorCode> {
        match self {
            Self::PointSet { error } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TiscanError>;
