//! Minkowski distance primitives.
//!
//! A [`Minkowski`] metric validates its order once at construction and then
//! evaluates distances between coordinate slices. Orders one and two use
//! dedicated kernels so the common Manhattan and Euclidean cases avoid
//! `powf`.

use thiserror::Error;

/// Errors emitted while configuring a metric or computing distances.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceError {
    /// Either input vector had zero length.
    #[error("vectors must have positive dimension")]
    ZeroLength,
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Length of the first argument.
        left: usize,
        /// Length of the second argument.
        right: usize,
    },
    /// Minkowski order must be finite and at least one.
    #[error("minkowski order must be a finite value of at least 1 (got {order})")]
    InvalidOrder {
        /// The rejected order.
        order: f64,
    },
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Kernel {
    Manhattan,
    Euclidean,
    General(f64),
}

/// A validated Minkowski metric of order `p ≥ 1`.
///
/// # Examples
///
/// ```
/// use tiscan_core::{DistanceError, Minkowski};
///
/// fn main() -> Result<(), DistanceError> {
///     let metric = Minkowski::new(2.0)?;
///     let distance = metric.distance(&[0.0, 0.0], &[3.0, 4.0])?;
///     assert!((distance - 5.0).abs() < 1e-12);
///     Ok(())
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minkowski {
    kernel: Kernel,
}

impl Minkowski {
    /// The order-one (Manhattan) metric.
    pub const MANHATTAN: Self = Self {
        kernel: Kernel::Manhattan,
    };

    /// The order-two (Euclidean) metric.
    pub const EUCLIDEAN: Self = Self {
        kernel: Kernel::Euclidean,
    };

    /// Creates a metric of the given order.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidOrder`] when `order` is NaN, infinite
    /// or below one.
    pub fn new(order: f64) -> Result<Self> {
        if !order.is_finite() || order < 1.0 {
            return Err(DistanceError::InvalidOrder { order });
        }
        let kernel = if order == 1.0 {
            Kernel::Manhattan
        } else if order == 2.0 {
            Kernel::Euclidean
        } else {
            Kernel::General(order)
        };
        Ok(Self { kernel })
    }

    /// Returns the configured order.
    #[must_use]
    pub fn order(&self) -> f64 {
        match self.kernel {
            Kernel::Manhattan => 1.0,
            Kernel::Euclidean => 2.0,
            Kernel::General(order) => order,
        }
    }

    /// Computes the distance between two coordinate slices.
    ///
    /// # Errors
    ///
    /// - [`DistanceError::ZeroLength`] when any input is empty.
    /// - [`DistanceError::DimensionMismatch`] when input lengths differ.
    pub fn distance(&self, left: &[f64], right: &[f64]) -> Result<f64> {
        validate_lengths(left, right)?;
        Ok(self.evaluate(left, right))
    }

    /// Evaluates the distance without validating the inputs.
    ///
    /// Callers must guarantee equal, non-zero lengths. [`crate::PointSet`]
    /// enforces this when it is constructed.
    pub(crate) fn evaluate(&self, left: &[f64], right: &[f64]) -> f64 {
        let pairs = left.iter().zip(right);
        match self.kernel {
            Kernel::Manhattan => pairs.map(|(l, r)| (l - r).abs()).sum(),
            Kernel::Euclidean => pairs
                .map(|(l, r)| {
                    let diff = l - r;
                    diff * diff
                })
                .sum::<f64>()
                .sqrt(),
            Kernel::General(order) => pairs
                .map(|(l, r)| (l - r).abs().powf(order))
                .sum::<f64>()
                .powf(order.recip()),
        }
    }
}

impl Default for Minkowski {
    fn default() -> Self {
        Self::EUCLIDEAN
    }
}

/// Computes the Minkowski distance of the given order between two vectors.
///
/// # Errors
///
/// - [`DistanceError::InvalidOrder`] when `order` is below one or non-finite.
/// - [`DistanceError::ZeroLength`] when any input is empty.
/// - [`DistanceError::DimensionMismatch`] when input lengths differ.
pub fn minkowski_distance(left: &[f64], right: &[f64], order: f64) -> Result<f64> {
    Minkowski::new(order)?.distance(left, right)
}

fn validate_lengths(left: &[f64], right: &[f64]) -> Result<()> {
    if left.is_empty() || right.is_empty() {
        return Err(DistanceError::ZeroLength);
    }
    if left.len() != right.len() {
        return Err(DistanceError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(())
}
