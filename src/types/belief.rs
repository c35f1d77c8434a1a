//! Gaussian beliefs over the hidden state
//!
//! The belief is the sole piece of state handed between recursion steps:
//! a mean vector paired with a symmetric covariance. Beliefs are values —
//! every predict or update produces a new one rather than mutating in place.

use ::core::f64::consts::PI;

use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::Float;

use crate::types::symmetric::SymmetricMatrix;
use crate::{FilterError, Result};

/// A Gaussian distribution over the hidden state.
///
/// Valid iff the covariance is symmetric (guaranteed structurally by
/// [`SymmetricMatrix`]) and its size matches the mean length (checked at
/// construction). Positive semidefiniteness is the caller's responsibility
/// unless [`GaussianBelief::validated`] is used.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianBelief<T: Scalar> {
    mean: DVector<T>,
    covariance: SymmetricMatrix<T>,
}

impl<T: RealField + Copy> GaussianBelief<T> {
    /// Creates a belief from a mean and symmetric covariance.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] when the covariance size differs
    /// from the mean length.
    pub fn new(mean: DVector<T>, covariance: SymmetricMatrix<T>) -> Result<Self> {
        if covariance.size() != mean.len() {
            return Err(FilterError::DimensionMismatch {
                context: "belief covariance dimension",
                expected: mean.len(),
                found: covariance.size(),
            });
        }
        Ok(Self { mean, covariance })
    }

    /// Creates a belief from a mean and a plain covariance matrix.
    ///
    /// The matrix is promoted to symmetric storage without numeric
    /// validation (lower triangle read, mirrored).
    ///
    /// # Panics
    /// Panics if `covariance` is not square.
    pub fn from_matrix(mean: DVector<T>, covariance: DMatrix<T>) -> Result<Self> {
        Self::new(mean, SymmetricMatrix::from_matrix(&covariance))
    }

    /// Creates a belief and runs the opt-in positive-semidefinite check.
    ///
    /// # Errors
    /// [`FilterError::NonPositiveSemidefiniteCovariance`] when the covariance
    /// has a negative eigenvalue, [`FilterError::DimensionMismatch`] on a
    /// size disagreement.
    pub fn validated(mean: DVector<T>, covariance: SymmetricMatrix<T>) -> Result<Self> {
        covariance.validate_positive_semidefinite()?;
        Self::new(mean, covariance)
    }

    /// Creates a belief with identity covariance.
    #[inline]
    pub fn with_identity_covariance(mean: DVector<T>) -> Self {
        let covariance = SymmetricMatrix::identity(mean.len());
        Self { mean, covariance }
    }

    /// Creates a belief with diagonal covariance.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] when the diagonal length differs
    /// from the mean length.
    pub fn with_diagonal_covariance(mean: DVector<T>, diagonal: &DVector<T>) -> Result<Self> {
        Self::new(mean, SymmetricMatrix::from_diagonal(diagonal))
    }

    /// The state estimate mean.
    #[inline]
    pub fn mean(&self) -> &DVector<T> {
        &self.mean
    }

    /// The state estimate covariance.
    #[inline]
    pub fn covariance(&self) -> &SymmetricMatrix<T> {
        &self.covariance
    }

    /// The state dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Returns the trace of the covariance matrix (sum of variances).
    #[inline]
    pub fn uncertainty(&self) -> T {
        self.covariance.trace()
    }

    /// Consumes the belief and returns its mean and covariance.
    #[inline]
    pub fn into_parts(self) -> (DVector<T>, SymmetricMatrix<T>) {
        (self.mean, self.covariance)
    }
}

impl<T: RealField + Float + Copy> GaussianBelief<T> {
    /// Log-density of `x` under this belief, via Cholesky.
    ///
    /// Returns `None` when `x` has the wrong length or the covariance is not
    /// positive definite. Explicit failure is preferred over silently
    /// returning negative infinity, which could mask numerical issues.
    pub fn log_likelihood(&self, x: &DVector<T>) -> Option<T> {
        if x.len() != self.dim() {
            return None;
        }

        let l = self.covariance.cholesky()?;

        // log det(Sigma) = 2 * sum(log L_ii)
        let mut half_log_det = T::zero();
        for i in 0..self.dim() {
            half_log_det += num_traits::Float::ln(l[(i, i)]);
        }

        // Solve L * y = (x - mu), then ||y||^2 is the Mahalanobis distance.
        let diff = x - &self.mean;
        let y = l.solve_lower_triangular(&diff)?;
        let mahal_sq = y.norm_squared();

        let two = T::from_f64(2.0).unwrap();
        let two_pi = T::from_f64(2.0 * PI).unwrap();
        let n = T::from_usize(self.dim()).unwrap();

        Some(-mahal_sq / two - (n / two) * num_traits::Float::ln(two_pi) - half_log_det)
    }

    /// Density of `x` under this belief.
    ///
    /// Returns `None` under the same conditions as
    /// [`GaussianBelief::log_likelihood`].
    pub fn likelihood(&self, x: &DVector<T>) -> Option<T> {
        self.log_likelihood(x).map(num_traits::Float::exp)
    }
}
