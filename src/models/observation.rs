//! Observation (measurement) models
//!
//! Describes how measurements relate to the hidden state, with additive
//! zero-mean Gaussian measurement noise:
//!
//! - linear:    y = C * x + D * u + v,  v ~ N(0, V)
//! - nonlinear: y = h(x) + v,           v ~ N(0, V)

use alloc::sync::Arc;

use nalgebra::{DMatrix, DVector, RealField, Scalar};

use crate::types::symmetric::SymmetricMatrix;
use crate::{FilterError, Result};

/// Shared measurement closure: state → measurement.
pub type MeasurementFn<T> = Arc<dyn Fn(&DVector<T>) -> DVector<T> + Send + Sync>;

// ============================================================================
// Linear Observation
// ============================================================================

/// A linear observation model.
///
/// Holds the measurement matrix `C` (k×n), the feed-forward matrix `D`
/// (k×m), and the measurement noise covariance `V` (symmetric k×k). The row
/// counts of all three must agree.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearObservationModel<T: Scalar> {
    c: DMatrix<T>,
    d: DMatrix<T>,
    v: SymmetricMatrix<T>,
}

impl<T: RealField + Copy> LinearObservationModel<T> {
    /// Creates a linear observation model.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] when the row counts of `D` or `V`
    /// disagree with `C`.
    pub fn new(c: DMatrix<T>, d: DMatrix<T>, v: SymmetricMatrix<T>) -> Result<Self> {
        let k = c.nrows();
        if d.nrows() != k {
            return Err(FilterError::DimensionMismatch {
                context: "feedforward matrix rows",
                expected: k,
                found: d.nrows(),
            });
        }
        if v.size() != k {
            return Err(FilterError::DimensionMismatch {
                context: "measurement noise dimension",
                expected: k,
                found: v.size(),
            });
        }
        Ok(Self { c, d, v })
    }

    /// Creates a model with no feed-forward term.
    ///
    /// `D` defaults to an all-zero k×k matrix sized from `C`'s row count,
    /// signalling "no control influence on the measurement" without making
    /// the caller size a zero matrix.
    pub fn without_feedforward(c: DMatrix<T>, v: SymmetricMatrix<T>) -> Result<Self> {
        let k = c.nrows();
        Self::new(c, DMatrix::zeros(k, k), v)
    }

    /// Creates a linear observation model from plain matrices.
    ///
    /// The noise matrix is promoted to symmetric storage without numeric
    /// validation; the caller asserts symmetry.
    ///
    /// # Panics
    /// Panics if `v` is not square.
    pub fn from_matrices(c: DMatrix<T>, d: DMatrix<T>, v: DMatrix<T>) -> Result<Self> {
        Self::new(c, d, SymmetricMatrix::from_matrix(&v))
    }

    /// The measurement matrix `C`.
    #[inline]
    pub fn observation_matrix(&self) -> &DMatrix<T> {
        &self.c
    }

    /// The feed-forward matrix `D`.
    #[inline]
    pub fn feedforward_matrix(&self) -> &DMatrix<T> {
        &self.d
    }

    /// The measurement noise covariance `V`.
    #[inline]
    pub fn measurement_noise(&self) -> &SymmetricMatrix<T> {
        &self.v
    }

    /// The measurement dimension k.
    #[inline]
    pub fn measurement_dim(&self) -> usize {
        self.c.nrows()
    }

    /// The state dimension n expected by `C`.
    #[inline]
    pub fn state_dim(&self) -> usize {
        self.c.ncols()
    }

    /// Predicts a measurement with no control contribution: `C * x`.
    #[inline]
    pub fn observe(&self, state: &DVector<T>) -> DVector<T> {
        &self.c * state
    }

    /// Predicts a measurement including the feed-forward term:
    /// `C * x + D * u`.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] when the control length disagrees
    /// with `D`'s column count.
    pub fn observe_with_control(
        &self,
        state: &DVector<T>,
        control: &DVector<T>,
    ) -> Result<DVector<T>> {
        if control.len() != self.d.ncols() {
            return Err(FilterError::DimensionMismatch {
                context: "feedforward control length",
                expected: self.d.ncols(),
                found: control.len(),
            });
        }
        Ok(&self.c * state + &self.d * control)
    }
}

// ============================================================================
// Nonlinear Observation
// ============================================================================

/// A nonlinear observation model.
///
/// Holds a measurement closure h(state) → measurement and the measurement
/// noise covariance `V`, whose size declares the measurement dimension.
#[derive(Clone)]
pub struct NonlinearObservationModel<T: Scalar> {
    h: MeasurementFn<T>,
    v: SymmetricMatrix<T>,
}

impl<T: RealField + Copy> NonlinearObservationModel<T> {
    /// Creates a nonlinear observation model.
    pub fn new(h: MeasurementFn<T>, v: SymmetricMatrix<T>) -> Self {
        Self { h, v }
    }

    /// Creates a nonlinear observation model with a plain noise matrix,
    /// promoted to symmetric storage without numeric validation.
    ///
    /// # Panics
    /// Panics if `v` is not square.
    pub fn from_matrix(h: MeasurementFn<T>, v: DMatrix<T>) -> Self {
        Self::new(h, SymmetricMatrix::from_matrix(&v))
    }

    /// The measurement closure.
    #[inline]
    pub fn measurement_fn(&self) -> &MeasurementFn<T> {
        &self.h
    }

    /// The measurement noise covariance `V`.
    #[inline]
    pub fn measurement_noise(&self) -> &SymmetricMatrix<T> {
        &self.v
    }

    /// The measurement dimension k, declared by the noise covariance.
    #[inline]
    pub fn measurement_dim(&self) -> usize {
        self.v.size()
    }

    /// Predicts a measurement through the measurement closure.
    #[inline]
    pub fn observe(&self, state: &DVector<T>) -> DVector<T> {
        (self.h)(state)
    }
}

impl<T: Scalar> ::core::fmt::Debug for NonlinearObservationModel<T> {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.debug_struct("NonlinearObservationModel")
            .field("h", &"<measurement fn>")
            .field("v", &self.v)
            .finish()
    }
}

// ============================================================================
// Closed Observation Capability
// ============================================================================

/// The closed set of observation model variants.
#[derive(Debug, Clone)]
pub enum ObservationModel<T: Scalar> {
    /// Linear measurement `C x (+ D u)`
    Linear(LinearObservationModel<T>),
    /// Nonlinear measurement h(x)
    Nonlinear(NonlinearObservationModel<T>),
}

impl<T: RealField + Copy> ObservationModel<T> {
    /// Whether this is the linear variant.
    #[inline]
    pub fn is_linear(&self) -> bool {
        matches!(self, ObservationModel::Linear(_))
    }

    /// The measurement dimension k.
    #[inline]
    pub fn measurement_dim(&self) -> usize {
        match self {
            ObservationModel::Linear(m) => m.measurement_dim(),
            ObservationModel::Nonlinear(m) => m.measurement_dim(),
        }
    }

    /// The measurement noise covariance `V`.
    #[inline]
    pub fn measurement_noise(&self) -> &SymmetricMatrix<T> {
        match self {
            ObservationModel::Linear(m) => m.measurement_noise(),
            ObservationModel::Nonlinear(m) => m.measurement_noise(),
        }
    }

    /// Predicts a measurement from a state.
    #[inline]
    pub fn observe(&self, state: &DVector<T>) -> DVector<T> {
        match self {
            ObservationModel::Linear(m) => m.observe(state),
            ObservationModel::Nonlinear(m) => m.observe(state),
        }
    }

    /// Checks a measurement vector against the declared measurement
    /// dimension.
    pub(crate) fn check_measurement(&self, measurement: &DVector<T>) -> Result<()> {
        if measurement.len() != self.measurement_dim() {
            return Err(FilterError::DimensionMismatch {
                context: "measurement vector length",
                expected: self.measurement_dim(),
                found: measurement.len(),
            });
        }
        Ok(())
    }

    /// Checks a belief dimension against the state dimension declared by the
    /// measurement matrix.
    ///
    /// Only the linear variant declares one; nonlinear measurement closures
    /// accept whatever state their closure accepts.
    pub(crate) fn check_state(&self, dim: usize) -> Result<()> {
        if let ObservationModel::Linear(m) = self {
            if dim != m.state_dim() {
                return Err(FilterError::DimensionMismatch {
                    context: "belief dimension vs measurement matrix columns",
                    expected: m.state_dim(),
                    found: dim,
                });
            }
        }
        Ok(())
    }
}

impl<T: Scalar> From<LinearObservationModel<T>> for ObservationModel<T> {
    fn from(model: LinearObservationModel<T>) -> Self {
        ObservationModel::Linear(model)
    }
}

impl<T: Scalar> From<NonlinearObservationModel<T>> for ObservationModel<T> {
    fn from(model: NonlinearObservationModel<T>) -> Self {
        ObservationModel::Nonlinear(model)
    }
}
