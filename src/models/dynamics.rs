//! Dynamics (state transition) models
//!
//! Describes how the hidden state evolves between time steps, with additive
//! zero-mean Gaussian process noise:
//!
//! - linear:    x_{k+1} = A * x_k + B * u_k + w,  w ~ N(0, W)
//! - nonlinear: x_{k+1} = f(x_k, u_k) + w,        w ~ N(0, W)

use alloc::sync::Arc;

use nalgebra::{DMatrix, DVector, RealField, Scalar};

use crate::types::symmetric::SymmetricMatrix;
use crate::{FilterError, Result};

/// Shared transition closure: (state, control) → next state.
pub type TransitionFn<T> = Arc<dyn Fn(&DVector<T>, &DVector<T>) -> DVector<T> + Send + Sync>;

// ============================================================================
// Linear Dynamics
// ============================================================================

/// A linear state transition model.
///
/// Holds the transition matrix `A` (n×n), the control matrix `B` (n×m), and
/// the process noise covariance `W` (symmetric n×n). The row counts of all
/// three must agree; violations fail construction rather than surfacing as
/// shape panics deep inside the recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearDynamicsModel<T: Scalar> {
    a: DMatrix<T>,
    b: DMatrix<T>,
    w: SymmetricMatrix<T>,
}

impl<T: RealField + Copy> LinearDynamicsModel<T> {
    /// Creates a linear dynamics model.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] when `A` is not square, or the row
    /// counts of `B` or `W` disagree with `A`.
    pub fn new(a: DMatrix<T>, b: DMatrix<T>, w: SymmetricMatrix<T>) -> Result<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(FilterError::DimensionMismatch {
                context: "transition matrix columns",
                expected: n,
                found: a.ncols(),
            });
        }
        if b.nrows() != n {
            return Err(FilterError::DimensionMismatch {
                context: "control matrix rows",
                expected: n,
                found: b.nrows(),
            });
        }
        if w.size() != n {
            return Err(FilterError::DimensionMismatch {
                context: "process noise dimension",
                expected: n,
                found: w.size(),
            });
        }
        Ok(Self { a, b, w })
    }

    /// Creates a linear dynamics model from plain matrices.
    ///
    /// The noise matrix is promoted to symmetric storage without numeric
    /// validation; the caller asserts symmetry.
    ///
    /// # Panics
    /// Panics if `w` is not square.
    pub fn from_matrices(a: DMatrix<T>, b: DMatrix<T>, w: DMatrix<T>) -> Result<Self> {
        Self::new(a, b, SymmetricMatrix::from_matrix(&w))
    }

    /// The state transition matrix `A`.
    #[inline]
    pub fn transition_matrix(&self) -> &DMatrix<T> {
        &self.a
    }

    /// The control matrix `B`.
    #[inline]
    pub fn control_matrix(&self) -> &DMatrix<T> {
        &self.b
    }

    /// The process noise covariance `W`.
    #[inline]
    pub fn process_noise(&self) -> &SymmetricMatrix<T> {
        &self.w
    }

    /// The state dimension n.
    #[inline]
    pub fn state_dim(&self) -> usize {
        self.a.nrows()
    }

    /// The control dimension m.
    #[inline]
    pub fn control_dim(&self) -> usize {
        self.b.ncols()
    }

    /// Propagates a state: `A * x + B * u`.
    ///
    /// Dimension checks happen at the recursion boundary, not here.
    #[inline]
    pub fn transition(&self, state: &DVector<T>, control: &DVector<T>) -> DVector<T> {
        &self.a * state + &self.b * control
    }
}

// ============================================================================
// Nonlinear Dynamics
// ============================================================================

/// A nonlinear state transition model.
///
/// Holds a transition closure f(state, control) → next state and the process
/// noise covariance `W`, whose size declares the state dimension.
#[derive(Clone)]
pub struct NonlinearDynamicsModel<T: Scalar> {
    f: TransitionFn<T>,
    w: SymmetricMatrix<T>,
}

impl<T: RealField + Copy> NonlinearDynamicsModel<T> {
    /// Creates a nonlinear dynamics model.
    pub fn new(f: TransitionFn<T>, w: SymmetricMatrix<T>) -> Self {
        Self { f, w }
    }

    /// Creates a nonlinear dynamics model with a plain noise matrix,
    /// promoted to symmetric storage without numeric validation.
    ///
    /// # Panics
    /// Panics if `w` is not square.
    pub fn from_matrix(f: TransitionFn<T>, w: DMatrix<T>) -> Self {
        Self::new(f, SymmetricMatrix::from_matrix(&w))
    }

    /// The transition closure.
    #[inline]
    pub fn transition_fn(&self) -> &TransitionFn<T> {
        &self.f
    }

    /// The process noise covariance `W`.
    #[inline]
    pub fn process_noise(&self) -> &SymmetricMatrix<T> {
        &self.w
    }

    /// The state dimension n, declared by the noise covariance.
    #[inline]
    pub fn state_dim(&self) -> usize {
        self.w.size()
    }

    /// Propagates a state through the transition closure.
    #[inline]
    pub fn transition(&self, state: &DVector<T>, control: &DVector<T>) -> DVector<T> {
        (self.f)(state, control)
    }
}

impl<T: Scalar> ::core::fmt::Debug for NonlinearDynamicsModel<T> {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.debug_struct("NonlinearDynamicsModel")
            .field("f", &"<transition fn>")
            .field("w", &self.w)
            .finish()
    }
}

// ============================================================================
// Closed Dynamics Capability
// ============================================================================

/// The closed set of dynamics model variants.
///
/// Filters dispatch on the variant tag: the Kalman filter demands the linear
/// variant by type, the extended and unscented filters accept either and
/// branch per variant.
#[derive(Debug, Clone)]
pub enum DynamicsModel<T: Scalar> {
    /// Linear transition `A x + B u`
    Linear(LinearDynamicsModel<T>),
    /// Nonlinear transition f(x, u)
    Nonlinear(NonlinearDynamicsModel<T>),
}

impl<T: RealField + Copy> DynamicsModel<T> {
    /// Whether this is the linear variant.
    #[inline]
    pub fn is_linear(&self) -> bool {
        matches!(self, DynamicsModel::Linear(_))
    }

    /// The state dimension n.
    #[inline]
    pub fn state_dim(&self) -> usize {
        match self {
            DynamicsModel::Linear(m) => m.state_dim(),
            DynamicsModel::Nonlinear(m) => m.state_dim(),
        }
    }

    /// The process noise covariance `W`.
    #[inline]
    pub fn process_noise(&self) -> &SymmetricMatrix<T> {
        match self {
            DynamicsModel::Linear(m) => m.process_noise(),
            DynamicsModel::Nonlinear(m) => m.process_noise(),
        }
    }

    /// Propagates a state through the transition.
    #[inline]
    pub fn transition(&self, state: &DVector<T>, control: &DVector<T>) -> DVector<T> {
        match self {
            DynamicsModel::Linear(m) => m.transition(state, control),
            DynamicsModel::Nonlinear(m) => m.transition(state, control),
        }
    }

    /// Checks a control vector against the declared control dimension.
    ///
    /// Only the linear variant declares one; nonlinear transitions accept
    /// whatever their closure accepts.
    pub(crate) fn check_control(&self, control: &DVector<T>) -> Result<()> {
        if let DynamicsModel::Linear(m) = self {
            if control.len() != m.control_dim() {
                return Err(FilterError::DimensionMismatch {
                    context: "control vector length",
                    expected: m.control_dim(),
                    found: control.len(),
                });
            }
        }
        Ok(())
    }

    /// Checks a belief dimension against the declared state dimension.
    pub(crate) fn check_state(&self, dim: usize) -> Result<()> {
        if dim != self.state_dim() {
            return Err(FilterError::DimensionMismatch {
                context: "belief dimension",
                expected: self.state_dim(),
                found: dim,
            });
        }
        Ok(())
    }
}

impl<T: Scalar> From<LinearDynamicsModel<T>> for DynamicsModel<T> {
    fn from(model: LinearDynamicsModel<T>) -> Self {
        DynamicsModel::Linear(model)
    }
}

impl<T: Scalar> From<NonlinearDynamicsModel<T>> for DynamicsModel<T> {
    fn from(model: NonlinearDynamicsModel<T>) -> Self {
        DynamicsModel::Nonlinear(model)
    }
}
