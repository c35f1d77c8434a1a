//! Gaussfilt: Gaussian-belief Bayesian filtering for Rust
//!
//! A typed library for discrete-time state estimation: a hidden state evolves
//! under noisy dynamics, is observed through noisy measurements, and is
//! estimated with a recursive Gaussian-belief filter.
//!
//! # Features
//!
//! - **Checked Model Contracts**: dimension agreement between state, control,
//!   noise, and measurement shapes is enforced at construction and at every
//!   recursion step
//! - **Closed Filter Hierarchy**: linear and nonlinear dynamics/observation
//!   models with explicit variant dispatch, consumed by the Kalman, extended
//!   Kalman, and unscented Kalman filters
//! - **no_std Support**: works without the standard library (requires `alloc`)
//!
//! # Example
//!
//! ```
//! use gaussfilt::prelude::*;
//! use nalgebra::{dmatrix, dvector};
//!
//! // Scalar random walk observed directly.
//! let dynamics = LinearDynamicsModel::from_matrices(
//!     dmatrix![1.0],
//!     dmatrix![1.0],
//!     dmatrix![0.1],
//! )
//! .unwrap();
//! let observation = LinearObservationModel::without_feedforward(
//!     dmatrix![1.0],
//!     SymmetricMatrix::from_matrix(&dmatrix![0.5]),
//! )
//! .unwrap();
//!
//! let filter = KalmanFilter::new(dynamics, observation).unwrap();
//! let prior = GaussianBelief::from_matrix(dvector![0.0], dmatrix![1.0]).unwrap();
//!
//! let predicted = filter.predict(&prior, &dvector![0.0]).unwrap();
//! let posterior = filter.update(&predicted, &dvector![0.7]).unwrap();
//! assert!(posterior.uncertainty() < predicted.uncertainty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod filters;
pub mod linalg;
pub mod models;
pub mod sim;
pub mod types;

pub mod prelude {
    pub use crate::filters::{
        BayesFilter, ExtendedKalmanFilter, KalmanFilter, UnscentedKalmanFilter,
    };
    pub use crate::models::*;
    pub use crate::sim::{run_filter, sample_noise, simulate, SimulatedTrajectory};
    pub use crate::types::belief::GaussianBelief;
    pub use crate::types::symmetric::SymmetricMatrix;
    pub use crate::{FilterError, Result};
}

/// Error types for the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Row counts or vector lengths disagree with a model's declared shapes
    DimensionMismatch {
        /// Which pair of shapes disagreed
        context: &'static str,
        /// The dimension required by the model
        expected: usize,
        /// The dimension actually supplied
        found: usize,
    },
    /// An extended Kalman filter was built from two linear models
    InvalidFilterComposition,
    /// A covariance matrix failed the positive-semidefinite check
    NonPositiveSemidefiniteCovariance {
        /// Side length of the offending covariance
        size: usize,
    },
    /// A matrix (typically the innovation covariance) could not be inverted
    SingularMatrix,
}

#[cfg(feature = "std")]
impl std::error::Error for FilterError {}

impl ::core::fmt::Display for FilterError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            FilterError::DimensionMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch in {context}: expected {expected}, found {found}"
            ),
            FilterError::InvalidFilterComposition => write!(
                f,
                "both models are linear; use KalmanFilter for a fully linear system"
            ),
            FilterError::NonPositiveSemidefiniteCovariance { size } => write!(
                f,
                "covariance matrix ({size}x{size}) is not positive semidefinite"
            ),
            FilterError::SingularMatrix => write!(f, "matrix is singular"),
        }
    }
}

pub type Result<T> = ::core::result::Result<T, FilterError>;
