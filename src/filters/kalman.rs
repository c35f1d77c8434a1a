//! Standard Kalman filter for linear-Gaussian systems
//!
//! The optimal estimator when both the dynamics and observation models are
//! linear with Gaussian noise. Construction demands the linear model
//! variants by type, so there is no per-step dispatch.
//!
//! # Example
//!
//! ```
//! use gaussfilt::prelude::*;
//! use nalgebra::{dmatrix, dvector};
//!
//! // 1D constant velocity: state [position, velocity].
//! let dynamics = LinearDynamicsModel::from_matrices(
//!     dmatrix![
//!         1.0, 1.0;
//!         0.0, 1.0
//!     ],
//!     dmatrix![0.0; 0.0],
//!     dmatrix![
//!         0.01, 0.0;
//!         0.0, 0.01
//!     ],
//! )
//! .unwrap();
//!
//! // Position-only measurement.
//! let observation = LinearObservationModel::from_matrices(
//!     dmatrix![1.0, 0.0],
//!     dmatrix![0.0],
//!     dmatrix![0.5],
//! )
//! .unwrap();
//!
//! let filter = KalmanFilter::new(dynamics, observation).unwrap();
//! let mut belief = GaussianBelief::with_identity_covariance(dvector![0.0, 1.0]);
//! belief = filter.step(&belief, &dvector![0.0], &dvector![1.1]).unwrap();
//! ```

use nalgebra::{DVector, RealField, Scalar};

use crate::filters::{kalman_update, BayesFilter};
use crate::models::{LinearDynamicsModel, LinearObservationModel};
use crate::types::belief::GaussianBelief;
use crate::{FilterError, Result};

/// A discrete-time linear Kalman filter.
///
/// Holds exactly one [`LinearDynamicsModel`] and one
/// [`LinearObservationModel`]; nonlinear systems belong to the extended or
/// unscented variants.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanFilter<T: Scalar> {
    dynamics: LinearDynamicsModel<T>,
    observation: LinearObservationModel<T>,
}

impl<T: RealField + Copy> KalmanFilter<T> {
    /// Creates a Kalman filter from a linear model pair.
    ///
    /// # Errors
    /// [`FilterError::DimensionMismatch`] when the measurement matrix column
    /// count disagrees with the state dimension.
    pub fn new(
        dynamics: LinearDynamicsModel<T>,
        observation: LinearObservationModel<T>,
    ) -> Result<Self> {
        if observation.state_dim() != dynamics.state_dim() {
            return Err(FilterError::DimensionMismatch {
                context: "measurement matrix columns vs state dimension",
                expected: dynamics.state_dim(),
                found: observation.state_dim(),
            });
        }
        Ok(Self {
            dynamics,
            observation,
        })
    }

    /// The dynamics model.
    #[inline]
    pub fn dynamics(&self) -> &LinearDynamicsModel<T> {
        &self.dynamics
    }

    /// The observation model.
    #[inline]
    pub fn observation(&self) -> &LinearObservationModel<T> {
        &self.observation
    }

    fn check_belief(&self, belief: &GaussianBelief<T>) -> Result<()> {
        if belief.dim() != self.dynamics.state_dim() {
            return Err(FilterError::DimensionMismatch {
                context: "belief dimension",
                expected: self.dynamics.state_dim(),
                found: belief.dim(),
            });
        }
        Ok(())
    }
}

impl<T: RealField + Copy> BayesFilter<T> for KalmanFilter<T> {
    /// Prediction step:
    /// - μ' = A μ + B u
    /// - Σ' = A Σ Aᵀ + W
    fn predict(
        &self,
        belief: &GaussianBelief<T>,
        control: &DVector<T>,
    ) -> Result<GaussianBelief<T>> {
        self.check_belief(belief)?;
        if control.len() != self.dynamics.control_dim() {
            return Err(FilterError::DimensionMismatch {
                context: "control vector length",
                expected: self.dynamics.control_dim(),
                found: control.len(),
            });
        }

        let a = self.dynamics.transition_matrix();
        let predicted_mean = self.dynamics.transition(belief.mean(), control);
        let predicted_cov = a * belief.covariance().to_matrix() * a.transpose()
            + self.dynamics.process_noise().to_matrix();

        GaussianBelief::from_matrix(predicted_mean, predicted_cov)
    }

    /// Measurement update with innovation ν = y − C μ and Joseph-form
    /// covariance.
    fn update(
        &self,
        belief: &GaussianBelief<T>,
        measurement: &DVector<T>,
    ) -> Result<GaussianBelief<T>> {
        self.check_belief(belief)?;
        if measurement.len() != self.observation.measurement_dim() {
            return Err(FilterError::DimensionMismatch {
                context: "measurement vector length",
                expected: self.observation.measurement_dim(),
                found: measurement.len(),
            });
        }

        let predicted_measurement = self.observation.observe(belief.mean());
        kalman_update(
            belief,
            self.observation.observation_matrix(),
            &predicted_measurement,
            self.observation.measurement_noise(),
            measurement,
        )
    }
}
