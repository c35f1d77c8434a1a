//! Extended Kalman filter for nonlinear systems
//!
//! Propagates the mean through the true (possibly nonlinear) models and the
//! covariance through their first-order linearization: the transition
//! Jacobian F = ∂f/∂x at the current mean and the measurement Jacobian
//! H = ∂h/∂x at the predicted mean. Linear model variants short-circuit to
//! their exact matrices.
//!
//! Construction rejects an all-linear model pair: the EKF would degenerate
//! correctly to the plain Kalman filter, but [`KalmanFilter`] is the
//! cheaper, numerically simpler path for that case.
//!
//! [`KalmanFilter`]: crate::filters::KalmanFilter
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use gaussfilt::prelude::*;
//! use nalgebra::{dmatrix, dvector, DMatrix, DVector};
//!
//! // Linear constant-velocity dynamics...
//! let dynamics = LinearDynamicsModel::from_matrices(
//!     dmatrix![
//!         1.0, 0.0, 1.0, 0.0;
//!         0.0, 1.0, 0.0, 1.0;
//!         0.0, 0.0, 1.0, 0.0;
//!         0.0, 0.0, 0.0, 1.0
//!     ],
//!     DMatrix::zeros(4, 1),
//!     DMatrix::identity(4, 4).scale(0.01),
//! )
//! .unwrap();
//!
//! // ...observed by a range-bearing sensor at the origin.
//! let h: MeasurementFn<f64> = Arc::new(|x: &DVector<f64>| {
//!     dvector![(x[0] * x[0] + x[1] * x[1]).sqrt(), x[1].atan2(x[0])]
//! });
//! let observation =
//!     NonlinearObservationModel::from_matrix(h, dmatrix![1.0, 0.0; 0.0, 0.01]);
//!
//! let filter =
//!     ExtendedKalmanFilter::new(dynamics.into(), observation.into()).unwrap();
//! let belief = GaussianBelief::with_identity_covariance(dvector![100.0, 0.0, 10.0, 0.0]);
//! let predicted = filter.predict(&belief, &dvector![0.0]).unwrap();
//! ```

use nalgebra::{DMatrix, DVector, RealField, Scalar};

use crate::filters::{kalman_update, BayesFilter};
use crate::linalg::numerical_jacobian;
use crate::models::{DynamicsModel, ObservationModel};
use crate::types::belief::GaussianBelief;
use crate::{FilterError, Result};

/// An extended Kalman filter over a mixed linear/nonlinear model pair.
///
/// At least one of the two models must be nonlinear; both may be.
#[derive(Debug, Clone)]
pub struct ExtendedKalmanFilter<T: Scalar> {
    dynamics: DynamicsModel<T>,
    observation: ObservationModel<T>,
}

impl<T: RealField + Copy> ExtendedKalmanFilter<T> {
    /// Creates an extended Kalman filter.
    ///
    /// # Errors
    /// [`FilterError::InvalidFilterComposition`] when both models are the
    /// linear variants — use the plain Kalman filter instead.
    pub fn new(dynamics: DynamicsModel<T>, observation: ObservationModel<T>) -> Result<Self> {
        if dynamics.is_linear() && observation.is_linear() {
            return Err(FilterError::InvalidFilterComposition);
        }
        Ok(Self {
            dynamics,
            observation,
        })
    }

    /// The dynamics model.
    #[inline]
    pub fn dynamics(&self) -> &DynamicsModel<T> {
        &self.dynamics
    }

    /// The observation model.
    #[inline]
    pub fn observation(&self) -> &ObservationModel<T> {
        &self.observation
    }

    /// Transition Jacobian at the given mean: exact `A` for the linear
    /// variant, central differences of f otherwise.
    fn transition_jacobian(&self, mean: &DVector<T>, control: &DVector<T>) -> DMatrix<T> {
        match &self.dynamics {
            DynamicsModel::Linear(m) => m.transition_matrix().clone(),
            DynamicsModel::Nonlinear(m) => {
                numerical_jacobian(|x| m.transition(x, control), mean, m.state_dim())
            }
        }
    }

    /// Measurement Jacobian at the given mean: exact `C` for the linear
    /// variant, central differences of h otherwise.
    fn measurement_jacobian(&self, mean: &DVector<T>) -> DMatrix<T> {
        match &self.observation {
            ObservationModel::Linear(m) => m.observation_matrix().clone(),
            ObservationModel::Nonlinear(m) => {
                numerical_jacobian(|x| m.observe(x), mean, m.measurement_dim())
            }
        }
    }
}

impl<T: RealField + Copy> BayesFilter<T> for ExtendedKalmanFilter<T> {
    /// Prediction step:
    /// - μ' = f(μ, u)
    /// - Σ' = F Σ Fᵀ + W,  F = ∂f/∂x at μ
    fn predict(
        &self,
        belief: &GaussianBelief<T>,
        control: &DVector<T>,
    ) -> Result<GaussianBelief<T>> {
        self.dynamics.check_state(belief.dim())?;
        self.dynamics.check_control(control)?;

        let predicted_mean = self.dynamics.transition(belief.mean(), control);
        let f = self.transition_jacobian(belief.mean(), control);
        let predicted_cov = &f * belief.covariance().to_matrix() * f.transpose()
            + self.dynamics.process_noise().to_matrix();

        GaussianBelief::from_matrix(predicted_mean, predicted_cov)
    }

    /// Measurement update with innovation ν = y − h(μ) and Joseph-form
    /// covariance through the measurement Jacobian.
    fn update(
        &self,
        belief: &GaussianBelief<T>,
        measurement: &DVector<T>,
    ) -> Result<GaussianBelief<T>> {
        self.dynamics.check_state(belief.dim())?;
        self.observation.check_state(belief.dim())?;
        self.observation.check_measurement(measurement)?;

        let predicted_measurement = self.observation.observe(belief.mean());
        let h = self.measurement_jacobian(belief.mean());
        kalman_update(
            belief,
            &h,
            &predicted_measurement,
            self.observation.measurement_noise(),
            measurement,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        LinearDynamicsModel, LinearObservationModel, MeasurementFn, NonlinearDynamicsModel,
        NonlinearObservationModel, TransitionFn,
    };
    use crate::types::SymmetricMatrix;
    use alloc::sync::Arc;
    use nalgebra::{dmatrix, dvector};

    fn linear_dynamics() -> LinearDynamicsModel<f64> {
        LinearDynamicsModel::from_matrices(
            dmatrix![
                1.0, 0.0, 1.0, 0.0;
                0.0, 1.0, 0.0, 1.0;
                0.0, 0.0, 1.0, 0.0;
                0.0, 0.0, 0.0, 1.0
            ],
            DMatrix::zeros(4, 1),
            DMatrix::identity(4, 4).scale(0.01),
        )
        .unwrap()
    }

    fn range_bearing_observation() -> NonlinearObservationModel<f64> {
        let h: MeasurementFn<f64> = Arc::new(|x: &DVector<f64>| {
            dvector![
                num_traits::Float::sqrt(x[0] * x[0] + x[1] * x[1]),
                num_traits::Float::atan2(x[1], x[0])
            ]
        });
        NonlinearObservationModel::from_matrix(
            h,
            dmatrix![
                1.0, 0.0;
                0.0, 0.01
            ],
        )
    }

    #[test]
    fn test_rejects_all_linear_pair() {
        let observation = LinearObservationModel::without_feedforward(
            dmatrix![
                1.0, 0.0, 0.0, 0.0;
                0.0, 1.0, 0.0, 0.0
            ],
            SymmetricMatrix::identity(2),
        )
        .unwrap();

        let err =
            ExtendedKalmanFilter::new(linear_dynamics().into(), observation.into()).unwrap_err();
        assert_eq!(err, FilterError::InvalidFilterComposition);
    }

    #[test]
    fn test_accepts_one_nonlinear_model() {
        assert!(ExtendedKalmanFilter::new(
            linear_dynamics().into(),
            range_bearing_observation().into()
        )
        .is_ok());
    }

    #[test]
    fn test_predict_with_nonlinear_dynamics() {
        // Coordinated-turn-style rotation of the velocity vector.
        let omega = ::core::f64::consts::FRAC_PI_2;
        let f: TransitionFn<f64> = Arc::new(move |x: &DVector<f64>, _u: &DVector<f64>| {
            let (sin, cos) = (
                num_traits::Float::sin(omega),
                num_traits::Float::cos(omega),
            );
            dvector![
                x[0] + (x[2] * sin + x[3] * (1.0 - cos)) / omega,
                x[1] + (x[2] * (1.0 - cos) + x[3] * sin) / omega,
                x[2] * cos - x[3] * sin,
                x[2] * sin + x[3] * cos
            ]
        });
        let dynamics =
            NonlinearDynamicsModel::from_matrix(f, DMatrix::identity(4, 4).scale(0.01));

        let filter =
            ExtendedKalmanFilter::new(dynamics.into(), range_bearing_observation().into())
                .unwrap();

        // Moving east at 10 m/s while turning left a quarter circle.
        let belief = GaussianBelief::with_identity_covariance(dvector![0.0, 0.0, 10.0, 0.0]);
        let predicted = filter.predict(&belief, &DVector::zeros(0)).unwrap();

        let radius = 10.0 / omega;
        assert!((predicted.mean()[0] - radius).abs() < 1e-6);
        assert!((predicted.mean()[1] - radius).abs() < 1e-6);
        assert!(predicted.mean()[2].abs() < 1e-6);
        assert!((predicted.mean()[3] - 10.0).abs() < 1e-6);
        assert!(predicted.uncertainty() > belief.uncertainty());
    }

    #[test]
    fn test_update_range_bearing() {
        let filter =
            ExtendedKalmanFilter::new(linear_dynamics().into(), range_bearing_observation().into())
                .unwrap();

        let belief = GaussianBelief::from_matrix(
            dvector![100.0, 0.0, 0.0, 0.0],
            DMatrix::identity(4, 4).scale(1000.0),
        )
        .unwrap();

        // Range 100, bearing 0 confirms the prior position.
        let updated = filter.update(&belief, &dvector![100.0, 0.0]).unwrap();

        assert!((updated.mean()[0] - 100.0).abs() < 10.0);
        assert!(updated.mean()[1].abs() < 10.0);
        assert!(updated.uncertainty() < belief.uncertainty());
    }

    #[test]
    fn test_measurement_length_checked() {
        let filter =
            ExtendedKalmanFilter::new(linear_dynamics().into(), range_bearing_observation().into())
                .unwrap();
        let belief = GaussianBelief::with_identity_covariance(dvector![100.0, 0.0, 0.0, 0.0]);

        let err = filter.update(&belief, &dvector![100.0]).unwrap_err();
        assert_eq!(
            err,
            FilterError::DimensionMismatch {
                context: "measurement vector length",
                expected: 2,
                found: 1,
            }
        );
    }
}
