//! Gaussian-belief filters
//!
//! - [`kalman::KalmanFilter`]: standard linear Kalman filter
//! - [`ekf::ExtendedKalmanFilter`]: Jacobian-linearized filter for nonlinear
//!   models
//! - [`ukf::UnscentedKalmanFilter`]: sigma-point filter for nonlinear models
//!
//! All three implement [`BayesFilter`], the predict/update recursion
//! contract. A filter holds its models immutably; the belief is the only
//! state threaded through the recursion, and every step returns a new one.

pub mod ekf;
pub mod kalman;
pub mod ukf;

pub use ekf::ExtendedKalmanFilter;
pub use kalman::KalmanFilter;
pub use ukf::UnscentedKalmanFilter;

use nalgebra::{DMatrix, DVector, RealField};

use crate::types::belief::GaussianBelief;
use crate::types::symmetric::SymmetricMatrix;
use crate::{FilterError, Result};

/// The predict/update recursion over Gaussian beliefs.
///
/// Both operations fail with [`FilterError::DimensionMismatch`] when the
/// belief, control, or measurement length disagrees with the filter's
/// declared model shapes.
pub trait BayesFilter<T: RealField + Copy> {
    /// Propagates a belief through the dynamics model.
    fn predict(&self, belief: &GaussianBelief<T>, control: &DVector<T>) -> Result<GaussianBelief<T>>;

    /// Conditions a belief on a measurement.
    fn update(
        &self,
        belief: &GaussianBelief<T>,
        measurement: &DVector<T>,
    ) -> Result<GaussianBelief<T>>;

    /// Performs a single predict-update cycle.
    fn step(
        &self,
        belief: &GaussianBelief<T>,
        control: &DVector<T>,
        measurement: &DVector<T>,
    ) -> Result<GaussianBelief<T>> {
        let predicted = self.predict(belief, control)?;
        self.update(&predicted, measurement)
    }
}

/// Shared measurement update for the Kalman and extended Kalman filters.
///
/// Given the (possibly linearized) observation matrix `H` and the predicted
/// measurement `ŷ`:
/// - ν = y − ŷ (innovation)
/// - S = H P Hᵀ + V (innovation covariance)
/// - K = P Hᵀ S⁻¹ (Kalman gain)
/// - μ' = μ + K ν
/// - P' = (I − K H) P (I − K H)ᵀ + K V Kᵀ (Joseph form)
///
/// # Errors
/// [`FilterError::SingularMatrix`] when the innovation covariance cannot be
/// inverted.
pub(crate) fn kalman_update<T: RealField + Copy>(
    belief: &GaussianBelief<T>,
    obs_matrix: &DMatrix<T>,
    predicted_measurement: &DVector<T>,
    noise: &SymmetricMatrix<T>,
    measurement: &DVector<T>,
) -> Result<GaussianBelief<T>> {
    let p = belief.covariance().to_matrix();
    let v = noise.to_matrix();

    let innovation = measurement - predicted_measurement;
    let innovation_cov = obs_matrix * &p * obs_matrix.transpose() + &v;

    let s_inv = innovation_cov
        .try_inverse()
        .ok_or(FilterError::SingularMatrix)?;
    let gain = &p * obs_matrix.transpose() * s_inv;

    let updated_mean = belief.mean() + &gain * innovation;

    let identity = DMatrix::identity(belief.dim(), belief.dim());
    let i_kh = identity - &gain * obs_matrix;
    let updated_cov = &i_kh * &p * i_kh.transpose() + &gain * v * gain.transpose();

    GaussianBelief::from_matrix(updated_mean, updated_cov)
}
