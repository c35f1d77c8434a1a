//! Unscented Kalman filter for nonlinear systems
//!
//! Instead of linearizing, the UKF pushes a deterministic set of sigma
//! points through the nonlinear functions and recovers mean and covariance
//! from the transformed set. No Jacobians are required, and second-order
//! effects of the nonlinearity are captured.
//!
//! # Sigma Point Selection
//!
//! Symmetric selection around the mean:
//! - χ₀ = μ
//! - χᵢ = μ + √((n+λ)Σ)ᵢ for i = 1...n
//! - χᵢ₊ₙ = μ − √((n+λ)Σ)ᵢ for i = 1...n
//!
//! with weights
//! - w₀ᵐ = λ/(n+λ)
//! - w₀ᶜ = λ/(n+λ) + (1 − α² + β)
//! - wᵢ = 1/(2(n+λ)) for the remaining 2n points
//!
//! λ controls the spread, α rescales it, and β folds in prior knowledge of
//! the distribution. The defaults (λ=2, α=1, β=0) are the common choice for
//! Gaussian beliefs in the robotics literature.
//!
//! Unlike the extended variant, the unscented filter accepts an all-linear
//! model pair: the unscented transform is exact for linear models, which
//! makes the configuration a useful cross-check against [`KalmanFilter`].
//!
//! [`KalmanFilter`]: crate::filters::KalmanFilter

use alloc::vec::Vec;

use nalgebra::{DMatrix, DVector, RealField, Scalar};

use crate::filters::BayesFilter;
use crate::linalg::matrix_square_root;
use crate::models::{DynamicsModel, ObservationModel};
use crate::types::belief::GaussianBelief;
use crate::types::symmetric::SymmetricMatrix;
use crate::{FilterError, Result};

// ============================================================================
// Sigma Points
// ============================================================================

/// The 2n+1 sigma points of a belief, with their recovery weights.
#[derive(Debug, Clone)]
pub struct SigmaPoints<T: Scalar> {
    /// The sigma points [χ₀, χ₁, ..., χ₂ₙ]
    pub points: Vec<DVector<T>>,
    /// Mean-recovery weight of the central point
    pub weight_mean_0: T,
    /// Covariance-recovery weight of the central point
    pub weight_cov_0: T,
    /// Weight of every non-central point (mean and covariance alike)
    pub weight_rest: T,
}

impl<T: RealField + Copy> SigmaPoints<T> {
    /// Generates sigma points from a belief.
    ///
    /// The covariance square root falls back from Cholesky to a symmetric
    /// eigendecomposition, so positive semidefinite (singular) covariances
    /// are handled.
    pub fn generate(belief: &GaussianBelief<T>, lambda: T, alpha: T, beta: T) -> Self {
        let n = belief.dim();
        let n_t = T::from_usize(n).unwrap();
        let two = T::from_f64(2.0).unwrap();

        // √((n+λ)Σ), column by column.
        let scaled = belief.covariance().to_matrix().scale(n_t + lambda);
        let sqrt = matrix_square_root(&scaled);

        let mut points = Vec::with_capacity(2 * n + 1);
        points.push(belief.mean().clone());
        for i in 0..n {
            let offset = sqrt.column(i).into_owned();
            points.push(belief.mean() + &offset);
            points.push(belief.mean() - &offset);
        }

        let weight_mean_0 = lambda / (n_t + lambda);
        Self {
            points,
            weight_mean_0,
            weight_cov_0: weight_mean_0 + (T::one() - alpha * alpha + beta),
            weight_rest: T::one() / (two * (n_t + lambda)),
        }
    }

    /// Pushes every sigma point through `transform` and recovers the
    /// weighted mean and covariance, adding `noise` if given.
    pub fn recover_mean_cov<F>(
        &self,
        transform: F,
        noise: Option<&SymmetricMatrix<T>>,
    ) -> (DVector<T>, DMatrix<T>)
    where
        F: Fn(&DVector<T>) -> DVector<T>,
    {
        let transformed: Vec<DVector<T>> = self.points.iter().map(transform).collect();

        let mut mean = transformed[0].scale(self.weight_mean_0);
        for t in transformed.iter().skip(1) {
            mean += t.scale(self.weight_rest);
        }

        let diff0 = &transformed[0] - &mean;
        let mut cov = (&diff0 * diff0.transpose()).scale(self.weight_cov_0);
        for t in transformed.iter().skip(1) {
            let diff = t - &mean;
            cov += (&diff * diff.transpose()).scale(self.weight_rest);
        }

        if let Some(noise) = noise {
            cov += noise.to_matrix();
        }

        (mean, cov)
    }

    /// Recovers the cross-covariance between the original points and their
    /// transforms.
    pub fn cross_covariance<F>(
        &self,
        mean: &DVector<T>,
        transform: F,
        transformed_mean: &DVector<T>,
    ) -> DMatrix<T>
    where
        F: Fn(&DVector<T>) -> DVector<T>,
    {
        let state_diff0 = &self.points[0] - mean;
        let trans_diff0 = transform(&self.points[0]) - transformed_mean;
        let mut cross = (&state_diff0 * trans_diff0.transpose()).scale(self.weight_cov_0);

        for point in self.points.iter().skip(1) {
            let state_diff = point - mean;
            let trans_diff = transform(point) - transformed_mean;
            cross += (&state_diff * trans_diff.transpose()).scale(self.weight_rest);
        }

        cross
    }
}

// ============================================================================
// Unscented Kalman Filter
// ============================================================================

/// An unscented Kalman filter with tunable sigma-point parameters.
#[derive(Debug, Clone)]
pub struct UnscentedKalmanFilter<T: Scalar> {
    dynamics: DynamicsModel<T>,
    observation: ObservationModel<T>,
    lambda: T,
    alpha: T,
    beta: T,
}

impl<T: RealField + Copy> UnscentedKalmanFilter<T> {
    /// Creates an unscented Kalman filter with the default parameters
    /// λ=2, α=1, β=0.
    pub fn new(dynamics: DynamicsModel<T>, observation: ObservationModel<T>) -> Self {
        Self::with_spread(dynamics, observation, T::from_f64(2.0).unwrap())
    }

    /// Creates a filter with an explicit spread λ and the reduced-complexity
    /// defaults α=1, β=0.
    pub fn with_spread(
        dynamics: DynamicsModel<T>,
        observation: ObservationModel<T>,
        lambda: T,
    ) -> Self {
        Self::with_params(dynamics, observation, lambda, T::one(), T::zero())
    }

    /// Creates a filter with fully explicit sigma-point parameters.
    pub fn with_params(
        dynamics: DynamicsModel<T>,
        observation: ObservationModel<T>,
        lambda: T,
        alpha: T,
        beta: T,
    ) -> Self {
        Self {
            dynamics,
            observation,
            lambda,
            alpha,
            beta,
        }
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

    /// The sigma-point spread λ.
    #[inline]
    pub fn lambda(&self) -> T {
        self.lambda
    }

    /// The sigma-point scaling α.
    #[inline]
    pub fn alpha(&self) -> T {
        self.alpha
    }

    /// The prior-knowledge weighting β.
    #[inline]
    pub fn beta(&self) -> T {
        self.beta
    }

    fn sigma_points(&self, belief: &GaussianBelief<T>) -> SigmaPoints<T> {
        SigmaPoints::generate(belief, self.lambda, self.alpha, self.beta)
    }
}

impl<T: RealField + Copy> BayesFilter<T> for UnscentedKalmanFilter<T> {
    /// Prediction step: sigma points through the transition, weighted
    /// recovery, plus process noise.
    fn predict(
        &self,
        belief: &GaussianBelief<T>,
        control: &DVector<T>,
    ) -> Result<GaussianBelief<T>> {
        self.dynamics.check_state(belief.dim())?;
        self.dynamics.check_control(control)?;

        let sigma = self.sigma_points(belief);
        let (mean, cov) = sigma.recover_mean_cov(
            |x| self.dynamics.transition(x, control),
            Some(self.dynamics.process_noise()),
        );

        GaussianBelief::from_matrix(mean, cov)
    }

    /// Measurement update:
    /// - sigma points through the observation → predicted measurement
    ///   mean/covariance S (plus V)
    /// - cross-covariance Σ_xz between state and measurement
    /// - K = Σ_xz S⁻¹, μ' = μ + K ν, Σ' = Σ − K S Kᵀ
    fn update(
        &self,
        belief: &GaussianBelief<T>,
        measurement: &DVector<T>,
    ) -> Result<GaussianBelief<T>> {
        self.dynamics.check_state(belief.dim())?;
        self.observation.check_state(belief.dim())?;
        self.observation.check_measurement(measurement)?;

        let sigma = self.sigma_points(belief);
        let (z_mean, z_cov) = sigma.recover_mean_cov(
            |x| self.observation.observe(x),
            Some(self.observation.measurement_noise()),
        );

        let cross = sigma.cross_covariance(
            belief.mean(),
            |x| self.observation.observe(x),
            &z_mean,
        );

        let z_cov_inv = z_cov
            .clone()
            .try_inverse()
            .ok_or(FilterError::SingularMatrix)?;
        let gain = cross * z_cov_inv;

        let innovation = measurement - &z_mean;
        let updated_mean = belief.mean() + &gain * innovation;
        let updated_cov =
            belief.covariance().to_matrix() - &gain * z_cov * gain.transpose();

        GaussianBelief::from_matrix(updated_mean, updated_cov)
    }
}
