//! Trajectory simulation and batch filtering
//!
//! Rolls a ground-truth trajectory and a noisy measurement sequence out of a
//! model pair, and folds measurement sequences through a filter. The RNG is
//! caller-supplied, so simulation stays deterministic under a seeded
//! generator and the library itself never touches a global entropy source.

use alloc::vec::Vec;

use nalgebra::{DVector, RealField};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::filters::BayesFilter;
use crate::linalg::matrix_square_root;
use crate::models::{DynamicsModel, ObservationModel};
use crate::types::belief::GaussianBelief;
use crate::types::symmetric::SymmetricMatrix;
use crate::{FilterError, Result};

/// A simulated ground-truth trajectory with its measurement sequence.
///
/// `states[k]` and `measurements[k]` correspond to the state after applying
/// the k-th control.
#[derive(Debug, Clone)]
pub struct SimulatedTrajectory<T: RealField> {
    /// Ground-truth states, one per control
    pub states: Vec<DVector<T>>,
    /// Noisy measurements, one per state
    pub measurements: Vec<DVector<T>>,
}

/// Samples a zero-mean Gaussian vector with the given covariance.
///
/// Draws standard normal components and colors them with the covariance
/// square root, so positive semidefinite (singular) covariances are valid.
pub fn sample_noise<T, R>(covariance: &SymmetricMatrix<T>, rng: &mut R) -> DVector<T>
where
    T: RealField + Copy,
    R: Rng + ?Sized,
{
    let sqrt = matrix_square_root(&covariance.to_matrix());
    let white = DVector::from_fn(covariance.size(), |_, _| {
        let sample: f64 = StandardNormal.sample(rng);
        T::from_f64(sample).unwrap()
    });
    sqrt * white
}

/// Simulates a trajectory under the given models.
///
/// Starting from `initial_state`, each control advances the truth through
/// the dynamics with sampled process noise, then produces a measurement
/// through the observation model with sampled measurement noise.
///
/// # Errors
/// [`FilterError::DimensionMismatch`] when the initial state or a control
/// vector disagrees with the dynamics model's declared shapes.
pub fn simulate<T, R>(
    dynamics: &DynamicsModel<T>,
    observation: &ObservationModel<T>,
    initial_state: &DVector<T>,
    controls: &[DVector<T>],
    rng: &mut R,
) -> Result<SimulatedTrajectory<T>>
where
    T: RealField + Copy,
    R: Rng + ?Sized,
{
    if initial_state.len() != dynamics.state_dim() {
        return Err(FilterError::DimensionMismatch {
            context: "initial state length",
            expected: dynamics.state_dim(),
            found: initial_state.len(),
        });
    }

    let mut states = Vec::with_capacity(controls.len());
    let mut measurements = Vec::with_capacity(controls.len());

    let mut state = initial_state.clone();
    for control in controls {
        dynamics.check_control(control)?;
        state = dynamics.transition(&state, control) + sample_noise(dynamics.process_noise(), rng);
        let measurement =
            observation.observe(&state) + sample_noise(observation.measurement_noise(), rng);

        states.push(state.clone());
        measurements.push(measurement);
    }

    Ok(SimulatedTrajectory {
        states,
        measurements,
    })
}

/// Runs a filter over a control/measurement sequence.
///
/// Returns one posterior belief per step. The initial belief itself is not
/// included in the output.
///
/// # Errors
/// [`FilterError::DimensionMismatch`] when the control and measurement
/// sequences have different lengths, plus any error surfaced by the filter's
/// own recursion.
pub fn run_filter<T, F>(
    filter: &F,
    initial_belief: &GaussianBelief<T>,
    controls: &[DVector<T>],
    measurements: &[DVector<T>],
) -> Result<Vec<GaussianBelief<T>>>
where
    T: RealField + Copy,
    F: BayesFilter<T>,
{
    if controls.len() != measurements.len() {
        return Err(FilterError::DimensionMismatch {
            context: "control sequence length",
            expected: measurements.len(),
            found: controls.len(),
        });
    }

    let mut beliefs = Vec::with_capacity(measurements.len());
    let mut belief = initial_belief.clone();
    for (control, measurement) in controls.iter().zip(measurements.iter()) {
        belief = filter.step(&belief, control, measurement)?;
        beliefs.push(belief.clone());
    }

    Ok(beliefs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinearDynamicsModel, LinearObservationModel};
    use nalgebra::{dmatrix, dvector};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scalar_models() -> (DynamicsModel<f64>, ObservationModel<f64>) {
        let dynamics = LinearDynamicsModel::from_matrices(
            dmatrix![1.0],
            dmatrix![1.0],
            dmatrix![0.01],
        )
        .unwrap();
        let observation = LinearObservationModel::without_feedforward(
            dmatrix![1.0],
            crate::types::SymmetricMatrix::identity(1).scale(0.1),
        )
        .unwrap();
        (dynamics.into(), observation.into())
    }

    #[test]
    fn test_sample_noise_zero_covariance() {
        let mut rng = StdRng::seed_from_u64(7);
        let cov = crate::types::SymmetricMatrix::<f64>::zeros(3);
        let noise = sample_noise(&cov, &mut rng);
        assert!(noise.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_simulate_lengths() {
        let (dynamics, observation) = scalar_models();
        let mut rng = StdRng::seed_from_u64(42);

        let controls: Vec<_> = (0..10).map(|_| dvector![0.5]).collect();
        let trajectory = simulate(
            &dynamics,
            &observation,
            &dvector![0.0],
            &controls,
            &mut rng,
        )
        .unwrap();

        assert_eq!(trajectory.states.len(), 10);
        assert_eq!(trajectory.measurements.len(), 10);

        // Constant positive control drives the truth upward.
        assert!(trajectory.states[9][0] > 2.0);
    }

    #[test]
    fn test_simulate_rejects_bad_initial_state() {
        let (dynamics, observation) = scalar_models();
        let mut rng = StdRng::seed_from_u64(1);

        let err = simulate(
            &dynamics,
            &observation,
            &dvector![0.0, 0.0],
            &[],
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_run_filter_length_mismatch() {
        let (dynamics, observation) = scalar_models();
        let (d, o) = match (dynamics, observation) {
            (DynamicsModel::Linear(d), ObservationModel::Linear(o)) => (d, o),
            _ => unreachable!(),
        };
        let filter = crate::filters::KalmanFilter::new(d, o).unwrap();
        let belief = GaussianBelief::with_identity_covariance(dvector![0.0]);

        let err = run_filter(&filter, &belief, &[dvector![0.0]], &[]).unwrap_err();
        assert_eq!(
            err,
            FilterError::DimensionMismatch {
                context: "control sequence length",
                expected: 0,
                found: 1,
            }
        );
    }
}
