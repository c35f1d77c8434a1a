//! Common helpers for the filter integration tests

#![allow(dead_code)]

use std::sync::Arc;

use gaussfilt::prelude::*;
use nalgebra::{dmatrix, DMatrix, DVector};

/// 2D constant-velocity dynamics, state [x, y, vx, vy], dt = 1, no control.
pub fn constant_velocity_dynamics(process_noise: f64) -> LinearDynamicsModel<f64> {
    LinearDynamicsModel::from_matrices(
        dmatrix![
            1.0, 0.0, 1.0, 0.0;
            0.0, 1.0, 0.0, 1.0;
            0.0, 0.0, 1.0, 0.0;
            0.0, 0.0, 0.0, 1.0
        ],
        DMatrix::zeros(4, 1),
        DMatrix::identity(4, 4).scale(process_noise),
    )
    .expect("constant-velocity shapes are consistent")
}

/// Position-only observation of the [x, y, vx, vy] state.
pub fn position_observation(noise_variance: f64) -> LinearObservationModel<f64> {
    LinearObservationModel::without_feedforward(
        dmatrix![
            1.0, 0.0, 0.0, 0.0;
            0.0, 1.0, 0.0, 0.0
        ],
        SymmetricMatrix::identity(2).scale(noise_variance),
    )
    .expect("position observation shapes are consistent")
}

/// Range-bearing observation of the [x, y, vx, vy] state, sensor at origin.
pub fn range_bearing_observation(
    range_variance: f64,
    bearing_variance: f64,
) -> NonlinearObservationModel<f64> {
    let h: MeasurementFn<f64> = Arc::new(|x: &DVector<f64>| {
        nalgebra::dvector![
            (x[0] * x[0] + x[1] * x[1]).sqrt(),
            x[1].atan2(x[0])
        ]
    });
    NonlinearObservationModel::from_matrix(
        h,
        dmatrix![
            range_variance, 0.0;
            0.0, bearing_variance
        ],
    )
}

/// A sequence of `steps` zero scalar controls.
pub fn zero_controls(steps: usize) -> Vec<DVector<f64>> {
    (0..steps).map(|_| nalgebra::dvector![0.0]).collect()
}

/// Root-mean-square position error of a belief sequence against the truth.
pub fn position_rmse(beliefs: &[GaussianBelief<f64>], truth: &[DVector<f64>]) -> f64 {
    assert_eq!(beliefs.len(), truth.len());
    let sum: f64 = beliefs
        .iter()
        .zip(truth.iter())
        .map(|(belief, state)| {
            let dx = belief.mean()[0] - state[0];
            let dy = belief.mean()[1] - state[1];
            dx * dx + dy * dy
        })
        .sum();
    (sum / beliefs.len() as f64).sqrt()
}
