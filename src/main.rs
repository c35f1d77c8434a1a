//! Example usage of the gaussfilt library
//!
//! Tracks a 2D constant-velocity target from noisy position fixes with the
//! Kalman filter, then repeats the run with an unscented filter on the same
//! models to show the two agree on a linear problem.

use gaussfilt::prelude::*;
use nalgebra::{dmatrix, dvector, DMatrix, DVector};

fn main() {
    println!("gaussfilt: Gaussian-belief Bayesian filtering");
    println!("=============================================\n");

    // Constant-velocity dynamics, state [x, y, vx, vy], dt = 1 s.
    let dynamics = LinearDynamicsModel::from_matrices(
        dmatrix![
            1.0, 0.0, 1.0, 0.0;
            0.0, 1.0, 0.0, 1.0;
            0.0, 0.0, 1.0, 0.0;
            0.0, 0.0, 0.0, 1.0
        ],
        DMatrix::zeros(4, 1),
        DMatrix::identity(4, 4).scale(0.05),
    )
    .expect("dynamics dimensions are consistent");

    // Position-only fixes with 2 m standard deviation.
    let observation = LinearObservationModel::without_feedforward(
        dmatrix![
            1.0, 0.0, 0.0, 0.0;
            0.0, 1.0, 0.0, 0.0
        ],
        SymmetricMatrix::identity(2).scale(4.0),
    )
    .expect("observation dimensions are consistent");

    let kalman = KalmanFilter::new(dynamics.clone(), observation.clone())
        .expect("linear composition is valid");
    let unscented =
        UnscentedKalmanFilter::new(dynamics.into(), observation.into());

    // Truth: start at the origin moving (2, 1) m/s. The fixes below are the
    // true positions with fixed offsets standing in for measurement noise.
    let fixes = [
        dvector![2.3, 0.8],
        dvector![3.6, 2.4],
        dvector![6.4, 2.9],
        dvector![7.8, 4.2],
        dvector![10.1, 4.8],
        dvector![12.3, 6.3],
        dvector![13.8, 6.9],
        dvector![16.2, 8.1],
    ];
    let no_control = DVector::zeros(1);

    // Deliberately poor prior: stationary at the origin, large covariance.
    let prior = GaussianBelief::from_matrix(
        dvector![0.0, 0.0, 0.0, 0.0],
        DMatrix::identity(4, 4).scale(25.0),
    )
    .expect("prior dimensions are consistent");

    println!("step |   fix (x, y)   |  KF estimate (x, y)  |  KF trace");
    println!("-----+----------------+----------------------+----------");

    let mut kf_belief = prior.clone();
    let mut ukf_belief = prior;
    for (step, fix) in fixes.iter().enumerate() {
        kf_belief = kalman
            .step(&kf_belief, &no_control, fix)
            .expect("consistent shapes cannot fail mid-recursion");
        ukf_belief = unscented
            .step(&ukf_belief, &no_control, fix)
            .expect("consistent shapes cannot fail mid-recursion");

        println!(
            "{:4} | ({:5.1}, {:5.1}) |   ({:6.2}, {:6.2})   |  {:7.3}",
            step + 1,
            fix[0],
            fix[1],
            kf_belief.mean()[0],
            kf_belief.mean()[1],
            kf_belief.uncertainty(),
        );
    }

    let kf_mean = kf_belief.mean();
    let ukf_mean = ukf_belief.mean();
    println!("\nFinal KF  estimate: position ({:.2}, {:.2}), velocity ({:.2}, {:.2})",
        kf_mean[0], kf_mean[1], kf_mean[2], kf_mean[3]);
    println!("Final UKF estimate: position ({:.2}, {:.2}), velocity ({:.2}, {:.2})",
        ukf_mean[0], ukf_mean[1], ukf_mean[2], ukf_mean[3]);
    println!("\nThe unscented transform is exact on linear models, so the two");
    println!("filters report the same belief up to floating-point error.");
}
