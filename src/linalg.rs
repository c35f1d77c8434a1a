//! Linear algebra helpers: robust covariance square roots and numerical
//! Jacobians.
//!
//! Square-root strategy:
//! 1) Symmetrize P ← 0.5 (P + Pᵀ)
//! 2) Cholesky
//! 3) Jittered Cholesky (geometric ramp)
//! 4) Symmetric EVD with eigenvalue floor → S = U · sqrt(Λ⁺) · Uᵀ
//!
//! The EVD fallback keeps sigma-point generation and noise sampling working
//! for positive semidefinite (singular) covariances that plain Cholesky
//! rejects.

use nalgebra::{Cholesky, DMatrix, DVector, RealField, SymmetricEigen};

/// Symmetrize a matrix: P ← 0.5 (P + Pᵀ)
///
/// Reduces round-off asymmetry accumulated by repeated covariance
/// propagation.
#[inline]
pub fn symmetrize<T: RealField + Copy>(m: &DMatrix<T>) -> DMatrix<T> {
    (m + m.transpose()).scale(T::from_f64(0.5).unwrap())
}

/// Computes a square root `S` with `matrix ≈ S * Sᵀ`.
///
/// The Cholesky path returns a lower-triangular factor; the EVD fallback
/// returns a symmetric one. Either satisfies the defining identity.
///
/// # Panics
/// Panics if `matrix` is not square.
pub fn matrix_square_root<T: RealField + Copy>(matrix: &DMatrix<T>) -> DMatrix<T> {
    assert!(
        matrix.is_square(),
        "matrix_square_root: matrix must be square"
    );
    let n = matrix.nrows();
    let p = symmetrize(matrix);

    if let Some(chol) = Cholesky::new(p.clone()) {
        return chol.l();
    }

    // Jittered Cholesky: geometric ramp from 1e-12 to 1e-6.
    let mut jitter = T::from_f64(1e-12).unwrap();
    let max_jitter = T::from_f64(1e-6).unwrap();
    let ten = T::from_f64(10.0).unwrap();
    for _ in 0..6 {
        let mut pj = p.clone();
        for i in 0..n {
            pj[(i, i)] += jitter;
        }
        if let Some(chol) = Cholesky::new(pj) {
            return chol.l();
        }
        jitter *= ten;
        if jitter > max_jitter {
            break;
        }
    }

    // EVD fallback with eigenvalue floor at zero.
    let eigen = SymmetricEigen::new(p);
    let floored: DVector<T> = eigen.eigenvalues.map(|v| {
        if v < T::zero() {
            T::zero()
        } else {
            v.sqrt()
        }
    });
    &eigen.eigenvectors * DMatrix::from_diagonal(&floored) * eigen.eigenvectors.transpose()
}

/// Central-difference Jacobian of `f` at `x`.
///
/// `output_dim` is the length of `f`'s output; the result has shape
/// `output_dim × x.len()`. The step size scales with the magnitude of each
/// component.
pub fn numerical_jacobian<T, F>(f: F, x: &DVector<T>, output_dim: usize) -> DMatrix<T>
where
    T: RealField + Copy,
    F: Fn(&DVector<T>) -> DVector<T>,
{
    let n = x.len();
    let base_step = T::from_f64(1e-6).unwrap();
    let half = T::from_f64(0.5).unwrap();

    let mut jacobian = DMatrix::zeros(output_dim, n);
    for i in 0..n {
        let h = base_step * (T::one() + x[i].abs());

        let mut forward = x.clone();
        forward[i] += h;
        let mut backward = x.clone();
        backward[i] -= h;

        let column = (f(&forward) - f(&backward)).scale(half / h);
        jacobian.set_column(i, &column);
    }
    jacobian
}
