//! Symmetric covariance storage
//!
//! Covariance matrices are symmetric by definition, so only one triangle
//! carries information. [`SymmetricMatrix`] stores the lower triangle in
//! packed form and mirrors it on read: the stored matrix satisfies
//! `M == M^T` by construction, not by numerical accident.

use alloc::vec::Vec;

use nalgebra::{DMatrix, DVector, RealField, Scalar, SymmetricEigen};

use crate::{FilterError, Result};

/// A symmetric matrix stored as its packed lower triangle.
///
/// Element `(i, j)` with `i >= j` lives at `i * (i + 1) / 2 + j`; reads with
/// `i < j` are mirrored. Building one from a plain matrix is a structural
/// promotion: the upper triangle of the input is ignored, and the caller is
/// trusted to have supplied a symmetric matrix. Use
/// [`SymmetricMatrix::validate_positive_semidefinite`] for the opt-in
/// covariance check.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricMatrix<T: Scalar> {
    size: usize,
    packed: Vec<T>,
}

impl<T: Scalar + Copy> SymmetricMatrix<T> {
    /// Promotes a plain square matrix to symmetric storage.
    ///
    /// Only the lower triangle of `matrix` is read; symmetry of the input is
    /// not validated.
    ///
    /// # Panics
    /// Panics if `matrix` is not square.
    pub fn from_matrix(matrix: &DMatrix<T>) -> Self {
        assert!(
            matrix.is_square(),
            "Symmetric storage requires a square matrix"
        );
        let size = matrix.nrows();
        let mut packed = Vec::with_capacity(size * (size + 1) / 2);
        for i in 0..size {
            for j in 0..=i {
                packed.push(matrix[(i, j)]);
            }
        }
        Self { size, packed }
    }

    /// Returns the side length of the matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Reads element `(row, col)`, mirroring across the diagonal.
    ///
    /// # Panics
    /// Panics if `row` or `col` is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.packed[self.packed_index(row, col)]
    }

    /// Expands to a dense matrix with both triangles populated.
    pub fn to_matrix(&self) -> DMatrix<T> {
        DMatrix::from_fn(self.size, self.size, |i, j| self.get(i, j))
    }

    #[inline]
    fn packed_index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.size && col < self.size,
            "Symmetric matrix index out of bounds"
        );
        let (r, c) = if row >= col { (row, col) } else { (col, row) };
        r * (r + 1) / 2 + c
    }
}

impl<T: RealField + Copy> SymmetricMatrix<T> {
    /// Creates a zero matrix of the given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            packed: (0..size * (size + 1) / 2).map(|_| T::zero()).collect(),
        }
    }

    /// Creates an identity matrix of the given size.
    pub fn identity(size: usize) -> Self {
        let mut out = Self::zeros(size);
        for i in 0..size {
            let idx = i * (i + 1) / 2 + i;
            out.packed[idx] = T::one();
        }
        out
    }

    /// Creates a diagonal matrix from the given diagonal entries.
    pub fn from_diagonal(diagonal: &DVector<T>) -> Self {
        let mut out = Self::zeros(diagonal.len());
        for i in 0..diagonal.len() {
            let idx = i * (i + 1) / 2 + i;
            out.packed[idx] = diagonal[i];
        }
        out
    }

    /// Sum of the diagonal entries.
    pub fn trace(&self) -> T {
        let mut acc = T::zero();
        for i in 0..self.size {
            acc += self.get(i, i);
        }
        acc
    }

    /// Elementwise sum with another symmetric matrix.
    ///
    /// # Panics
    /// Panics if the sizes disagree.
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(
            self.size, other.size,
            "Symmetric matrix sizes must agree for addition"
        );
        Self {
            size: self.size,
            packed: self
                .packed
                .iter()
                .zip(other.packed.iter())
                .map(|(a, b)| *a + *b)
                .collect(),
        }
    }

    /// Scales every element by `factor`.
    pub fn scale(&self, factor: T) -> Self {
        Self {
            size: self.size,
            packed: self.packed.iter().map(|a| *a * factor).collect(),
        }
    }

    /// Cholesky factor `L` with `M = L * L^T`, or `None` if the matrix is
    /// not positive definite.
    pub fn cholesky(&self) -> Option<DMatrix<T>> {
        nalgebra::Cholesky::new(self.to_matrix()).map(|c| c.l())
    }

    /// Whether every eigenvalue is non-negative up to a small relative
    /// tolerance.
    pub fn is_positive_semidefinite(&self) -> bool {
        if self.size == 0 {
            return true;
        }
        let eigen = SymmetricEigen::new(self.to_matrix());
        let mut largest = T::zero();
        for v in eigen.eigenvalues.iter() {
            if v.abs() > largest {
                largest = v.abs();
            }
        }
        let tolerance = T::from_f64(1e-9).unwrap() * (T::one() + largest);
        eigen.eigenvalues.iter().all(|v| *v >= -tolerance)
    }

    /// Opt-in covariance validation.
    ///
    /// # Errors
    /// Returns [`FilterError::NonPositiveSemidefiniteCovariance`] when an
    /// eigenvalue is negative beyond tolerance.
    pub fn validate_positive_semidefinite(&self) -> Result<()> {
        if self.is_positive_semidefinite() {
            Ok(())
        } else {
            Err(FilterError::NonPositiveSemidefiniteCovariance { size: self.size })
        }
    }
}

impl<T: Scalar + Copy> ::core::ops::Index<(usize, usize)> for SymmetricMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.packed[self.packed_index(row, col)]
    }
}
