//! Core types: symmetric covariance storage and the Gaussian belief

pub mod belief;
pub mod symmetric;

pub use belief::GaussianBelief;
pub use symmetric::SymmetricMatrix;
