use crate::error::{CovStructError, Result};

use super::covariance::Covariance;

/// Core trait that every covariance structure must implement.
///
/// A structure maps an unconstrained parameter vector ("theta", as produced
/// by the fitting engine's optimizer) to a covariance matrix for a random
/// term with `dim` levels, decomposed into marginal standard deviations and
/// a correlation matrix.
///
/// `build` is a pure function of theta: structures hold only their fixed
/// shape (dimension, pairwise distances), never parameter state, so a
/// single structure can be evaluated from many threads during parallel
/// likelihood evaluation.
pub trait CovStruct: Send + Sync + std::fmt::Debug {
    /// Human-readable name: "AR1", "Unstructured", "Toeplitz", etc.
    fn name(&self) -> &str;

    /// Number of random-effect levels (the covariance is dim x dim).
    fn dim(&self) -> usize;

    /// Number of parameters this structure expects in theta.
    fn n_params(&self) -> usize;

    /// Decode theta into a covariance matrix.
    ///
    /// Fails with `DimensionMismatch` if `theta.len() != n_params()`.
    /// A result that is not positive semi-definite (possible for Toeplitz
    /// and compound symmetry) is still returned; callers decide whether to
    /// reject it.
    fn build(&self, theta: &[f64]) -> Result<Covariance>;

    /// Clone into a boxed trait object.
    fn clone_boxed(&self) -> Box<dyn CovStruct>;

    /// Starting values for the optimizer (all zeros: unit standard
    /// deviations, zero correlations).
    fn initial_theta(&self) -> Vec<f64> {
        vec![0.0; self.n_params()]
    }
}

impl Clone for Box<dyn CovStruct> {
    fn clone(&self) -> Box<dyn CovStruct> {
        self.clone_boxed()
    }
}

/// Validate the theta length for a structure.
pub(crate) fn check_theta(theta: &[f64], expected: usize, name: &str) -> Result<()> {
    if theta.len() != expected {
        return Err(CovStructError::DimensionMismatch {
            expected,
            got: theta.len(),
            context: format!("{} parameter vector", name),
        });
    }
    Ok(())
}
