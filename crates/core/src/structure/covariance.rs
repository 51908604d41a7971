use crate::matrix::{is_positive_semidefinite, min_symmetric_eigenvalue, scale_by_sd};
use crate::types::DenseMatrix;

/// A decoded covariance matrix, kept in decomposed form.
///
/// The full matrix is `diag(sd) * corr * diag(sd)`. Reporting code usually
/// wants the pieces (standard deviations on the data scale, correlations
/// independent of scale), so the decomposition is the primary
/// representation and the full matrix is assembled on demand.
///
/// Immutable once built; every optimizer iteration produces a fresh value.
#[derive(Debug, Clone)]
pub struct Covariance {
    sd: Vec<f64>,
    corr: DenseMatrix,
}

impl Covariance {
    pub(crate) fn new(sd: Vec<f64>, corr: DenseMatrix) -> Self {
        debug_assert_eq!(sd.len(), corr.nrows());
        debug_assert_eq!(corr.nrows(), corr.ncols());
        Self { sd, corr }
    }

    /// Number of levels (the matrix is dim x dim).
    pub fn dim(&self) -> usize {
        self.sd.len()
    }

    /// Marginal standard deviations, one per level.
    pub fn sd(&self) -> &[f64] {
        &self.sd
    }

    /// The correlation matrix: symmetric with unit diagonal.
    pub fn correlation(&self) -> &DenseMatrix {
        &self.corr
    }

    /// Assemble the full covariance matrix diag(sd) * corr * diag(sd).
    pub fn full(&self) -> DenseMatrix {
        scale_by_sd(&self.corr, &self.sd)
    }

    /// Smallest eigenvalue of the correlation matrix.
    ///
    /// Negative beyond floating tolerance means the structure's parameters
    /// do not describe a valid covariance (possible for Toeplitz and
    /// compound symmetry, whose bands are squashed independently).
    pub fn min_eigenvalue(&self) -> f64 {
        min_symmetric_eigenvalue(&self.corr)
    }

    /// Check positive semi-definiteness up to `tol`.
    pub fn is_positive_semidefinite(&self, tol: f64) -> bool {
        is_positive_semidefinite(&self.corr, tol)
    }
}
