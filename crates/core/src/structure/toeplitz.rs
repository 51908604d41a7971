use crate::error::Result;
use crate::link::corr_link;
use crate::types::DenseMatrix;

use super::covariance::Covariance;
use super::traits::{check_theta, CovStruct};

/// Toeplitz (banded) covariance.
///
/// Parameters (2n-1 total): `n` log-sds followed by `n-1` band parameters,
/// one per off-diagonal offset. Band `k` (entries with |i-j| = k) shares a
/// single correlation, squashed independently into (-1, 1) by
/// [`corr_link`].
///
/// The bands are not jointly constrained, so some parameter combinations
/// describe a matrix that is not positive semi-definite. That is a known
/// degeneracy of this parameterization: the matrix is still returned (the
/// optimizer may pass through such regions), with a warning-level
/// diagnostic so the caller can see why the enclosing fit misbehaves.
#[derive(Debug, Clone)]
pub struct Toeplitz {
    dim: usize,
}

impl Toeplitz {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl CovStruct for Toeplitz {
    fn name(&self) -> &str {
        "Toeplitz"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn n_params(&self) -> usize {
        2 * self.dim - 1
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let n = self.dim;
        let sd: Vec<f64> = theta[..n].iter().map(|t| t.exp()).collect();
        let bands: Vec<f64> = theta[n..].iter().map(|&t| corr_link(t)).collect();

        let mut corr = DenseMatrix::identity(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let rho = bands[j - i - 1];
                corr[(i, j)] = rho;
                corr[(j, i)] = rho;
            }
        }

        let cov = Covariance::new(sd, corr);
        if !cov.is_positive_semidefinite(1e-8) {
            log::warn!(
                "Toeplitz(dim={}) bands {:?} give a non-positive-definite matrix \
                 (min eigenvalue {:.3e})",
                n,
                bands,
                cov.min_eigenvalue()
            );
        }
        Ok(cov)
    }

    fn clone_boxed(&self) -> Box<dyn CovStruct> {
        Box::new(self.clone())
    }
}
