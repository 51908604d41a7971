use crate::error::Result;
use crate::link::corr_link;
use crate::types::DenseMatrix;

use super::covariance::Covariance;
use super::traits::{check_theta, CovStruct};

/// Compound symmetry: one correlation shared by every pair of levels.
///
/// Parameters (n+1 total): `n` log-sds plus a single squashed correlation.
///
/// The correlation matrix `(1-rho) I + rho J` has eigenvalues
/// `1 + (n-1) rho` (once) and `1 - rho` (n-1 times), so it is positive
/// semi-definite iff `rho >= -1/(n-1)`. The squash only keeps rho in
/// (-1, 1); values below the threshold are returned with a warning, as
/// with Toeplitz.
#[derive(Debug, Clone)]
pub struct CompoundSymmetry {
    dim: usize,
}

impl CompoundSymmetry {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Lower bound on rho for positive semi-definiteness at this dimension.
    pub fn rho_lower_bound(&self) -> f64 {
        if self.dim <= 1 {
            -1.0
        } else {
            -1.0 / (self.dim as f64 - 1.0)
        }
    }
}

impl CovStruct for CompoundSymmetry {
    fn name(&self) -> &str {
        "CompoundSymmetry"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn n_params(&self) -> usize {
        self.dim + 1
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let n = self.dim;
        let sd: Vec<f64> = theta[..n].iter().map(|t| t.exp()).collect();
        let rho = corr_link(theta[n]);

        let mut corr = DenseMatrix::from_element(n, n, rho);
        for i in 0..n {
            corr[(i, i)] = 1.0;
        }

        if rho < self.rho_lower_bound() {
            log::warn!(
                "CompoundSymmetry(dim={}) with rho = {:.6} is not positive \
                 semi-definite (requires rho >= {:.6})",
                n,
                rho,
                self.rho_lower_bound()
            );
        }
        Ok(Covariance::new(sd, corr))
    }

    fn clone_boxed(&self) -> Box<dyn CovStruct> {
        Box::new(self.clone())
    }
}
