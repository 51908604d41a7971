use crate::error::Result;
use crate::matrix::{cov_to_corr, crossprod};
use crate::types::DenseMatrix;

use super::covariance::Covariance;
use super::traits::{check_theta, CovStruct};

/// Unstructured (fully parameterized) covariance.
///
/// Parameters, for dimension n (n*(n+1)/2 total):
/// ```text
/// theta = [log sd_1, ..., log sd_n,        // n marginal log-sds
///          c_12, c_13, ..., c_1n,          // strict upper triangle of C,
///          c_23, ..., c_2n,                // row-wise
///          ...,
///          c_{n-1,n}]
/// ```
/// The correlation matrix is built from the unit-diagonal matrix `C` as
/// `D (C'C) D` with `D = diag(1/sqrt(diag(C'C)))`. Being a rescaled Gram
/// matrix, the result is symmetric positive semi-definite with exact unit
/// diagonal for *any* real theta, so the optimizer never needs to stay on
/// the correlation manifold. All-zero theta gives the identity.
#[derive(Debug, Clone)]
pub struct Unstructured {
    dim: usize,
}

impl Unstructured {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// The unit-diagonal factor C with the strict upper triangle filled
    /// row-wise from `offdiag`.
    fn factor(&self, offdiag: &[f64]) -> DenseMatrix {
        let n = self.dim;
        let mut c = DenseMatrix::identity(n, n);
        let mut idx = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                c[(i, j)] = offdiag[idx];
                idx += 1;
            }
        }
        c
    }
}

impl CovStruct for Unstructured {
    fn name(&self) -> &str {
        "Unstructured"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn n_params(&self) -> usize {
        self.dim * (self.dim + 1) / 2
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let n = self.dim;
        let sd: Vec<f64> = theta[..n].iter().map(|t| t.exp()).collect();
        let c = self.factor(&theta[n..]);
        let corr = cov_to_corr(&crossprod(&c));
        Ok(Covariance::new(sd, corr))
    }

    fn clone_boxed(&self) -> Box<dyn CovStruct> {
        Box::new(self.clone())
    }
}
