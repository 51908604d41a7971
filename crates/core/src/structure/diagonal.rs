use crate::error::Result;
use crate::types::DenseMatrix;

use super::covariance::Covariance;
use super::traits::{check_theta, CovStruct};

/// Heterogeneous diagonal covariance: independent levels with their own
/// standard deviations.
///
/// Parameters: `n` log-sds. The correlation matrix is the identity.
#[derive(Debug, Clone)]
pub struct Diagonal {
    dim: usize,
}

impl Diagonal {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl CovStruct for Diagonal {
    fn name(&self) -> &str {
        "Diagonal"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn n_params(&self) -> usize {
        self.dim
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let sd: Vec<f64> = theta.iter().map(|t| t.exp()).collect();
        Ok(Covariance::new(sd, DenseMatrix::identity(self.dim, self.dim)))
    }

    fn clone_boxed(&self) -> Box<dyn CovStruct> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diagonal_basic() {
        let diag = Diagonal::new(3);
        assert_eq!(diag.name(), "Diagonal");
        assert_eq!(diag.n_params(), 3);

        let cov = diag
            .build(&[2.0_f64.ln(), 3.0_f64.ln(), 5.0_f64.ln()])
            .unwrap();
        assert_relative_eq!(cov.sd()[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(cov.sd()[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(cov.sd()[2], 5.0, epsilon = 1e-12);

        let full = cov.full();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { cov.sd()[i] * cov.sd()[i] } else { 0.0 };
                assert_relative_eq!(full[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_always_psd() {
        let diag = Diagonal::new(4);
        let cov = diag.build(&[-10.0, 0.0, 3.0, 50.0]).unwrap();
        assert!(cov.is_positive_semidefinite(0.0));
    }

    #[test]
    fn test_wrong_theta_length() {
        assert!(Diagonal::new(3).build(&[0.0, 0.0]).is_err());
    }
}
