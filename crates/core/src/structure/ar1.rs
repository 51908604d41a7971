use crate::error::Result;
use crate::types::DenseMatrix;

use super::covariance::Covariance;
use super::traits::{check_theta, CovStruct};

/// First-order autoregressive covariance over equally spaced integer time
/// indices.
///
/// Parameters: `theta = [log sd, decay]`. The marginal sd is homogeneous,
/// `exp(theta[0])`, and the correlation at integer lag `k` is
/// `exp(-theta[1])^k`:
/// ```text
/// corr = [ 1      phi    phi^2  ... ]
///        [ phi    1      phi    ... ]      phi = exp(-theta[1])
///        [ phi^2  phi    1      ... ]
/// ```
/// With positive decay, phi stays in (0, 1) and the matrix is positive
/// definite for every dimension. A non-positive decay is still decoded as
/// defined (phi >= 1, not a valid correlation) and handed back with a
/// warning; the optimizer decides what to do with such regions.
///
/// For irregular spacing use [`OrnsteinUhlenbeck`](super::spatial::OrnsteinUhlenbeck),
/// which generalizes this decay to continuous coordinates.
#[derive(Debug, Clone)]
pub struct Ar1 {
    dim: usize,
}

impl Ar1 {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl CovStruct for Ar1 {
    fn name(&self) -> &str {
        "AR1"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn n_params(&self) -> usize {
        2
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let n = self.dim;
        let sd = vec![theta[0].exp(); n];
        let phi = (-theta[1]).exp();
        if phi >= 1.0 && n > 1 {
            log::warn!(
                "AR1(dim={}) decay {:.6} gives lag-1 correlation {:.6} >= 1; \
                 the result is not a valid correlation matrix",
                n,
                theta[1],
                phi
            );
        }

        let mut corr = DenseMatrix::identity(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let val = phi.powi((j - i) as i32);
                corr[(i, j)] = val;
                corr[(j, i)] = val;
            }
        }
        Ok(Covariance::new(sd, corr))
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
    fn test_lag_decay_scenario() {
        // theta = [0, ln(1/0.7)]: sd = 1, lag-1 correlation 0.7.
        let ar1 = Ar1::new(6);
        let cov = ar1.build(&[0.0, (1.0 / 0.7_f64).ln()]).unwrap();
        assert_eq!(cov.sd(), &[1.0; 6]);

        let corr = cov.correlation();
        assert_relative_eq!(corr[(0, 1)], 0.7, epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 2)], 0.49, epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 5)], 0.7_f64.powi(5), epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 5)], 0.16807, epsilon = 1e-12);
        // Stationarity: every lag-k pair agrees.
        for i in 0..5 {
            assert_relative_eq!(corr[(i, i + 1)], 0.7, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_positive_decay_is_positive_definite() {
        let ar1 = Ar1::new(8);
        for &decay in &[0.05, 0.5, 2.0] {
            let cov = ar1.build(&[0.3, decay]).unwrap();
            assert!(cov.is_positive_semidefinite(1e-10), "decay = {}", decay);
        }
    }

    #[test]
    fn test_homogeneous_sd() {
        let ar1 = Ar1::new(4);
        let cov = ar1.build(&[2.0_f64.ln(), 1.0]).unwrap();
        assert_eq!(cov.sd(), &[2.0; 4]);
    }

    #[test]
    fn test_wrong_theta_length() {
        assert!(Ar1::new(4).build(&[0.0]).is_err());
        assert!(Ar1::new(4).build(&[0.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn test_non_positive_decay_still_returned() {
        // decay <= 0 means phi >= 1: mathematically defined, just not PSD.
        let ar1 = Ar1::new(3);
        let cov = ar1.build(&[0.0, -0.5]).unwrap();
        assert!(cov.correlation()[(0, 1)] > 1.0);
    }

    #[test]
    fn test_dim_one() {
        let ar1 = Ar1::new(1);
        let cov = ar1.build(&[1.5, 0.3]).unwrap();
        assert_eq!(cov.dim(), 1);
        assert_relative_eq!(cov.full()[(0, 0)], (1.5_f64.exp()).powi(2), epsilon = 1e-10);
    }
}
