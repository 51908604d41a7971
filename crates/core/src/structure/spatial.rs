use crate::coords::{distance_matrix, CoordinateFactor};
use crate::error::{CovStructError, Result};
use crate::types::DenseMatrix;

use super::covariance::Covariance;
use super::traits::{check_theta, CovStruct};

/// Validate coordinate tuples and precompute their pairwise Euclidean
/// distances. Shared by every distance-based structure.
pub(super) fn validated_distances(coords: &[Vec<f64>], name: &str) -> Result<DenseMatrix> {
    if coords.is_empty() {
        return Err(CovStructError::InvalidParameter(format!(
            "{} requires at least one coordinate tuple",
            name
        )));
    }
    let arity = coords[0].len();
    if arity == 0 {
        return Err(CovStructError::InvalidParameter(format!(
            "{} coordinates must have at least one component",
            name
        )));
    }
    for tuple in coords {
        if tuple.len() != arity {
            return Err(CovStructError::DimensionMismatch {
                expected: arity,
                got: tuple.len(),
                context: format!("{} coordinate tuple arity", name),
            });
        }
        if tuple.iter().any(|v| !v.is_finite()) {
            return Err(CovStructError::InvalidParameter(format!(
                "{} coordinates must be finite, got {:?}",
                name, tuple
            )));
        }
    }
    Ok(distance_matrix(coords))
}

/// Correlation matrix `exp(-rate * d^p)` over a fixed distance matrix.
fn decay_correlation(dist: &DenseMatrix, rate: f64, squared: bool) -> DenseMatrix {
    let n = dist.nrows();
    let mut corr = DenseMatrix::identity(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = dist[(i, j)];
            let arg = if squared { d * d } else { d };
            let val = (-rate * arg).exp();
            corr[(i, j)] = val;
            corr[(j, i)] = val;
        }
    }
    corr
}

/// Ornstein-Uhlenbeck covariance: exponential decay over continuous
/// positions.
///
/// Parameters: `theta = [log sd, log rate]`. The correlation between two
/// levels at distance `d` is `exp(-exp(theta[1]) * d)`. This is the
/// continuous-position generalization of [`Ar1`](super::ar1::Ar1): on
/// equally spaced integer positions the two decode to the same matrix when
/// the AR1 decay equals `exp(theta_ou[1])`. Unlike AR1's decay base, the
/// rate here is squashed through `exp`, so every real theta yields
/// correlations in (0, 1) and the result is always positive definite.
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeck {
    dist: DenseMatrix,
}

impl OrnsteinUhlenbeck {
    pub fn new(coords: &[Vec<f64>]) -> Result<Self> {
        Ok(Self {
            dist: validated_distances(coords, "OrnsteinUhlenbeck")?,
        })
    }

    pub fn from_factor(cf: &CoordinateFactor) -> Self {
        Self {
            dist: cf.distance_matrix(),
        }
    }
}

impl CovStruct for OrnsteinUhlenbeck {
    fn name(&self) -> &str {
        "OrnsteinUhlenbeck"
    }

    fn dim(&self) -> usize {
        self.dist.nrows()
    }

    fn n_params(&self) -> usize {
        2
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let sd = vec![theta[0].exp(); self.dim()];
        let corr = decay_correlation(&self.dist, theta[1].exp(), false);
        Ok(Covariance::new(sd, corr))
    }

    fn clone_boxed(&self) -> Box<dyn CovStruct> {
        Box::new(self.clone())
    }
}

/// Spatial exponential covariance: `corr(d) = exp(-exp(theta[1]) * d)`
/// with `d` the Euclidean distance between level coordinates of any
/// dimension.
///
/// Same functional form as [`OrnsteinUhlenbeck`]; kept as its own
/// structure because it is selected by a different formula tag and is
/// conventionally used over 2-D field coordinates rather than time.
#[derive(Debug, Clone)]
pub struct SpatialExponential {
    dist: DenseMatrix,
}

impl SpatialExponential {
    pub fn new(coords: &[Vec<f64>]) -> Result<Self> {
        Ok(Self {
            dist: validated_distances(coords, "SpatialExponential")?,
        })
    }

    pub fn from_factor(cf: &CoordinateFactor) -> Self {
        Self {
            dist: cf.distance_matrix(),
        }
    }
}

impl CovStruct for SpatialExponential {
    fn name(&self) -> &str {
        "SpatialExponential"
    }

    fn dim(&self) -> usize {
        self.dist.nrows()
    }

    fn n_params(&self) -> usize {
        2
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let sd = vec![theta[0].exp(); self.dim()];
        let corr = decay_correlation(&self.dist, theta[1].exp(), false);
        Ok(Covariance::new(sd, corr))
    }

    fn clone_boxed(&self) -> Box<dyn CovStruct> {
        Box::new(self.clone())
    }
}

/// Spatial Gaussian covariance: `corr(d) = exp(-exp(theta[1]) * d^2)`.
///
/// The squared distance gives a decay that is flat near the origin, i.e. a
/// smoother underlying process than the exponential family.
#[derive(Debug, Clone)]
pub struct SpatialGaussian {
    dist: DenseMatrix,
}

impl SpatialGaussian {
    pub fn new(coords: &[Vec<f64>]) -> Result<Self> {
        Ok(Self {
            dist: validated_distances(coords, "SpatialGaussian")?,
        })
    }

    pub fn from_factor(cf: &CoordinateFactor) -> Self {
        Self {
            dist: cf.distance_matrix(),
        }
    }
}

impl CovStruct for SpatialGaussian {
    fn name(&self) -> &str {
        "SpatialGaussian"
    }

    fn dim(&self) -> usize {
        self.dist.nrows()
    }

    fn n_params(&self) -> usize {
        2
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let sd = vec![theta[0].exp(); self.dim()];
        let corr = decay_correlation(&self.dist, theta[1].exp(), true);
        Ok(Covariance::new(sd, corr))
    }

    fn clone_boxed(&self) -> Box<dyn CovStruct> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::ar1::Ar1;
    use approx::assert_relative_eq;

    fn grid_1d(n: usize) -> Vec<Vec<f64>> {
        (0..n).map(|i| vec![i as f64]).collect()
    }

    #[test]
    fn test_ou_matches_ar1_on_integer_grid() {
        // On equally spaced integer positions, OU with rate r equals AR1
        // with decay r (lag-k correlation exp(-r)^k in both).
        let n = 6;
        let rate = (1.0 / 0.7_f64).ln();
        let ou = OrnsteinUhlenbeck::new(&grid_1d(n)).unwrap();
        let ar1 = Ar1::new(n);

        let ou_cov = ou.build(&[0.25, rate.ln()]).unwrap();
        let ar1_cov = ar1.build(&[0.25, rate]).unwrap();

        for i in 0..n {
            assert_relative_eq!(ou_cov.sd()[i], ar1_cov.sd()[i], epsilon = 1e-12);
            for j in 0..n {
                assert_relative_eq!(
                    ou_cov.correlation()[(i, j)],
                    ar1_cov.correlation()[(i, j)],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_ou_irregular_spacing() {
        let ou = OrnsteinUhlenbeck::new(&[vec![0.0], vec![0.5], vec![3.0]]).unwrap();
        let cov = ou.build(&[0.0, 0.0]).unwrap(); // rate = 1
        let corr = cov.correlation();
        assert_relative_eq!(corr[(0, 1)], (-0.5_f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 2)], (-3.0_f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(corr[(1, 2)], (-2.5_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_ou_only_positive_correlations() {
        let ou = OrnsteinUhlenbeck::new(&grid_1d(5)).unwrap();
        for &raw in &[-3.0, 0.0, 2.0] {
            let cov = ou.build(&[0.0, raw]).unwrap();
            for i in 0..5 {
                for j in 0..5 {
                    let c = cov.correlation()[(i, j)];
                    assert!(c > 0.0 && c <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_exponential_2d_distance() {
        let exp = SpatialExponential::new(&[vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
        let cov = exp.build(&[0.0, 0.0]).unwrap();
        assert_relative_eq!(cov.correlation()[(0, 1)], (-5.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_gaussian_squares_distance() {
        let coords = vec![vec![0.0], vec![2.0]];
        let gau = SpatialGaussian::new(&coords).unwrap();
        let exp = SpatialExponential::new(&coords).unwrap();

        let gau_cov = gau.build(&[0.0, 0.5]).unwrap();
        let exp_cov = exp.build(&[0.0, 0.5]).unwrap();
        let rate = 0.5_f64.exp();
        assert_relative_eq!(
            gau_cov.correlation()[(0, 1)],
            (-rate * 4.0).exp(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            exp_cov.correlation()[(0, 1)],
            (-rate * 2.0).exp(),
            epsilon = 1e-12
        );
        // Smoother near the origin: at distance < 1 the Gaussian stays
        // higher than the exponential.
        let near = SpatialGaussian::new(&[vec![0.0], vec![0.3]]).unwrap();
        let near_exp = SpatialExponential::new(&[vec![0.0], vec![0.3]]).unwrap();
        assert!(
            near.build(&[0.0, 0.5]).unwrap().correlation()[(0, 1)]
                > near_exp.build(&[0.0, 0.5]).unwrap().correlation()[(0, 1)]
        );
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(OrnsteinUhlenbeck::new(&[]).is_err());
        assert!(SpatialExponential::new(&[vec![0.0, 1.0], vec![2.0]]).is_err());
        assert!(SpatialGaussian::new(&[vec![f64::NAN]]).is_err());
    }

    #[test]
    fn test_from_factor() {
        let cf = CoordinateFactor::from_coordinates(&[vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let ou = OrnsteinUhlenbeck::from_factor(&cf);
        assert_eq!(ou.dim(), 3);
    }

    #[test]
    fn test_wrong_theta_length() {
        let ou = OrnsteinUhlenbeck::new(&grid_1d(3)).unwrap();
        assert!(ou.build(&[0.0]).is_err());
        assert!(ou.build(&[0.0, 0.0, 0.0]).is_err());
    }
}
