use statrs::function::gamma::ln_gamma;

use crate::coords::CoordinateFactor;
use crate::error::Result;
use crate::link::safe_softplus;
use crate::types::DenseMatrix;

use super::covariance::Covariance;
use super::spatial::validated_distances;
use super::traits::{check_theta, CovStruct};

/// Matern covariance over spatial coordinates.
///
/// Parameters: `theta = [log sd, log range, smoothness-raw]`. The
/// smoothness `nu = softplus(theta[2])` is kept positive while the raw
/// parameter stays unconstrained for the optimizer. The correlation at
/// Euclidean distance `d` is the Matern correlation
/// ```text
/// corr(d) = 2^(1-nu) / Gamma(nu) * x^nu * K_nu(x),
/// x = sqrt(2 nu) * d / exp(theta[1])
/// ```
/// with `K_nu` the modified Bessel function of the second kind. At
/// nu = 1/2 this reduces to exponential decay `exp(-d / range)`; larger
/// nu gives a smoother process. Half-integer nu in {1/2, 3/2, 5/2} uses
/// the exact closed forms; other values evaluate `K_nu` by quadrature.
#[derive(Debug, Clone)]
pub struct SpatialMatern {
    dist: DenseMatrix,
}

impl SpatialMatern {
    pub fn new(coords: &[Vec<f64>]) -> Result<Self> {
        Ok(Self {
            dist: validated_distances(coords, "SpatialMatern")?,
        })
    }

    pub fn from_factor(cf: &CoordinateFactor) -> Self {
        Self {
            dist: cf.distance_matrix(),
        }
    }
}

impl CovStruct for SpatialMatern {
    fn name(&self) -> &str {
        "SpatialMatern"
    }

    fn dim(&self) -> usize {
        self.dist.nrows()
    }

    fn n_params(&self) -> usize {
        3
    }

    fn build(&self, theta: &[f64]) -> Result<Covariance> {
        check_theta(theta, self.n_params(), self.name())?;
        let n = self.dim();
        let sd = vec![theta[0].exp(); n];
        let range = theta[1].exp();
        let nu = safe_softplus(theta[2]);

        let mut corr = DenseMatrix::identity(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let val = matern_correlation(self.dist[(i, j)], range, nu);
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

/// Matern correlation at distance `d` with the given range and smoothness.
pub fn matern_correlation(d: f64, range: f64, nu: f64) -> f64 {
    let x = (2.0 * nu).sqrt() * d / range;
    if x < 1e-10 {
        return 1.0;
    }
    // Closed forms for the half-integer smoothness values that dominate in
    // practice; they are exact and avoid the quadrature path.
    if (nu - 0.5).abs() < 1e-12 {
        (-x).exp()
    } else if (nu - 1.5).abs() < 1e-12 {
        (1.0 + x) * (-x).exp()
    } else if (nu - 2.5).abs() < 1e-12 {
        (1.0 + x + x * x / 3.0) * (-x).exp()
    } else {
        matern_general(x, nu)
    }
}

/// General-smoothness Matern correlation at scaled distance `x`:
/// `2^(1-nu)/Gamma(nu) * x^nu * K_nu(x)`, assembled in log space to keep
/// the `Gamma(nu)` / `K_nu` growth from overflowing at small `x`.
pub(crate) fn matern_general(x: f64, nu: f64) -> f64 {
    let ln_corr =
        (1.0 - nu) * std::f64::consts::LN_2 - ln_gamma(nu) + nu * x.ln() + bessel_k(nu, x).ln();
    ln_corr.exp().min(1.0)
}

/// Modified Bessel function of the second kind, K_nu(x) for x > 0, via the
/// integral representation
/// ```text
/// K_nu(x) = int_0^inf exp(-x cosh t) cosh(nu t) dt
/// ```
/// evaluated with composite Simpson on [0, t_max], where t_max is chosen
/// so the integrand has decayed by a factor ~exp(-45) relative to t = 0.
/// The integrand term is assembled in log space: cosh(nu t) alone
/// overflows long before the product does.
pub(crate) fn bessel_k(nu: f64, x: f64) -> f64 {
    debug_assert!(x > 0.0 && nu >= 0.0);

    let mut t_max: f64 = 1.0;
    while x * t_max.cosh() - nu * t_max < x + 45.0 && t_max < 80.0 {
        t_max += 0.5;
    }

    let integrand = |t: f64| (-x * t.cosh() + ln_cosh(nu * t)).exp();

    let n = 4096; // even panel count
    let h = t_max / n as f64;
    let mut sum = integrand(0.0) + integrand(t_max);
    for k in 1..n {
        let w = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * integrand(k as f64 * h);
    }
    sum * h / 3.0
}

/// log(cosh(u)) without overflow: |u| + ln1p(exp(-2|u|)) - ln 2.
fn ln_cosh(u: f64) -> f64 {
    let a = u.abs();
    a + (-2.0 * a).exp().ln_1p() - std::f64::consts::LN_2
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bessel_k_half_closed_form() {
        // K_{1/2}(x) = sqrt(pi / (2x)) * exp(-x)
        for &x in &[0.1, 0.5, 1.0, 3.0, 10.0] {
            let expected = (std::f64::consts::PI / (2.0 * x)).sqrt() * (-x).exp();
            assert_relative_eq!(bessel_k(0.5, x), expected, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_bessel_k0_reference_value() {
        // K_0(1) = 0.421024438240708... (Abramowitz & Stegun)
        assert_relative_eq!(bessel_k(0.0, 1.0), 0.4210244382407085, epsilon = 1e-8);
    }

    #[test]
    fn test_general_path_matches_closed_form() {
        for &x in &[0.2, 1.0, 2.5, 6.0] {
            assert_relative_eq!(matern_general(x, 1.5), (1.0 + x) * (-x).exp(), epsilon = 1e-7);
            assert_relative_eq!(
                matern_general(x, 2.5),
                (1.0 + x + x * x / 3.0) * (-x).exp(),
                epsilon = 1e-7
            );
        }
    }

    #[test]
    fn test_degenerates_to_exponential_at_half() {
        // nu = 1/2 with range r: corr(d) = exp(-d / r) (sqrt(2 nu) = 1).
        let range = 2.0;
        for &d in &[0.1, 1.0, 4.0] {
            assert_relative_eq!(
                matern_correlation(d, range, 0.5),
                (-d / range).exp(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_correlation_at_zero_distance() {
        assert_eq!(matern_correlation(0.0, 1.0, 1.7), 1.0);
    }

    #[test]
    fn test_correlation_decreasing_in_distance() {
        for &nu in &[0.5, 1.0, 1.5, 3.2] {
            let mut prev = 1.0;
            for &d in &[0.1, 0.5, 1.0, 2.0, 5.0] {
                let c = matern_correlation(d, 1.0, nu);
                assert!(c < prev, "nu = {}, d = {}: {} >= {}", nu, d, c, prev);
                assert!(c > 0.0);
                prev = c;
            }
        }
    }

    #[test]
    fn test_smoother_near_origin_for_larger_nu() {
        let d = 0.2;
        let c_rough = matern_correlation(d, 1.0, 0.5);
        let c_smooth = matern_correlation(d, 1.0, 2.5);
        assert!(c_smooth > c_rough);
    }

    #[test]
    fn test_structure_build() {
        let coords: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64, 0.0]).collect();
        let mat = SpatialMatern::new(&coords).unwrap();
        assert_eq!(mat.n_params(), 3);

        // theta[2] raw: softplus^{-1}(0.5) would pin nu = 1/2 exactly, but
        // any raw value must give a valid PSD matrix.
        let cov = mat.build(&[0.0, 0.5, 0.3]).unwrap();
        assert_eq!(cov.sd(), &[1.0; 4]);
        assert!(cov.is_positive_semidefinite(1e-8));
        for i in 0..4 {
            assert_eq!(cov.correlation()[(i, i)], 1.0);
        }
    }

    #[test]
    fn test_structure_nu_half_equals_exponential_decay() {
        use crate::link::safe_softplus_inv;

        let coords: Vec<Vec<f64>> = vec![vec![0.0], vec![1.0], vec![2.5]];
        let mat = SpatialMatern::new(&coords).unwrap();
        let range = 1.5_f64;
        let cov = mat
            .build(&[0.0, range.ln(), safe_softplus_inv(0.5)])
            .unwrap();
        assert_relative_eq!(
            cov.correlation()[(0, 1)],
            (-1.0 / range).exp(),
            epsilon = 1e-10
        );
        assert_relative_eq!(
            cov.correlation()[(0, 2)],
            (-2.5 / range).exp(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_wrong_theta_length() {
        let mat = SpatialMatern::new(&[vec![0.0], vec![1.0]]).unwrap();
        assert!(mat.build(&[0.0, 0.0]).is_err());
    }
}
