//! Link functions mapping unconstrained optimizer parameters to their
//! constrained scales.
//!
//! Every variance parameter is optimized on an unconstrained real scale and
//! decoded on access: log scale for standard deviations, a bounded squash
//! for correlations, softplus for the Matern smoothness. Each link is an
//! explicit pure function; the structures whose positive-definiteness is
//! guaranteed by construction (unstructured) do not go through these.

/// Squash an unconstrained real into (-1, 1): `x / sqrt(1 + x^2)`.
///
/// Used for the per-band Toeplitz correlations and the shared
/// compound-symmetry correlation. Strictly increasing and bijective onto
/// the open interval, so the optimizer can never produce |rho| >= 1.
pub fn corr_link(x: f64) -> f64 {
    x / (1.0 + x * x).sqrt()
}

/// Inverse of [`corr_link`] on (-1, 1): `rho / sqrt(1 - rho^2)`.
pub fn corr_link_inv(rho: f64) -> f64 {
    debug_assert!(rho.abs() < 1.0);
    rho / (1.0 - rho * rho).sqrt()
}

/// Numerically stable softplus: `ln(1 + exp(x))`, mapping the reals onto
/// (0, inf).
///
/// For large positive `x` the naive form overflows; past the cutoff
/// `softplus(x) = x + ln1p(exp(-x)) ~ x` to machine precision.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 {
        x
    } else {
        x.exp().ln_1p()
    }
}

/// Stable inverse of softplus on (0, inf): `ln(exp(x) - 1)`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 {
        x
    } else {
        x.exp_m1().ln()
    }
}
