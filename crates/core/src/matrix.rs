use crate::types::DenseMatrix;

/// Compute the cross-product C' * C.
///
/// The result is a Gram matrix, hence symmetric positive semi-definite for
/// any real input. This is the building block of the unstructured
/// correlation transform.
pub fn crossprod(c: &DenseMatrix) -> DenseMatrix {
    c.transpose() * c
}

/// Rescale a symmetric PSD matrix with positive diagonal into a correlation
/// matrix: D * L * D with D = diag(1/sqrt(diag(L))).
///
/// The result has an exact unit diagonal and inherits symmetry and positive
/// semi-definiteness from `l`.
pub fn cov_to_corr(l: &DenseMatrix) -> DenseMatrix {
    let n = l.nrows();
    let inv_sd: Vec<f64> = (0..n).map(|i| 1.0 / l[(i, i)].sqrt()).collect();
    let mut corr = DenseMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            corr[(i, j)] = l[(i, j)] * inv_sd[i] * inv_sd[j];
        }
        corr[(i, i)] = 1.0;
    }
    corr
}

/// Scale a correlation matrix by marginal standard deviations:
/// diag(sd) * corr * diag(sd).
pub fn scale_by_sd(corr: &DenseMatrix, sd: &[f64]) -> DenseMatrix {
    let n = corr.nrows();
    assert_eq!(n, sd.len());
    let mut sigma = DenseMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            sigma[(i, j)] = corr[(i, j)] * sd[i] * sd[j];
        }
    }
    sigma
}

/// Smallest eigenvalue of a symmetric matrix.
pub fn min_symmetric_eigenvalue(a: &DenseMatrix) -> f64 {
    let eig = a.clone().symmetric_eigen();
    eig.eigenvalues.iter().cloned().fold(f64::INFINITY, f64::min)
}

/// Check positive semi-definiteness of a symmetric matrix up to a
/// tolerance: all eigenvalues >= -tol.
pub fn is_positive_semidefinite(a: &DenseMatrix, tol: f64) -> bool {
    min_symmetric_eigenvalue(a) >= -tol
}
