use indexmap::IndexMap;

use crate::error::{CovStructError, Result};
use crate::types::DenseMatrix;

/// A grouping factor whose level names carry numeric coordinates.
///
/// Spatial and temporal covariance structures need a position for every
/// level of the grouping factor. Positions are smuggled through the
/// categorical machinery by encoding each coordinate tuple as a level name
/// like `(10,2.5)`, and decoded back without loss when the structure builds
/// its pairwise distance matrix.
///
/// Levels are kept in order of first appearance, like any other factor
/// column, and duplicate tuples collapse onto one level.
#[derive(Debug, Clone)]
pub struct CoordinateFactor {
    /// Maps level name -> integer code (0-based), ordered by first appearance.
    levels: IndexMap<String, usize>,
    /// Decoded coordinate tuple for each level, indexed by code.
    coords: Vec<Vec<f64>>,
}

impl CoordinateFactor {
    /// Build a factor from raw coordinate tuples, one per observation.
    ///
    /// All tuples must be finite and share the same arity. Duplicates are
    /// collapsed; the resulting factor has one level per distinct tuple.
    ///
    /// # Examples
    /// ```
    /// use covstruct_core::CoordinateFactor;
    ///
    /// let cf = CoordinateFactor::from_coordinates(&[
    ///     vec![0.0, 0.0],
    ///     vec![1.0, 0.5],
    ///     vec![0.0, 0.0],
    /// ]).unwrap();
    /// assert_eq!(cf.n_levels(), 2);
    /// assert_eq!(cf.level_name(1), Some("(1,0.5)"));
    /// ```
    pub fn from_coordinates(tuples: &[Vec<f64>]) -> Result<Self> {
        let mut levels = IndexMap::new();
        let mut coords: Vec<Vec<f64>> = Vec::new();
        let arity = tuples.first().map(|t| t.len());

        for tuple in tuples {
            if let Some(arity) = arity {
                if tuple.len() != arity {
                    return Err(CovStructError::DimensionMismatch {
                        expected: arity,
                        got: tuple.len(),
                        context: "coordinate tuple arity".to_string(),
                    });
                }
            }
            if tuple.iter().any(|v| !v.is_finite()) {
                return Err(CovStructError::InvalidParameter(format!(
                    "coordinates must be finite, got {:?}",
                    tuple
                )));
            }
            let name = Self::encode(tuple);
            let next_code = levels.len();
            let code = *levels.entry(name).or_insert(next_code);
            if code == coords.len() {
                coords.push(tuple.clone());
            }
        }

        Ok(CoordinateFactor { levels, coords })
    }

    /// Rebuild a factor from previously encoded level names.
    ///
    /// Fails with `InvalidCoordinateEncoding` on any malformed name.
    pub fn parse_levels(names: &[&str]) -> Result<Self> {
        let tuples: Vec<Vec<f64>> = names
            .iter()
            .map(|name| Self::decode(name))
            .collect::<Result<_>>()?;
        Self::from_coordinates(&tuples)
    }

    /// Encode a coordinate tuple as a level name: `(x,y,...)`.
    ///
    /// Uses the shortest decimal representation that parses back to the
    /// same `f64`, so [`decode`](Self::decode) recovers the original values
    /// exactly.
    pub fn encode(tuple: &[f64]) -> String {
        let parts: Vec<String> = tuple.iter().map(|v| v.to_string()).collect();
        format!("({})", parts.join(","))
    }

    /// Decode a level name produced by [`encode`](Self::encode).
    pub fn decode(name: &str) -> Result<Vec<f64>> {
        let inner = name
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| {
                CovStructError::InvalidCoordinateEncoding(format!(
                    "level '{}' is not of the form (x,y,...)",
                    name
                ))
            })?;
        if inner.is_empty() {
            return Err(CovStructError::InvalidCoordinateEncoding(format!(
                "level '{}' carries no coordinates",
                name
            )));
        }
        inner
            .split(',')
            .map(|part| {
                part.parse::<f64>().map_err(|_| {
                    CovStructError::InvalidCoordinateEncoding(format!(
                        "'{}' in level '{}' is not a number",
                        part, name
                    ))
                })
            })
            .collect()
    }

    /// Number of distinct levels.
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Level name for a given code, or `None` if out of range.
    pub fn level_name(&self, code: usize) -> Option<&str> {
        self.levels.get_index(code).map(|(name, _)| name.as_str())
    }

    /// Decoded coordinate tuples, indexed by level code.
    pub fn coordinates(&self) -> &[Vec<f64>] {
        &self.coords
    }

    /// Pairwise Euclidean distance matrix between level coordinates.
    pub fn distance_matrix(&self) -> DenseMatrix {
        distance_matrix(&self.coords)
    }
}

/// Pairwise Euclidean distances between coordinate tuples.
pub fn distance_matrix(coords: &[Vec<f64>]) -> DenseMatrix {
    let n = coords.len();
    let mut dist = DenseMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&coords[i], &coords[j]);
            dist[(i, j)] = d;
            dist[(j, i)] = d;
        }
    }
    dist
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
