//! Covariance structure transforms.
//!
//! Each structure decodes an unconstrained parameter vector produced by the
//! fitting engine's optimizer into a covariance matrix for one random term.
//! [`StructureKind`] is the closed set of supported structures;
//! [`CovarianceSpec`] pairs a kind with its shape (dimension, coordinates)
//! and dispatches to the concrete transform.

pub mod ar1;
pub mod compound_symmetry;
mod covariance;
pub mod diagonal;
pub mod matern;
pub mod spatial;
pub mod toeplitz;
mod traits;
pub mod unstructured;

pub use ar1::Ar1;
pub use compound_symmetry::CompoundSymmetry;
pub use covariance::Covariance;
pub use diagonal::Diagonal;
pub use matern::SpatialMatern;
pub use spatial::{OrnsteinUhlenbeck, SpatialExponential, SpatialGaussian};
pub use toeplitz::Toeplitz;
pub use traits::CovStruct;
pub use unstructured::Unstructured;

use crate::error::{CovStructError, Result};

/// The closed set of covariance structure kinds.
///
/// Each kind carries a short formula tag, the textual name used to select
/// the structure in a model formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    Unstructured,
    Toeplitz,
    CompoundSymmetry,
    Diagonal,
    Ar1,
    OrnsteinUhlenbeck,
    SpatialExponential,
    SpatialGaussian,
    SpatialMatern,
}

impl StructureKind {
    /// All kinds, in tag order.
    pub const ALL: [StructureKind; 9] = [
        StructureKind::Unstructured,
        StructureKind::Toeplitz,
        StructureKind::CompoundSymmetry,
        StructureKind::Diagonal,
        StructureKind::Ar1,
        StructureKind::OrnsteinUhlenbeck,
        StructureKind::SpatialExponential,
        StructureKind::SpatialGaussian,
        StructureKind::SpatialMatern,
    ];

    /// The formula tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            StructureKind::Unstructured => "us",
            StructureKind::Toeplitz => "toep",
            StructureKind::CompoundSymmetry => "cs",
            StructureKind::Diagonal => "diag",
            StructureKind::Ar1 => "ar1",
            StructureKind::OrnsteinUhlenbeck => "ou",
            StructureKind::SpatialExponential => "exp",
            StructureKind::SpatialGaussian => "gau",
            StructureKind::SpatialMatern => "mat",
        }
    }

    /// Look a kind up by its formula tag.
    pub fn from_tag(tag: &str) -> Option<StructureKind> {
        StructureKind::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Required parameter vector length for a structure of dimension `n`.
    pub fn param_count(&self, n: usize) -> usize {
        match self {
            StructureKind::Unstructured => n * (n + 1) / 2,
            StructureKind::Toeplitz => 2 * n - 1,
            StructureKind::CompoundSymmetry => n + 1,
            StructureKind::Diagonal => n,
            StructureKind::Ar1 => 2,
            StructureKind::OrnsteinUhlenbeck => 2,
            StructureKind::SpatialExponential => 2,
            StructureKind::SpatialGaussian => 2,
            StructureKind::SpatialMatern => 3,
        }
    }

    /// Whether this kind needs per-level coordinates to compute distances.
    pub fn needs_coordinates(&self) -> bool {
        matches!(
            self,
            StructureKind::OrnsteinUhlenbeck
                | StructureKind::SpatialExponential
                | StructureKind::SpatialGaussian
                | StructureKind::SpatialMatern
        )
    }
}

/// A fully specified covariance structure: kind plus shape.
///
/// Validation happens at construction; [`CovarianceSpec::structure`] then
/// yields the concrete transform, and [`CovarianceSpec::build`] is the
/// one-shot theta-to-matrix path used inside the optimizer loop.
#[derive(Debug, Clone)]
pub struct CovarianceSpec {
    kind: StructureKind,
    dim: usize,
    structure: Box<dyn CovStruct>,
}

impl CovarianceSpec {
    /// Spec for a structure without coordinates.
    ///
    /// Fails for spatial/temporal kinds, which need
    /// [`with_coordinates`](Self::with_coordinates), and for zero dimension.
    pub fn new(kind: StructureKind, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(CovStructError::InvalidParameter(
                "covariance dimension must be at least 1".to_string(),
            ));
        }
        let structure: Box<dyn CovStruct> = match kind {
            StructureKind::Unstructured => Box::new(Unstructured::new(dim)),
            StructureKind::Toeplitz => Box::new(Toeplitz::new(dim)),
            StructureKind::CompoundSymmetry => Box::new(CompoundSymmetry::new(dim)),
            StructureKind::Diagonal => Box::new(Diagonal::new(dim)),
            StructureKind::Ar1 => Box::new(Ar1::new(dim)),
            other => {
                return Err(CovStructError::InvalidParameter(format!(
                    "{:?} requires level coordinates",
                    other
                )))
            }
        };
        Ok(Self {
            kind,
            dim,
            structure,
        })
    }

    /// Spec for a distance-based structure; the dimension is the number of
    /// coordinate tuples. Coordinate problems (empty set, mixed arity,
    /// non-finite values) surface here rather than at first build.
    pub fn with_coordinates(kind: StructureKind, coords: Vec<Vec<f64>>) -> Result<Self> {
        let structure: Box<dyn CovStruct> = match kind {
            StructureKind::OrnsteinUhlenbeck => Box::new(OrnsteinUhlenbeck::new(&coords)?),
            StructureKind::SpatialExponential => Box::new(SpatialExponential::new(&coords)?),
            StructureKind::SpatialGaussian => Box::new(SpatialGaussian::new(&coords)?),
            StructureKind::SpatialMatern => Box::new(SpatialMatern::new(&coords)?),
            other => {
                return Err(CovStructError::InvalidParameter(format!(
                    "{:?} does not take coordinates",
                    other
                )))
            }
        };
        Ok(Self {
            kind,
            dim: coords.len(),
            structure,
        })
    }

    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Required theta length for this spec.
    pub fn param_count(&self) -> usize {
        self.kind.param_count(self.dim)
    }

    /// The concrete transform for this spec.
    pub fn structure(&self) -> &dyn CovStruct {
        self.structure.as_ref()
    }

    /// Decode theta into a covariance matrix.
    pub fn build(&self, theta: &[f64]) -> Result<Covariance> {
        self.structure.build(theta)
    }
}
