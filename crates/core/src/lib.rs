pub mod coords;
pub mod error;
pub mod link;
pub mod matrix;
pub mod structure;
pub mod types;

pub use coords::CoordinateFactor;
pub use error::{CovStructError, Result};
pub use structure::{CovStruct, Covariance, CovarianceSpec, StructureKind};
