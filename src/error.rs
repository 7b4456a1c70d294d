use thiserror::Error;

use crate::StudentId;

/// Errors returned by the engines in this crate.
///
/// The distance primitives in [`crate::distance`] do not use this type: they report a
/// length mismatch through the [`crate::distance::DIMENSION_MISMATCH`] sentinel instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A nearest-neighbour candidate could not be compared with the target.
    #[error("neighbour {id} has dimension {found}, target has {expected}")]
    NeighbourDimensionMismatch {
        /// Identifier of the offending candidate.
        id: StudentId,
        /// Dimensionality of the target vector.
        expected: usize,
        /// Dimensionality of the candidate vector.
        found: usize,
    },

    /// A k-means cluster lost all of its members, so its mean is undefined.
    #[error("cluster {cluster} has no members; centroid is undefined")]
    EmptyCluster {
        /// Index of the empty cluster.
        cluster: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
