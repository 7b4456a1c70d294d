//! Clustering algorithms for grouping students by behavior.
//!
//! ## K-means
//!
//! Assign each vector to the nearest centroid, then move every centroid to the mean of
//! its members. Repeat until the centroids stop moving or the iteration cap is hit.
//!
//! **Objective**: minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **When to use**: you know how many behavioral groups you want, and the groups are
//! roughly spherical and of similar size.
//!
//! ## DBSCAN
//!
//! Density-based clustering. Finds the number of groups on its own and labels students
//! that fit no dense group as noise.
//!
//! ## Usage
//!
//! ```rust
//! use cohort::cluster::{compute_cluster, Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let fit = Kmeans::new(2, 100, 2).with_seed(42).run(&data).unwrap();
//! assert_eq!(fit.vectors.len(), data.len());
//!
//! let points = compute_cluster(&data, 0.5, 2).unwrap();
//! assert_eq!(points[0].cluster_id, points[1].cluster_id);
//! assert_ne!(points[0].cluster_id, points[2].cluster_id);
//!
//! // Flat, zero-based labels through the shared trait.
//! let labels = Kmeans::new(2, 100, 2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels.len(), data.len());
//! ```

mod dbscan;
mod kmeans;
mod traits;

pub use dbscan::{
    cluster_count, compute_cluster, noise_count, Dbscan, DbscanExt, DbscanPoint, NOISE, NOISE_ID,
    UNASSIGNED,
};
pub use kmeans::{Convergence, Kmeans, KmeansFit, KmeansVector};
pub use traits::Clustering;
