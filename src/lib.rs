//! Clustering and neighbour search over per-student behavioral vectors.
//!
//! `cohort` takes already-vectorized numeric data (one `f64` vector per student) and
//! answers three questions:
//!
//! - which behavioral groups exist: [`cluster::Dbscan`] (density-based, finds noise)
//!   and [`cluster::Kmeans`] (a fixed number of centroid-based groups);
//! - which peers are most similar to one student: [`KNearestNeighbour`];
//! - how far apart two students are: [`distance`].
//!
//! Every engine is synchronous and keeps its working state local to one call, so
//! independent calls can run in parallel without coordination.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod distance;
pub mod error;
pub mod neighbours;

pub use cluster::{
    Clustering, Convergence, Dbscan, DbscanExt, DbscanPoint, Kmeans, KmeansFit, KmeansVector,
    NOISE,
};
pub use error::{Error, Result};
pub use neighbours::{KNearestNeighbour, Neighbour};

/// Identifier of a student (or any other entity a vector describes).
pub type StudentId = i64;
