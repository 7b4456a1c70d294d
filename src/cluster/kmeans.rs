//! K-means: iterative centroid refinement.
//!
//! # Algorithm
//!
//! 1. Seed: pick `k` distinct input vectors uniformly at random (without replacement)
//!    as the initial centroids.
//! 2. Assign: each vector joins its nearest centroid by Euclidean distance. On a tie the
//!    centroid that comes first in the centroid list wins.
//! 3. Repeat up to `max_iterations` times: recompute every centroid as the mean of its
//!    members, reassign, and stop early once no centroid moved (see [`Convergence`]).
//!
//! A centroid whose cluster lost every member has no mean; the run fails with
//! [`Error::EmptyCluster`] rather than re-seeding.
//!
//! # Determinism
//!
//! Seeding is random, so two unseeded runs over the same data may settle on different
//! partitions. [`Kmeans::with_seed`] or [`Kmeans::run_with_rng`] make the seeding
//! reproducible.

use rand::prelude::*;
use rand::seq::index;
use tracing::{debug, trace};

use super::traits::Clustering;
use crate::distance::euclidean_distance;
use crate::error::{Error, Result};

/// When two consecutive centroid sets count as "unchanged".
///
/// Centroids are compared index by index with exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Convergence {
    /// Compare only the first `n` coordinates of each centroid.
    ///
    /// `LeadingDimensions(2)` is the default and matches the behavior of earlier releases of
    /// this engine. It is not textbook k-means: with more than two dimensions a run can
    /// stop while centroids are still moving along the remaining axes.
    LeadingDimensions(usize),
    /// Compare every coordinate.
    FullVector,
}

impl Default for Convergence {
    fn default() -> Self {
        Self::LeadingDimensions(2)
    }
}

impl Convergence {
    fn unchanged(self, previous: &[Vec<f64>], current: &[Vec<f64>]) -> bool {
        previous.iter().zip(current).all(|(p, c)| {
            let dims = match self {
                Self::LeadingDimensions(n) => n.min(p.len()),
                Self::FullVector => p.len(),
            };
            p[..dims] == c[..dims]
        })
    }
}

/// One input vector with its current cluster assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KmeansVector {
    /// The vector's coordinates, as supplied.
    pub coordinates: Vec<f64>,
    /// Index of the assigned centroid, `None` before the first assignment.
    pub cluster_id: Option<usize>,
    /// Distance to the assigned centroid (infinite before the first assignment).
    pub distance_to_centroid: f64,
}

impl KmeansVector {
    /// Wrap coordinates as an unassigned vector.
    pub fn new(coordinates: Vec<f64>) -> Self {
        Self {
            coordinates,
            cluster_id: None,
            distance_to_centroid: f64::INFINITY,
        }
    }
}

/// Result of a k-means run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KmeansFit {
    /// One record per input vector, in input order. All are assigned.
    pub vectors: Vec<KmeansVector>,
    /// Final centroids; `centroids[c]` is the centroid of cluster `c`.
    pub centroids: Vec<Vec<f64>>,
    /// Number of refinement iterations performed (0 when `max_iterations` is 0).
    pub iterations: usize,
    /// Whether the run stopped because centroids stopped moving.
    pub converged: bool,
}

impl KmeansFit {
    /// Cluster label per input vector.
    pub fn labels(&self) -> Vec<usize> {
        self.vectors.iter().filter_map(|v| v.cluster_id).collect()
    }

    /// Number of members per cluster, indexed by cluster id.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for c in self.vectors.iter().filter_map(|v| v.cluster_id) {
            sizes[c] += 1;
        }
        sizes
    }

    /// Sum of squared distances from each vector to its centroid.
    pub fn sse(&self) -> f64 {
        self.vectors
            .iter()
            .map(|v| v.distance_to_centroid * v.distance_to_centroid)
            .sum()
    }
}

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iterations: usize,
    vector_length: usize,
    seed: Option<u64>,
    convergence: Convergence,
}

impl Kmeans {
    /// Create a new k-means clusterer.
    ///
    /// # Arguments
    ///
    /// * `k` - Number of clusters.
    /// * `max_iterations` - Cap on refinement iterations after the initial assignment.
    /// * `vector_length` - Dimensionality every input vector must have.
    pub fn new(k: usize, max_iterations: usize, vector_length: usize) -> Self {
        Self {
            k,
            max_iterations,
            vector_length,
            seed: None,
            convergence: Convergence::default(),
        }
    }

    /// Seed the centroid selection for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set the convergence check.
    pub fn with_convergence(mut self, convergence: Convergence) -> Self {
        self.convergence = convergence;
        self
    }

    /// Configured number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Cluster `data`, seeding from the configured seed (or the thread RNG if unseeded).
    pub fn run(&self, data: &[Vec<f64>]) -> Result<KmeansFit> {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        self.run_with_rng(data, &mut rng)
    }

    /// Cluster `data`, seeding centroids from `rng`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] if `k` or `vector_length` is zero.
    /// - [`Error::EmptyInput`] if `data` is empty.
    /// - [`Error::InvalidClusterCount`] if `k` exceeds the number of vectors.
    /// - [`Error::DimensionMismatch`] if a vector's length is not `vector_length`.
    /// - [`Error::EmptyCluster`] if a cluster ends up with no members during refinement.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, data: &[Vec<f64>], rng: &mut R) -> Result<KmeansFit> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.vector_length == 0 {
            return Err(Error::InvalidParameter {
                name: "vector_length",
                message: "must be at least 1",
            });
        }
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.k > data.len() {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: data.len(),
            });
        }
        if let Some(row) = data.iter().find(|row| row.len() != self.vector_length) {
            return Err(Error::DimensionMismatch {
                expected: self.vector_length,
                found: row.len(),
            });
        }

        let mut vectors: Vec<KmeansVector> = data.iter().cloned().map(KmeansVector::new).collect();

        let mut centroids: Vec<Vec<f64>> = index::sample(rng, data.len(), self.k)
            .into_iter()
            .map(|i| data[i].clone())
            .collect();

        assign(&mut vectors, &centroids);

        let mut iterations = 0;
        let mut converged = false;
        for iteration in 0..self.max_iterations {
            let recomputed = self.recompute_centroids(&vectors)?;
            let previous = std::mem::replace(&mut centroids, recomputed);
            assign(&mut vectors, &centroids);
            iterations = iteration + 1;

            let moved = !self.convergence.unchanged(&previous, &centroids);
            trace!(iteration, moved, "kmeans iteration");
            if !moved {
                converged = true;
                break;
            }
        }

        debug!(
            k = self.k,
            n = vectors.len(),
            iterations,
            converged,
            "kmeans finished"
        );

        Ok(KmeansFit {
            vectors,
            centroids,
            iterations,
            converged,
        })
    }

    /// Mean of every cluster's members.
    fn recompute_centroids(&self, vectors: &[KmeansVector]) -> Result<Vec<Vec<f64>>> {
        let mut sums = vec![vec![0.0; self.vector_length]; self.k];
        let mut counts = vec![0usize; self.k];

        for v in vectors {
            if let Some(c) = v.cluster_id {
                for (s, x) in sums[c].iter_mut().zip(&v.coordinates) {
                    *s += x;
                }
                counts[c] += 1;
            }
        }

        for (cluster, (sum, &count)) in sums.iter_mut().zip(&counts).enumerate() {
            if count == 0 {
                debug!(cluster, "kmeans cluster emptied");
                return Err(Error::EmptyCluster { cluster });
            }
            let n = count as f64;
            for s in sum.iter_mut() {
                *s /= n;
            }
        }

        Ok(sums)
    }
}

/// Assign every vector to its nearest centroid; the first centroid wins ties.
fn assign(vectors: &mut [KmeansVector], centroids: &[Vec<f64>]) {
    for v in vectors {
        let mut best: Option<(usize, f64)> = None;
        for (idx, centroid) in centroids.iter().enumerate() {
            let d = euclidean_distance(&v.coordinates, centroid);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((idx, d));
            }
        }
        if let Some((idx, d)) = best {
            v.cluster_id = Some(idx);
            v.distance_to_centroid = d;
        }
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self.run(data)?.labels())
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
