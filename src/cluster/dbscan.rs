//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! DBSCAN groups points by neighborhood density. Unlike k-means, it discovers the
//! number of clusters on its own, handles non-convex shapes, and labels points that
//! belong to no dense region as noise.
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: neighborhood radius. A point `q` is in the region of `p` when
//!   `dist(p, q) < ε` (strictly; points at exactly ε are excluded).
//! - **MinPts**: minimum region size for `p` to seed a cluster. The region of `p`
//!   always contains `p` itself, so MinPts counts the point.
//! - **Noise point**: a point never reached by any cluster expansion.
//!
//! ## Labels
//!
//! Every [`DbscanPoint`] carries a `cluster_id`:
//!
//! - [`UNASSIGNED`] (`0`): not yet labeled. Never returned by a finished run.
//! - [`NOISE_ID`] (`-1`): visited, not density-reachable. This label is provisional
//!   during the run: a later expansion that reaches the point turns it into a
//!   border point of that cluster.
//! - `1, 2, ...`: cluster ids, allocated in increasing order. Once a point has a
//!   positive id it keeps it.
//!
//! ## Expansion
//!
//! Expansion drains an explicit FIFO queue. Each queued point that has not been visited
//! yet gets its own region query; if that region is dense, its members that were never
//! queued for this cluster are appended to the queue. Every dequeued point without a
//! positive label joins the cluster.
//!
//! ## Degraded input
//!
//! A point whose dimensionality disagrees with any other point in the set has an empty
//! region, so it can never seed a cluster. With mixed lengths this holds for every
//! point and the whole set comes back as noise. This is not reported as an error.
//!
//! ## Complexity
//!
//! - **Time**: O(n²) (every region query is a linear scan).
//! - **Space**: O(n) for labels and the queue.

use std::collections::VecDeque;

use tracing::debug;

use super::traits::Clustering;
use crate::distance::euclidean_distance;
use crate::error::{Error, Result};

/// Flat label used by [`Clustering::fit_predict`] for noise points.
pub const NOISE: usize = usize::MAX;

/// `cluster_id` of a point that has not been labeled yet.
pub const UNASSIGNED: i32 = 0;

/// `cluster_id` of a noise point.
pub const NOISE_ID: i32 = -1;

/// A point together with the state DBSCAN attaches to it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbscanPoint {
    /// The point's coordinates, as supplied.
    pub coordinates: Vec<f64>,
    /// [`UNASSIGNED`], [`NOISE_ID`], or a positive cluster id.
    pub cluster_id: i32,
    /// Whether the point's region has been queried.
    pub visited: bool,
}

impl DbscanPoint {
    /// Wrap coordinates as an unvisited, unassigned point.
    pub fn new(coordinates: Vec<f64>) -> Self {
        Self {
            coordinates,
            cluster_id: UNASSIGNED,
            visited: false,
        }
    }

    /// Whether the point ended up as noise.
    pub fn is_noise(&self) -> bool {
        self.cluster_id == NOISE_ID
    }

    /// The positive cluster id, if the point belongs to a cluster.
    pub fn cluster(&self) -> Option<u32> {
        u32::try_from(self.cluster_id).ok().filter(|&c| c > 0)
    }
}

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: neighborhood radius (exclusive).
    epsilon: f64,
    /// Minimum region size, including the point itself.
    min_pts: usize,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Neighborhood radius; neighbors are strictly closer than this.
    /// * `min_pts` - Minimum number of points (the point itself included) in a dense region.
    pub fn new(epsilon: f64, min_pts: usize) -> Self {
        Self { epsilon, min_pts }
    }

    /// Set epsilon (neighborhood radius).
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set minimum points for core classification.
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Neighborhood radius.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Minimum region size.
    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive and finite",
            });
        }

        if self.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }

        Ok(())
    }

    /// Cluster `points`, returning one labeled [`DbscanPoint`] per input, in input order.
    ///
    /// An empty input yields an empty output.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if epsilon is not positive and finite, or `min_pts` is
    /// zero. In particular `epsilon == 0.0` is rejected instead of labeling every point
    /// as noise.
    ///
    /// Inconsistent dimensionality is not an error (see the module docs).
    pub fn compute_cluster(&self, points: &[Vec<f64>]) -> Result<Vec<DbscanPoint>> {
        self.validate()?;

        let mut all: Vec<DbscanPoint> = points.iter().cloned().map(DbscanPoint::new).collect();

        let uniform = points.windows(2).all(|w| w[0].len() == w[1].len());
        if !uniform {
            debug!(n = points.len(), "dbscan input has mixed dimensionality; all regions empty");
        }

        let mut cluster_id: i32 = 0;

        for point_idx in 0..all.len() {
            if all[point_idx].visited {
                continue;
            }
            all[point_idx].visited = true;

            let neighbors = self.region_query(&all, point_idx, uniform);

            if neighbors.len() < self.min_pts {
                // Provisional: a later expansion may still reach this point.
                all[point_idx].cluster_id = NOISE_ID;
                continue;
            }

            cluster_id += 1;
            self.expand_cluster(&mut all, point_idx, neighbors, cluster_id, uniform);
        }

        debug!(
            n = all.len(),
            clusters = cluster_id,
            noise = noise_count(&all),
            "dbscan finished"
        );

        Ok(all)
    }

    /// Indices of every point (including `point_idx`) strictly within epsilon.
    fn region_query(&self, points: &[DbscanPoint], point_idx: usize, uniform: bool) -> Vec<usize> {
        if !uniform {
            return Vec::new();
        }

        let center = &points[point_idx].coordinates;
        points
            .iter()
            .enumerate()
            .filter(|(_, other)| euclidean_distance(center, &other.coordinates) < self.epsilon)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Grow cluster `cluster_id` outward from the core point `point_idx`.
    fn expand_cluster(
        &self,
        points: &mut [DbscanPoint],
        point_idx: usize,
        neighbors: Vec<usize>,
        cluster_id: i32,
        uniform: bool,
    ) {
        points[point_idx].cluster_id = cluster_id;

        // `queued` mirrors set membership: a point enters this cluster's queue once.
        let mut queued = vec![false; points.len()];
        for &idx in &neighbors {
            queued[idx] = true;
        }
        let mut to_process: VecDeque<usize> = neighbors.into();

        while let Some(idx) = to_process.pop_front() {
            if !points[idx].visited {
                points[idx].visited = true;

                let region = self.region_query(points, idx, uniform);
                if region.len() >= self.min_pts {
                    for nn in region {
                        if !queued[nn] {
                            queued[nn] = true;
                            to_process.push_back(nn);
                        }
                    }
                }
            }

            // Unassigned and provisional-noise points both join; positive ids are final.
            if points[idx].cluster_id <= UNASSIGNED {
                points[idx].cluster_id = cluster_id;
            }
        }
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.5, 5)
    }
}

/// Cluster `points` with the given parameters.
///
/// Shorthand for `Dbscan::new(epsilon, min_pts).compute_cluster(points)`. A zero or
/// non-finite `epsilon` is an error, not an all-noise result.
pub fn compute_cluster(points: &[Vec<f64>], epsilon: f64, min_pts: usize) -> Result<Vec<DbscanPoint>> {
    Dbscan::new(epsilon, min_pts).compute_cluster(points)
}

/// Number of distinct clusters in a finished run.
pub fn cluster_count(points: &[DbscanPoint]) -> usize {
    // Ids are allocated densely from 1.
    points
        .iter()
        .filter_map(DbscanPoint::cluster)
        .max()
        .map_or(0, |c| c as usize)
}

/// Number of noise points in a finished run.
pub fn noise_count(points: &[DbscanPoint]) -> usize {
    points.iter().filter(|p| p.is_noise()).count()
}

impl Clustering for Dbscan {
    /// Cluster id `c` becomes label `c - 1`; noise becomes [`NOISE`].
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self
            .compute_cluster(data)?
            .iter()
            .map(|p| p.cluster().map_or(NOISE, |c| c as usize - 1))
            .collect())
    }

    /// DBSCAN discovers clusters dynamically, so this returns 0.
    ///
    /// To get the actual number of clusters, use [`cluster_count`] after clustering.
    fn n_clusters(&self) -> usize {
        0
    }
}

/// Extended DBSCAN interface with noise detection.
pub trait DbscanExt {
    /// Fit and predict, returning labels where noise is marked as `None`.
    fn fit_predict_with_noise(&self, data: &[Vec<f64>]) -> Result<Vec<Option<usize>>>;

    /// Check if a flat label represents noise.
    fn is_noise(label: usize) -> bool {
        label == NOISE
    }
}

impl DbscanExt for Dbscan {
    fn fit_predict_with_noise(&self, data: &[Vec<f64>]) -> Result<Vec<Option<usize>>> {
        Ok(self
            .fit_predict(data)?
            .into_iter()
            .map(|l| (l != NOISE).then_some(l))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(points: &[DbscanPoint]) -> Vec<i32> {
        points.iter().map(|p| p.cluster_id).collect()
    }

    #[test]
    fn test_dbscan_two_clusters_1d() {
        let data: Vec<Vec<f64>> = [0.0, 0.1, 0.2, 10.0, 10.1, 10.2]
            .iter()
            .map(|&x| vec![x])
            .collect();

        let points = compute_cluster(&data, 0.5, 2).unwrap();

        assert_eq!(ids(&points), vec![1, 1, 1, 2, 2, 2]);
        assert_eq!(cluster_count(&points), 2);
        assert_eq!(noise_count(&points), 0);
        assert!(points.iter().all(|p| p.visited));
        assert_eq!(points[4].coordinates, vec![10.1]);
    }

    #[test]
    fn test_dbscan_two_clusters() {
        let data = vec![
            // Cluster 1: around (0, 0)
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![0.1, 0.1],
            vec![0.05, 0.05],
            // Cluster 2: around (5, 5)
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
            vec![5.1, 5.1],
            vec![5.05, 5.05],
        ];

        let dbscan = Dbscan::new(0.3, 3);
        let labels = dbscan.fit_predict(&data).unwrap();

        assert_eq!(labels.len(), 10);

        // First 5 should be in same cluster
        let cluster1 = labels[0];
        for label in &labels[1..5] {
            assert_eq!(*label, cluster1);
        }

        // Last 5 should be in same cluster
        let cluster2 = labels[5];
        for label in &labels[6..10] {
            assert_eq!(*label, cluster2);
        }

        // Two clusters should be different
        assert_ne!(cluster1, cluster2);
    }

    #[test]
    fn test_dbscan_with_noise() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![0.1, 0.1],
            // Outlier
            vec![100.0, 100.0],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
            vec![5.1, 5.1],
        ];

        let dbscan = Dbscan::new(0.3, 3);
        let labels = dbscan.fit_predict_with_noise(&data).unwrap();

        assert_eq!(labels.len(), 9);
        // Point 4 (outlier) should be noise
        assert!(labels[4].is_none());

        // Others should have cluster assignments
        for (i, label) in labels.iter().enumerate() {
            if i != 4 {
                assert!(label.is_some());
            }
        }
    }

    #[test]
    fn test_isolated_point_is_noise() {
        let data = vec![vec![0.0], vec![0.1], vec![3.0]];
        let points = compute_cluster(&data, 0.5, 2).unwrap();
        assert!(points[2].is_noise());
        assert_eq!(points[2].cluster(), None);
        assert_eq!(points[0].cluster(), Some(1));
    }

    #[test]
    fn test_noise_is_reclaimed_as_border() {
        // Point 0 alone is not dense (region {0, 0.4}), but 0.4 is core and reaches it.
        let data = vec![vec![0.0], vec![0.4], vec![0.8]];
        let points = compute_cluster(&data, 0.5, 3).unwrap();
        assert_eq!(ids(&points), vec![1, 1, 1]);
    }

    #[test]
    fn test_shared_border_point_keeps_first_cluster() {
        // 0.6 is within epsilon of core 0.2 and of core 1.0 but is not core itself.
        // Cluster 1 claims it first; cluster 2's expansion must not relabel it.
        let data: Vec<Vec<f64>> = [0.0, 0.1, 0.2, 0.6, 1.0, 1.1, 1.2]
            .iter()
            .map(|&x| vec![x])
            .collect();

        let points = compute_cluster(&data, 0.45, 4).unwrap();

        assert_eq!(ids(&points), vec![1, 1, 1, 1, 2, 2, 2]);
        assert_eq!(cluster_count(&points), 2);
    }

    #[test]
    fn test_zero_or_infinite_epsilon_is_rejected() {
        let data = vec![vec![0.0], vec![0.1]];
        assert!(matches!(
            compute_cluster(&data, 0.0, 2),
            Err(Error::InvalidParameter { name: "epsilon", .. })
        ));
        assert!(matches!(
            compute_cluster(&data, f64::INFINITY, 2),
            Err(Error::InvalidParameter { name: "epsilon", .. })
        ));
    }

    #[test]
    fn test_boundary_distance_is_excluded() {
        // Exactly epsilon apart: not neighbors.
        let data = vec![vec![0.0], vec![0.5]];
        let points = compute_cluster(&data, 0.5, 2).unwrap();
        assert_eq!(ids(&points), vec![NOISE_ID, NOISE_ID]);
    }

    #[test]
    fn test_min_pts_counts_self() {
        let data = vec![vec![0.0], vec![50.0]];
        let points = compute_cluster(&data, 0.5, 1).unwrap();
        assert_eq!(ids(&points), vec![1, 2]);
    }

    #[test]
    fn test_mixed_dimensionality_degrades_to_noise() {
        let data = vec![vec![0.0, 0.0], vec![0.1, 0.0], vec![0.0]];
        let points = compute_cluster(&data, 0.5, 2).unwrap();
        assert!(points.iter().all(DbscanPoint::is_noise));
    }

    #[test]
    fn test_dbscan_chain() {
        // Chain of points - DBSCAN should connect them
        let data: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i) * 0.3, 0.0]).collect();

        let labels = Dbscan::new(0.5, 2).fit_predict(&data).unwrap();

        // All should be in one cluster (chain is connected)
        let cluster = labels[0];
        for label in labels {
            assert_eq!(label, cluster);
        }
    }

    #[test]
    fn test_dbscan_empty() {
        let data: Vec<Vec<f64>> = vec![];
        assert!(Dbscan::new(0.5, 3).compute_cluster(&data).unwrap().is_empty());
    }

    #[test]
    fn test_dbscan_invalid_params() {
        let data = vec![vec![0.0, 0.0]];

        assert!(Dbscan::new(0.0, 3).fit_predict(&data).is_err());
        assert!(Dbscan::new(-1.0, 3).fit_predict(&data).is_err());
        assert!(Dbscan::new(f64::NAN, 3).fit_predict(&data).is_err());
        assert!(Dbscan::new(f64::INFINITY, 3).fit_predict(&data).is_err());
        assert!(Dbscan::new(0.5, 0).fit_predict(&data).is_err());
    }

    #[test]
    fn test_flat_labels_are_zero_based() {
        let data = vec![vec![0.0], vec![0.1], vec![9.0]];
        let labels = Dbscan::default().with_epsilon(0.5).with_min_pts(2).fit_predict(&data).unwrap();
        assert_eq!(labels, vec![0, 0, NOISE]);
        assert!(<Dbscan as DbscanExt>::is_noise(labels[2]));
    }
}
