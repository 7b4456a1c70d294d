use std::collections::HashMap;

use cohort::cluster::{compute_cluster, Kmeans};
use cohort::distance::{euclidean_distance, manhattan_distance};
use cohort::{Error, KNearestNeighbour, StudentId};
use proptest::prelude::*;

fn vectors(dim: usize, max_len: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-10.0f64..10.0, dim), 1..max_len)
}

proptest! {
    #[test]
    fn prop_euclidean_is_a_metric_shape(
        (a, b) in (1usize..8).prop_flat_map(|d| (
            prop::collection::vec(-100.0f64..100.0, d),
            prop::collection::vec(-100.0f64..100.0, d),
        ))
    ) {
        let ab = euclidean_distance(&a, &b);
        prop_assert!(ab >= 0.0);
        prop_assert_eq!(euclidean_distance(&a, &a), 0.0);
        prop_assert_eq!(ab, euclidean_distance(&b, &a));
        // Pure: same inputs, same output.
        prop_assert_eq!(ab, euclidean_distance(&a, &b));
        prop_assert_eq!(manhattan_distance(&a, &b), manhattan_distance(&a, &b));
        prop_assert!(manhattan_distance(&a, &b) >= 0.0);
    }

    #[test]
    fn prop_length_mismatch_is_sentinel(
        a in prop::collection::vec(-1.0f64..1.0, 0..6),
        extra in 1usize..4
    ) {
        let b = vec![0.0; a.len() + extra];
        prop_assert_eq!(euclidean_distance(&a, &b), -2.0);
        prop_assert_eq!(manhattan_distance(&b, &a), -2.0);
    }

    #[test]
    fn prop_knn_size_is_min_k_population(
        data in vectors(3, 30),
        k in 1usize..10
    ) {
        let population: HashMap<StudentId, Vec<f64>> = data
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as StudentId, v))
            .collect();

        let result = KNearestNeighbour::new(k)
            .nearest_neighbours(&[0.0, 0.0, 0.0], &population)
            .unwrap();

        prop_assert_eq!(result.len(), k.min(population.len()));

        // Nothing left out is strictly closer than the farthest kept neighbour.
        let worst = result.iter().map(|n| n.distance).fold(0.0f64, f64::max);
        for (id, v) in &population {
            if result.iter().all(|n| n.id != *id) {
                prop_assert!(euclidean_distance(&[0.0, 0.0, 0.0], v) >= worst);
            }
        }
    }

    #[test]
    fn prop_kmeans_all_assigned(
        data in vectors(2, 20),
        k in 1usize..5
    ) {
        // Skip if k > n
        if k <= data.len() {
            let model = Kmeans::new(k, 50, 2).with_seed(42);
            match model.run(&data) {
                Ok(fit) => {
                    prop_assert_eq!(fit.vectors.len(), data.len());
                    for v in &fit.vectors {
                        let c = v.cluster_id.unwrap();
                        prop_assert!(c < k);
                    }
                    prop_assert_eq!(fit.cluster_sizes().iter().sum::<usize>(), data.len());
                    prop_assert!(fit.sse() >= 0.0);
                }
                // Lloyd iterations can legitimately empty a cluster.
                Err(Error::EmptyCluster { cluster }) => prop_assert!(cluster < k),
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }
        }
    }

    #[test]
    fn prop_dbscan_labels_are_final(
        data in vectors(2, 25),
        epsilon in 0.1f64..5.0,
        min_pts in 1usize..5
    ) {
        let points = compute_cluster(&data, epsilon, min_pts).unwrap();

        prop_assert_eq!(points.len(), data.len());
        for p in &points {
            prop_assert!(p.visited);
            prop_assert!(p.cluster_id == -1 || p.cluster_id >= 1);
        }

        // A noise point has no dense neighbour at all.
        for (i, p) in points.iter().enumerate() {
            if p.is_noise() {
                for (j, q) in data.iter().enumerate() {
                    let region = data
                        .iter()
                        .filter(|r| euclidean_distance(q, r) < epsilon)
                        .count();
                    let reaches = euclidean_distance(&data[i], q) < epsilon;
                    prop_assert!(!(reaches && region >= min_pts), "noise {} next to core {}", i, j);
                }
            }
        }
    }
}
