//! K-means, DBSCAN, and k-NN over a handful of students.

use std::collections::HashMap;

use cohort::cluster::{compute_cluster, Kmeans};
use cohort::{KNearestNeighbour, StudentId};

fn main() {
    // (hours online per week, assignments submitted)
    let students: Vec<(StudentId, Vec<f64>)> = vec![
        // Group A: barely active
        (1, vec![1.0, 1.0]),
        (2, vec![1.5, 1.2]),
        (3, vec![0.8, 0.9]),
        (4, vec![1.2, 1.4]),
        // Group B: steady
        (5, vec![8.0, 6.0]),
        (6, vec![8.4, 6.2]),
        (7, vec![7.8, 5.9]),
        (8, vec![8.1, 6.4]),
        // Outlier: online a lot, submits nothing
        (9, vec![25.0, 0.0]),
    ];
    let data: Vec<Vec<f64>> = students.iter().map(|(_, v)| v.clone()).collect();

    // --- K-means (k=2) ---
    println!("=== K-means (k=2) ===");
    match Kmeans::new(2, 100, 2).with_seed(42).run(&data) {
        Ok(fit) => {
            for ((id, _), v) in students.iter().zip(&fit.vectors) {
                println!(
                    "  student {:2} ({:5.1}, {:5.1}) => cluster {:?} (distance {:.3})",
                    id, v.coordinates[0], v.coordinates[1], v.cluster_id, v.distance_to_centroid
                );
            }
            println!("  iterations: {}, SSE: {:.3}", fit.iterations, fit.sse());
        }
        Err(e) => println!("  k-means failed: {e}"),
    }

    // --- DBSCAN (eps=1.0, min_pts=2) ---
    println!("\n=== DBSCAN (eps=1.0, min_pts=2) ===");
    match compute_cluster(&data, 1.0, 2) {
        Ok(points) => {
            for ((id, _), p) in students.iter().zip(&points) {
                let tag = if p.is_noise() {
                    "NOISE".to_string()
                } else {
                    format!("cluster {}", p.cluster_id)
                };
                println!(
                    "  student {:2} ({:5.1}, {:5.1}) => {}",
                    id, p.coordinates[0], p.coordinates[1], tag
                );
            }
        }
        Err(e) => println!("  dbscan failed: {e}"),
    }

    // --- k-NN (k=3) for student 6 ---
    println!("\n=== 3 nearest neighbours of student 6 ===");
    let population: HashMap<StudentId, Vec<f64>> = students.into_iter().collect();
    match KNearestNeighbour::new(3).nearest_neighbours(&population[&6], &population) {
        Ok(nearest) => {
            for n in nearest {
                println!("  student {:2} at distance {:.3}", n.id, n.distance);
            }
        }
        Err(e) => println!("  knn failed: {e}"),
    }
}
