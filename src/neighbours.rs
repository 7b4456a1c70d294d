//! K-nearest-neighbour search over identified vectors.
//!
//! A single pass over the candidate population keeps at most `k` candidates in a
//! bounded max-heap keyed by Euclidean distance to the target:
//!
//! - while fewer than `k` candidates are held, every candidate is admitted;
//! - once full, a candidate is admitted only if it is strictly closer than the current
//!   worst member, which it then evicts. Anything at or beyond the worst distance is
//!   rejected after a single comparison with the heap top.
//!
//! Candidates whose dimensionality differs from the target abort the whole query with
//! [`Error::NeighbourDimensionMismatch`]; they are never silently skipped.
//!
//! ```rust
//! use std::collections::HashMap;
//! use cohort::KNearestNeighbour;
//!
//! let population: HashMap<i64, Vec<f64>> = HashMap::from([
//!     (1, vec![0.0, 0.0]),
//!     (2, vec![1.0, 0.0]),
//!     (3, vec![5.0, 5.0]),
//!     (4, vec![2.0, 0.0]),
//! ]);
//!
//! let knn = KNearestNeighbour::new(2);
//! let nearest = knn.nearest_neighbours(&[0.0, 0.0], &population).unwrap();
//! let ids: Vec<i64> = nearest.iter().map(|n| n.id).collect();
//! assert_eq!(ids, vec![1, 2]);
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use tracing::debug;

use crate::distance::{euclidean_distance, is_mismatch};
use crate::error::{Error, Result};
use crate::StudentId;

/// One member of a nearest-neighbour result.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neighbour {
    /// Identifier of the neighbouring vector.
    pub id: StudentId,
    /// Euclidean distance from the target.
    pub distance: f64,
}

// Heap entry ordered by distance, so the heap top is the current worst member.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    id: StudentId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Bounded top-k similarity search.
#[derive(Debug, Clone)]
pub struct KNearestNeighbour {
    max_neighbours: usize,
}

impl KNearestNeighbour {
    /// Create a search that returns at most `max_neighbours` results.
    pub fn new(max_neighbours: usize) -> Self {
        Self { max_neighbours }
    }

    /// The configured `k`.
    pub fn max_neighbours(&self) -> usize {
        self.max_neighbours
    }

    /// Return the (at most `k`) vectors of `population` closest to `target`.
    ///
    /// The result is sorted by ascending distance. An empty population yields an empty
    /// result; a population smaller than `k` is returned whole.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] if `k == 0`.
    /// - [`Error::NeighbourDimensionMismatch`] if any candidate's length differs from
    ///   the target's. No partial result is returned.
    pub fn nearest_neighbours<'a, P, V>(&self, target: &[f64], population: P) -> Result<Vec<Neighbour>>
    where
        P: IntoIterator<Item = (&'a StudentId, &'a V)>,
        V: AsRef<[f64]> + 'a,
    {
        if self.max_neighbours == 0 {
            return Err(Error::InvalidParameter {
                name: "max_neighbours",
                message: "must be at least 1",
            });
        }

        let mut nearest: BinaryHeap<Candidate> = BinaryHeap::with_capacity(self.max_neighbours);

        for (&id, vector) in population {
            let vector = vector.as_ref();
            let distance = euclidean_distance(target, vector);
            if is_mismatch(distance) {
                debug!(id, expected = target.len(), found = vector.len(), "knn query aborted");
                return Err(Error::NeighbourDimensionMismatch {
                    id,
                    expected: target.len(),
                    found: vector.len(),
                });
            }

            if nearest.len() < self.max_neighbours {
                nearest.push(Candidate { distance, id });
                continue;
            }

            // Full: only a strictly closer candidate displaces the current worst.
            if let Some(mut worst) = nearest.peek_mut() {
                if distance < worst.distance {
                    *worst = Candidate { distance, id };
                }
            }
        }

        Ok(nearest
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbour {
                id: c.id,
                distance: c.distance,
            })
            .collect())
    }

    /// Classify `target` by majority vote among its nearest labeled neighbours.
    ///
    /// Neighbours without an entry in `labels` do not vote. Ties between labels with the
    /// same number of votes go to the label whose voters are closer in total, then to the
    /// smaller label. Returns `Ok(None)` if no neighbour carries a label.
    ///
    /// # Errors
    ///
    /// Same as [`KNearestNeighbour::nearest_neighbours`].
    pub fn classify<'a, P, V, L>(
        &self,
        target: &[f64],
        population: P,
        labels: &HashMap<StudentId, L>,
    ) -> Result<Option<L>>
    where
        P: IntoIterator<Item = (&'a StudentId, &'a V)>,
        V: AsRef<[f64]> + 'a,
        L: Clone + Ord,
    {
        let nearest = self.nearest_neighbours(target, population)?;

        let mut tally: BTreeMap<&L, (usize, f64)> = BTreeMap::new();
        for n in &nearest {
            if let Some(label) = labels.get(&n.id) {
                let entry = tally.entry(label).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += n.distance;
            }
        }

        let mut best: Option<(&L, usize, f64)> = None;
        for (label, &(votes, total)) in &tally {
            let better = match best {
                None => true,
                Some((_, best_votes, best_total)) => {
                    votes > best_votes || (votes == best_votes && total < best_total)
                }
            };
            if better {
                best = Some((*label, votes, total));
            }
        }

        Ok(best.map(|(label, _, _)| label.clone()))
    }
}
