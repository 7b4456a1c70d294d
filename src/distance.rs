//! Distance primitives shared by every engine.
//!
//! Both metrics take two equal-length vectors. On a length mismatch they do not panic
//! or return an error: they return [`DIMENSION_MISMATCH`], a negative value that no real
//! distance can take. Callers must check for it before trusting the result.
//!
//! ```rust
//! use cohort::distance::{euclidean_distance, manhattan_distance, DIMENSION_MISMATCH};
//!
//! assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
//! assert_eq!(manhattan_distance(&[0.0, 0.0], &[3.0, 4.0]), 7.0);
//! assert_eq!(euclidean_distance(&[0.0], &[1.0, 2.0]), DIMENSION_MISMATCH);
//! ```

/// Returned by the distance functions when the two vectors differ in length.
pub const DIMENSION_MISMATCH: f64 = -2.0;

/// Euclidean (L2) distance between `a` and `b`.
///
/// Returns [`DIMENSION_MISMATCH`] if `a.len() != b.len()`.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return DIMENSION_MISMATCH;
    }
    squared_euclidean(a, b).sqrt()
}

/// Manhattan (L1) distance between `a` and `b`.
///
/// Returns [`DIMENSION_MISMATCH`] if `a.len() != b.len()`.
#[inline]
pub fn manhattan_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return DIMENSION_MISMATCH;
    }
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// [`euclidean_distance`] with the sentinel mapped to `None`.
pub fn checked_euclidean_distance(a: &[f64], b: &[f64]) -> Option<f64> {
    sentinel_to_option(euclidean_distance(a, b))
}

/// [`manhattan_distance`] with the sentinel mapped to `None`.
pub fn checked_manhattan_distance(a: &[f64], b: &[f64]) -> Option<f64> {
    sentinel_to_option(manhattan_distance(a, b))
}

/// Whether `distance` is the length-mismatch sentinel rather than a real distance.
#[inline]
pub fn is_mismatch(distance: f64) -> bool {
    distance < 0.0
}

#[inline]
fn sentinel_to_option(distance: f64) -> Option<f64> {
    (!is_mismatch(distance)).then_some(distance)
}

#[inline]
pub(crate) fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
