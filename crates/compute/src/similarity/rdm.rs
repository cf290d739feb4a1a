//! Square dissimilarity matrices and their rank comparison.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use tide_core::ResponseRecord;

use crate::algorithms::correlation::spearman;
use crate::algorithms::descriptive::{all_identical, finite_or_zero, mean, population_std};
use crate::algorithms::similarity::{feature_distance, jaccard_distance, token_set};

/// Symmetric, zero-diagonal distance matrix stored row-major.
///
/// An empty matrix (`n == 0`) stands for "not computed": fewer than two
/// responses were available.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DissimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

/// Serializable summary of one matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub shape: [usize; 2],
    pub mean: f64,
    pub std: f64,
}

impl DissimilarityMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a pairwise distance function over `items`.
    pub fn build<T, F>(items: &[T], distance: F) -> Self
    where
        F: Fn(&T, &T) -> f64,
    {
        let n = items.len();
        if n < 2 {
            return Self::empty();
        }
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = finite_or_zero(distance(&items[i], &items[j]));
                values[i * n + j] = d;
                values[j * n + i] = d;
            }
        }
        Self { n, values }
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.n, self.n]
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.n && j < self.n {
            Some(self.values[i * self.n + j])
        } else {
            None
        }
    }

    /// Entries strictly above the diagonal, row by row.
    pub fn upper_triangle(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n * self.n.saturating_sub(1) / 2);
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                out.push(self.values[i * self.n + j]);
            }
        }
        out
    }

    /// Mean over all n×n entries, diagonal included.
    pub fn mean(&self) -> f64 {
        finite_or_zero(mean(&self.values).unwrap_or(0.0))
    }

    /// Population std over all n×n entries, diagonal included.
    pub fn std(&self) -> f64 {
        finite_or_zero(population_std(&self.values).unwrap_or(0.0))
    }

    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary {
            shape: self.shape(),
            mean: self.mean(),
            std: self.std(),
        }
    }

    /// Spearman correlation of the two upper triangles.
    ///
    /// Not comparable (0.0): shape mismatch, nothing above the diagonal, or
    /// either side constant.
    pub fn compare(&self, other: &DissimilarityMatrix) -> f64 {
        if self.shape() != other.shape() {
            return 0.0;
        }
        let a = self.upper_triangle();
        let b = other.upper_triangle();
        if a.is_empty() || all_identical(&a) || all_identical(&b) {
            return 0.0;
        }
        finite_or_zero(spearman(&a, &b).unwrap_or(0.0))
    }
}

/// Cosine distance between feature vectors over all 14 canonical features.
pub fn feature_rdm(responses: &[&ResponseRecord]) -> DissimilarityMatrix {
    DissimilarityMatrix::build(responses, |a, b| feature_distance(&a.features, &b.features))
}

/// `1 - Jaccard` over lower-cased whitespace token sets.
pub fn semantic_rdm(responses: &[&ResponseRecord]) -> DissimilarityMatrix {
    let tokens: Vec<HashSet<String>> = responses.iter().map(|r| token_set(&r.response)).collect();
    DissimilarityMatrix::build(&tokens, jaccard_distance)
}

/// 0 for equal pattern labels, 1 otherwise.
pub fn pattern_rdm(responses: &[&ResponseRecord]) -> DissimilarityMatrix {
    DissimilarityMatrix::build(responses, |a, b| if a.pattern == b.pattern { 0.0 } else { 1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{response, text_response};
    use tide_core::FeatureName;

    #[test]
    fn fewer_than_two_is_empty() {
        let r = response("A", &[(FeatureName::Social, 1.0)]);
        let m = feature_rdm(&[&r]);
        assert!(m.is_empty());
        assert_eq!(m.summary().shape, [0, 0]);
        assert_eq!(m.summary().mean, 0.0);
    }

    #[test]
    fn pattern_matrix_is_symmetric_with_zero_diagonal() {
        let a = response("A", &[]);
        let b = response("B", &[]);
        let c = response("A", &[]);
        let m = pattern_rdm(&[&a, &b, &c]);
        assert_eq!(m.shape(), [3, 3]);
        for i in 0..3 {
            assert_eq!(m.get(i, i), Some(0.0));
        }
        assert_eq!(m.get(0, 1), Some(1.0));
        assert_eq!(m.get(1, 0), Some(1.0));
        assert_eq!(m.get(0, 2), Some(0.0));
        assert_eq!(m.upper_triangle(), vec![1.0, 0.0, 1.0]);
        // 4 ones out of 9 cells.
        assert!((m.mean() - 4.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn semantic_distance_uses_jaccard() {
        let a = text_response("A", "The red apple", &[]);
        let b = text_response("B", "the green apple", &[]);
        let empty1 = text_response("C", "", &[]);
        let empty2 = text_response("D", "   ", &[]);
        let m = semantic_rdm(&[&a, &b, &empty1, &empty2]);
        // {the, apple} / {the, red, green, apple}
        assert!((m.get(0, 1).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(m.get(2, 3), Some(1.0));
        assert_eq!(m.get(0, 2), Some(1.0));
    }

    #[test]
    fn feature_distance_of_zero_vector_is_one() {
        let a = response("A", &[]);
        let b = response("B", &[(FeatureName::Color, 0.4)]);
        let m = feature_rdm(&[&a, &b]);
        assert_eq!(m.get(0, 1), Some(1.0));
    }

    #[test]
    fn compare_mismatched_shapes_is_zero() {
        let rs: Vec<_> = ["A", "B", "C"].iter().map(|p| response(p, &[])).collect();
        let refs: Vec<&ResponseRecord> = rs.iter().collect();
        let three = pattern_rdm(&refs);
        let two = pattern_rdm(&refs[..2]);
        assert_eq!(three.compare(&two), 0.0);
        assert_eq!(three.compare(&DissimilarityMatrix::empty()), 0.0);
    }

    #[test]
    fn compare_constant_is_zero() {
        let rs: Vec<_> = ["A", "B", "C"].iter().map(|p| response(p, &[])).collect();
        let refs: Vec<&ResponseRecord> = rs.iter().collect();
        let all_different = pattern_rdm(&refs);
        assert_eq!(all_different.compare(&all_different), 0.0);
    }

    #[test]
    fn compare_identical_varied_matrix_is_one() {
        let rs: Vec<_> = ["A", "B", "A", "C"].iter().map(|p| response(p, &[])).collect();
        let refs: Vec<&ResponseRecord> = rs.iter().collect();
        let m = pattern_rdm(&refs);
        assert!((m.compare(&m) - 1.0).abs() < 1e-12);
    }
}
