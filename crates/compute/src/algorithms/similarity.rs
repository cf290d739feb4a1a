//! Pairwise similarity measures for feature vectors and token sets.

use std::collections::HashSet;

use tide_core::FeatureVector;

/// Cosine similarity between two dense vectors.
///
/// Returns 0.0 for zero-length inputs, a zero vector on either side, or a
/// non-finite result. Identical non-zero inputs yield exactly 1.0 at any
/// magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dim = a.len().min(b.len());
    if dim == 0 {
        return 0.0;
    }
    let (a, b) = (&a[..dim], &b[..dim]);

    let (Some(scale_a), Some(scale_b)) = (max_abs(a), max_abs(b)) else {
        return 0.0;
    };
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    // Each side is scaled to a max component of 1 so squaring cannot
    // underflow or overflow.
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let x = x / scale_a;
        let y = y / scale_b;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Largest absolute component, `None` when any component is non-finite.
fn max_abs(values: &[f64]) -> Option<f64> {
    values.iter().try_fold(0.0f64, |acc, v| v.is_finite().then(|| acc.max(v.abs())))
}

/// Cosine similarity of two sparse feature vectors over the union of their
/// keys, missing scores filled with 0.
pub fn feature_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }
    cosine_similarity(&a.to_dense(), &b.to_dense())
}

/// `1 - feature_similarity`.
pub fn feature_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    1.0 - feature_similarity(a, b)
}

/// Lower-cased whitespace token set.
pub fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// `1 - |A ∩ B| / |A ∪ B|`; two empty sets are maximally distant.
pub fn jaccard_distance(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    1.0 - intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tide_core::FeatureName;

    #[test]
    fn cosine_similarity_identical_is_exactly_one() {
        let a = vec![0.1, 0.2, 0.3, 0.7];
        assert_eq!(cosine_similarity(&a, &a), 1.0);
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&b, &b), 1.0);
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-12);
    }

    #[test]
    fn cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn cosine_similarity_nan_is_zero() {
        assert_eq!(cosine_similarity(&[f64::NAN, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn feature_similarity_fills_missing_keys() {
        let a = FeatureVector::new()
            .with(FeatureName::Social, 1.0)
            .with(FeatureName::Time, 1.0);
        let b = FeatureVector::new().with(FeatureName::Social, 1.0);
        let sim = feature_similarity(&a, &b);
        assert!((sim - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(feature_similarity(&a, &a.clone()), 1.0);
    }

    #[test]
    fn identical_tiny_vectors_are_exactly_one() {
        for v in [1e-17, 1e-170, 1e-300] {
            let a = FeatureVector::new().with(FeatureName::Social, v);
            assert_eq!(feature_similarity(&a, &a.clone()), 1.0, "v={v}");

            let b = FeatureVector::new()
                .with(FeatureName::Social, v)
                .with(FeatureName::Color, 2.0 * v);
            assert_eq!(feature_similarity(&b, &b.clone()), 1.0, "v={v}");
        }
    }

    #[test]
    fn tiny_vectors_keep_their_angle() {
        let v = 1e-170;
        let sim = cosine_similarity(&[v, 0.0], &[v, v]);
        assert!((sim - 1.0 / 2f64.sqrt()).abs() < 1e-12, "sim={sim}");
    }

    #[test]
    fn feature_similarity_all_zero_is_zero() {
        let zero = FeatureVector::new().with(FeatureName::Color, 0.0);
        let other = FeatureVector::new().with(FeatureName::Color, 0.5);
        assert_eq!(feature_similarity(&zero, &other), 0.0);
        assert_eq!(feature_distance(&zero, &other), 1.0);
    }

    #[test]
    fn jaccard_distance_cases() {
        let a = token_set("The cat sat");
        let b = token_set("the dog sat");
        // {the, sat} / {the, cat, sat, dog}
        assert!((jaccard_distance(&a, &b) - 0.5).abs() < 1e-12);
        assert_eq!(jaccard_distance(&a, &a), 0.0);
        assert_eq!(jaccard_distance(&token_set(""), &token_set("  ")), 1.0);
    }
}
