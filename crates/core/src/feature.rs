use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TideError;

/// One of the 14 canonical semantic features.
///
/// Declaration order is the canonical vectorization order: every dense
/// representation of a [`FeatureVector`] lays features out in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    Social,
    Emotion,
    Polarity,
    Morality,
    Thought,
    SelfMotion,
    Space,
    Time,
    Number,
    Visual,
    Color,
    Auditory,
    SmellTaste,
    Tactile,
}

impl FeatureName {
    pub const ALL: [FeatureName; 14] = [
        FeatureName::Social,
        FeatureName::Emotion,
        FeatureName::Polarity,
        FeatureName::Morality,
        FeatureName::Thought,
        FeatureName::SelfMotion,
        FeatureName::Space,
        FeatureName::Time,
        FeatureName::Number,
        FeatureName::Visual,
        FeatureName::Color,
        FeatureName::Auditory,
        FeatureName::SmellTaste,
        FeatureName::Tactile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::Social => "social",
            FeatureName::Emotion => "emotion",
            FeatureName::Polarity => "polarity",
            FeatureName::Morality => "morality",
            FeatureName::Thought => "thought",
            FeatureName::SelfMotion => "self_motion",
            FeatureName::Space => "space",
            FeatureName::Time => "time",
            FeatureName::Number => "number",
            FeatureName::Visual => "visual",
            FeatureName::Color => "color",
            FeatureName::Auditory => "auditory",
            FeatureName::SmellTaste => "smell_taste",
            FeatureName::Tactile => "tactile",
        }
    }

    /// The factor group this feature belongs to.
    pub fn group(&self) -> FactorGroup {
        match self {
            FeatureName::Social
            | FeatureName::Emotion
            | FeatureName::Polarity
            | FeatureName::Morality
            | FeatureName::Thought
            | FeatureName::SelfMotion => FactorGroup::Internal,
            FeatureName::Space | FeatureName::Time | FeatureName::Number => FactorGroup::External,
            FeatureName::Visual
            | FeatureName::Color
            | FeatureName::Auditory
            | FeatureName::SmellTaste
            | FeatureName::Tactile => FactorGroup::Concrete,
        }
    }
}

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = TideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureName::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| TideError::UnknownFeature(s.to_string()))
    }
}

/// Partition of the canonical features into three processing dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorGroup {
    Internal,
    External,
    Concrete,
}

const INTERNAL_FEATURES: [FeatureName; 6] = [
    FeatureName::Social,
    FeatureName::Emotion,
    FeatureName::Polarity,
    FeatureName::Morality,
    FeatureName::Thought,
    FeatureName::SelfMotion,
];

const EXTERNAL_FEATURES: [FeatureName; 3] =
    [FeatureName::Space, FeatureName::Time, FeatureName::Number];

const CONCRETE_FEATURES: [FeatureName; 5] = [
    FeatureName::Visual,
    FeatureName::Color,
    FeatureName::Auditory,
    FeatureName::SmellTaste,
    FeatureName::Tactile,
];

impl FactorGroup {
    /// Groups in reporting order. Ties between group scores resolve to the
    /// earliest entry.
    pub const ALL: [FactorGroup; 3] = [
        FactorGroup::Internal,
        FactorGroup::External,
        FactorGroup::Concrete,
    ];

    pub fn features(&self) -> &'static [FeatureName] {
        match self {
            FactorGroup::Internal => &INTERNAL_FEATURES,
            FactorGroup::External => &EXTERNAL_FEATURES,
            FactorGroup::Concrete => &CONCRETE_FEATURES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactorGroup::Internal => "internal",
            FactorGroup::External => "external",
            FactorGroup::Concrete => "concrete",
        }
    }
}

impl std::fmt::Display for FactorGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sparse feature scores for one response.
///
/// Lookups of absent features read as `0.0`. Unknown names in serialized
/// input are dropped on load, so the key space is always a subset of
/// [`FeatureName::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct FeatureVector {
    values: BTreeMap<FeatureName, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: FeatureName, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: FeatureName, value: f64) {
        self.values.insert(name, value);
    }

    /// Score for `name`, `0.0` when absent.
    pub fn get(&self, name: FeatureName) -> f64 {
        self.values.get(&name).copied().unwrap_or(0.0)
    }

    /// Score for `name` only when the response actually recorded it.
    pub fn recorded(&self, name: FeatureName) -> Option<f64> {
        self.values.get(&name).copied()
    }

    pub fn contains(&self, name: FeatureName) -> bool {
        self.values.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Recorded features in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Mean score over every feature of `group`, missing features counted as 0.
    pub fn group_mean(&self, group: FactorGroup) -> f64 {
        let features = group.features();
        features.iter().map(|f| self.get(*f)).sum::<f64>() / features.len() as f64
    }

    /// Dense 14-element representation in canonical order.
    pub fn to_dense(&self) -> [f64; 14] {
        let mut dense = [0.0; 14];
        for (slot, name) in dense.iter_mut().zip(FeatureName::ALL) {
            *slot = self.get(name);
        }
        dense
    }

    /// True when every recorded score is zero (or nothing is recorded).
    pub fn is_zero(&self) -> bool {
        self.values.values().all(|v| *v == 0.0)
    }
}

impl From<HashMap<String, f64>> for FeatureVector {
    fn from(raw: HashMap<String, f64>) -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            match key.parse::<FeatureName>() {
                Ok(name) => {
                    values.insert(name, value);
                }
                Err(_) => tracing::debug!(feature = %key, "dropping unknown feature"),
            }
        }
        Self { values }
    }
}

impl From<FeatureVector> for BTreeMap<String, f64> {
    fn from(fv: FeatureVector) -> Self {
        fv.values
            .into_iter()
            .map(|(k, v)| (k.as_str().to_string(), v))
            .collect()
    }
}

impl FromIterator<(FeatureName, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (FeatureName, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_partition_all_features() {
        let total: usize = FactorGroup::ALL.iter().map(|g| g.features().len()).sum();
        assert_eq!(total, 14);
        for name in FeatureName::ALL {
            assert!(name.group().features().contains(&name));
        }
    }

    #[test]
    fn missing_feature_reads_zero() {
        let fv = FeatureVector::new().with(FeatureName::Social, 0.4);
        assert_eq!(fv.get(FeatureName::Social), 0.4);
        assert_eq!(fv.get(FeatureName::Tactile), 0.0);
        assert_eq!(fv.recorded(FeatureName::Tactile), None);
    }

    #[test]
    fn group_mean_divides_by_group_size() {
        let fv = FeatureVector::new()
            .with(FeatureName::Space, 0.3)
            .with(FeatureName::Time, 0.6);
        assert!((fv.group_mean(FactorGroup::External) - 0.3).abs() < 1e-12);
        assert_eq!(fv.group_mean(FactorGroup::Concrete), 0.0);
    }

    #[test]
    fn deserialize_drops_unknown_names() {
        let fv: FeatureVector =
            serde_json::from_str(r#"{"social": 0.5, "smell_taste": 0.2, "bogus": 9.0}"#).unwrap();
        assert_eq!(fv.len(), 2);
        assert_eq!(fv.get(FeatureName::SmellTaste), 0.2);
    }

    #[test]
    fn serializes_with_snake_case_names() {
        let fv = FeatureVector::new().with(FeatureName::SelfMotion, 1.0);
        let json = serde_json::to_string(&fv).unwrap();
        assert_eq!(json, r#"{"self_motion":1.0}"#);
    }

    #[test]
    fn dense_layout_is_canonical() {
        let fv = FeatureVector::new()
            .with(FeatureName::Social, 1.0)
            .with(FeatureName::Tactile, 2.0);
        let dense = fv.to_dense();
        assert_eq!(dense[0], 1.0);
        assert_eq!(dense[13], 2.0);
        assert_eq!(dense.iter().sum::<f64>(), 3.0);
    }
}
