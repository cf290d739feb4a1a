use serde::{Deserialize, Serialize};
use tide_core::{FactorGroup, FeatureVector, SessionRecord};

use crate::algorithms::descriptive::{finite_or_zero, l2_norm};

/// Change in mean factor-group scores between two consecutive responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionalShift {
    /// `"<task before> → <task after>"`.
    pub transition: String,
    #[serde(rename = "internal_Δ", alias = "internal_delta")]
    pub internal_delta: f64,
    #[serde(rename = "external_Δ", alias = "external_delta")]
    pub external_delta: f64,
    #[serde(rename = "concrete_Δ", alias = "concrete_delta")]
    pub concrete_delta: f64,
    /// `"<pattern before> → <pattern after>"`.
    pub pattern_change: String,
}

impl DimensionalShift {
    pub fn delta(&self, group: FactorGroup) -> f64 {
        match group {
            FactorGroup::Internal => self.internal_delta,
            FactorGroup::External => self.external_delta,
            FactorGroup::Concrete => self.concrete_delta,
        }
    }

    /// Euclidean norm of the (internal, external, concrete) delta triple.
    pub fn magnitude(&self) -> f64 {
        finite_or_zero(l2_norm(&[
            self.internal_delta,
            self.external_delta,
            self.concrete_delta,
        ]))
    }
}

/// `mean(after[group]) - mean(before[group])`, missing features as 0.
pub fn factor_shift(before: &FeatureVector, after: &FeatureVector, group: FactorGroup) -> f64 {
    finite_or_zero(after.group_mean(group) - before.group_mean(group))
}

/// One shift per adjacent pair of responses in canonical task order.
pub fn compute_dimensional_shifts(session: &SessionRecord) -> Vec<DimensionalShift> {
    let flat = session.flatten_canonical();
    flat.windows(2)
        .map(|pair| {
            let (before_task, before) = pair[0];
            let (after_task, after) = pair[1];
            DimensionalShift {
                transition: format!("{} → {}", before_task, after_task),
                internal_delta: factor_shift(&before.features, &after.features, FactorGroup::Internal),
                external_delta: factor_shift(&before.features, &after.features, FactorGroup::External),
                concrete_delta: factor_shift(&before.features, &after.features, FactorGroup::Concrete),
                pattern_change: format!("{} → {}", before.pattern, after.pattern),
            }
        })
        .collect()
}
