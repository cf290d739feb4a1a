//! Mergeable partial aggregate over batch entries.
//!
//! Only sums, counts, ordered sample lists and first-seen maps live here, so
//! `merge` is associative and partial states from disjoint slices of a batch
//! can be combined in any grouping. Confidence intervals, the dominant mode,
//! the I/E balance and the significance test are derived in `finish`.

use indexmap::IndexMap;

use tide_core::{AnalysisConfig, FactorGroup};

use crate::algorithms::descriptive::{finite_or_zero, mean};
use crate::pipeline::patterns::first_max_key;

use super::overview::OverviewState;
use super::stats::{
    dominant_group, ConfidenceInterval, ModelStats, ProcessingBalance, SignificanceTest,
    StatisticalTests,
};
use super::{BatchEntry, CrossSessionAnalysis, NO_CLEAR_PATTERN};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SumCount {
    pub sum: f64,
    pub count: u64,
}

impl SumCount {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn add(&mut self, other: SumCount) {
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            finite_or_zero(self.sum / self.count as f64)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ModelAccumulator {
    coherence_scores: Vec<f64>,
    pattern_diversity: Vec<usize>,
    sessions: usize,
    responses: usize,
}

/// Partial cross-session aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateState {
    total_sessions: usize,
    coherence: SumCount,
    shift_magnitude: SumCount,
    transitions: IndexMap<String, u64>,
    models: IndexMap<String, ModelAccumulator>,
    /// Group means of every individual response, indexed like `FactorGroup::ALL`.
    group_scores: [SumCount; 3],
    internal_large: SumCount,
    external_large: SumCount,
    overview: OverviewState,
}

impl AggregateState {
    /// Partial state of a single entry. `balance_threshold` filters which
    /// shift deltas count toward the I/E balance.
    pub fn from_entry(entry: &BatchEntry, config: &AnalysisConfig) -> Self {
        let analysis = &entry.analysis;
        let mut state = Self {
            total_sessions: 1,
            ..Self::default()
        };

        state.coherence.push(analysis.coherence_score);

        for shift in &analysis.dimensional_shifts {
            state.shift_magnitude.push(shift.magnitude());
            let internal = shift.delta(FactorGroup::Internal).abs();
            if internal > config.balance_threshold {
                state.internal_large.push(internal);
            }
            let external = shift.delta(FactorGroup::External).abs();
            if external > config.balance_threshold {
                state.external_large.push(external);
            }
        }

        for (transition, count) in &analysis.pattern_evolution.transition_frequencies {
            *state.transitions.entry(transition.clone()).or_insert(0) += count;
        }

        for (_, response) in entry.data.flatten_stored() {
            for (slot, group) in state.group_scores.iter_mut().zip(FactorGroup::ALL) {
                slot.push(response.features.group_mean(group));
            }
        }

        state.models.insert(
            entry.model.clone(),
            ModelAccumulator {
                coherence_scores: vec![analysis.coherence_score],
                pattern_diversity: vec![analysis.pattern_evolution.pattern_diversity],
                sessions: 1,
                responses: entry.data.response_count(),
            },
        );

        state.overview = OverviewState::from_session(&entry.data);
        state
    }

    /// Combine `other` (later entries) into `self` (earlier entries).
    pub fn merge(mut self, other: Self) -> Self {
        self.total_sessions += other.total_sessions;
        self.coherence.add(other.coherence);
        self.shift_magnitude.add(other.shift_magnitude);
        for (t, c) in other.transitions {
            *self.transitions.entry(t).or_insert(0) += c;
        }
        for (model, acc) in other.models {
            let mine = self.models.entry(model).or_default();
            mine.coherence_scores.extend(acc.coherence_scores);
            mine.pattern_diversity.extend(acc.pattern_diversity);
            mine.sessions += acc.sessions;
            mine.responses += acc.responses;
        }
        for (mine, theirs) in self.group_scores.iter_mut().zip(other.group_scores) {
            mine.add(theirs);
        }
        self.internal_large.add(other.internal_large);
        self.external_large.add(other.external_large);
        self.overview = self.overview.merge(other.overview);
        self
    }

    pub fn total_sessions(&self) -> usize {
        self.total_sessions
    }

    pub fn average_coherence(&self) -> f64 {
        self.coherence.mean()
    }

    pub fn average_shift_magnitude(&self) -> f64 {
        self.shift_magnitude.mean()
    }

    pub fn dominant_pattern_transition(&self) -> String {
        first_max_key(&self.transitions)
            .unwrap_or(NO_CLEAR_PATTERN)
            .to_string()
    }

    pub fn per_model_stats(&self) -> IndexMap<String, ModelStats> {
        self.models
            .iter()
            .map(|(model, acc)| {
                let diversity: Vec<f64> = acc.pattern_diversity.iter().map(|d| *d as f64).collect();
                let stats = ModelStats {
                    coherence_scores: acc.coherence_scores.clone(),
                    pattern_diversity: acc.pattern_diversity.clone(),
                    avg_coherence: finite_or_zero(mean(&acc.coherence_scores).unwrap_or(0.0)),
                    avg_diversity: finite_or_zero(mean(&diversity).unwrap_or(0.0)),
                    sessions: acc.sessions,
                    responses: acc.responses,
                };
                (model.clone(), stats)
            })
            .collect()
    }

    pub fn confidence_intervals(&self, config: &AnalysisConfig) -> IndexMap<String, ConfidenceInterval> {
        self.models
            .iter()
            .filter(|(_, acc)| acc.coherence_scores.len() >= config.min_group_samples)
            .filter_map(|(model, acc)| {
                ConfidenceInterval::student_t(&acc.coherence_scores, config.confidence_level)
                    .map(|ci| (model.clone(), ci))
            })
            .collect()
    }

    /// Factor group with the highest mean over every response in the batch.
    pub fn dominant_processing_mode(&self) -> FactorGroup {
        let means: Vec<(FactorGroup, f64)> = FactorGroup::ALL
            .iter()
            .zip(self.group_scores.iter())
            .map(|(g, s)| (*g, s.mean()))
            .collect();
        dominant_group(&means)
    }

    pub fn internal_external_balance(&self, config: &AnalysisConfig) -> ProcessingBalance {
        ProcessingBalance::classify(
            self.internal_large.mean(),
            self.external_large.mean(),
            config.balance_ratio,
        )
    }

    pub fn significance_test(&self, config: &AnalysisConfig) -> Option<SignificanceTest> {
        let groups: Vec<(&str, &[f64])> = self
            .models
            .iter()
            .map(|(m, acc)| (m.as_str(), acc.coherence_scores.as_slice()))
            .collect();
        SignificanceTest::anova(&groups, config.min_group_samples, config.significance_alpha)
    }

    /// Models by average coherence, descending; ties keep first-seen order.
    pub fn model_rankings(&self) -> Vec<String> {
        let mut ranked: Vec<(&str, f64)> = self
            .models
            .iter()
            .map(|(m, acc)| (m.as_str(), finite_or_zero(mean(&acc.coherence_scores).unwrap_or(0.0))))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().map(|(m, _)| m.to_string()).collect()
    }

    pub fn finish(self, config: &AnalysisConfig) -> CrossSessionAnalysis {
        CrossSessionAnalysis {
            total_sessions: self.total_sessions,
            models_tested: self.models.keys().cloned().collect(),
            avg_pattern_coherence: self.average_coherence(),
            dimensional_shift_magnitude: self.average_shift_magnitude(),
            pattern_evolution: self.dominant_pattern_transition(),
            model_comparisons: self.per_model_stats(),
            confidence_intervals: self.confidence_intervals(config),
            model_rankings: self.model_rankings(),
            dominant_mode: self.dominant_processing_mode(),
            ie_balance: self.internal_external_balance(config),
            statistical_tests: StatisticalTests {
                anova: self.significance_test(config),
            },
            overview: self.overview.finish(),
        }
    }
}
