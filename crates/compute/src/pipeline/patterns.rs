use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tide_core::{SessionRecord, TaskType};

/// Label reported when a session has no patterns at all.
pub const NO_DOMINANT_PATTERN: &str = "None";

/// One pattern label in flattened session order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternObservation {
    pub pattern: String,
    pub task: TaskType,
}

/// How pattern labels evolve through one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEvolution {
    pub all_patterns: Vec<PatternObservation>,
    /// `"p → q"` for every adjacent pair.
    pub transitions: Vec<String>,
    /// Transition counts in first-seen order.
    pub transition_frequencies: IndexMap<String, u64>,
    /// Pattern counts in first-seen order.
    #[serde(default)]
    pub pattern_counts: IndexMap<String, u64>,
    pub dominant_pattern: String,
    pub pattern_diversity: usize,
}

/// Key with the highest count; ties go to the key seen first.
pub(crate) fn first_max_key(counts: &IndexMap<String, u64>) -> Option<&str> {
    let mut best: Option<(&str, u64)> = None;
    for (key, count) in counts {
        match best {
            Some((_, c)) if *count <= c => {}
            _ => best = Some((key.as_str(), *count)),
        }
    }
    best.map(|(k, _)| k)
}

pub(crate) fn count_in_order<'a, I>(items: I) -> IndexMap<String, u64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for item in items {
        *counts.entry(item.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Pattern transitions, histogram and dominant label in canonical task order.
pub fn analyze_pattern_evolution(session: &SessionRecord) -> PatternEvolution {
    let all_patterns: Vec<PatternObservation> = session
        .flatten_canonical()
        .into_iter()
        .map(|(task, r)| PatternObservation {
            pattern: r.pattern.clone(),
            task,
        })
        .collect();

    let transitions: Vec<String> = all_patterns
        .windows(2)
        .map(|w| format!("{} → {}", w[0].pattern, w[1].pattern))
        .collect();

    let transition_frequencies = count_in_order(transitions.iter().map(String::as_str));
    let pattern_counts = count_in_order(all_patterns.iter().map(|p| p.pattern.as_str()));

    let dominant_pattern = first_max_key(&pattern_counts)
        .unwrap_or(NO_DOMINANT_PATTERN)
        .to_string();
    let pattern_diversity = pattern_counts.len();

    PatternEvolution {
        all_patterns,
        transitions,
        transition_frequencies,
        pattern_counts,
        dominant_pattern,
        pattern_diversity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{response, session_with};

    #[test]
    fn transitions_and_counts() {
        let session = session_with(vec![
            (TaskType::Internal, response("AAFS", &[])),
            (TaskType::Concrete, response("CCDS", &[])),
            (TaskType::Concrete, response("CCDC", &[])),
            (TaskType::External, response("CCDS", &[])),
        ]);
        let evo = analyze_pattern_evolution(&session);

        let stream: Vec<&str> = evo.all_patterns.iter().map(|p| p.pattern.as_str()).collect();
        assert_eq!(stream, vec!["CCDS", "CCDC", "AAFS", "CCDS"]);
        assert_eq!(evo.all_patterns[2].task, TaskType::Internal);
        assert_eq!(
            evo.transitions,
            vec!["CCDS → CCDC", "CCDC → AAFS", "AAFS → CCDS"]
        );
        assert_eq!(evo.transition_frequencies.len(), 3);
        assert_eq!(evo.pattern_counts["CCDS"], 2);
        assert_eq!(evo.dominant_pattern, "CCDS");
        assert_eq!(evo.pattern_diversity, 3);
    }

    #[test]
    fn tie_breaks_on_first_seen() {
        let session = session_with(vec![
            (TaskType::Concrete, response("BBBB", &[])),
            (TaskType::Concrete, response("AAAA", &[])),
            (TaskType::Concrete, response("AAAA", &[])),
            (TaskType::Concrete, response("BBBB", &[])),
        ]);
        assert_eq!(analyze_pattern_evolution(&session).dominant_pattern, "BBBB");
    }

    #[test]
    fn identical_labels_have_diversity_one() {
        let session = session_with(vec![
            (TaskType::Concrete, response("CCDS", &[])),
            (TaskType::Internal, response("CCDS", &[])),
            (TaskType::External, response("CCDS", &[])),
        ]);
        let evo = analyze_pattern_evolution(&session);
        assert_eq!(evo.pattern_diversity, 1);
        assert_eq!(evo.transition_frequencies["CCDS → CCDS"], 2);
    }

    #[test]
    fn empty_session() {
        let session = session_with(vec![]);
        let evo = analyze_pattern_evolution(&session);
        assert_eq!(evo.dominant_pattern, NO_DOMINANT_PATTERN);
        assert_eq!(evo.pattern_diversity, 0);
        assert!(evo.transitions.is_empty());
    }
}
