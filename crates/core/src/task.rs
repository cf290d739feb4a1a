use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TideError;
use crate::feature::FactorGroup;

/// Category of prompt a response was collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Concrete,
    Internal,
    External,
}

impl TaskType {
    /// Flattening order used for shift, trajectory and pattern sequencing.
    ///
    /// Fixed regardless of the order tasks were collected in.
    pub const CANONICAL_ORDER: [TaskType; 3] =
        [TaskType::Concrete, TaskType::Internal, TaskType::External];

    /// The factor group a response to this task is expected to activate.
    pub fn expected_group(&self) -> FactorGroup {
        match self {
            TaskType::Concrete => FactorGroup::Concrete,
            TaskType::Internal => FactorGroup::Internal,
            TaskType::External => FactorGroup::External,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Concrete => "concrete",
            TaskType::Internal => "internal",
            TaskType::External => "external",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = TideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concrete" => Ok(TaskType::Concrete),
            "internal" => Ok(TaskType::Internal),
            "external" => Ok(TaskType::External),
            other => Err(TideError::UnknownTaskType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_concrete_internal_external() {
        let names: Vec<&str> = TaskType::CANONICAL_ORDER.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["concrete", "internal", "external"]);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Internal".parse::<TaskType>().unwrap(), TaskType::Internal);
        assert!("abstract".parse::<TaskType>().is_err());
    }

    #[test]
    fn expected_group_matches_name() {
        for task in TaskType::CANONICAL_ORDER {
            assert_eq!(task.as_str(), task.expected_group().as_str());
        }
    }
}
