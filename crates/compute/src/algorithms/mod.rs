//! Numeric building blocks shared by the session pipeline and the aggregator.

pub mod anova;
pub mod correlation;
pub mod descriptive;
pub mod distributions;
pub mod similarity;
