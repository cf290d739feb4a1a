pub mod aggregate;
pub mod algorithms;
pub mod extract;
pub mod pipeline;
pub mod similarity;

pub use aggregate::{
    AggregateState, BatchEntry, BatchOverview, ConfidenceInterval, CrossSessionAggregator,
    CrossSessionAnalysis, ModelStats, ProcessingBalance, SignificanceTest,
};
pub use extract::{
    FeatureExtractor, LexiconExtractor, PatternClassifier, RawResponse, RawSession,
    ResponseScorer, SignatureClassifier,
};
pub use pipeline::{
    BatchReport, Pipeline, PipelineMetrics, SessionAnalysis, SessionAnalyzer,
};
pub use similarity::{SimilarityAnalysis, SimilarityEngine};
