use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Batch pipeline counters, updated once per batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineMetrics {
    /// Sessions analyzed successfully, across all batches.
    pub sessions_analyzed: u64,
    /// Sessions rejected as structurally invalid, across all batches.
    pub sessions_skipped: u64,
    /// Responses contained in analyzed sessions.
    pub responses_processed: u64,
    /// Duration of the last batch in milliseconds.
    pub last_batch_duration_ms: u64,
    /// Average analysis time per session in the last batch, in microseconds.
    pub last_batch_avg_session_us: f64,
    /// When the last batch completed.
    pub last_run: Option<DateTime<Utc>>,
}

impl PipelineMetrics {
    /// Record one completed batch.
    pub fn record_batch(&mut self, analyzed: u64, skipped: u64, responses: u64, elapsed: Duration) {
        self.sessions_analyzed += analyzed;
        self.sessions_skipped += skipped;
        self.responses_processed += responses;
        self.last_batch_duration_ms = elapsed.as_millis() as u64;
        self.last_batch_avg_session_us = if analyzed > 0 {
            elapsed.as_micros() as f64 / analyzed as f64
        } else {
            0.0
        };
        self.last_run = Some(Utc::now());
    }

    /// Start a scoped timer for one batch.
    pub fn batch_timer(&self) -> BatchTimer {
        BatchTimer {
            start: Instant::now(),
        }
    }
}

/// A scoped timer for batch measurements.
pub struct BatchTimer {
    start: Instant,
}

impl BatchTimer {
    /// Finalize the timer and record metrics.
    pub fn finish(self, metrics: &mut PipelineMetrics, analyzed: u64, skipped: u64, responses: u64) {
        metrics.record_batch(analyzed, skipped, responses, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_metrics_accumulate() {
        let mut m = PipelineMetrics::default();
        m.record_batch(4, 1, 40, Duration::from_millis(20));
        m.record_batch(2, 0, 10, Duration::from_millis(200));

        assert_eq!(m.sessions_analyzed, 6);
        assert_eq!(m.sessions_skipped, 1);
        assert_eq!(m.responses_processed, 50);
        assert_eq!(m.last_batch_duration_ms, 200);
        assert!((m.last_batch_avg_session_us - 100_000.0).abs() < 1e-6);
        assert!(m.last_run.is_some());
    }

    #[test]
    fn empty_batch_has_zero_average() {
        let mut m = PipelineMetrics::default();
        m.record_batch(0, 3, 0, Duration::from_millis(5));
        assert_eq!(m.last_batch_avg_session_us, 0.0);
        assert_eq!(m.sessions_skipped, 3);
    }

    #[test]
    fn timer_records_on_finish() {
        let mut m = PipelineMetrics::default();
        let timer = m.batch_timer();
        timer.finish(&mut m, 1, 0, 3);
        assert_eq!(m.sessions_analyzed, 1);
        assert!(m.last_run.is_some());
    }
}
