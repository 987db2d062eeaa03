//! Scrape duration instrumentation.

use std::time::{Duration, Instant};

use crate::metrics::{MetricSample, SCRAPE_DURATION};

/// Collector name used for the base probe.
pub const BASE_COLLECTOR: &str = "base";

/// Timings of one scrape, one entry per (collector, target) execution.
#[derive(Debug, Clone, Default)]
pub struct ScrapeTiming {
    entries: Vec<TimingEntry>,
}

#[derive(Debug, Clone)]
struct TimingEntry {
    collector: &'static str,
    target: String,
    duration: Duration,
}

impl ScrapeTiming {
    /// Runs `f` and records how long it took.
    pub fn time<T>(
        &mut self,
        collector: &'static str,
        target: &str,
        f: impl FnOnce() -> T,
    ) -> T {
        let start = Instant::now();
        let result = f();
        self.record(collector, target, start.elapsed());
        result
    }

    pub fn record(&mut self, collector: &'static str, target: &str, duration: Duration) {
        self.entries.push(TimingEntry {
            collector,
            target: target.to_string(),
            duration,
        });
    }

    /// Sum of all recorded durations.
    pub fn total(&self) -> Duration {
        self.entries.iter().map(|e| e.duration).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the timings into `arista_scrape_duration_seconds` samples.
    pub fn into_samples(self) -> Vec<MetricSample> {
        self.entries
            .into_iter()
            .map(|e| {
                MetricSample::gauge(
                    &SCRAPE_DURATION,
                    [e.collector.to_string(), e.target],
                    e.duration.as_secs_f64(),
                )
            })
            .collect()
    }
}
