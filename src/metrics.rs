//! Prediction counters and latency tracking for the demo server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::prediction::CLUSTER_LABELS;

/// Metrics collector for the prediction endpoint
pub struct PredictionMetrics {
    /// Total successful predictions served
    pub predictions_served: AtomicU64,
    /// Total failed prediction requests
    pub failures: AtomicU64,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Predictions per cluster index
    cluster_counts: RwLock<[u64; CLUSTER_LABELS.len()]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            cluster_counts: RwLock::new([0; CLUSTER_LABELS.len()]),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, processing_time: Duration, cluster: usize) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only recent samples for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut counts) = self.cluster_counts.write() {
            if let Some(count) = counts.get_mut(cluster) {
                *count += 1;
            }
        }
    }

    /// Record a failed prediction request
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get predictions per cluster
    pub fn get_cluster_distribution(&self) -> [u64; CLUSTER_LABELS.len()] {
        *self.cluster_counts.read().unwrap()
    }

    /// Get current throughput (predictions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let served = self.predictions_served.load(Ordering::Relaxed);
        let failed = self.failures.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();
        let distribution = self.get_cluster_distribution();

        info!(
            served = served,
            failed = failed,
            throughput = format!("{:.2}/s", self.get_throughput()),
            "Prediction summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            max_us = processing.max_us,
            "Processing time (us)"
        );

        for (cluster, &count) in distribution.iter().enumerate() {
            if count > 0 {
                let pct = if served > 0 {
                    (count as f64 / served as f64) * 100.0
                } else {
                    0.0
                };
                info!(
                    cluster = cluster,
                    label = CLUSTER_LABELS[cluster],
                    count = count,
                    pct = format!("{:.1}%", pct),
                    "Cluster distribution"
                );
            }
        }
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub max_us: u64,
}

/// Periodic reporter printing metric summaries while the server runs
pub struct MetricsReporter {
    metrics: std::sync::Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick fires immediately; skip it
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
