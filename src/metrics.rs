//! Metrics module for the secretsmanager library
//!
//! This module provides a metrics interface for collecting and reporting performance metrics.
//! By default, metrics are disabled and use a no-op implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

// Global flag to check if metrics are enabled
static METRICS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Metrics provider interface
pub trait MetricsProvider: Send + Sync {
    /// Records a counter increment
    fn increment_counter(&self, name: &str, value: u64);

    /// Records a timer duration
    fn record_timer(&self, name: &str, duration: Duration);
}

/// A no-op metrics provider that discards all metrics
#[derive(Debug, Default)]
pub struct NoopMetricsProvider;

impl NoopMetricsProvider {
    /// Create a boxed instance ready for use with set_metrics_provider
    pub fn boxed() -> Box<dyn MetricsProvider> {
        Box::new(Self)
    }
}

impl MetricsProvider for NoopMetricsProvider {
    fn increment_counter(&self, _name: &str, _value: u64) {}
    fn record_timer(&self, _name: &str, _duration: Duration) {}
}

/// Writes every metric through the `log` facade at debug level
#[derive(Debug, Default)]
pub struct LogMetricsProvider;

impl LogMetricsProvider {
    /// Create a boxed instance ready for use with set_metrics_provider
    pub fn boxed() -> Box<dyn MetricsProvider> {
        Box::new(Self)
    }
}

impl MetricsProvider for LogMetricsProvider {
    fn increment_counter(&self, name: &str, value: u64) {
        log::debug!("METRIC counter: {} += {}", name, value);
    }

    fn record_timer(&self, name: &str, duration: Duration) {
        log::debug!("METRIC timer: {} = {:?}", name, duration);
    }
}

// Global metrics provider
static METRICS_PROVIDER: RwLock<Option<Box<dyn MetricsProvider>>> = RwLock::new(None);

/// Set the metrics provider for the secretsmanager library
pub fn set_metrics_provider(provider: Box<dyn MetricsProvider>) {
    if let Ok(mut global_provider) = METRICS_PROVIDER.write() {
        *global_provider = Some(provider);
        METRICS_ENABLED.store(true, Ordering::SeqCst);
    }
}

/// Disable metrics collection
pub fn disable_metrics() {
    if let Ok(mut global_provider) = METRICS_PROVIDER.write() {
        *global_provider = None;
    }
    METRICS_ENABLED.store(false, Ordering::SeqCst);
}

/// Check if metrics are enabled
pub fn metrics_enabled() -> bool {
    METRICS_ENABLED.load(Ordering::SeqCst)
}

/// Increment a counter metric
pub fn increment_counter(name: &str, value: u64) {
    if metrics_enabled() {
        if let Ok(provider) = METRICS_PROVIDER.read() {
            if let Some(provider) = provider.as_ref() {
                provider.increment_counter(name, value);
            }
        }
    }
}

/// Record a timer metric
pub fn record_timer(name: &str, duration: Duration) {
    if metrics_enabled() {
        if let Ok(provider) = METRICS_PROVIDER.read() {
            if let Some(provider) = provider.as_ref() {
                provider.record_timer(name, duration);
            }
        }
    }
}

/// Timer for measuring and recording operation duration
#[derive(Debug)]
pub struct Timer {
    /// Name of the timer metric
    name: &'static str,

    /// Start time of the operation
    start: Instant,
}

impl Timer {
    /// Create a new timer with the given name
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed time
    pub fn observe_duration(&self) {
        record_timer(self.name, self.start.elapsed());
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.observe_duration();
    }
}

/// Macro for creating a timer that records when dropped
#[macro_export]
macro_rules! timer {
    ($name:expr) => {{
        if $crate::metrics::metrics_enabled() {
            Some($crate::metrics::Timer::new($name))
        } else {
            None
        }
    }};
}
