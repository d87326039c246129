//! Timing instrumentation.
//!
//! Profiling, chart generation and export run synchronously on the caller's
//! thread, so a slow dataset shows up as a stall. These helpers log any
//! operation that crosses a threshold through `tracing`.
//!
//! ## Usage
//!
//! ```ignore
//! use datachat::perf::ScopedTimer;
//!
//! fn analyze(rows: &[Row]) {
//!     let _timer = ScopedTimer::with_default_threshold("analyze");
//!     // ... work ...
//! }
//! ```

use std::time::Instant;
use tracing::{debug, warn};

/// Default threshold above which an operation is reported as slow
pub const SLOW_OPERATION_MS: f64 = 50.0;

/// A scoped timer that logs its duration on drop when over threshold.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    /// Create a new scoped timer with a warning threshold.
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Create a timer with [`SLOW_OPERATION_MS`] as the threshold.
    pub fn with_default_threshold(name: &'static str) -> Self {
        Self::new(name, SLOW_OPERATION_MS)
    }

    /// Get elapsed time without stopping the timer.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms > self.threshold_ms {
            warn!(
                operation = self.name,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                threshold_ms = format!("{:.2}", self.threshold_ms),
                "Slow operation"
            );
        } else {
            debug!(operation = self.name, elapsed_ms = format!("{:.2}", elapsed_ms));
        }
    }
}

// ============================================================================
// Timing Utilities
// ============================================================================

/// Measure execution time of a closure and return both the result and elapsed time.
#[inline]
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    (result, elapsed_ms)
}

/// Measure execution time and log if it exceeds the threshold.
///
/// # Example
/// ```ignore
/// let rows = measure_and_log("load_dataset", 200.0, || load_dataset(path));
/// ```
#[inline]
pub fn measure_and_log<T, F: FnOnce() -> T>(name: &str, threshold_ms: f64, f: F) -> T {
    let (result, elapsed_ms) = measure(f);
    if elapsed_ms > threshold_ms {
        warn!(
            operation = name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            threshold_ms = format!("{:.2}", threshold_ms),
            "Slow operation"
        );
    }
    result
}
