//! Unit tests for perf module.

use datachat::perf::{ScopedTimer, SLOW_OPERATION_MS, measure, measure_and_log};

#[test]
fn test_scoped_timer_creation() {
    // Threshold is high, so dropping only logs at debug level
    let timer = ScopedTimer::new("test_op", 1000.0);
    assert_eq!(timer.name(), "test_op");
    assert!(timer.elapsed_ms() >= 0.0);
}

#[test]
fn test_default_threshold_timer() {
    let timer = ScopedTimer::with_default_threshold("profile");
    assert!(timer.elapsed_ms() < SLOW_OPERATION_MS);
}

#[test]
fn test_measure_returns_result() {
    let (sum, elapsed) = measure(|| (1..=100).sum::<u32>());
    assert_eq!(sum, 5050);
    assert!(elapsed >= 0.0);
}

#[test]
fn test_measure_and_log_passes_value_through() {
    // A zero threshold forces the slow path
    let value = measure_and_log("tiny", 0.0, || "done");
    assert_eq!(value, "done");
}
