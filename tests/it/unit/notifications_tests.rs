//! Unit tests for notifications module.

use datachat::notifications::{Toast, ToastManager, ToastVariant};
use std::time::Duration;

#[test]
fn test_toast_creation() {
    let toast = Toast::success("Test message");
    assert_eq!(toast.message, "Test message");
    assert_eq!(toast.variant, ToastVariant::Success);
    assert_eq!(toast.duration, Duration::from_secs(3));
}

#[test]
fn test_toast_manager() {
    let mut manager = ToastManager::new();
    assert_eq!(manager.count(), 0);

    manager.push(Toast::success("Message 1"));
    assert_eq!(manager.count(), 1);

    manager.push(Toast::error("Message 2"));
    assert_eq!(manager.count(), 2);
    assert_eq!(manager.latest().unwrap().message, "Message 2");

    manager.clear();
    assert_eq!(manager.count(), 0);
}

#[test]
fn test_toast_not_immediately_expired() {
    let toast = Toast::success("Test").with_duration(Duration::from_secs(10));
    assert!(!toast.is_expired(), "Fresh toast should not be expired");
}

#[test]
fn test_toast_remaining_percent_fresh() {
    let toast = Toast::success("Test").with_duration(Duration::from_secs(10));
    assert!(toast.remaining_percent() > 0.99, "Fresh toast should have ~100% remaining");
}

#[test]
fn test_zero_duration_toast_is_expired() {
    let toast = Toast::info("gone").with_duration(Duration::ZERO);
    assert!(toast.is_expired());
    assert_eq!(toast.remaining_percent(), 0.0);
}

#[test]
fn test_prune_expired_keeps_live_toasts() {
    let mut manager = ToastManager::new();
    manager.push(Toast::info("gone").with_duration(Duration::ZERO));
    manager.push(Toast::warning("stays"));

    assert_eq!(manager.prune_expired(), 1);
    assert_eq!(manager.count(), 1);
    assert_eq!(manager.toasts()[0].message, "stays");
}

#[test]
fn test_variant_durations() {
    assert_eq!(ToastVariant::Success.default_duration(), Duration::from_secs(3));
    assert_eq!(ToastVariant::Info.default_duration(), Duration::from_secs(3));
    assert_eq!(ToastVariant::Warning.default_duration(), Duration::from_secs(4));
    assert_eq!(ToastVariant::Error.default_duration(), Duration::from_secs(5));
}

#[test]
fn test_variant_icons() {
    assert_eq!(ToastVariant::Success.icon(), "✓");
    assert_eq!(ToastVariant::Error.icon(), "✗");
    assert_eq!(ToastVariant::Info.icon(), "ℹ");
    assert_eq!(ToastVariant::Warning.icon(), "⚠");
    assert_eq!(Toast::error("Export failed").display_line(), "✗ Export failed");
}

#[test]
fn test_toast_manager_remove_and_drain() {
    let mut manager = ToastManager::new();

    manager.push(Toast::success("Toast 1"));
    manager.push(Toast::info("Toast 2"));
    manager.push(Toast::warning("Toast 3"));
    assert_eq!(manager.count(), 3);

    let toast_id = manager.toasts()[1].id;
    manager.remove(toast_id);
    assert_eq!(manager.count(), 2);

    let drained = manager.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].message, "Toast 1");
    assert_eq!(manager.count(), 0);
}

#[test]
fn test_toast_ids_are_unique() {
    let a = Toast::success("a");
    let b = Toast::success("b");
    assert_ne!(a.id, b.id);
}
