//! Unit tests for datachat.

mod ai_client_tests;
mod export_tests;
mod notifications_tests;
mod perf_tests;
mod profile_tests;
mod query_tests;
mod settings_tests;
mod snapshot_tests;
