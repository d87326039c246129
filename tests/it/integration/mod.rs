//! Integration tests for datachat.
//!
//! These tests verify the interaction between multiple components
//! and test complete workflows end-to-end.

mod chat_workflow_tests;
mod data_workflow_tests;
