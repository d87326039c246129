//! datachat: profile tabular data, ask a language model about it, and export
//! the answers.
//!
//! ## Layout
//!
//! - [`data`]: loading, type inference, validation, aggregation, querying and
//!   chart-data generation
//! - [`export`]: markdown and row exports to text, CSV, RTF and PNG
//! - [`ai`]: completion client, prompts, retry helper and chat session
//! - [`settings`]: persisted user settings over a pluggable key/value store
//! - [`notifications`]: toast queue used by exports and settings

pub mod ai;
pub mod constants;
pub mod data;
pub mod export;
pub mod logging;
pub mod notifications;
pub mod perf;
pub mod settings;
pub mod types;
