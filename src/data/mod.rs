//! Data loading, profiling and transformation
//!
//! This module turns uploaded files into rows and provides the client-side
//! utilities that run over them before anything is sent to the model or
//! exported.
//!
//! ## Components
//!
//! - `csv_parser` / `json_parser` / `loader`: file input
//! - `profile`: type inference, validation, duplicate detection
//! - `aggregate`: group-by with sum/avg/count/min/max
//! - `query` / `index`: search, filter, sort, paginate, inverted index
//! - `chart_engine`: chart-ready series, chart suggestions, insights
//!
//! ## Error Handling
//!
//! Fallible operations return `DataResult<T>` with the `DataError` type, so
//! callers can tell "no data" (an empty `Ok`) from a computation error.

mod aggregate;
mod chart_engine;
mod csv_parser;
mod error;
mod index;
mod json_parser;
mod loader;
mod profile;
mod query;

pub use aggregate::*;
pub use chart_engine::*;
pub use csv_parser::*;
pub use error::*;
pub use index::*;
pub use json_parser::*;
pub use loader::*;
pub use profile::*;
pub use query::*;
