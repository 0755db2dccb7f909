//! High Five sales report
//!
//! Loads the High Five product-tracking sheet, normalizes its loosely typed
//! columns and computes the dashboard metrics: win/lose rates per product
//! category, product breakdowns and account-manager rollups.
//!
//! Every aggregation is a pure function of a `Table` and its explicit
//! parameters; nothing is cached between calls.

pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod source;
pub mod types;
pub mod util;

pub use error::{AggregationError, LoadError};
pub use loader::{load, load_and_clean, parse_table, LoadReport};
pub use types::{Table, Value, WinLose, Witel};
