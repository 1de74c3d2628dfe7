//! Command-line front end for the vehicle parameter library
//!
//! Loads a default-parameter table, builds the vehicle catalog, evaluates it
//! statically or stochastically and prints a summary.

pub mod logging;
pub mod summary;

pub use logging::init_logging;
pub use summary::{PercentileSet, render};
