//! Vehicle life-cycle parameter library
//!
//! This crate stores named vehicle parameters (masses, efficiencies,
//! emission factors, costs) together with their uncertainty and evaluates
//! them either as deterministic point estimates or as Monte Carlo samples.
//! It supports:
//! - Point, uniform, triangular, normal, lognormal and discrete uniform families
//! - Static evaluation via the distribution median, memoized per record
//! - Joint stochastic evaluation over all parameters from one RNG stream
//! - Separation of uncertainty fields from descriptive metadata
//! - A vehicle catalog deriving sizes, powertrains, names and years
//!
//! # Example
//!
//! ```ignore
//! use carculator_core::{NamedParameters, ParameterRecord};
//!
//! let mut params = NamedParameters::with_parameters([
//!     ("mass", ParameterRecord::point(1200.0)),
//!     ("efficiency", ParameterRecord::uniform(0.2, 0.4)),
//! ]);
//! params.static_values()?;
//! let mass = params.get("mass")?;
//! params.stochastic(1000)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod catalog;
pub mod distribution;
pub mod error;
pub mod store;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use catalog::{ParameterSource, RawParameterTable, VehicleInputParameters, load_parameters};
pub use distribution::Distribution;
pub use error::{ParameterError, Result};
pub use model::{
    Metadata, ParameterInput, ParameterKind, ParameterRecord, ParameterValue, UncertaintyType,
};
pub use store::{DEFAULT_ITERATIONS, NamedParameters};
