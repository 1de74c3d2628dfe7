//! Integration tests for the parameter store and catalog
//!
//! Tests are organized by topic:
//! - `store` - Record/metadata bookkeeping and the read surface
//! - `evaluation` - Static and stochastic evaluation
//! - `catalog` - Vehicle catalog construction from raw tables

mod evaluation;
