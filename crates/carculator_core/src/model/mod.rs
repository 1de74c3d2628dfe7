//! Parameter records and the values they evaluate to

mod record;
mod uncertainty;

pub use record::{Metadata, ParameterInput, ParameterRecord, ParameterValue, UNCERTAINTY_FIELDS};
pub use uncertainty::{ParameterKind, UncertaintyType};
