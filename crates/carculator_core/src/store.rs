//! Named parameter store
//!
//! [`NamedParameters`] keeps parameter definitions (records and metadata)
//! apart from the values computed from them. Values only appear after
//! [`NamedParameters::static_values`] or [`NamedParameters::stochastic`],
//! and every evaluation replaces the whole value map.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::distribution::{Distribution, sample_batch};
use crate::error::{ParameterError, Result};
use crate::model::{Metadata, ParameterInput, ParameterRecord, ParameterValue};

/// Sample count used by [`NamedParameters::stochastic`] callers that have no
/// better number
pub const DEFAULT_ITERATIONS: usize = 1000;

const NO_VALUES_WARNING: &str = "no calculated values found; run `static` or `stochastic` first";

#[derive(Debug, Clone, Default)]
pub struct NamedParameters {
    data: BTreeMap<String, ParameterRecord>,
    metadata: FxHashMap<String, Metadata>,
    values: BTreeMap<String, ParameterValue>,
    iterations: Option<usize>,
}

/// Point estimate for one record: the fixed `amount` if present, otherwise
/// the distribution median. The flag tells whether the median was resolved.
fn resolve_static(key: &str, record: &ParameterRecord) -> Result<(f64, bool)> {
    if let Some(amount) = record.amount {
        return Ok((amount, false));
    }
    let distribution = Distribution::from_record(record).map_err(|e| e.with_key(key))?;
    Ok((distribution.median(), true))
}

#[cfg(feature = "parallel")]
fn resolve_all(records: &[(&String, &ParameterRecord)]) -> Vec<Result<(f64, bool)>> {
    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    records
        .par_iter()
        .map(|(key, record)| resolve_static(key, record))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn resolve_all(records: &[(&String, &ParameterRecord)]) -> Vec<Result<(f64, bool)>> {
    records
        .iter()
        .map(|(key, record)| resolve_static(key, record))
        .collect()
}

impl NamedParameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an initial batch of parameters
    pub fn with_parameters<I, K, V>(batch: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParameterInput>,
    {
        let mut store = Self::new();
        store.add_parameters(batch);
        store
    }

    /// Add a batch of parameter definitions.
    ///
    /// Each entry's metadata goes to the metadata side table (an empty map
    /// when absent) and the remaining fields become the record. A key that
    /// already exists is overwritten, not merged.
    pub fn add_parameters<I, K, V>(&mut self, batch: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParameterInput>,
    {
        for (key, input) in batch {
            let key = key.into();
            let ParameterInput { record, metadata } = input.into();
            self.metadata
                .insert(key.clone(), metadata.unwrap_or_default());
            self.data.insert(key, record);
        }
    }

    /// Values enter the store only through `add_parameters` and evaluation
    pub fn set(&mut self, _key: &str, _value: ParameterValue) -> Result<()> {
        Err(ParameterError::UnsupportedOperation(
            "use `add_parameters` to add new parameters",
        ))
    }

    /// Evaluated value of `key`.
    ///
    /// Reading before any evaluation logs a warning and then fails with
    /// [`ParameterError::KeyNotFound`].
    pub fn get(&self, key: &str) -> Result<&ParameterValue> {
        if self.values.is_empty() {
            warn!("{NO_VALUES_WARNING}");
        }
        self.values
            .get(key)
            .ok_or_else(|| ParameterError::KeyNotFound(key.to_string()))
    }

    /// Keys of evaluable records, sorted
    fn evaluable(&self) -> Vec<(&String, &ParameterRecord)> {
        self.data
            .iter()
            .filter(|(_, record)| record.is_evaluable())
            .collect()
    }

    /// Resolve one point estimate per evaluable parameter.
    ///
    /// Records without an `amount` get their distribution median memoized
    /// into `amount`, so repeated calls return identical values. On error
    /// nothing is changed.
    pub fn static_values(&mut self) -> Result<()> {
        let records = self.evaluable();
        let resolved = resolve_all(&records);

        let mut values = BTreeMap::new();
        let mut memoized = Vec::new();
        for ((key, _), result) in records.iter().zip(resolved) {
            let (value, is_median) = result?;
            if is_median {
                memoized.push(((*key).clone(), value));
            }
            values.insert((*key).clone(), ParameterValue::Scalar(value));
        }

        for (key, median) in memoized {
            if let Some(record) = self.data.get_mut(&key) {
                record.amount = Some(median);
            }
        }
        debug!(parameters = values.len(), "static evaluation complete");
        self.values = values;
        self.iterations = None;
        Ok(())
    }

    /// Draw `iterations` samples per evaluable parameter with an entropy-seeded RNG
    pub fn stochastic(&mut self, iterations: usize) -> Result<()> {
        let mut rng = rand::rngs::StdRng::from_os_rng();
        self.stochastic_with_rng(iterations, &mut rng)
    }

    /// Reproducible variant of [`Self::stochastic`]
    pub fn stochastic_with_seed(&mut self, iterations: usize, seed: u64) -> Result<()> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        self.stochastic_with_rng(iterations, &mut rng)
    }

    /// Draw all parameters in one joint batch from `rng`.
    ///
    /// Parameters are visited in sorted key order so a seeded generator
    /// always produces the same samples for the same store. If any
    /// parameter fails, the call fails as a whole and the previous values
    /// are kept.
    pub fn stochastic_with_rng<R: Rng + ?Sized>(
        &mut self,
        iterations: usize,
        rng: &mut R,
    ) -> Result<()> {
        if iterations == 0 {
            return Err(ParameterError::Configuration(
                "stochastic evaluation needs at least one iteration".to_string(),
            ));
        }

        let records = self.evaluable();
        let distributions = records
            .iter()
            .map(|(key, record)| Distribution::from_record(record).map_err(|e| e.with_key(key)))
            .collect::<Result<Vec<_>>>()?;

        let rows = sample_batch(&distributions, iterations, rng)
            .map_err(|(i, e)| e.with_key(records[i].0))?;

        let values: BTreeMap<String, ParameterValue> = records
            .iter()
            .zip(rows)
            .map(|((key, _), row)| ((*key).clone(), ParameterValue::Samples(row)))
            .collect();

        debug!(
            parameters = values.len(),
            iterations, "stochastic evaluation complete"
        );
        self.values = values;
        self.iterations = Some(iterations);
        Ok(())
    }

    /// Number of parameter records, evaluated or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Parameter keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterRecord)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn record(&self, key: &str) -> Option<&ParameterRecord> {
        self.data.get(key)
    }

    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&Metadata> {
        self.metadata.get(key)
    }

    /// All values from the last evaluation, empty before the first one
    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, ParameterValue> {
        &self.values
    }

    /// Sample count of the last `stochastic` call; `None` after `static`
    #[must_use]
    pub fn iterations(&self) -> Option<usize> {
        self.iterations
    }
}
