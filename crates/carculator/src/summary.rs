//! Text report of an evaluated vehicle catalog

use std::fmt::Write;

use carculator_core::{ParameterValue, VehicleInputParameters};

/// Standard percentiles reported for sampled parameters
pub mod standard {
    pub const P5: f64 = 0.05;
    pub const P50: f64 = 0.50;
    pub const P95: f64 = 0.95;
}

/// Nearest-rank percentile of an already sorted slice
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted.get(rank).copied()
}

/// P5 / P50 / P95 of a set of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileSet {
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

impl PercentileSet {
    /// Returns `None` for an empty sample set or one containing NaN
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.iter().any(|x| x.is_nan()) {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            p5: percentile(&sorted, standard::P5)?,
            p50: percentile(&sorted, standard::P50)?,
            p95: percentile(&sorted, standard::P95)?,
        })
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the derived enumerations followed by one line per evaluated key
#[must_use]
pub fn render(catalog: &VehicleInputParameters) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "sizes:       {}", join(catalog.sizes()));
    let _ = writeln!(out, "powertrains: {}", join(catalog.powertrains()));
    let _ = writeln!(out, "years:       {}", join(catalog.years()));
    let _ = writeln!(
        out,
        "parameters:  {} names, {} records, {} evaluated",
        catalog.parameters().len(),
        catalog.len(),
        catalog.values().len()
    );
    match catalog.iterations() {
        Some(n) => {
            let _ = writeln!(out, "mode:        stochastic ({n} iterations)");
        }
        None => {
            let _ = writeln!(out, "mode:        static");
        }
    }
    out.push('\n');

    for (key, value) in catalog.values() {
        match value {
            ParameterValue::Scalar(v) => {
                let _ = writeln!(out, "{key}: {v}");
            }
            ParameterValue::Samples(samples) => match PercentileSet::from_samples(samples) {
                Some(set) => {
                    let _ = writeln!(
                        out,
                        "{key}: p5={} p50={} p95={}",
                        set.p5, set.p50, set.p95
                    );
                }
                None => {
                    let _ = writeln!(out, "{key}: no samples");
                }
            },
        }
    }
    out
}
