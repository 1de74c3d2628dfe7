//! Distribution resolver
//!
//! Turns a [`ParameterRecord`]'s uncertainty fields into a validated
//! [`Distribution`] and evaluates it either as a single point estimate (the
//! median) or as a batch of Monte Carlo samples. Every family is a variant of
//! the enum; adding a family means adding a variant and its arms here.
//!
//! | Family | Fields | Median |
//! |---|---|---|
//! | point | `amount` or `loc` | the value |
//! | uniform | `minimum`, `maximum` | (min+max)/2 |
//! | triangular | `minimum`, `loc` (mode), `maximum` | closed form |
//! | normal | `loc`, `scale`, optional bounds | `loc`, or truncated median |
//! | lognormal | `loc`, `scale` of ln x, optional bounds | `exp(loc)`, or truncated median |
//! | discrete uniform | `minimum`, `maximum` (exclusive) | floor((min+max)/2) |

use rand::{Rng, distr::Distribution as _};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{ParameterError, Result};
use crate::model::{ParameterRecord, UncertaintyType};

/// Optional truncation interval for the unbounded families
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl Bounds {
    fn is_unbounded(&self) -> bool {
        self.minimum.is_none() && self.maximum.is_none()
    }
}

/// Probability window kept by a truncation.
///
/// `Lower` holds CDF values at the bounds. `Upper` holds survival function
/// values and is used when the whole interval lies above `loc`, where the CDF
/// rounds to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Window {
    Lower { from: f64, to: f64 },
    Upper { from: f64, to: f64 },
}

impl Window {
    fn mass(&self) -> f64 {
        match self {
            Window::Lower { from, to } => to - from,
            Window::Upper { from, to } => from - to,
        }
    }
}

/// Normal law in the space the family is defined in (ln x for lognormal),
/// with an optional truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    pub loc: f64,
    pub scale: f64,
    pub bounds: Bounds,
    normal: Normal,
    window: Option<Window>,
}

impl Gaussian {
    fn new(
        loc: f64,
        scale: f64,
        bounds: Bounds,
        log: bool,
        family: &'static str,
    ) -> Result<Self> {
        let normal =
            Normal::new(loc, scale).map_err(|e| ParameterError::invalid(family, e.to_string()))?;

        let to_space = |x: f64| match (log, x) {
            (true, x) if x <= 0.0 => f64::NEG_INFINITY,
            (true, x) => x.ln(),
            (false, x) => x,
        };

        let window = if bounds.is_unbounded() {
            None
        } else {
            let lower = bounds.minimum.map(to_space);
            let upper = bounds.maximum.map(to_space);
            let window = match lower {
                Some(a) if a > loc => Window::Upper {
                    from: normal.sf(a),
                    to: upper.map_or(0.0, |b| normal.sf(b)),
                },
                _ => Window::Lower {
                    from: lower.map_or(0.0, |a| normal.cdf(a)),
                    to: upper.map_or(1.0, |b| normal.cdf(b)),
                },
            };
            if window.mass() <= 0.0 {
                return Err(ParameterError::invalid(
                    family,
                    "bounds leave no probability mass",
                ));
            }
            Some(window)
        };

        Ok(Self {
            loc,
            scale,
            bounds,
            normal,
            window,
        })
    }

    /// Quantile in the underlying normal space
    fn quantile(&self, p: f64) -> f64 {
        match self.window {
            None if p == 0.5 => self.loc,
            None => self.normal.inverse_cdf(p),
            Some(Window::Lower { from, to }) => {
                self.normal.inverse_cdf((from + p * (to - from)).clamp(0.0, 1.0))
            }
            // The survival function mirrors the CDF around `loc`
            Some(Window::Upper { from, to }) => {
                let q = (from + p * (to - from)).clamp(0.0, 1.0);
                2.0 * self.loc - self.normal.inverse_cdf(q)
            }
        }
    }

    fn is_truncated(&self) -> bool {
        self.window.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    Point(f64),
    Uniform {
        minimum: f64,
        maximum: f64,
    },
    Triangular {
        minimum: f64,
        mode: f64,
        maximum: f64,
    },
    Normal(Gaussian),
    LogNormal(Gaussian),
    DiscreteUniform {
        minimum: f64,
        maximum: f64,
    },
}

fn required(value: Option<f64>, family: &'static str, field: &str) -> Result<f64> {
    let value = value.ok_or_else(|| ParameterError::invalid(family, format!("missing `{field}`")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::invalid(
            family,
            format!("`{field}` must be finite, got {value}"),
        ))
    }
}

fn optional(value: Option<f64>, family: &'static str, field: &str) -> Result<Option<f64>> {
    match value {
        Some(v) if v.is_nan() => Err(ParameterError::invalid(
            family,
            format!("`{field}` must not be NaN"),
        )),
        other => Ok(other),
    }
}

fn ordered(minimum: f64, maximum: f64, family: &'static str) -> Result<()> {
    if minimum > maximum {
        Err(ParameterError::invalid(
            family,
            format!("minimum ({minimum}) > maximum ({maximum})"),
        ))
    } else {
        Ok(())
    }
}

fn positive_scale(scale: f64, family: &'static str) -> Result<f64> {
    if scale > 0.0 {
        Ok(scale)
    } else {
        Err(ParameterError::invalid(
            family,
            format!("`scale` must be positive, got {scale}"),
        ))
    }
}

impl Distribution {
    /// Build the distribution a record describes.
    ///
    /// A record without `uncertainty_type` but with an `amount` is a point
    /// value. Errors carry no key; callers attach one with
    /// [`ParameterError::with_key`].
    pub fn from_record(record: &ParameterRecord) -> Result<Self> {
        let Some(uncertainty_type) = &record.uncertainty_type else {
            return match record.amount {
                Some(amount) => Ok(Distribution::Point(amount)),
                None => Err(ParameterError::UnknownDistributionKind {
                    key: None,
                    kind: "<missing>".to_string(),
                }),
            };
        };

        let distribution = match uncertainty_type {
            UncertaintyType::Undefined | UncertaintyType::NoUncertainty => {
                let value = record.loc.or(record.amount).ok_or_else(|| {
                    ParameterError::invalid("point", "requires `amount` or `loc`")
                })?;
                Distribution::Point(value)
            }
            UncertaintyType::Uniform => {
                let minimum = required(record.minimum, "uniform", "minimum")?;
                let maximum = required(record.maximum, "uniform", "maximum")?;
                ordered(minimum, maximum, "uniform")?;
                Distribution::Uniform { minimum, maximum }
            }
            UncertaintyType::Triangular => {
                let minimum = required(record.minimum, "triangular", "minimum")?;
                let maximum = required(record.maximum, "triangular", "maximum")?;
                let mode = required(record.loc, "triangular", "loc")?;
                ordered(minimum, maximum, "triangular")?;
                if mode < minimum || mode > maximum {
                    return Err(ParameterError::invalid(
                        "triangular",
                        format!("mode ({mode}) outside [{minimum}, {maximum}]"),
                    ));
                }
                Distribution::Triangular {
                    minimum,
                    mode,
                    maximum,
                }
            }
            UncertaintyType::Normal | UncertaintyType::LogNormal => {
                let log = *uncertainty_type == UncertaintyType::LogNormal;
                let family = if log { "lognormal" } else { "normal" };
                let loc = required(record.loc, family, "loc")?;
                let scale = positive_scale(required(record.scale, family, "scale")?, family)?;
                let bounds = Bounds {
                    minimum: optional(record.minimum, family, "minimum")?,
                    maximum: optional(record.maximum, family, "maximum")?,
                };
                if let (Some(minimum), Some(maximum)) = (bounds.minimum, bounds.maximum) {
                    ordered(minimum, maximum, family)?;
                }
                let gaussian = Gaussian::new(loc, scale, bounds, log, family)?;
                if log {
                    Distribution::LogNormal(gaussian)
                } else {
                    Distribution::Normal(gaussian)
                }
            }
            UncertaintyType::DiscreteUniform => {
                let minimum = optional(record.minimum, "discrete uniform", "minimum")?
                    .unwrap_or(0.0);
                let maximum = required(record.maximum, "discrete uniform", "maximum")?;
                if minimum.ceil() > maximum.ceil() - 1.0 {
                    return Err(ParameterError::invalid(
                        "discrete uniform",
                        format!(
                            "no integer in [{minimum}, {maximum}) with `maximum` exclusive"
                        ),
                    ));
                }
                Distribution::DiscreteUniform { minimum, maximum }
            }
            UncertaintyType::Unknown(kind) => {
                return Err(ParameterError::UnknownDistributionKind {
                    key: None,
                    kind: kind.clone(),
                });
            }
        };
        Ok(distribution)
    }

    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            Distribution::Point(_) => "point",
            Distribution::Uniform { .. } => "uniform",
            Distribution::Triangular { .. } => "triangular",
            Distribution::Normal(_) => "normal",
            Distribution::LogNormal(_) => "lognormal",
            Distribution::DiscreteUniform { .. } => "discrete uniform",
        }
    }

    /// Inverse CDF at `p`; `p` is clamped to `[0, 1]`
    #[must_use]
    pub fn quantile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Distribution::Point(value) => *value,
            Distribution::Uniform { minimum, maximum } => minimum + p * (maximum - minimum),
            Distribution::Triangular {
                minimum: a,
                mode: b,
                maximum: c,
            } => {
                if c == a {
                    return *a;
                }
                let fc = (b - a) / (c - a);
                if p < fc {
                    a + ((c - a) * (b - a) * p).sqrt()
                } else {
                    c - ((c - a) * (c - b) * (1.0 - p)).sqrt()
                }
            }
            Distribution::Normal(gaussian) => clamp_to(gaussian.quantile(p), &gaussian.bounds),
            Distribution::LogNormal(gaussian) => {
                clamp_to(gaussian.quantile(p).exp(), &gaussian.bounds)
            }
            Distribution::DiscreteUniform { minimum, maximum } => {
                // Integers in [ceil(minimum), ceil(maximum) - 1]
                let lowest = minimum.ceil();
                let highest = maximum.ceil() - 1.0;
                (minimum + p * (maximum - minimum))
                    .floor()
                    .clamp(lowest, highest)
            }
        }
    }

    /// Point estimate: the 50th percentile
    #[must_use]
    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Draw `n` samples from this distribution
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Result<Vec<f64>> {
        let invalid = |reason: String| ParameterError::invalid(self.family(), reason);
        let samples = match self {
            Distribution::Point(value) => vec![*value; n],
            Distribution::Uniform { minimum, maximum } => {
                let dist = rand::distr::Uniform::new_inclusive(*minimum, *maximum)
                    .map_err(|e| invalid(e.to_string()))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
            Distribution::Triangular {
                minimum,
                mode,
                maximum,
            } => {
                if minimum == maximum {
                    vec![*minimum; n]
                } else {
                    let dist = rand_distr::Triangular::new(*minimum, *maximum, *mode)
                        .map_err(|e| invalid(e.to_string()))?;
                    (0..n).map(|_| dist.sample(rng)).collect()
                }
            }
            Distribution::Normal(g) if !g.is_truncated() => {
                let dist =
                    rand_distr::Normal::new(g.loc, g.scale).map_err(|e| invalid(e.to_string()))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
            Distribution::LogNormal(g) if !g.is_truncated() => {
                let dist = rand_distr::LogNormal::new(g.loc, g.scale)
                    .map_err(|e| invalid(e.to_string()))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
            // Truncated continuous families and the discrete family use inverse transform
            _ => (0..n)
                .map(|_| self.quantile(rng.random::<f64>()))
                .collect(),
        };
        Ok(samples)
    }
}

fn clamp_to(x: f64, bounds: &Bounds) -> f64 {
    let x = bounds.minimum.map_or(x, |lo| x.max(lo));
    bounds.maximum.map_or(x, |hi| x.min(hi))
}

/// Draw `n` samples for every distribution in one pass over a shared RNG.
///
/// Distributions are visited in slice order, so with a seeded `rng` the
/// result is reproducible as long as the caller keeps the order stable.
/// Rows line up with the input slice.
pub fn sample_batch<R: Rng + ?Sized>(
    distributions: &[Distribution],
    n: usize,
    rng: &mut R,
) -> std::result::Result<Vec<Vec<f64>>, (usize, ParameterError)> {
    distributions
        .iter()
        .enumerate()
        .map(|(i, dist)| dist.sample(rng, n).map_err(|e| (i, e)))
        .collect()
}
