//! Tests for static and stochastic evaluation
//!
//! These tests verify that:
//! - Static evaluation returns the median and memoizes it into `amount`
//! - A preset `amount` short-circuits distribution resolution
//! - Stochastic evaluation returns exactly `n` samples for every evaluable key
//! - Inert records never show up in evaluated values
//! - A failing parameter fails the whole call and names the parameter

use crate::error::ParameterError;
use crate::model::{ParameterRecord, ParameterValue, UncertaintyType};
use crate::store::NamedParameters;

fn mass_and_efficiency() -> NamedParameters {
    NamedParameters::with_parameters([
        ("mass", ParameterRecord::point(1200.0)),
        ("efficiency", ParameterRecord::uniform(0.2, 0.4)),
    ])
}

fn scalar(params: &NamedParameters, key: &str) -> f64 {
    params.get(key).unwrap().as_scalar().unwrap()
}

#[test]
fn test_static_end_to_end() {
    let mut params = mass_and_efficiency();
    params.static_values().unwrap();

    assert_eq!(
        params.values().keys().collect::<Vec<_>>(),
        vec!["efficiency", "mass"]
    );
    assert!((scalar(&params, "efficiency") - 0.3).abs() < 1e-12);
    assert_eq!(scalar(&params, "mass"), 1200.0);
    assert_eq!(params.iterations(), None);
}

#[test]
fn test_stochastic_end_to_end() {
    let mut params = mass_and_efficiency();
    params.stochastic_with_seed(100, 7).unwrap();

    let efficiency = params.get("efficiency").unwrap().as_samples().unwrap();
    assert_eq!(efficiency.len(), 100);
    assert!(efficiency.iter().all(|x| (0.2..=0.4).contains(x)));

    let mass = params.get("mass").unwrap().as_samples().unwrap();
    assert_eq!(mass, vec![1200.0; 100].as_slice());
    assert_eq!(params.iterations(), Some(100));
}

#[test]
fn test_static_is_idempotent_and_memoized() {
    let mut params = NamedParameters::with_parameters([
        ("a", ParameterRecord::triangular(1.0, 2.0, 6.0)),
        ("b", ParameterRecord::normal(10.0, 1.0).bounded(9.0, 20.0)),
        ("c", ParameterRecord::lognormal(0.5, 0.3)),
    ]);
    assert_eq!(params.record("a").unwrap().amount, None);

    params.static_values().unwrap();
    let first = params.values().clone();
    params.static_values().unwrap();
    assert_eq!(params.values(), &first);

    for key in ["a", "b", "c"] {
        assert_eq!(
            params.record(key).unwrap().amount,
            Some(scalar(&params, key)),
            "median for {key} should be memoized"
        );
    }
}

#[test]
fn test_preset_amount_short_circuits_resolution() {
    // The shape fields are unusable, so resolving them would fail
    let record = ParameterRecord {
        amount: Some(42.0),
        ..ParameterRecord::uniform(5.0, 1.0)
    };
    let mut params = NamedParameters::with_parameters([("x", record)]);
    params.static_values().unwrap();
    assert_eq!(scalar(&params, "x"), 42.0);

    let unknown = ParameterRecord {
        amount: Some(7.0),
        uncertainty_type: Some(UncertaintyType::Unknown("weibull".into())),
        ..Default::default()
    };
    let mut params = NamedParameters::with_parameters([("y", unknown)]);
    params.static_values().unwrap();
    assert_eq!(scalar(&params, "y"), 7.0);
}

#[test]
fn test_stochastic_samples_shape_for_every_evaluable_key() {
    let mut params = NamedParameters::with_parameters([
        ("a", ParameterRecord::uniform(0.0, 1.0)),
        ("b", ParameterRecord::normal(5.0, 0.5)),
        ("c", ParameterRecord::triangular(0.0, 0.1, 1.0)),
        ("d", ParameterRecord::lognormal(0.0, 0.2).bounded(0.5, 2.0)),
        ("e", ParameterRecord::point(3.0)),
        ("inert", ParameterRecord::point(1.0).with_kind("function")),
    ]);

    for n in [1, 2, 37] {
        params.stochastic_with_seed(n, 3).unwrap();
        assert_eq!(
            params.values().keys().collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e"]
        );
        for value in params.values().values() {
            assert_eq!(value.len(), n);
            assert!(value.as_samples().is_some());
        }
    }

    let d = params.get("d").unwrap().as_samples().unwrap();
    assert!(d.iter().all(|x| (0.5..=2.0).contains(x)));
}

#[test]
fn test_non_evaluable_records_are_excluded() {
    let mut params = NamedParameters::with_parameters([
        ("a", ParameterRecord::point(1.0)),
        ("b", ParameterRecord::uniform(0.0, 1.0).with_kind("function")),
    ]);

    params.static_values().unwrap();
    assert!(!params.values().contains_key("b"));
    assert!(matches!(
        params.get("b"),
        Err(ParameterError::KeyNotFound(_))
    ));

    params.stochastic_with_seed(10, 0).unwrap();
    assert!(!params.values().contains_key("b"));
    // Still part of the record set
    assert!(params.contains("b"));
}

#[test]
fn test_absent_kind_is_evaluated() {
    let record = ParameterRecord {
        uncertainty_type: Some(UncertaintyType::Uniform),
        minimum: Some(1.0),
        maximum: Some(3.0),
        ..Default::default()
    };
    let mut params = NamedParameters::with_parameters([("x", record)]);
    params.static_values().unwrap();
    assert_eq!(scalar(&params, "x"), 2.0);
}

#[test]
fn test_values_are_replaced_not_merged() {
    let mut params = mass_and_efficiency();
    params.stochastic_with_seed(5, 1).unwrap();
    params.static_values().unwrap();
    assert!(
        params
            .values()
            .values()
            .all(|v| matches!(v, ParameterValue::Scalar(_)))
    );
    assert_eq!(params.iterations(), None);

    params.add_parameters([("extra", ParameterRecord::point(1.0).with_kind("inert"))]);
    params.stochastic_with_seed(5, 1).unwrap();
    assert_eq!(params.values().len(), 2);
}

#[test]
fn test_stochastic_after_static_still_samples() {
    let mut params = mass_and_efficiency();
    params.static_values().unwrap();
    params.stochastic_with_seed(200, 11).unwrap();

    let efficiency = params.get("efficiency").unwrap().as_samples().unwrap();
    let distinct = efficiency.iter().filter(|x| (**x - 0.3).abs() > 1e-9).count();
    assert!(distinct > 0, "memoized median must not freeze the samples");
}

#[test]
fn test_seeded_stochastic_is_reproducible() {
    let mut a = mass_and_efficiency();
    let mut b = mass_and_efficiency();
    a.stochastic_with_seed(50, 99).unwrap();
    b.stochastic_with_seed(50, 99).unwrap();
    assert_eq!(a.values(), b.values());
}

#[test]
fn test_unseeded_stochastic_has_requested_length() {
    let mut params = mass_and_efficiency();
    params.stochastic(crate::store::DEFAULT_ITERATIONS).unwrap();
    assert_eq!(params.get("mass").unwrap().len(), 1000);
}

#[test]
fn test_static_failure_names_key_and_keeps_values() {
    let mut params = mass_and_efficiency();
    params.static_values().unwrap();
    let before = params.values().clone();

    params.add_parameters([("broken", ParameterRecord::uniform(1.0, 0.0))]);
    let err = params.static_values().unwrap_err();
    assert_eq!(err.key(), Some("broken"));
    assert!(matches!(
        err,
        ParameterError::InvalidDistributionParameters { .. }
    ));
    assert_eq!(params.values(), &before);
    assert_eq!(params.record("broken").unwrap().amount, None);
}

#[test]
fn test_stochastic_failure_is_all_or_nothing() {
    let mut params = mass_and_efficiency();
    params.add_parameters([(
        "mystery",
        ParameterRecord {
            uncertainty_type: Some(UncertaintyType::from_id(12)),
            loc: Some(1.0),
            ..Default::default()
        },
    )]);

    let err = params.stochastic_with_seed(10, 0).unwrap_err();
    assert_eq!(
        err,
        ParameterError::UnknownDistributionKind {
            key: Some("mystery".to_string()),
            kind: "12".to_string(),
        }
    );
    assert!(params.values().is_empty());
    assert_eq!(params.iterations(), None);
}

#[test]
fn test_stochastic_rejects_zero_iterations() {
    let mut params = mass_and_efficiency();
    assert!(matches!(
        params.stochastic_with_seed(0, 0),
        Err(ParameterError::Configuration(_))
    ));
}
