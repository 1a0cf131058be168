use crate::schemas::SchemaRegistry;
use crate::validators::{
    Effect, EffectKind, NumericRange, Rule, RuleKind, ValidationRule, DEFAULT_PATTERN,
};
use crate::KeChainError;
use serde_json::{json, Value};

#[test]
fn test_absent_value_is_not_applicable() {
    let rule = ValidationRule::numeric_range(NumericRange::new(Some(0.0), Some(1.0)).unwrap())
        .with_on_invalid(vec![Effect::invalid_visual()]);
    let evaluation = rule.evaluate(&Value::Null);
    assert_eq!(evaluation.result, None);
    assert_eq!(evaluation.reason, "No value to validate");
    assert!(evaluation.fired.is_empty());
}

#[test]
fn test_required_field_fails_on_absent_value() {
    let rule = ValidationRule::required_field();
    assert_eq!(rule.is_valid(&Value::Null), Some(false));
    assert_eq!(rule.is_valid(&json!("")), Some(false));
    assert_eq!(rule.is_valid(&json!("frame")), Some(true));
    assert_eq!(rule.is_valid(&json!(0)), Some(true));
}

#[test]
fn test_outcome_fires_matching_effects() {
    let rule = ValidationRule::numeric_range(NumericRange::new(Some(0.0), Some(10.0)).unwrap())
        .with_on_valid(vec![Effect::valid_visual()])
        .with_on_invalid(vec![Effect::invalid_visual(), Effect::error_text("Out of range")]);

    let inside = rule.evaluate(&json!(4));
    assert!(inside.is_valid());
    assert_eq!(inside.fired, vec![EffectKind::Visual]);

    let outside = rule.evaluate(&json!(11));
    assert!(outside.is_invalid());
    assert_eq!(outside.reason, "Value '11' should be between 0 and 10");
    assert_eq!(outside.fired, vec![EffectKind::Visual, EffectKind::ErrorText]);
}

#[test]
fn test_is_invalid_mirrors_is_valid() {
    let rule = ValidationRule::even_number();
    assert_eq!(rule.is_invalid(&json!(3)), Some(true));
    assert_eq!(rule.is_invalid(&json!(4)), Some(false));
    assert_eq!(rule.is_invalid(&Value::Null), None);
}

#[test]
fn test_parity_truncates_fractions() {
    assert_eq!(ValidationRule::even_number().is_valid(&json!(4.9)), Some(true));
    assert_eq!(ValidationRule::odd_number().is_valid(&json!(3.2)), Some(true));
    assert_eq!(ValidationRule::odd_number().is_valid(&json!(-3)), Some(true));
    assert_eq!(ValidationRule::even_number().is_valid(&json!("4")), Some(false));
}

#[test]
fn test_boolean_field() {
    let rule = ValidationRule::boolean_field();
    assert_eq!(rule.is_valid(&json!(false)), Some(true));
    assert_eq!(rule.is_valid(&json!("true")), Some(false));
}

#[test]
fn test_regex_matches_from_the_start() {
    let rule = ValidationRule::regex_string(Some("[0-9]{4}")).unwrap();
    assert_eq!(rule.is_valid(&json!("2024-A")), Some(true));
    assert_eq!(rule.is_valid(&json!("A-2024")), Some(false));
}

#[test]
fn test_regex_default_pattern_requires_text() {
    let rule = ValidationRule::regex_string(None).unwrap();
    match rule.rule() {
        Rule::RegexString(regex) => assert_eq!(regex.effective_pattern(), DEFAULT_PATTERN),
        other => panic!("expected a regex rule, got {:?}", other),
    }
    assert_eq!(rule.is_valid(&json!("x")), Some(true));
    assert_eq!(rule.is_valid(&json!("")), Some(false));
    assert_eq!(rule.to_json()["config"], json!({}));
}

#[test]
fn test_invalid_regex_is_argument_error() {
    let err = ValidationRule::regex_string(Some("(unclosed")).unwrap_err();
    assert!(err.is_argument_error());
}

#[test]
fn test_email() {
    let rule = ValidationRule::email();
    assert_eq!(rule.is_valid(&json!("support@ke-chain.com")), Some(true));
    assert_eq!(rule.is_valid(&json!("support@")), Some(false));
    assert_eq!(rule.is_valid(&json!(42)), Some(false));
}

#[test]
fn test_single_reference() {
    let rule = ValidationRule::single_reference();
    assert_eq!(rule.is_valid(&json!([])), Some(true));
    assert_eq!(rule.is_valid(&json!(["a"])), Some(true));
    assert_eq!(rule.is_valid(&json!(["a", "b"])), Some(false));
}

#[test]
fn test_file_size() {
    let rule = ValidationRule::file_size(Some(1024.0)).unwrap();
    assert_eq!(rule.is_valid(&json!(1024)), Some(true));
    assert_eq!(rule.is_valid(&json!(1025)), Some(false));
    assert_eq!(
        ValidationRule::file_size(None).unwrap().is_valid(&json!(1e12)),
        Some(true)
    );
    assert!(ValidationRule::file_size(Some(-1.0)).is_err());
}

#[test]
fn test_range_construction_invariants() {
    assert!(NumericRange::new(Some(5.0), Some(1.0)).unwrap_err().is_argument_error());
    assert!(NumericRange::new(Some(f64::NAN), None).is_err());
    assert!(NumericRange::with_step(None, None, Some(0.0), true).is_err());
    assert!(NumericRange::with_step(None, None, None, true).is_err());
    assert!(NumericRange::with_step(None, None, Some(0.5), false).is_ok());
}

#[test]
fn test_serialized_range_omits_unset_bounds() {
    let rule = ValidationRule::numeric_range(NumericRange::new(None, Some(10.0)).unwrap());
    assert_eq!(
        rule.to_json(),
        json!({"vtype": "numericRangeValidator", "config": {"maxvalue": 10.0}})
    );
}

#[test]
fn test_parse_dispatches_on_vtype() {
    let schemas = SchemaRegistry::new();
    let rule = ValidationRule::parse(
        &json!({
            "vtype": "numericRangeValidator",
            "config": {
                "minvalue": 0,
                "maxvalue": 100,
                "stepsize": 5,
                "enforce_stepsize": true,
                "on_invalid": [{"effect": "errorTextEffect", "config": {"text": "Use steps of 5"}}]
            }
        }),
        &schemas,
    )
    .unwrap();
    assert_eq!(rule.kind(), RuleKind::NumericRange);
    assert_eq!(rule.on_invalid().len(), 1);
    assert_eq!(rule.is_valid(&json!(35)), Some(true));
    assert_eq!(rule.is_valid(&json!(36)), Some(false));
}

#[test]
fn test_parse_rejects_unknown_and_missing_vtype() {
    let schemas = SchemaRegistry::new();
    let unknown = ValidationRule::parse(&json!({"vtype": "fileExtensionValidator", "config": {}}), &schemas);
    assert!(matches!(unknown, Err(KeChainError::UnknownType(_))));

    let missing = ValidationRule::parse(&json!({"config": {}}), &schemas);
    assert!(matches!(missing, Err(KeChainError::Value(_))));
}

#[test]
fn test_parse_rejects_extra_top_level_keys() {
    let schemas = SchemaRegistry::new();
    let result = ValidationRule::parse(
        &json!({"vtype": "emailValidator", "config": {}, "colour": "red"}),
        &schemas,
    );
    assert!(matches!(result, Err(KeChainError::Schema(_))));
}

#[test]
fn test_parse_list_fails_on_first_bad_item() {
    let schemas = SchemaRegistry::new();
    let list = json!([
        {"vtype": "requiredFieldValidator", "config": {}},
        {"vtype": "nope", "config": {}},
    ]);
    assert!(ValidationRule::parse_list(&list, &schemas).is_err());
    assert!(ValidationRule::parse_list(&json!({}), &schemas)
        .unwrap_err()
        .is_argument_error());
}

#[test]
fn test_every_kind_survives_serialization() {
    let schemas = SchemaRegistry::new();
    let rules = vec![
        ValidationRule::numeric_range(
            NumericRange::with_step(Some(-1.5), Some(3.0), Some(0.5), true).unwrap(),
        ),
        ValidationRule::required_field().with_on_valid(vec![Effect::text("Thanks")]),
        ValidationRule::boolean_field(),
        ValidationRule::even_number(),
        ValidationRule::odd_number(),
        ValidationRule::regex_string(Some("^[A-Z]+$")).unwrap(),
        ValidationRule::single_reference(),
        ValidationRule::email().with_on_invalid(vec![Effect::invalid_visual()]),
        ValidationRule::file_size(Some(2048.0)).unwrap(),
    ];
    assert_eq!(rules.len(), RuleKind::ALL.len());
    for rule in rules {
        let parsed = ValidationRule::parse(&rule.to_json(), &schemas).unwrap();
        assert_eq!(parsed, rule);
    }
}
