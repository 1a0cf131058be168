use super::fixtures::*;
use crate::client::{Client, Push};
use crate::engine::Engine;
use crate::representations::Representation;
use crate::schemas::SchemaKind;
use crate::validators::{Effect, NumericRange, ValidationRule};
use crate::KeChainError;
use serde_json::json;

#[test]
fn test_side_bar_returns_one_manager_per_scope() {
    let engine = Engine::new(bike_client());
    let first = engine.side_bar(SCOPE).unwrap();
    let scope = engine.client().scope(&id(SCOPE)).unwrap();
    let second = engine.side_bar(&scope).unwrap();
    assert!(first.same_manager(&second));
}

#[test]
fn test_side_bar_rejects_bad_scope_reference() {
    let engine = Engine::new(bike_client());
    assert!(engine.side_bar("bike").unwrap_err().is_argument_error());
    assert!(matches!(
        engine.side_bar(OTHER_SCOPE),
        Err(KeChainError::NotFound(_))
    ));
}

#[test]
fn test_property_editor_pushes_validators() {
    let engine = Engine::new(bike_client());
    let mut editor = engine.property_editor(DIAMETER).unwrap();
    let rule = ValidationRule::numeric_range(NumericRange::new(Some(10.0), Some(30.0)).unwrap())
        .with_on_invalid(vec![Effect::error_text("Wheels are 10 to 30 inch")]);
    editor.set_validators(vec![rule]).unwrap();

    assert_eq!(editor.options().is_valid(&json!(28)), Some(true));
    assert_eq!(editor.options().is_valid(&json!(31)), Some(false));
    match &engine.client().pushes()[0] {
        Push::PropertyOptions { options, .. } => {
            assert_eq!(options["validators"][0]["vtype"], json!("numericRangeValidator"));
        }
        other => panic!("unexpected push {:?}", other),
    }

    let stored = engine.client().property(&id(DIAMETER)).unwrap();
    let reopened = engine.property_editor(&stored).unwrap();
    assert_eq!(reopened.options().validators().len(), 1);
}

#[test]
fn test_property_editor_checks_representation_applicability() {
    let engine = Engine::new(bike_client());
    let mut editor = engine.property_editor(FRAME_COLOUR).unwrap();
    let err = editor
        .set_representations(vec![Representation::decimal_places(2)])
        .unwrap_err();
    assert!(err.is_argument_error());
    assert_eq!(engine.client().push_count(), 0);

    editor
        .set_representations(vec![Representation::camera_scanner_input(true)])
        .unwrap();
    assert_eq!(editor.options().representations().len(), 1);
}

#[test]
fn test_property_options_keep_unrelated_keys() {
    let engine = Engine::new(bike_client());
    let options = engine
        .parse_property_options(&json!({
            "value_choices": ["red", "blue"],
            "precision": 3,
            "validators": [{"vtype": "requiredFieldValidator", "config": {}}]
        }))
        .unwrap();
    assert_eq!(options.value_choices().map(|choices| choices.len()), Some(2));
    assert_eq!(options.other()["precision"], json!(3));
    assert_eq!(options.is_valid(&json!(null)), Some(false));
    assert_eq!(options.to_json()["precision"], json!(3));
}

#[test]
fn test_is_valid_without_applicable_rules() {
    let engine = Engine::new(bike_client());
    let options = engine
        .parse_property_options(&json!({
            "validators": [{"vtype": "evenNumberValidator", "config": {}}]
        }))
        .unwrap();
    assert_eq!(options.is_valid(&json!(null)), None);
    assert_eq!(options.validate(&json!(2)).len(), 1);
}

#[test]
fn test_refused_push_is_api_error() {
    let engine = Engine::new(bike_client());
    let mut editor = engine.property_editor(DIAMETER).unwrap();
    engine.client().fail_next_push(500);
    let err = editor
        .set_validators(vec![ValidationRule::required_field()])
        .unwrap_err();
    assert_eq!(err.response().map(|response| response.status), Some(500));
    assert!(err.to_string().contains("Could not update the options of the property"));
}

#[test]
fn test_parse_helpers_use_registry() {
    let engine = Engine::new(bike_client());
    assert!(engine
        .parse_validator(&json!({"vtype": "emailValidator", "config": {}}))
        .is_ok());
    assert!(engine
        .parse_validators(&json!([{"vtype": "oddNumberValidator", "config": {}}]))
        .is_ok());
    assert!(engine
        .parse_effect(&json!({"effect": "helpTextEffect", "config": {"text": "Hint"}}))
        .is_ok());
    assert!(engine
        .parse_representation(&json!({"rtype": "autofill", "config": {"autofill": true}}))
        .is_ok());
    assert!(engine
        .validate_document(SchemaKind::Validators, &json!([{"vtype": "x"}]))
        .is_err());
}
