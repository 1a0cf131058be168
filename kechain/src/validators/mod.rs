//! Property validation rules and the effects they trigger.
//!
//! A [`ValidationRule`] evaluates a candidate value to pass, fail or "not
//! applicable" (`None`, for an absent value) together with a reason. Rules are
//! serialized as `{vtype, config}` and dispatched back by exact tag match.

mod effects;
mod rules;

pub use effects::{Effect, EffectKind, DEFAULT_ERROR_TEXT};
pub use rules::{
    FileSize, NumericRange, RegexString, DEFAULT_PATTERN, EMAIL_PATTERN, STEP_TOLERANCE,
};

use crate::identifiers::json_type_name;
use crate::schemas::{SchemaKind, SchemaRegistry};
use crate::{KeChainError, KeChainResult};
use effects::parse_effects;
use serde_json::{json, Map, Value};
use std::fmt;

/// Tags of the supported rule kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    NumericRange,
    RequiredField,
    BooleanField,
    EvenNumber,
    OddNumber,
    RegexString,
    SingleReference,
    Email,
    FileSize,
}

impl RuleKind {
    pub const ALL: [RuleKind; 9] = [
        RuleKind::NumericRange,
        RuleKind::RequiredField,
        RuleKind::BooleanField,
        RuleKind::EvenNumber,
        RuleKind::OddNumber,
        RuleKind::RegexString,
        RuleKind::SingleReference,
        RuleKind::Email,
        RuleKind::FileSize,
    ];

    /// The `vtype` tag on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            RuleKind::NumericRange => "numericRangeValidator",
            RuleKind::RequiredField => "requiredFieldValidator",
            RuleKind::BooleanField => "booleanFieldValidator",
            RuleKind::EvenNumber => "evenNumberValidator",
            RuleKind::OddNumber => "oddNumberValidator",
            RuleKind::RegexString => "regexStringValidator",
            RuleKind::SingleReference => "singleReferenceValidator",
            RuleKind::Email => "emailValidator",
            RuleKind::FileSize => "fileSizeValidator",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The check a rule performs, with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    NumericRange(NumericRange),
    RequiredField,
    BooleanField,
    EvenNumber,
    OddNumber,
    RegexString(RegexString),
    SingleReference,
    Email,
    FileSize(FileSize),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::NumericRange(_) => RuleKind::NumericRange,
            Rule::RequiredField => RuleKind::RequiredField,
            Rule::BooleanField => RuleKind::BooleanField,
            Rule::EvenNumber => RuleKind::EvenNumber,
            Rule::OddNumber => RuleKind::OddNumber,
            Rule::RegexString(_) => RuleKind::RegexString,
            Rule::SingleReference => RuleKind::SingleReference,
            Rule::Email => RuleKind::Email,
            Rule::FileSize(_) => RuleKind::FileSize,
        }
    }

    fn from_config(kind: RuleKind, config: &Map<String, Value>) -> KeChainResult<Self> {
        Ok(match kind {
            RuleKind::NumericRange => Rule::NumericRange(NumericRange::from_config(config)?),
            RuleKind::RequiredField => Rule::RequiredField,
            RuleKind::BooleanField => Rule::BooleanField,
            RuleKind::EvenNumber => Rule::EvenNumber,
            RuleKind::OddNumber => Rule::OddNumber,
            RuleKind::RegexString => Rule::RegexString(RegexString::from_config(config)?),
            RuleKind::SingleReference => Rule::SingleReference,
            RuleKind::Email => Rule::Email,
            RuleKind::FileSize => Rule::FileSize(FileSize::from_config(config)?),
        })
    }

    fn write_config(&self, config: &mut Map<String, Value>) {
        match self {
            Rule::NumericRange(range) => range.write_config(config),
            Rule::RegexString(regex) => {
                if let Some(pattern) = regex.pattern() {
                    config.insert("pattern".to_string(), json!(pattern));
                }
            }
            Rule::FileSize(size) => size.write_config(config),
            _ => {}
        }
    }

    /// Check a present (non-null) value, except for required-field which also sees null
    fn check(&self, value: &Value) -> (bool, String) {
        match self {
            Rule::NumericRange(range) => match value.as_f64() {
                Some(number) => range.check(number),
                None => (
                    false,
                    format!("Value '{}' is not a number", rules::quoted(value)),
                ),
            },
            Rule::RequiredField => rules::check_required(value),
            Rule::BooleanField => rules::check_boolean(value),
            Rule::EvenNumber => rules::check_parity(value, true),
            Rule::OddNumber => rules::check_parity(value, false),
            Rule::RegexString(regex) => regex.check(value),
            Rule::SingleReference => rules::check_single_reference(value),
            Rule::Email => rules::check_email(value),
            Rule::FileSize(size) => size.check(value),
        }
    }
}

/// Result of evaluating a rule against one value
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// `None` when the rule does not apply to the value
    pub result: Option<bool>,
    pub reason: String,
    /// Kinds of the effects fired for this outcome, in order
    pub fired: Vec<EffectKind>,
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        self.result == Some(true)
    }

    pub fn is_invalid(&self) -> bool {
        self.result == Some(false)
    }
}

/// A validation rule with the effects of both outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    rule: Rule,
    on_valid: Vec<Effect>,
    on_invalid: Vec<Effect>,
}

impl ValidationRule {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            on_valid: Vec::new(),
            on_invalid: Vec::new(),
        }
    }

    pub fn numeric_range(range: NumericRange) -> Self {
        Self::new(Rule::NumericRange(range))
    }

    pub fn required_field() -> Self {
        Self::new(Rule::RequiredField)
    }

    pub fn boolean_field() -> Self {
        Self::new(Rule::BooleanField)
    }

    pub fn even_number() -> Self {
        Self::new(Rule::EvenNumber)
    }

    pub fn odd_number() -> Self {
        Self::new(Rule::OddNumber)
    }

    /// Regex rule; `None` uses [`DEFAULT_PATTERN`]
    pub fn regex_string(pattern: Option<&str>) -> KeChainResult<Self> {
        Ok(Self::new(Rule::RegexString(RegexString::new(pattern)?)))
    }

    pub fn single_reference() -> Self {
        Self::new(Rule::SingleReference)
    }

    pub fn email() -> Self {
        Self::new(Rule::Email)
    }

    pub fn file_size(max_size: Option<f64>) -> KeChainResult<Self> {
        Ok(Self::new(Rule::FileSize(FileSize::new(max_size)?)))
    }

    pub fn with_on_valid(mut self, effects: Vec<Effect>) -> Self {
        self.on_valid = effects;
        self
    }

    pub fn with_on_invalid(mut self, effects: Vec<Effect>) -> Self {
        self.on_invalid = effects;
        self
    }

    pub fn push_on_valid(&mut self, effect: Effect) {
        self.on_valid.push(effect);
    }

    pub fn push_on_invalid(&mut self, effect: Effect) {
        self.on_invalid.push(effect);
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn kind(&self) -> RuleKind {
        self.rule.kind()
    }

    pub fn on_valid(&self) -> &[Effect] {
        &self.on_valid
    }

    pub fn on_invalid(&self) -> &[Effect] {
        &self.on_invalid
    }

    /// Evaluate `value` and fire the effects of the outcome.
    ///
    /// An absent (`null`) value is not applicable and fires nothing, except for
    /// the required-field rule which fails on it.
    pub fn evaluate(&self, value: &Value) -> Evaluation {
        if value.is_null() && !matches!(self.rule, Rule::RequiredField) {
            return Evaluation {
                result: None,
                reason: "No value to validate".to_string(),
                fired: Vec::new(),
            };
        }

        let (result, reason) = self.rule.check(value);
        let effects = if result {
            &self.on_valid
        } else {
            &self.on_invalid
        };
        let fired = effects
            .iter()
            .filter(|effect| effect.fire())
            .map(Effect::kind)
            .collect();

        Evaluation {
            result: Some(result),
            reason,
            fired,
        }
    }

    pub fn is_valid(&self, value: &Value) -> Option<bool> {
        self.evaluate(value).result
    }

    pub fn is_invalid(&self, value: &Value) -> Option<bool> {
        self.evaluate(value).result.map(|result| !result)
    }

    pub fn to_json(&self) -> Value {
        let mut config = Map::new();
        self.rule.write_config(&mut config);
        if !self.on_valid.is_empty() {
            config.insert(
                "on_valid".to_string(),
                Value::Array(self.on_valid.iter().map(Effect::to_json).collect()),
            );
        }
        if !self.on_invalid.is_empty() {
            config.insert(
                "on_invalid".to_string(),
                Value::Array(self.on_invalid.iter().map(Effect::to_json).collect()),
            );
        }
        json!({
            "vtype": self.rule.kind().tag(),
            "config": Value::Object(config),
        })
    }

    /// Parse a serialized `{vtype, config}` document.
    ///
    /// A missing tag is a [`KeChainError::Value`], an unknown one a
    /// [`KeChainError::UnknownType`]; the schema is checked after dispatch.
    pub fn parse(document: &Value, schemas: &SchemaRegistry) -> KeChainResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            KeChainError::illegal_argument(format!(
                "a validator must be a JSON object, got type {}",
                json_type_name(document)
            ))
        })?;
        let tag = object
            .get("vtype")
            .and_then(Value::as_str)
            .ok_or_else(|| KeChainError::Value("validator document has no `vtype`".to_string()))?;
        let kind = RuleKind::from_tag(tag)
            .ok_or_else(|| KeChainError::UnknownType(format!("unknown validator type '{}'", tag)))?;
        schemas.validate(SchemaKind::Validator, document)?;

        let empty = Map::new();
        let config = object
            .get("config")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        Ok(Self {
            rule: Rule::from_config(kind, config)?,
            on_valid: parse_effects(config, "on_valid", schemas)?,
            on_invalid: parse_effects(config, "on_invalid", schemas)?,
        })
    }

    /// Parse a list of serialized rules, failing on the first bad one
    pub fn parse_list(document: &Value, schemas: &SchemaRegistry) -> KeChainResult<Vec<Self>> {
        match document {
            Value::Array(items) => items.iter().map(|item| Self::parse(item, schemas)).collect(),
            other => Err(KeChainError::illegal_argument(format!(
                "validators must be a list, got type {}",
                json_type_name(other)
            ))),
        }
    }
}
