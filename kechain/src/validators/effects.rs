use crate::identifiers::json_type_name;
use crate::schemas::{SchemaKind, SchemaRegistry};
use crate::{KeChainError, KeChainResult};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::trace;

/// Text shown by text and error-text effects when none is configured
pub const DEFAULT_ERROR_TEXT: &str = "The validation resulted in an error.";

const APPLY_CSS: &str = "applyCss";
const TEXT: &str = "text";

/// The kinds of declarative effect a rule can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    None,
    Visual,
    Text,
    ErrorText,
    HelpText,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::None,
        EffectKind::Visual,
        EffectKind::Text,
        EffectKind::ErrorText,
        EffectKind::HelpText,
    ];

    /// The `effect` tag on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            EffectKind::None => "noneEffect",
            EffectKind::Visual => "visualEffect",
            EffectKind::Text => "textEffect",
            EffectKind::ErrorText => "errorTextEffect",
            EffectKind::HelpText => "helpTextEffect",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    fn default_text(&self) -> Option<&'static str> {
        match self {
            EffectKind::Text | EffectKind::ErrorText => Some(DEFAULT_ERROR_TEXT),
            EffectKind::HelpText => Some(""),
            EffectKind::None | EffectKind::Visual => None,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A UI consequence of a validation outcome, replayed by the front end.
///
/// Locally an effect is only data; [`Effect::fire`] does nothing but report success.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    kind: EffectKind,
    config: Map<String, Value>,
}

impl Effect {
    fn with(kind: EffectKind, key: &str, value: impl Into<String>) -> Self {
        let mut config = Map::new();
        config.insert(key.to_string(), Value::String(value.into()));
        Self { kind, config }
    }

    pub fn none() -> Self {
        Self {
            kind: EffectKind::None,
            config: Map::new(),
        }
    }

    /// Visual effect applying the given CSS class
    pub fn visual(apply_css: impl Into<String>) -> Self {
        Self::with(EffectKind::Visual, APPLY_CSS, apply_css)
    }

    pub fn valid_visual() -> Self {
        Self::visual("valid")
    }

    pub fn invalid_visual() -> Self {
        Self::visual("invalid")
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with(EffectKind::Text, TEXT, text)
    }

    pub fn error_text(text: impl Into<String>) -> Self {
        Self::with(EffectKind::ErrorText, TEXT, text)
    }

    pub fn help_text(text: impl Into<String>) -> Self {
        Self::with(EffectKind::HelpText, TEXT, text)
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// CSS class of a visual effect
    pub fn apply_css(&self) -> Option<&str> {
        match self.kind {
            EffectKind::Visual => self.config.get(APPLY_CSS).and_then(Value::as_str),
            _ => None,
        }
    }

    /// Message of a text-bearing effect
    pub fn message(&self) -> Option<&str> {
        self.kind
            .default_text()
            .map(|default| self.config.get(TEXT).and_then(Value::as_str).unwrap_or(default))
    }

    pub fn fire(&self) -> bool {
        trace!(effect = %self.kind, "effect fired");
        true
    }

    pub fn to_json(&self) -> Value {
        json!({
            "effect": self.kind.tag(),
            "config": Value::Object(self.config.clone()),
        })
    }

    /// Parse a serialized `{effect, config}` document
    pub fn parse(document: &Value, schemas: &SchemaRegistry) -> KeChainResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            KeChainError::illegal_argument(format!(
                "an effect must be a JSON object, got type {}",
                json_type_name(document)
            ))
        })?;
        let tag = object
            .get("effect")
            .and_then(Value::as_str)
            .ok_or_else(|| KeChainError::Value("effect document has no `effect` tag".to_string()))?;
        let kind = EffectKind::from_tag(tag)
            .ok_or_else(|| KeChainError::UnknownType(format!("unknown effect '{}'", tag)))?;
        schemas.validate(SchemaKind::Effect, document)?;

        let mut config = object
            .get("config")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match kind {
            EffectKind::Visual => {
                if !config.contains_key(APPLY_CSS) {
                    config.insert(APPLY_CSS.to_string(), json!("valid"));
                }
                if !config[APPLY_CSS].is_string() {
                    return Err(KeChainError::illegal_argument(format!(
                        "`{}` of a visual effect must be a string, got type {}",
                        APPLY_CSS,
                        json_type_name(&config[APPLY_CSS])
                    )));
                }
            }
            EffectKind::Text | EffectKind::ErrorText | EffectKind::HelpText => {
                if !config.contains_key(TEXT) {
                    let default = kind.default_text().unwrap_or_default();
                    config.insert(TEXT.to_string(), json!(default));
                }
                if !config[TEXT].is_string() {
                    return Err(KeChainError::illegal_argument(format!(
                        "`{}` of a {} must be a string, got type {}",
                        TEXT,
                        kind,
                        json_type_name(&config[TEXT])
                    )));
                }
            }
            EffectKind::None => {}
        }

        Ok(Self { kind, config })
    }
}

/// Parse an optional list of effects held under `key` of a rule config
pub(crate) fn parse_effects(
    config: &Map<String, Value>,
    key: &str,
    schemas: &SchemaRegistry,
) -> KeChainResult<Vec<Effect>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| Effect::parse(item, schemas))
            .collect(),
        Some(other) => Err(KeChainError::illegal_argument(format!(
            "`{}` must be a list of effects, got type {}",
            key,
            json_type_name(other)
        ))),
    }
}
