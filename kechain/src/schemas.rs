//! Fixed JSON-Schema documents and the registry that compiles them.
//!
//! Every payload is checked here before it is accepted on parse or handed to
//! the client. The registry is built once by [`crate::Engine`] and passed by
//! reference; nothing in this module holds global state.

use crate::identifiers::UUID_PATTERN;
use crate::representations::RepresentationKind;
use crate::validators::{EffectKind, RuleKind};
use crate::widgets::WidgetName;
use crate::{KeChainError, KeChainResult};
use jsonschema::Validator;
use serde_json::{json, Value};
use std::fmt;

const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";
const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Renderer component types accepted in a widget `config.xtype`
pub const COMPONENT_XTYPES: &[&str] = &[
    "propertyGrid",
    "superGrid",
    "paginatedSuperGrid",
    "filteredGrid",
    "htmlPanel",
    "executeService",
    "notebookPanel",
    "propertyAttachmentViewer",
    "activityNavigationBar",
    "panel",
    "toolbar",
    "displayfield",
];

/// The documents a [`SchemaRegistry`] can check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Effect,
    Validator,
    Validators,
    Representation,
    Representations,
    PropertyOptions,
    Component,
    Widgets,
    Customization,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 9] = [
        SchemaKind::Effect,
        SchemaKind::Validator,
        SchemaKind::Validators,
        SchemaKind::Representation,
        SchemaKind::Representations,
        SchemaKind::PropertyOptions,
        SchemaKind::Component,
        SchemaKind::Widgets,
        SchemaKind::Customization,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SchemaKind::Effect => "Validator effect",
            SchemaKind::Validator => "Single validator",
            SchemaKind::Validators => "Validators",
            SchemaKind::Representation => "Single representation",
            SchemaKind::Representations => "Representations",
            SchemaKind::PropertyOptions => "Property options",
            SchemaKind::Component => "Component",
            SchemaKind::Widgets => "Widgets",
            SchemaKind::Customization => "Activity customization",
        }
    }

    /// The schema document itself
    pub fn document(&self) -> Value {
        match self {
            SchemaKind::Effect => with_draft(DRAFT_04, effect_schema()),
            SchemaKind::Validator => with_draft(DRAFT_04, validator_schema()),
            SchemaKind::Validators => json!({
                "$schema": DRAFT_04,
                "title": "Validators",
                "type": "array",
                "items": validator_schema()
            }),
            SchemaKind::Representation => with_draft(DRAFT_04, representation_schema()),
            SchemaKind::Representations => json!({
                "$schema": DRAFT_04,
                "title": "Representations",
                "type": "array",
                "items": representation_schema()
            }),
            SchemaKind::PropertyOptions => json!({
                "$schema": DRAFT_04,
                "title": "Toplevel property options",
                "type": "object",
                "additionalProperties": true,
                "properties": {
                    "validators": {"type": "array", "items": validator_schema()},
                    "representations": {"type": "array", "items": representation_schema()},
                    "value_choices": {"type": "array"}
                }
            }),
            SchemaKind::Component => with_draft(DRAFT_04, component_schema()),
            SchemaKind::Widgets => json!({
                "$schema": DRAFT_07,
                "title": "Widgets",
                "type": "array",
                "items": widget_schema(),
                "definitions": definitions()
            }),
            SchemaKind::Customization => json!({
                "$schema": DRAFT_07,
                "title": "Activity customization",
                "type": "object",
                "properties": {
                    "ext": {
                        "type": "object",
                        "required": ["widgets"],
                        "properties": {
                            "widgets": {"type": "array", "items": widget_schema()}
                        }
                    }
                },
                "definitions": definitions()
            }),
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

fn with_draft(draft: &str, mut schema: Value) -> Value {
    if let Value::Object(map) = &mut schema {
        map.insert("$schema".to_string(), json!(draft));
    }
    schema
}

fn uuid_string() -> Value {
    json!({"type": "string", "pattern": UUID_PATTERN})
}

fn definitions() -> Value {
    json!({
        "uuidString": uuid_string(),
        "nullString": {"type": ["string", "null"]},
        "positiveInteger": {"type": "integer", "minimum": 0},
        "booleanNull": {"type": ["boolean", "null"]}
    })
}

fn effect_schema() -> Value {
    let tags: Vec<&str> = EffectKind::ALL.iter().map(|kind| kind.tag()).collect();
    json!({
        "title": "Validator effect",
        "type": "object",
        "additionalProperties": false,
        "required": ["effect", "config"],
        "properties": {
            "effect": {"type": "string", "enum": tags},
            "config": {"type": "object"}
        }
    })
}

fn validator_schema() -> Value {
    let tags: Vec<&str> = RuleKind::ALL.iter().map(|kind| kind.tag()).collect();
    json!({
        "title": "Single validator",
        "type": "object",
        "additionalProperties": false,
        "required": ["vtype", "config"],
        "properties": {
            "vtype": {"type": "string", "enum": tags},
            "config": {
                "type": "object",
                "properties": {
                    "minvalue": {"type": ["number", "null"]},
                    "maxvalue": {"type": ["number", "null"]},
                    "stepsize": {"type": ["number", "null"]},
                    "enforce_stepsize": {"type": ["boolean", "null"]},
                    "pattern": {"type": ["string", "null"]},
                    "maxSize": {"type": ["number", "null"]},
                    "on_valid": {"type": "array", "items": effect_schema()},
                    "on_invalid": {"type": "array", "items": effect_schema()}
                }
            }
        }
    })
}

fn representation_schema() -> Value {
    let tags: Vec<&str> = RepresentationKind::ALL
        .iter()
        .map(|kind| kind.tag())
        .collect();
    json!({
        "title": "Single representation",
        "type": "object",
        "additionalProperties": false,
        "required": ["rtype", "config"],
        "properties": {
            "rtype": {"type": "string", "enum": tags},
            "config": {"type": "object"}
        }
    })
}

fn component_schema() -> Value {
    json!({
        "title": "Component",
        "type": "object",
        "required": ["xtype"],
        "properties": {
            "xtype": {"type": "string", "enum": COMPONENT_XTYPES},
            "filter": {
                "type": "object",
                "properties": {
                    "activity_id": uuid_string(),
                    "part": uuid_string(),
                    "model": uuid_string(),
                    "parent": uuid_string()
                }
            },
            "title": {"type": ["string", "null"]},
            "viewModel": {"type": "object"}
        }
    })
}

fn widget_schema() -> Value {
    let names: Vec<&str> = WidgetName::ALL.iter().map(|name| name.as_str()).collect();
    json!({
        "type": "object",
        "required": ["name", "config"],
        "properties": {
            "name": {"type": "string", "enum": names},
            "config": {"type": "object"},
            "meta": {"type": "object"},
            "id": {"$ref": "#/definitions/nullString"},
            "parentId": {"$ref": "#/definitions/nullString"}
        },
        "allOf": [
            {
                "if": {"properties": {"name": {"const": "attachmentViewerWidget"}}},
                "then": {
                    "required": ["meta"],
                    "properties": {
                        "meta": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["propertyInstanceId", "activityId"],
                            "properties": {
                                "propertyInstanceId": {"$ref": "#/definitions/uuidString"},
                                "activityId": {"$ref": "#/definitions/uuidString"},
                                "showTitleValue": {"$ref": "#/definitions/nullString"},
                                "customTitle": {"$ref": "#/definitions/nullString"},
                                "noPadding": {"$ref": "#/definitions/booleanNull"},
                                "customHeight": {"$ref": "#/definitions/positiveInteger"}
                            }
                        }
                    }
                }
            },
            {
                "if": {"properties": {"name": {"const": "htmlWidget"}}},
                "then": {
                    "required": ["meta"],
                    "properties": {
                        "meta": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["html"],
                            "properties": {
                                "showTitleValue": {"$ref": "#/definitions/nullString"},
                                "customTitle": {"$ref": "#/definitions/nullString"},
                                "noPadding": {"$ref": "#/definitions/booleanNull"},
                                "customHeight": {"$ref": "#/definitions/positiveInteger"},
                                "collapsed": {"$ref": "#/definitions/booleanNull"},
                                "collapsible": {"$ref": "#/definitions/booleanNull"},
                                "html": {"type": "string"}
                            }
                        }
                    }
                }
            },
            {
                "if": {"properties": {"name": {"const": "propertyGridWidget"}}},
                "then": {
                    "required": ["meta"],
                    "properties": {
                        "meta": {
                            "type": "object",
                            "required": ["activityId", "partInstanceId"],
                            "properties": {
                                "activityId": {"$ref": "#/definitions/uuidString"},
                                "partInstanceId": {"$ref": "#/definitions/uuidString"}
                            }
                        }
                    }
                }
            },
            {
                "if": {"properties": {"name": {"const": "taskNavigationBarWidget"}}},
                "then": {
                    "required": ["meta"],
                    "properties": {
                        "meta": {
                            "type": "object",
                            "required": ["activityId", "taskButtons"],
                            "properties": {
                                "activityId": {"$ref": "#/definitions/uuidString"},
                                "alignment": {"type": "string", "enum": ["left", "center"]},
                                "taskButtons": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "required": ["activityId"],
                                        "properties": {
                                            "activityId": {"$ref": "#/definitions/uuidString"},
                                            "customText": {"type": "string"},
                                            "emphasize": {"type": "boolean"}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        ]
    })
}

/// Compiled validators for every [`SchemaKind`]
pub struct SchemaRegistry {
    compiled: Vec<(SchemaKind, Validator)>,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.compiled.len())
            .finish()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Compile every built-in schema
    pub fn new() -> Self {
        let compiled = SchemaKind::ALL
            .iter()
            .map(|kind| {
                let validator = jsonschema::validator_for(&kind.document())
                    .unwrap_or_else(|err| panic!("built-in {} schema is invalid: {}", kind, err));
                (*kind, validator)
            })
            .collect();
        Self { compiled }
    }

    fn validator(&self, kind: SchemaKind) -> &Validator {
        // every kind is compiled in `new`
        &self
            .compiled
            .iter()
            .find(|(k, _)| *k == kind)
            .unwrap_or_else(|| unreachable!("schema {} was not compiled", kind))
            .1
    }

    pub fn is_valid(&self, kind: SchemaKind, instance: &Value) -> bool {
        self.validator(kind).is_valid(instance)
    }

    /// Check `instance` against the schema of `kind`.
    ///
    /// All violations are reported, each with its JSON pointer when not at the root.
    pub fn validate(&self, kind: SchemaKind, instance: &Value) -> KeChainResult<()> {
        let messages: Vec<String> = self
            .validator(kind)
            .iter_errors(instance)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{} at '{}'", error, path)
                }
            })
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(KeChainError::Schema(format!(
                "{} does not match its schema: {}",
                kind,
                messages.join("; ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_schema_compiles() {
        let registry = SchemaRegistry::new();
        for kind in SchemaKind::ALL {
            assert_eq!(registry.compiled.iter().filter(|(k, _)| *k == kind).count(), 1);
        }
    }

    #[test]
    fn test_validator_schema_requires_keys() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_valid(
            SchemaKind::Validator,
            &json!({"vtype": "requiredFieldValidator", "config": {}})
        ));
        let err = registry
            .validate(SchemaKind::Validator, &json!({"vtype": "requiredFieldValidator"}))
            .unwrap_err();
        assert!(matches!(err, KeChainError::Schema(_)));
        assert!(err.to_string().contains("config"));
    }

    #[test]
    fn test_validator_schema_rejects_extra_top_level_keys() {
        let registry = SchemaRegistry::new();
        assert!(!registry.is_valid(
            SchemaKind::Validator,
            &json!({"vtype": "requiredFieldValidator", "config": {}, "extra": 1})
        ));
    }

    #[test]
    fn test_component_schema_checks_uuid_pattern() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_valid(
            SchemaKind::Component,
            &json!({"xtype": "superGrid", "filter": {"model": "5a0b5ab9-4ff4-4a3e-a5a8-0bd5b6a05c1e"}})
        ));
        assert!(!registry.is_valid(
            SchemaKind::Component,
            &json!({"xtype": "superGrid", "filter": {"model": "bike"}})
        ));
        assert!(!registry.is_valid(SchemaKind::Component, &json!({"title": "no xtype"})));
    }

    #[test]
    fn test_html_widget_meta_is_closed() {
        let registry = SchemaRegistry::new();
        let widget = json!([{
            "name": "htmlWidget",
            "config": {"xtype": "htmlPanel", "title": ""},
            "meta": {"html": "", "showTitleValue": "No title", "customTitle": "", "unexpected": 1}
        }]);
        assert!(!registry.is_valid(SchemaKind::Widgets, &widget));
    }

    #[test]
    fn test_customization_allows_other_keys() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_valid(
            SchemaKind::Customization,
            &json!({"ext": {"widgets": []}, "theme": "dark"})
        ));
        assert!(!registry.is_valid(
            SchemaKind::Customization,
            &json!({"ext": {"widgets": [{"name": "noSuchWidget", "config": {}}]}})
        ));
    }
}
