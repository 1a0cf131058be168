//! The options document of a property: its validators, representations and
//! select-list choices, plus any other keys the platform stores there.

use crate::client::{ensure_success, Client};
use crate::identifiers::json_type_name;
use crate::models::Property;
use crate::representations::{Representation, RepresentationTarget};
use crate::schemas::{SchemaKind, SchemaRegistry};
use crate::validators::{Evaluation, ValidationRule};
use crate::{KeChainError, KeChainResult};
use serde_json::{Map, Value};
use tracing::debug;

const VALIDATORS: &str = "validators";
const REPRESENTATIONS: &str = "representations";
const VALUE_CHOICES: &str = "value_choices";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyOptions {
    validators: Vec<ValidationRule>,
    representations: Vec<Representation>,
    value_choices: Option<Vec<Value>>,
    other: Map<String, Value>,
}

impl PropertyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validators(&self) -> &[ValidationRule] {
        &self.validators
    }

    pub fn representations(&self) -> &[Representation] {
        &self.representations
    }

    pub fn value_choices(&self) -> Option<&[Value]> {
        self.value_choices.as_deref()
    }

    /// Keys other than validators, representations and value choices
    pub fn other(&self) -> &Map<String, Value> {
        &self.other
    }

    pub fn with_validators(mut self, validators: Vec<ValidationRule>) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_representations(mut self, representations: Vec<Representation>) -> Self {
        self.representations = representations;
        self
    }

    pub fn with_value_choices(mut self, choices: Vec<Value>) -> Self {
        self.value_choices = Some(choices);
        self
    }

    /// Evaluate every validator against `value`, in order
    pub fn validate(&self, value: &Value) -> Vec<Evaluation> {
        self.validators
            .iter()
            .map(|validator| validator.evaluate(value))
            .collect()
    }

    /// `None` when no validator applies, otherwise whether all applicable ones pass
    pub fn is_valid(&self, value: &Value) -> Option<bool> {
        self.validate(value)
            .iter()
            .filter_map(|evaluation| evaluation.result)
            .reduce(|all, result| all && result)
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut options = self.other.clone();
        if !self.validators.is_empty() {
            options.insert(
                VALIDATORS.to_string(),
                Value::Array(self.validators.iter().map(ValidationRule::to_json).collect()),
            );
        }
        if !self.representations.is_empty() {
            options.insert(
                REPRESENTATIONS.to_string(),
                Value::Array(
                    self.representations
                        .iter()
                        .map(Representation::to_json)
                        .collect(),
                ),
            );
        }
        if let Some(choices) = &self.value_choices {
            options.insert(VALUE_CHOICES.to_string(), Value::Array(choices.clone()));
        }
        options
    }

    pub fn parse(document: &Value, schemas: &SchemaRegistry) -> KeChainResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            KeChainError::illegal_argument(format!(
                "property options must be a JSON object, got type {}",
                json_type_name(document)
            ))
        })?;
        schemas.validate(SchemaKind::PropertyOptions, document)?;

        let mut other = object.clone();
        let validators = match other.remove(VALIDATORS) {
            Some(list) => ValidationRule::parse_list(&list, schemas)?,
            None => Vec::new(),
        };
        let representations = match other.remove(REPRESENTATIONS) {
            Some(list) => Representation::parse_list(&list, schemas)?,
            None => Vec::new(),
        };
        let value_choices = match other.remove(VALUE_CHOICES) {
            Some(Value::Array(choices)) => Some(choices),
            _ => None,
        };

        Ok(Self {
            validators,
            representations,
            value_choices,
            other,
        })
    }
}

/// Edits the options of one property and pushes the full document on every change
#[derive(Debug)]
pub struct PropertyEditor<'e, C: Client> {
    client: &'e C,
    schemas: &'e SchemaRegistry,
    property: Property,
    options: PropertyOptions,
}

impl<'e, C: Client> PropertyEditor<'e, C> {
    pub(crate) fn new(
        client: &'e C,
        schemas: &'e SchemaRegistry,
        property: Property,
    ) -> KeChainResult<Self> {
        let options = PropertyOptions::parse(&Value::Object(property.options.clone()), schemas)?;
        Ok(Self {
            client,
            schemas,
            property,
            options,
        })
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn options(&self) -> &PropertyOptions {
        &self.options
    }

    /// Replace all validators
    pub fn set_validators(&mut self, validators: Vec<ValidationRule>) -> KeChainResult<()> {
        let options = self.options.clone().with_validators(validators);
        self.save(options)
    }

    /// Replace all representations; every one must apply to this property's type
    pub fn set_representations(
        &mut self,
        representations: Vec<Representation>,
    ) -> KeChainResult<()> {
        let target = RepresentationTarget::Property(self.property.property_type);
        for representation in &representations {
            representation.check_applicable(target)?;
        }
        let options = self.options.clone().with_representations(representations);
        self.save(options)
    }

    fn save(&mut self, options: PropertyOptions) -> KeChainResult<()> {
        let document = options.to_json();
        self.schemas
            .validate(SchemaKind::PropertyOptions, &Value::Object(document.clone()))?;

        self.options = options;
        self.property.options = document.clone();
        debug!(property = %self.property.id, "pushing property options");
        let response = self
            .client
            .update_property_options(&self.property.id, &document)?;
        ensure_success(response, "Could not update the options of the property")
    }
}
