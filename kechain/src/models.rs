//! Data carried by the remote objects this engine references.
//!
//! These are plain snapshots of what the client returns; creating, updating and
//! deleting them is the client's business.

use crate::identifiers::{Identified, ObjectId, ObjectRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether a part or property is a model (class) or an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Instance,
    Model,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Instance => "INSTANCE",
            Category::Model => "MODEL",
        }
    }
}

/// Value types of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    FloatValue,
    IntValue,
    TextValue,
    CharValue,
    LinkValue,
    BooleanValue,
    DatetimeValue,
    DateValue,
    TimeValue,
    AttachmentValue,
    GeojsonValue,
    SingleSelectValue,
    MultiSelectValue,
    ReferencesValue,
    ActivityReferencesValue,
    UserReferencesValue,
    ScopeReferencesValue,
    ServiceReferencesValue,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::FloatValue => "FLOAT_VALUE",
            PropertyType::IntValue => "INT_VALUE",
            PropertyType::TextValue => "TEXT_VALUE",
            PropertyType::CharValue => "CHAR_VALUE",
            PropertyType::LinkValue => "LINK_VALUE",
            PropertyType::BooleanValue => "BOOLEAN_VALUE",
            PropertyType::DatetimeValue => "DATETIME_VALUE",
            PropertyType::DateValue => "DATE_VALUE",
            PropertyType::TimeValue => "TIME_VALUE",
            PropertyType::AttachmentValue => "ATTACHMENT_VALUE",
            PropertyType::GeojsonValue => "GEOJSON_VALUE",
            PropertyType::SingleSelectValue => "SINGLE_SELECT_VALUE",
            PropertyType::MultiSelectValue => "MULTI_SELECT_VALUE",
            PropertyType::ReferencesValue => "REFERENCES_VALUE",
            PropertyType::ActivityReferencesValue => "ACTIVITY_REFERENCES_VALUE",
            PropertyType::UserReferencesValue => "USER_REFERENCES_VALUE",
            PropertyType::ScopeReferencesValue => "SCOPE_REFERENCES_VALUE",
            PropertyType::ServiceReferencesValue => "SERVICE_REFERENCES_VALUE",
        }
    }

    /// Reference types pointing at other objects
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            PropertyType::ReferencesValue
                | PropertyType::ActivityReferencesValue
                | PropertyType::UserReferencesValue
                | PropertyType::ScopeReferencesValue
                | PropertyType::ServiceReferencesValue
        )
    }
}

/// Kind of script a service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptType {
    PythonScript,
    Notebook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: ObjectId,
    pub name: String,
    pub category: Category,
    /// The model an instance was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: ObjectId,
    pub name: String,
    pub part_id: ObjectId,
    pub category: Category,
    pub property_type: PropertyType,
    #[serde(default, alias = "value_options")]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ObjectId,
    pub name: String,
    pub scope_id: ObjectId,
    #[serde(default)]
    pub customization: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ObjectId,
    pub name: String,
    pub scope_id: ObjectId,
    pub script_type: ScriptType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

macro_rules! identified {
    ($model:ident, $kind:literal) => {
        impl Identified for $model {
            const KIND: &'static str = $kind;

            fn id(&self) -> &ObjectId {
                &self.id
            }
        }

        impl<'a> From<&'a $model> for ObjectRef<'a, $model> {
            fn from(object: &'a $model) -> Self {
                ObjectRef::Object(object)
            }
        }
    };
}

identified!(Part, "Part");
identified!(Property, "Property");
identified!(Activity, "Activity");
identified!(Service, "Service");
identified!(Scope, "Scope");
