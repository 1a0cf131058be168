//! Canonical identifiers and object-or-identifier parameters
//!
//! Every public operation that accepts "a live object or its id" normalizes the
//! argument here, at the boundary, through one shared UUID check.

use crate::client::{Client, Lookup};
use crate::{KeChainError, KeChainResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Pattern every remote identifier must match
pub const UUID_PATTERN: &str =
    "^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

fn uuid_regex() -> &'static Regex {
    static UUID: OnceLock<Regex> = OnceLock::new();
    UUID.get_or_init(|| Regex::new(UUID_PATTERN).expect("UUID pattern is a valid regex"))
}

/// Returns true if `value` matches [`UUID_PATTERN`]
pub fn is_uuid(value: &str) -> bool {
    uuid_regex().is_match(value)
}

/// A validated remote identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse an identifier, naming `param` in the error when it is not a UUID
    pub fn parse(param: &str, value: &str) -> KeChainResult<Self> {
        if is_uuid(value) {
            Ok(ObjectId(value.to_string()))
        } else {
            Err(KeChainError::IllegalArgument(format!(
                "`{}` must be an object or a UUID string, got text '{}'",
                param, value
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = KeChainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_uuid(&value) {
            Ok(ObjectId(value))
        } else {
            Err(KeChainError::IllegalArgument(format!(
                "'{}' is not a valid UUID",
                value
            )))
        }
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A remote object type with an identifier
pub trait Identified {
    /// Human-readable kind used in error messages
    const KIND: &'static str;

    fn id(&self) -> &ObjectId;
}

/// Either a live object or the raw identifier string of one
#[derive(Debug)]
pub enum ObjectRef<'a, T> {
    Object(&'a T),
    Id(&'a str),
}

impl<T> Clone for ObjectRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectRef<'_, T> {}

impl<'a, T: Identified> From<&'a str> for ObjectRef<'a, T> {
    fn from(id: &'a str) -> Self {
        ObjectRef::Id(id)
    }
}

impl<'a, T: Identified> From<&'a String> for ObjectRef<'a, T> {
    fn from(id: &'a String) -> Self {
        ObjectRef::Id(id.as_str())
    }
}

impl<'a, T: Identified> From<&'a ObjectId> for ObjectRef<'a, T> {
    fn from(id: &'a ObjectId) -> Self {
        ObjectRef::Id(id.as_str())
    }
}

impl<'a, T: Identified + Lookup> ObjectRef<'a, T> {
    /// Normalize to an identifier without touching the client
    pub fn resolve_id(&self, param: &str) -> KeChainResult<ObjectId> {
        match self {
            ObjectRef::Object(object) => Ok(object.id().clone()),
            ObjectRef::Id(id) => ObjectId::parse(param, id),
        }
    }

    /// Normalize to a live object, fetching it when only the identifier is known.
    ///
    /// The UUID check runs before any lookup is attempted.
    pub fn resolve<C: Client + ?Sized>(&self, param: &str, client: &C) -> KeChainResult<Cow<'a, T>> {
        match self {
            ObjectRef::Object(object) => Ok(Cow::Borrowed(*object)),
            ObjectRef::Id(id) => {
                let id = ObjectId::parse(param, id)?;
                Ok(Cow::Owned(T::lookup(client, &id)?))
            }
        }
    }
}

/// Name of the JSON type of `value`, for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read an optional identifier out of a JSON document.
///
/// `null` means "not given"; any other non-string value is rejected with its type.
pub fn object_id_from_value(param: &str, value: &Value) -> KeChainResult<Option<ObjectId>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => ObjectId::parse(param, s).map(Some),
        other => Err(KeChainError::IllegalArgument(format!(
            "`{}` must be a UUID string, got type {}",
            param,
            json_type_name(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uuid_pattern_accepts_mixed_case() {
        assert!(is_uuid("5a0b5ab9-4ff4-4a3e-a5a8-0bd5b6a05c1e"));
        assert!(is_uuid("5A0B5AB9-4FF4-4A3E-A5A8-0BD5B6A05C1E"));
    }

    #[test]
    fn test_uuid_pattern_is_anchored() {
        assert!(!is_uuid("x5a0b5ab9-4ff4-4a3e-a5a8-0bd5b6a05c1e"));
        assert!(!is_uuid("5a0b5ab9-4ff4-4a3e-a5a8-0bd5b6a05c1e0"));
        assert!(!is_uuid("5a0b5ab94ff44a3ea5a80bd5b6a05c1e"));
        assert!(!is_uuid(""));
    }

    #[test]
    fn test_parse_names_parameter() {
        let err = ObjectId::parse("part_model", "bike").unwrap_err();
        assert!(err.is_argument_error());
        assert!(err.to_string().contains("part_model"));
        assert!(err.to_string().contains("bike"));
    }

    #[test]
    fn test_object_id_from_value() {
        assert_eq!(object_id_from_value("x", &Value::Null).unwrap(), None);
        let id = object_id_from_value("x", &json!("5a0b5ab9-4ff4-4a3e-a5a8-0bd5b6a05c1e"))
            .unwrap()
            .unwrap();
        assert_eq!(id.as_str(), "5a0b5ab9-4ff4-4a3e-a5a8-0bd5b6a05c1e");

        let err = object_id_from_value("activity_id", &json!(42)).unwrap_err();
        assert!(err.to_string().contains("activity_id"));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_deserialize_rejects_non_uuid() {
        let result: Result<ObjectId, _> = serde_json::from_value(json!("not-a-uuid"));
        assert!(result.is_err());
    }
}
