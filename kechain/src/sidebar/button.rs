use super::UriTarget;
use crate::identifiers::json_type_name;
use crate::representations::FontAwesomeMode;
use crate::{KeChainError, KeChainResult};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Translated display names a button may carry besides `displayName`
pub const TRANSLATION_KEYS: [&str; 4] = [
    "displayName_nl",
    "displayName_de",
    "displayName_fr",
    "displayName_it",
];

const KNOWN_KEYS: [&str; 7] = [
    "displayName",
    "displayIcon",
    "displayIconMode",
    "uri",
    "uriTarget",
    "order",
    "itemType",
];

/// One custom button in a scope sidebar
#[derive(Debug, Clone, PartialEq)]
pub struct SideBarButton {
    pub display_name: String,
    pub display_icon: String,
    pub display_icon_mode: FontAwesomeMode,
    pub uri: String,
    pub uri_target: UriTarget,
    /// Position in the sidebar; renumbered whenever the list is pushed
    pub order: usize,
    translations: BTreeMap<String, String>,
}

impl SideBarButton {
    pub fn new(
        title: impl Into<String>,
        icon: impl Into<String>,
        uri: impl Into<String>,
        uri_target: UriTarget,
    ) -> KeChainResult<Self> {
        let display_name = title.into();
        let display_icon = icon.into();
        let uri = uri.into();
        if display_name.trim().is_empty() {
            return Err(KeChainError::illegal_argument(
                "a side-bar button needs a non-empty title",
            ));
        }
        if uri.trim().is_empty() {
            return Err(KeChainError::illegal_argument(
                "a side-bar button needs a non-empty uri",
            ));
        }
        Ok(Self {
            display_name,
            display_icon,
            display_icon_mode: FontAwesomeMode::default(),
            uri,
            uri_target,
            order: 0,
            translations: BTreeMap::new(),
        })
    }

    pub fn with_icon_mode(mut self, mode: FontAwesomeMode) -> Self {
        self.display_icon_mode = mode;
        self
    }

    /// Add a translated display name, e.g. `displayName_nl`
    pub fn with_translation(
        mut self,
        key: &str,
        text: impl Into<String>,
    ) -> KeChainResult<Self> {
        if !TRANSLATION_KEYS.contains(&key) {
            return Err(unsupported_attribute(key));
        }
        self.translations.insert(key.to_string(), text.into());
        Ok(self)
    }

    pub fn translation(&self, key: &str) -> Option<&str> {
        self.translations.get(key).map(String::as_str)
    }

    pub fn to_json(&self) -> Value {
        let mut button = Map::new();
        button.insert("displayName".to_string(), json!(self.display_name));
        button.insert("displayIcon".to_string(), json!(self.display_icon));
        button.insert("uriTarget".to_string(), json!(self.uri_target.as_str()));
        button.insert("uri".to_string(), json!(self.uri));
        button.insert("order".to_string(), json!(self.order));
        button.insert(
            "displayIconMode".to_string(),
            json!(self.display_icon_mode.as_str()),
        );
        for (key, text) in &self.translations {
            button.insert(key.clone(), json!(text));
        }
        Value::Object(button)
    }

    /// Parse one `customNavigation` entry. Only button items are supported.
    pub fn parse(document: &Value) -> KeChainResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            KeChainError::illegal_argument(format!(
                "a side-bar button must be a JSON object, got type {}",
                json_type_name(document)
            ))
        })?;
        match object.get("itemType").and_then(Value::as_str) {
            None | Some("BUTTON") => {}
            Some(other) => {
                return Err(KeChainError::UnknownType(format!(
                    "side-bar item type '{}' is not supported",
                    other
                )))
            }
        }
        if let Some(key) = object
            .keys()
            .find(|key| !KNOWN_KEYS.contains(&key.as_str()) && !TRANSLATION_KEYS.contains(&key.as_str()))
        {
            return Err(unsupported_attribute(key));
        }

        let text = |key: &str| -> KeChainResult<String> {
            match object.get(key) {
                Some(Value::String(text)) => Ok(text.clone()),
                Some(other) => Err(KeChainError::illegal_argument(format!(
                    "`{}` must be a string, got type {}",
                    key,
                    json_type_name(other)
                ))),
                None => Err(KeChainError::Value(format!(
                    "side-bar button has no `{}`",
                    key
                ))),
            }
        };
        let uri_target = match object.get("uriTarget") {
            None => UriTarget::default(),
            Some(value) => value.as_str().and_then(UriTarget::parse).ok_or_else(|| {
                KeChainError::illegal_argument(format!(
                    "`uriTarget` must be 'internal' or 'external', got {}",
                    value
                ))
            })?,
        };
        let icon_mode = match object.get("displayIconMode") {
            None => FontAwesomeMode::default(),
            Some(value) => value.as_str().and_then(FontAwesomeMode::parse).ok_or_else(|| {
                KeChainError::illegal_argument(format!(
                    "`displayIconMode` must be a FontAwesome mode, got {}",
                    value
                ))
            })?,
        };
        let order = match object.get("order") {
            None => 0,
            Some(value) => value.as_u64().map(|order| order as usize).ok_or_else(|| {
                KeChainError::illegal_argument(format!(
                    "`order` must be a non-negative integer, got {}",
                    value
                ))
            })?,
        };

        let mut button = SideBarButton::new(
            text("displayName")?,
            text("displayIcon")?,
            text("uri")?,
            uri_target,
        )?
        .with_icon_mode(icon_mode);
        button.order = order;
        for key in TRANSLATION_KEYS {
            if object.contains_key(key) {
                let translated = text(key)?;
                button = button.with_translation(key, translated)?;
            }
        }
        Ok(button)
    }
}

fn unsupported_attribute(key: &str) -> KeChainError {
    KeChainError::illegal_argument(format!(
        "Attribute '{}' is not supported in the configuration of a side-bar button",
        key
    ))
}
