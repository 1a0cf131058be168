use super::CustomTitle;
use serde_json::{json, Map, Value};

/// A resolved title: what the renderer shows and what the meta records
pub(crate) struct Title {
    pub config: Value,
    pub meta: Value,
    pub show_value: &'static str,
}

/// Apply the title policy: `Default` uses `default_title`, `NoTitle` shows nothing
pub(crate) fn resolve_title(custom_title: &CustomTitle, default_title: &str) -> Title {
    match custom_title {
        CustomTitle::Default => Title {
            config: json!(default_title),
            meta: json!(default_title),
            show_value: "Default",
        },
        CustomTitle::NoTitle => Title {
            config: Value::Null,
            meta: json!(""),
            show_value: "No title",
        },
        CustomTitle::Custom(title) => Title {
            config: json!(title),
            meta: json!(title),
            show_value: "Custom Title",
        },
    }
}

/// Record the title in a meta document
pub(crate) fn set_title_meta(meta: &mut Map<String, Value>, title: &Title) {
    meta.insert("showTitleValue".to_string(), json!(title.show_value));
    meta.insert("customTitle".to_string(), title.meta.clone());
}

/// Record an optional maximum height in both documents
pub(crate) fn set_height(
    config: &mut Map<String, Value>,
    meta: &mut Map<String, Value>,
    max_height: Option<u32>,
) {
    match max_height {
        Some(height) => {
            config.insert("maxHeight".to_string(), json!(height));
            meta.insert("customHeight".to_string(), json!(height));
            meta.insert("showHeightValue".to_string(), json!("Custom max height"));
        }
        None => {
            meta.insert("customHeight".to_string(), Value::Null);
            meta.insert("showHeightValue".to_string(), json!("Auto"));
        }
    }
}

/// Run button label of a script widget, following the title policy
pub(crate) fn resolve_button_text(button_text: &CustomTitle, script_name: &str) -> (String, &'static str) {
    match button_text {
        CustomTitle::Default => (script_name.to_string(), "Default"),
        CustomTitle::NoTitle => (String::new(), "No text"),
        CustomTitle::Custom(text) => (text.clone(), "Custom text"),
    }
}

pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
