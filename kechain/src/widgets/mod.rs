//! Activity widgets: the paired `config`/`meta` documents the front end renders.

mod customization;
mod helpers;

pub use customization::ExtCustomization;

use crate::identifiers::{json_type_name, ObjectRef};
use crate::models::{Part, Property};
use crate::{KeChainError, KeChainResult};
use serde_json::{json, Map, Value};
use std::fmt;

/// Names of the supported widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetName {
    Json,
    PropertyGrid,
    SuperGrid,
    FilteredGrid,
    Html,
    Service,
    Notebook,
    AttachmentViewer,
    TaskNavigationBar,
    MultiColumn,
}

impl WidgetName {
    pub const ALL: [WidgetName; 10] = [
        WidgetName::Json,
        WidgetName::PropertyGrid,
        WidgetName::SuperGrid,
        WidgetName::FilteredGrid,
        WidgetName::Html,
        WidgetName::Service,
        WidgetName::Notebook,
        WidgetName::AttachmentViewer,
        WidgetName::TaskNavigationBar,
        WidgetName::MultiColumn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetName::Json => "jsonWidget",
            WidgetName::PropertyGrid => "propertyGridWidget",
            WidgetName::SuperGrid => "superGridWidget",
            WidgetName::FilteredGrid => "filteredGridWidget",
            WidgetName::Html => "htmlWidget",
            WidgetName::Service => "serviceWidget",
            WidgetName::Notebook => "notebookWidget",
            WidgetName::AttachmentViewer => "attachmentViewerWidget",
            WidgetName::TaskNavigationBar => "taskNavigationBarWidget",
            WidgetName::MultiColumn => "multiColumnWidget",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|widget| widget.as_str() == name)
    }
}

impl fmt::Display for WidgetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured widget
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub name: WidgetName,
    pub config: Map<String, Value>,
    pub meta: Option<Map<String, Value>>,
    /// Local identifier of a multi-column container
    pub id: Option<String>,
    /// Local identifier of the multi-column container holding this widget
    pub parent_id: Option<String>,
}

impl Widget {
    pub fn new(name: WidgetName, config: Map<String, Value>, meta: Option<Map<String, Value>>) -> Self {
        Self {
            name,
            config,
            meta,
            id: None,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Read a string from `config` by JSON pointer, e.g. `/filter/part`
    pub fn config_str(&self, pointer: &str) -> Option<&str> {
        lookup_str(&self.config, pointer)
    }

    /// Read a value from `meta` by key
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.as_ref().and_then(|meta| meta.get(key))
    }

    pub fn to_json(&self) -> Value {
        let mut widget = Map::new();
        widget.insert("name".to_string(), json!(self.name.as_str()));
        widget.insert("config".to_string(), Value::Object(self.config.clone()));
        if let Some(meta) = &self.meta {
            widget.insert("meta".to_string(), Value::Object(meta.clone()));
        }
        if let Some(id) = &self.id {
            widget.insert("id".to_string(), json!(id));
        }
        if let Some(parent_id) = &self.parent_id {
            widget.insert("parentId".to_string(), json!(parent_id));
        }
        Value::Object(widget)
    }

    pub fn parse(document: &Value) -> KeChainResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            KeChainError::illegal_argument(format!(
                "a widget must be a JSON object, got type {}",
                json_type_name(document)
            ))
        })?;
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| KeChainError::Value("widget document has no `name`".to_string()))?;
        let name = WidgetName::parse(name)
            .ok_or_else(|| KeChainError::UnknownType(format!("unknown widget '{}'", name)))?;
        let map = |key: &str| -> KeChainResult<Option<Map<String, Value>>> {
            match object.get(key) {
                None => Ok(None),
                Some(Value::Object(map)) => Ok(Some(map.clone())),
                Some(other) => Err(KeChainError::illegal_argument(format!(
                    "widget `{}` must be a JSON object, got type {}",
                    key,
                    json_type_name(other)
                ))),
            }
        };
        let text = |key: &str| -> KeChainResult<Option<String>> {
            match object.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(text)) => Ok(Some(text.clone())),
                Some(other) => Err(KeChainError::illegal_argument(format!(
                    "widget `{}` must be a string, got type {}",
                    key,
                    json_type_name(other)
                ))),
            }
        };

        Ok(Self {
            name,
            config: map("config")?
                .ok_or_else(|| KeChainError::Value("widget document has no `config`".to_string()))?,
            meta: map("meta")?,
            id: text("id")?,
            parent_id: text("parentId")?,
        })
    }
}

fn lookup_str<'a>(map: &'a Map<String, Value>, pointer: &str) -> Option<&'a str> {
    let mut segments = pointer.trim_start_matches('/').split('/');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.get(segment)?;
    }
    current.as_str()
}

/// Title policy shared by every widget constructor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CustomTitle {
    /// Use the referenced entity's own name
    #[default]
    Default,
    /// Show no title
    NoTitle,
    /// Use this text verbatim
    Custom(String),
}

impl CustomTitle {
    pub fn custom(title: impl Into<String>) -> Self {
        CustomTitle::Custom(title.into())
    }
}

impl From<&str> for CustomTitle {
    fn from(title: &str) -> Self {
        CustomTitle::Custom(title.to_string())
    }
}

/// Sort direction of a grid column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Horizontal placement of navigation-bar buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    Left,
    #[default]
    Center,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyGridOptions {
    pub max_height: Option<u32>,
    pub custom_title: CustomTitle,
    pub parent_id: Option<String>,
}

/// Settings of a super grid
#[derive(Debug, Clone)]
pub struct GridOptions<'a> {
    /// Instance under which new rows are created; required by `new_instance`
    pub parent_instance: Option<ObjectRef<'a, Part>>,
    /// Property of the displayed model to sort on
    pub sort_property: Option<ObjectRef<'a, Property>>,
    pub sort_direction: SortDirection,
    pub new_instance: bool,
    pub edit: bool,
    pub delete: bool,
    pub export: bool,
    pub incomplete_rows: bool,
    pub emphasize_new_instance: bool,
    pub emphasize_edit: bool,
    pub max_height: Option<u32>,
    pub custom_title: CustomTitle,
    pub parent_id: Option<String>,
}

impl Default for GridOptions<'_> {
    fn default() -> Self {
        Self {
            parent_instance: None,
            sort_property: None,
            sort_direction: SortDirection::Ascending,
            new_instance: false,
            edit: true,
            delete: false,
            export: true,
            incomplete_rows: true,
            emphasize_new_instance: true,
            emphasize_edit: false,
            max_height: None,
            custom_title: CustomTitle::Default,
            parent_id: None,
        }
    }
}

/// Settings of a filtered grid: a super grid with paging and a filter panel
#[derive(Debug, Clone)]
pub struct FilteredGridOptions<'a> {
    pub grid: GridOptions<'a>,
    pub page_size: u32,
    pub collapse_filters: bool,
}

impl Default for FilteredGridOptions<'_> {
    fn default() -> Self {
        Self {
            grid: GridOptions::default(),
            page_size: 25,
            collapse_filters: false,
        }
    }
}

/// Settings of an html (text) widget
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub text: Option<String>,
    pub custom_title: CustomTitle,
    pub collapsible: bool,
    pub collapsed: bool,
    pub parent_id: Option<String>,
}

/// Settings of a script or notebook widget
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    pub custom_title: CustomTitle,
    /// Run button label; `Default` uses the service name
    pub button_text: CustomTitle,
    pub emphasize_run: bool,
    pub download_log: bool,
    pub max_height: Option<u32>,
    pub parent_id: Option<String>,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            custom_title: CustomTitle::Default,
            button_text: CustomTitle::Default,
            emphasize_run: true,
            download_log: false,
            max_height: None,
            parent_id: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttachmentViewerOptions {
    pub custom_title: CustomTitle,
    pub max_height: Option<u32>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MultiColumnOptions {
    pub custom_title: CustomTitle,
    pub height: Option<u32>,
    pub collapsible: bool,
    pub collapsed: bool,
}
