use super::helpers::{object, resolve_button_text, resolve_title, set_height, set_title_meta};
use super::{
    Alignment, AttachmentViewerOptions, FilteredGridOptions, GridOptions,
    MultiColumnOptions, PropertyGridOptions, ScriptOptions, TextOptions, Widget, WidgetName,
};
use crate::client::{ensure_success, Client};
use crate::identifiers::{json_type_name, object_id_from_value, ObjectRef};
use crate::models::{Activity, Category, Part, Property, PropertyType, ScriptType, Service};
use crate::schemas::{SchemaKind, SchemaRegistry};
use crate::{KeChainError, KeChainResult};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::debug;

/// Keys a navigation-bar button descriptor may carry
pub const NAVIGATION_BUTTON_KEYS: [&str; 3] = ["activity_id", "custom_text", "emphasize"];

/// The Ext JS widget customization of one activity.
///
/// Every mutation rebuilds the full widget list and replaces it remotely. A
/// refused push leaves the list in the state that was sent, so the same call
/// can be retried. Mutating one activity from several places at once is not
/// supported.
pub struct ExtCustomization<'e, C: Client> {
    client: &'e C,
    schemas: &'e SchemaRegistry,
    activity: Activity,
    widgets: Vec<Widget>,
}

impl<C: Client> fmt::Debug for ExtCustomization<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtCustomization")
            .field("activity", &self.activity.name)
            .field("widgets", &self.widgets.len())
            .finish()
    }
}

impl<'e, C: Client> ExtCustomization<'e, C> {
    pub(crate) fn new(
        client: &'e C,
        schemas: &'e SchemaRegistry,
        activity: Activity,
    ) -> KeChainResult<Self> {
        match &activity.customization {
            None | Some(Value::Null) => {}
            Some(document) => schemas.validate(SchemaKind::Customization, document)?,
        }
        let widgets = match activity
            .customization
            .as_ref()
            .and_then(|customization| customization.pointer("/ext/widgets"))
        {
            Some(Value::Array(items)) => items.iter().map(Widget::parse).collect::<KeChainResult<_>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(KeChainError::illegal_argument(format!(
                    "customization widgets must be a list, got type {}",
                    json_type_name(other)
                )))
            }
        };
        Ok(Self {
            client,
            schemas,
            activity,
            widgets,
        })
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn activity_id(&self) -> String {
        self.activity.id.to_string()
    }

    /// The customization document holding `widgets`, other keys untouched
    fn document_for(&self, widgets: &[Widget]) -> Option<Value> {
        let mut customization = match &self.activity.customization {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Map::new(),
        };
        if widgets.is_empty() {
            customization.remove("ext");
        } else {
            let list: Vec<Value> = widgets.iter().map(Widget::to_json).collect();
            customization.insert("ext".to_string(), json!({ "widgets": list }));
        }
        if customization.is_empty() {
            None
        } else {
            Some(Value::Object(customization))
        }
    }

    fn save(&mut self, widgets: Vec<Widget>) -> KeChainResult<()> {
        let document = self.document_for(&widgets);
        if let Some(document) = &document {
            self.schemas.validate(SchemaKind::Customization, document)?;
        }

        self.widgets = widgets;
        self.activity.customization = document.clone();
        debug!(
            activity = %self.activity.id,
            widgets = self.widgets.len(),
            "pushing activity customization"
        );
        let response = self
            .client
            .update_activity_customization(&self.activity.id, document.as_ref())?;
        ensure_success(response, "Could not save customization")
    }

    fn add_widget(&mut self, widget: Widget) -> KeChainResult<()> {
        let mut widgets = self.widgets.clone();
        widgets.push(widget);
        self.save(widgets)
    }

    /// Delete the widget at `index` and push the remaining list
    pub fn delete_widget(&mut self, index: usize) -> KeChainResult<()> {
        if self.widgets.is_empty() {
            return Err(KeChainError::Value(
                "This customization has no widgets".to_string(),
            ));
        }
        if index >= self.widgets.len() {
            return Err(KeChainError::illegal_argument(format!(
                "widget index {} is out of range, the customization has {} widgets",
                index,
                self.widgets.len()
            )));
        }
        let mut widgets = self.widgets.clone();
        widgets.remove(index);
        self.save(widgets)
    }

    pub fn delete_all_widgets(&mut self) -> KeChainResult<()> {
        self.save(Vec::new())
    }

    /// Add a widget from a raw renderer configuration, checked against the component schema
    pub fn add_json_widget(&mut self, config: Value) -> KeChainResult<()> {
        let Value::Object(map) = &config else {
            return Err(KeChainError::illegal_argument(format!(
                "`config` must be a JSON object, got type {}",
                json_type_name(&config)
            )));
        };
        self.schemas.validate(SchemaKind::Component, &config)?;
        self.add_widget(Widget::new(WidgetName::Json, map.clone(), None))
    }

    pub fn add_property_grid_widget<'p>(
        &mut self,
        part_instance: impl Into<ObjectRef<'p, Part>>,
        options: PropertyGridOptions,
    ) -> KeChainResult<()> {
        let part = part_instance.into().resolve("part_instance", self.client)?;
        if part.category != Category::Instance {
            return Err(KeChainError::illegal_argument(format!(
                "`part_instance` must be a part instance, '{}' is a {}",
                part.name,
                part.category.as_str()
            )));
        }
        let title = resolve_title(&options.custom_title, &part.name);

        let mut config = object(json!({
            "xtype": "propertyGrid",
            "category": Category::Instance.as_str(),
            "filter": {
                "activity_id": self.activity_id(),
                "part": part.id.as_str(),
            },
            "title": title.config,
        }));
        let mut meta = object(json!({
            "activityId": self.activity_id(),
            "partInstanceId": part.id.as_str(),
        }));
        set_height(&mut config, &mut meta, options.max_height);
        set_title_meta(&mut meta, &title);

        let widget = Widget::new(WidgetName::PropertyGrid, config, Some(meta)).with_parent(options.parent_id);
        self.add_widget(widget)
    }

    fn grid(
        &self,
        xtype: &str,
        part_model: ObjectRef<'_, Part>,
        options: &GridOptions<'_>,
    ) -> KeChainResult<(Map<String, Value>, Map<String, Value>)> {
        if options.new_instance && options.parent_instance.is_none() {
            return Err(KeChainError::illegal_argument(
                "`new_instance` requires a `parent_instance` to create new instances under",
            ));
        }
        // every identifier is checked before the first lookup
        part_model.resolve_id("part_model")?;
        let parent_id = options
            .parent_instance
            .map(|parent| parent.resolve_id("parent_instance"))
            .transpose()?;
        if let Some(property) = options.sort_property {
            property.resolve_id("sort_property")?;
        }

        let model = part_model.resolve("part_model", self.client)?;
        if model.category != Category::Model {
            return Err(KeChainError::illegal_argument(format!(
                "`part_model` must be a part model, '{}' is an {}",
                model.name,
                model.category.as_str()
            )));
        }
        let sort_property = match options.sort_property {
            Some(property) => {
                let property = property.resolve("sort_property", self.client)?;
                if property.part_id != model.id {
                    return Err(KeChainError::illegal_argument(format!(
                        "`sort_property` '{}' does not belong to part model '{}'",
                        property.name, model.name
                    )));
                }
                Some(property.id.clone())
            }
            None => None,
        };
        let title = resolve_title(&options.custom_title, &model.name);
        let button_ui = |emphasize: bool| if emphasize { "primary-action" } else { "default-toolbar" };

        let mut filter = object(json!({
            "activity_id": self.activity_id(),
            "model": model.id.as_str(),
        }));
        if let Some(parent_id) = &parent_id {
            filter.insert("parent".to_string(), json!(parent_id.as_str()));
        }
        let mut data = object(json!({
            "actions": {
                "newInstance": options.new_instance,
                "edit": options.edit,
                "delete": options.delete,
                "export": options.export,
                "incompleteRows": options.incomplete_rows,
            },
            "ui": {
                "newInstance": button_ui(options.emphasize_new_instance),
                "edit": button_ui(options.emphasize_edit),
            },
        }));
        if let Some(property_id) = &sort_property {
            data.insert(
                "sorters".to_string(),
                json!([{
                    "property": property_id.as_str(),
                    "direction": options.sort_direction.as_str(),
                }]),
            );
        }

        let mut config = object(json!({
            "xtype": xtype,
            "filter": filter,
            "title": title.config,
            "viewModel": { "data": data },
        }));
        let mut meta = object(json!({
            "activityId": self.activity_id(),
            "partModelId": model.id.as_str(),
            "parentInstanceId": parent_id.as_ref().map(|id| id.as_str()),
            "newInstance": options.new_instance,
            "edit": options.edit,
            "delete": options.delete,
            "export": options.export,
            "incompleteRows": options.incomplete_rows,
            "primaryAddUiValue": options.emphasize_new_instance,
            "primaryEditUiValue": options.emphasize_edit,
            "sortedColumn": sort_property.as_ref().map(|id| id.as_str()),
            "sortDirection": options.sort_direction.as_str(),
        }));
        set_height(&mut config, &mut meta, options.max_height);
        set_title_meta(&mut meta, &title);
        Ok((config, meta))
    }

    /// Add an editable grid of all instances of `part_model`
    pub fn add_super_grid_widget<'p>(
        &mut self,
        part_model: impl Into<ObjectRef<'p, Part>>,
        options: GridOptions<'_>,
    ) -> KeChainResult<()> {
        let (config, meta) = self.grid("superGrid", part_model.into(), &options)?;
        let widget = Widget::new(WidgetName::SuperGrid, config, Some(meta)).with_parent(options.parent_id);
        self.add_widget(widget)
    }

    /// Add a paged grid with a filter panel
    pub fn add_filtered_grid_widget<'p>(
        &mut self,
        part_model: impl Into<ObjectRef<'p, Part>>,
        options: FilteredGridOptions<'_>,
    ) -> KeChainResult<()> {
        if options.page_size == 0 {
            return Err(KeChainError::illegal_argument("`page_size` must be at least 1"));
        }
        let (mut config, mut meta) = self.grid("filteredGrid", part_model.into(), &options.grid)?;
        config.insert("pageSize".to_string(), json!(options.page_size));
        config.insert("collapseFilters".to_string(), json!(options.collapse_filters));
        meta.insert("customPageSize".to_string(), json!(options.page_size));
        meta.insert("collapseFilters".to_string(), json!(options.collapse_filters));
        let widget =
            Widget::new(WidgetName::FilteredGrid, config, Some(meta)).with_parent(options.grid.parent_id);
        self.add_widget(widget)
    }

    /// Add an html panel; without a custom title the panel has an empty one
    pub fn add_text_widget(&mut self, options: TextOptions) -> KeChainResult<()> {
        let title = resolve_title(&options.custom_title, "");
        let mut config = object(json!({
            "xtype": "htmlPanel",
            "title": title.config,
            "collapsible": options.collapsible,
            "collapsed": options.collapsed,
        }));
        if let Some(text) = &options.text {
            config.insert("html".to_string(), json!(text));
        }
        let mut meta = object(json!({
            "html": options.text.clone().unwrap_or_default(),
            "collapsible": options.collapsible,
            "collapsed": options.collapsed,
        }));
        set_title_meta(&mut meta, &title);

        let widget = Widget::new(WidgetName::Html, config, Some(meta)).with_parent(options.parent_id);
        self.add_widget(widget)
    }

    /// Add a button that runs a script service
    pub fn add_script_widget<'p>(
        &mut self,
        service: impl Into<ObjectRef<'p, Service>>,
        options: ScriptOptions,
    ) -> KeChainResult<()> {
        let service = service.into().resolve("service", self.client)?;
        let title = resolve_title(&options.custom_title, &service.name);
        let (button_text, show_button_value) = resolve_button_text(&options.button_text, &service.name);

        let mut config = object(json!({
            "xtype": "executeService",
            "serviceId": service.id.as_str(),
            "title": title.config,
            "customButtonText": button_text,
            "viewModel": {
                "data": {
                    "canDownloadLog": options.download_log,
                    "buttonUI": if options.emphasize_run { "primary-action" } else { "default" },
                }
            },
        }));
        let mut meta = object(json!({
            "activityId": self.activity_id(),
            "serviceId": service.id.as_str(),
            "customText": button_text,
            "showButtonValue": show_button_value,
            "emphasizeButton": options.emphasize_run,
            "showDownloadLog": options.download_log,
        }));
        set_height(&mut config, &mut meta, options.max_height);
        set_title_meta(&mut meta, &title);

        let widget = Widget::new(WidgetName::Service, config, Some(meta)).with_parent(options.parent_id);
        self.add_widget(widget)
    }

    /// Add an embedded notebook; the service must be a notebook
    pub fn add_notebook_widget<'p>(
        &mut self,
        notebook: impl Into<ObjectRef<'p, Service>>,
        options: ScriptOptions,
    ) -> KeChainResult<()> {
        let notebook = notebook.into().resolve("notebook", self.client)?;
        if notebook.script_type != ScriptType::Notebook {
            return Err(KeChainError::illegal_argument(format!(
                "`notebook` must be a NOTEBOOK service, '{}' is not",
                notebook.name
            )));
        }
        let title = resolve_title(&options.custom_title, &notebook.name);

        let mut config = object(json!({
            "xtype": "notebookPanel",
            "serviceId": notebook.id.as_str(),
            "title": title.config,
        }));
        let mut meta = object(json!({
            "activityId": self.activity_id(),
            "serviceId": notebook.id.as_str(),
        }));
        set_height(&mut config, &mut meta, options.max_height);
        set_title_meta(&mut meta, &title);

        let widget = Widget::new(WidgetName::Notebook, config, Some(meta)).with_parent(options.parent_id);
        self.add_widget(widget)
    }

    /// Add a viewer for the file of an attachment property instance
    pub fn add_attachment_viewer_widget<'p>(
        &mut self,
        attachment_property: impl Into<ObjectRef<'p, Property>>,
        options: AttachmentViewerOptions,
    ) -> KeChainResult<()> {
        let property = attachment_property
            .into()
            .resolve("attachment_property", self.client)?;
        if property.property_type != PropertyType::AttachmentValue
            || property.category != Category::Instance
        {
            return Err(KeChainError::illegal_argument(format!(
                "`attachment_property` must be an ATTACHMENT_VALUE property instance, '{}' is a {} {}",
                property.name,
                property.property_type.as_str(),
                property.category.as_str()
            )));
        }
        let title = resolve_title(&options.custom_title, &property.name);

        let mut config = object(json!({
            "xtype": "propertyAttachmentViewer",
            "filter": { "activity_id": self.activity_id() },
            "propertyId": property.id.as_str(),
            "title": title.config,
        }));
        let mut meta = object(json!({
            "activityId": self.activity_id(),
            "propertyInstanceId": property.id.as_str(),
        }));
        if let Some(height) = options.max_height {
            config.insert("height".to_string(), json!(height));
            meta.insert("customHeight".to_string(), json!(height));
        }
        set_title_meta(&mut meta, &title);

        let widget =
            Widget::new(WidgetName::AttachmentViewer, config, Some(meta)).with_parent(options.parent_id);
        self.add_widget(widget)
    }

    /// Add a bar of buttons navigating to other activities.
    ///
    /// Each descriptor may only carry the keys in [`NAVIGATION_BUTTON_KEYS`]; one
    /// unexpected key rejects the whole batch.
    pub fn add_navigation_bar_widget(
        &mut self,
        buttons: &[Map<String, Value>],
        alignment: Alignment,
    ) -> KeChainResult<()> {
        for button in buttons {
            if let Some(key) = button
                .keys()
                .find(|key| !NAVIGATION_BUTTON_KEYS.contains(&key.as_str()))
            {
                return Err(KeChainError::illegal_argument(format!(
                    "Found unexpected key '{}' in a navigation button, only {:?} are allowed",
                    key, NAVIGATION_BUTTON_KEYS
                )));
            }
        }

        let mut parsed = Vec::with_capacity(buttons.len());
        for button in buttons {
            let activity_id = object_id_from_value(
                "activity_id",
                button.get("activity_id").unwrap_or(&Value::Null),
            )?
            .ok_or_else(|| {
                KeChainError::illegal_argument("every navigation button needs an `activity_id`")
            })?;
            let custom_text = match button.get("custom_text") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(text)) => text.clone(),
                Some(other) => {
                    return Err(KeChainError::illegal_argument(format!(
                        "`custom_text` must be a string, got type {}",
                        json_type_name(other)
                    )))
                }
            };
            let emphasize = match button.get("emphasize") {
                None | Some(Value::Null) => false,
                Some(Value::Bool(emphasize)) => *emphasize,
                Some(other) => {
                    return Err(KeChainError::illegal_argument(format!(
                        "`emphasize` must be a boolean, got type {}",
                        json_type_name(other)
                    )))
                }
            };
            parsed.push((activity_id, custom_text, emphasize));
        }

        let mut config_buttons = Vec::with_capacity(parsed.len());
        let mut meta_buttons = Vec::with_capacity(parsed.len());
        for (activity_id, custom_text, emphasize) in &parsed {
            let activity = self.client.activity(activity_id)?;
            config_buttons.push(json!({
                "activityId": activity_id.as_str(),
                "customText": custom_text,
                "emphasize": emphasize,
                "disabled": false,
            }));
            meta_buttons.push(json!({
                "activityId": activity_id.as_str(),
                "name": activity.name,
                "customText": custom_text,
                "emphasize": emphasize,
                "isDisabled": false,
            }));
        }

        let config = object(json!({
            "xtype": "activityNavigationBar",
            "alignment": alignment.as_str(),
            "filter": { "activity_id": self.activity_id() },
            "taskButtons": config_buttons,
        }));
        let meta = object(json!({
            "activityId": self.activity_id(),
            "alignment": alignment.as_str(),
            "taskButtons": meta_buttons,
        }));
        self.add_widget(Widget::new(WidgetName::TaskNavigationBar, config, Some(meta)))
    }

    /// Add a multi-column container under a caller-chosen local id.
    ///
    /// Other widgets join it through their `parent_id` option; nothing checks
    /// that a child's `parent_id` names an existing container.
    pub fn add_multi_column_widget(
        &mut self,
        id: impl Into<String>,
        options: MultiColumnOptions,
    ) -> KeChainResult<()> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(KeChainError::illegal_argument(
                "a multi-column widget needs a non-empty `id`",
            ));
        }
        let title = resolve_title(&options.custom_title, "");
        let config = object(json!({ "title": title.config }));
        let mut meta = object(json!({
            "collapsible": options.collapsible,
            "collapsed": options.collapsed,
        }));
        if let Some(height) = options.height {
            meta.insert("height".to_string(), json!(height));
        }
        set_title_meta(&mut meta, &title);

        let mut widget = Widget::new(WidgetName::MultiColumn, config, Some(meta));
        widget.id = Some(id);
        self.add_widget(widget)
    }
}

