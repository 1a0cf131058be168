use super::fixtures::*;
use crate::client::{Client, Push};
use crate::engine::Engine;
use crate::schemas::SchemaKind;
use crate::widgets::{
    Alignment, AttachmentViewerOptions, CustomTitle, FilteredGridOptions, GridOptions,
    MultiColumnOptions, PropertyGridOptions, ScriptOptions, SortDirection, TextOptions,
    WidgetName,
};
use crate::KeChainError;
use serde_json::{json, Map, Value};

fn engine() -> Engine<crate::MemoryClient> {
    Engine::new(bike_client())
}

fn descriptor(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("descriptor must be an object"),
    }
}

#[test]
fn test_property_grid_config_and_meta() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization
        .add_property_grid_widget(WHEEL, PropertyGridOptions::default())
        .unwrap();

    let widget = &customization.widgets()[0];
    assert_eq!(widget.name, WidgetName::PropertyGrid);
    assert_eq!(widget.config_str("/xtype"), Some("propertyGrid"));
    assert_eq!(widget.config_str("/filter/part"), Some(WHEEL));
    assert_eq!(widget.config_str("/filter/activity_id"), Some(ACTIVITY));
    assert_eq!(widget.config_str("/title"), Some("Front wheel"));
    assert!(!widget.config.contains_key("maxHeight"));
    assert_eq!(widget.meta_value("partInstanceId"), Some(&json!(WHEEL)));
    assert_eq!(widget.meta_value("showHeightValue"), Some(&json!("Auto")));
}

#[test]
fn test_property_grid_requires_instance() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let err = customization
        .add_property_grid_widget(WHEEL_MODEL, PropertyGridOptions::default())
        .unwrap_err();
    assert!(err.is_argument_error());
    assert!(customization.is_empty());
    assert_eq!(engine.client().push_count(), 0);
}

#[test]
fn test_non_uuid_reference_is_rejected_before_lookup() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let err = customization
        .add_property_grid_widget("front-wheel", PropertyGridOptions::default())
        .unwrap_err();
    assert!(err.is_argument_error());
    assert!(err.to_string().contains("part_instance"));
}

#[test]
fn test_unknown_reference_is_not_found() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let err = customization
        .add_property_grid_widget(
            "00000000-0000-4000-8000-000000000000",
            PropertyGridOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, KeChainError::NotFound(_)));
}

#[test]
fn test_super_grid_with_sorting_and_parent() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let options = GridOptions {
        parent_instance: Some(BIKE.into()),
        sort_property: Some(DIAMETER.into()),
        sort_direction: SortDirection::Descending,
        new_instance: true,
        delete: true,
        ..GridOptions::default()
    };
    customization.add_super_grid_widget(WHEEL_MODEL, options).unwrap();

    let widget = &customization.widgets()[0];
    assert_eq!(widget.name, WidgetName::SuperGrid);
    assert_eq!(widget.config_str("/filter/model"), Some(WHEEL_MODEL));
    assert_eq!(widget.config_str("/filter/parent"), Some(BIKE));
    let data = &widget.config["viewModel"]["data"];
    assert_eq!(data["actions"]["newInstance"], json!(true));
    assert_eq!(data["actions"]["delete"], json!(true));
    assert_eq!(data["ui"]["newInstance"], json!("primary-action"));
    assert_eq!(data["sorters"][0]["property"], json!(DIAMETER));
    assert_eq!(data["sorters"][0]["direction"], json!("DESC"));
    assert_eq!(widget.meta_value("sortedColumn"), Some(&json!(DIAMETER)));
    assert_eq!(widget.meta_value("parentInstanceId"), Some(&json!(BIKE)));
}

#[test]
fn test_new_instance_requires_parent() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let options = GridOptions {
        new_instance: true,
        ..GridOptions::default()
    };
    let err = customization
        .add_super_grid_widget(WHEEL_MODEL, options)
        .unwrap_err();
    assert!(err.is_argument_error());
    assert!(err.to_string().contains("parent_instance"));
}

#[test]
fn test_grid_identifiers_are_checked_before_any_lookup() {
    let engine = Engine::new(CountingClient::new(bike_client()));
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let before = engine.client().lookups();

    let options = GridOptions {
        sort_property: Some("not-a-uuid".into()),
        ..GridOptions::default()
    };
    let err = customization
        .add_super_grid_widget(WHEEL_MODEL, options)
        .unwrap_err();
    assert!(err.is_argument_error());
    assert!(err.to_string().contains("sort_property"));

    let options = FilteredGridOptions {
        grid: GridOptions {
            parent_instance: Some("bike".into()),
            ..GridOptions::default()
        },
        ..FilteredGridOptions::default()
    };
    let err = customization
        .add_filtered_grid_widget(WHEEL_MODEL, options)
        .unwrap_err();
    assert!(err.to_string().contains("parent_instance"));

    assert_eq!(engine.client().lookups(), before);
    assert_eq!(engine.client().inner.push_count(), 0);
}

#[test]
fn test_sort_property_must_belong_to_model() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let options = GridOptions {
        sort_property: Some(FRAME_COLOUR.into()),
        ..GridOptions::default()
    };
    let err = customization
        .add_super_grid_widget(WHEEL_MODEL, options)
        .unwrap_err();
    assert!(err.is_argument_error());
    assert!(customization.is_empty());
}

#[test]
fn test_filtered_grid_adds_paging() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let options = FilteredGridOptions {
        page_size: 50,
        collapse_filters: true,
        ..FilteredGridOptions::default()
    };
    customization
        .add_filtered_grid_widget(WHEEL_MODEL, options)
        .unwrap();
    let widget = &customization.widgets()[0];
    assert_eq!(widget.name, WidgetName::FilteredGrid);
    assert_eq!(widget.config_str("/xtype"), Some("filteredGrid"));
    assert_eq!(widget.config["pageSize"], json!(50));
    assert_eq!(widget.meta_value("customPageSize"), Some(&json!(50)));
}

#[test]
fn test_text_widget_meta_is_schema_clean() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization
        .add_text_widget(TextOptions {
            text: Some("<p>Mind the spokes</p>".to_string()),
            custom_title: CustomTitle::custom("Notes"),
            collapsible: true,
            ..TextOptions::default()
        })
        .unwrap();
    customization.add_text_widget(TextOptions::default()).unwrap();

    let notes = &customization.widgets()[0];
    assert_eq!(notes.config_str("/html"), Some("<p>Mind the spokes</p>"));
    assert_eq!(notes.meta_value("customTitle"), Some(&json!("Notes")));
    let empty = &customization.widgets()[1];
    assert_eq!(empty.meta_value("html"), Some(&json!("")));
    assert!(engine
        .schemas()
        .is_valid(SchemaKind::Widgets, &json!([empty.to_json()])));
}

#[test]
fn test_script_widget_button_text() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization
        .add_script_widget(SCRIPT, ScriptOptions::default())
        .unwrap();
    customization
        .add_script_widget(
            SCRIPT,
            ScriptOptions {
                button_text: CustomTitle::custom("Go"),
                emphasize_run: false,
                download_log: true,
                ..ScriptOptions::default()
            },
        )
        .unwrap();

    let default = &customization.widgets()[0];
    assert_eq!(default.name, WidgetName::Service);
    assert_eq!(default.config_str("/customButtonText"), Some("Compute spokes"));
    assert_eq!(default.meta_value("showButtonValue"), Some(&json!("Default")));

    let custom = &customization.widgets()[1];
    assert_eq!(custom.config_str("/customButtonText"), Some("Go"));
    assert_eq!(custom.config_str("/viewModel/data/buttonUI"), Some("default"));
    assert_eq!(custom.config["viewModel"]["data"]["canDownloadLog"], json!(true));
    assert_eq!(custom.meta_value("showButtonValue"), Some(&json!("Custom text")));
}

#[test]
fn test_notebook_widget_requires_notebook() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    assert!(customization
        .add_notebook_widget(SCRIPT, ScriptOptions::default())
        .unwrap_err()
        .is_argument_error());
    customization
        .add_notebook_widget(NOTEBOOK, ScriptOptions::default())
        .unwrap();
    assert_eq!(customization.widgets()[0].config_str("/xtype"), Some("notebookPanel"));
}

#[test]
fn test_attachment_viewer_requires_attachment_instance() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    assert!(customization
        .add_attachment_viewer_widget(FRAME_COLOUR, AttachmentViewerOptions::default())
        .unwrap_err()
        .is_argument_error());

    customization
        .add_attachment_viewer_widget(
            MANUAL,
            AttachmentViewerOptions {
                max_height: Some(400),
                ..AttachmentViewerOptions::default()
            },
        )
        .unwrap();
    let widget = &customization.widgets()[0];
    assert_eq!(widget.config_str("/propertyId"), Some(MANUAL));
    assert_eq!(widget.meta_value("customHeight"), Some(&json!(400)));
}

#[test]
fn test_navigation_bar_reads_activity_names() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let buttons = vec![
        descriptor(json!({"activity_id": OTHER_ACTIVITY, "emphasize": true})),
        descriptor(json!({"activity_id": FOREIGN_ACTIVITY, "custom_text": "Order"})),
    ];
    customization
        .add_navigation_bar_widget(&buttons, Alignment::Left)
        .unwrap();

    let widget = &customization.widgets()[0];
    assert_eq!(widget.name, WidgetName::TaskNavigationBar);
    assert_eq!(widget.config_str("/alignment"), Some("left"));
    let meta_buttons = widget.meta_value("taskButtons").unwrap();
    assert_eq!(meta_buttons[0]["name"], json!("Review bike"));
    assert_eq!(meta_buttons[0]["emphasize"], json!(true));
    assert_eq!(meta_buttons[1]["customText"], json!("Order"));
    assert_eq!(widget.config["taskButtons"][1]["activityId"], json!(FOREIGN_ACTIVITY));
}

#[test]
fn test_navigation_bar_checks_every_descriptor_first() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let buttons = vec![
        descriptor(json!({"activity_id": "not-an-id"})),
        descriptor(json!({"activity_id": OTHER_ACTIVITY, "colour": "red"})),
    ];
    let err = customization
        .add_navigation_bar_widget(&buttons, Alignment::Center)
        .unwrap_err();
    assert!(err.to_string().contains("colour"));
}

#[test]
fn test_multi_column_children_carry_parent_id() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization
        .add_multi_column_widget("columns", MultiColumnOptions::default())
        .unwrap();
    customization
        .add_property_grid_widget(
            WHEEL,
            PropertyGridOptions {
                parent_id: Some("columns".to_string()),
                ..PropertyGridOptions::default()
            },
        )
        .unwrap();

    let document = customization.widgets()[1].to_json();
    assert_eq!(document["parentId"], json!("columns"));
    assert_eq!(customization.widgets()[0].to_json()["id"], json!("columns"));
    assert!(customization
        .add_multi_column_widget(" ", MultiColumnOptions::default())
        .is_err());
}

#[test]
fn test_json_widget_is_checked_against_component_schema() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let err = customization
        .add_json_widget(json!({"xtype": "slideshow"}))
        .unwrap_err();
    assert!(matches!(err, KeChainError::Schema(_)));
    assert!(customization
        .add_json_widget(json!(["propertyGrid"]))
        .unwrap_err()
        .is_argument_error());

    customization
        .add_json_widget(json!({"xtype": "displayfield", "value": "Hello"}))
        .unwrap();
    assert_eq!(customization.widgets()[0].name, WidgetName::Json);
    assert!(customization.widgets()[0].meta.is_none());
}

#[test]
fn test_every_change_pushes_the_whole_list() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization.add_text_widget(TextOptions::default()).unwrap();
    customization
        .add_property_grid_widget(WHEEL, PropertyGridOptions::default())
        .unwrap();

    let pushes = engine.client().pushes();
    assert_eq!(pushes.len(), 2);
    match &pushes[1] {
        Push::Customization { customization, .. } => {
            let widgets = customization.as_ref().unwrap()["ext"]["widgets"].as_array().unwrap();
            assert_eq!(widgets.len(), 2);
        }
        other => panic!("unexpected push {:?}", other),
    }
}

#[test]
fn test_other_customization_keys_survive() {
    let engine = engine();
    let mut activity = engine.client().activity(&id(ACTIVITY)).unwrap();
    activity.customization = Some(json!({"theme": "compact"}));
    engine.client().insert_activity(activity);

    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization.add_text_widget(TextOptions::default()).unwrap();
    let stored = engine.client().activity(&id(ACTIVITY)).unwrap().customization.unwrap();
    assert_eq!(stored["theme"], json!("compact"));
    assert_eq!(stored["ext"]["widgets"].as_array().unwrap().len(), 1);

    customization.delete_all_widgets().unwrap();
    let stored = engine.client().activity(&id(ACTIVITY)).unwrap().customization.unwrap();
    assert_eq!(stored, json!({"theme": "compact"}));
}

#[test]
fn test_deleting_everything_clears_customization() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization.add_text_widget(TextOptions::default()).unwrap();
    customization.delete_widget(0).unwrap();
    assert!(customization.is_empty());
    assert_eq!(
        engine.client().activity(&id(ACTIVITY)).unwrap().customization,
        None
    );
}

#[test]
fn test_delete_out_of_range_is_argument_error() {
    let engine = engine();
    let mut customization = engine.customization(ACTIVITY).unwrap();
    customization.add_text_widget(TextOptions::default()).unwrap();
    assert!(customization.delete_widget(3).unwrap_err().is_argument_error());
    assert_eq!(customization.len(), 1);
}

#[test]
fn test_existing_widgets_are_loaded() {
    let engine = engine();
    {
        let mut customization = engine.customization(ACTIVITY).unwrap();
        customization
            .add_property_grid_widget(WHEEL, PropertyGridOptions::default())
            .unwrap();
    }
    let reloaded = engine.customization(ACTIVITY).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.widgets()[0].name, WidgetName::PropertyGrid);
}

fn engine_with_stored(customization: Value) -> Engine<crate::MemoryClient> {
    let client = bike_client();
    client.insert_activity(crate::models::Activity {
        id: id(ACTIVITY),
        name: "Specify wheel".to_string(),
        scope_id: id(SCOPE),
        customization: Some(customization),
    });
    Engine::new(client)
}

#[test]
fn test_stored_customization_is_schema_checked_on_load() {
    let engine = engine_with_stored(json!({
        "ext": {"widgets": [
            {"name": "htmlWidget", "config": "oops", "meta": 5, "parentId": 7}
        ]}
    }));
    let err = engine.customization(ACTIVITY).unwrap_err();
    assert!(matches!(err, KeChainError::Schema(_)));
}

#[test]
fn test_stored_widgets_keep_their_fields() {
    let engine = engine_with_stored(json!({
        "theme": "dark",
        "ext": {"widgets": [
            {
                "name": "htmlWidget",
                "config": {"xtype": "htmlPanel", "title": null},
                "meta": {"html": "<b>Torque</b>", "showTitleValue": "No title"},
                "parentId": "columns-1"
            }
        ]}
    }));
    let mut customization = engine.customization(ACTIVITY).unwrap();
    let widget = &customization.widgets()[0];
    assert_eq!(widget.parent_id.as_deref(), Some("columns-1"));
    assert_eq!(widget.meta_value("html"), Some(&json!("<b>Torque</b>")));

    customization.add_text_widget(TextOptions::default()).unwrap();
    assert_eq!(customization.len(), 2);
}

#[test]
fn test_widget_parse_rejects_malformed_fields() {
    use crate::widgets::Widget;

    let bad_config = json!({"name": "jsonWidget", "config": "oops"});
    assert!(Widget::parse(&bad_config).unwrap_err().is_argument_error());

    let bad_meta = json!({"name": "htmlWidget", "config": {}, "meta": 5});
    assert!(Widget::parse(&bad_meta).unwrap_err().is_argument_error());

    let bad_parent = json!({"name": "htmlWidget", "config": {}, "parentId": 7});
    let err = Widget::parse(&bad_parent).unwrap_err();
    assert!(err.is_argument_error());
    assert!(err.to_string().contains("parentId"));

    let no_config = json!({"name": "jsonWidget"});
    assert!(matches!(Widget::parse(&no_config), Err(KeChainError::Value(_))));

    let null_parent = json!({"name": "jsonWidget", "config": {}, "parentId": null});
    assert_eq!(Widget::parse(&null_parent).unwrap().parent_id, None);
}
