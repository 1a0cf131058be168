#![no_main]

use kechain::{SchemaKind, SchemaRegistry, Widget};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) {
        let schemas = SchemaRegistry::new();

        if schemas.is_valid(SchemaKind::Customization, &document) {
            if let Some(serde_json::Value::Array(widgets)) = document.pointer("/ext/widgets") {
                for widget in widgets {
                    let _ = Widget::parse(widget);
                }
            }
        }
    }
});
