#![no_main]

use kechain::{Engine, MemoryClient};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) {
        let engine = Engine::new(MemoryClient::new());

        if let Ok(representation) = engine.parse_representation(&document) {
            let _ = engine.parse_representation(&representation.to_json());
        }
        let _ = engine.parse_property_options(&document);
    }
});
