#![no_main]

use kechain::{Engine, MemoryClient};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) {
        let engine = Engine::new(MemoryClient::new());

        if let Ok(rule) = engine.parse_validator(&document) {
            let _ = engine.parse_validator(&rule.to_json());
        }
        let _ = engine.parse_validators(&document);
    }
});
