#![no_main]

use kechain::{Engine, MemoryClient};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let engine = Engine::new(MemoryClient::new());

        let rules = serde_json::json!([
            {"vtype": "numericRangeValidator", "config": {"minvalue": -5, "maxvalue": 5, "stepsize": 0.5, "enforce_stepsize": true}},
            {"vtype": "regexStringValidator", "config": {"pattern": "^[A-Z]{3}-\\d+$"}},
            {"vtype": "emailValidator", "config": {}},
            {"vtype": "fileSizeValidator", "config": {"maxSize": 1024}}
        ]);

        if let Ok(rules) = engine.parse_validators(&rules) {
            let value = serde_json::from_str(s).unwrap_or_else(|_| serde_json::Value::String(s.to_string()));
            for rule in &rules {
                let _ = rule.evaluate(&value);
            }
        }
    }
});
