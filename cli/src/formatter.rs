use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use kechain::{Evaluation, Widget};
use serde_json::Value;

/// Result of checking one document on disk
pub struct CheckOutcome {
    pub source_id: String,
    pub kind: &'static str,
    pub error: Option<String>,
}

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn format_check_report(&self, outcomes: &[CheckOutcome]) -> String {
        if outcomes.is_empty() {
            return "No JSON documents found.\n".to_string();
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("File").set_alignment(CellAlignment::Left),
            Cell::new("Kind").set_alignment(CellAlignment::Left),
            Cell::new("Result").set_alignment(CellAlignment::Left),
        ]));

        for outcome in outcomes {
            let result = match &outcome.error {
                None => "ok".to_string(),
                Some(message) => format!("FAILED: {}", message),
            };
            table.add_row(vec![
                Cell::new(&outcome.source_id),
                Cell::new(outcome.kind),
                Cell::new(result),
            ]);
        }

        let passed = outcomes.iter().filter(|o| o.error.is_none()).count();
        format!("{}\n{} of {} document(s) valid\n", table, passed, outcomes.len())
    }

    pub fn format_evaluations(&self, rows: &[(String, Value, Evaluation)]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Value").set_alignment(CellAlignment::Left),
            Cell::new("Validator").set_alignment(CellAlignment::Left),
            Cell::new("Result").set_alignment(CellAlignment::Center),
            Cell::new("Reason").set_alignment(CellAlignment::Left),
        ]));

        for (validator, value, evaluation) in rows {
            table.add_row(vec![
                Cell::new(value.to_string()),
                Cell::new(validator),
                Cell::new(result_label(evaluation.result)).set_alignment(CellAlignment::Center),
                Cell::new(&evaluation.reason),
            ]);
        }

        format!("{}\n", table)
    }

    pub fn format_widgets(&self, activity_name: &str, widgets: &[Widget]) -> String {
        if widgets.is_empty() {
            return format!("Activity '{}' has no widgets.\n", activity_name);
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("#").set_alignment(CellAlignment::Right),
            Cell::new("Widget").set_alignment(CellAlignment::Left),
            Cell::new("Title").set_alignment(CellAlignment::Left),
            Cell::new("Container").set_alignment(CellAlignment::Left),
        ]));

        for (index, widget) in widgets.iter().enumerate() {
            let title = match widget.config.get("title") {
                Some(Value::String(title)) => title.clone(),
                Some(Value::Null) => "(hidden)".to_string(),
                _ => String::new(),
            };
            let container = match (&widget.id, &widget.parent_id) {
                (Some(id), _) => format!("id {}", id),
                (None, Some(parent)) => format!("in {}", parent),
                (None, None) => String::new(),
            };
            table.add_row(vec![
                Cell::new(index).set_alignment(CellAlignment::Right),
                Cell::new(widget.name.as_str()),
                Cell::new(title),
                Cell::new(container),
            ]);
        }

        format!("Widgets of '{}':\n{}\n", activity_name, table)
    }
}

fn result_label(result: Option<bool>) -> &'static str {
    match result {
        Some(true) => "valid",
        Some(false) => "invalid",
        None => "n/a",
    }
}
