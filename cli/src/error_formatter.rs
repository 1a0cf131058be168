use ariadne::{Color, Label, Report, ReportKind, Source};
use kechain::KeChainError;

/// Format a KeChainError for the terminal
pub fn format_error(error: &KeChainError) -> String {
    match error {
        KeChainError::IllegalArgument(msg) => format!("Illegal argument: {}", msg),
        KeChainError::Value(msg) => format!("Value error: {}", msg),
        KeChainError::UnknownType(msg) => format!("Unknown type: {}", msg),
        KeChainError::NotFound(msg) => format!("Not found: {}", msg),
        KeChainError::Schema(msg) => {
            let mut result = String::from("Schema validation failed:\n");
            for line in msg.split("; ") {
                result.push_str("  - ");
                result.push_str(line);
                result.push('\n');
            }
            result
        }
        KeChainError::Api { message, response } => format!(
            "API error: {}\n  Status: {}\n  Body: {}",
            message, response.status, response.body
        ),
        KeChainError::Json(err) => format!("JSON error: {}", err),
    }
}

/// Format a JSON syntax error with the offending spot marked using Ariadne
pub fn format_json_error(source_id: &str, source_text: &str, error: &serde_json::Error) -> String {
    let source_id = source_id.to_string();
    let offset = char_offset(source_text, error.line(), error.column());
    let mut output = Vec::new();

    let report = Report::build(ReportKind::Error, &source_id, offset)
        .with_message(format!(
            "Invalid JSON in {} at line {}, column {}",
            source_id,
            error.line(),
            error.column()
        ))
        .with_label(
            Label::new((&source_id, offset..offset + 1))
                .with_message(error.to_string())
                .with_color(Color::Red),
        );

    match report
        .finish()
        .write((&source_id, Source::from(source_text)), &mut output)
    {
        Ok(_) => String::from_utf8_lossy(&output).to_string(),
        Err(_) => {
            // Fallback to simple format
            format!("JSON error in {}: {}\n", source_id, error)
        }
    }
}

/// Character offset of a 1-based line and column as reported by serde_json
fn char_offset(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, current) in text.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return offset + column.saturating_sub(1).min(current.chars().count());
        }
        offset += current.chars().count();
    }
    offset
}
