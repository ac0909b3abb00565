use malloy_core::config::AppConfig;

use crate::commands::{decoder_for, load_query_result, render_json, CommandResult, InputSource};

/// `plain` prints one `name: type` line per field instead of JSON.
pub fn run(config: &AppConfig, source: &InputSource, plain: bool) -> CommandResult {
    let query_result = match load_query_result("schema", source) {
        Ok(query_result) => query_result,
        Err(failure) => return failure,
    };

    let fields = match decoder_for(config).decode_schema(&query_result) {
        Ok(fields) => fields,
        Err(error) => return CommandResult::decode_failure("schema", &error),
    };

    if plain {
        let lines: Vec<String> = fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.type_or_unknown()))
            .collect();
        return CommandResult::ok(lines.join("\n"));
    }

    render_json("schema", &fields, config.output.format)
}
