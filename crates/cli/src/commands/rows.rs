use malloy_core::config::AppConfig;

use crate::commands::{decoder_for, load_query_result, render_json, CommandResult, InputSource};

pub fn run(config: &AppConfig, source: &InputSource) -> CommandResult {
    let query_result = match load_query_result("rows", source) {
        Ok(query_result) => query_result,
        Err(failure) => return failure,
    };

    match decoder_for(config).decode_to_rows(&query_result) {
        Ok(rows) => {
            tracing::info!(event_name = "cli.rows.decoded", rows = rows.len(), "rows decoded");
            render_json("rows", &rows, config.output.format)
        }
        Err(error) => CommandResult::decode_failure("rows", &error),
    }
}
