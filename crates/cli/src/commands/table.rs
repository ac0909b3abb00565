use malloy_core::config::AppConfig;

use crate::commands::{decoder_for, load_query_result, CommandResult, InputSource, EXIT_DECODE};

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub head: Option<usize>,
    pub sort_by: Option<String>,
    pub descending: bool,
}

pub fn run(config: &AppConfig, source: &InputSource, options: &TableOptions) -> CommandResult {
    let query_result = match load_query_result("table", source) {
        Ok(query_result) => query_result,
        Err(failure) => return failure,
    };

    let mut table = match decoder_for(config).decode_to_table(&query_result) {
        Ok(table) => table,
        Err(error) => return CommandResult::decode_failure("table", &error),
    };

    if let Some(column) = options.sort_by.as_deref() {
        table = match table.sort_by(column, !options.descending) {
            Some(sorted) => sorted,
            None => {
                return CommandResult::failure(
                    "table",
                    "unknown_column",
                    format!("cannot sort by `{column}`: no such column"),
                    EXIT_DECODE,
                )
            }
        };
    }

    let limit = options.head.unwrap_or(config.output.max_rows);
    let shown = table.head(limit);
    let mut output = shown.to_string();
    if shown.num_rows() < table.num_rows() {
        output.push_str(&format!("\n... ({} more rows)", table.num_rows() - shown.num_rows()));
    }
    output.push_str(&format!("\n\n[{} rows x {} columns]", table.num_rows(), table.num_columns()));

    CommandResult::ok(output)
}
