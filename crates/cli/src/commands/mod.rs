pub mod config;
pub mod rows;
pub mod schema;
#[cfg(feature = "tabular")]
pub mod table;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use malloy_core::config::{AppConfig, OutputFormat};
use malloy_core::{Capabilities, DecodeError, QueryResult, ResultDecoder};
use serde::Serialize;
use serde_json::Value;

pub const EXIT_DECODE: u8 = 2;
pub const EXIT_CONFIG: u8 = 3;
pub const EXIT_INPUT: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

/// Where a command reads its query result from.
#[derive(Debug, Clone, Default)]
pub struct InputSource {
    /// File path; `None` or `-` reads stdin.
    pub path: Option<PathBuf>,
    /// The input is the result document itself rather than a `{"result": ...}` envelope.
    pub raw: bool,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn decode_failure(command: &str, error: &DecodeError) -> Self {
        tracing::warn!(
            event_name = "cli.decode.failed",
            command,
            error_class = error.kind(),
            "query result could not be decoded"
        );
        Self::failure(command, error.kind(), error.to_string(), EXIT_DECODE)
    }

    /// Outcome of `table` in a build without the `tabular` feature.
    #[cfg(not(feature = "tabular"))]
    pub fn tabular_unavailable() -> Self {
        use malloy_core::capability::{TABULAR_CAPABILITY, TABULAR_GUIDANCE};

        let error = DecodeError::MissingCapability {
            capability: TABULAR_CAPABILITY,
            guidance: TABULAR_GUIDANCE,
        };
        Self::decode_failure("table", &error)
    }

    pub fn input_failure(command: &str, error: &anyhow::Error) -> Self {
        Self::failure(command, "input_io", format!("{error:#}"), EXIT_INPUT)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn decoder_for(config: &AppConfig) -> ResultDecoder {
    ResultDecoder::new(Capabilities::from_config(&config.decoder))
}

pub(crate) fn read_input(source: &InputSource) -> anyhow::Result<String> {
    match source.path.as_deref() {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("could not read input file `{}`", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("could not read query result from stdin")?;
            Ok(text)
        }
    }
}

/// Wraps input text as a `QueryResult`, unwrapping the publisher envelope unless `raw`.
pub fn query_result_from_text(text: String, raw: bool) -> Result<QueryResult, DecodeError> {
    if raw {
        return Ok(QueryResult::from_text(text));
    }

    let envelope = serde_json::from_str::<Value>(&text)?;
    Ok(QueryResult::from_envelope(envelope))
}

pub(crate) fn load_query_result(
    command: &str,
    source: &InputSource,
) -> Result<QueryResult, CommandResult> {
    let text = read_input(source).map_err(|error| CommandResult::input_failure(command, &error))?;
    query_result_from_text(text, source.raw)
        .map_err(|error| CommandResult::decode_failure(command, &error))
}

pub(crate) fn render_json<T: Serialize>(
    command: &str,
    value: &T,
    format: OutputFormat,
) -> CommandResult {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::PrettyJson => serde_json::to_string_pretty(value),
    };

    match rendered {
        Ok(output) => CommandResult::ok(output),
        Err(error) => CommandResult::failure(command, "serialization", error.to_string(), 1),
    }
}
