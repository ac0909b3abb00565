pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use malloy_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[cfg(feature = "tabular")]
use crate::commands::table::TableOptions;
use crate::commands::{CommandResult, InputSource, EXIT_CONFIG};

#[derive(Debug, Parser)]
#[command(
    name = "malloy",
    about = "Malloy query result decoder",
    long_about = "Decode Malloy Publisher query results into rows, tables, or the bare schema.",
    after_help = "Examples:\n  malloy rows result.json\n  curl -s $QUERY_URL | malloy table --head 5\n  malloy schema --plain result.json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a malloy.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct InputArgs {
    #[arg(value_name = "INPUT", help = "Query result file, or `-` for stdin (default)")]
    path: Option<PathBuf>,
    #[arg(long, help = "Input is the result document itself, not a {\"result\": ...} envelope")]
    raw: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Decode the result into a JSON array of row objects")]
    Rows {
        #[command(flatten)]
        input: InputArgs,
    },
    #[command(about = "Decode the result into a table and print it")]
    Table {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Number of rows to print (defaults to output.max_rows)")]
        head: Option<usize>,
        #[arg(long, value_name = "COLUMN", help = "Sort rows by a column before printing")]
        sort_by: Option<String>,
        #[arg(long, requires = "sort_by", help = "Sort in descending order")]
        desc: bool,
    },
    #[command(about = "Print the field descriptors of the result schema")]
    Schema {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Print `name: type` lines instead of JSON")]
        plain: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl From<InputArgs> for InputSource {
    fn from(value: InputArgs) -> Self {
        Self { path: value.path, raw: value.raw }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides {
            log_level: cli.log_level.clone(),
            ..ConfigOverrides::default()
        },
    };

    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            let failure = CommandResult::failure(
                "config",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            );
            println!("{}", failure.output);
            return ExitCode::from(failure.exit_code);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Rows { input } => commands::rows::run(&config, &input.into()),
        #[cfg(feature = "tabular")]
        Command::Table { input, head, sort_by, desc } => commands::table::run(
            &config,
            &input.into(),
            &TableOptions { head, sort_by, descending: desc },
        ),
        #[cfg(not(feature = "tabular"))]
        Command::Table { .. } => CommandResult::tabular_unavailable(),
        Command::Schema { input, plain } => commands::schema::run(&config, &input.into(), plain),
        Command::Config => CommandResult::ok(commands::config::run(options)),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
