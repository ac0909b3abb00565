use std::process::ExitCode;

fn main() -> ExitCode {
    malloy_cli::run()
}
