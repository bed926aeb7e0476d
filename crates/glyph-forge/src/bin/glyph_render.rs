//! Glyph render CLI.
//!
//! This binary delegates to `glyph_forge::render_cli` for resolution and
//! output, keeping the CLI behaviour testable without spawning a process.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use glyph_forge::render_cli::{CliError, RenderArgs, execute, load_settings, resolve_plan};
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    let args = match RenderArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            if let Err(print_err) = err.print() {
                drop(print_err);
            }
            return code;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "glyph render failed");
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RenderArgs) -> Result<(), CliError> {
    let settings = load_settings()?;
    init_tracing(settings.json_logs);
    let plan = resolve_plan(args, &settings)?;
    execute(&plan, io::stdout().lock())
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
