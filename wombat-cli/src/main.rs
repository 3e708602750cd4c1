//! Wombat CLI
//!
//! Runs a script against a fresh document and reports what it did to the
//! tree.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use wombat_dom::UiCommand;
use wombat_js::{JsRuntime, RuntimeConfig};

/// Wombat - run JavaScript against native DOM bindings
#[derive(Parser, Debug)]
#[command(name = "wombat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Run a script file
    wombat page.js

    # Evaluate inline source and print the host commands it produced
    wombat --commands --eval "document.body.appendChild(document.createElement('p'))"

    # Trace binding internals
    wombat --log wombat_dom=debug page.js
"#)]
struct Cli {
    /// Script file to run
    #[arg(value_name = "FILE", required_unless_present = "eval")]
    path: Option<PathBuf>,

    /// Evaluate this source instead of a file
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "path")]
    eval: Option<String>,

    /// Print the recorded host commands as JSON lines
    #[arg(short, long)]
    commands: bool,

    /// Log filter, e.g. `debug` or `wombat_dom=trace` (overrides WOMBAT_LOG)
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Maximum loop iterations before the script is aborted
    #[arg(long, value_name = "N")]
    loop_limit: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = filter.map_or_else(
        || EnvFilter::try_from_env("WOMBAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        EnvFilter::new,
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let source = load_source(cli)?;

    let mut config = RuntimeConfig::default();
    if let Some(limit) = cli.loop_limit {
        config.loop_iteration_limit = limit;
    }
    let mut runtime = JsRuntime::with_config(config)?;

    let outcome = runtime.execute(&source);
    if cli.commands {
        print_commands(&runtime.take_commands())?;
    }
    let value = outcome.map_err(|err| anyhow::anyhow!("uncaught {err}"))?;
    if !value.is_undefined() {
        println!("{} {}", "=>".green(), value.display());
    }
    Ok(())
}

fn load_source(cli: &Cli) -> Result<String> {
    if let Some(ref source) = cli.eval {
        Ok(source.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        anyhow::bail!("a script file or --eval is required")
    }
}

fn print_commands(commands: &[UiCommand]) -> Result<()> {
    for command in commands {
        println!("{}", serde_json::to_string(command)?);
    }
    Ok(())
}
