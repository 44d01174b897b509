// src/main.rs

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod env;
mod error;
mod forward;
mod pipeline;
mod sys;
mod template;

use crate::cli::Cli;
use crate::config::LauncherConfig;
use crate::env::Environment;
use crate::sys::exec::ExecLauncher;
use crate::sys::fs::LocalConfigStore;

fn init_logging(env: &Environment) {
    // stderr only: stdout belongs to --dry-run / --list-servers output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env.get("FLUENTD_LAUNCHER_LOG_FORMAT") == Some("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    // ==============================================================================
    // 1. Configuration & Environment
    // ==============================================================================

    let cli = Cli::parse();
    let env = Environment::capture();
    init_logging(&env);
    let config = LauncherConfig::load(&env, &cli);

    // ==============================================================================
    // 2. Render, Write, Hand Off
    // ==============================================================================

    let stdout = std::io::stdout();
    match pipeline::run(&config, &env, &LocalConfigStore, &ExecLauncher, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fluentd-launcher aborted");
            ExitCode::FAILURE
        }
    }
}
