// src/pipeline.rs

use std::io::Write;

use crate::config::{LauncherConfig, RunMode};
use crate::env::Environment;
use crate::error::LauncherError;
use crate::forward::{compose_match_block, discover_servers};
use crate::sys::traits::{AgentLauncher, ConfigStore};
use crate::template::{FluentConfSlots, Template};

/// Renders the final fluent.conf text. Pure: same inputs, same bytes.
pub fn render_config(env: &Environment, template_text: &str) -> Result<String, LauncherError> {
    // 1. Environment → validated servers (fails on the first bad group)
    let servers = discover_servers(env)?;
    tracing::info!(servers = servers.len(), "Discovered out_forward servers");
    if servers.is_empty() {
        tracing::info!("No FLUENTD_SERVER_* variables set, config will log to stdout only");
    }

    // 2. Empty string when there are no servers: the template keeps only its stdout match.
    let match_out_forward = compose_match_block(&servers);
    let template = Template::parse(template_text)?;
    template.render(&FluentConfSlots { match_out_forward: &match_out_forward })
}

/// Runs the startup sequence for the configured mode.
///
/// Nothing is written and nothing is launched unless every earlier step
/// succeeded.
pub fn run(
    config: &LauncherConfig,
    env: &Environment,
    store: &dyn ConfigStore,
    launcher: &dyn AgentLauncher,
    stdout: &mut dyn Write,
) -> Result<(), LauncherError> {
    // 🔍 Inspection only: no template needed, nothing touched.
    if config.mode == RunMode::ListServers {
        let servers = discover_servers(env)?;
        serde_json::to_writer_pretty(&mut *stdout, &servers)
            .map_err(|e| LauncherError::Stdout(e.into()))?;
        return writeln!(stdout).map_err(LauncherError::Stdout);
    }

    // 🛡️ Everything that can fail on bad input runs before the first write.
    let template_text = store.read_template(&config.template_path)?;
    let rendered = render_config(env, &template_text)?;

    if config.mode == RunMode::DryRun {
        return stdout.write_all(rendered.as_bytes()).map_err(LauncherError::Stdout);
    }

    // Atomic replace: a crash here leaves the previous fluent.conf intact.
    store.write_config(&config.target_path, &rendered)?;
    tracing::info!(path = %config.target_path.display(), "Config file written");

    if config.mode == RunMode::WriteOnly {
        return Ok(());
    }

    // Terminal step. The exec launcher only comes back if execvp failed.
    let invocation = config.invocation();
    tracing::info!(argv = ?invocation.argv(), "Starting fluentd");
    launcher.launch(&invocation)
}
