// src/config.rs

use std::path::PathBuf;

use crate::cli::Cli;
use crate::env::Environment;
use crate::sys::traits::AgentInvocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Write the config, then exec fluentd.
    Launch,
    /// Write the config only.
    WriteOnly,
    /// Print the config to stdout; touch nothing.
    DryRun,
    /// Print the resolved servers; touch nothing.
    ListServers,
}

#[derive(Clone, Debug)]
pub struct LauncherConfig {
    // 📂 Paths (fluentd docker image layout by default)
    pub template_path: PathBuf,
    pub target_path: PathBuf,
    pub conf_dir: PathBuf,
    pub plugin_dir: PathBuf,

    // ⚙️ Agent hand-off
    pub conf_name: String,
    pub agent_binary: String,
    pub extra_opts: Vec<String>,

    pub mode: RunMode,
}

fn env_or(env: &Environment, key: &str, default: &str) -> String {
    env.non_empty(key).unwrap_or(default).to_string()
}

impl LauncherConfig {
    pub fn load(env: &Environment, cli: &Cli) -> Self {
        let mode = if cli.dry_run {
            RunMode::DryRun
        } else if cli.list_servers {
            RunMode::ListServers
        } else if cli.no_exec {
            RunMode::WriteOnly
        } else {
            RunMode::Launch
        };

        Self {
            template_path: cli
                .template
                .clone()
                .unwrap_or_else(|| env_or(env, "FLUENTD_TEMPLATE_PATH", "/fluentd/etc/fluent.conf.TMPL").into()),

            target_path: cli
                .output
                .clone()
                .unwrap_or_else(|| env_or(env, "FLUENTD_TARGET_PATH", "/fluentd/etc/fluent.conf").into()),

            conf_dir: env_or(env, "FLUENTD_CONF_DIR", "/fluentd/etc").into(),
            plugin_dir: env_or(env, "FLUENTD_PLUGIN_DIR", "/fluentd/plugins").into(),

            // FLUENTD_CONF names the file fluentd runs, which need not be the one we render.
            conf_name: env_or(env, "FLUENTD_CONF", "fluent.conf"),
            agent_binary: env_or(env, "FLUENTD_BIN", "fluentd"),

            // Historically expanded unquoted by a shell, i.e. split on whitespace.
            extra_opts: env
                .get("FLUENTD_OPT")
                .map(|opts| opts.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),

            mode,
        }
    }

    pub fn invocation(&self) -> AgentInvocation {
        AgentInvocation {
            program: self.agent_binary.clone(),
            config_path: self.conf_dir.join(&self.conf_name),
            plugin_dir: self.plugin_dir.clone(),
            extra_args: self.extra_opts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fluentd_image_layout() {
        let config = LauncherConfig::load(&Environment::default(), &Cli::default());

        assert_eq!(config.template_path, PathBuf::from("/fluentd/etc/fluent.conf.TMPL"));
        assert_eq!(config.target_path, PathBuf::from("/fluentd/etc/fluent.conf"));
        assert_eq!(config.mode, RunMode::Launch);
        assert_eq!(
            config.invocation().argv(),
            ["fluentd", "-c", "/fluentd/etc/fluent.conf", "-p", "/fluentd/plugins"]
        );
    }

    #[test]
    fn test_env_overrides_and_opt_splitting() {
        let env: Environment = [
            ("FLUENTD_CONF", "custom.conf"),
            ("FLUENTD_OPT", "  -v   --no-supervisor "),
            ("FLUENTD_PLUGIN_DIR", "/opt/plugins"),
            ("FLUENTD_TEMPLATE_PATH", "/etc/t.TMPL"),
            ("FLUENTD_TARGET_PATH", ""),
        ]
        .into_iter()
        .collect();

        let config = LauncherConfig::load(&env, &Cli::default());

        assert_eq!(config.template_path, PathBuf::from("/etc/t.TMPL"));
        // Empty falls back to the default.
        assert_eq!(config.target_path, PathBuf::from("/fluentd/etc/fluent.conf"));
        assert_eq!(
            config.invocation().argv(),
            ["fluentd", "-c", "/fluentd/etc/custom.conf", "-p", "/opt/plugins", "-v", "--no-supervisor"]
        );
    }

    #[test]
    fn test_cli_wins_over_env() {
        let env: Environment = [("FLUENTD_TARGET_PATH", "/from/env")].into_iter().collect();
        let cli = Cli {
            output: Some(PathBuf::from("/from/cli")),
            no_exec: true,
            ..Cli::default()
        };

        let config = LauncherConfig::load(&env, &cli);
        assert_eq!(config.target_path, PathBuf::from("/from/cli"));
        assert_eq!(config.mode, RunMode::WriteOnly);
    }
}
