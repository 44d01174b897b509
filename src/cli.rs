// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Writes fluent.conf from FLUENTD_SERVER_* variables and starts fluentd.
#[derive(Debug, Default, Parser)]
#[command(name = "fluentd-launcher", version, about)]
pub struct Cli {
    /// Master template [env: FLUENTD_TEMPLATE_PATH]
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Where the rendered config is written [env: FLUENTD_TARGET_PATH]
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the rendered config to stdout without writing it or starting fluentd
    #[arg(long, conflicts_with_all = ["no_exec", "list_servers"])]
    pub dry_run: bool,

    /// Write the config but do not start fluentd
    #[arg(long)]
    pub no_exec: bool,

    /// Print the resolved forward servers as JSON and exit
    #[arg(long, conflicts_with = "no_exec")]
    pub list_servers: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from(["fluentd-launcher", "--template", "/tmp/t", "--no-exec"]).unwrap();
        assert_eq!(cli.template, Some(PathBuf::from("/tmp/t")));
        assert!(cli.no_exec);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_dry_run_conflicts_with_no_exec() {
        assert!(Cli::try_parse_from(["fluentd-launcher", "--dry-run", "--no-exec"]).is_err());
    }
}
