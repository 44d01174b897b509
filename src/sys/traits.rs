use std::path::{Path, PathBuf};

use crate::error::LauncherError;

// ==============================================================================
// 1. Config Storage (Template In, Rendered Config Out)
// ==============================================================================

pub trait ConfigStore {
    fn read_template(&self, path: &Path) -> Result<String, LauncherError>;

    /// Replaces `path` with `contents`. Either the whole file lands or the
    /// previous file is left untouched.
    fn write_config(&self, path: &Path, contents: &str) -> Result<(), LauncherError>;
}

// ==============================================================================
// 2. Agent Hand-off
// ==============================================================================

/// 🛡️ Discrete argv: no shell ever sees FLUENTD_OPT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInvocation {
    pub program: String,
    pub config_path: PathBuf,
    pub plugin_dir: PathBuf,
    pub extra_args: Vec<String>,
}

impl AgentInvocation {
    /// `fluentd -c <config> -p <plugins> <extra...>`, program first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![
            self.program.clone(),
            "-c".to_string(),
            self.config_path.display().to_string(),
            "-p".to_string(),
            self.plugin_dir.display().to_string(),
        ];
        argv.extend(self.extra_args.iter().cloned());
        argv
    }
}

pub trait AgentLauncher {
    /// Starts the agent. The exec implementation only returns on failure.
    fn launch(&self, invocation: &AgentInvocation) -> Result<(), LauncherError>;
}
