// src/sys/exec.rs

use nix::unistd::execvp;
use std::ffi::CString;

use crate::error::LauncherError;
use crate::sys::traits::{AgentInvocation, AgentLauncher};

/// Replaces the launcher process with fluentd, so the agent becomes PID 1 of
/// the container and receives its signals directly.
pub struct ExecLauncher;

fn to_cstrings(argv: &[String]) -> Result<Vec<CString>, nix::Error> {
    argv.iter()
        .map(|arg| CString::new(arg.as_bytes()).map_err(|_| nix::Error::EINVAL))
        .collect()
}

impl AgentLauncher for ExecLauncher {
    fn launch(&self, invocation: &AgentInvocation) -> Result<(), LauncherError> {
        let launch_err = |source| LauncherError::Launch {
            program: invocation.program.clone(),
            source,
        };

        // 🛡️ Interior NULs would silently truncate an argument; refuse them.
        let argv = to_cstrings(&invocation.argv()).map_err(launch_err)?;
        let Some(program) = argv.first() else {
            return Err(launch_err(nix::Error::EINVAL));
        };

        // On success the launcher's image is gone: fluentd keeps our PID,
        // stdio and environment, so nothing after this line ever runs.
        match execvp(program, &argv) {
            Ok(never) => match never {},
            Err(errno) => Err(launch_err(errno)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_interior_nul_is_rejected_before_exec() {
        let invocation = AgentInvocation {
            program: "fluentd".to_string(),
            config_path: PathBuf::from("/fluentd/etc/fluent.conf"),
            plugin_dir: PathBuf::from("/fluentd/plugins"),
            extra_args: vec!["-v\0-q".to_string()],
        };

        let err = ExecLauncher.launch(&invocation).unwrap_err();
        assert!(matches!(err, LauncherError::Launch { source: nix::Error::EINVAL, .. }));
    }

    #[test]
    fn test_missing_binary_reports_enoent() {
        let invocation = AgentInvocation {
            program: "/nonexistent/fluentd-launcher-test-binary".to_string(),
            config_path: PathBuf::from("fluent.conf"),
            plugin_dir: PathBuf::from("plugins"),
            extra_args: Vec::new(),
        };

        let err = ExecLauncher.launch(&invocation).unwrap_err();
        assert!(matches!(err, LauncherError::Launch { source: nix::Error::ENOENT, .. }));
    }
}
