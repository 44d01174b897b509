// src/sys/fs.rs

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::LauncherError;
use crate::sys::traits::ConfigStore;

pub struct LocalConfigStore;

impl LocalConfigStore {
    fn stage_and_persist(path: &Path, contents: &str) -> std::io::Result<()> {
        // Stage beside the target so the rename never crosses a filesystem.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(contents.as_bytes())?;
        staged.as_file().sync_all()?;

        // NamedTempFile starts at 0600; fluentd may run as a different user.
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o644))?;

        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl ConfigStore for LocalConfigStore {
    fn read_template(&self, path: &Path) -> Result<String, LauncherError> {
        fs::read_to_string(path).map_err(|source| LauncherError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_config(&self, path: &Path, contents: &str) -> Result<(), LauncherError> {
        Self::stage_and_persist(path, contents).map_err(|source| LauncherError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
