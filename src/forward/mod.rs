// Discovery of FLUENTD_SERVER_* targets and rendering of the out_forward match block.

pub mod collector; // Environment → server groups
pub mod render;    // Server groups → <server> / <match> text

use crate::env::Environment;
use crate::error::LauncherError;

pub use collector::collect_server_groups;
pub use render::{ResolvedServer, compose_match_block, resolve_servers};

/// Collects and validates every configured forward target.
pub fn discover_servers(env: &Environment) -> Result<Vec<ResolvedServer>, LauncherError> {
    let groups = collect_server_groups(env)?;
    resolve_servers(&groups)
}
