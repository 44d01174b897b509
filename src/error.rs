// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Every fatal condition the launcher can hit before handing off to fluentd.
///
/// None of these are retried: the launcher is a one-shot container entrypoint,
/// so the operator fixes the environment (or the image) and restarts.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Failure. Required variable missing for {prefix}: {prefix}_{field}")]
    MissingRequiredField { prefix: String, field: &'static str },

    #[error(
        "FLUENTD_SERVER_* variables mix the single-server form ({unindexed}) with \
         the indexed form ({indexed}); use one style only"
    )]
    MixedServerStyles { unindexed: String, indexed: String },

    #[error("Invalid server variable '{key}': {reason}")]
    InvalidServerKey { key: String, reason: &'static str },

    #[error("Server field is set twice: '{first}' and '{second}'")]
    DuplicateServerField { first: String, second: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidFieldValue { key: String, reason: &'static str },

    #[error("Failed to read template '{path}': {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid placeholder in template at line {line}, column {column}")]
    InvalidPlaceholder { line: usize, column: usize },

    #[error("Template does not contain the ${{{slot}}} placeholder")]
    MissingPlaceholder { slot: &'static str },

    #[error("Template references unknown placeholder ${{{name}}}")]
    UnknownPlaceholder { name: String },

    #[error("Failed to write config '{path}': {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),

    #[error("Failed to exec '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: nix::Error,
    },
}
