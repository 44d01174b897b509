// External collaborators: the filesystem and the fluentd process.

pub mod traits; // Contracts the pipeline depends on
pub mod fs;     // Template read / atomic config write
pub mod exec;   // execvp hand-off to fluentd
