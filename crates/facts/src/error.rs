//! Error types for fact loading and watching.

use std::path::PathBuf;

/// Errors that can occur while loading or watching fact files.
#[derive(Debug, thiserror::Error)]
pub enum FactError {
    /// Filesystem I/O error (unreadable file, file vanished, no cwd).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML syntax error in a fact file or config file.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Parsed YAML top-level value is not absent, a mapping, or a list of mappings.
    #[error("Unsupported facts type in {}, expected a mapping or a list of mappings, found {found}", display_path(.path))]
    Shape { path: PathBuf, found: String },

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The consumer dropped the receiving half of the queue.
    #[error("fact queue closed by consumer")]
    QueueClosed,

    /// The blocking watch worker panicked or was cancelled, or a collector
    /// lock was poisoned.
    #[error("watch worker failed: {0}")]
    Worker(String),
}

impl FactError {
    /// Attach the source file to a shape error produced from in-memory text.
    pub(crate) fn with_path(self, path: &std::path::Path) -> Self {
        match self {
            FactError::Shape { found, .. } => FactError::Shape {
                path: path.to_path_buf(),
                found,
            },
            other => other,
        }
    }
}

fn display_path(path: &std::path::Path) -> String {
    if path.as_os_str().is_empty() {
        "<text>".to_string()
    } else {
        path.display().to_string()
    }
}

/// Result alias for fact operations.
pub type Result<T> = std::result::Result<T, FactError>;
