//! Runtime error types.

/// Errors from loading runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Failed to parse runtime options: {0}")]
    Parse(#[from] toml::de::Error),

    /// A library name no installer exists for
    #[error("Unknown library: {0}")]
    UnknownLibrary(String),

    /// A library listed more than once
    #[error("Library listed twice: {0}")]
    DuplicateLibrary(String),
}
