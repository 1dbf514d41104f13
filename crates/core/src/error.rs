/// Domain-level errors shared across the workspace crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required input or field is missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The per-installation configuration is absent or incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A persisted state file exists but could not be read back.
    #[error("State file error: {0}")]
    State(String),

    /// An underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
