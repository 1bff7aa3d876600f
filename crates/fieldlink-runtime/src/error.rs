//! Runtime error types.

use fieldlink_engine::AccessError;

/// Errors from configuring the runtime, defining classes, or accessing fields
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Failed to read a config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but is not usable
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A class with this name is already loaded
    #[error("Class already defined: {0}")]
    DuplicateClass(String),

    /// A class declares the same field name twice
    #[error("Duplicate field {field} in class {class}")]
    DuplicateField {
        /// Class name
        class: String,
        /// Field name
        field: String,
    },

    /// No class with this name is loaded
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// Field access error
    #[error(transparent)]
    Access(#[from] AccessError),
}
