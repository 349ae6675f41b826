//! Error type for conversion runs.

use std::path::PathBuf;

/// Error type for loading input and writing statements
#[derive(Debug)]
pub enum ConvertError {
    /// The input file does not exist
    NotFound { path: PathBuf },
    /// The JSON parsed but does not have the layout the mode expects
    Shape(String),
    /// Invalid run settings (empty table name and the like)
    Config(String),
    JsonError(serde_json::Error),
    IoError(std::io::Error),
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::JsonError(err)
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::IoError(err)
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::NotFound { path } => write!(
                f,
                "The file {} was not found in the current directory.",
                path.display()
            ),
            ConvertError::Shape(msg) => write!(f, "Unexpected input shape: {}", msg),
            ConvertError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            ConvertError::JsonError(e) => write!(f, "JSON error: {}", e),
            ConvertError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::JsonError(e) => Some(e),
            ConvertError::IoError(e) => Some(e),
            _ => None,
        }
    }
}
