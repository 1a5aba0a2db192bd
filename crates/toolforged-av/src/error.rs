//! Error types for toolforged-av.

use crate::toolspec::ToolKind;
use crate::validate::ValidationError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors raised while resolving a tool.
///
/// Auto-detection never produces these; it degrades to
/// [`crate::Resolution::Unset`]. Only an explicit, broken override does.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured binary could not be run or failed its version check.
    #[error("{cause} - the path specified for the {tool} binary might be wrong: {path}")]
    InvalidOverride {
        tool: ToolKind,
        path: String,
        #[source]
        cause: ValidationError,
    },

    /// The configured binary path does not exist.
    #[error("{tool} binary cannot be found at {path}")]
    OverrideNotFound { tool: ToolKind, path: String },

    /// The configured binary path exists but is not a regular file.
    #[error("{tool} binary found at {path} is not a file")]
    OverrideNotAFile { tool: ToolKind, path: String },
}

impl Error {
    /// Create an invalid override error.
    pub fn invalid_override(tool: ToolKind, path: impl Into<String>, cause: ValidationError) -> Self {
        Self::InvalidOverride {
            tool,
            path: path.into(),
            cause,
        }
    }

    /// Create an override not found error.
    pub fn override_not_found(tool: ToolKind, path: impl Into<String>) -> Self {
        Self::OverrideNotFound {
            tool,
            path: path.into(),
        }
    }

    /// Create an override not a file error.
    pub fn override_not_a_file(tool: ToolKind, path: impl Into<String>) -> Self {
        Self::OverrideNotAFile {
            tool,
            path: path.into(),
        }
    }

    /// The tool whose configuration is broken.
    pub fn tool(&self) -> ToolKind {
        match self {
            Self::InvalidOverride { tool, .. }
            | Self::OverrideNotFound { tool, .. }
            | Self::OverrideNotAFile { tool, .. } => *tool,
        }
    }

    /// The configured path that caused the error.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidOverride { path, .. }
            | Self::OverrideNotFound { path, .. }
            | Self::OverrideNotAFile { path, .. } => path,
        }
    }
}
