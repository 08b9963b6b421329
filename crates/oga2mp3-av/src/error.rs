//! Error types for oga2mp3-av.

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the transcoder or managing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An external tool ran past its deadline and was killed.
    #[error("tool timed out: {tool} after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Workspace error.
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(tool: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            tool: tool.into(),
            timeout,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

impl From<Error> for oga2mp3_common::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::ToolNotFound { tool } => oga2mp3_common::Error::tool(
                tool.clone(),
                format!("{tool} not found; is it installed and in PATH?"),
            ),
            Error::ToolFailed { tool, message } => oga2mp3_common::Error::tool(tool, message),
            Error::Timeout { tool, timeout } => {
                oga2mp3_common::Error::tool(tool, format!("timed out after {timeout:?}"))
            }
            Error::Io(e) => oga2mp3_common::Error::Io(e),
            other => oga2mp3_common::Error::internal(other.to_string()),
        }
    }
}
