//! Error types for hbrip-scan.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating or running the external tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The external tool ran but failed.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(
            Error::tool_not_found("HandBrakeCLI").to_string(),
            "tool not found: HandBrakeCLI"
        );
        assert_eq!(
            Error::tool_failed("HandBrakeCLI", "exit code 1").to_string(),
            "tool execution failed: HandBrakeCLI: exit code 1"
        );
    }
}
