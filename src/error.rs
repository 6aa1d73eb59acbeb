//! Error types for rendering.
//!
//! This module provides [`DomshotError`], a unified error type for every
//! stage of a render (loading inputs, building the script, running the
//! headless browser, reading the image and cleaning up), and a convenient
//! [`Result`] type alias.
//!
//! # Example
//!
//! ```rust
//! use domshot::{DomshotError, Result};
//!
//! fn screenshot() -> Result<Vec<u8>> {
//!     // Your logic here...
//!     Err(DomshotError::Configuration("example error".to_string()))
//! }
//!
//! match screenshot() {
//!     Ok(png) => println!("Rendered {} bytes", png.len()),
//!     Err(DomshotError::Execution(lines)) => eprintln!("Browser complained:\n{}", lines),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while building or rendering a document.
///
/// Every failure aborts the render. Cleanup of the temporary image file is
/// always attempted before the error reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum DomshotError {
    /// A file was loaded whose extension is not `.css`, `.js` or `.html`.
    ///
    /// Raised before the file is opened, so the document is left untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domshot::DomshotError;
    ///
    /// let error = DomshotError::UnsupportedFileType("notes.txt".into());
    /// assert_eq!(error.to_string(), "Unsupported file type: notes.txt");
    /// ```
    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    /// A variable name cannot be declared as a JavaScript global.
    #[error("Invalid variable name: {0:?}")]
    InvalidVariableName(String),

    /// A numeric array's shape does not match its data.
    #[error("Invalid numeric array: {0}")]
    InvalidArray(String),

    /// A value could not be encoded as JSON.
    #[error("Failed to encode value as JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    ///
    /// # Common Causes
    ///
    /// - Input asset does not exist or is not valid UTF-8
    /// - The headless browser exited without writing the image
    /// - Destination path is not writable
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File involved in the failed operation.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The headless browser could not be started or fed its script.
    ///
    /// # Common Causes
    ///
    /// - Executable not installed or not on `PATH`
    /// - Insufficient permissions to execute it
    #[error("Failed to launch headless browser: {0}")]
    Launch(String),

    /// The headless browser printed output that is not on the allow-list.
    ///
    /// Carries the offending lines verbatim, joined with newlines. This is
    /// raised even when the process exit status reports success.
    #[error("Unexpected error while running headless browser:\n{0}")]
    Execution(String),

    /// The headless browser did not exit within the configured timeout.
    #[error("Headless browser timed out after {0:?}")]
    Timeout(Duration),

    /// The temporary image file could not be removed.
    ///
    /// A file that is already gone is not an error; any other failure is.
    #[error("Failed to remove temporary file {}: {source}", .path.display())]
    Cleanup {
        /// Temporary file that could not be removed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration provided.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domshot::DomshotError;
    ///
    /// let error = DomshotError::Configuration("viewport width must be greater than 0".to_string());
    /// assert_eq!(error.to_string(), "Configuration error: viewport width must be greater than 0");
    /// ```
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(String),
}

impl DomshotError {
    /// Wrap an I/O error together with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DomshotError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience conversion from [`String`] to [`DomshotError::Configuration`].
///
/// # Example
///
/// ```rust
/// use domshot::DomshotError;
///
/// let error: DomshotError = "invalid configuration".to_string().into();
/// assert!(matches!(error, DomshotError::Configuration(_)));
/// ```
impl From<String> for DomshotError {
    fn from(msg: String) -> Self {
        DomshotError::Configuration(msg)
    }
}

/// Convenience conversion from `&str` to [`DomshotError::Configuration`].
impl From<&str> for DomshotError {
    fn from(msg: &str) -> Self {
        DomshotError::Configuration(msg.to_string())
    }
}

/// Result type alias using [`DomshotError`].
pub type Result<T> = std::result::Result<T, DomshotError>;

// ============================================================================
// Unit Tests
// ============================================================================
