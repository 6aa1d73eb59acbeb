//! Script executor implementations.
//!
//! This module provides the [`ScriptExecutor`] trait and implementations
//! for running a generated script in a headless browser.
//!
//! # Overview
//!
//! Abstracting the external process allows:
//! - Different executables or wrappers around them
//! - Custom launch arguments and timeouts
//! - Mock executors for testing without a browser installed
//!
//! # Available Executors
//!
//! | Executor | Description |
//! |----------|-------------|
//! | [`PhantomJsExecutor`] | Runs PhantomJS with the script on stdin |
//! | [`mock::MockExecutor`] | For testing (feature-gated) |
//!
//! # Custom Executor
//!
//! ```rust,ignore
//! use std::path::Path;
//! use domshot::{Result, ScriptExecutor};
//!
//! struct RemoteExecutor { /* connection details */ }
//!
//! impl ScriptExecutor for RemoteExecutor {
//!     fn execute(&self, script: &str, output_path: &Path) -> Result<String> {
//!         // Ship the script somewhere, make sure the image lands at
//!         // `output_path`, and return whatever the browser printed.
//!         todo!()
//!     }
//! }
//! ```

mod phantomjs;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use phantomjs::PhantomJsExecutor;

use std::path::Path;

use crate::error::Result;

/// Runs a generated script in a headless browser.
///
/// # Thread Safety
///
/// Requires `Send + Sync` so a [`DomShot`](crate::DomShot) can be moved
/// onto a blocking thread by `render_async`.
///
/// # Contract
///
/// - The call blocks until the browser has exited.
/// - The returned text is everything the browser printed, stdout and stderr
///   combined. It is not interpreted here; the caller filters it.
/// - `output_path` is where the script tells the browser to write the image.
///   Real executors only need it for diagnostics.
pub trait ScriptExecutor: Send + Sync {
    /// Execute `script` and return the combined process output.
    ///
    /// # Errors
    ///
    /// - [`DomshotError::Launch`](crate::DomshotError::Launch) if the browser
    ///   cannot be started or fed the script
    /// - [`DomshotError::Timeout`](crate::DomshotError::Timeout) if it runs
    ///   too long
    fn execute(&self, script: &str, output_path: &Path) -> Result<String>;
}
