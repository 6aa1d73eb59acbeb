//! Mock script executor for testing.
//!
//! This module provides a mock implementation of [`ScriptExecutor`] that
//! plays back canned behaviour, useful for testing render logic without a
//! headless browser installed.
//!
//! # Feature Flag
//!
//! This module is only available when:
//! - The `test-utils` feature is enabled, OR
//! - During testing (`#[cfg(test)]`)
//!
//! # Example
//!
//! ```rust,ignore
//! use domshot::executor::mock::MockExecutor;
//!
//! // Writes a small fake PNG and prints nothing
//! let executor = MockExecutor::new();
//!
//! // Prints a page error and writes no image
//! let executor = MockExecutor::new()
//!     .output("ReferenceError: Can't find variable: d3")
//!     .no_image();
//!
//! // Behaves as if the binary is missing
//! let executor = MockExecutor::fails_to_launch("phantomjs not found");
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::ScriptExecutor;
use crate::error::{DomshotError, Result};

/// PNG signature followed by a marker, written as the fake image.
pub const MOCK_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nmock-image";

/// Mock executor that records calls and plays back canned results.
///
/// # Thread Safety
///
/// Counters are shared through `Arc`s so tests can keep observing them
/// after the executor has been moved into a [`DomShot`](crate::DomShot).
pub struct MockExecutor {
    /// Text returned as the process output.
    output: String,

    /// Bytes written to the output path, if any.
    image: Option<Vec<u8>>,

    /// When set, every call fails with this launch error.
    launch_error: Option<String>,

    /// Number of executions attempted.
    call_count: Arc<AtomicUsize>,

    /// Script passed to the most recent execution.
    last_script: Arc<Mutex<Option<String>>>,
}

impl MockExecutor {
    /// Executor that writes [`MOCK_IMAGE`] and prints nothing.
    pub fn new() -> Self {
        Self {
            output: String::new(),
            image: Some(MOCK_IMAGE.to_vec()),
            launch_error: None,
            call_count: Arc::new(AtomicUsize::new(0)),
            last_script: Arc::new(Mutex::new(None)),
        }
    }

    /// Executor whose every call fails as if the binary could not start.
    pub fn fails_to_launch<S: Into<String>>(message: S) -> Self {
        Self {
            launch_error: Some(message.into()),
            image: None,
            ..Self::new()
        }
    }

    /// Print `output` on every call.
    pub fn output<S: Into<String>>(mut self, output: S) -> Self {
        self.output = output.into();
        self
    }

    /// Write `bytes` as the image.
    pub fn image(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.image = Some(bytes.into());
        self
    }

    /// Exit without writing any image.
    pub fn no_image(mut self) -> Self {
        self.image = None;
        self
    }

    /// Number of executions attempted so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter.
    ///
    /// ```rust,ignore
    /// let executor = MockExecutor::new();
    /// let calls = executor.counter();
    ///
    /// let mut shot = DomShot::with_executor(Box::new(executor));
    /// shot.render()?;
    ///
    /// assert_eq!(calls.load(Ordering::SeqCst), 1);
    /// ```
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }

    /// Shared handle to the most recently executed script.
    pub fn script_log(&self) -> Arc<Mutex<Option<String>>> {
        Arc::clone(&self.last_script)
    }

    /// The most recently executed script.
    pub fn last_script(&self) -> Option<String> {
        self.last_script.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptExecutor for MockExecutor {
    /// Record the call, then fail or write the canned image and output.
    ///
    /// # Errors
    ///
    /// - [`DomshotError::Launch`] when built with [`fails_to_launch`](Self::fails_to_launch)
    /// - [`DomshotError::Io`] if the canned image cannot be written
    fn execute(&self, script: &str, output_path: &Path) -> Result<String> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_script.lock() {
            *last = Some(script.to_string());
        }

        if let Some(message) = &self.launch_error {
            log::debug!("MockExecutor: returning configured launch failure");
            return Err(DomshotError::Launch(message.clone()));
        }

        if let Some(image) = &self.image {
            log::debug!(
                "MockExecutor: writing {} byte image to {} (call #{})",
                image.len(),
                output_path.display(),
                count + 1
            );
            std::fs::write(output_path, image).map_err(|e| DomshotError::io(output_path, e))?;
        }

        Ok(self.output.clone())
    }
}

impl std::fmt::Debug for MockExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockExecutor")
            .field("output", &self.output)
            .field("image_len", &self.image.as_ref().map(Vec::len))
            .field("launch_error", &self.launch_error)
            .field("call_count", &self.call_count.load(Ordering::SeqCst))
            .finish()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
