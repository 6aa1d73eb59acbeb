//! # domshot
//!
//! Render HTML, CSS and JavaScript to an image with a headless browser.
//!
//! A [`DomShot`] collects stylesheets, inline scripts, an HTML body and
//! global variables, generates a PhantomJS program from them, runs it with
//! the program on standard input and returns the captured image.
//!
//! ## Features
//!
//! - **Incremental assembly**: CSS and JavaScript accumulate, the body is replaced
//! - **Typed variables**: JSON values, chrono dates/times and numeric arrays
//!   become `var` declarations ahead of the inline script
//! - **Strict output checking**: anything the browser prints that is not on
//!   the allow-list fails the render
//! - **Always cleans up**: the temporary image is removed on success and failure
//! - **Pluggable process**: swap the executor or the temp naming for tests
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 DomShot                     │
//! │ ┌─────────────────────────────────────────┐ │
//! │ │   Document (css, js, body, vars, clip)  │ │
//! │ └─────────────────────────────────────────┘ │
//! │                   │ script::generate        │
//! │                   ▼                         │
//! │ ┌─────────────────────────────────────────┐ │
//! │ │   ScriptState (Pending / Built)         │ │
//! │ └─────────────────────────────────────────┘ │
//! └─────────────────┬───────────────────────────┘
//!                   │ ScriptExecutor::execute
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │      phantomjs /dev/stdin  (child process)  │
//! └─────────────────┬───────────────────────────┘
//!                   │ stdout + stderr
//!                   ▼
//!       OutputFilter ─▶ read image ─▶ remove temp file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use domshot::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut shot = DomShot::new();
//!     shot.load_css("body { background: #fafafa; }");
//!     shot.load_html("<body><h1 id=\"title\"></h1></body>");
//!     shot.set_var("title", "Quarterly report")?;
//!     shot.load_js("document.getElementById('title').textContent = title;");
//!
//!     let png: Vec<u8> = shot.render()?;
//!     std::fs::write("report.png", png)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Configuration
//!
//! With the `env-config` feature (enabled by default) a renderer can be
//! configured from an `app.env` file or the process environment:
//!
//! ```rust,no_run
//! use domshot::DomShot;
//!
//! fn main() -> Result<(), domshot::DomshotError> {
//!     let mut shot = DomShot::from_env()?;
//!     shot.load_html("<body>ohai</body>");
//!     shot.render_to("ohai.png")?;
//!     Ok(())
//! }
//! ```
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `DOMSHOT_PHANTOMJS_PATH` | String | `phantomjs` | Browser executable |
//! | `DOMSHOT_VIEWPORT_WIDTH` | u32 | 800 | Viewport width |
//! | `DOMSHOT_VIEWPORT_HEIGHT` | u32 | 600 | Viewport height |
//! | `DOMSHOT_OUTPUT_DIR` | String | temp dir | Temporary image directory |
//! | `DOMSHOT_TIMEOUT_SECONDS` | u64 | none | Browser timeout |
//! | `DOMSHOT_IGNORED_WARNINGS` | String | none | Extra harmless output, comma separated |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `env-config` | Environment-based configuration (default) |
//! | `test-utils` | Enable the mock executor for testing |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, DomshotError>`](Result):
//!
//! ```rust,ignore
//! use domshot::{DomShot, DomshotError};
//!
//! match shot.render() {
//!     Ok(png) => { /* use the image */ }
//!     Err(DomshotError::Execution(lines)) => {
//!         // The page printed something unexpected
//!         eprintln!("Page errors:\n{}", lines);
//!     }
//!     Err(DomshotError::Launch(msg)) => {
//!         eprintln!("Could not start PhantomJS: {}", msg);
//!     }
//!     Err(e) => eprintln!("Render failed: {}", e),
//! }
//! ```
//!
//! ## Testing
//!
//! For testing without PhantomJS, enable the `test-utils` feature and use
//! [`MockExecutor`](executor::mock::MockExecutor):
//!
//! ```rust,ignore
//! use domshot::executor::mock::MockExecutor;
//!
//! let mut shot = DomShot::with_executor(Box::new(MockExecutor::new()));
//! let image = shot.render()?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod document;
pub mod error;
pub mod executor;
pub mod naming;
pub mod output;
pub mod prelude;
pub mod renderer;
pub mod script;
pub mod value;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

pub use config::{ImageFormat, RenderConfig, RenderConfigBuilder, Viewport};
pub use document::{AssetKind, Document};
pub use error::{DomshotError, Result};
pub use executor::{PhantomJsExecutor, ScriptExecutor};
pub use naming::{OutputPathGenerator, RandomOutputPath, SequentialOutputPath};
pub use output::OutputFilter;
pub use renderer::{DomShot, DomShotBuilder};
pub use script::{GeneratedScript, ScriptState};
pub use value::{NdArray, ScriptValue};

// Feature-gated re-exports
#[cfg(feature = "env-config")]
pub use config::env::from_env;
