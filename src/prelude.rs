//! Convenient imports for common usage patterns.
//!
//! ```rust,ignore
//! use domshot::prelude::*;
//! ```
//!
//! This imports:
//!
//! - [`DomShot`] - Renderer
//! - [`DomShotBuilder`] - Renderer builder
//! - [`Document`] - Document being assembled
//! - [`RenderConfig`] / [`RenderConfigBuilder`] - Configuration
//! - [`Viewport`] / [`ImageFormat`] - Output geometry and format
//! - [`DomshotError`] / [`Result`] - Errors
//! - [`ScriptExecutor`] / [`PhantomJsExecutor`] - Process execution
//! - [`ScriptValue`] / [`NdArray`] - Variable values
//!
//! # Example
//!
//! ```rust,ignore
//! use domshot::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = RenderConfigBuilder::new().viewport(1024, 768).build()?;
//!     let mut shot = DomShot::from_config(config);
//!     shot.set_var("series", NdArray::vector(vec![1.0, 4.0, 9.0]))?;
//!     shot.render_to("series.png")
//! }
//! ```

pub use crate::config::{ImageFormat, RenderConfig, RenderConfigBuilder, Viewport};
pub use crate::document::Document;
pub use crate::error::{DomshotError, Result};
pub use crate::executor::{PhantomJsExecutor, ScriptExecutor};
pub use crate::renderer::{DomShot, DomShotBuilder};
pub use crate::value::{NdArray, ScriptValue};

// Feature-gated exports
#[cfg(feature = "env-config")]
pub use crate::config::env::from_env;
