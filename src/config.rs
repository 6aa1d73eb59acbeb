//! Configuration for the headless browser and render output.
//!
//! This module provides [`RenderConfig`] and [`RenderConfigBuilder`] for
//! choosing the browser executable, the default viewport, the image format,
//! where temporary images are written, and which diagnostic lines are
//! considered harmless.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use domshot::RenderConfigBuilder;
//!
//! let config = RenderConfigBuilder::new()
//!     .executable("/opt/phantomjs/bin/phantomjs")
//!     .viewport(1024, 768)
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .expect("Invalid configuration");
//!
//! assert_eq!(config.viewport.width, 1024);
//! assert_eq!(config.timeout, Some(Duration::from_secs(30)));
//! ```
//!
//! # Environment Configuration
//!
//! When the `env-config` feature is enabled, configuration can be loaded
//! from environment variables and an optional `app.env` file:
//!
//! ```rust,ignore
//! use domshot::config::env::from_env;
//!
//! let config = from_env()?;
//! ```
//!
//! See [`mod@env`] module for available environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Default headless browser executable, resolved through `PATH`.
pub const DEFAULT_EXECUTABLE: &str = "phantomjs";

/// Argument telling the browser to read its program from standard input.
pub const STDIN_SCRIPT_ARG: &str = "/dev/stdin";

/// Prefix of temporary image file names.
pub const DEFAULT_FILE_PREFIX: &str = "tmp_domshot_";

/// Diagnostic substrings that never fail a render.
pub const DEFAULT_IGNORED_WARNINGS: &[&str] = &["Unable to load library icui18n"];

/// Viewport size in CSS pixels.
///
/// The rendered image is clipped to exactly this rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    /// 800 × 600.
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl From<(u32, u32)> for Viewport {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Image format written by the headless browser.
///
/// The browser chooses the encoder from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    #[default]
    Png,
    /// JPEG.
    Jpeg,
    /// GIF.
    Gif,
}

impl ImageFormat {
    /// File extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
        }
    }
}

/// Configuration for rendering.
///
/// # Fields Overview
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `executable` | `phantomjs` | Headless browser binary |
/// | `args` | `["/dev/stdin"]` | Arguments; the script arrives on stdin |
/// | `viewport` | 800 × 600 | Default viewport for new documents |
/// | `format` | PNG | Output image format |
/// | `output_dir` | system temp dir | Where temporary images are written |
/// | `file_prefix` | `tmp_domshot_` | Temporary image name prefix |
/// | `timeout` | none | Kill the browser after this long |
/// | `ignored_warnings` | `icui18n` warning | Harmless output substrings |
///
/// # Example
///
/// ```rust
/// use domshot::RenderConfig;
///
/// let config = RenderConfig::default();
/// assert_eq!(config.executable.to_str(), Some("phantomjs"));
/// assert_eq!(config.viewport.width, 800);
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Path or name of the headless browser executable.
    pub executable: PathBuf,

    /// Arguments passed to the executable.
    pub args: Vec<String>,

    /// Viewport given to documents created from this configuration.
    pub viewport: Viewport,

    /// Image format of the rendered output.
    pub format: ImageFormat,

    /// Directory for temporary image files.
    ///
    /// Must be writable by the browser process.
    pub output_dir: PathBuf,

    /// File name prefix for temporary image files.
    pub file_prefix: String,

    /// Maximum time the browser may run. `None` waits forever.
    pub timeout: Option<Duration>,

    /// Output lines containing any of these substrings are ignored.
    pub ignored_warnings: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            args: vec![STDIN_SCRIPT_ARG.to_string()],
            viewport: Viewport::default(),
            format: ImageFormat::default(),
            output_dir: std::env::temp_dir(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            timeout: None,
            ignored_warnings: DEFAULT_IGNORED_WARNINGS
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }
}

/// Builder for [`RenderConfig`] with validation.
///
/// # Validation
///
/// The [`build()`](Self::build) method validates:
/// - `executable` is not empty
/// - both viewport dimensions are greater than 0
/// - `file_prefix` is not empty and contains no path separator
/// - `timeout`, when set, is greater than 0
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
        }
    }

    /// Set the headless browser executable.
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.executable = path.into();
        self
    }

    /// Replace the executable arguments.
    ///
    /// The script is always written to stdin; the arguments must make the
    /// browser read it from there.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default viewport size.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domshot::RenderConfigBuilder;
    ///
    /// let config = RenderConfigBuilder::new().viewport(320, 240).build().unwrap();
    /// assert_eq!((config.viewport.width, config.viewport.height), (320, 240));
    /// ```
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport = Viewport::new(width, height);
        self
    }

    /// Set the output image format.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the directory for temporary images.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the temporary image name prefix.
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    /// Kill the browser if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Add a harmless output substring to the defaults.
    pub fn ignore_warning(mut self, warning: impl Into<String>) -> Self {
        self.config.ignored_warnings.push(warning.into());
        self
    }

    /// Replace the list of harmless output substrings.
    pub fn ignored_warnings<I, S>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ignored_warnings = warnings.into_iter().map(Into::into).collect();
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domshot::RenderConfigBuilder;
    ///
    /// assert!(RenderConfigBuilder::new().viewport(0, 600).build().is_err());
    /// assert!(RenderConfigBuilder::new().file_prefix("").build().is_err());
    /// ```
    pub fn build(self) -> std::result::Result<RenderConfig, String> {
        if self.config.executable.as_os_str().is_empty() {
            return Err("executable must not be empty".to_string());
        }

        if self.config.viewport.width == 0 {
            return Err("viewport width must be greater than 0".to_string());
        }

        if self.config.viewport.height == 0 {
            return Err("viewport height must be greater than 0".to_string());
        }

        if self.config.file_prefix.is_empty() {
            return Err("file_prefix must not be empty".to_string());
        }

        if self.config.file_prefix.contains(['/', '\\']) {
            return Err("file_prefix must not contain path separators".to_string());
        }

        if self.config.timeout == Some(Duration::ZERO) {
            return Err("timeout must be greater than 0".to_string());
        }

        Ok(self.config)
    }
}

impl Default for RenderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Environment Configuration (feature-gated)
// ============================================================================

/// Environment-based configuration loading.
///
/// This module is only available when the `env-config` feature is enabled.
/// It uses `dotenvy` to load an optional `app.env` file from the current
/// directory before reading the variables below.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `DOMSHOT_PHANTOMJS_PATH` | String | `phantomjs` | Browser executable |
/// | `DOMSHOT_VIEWPORT_WIDTH` | u32 | 800 | Viewport width |
/// | `DOMSHOT_VIEWPORT_HEIGHT` | u32 | 600 | Viewport height |
/// | `DOMSHOT_OUTPUT_DIR` | String | temp dir | Temporary image directory |
/// | `DOMSHOT_TIMEOUT_SECONDS` | u64 | none | Browser timeout |
/// | `DOMSHOT_IGNORED_WARNINGS` | String | none | Extra comma-separated harmless substrings |
///
/// # Example `app.env` File
///
/// ```text
/// DOMSHOT_PHANTOMJS_PATH=/usr/local/bin/phantomjs
/// DOMSHOT_VIEWPORT_WIDTH=1280
/// DOMSHOT_VIEWPORT_HEIGHT=720
/// DOMSHOT_TIMEOUT_SECONDS=30
/// ```
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::DomshotError;

    /// Default environment file name.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Load environment variables from `app.env`.
    ///
    /// Called automatically by [`from_env`].
    pub fn load_env_file() -> Result<std::path::PathBuf, dotenvy::Error> {
        dotenvy::from_filename(ENV_FILE_NAME)
    }

    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable numeric variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::Configuration`] if the resulting values are invalid.
    pub fn from_env() -> Result<RenderConfig, DomshotError> {
        match load_env_file() {
            Ok(path) => {
                log::info!("Loaded configuration from: {:?}", path);
            }
            Err(e) => {
                log::debug!(
                    "No {} file found or failed to load: {} (using environment variables and defaults)",
                    ENV_FILE_NAME,
                    e
                );
            }
        }

        let defaults = RenderConfig::default();

        let executable = std::env::var("DOMSHOT_PHANTOMJS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.executable);

        let width = std::env::var("DOMSHOT_VIEWPORT_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.viewport.width);

        let height = std::env::var("DOMSHOT_VIEWPORT_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.viewport.height);

        let output_dir = std::env::var("DOMSHOT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let timeout_seconds: Option<u64> = std::env::var("DOMSHOT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok());

        let extra_warnings: Vec<String> = std::env::var("DOMSHOT_IGNORED_WARNINGS")
            .map(|s| parse_warning_list(&s))
            .unwrap_or_default();

        log::info!("Loading render configuration from environment:");
        log::info!("   - Executable: {}", executable.display());
        log::info!("   - Viewport: {}x{}", width, height);
        log::info!("   - Output dir: {}", output_dir.display());
        log::info!("   - Timeout: {:?}", timeout_seconds.map(Duration::from_secs));
        log::info!("   - Extra ignored warnings: {}", extra_warnings.len());

        let mut builder = RenderConfigBuilder::new()
            .executable(executable)
            .viewport(width, height)
            .output_dir(output_dir);

        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        for warning in extra_warnings {
            builder = builder.ignore_warning(warning);
        }

        builder.build().map_err(DomshotError::Configuration)
    }

    /// Split a comma-separated list, dropping blank entries.
    pub(crate) fn parse_warning_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
