//! The render pipeline.
//!
//! [`DomShot`] owns a [`Document`], turns it into a script on first use,
//! runs the script through a [`ScriptExecutor`] and hands back the image.
//!
//! # Lifecycle
//!
//! ```text
//! idle ──script()──▶ script ready ──execute──▶ process exited
//!                                                   │
//!                                       output checked (allow-list)
//!                                                   │
//!                                              image read
//!                                                   │
//!                       temp file removed ◀─────────┘   (also on every failure)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domshot::DomShot;
//!
//! let mut shot = DomShot::new();
//! shot.load_files(["demos/assets/style.css", "demos/assets/app.js"])?;
//! shot.load_js("document.body.innerHTML = 'ohai, world';");
//! shot.render_to("output.png")?;
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use crate::config::{ImageFormat, RenderConfig};
use crate::document::{AssetKind, Document};
use crate::error::{DomshotError, Result};
use crate::executor::{PhantomJsExecutor, ScriptExecutor};
use crate::naming::{OutputPathGenerator, RandomOutputPath};
use crate::output::OutputFilter;
use crate::script::{self, GeneratedScript, ScriptState};
use crate::value::ScriptValue;

/// Renders a document to an image through a headless browser.
///
/// Built with defaults by [`DomShot::new`], from a [`RenderConfig`] by
/// [`DomShot::from_config`], or piece by piece with [`DomShot::builder`].
///
/// The generated script is cached after the first [`script()`](Self::script)
/// or [`render()`](Self::render). Content loaded afterwards is only picked up
/// once [`generate_script()`](Self::generate_script) is called.
pub struct DomShot {
    document: Document,
    cached: Option<GeneratedScript>,
    format: ImageFormat,
    filter: OutputFilter,
    executor: Box<dyn ScriptExecutor>,
    paths: Box<dyn OutputPathGenerator>,
}

impl DomShot {
    /// Renderer with the default configuration (`phantomjs` from `PATH`).
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Renderer configured from `config`.
    pub fn from_config(config: RenderConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Renderer configured from `app.env` and `DOMSHOT_*` variables.
    ///
    /// See [`config::env::from_env`](crate::config::env::from_env).
    #[cfg(feature = "env-config")]
    pub fn from_env() -> Result<Self> {
        let config = crate::config::env::from_env()?;
        Ok(Self::from_config(config))
    }

    /// Renderer with the default configuration and a custom executor.
    pub fn with_executor(executor: Box<dyn ScriptExecutor>) -> Self {
        Self::builder().executor(executor).build()
    }

    /// Start building a renderer.
    pub fn builder() -> DomShotBuilder {
        DomShotBuilder::new()
    }

    // ------------------------------------------------------------------------
    // Document access
    // ------------------------------------------------------------------------

    /// The document being assembled.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Append stylesheet text.
    pub fn load_css(&mut self, css: impl Into<String>) {
        self.document.load_css(css);
    }

    /// Append inline script text.
    pub fn load_js(&mut self, js: impl Into<String>) {
        self.document.load_js(js);
    }

    /// Replace the HTML body.
    pub fn load_html(&mut self, body: impl Into<String>) {
        self.document.load_html(body);
    }

    /// Load a `.css`, `.js` or `.html` file. See [`Document::load_file`].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<AssetKind> {
        self.document.load_file(path)
    }

    /// Load several files in order. See [`Document::load_files`].
    pub fn load_files<I, P>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.document.load_files(paths)
    }

    /// Expose a global variable to the page. See [`Document::set_var`].
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<ScriptValue>) -> Result<()> {
        self.document.set_var(name, value)
    }

    /// Viewport as `(width, height)`.
    pub fn clip(&self) -> (u32, u32) {
        self.document.clip()
    }

    /// Set the viewport from `(width, height)`.
    pub fn set_clip(&mut self, clip: (u32, u32)) {
        self.document.set_clip(clip);
    }

    // ------------------------------------------------------------------------
    // Script
    // ------------------------------------------------------------------------

    /// The generated script, building it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::Serialization`] if a variable cannot be encoded.
    pub fn script(&mut self) -> Result<&GeneratedScript> {
        let script = match self.cached.take() {
            Some(script) => script,
            None => {
                let output_path = self.paths.next_path(self.format.extension());
                script::generate(&self.document, output_path)?
            }
        };
        Ok(&*self.cached.insert(script))
    }

    /// Rebuild the script from the current document with a fresh output path.
    pub fn generate_script(&mut self) -> Result<&GeneratedScript> {
        self.cached = None;
        self.script()
    }

    /// Current cache state.
    pub fn script_state(&self) -> ScriptState<'_> {
        ScriptState::from(self.cached.as_ref())
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Render the document and return the image bytes.
    ///
    /// Any output from the browser that is not on the allow-list fails the
    /// render, whatever the exit status. The temporary image is removed on
    /// success and on failure.
    ///
    /// # Errors
    ///
    /// - [`DomshotError::Launch`] / [`DomshotError::Timeout`] from the executor
    /// - [`DomshotError::Execution`] with the unexpected output lines
    /// - [`DomshotError::Io`] if no image was written
    /// - [`DomshotError::Cleanup`] if the temporary image could not be removed
    ///   (only reported when nothing else failed first)
    pub fn render(&mut self) -> Result<Vec<u8>> {
        let started = Instant::now();
        let script = self.script()?.clone();

        let result = self.run(&script);
        let cleanup = remove_output(script.output_path());

        match (result, cleanup) {
            (Ok(bytes), Ok(())) => {
                log::info!(
                    "✅ Rendered {}x{} image ({} bytes) in {:?}",
                    self.document.viewport().width,
                    self.document.viewport().height,
                    bytes.len(),
                    started.elapsed()
                );
                Ok(bytes)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    log::warn!("{} (while handling: {})", cleanup_err, e);
                }
                log::error!("❌ Render failed: {}", e);
                Err(e)
            }
        }
    }

    /// Render the document and write the image to `path`.
    pub fn render_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.render()?;
        fs::write(path, &bytes).map_err(|e| DomshotError::io(path, e))?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Render on tokio's blocking thread pool.
    ///
    /// # Errors
    ///
    /// As [`render()`](Self::render), plus [`DomshotError::Task`] if the
    /// blocking task panics or is cancelled.
    pub async fn render_async(mut self) -> Result<Vec<u8>> {
        tokio::task::spawn_blocking(move || self.render())
            .await
            .map_err(|e| DomshotError::Task(e.to_string()))?
    }

    fn run(&self, script: &GeneratedScript) -> Result<Vec<u8>> {
        let output = self.executor.execute(script.source(), script.output_path())?;
        self.filter.check(&output)?;

        let path = script.output_path();
        fs::read(path).map_err(|e| {
            log::error!("❌ No image at {}: {}", path.display(), e);
            DomshotError::io(path, e)
        })
    }
}

impl Default for DomShot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DomShot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomShot")
            .field("document", &self.document)
            .field("state", &self.script_state())
            .field("format", &self.format)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Delete the temporary image. A file that is already gone is fine.
fn remove_output(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            log::trace!("Removed temporary image {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DomshotError::Cleanup {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`DomShot`].
///
/// Anything not set explicitly is derived from the configuration (or
/// [`RenderConfig::default`]).
///
/// # Example
///
/// ```rust,ignore
/// use domshot::{DomShot, RenderConfigBuilder, PhantomJsExecutor};
/// use domshot::naming::SequentialOutputPath;
///
/// let shot = DomShot::builder()
///     .config(RenderConfigBuilder::new().viewport(400, 300).build()?)
///     .executor(Box::new(PhantomJsExecutor::new("/usr/local/bin/phantomjs")))
///     .path_generator(Box::new(SequentialOutputPath::new("/tmp", "shot_")))
///     .build();
/// ```
#[derive(Default)]
pub struct DomShotBuilder {
    config: Option<RenderConfig>,
    executor: Option<Box<dyn ScriptExecutor>>,
    paths: Option<Box<dyn OutputPathGenerator>>,
}

impl DomShotBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for the viewport, format, allow-list and defaults.
    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Run scripts with `executor` instead of PhantomJS.
    pub fn executor(mut self, executor: Box<dyn ScriptExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Name temporary images with `paths`.
    pub fn path_generator(mut self, paths: Box<dyn OutputPathGenerator>) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Build the renderer.
    pub fn build(self) -> DomShot {
        let config = self.config.unwrap_or_default();

        let executor = self
            .executor
            .unwrap_or_else(|| Box::new(PhantomJsExecutor::from_config(&config)));

        let paths = self.paths.unwrap_or_else(|| {
            Box::new(RandomOutputPath::new(
                config.output_dir.clone(),
                config.file_prefix.clone(),
            ))
        });

        log::trace!(
            "Building DomShot: viewport {}x{}, format {:?}, {} ignored warning(s)",
            config.viewport.width,
            config.viewport.height,
            config.format,
            config.ignored_warnings.len()
        );

        DomShot {
            document: Document::with_viewport(config.viewport),
            cached: None,
            format: config.format,
            filter: OutputFilter::new(config.ignored_warnings),
            executor,
            paths,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
