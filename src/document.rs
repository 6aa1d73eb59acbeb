//! Document assembly.
//!
//! A [`Document`] collects everything that ends up in the generated script:
//! stylesheet text, inline script text, the HTML body, global variables and
//! the viewport size.
//!
//! | Input | Behaviour on repeated loads |
//! |-------|-----------------------------|
//! | CSS | appended, separated by a newline |
//! | JavaScript | appended, separated by a newline |
//! | HTML body | replaced |
//! | Variables | set per name, later values win |
//!
//! # Example
//!
//! ```rust
//! use domshot::Document;
//!
//! let mut doc = Document::new();
//! doc.load_css("body { margin: 0 }");
//! doc.load_css("h1 { color: red }");
//! doc.load_html("<body><h1>Hi</h1></body>");
//! doc.set_var("title", "Quarterly")?;
//!
//! assert_eq!(doc.css(), "body { margin: 0 }\nh1 { color: red }");
//! # Ok::<(), domshot::DomshotError>(())
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Viewport;
use crate::error::{DomshotError, Result};
use crate::value::ScriptValue;

/// Kind of asset, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// `.css`
    Css,
    /// `.js`
    Script,
    /// `.html`
    Html,
}

impl AssetKind {
    /// Classify a path by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::UnsupportedFileType`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("css") => Ok(AssetKind::Css),
            Some("js") => Ok(AssetKind::Script),
            Some("html") => Ok(AssetKind::Html),
            _ => Err(DomshotError::UnsupportedFileType(path.to_path_buf())),
        }
    }
}

/// Accumulated document state for a single render.
#[derive(Debug, Clone, Default)]
pub struct Document {
    css: Vec<String>,
    scripts: Vec<String>,
    body: String,
    vars: BTreeMap<String, ScriptValue>,
    viewport: Viewport,
}

impl Document {
    /// Empty document with the default 800 × 600 viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document with the given viewport.
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Append stylesheet text.
    pub fn load_css(&mut self, css: impl Into<String>) {
        self.css.push(css.into());
    }

    /// Append inline script text.
    pub fn load_js(&mut self, js: impl Into<String>) {
        self.scripts.push(js.into());
    }

    /// Replace the HTML body.
    pub fn load_html(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Load an asset file, classified by extension.
    ///
    /// The extension is checked before the file is opened, so an unsupported
    /// file leaves the document untouched.
    ///
    /// # Errors
    ///
    /// - [`DomshotError::UnsupportedFileType`] for extensions other than
    ///   `.css`, `.js` and `.html`
    /// - [`DomshotError::Io`] if the file cannot be read as UTF-8 text
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<AssetKind> {
        let path = path.as_ref();
        let kind = AssetKind::from_path(path)?;
        let contents =
            std::fs::read_to_string(path).map_err(|e| DomshotError::io(path, e))?;

        log::debug!("Loaded {:?} asset {} ({} bytes)", kind, path.display(), contents.len());

        match kind {
            AssetKind::Css => self.load_css(contents),
            AssetKind::Script => self.load_js(contents),
            AssetKind::Html => self.load_html(contents),
        }
        Ok(kind)
    }

    /// Load several asset files in order, stopping at the first failure.
    ///
    /// Files loaded before the failure stay loaded.
    pub fn load_files<I, P>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.load_file(path)?;
        }
        Ok(())
    }

    /// Expose `value` to the page as the global variable `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::InvalidVariableName`] unless `name` is a plain
    /// JavaScript identifier (`[A-Za-z_$][A-Za-z0-9_$]*`).
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<ScriptValue>) -> Result<()> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(DomshotError::InvalidVariableName(name));
        }
        self.vars.insert(name, value.into());
        Ok(())
    }

    /// Set several variables; stops at the first invalid name.
    pub fn extend_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ScriptValue>,
    {
        for (name, value) in vars {
            self.set_var(name, value)?;
        }
        Ok(())
    }

    /// Remove a variable, returning its value.
    pub fn remove_var(&mut self, name: &str) -> Option<ScriptValue> {
        self.vars.remove(name)
    }

    /// Accumulated stylesheet text.
    pub fn css(&self) -> String {
        self.css.join("\n")
    }

    /// Accumulated inline script text.
    pub fn js(&self) -> String {
        self.scripts.join("\n")
    }

    /// Current HTML body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Variables in name order.
    pub fn vars(&self) -> &BTreeMap<String, ScriptValue> {
        &self.vars
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Viewport as a `(width, height)` pair.
    pub fn clip(&self) -> (u32, u32) {
        (self.viewport.width, self.viewport.height)
    }

    /// Set the viewport from a `(width, height)` pair.
    pub fn set_clip(&mut self, clip: (u32, u32)) {
        self.viewport = clip.into();
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// ============================================================================
// Unit Tests
// ============================================================================
