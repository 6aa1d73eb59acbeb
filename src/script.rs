//! Script generation.
//!
//! Turns a [`Document`] into the program the headless browser runs. The
//! program is the embedded `templates/render.js` with these placeholders
//! filled in:
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `{{width}}`, `{{height}}` | viewport size, also used as the clip rectangle |
//! | `{{css}}` | accumulated CSS, escaped into a string literal |
//! | `{{body}}` | HTML body (or `<body></body>`), escaped into a string literal |
//! | `{{foreword}}` | one `var name = <json>;` line per variable |
//! | `{{inline_js}}` | accumulated inline script |
//! | `{{output_path}}` | image destination, escaped into a string literal |
//!
//! Substitution happens in a single pass, so placeholder-like text inside
//! user content is copied verbatim.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::Result;
use crate::value::{self, ScriptValue};

/// The page rendering program, with `{{name}}` placeholders.
pub const RENDER_TEMPLATE: &str = include_str!("../templates/render.js");

const EMPTY_BODY: &str = "<body></body>";

/// A generated program together with the image path it writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    source: String,
    output_path: PathBuf,
}

impl GeneratedScript {
    /// Program text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the browser is told to write the image.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Whether a renderer's script has been generated yet.
///
/// Loading more content into a document does not reset this; callers
/// regenerate explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState<'a> {
    /// Nothing generated yet.
    Pending,
    /// Generated and cached.
    Built(&'a GeneratedScript),
}

impl<'a> ScriptState<'a> {
    /// The cached script, if any.
    pub fn get(self) -> Option<&'a GeneratedScript> {
        match self {
            ScriptState::Pending => None,
            ScriptState::Built(script) => Some(script),
        }
    }

    /// Whether a script has been generated.
    pub fn is_built(self) -> bool {
        matches!(self, ScriptState::Built(_))
    }
}

impl<'a> From<Option<&'a GeneratedScript>> for ScriptState<'a> {
    fn from(cached: Option<&'a GeneratedScript>) -> Self {
        cached.map_or(ScriptState::Pending, ScriptState::Built)
    }
}

/// Escape text for a double-quoted JavaScript string literal.
///
/// # Example
///
/// ```rust
/// use domshot::script::js_escape;
///
/// assert_eq!(js_escape("say \"hi\"\nbye"), r#"say \"hi\"\nbye"#);
/// ```
pub fn js_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Global variable declarations placed ahead of the inline script.
///
/// # Errors
///
/// Returns [`DomshotError::Serialization`](crate::DomshotError::Serialization)
/// if a value cannot be encoded.
pub fn foreword(vars: &BTreeMap<String, ScriptValue>) -> Result<String> {
    let mut out = String::new();
    for (name, value) in vars {
        out.push_str("var ");
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&value::to_json(value)?);
        out.push_str(";\n");
    }
    Ok(out)
}

/// Build the program for `document`, writing its image to `output_path`.
pub fn generate(document: &Document, output_path: PathBuf) -> Result<GeneratedScript> {
    let viewport = document.viewport();
    let width = viewport.width.to_string();
    let height = viewport.height.to_string();

    let body = match document.body() {
        "" => EMPTY_BODY,
        body => body,
    };

    let css = js_escape(&document.css());
    let body = js_escape(body);
    let declarations = foreword(document.vars())?;
    let inline_js = document.js();
    let destination = js_escape(&output_path.to_string_lossy());

    let source = fill_template(
        RENDER_TEMPLATE,
        &[
            ("width", width.as_str()),
            ("height", height.as_str()),
            ("css", css.as_str()),
            ("body", body.as_str()),
            ("foreword", declarations.as_str()),
            ("inline_js", inline_js.as_str()),
            ("output_path", destination.as_str()),
        ],
    );

    log::trace!(
        "Generated {} byte script ({} variables) writing to {}",
        source.len(),
        document.vars().len(),
        output_path.display()
    );

    Ok(GeneratedScript {
        source,
        output_path,
    })
}

/// Replace `{{name}}` placeholders in one pass.
///
/// Unknown placeholders are kept as they are.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after[..end].trim();
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Viewport;
    use chrono::NaiveDate;

    fn generate_at(doc: &Document) -> GeneratedScript {
        generate(doc, PathBuf::from("/tmp/tmp_domshot_test.png")).unwrap()
    }

    /// Contents of the `page.content = "...";` line.
    fn content_literal(source: &str) -> &str {
        let line = source
            .lines()
            .find(|l| l.starts_with("page.content = \""))
            .expect("content line");
        &line["page.content = \"".len()..line.len() - 2]
    }

    /// True when every `"` in `literal` is preceded by an odd run of backslashes
    /// and no character would end the line inside the literal.
    fn quotes_all_escaped(literal: &str) -> bool {
        if literal.contains(['\n', '\r', '\u{2028}', '\u{2029}']) {
            return false;
        }
        quotes_preceded_by_backslash(literal)
    }

    fn quotes_preceded_by_backslash(literal: &str) -> bool {
        let bytes = literal.as_bytes();
        bytes.iter().enumerate().all(|(i, &b)| {
            if b != b'"' {
                return true;
            }
            let backslashes = bytes[..i].iter().rev().take_while(|&&c| c == b'\\').count();
            backslashes % 2 == 1
        })
    }

    #[test]
    fn test_js_escape() {
        assert_eq!(js_escape("plain"), "plain");
        assert_eq!(js_escape("a\"b"), "a\\\"b");
        assert_eq!(js_escape("line1\nline2"), "line1\\nline2");
        assert_eq!(js_escape("C:\\dir"), "C:\\\\dir");
        assert_eq!(js_escape("cr\r"), "cr\\r");
        assert_eq!(js_escape("a\u{2028}b\u{2029}c"), "a\\u2028b\\u2029c");
    }

    #[test]
    fn test_body_with_quote_and_newline_stays_in_literal() {
        let mut doc = Document::new();
        doc.load_html("<body>\n<p class=\"note\">hi</p>\n</body>");

        let script = generate_at(&doc);
        let literal = content_literal(script.source());

        assert!(literal.contains(r#"<body>\n<p class=\"note\">hi</p>\n</body>"#));
        assert!(quotes_all_escaped(literal), "unescaped quote in {}", literal);
    }

    #[test]
    fn test_unicode_line_separators_stay_in_literal() {
        let mut doc = Document::new();
        doc.load_html("<body>a\u{2028}b\u{2029}c</body>");
        doc.load_css("p::after { content: \"\u{2028}\" }");

        let script = generate_at(&doc);
        let literal = content_literal(script.source());

        assert!(!script.source().contains(['\u{2028}', '\u{2029}']));
        assert!(literal.contains(r"<body>a\u2028b\u2029c</body>"));
        assert!(quotes_all_escaped(literal), "unescaped terminator in {}", literal);
    }

    #[test]
    fn test_only_last_body_is_embedded() {
        let mut doc = Document::new();
        doc.load_html("<body>first</body>");
        doc.load_html("<body>second</body>");

        let script = generate_at(&doc);
        assert!(script.source().contains("<body>second</body>"));
        assert!(!script.source().contains("first"));
    }

    #[test]
    fn test_empty_body_defaults() {
        let script = generate_at(&Document::new());
        assert!(content_literal(script.source()).contains("<body></body>"));
    }

    #[test]
    fn test_css_is_escaped_into_literal() {
        let mut doc = Document::new();
        doc.load_css("body { font-family: \"Helvetica\"; }");
        doc.load_css("p { margin: 0 }");

        let literal = content_literal(generate_at(&doc).source()).to_string();
        assert!(literal.contains(r#"body { font-family: \"Helvetica\"; }\np { margin: 0 }"#));
        assert!(quotes_all_escaped(&literal));
    }

    #[test]
    fn test_viewport_and_output_path_embedded() {
        let doc = Document::with_viewport(Viewport::new(321, 123));
        let script = generate_at(&doc);

        assert!(script.source().contains("page.viewportSize = { width: 321, height: 123 };"));
        assert!(script
            .source()
            .contains("page.clipRect = { top: 0, left: 0, width: 321, height: 123 };"));
        assert!(script
            .source()
            .contains("page.render(\"/tmp/tmp_domshot_test.png\");"));
        assert_eq!(script.output_path(), Path::new("/tmp/tmp_domshot_test.png"));
    }

    #[test]
    fn test_foreword_precedes_inline_js() {
        let mut doc = Document::new();
        doc.set_var("since", NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
            .unwrap();
        doc.set_var("values", vec![1, 2, 3]).unwrap();
        doc.load_js("draw(values, since);");

        let source = generate_at(&doc).source().to_string();
        let since = source.find("var since = \"2020-01-02\";\n").expect("since declared");
        let values = source.find("var values = [1,2,3];\n").expect("values declared");
        let call = source.find("draw(values, since);").expect("inline js");

        assert!(since < values && values < call);
    }

    #[test]
    fn test_foreword_empty_without_vars() {
        assert_eq!(foreword(&BTreeMap::new()).unwrap(), "");
    }

    #[test]
    fn test_placeholders_in_user_content_not_expanded() {
        let mut doc = Document::new();
        doc.load_html("<body>{{output_path}}</body>");
        doc.load_js("var t = '{{width}}';");

        let source = generate_at(&doc).source().to_string();
        assert!(source.contains("<body>{{output_path}}</body>"));
        assert!(source.contains("var t = '{{width}}';"));
    }

    #[test]
    fn test_fill_template_edge_cases() {
        assert_eq!(fill_template("a {{x}} b", &[("x", "1")]), "a 1 b");
        assert_eq!(fill_template("{{ x }}", &[("x", "1")]), "1");
        assert_eq!(fill_template("{{unknown}}", &[("x", "1")]), "{{unknown}}");
        assert_eq!(fill_template("open {{x", &[("x", "1")]), "open {{x");
        assert_eq!(fill_template("no placeholders", &[]), "no placeholders");
    }

    #[test]
    fn test_script_state() {
        let pending = ScriptState::from(None::<&GeneratedScript>);
        assert!(!pending.is_built());
        assert!(pending.get().is_none());

        let script = generate_at(&Document::new());
        let built = ScriptState::from(Some(&script));
        assert!(built.is_built());
        assert_eq!(built, ScriptState::Built(&script));
        assert_eq!(built.get(), Some(&script));
    }
}
