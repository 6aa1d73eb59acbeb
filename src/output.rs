//! Filtering of headless browser output.
//!
//! The browser reports page errors and console messages on its output
//! streams, so any output at all usually means something went wrong. A few
//! diagnostics are known to be harmless (for example a missing ICU library
//! on minimal Linux images) and are dropped before deciding.

use crate::error::{DomshotError, Result};

/// Allow-list filter for process output.
#[derive(Debug, Clone, Default)]
pub struct OutputFilter {
    ignored: Vec<String>,
}

impl OutputFilter {
    /// Filter that drops lines containing any of `ignored`.
    pub fn new<I, S>(ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: ignored.into_iter().map(Into::into).collect(),
        }
    }

    /// Lines that matter: non-empty and not matching the allow-list.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domshot::OutputFilter;
    ///
    /// let filter = OutputFilter::new(["icui18n"]);
    /// let output = "Unable to load library icui18n \"Cannot load library\"\n\nTypeError: undefined\n";
    /// assert_eq!(filter.important_lines(output), vec!["TypeError: undefined"]);
    /// ```
    pub fn important_lines<'a>(&self, output: &'a str) -> Vec<&'a str> {
        output
            .trim()
            .lines()
            .filter(|line| !line.is_empty() && !self.is_ignored(line))
            .collect()
    }

    /// Fail if any important line remains.
    ///
    /// # Errors
    ///
    /// Returns [`DomshotError::Execution`] carrying the remaining lines.
    pub fn check(&self, output: &str) -> Result<()> {
        let lines = self.important_lines(output);
        if lines.is_empty() {
            return Ok(());
        }

        log::warn!("Headless browser reported {} unexpected line(s)", lines.len());
        Err(DomshotError::Execution(lines.join("\n")))
    }

    fn is_ignored(&self, line: &str) -> bool {
        self.ignored.iter().any(|warning| line.contains(warning.as_str()))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IGNORED_WARNINGS;

    fn default_filter() -> OutputFilter {
        OutputFilter::new(DEFAULT_IGNORED_WARNINGS.iter().copied())
    }

    #[test]
    fn test_empty_output_passes() {
        assert!(default_filter().check("").is_ok());
        assert!(default_filter().check("\n\n  \n").is_ok());
    }

    #[test]
    fn test_allow_listed_line_is_suppressed() {
        let output = "Unable to load library icui18n \"Cannot load library icui18n\"\n";
        assert!(default_filter().check(output).is_ok());
    }

    #[test]
    fn test_unknown_line_fails_with_text() {
        let output = "Unable to load library icui18n\nReferenceError: Can't find variable: $\n  phantomjs://code/stdin:3\n";
        let err = default_filter().check(output).unwrap_err();

        match err {
            DomshotError::Execution(lines) => {
                assert_eq!(
                    lines,
                    "ReferenceError: Can't find variable: $\n  phantomjs://code/stdin:3"
                );
            }
            other => panic!("Expected Execution error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_allow_list_keeps_everything() {
        let filter = OutputFilter::default();
        assert_eq!(
            filter.important_lines("Unable to load library icui18n"),
            vec!["Unable to load library icui18n"]
        );
    }
}
