use crate::report::Report;
use crate::scan::Occurrence;

/// Formatter for simple, machine-readable output (ripgrep-compatible)
pub struct SimpleFormatter;

impl SimpleFormatter {
    pub fn new() -> Self {
        Self
    }

    /// One `file:line:column:text` line per occurrence
    pub fn format_occurrences(&self, occurrences: &[Occurrence]) -> String {
        let mut output = String::new();
        for occurrence in occurrences {
            output.push_str(&format!(
                "{}:{}:{}:{}\n",
                occurrence.file.display(),
                occurrence.line,
                occurrence.column,
                occurrence.text.replace('\n', " ")
            ));
        }
        output
    }

    /// One issue per line, no color and no key lists
    pub fn format_report(&self, report: &Report) -> String {
        let mut output = String::new();
        if let Some(reason) = &report.reason {
            output.push_str(&format!("aborted:{}\n", reason));
        }
        for issue in &report.issues {
            output.push_str(&issue.to_string());
            output.push('\n');
        }
        output
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{LengthBucket, PatternKind};
    use std::path::PathBuf;

    #[test]
    fn test_format_occurrences() {
        let occurrences = vec![Occurrence {
            file: PathBuf::from("src/App.jsx"),
            line: 12,
            column: 9,
            offset: 240,
            text: "Welcome to Dashboard".into(),
            pattern: "jsx-text",
            kind: PatternKind::Literal,
            bucket: LengthBucket::Usable,
        }];
        assert_eq!(
            SimpleFormatter::new().format_occurrences(&occurrences),
            "src/App.jsx:12:9:Welcome to Dashboard\n"
        );
    }

    #[test]
    fn test_format_aborted_report() {
        let output = SimpleFormatter::new().format_report(&Report::aborted("nothing found"));
        assert_eq!(output, "aborted:nothing found\n");
    }
}
