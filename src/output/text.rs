use colored::*;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::config::Selection;
use crate::report::{Issue, Report, ReportStatus};
use crate::scan::ScanResult;

const DEFAULT_LIMIT: usize = 10;

/// Formatter for rendering reports as colored terminal text
pub struct ReportFormatter {
    limit: usize,
    max_width: usize,
}

impl ReportFormatter {
    /// Create a formatter that lists at most 10 keys per issue
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            max_width: 100,
        }
    }

    /// Maximum number of keys listed per issue; counts are never truncated
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn format(&self, report: &Report) -> String {
        let mut out = String::new();

        if report.status == ReportStatus::Aborted {
            let _ = writeln!(
                out,
                "{} {}",
                "Audit aborted:".red().bold(),
                report.reason.as_deref().unwrap_or("nothing was processed")
            );
            return out;
        }

        self.format_header(report, &mut out);
        self.format_languages(report, &mut out);

        let errors: Vec<&Issue> = report.errors().collect();
        let warnings: Vec<&Issue> = report.warnings().collect();
        if !errors.is_empty() {
            let _ = writeln!(out, "\n{}", format!("Errors ({})", errors.len()).red().bold());
            for issue in errors {
                self.format_issue(issue, &mut out);
            }
        }
        if !warnings.is_empty() {
            let _ = writeln!(
                out,
                "\n{}",
                format!("Warnings ({})", warnings.len()).yellow().bold()
            );
            for issue in warnings {
                self.format_issue(issue, &mut out);
            }
        }

        if !report.recommendations.is_empty() {
            let _ = writeln!(out, "\n{}", "Recommendations".bold());
            for recommendation in &report.recommendations {
                let _ = writeln!(out, "  - {}", recommendation);
            }
        }
        out
    }

    fn format_header(&self, report: &Report, out: &mut String) {
        let status = match report.status {
            ReportStatus::Clean => "clean".green().bold(),
            ReportStatus::IssuesFound => "issues found".red().bold(),
            ReportStatus::Aborted => "aborted".red().bold(),
        };
        let _ = writeln!(out, "Translation audit: {}", status);
        if let Some(reference) = &report.reference_language {
            let _ = write!(out, "Reference language: {}", reference.cyan());
        }
        if let Some(framework) = &report.framework {
            let _ = write!(out, "  Framework: {}", framework.cyan());
        }
        let _ = writeln!(
            out,
            "\nLanguages: {}  Files: {}  Keys: {}",
            report.total_languages, report.total_files, report.total_keys
        );
    }

    fn format_languages(&self, report: &Report, out: &mut String) {
        if report.languages.is_empty() {
            return;
        }
        let _ = writeln!(
            out,
            "\n{:<10} {:>6} {:>7} {:>6} {:>8} {:>6} {:>9}",
            "Language", "Files", "Keys", "Empty", "Missing", "Extra", "Complete"
        );
        for stats in &report.languages {
            let name = if stats.is_reference {
                format!("{}*", stats.language)
            } else {
                stats.language.clone()
            };
            let completion = format!("{:.1}%", stats.completion);
            let completion = if stats.completion >= 100.0 {
                completion.green()
            } else if stats.completion >= 80.0 {
                completion.yellow()
            } else {
                completion.red()
            };
            let _ = writeln!(
                out,
                "{:<10} {:>6} {:>7} {:>6} {:>8} {:>6} {:>9}",
                name,
                stats.files,
                stats.keys,
                stats.empty_values,
                stats.missing,
                stats.extra,
                completion
            );
        }
    }

    fn format_issue(&self, issue: &Issue, out: &mut String) {
        let _ = writeln!(out, "  {}", self.truncate(&issue.to_string(), self.max_width));
        let keys = issue.keys();
        for key in keys.iter().take(self.limit) {
            let _ = writeln!(out, "      - {}", key);
        }
        if keys.len() > self.limit {
            let _ = writeln!(out, "      ... and {} more", keys.len() - self.limit);
        }
    }

    /// Render a scan grouped by file
    pub fn format_scan(&self, result: &ScanResult) -> String {
        let mut out = String::new();
        if result.status == ReportStatus::Aborted {
            let _ = writeln!(
                out,
                "{} {}",
                "Scan aborted:".red().bold(),
                result.reason.as_deref().unwrap_or("unknown reason")
            );
            return out;
        }

        let mut by_file = BTreeMap::new();
        for occurrence in &result.occurrences {
            by_file
                .entry(occurrence.file.as_path())
                .or_insert_with(Vec::new)
                .push(occurrence);
        }

        for (file, occurrences) in &by_file {
            let _ = writeln!(out, "{}", file.display().to_string().bold());
            for occurrence in occurrences {
                let text = self.truncate(&occurrence.text, self.max_width.saturating_sub(30));
                let text = if occurrence.is_key_call() {
                    text.cyan()
                } else {
                    text.normal()
                };
                let _ = writeln!(
                    out,
                    "  {}:{}  {}  ({})",
                    occurrence.line,
                    occurrence.column,
                    text,
                    occurrence.pattern.dimmed()
                );
            }
        }

        let _ = writeln!(
            out,
            "\n{} occurrences in {} files ({} scanned, {} skipped), framework: {}",
            result.occurrences.len(),
            by_file.len(),
            result.files_scanned,
            result.skipped.len(),
            result.framework
        );
        out
    }

    /// Render framework detection: the winner and the full ranking
    pub fn format_selection(&self, selection: &Selection) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Selected: {} ({}) confidence {:.2}",
            selection.descriptor.id.green().bold(),
            selection.descriptor.name,
            selection.confidence
        );
        if selection.candidates.is_empty() {
            let _ = writeln!(out, "No framework detected; using generic literal heuristics");
        }
        for candidate in &selection.candidates {
            let _ = writeln!(
                out,
                "  {:<14} {:.2}  priority {:>4}  {:?}",
                candidate.id, candidate.confidence, candidate.priority, candidate.reason
            );
        }
        out
    }

    fn truncate(&self, s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::IssueSummary;

    fn report(issues: Vec<Issue>) -> Report {
        Report {
            status: ReportStatus::IssuesFound,
            reason: None,
            reference_language: Some("en".into()),
            framework: None,
            total_languages: 2,
            total_files: 2,
            total_keys: 40,
            languages: Vec::new(),
            issues,
            summary: IssueSummary::default(),
            recommendations: vec!["Translate 25 missing keys".into()],
        }
    }

    #[test]
    fn test_key_lists_are_truncated_but_counts_are_not() {
        colored::control::set_override(false);
        let keys: Vec<String> = (0..25).map(|i| format!("key{:02}", i)).collect();
        let formatter = ReportFormatter::new().with_limit(5);
        let output = formatter.format(&report(vec![Issue::MissingKey {
            language: "es".into(),
            file: "common.json".into(),
            keys,
        }]));

        assert!(output.contains("[es] common.json: 25 missing keys"));
        assert!(output.contains("- key04"));
        assert!(!output.contains("- key05"));
        assert!(output.contains("... and 20 more"));
        assert!(output.contains("Translate 25 missing keys"));
    }

    #[test]
    fn test_aborted_report_shows_reason() {
        colored::control::set_override(false);
        let output = ReportFormatter::new().format(&Report::aborted("no locales directory"));
        assert!(output.contains("Audit aborted: no locales directory"));
        assert!(!output.contains("clean"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let formatter = ReportFormatter::new();
        let truncated = formatter.truncate(&"ñ".repeat(50), 10);
        assert_eq!(truncated.chars().count(), 10);
        assert!(truncated.ends_with("..."));
        assert_eq!(formatter.truncate("short", 10), "short");
    }
}
