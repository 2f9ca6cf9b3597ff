use std::fmt::Write;

use crate::report::{IssueCategory, Report, ReportStatus};

/// Markdown rendering of a report, suitable for CI summaries
pub struct MarkdownFormatter {
    limit: usize,
}

impl MarkdownFormatter {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn format(&self, report: &Report) -> String {
        let mut out = String::from("# Translation audit\n\n");

        if report.status == ReportStatus::Aborted {
            let _ = writeln!(
                out,
                "**Aborted:** {}",
                report.reason.as_deref().unwrap_or("nothing was processed")
            );
            return out;
        }

        let status = match report.status {
            ReportStatus::Clean => "clean",
            _ => "issues found",
        };
        let _ = writeln!(out, "- Status: **{}**", status);
        if let Some(reference) = &report.reference_language {
            let _ = writeln!(out, "- Reference language: `{}`", reference);
        }
        if let Some(framework) = &report.framework {
            let _ = writeln!(out, "- Framework: `{}`", framework);
        }
        let _ = writeln!(
            out,
            "- {} languages, {} files, {} reference keys",
            report.total_languages, report.total_files, report.total_keys
        );

        if !report.languages.is_empty() {
            out.push_str("\n| Language | Files | Keys | Empty | Missing | Extra | Complete |\n");
            out.push_str("|---|---:|---:|---:|---:|---:|---:|\n");
            for stats in &report.languages {
                let _ = writeln!(
                    out,
                    "| {}{} | {} | {} | {} | {} | {} | {:.1}% |",
                    stats.language,
                    if stats.is_reference { " (reference)" } else { "" },
                    stats.files,
                    stats.keys,
                    stats.empty_values,
                    stats.missing,
                    stats.extra,
                    stats.completion
                );
            }
        }

        if !report.issues.is_empty() {
            out.push_str("\n## Issues\n");
            for category in IssueCategory::ALL {
                let issues: Vec<_> = report
                    .issues
                    .iter()
                    .filter(|i| i.category() == category)
                    .collect();
                if issues.is_empty() {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "\n### {} ({})\n",
                    category.label(),
                    report.summary.count(category)
                );
                for issue in issues {
                    let _ = writeln!(out, "- {}", issue.to_string().replace('|', "\\|"));
                    let keys = issue.keys();
                    for key in keys.iter().take(self.limit) {
                        let _ = writeln!(out, "  - `{}`", key);
                    }
                    if keys.len() > self.limit {
                        let _ = writeln!(out, "  - ... and {} more", keys.len() - self.limit);
                    }
                }
            }
        }

        if !report.recommendations.is_empty() {
            out.push_str("\n## Recommendations\n\n");
            for recommendation in &report.recommendations {
                let _ = writeln!(out, "- {}", recommendation);
            }
        }
        out
    }
}
