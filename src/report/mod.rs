pub mod aggregate;
pub mod issue;

pub use aggregate::{prioritize, IssueSummary, LanguageStats, Report, ReportBuilder, ReportStatus};
pub use issue::{Issue, IssueCategory, Severity};
