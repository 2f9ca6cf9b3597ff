use serde::Serialize;
use std::collections::BTreeMap;

use crate::check::LanguageCorpus;

use super::issue::{Issue, IssueCategory, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Files were processed and no error-severity issue was found
    Clean,
    IssuesFound,
    /// Nothing was processed; never to be read as clean
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStats {
    pub language: String,
    pub is_reference: bool,
    pub files: usize,
    pub keys: usize,
    pub empty_values: usize,
    pub size_bytes: u64,
    pub malformed_files: usize,
    pub missing: usize,
    pub extra: usize,
    pub not_translated: usize,
    /// Share of reference keys present with a real translation, 0 to 100
    pub completion: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueSummary {
    pub errors: usize,
    pub warnings: usize,
    pub by_category: BTreeMap<IssueCategory, usize>,
}

impl IssueSummary {
    pub fn count(&self, category: IssueCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Final result of one analysis run, handed to the output writers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub reference_language: Option<String>,
    pub framework: Option<String>,
    pub total_languages: usize,
    pub total_files: usize,
    pub total_keys: usize,
    pub languages: Vec<LanguageStats>,
    pub issues: Vec<Issue>,
    pub summary: IssueSummary,
    pub recommendations: Vec<String>,
}

impl Report {
    /// A run that processed nothing
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Aborted,
            reason: Some(reason.into()),
            reference_language: None,
            framework: None,
            total_languages: 0,
            total_files: 0,
            total_keys: 0,
            languages: Vec::new(),
            issues: Vec::new(),
            summary: IssueSummary::default(),
            recommendations: Vec::new(),
        }
    }

    /// Process exit code: 0 clean, 1 issues found, 2 aborted
    pub fn exit_code(&self) -> i32 {
        match self.status {
            ReportStatus::Clean => 0,
            ReportStatus::IssuesFound => 1,
            ReportStatus::Aborted => 2,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| !i.is_error())
    }
}

/// Priority order: severity, category, then language, file and key
pub fn prioritize(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.severity()
            .cmp(&b.severity())
            .then(a.category().cmp(&b.category()))
            .then(a.language().unwrap_or("").cmp(b.language().unwrap_or("")))
            .then(a.file().cmp(b.file()))
            .then(a.key().unwrap_or("").cmp(b.key().unwrap_or("")))
    });
}

fn summarize(issues: &[Issue]) -> IssueSummary {
    let mut summary = IssueSummary::default();
    for issue in issues {
        match issue.severity() {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
        }
        *summary.by_category.entry(issue.category()).or_insert(0) += issue.count();
    }
    summary
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn recommendations(issues: &[Issue], summary: &IssueSummary) -> Vec<String> {
    let missing_files = issues
        .iter()
        .filter(|i| matches!(i, Issue::MissingFile { .. }))
        .count();
    let missing_keys: usize = issues
        .iter()
        .filter(|i| matches!(i, Issue::MissingKey { .. }))
        .map(Issue::count)
        .sum();

    let mut out = Vec::new();
    let malformed = summary.count(IssueCategory::Malformed);
    if malformed > 0 {
        out.push(format!(
            "Fix {} first; they are left out of every comparison",
            plural(malformed, "malformed file")
        ));
    }
    let unreadable = summary.count(IssueCategory::Access);
    if unreadable > 0 {
        out.push(format!("Check permissions on {}", plural(unreadable, "unreadable file")));
    }
    let duplicates = summary.count(IssueCategory::Duplicate);
    if duplicates > 0 {
        out.push(format!(
            "Remove {}; only the last value survives parsing",
            plural(duplicates, "duplicate key")
        ));
    }
    if missing_files > 0 {
        out.push(format!("Create {}", plural(missing_files, "missing translation file")));
    }
    if missing_keys > 0 {
        out.push(format!("Translate {}", plural(missing_keys, "missing key")));
    }
    let extra = summary.count(IssueCategory::Extra);
    if extra > 0 {
        out.push(format!(
            "Remove {} or add them to the reference language",
            plural(extra, "extra key")
        ));
    }
    let placeholder_errors = issues
        .iter()
        .filter(|i| i.category() == IssueCategory::Placeholder && i.is_error())
        .count();
    if placeholder_errors > 0 {
        out.push(format!(
            "Fix {}; interpolation breaks at runtime",
            plural(placeholder_errors, "placeholder mismatch")
        ));
    }
    let empty = summary.count(IssueCategory::Empty);
    if empty > 0 {
        out.push(format!("Fill in {}", plural(empty, "empty value")));
    }
    let not_translated = summary.count(IssueCategory::NotTranslated);
    if not_translated > 0 {
        out.push(format!(
            "Translate {} still carrying a not-translated marker",
            plural(not_translated, "value")
        ));
    }
    let undefined = issues
        .iter()
        .filter(|i| matches!(i, Issue::UndefinedKey { .. }))
        .count();
    if undefined > 0 {
        out.push(format!("Define {} used in code", plural(undefined, "undefined key")));
    }
    let unused = issues
        .iter()
        .filter(|i| matches!(i, Issue::UnusedKey { .. }))
        .count();
    if unused > 0 {
        out.push(format!("Review {}", plural(unused, "unused key")));
    }

    if out.is_empty() {
        out.push("All translations are complete and consistent".to_string());
    }
    out
}

/// Folds corpora and issues into a [`Report`]
#[derive(Default)]
pub struct ReportBuilder<'a> {
    corpora: &'a [LanguageCorpus],
    issues: Vec<Issue>,
    framework: Option<String>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Corpora with the reference language first
    pub fn corpora(mut self, corpora: &'a [LanguageCorpus]) -> Self {
        self.corpora = corpora;
        self
    }

    pub fn issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    fn language_stats(
        &self,
        corpus: &LanguageCorpus,
        reference_keys: usize,
        is_reference: bool,
    ) -> LanguageStats {
        let language = corpus.language.as_str();
        let of_language = || self.issues.iter().filter(move |i| i.language() == Some(language));

        let missing: usize = of_language()
            .filter(|i| i.category() == IssueCategory::Missing)
            .map(Issue::count)
            .sum();
        let untranslated_keys: usize = of_language()
            .map(|i| match i {
                Issue::MissingKey { keys, .. } => keys.len(),
                Issue::MissingFile { reference_keys, .. } => *reference_keys,
                Issue::EmptyValue { .. } | Issue::NotTranslated { .. } => 1,
                _ => 0,
            })
            .sum();
        let extra = of_language()
            .filter(|i| i.category() == IssueCategory::Extra)
            .map(Issue::count)
            .sum();
        let not_translated = of_language()
            .filter(|i| i.category() == IssueCategory::NotTranslated)
            .count();

        // Nothing to translate is complete
        let completion = if reference_keys == 0 {
            100.0
        } else {
            let done = reference_keys.saturating_sub(untranslated_keys);
            (done as f64 / reference_keys as f64 * 1000.0).round() / 10.0
        };

        LanguageStats {
            language: corpus.language.clone(),
            is_reference,
            files: corpus.file_count(),
            keys: corpus.key_count(),
            empty_values: corpus.empty_count(),
            size_bytes: corpus.total_size(),
            malformed_files: corpus.malformed_count(),
            missing,
            extra,
            not_translated,
            completion,
        }
    }

    pub fn build(self) -> Report {
        let total_files: usize = self.corpora.iter().map(LanguageCorpus::file_count).sum();
        let Some(reference) = self.corpora.first() else {
            return Report {
                framework: self.framework,
                ..Report::aborted("no translation languages were found")
            };
        };
        if total_files == 0 {
            return Report {
                framework: self.framework,
                ..Report::aborted("no translation files were processed")
            };
        }

        let total_keys = reference.key_count();
        let languages: Vec<LanguageStats> = self
            .corpora
            .iter()
            .enumerate()
            .map(|(i, corpus)| self.language_stats(corpus, total_keys, i == 0))
            .collect();

        let mut issues = self.issues;
        prioritize(&mut issues);
        let summary = summarize(&issues);
        let recommendations = recommendations(&issues, &summary);
        let status = if summary.errors > 0 {
            ReportStatus::IssuesFound
        } else {
            ReportStatus::Clean
        };

        Report {
            status,
            reason: None,
            reference_language: Some(reference.language.clone()),
            framework: self.framework,
            total_languages: self.corpora.len(),
            total_files,
            total_keys,
            languages,
            issues,
            summary,
            recommendations,
        }
    }
}
