use glob::Pattern;
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{scan_exclusions, AuditConfig, FrameworkDescriptor, PatternKind};
use crate::error::{AuditError, Result};
use crate::report::ReportStatus;

use super::occurrence::{LengthBucket, Occurrence};

const TEST_DIRS: &[&str] = &["__tests__", "__mocks__", "tests", "test", "spec", "e2e"];

/// A file the scanner could not use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything one scan produced
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub framework: String,
    pub occurrences: Vec<Occurrence>,
    pub files_scanned: usize,
    pub skipped: Vec<SkippedFile>,
}

impl ScanResult {
    fn new(framework: &str) -> Self {
        Self {
            status: ReportStatus::Clean,
            reason: None,
            framework: framework.to_string(),
            occurrences: Vec::new(),
            files_scanned: 0,
            skipped: Vec::new(),
        }
    }

    /// A scan that never looked at a file
    pub fn aborted(framework: &str, reason: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Aborted,
            reason: Some(reason.into()),
            ..Self::new(framework)
        }
    }

    /// Zero scanned files aborts; any usable literal means issues found
    fn settle(mut self) -> Self {
        if self.files_scanned == 0 {
            self.status = ReportStatus::Aborted;
            self.reason = Some(format!(
                "no source files were scanned ({} skipped)",
                self.skipped.len()
            ));
        } else if self.literals().next().is_some() {
            self.status = ReportStatus::IssuesFound;
        } else {
            self.status = ReportStatus::Clean;
        }
        self
    }

    pub fn exit_code(&self) -> i32 {
        match self.status {
            ReportStatus::Clean => 0,
            ReportStatus::IssuesFound => 1,
            ReportStatus::Aborted => 2,
        }
    }

    pub fn literals(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(|o| !o.is_key_call())
    }

    pub fn key_calls(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(|o| o.is_key_call())
    }
}

enum FileOutcome {
    Scanned(Vec<Occurrence>),
    Skipped(SkippedFile),
}

/// Walks a project and applies one descriptor's extraction patterns to each file
pub struct Scanner {
    root: PathBuf,
    descriptor: &'static FrameworkDescriptor,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    min_length: usize,
    max_length: usize,
    include_tests: bool,
    max_file_size: u64,
    max_depth: usize,
    max_files: usize,
    concurrency: Option<usize>,
}

fn compile_globs<'a>(globs: impl IntoIterator<Item = &'a str>) -> Result<Vec<Pattern>> {
    globs
        .into_iter()
        .map(|g| {
            Pattern::new(g)
                .map_err(|e| AuditError::configuration(format!("invalid glob '{}': {}", g, e)))
        })
        .collect()
}

/// Exclusions match the relative path or any single component of it
fn is_excluded(relative: &Path, exclude: &[Pattern]) -> bool {
    exclude.iter().any(|pattern| {
        pattern.matches_path(relative)
            || relative.components().any(|c| match c {
                Component::Normal(name) => name.to_str().is_some_and(|n| pattern.matches(n)),
                _ => false,
            })
    })
}

/// Test and spec files by naming convention
pub fn is_test_path(relative: &Path) -> bool {
    let in_test_dir = relative
        .parent()
        .map(|parent| {
            parent.components().any(|c| match c {
                Component::Normal(name) => name.to_str().is_some_and(|n| TEST_DIRS.contains(&n)),
                _ => false,
            })
        })
        .unwrap_or(false);
    if in_test_dir {
        return true;
    }

    let Some(name) = relative.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.contains(".test.")
        || name.contains(".spec.")
        || name
            .rsplit_once('.')
            .map(|(stem, _)| stem.ends_with("_test") || stem.ends_with("_spec"))
            .unwrap_or(false)
        || (name.starts_with("test_") && name.ends_with(".py"))
}

/// Whether a literal reads like user-facing text rather than code
pub fn looks_like_text(text: &str) -> bool {
    let text = text.trim();
    if !text.chars().any(char::is_alphabetic) {
        return false;
    }

    let lower = text.to_ascii_lowercase();
    if ["http://", "https://", "mailto:", "www.", "//", "data:"]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        return false;
    }

    if text.chars().any(char::is_whitespace) {
        return true;
    }

    // Single token: only a capitalized word ("Save", "Dashboard") reads as text
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_lowercase()),
        _ => false,
    }
}

struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(content.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-based line and character column of a byte offset
    fn position(&self, content: &str, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = content[self.starts[line]..offset].chars().count() + 1;
        (line + 1, column)
    }
}

impl Scanner {
    pub fn new(
        root: impl Into<PathBuf>,
        descriptor: &'static FrameworkDescriptor,
        config: &AuditConfig,
    ) -> Result<Self> {
        let root = root.into();
        let exclusions = scan_exclusions(&root, descriptor, &config.exclusions);

        Ok(Self {
            include: compile_globs(descriptor.include_globs.iter().copied())?,
            exclude: compile_globs(exclusions.iter().map(String::as_str))?,
            root,
            descriptor,
            min_length: config.min_length,
            max_length: config.max_length,
            include_tests: config.include_tests,
            max_file_size: config.max_file_size,
            max_depth: config.max_depth,
            max_files: config.max_files,
            concurrency: config.concurrency,
        })
    }

    pub fn descriptor(&self) -> &'static FrameworkDescriptor {
        self.descriptor
    }

    /// Candidate files in walk order: included, not excluded, tests filtered
    fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        let root = self.root.clone();
        let exclude = self.exclude.clone();

        WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .max_depth(Some(self.max_depth))
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                relative.as_os_str().is_empty() || !is_excluded(relative, &exclude)
            })
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
            .filter(move |path| self.wants(path))
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Candidates up to the file cap; the cap is hit before any read past it
    fn capped_candidates(&self) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = self
            .candidates()
            .take(self.max_files.saturating_add(1))
            .collect();
        if candidates.len() > self.max_files {
            warn!("File limit of {} reached, stopping scan", self.max_files);
            candidates.truncate(self.max_files);
        }
        candidates
    }

    fn wants(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        let Some(name) = relative.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !self.include.iter().any(|p| p.matches(name)) {
            return false;
        }
        self.include_tests || !is_test_path(relative)
    }

    fn scan_file(&self, path: &Path) -> FileOutcome {
        let relative = self.relative(path).to_path_buf();
        let skip = |reason: String| {
            debug!("Skipping {}: {}", relative.display(), reason);
            FileOutcome::Skipped(SkippedFile {
                path: relative.clone(),
                reason,
            })
        };

        match fs::metadata(path) {
            Ok(meta) if meta.len() > self.max_file_size => {
                return skip(format!(
                    "file size {} exceeds limit {}",
                    meta.len(),
                    self.max_file_size
                ))
            }
            Ok(_) => {}
            Err(e) => return skip(e.to_string()),
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return skip(e.to_string()),
        };
        if content.contains('\0') {
            return skip("binary content".to_string());
        }

        FileOutcome::Scanned(self.scan_content(&relative, &content))
    }

    /// Apply every pattern in descriptor order, keeping non-overlapping matches
    pub fn scan_content(&self, relative: &Path, content: &str) -> Vec<Occurrence> {
        let index = LineIndex::new(content);
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut found = Vec::new();

        for pattern in &self.descriptor.patterns {
            for caps in pattern.regex.captures_iter(content) {
                let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let span = (whole.start(), whole.end());
                if claimed.iter().any(|&(s, e)| span.0 < e && s < span.1) {
                    continue;
                }

                let text = group.as_str().trim();
                let bucket = LengthBucket::classify(text, self.min_length, self.max_length);
                if pattern.kind == PatternKind::Literal
                    && (bucket != LengthBucket::Usable || !looks_like_text(text))
                {
                    continue;
                }

                claimed.push(span);
                let leading = group.as_str().len() - group.as_str().trim_start().len();
                let offset = group.start() + leading;
                let (line, column) = index.position(content, offset);
                found.push(Occurrence {
                    file: relative.to_path_buf(),
                    line,
                    column,
                    offset,
                    text: text.to_string(),
                    pattern: pattern.id,
                    kind: pattern.kind,
                    bucket,
                });
            }
        }

        found.sort_by_key(|o| o.offset);
        found
    }

    /// Lazy occurrence stream; every call starts a fresh walk
    pub fn iter(&self) -> OccurrenceIter<'_> {
        OccurrenceIter {
            scanner: self,
            files: Box::new(self.candidates()),
            pending: VecDeque::new(),
            files_visited: 0,
            files_scanned: 0,
            skipped: Vec::new(),
        }
    }

    /// Sequential scan collected into a result
    pub fn scan(&self) -> ScanResult {
        let mut iter = self.iter();
        let occurrences: Vec<Occurrence> = iter.by_ref().collect();
        ScanResult {
            occurrences,
            files_scanned: iter.files_scanned,
            skipped: iter.skipped,
            ..ScanResult::new(self.descriptor.id)
        }
        .settle()
    }

    /// Scan on a rayon pool; output is identical to [`Scanner::scan`]
    pub fn scan_parallel(&self) -> Result<ScanResult> {
        match self.concurrency {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| {
                        AuditError::Generic(format!("Failed to start thread pool: {}", e))
                    })?;
                Ok(pool.install(|| self.collect_parallel()))
            }
            None => Ok(self.collect_parallel()),
        }
    }

    fn collect_parallel(&self) -> ScanResult {
        let candidates = self.capped_candidates();
        let outcomes: Vec<FileOutcome> = candidates.par_iter().map(|p| self.scan_file(p)).collect();

        let mut result = ScanResult::new(self.descriptor.id);
        for outcome in outcomes {
            match outcome {
                FileOutcome::Skipped(skipped) => result.skipped.push(skipped),
                FileOutcome::Scanned(found) => {
                    result.files_scanned += 1;
                    result.occurrences.extend(found);
                }
            }
        }

        result
            .occurrences
            .sort_by(|a, b| a.file.cmp(&b.file).then(a.offset.cmp(&b.offset)));
        result.settle()
    }
}

/// Lazy iterator over occurrences, one file at a time.
///
/// Every visited file counts toward the file cap, skipped ones included.
pub struct OccurrenceIter<'s> {
    scanner: &'s Scanner,
    files: Box<dyn Iterator<Item = PathBuf> + 's>,
    pending: VecDeque<Occurrence>,
    files_visited: usize,
    files_scanned: usize,
    skipped: Vec<SkippedFile>,
}

impl OccurrenceIter<'_> {
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }
}

impl Iterator for OccurrenceIter<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        loop {
            if let Some(next) = self.pending.pop_front() {
                return Some(next);
            }
            if self.files_visited > self.scanner.max_files {
                return None;
            }

            let path = self.files.next()?;
            self.files_visited += 1;
            if self.files_visited > self.scanner.max_files {
                warn!("File limit of {} reached, stopping scan", self.scanner.max_files);
                return None;
            }

            match self.scanner.scan_file(&path) {
                FileOutcome::Skipped(skipped) => self.skipped.push(skipped),
                FileOutcome::Scanned(found) => {
                    self.files_scanned += 1;
                    self.pending.extend(found);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{descriptor_by_id, vanilla};
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_looks_like_text() {
        assert!(looks_like_text("Welcome to Dashboard"));
        assert!(looks_like_text("Save"));
        assert!(!looks_like_text("react"));
        assert!(!looks_like_text("welcome.title"));
        assert!(!looks_like_text("./components/Button"));
        assert!(!looks_like_text("https://example.com/a b"));
        assert!(!looks_like_text("12 34"));
        assert!(!looks_like_text("GET"));
    }

    #[test]
    fn test_is_test_path() {
        assert!(is_test_path(Path::new("src/App.test.tsx")));
        assert!(is_test_path(Path::new("src/__tests__/App.tsx")));
        assert!(is_test_path(Path::new("app/views_test.py")));
        assert!(is_test_path(Path::new("test_views.py")));
        assert!(is_test_path(Path::new("tests/helpers.js")));
        assert!(!is_test_path(Path::new("src/latest.js")));
        assert!(!is_test_path(Path::new("src/testimonials/Card.jsx")));
    }

    #[test]
    fn test_line_and_column() {
        let scanner =
            Scanner::new("/nonexistent", vanilla(), &AuditConfig::default()).unwrap();
        let content = "let a = 1;\n  const t = \"Hello there\";\n";
        let found = scanner.scan_content(Path::new("a.js"), content);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].column, 14);
        assert_eq!(&content[found[0].offset..found[0].offset + 11], "Hello there");
    }

    #[test]
    fn test_key_call_claims_its_literal() {
        let react = descriptor_by_id("react").unwrap();
        let scanner = Scanner::new("/nonexistent", react, &AuditConfig::default()).unwrap();
        let found = scanner.scan_content(
            Path::new("App.jsx"),
            r#"<h1>{t('home.title')}</h1><p>Plain text here</p>"#,
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, PatternKind::KeyCall);
        assert_eq!(found[0].text, "home.title");
        assert_eq!(found[1].kind, PatternKind::Literal);
        assert_eq!(found[1].text, "Plain text here");
    }

    #[test]
    fn test_exclusions_win_over_includes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/app.js", r#"const a = "Visible text";"#);
        write(dir.path(), "node_modules/lib/index.js", r#"const a = "Hidden text";"#);
        write(dir.path(), "legacy/old.js", r#"const a = "Old text here";"#);

        let config = AuditConfig::default().with_exclusions(vec!["legacy/**".to_string()]);
        let scanner = Scanner::new(dir.path(), vanilla(), &config).unwrap();
        let result = scanner.scan();
        let texts: Vec<_> = result.occurrences.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Visible text"]);
        assert_eq!(result.files_scanned, 1);
    }

    #[test]
    fn test_oversized_and_binary_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.js", r#"const a = "First file text";"#);
        write(dir.path(), "b.js", &format!("const b = \"{}\";", "x ".repeat(100)));
        fs::write(dir.path().join("c.js"), b"const c = \"Bin\0ary text\";").unwrap();

        let config = AuditConfig {
            max_file_size: 100,
            ..AuditConfig::default()
        };
        let scanner = Scanner::new(dir.path(), vanilla(), &config).unwrap();
        let result = scanner.scan();
        assert_eq!(result.files_scanned, 1);
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.occurrences.len(), 1);
    }

    #[test]
    fn test_iter_is_restartable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.js", r#"const a = "Some text here";"#);
        let scanner = Scanner::new(dir.path(), vanilla(), &AuditConfig::default()).unwrap();

        let first: Vec<_> = scanner.iter().collect();
        let second: Vec<_> = scanner.iter().collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_files_cap_stops_before_reading() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("f{}.js", i), r#"const a = "Some text here";"#);
        }
        // Past the cap: would show up in `skipped` if it were ever opened
        write(dir.path(), "f3.js", &format!("const a = \"{}\";", "x ".repeat(100)));
        let config = AuditConfig {
            max_files: 3,
            max_file_size: 100,
            ..AuditConfig::default()
        };
        let scanner = Scanner::new(dir.path(), vanilla(), &config).unwrap();

        for result in [scanner.scan(), scanner.scan_parallel().unwrap()] {
            assert_eq!(result.files_scanned, 3);
            assert!(result.skipped.is_empty());
            assert_eq!(result.occurrences.len(), 3);
        }

        let mut iter = scanner.iter();
        assert_eq!(iter.by_ref().count(), 3);
        assert!(iter.skipped().is_empty());
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_skipped_files_count_toward_cap() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.js", &format!("const a = \"{}\";", "x ".repeat(100)));
        write(dir.path(), "b.js", r#"const b = "Some text here";"#);
        write(dir.path(), "c.js", r#"const c = "More text here";"#);
        let config = AuditConfig {
            max_files: 2,
            max_file_size: 100,
            ..AuditConfig::default()
        };
        let scanner = Scanner::new(dir.path(), vanilla(), &config).unwrap();

        let result = scanner.scan_parallel().unwrap();
        assert_eq!(result.files_scanned, 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(scanner.scan().occurrences, result.occurrences);
    }

    #[test]
    fn test_status_follows_literals_and_scanned_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.js", r#"const a = t("home.title");"#);
        let scanner = Scanner::new(dir.path(), vanilla(), &AuditConfig::default()).unwrap();
        assert_eq!(scanner.scan().status, ReportStatus::Clean);

        write(dir.path(), "b.js", r#"const b = "Some text here";"#);
        let result = scanner.scan_parallel().unwrap();
        assert_eq!(result.status, ReportStatus::IssuesFound);
        assert_eq!(result.exit_code(), 1);

        let empty = TempDir::new().unwrap();
        let scanner = Scanner::new(empty.path(), vanilla(), &AuditConfig::default()).unwrap();
        let result = scanner.scan();
        assert_eq!(result.status, ReportStatus::Aborted);
        assert_eq!(result.exit_code(), 2);
        assert!(result.reason.unwrap().contains("no source files were scanned"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            write(
                dir.path(),
                &format!("dir{}/file{}.js", i % 3, i),
                &format!("const a = \"Text number {}\";\nconst b = 'Another one';", i),
            );
        }
        let config = AuditConfig::default().with_concurrency(4);
        let scanner = Scanner::new(dir.path(), vanilla(), &config).unwrap();

        let sequential = scanner.scan();
        let parallel = scanner.scan_parallel().unwrap();
        assert_eq!(sequential.occurrences, parallel.occurrences);
        assert_eq!(sequential.files_scanned, 20);
    }
}
