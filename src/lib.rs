pub mod cache;
pub mod check;
pub mod config;
pub mod error;
pub mod output;
pub mod parse;
pub mod report;
pub mod scan;

use std::path::{Path, PathBuf};
use tracing::warn;

// Re-export commonly used types
pub use cache::TreeCache;
pub use check::{check_corpora, check_key_usage, LanguageCorpus};
pub use config::{
    descriptor_by_id, descriptors, select_framework, AuditConfig, FrameworkDescriptor,
    ProjectManifest, Selection,
};
pub use error::{AuditError, Result};
pub use output::{MarkdownFormatter, ReportFormatter, SimpleFormatter};
pub use parse::{flatten, unflatten, FlattenedKeySet, TranslationTree};
pub use report::{Issue, IssueCategory, Report, ReportBuilder, ReportStatus, Severity};
pub use scan::{Occurrence, OccurrenceIter, ScanResult, Scanner};

/// Query parameters for a translation completeness check
#[derive(Debug, Clone)]
pub struct CheckQuery {
    pub root: PathBuf,
    pub config: AuditConfig,
    /// Overrides the default cache location when the cache is enabled
    pub cache_dir: Option<PathBuf>,
}

impl CheckQuery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: AuditConfig::default(),
            cache_dir: None,
        }
    }

    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }
}

/// Query parameters for a hardcoded text scan
#[derive(Debug, Clone)]
pub struct ScanQuery {
    pub root: PathBuf,
    pub config: AuditConfig,
    /// Framework id forced by the caller instead of detection
    pub framework: Option<String>,
}

impl ScanQuery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: AuditConfig::default(),
            framework: None,
        }
    }

    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }
}

/// Query parameters for the key usage cross-check
#[derive(Debug, Clone)]
pub struct UsageQuery {
    pub check: CheckQuery,
    pub framework: Option<String>,
}

impl UsageQuery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            check: CheckQuery::new(root),
            framework: None,
        }
    }

    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.check.config = config;
        self
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }
}

/// The caller's forced framework, or the detected one
pub fn resolve_framework(root: &Path, forced: Option<&str>) -> Result<Selection> {
    match forced {
        Some(id) => descriptor_by_id(id)
            .map(Selection::forced)
            .ok_or_else(|| AuditError::UnknownFramework { id: id.to_string() }),
        None => Ok(select_framework(root, &ProjectManifest::load(root))),
    }
}

fn open_cache(query: &CheckQuery) -> Option<TreeCache> {
    if !query.config.use_cache {
        return None;
    }
    let opened = match &query.cache_dir {
        Some(dir) => TreeCache::with_cache_dir(dir.clone()),
        None => TreeCache::new(),
    };
    match opened {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!("Running without cache: {}", e);
            None
        }
    }
}

enum Loaded {
    Corpora(Vec<LanguageCorpus>),
    Aborted(Report),
}

/// Locate and load every language; failures other than configuration abort the report
fn load_project(query: &CheckQuery) -> Result<Loaded> {
    let locales_dir = match check::locate_locales_dir(&query.root, &query.config) {
        Ok(dir) => dir,
        Err(AuditError::NoTranslationFiles { searched_paths }) => {
            return Ok(Loaded::Aborted(Report::aborted(format!(
                "no translation files found (searched: {})",
                searched_paths
            ))))
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => return Ok(Loaded::Aborted(Report::aborted(e.to_string()))),
    };

    let cache = open_cache(query);
    match check::load_corpora(&locales_dir, &query.config, cache.as_ref()) {
        Ok(corpora) => Ok(Loaded::Corpora(corpora)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => Ok(Loaded::Aborted(Report::aborted(e.to_string()))),
    }
}

/// Main orchestrator for the completeness and consistency check
///
/// Only configuration errors come back as `Err`; a run that finds nothing to
/// compare returns an aborted report.
#[must_use = "this function returns a Result that should be handled"]
pub fn run_check(query: CheckQuery) -> Result<Report> {
    query.config.validate()?;

    let corpora = match load_project(&query)? {
        Loaded::Corpora(corpora) => corpora,
        Loaded::Aborted(report) => return Ok(report),
    };

    let issues = check_corpora(&corpora, &query.config);
    Ok(ReportBuilder::new().corpora(&corpora).issues(issues).build())
}

/// Glob for a directory under `root`, so scans never report translation files
fn locales_exclusion(root: &Path, locales_dir: &Path) -> Option<String> {
    let relative = locales_dir.strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(glob::Pattern::escape(&relative.to_string_lossy().replace('\\', "/")))
}

fn scanner_for(root: &Path, forced: Option<&str>, config: &AuditConfig) -> Result<Scanner> {
    let selection = resolve_framework(root, forced)?;
    let mut config = config.clone();
    if let Ok(locales_dir) = check::locate_locales_dir(root, &config) {
        if let Some(exclusion) = locales_exclusion(root, &locales_dir) {
            config.exclusions.push(exclusion);
        }
    }
    Scanner::new(root, selection.descriptor, &config)
}

/// Scan source files for hardcoded text and translation calls
#[must_use = "this function returns a Result that should be handled"]
pub fn run_scan(query: ScanQuery) -> Result<ScanResult> {
    query.config.validate()?;
    let scanner = scanner_for(&query.root, query.framework.as_deref(), &query.config)?;
    if !query.root.is_dir() {
        warn!("Project root {} is not a directory", query.root.display());
        return Ok(ScanResult::aborted(
            scanner.descriptor().id,
            format!("project root {} is not a directory", query.root.display()),
        ));
    }
    scanner.scan_parallel()
}

/// Cross-check translation calls in code against the reference language
#[must_use = "this function returns a Result that should be handled"]
pub fn run_usage(query: UsageQuery) -> Result<Report> {
    let check = &query.check;
    check.config.validate()?;

    let corpora = match load_project(check)? {
        Loaded::Corpora(corpora) => corpora,
        Loaded::Aborted(report) => return Ok(report),
    };
    let Some(reference) = corpora.first() else {
        return Ok(ReportBuilder::new().build());
    };

    let scanner = scanner_for(&check.root, query.framework.as_deref(), &check.config)?;
    let framework = scanner.descriptor().id;
    let scan = scanner.scan_parallel()?;

    let mut issues = reference.file_issues();
    issues.extend(check_key_usage(&scan.occurrences, reference));
    Ok(ReportBuilder::new()
        .corpora(std::slice::from_ref(reference))
        .issues(issues)
        .framework(framework)
        .build())
}
