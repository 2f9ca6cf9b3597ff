use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};

/// File name searched for in the project root and its ancestors
pub const CONFIG_FILE_NAME: &str = ".i18n-audit.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Options for one audit run.
///
/// Passed explicitly into every entry point; nothing reads process-wide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Shortest literal (in characters, trimmed) reported by the scanner
    pub min_length: usize,
    /// Longest literal reported by the scanner
    pub max_length: usize,
    /// Extra exclusion globs, matched against paths relative to the root
    pub exclusions: Vec<String>,
    pub include_tests: bool,
    /// Values that mean "not translated yet" when found in a resource
    pub not_translated_markers: Vec<String>,
    /// Preferred reference language; falls back to the first sorted language
    pub source_language: String,
    /// Locales directory relative to the project root
    pub locales_dir: Option<PathBuf>,
    pub max_file_size: u64,
    pub max_depth: usize,
    pub max_files: usize,
    /// Worker threads for scanning; `None` uses the rayon default
    pub concurrency: Option<usize>,
    pub use_cache: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 200,
            exclusions: Vec::new(),
            include_tests: false,
            not_translated_markers: vec![
                "NOT_TRANSLATED".to_string(),
                "TODO_TRANSLATE".to_string(),
                "[NOT TRANSLATED]".to_string(),
            ],
            source_language: "en".to_string(),
            locales_dir: None,
            max_file_size: 1024 * 1024,
            max_depth: 32,
            max_files: 20_000,
            concurrency: None,
            use_cache: false,
        }
    }
}

impl AuditConfig {
    pub fn with_length_bounds(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_include_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    pub fn with_not_translated_markers(mut self, markers: Vec<String>) -> Self {
        self.not_translated_markers = markers;
        self
    }

    pub fn with_locales_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.locales_dir = Some(dir.into());
        self
    }

    pub fn with_concurrency(mut self, jobs: usize) -> Self {
        self.concurrency = Some(jobs);
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Reject option combinations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(AuditError::configuration("max_length must be greater than 0"));
        }
        if self.min_length > self.max_length {
            return Err(AuditError::configuration(format!(
                "min_length ({}) is greater than max_length ({})",
                self.min_length, self.max_length
            )));
        }
        if self.max_files == 0 {
            return Err(AuditError::configuration("max_files must be greater than 0"));
        }
        if self.concurrency == Some(0) {
            return Err(AuditError::configuration("concurrency must be at least 1"));
        }
        if self.source_language.trim().is_empty() {
            return Err(AuditError::configuration("source_language must not be empty"));
        }
        for pattern in &self.exclusions {
            glob::Pattern::new(pattern).map_err(|e| {
                AuditError::configuration(format!("invalid exclusion glob '{}': {}", pattern, e))
            })?;
        }
        Ok(())
    }

    /// Parse a configuration file body; missing fields take their defaults
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| {
            AuditError::configuration(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AuditError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents, path)
    }
}

/// Directories from `start` upwards, at most `max_depth` of them
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Locate `.i18n-audit.toml` in `root` or one of its ancestors
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    let start = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
}

/// Load the project configuration, or defaults when no file exists.
///
/// A file that exists but does not parse is a configuration error.
pub fn load_config(root: &Path) -> Result<AuditConfig> {
    match find_config_file(root) {
        Some(path) => {
            tracing::debug!("Loaded config from {}", path.display());
            AuditConfig::from_file(&path)
        }
        None => {
            tracing::debug!(
                "No {} found after checking {} directories, using defaults",
                CONFIG_FILE_NAME,
                MAX_TRAVERSAL_DEPTH
            );
            Ok(AuditConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AuditConfig::default().validate().is_ok());
    }

    #[test]
    fn test_min_greater_than_max_is_rejected() {
        let err = AuditConfig::default()
            .with_length_bounds(10, 5)
            .validate()
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("min_length (10) is greater than max_length (5)"));
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let config = AuditConfig {
            max_files: 0,
            ..AuditConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AuditConfig::default().with_concurrency(0);
        assert!(config.validate().is_err());

        let config = AuditConfig::default().with_length_bounds(0, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_exclusion_glob() {
        let err = AuditConfig::default()
            .with_exclusions(vec!["src/[".to_string()])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("invalid exclusion glob"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AuditConfig::from_toml_str(
            "min_length = 5\nsource_language = \"de\"\nexclusions = [\"legacy/**\"]\n",
            Path::new(CONFIG_FILE_NAME),
        )
        .unwrap();
        assert_eq!(config.min_length, 5);
        assert_eq!(config.max_length, 200);
        assert_eq!(config.source_language, "de");
        assert_eq!(config.exclusions, vec!["legacy/**"]);
    }

    #[test]
    fn test_unknown_field_is_configuration_error() {
        let err = AuditConfig::from_toml_str("min_lenght = 5\n", Path::new(CONFIG_FILE_NAME))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_config_searches_ancestors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "max_length = 42\n").unwrap();
        let nested = dir.path().join("apps").join("web");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested).unwrap();
        assert_eq!(config.max_length, 42);
    }

    #[test]
    fn test_directory_ancestors_respects_max_depth() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }
}
