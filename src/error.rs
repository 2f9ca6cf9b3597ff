use std::path::PathBuf;
use thiserror::Error;

/// Error type for translation audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    /// Invalid option values; raised before any file is touched
    #[error("Invalid configuration: {reason}\n\nTip: Check your .i18n-audit.toml and command line flags")]
    Configuration { reason: String },

    /// Resource file content is not a valid translation tree
    #[error("Failed to parse {file}:\n{reason}\n\nTip: Verify the file syntax is correct")]
    Parse { file: PathBuf, reason: String },

    /// Resource or source file could not be read
    #[error("Cannot read {file}: {reason}")]
    Access { file: PathBuf, reason: String },

    /// No locales directory with translation files was found
    #[error("No translation files found.\n\nSearched in: {searched_paths}\n\nTip: Pass --locales <DIR> or set locales_dir in .i18n-audit.toml")]
    NoTranslationFiles { searched_paths: String },

    /// Unknown framework id requested by the caller
    #[error("Unknown framework '{id}'.\n\nTip: Run `i18n-audit frameworks` to list the available ids")]
    UnknownFramework { id: String },

    /// Parsed tree cache failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Generic(String),
}

impl AuditError {
    /// Create a Configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a Parse error from a file path and reason
    pub fn parse_error(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create an Access error from a file path and reason
    pub fn access_error(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Access {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a NoTranslationFiles error listing the searched directories
    pub fn no_translation_files(paths: &[&str]) -> Self {
        Self::NoTranslationFiles {
            searched_paths: paths.join(", "),
        }
    }

    /// Whether this error must abort the run instead of becoming an issue
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Result type alias for AuditError
pub type Result<T> = std::result::Result<T, AuditError>;
