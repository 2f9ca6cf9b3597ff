use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Issue categories in reporting priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Malformed,
    Access,
    Duplicate,
    Missing,
    Extra,
    Placeholder,
    Empty,
    NotTranslated,
    Usage,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 9] = [
        Self::Malformed,
        Self::Access,
        Self::Duplicate,
        Self::Missing,
        Self::Extra,
        Self::Placeholder,
        Self::Empty,
        Self::NotTranslated,
        Self::Usage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Malformed => "Malformed files",
            Self::Access => "Unreadable files",
            Self::Duplicate => "Duplicate keys",
            Self::Missing => "Missing translations",
            Self::Extra => "Extra keys",
            Self::Placeholder => "Placeholder mismatches",
            Self::Empty => "Empty values",
            Self::NotTranslated => "Not translated",
            Self::Usage => "Key usage",
        }
    }
}

/// One detected inconsistency.
///
/// `file` is the logical resource name for language-scoped issues and the
/// path relative to the project root otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// A reference file with no counterpart in the target language
    MissingFile {
        language: String,
        file: String,
        reference_keys: usize,
    },
    MissingKey {
        language: String,
        file: String,
        keys: Vec<String>,
    },
    ExtraKey {
        language: String,
        file: String,
        keys: Vec<String>,
    },
    EmptyValue {
        language: String,
        file: String,
        key: String,
    },
    NotTranslated {
        language: String,
        file: String,
        key: String,
        marker: String,
    },
    DuplicateKeyInSource {
        file: String,
        key: String,
    },
    MalformedFile {
        file: String,
        reason: String,
    },
    UnreadableFile {
        file: String,
        reason: String,
    },
    PlaceholderMissing {
        language: String,
        file: String,
        key: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    PlaceholderExtra {
        language: String,
        file: String,
        key: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    PlaceholderOrderWarning {
        language: String,
        file: String,
        key: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A key used in source code that the reference language does not define
    UndefinedKey {
        file: String,
        key: String,
        line: usize,
    },
    /// A reference key no call site refers to
    UnusedKey {
        file: String,
        key: String,
    },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::NotTranslated { .. }
            | Self::PlaceholderOrderWarning { .. }
            | Self::UnusedKey { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn category(&self) -> IssueCategory {
        match self {
            Self::MissingFile { .. } | Self::MissingKey { .. } => IssueCategory::Missing,
            Self::ExtraKey { .. } => IssueCategory::Extra,
            Self::EmptyValue { .. } => IssueCategory::Empty,
            Self::NotTranslated { .. } => IssueCategory::NotTranslated,
            Self::DuplicateKeyInSource { .. } => IssueCategory::Duplicate,
            Self::MalformedFile { .. } => IssueCategory::Malformed,
            Self::UnreadableFile { .. } => IssueCategory::Access,
            Self::PlaceholderMissing { .. }
            | Self::PlaceholderExtra { .. }
            | Self::PlaceholderOrderWarning { .. } => IssueCategory::Placeholder,
            Self::UndefinedKey { .. } | Self::UnusedKey { .. } => IssueCategory::Usage,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Self::MissingFile { language, .. }
            | Self::MissingKey { language, .. }
            | Self::ExtraKey { language, .. }
            | Self::EmptyValue { language, .. }
            | Self::NotTranslated { language, .. }
            | Self::PlaceholderMissing { language, .. }
            | Self::PlaceholderExtra { language, .. }
            | Self::PlaceholderOrderWarning { language, .. } => Some(language),
            _ => None,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            Self::MissingFile { file, .. }
            | Self::MissingKey { file, .. }
            | Self::ExtraKey { file, .. }
            | Self::EmptyValue { file, .. }
            | Self::NotTranslated { file, .. }
            | Self::DuplicateKeyInSource { file, .. }
            | Self::MalformedFile { file, .. }
            | Self::UnreadableFile { file, .. }
            | Self::PlaceholderMissing { file, .. }
            | Self::PlaceholderExtra { file, .. }
            | Self::PlaceholderOrderWarning { file, .. }
            | Self::UndefinedKey { file, .. }
            | Self::UnusedKey { file, .. } => file,
        }
    }

    /// The single key an issue is about, if it is about exactly one
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::EmptyValue { key, .. }
            | Self::NotTranslated { key, .. }
            | Self::DuplicateKeyInSource { key, .. }
            | Self::PlaceholderMissing { key, .. }
            | Self::PlaceholderExtra { key, .. }
            | Self::PlaceholderOrderWarning { key, .. }
            | Self::UndefinedKey { key, .. }
            | Self::UnusedKey { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Number of entries this issue stands for; a missing file counts once
    pub fn count(&self) -> usize {
        match self {
            Self::MissingKey { keys, .. } | Self::ExtraKey { keys, .. } => keys.len(),
            _ => 1,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// One-line description without the language and file prefix
    pub fn message(&self) -> String {
        match self {
            Self::MissingFile { reference_keys, .. } => format!(
                "file missing ({} keys in reference)",
                reference_keys
            ),
            Self::MissingKey { keys, .. } => format!("{} missing keys", keys.len()),
            Self::ExtraKey { keys, .. } => format!("{} extra keys", keys.len()),
            Self::EmptyValue { key, .. } => format!("empty value for '{}'", key),
            Self::NotTranslated { key, marker, .. } => {
                format!("'{}' is not translated (marker '{}')", key, marker)
            }
            Self::DuplicateKeyInSource { key, .. } => format!("duplicate key '{}'", key),
            Self::MalformedFile { reason, .. } => format!("malformed: {}", reason),
            Self::UnreadableFile { reason, .. } => format!("unreadable: {}", reason),
            Self::PlaceholderMissing {
                key,
                expected,
                found,
                ..
            } => format!(
                "'{}' is missing placeholders: expected [{}], found [{}]",
                key,
                expected.join(", "),
                found.join(", ")
            ),
            Self::PlaceholderExtra {
                key,
                expected,
                found,
                ..
            } => format!(
                "'{}' has unknown placeholders: expected [{}], found [{}]",
                key,
                expected.join(", "),
                found.join(", ")
            ),
            Self::PlaceholderOrderWarning {
                key,
                expected,
                found,
                ..
            } => format!(
                "'{}' reorders placeholders: [{}] vs [{}]",
                key,
                expected.join(", "),
                found.join(", ")
            ),
            Self::UndefinedKey { key, line, .. } => {
                format!("line {}: key '{}' is not defined", line, key)
            }
            Self::UnusedKey { key, .. } => format!("key '{}' is never used", key),
        }
    }

    /// Key list carried by missing/extra issues
    pub fn keys(&self) -> &[String] {
        match self {
            Self::MissingKey { keys, .. } | Self::ExtraKey { keys, .. } => keys,
            _ => &[],
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.language() {
            Some(language) => write!(f, "[{}] {}: {}", language, self.file(), self.message()),
            None => write!(f, "{}: {}", self.file(), self.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_and_category() {
        let issue = Issue::PlaceholderOrderWarning {
            language: "es".into(),
            file: "common.json".into(),
            key: "order".into(),
            expected: vec![],
            found: vec![],
        };
        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(issue.category(), IssueCategory::Placeholder);

        let issue = Issue::ExtraKey {
            language: "es".into(),
            file: "common.json".into(),
            keys: vec!["a".into(), "b".into()],
        };
        assert_eq!(issue.severity(), Severity::Error);
        assert_eq!(issue.count(), 2);
    }

    #[test]
    fn test_missing_file_counts_once() {
        let issue = Issue::MissingFile {
            language: "es".into(),
            file: "errors.json".into(),
            reference_keys: 40,
        };
        assert_eq!(issue.count(), 1);
        assert_eq!(issue.category(), IssueCategory::Missing);
        assert_eq!(
            issue.to_string(),
            "[es] errors.json: file missing (40 keys in reference)"
        );
    }

    #[test]
    fn test_category_order() {
        assert!(IssueCategory::Malformed < IssueCategory::Missing);
        assert!(IssueCategory::Placeholder < IssueCategory::NotTranslated);
        assert!(Severity::Error < Severity::Warning);
    }

    #[test]
    fn test_serialized_tag() {
        let issue = Issue::DuplicateKeyInSource {
            file: "locales/en/common.json".into(),
            key: "a".into(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "duplicate_key_in_source");
        assert_eq!(json["key"], "a");
    }
}
