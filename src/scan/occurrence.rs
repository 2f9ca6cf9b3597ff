use serde::Serialize;
use std::path::PathBuf;

pub use crate::config::PatternKind;

/// Length classification of matched text against the configured bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthBucket {
    TooShort,
    Usable,
    TooLong,
}

impl LengthBucket {
    /// Classify by character count of the trimmed text
    pub fn classify(text: &str, min_length: usize, max_length: usize) -> Self {
        let len = text.trim().chars().count();
        if len < min_length {
            Self::TooShort
        } else if len > max_length {
            Self::TooLong
        } else {
            Self::Usable
        }
    }
}

/// One piece of hardcoded text or one translation-call key found in source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Path relative to the scanned root
    pub file: PathBuf,
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    /// Byte offset of the captured text in the file
    pub offset: usize,
    pub text: String,
    pub pattern: &'static str,
    pub kind: PatternKind,
    pub bucket: LengthBucket,
}

impl Occurrence {
    pub fn is_key_call(&self) -> bool {
        self.kind == PatternKind::KeyCall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bounds_are_inclusive() {
        assert_eq!(LengthBucket::classify("abc", 3, 5), LengthBucket::Usable);
        assert_eq!(LengthBucket::classify("abcde", 3, 5), LengthBucket::Usable);
        assert_eq!(LengthBucket::classify("ab", 3, 5), LengthBucket::TooShort);
        assert_eq!(LengthBucket::classify("abcdef", 3, 5), LengthBucket::TooLong);
    }

    #[test]
    fn test_classify_counts_trimmed_chars() {
        assert_eq!(LengthBucket::classify("  ab  ", 3, 5), LengthBucket::TooShort);
        assert_eq!(LengthBucket::classify("ñandú", 5, 5), LengthBucket::Usable);
    }
}
