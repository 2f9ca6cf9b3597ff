pub mod occurrence;
pub mod scanner;

pub use occurrence::{LengthBucket, Occurrence, PatternKind};
pub use scanner::{is_test_path, looks_like_text, OccurrenceIter, ScanResult, Scanner, SkippedFile};
