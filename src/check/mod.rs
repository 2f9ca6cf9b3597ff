pub mod corpus;
pub mod diff;
pub mod placeholders;
pub mod usage;

pub use corpus::{
    discover_languages, load_corpora, locate_locales_dir, order_languages, LanguageCorpus,
    ParseOutcome, ResourceFile,
};
pub use diff::{corpus_leaf_issues, diff_corpora, key_differences, leaf_issues};
pub use placeholders::{compare_placeholders, extract_placeholders, validate_placeholders};
pub use usage::check_key_usage;

use crate::config::AuditConfig;
use crate::report::Issue;

/// Every consistency issue across corpora; the first corpus is the reference
pub fn check_corpora(corpora: &[LanguageCorpus], config: &AuditConfig) -> Vec<Issue> {
    let Some((reference, targets)) = corpora.split_first() else {
        return Vec::new();
    };

    let mut issues = Vec::new();
    for corpus in corpora {
        issues.extend(corpus.file_issues());
        issues.extend(corpus_leaf_issues(corpus, config));
    }
    for target in targets {
        issues.extend(diff_corpora(reference, target));
    }
    issues
}
