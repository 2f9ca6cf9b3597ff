//! Reference-relative comparison of two language corpora.

use crate::config::AuditConfig;
use crate::parse::FlattenedKeySet;
use crate::report::Issue;

use super::corpus::LanguageCorpus;
use super::placeholders::validate_placeholders;

/// Keys of `reference` absent from `target`, and keys of `target` absent from `reference`
pub fn key_differences(
    reference: &FlattenedKeySet,
    target: &FlattenedKeySet,
) -> (Vec<String>, Vec<String>) {
    (
        reference.keys_missing_from(target),
        target.keys_missing_from(reference),
    )
}

/// Empty values and not-translated markers in one file
pub fn leaf_issues(
    language: &str,
    file: &str,
    keys: &FlattenedKeySet,
    markers: &[String],
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (key, value) in keys.string_values() {
        if value.is_empty() {
            issues.push(Issue::EmptyValue {
                language: language.to_string(),
                file: file.to_string(),
                key: key.to_string(),
            });
        } else if let Some(marker) = markers.iter().find(|m| value.trim() == m.as_str()) {
            issues.push(Issue::NotTranslated {
                language: language.to_string(),
                file: file.to_string(),
                key: key.to_string(),
                marker: marker.clone(),
            });
        }
    }
    issues
}

/// Structural and placeholder issues of `target` relative to `reference`.
///
/// Files are paired by logical name. A reference file the target lacks is a
/// single file-level issue; its keys are not enumerated. Malformed files on
/// either side are skipped here (the corpus reports them).
pub fn diff_corpora(reference: &LanguageCorpus, target: &LanguageCorpus) -> Vec<Issue> {
    let language = target.language.as_str();
    let mut issues = Vec::new();

    for (name, ref_file) in &reference.files {
        let Some(target_file) = target.get(name) else {
            issues.push(Issue::MissingFile {
                language: language.to_string(),
                file: name.clone(),
                reference_keys: ref_file.key_count(),
            });
            continue;
        };

        let (Some(ref_keys), Some(target_keys)) = (ref_file.keys(), target_file.keys()) else {
            continue;
        };

        let (missing, extra) = key_differences(ref_keys, target_keys);
        if !missing.is_empty() {
            issues.push(Issue::MissingKey {
                language: language.to_string(),
                file: name.clone(),
                keys: missing,
            });
        }
        if !extra.is_empty() {
            issues.push(Issue::ExtraKey {
                language: language.to_string(),
                file: name.clone(),
                keys: extra,
            });
        }

        if let (Some(ref_expanded), Some(target_expanded)) =
            (ref_file.expanded(), target_file.expanded())
        {
            issues.extend(validate_placeholders(
                language,
                name,
                ref_expanded,
                target_expanded,
            ));
        }
    }

    // Files only the target has: every key is extra
    for (name, target_file) in &target.files {
        if reference.get(name).is_some() {
            continue;
        }
        if let Some(keys) = target_file.keys() {
            if !keys.is_empty() {
                issues.push(Issue::ExtraKey {
                    language: language.to_string(),
                    file: name.clone(),
                    keys: keys.keys().cloned().collect(),
                });
            }
        }
    }

    issues
}

/// Leaf-value issues of every parsed file in a corpus
pub fn corpus_leaf_issues(corpus: &LanguageCorpus, config: &AuditConfig) -> Vec<Issue> {
    corpus
        .files
        .iter()
        .filter_map(|(name, file)| Some((name, file.keys()?)))
        .flat_map(|(name, keys)| {
            leaf_issues(&corpus.language, name, keys, &config.not_translated_markers)
        })
        .collect()
}
