use std::collections::BTreeSet;

use crate::parse::FlattenedKeySet;
use crate::report::Issue;
use crate::scan::Occurrence;

use super::corpus::LanguageCorpus;

/// Keys built at runtime cannot be checked statically
pub fn is_dynamic_key(key: &str) -> bool {
    key.contains("${") || key.contains('{') || key.contains('+') || key.ends_with('.')
}

fn file_stem(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.split('.').next().unwrap_or(base)
}

fn defined_in(key: &str, keys: &FlattenedKeySet) -> bool {
    if keys.contains_key(key) {
        return true;
    }
    // Index into an array leaf: `days.0` under `days`
    keys.iter().any(|(leaf, value)| {
        value.is_array()
            && key
                .strip_prefix(leaf.as_str())
                .map(|rest| rest.starts_with('.'))
                .unwrap_or(false)
    })
}

fn is_defined(key: &str, reference: &LanguageCorpus) -> bool {
    if reference
        .files
        .values()
        .filter_map(|f| f.keys())
        .any(|keys| defined_in(key, keys))
    {
        return true;
    }
    // i18next namespaces: `common:nav.home` lives in common.json
    match key.split_once(':') {
        Some((namespace, inner)) => reference
            .files
            .iter()
            .filter(|(name, _)| file_stem(name) == namespace)
            .filter_map(|(_, f)| f.keys())
            .any(|keys| defined_in(inner, keys)),
        None => false,
    }
}

fn is_referenced(key: &str, used: &BTreeSet<String>) -> bool {
    used.iter().any(|u| {
        u == key
            || u.strip_prefix(key).map(|r| r.starts_with('.')).unwrap_or(false)
            || key.strip_prefix(u.as_str()).map(|r| r.starts_with('.')).unwrap_or(false)
    })
}

/// Cross-check translation-call keys against the reference language.
///
/// Keys used in code but absent from the reference are errors; reference
/// keys no call site reaches are warnings.
pub fn check_key_usage(occurrences: &[Occurrence], reference: &LanguageCorpus) -> Vec<Issue> {
    let calls: Vec<&Occurrence> = occurrences
        .iter()
        .filter(|o| o.is_key_call() && !is_dynamic_key(&o.text))
        .collect();

    let mut issues: Vec<Issue> = calls
        .iter()
        .filter(|o| !is_defined(&o.text, reference))
        .map(|o| Issue::UndefinedKey {
            file: o.file.to_string_lossy().replace('\\', "/"),
            key: o.text.clone(),
            line: o.line,
        })
        .collect();

    let used: BTreeSet<String> = calls
        .iter()
        .map(|o| match o.text.split_once(':') {
            Some((_, inner)) => inner.to_string(),
            None => o.text.clone(),
        })
        .collect();

    for file in reference.files.values() {
        let Some(keys) = file.keys() else {
            continue;
        };
        issues.extend(
            keys.keys()
                .filter(|key| !is_referenced(key, &used))
                .map(|key| Issue::UnusedKey {
                    file: file.display_path.clone(),
                    key: key.clone(),
                }),
        );
    }

    issues
}
