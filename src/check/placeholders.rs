use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::parse::FlattenedKeySet;
use crate::report::Issue;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Placeholder tokens of a string in order of appearance, normalized to `{{name}}`.
///
/// Repeated tokens are kept.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .map(|caps| format!("{{{{{}}}}}", &caps[1]))
        .collect()
}

/// Distinct tokens in first-occurrence order
fn distinct(tokens: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

/// Compare the placeholders of one reference string with its translation
pub fn compare_placeholders(
    language: &str,
    file: &str,
    key: &str,
    reference: &str,
    target: &str,
) -> Vec<Issue> {
    let expected = distinct(&extract_placeholders(reference));
    let found = distinct(&extract_placeholders(target));
    if expected.is_empty() && found.is_empty() {
        return Vec::new();
    }

    let expected_set: HashSet<&String> = expected.iter().collect();
    let found_set: HashSet<&String> = found.iter().collect();
    let mut issues = Vec::new();

    if expected_set.difference(&found_set).next().is_some() {
        issues.push(Issue::PlaceholderMissing {
            language: language.to_string(),
            file: file.to_string(),
            key: key.to_string(),
            expected: expected.clone(),
            found: found.clone(),
        });
    }
    if found_set.difference(&expected_set).next().is_some() {
        issues.push(Issue::PlaceholderExtra {
            language: language.to_string(),
            file: file.to_string(),
            key: key.to_string(),
            expected: expected.clone(),
            found: found.clone(),
        });
    }
    if issues.is_empty() && expected != found {
        issues.push(Issue::PlaceholderOrderWarning {
            language: language.to_string(),
            file: file.to_string(),
            key: key.to_string(),
            expected,
            found,
        });
    }

    issues
}

/// Check every string key present in both sets, in reference order
pub fn validate_placeholders(
    language: &str,
    file: &str,
    reference: &FlattenedKeySet,
    target: &FlattenedKeySet,
) -> Vec<Issue> {
    reference
        .string_values()
        .filter_map(|(key, ref_text)| {
            let target_text = target.get(key)?.as_str()?;
            Some(compare_placeholders(language, file, key, ref_text, target_text))
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::flatten_expanded;
    use crate::parse::TranslationTree;
    use serde_json::{json, Value};

    fn set(value: Value) -> FlattenedKeySet {
        match value {
            Value::Object(map) => flatten_expanded(&TranslationTree::new(map)),
            _ => panic!("object expected"),
        }
    }

    #[test]
    fn test_extract_keeps_order_and_duplicates() {
        assert_eq!(
            extract_placeholders("{{ count }} of {{total}}, {{count}} left {user.name}"),
            vec!["{{count}}", "{{total}}", "{{count}}"]
        );
        assert_eq!(extract_placeholders("Hi {{user.name}}"), vec!["{{user.name}}"]);
        assert!(extract_placeholders("{{}} {{ {x} }}").is_empty());
    }

    #[test]
    fn test_missing_placeholder() {
        let issues = validate_placeholders(
            "es",
            "common.json",
            &set(json!({"greeting": "Hello {{name}}!"})),
            &set(json!({"greeting": "Hola!"})),
        );
        assert_eq!(
            issues,
            vec![Issue::PlaceholderMissing {
                language: "es".into(),
                file: "common.json".into(),
                key: "greeting".into(),
                expected: vec!["{{name}}".into()],
                found: vec![],
            }]
        );
    }

    #[test]
    fn test_reordered_placeholders_warn_only() {
        let issues = validate_placeholders(
            "es",
            "common.json",
            &set(json!({"order": "{{first}} {{second}}"})),
            &set(json!({"order": "{{second}} {{first}}"})),
        );
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], Issue::PlaceholderOrderWarning { .. }));
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_extra_placeholder_without_reference_tokens() {
        let issues = compare_placeholders("de", "a.json", "k", "Plain", "Mit {{x}}");
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], Issue::PlaceholderExtra { .. }));
    }

    #[test]
    fn test_missing_and_extra_together() {
        let issues = compare_placeholders("de", "a.json", "k", "{{a}} {{b}}", "{{a}} {{c}}");
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], Issue::PlaceholderMissing { .. }));
        assert!(matches!(issues[1], Issue::PlaceholderExtra { .. }));
    }

    #[test]
    fn test_repeated_tokens_compare_as_sets() {
        assert!(compare_placeholders("de", "a.json", "k", "{{n}} {{n}}", "{{n}}").is_empty());
    }

    #[test]
    fn test_arrays_are_checked_per_element() {
        let issues = validate_placeholders(
            "fr",
            "common.json",
            &set(json!({"steps": ["Step {{n}}", "Done"]})),
            &set(json!({"steps": ["Etape", "Fini"]})),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key(), Some("steps.0"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let reference = set(json!({"a": "{{x}} and {{y}}", "b": "{{z}}"}));
        let target = set(json!({"a": "{{y}} und {{x}}", "b": "none"}));
        let first = validate_placeholders("de", "f.json", &reference, &target);
        let second = validate_placeholders("de", "f.json", &reference, &target);
        assert_eq!(first, second);
        assert!(validate_placeholders("de", "f.json", &reference, &reference).is_empty());
    }
}
