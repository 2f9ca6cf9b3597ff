use crate::error::{AuditError, Result};
use serde_json::Value;
use std::path::Path;

use super::translation::TranslationTree;

/// Parser for JSON (and JSONC) translation files
pub struct JsonParser;

impl JsonParser {
    /// Parse JSON resource text into a translation tree.
    ///
    /// Comments are stripped first so JSONC resources are accepted.
    pub fn parse_str(content: &str, path: &Path) -> Result<TranslationTree> {
        let cleaned = Self::strip_json_comments(content);
        let root: Value = serde_json::from_str(&cleaned)
            .map_err(|e| AuditError::parse_error(path, format!("Invalid JSON syntax: {}", e)))?;
        TranslationTree::from_value(root, path)
    }

    /// Strip single-line (//) and multi-line (/* */) comments outside strings.
    /// Newlines are preserved so parser line numbers stay correct.
    pub fn strip_json_comments(content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();
        let mut in_string = false;
        let mut escape_next = false;

        while let Some(ch) = chars.next() {
            if escape_next {
                result.push(ch);
                escape_next = false;
                continue;
            }

            if in_string {
                match ch {
                    '\\' => escape_next = true,
                    '"' => in_string = false,
                    _ => {}
                }
                result.push(ch);
                continue;
            }

            match (ch, chars.peek().copied()) {
                ('"', _) => {
                    in_string = true;
                    result.push(ch);
                }
                ('/', Some('/')) => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                }
                ('/', Some('*')) => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                }
                _ => result.push(ch),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_json() {
        let tree = JsonParser::parse_str(r#"{"key": "value"}"#, Path::new("en.json")).unwrap();
        assert_eq!(tree.root().get("key"), Some(&json!("value")));
    }

    #[test]
    fn test_parse_keeps_insertion_order() {
        let tree =
            JsonParser::parse_str(r#"{"z": "1", "a": "2", "m": "3"}"#, Path::new("en.json"))
                .unwrap();
        let keys: Vec<_> = tree.root().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_jsonc() {
        let content = r#"{
  // heading
  "title": "Home", /* inline */
  "url": "http://example.com"
}"#;
        let tree = JsonParser::parse_str(content, Path::new("en.json")).unwrap();
        assert_eq!(tree.root().get("url"), Some(&json!("http://example.com")));
        assert_eq!(tree.root().len(), 2);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = JsonParser::parse_str("{ key: 'x' }", Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, AuditError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_strip_comments_respects_escaped_quotes() {
        let content = r#"{"a": "quote \" // not a comment"}"#;
        assert_eq!(JsonParser::strip_json_comments(content), content);
    }
}
