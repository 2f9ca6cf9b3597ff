use serde_json::{Map, Number, Value};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use yaml_rust::parser::{Event, EventReceiver, Parser};
use yaml_rust::{Yaml, YamlLoader};

use super::translation::TranslationTree;
use crate::error::{AuditError, Result};

/// Parser for YAML translation files (Rails, Symfony, Hugo style)
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML resource text into a translation tree.
    ///
    /// Only the first document is used. An empty document is an empty tree.
    pub fn parse_str(content: &str, path: &Path) -> Result<TranslationTree> {
        let docs = YamlLoader::load_from_str(content)
            .map_err(|e| AuditError::parse_error(path, format!("Invalid YAML syntax: {}", e)))?;

        let Some(doc) = docs.into_iter().next() else {
            return Ok(TranslationTree::default());
        };

        match doc {
            Yaml::Null => Ok(TranslationTree::default()),
            other => TranslationTree::from_value(Self::to_value(other), path),
        }
    }

    /// Key names repeated within one mapping of the first document.
    ///
    /// The loader keeps the last value of a repeated key, so this walks the
    /// event stream instead. Invalid YAML yields an empty set.
    pub fn duplicate_keys(content: &str) -> BTreeSet<String> {
        let mut collector = DuplicateCollector::default();
        let mut parser = Parser::new(content.chars());
        match parser.load(&mut collector, false) {
            Ok(()) => collector.duplicates,
            Err(_) => BTreeSet::new(),
        }
    }

    fn to_value(yaml: Yaml) -> Value {
        match yaml {
            Yaml::String(s) => Value::String(s),
            Yaml::Integer(i) => Value::Number(i.into()),
            Yaml::Real(raw) => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::String(raw)),
            Yaml::Boolean(b) => Value::Bool(b),
            Yaml::Array(items) => Value::Array(items.into_iter().map(Self::to_value).collect()),
            Yaml::Hash(hash) => {
                let mut map = Map::new();
                for (key, value) in hash {
                    if let Some(key) = Self::key_to_string(key) {
                        map.insert(key, Self::to_value(value));
                    }
                }
                Value::Object(map)
            }
            Yaml::Null | Yaml::Alias(_) | Yaml::BadValue => Value::Null,
        }
    }

    fn key_to_string(key: Yaml) -> Option<String> {
        match key {
            Yaml::String(s) => Some(s),
            Yaml::Integer(i) => Some(i.to_string()),
            Yaml::Boolean(b) => Some(b.to_string()),
            Yaml::Real(raw) => Some(raw),
            _ => None,
        }
    }
}

enum Frame {
    Mapping { keys: HashSet<String>, expect_key: bool },
    Sequence,
}

#[derive(Default)]
struct DuplicateCollector {
    frames: Vec<Frame>,
    duplicates: BTreeSet<String>,
}

impl DuplicateCollector {
    /// Account for a node in the enclosing mapping: keys and values alternate
    fn on_node(&mut self, scalar: Option<&str>) {
        if let Some(Frame::Mapping { keys, expect_key }) = self.frames.last_mut() {
            if *expect_key {
                if let Some(key) = scalar {
                    if !keys.insert(key.to_string()) {
                        self.duplicates.insert(key.to_string());
                    }
                }
            }
            *expect_key = !*expect_key;
        }
    }
}

impl EventReceiver for DuplicateCollector {
    fn on_event(&mut self, ev: Event) {
        match ev {
            Event::Scalar(value, ..) => self.on_node(Some(&value)),
            Event::Alias(_) => self.on_node(None),
            Event::MappingStart(_) => {
                self.on_node(None);
                self.frames.push(Frame::Mapping {
                    keys: HashSet::new(),
                    expect_key: true,
                });
            }
            Event::SequenceStart(_) => {
                self.on_node(None);
                self.frames.push(Frame::Sequence);
            }
            Event::MappingEnd | Event::SequenceEnd => {
                self.frames.pop();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_yaml() {
        let tree = YamlParser::parse_str("key: value", Path::new("en.yml")).unwrap();
        assert_eq!(tree.root().get("key"), Some(&json!("value")));
    }

    #[test]
    fn test_parse_nested_yaml_with_scalars() {
        let content = "
parent:
  child: value
  count: 3
  ratio: 1.5
  enabled: true
  days:
    - Mon
    - Tue
";
        let tree = YamlParser::parse_str(content, Path::new("en.yml")).unwrap();
        let parent = tree.root().get("parent").unwrap();
        assert_eq!(parent["child"], json!("value"));
        assert_eq!(parent["count"], json!(3));
        assert_eq!(parent["ratio"], json!(1.5));
        assert_eq!(parent["enabled"], json!(true));
        assert_eq!(parent["days"], json!(["Mon", "Tue"]));
    }

    #[test]
    fn test_numeric_keys_are_stringified() {
        let tree = YamlParser::parse_str("404: Not found", Path::new("en.yml")).unwrap();
        assert_eq!(tree.root().get("404"), Some(&json!("Not found")));
    }

    #[test]
    fn test_empty_yaml_is_empty_tree() {
        let tree = YamlParser::parse_str("", Path::new("en.yml")).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let err = YamlParser::parse_str("key: [unclosed", Path::new("bad.yml")).unwrap_err();
        assert!(matches!(err, AuditError::Parse { .. }));
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        let err = YamlParser::parse_str("just text", Path::new("bad.yml")).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_duplicate_keys_per_mapping() {
        let content = "\
title: x
nav:
  home: Home
  home: Start
  items:
    - home: a
    - home: b
title: y
";
        let duplicates: Vec<String> = YamlParser::duplicate_keys(content).into_iter().collect();
        assert_eq!(duplicates, vec!["home".to_string(), "title".to_string()]);

        let tree = YamlParser::parse_str(content, Path::new("en.yml")).unwrap();
        assert_eq!(tree.root().get("title"), Some(&json!("y")));
    }

    #[test]
    fn test_values_are_not_keys() {
        let content = "a: b\nb: a\nlist:\n  - a\n  - a\n";
        assert!(YamlParser::duplicate_keys(content).is_empty());
        assert!(YamlParser::duplicate_keys("key: [unclosed").is_empty());
    }
}
