use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};

/// A nested translation resource as parsed from one file.
///
/// Keys keep their insertion order. The root is always an object; leaves are
/// strings, numbers, booleans, null or arrays of those.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree {
    root: Map<String, Value>,
}

impl TranslationTree {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Build a tree from a parsed value; anything but an object at the top is rejected
    pub fn from_value(value: Value, file: &Path) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(AuditError::parse_error(
                file,
                format!(
                    "top-level value must be an object, found {}",
                    value_kind(&other)
                ),
            )),
        }
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_root(self) -> Map<String, Value> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Unwrap Rails-style resources (`en: { ... }`) whose only top-level key is the language id
    pub fn unwrap_language_root(self, language: &str) -> Self {
        if self.root.len() != 1 {
            return self;
        }
        match self.root.iter().next() {
            Some((key, Value::Object(inner))) if key == language => Self {
                root: inner.clone(),
            },
            _ => self,
        }
    }
}

/// Human readable name of a JSON value's type, used in parse errors
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Supported resource file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceFormat {
    Json,
    Yaml,
    JsModule,
}

impl ResourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" | "jsonc" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            "js" | "mjs" | "cjs" | "ts" => Some(Self::JsModule),
            _ => None,
        }
    }
}

/// One resource file after loading: parsed tree plus what the raw text told us
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedResource {
    pub path: PathBuf,
    pub format: ResourceFormat,
    pub size: u64,
    pub tree: TranslationTree,
    /// Keys repeated at the same nesting level in the raw text
    pub duplicate_keys: Vec<String>,
}
