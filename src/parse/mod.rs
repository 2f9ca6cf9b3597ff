pub mod duplicates;
pub mod flatten;
pub mod js_parser;
pub mod json_parser;
pub mod translation;
pub mod yaml_parser;

pub use duplicates::find_duplicate_keys;
pub use flatten::{flatten, flatten_expanded, unflatten, FlattenedKeySet};
pub use js_parser::JsParser;
pub use json_parser::JsonParser;
pub use translation::{LoadedResource, ResourceFormat, TranslationTree};
pub use yaml_parser::YamlParser;

use crate::error::{AuditError, Result};
use std::fs;
use std::path::Path;

/// Parse resource text in the given format.
///
/// Returns the tree and the key names repeated within one object, which the
/// tree itself no longer shows.
pub fn parse_resource(
    content: &str,
    path: &Path,
    format: ResourceFormat,
    language: &str,
) -> Result<(TranslationTree, Vec<String>)> {
    let (tree, duplicate_keys) = match format {
        ResourceFormat::Json => {
            let tree = JsonParser::parse_str(content, path)?;
            let dups = find_duplicate_keys(content).into_iter().collect();
            (tree, dups)
        }
        ResourceFormat::Yaml => {
            let tree = YamlParser::parse_str(content, path)?;
            let dups = YamlParser::duplicate_keys(content).into_iter().collect();
            (tree, dups)
        }
        ResourceFormat::JsModule => JsParser::parse_with_duplicates(content, path)?,
    };
    Ok((tree.unwrap_language_root(language), duplicate_keys))
}

/// Detect the format of a resource file and read its text
pub fn read_resource(path: &Path) -> Result<(ResourceFormat, String)> {
    let format = ResourceFormat::from_path(path)
        .ok_or_else(|| AuditError::parse_error(path, "unsupported resource file extension"))?;

    let content =
        fs::read_to_string(path).map_err(|e| AuditError::access_error(path, e.to_string()))?;
    Ok((format, content))
}

/// Parse text already read from `path` into a loaded resource
pub fn build_resource(
    path: &Path,
    format: ResourceFormat,
    content: &str,
    language: &str,
) -> Result<LoadedResource> {
    let (tree, duplicate_keys) = parse_resource(content, path, format, language)?;

    Ok(LoadedResource {
        path: path.to_path_buf(),
        format,
        size: content.len() as u64,
        tree,
        duplicate_keys,
    })
}

/// Read and parse one resource file belonging to `language`
pub fn load_resource(path: &Path, language: &str) -> Result<LoadedResource> {
    let (format, content) = read_resource(path)?;
    build_resource(path, format, &content, language)
}
