use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Declared dependency names of a project, gathered from whichever manifests exist.
///
/// Absence of every manifest is not an error; the set is simply empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    dependencies: BTreeSet<String>,
    sources: Vec<String>,
}

impl ProjectManifest {
    pub fn load(root: &Path) -> Self {
        let mut manifest = Self::default();

        if let Some(content) = read_manifest(root, "package.json") {
            manifest.merge("package.json", parse_package_json(&content));
        }
        if let Some(content) = read_manifest(root, "requirements.txt") {
            manifest.merge("requirements.txt", Some(parse_requirements(&content)));
        }
        if let Some(content) = read_manifest(root, "pyproject.toml") {
            manifest.merge("pyproject.toml", parse_pyproject(&content));
        }
        if let Some(content) = read_manifest(root, "composer.json") {
            manifest.merge("composer.json", parse_composer_json(&content));
        }

        manifest
    }

    pub fn from_dependencies<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            dependencies: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
            sources: Vec::new(),
        }
    }

    fn merge(&mut self, source: &str, names: Option<Vec<String>>) {
        match names {
            Some(names) => {
                self.dependencies
                    .extend(names.into_iter().map(|n| n.to_lowercase()));
                self.sources.push(source.to_string());
            }
            None => warn!("Ignoring unparseable manifest {}", source),
        }
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains(&name.to_lowercase())
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(String::as_str)
    }

    /// Manifest files that were read successfully
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

fn read_manifest(root: &Path, name: &str) -> Option<String> {
    let path = root.join(name);
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}

fn object_keys(value: &Value, sections: &[&str]) -> Vec<String> {
    sections
        .iter()
        .filter_map(|section| value.get(section).and_then(Value::as_object))
        .flat_map(|deps| deps.keys().cloned())
        .collect()
}

fn parse_package_json(content: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(content).ok()?;
    Some(object_keys(
        &value,
        &["dependencies", "devDependencies", "peerDependencies"],
    ))
}

fn parse_composer_json(content: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(content).ok()?;
    Some(object_keys(&value, &["require", "require-dev"]))
}

/// Requirement name before any version specifier, extra or marker
fn requirement_name(spec: &str) -> Option<String> {
    let name: String = spec
        .trim()
        .chars()
        .take_while(|c| {
            !matches!(c, '=' | '<' | '>' | '!' | '~' | '[' | ';' | '@') && !c.is_whitespace()
        })
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(requirement_name)
        .collect()
}

fn parse_pyproject(content: &str) -> Option<Vec<String>> {
    let value: toml::Value = toml::from_str(content).ok()?;
    let mut names = Vec::new();

    if let Some(deps) = value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(toml::Value::as_array)
    {
        names.extend(
            deps.iter()
                .filter_map(toml::Value::as_str)
                .filter_map(requirement_name),
        );
    }

    if let Some(deps) = value
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(toml::Value::as_table)
    {
        names.extend(deps.keys().filter(|k| k.as_str() != "python").cloned());
    }

    Some(names)
}
