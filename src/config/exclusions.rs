use std::path::Path;

use super::frameworks::FrameworkDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Node,
    Ruby,
    Python,
    Php,
    Rust,
    Go,
    Generic,
}

pub fn detect_project_type(base_dir: &Path) -> ProjectType {
    if base_dir.join("package.json").exists() {
        ProjectType::Node
    } else if base_dir.join("composer.json").exists() {
        ProjectType::Php
    } else if base_dir.join("Gemfile").exists() {
        ProjectType::Ruby
    } else if base_dir.join("requirements.txt").exists()
        || base_dir.join("pyproject.toml").exists()
        || base_dir.join("setup.py").exists()
    {
        ProjectType::Python
    } else if base_dir.join("Cargo.toml").exists() {
        ProjectType::Rust
    } else if base_dir.join("go.mod").exists() {
        ProjectType::Go
    } else {
        ProjectType::Generic
    }
}

/// Directory and file names never worth scanning for a project type
pub fn get_default_exclusions(project_type: ProjectType) -> Vec<&'static str> {
    let mut exclusions = vec![".git", ".svn", ".hg", ".idea", ".vscode", ".DS_Store"];

    match project_type {
        ProjectType::Node => {
            exclusions.extend_from_slice(&[
                "node_modules",
                "dist",
                "build",
                "coverage",
                ".next",
                ".nuxt",
            ]);
        }
        ProjectType::Ruby => {
            exclusions.extend_from_slice(&["vendor", ".bundle", "log", "tmp", "coverage"]);
        }
        ProjectType::Python => {
            exclusions.extend_from_slice(&[
                "venv",
                ".venv",
                "env",
                "__pycache__",
                "*.egg-info",
                ".pytest_cache",
                ".mypy_cache",
                ".tox",
            ]);
        }
        ProjectType::Php => {
            exclusions.extend_from_slice(&["vendor", "storage", "node_modules"]);
        }
        ProjectType::Rust => {
            exclusions.push("target");
        }
        ProjectType::Go => {
            exclusions.push("vendor");
        }
        ProjectType::Generic => {
            exclusions.extend_from_slice(&["node_modules", "vendor", "dist", "build", "target"]);
        }
    }

    exclusions
}

/// Exclusion globs for a scan: project defaults, the descriptor's own, then the caller's
pub fn scan_exclusions(
    root: &Path,
    descriptor: &FrameworkDescriptor,
    extra: &[String],
) -> Vec<String> {
    let mut globs: Vec<String> = Vec::new();
    let candidates = get_default_exclusions(detect_project_type(root))
        .into_iter()
        .chain(descriptor.exclude_globs.iter().copied())
        .chain(extra.iter().map(String::as_str));

    for pattern in candidates {
        if !globs.iter().any(|g| g == pattern) {
            globs.push(pattern.to_string());
        }
    }
    globs
}
