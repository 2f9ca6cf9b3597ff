use i18n_audit::config::{descriptor_by_id, select_framework, MatchReason, ProjectManifest};
use i18n_audit::resolve_framework;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn detect(dir: &TempDir) -> (String, f32, MatchReason) {
    let selection = select_framework(dir.path(), &ProjectManifest::load(dir.path()));
    (
        selection.descriptor.id.to_string(),
        selection.confidence,
        selection.reason,
    )
}

#[test]
fn test_nextjs_outranks_react_by_priority() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"dependencies": {"next": "14.0.0", "react": "18.2.0"}, "devDependencies": {"next-intl": "3.0.0"}}"#,
    );

    let selection = select_framework(dir.path(), &ProjectManifest::load(dir.path()));
    assert_eq!(selection.descriptor.id, "nextjs");
    assert_eq!(selection.confidence, 0.9);
    let ranked: Vec<&str> = selection.candidates.iter().map(|c| c.id).collect();
    assert_eq!(ranked, vec!["nextjs", "react"]);
}

#[test]
fn test_native_runtime_wins() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"dependencies": {"react": "18.2.0", "react-native": "0.73.0"}}"#,
    );
    assert_eq!(
        detect(&dir),
        ("react-native".to_string(), 0.95, MatchReason::Dependency)
    );
}

#[test]
fn test_python_manifests() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "requirements.txt", "# web\nDjango==4.2\ndjango-rosetta>=0.9\n");
    assert_eq!(detect(&dir).0, "django");

    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "pyproject.toml",
        "[tool.poetry.dependencies]\npython = \"^3.11\"\nFlask = \"^3.0\"\nflask-babel = \"^4.0\"\n",
    );
    assert_eq!(detect(&dir).0, "flask");
}

#[test]
fn test_composer_manifest() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "composer.json",
        r#"{"require": {"php": "^8.2", "laravel/framework": "^11.0"}}"#,
    );
    assert_eq!(detect(&dir).0, "laravel");
}

#[test]
fn test_heuristics_without_manifest() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "manage.py", "import django\n");
    assert_eq!(
        detect(&dir),
        ("django".to_string(), 0.7, MatchReason::MarkerFile)
    );

    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/components/Header.vue", "<template><h1>Hi</h1></template>\n");
    assert_eq!(detect(&dir), ("vue".to_string(), 0.5, MatchReason::Extension));
}

#[test]
fn test_broken_manifest_falls_back() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "package.json", "{ not json");
    write(dir.path(), "src/App.tsx", "export const App = () => null;\n");

    assert_eq!(detect(&dir), ("react".to_string(), 0.5, MatchReason::Extension));
}

#[test]
fn test_nothing_matches_is_vanilla() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "README.md", "# empty\n");
    assert_eq!(
        detect(&dir),
        ("vanilla".to_string(), 0.0, MatchReason::Fallback)
    );
}

#[test]
fn test_forced_framework() {
    let dir = TempDir::new().unwrap();
    let selection = resolve_framework(dir.path(), Some("Svelte")).unwrap();
    assert_eq!(selection.descriptor.id, "svelte");
    assert!(descriptor_by_id("cobol").is_none());
    assert!(resolve_framework(dir.path(), Some("cobol")).is_err());
}
