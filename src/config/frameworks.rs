//! Built-in framework descriptors and project framework selection.
//!
//! Each descriptor is a declarative bundle: dependency signatures for manifest
//! matching, marker files and extensions for heuristic matching, the globs the
//! scanner walks, and the ordered extraction patterns applied to each file.
//! Selection ranks every matching descriptor by (confidence, priority) and
//! picks the top one; there is no per-framework branching anywhere else.

use ignore::WalkBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use super::exclusions::{detect_project_type, get_default_exclusions};
use super::manifest::ProjectManifest;

const MANIFEST_CONFIDENCE: f32 = 0.9;
const NATIVE_RUNTIME_CONFIDENCE: f32 = 0.95;
const MARKER_CONFIDENCE: f32 = 0.7;
const EXTENSION_CONFIDENCE: f32 = 0.5;
const HEURISTIC_DEPTH: usize = 4;

/// What a pattern's first capture group holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// User-facing literal text that should probably be translated
    Literal,
    /// A translation key passed to a translation call
    KeyCall,
}

/// One lexical extraction rule; capture group 1 is the text or key
#[derive(Debug)]
pub struct ExtractionPattern {
    pub id: &'static str,
    pub kind: PatternKind,
    pub regex: Regex,
}

impl ExtractionPattern {
    fn new(id: &'static str, kind: PatternKind, pattern: &str) -> Self {
        Self {
            id,
            kind,
            regex: Regex::new(pattern).expect("built-in extraction pattern is valid"),
        }
    }
}

#[derive(Debug)]
pub struct FrameworkDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub priority: i32,
    /// Runtime frameworks that wrap another one (React Native over React)
    pub native_runtime: bool,
    pub dependencies: &'static [&'static str],
    pub marker_files: &'static [&'static str],
    pub extensions: &'static [&'static str],
    pub include_globs: &'static [&'static str],
    pub exclude_globs: &'static [&'static str],
    pub patterns: Vec<ExtractionPattern>,
}

impl FrameworkDescriptor {
    pub fn key_call_patterns(&self) -> impl Iterator<Item = &ExtractionPattern> {
        self.patterns
            .iter()
            .filter(|p| p.kind == PatternKind::KeyCall)
    }
}

// Shared pattern sources
const JS_KEY_CALL: &str =
    r#"(?:^|[^\w$.])(?:\$t|\$tc|t|i18n\.t|i18next\.t)\(\s*['"`]([^'"`$\n]+)['"`]"#;
const JSX_TEXT: &str = r#">\s*([^<>{}\n]*[A-Za-z][^<>{}\n]*?)\s*<"#;
const JSX_ATTRIBUTE: &str =
    r#"\b(?:placeholder|title|alt|aria-label|label|helperText)\s*=\s*"([^"\n]+)""#;
const DOUBLE_QUOTED: &str = r#""((?:[^"\\\n]|\\.)*)""#;
const SINGLE_QUOTED: &str = r#"'((?:[^'\\\n]|\\.)*)'"#;
const PY_KEY_CALL: &str = r#"(?:^|[^\w.])(?:_|gettext|lazy_gettext|gettext_lazy|ngettext|pgettext)\(\s*['"]([^'"\n]+)['"]"#;

const JS_GLOBS: &[&str] = &["*.js", "*.jsx", "*.ts", "*.tsx", "*.mjs"];
const JS_EXCLUDES: &[&str] = &["*.min.js", "*.d.ts", "*.map", "coverage", "dist", "build"];

static REGISTRY: Lazy<Vec<FrameworkDescriptor>> = Lazy::new(|| {
    use PatternKind::{KeyCall, Literal};

    vec![
        FrameworkDescriptor {
            id: "react",
            name: "React",
            priority: 10,
            native_runtime: false,
            dependencies: &["react", "react-dom", "react-i18next", "react-intl"],
            marker_files: &[],
            extensions: &["jsx", "tsx"],
            include_globs: JS_GLOBS,
            exclude_globs: JS_EXCLUDES,
            patterns: vec![
                ExtractionPattern::new("js-key-call", KeyCall, JS_KEY_CALL),
                ExtractionPattern::new(
                    "react-trans-component",
                    KeyCall,
                    r#"<Trans[^>]*\bi18nKey\s*=\s*['"]([^'"\n]+)['"]"#,
                ),
                ExtractionPattern::new("jsx-attribute", Literal, JSX_ATTRIBUTE),
                ExtractionPattern::new("jsx-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "react-native",
            name: "React Native",
            priority: 10,
            native_runtime: true,
            dependencies: &["react-native", "expo"],
            marker_files: &["metro.config.js", "app.json"],
            extensions: &[],
            include_globs: JS_GLOBS,
            exclude_globs: &["*.min.js", "*.d.ts", "android", "ios", ".expo"],
            patterns: vec![
                ExtractionPattern::new("js-key-call", KeyCall, JS_KEY_CALL),
                ExtractionPattern::new(
                    "rn-text-component",
                    Literal,
                    r#"<Text[^>]*>\s*([^<>{}\n]*[A-Za-z][^<>{}\n]*?)\s*</Text>"#,
                ),
                ExtractionPattern::new("jsx-attribute", Literal, JSX_ATTRIBUTE),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "nextjs",
            name: "Next.js",
            priority: 20,
            native_runtime: false,
            dependencies: &["next", "next-i18next", "next-intl"],
            marker_files: &["next.config.js", "next.config.mjs", "next.config.ts"],
            extensions: &[],
            include_globs: JS_GLOBS,
            exclude_globs: &["*.min.js", "*.d.ts", ".next", "out"],
            patterns: vec![
                ExtractionPattern::new("js-key-call", KeyCall, JS_KEY_CALL),
                ExtractionPattern::new("jsx-attribute", Literal, JSX_ATTRIBUTE),
                ExtractionPattern::new("jsx-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "vue",
            name: "Vue",
            priority: 10,
            native_runtime: false,
            dependencies: &["vue", "vue-i18n", "nuxt", "@nuxtjs/i18n"],
            marker_files: &["vue.config.js", "nuxt.config.js", "nuxt.config.ts"],
            extensions: &["vue"],
            include_globs: &["*.vue", "*.js", "*.ts"],
            exclude_globs: &["*.min.js", "*.d.ts", ".nuxt", "dist"],
            patterns: vec![
                ExtractionPattern::new("js-key-call", KeyCall, JS_KEY_CALL),
                ExtractionPattern::new(
                    "vue-directive",
                    KeyCall,
                    r#"v-t\s*=\s*"'([^'"\n]+)'""#,
                ),
                ExtractionPattern::new("jsx-attribute", Literal, JSX_ATTRIBUTE),
                ExtractionPattern::new("template-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "angular",
            name: "Angular",
            priority: 10,
            native_runtime: false,
            dependencies: &["@angular/core", "@ngx-translate/core", "@angular/localize"],
            marker_files: &["angular.json"],
            extensions: &[],
            include_globs: &["*.ts", "*.html"],
            exclude_globs: &["*.spec.ts", "*.d.ts", "dist", ".angular"],
            patterns: vec![
                ExtractionPattern::new(
                    "translate-pipe",
                    KeyCall,
                    r#"['"]([^'"\n]+)['"]\s*\|\s*translate\b"#,
                ),
                ExtractionPattern::new(
                    "translate-service",
                    KeyCall,
                    r#"\btranslate\.(?:instant|get|stream)\(\s*['"]([^'"\n]+)['"]"#,
                ),
                ExtractionPattern::new("template-text", Literal, JSX_TEXT),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "svelte",
            name: "Svelte",
            priority: 10,
            native_runtime: false,
            dependencies: &["svelte", "svelte-i18n", "@sveltejs/kit"],
            marker_files: &["svelte.config.js"],
            extensions: &["svelte"],
            include_globs: &["*.svelte", "*.js", "*.ts"],
            exclude_globs: &["*.min.js", "*.d.ts", ".svelte-kit"],
            patterns: vec![
                ExtractionPattern::new(
                    "svelte-store-call",
                    KeyCall,
                    r#"\$(?:_|t)\(\s*['"]([^'"\n]+)['"]"#,
                ),
                ExtractionPattern::new("js-key-call", KeyCall, JS_KEY_CALL),
                ExtractionPattern::new("template-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "flask",
            name: "Flask",
            priority: 10,
            native_runtime: false,
            dependencies: &["flask", "flask-babel", "flask-babelex"],
            marker_files: &[],
            extensions: &[],
            include_globs: &["*.py", "*.html", "*.jinja", "*.jinja2", "*.j2"],
            exclude_globs: &["venv", ".venv", "__pycache__", "migrations"],
            patterns: vec![
                ExtractionPattern::new("py-gettext-call", KeyCall, PY_KEY_CALL),
                ExtractionPattern::new(
                    "jinja-trans",
                    KeyCall,
                    r#"\{\{\s*_\(\s*['"]([^'"\n]+)['"]"#,
                ),
                ExtractionPattern::new("template-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "django",
            name: "Django",
            priority: 10,
            native_runtime: false,
            dependencies: &["django", "django-rosetta", "django-modeltranslation"],
            marker_files: &["manage.py"],
            extensions: &[],
            include_globs: &["*.py", "*.html", "*.txt"],
            exclude_globs: &["venv", ".venv", "__pycache__", "migrations", "static"],
            patterns: vec![
                ExtractionPattern::new("py-gettext-call", KeyCall, PY_KEY_CALL),
                ExtractionPattern::new(
                    "django-trans-tag",
                    KeyCall,
                    r#"\{%\s*(?:trans|translate)\s+['"]([^'"\n]+)['"]"#,
                ),
                ExtractionPattern::new("template-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "python",
            name: "Python",
            priority: 0,
            native_runtime: false,
            dependencies: &["babel", "python-i18n"],
            marker_files: &["setup.py"],
            extensions: &["py"],
            include_globs: &["*.py"],
            exclude_globs: &["venv", ".venv", "__pycache__", "*.egg-info"],
            patterns: vec![
                ExtractionPattern::new("py-gettext-call", KeyCall, PY_KEY_CALL),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "laravel",
            name: "Laravel",
            priority: 10,
            native_runtime: false,
            dependencies: &["laravel/framework", "illuminate/translation"],
            marker_files: &["artisan"],
            extensions: &["php"],
            include_globs: &["*.php"],
            exclude_globs: &["vendor", "storage", "bootstrap/cache"],
            patterns: vec![
                ExtractionPattern::new(
                    "laravel-trans-call",
                    KeyCall,
                    r#"(?:\b__|\btrans|\btrans_choice|@lang|Lang::get)\(\s*['"]([^'"\n]+)['"]"#,
                ),
                ExtractionPattern::new("blade-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
        FrameworkDescriptor {
            id: "vanilla",
            name: "Generic",
            priority: -100,
            native_runtime: false,
            dependencies: &[],
            marker_files: &[],
            extensions: &[],
            include_globs: &[
                "*.js", "*.jsx", "*.ts", "*.tsx", "*.html", "*.vue", "*.svelte", "*.py", "*.php",
                "*.rb",
            ],
            exclude_globs: &["*.min.js", "*.d.ts"],
            patterns: vec![
                ExtractionPattern::new("html-text", Literal, JSX_TEXT),
                ExtractionPattern::new("double-quoted", Literal, DOUBLE_QUOTED),
                ExtractionPattern::new("single-quoted", Literal, SINGLE_QUOTED),
            ],
        },
    ]
});

/// All built-in descriptors in registry order
pub fn descriptors() -> &'static [FrameworkDescriptor] {
    &REGISTRY
}

pub fn descriptor_by_id(id: &str) -> Option<&'static FrameworkDescriptor> {
    REGISTRY.iter().find(|d| d.id.eq_ignore_ascii_case(id))
}

/// The generic fallback descriptor
pub fn vanilla() -> &'static FrameworkDescriptor {
    REGISTRY
        .iter()
        .find(|d| d.id == "vanilla")
        .unwrap_or(&REGISTRY[REGISTRY.len() - 1])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Dependency,
    MarkerFile,
    Extension,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub id: &'static str,
    pub confidence: f32,
    pub priority: i32,
    pub reason: MatchReason,
}

/// Outcome of framework selection: the winner plus the full ranking
#[derive(Debug, Clone)]
pub struct Selection {
    pub descriptor: &'static FrameworkDescriptor,
    pub confidence: f32,
    pub reason: MatchReason,
    pub candidates: Vec<Candidate>,
}

impl Selection {
    /// Wrap a caller-forced descriptor
    pub fn forced(descriptor: &'static FrameworkDescriptor) -> Self {
        Self {
            descriptor,
            confidence: 1.0,
            reason: MatchReason::Fallback,
            candidates: Vec::new(),
        }
    }
}

fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then(b.priority.cmp(&a.priority))
        .then(a.id.cmp(b.id))
}

fn manifest_candidates(manifest: &ProjectManifest) -> Vec<Candidate> {
    descriptors()
        .iter()
        .filter(|d| d.dependencies.iter().any(|dep| manifest.has_dependency(dep)))
        .map(|d| Candidate {
            id: d.id,
            confidence: if d.native_runtime {
                NATIVE_RUNTIME_CONFIDENCE
            } else {
                MANIFEST_CONFIDENCE
            },
            priority: d.priority,
            reason: MatchReason::Dependency,
        })
        .collect()
}

/// Extensions of files in the first few levels of the project tree
fn project_extensions(root: &Path) -> HashSet<String> {
    let excluded: HashSet<&str> = get_default_exclusions(detect_project_type(root))
        .into_iter()
        .collect();

    WalkBuilder::new(root)
        .max_depth(Some(HEURISTIC_DEPTH))
        .filter_entry(move |entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !excluded.contains(name))
                .unwrap_or(true)
        })
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .collect()
}

fn heuristic_candidates(root: &Path) -> Vec<Candidate> {
    let extensions = project_extensions(root);
    let mut candidates = Vec::new();

    for d in descriptors() {
        if d.marker_files.iter().any(|m| root.join(m).is_file()) {
            candidates.push(Candidate {
                id: d.id,
                confidence: MARKER_CONFIDENCE,
                priority: d.priority,
                reason: MatchReason::MarkerFile,
            });
        } else if d.extensions.iter().any(|e| extensions.contains(*e)) {
            candidates.push(Candidate {
                id: d.id,
                confidence: EXTENSION_CONFIDENCE,
                priority: d.priority,
                reason: MatchReason::Extension,
            });
        }
    }

    candidates
}

/// Rank all descriptors matching the project and select the top one.
///
/// Manifest matches take precedence; file heuristics are only consulted when
/// no dependency signature matched. With no candidate at all the generic
/// descriptor is used.
pub fn select_framework(root: &Path, manifest: &ProjectManifest) -> Selection {
    let mut candidates = manifest_candidates(manifest);
    if candidates.is_empty() {
        candidates = heuristic_candidates(root);
    }
    candidates.sort_by(rank);

    let selection = match candidates.first() {
        Some(top) => Selection {
            descriptor: descriptor_by_id(top.id).unwrap_or_else(vanilla),
            confidence: top.confidence,
            reason: top.reason,
            candidates: candidates.clone(),
        },
        None => Selection {
            descriptor: vanilla(),
            confidence: 0.0,
            reason: MatchReason::Fallback,
            candidates,
        },
    };

    info!(
        "Selected framework '{}' (confidence {:.2}, {:?})",
        selection.descriptor.id, selection.confidence, selection.reason
    );
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_all_descriptors_build() {
        assert_eq!(descriptors().len(), 11);
        let ids: HashSet<_> = descriptors().iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), descriptors().len());
        assert!(descriptors().iter().all(|d| !d.patterns.is_empty()));
    }

    #[test]
    fn test_vanilla_has_no_key_calls() {
        assert_eq!(vanilla().id, "vanilla");
        assert_eq!(vanilla().key_call_patterns().count(), 0);
    }

    #[test]
    fn test_js_key_call_pattern() {
        let react = descriptor_by_id("react").unwrap();
        let re = &react.patterns[0].regex;
        let key = |s: &str| re.captures(s).map(|c| c[1].to_string());

        assert_eq!(key("t('invoice.add_new')").as_deref(), Some("invoice.add_new"));
        assert_eq!(key(r#"{i18n.t("home.title")}"#).as_deref(), Some("home.title"));
        assert_eq!(key("{{ $t('nav.home') }}").as_deref(), Some("nav.home"));
        assert_eq!(key("format('x')"), None);
        assert_eq!(key("t(`items.${id}`)"), None);
    }

    #[test]
    fn test_descriptor_by_id_is_case_insensitive() {
        assert_eq!(descriptor_by_id("Django").map(|d| d.id), Some("django"));
        assert!(descriptor_by_id("cobol").is_none());
    }

    #[test]
    fn test_nextjs_outranks_react() {
        let dir = TempDir::new().unwrap();
        let manifest = ProjectManifest::from_dependencies(["react", "next"]);
        let selection = select_framework(dir.path(), &manifest);
        assert_eq!(selection.descriptor.id, "nextjs");
        assert_eq!(selection.candidates.len(), 2);
    }

    #[test]
    fn test_native_runtime_boost() {
        let dir = TempDir::new().unwrap();
        let manifest = ProjectManifest::from_dependencies(["react", "react-native"]);
        let selection = select_framework(dir.path(), &manifest);
        assert_eq!(selection.descriptor.id, "react-native");
        assert!((selection.confidence - NATIVE_RUNTIME_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_marker_file_heuristic() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("manage.py"), "").unwrap();
        let selection = select_framework(dir.path(), &ProjectManifest::default());
        assert_eq!(selection.descriptor.id, "django");
        assert_eq!(selection.reason, MatchReason::MarkerFile);
    }

    #[test]
    fn test_extension_heuristic() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("scripts")).unwrap();
        fs::write(dir.path().join("scripts").join("tool.py"), "print('hi')").unwrap();
        let selection = select_framework(dir.path(), &ProjectManifest::default());
        assert_eq!(selection.descriptor.id, "python");
        assert_eq!(selection.reason, MatchReason::Extension);
    }

    #[test]
    fn test_fallback_to_vanilla() {
        let dir = TempDir::new().unwrap();
        let selection = select_framework(dir.path(), &ProjectManifest::default());
        assert_eq!(selection.descriptor.id, "vanilla");
        assert_eq!(selection.confidence, 0.0);
        assert_eq!(selection.reason, MatchReason::Fallback);
    }
}
