//! Discovery and loading of per-language translation corpora.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cache::TreeCache;
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::parse::{
    build_resource, flatten, flatten_expanded, load_resource, read_resource, FlattenedKeySet,
    LoadedResource, ResourceFormat,
};
use crate::report::Issue;

/// Directories probed, in order, when no locales directory is configured
pub const LOCALE_DIR_CANDIDATES: &[&str] = &[
    "locales",
    "src/locales",
    "public/locales",
    "i18n",
    "src/i18n",
    "translations",
    "lang",
    "config/locales",
    "assets/i18n",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed {
        /// Arrays kept atomic, for completeness checks
        keys: FlattenedKeySet,
        /// Arrays decomposed by index, for placeholder checks
        expanded: FlattenedKeySet,
    },
    Malformed(String),
    Unreadable(String),
}

/// One resource file of one language
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceFile {
    pub path: PathBuf,
    /// Name used to pair files across languages
    pub name: String,
    /// Path relative to the locales directory, for reporting
    pub display_path: String,
    pub size: u64,
    pub outcome: ParseOutcome,
    pub duplicate_keys: Vec<String>,
}

impl ResourceFile {
    pub fn keys(&self) -> Option<&FlattenedKeySet> {
        match &self.outcome {
            ParseOutcome::Parsed { keys, .. } => Some(keys),
            _ => None,
        }
    }

    pub fn expanded(&self) -> Option<&FlattenedKeySet> {
        match &self.outcome {
            ParseOutcome::Parsed { expanded, .. } => Some(expanded),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        !matches!(self.outcome, ParseOutcome::Parsed { .. })
    }

    pub fn key_count(&self) -> usize {
        self.keys().map(FlattenedKeySet::len).unwrap_or(0)
    }

    pub fn empty_count(&self) -> usize {
        self.keys().map(|k| k.empty_keys().len()).unwrap_or(0)
    }
}

/// All resource files of one language, keyed by logical file name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LanguageCorpus {
    pub language: String,
    pub files: BTreeMap<String, ResourceFile>,
}

impl LanguageCorpus {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, file: ResourceFile) {
        self.files.insert(file.name.clone(), file);
    }

    pub fn get(&self, name: &str) -> Option<&ResourceFile> {
        self.files.get(name)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn key_count(&self) -> usize {
        self.files.values().map(ResourceFile::key_count).sum()
    }

    pub fn empty_count(&self) -> usize {
        self.files.values().map(ResourceFile::empty_count).sum()
    }

    pub fn total_size(&self) -> u64 {
        self.files.values().map(|f| f.size).sum()
    }

    pub fn malformed_count(&self) -> usize {
        self.files.values().filter(|f| f.is_malformed()).count()
    }

    /// File-level issues: unparseable, unreadable and duplicate keys in raw text
    pub fn file_issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        for file in self.files.values() {
            match &file.outcome {
                ParseOutcome::Malformed(reason) => issues.push(Issue::MalformedFile {
                    file: file.display_path.clone(),
                    reason: reason.clone(),
                }),
                ParseOutcome::Unreadable(reason) => issues.push(Issue::UnreadableFile {
                    file: file.display_path.clone(),
                    reason: reason.clone(),
                }),
                ParseOutcome::Parsed { .. } => {}
            }
            issues.extend(
                file.duplicate_keys
                    .iter()
                    .map(|key| Issue::DuplicateKeyInSource {
                        file: file.display_path.clone(),
                        key: key.clone(),
                    }),
            );
        }
        issues
    }
}

/// A resource file found on disk but not loaded yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub name: String,
    pub path: PathBuf,
}

/// Resolve the locales directory: explicit setting first, then the usual suspects
pub fn locate_locales_dir(root: &Path, config: &AuditConfig) -> Result<PathBuf> {
    if let Some(dir) = &config.locales_dir {
        let dir = if dir.is_absolute() {
            dir.clone()
        } else {
            root.join(dir)
        };
        return if dir.is_dir() {
            Ok(dir)
        } else {
            Err(AuditError::NoTranslationFiles {
                searched_paths: dir.display().to_string(),
            })
        };
    }

    LOCALE_DIR_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|dir| dir.is_dir())
        .ok_or_else(|| AuditError::no_translation_files(LOCALE_DIR_CANDIDATES))
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Map each language under `locales_dir` to its resource files.
///
/// Subdirectories are languages holding files named by their path inside the
/// language directory (`en/common.json` -> `common.json`). Files directly in
/// the locales directory are single-file languages (`en.json` -> language
/// `en`, name `*.json`). Languages and files come back sorted.
pub fn discover_languages(locales_dir: &Path) -> Result<BTreeMap<String, Vec<DiscoveredFile>>> {
    let mut languages: BTreeMap<String, Vec<DiscoveredFile>> = BTreeMap::new();

    let mut entries: Vec<_> = fs::read_dir(locales_dir)
        .map_err(|e| AuditError::access_error(locales_dir, e.to_string()))?
        .filter_map(|entry| entry.ok())
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_hidden(&name) {
            continue;
        }

        if path.is_dir() {
            let files: Vec<DiscoveredFile> = WalkDir::new(&path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| ResourceFormat::from_path(e.path()).is_some())
                .filter_map(|e| {
                    let relative = e.path().strip_prefix(&path).ok()?;
                    Some(DiscoveredFile {
                        name: relative.to_string_lossy().replace('\\', "/"),
                        path: e.path().to_path_buf(),
                    })
                })
                .collect();
            if !files.is_empty() {
                languages.entry(name).or_default().extend(files);
            }
        } else if ResourceFormat::from_path(&path).is_some() {
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            languages
                .entry(stem.to_string())
                .or_default()
                .push(DiscoveredFile {
                    name: format!("*.{}", ext.to_ascii_lowercase()),
                    path,
                });
        }
    }

    for files in languages.values_mut() {
        files.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(languages)
}

/// Reference language first, then the others sorted.
///
/// The reference is `preferred` when that language exists, otherwise the
/// first language in sorted order. Returns `None` for an empty list.
pub fn order_languages(mut languages: Vec<String>, preferred: &str) -> Option<Vec<String>> {
    languages.sort();
    languages.dedup();
    if languages.is_empty() {
        return None;
    }

    if let Some(pos) = languages.iter().position(|l| l == preferred) {
        let reference = languages.remove(pos);
        languages.insert(0, reference);
    }
    Some(languages)
}

fn load_file(
    file: &DiscoveredFile,
    language: &str,
    locales_dir: &Path,
    cache: Option<&TreeCache>,
) -> ResourceFile {
    let display_path = file
        .path
        .strip_prefix(locales_dir)
        .unwrap_or(&file.path)
        .to_string_lossy()
        .replace('\\', "/");

    let loaded = match cache {
        Some(cache) => load_cached(cache, &file.path, language),
        None => load_resource(&file.path, language),
    };

    match loaded {
        Ok(loaded) => {
            debug!(
                "Loaded {} ({} bytes, {} duplicate keys)",
                display_path,
                loaded.size,
                loaded.duplicate_keys.len()
            );
            ResourceFile {
                path: file.path.clone(),
                name: file.name.clone(),
                display_path,
                size: loaded.size,
                outcome: ParseOutcome::Parsed {
                    keys: flatten(&loaded.tree),
                    expanded: flatten_expanded(&loaded.tree),
                },
                duplicate_keys: loaded.duplicate_keys,
            }
        }
        Err(err) => {
            warn!("Skipping {}: {}", display_path, err);
            let outcome = match err {
                AuditError::Parse { reason, .. } => ParseOutcome::Malformed(reason),
                AuditError::Access { reason, .. } => ParseOutcome::Unreadable(reason),
                other => ParseOutcome::Unreadable(other.to_string()),
            };
            let size_on_disk = fs::metadata(&file.path).map(|m| m.len()).unwrap_or(0);
            ResourceFile {
                path: file.path.clone(),
                name: file.name.clone(),
                display_path,
                size: size_on_disk,
                outcome,
                duplicate_keys: Vec::new(),
            }
        }
    }
}

/// Read the file, then parse it unless the cache holds a tree for the same text
fn load_cached(cache: &TreeCache, path: &Path, language: &str) -> Result<LoadedResource> {
    let (format, content) = read_resource(path)?;
    if let Some(hit) = cache.get(path, language, &content) {
        debug!("Cache hit for {}", path.display());
        return Ok(hit);
    }

    let loaded = build_resource(path, format, &content, language)?;
    if let Err(e) = cache.set(&loaded, language, &content) {
        warn!("{}", e);
    }
    Ok(loaded)
}

/// Load one language's files; per-file failures become malformed entries
pub fn load_corpus(
    language: &str,
    files: &[DiscoveredFile],
    locales_dir: &Path,
    cache: Option<&TreeCache>,
) -> LanguageCorpus {
    let mut corpus = LanguageCorpus::new(language);
    for file in files {
        corpus.insert(load_file(file, language, locales_dir, cache));
    }
    corpus
}

/// All corpora under the locales directory, reference language first.
///
/// Languages are loaded in parallel; the result order does not depend on it.
pub fn load_corpora(
    locales_dir: &Path,
    config: &AuditConfig,
    cache: Option<&TreeCache>,
) -> Result<Vec<LanguageCorpus>> {
    let discovered = discover_languages(locales_dir)?;
    let Some(order) = order_languages(discovered.keys().cloned().collect(), &config.source_language)
    else {
        return Ok(Vec::new());
    };

    if order[0] != config.source_language {
        warn!(
            "Source language '{}' not found, using '{}' as reference",
            config.source_language, order[0]
        );
    }
    info!(
        "Reference language '{}' ({} languages in {})",
        order[0],
        order.len(),
        locales_dir.display()
    );

    let corpora: Vec<LanguageCorpus> = order
        .par_iter()
        .map(|language| {
            let files = discovered
                .get(language)
                .map(Vec::as_slice)
                .unwrap_or_default();
            load_corpus(language, files, locales_dir, cache)
        })
        .collect();

    Ok(corpora)
}
