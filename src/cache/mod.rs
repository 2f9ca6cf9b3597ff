use crate::error::{AuditError, Result};
use crate::parse::{LoadedResource, ResourceFormat, TranslationTree};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sled::Db;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const CACHE_DIR_NAME: &str = "i18n-audit";
const FRONT_CACHE_CAP: usize = 512;

/// Cache value stored for each parsed resource file
#[derive(Serialize, Deserialize, Clone)]
struct CacheValue {
    format: ResourceFormat,
    size: u64,
    /// Serialized tree; bincode cannot round-trip `serde_json::Value` directly
    tree_json: String,
    duplicate_keys: Vec<String>,
}

/// Persistent cache of parsed translation trees.
///
/// Entries are keyed by path, language and a SHA-256 digest of the file
/// text, so any edit misses regardless of timestamps. A hit saves the parse,
/// not the read. Nothing is evicted implicitly: superseded entries stay until
/// [`TreeCache::clear`] is called.
pub struct TreeCache {
    db: Db,
    front_cache: Mutex<HashMap<Vec<u8>, CacheValue>>,
    cache_dir: PathBuf,
}

impl TreeCache {
    fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CACHE_DIR_NAME)
    }

    pub fn new() -> Result<Self> {
        Self::with_cache_dir(Self::default_cache_dir())
    }

    /// Open (or create) a cache in a specific directory
    pub fn with_cache_dir(cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir)?;
        let db = sled::open(cache_dir.join("db"))
            .map_err(|e| AuditError::Cache(format!("Failed to open cache: {}", e)))?;

        Ok(Self {
            db,
            front_cache: Mutex::new(HashMap::new()),
            cache_dir,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Parsed tree for `file` if it was cached from exactly this `content`
    pub fn get(&self, file: &Path, language: &str, content: &str) -> Option<LoadedResource> {
        let key = Self::make_key(file, language, content);

        let value = match self.front_get(&key) {
            Some(value) => value,
            None => {
                let bytes = self.db.get(&key).ok()??;
                let value: CacheValue = bincode::deserialize(&bytes).ok()?;
                self.front_set(key, value.clone());
                value
            }
        };

        let tree: TranslationTree = serde_json::from_str(&value.tree_json).ok()?;
        Some(LoadedResource {
            path: file.to_path_buf(),
            format: value.format,
            size: value.size,
            tree,
            duplicate_keys: value.duplicate_keys,
        })
    }

    pub fn set(&self, resource: &LoadedResource, language: &str, content: &str) -> Result<()> {
        let key = Self::make_key(&resource.path, language, content);

        let tree_json = serde_json::to_string(&resource.tree)
            .map_err(|e| AuditError::Cache(format!("Failed to serialize tree: {}", e)))?;
        let value = CacheValue {
            format: resource.format,
            size: resource.size,
            tree_json,
            duplicate_keys: resource.duplicate_keys.clone(),
        };

        let bytes = bincode::serialize(&value)
            .map_err(|e| AuditError::Cache(format!("Failed to serialize cache: {}", e)))?;

        self.front_set(key.clone(), value);
        self.db
            .insert(key, bytes)
            .map_err(|e| AuditError::Cache(format!("Failed to write cache: {}", e)))?;

        Ok(())
    }

    /// Drop every entry. The only way entries ever leave the cache.
    pub fn clear(&self) -> Result<()> {
        self.db
            .clear()
            .map_err(|e| AuditError::Cache(format!("Failed to clear cache: {}", e)))?;
        if let Ok(mut map) = self.front_cache.lock() {
            map.clear();
        }
        self.db
            .flush()
            .map_err(|e| AuditError::Cache(format!("Failed to flush cache: {}", e)))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn front_get(&self, key: &[u8]) -> Option<CacheValue> {
        let guard = self.front_cache.lock().ok()?;
        guard.get(key).cloned()
    }

    fn front_set(&self, key: Vec<u8>, value: CacheValue) {
        if let Ok(mut map) = self.front_cache.lock() {
            if map.len() < FRONT_CACHE_CAP || map.contains_key(&key) {
                map.insert(key, value);
            }
        }
    }

    fn make_key(file: &Path, language: &str, content: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{}|{}|{:x}", file.display(), language, hasher.finalize()).into_bytes()
    }
}
