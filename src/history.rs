//! # History Store Module
//!
//! A capped, most-recent-first list of past (ingredients, recipes) pairs,
//! persisted as one JSON array under a single storage key.
//!
//! ## Write-through
//!
//! Every mutation builds the new list, persists it, and only then replaces
//! the in-memory mirror. When persisting fails the mirror keeps its previous
//! value, so the two never disagree after a call returns.
//!
//! ## Corruption
//!
//! A missing key, an unreadable value or a value that is not a valid JSON
//! history loads as an empty history. This is the only place where a parse
//! failure is swallowed.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use rand::Rng;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::errors::{RecipeError, Result};
use crate::recipe_model::{HistoryItem, Recipe};

/// Storage key holding the serialized history
pub const HISTORY_KEY: &str = "recipe_history";
/// Maximum number of items kept
pub const MAX_HISTORY_ITEMS: usize = 10;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 9;

/// Minimal string key-value storage
pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Remove `key`; removing an absent key succeeds
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        // Write to a sibling temp file and rename, so readers never see half a file
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.path_for(key))
            .map_err(|e| RecipeError::Storage(e.to_string()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage, counting writes
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one value
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    /// Number of successful `set` calls
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Random lowercase base-36 identifier for a new history item
pub fn generate_item_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Owner of the persisted history and its in-memory mirror
#[derive(Debug)]
pub struct HistoryStore<S> {
    storage: S,
    items: Vec<HistoryItem>,
}

impl<S: KeyValueStorage> HistoryStore<S> {
    /// Open a store and load whatever is persisted
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            items: Vec::new(),
        };
        store.load();
        store
    }

    /// Re-read the persisted history, treating corruption as empty and keeping
    /// at most [`MAX_HISTORY_ITEMS`] of the newest entries
    pub fn load(&mut self) -> Vec<HistoryItem> {
        self.items = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryItem>>(&raw) {
                Ok(mut items) => {
                    if items.len() > MAX_HISTORY_ITEMS {
                        warn!(count = items.len(), "Persisted history exceeds the cap, truncating");
                        items.truncate(MAX_HISTORY_ITEMS);
                    }
                    items
                }
                Err(e) => {
                    warn!(error = %e, "Persisted history is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read persisted history, starting empty");
                Vec::new()
            }
        };
        debug!(count = self.items.len(), "History loaded");
        self.items.clone()
    }

    /// Current items, most recent first
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Prepend a new item stamped with the current time
    pub fn record(&mut self, ingredients: Vec<String>, recipes: Vec<Recipe>) -> Result<Vec<HistoryItem>> {
        let item = HistoryItem {
            id: generate_item_id(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            ingredients,
            recipes,
        };
        let id = item.id.clone();

        let mut updated = Vec::with_capacity(MAX_HISTORY_ITEMS);
        updated.push(item);
        updated.extend(self.items.iter().cloned());
        updated.truncate(MAX_HISTORY_ITEMS);

        self.commit(updated)?;
        info!(id = %id, count = self.items.len(), "Recorded history item");
        Ok(self.items.clone())
    }

    /// Drop the item with `id`; an unknown id re-persists the same list
    pub fn remove(&mut self, id: &str) -> Result<Vec<HistoryItem>> {
        let updated: Vec<HistoryItem> = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        let removed = self.items.len() - updated.len();

        self.commit(updated)?;
        info!(id = %id, removed, "Removed history item");
        Ok(self.items.clone())
    }

    /// Drop everything and delete the storage key
    pub fn clear(&mut self) -> Result<Vec<HistoryItem>> {
        self.storage.remove(HISTORY_KEY)?;
        let count = self.items.len();
        self.items.clear();
        info!(count, "Cleared history");
        Ok(Vec::new())
    }

    fn commit(&mut self, updated: Vec<HistoryItem>) -> Result<()> {
        let serialized = serde_json::to_string(&updated)
            .map_err(|e| RecipeError::Storage(format!("failed to serialize history: {e}")))?;
        self.storage.set(HISTORY_KEY, &serialized)?;
        self.items = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_base36() {
        let id = generate_item_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_memory_storage_counts_writes() {
        let mut storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();
        storage.set("k", "w").unwrap();
        assert_eq!(storage.write_count(), 2);
        assert_eq!(storage.get("k").unwrap(), Some("w".to_string()));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_failed_write_leaves_mirror_untouched() {
        struct ReadOnly;
        impl KeyValueStorage for ReadOnly {
            fn get(&self, _key: &str) -> Result<Option<String>> {
                Ok(None)
            }
            fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
                Err(RecipeError::Storage("read-only".to_string()))
            }
            fn remove(&mut self, _key: &str) -> Result<()> {
                Ok(())
            }
        }

        let mut store = HistoryStore::open(ReadOnly);
        let result = store.record(vec!["pan".to_string()], vec![]);
        assert!(matches!(result, Err(RecipeError::Storage(_))));
        assert!(store.items().is_empty());
    }
}
