//! Client-local favorites: a persisted set of property ids with an
//! observable in-memory mirror.
//!
//! Every toggle is written to storage before subscribers are notified, so a
//! view reacting to the notification can rely on the persisted state.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Storage key holding the JSON array of favorited ids
pub const FAVORITES_KEY: &str = "favorites";

/// Key/value persistence with local-storage semantics
pub trait FavoritesStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl FavoritesStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {key}")),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path(key), value).with_context(|| format!("Failed to write {key}"))
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("Failed to remove {key}"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl FavoritesStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

impl MemoryStorage {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Favorites storage lock poisoned"))
    }
}

/// Favorited property ids, injected into whatever views need them
pub struct FavoritesStore<S: FavoritesStorage> {
    storage: S,
    mirror: watch::Sender<Vec<i32>>,
}

impl<S: FavoritesStorage> FavoritesStore<S> {
    /// Load the persisted set; unreadable data starts an empty one
    pub fn load(storage: S) -> Self {
        let initial = match storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding corrupt favorites: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read favorites: {e:#}");
                Vec::new()
            }
        };

        let (mirror, _) = watch::channel(initial);
        Self { storage, mirror }
    }

    /// Flip `id` between favorited and not; returns the new state.
    /// Takes `&mut self` so there is a single writer of the set.
    pub fn toggle(&mut self, id: i32) -> Result<bool> {
        let mut updated = self.mirror.borrow().clone();
        let now_favorite = match updated.iter().position(|&x| x == id) {
            Some(index) => {
                updated.remove(index);
                false
            }
            None => {
                updated.push(id);
                true
            }
        };

        let raw = serde_json::to_string(&updated)?;
        self.storage.set(FAVORITES_KEY, &raw)?;
        self.mirror.send_replace(updated);

        debug!("Favorite {id} -> {now_favorite}");
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: i32) -> bool {
        self.mirror.borrow().contains(&id)
    }

    /// Current ids in toggle order
    pub fn ids(&self) -> Vec<i32> {
        self.mirror.borrow().clone()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(FAVORITES_KEY)?;
        self.mirror.send_replace(Vec::new());
        Ok(())
    }

    /// Receiver that observes every toggle and clear
    pub fn subscribe(&self) -> watch::Receiver<Vec<i32>> {
        self.mirror.subscribe()
    }
}
