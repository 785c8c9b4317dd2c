//!
//! report-central storage module
//! -----------------------------
//! Durable string-keyed state for the session layer. A `StateStore` keeps a
//! small map in memory and writes it through to a JSON snapshot on every
//! mutation, so the one entry the auth boundary cares about (the serialized
//! identity under key `"user"`) survives process restarts.
//!
//! Snapshot writes go to a temp file first and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact. A snapshot that fails
//! to parse on open is treated as absent; the session layer then degrades to
//! an anonymous session rather than failing startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    entries: HashMap<String, String>,
}

/// A single named durable key-value store under a directory.
#[derive(Clone)]
pub struct StateStore {
    dir: PathBuf,
    map: Arc<RwLock<HashMap<String, String>>>,
}

impl StateStore {
    /// Open (or create) the store rooted at `dir`, loading any existing
    /// snapshot. Corrupt snapshots are ignored so startup never fails here.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).ok();
        let s = Self { dir, map: Arc::new(RwLock::new(HashMap::new())) };
        s.load_snapshot();
        s
    }

    fn snapshot_path(&self) -> PathBuf { self.dir.join("state.json") }

    fn load_snapshot(&self) {
        let path = self.snapshot_path();
        let Ok(bytes) = std::fs::read(&path) else { return };
        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(snap) => {
                let mut w = self.map.write();
                w.clear();
                w.extend(snap.entries);
            }
            Err(e) => {
                warn!(target: "report_central", "ignoring corrupt state snapshot at {}: {}", path.display(), e);
            }
        }
    }

    fn save_snapshot(&self) -> Result<()> {
        let snap = Snapshot { version: 1, entries: self.map.read().clone() };
        let bytes = serde_json::to_vec_pretty(&snap)?;
        let tmp = self.snapshot_path().with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(tmp, self.snapshot_path())?;
        Ok(())
    }

    // Mutations persist immediately; a failed write keeps the in-memory value
    // and is logged rather than surfaced, matching the session layer's
    // never-fail-outward restore contract.
    fn persist(&self) {
        if let Err(e) = self.save_snapshot() {
            warn!(target: "report_central", "state snapshot write failed: {}", e);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.map.write().insert(key.into(), value.into());
        self.persist();
    }

    /// Remove a key. Returns true if it existed.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.map.write().remove(key).is_some();
        if removed { self.persist(); }
        removed
    }

    pub fn clear(&self) {
        self.map.write().clear();
        self.persist();
    }

    pub fn len(&self) -> usize { self.map.read().len() }
    pub fn is_empty(&self) -> bool { self.map.read().is_empty() }
    /// Snapshot of all keys in this store
    pub fn keys(&self) -> Vec<String> { self.map.read().keys().cloned().collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn set_get_delete_round_trip() {
        let tmp = tempdir().unwrap();
        let store = StateStore::open(tmp.path());
        assert!(store.get("user").is_none());
        store.set("user", "{\"id\":1}");
        assert_eq!(store.get("user").as_deref(), Some("{\"id\":1}"));
        assert!(store.delete("user"));
        assert!(!store.delete("user"));
        assert!(store.is_empty());
    }

    #[test]
    fn values_survive_reopen() {
        let tmp = tempdir().unwrap();
        {
            let store = StateStore::open(tmp.path());
            store.set("user", "payload");
        }
        let store = StateStore::open(tmp.path());
        assert_eq!(store.get("user").as_deref(), Some("payload"));
        assert_eq!(store.keys(), vec!["user".to_string()]);
    }

    #[test]
    fn delete_persists_across_reopen() {
        let tmp = tempdir().unwrap();
        {
            let store = StateStore::open(tmp.path());
            store.set("user", "payload");
            store.delete("user");
        }
        let store = StateStore::open(tmp.path());
        assert!(store.get("user").is_none());
    }

    #[test]
    fn corrupt_snapshot_degrades_to_empty() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("state.json"), b"{not json").unwrap();
        let store = StateStore::open(tmp.path());
        assert!(store.is_empty());
        // Store stays usable and the next write replaces the bad snapshot
        store.set("user", "ok");
        let reopened = StateStore::open(tmp.path());
        assert_eq!(reopened.get("user").as_deref(), Some("ok"));
    }
}
