//! Local persistence of the participant identity so a restarted runner
//! resumes the same session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::route::Route;
use crate::session::ExperimentSession;
use crate::task::{Group, TaskCatalog};
use crate::{sxlog_debug, sxlog_warn, Result};

pub const KEY_EXPERIMENT_ID: &str = "experimentId";
pub const KEY_GROUP: &str = "group";
pub const KEY_LOCATION: &str = "location";

/// String key-value store.
pub trait IdentityStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityStore {
    values: BTreeMap<String, String>,
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.values.clear();
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IdentityFile {
    #[serde(flatten)]
    values: BTreeMap<String, String>,
}

/// JSON file backed store. Every write replaces the file atomically.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> IdentityFile {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return IdentityFile::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            sxlog_warn!("Ignoring unreadable identity file {}: {}", self.path.display(), e);
            IdentityFile::default()
        })
    }

    fn write(&self, file: &IdentityFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(file)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read().values.remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut file = self.read();
        file.values.insert(key.to_string(), value.to_string());
        self.write(&file)
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// What a restarted runner picks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resume {
    pub session: ExperimentSession,
    pub route: Option<Route>,
}

/// Restore the stored session. A missing id or a group other than AB/BA
/// means there is no session yet.
pub fn restore(store: &dyn IdentityStore, catalog: &TaskCatalog) -> Option<Resume> {
    let id = store.get(KEY_EXPERIMENT_ID).filter(|id| !id.is_empty())?;
    let group: Group = match store.get(KEY_GROUP)?.parse() {
        Ok(group) => group,
        Err(e) => {
            sxlog_warn!("Stored group rejected: {}", e);
            return None;
        }
    };
    let session = match ExperimentSession::new(id, group, catalog) {
        Ok(session) => session,
        Err(e) => {
            sxlog_warn!("Stored session rejected: {}", e);
            return None;
        }
    };
    let route = store
        .get(KEY_LOCATION)
        .and_then(|path| Route::parse(&path))
        .filter(|route| route.task_index().map_or(true, |i| i < catalog.len()));
    sxlog_debug!("Restored session id={} route={:?}", session.id(), route);
    Some(Resume { session, route })
}

pub fn persist(store: &mut dyn IdentityStore, id: &str, group: Group, route: &Route) -> Result<()> {
    store.set(KEY_EXPERIMENT_ID, id)?;
    store.set(KEY_GROUP, group.as_str())?;
    store.set(KEY_LOCATION, &route.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TaskCatalog {
        TaskCatalog::builtin().unwrap()
    }

    #[test]
    fn test_empty_store_is_fresh_start() {
        let store = MemoryIdentityStore::default();
        assert!(restore(&store, &catalog()).is_none());
    }

    #[test]
    fn test_invalid_group_is_fresh_start() {
        let mut store = MemoryIdentityStore::default();
        store.set(KEY_EXPERIMENT_ID, "p1").unwrap();
        store.set(KEY_GROUP, "CD").unwrap();
        assert!(restore(&store, &catalog()).is_none());
    }

    #[test]
    fn test_missing_group_is_fresh_start() {
        let mut store = MemoryIdentityStore::default();
        store.set(KEY_EXPERIMENT_ID, "p1").unwrap();
        assert!(restore(&store, &catalog()).is_none());
    }

    #[test]
    fn test_restore_round_trip() {
        let mut store = MemoryIdentityStore::default();
        persist(&mut store, "p9", Group::BA, &Route::Task(3)).unwrap();

        let resume = restore(&store, &catalog()).unwrap();
        assert_eq!(resume.session.id(), "p9");
        assert_eq!(resume.session.group(), Group::BA);
        assert_eq!(resume.route, Some(Route::Task(3)));
    }

    #[test]
    fn test_out_of_range_location_dropped() {
        let mut store = MemoryIdentityStore::default();
        persist(&mut store, "p9", Group::AB, &Route::Task(42)).unwrap();
        assert_eq!(restore(&store, &catalog()).unwrap().route, None);
    }

    #[test]
    fn test_file_store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("identity.json");

        let mut store = FileIdentityStore::new(&path);
        persist(&mut store, "p2", Group::AB, &Route::Consent).unwrap();

        let reopened = FileIdentityStore::new(&path);
        assert_eq!(reopened.get(KEY_GROUP).as_deref(), Some("AB"));
        assert_eq!(reopened.get(KEY_LOCATION).as_deref(), Some("/consentSyntax"));

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(reopened.get(KEY_EXPERIMENT_ID).is_none());
    }

    #[test]
    fn test_file_store_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileIdentityStore::new(&path);
        assert!(store.get(KEY_EXPERIMENT_ID).is_none());
    }
}
