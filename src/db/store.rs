//! Shared store implementation.
//!
//! `Store` is cheap to clone: all clones point at the same state. It is built
//! once by the composition root and handed to repositories explicitly.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::config::settings::StoreConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Notification, NotificationStatus};

/// On-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    next_id: i64,
    notifications: Vec<Notification>,
}

/// Records plus the secondary indexes used by the query paths.
#[derive(Debug)]
pub struct StoreState {
    records: BTreeMap<i64, Notification>,
    by_user: HashMap<i64, BTreeSet<i64>>,
    by_status: HashMap<NotificationStatus, BTreeSet<i64>>,
    in_flight: HashSet<i64>,
    next_id: i64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            by_user: HashMap::new(),
            by_status: HashMap::new(),
            in_flight: HashSet::new(),
            next_id: 1,
        }
    }
}

impl StoreState {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = StoreState::default();
        let mut max_id = 0;
        for record in snapshot.notifications {
            max_id = max_id.max(record.id);
            state.put(record);
        }
        state.next_id = snapshot.next_id.max(max_id + 1);
        state
    }

    /// Snapshot of the state as it will be once `record` is stored.
    fn snapshot_with(&self, record: &Notification) -> Snapshot {
        let mut records = self.records.clone();
        records.insert(record.id, record.clone());
        Snapshot {
            next_id: self.next_id,
            notifications: records.into_values().collect(),
        }
    }

    /// Reserves the next identifier.
    pub fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: i64) -> Option<&Notification> {
        self.records.get(&id)
    }

    /// Inserts or replaces a record, keeping both indexes in step.
    pub fn put(&mut self, record: Notification) {
        if let Some(previous) = self.records.get(&record.id) {
            if previous.status != record.status
                && let Some(ids) = self.by_status.get_mut(&previous.status)
            {
                ids.remove(&record.id);
            }
        }
        self.by_user
            .entry(record.user_id)
            .or_default()
            .insert(record.id);
        self.by_status
            .entry(record.status)
            .or_default()
            .insert(record.id);
        self.records.insert(record.id, record);
    }

    pub fn by_user(&self, user_id: i64) -> Vec<Notification> {
        self.collect(self.by_user.get(&user_id))
    }

    pub fn by_status(&self, status: NotificationStatus) -> Vec<Notification> {
        self.collect(self.by_status.get(&status))
    }

    pub fn all(&self) -> impl Iterator<Item = &Notification> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_in_flight(&self, id: i64) -> bool {
        self.in_flight.contains(&id)
    }

    /// Returns false when the record was already marked.
    pub fn mark_in_flight(&mut self, id: i64) -> bool {
        self.in_flight.insert(id)
    }

    pub fn clear_in_flight(&mut self, id: i64) {
        self.in_flight.remove(&id);
    }

    fn collect(&self, ids: Option<&BTreeSet<i64>>) -> Vec<Notification> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.records.get(id).cloned())
                .collect()
        })
        .unwrap_or_default()
    }
}

/// Process-wide notification store handle
#[derive(Clone)]
pub struct Store {
    state: Arc<Mutex<StoreState>>,
    snapshot_path: Option<PathBuf>,
}

impl Store {
    /// Creates a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            snapshot_path: None,
        }
    }

    /// Opens the store described by configuration.
    ///
    /// With persistence enabled an existing snapshot is loaded; a missing file
    /// starts an empty store that is written on the first change.
    pub async fn open(config: &StoreConfig) -> AppResult<Self> {
        if !config.persist {
            tracing::info!("Notification store running in memory");
            return Ok(Self::in_memory());
        }

        let path = PathBuf::from(&config.path);
        let state = match load_snapshot(&path).await? {
            Some(snapshot) => {
                let state = StoreState::from_snapshot(snapshot);
                tracing::info!(
                    path = %path.display(),
                    records = state.len(),
                    "Notification snapshot loaded"
                );
                state
            }
            None => {
                tracing::warn!(path = %path.display(), "Snapshot not found, starting empty store");
                StoreState::default()
            }
        };

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            snapshot_path: Some(path),
        })
    }

    /// Acquires exclusive access to the store.
    pub async fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().await
    }

    /// Stores `record`, writing the snapshot first when persistence is
    /// enabled.
    ///
    /// The in-memory state only changes once the snapshot write succeeded, so
    /// a failed or abandoned write leaves the store as it was.
    /// Callers pass the guard they already hold so writes land in lock order.
    pub async fn commit(&self, state: &mut StoreState, record: Notification) -> AppResult<()> {
        if let Some(path) = &self.snapshot_path {
            write_snapshot(path, &state.snapshot_with(&record)).await?;
        }
        state.put(record);
        Ok(())
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Cheap liveness probe used by the health endpoint.
    pub async fn ping(&self) -> usize {
        self.state.lock().await.len()
    }
}

async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> AppResult<()> {
    let body = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| AppError::storage("serialize snapshot", e))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::storage("create snapshot directory", e))?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|e| AppError::storage("write snapshot", e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| AppError::storage("replace snapshot", e))?;
    Ok(())
}

async fn load_snapshot(path: &Path) -> AppResult<Option<Snapshot>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| AppError::storage("parse snapshot", e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::storage("read snapshot", e)),
    }
}
