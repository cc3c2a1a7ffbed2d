//! The authoritative, ordered task collection.
//!
//! Mutations go through `add`/`update`/`remove`/`populate`. Each successful
//! mutation hands a full JSON snapshot to the persistence sink; sink failures
//! are logged and remembered but never fail the mutation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::io::storage::{DEFAULT_STORAGE_KEY, PersistError, PersistenceSink};
use crate::model::task::{Status, Task};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task id already exists: {0}")]
    DuplicateId(String),
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("could not load stored tasks: {0}")]
    Load(#[from] PersistError),
    #[error("stored tasks are not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// What `update`/`remove` do with an id that is not in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownIdPolicy {
    /// Silent no-op
    #[default]
    Ignore,
    /// Return `StoreError::NotFound`
    Report,
}

/// Status filter for list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        Status::parse_label(s)
            .map(StatusFilter::Only)
            .ok_or_else(|| format!("invalid status filter: {} (expected All, Pending, In Progress, Completed)", s))
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(status) => f.write_str(status.label()),
        }
    }
}

/// Per-status task counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::InProgress => self.in_progress,
            Status::Completed => self.completed,
        }
    }
}

pub struct TaskStore {
    tasks: Vec<Task>,
    sink: Box<dyn PersistenceSink>,
    key: String,
    policy: UnknownIdPolicy,
    last_persist_error: Option<PersistError>,
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .field("key", &self.key)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Empty store mirroring to `sink` under the default key, ignoring unknown ids
    pub fn new(sink: impl PersistenceSink + 'static) -> Self {
        TaskStore::with_policy(sink, UnknownIdPolicy::default())
    }

    pub fn with_policy(sink: impl PersistenceSink + 'static, policy: UnknownIdPolicy) -> Self {
        TaskStore {
            tasks: Vec::new(),
            sink: Box::new(sink),
            key: DEFAULT_STORAGE_KEY.to_string(),
            policy,
            last_persist_error: None,
        }
    }

    /// Use a different storage key for the mirror
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Build a store from the snapshot previously mirrored under `key`.
    /// Returns `Ok(None)` if nothing was stored yet.
    pub fn load(
        sink: impl PersistenceSink + 'static,
        key: &str,
        policy: UnknownIdPolicy,
    ) -> Result<Option<Self>, StoreError> {
        let Some(snapshot) = sink.read(key)? else {
            return Ok(None);
        };
        let tasks: Vec<Task> = serde_json::from_str(&snapshot)?;
        let mut store = TaskStore::with_policy(sink, policy).with_key(key);
        for task in tasks {
            if store.contains(&task.id) {
                tracing::warn!(id = %task.id, "skipping duplicate id in stored snapshot");
                continue;
            }
            store.tasks.push(task);
        }
        tracing::debug!(key, count = store.len(), "loaded tasks from mirror");
        Ok(Some(store))
    }

    pub fn policy(&self) -> UnknownIdPolicy {
        self.policy
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a new task. The id must not already be present.
    pub fn add(&mut self, task: Task) -> Result<(), StoreError> {
        if self.contains(&task.id) {
            return Err(StoreError::DuplicateId(task.id));
        }
        tracing::info!(id = %task.id, title = %task.title, "task added");
        self.tasks.push(task);
        self.mirror();
        Ok(())
    }

    /// Replace the task with the same id, keeping its position.
    /// Returns whether a record was replaced.
    pub fn update(&mut self, task: Task) -> Result<bool, StoreError> {
        let Some(idx) = self.position(&task.id) else {
            return self.unknown_id("update", task.id);
        };
        tracing::info!(id = %task.id, "task updated");
        self.tasks[idx] = task;
        self.mirror();
        Ok(true)
    }

    /// Delete the task with this id. Returns whether a record was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(idx) = self.position(id) else {
            return self.unknown_id("remove", id.to_string());
        };
        self.tasks.remove(idx);
        tracing::info!(id, "task removed");
        self.mirror();
        Ok(true)
    }

    /// Bulk insert seed records, skipping ids already present.
    /// Mirrors once. Returns the number inserted.
    pub fn populate(&mut self, tasks: impl IntoIterator<Item = Task>) -> usize {
        let mut inserted = 0;
        for task in tasks {
            if self.contains(&task.id) {
                tracing::warn!(id = %task.id, "skipping seed record with duplicate id");
                continue;
            }
            self.tasks.push(task);
            inserted += 1;
        }
        if inserted > 0 {
            tracing::info!(inserted, "store populated");
            self.mirror();
        }
        inserted
    }

    /// Drop every task. Mirrors the empty list.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.mirror();
    }

    fn unknown_id(&self, op: &'static str, id: String) -> Result<bool, StoreError> {
        match self.policy {
            UnknownIdPolicy::Ignore => {
                tracing::debug!(op, id = %id, "unknown task id ignored");
                Ok(false)
            }
            UnknownIdPolicy::Report => Err(StoreError::NotFound(id)),
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Lazy view over tasks matching `predicate`. The iterator is `Clone`, so
    /// it can be restarted without touching the store.
    pub fn filter<P>(&self, predicate: P) -> impl Iterator<Item = &Task> + Clone
    where
        P: Fn(&Task) -> bool + Clone,
    {
        self.tasks.iter().filter(move |t| predicate(*t))
    }

    pub fn filter_status(&self, filter: StatusFilter) -> impl Iterator<Item = &Task> + Clone {
        self.filter(move |t| filter.matches(t))
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in &self.tasks {
            match task.status {
                Status::Pending => counts.pending += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::Completed => counts.completed += 1,
            }
        }
        counts
    }

    // -----------------------------------------------------------------------
    // Mirror
    // -----------------------------------------------------------------------

    /// Most recent mirror failure, if the last write failed
    pub fn last_persist_error(&self) -> Option<&PersistError> {
        self.last_persist_error.as_ref()
    }

    /// Take the pending mirror failure notification
    pub fn take_persist_error(&mut self) -> Option<PersistError> {
        self.last_persist_error.take()
    }

    fn mirror(&mut self) {
        let result = serde_json::to_string(&self.tasks)
            .map_err(PersistError::from)
            .and_then(|snapshot| self.sink.write(&self.key, &snapshot));
        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "could not mirror tasks; continuing in memory");
                self.last_persist_error = Some(e);
            }
        }
    }
}
