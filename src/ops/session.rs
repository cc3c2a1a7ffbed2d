//! Edit session for one stored task.
//!
//! `Viewing` holds nothing. `begin` copies the stored task into a draft;
//! field changes re-check only that field; `save` re-checks everything and
//! commits through `TaskStore::update`; `cancel` throws the draft away.

use crate::model::draft::TaskDraft;
use crate::model::field::{Field, FieldError, FieldValue};
use crate::model::task::Task;
use crate::ops::store::{StoreError, TaskStore};
use crate::ops::validate::{FieldErrors, ValidationContext, refresh_error, validate_draft};

/// Error type for edit session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("task {0} is already being edited")]
    AlreadyEditing(String),
    #[error("task {0} is not being edited")]
    NotEditing(String),
    #[error("save blocked: {} invalid field(s)", .0.len())]
    SaveBlocked(FieldErrors),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Viewing,
    Editing { draft: TaskDraft, errors: FieldErrors },
}

#[derive(Debug, Clone)]
pub struct EditSession {
    task_id: String,
    state: SessionState,
}

impl EditSession {
    pub fn new(task_id: impl Into<String>) -> Self {
        EditSession {
            task_id: task_id.into(),
            state: SessionState::Viewing,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&TaskDraft> {
        match &self.state {
            SessionState::Editing { draft, .. } => Some(draft),
            SessionState::Viewing => None,
        }
    }

    /// Current per-field errors (empty while viewing)
    pub fn errors(&self) -> Option<&FieldErrors> {
        match &self.state {
            SessionState::Editing { errors, .. } => Some(errors),
            SessionState::Viewing => None,
        }
    }

    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.errors()?.get(&field).map(String::as_str)
    }

    /// Viewing → Editing, with the draft copied from the stored task.
    pub fn begin(&mut self, store: &TaskStore) -> Result<(), SessionError> {
        if self.is_editing() {
            return Err(SessionError::AlreadyEditing(self.task_id.clone()));
        }
        let task = store
            .get(&self.task_id)
            .ok_or_else(|| SessionError::TaskNotFound(self.task_id.clone()))?;
        self.state = SessionState::Editing {
            draft: TaskDraft::from(task),
            errors: FieldErrors::new(),
        };
        tracing::debug!(id = %self.task_id, "edit started");
        Ok(())
    }

    /// Change one draft field and re-check that field only.
    /// Returns whether the new value is valid.
    pub fn set_field(
        &mut self,
        field: Field,
        value: FieldValue,
        ctx: &ValidationContext,
    ) -> Result<bool, SessionError> {
        let SessionState::Editing { draft, errors } = &mut self.state else {
            return Err(SessionError::NotEditing(self.task_id.clone()));
        };
        draft.set(field, value.clone())?;
        Ok(refresh_error(errors, field, &value, ctx))
    }

    /// Validate the whole draft and commit it if clean.
    ///
    /// On failure the error map is replaced with the full sweep and the
    /// session stays in Editing. On success the committed task is returned
    /// and the session is back in Viewing.
    pub fn save(&mut self, store: &mut TaskStore, ctx: &ValidationContext) -> Result<Task, SessionError> {
        let SessionState::Editing { draft, errors } = &mut self.state else {
            return Err(SessionError::NotEditing(self.task_id.clone()));
        };

        let sweep = validate_draft(draft, ctx);
        if !sweep.is_empty() {
            tracing::debug!(id = %self.task_id, invalid = sweep.len(), "save blocked");
            *errors = sweep.clone();
            return Err(SessionError::SaveBlocked(sweep));
        }

        let task = draft.to_task(self.task_id.clone()).map_err(|e| {
            let mut blocked = FieldErrors::new();
            blocked.insert(e.field, e.to_string());
            SessionError::SaveBlocked(blocked)
        })?;

        if !store.update(task.clone())? {
            // The task vanished while editing; stay in Editing with the draft intact.
            return Err(SessionError::TaskNotFound(self.task_id.clone()));
        }
        self.state = SessionState::Viewing;
        Ok(task)
    }

    /// Drop the draft and errors, back to Viewing. Never touches the store.
    pub fn cancel(&mut self) {
        if self.is_editing() {
            tracing::debug!(id = %self.task_id, "edit cancelled");
        }
        self.state = SessionState::Viewing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemorySink;
    use crate::model::task::{Priority, Status};
    use crate::ops::store::UnknownIdPolicy;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ctx() -> ValidationContext {
        ValidationContext::on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    fn stored_task(id: &str) -> Task {
        Task {
            id: id.into(),
            title: "John Doe".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 11, 15).unwrap(),
            status: Status::Pending,
            email: "john@example.com".into(),
            phone_number: "123-456-7890".into(),
            url: "https://johndoe.com".into(),
            is_urgent: true,
            priority: Priority::High,
            progress: 10,
            attachment: "data:application/pdf;base64,example1".into(),
            color: "#FF0000".into(),
        }
    }

    fn store_with(sink: &MemorySink, ids: &[&str]) -> TaskStore {
        let mut store = TaskStore::new(sink.clone());
        for id in ids {
            store.add(stored_task(id)).unwrap();
        }
        store
    }

    #[test]
    fn begin_copies_stored_task() {
        let sink = MemorySink::new();
        let store = store_with(&sink, &["1"]);
        let mut session = EditSession::new("1");
        assert!(!session.is_editing());
        assert!(session.draft().is_none());

        session.begin(&store).unwrap();
        assert!(session.is_editing());
        assert_eq!(session.draft().unwrap(), &TaskDraft::from(&stored_task("1")));
        assert!(session.errors().unwrap().is_empty());
    }

    #[test]
    fn begin_missing_task_fails() {
        let store = store_with(&MemorySink::new(), &["1"]);
        let mut session = EditSession::new("9");
        assert!(matches!(
            session.begin(&store),
            Err(SessionError::TaskNotFound(_))
        ));
        assert!(!session.is_editing());
    }

    #[test]
    fn begin_twice_fails() {
        let store = store_with(&MemorySink::new(), &["1"]);
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        assert!(matches!(
            session.begin(&store),
            Err(SessionError::AlreadyEditing(_))
        ));
    }

    #[test]
    fn set_field_requires_editing() {
        let mut session = EditSession::new("1");
        let err = session
            .set_field(Field::Title, "New title".into(), &ctx())
            .unwrap_err();
        assert!(matches!(err, SessionError::NotEditing(_)));
    }

    #[test]
    fn live_validation_tracks_latest_value() {
        let store = store_with(&MemorySink::new(), &["1"]);
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();

        assert!(!session.set_field(Field::Email, "bad".into(), &ctx()).unwrap());
        assert_eq!(session.error_for(Field::Email), Some("Invalid email format"));
        assert!(!session.set_field(Field::Title, "ab".into(), &ctx()).unwrap());
        assert_eq!(session.errors().unwrap().len(), 2);

        assert!(session.set_field(Field::Email, "ok@example.com".into(), &ctx()).unwrap());
        assert_eq!(session.error_for(Field::Email), None);
        assert_eq!(
            session.error_for(Field::Title),
            Some("Task title must be at least 3 characters")
        );
        assert_eq!(session.draft().unwrap().email, "ok@example.com");
    }

    #[test]
    fn set_field_wrong_shape_leaves_draft_alone() {
        let store = store_with(&MemorySink::new(), &["1"]);
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        let before = session.draft().unwrap().clone();
        let err = session
            .set_field(Field::Progress, "lots".into(), &ctx())
            .unwrap_err();
        assert!(matches!(err, SessionError::Field(_)));
        assert_eq!(session.draft().unwrap(), &before);
    }

    #[test]
    fn save_with_one_invalid_field_blocks() {
        let sink = MemorySink::new();
        let mut store = store_with(&sink, &["1"]);
        let writes_before = sink.writes();
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        session
            .set_field(Field::Email, "not-an-email".into(), &ctx())
            .unwrap();

        let err = session.save(&mut store, &ctx()).unwrap_err();
        let SessionError::SaveBlocked(errors) = err else {
            panic!("expected SaveBlocked");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key(&Field::Email));

        assert!(session.is_editing());
        assert_eq!(session.errors().unwrap().len(), 1);
        assert_eq!(store.get("1").unwrap(), &stored_task("1"));
        assert_eq!(sink.writes(), writes_before);
    }

    #[test]
    fn save_sweeps_untouched_fields_too() {
        let mut store = TaskStore::new(MemorySink::new());
        // Seeded data can carry a due date that is already past
        let mut old = stored_task("1");
        old.due_date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        store.populate([old]);

        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        session.set_field(Field::Progress, 60i64.into(), &ctx()).unwrap();
        assert!(session.errors().unwrap().is_empty());

        let err = session.save(&mut store, &ctx()).unwrap_err();
        assert!(matches!(err, SessionError::SaveBlocked(ref e) if e.contains_key(&Field::DueDate)));
        assert_eq!(
            session.error_for(Field::DueDate),
            Some("Due date cannot be in the past")
        );
    }

    #[test]
    fn save_error_map_reflects_current_draft() {
        let mut store = store_with(&MemorySink::new(), &["1"]);
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        session.set_field(Field::Title, "ab".into(), &ctx()).unwrap();
        session.set_field(Field::Title, "Fixed title".into(), &ctx()).unwrap();
        session.set_field(Field::Color, "red".into(), &ctx()).unwrap();

        let _ = session.save(&mut store, &ctx());
        let fields: Vec<Field> = session.errors().unwrap().keys().copied().collect();
        assert_eq!(fields, vec![Field::Color]);
    }

    #[test]
    fn successful_save_commits_and_returns_to_viewing() {
        let sink = MemorySink::new();
        let mut store = store_with(&sink, &["1", "2", "3"]);
        let mut session = EditSession::new("2");
        session.begin(&store).unwrap();
        session.set_field(Field::Title, "Renamed task".into(), &ctx()).unwrap();
        session.set_field(Field::Status, "Completed".into(), &ctx()).unwrap();
        session.set_field(Field::Progress, 100i64.into(), &ctx()).unwrap();

        let saved = session.save(&mut store, &ctx()).unwrap();
        assert_eq!(saved.id, "2");
        assert_eq!(saved.title, "Renamed task");
        assert_eq!(saved.status, Status::Completed);
        assert!(!session.is_editing());
        assert!(session.errors().is_none());

        let ids: Vec<&str> = store.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(store.get("2").unwrap(), &saved);
        assert_eq!(sink.writes(), 4);
    }

    #[test]
    fn cancel_discards_draft_without_touching_store() {
        let sink = MemorySink::new();
        let store = store_with(&sink, &["1"]);
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        session.set_field(Field::Title, "Changed".into(), &ctx()).unwrap();
        session.set_field(Field::Email, "bad".into(), &ctx()).unwrap();

        session.cancel();
        assert!(!session.is_editing());
        assert!(session.draft().is_none());
        assert_eq!(store.get("1").unwrap(), &stored_task("1"));
        assert_eq!(sink.writes(), 1);

        // A fresh begin starts from the stored value again
        session.begin(&store).unwrap();
        assert_eq!(session.draft().unwrap().title, "John Doe");
        assert!(session.errors().unwrap().is_empty());
    }

    #[test]
    fn save_after_task_deleted_keeps_editing() {
        let mut store = store_with(&MemorySink::new(), &["1"]);
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        store.remove("1").unwrap();

        let err = session.save(&mut store, &ctx()).unwrap_err();
        assert!(matches!(err, SessionError::TaskNotFound(_)));
        assert!(session.is_editing());
        assert!(store.is_empty());
    }

    #[test]
    fn save_after_task_deleted_reports_store_error_under_report_policy() {
        let mut store = TaskStore::with_policy(MemorySink::new(), UnknownIdPolicy::Report);
        store.add(stored_task("1")).unwrap();
        let mut session = EditSession::new("1");
        session.begin(&store).unwrap();
        store.remove("1").unwrap();

        let err = session.save(&mut store, &ctx()).unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::NotFound(_))));
        assert!(session.is_editing());
    }

    #[test]
    fn save_while_viewing_fails() {
        let mut store = store_with(&MemorySink::new(), &["1"]);
        let mut session = EditSession::new("1");
        assert!(matches!(
            session.save(&mut store, &ctx()),
            Err(SessionError::NotEditing(_))
        ));
    }
}
