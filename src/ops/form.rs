use uuid::Uuid;

use crate::model::draft::TaskDraft;
use crate::model::field::{Field, FieldError, FieldValue};
use crate::model::task::Task;
use crate::ops::store::{StoreError, TaskStore};
use crate::ops::validate::{FieldErrors, ValidationContext, refresh_error, validate_draft};

/// Error type for new-task submission
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("task not created: {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Source of ids for new tasks
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random UUID v4 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `prefix-1`, `prefix-2`, ... (deterministic, for tests and demos)
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// The new-task form: a fresh draft plus its live errors.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    draft: TaskDraft,
    errors: FieldErrors,
}

impl TaskForm {
    pub fn new() -> Self {
        TaskForm::default()
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Change one field and re-check it. Returns whether the value is valid.
    pub fn set_field(
        &mut self,
        field: Field,
        value: FieldValue,
        ctx: &ValidationContext,
    ) -> Result<bool, FormError> {
        self.draft.set(field, value.clone())?;
        Ok(refresh_error(&mut self.errors, field, &value, ctx))
    }

    /// Validate everything and, if clean, add a new task to the store.
    ///
    /// On failure the draft is kept as typed and every error is reported.
    /// On success the form goes back to its defaults.
    pub fn submit(
        &mut self,
        store: &mut TaskStore,
        ids: &mut dyn IdGenerator,
        ctx: &ValidationContext,
    ) -> Result<Task, FormError> {
        let sweep = validate_draft(&self.draft, ctx);
        if !sweep.is_empty() {
            self.errors = sweep.clone();
            return Err(FormError::Invalid(sweep));
        }

        let id = ids.next_id();
        let task = self.draft.to_task(id).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.insert(e.field, e.to_string());
            FormError::Invalid(errors)
        })?;
        store.add(task.clone())?;
        self.reset();
        Ok(task)
    }

    /// Back to the empty defaults
    pub fn reset(&mut self) {
        self.draft = TaskDraft::default();
        self.errors.clear();
    }
}
