use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::field::{Field, FieldError, FieldValue};
use crate::model::task::{DEFAULT_COLOR, Priority, Status, Task};

/// Editable, loosely typed copy of a task's fields.
///
/// Text fields hold raw input so that a bad status or an out-of-range
/// progress can sit in the draft (and be reported) until it is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub due_date: String,
    pub status: String,
    pub email: String,
    pub phone_number: String,
    pub url: String,
    pub is_urgent: bool,
    pub priority: String,
    pub progress: i64,
    pub attachment: String,
    pub color: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        TaskDraft {
            title: String::new(),
            due_date: String::new(),
            status: Status::Pending.label().to_string(),
            email: String::new(),
            phone_number: String::new(),
            url: String::new(),
            is_urgent: false,
            priority: Priority::Low.label().to_string(),
            progress: 0,
            attachment: String::new(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Error converting a draft into a task
#[derive(Debug, thiserror::Error)]
#[error("draft field {field} does not hold a valid value: {value}")]
pub struct DraftConversionError {
    pub field: Field,
    pub value: String,
}

impl TaskDraft {
    /// Current value of a field
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Title => FieldValue::Text(self.title.clone()),
            Field::DueDate => FieldValue::Text(self.due_date.clone()),
            Field::Status => FieldValue::Text(self.status.clone()),
            Field::Email => FieldValue::Text(self.email.clone()),
            Field::PhoneNumber => FieldValue::Text(self.phone_number.clone()),
            Field::Url => FieldValue::Text(self.url.clone()),
            Field::IsUrgent => FieldValue::Flag(self.is_urgent),
            Field::Priority => FieldValue::Text(self.priority.clone()),
            Field::Progress => FieldValue::Number(self.progress),
            Field::Attachment => FieldValue::Text(self.attachment.clone()),
            Field::Color => FieldValue::Text(self.color.clone()),
        }
    }

    /// Replace a field's value. The value must have the field's shape.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), FieldError> {
        let mismatch = |actual: &FieldValue| FieldError::KindMismatch {
            field,
            expected: field.shape(),
            actual: actual.shape(),
        };
        match (field, value) {
            (Field::IsUrgent, FieldValue::Flag(b)) => self.is_urgent = b,
            (Field::Progress, FieldValue::Number(n)) => self.progress = n,
            (_, FieldValue::Text(s)) => match self.text_slot(field) {
                Some(slot) => *slot = s,
                None => return Err(mismatch(&FieldValue::Text(s))),
            },
            (_, other) => return Err(mismatch(&other)),
        }
        Ok(())
    }

    fn text_slot(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::DueDate => Some(&mut self.due_date),
            Field::Status => Some(&mut self.status),
            Field::Email => Some(&mut self.email),
            Field::PhoneNumber => Some(&mut self.phone_number),
            Field::Url => Some(&mut self.url),
            Field::Priority => Some(&mut self.priority),
            Field::Attachment => Some(&mut self.attachment),
            Field::Color => Some(&mut self.color),
            Field::IsUrgent | Field::Progress => None,
        }
    }

    /// Convert into a committed task with the given id.
    ///
    /// Only the closed fields (due date, status, priority, progress) can
    /// fail here; run the validation sweep first to get user-facing messages.
    pub fn to_task(&self, id: impl Into<String>) -> Result<Task, DraftConversionError> {
        let bad = |field: Field, value: String| DraftConversionError { field, value };
        let due_date = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d")
            .map_err(|_| bad(Field::DueDate, self.due_date.clone()))?;
        let status =
            Status::parse_label(&self.status).ok_or_else(|| bad(Field::Status, self.status.clone()))?;
        let priority = Priority::parse_label(&self.priority)
            .ok_or_else(|| bad(Field::Priority, self.priority.clone()))?;
        let progress = u8::try_from(self.progress)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| bad(Field::Progress, self.progress.to_string()))?;

        Ok(Task {
            id: id.into(),
            title: self.title.clone(),
            due_date,
            status,
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            url: self.url.clone(),
            is_urgent: self.is_urgent,
            priority,
            progress,
            attachment: self.attachment.clone(),
            color: self.color.clone(),
        })
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        TaskDraft {
            title: task.title.clone(),
            due_date: task.due_date.format("%Y-%m-%d").to_string(),
            status: task.status.label().to_string(),
            email: task.email.clone(),
            phone_number: task.phone_number.clone(),
            url: task.url.clone(),
            is_urgent: task.is_urgent,
            priority: task.priority.label().to_string(),
            progress: i64::from(task.progress),
            attachment: task.attachment.clone(),
            color: task.color.clone(),
        }
    }
}
