use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    /// The display label, also used as the stored value
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    /// Parse a status label. Accepts both `In Progress` and `InProgress`.
    pub fn parse_label(s: &str) -> Option<Status> {
        match s.trim() {
            "Pending" => Some(Status::Pending),
            "In Progress" | "InProgress" => Some(Status::InProgress),
            "Completed" => Some(Status::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse_label(s: &str) -> Option<Priority> {
        match s.trim() {
            "Low" => Some(Priority::Low),
            "Medium" => Some(Priority::Medium),
            "High" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a closed-enum label is not recognized
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Status {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse_label(s).ok_or_else(|| UnknownLabel {
            kind: "status",
            value: s.to_string(),
        })
    }
}

impl FromStr for Priority {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::parse_label(s).ok_or_else(|| UnknownLabel {
            kind: "priority",
            value: s.to_string(),
        })
    }
}

/// A committed task record. Every field is always present.
///
/// Records only reach the store through the creation form, an edit session
/// save, or seeding, so the field rules in `ops::validate` hold for anything
/// created or edited by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique id, assigned once
    pub id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub status: Status,
    pub email: String,
    pub phone_number: String,
    pub url: String,
    #[serde(default)]
    pub is_urgent: bool,
    pub priority: Priority,
    /// Percent complete, 0–100
    #[serde(default)]
    pub progress: u8,
    /// Data URL (`data:<mime>;base64,<payload>`)
    #[serde(default)]
    pub attachment: String,
    /// `#RRGGBB`
    #[serde(default = "default_color")]
    pub color: String,
}

pub const DEFAULT_COLOR: &str = "#000000";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Task {
    /// Create a task with the given id, title, due date and status.
    /// Every other field takes its form default.
    pub fn new(id: impl Into<String>, title: impl Into<String>, due_date: NaiveDate, status: Status) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            due_date,
            status,
            email: String::new(),
            phone_number: String::new(),
            url: String::new(),
            is_urgent: false,
            priority: Priority::Low,
            progress: 0,
            attachment: String::new(),
            color: default_color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in Status::ALL {
            assert_eq!(Status::parse_label(status.label()), Some(status));
        }
        assert_eq!(Status::parse_label("InProgress"), Some(Status::InProgress));
        assert_eq!(Status::parse_label("Done"), None);
    }

    #[test]
    fn priority_from_str_rejects_unknown() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        let err = "Urgent".parse::<Priority>().unwrap_err();
        assert_eq!(err.to_string(), "unknown priority: Urgent");
    }

    #[test]
    fn task_serializes_camel_case() {
        let task = Task::new(
            "1",
            "John Doe",
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            Status::InProgress,
        );
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2026-01-15");
        assert_eq!(json["status"], "In Progress");
        assert_eq!(json["phoneNumber"], "");
        assert_eq!(json["isUrgent"], false);
        assert_eq!(json["color"], "#000000");
    }

    #[test]
    fn task_deserializes_minimal_shape_with_defaults() {
        let json = r#"{
            "id": "7",
            "title": "Water plants",
            "dueDate": "2026-02-01",
            "status": "InProgress",
            "email": "",
            "phoneNumber": "",
            "url": "",
            "priority": "Medium"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.progress, 0);
        assert!(!task.is_urgent);
        assert_eq!(task.color, DEFAULT_COLOR);
    }
}
