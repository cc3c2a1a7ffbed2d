use serde::Serialize;

use crate::model::attachment::DataUrl;
use crate::model::field::{Field, FieldSpec};
use crate::model::task::{Status, Task};
use crate::ops::store::StatusCounts;
use crate::ops::validate::FieldErrors;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub filter: String,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct CountsJson {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: usize,
}

#[derive(Serialize)]
pub struct FieldSpecJson {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
    pub default: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(i64, i64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<&'static str>,
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

#[derive(Serialize)]
pub struct SeedResultJson {
    pub read: usize,
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
pub struct FieldErrorsJson<'a> {
    pub errors: &'a FieldErrors,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn counts_to_json(counts: StatusCounts) -> CountsJson {
    CountsJson {
        counts,
        total: counts.total(),
    }
}

pub fn field_spec_to_json(spec: &FieldSpec) -> FieldSpecJson {
    FieldSpecJson {
        name: spec.name,
        label: spec.label,
        kind: spec.kind.name(),
        default: serde_json::to_value(spec.default.to_value()).unwrap_or(serde_json::Value::Null),
        placeholder: spec.placeholder,
        options: spec.options,
        range: spec.range,
        accept: spec.accept,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Pending => "[ ]",
        Status::InProgress => "[>]",
        Status::Completed => "[x]",
    }
}

/// One-line summary: `[>] 2 Jane Smith (due 2026-03-22, Medium, urgent)`
pub fn format_task_line(task: &Task) -> String {
    let urgent = if task.is_urgent { ", urgent" } else { "" };
    format!(
        "{} {} {} (due {}, {}{})",
        status_marker(task.status),
        task.id,
        task.title,
        task.due_date,
        task.priority,
        urgent
    )
}

/// Detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![format!("{} {} {}", status_marker(task.status), task.id, task.title)];
    let mut push = |label: &str, value: String| lines.push(format!("{:<11} {}", format!("{}:", label), value));
    push("status", task.status.to_string());
    push("due", task.due_date.to_string());
    push("email", task.email.clone());
    push("phone", task.phone_number.clone());
    push("url", task.url.clone());
    push("urgent", if task.is_urgent { "yes" } else { "no" }.to_string());
    push("priority", task.priority.to_string());
    push("progress", format!("{}%", task.progress));
    push("attachment", describe_attachment(&task.attachment));
    push("color", task.color.clone());
    lines
}

fn describe_attachment(attachment: &str) -> String {
    if attachment.is_empty() {
        return "none".to_string();
    }
    match DataUrl::parse(attachment) {
        Some(data) => format!(
            "{} ({} chars)",
            data.mime.unwrap_or("unknown type"),
            data.payload.len()
        ),
        None => "not a data URL".to_string(),
    }
}

/// `pending 1 | in progress 0 | completed 0 | total 1`
pub fn format_counts(counts: StatusCounts) -> String {
    let per_status: Vec<String> = Status::ALL
        .into_iter()
        .map(|s| format!("{} {}", s.label().to_lowercase(), counts.get(s)))
        .collect();
    format!("{} | total {}", per_status.join(" | "), counts.total())
}

/// The field table, one row per field
pub fn format_field_table() -> Vec<String> {
    let mut lines = vec![format!("{:<12} {:<12} {:<9} {}", "NAME", "LABEL", "KIND", "DEFAULT")];
    for field in Field::ALL {
        let spec = field.spec();
        let default = match spec.default.to_value().to_string() {
            s if s.is_empty() => "-".to_string(),
            s => s,
        };
        lines.push(
            format!("{:<12} {:<12} {:<9} {}", spec.name, spec.label, spec.kind.name(), default)
                .trim_end()
                .to_string(),
        );
    }
    lines
}

/// `field: message` lines, in field order
pub fn format_field_errors(errors: &FieldErrors) -> Vec<String> {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect()
}
