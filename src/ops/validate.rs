//! Field validation rules.
//!
//! One rule per field, no cross-field checks. Rules are plain functions
//! referenced from the field table in `model::field`; [`validate_field`]
//! dispatches through that table.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use indexmap::IndexMap;
use regex::Regex;

use crate::model::attachment::{PDF_MIME, declared_mime};
use crate::model::draft::TaskDraft;
use crate::model::field::{Field, FieldValue, ValueShape};
use crate::model::task::{Priority, Status};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 50;
pub const PROGRESS_MIN: i64 = 0;
pub const PROGRESS_MAX: i64 = 100;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9][0-9]{1,14}$|^[0-9]{3}-[0-9]{3}-[0-9]{4}$").expect("phone pattern")
});
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://)[^\s/$.?#].[^\s]*$").expect("url pattern"));
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern"));

/// Per-field error messages, in the order they were recorded
pub type FieldErrors = IndexMap<Field, String>;

/// A field's validator, typed by the shape of value it accepts
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Text(fn(&str, &ValidationContext) -> Result<(), &'static str>),
    Flag(fn(bool) -> Result<(), &'static str>),
    Number(fn(i64) -> Result<(), &'static str>),
}

impl Rule {
    pub fn shape(self) -> ValueShape {
        match self {
            Rule::Text(_) => ValueShape::Text,
            Rule::Flag(_) => ValueShape::Flag,
            Rule::Number(_) => ValueShape::Number,
        }
    }
}

/// Inputs a rule may depend on besides the value itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    /// Context for the current local date
    pub fn today() -> Self {
        ValidationContext {
            today: Local::now().date_naive(),
        }
    }

    pub fn on(today: NaiveDate) -> Self {
        ValidationContext { today }
    }
}

/// Validate one candidate value for a field.
pub fn validate_field(field: Field, value: &FieldValue, ctx: &ValidationContext) -> Result<(), String> {
    let outcome = match (field.spec().rule, value) {
        (Rule::Text(rule), FieldValue::Text(s)) => rule(s, ctx),
        (Rule::Flag(rule), FieldValue::Flag(b)) => rule(*b),
        (Rule::Number(rule), FieldValue::Number(n)) => rule(*n),
        _ => return Err(format!("Invalid value for {}", field.label())),
    };
    outcome.map_err(str::to_string)
}

/// Re-check one field and update its entry in `errors`.
/// Returns true if the field is valid.
pub fn refresh_error(
    errors: &mut FieldErrors,
    field: Field,
    value: &FieldValue,
    ctx: &ValidationContext,
) -> bool {
    match validate_field(field, value, ctx) {
        Ok(()) => {
            errors.shift_remove(&field);
            true
        }
        Err(msg) => {
            errors.insert(field, msg);
            false
        }
    }
}

/// Validate every field of a draft, in field order.
pub fn validate_draft(draft: &TaskDraft, ctx: &ValidationContext) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in Field::ALL {
        if let Err(msg) = validate_field(field, &draft.get(field), ctx) {
            errors.insert(field, msg);
        }
    }
    errors
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub fn title(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    let len = s.chars().count();
    if len == 0 {
        Err("Task title is required")
    } else if len < TITLE_MIN {
        Err("Task title must be at least 3 characters")
    } else if len > TITLE_MAX {
        Err("Task title cannot exceed 50 characters")
    } else {
        Ok(())
    }
}

pub fn due_date(s: &str, ctx: &ValidationContext) -> Result<(), &'static str> {
    if s.trim().is_empty() {
        return Err("Due date is required");
    }
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| "Invalid due date (expected YYYY-MM-DD)")?;
    if date < ctx.today {
        return Err("Due date cannot be in the past");
    }
    Ok(())
}

pub fn status(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    Status::parse_label(s).map(|_| ()).ok_or("Invalid status")
}

pub fn email(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    if EMAIL_RE.is_match(s) {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

pub fn phone_number(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    if PHONE_RE.is_match(s) {
        Ok(())
    } else {
        Err("Invalid phone number format (e.g., 123-456-7890 or +12345678901)")
    }
}

pub fn url(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    if URL_RE.is_match(s) {
        Ok(())
    } else {
        Err("Invalid URL format (e.g., https://example.com)")
    }
}

pub fn is_urgent(_flag: bool) -> Result<(), &'static str> {
    Ok(())
}

pub fn priority(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    Priority::parse_label(s).map(|_| ()).ok_or("Invalid priority")
}

pub fn progress(n: i64) -> Result<(), &'static str> {
    if n < PROGRESS_MIN {
        Err("Progress must be at least 0")
    } else if n > PROGRESS_MAX {
        Err("Progress cannot exceed 100")
    } else {
        Ok(())
    }
}

pub fn attachment(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    if s.trim().is_empty() {
        return Err("Attachment is required");
    }
    match declared_mime(s) {
        Some(mime) if !mime.eq_ignore_ascii_case(PDF_MIME) => {
            Err("Attachment must be a PDF (application/pdf)")
        }
        _ => Ok(()),
    }
}

pub fn color(s: &str, _ctx: &ValidationContext) -> Result<(), &'static str> {
    if COLOR_RE.is_match(s) {
        Ok(())
    } else {
        Err("Invalid hex color (e.g., #FF0000)")
    }
}
