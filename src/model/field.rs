use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ops::validate::{self, Rule};

/// The editable fields of a task, in form order.
///
/// The discriminant doubles as the index into [`FIELD_SPECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    DueDate,
    Status,
    Email,
    PhoneNumber,
    Url,
    IsUrgent,
    Priority,
    Progress,
    Attachment,
    Color,
}

/// How a field is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Date,
    Email,
    Tel,
    Url,
    Checkbox,
    Radio,
    Select,
    Range,
    File,
    Color,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Date => "date",
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Url => "url",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Select => "select",
            FieldKind::Range => "range",
            FieldKind::File => "file",
            FieldKind::Color => "color",
        }
    }
}

/// A candidate value for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl FieldValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            FieldValue::Text(_) => ValueShape::Text,
            FieldValue::Flag(_) => ValueShape::Flag,
            FieldValue::Number(_) => ValueShape::Number,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n)
    }
}

/// The storage shape a field's value takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Flag,
    Number,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Text => write!(f, "text"),
            ValueShape::Flag => write!(f, "boolean"),
            ValueShape::Number => write!(f, "integer"),
        }
    }
}

/// Default value for a field, const-constructible for the spec table
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Text(&'static str),
    Flag(bool),
    Number(i64),
}

impl DefaultValue {
    pub fn to_value(self) -> FieldValue {
        match self {
            DefaultValue::Text(s) => FieldValue::Text(s.to_string()),
            DefaultValue::Flag(b) => FieldValue::Flag(b),
            DefaultValue::Number(n) => FieldValue::Number(n),
        }
    }

    pub fn shape(self) -> ValueShape {
        match self {
            DefaultValue::Text(_) => ValueShape::Text,
            DefaultValue::Flag(_) => ValueShape::Flag,
            DefaultValue::Number(_) => ValueShape::Number,
        }
    }
}

/// Everything the form layer knows about one field
#[derive(Debug)]
pub struct FieldSpec {
    pub field: Field,
    /// JSON / wire name
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: DefaultValue,
    pub rule: Rule,
    pub placeholder: Option<&'static str>,
    /// Choices for radio/select fields
    pub options: &'static [&'static str],
    /// Bounds for range fields
    pub range: Option<(i64, i64)>,
    /// Accepted MIME type for file fields
    pub accept: Option<&'static str>,
}

const NO_OPTIONS: &[&str] = &[];
pub const STATUS_OPTIONS: &[&str] = &["Pending", "In Progress", "Completed"];
pub const PRIORITY_OPTIONS: &[&str] = &["Low", "Medium", "High"];

/// Field table, indexed by `Field as usize`.
pub static FIELD_SPECS: [FieldSpec; 11] = [
    FieldSpec {
        field: Field::Title,
        name: "title",
        label: "Task Title",
        kind: FieldKind::Text,
        default: DefaultValue::Text(""),
        rule: Rule::Text(validate::title),
        placeholder: Some("Enter task title"),
        options: NO_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::DueDate,
        name: "dueDate",
        label: "Due Date",
        kind: FieldKind::Date,
        default: DefaultValue::Text(""),
        rule: Rule::Text(validate::due_date),
        placeholder: Some("YYYY-MM-DD"),
        options: NO_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::Status,
        name: "status",
        label: "Status",
        kind: FieldKind::Select,
        default: DefaultValue::Text("Pending"),
        rule: Rule::Text(validate::status),
        placeholder: None,
        options: STATUS_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::Email,
        name: "email",
        label: "Email",
        kind: FieldKind::Email,
        default: DefaultValue::Text(""),
        rule: Rule::Text(validate::email),
        placeholder: None,
        options: NO_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::PhoneNumber,
        name: "phoneNumber",
        label: "Phone Number",
        kind: FieldKind::Tel,
        default: DefaultValue::Text(""),
        rule: Rule::Text(validate::phone_number),
        placeholder: Some("e.g., 123-456-7890 or +12345678901"),
        options: NO_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::Url,
        name: "url",
        label: "URL",
        kind: FieldKind::Url,
        default: DefaultValue::Text(""),
        rule: Rule::Text(validate::url),
        placeholder: Some("e.g., https://example.com"),
        options: NO_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::IsUrgent,
        name: "isUrgent",
        label: "Urgent Task",
        kind: FieldKind::Checkbox,
        default: DefaultValue::Flag(false),
        rule: Rule::Flag(validate::is_urgent),
        placeholder: None,
        options: NO_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::Priority,
        name: "priority",
        label: "Priority",
        kind: FieldKind::Radio,
        default: DefaultValue::Text("Low"),
        rule: Rule::Text(validate::priority),
        placeholder: None,
        options: PRIORITY_OPTIONS,
        range: None,
        accept: None,
    },
    FieldSpec {
        field: Field::Progress,
        name: "progress",
        label: "Progress (%)",
        kind: FieldKind::Range,
        default: DefaultValue::Number(0),
        rule: Rule::Number(validate::progress),
        placeholder: None,
        options: NO_OPTIONS,
        range: Some((0, 100)),
        accept: None,
    },
    FieldSpec {
        field: Field::Attachment,
        name: "attachment",
        label: "Attachment",
        kind: FieldKind::File,
        default: DefaultValue::Text(""),
        rule: Rule::Text(validate::attachment),
        placeholder: None,
        options: NO_OPTIONS,
        range: None,
        accept: Some("application/pdf"),
    },
    FieldSpec {
        field: Field::Color,
        name: "color",
        label: "Color",
        kind: FieldKind::Color,
        default: DefaultValue::Text("#000000"),
        rule: Rule::Text(validate::color),
        placeholder: None,
        options: NO_OPTIONS,
        range: None,
        accept: None,
    },
];

/// Error type for field lookups and value conversion
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("{field} expects a {expected} value, got {actual}")]
    KindMismatch {
        field: Field,
        expected: ValueShape,
        actual: ValueShape,
    },
    #[error("invalid {expected} for {field}: {input}")]
    InvalidInput {
        field: Field,
        expected: ValueShape,
        input: String,
    },
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Title,
        Field::DueDate,
        Field::Status,
        Field::Email,
        Field::PhoneNumber,
        Field::Url,
        Field::IsUrgent,
        Field::Priority,
        Field::Progress,
        Field::Attachment,
        Field::Color,
    ];

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_SPECS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn kind(self) -> FieldKind {
        self.spec().kind
    }

    pub fn shape(self) -> ValueShape {
        self.spec().default.shape()
    }

    pub fn default_value(self) -> FieldValue {
        self.spec().default.to_value()
    }

    /// Look up a field by its wire name. Also accepts snake_case and
    /// kebab-case spellings (`due_date`, `phone-number`).
    pub fn from_name(name: &str) -> Result<Field, FieldError> {
        let folded: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Field::ALL
            .into_iter()
            .find(|f| f.name().to_lowercase() == folded)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))
    }

    /// Convert textual input into a value of this field's shape.
    pub fn parse_input(self, input: &str) -> Result<FieldValue, FieldError> {
        match self.shape() {
            ValueShape::Text => Ok(FieldValue::Text(input.to_string())),
            ValueShape::Flag => match input.trim().to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => Ok(FieldValue::Flag(true)),
                "false" | "no" | "n" | "0" | "off" => Ok(FieldValue::Flag(false)),
                _ => Err(FieldError::InvalidInput {
                    field: self,
                    expected: ValueShape::Flag,
                    input: input.to_string(),
                }),
            },
            ValueShape::Number => input
                .trim()
                .parse::<i64>()
                .map(FieldValue::Number)
                .map_err(|_| FieldError::InvalidInput {
                    field: self,
                    expected: ValueShape::Number,
                    input: input.to_string(),
                }),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
