use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::ops::seed::StatusStrategy;
use crate::ops::store::StatusFilter;

#[derive(Parser)]
#[command(name = "td", about = concat!("td v", env!("CARGO_PKG_VERSION"), " - validated task records"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Data directory (default: $TASKDESK_DIR or ./.taskdesk)
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a task; prints its id
    Add(AddArgs),
    /// Edit fields of an existing task
    Edit(EditArgs),
    /// Delete a task
    Delete(DeleteArgs),
    /// List tasks
    List(ListArgs),
    /// Show one task
    Show(ShowArgs),
    /// Task counts per status
    Counts,
    /// Load tasks from a seed file or the built-in samples
    Seed(SeedArgs),
    /// Describe the task form fields
    Fields,
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Field values shared by `add` and `edit`
#[derive(Args, Default)]
pub struct FieldArgs {
    /// Task title (3-50 characters)
    #[arg(long)]
    pub title: Option<String>,
    /// Due date, YYYY-MM-DD (today or later)
    #[arg(long = "due", value_name = "DATE")]
    pub due_date: Option<String>,
    /// Pending, "In Progress" or Completed
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// e.g. 123-456-7890 or +12345678901
    #[arg(long = "phone", value_name = "PHONE")]
    pub phone_number: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    /// Mark as urgent
    #[arg(long, conflicts_with = "not_urgent")]
    pub urgent: bool,
    /// Clear the urgent flag
    #[arg(long)]
    pub not_urgent: bool,
    /// Low, Medium or High
    #[arg(long)]
    pub priority: Option<String>,
    /// Percent complete, 0-100
    #[arg(long, allow_hyphen_values = true)]
    pub progress: Option<String>,
    /// Attachment as a data URL (data:application/pdf;base64,...)
    #[arg(long, value_name = "DATA_URL", conflicts_with = "attach_file")]
    pub attachment: Option<String>,
    /// Read the attachment from a file
    #[arg(long, value_name = "PATH")]
    pub attach_file: Option<PathBuf>,
    /// Hex color, #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
    /// Set any field by name (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,
}

#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// All, Pending, "In Progress" or Completed
    #[arg(long, default_value = "All")]
    pub status: StatusFilter,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Seed args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SeedArgs {
    /// JSON array of task or todo records (default: seed.file, else the samples)
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Keep at most N records
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
    /// Status for incomplete todos: pending, alternate, random
    #[arg(long)]
    pub status_strategy: Option<StatusStrategy>,
    /// Drop existing tasks first
    #[arg(long)]
    pub replace: bool,
}
