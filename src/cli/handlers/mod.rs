mod seed;
pub use seed::cmd_seed;

use std::error::Error;
use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::logging;
use crate::io::storage::JsonFileSink;
use crate::model::attachment::DataUrl;
use crate::model::config::AppConfig;
use crate::model::field::{Field, FieldValue};
use crate::ops::form::{FormError, TaskForm, UuidIds};
use crate::ops::session::{EditSession, SessionError};
use crate::ops::store::TaskStore;
use crate::ops::validate::{FieldErrors, ValidationContext};

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "TASKDESK_DIR";
pub const DEFAULT_DATA_DIR: &str = ".taskdesk";

type CmdResult = Result<(), Box<dyn Error>>;

/// Resolved data directory plus its config
pub struct Workspace {
    pub dir: PathBuf,
    pub config: AppConfig,
}

impl Workspace {
    pub fn open(flag: Option<PathBuf>) -> Result<Workspace, Box<dyn Error>> {
        let dir = flag
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let config = config_io::read_config(&dir)?;
        Ok(Workspace { dir, config })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let ws = Workspace::open(cli.data_dir)?;
    logging::init(&ws.config.log.level);

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(&ws, args, json),
        Commands::Show(args) => cmd_show(&ws, args, json),
        Commands::Counts => cmd_counts(&ws, json),
        Commands::Fields => cmd_fields(json),

        // Write commands
        Commands::Add(args) => cmd_add(&ws, args, json),
        Commands::Edit(args) => cmd_edit(&ws, args, json),
        Commands::Delete(args) => cmd_delete(&ws, args, json),
        Commands::Seed(args) => cmd_seed(&ws, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the mirrored store, seeding it on first use.
///
/// An unreadable or corrupt mirror is not fatal: the command runs against an
/// empty store and the next successful change rewrites the mirror.
/// Callers hold the data-dir lock, since first use may write the mirror.
fn open_store(ws: &Workspace) -> TaskStore {
    let sink = JsonFileSink::new(&ws.dir);
    let key = ws.config.storage.key.as_str();
    let policy = ws.config.store.unknown_id;
    match TaskStore::load(sink.clone(), key, policy) {
        Ok(Some(store)) => return store,
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring stored tasks");
            eprintln!("warning: {} (starting with no tasks)", e);
            return TaskStore::with_policy(sink, policy).with_key(key);
        }
    }
    let mut store = TaskStore::with_policy(sink, policy).with_key(key);
    seed::initial_seed(&mut store, ws);
    store
}

/// Mirror failures never fail a command, but the user hears about them
fn warn_persist(store: &mut TaskStore) {
    if let Some(e) = store.take_persist_error() {
        eprintln!("warning: {} (change kept in memory only)", e);
    }
}

/// Print field errors and turn them into the command's error
fn field_errors(errors: &FieldErrors, json: bool) -> Box<dyn Error> {
    if json {
        if let Ok(out) = serde_json::to_string_pretty(&FieldErrorsJson { errors }) {
            println!("{}", out);
        }
    } else {
        for line in format_field_errors(errors) {
            eprintln!("{}", line);
        }
    }
    format!("task not saved: {} invalid field(s)", errors.len()).into()
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn the field flags into (field, value) pairs, in flag order
fn collect_assignments(args: FieldArgs) -> Result<Vec<(Field, FieldValue)>, Box<dyn Error>> {
    let mut out = Vec::new();
    let texts = [
        (Field::Title, args.title),
        (Field::DueDate, args.due_date),
        (Field::Status, args.status),
        (Field::Email, args.email),
        (Field::PhoneNumber, args.phone_number),
        (Field::Url, args.url),
        (Field::Priority, args.priority),
        (Field::Attachment, args.attachment),
        (Field::Color, args.color),
    ];
    for (field, value) in texts {
        if let Some(v) = value {
            out.push((field, FieldValue::Text(v)));
        }
    }
    if args.urgent {
        out.push((Field::IsUrgent, FieldValue::Flag(true)));
    } else if args.not_urgent {
        out.push((Field::IsUrgent, FieldValue::Flag(false)));
    }
    if let Some(progress) = args.progress {
        out.push((Field::Progress, Field::Progress.parse_input(&progress)?));
    }
    if let Some(path) = args.attach_file {
        let url = DataUrl::from_file(&path)
            .map_err(|e| format!("cannot read attachment {}: {}", path.display(), e))?;
        out.push((Field::Attachment, FieldValue::Text(url)));
    }
    for assignment in &args.set {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", assignment))?;
        let field = Field::from_name(name.trim())?;
        out.push((field, field.parse_input(value)?));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ws: &Workspace, args: ListArgs, json: bool) -> CmdResult {
    let _lock = FileLock::acquire_default(&ws.dir)?;
    let store = open_store(ws);
    let tasks: Vec<_> = store.filter_status(args.status).collect();

    if json {
        return print_json(&TaskListJson {
            filter: args.status.to_string(),
            tasks,
        });
    }
    if tasks.is_empty() {
        println!("no tasks");
    }
    for task in tasks {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_show(ws: &Workspace, args: ShowArgs, json: bool) -> CmdResult {
    let _lock = FileLock::acquire_default(&ws.dir)?;
    let store = open_store(ws);
    let task = store
        .get(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    if json {
        return print_json(task);
    }
    for line in format_task_detail(task) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_counts(ws: &Workspace, json: bool) -> CmdResult {
    let _lock = FileLock::acquire_default(&ws.dir)?;
    let store = open_store(ws);
    let counts = store.counts();

    if json {
        return print_json(&counts_to_json(counts));
    }
    println!("{}", format_counts(counts));
    Ok(())
}

fn cmd_fields(json: bool) -> CmdResult {
    if json {
        let specs: Vec<_> = Field::ALL
            .into_iter()
            .map(|f| field_spec_to_json(f.spec()))
            .collect();
        return print_json(&specs);
    }
    for line in format_field_table() {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ws: &Workspace, args: AddArgs, json: bool) -> CmdResult {
    let assignments = collect_assignments(args.fields)?;
    let _lock = FileLock::acquire_default(&ws.dir)?;
    let mut store = open_store(ws);
    let ctx = ValidationContext::today();

    let mut form = TaskForm::new();
    for (field, value) in assignments {
        form.set_field(field, value, &ctx)?;
    }
    let task = match form.submit(&mut store, &mut UuidIds, &ctx) {
        Ok(task) => task,
        Err(FormError::Invalid(errors)) => return Err(field_errors(&errors, json)),
        Err(e) => return Err(e.into()),
    };
    warn_persist(&mut store);

    if json {
        return print_json(&task);
    }
    println!("{}", task.id);
    Ok(())
}

fn cmd_edit(ws: &Workspace, args: EditArgs, json: bool) -> CmdResult {
    let assignments = collect_assignments(args.fields)?;
    let _lock = FileLock::acquire_default(&ws.dir)?;
    let mut store = open_store(ws);
    let ctx = ValidationContext::today();

    let mut session = EditSession::new(&args.id);
    session.begin(&store)?;
    for (field, value) in assignments {
        session.set_field(field, value, &ctx)?;
    }
    let task = match session.save(&mut store, &ctx) {
        Ok(task) => task,
        Err(SessionError::SaveBlocked(errors)) => return Err(field_errors(&errors, json)),
        Err(e) => return Err(e.into()),
    };
    warn_persist(&mut store);

    if json {
        return print_json(&task);
    }
    println!("{}", format_task_line(&task));
    Ok(())
}

fn cmd_delete(ws: &Workspace, args: DeleteArgs, json: bool) -> CmdResult {
    let _lock = FileLock::acquire_default(&ws.dir)?;
    let mut store = open_store(ws);
    let removed = store.remove(&args.id)?;
    warn_persist(&mut store);

    if json {
        return print_json(&serde_json::json!({ "id": args.id, "deleted": removed }));
    }
    if removed {
        println!("deleted {}", args.id);
    }
    Ok(())
}
