use std::error::Error;

use super::{Workspace, open_store, print_json, warn_persist};
use crate::cli::commands::SeedArgs;
use crate::cli::output::SeedResultJson;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::seed_io::{self, SeedError};
use crate::ops::seed::{self, SeedRecord, StatusStrategy};
use crate::ops::store::TaskStore;
use crate::ops::validate::ValidationContext;

/// Where seed records come from
enum Source {
    File(std::path::PathBuf),
    Demo,
}

impl Source {
    fn read(&self) -> Result<Vec<SeedRecord>, SeedError> {
        match self {
            Source::File(path) => seed_io::read_seed_file(path),
            Source::Demo => Ok(seed::demo_seed().into_iter().map(SeedRecord::Full).collect()),
        }
    }
}

/// Map records and insert them. Returns (read, inserted).
fn apply(
    store: &mut TaskStore,
    records: Vec<SeedRecord>,
    limit: Option<usize>,
    strategy: StatusStrategy,
) -> (usize, usize) {
    let today = ValidationContext::today().today;
    let mut assigner = strategy.assigner();
    let tasks = seed::to_tasks(records, limit, assigner.as_mut(), today);
    let read = tasks.len();
    let inserted = store.populate(tasks);
    (read, inserted)
}

/// First-use seeding of an empty data dir. Failures only warn; the store
/// starts empty.
pub(super) fn initial_seed(store: &mut TaskStore, ws: &Workspace) {
    let source = match config_io::seed_file_path(&ws.dir, &ws.config) {
        Some(path) => Source::File(path),
        None if ws.config.seed.demo => Source::Demo,
        None => return,
    };
    let records = match source.read() {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "initial seed failed; starting empty");
            eprintln!("warning: {}", e);
            return;
        }
    };
    let (read, inserted) = apply(
        store,
        records,
        ws.config.seed.limit,
        ws.config.seed.status_strategy,
    );
    tracing::info!(read, inserted, "seeded new data dir");
    warn_persist(store);
}

pub fn cmd_seed(ws: &Workspace, args: SeedArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let source = match args.file {
        Some(path) => Source::File(path),
        None => config_io::seed_file_path(&ws.dir, &ws.config)
            .map(Source::File)
            .unwrap_or(Source::Demo),
    };
    let records = source.read()?;

    let _lock = FileLock::acquire_default(&ws.dir)?;
    let mut store = open_store(ws);
    if args.replace {
        store.clear();
    }
    let (read, inserted) = apply(
        &mut store,
        records,
        args.limit.or(ws.config.seed.limit),
        args.status_strategy.unwrap_or(ws.config.seed.status_strategy),
    );
    warn_persist(&mut store);

    if json {
        return print_json(&SeedResultJson {
            read,
            inserted,
            skipped: read - inserted,
        });
    }
    println!("seeded {} of {} task(s)", inserted, read);
    Ok(())
}
