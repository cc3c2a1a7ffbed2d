//! Seed data: mapping external records into tasks.
//!
//! Two record shapes are accepted: full task records, and the minimal remote
//! todo shape (`id`, `title`, `completed`). Todo records get a due date of
//! today and form defaults for every other field; their status comes from an
//! injected [`StatusAssigner`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::model::task::{Priority, Status, Task};

/// A record from a seed source
#[derive(Debug, Clone, PartialEq)]
pub enum SeedRecord {
    Full(Task),
    Todo(TodoRecord),
}

/// Keys only a full task record carries. A record with any of them must
/// parse as a full task; it never falls back to the todo shape.
const FULL_RECORD_KEYS: [&str; 5] = ["dueDate", "status", "email", "phoneNumber", "priority"];

impl<'de> Deserialize<'de> for SeedRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_full = value
            .as_object()
            .is_some_and(|obj| FULL_RECORD_KEYS.iter().any(|k| obj.contains_key(*k)));
        if !is_full {
            return TodoRecord::deserialize(value)
                .map(SeedRecord::Todo)
                .map_err(de::Error::custom);
        }
        let task = Task::deserialize(value).map_err(de::Error::custom)?;
        if task.progress > 100 {
            return Err(de::Error::custom(format!(
                "task {}: progress {} is out of range 0-100",
                task.id, task.progress
            )));
        }
        Ok(SeedRecord::Full(task))
    }
}

/// The remote todo shape. Unknown fields (e.g. `userId`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoRecord {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Todo ids arrive as numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoId::Number(n) => write!(f, "{}", n),
            TodoId::Text(s) => f.write_str(s),
        }
    }
}

/// Picks a status for a seeded todo.
///
/// Completed todos are always `Completed`; implementations only decide
/// what an incomplete todo becomes.
pub trait StatusAssigner {
    fn assign_incomplete(&mut self) -> Status;

    fn assign(&mut self, completed: bool) -> Status {
        if completed {
            Status::Completed
        } else {
            self.assign_incomplete()
        }
    }
}

/// Every incomplete todo is Pending
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPending;

impl StatusAssigner for AlwaysPending {
    fn assign_incomplete(&mut self) -> Status {
        Status::Pending
    }
}

/// Pending, In Progress, Pending, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct Alternating {
    flip: bool,
}

impl StatusAssigner for Alternating {
    fn assign_incomplete(&mut self) -> Status {
        let status = if self.flip {
            Status::InProgress
        } else {
            Status::Pending
        };
        self.flip = !self.flip;
        status
    }
}

/// 50/50 Pending or In Progress
#[derive(Debug, Clone)]
pub struct CoinFlip {
    rng: StdRng,
}

impl CoinFlip {
    pub fn from_entropy() -> Self {
        CoinFlip {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        CoinFlip {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl StatusAssigner for CoinFlip {
    fn assign_incomplete(&mut self) -> Status {
        if self.rng.random_bool(0.5) {
            Status::Pending
        } else {
            Status::InProgress
        }
    }
}

/// Named assigner, as chosen in config or on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusStrategy {
    #[default]
    Pending,
    Alternate,
    Random,
}

impl StatusStrategy {
    pub fn assigner(self) -> Box<dyn StatusAssigner> {
        match self {
            StatusStrategy::Pending => Box::new(AlwaysPending),
            StatusStrategy::Alternate => Box::new(Alternating::default()),
            StatusStrategy::Random => Box::new(CoinFlip::from_entropy()),
        }
    }
}

impl FromStr for StatusStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(StatusStrategy::Pending),
            "alternate" | "alternating" => Ok(StatusStrategy::Alternate),
            "random" => Ok(StatusStrategy::Random),
            other => Err(format!(
                "unknown status strategy: {} (expected pending, alternate, random)",
                other
            )),
        }
    }
}

/// Map one seed record to a task
pub fn to_task(record: SeedRecord, assigner: &mut dyn StatusAssigner, today: NaiveDate) -> Task {
    match record {
        SeedRecord::Full(task) => task,
        SeedRecord::Todo(todo) => {
            let status = assigner.assign(todo.completed);
            Task::new(todo.id.to_string(), todo.title, today, status)
        }
    }
}

/// Map a batch of seed records, keeping at most `limit` of them
pub fn to_tasks(
    records: Vec<SeedRecord>,
    limit: Option<usize>,
    assigner: &mut dyn StatusAssigner,
    today: NaiveDate,
) -> Vec<Task> {
    let limit = limit.unwrap_or(usize::MAX);
    records
        .into_iter()
        .take(limit)
        .map(|r| to_task(r, &mut *assigner, today))
        .collect()
}

/// The built-in sample tasks
pub fn demo_seed() -> Vec<Task> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    vec![
        Task {
            id: "1".into(),
            title: "John Doe".into(),
            due_date: date(2026, 1, 15),
            status: Status::Pending,
            email: "john@example.com".into(),
            phone_number: "123-456-7890".into(),
            url: "https://johndoe.com".into(),
            is_urgent: true,
            priority: Priority::High,
            progress: 10,
            attachment: "data:application/pdf;base64,example1".into(),
            color: "#FF0000".into(),
        },
        Task {
            id: "2".into(),
            title: "Jane Smith".into(),
            due_date: date(2026, 3, 22),
            status: Status::InProgress,
            email: "jane@example.com".into(),
            phone_number: "+12345678901".into(),
            url: "https://janesmith.com".into(),
            is_urgent: true,
            priority: Priority::Medium,
            progress: 50,
            attachment: "data:application/pdf;base64,example2".into(),
            color: "#00FF00".into(),
        },
        Task {
            id: "3".into(),
            title: "Alice Johnson".into(),
            due_date: date(2026, 6, 1),
            status: Status::Completed,
            email: "alice@example.com".into(),
            phone_number: "987-654-3210".into(),
            url: "https://alicejohnson.com".into(),
            is_urgent: true,
            priority: Priority::Low,
            progress: 100,
            attachment: "data:application/pdf;base64,example3".into(),
            color: "#0000FF".into(),
        },
    ]
}
