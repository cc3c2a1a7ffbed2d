//! Validated task records: field rules, an in-memory store mirrored to
//! durable storage, edit sessions and seeding.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
