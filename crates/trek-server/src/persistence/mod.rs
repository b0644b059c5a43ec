//! Persistence layer for the log board.
//!
//! SQLite-backed storage for activity logs. The in-memory DashMap in
//! `AppState` is the hot copy; every write goes through to the database.

pub mod db;
pub mod logs;

pub use db::{init_database, Database};
