//! Gistbot storage crate - SQLite persistence for gists.
//!
//! Provides a WAL-mode SQLite database with migrations, a repository for
//! gist rows, and the expired-ephemeral sweep primitive. The bot command
//! layer and the sweep scheduler live outside this workspace; this crate
//! only gives them a durable, conflict-safe store to call into.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod sweep;

pub use db::Database;
pub use repository::GistRepository;
pub use sweep::{SweepResult, Sweeper};
