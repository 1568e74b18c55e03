//! CRUD latency benchmarks for PostgreSQL and Redis.
//!
//! The same synthetic comic dataset is pushed through Create, Read, Update,
//! and Delete against a relational store and a key-value store, for a list
//! of increasing dataset sizes. Each phase is timed as a whole batch and the
//! resulting matrix is rendered as charts.
//!
//! Run: `cargo run --release --bin crud-bench`
//! Large: `cargo run --release --bin crud-bench -- --preset large`

pub mod backend;
pub mod config;
pub mod dataset;
pub mod error;
pub mod record;
pub mod report;
pub mod runner;
pub mod schema;

pub use error::{Error, Result};
