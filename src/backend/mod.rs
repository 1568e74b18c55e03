//! Storage backends under comparison.
//!
//! A backend executes one statement group per record for each CRUD phase.
//! Batching over the dataset, timing, and the handling of per-record errors
//! belong to the [`runner`](crate::runner), which consults
//! [`Backend::failure_policy`] to decide whether a failed record aborts the
//! phase.

pub mod postgres;
pub mod redis;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::Comic;

pub use self::postgres::PostgresBackend;
pub use self::redis::RedisBackend;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Create,
    Read,
    Update,
    Delete,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [Phase::Create, Phase::Read, Phase::Update, Phase::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Capitalized name for chart axes and tables.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Failure policies
// ---------------------------------------------------------------------------

/// What a phase does when a single record's statement group fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure, count it, and continue with the next record.
    BestEffort,
    /// Abort the phase and the remaining benchmark.
    FailFast,
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Short name used in logs, reports, and chart legends.
    fn name(&self) -> &'static str;

    fn failure_policy(&self, _phase: Phase) -> FailurePolicy {
        FailurePolicy::FailFast
    }

    /// Return the store to an empty state with identity counters reset.
    async fn reset(&self) -> Result<()>;

    /// Insert a comic and write its identifier back onto `comic`.
    async fn create(&self, comic: &mut Comic) -> Result<()>;

    /// Fetch a comic and discard the result.
    async fn read(&self, comic: &Comic) -> Result<()>;

    /// Replace the comic's title with a new random one, writing it back onto
    /// `comic`, and refresh its availability count.
    async fn update(&self, comic: &mut Comic) -> Result<()>;

    /// Remove a comic. Removing one that does not exist is not an error.
    async fn delete(&self, comic: &Comic) -> Result<()>;

    /// Number of comics currently stored.
    async fn record_count(&self) -> Result<u64>;
}
