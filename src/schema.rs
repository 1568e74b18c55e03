//! Serializable result matrix for one benchmark run.
//!
//! One [`SizeResult`] per dataset size, each holding the four phase timings
//! of both backends. `crud-bench --json` prints a [`BenchmarkReport`] so two
//! runs can be compared with `bench-compare`.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::Phase;

/// Version of the JSON layout below.
pub const SCHEMA_VERSION: u32 = 1;

/// Top-level report printed by `crud-bench --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    pub metadata: RunMetadata,
    pub results: Vec<SizeResult>,
}

impl BenchmarkReport {
    pub fn new(metadata: RunMetadata, results: Vec<SizeResult>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            metadata,
            results,
        }
    }
}

/// Metadata captured at the start of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// RFC 3339 timestamp of the run start.
    pub timestamp: String,
    /// Crate version that produced the report.
    pub version: String,
    /// Whether the availability side-table / side-key was exercised.
    pub availability: bool,
    pub os: String,
    pub arch: String,
    /// Number of logical cores.
    pub cores: usize,
}

impl RunMetadata {
    pub fn capture(availability: bool) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            version: env!("CARGO_PKG_VERSION").to_string(),
            availability,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cores: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(0),
        }
    }
}

/// Timings of both backends at one dataset size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeResult {
    /// Number of records in the dataset.
    pub size: usize,
    pub relational: BackendTimings,
    pub key_value: BackendTimings,
}

impl SizeResult {
    pub fn backends(&self) -> [&BackendTimings; 2] {
        [&self.relational, &self.key_value]
    }
}

/// Whole-dataset elapsed milliseconds per phase for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendTimings {
    pub backend: String,
    pub create_ms: u64,
    pub read_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
    /// Records that failed under a best-effort phase.
    #[serde(default)]
    pub failures: usize,
}

impl BackendTimings {
    pub fn new(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Create => self.create_ms,
            Phase::Read => self.read_ms,
            Phase::Update => self.update_ms,
            Phase::Delete => self.delete_ms,
        }
    }

    pub fn set(&mut self, phase: Phase, ms: u64) {
        match phase {
            Phase::Create => self.create_ms = ms,
            Phase::Read => self.read_ms = ms,
            Phase::Update => self.update_ms = ms,
            Phase::Delete => self.delete_ms = ms,
        }
    }

    /// Timings in [`Phase::ALL`] order.
    pub fn as_array(&self) -> [u64; 4] {
        Phase::ALL.map(|phase| self.get(phase))
    }

    pub fn total_ms(&self) -> u64 {
        self.as_array().iter().sum()
    }

    pub fn mean_ms(&self) -> f64 {
        self.total_ms() as f64 / Phase::ALL.len() as f64
    }
}

/// Ordered per-size results of a whole run.
pub type TimingMatrix = Vec<SizeResult>;
