//! Benchmark orchestration.
//!
//! For every dataset size, in order: reset both backends, generate a fresh
//! dataset, run the four phases against the relational backend and then
//! against the key-value backend, and append the timings to the matrix.
//! Nothing runs concurrently; each statement is awaited before the next one
//! is issued. There are no timeouts, so a hung backend stalls the run.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::backend::{Backend, FailurePolicy, Phase};
use crate::dataset;
use crate::error::{Error, Result};
use crate::record::Comic;
use crate::schema::{BackendTimings, SizeResult, TimingMatrix};

// ---------------------------------------------------------------------------
// Size presets
// ---------------------------------------------------------------------------

pub const SMALL_SIZES: [usize; 3] = [100, 1_000, 10_000];
pub const LARGE_SIZES: [usize; 3] = [1_000, 10_000, 100_000];

// ---------------------------------------------------------------------------
// Single phase
// ---------------------------------------------------------------------------

/// Result of running one phase over a whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub elapsed: Duration,
    /// Records that failed and were skipped under [`FailurePolicy::BestEffort`].
    pub failures: usize,
}

impl PhaseOutcome {
    pub fn millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Run `phase` over every record, timing the whole batch.
///
/// Per-record errors are handled according to the backend's
/// [`FailurePolicy`] for the phase.
pub async fn run_phase<B: Backend>(
    backend: &B,
    phase: Phase,
    records: &mut [Comic],
) -> Result<PhaseOutcome> {
    let policy = backend.failure_policy(phase);
    let mut failures = 0;
    let start = Instant::now();

    for comic in records.iter_mut() {
        let result = match phase {
            Phase::Create => backend.create(comic).await,
            Phase::Read => backend.read(comic).await,
            Phase::Update => backend.update(comic).await,
            Phase::Delete => backend.delete(comic).await,
        };

        if let Err(err) = result {
            match policy {
                FailurePolicy::BestEffort => {
                    failures += 1;
                    warn!(
                        backend = backend.name(),
                        %phase,
                        title = %comic.title,
                        error = %err,
                        "record failed, continuing"
                    );
                }
                FailurePolicy::FailFast => {
                    return Err(Error::Phase {
                        backend: backend.name(),
                        phase,
                        source: Box::new(err),
                    });
                }
            }
        }
    }

    Ok(PhaseOutcome {
        elapsed: start.elapsed(),
        failures,
    })
}

/// Run all four phases in order against one backend.
pub async fn run_backend<B: Backend>(backend: &B, records: &mut [Comic]) -> Result<BackendTimings> {
    let mut timings = BackendTimings::new(backend.name());

    for phase in Phase::ALL {
        let outcome = run_phase(backend, phase, records).await?;
        timings.set(phase, outcome.millis());
        timings.failures += outcome.failures;
        info!(
            backend = backend.name(),
            %phase,
            records = records.len(),
            elapsed_ms = outcome.millis(),
            failures = outcome.failures,
            "phase complete"
        );
    }

    Ok(timings)
}

/// Reset a backend, logging instead of failing: the run continues against a
/// possibly non-empty store.
pub async fn reset_backend<B: Backend>(backend: &B) {
    if let Err(err) = backend.reset().await {
        warn!(backend = backend.name(), error = %err, "reset failed, store may not be empty");
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Owns both backend handles for the duration of a run.
pub struct Runner<R, K> {
    relational: R,
    key_value: K,
    sizes: Vec<usize>,
}

impl<R: Backend, K: Backend> Runner<R, K> {
    pub fn new(relational: R, key_value: K, sizes: Vec<usize>) -> Self {
        Self {
            relational,
            key_value,
            sizes,
        }
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn relational(&self) -> &R {
        &self.relational
    }

    pub fn key_value(&self) -> &K {
        &self.key_value
    }

    /// Run every configured size in order. The first fail-fast error aborts
    /// the remaining sizes.
    pub async fn run(&self) -> Result<TimingMatrix> {
        let mut matrix = Vec::with_capacity(self.sizes.len());
        for &size in &self.sizes {
            matrix.push(self.run_size(size).await?);
        }
        Ok(matrix)
    }

    /// One full iteration at a single dataset size.
    pub async fn run_size(&self, size: usize) -> Result<SizeResult> {
        info!(size, "starting dataset size");

        reset_backend(&self.relational).await;
        reset_backend(&self.key_value).await;

        let mut records = dataset::generate(size);
        self.run_dataset(size, &mut records).await
    }

    /// Run both backends over a prepared dataset. The relational backend
    /// goes first so its identifiers become the key-value key suffixes.
    pub async fn run_dataset(&self, size: usize, records: &mut [Comic]) -> Result<SizeResult> {
        let relational = run_backend(&self.relational, records).await?;
        let key_value = run_backend(&self.key_value, records).await?;

        Ok(SizeResult {
            size,
            relational,
            key_value,
        })
    }

    /// Consume the runner, handing the backend handles back.
    pub fn into_backends(self) -> (R, K) {
        (self.relational, self.key_value)
    }
}
