//! Shared test utilities: an in-memory backend and container helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use crud_benchmarks::backend::{Backend, FailurePolicy, Phase};
use crud_benchmarks::config::{PostgresConfig, RedisConfig};
use crud_benchmarks::record::Comic;
use crud_benchmarks::{Error, Result};
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio_postgres::{Client, NoTls};

// =============================================================================
// In-memory backend
// =============================================================================

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    rows: BTreeMap<i64, Comic>,
    resets: usize,
    fail_reset: bool,
    /// (phase, title) pairs that fail when the record is processed.
    failing: HashSet<(Phase, String)>,
    /// Phases that fail for every record.
    failing_phases: HashSet<Phase>,
    /// Every call in order, with the record identifier at the time of the call.
    calls: Vec<(Phase, Option<i64>)>,
}

/// A backend that keeps rows in a map. The relational flavour assigns
/// identity values and recovers from Create failures; the key-value flavour
/// reuses existing identifiers and fails fast everywhere.
pub struct MemoryBackend {
    name: &'static str,
    relational: bool,
    state: RefCell<MemoryState>,
}

impl MemoryBackend {
    pub fn relational() -> Self {
        Self {
            name: "memory-sql",
            relational: true,
            state: RefCell::new(MemoryState {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    pub fn key_value() -> Self {
        Self {
            name: "memory-kv",
            relational: false,
            state: RefCell::new(MemoryState {
                next_id: 1_000_000,
                ..Default::default()
            }),
        }
    }

    pub fn fail_on(&self, phase: Phase, title: &str) {
        self.state
            .borrow_mut()
            .failing
            .insert((phase, title.to_string()));
    }

    pub fn fail_phase(&self, phase: Phase) {
        self.state.borrow_mut().failing_phases.insert(phase);
    }

    pub fn fail_reset(&self) {
        self.state.borrow_mut().fail_reset = true;
    }

    pub fn resets(&self) -> usize {
        self.state.borrow().resets
    }

    pub fn calls(&self) -> Vec<(Phase, Option<i64>)> {
        self.state.borrow().calls.clone()
    }

    pub fn get(&self, id: i64) -> Option<Comic> {
        self.state.borrow().rows.get(&id).cloned()
    }

    fn enter(&self, phase: Phase, comic: &Comic) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push((phase, comic.id));
        if state.failing_phases.contains(&phase)
            || state.failing.contains(&(phase, comic.title.clone()))
        {
            return Err(Error::Config(format!("injected failure for {}", comic.title)));
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn failure_policy(&self, phase: Phase) -> FailurePolicy {
        if self.relational && phase == Phase::Create {
            FailurePolicy::BestEffort
        } else {
            FailurePolicy::FailFast
        }
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.resets += 1;
        if state.fail_reset {
            return Err(Error::Config("reset refused".into()));
        }
        state.rows.clear();
        state.next_id = if self.relational { 1 } else { 1_000_000 };
        Ok(())
    }

    async fn create(&self, comic: &mut Comic) -> Result<()> {
        self.enter(Phase::Create, comic)?;
        let mut state = self.state.borrow_mut();
        let id = match (self.relational, comic.id) {
            (false, Some(id)) => id,
            _ => {
                let id = state.next_id;
                state.next_id += 1;
                id
            }
        };
        comic.id = Some(id);
        state.rows.insert(id, comic.clone());
        Ok(())
    }

    async fn read(&self, comic: &Comic) -> Result<()> {
        self.enter(Phase::Read, comic)?;
        Ok(())
    }

    async fn update(&self, comic: &mut Comic) -> Result<()> {
        self.enter(Phase::Update, comic)?;
        comic.title = format!("{} (updated)", comic.title);
        if let Some(id) = comic.id {
            if let Some(row) = self.state.borrow_mut().rows.get_mut(&id) {
                row.title = comic.title.clone();
            }
        }
        Ok(())
    }

    async fn delete(&self, comic: &Comic) -> Result<()> {
        self.enter(Phase::Delete, comic)?;
        if let Some(id) = comic.id {
            self.state.borrow_mut().rows.remove(&id);
        }
        Ok(())
    }

    async fn record_count(&self) -> Result<u64> {
        Ok(self.state.borrow().rows.len() as u64)
    }
}

/// A small fixed dataset with distinct titles.
pub fn comics(n: usize) -> Vec<Comic> {
    (0..n)
        .map(|i| Comic {
            id: None,
            title: format!("Issue #{i}"),
            author: "Grace Kirby".into(),
            publisher: "Atlas Comics".into(),
            year: 1990 + (i % 30) as i32,
            genre: "Noir".into(),
            description: format!("A quiet tale number {i}."),
        })
        .collect()
}

// =============================================================================
// Containers
// =============================================================================

pub const POSTGRES_PORT: u16 = 5432;
pub const REDIS_PORT: u16 = 6379;

/// Start a PostgreSQL container and return it with matching configuration.
pub async fn start_postgres() -> (ContainerAsync<GenericImage>, PostgresConfig) {
    let container = GenericImage::new("postgres", "16-alpine")
        .with_exposed_port(POSTGRES_PORT.tcp())
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_wait_for(WaitFor::message_on_stdout(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_USER", "test")
        .with_env_var("POSTGRES_PASSWORD", "test")
        .with_env_var("POSTGRES_DB", "comics")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");
    let port = container
        .get_host_port_ipv4(POSTGRES_PORT.tcp())
        .await
        .expect("Failed to get host port");

    let config = PostgresConfig {
        host: "127.0.0.1".into(),
        port,
        user: "test".into(),
        password: "test".into(),
        dbname: "comics".into(),
    };
    (container, config)
}

/// Start a Redis container and return it with matching configuration.
pub async fn start_redis() -> (ContainerAsync<GenericImage>, RedisConfig) {
    let container = GenericImage::new("redis", "7-alpine")
        .with_exposed_port(REDIS_PORT.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
        .start()
        .await
        .expect("Failed to start Redis container");
    let port = container
        .get_host_port_ipv4(REDIS_PORT.tcp())
        .await
        .expect("Failed to get host port");

    let config = RedisConfig {
        host: "127.0.0.1".into(),
        port,
    };
    (container, config)
}

/// A raw client for poking at the schema outside the backend.
pub async fn pg_client(config: &PostgresConfig) -> Client {
    let connection_string = format!(
        "host={} port={} user={} password={} dbname={}",
        config.host, config.port, config.user, config.password, config.dbname
    );
    let (client, connection) = tokio_postgres::connect(&connection_string, NoTls)
        .await
        .expect("Failed to connect to PostgreSQL");

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("PostgreSQL connection error: {e}");
        }
    });

    client
}
