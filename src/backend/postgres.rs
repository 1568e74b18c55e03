//! Relational backend on PostgreSQL.
//!
//! Comics live in `comics`; the extended variant also keeps an
//! `availability` row per comic. With availability enabled, Create inserts
//! both rows inside one transaction, so a failed availability insert leaves
//! no comic behind. Every statement group checks a connection out of the
//! pool and returns it when the group finishes.

use deadpool_postgres::{ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::{GenericClient, NoTls, Row};
use tracing::{debug, info};

use super::{Backend, FailurePolicy, Phase};
use crate::config::PostgresConfig;
use crate::dataset::{random_available_count, random_title};
use crate::error::Result;
use crate::record::{Availability, Comic};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS comics (
    id          BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    title       TEXT    NOT NULL,
    author      TEXT    NOT NULL,
    publisher   TEXT    NOT NULL,
    year        INTEGER NOT NULL,
    genre       TEXT    NOT NULL,
    description TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS availability (
    comic_id        BIGINT  PRIMARY KEY REFERENCES comics (id) ON DELETE CASCADE,
    available_count INTEGER NOT NULL
);
";

const RESET: &str = "TRUNCATE TABLE availability, comics RESTART IDENTITY";

const INSERT_COMIC: &str = "INSERT INTO comics (title, author, publisher, year, genre, description) \
     VALUES ($1, $2, $3, $4, $5, $6) RETURNING id";
const INSERT_AVAILABILITY: &str =
    "INSERT INTO availability (comic_id, available_count) VALUES ($1, $2)";

const SELECT_BY_TITLE: &str =
    "SELECT id, title, author, publisher, year, genre, description FROM comics WHERE title = $1";
const SELECT_BY_ID: &str =
    "SELECT id, title, author, publisher, year, genre, description FROM comics WHERE id = $1";
const SELECT_AVAILABILITY: &str =
    "SELECT comic_id, available_count FROM availability WHERE comic_id = $1";

const UPDATE_TITLE: &str = "UPDATE comics SET title = $1 WHERE title = $2";
const UPDATE_AVAILABILITY: &str =
    "UPDATE availability SET available_count = $1 WHERE comic_id = $2";

const DELETE_BY_TITLE: &str = "DELETE FROM comics WHERE title = $1";
const DELETE_AVAILABILITY: &str = "DELETE FROM availability WHERE comic_id = $1";

const COUNT: &str = "SELECT COUNT(*) FROM comics";

pub struct PostgresBackend {
    pool: Pool,
    availability: bool,
}

impl PostgresBackend {
    /// Build the pool, check that a connection can be made, and create the
    /// tables if they do not exist yet.
    pub async fn connect(config: &PostgresConfig, availability: bool) -> Result<Self> {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.dbname = Some(config.dbname.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        let backend = Self::from_pool(pool, availability);
        backend.ensure_schema().await?;
        info!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            availability,
            "connected to postgres"
        );
        Ok(backend)
    }

    pub fn from_pool(pool: Pool, availability: bool) -> Self {
        Self { pool, availability }
    }

    pub fn availability_enabled(&self) -> bool {
        self.availability
    }

    /// Create `comics` and `availability` if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        Ok(())
    }

    pub async fn fetch_by_title(&self, title: &str) -> Result<Vec<Comic>> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(SELECT_BY_TITLE).await?;
        let rows = client.query(&stmt, &[&title]).await?;
        Ok(rows.iter().map(comic_from_row).collect())
    }

    pub async fn fetch_by_id(&self, id: i64) -> Result<Option<Comic>> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(SELECT_BY_ID).await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        Ok(row.as_ref().map(comic_from_row))
    }

    pub async fn fetch_availability(&self, id: i64) -> Result<Option<Availability>> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(SELECT_AVAILABILITY).await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        Ok(row.map(|row| Availability {
            comic_id: row.get(0),
            available_count: row.get(1),
        }))
    }
}

fn comic_from_row(row: &Row) -> Comic {
    Comic {
        id: Some(row.get(0)),
        title: row.get(1),
        author: row.get(2),
        publisher: row.get(3),
        year: row.get(4),
        genre: row.get(5),
        description: row.get(6),
    }
}

async fn insert_comic<C: GenericClient>(client: &C, comic: &Comic) -> Result<i64> {
    let row = client
        .query_one(
            INSERT_COMIC,
            &[
                &comic.title,
                &comic.author,
                &comic.publisher,
                &comic.year,
                &comic.genre,
                &comic.description,
            ],
        )
        .await?;
    Ok(row.get(0))
}

async fn insert_pair<C: GenericClient>(client: &C, comic: &Comic, count: i32) -> Result<i64> {
    let id = insert_comic(client, comic).await?;
    client.execute(INSERT_AVAILABILITY, &[&id, &count]).await?;
    Ok(id)
}

impl Backend for PostgresBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn failure_policy(&self, phase: Phase) -> FailurePolicy {
        match phase {
            Phase::Create => FailurePolicy::BestEffort,
            Phase::Read | Phase::Update | Phase::Delete => FailurePolicy::FailFast,
        }
    }

    async fn reset(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.batch_execute(RESET).await?;
        debug!("postgres tables truncated");
        Ok(())
    }

    async fn create(&self, comic: &mut Comic) -> Result<()> {
        let mut client = self.pool.get().await?;

        if !self.availability {
            comic.id = Some(insert_comic(&**client, comic).await?);
            return Ok(());
        }

        let count = random_available_count(&mut rand::thread_rng());
        let tx = client.transaction().await?;
        match insert_pair(&*tx, comic, count).await {
            Ok(id) => {
                tx.commit().await?;
                comic.id = Some(id);
                Ok(())
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    async fn read(&self, comic: &Comic) -> Result<()> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(SELECT_BY_TITLE).await?;
        client.query(&stmt, &[&comic.title]).await?;

        if let (true, Some(id)) = (self.availability, comic.id) {
            let stmt = client.prepare_cached(SELECT_AVAILABILITY).await?;
            client.query_opt(&stmt, &[&id]).await?;
        }
        Ok(())
    }

    async fn update(&self, comic: &mut Comic) -> Result<()> {
        let (title, count) = {
            let mut rng = rand::thread_rng();
            (random_title(&mut rng), random_available_count(&mut rng))
        };

        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(UPDATE_TITLE).await?;
        client.execute(&stmt, &[&title, &comic.title]).await?;
        comic.title = title;

        if let (true, Some(id)) = (self.availability, comic.id) {
            let stmt = client.prepare_cached(UPDATE_AVAILABILITY).await?;
            client.execute(&stmt, &[&count, &id]).await?;
        }
        Ok(())
    }

    async fn delete(&self, comic: &Comic) -> Result<()> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(DELETE_BY_TITLE).await?;
        client.execute(&stmt, &[&comic.title]).await?;

        if let (true, Some(id)) = (self.availability, comic.id) {
            let stmt = client.prepare_cached(DELETE_AVAILABILITY).await?;
            client.execute(&stmt, &[&id]).await?;
        }
        Ok(())
    }

    async fn record_count(&self) -> Result<u64> {
        let client = self.pool.get().await?;
        let row = client.query_one(COUNT, &[]).await?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }
}
