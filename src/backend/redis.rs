//! Key-value backend on Redis.
//!
//! Each comic is a hash under `comic:<id>`; the extended variant adds an
//! `availability:<id>` hash holding `available_count`. The two keys are
//! written by separate commands with no multi-key atomicity: a failure
//! between them can leave a comic without its availability key. That gap is
//! part of what this backend measures and is left as is.

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use redis::aio::MultiplexedConnection;
use tracing::{debug, info};

use super::Backend;
use crate::config::RedisConfig;
use crate::dataset::{random_available_count, random_title};
use crate::error::{Error, Result};
use crate::record::{
    availability_key, comic_key, Comic, ComicHash, AVAILABLE_COUNT_FIELD, COMIC_KEY_PREFIX,
};

const SCAN_BATCH: usize = 1000;

pub struct RedisBackend {
    connection: MultiplexedConnection,
    availability: bool,
}

impl RedisBackend {
    pub async fn connect(config: &RedisConfig, availability: bool) -> Result<Self> {
        let client = redis::Client::open(config.url())?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!(host = %config.host, port = config.port, availability, "connected to redis");
        Ok(Self::from_connection(connection, availability))
    }

    pub fn from_connection(connection: MultiplexedConnection, availability: bool) -> Self {
        Self {
            connection,
            availability,
        }
    }

    pub fn availability_enabled(&self) -> bool {
        self.availability
    }

    /// A handle for one statement group. Multiplexed handles share the
    /// underlying socket, so cloning is cheap.
    fn conn(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    pub async fn fetch(&self, id: i64) -> Result<Option<ComicHash>> {
        let key = comic_key(id);
        let fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(&key)
            .query_async(&mut self.conn())
            .await?;
        ComicHash::from_fields(&key, fields)
    }

    pub async fn fetch_availability(&self, id: i64) -> Result<Option<i32>> {
        let count: Option<i32> = redis::cmd("HGET")
            .arg(availability_key(id))
            .arg(AVAILABLE_COUNT_FIELD)
            .query_async(&mut self.conn())
            .await?;
        Ok(count)
    }
}

fn require_id(comic: &Comic) -> Result<i64> {
    comic
        .id
        .ok_or_else(|| Error::MissingIdentifier(comic.title.clone()))
}

/// Identifier for a comic that has none yet.
fn fresh_id() -> i64 {
    rand::thread_rng().gen_range(1..=i64::MAX)
}

impl Backend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn reset(&self) -> Result<()> {
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut self.conn())
            .await?;
        debug!("redis database flushed");
        Ok(())
    }

    async fn create(&self, comic: &mut Comic) -> Result<()> {
        let id = comic.id.unwrap_or_else(fresh_id);
        let hash = ComicHash::new(id, comic, Utc::now());
        let mut conn = self.conn();

        let mut hset = redis::cmd("HSET");
        hset.arg(hash.key());
        for (field, value) in hash.to_fields() {
            hset.arg(field).arg(value);
        }
        let _: () = hset.query_async(&mut conn).await?;
        comic.id = Some(id);

        if self.availability {
            let count = random_available_count(&mut rand::thread_rng());
            let _: () = redis::cmd("HSET")
                .arg(availability_key(id))
                .arg(AVAILABLE_COUNT_FIELD)
                .arg(count)
                .query_async(&mut conn)
                .await?;
        }
        Ok(())
    }

    async fn read(&self, comic: &Comic) -> Result<()> {
        let id = require_id(comic)?;
        let mut conn = self.conn();

        let _: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(comic_key(id))
            .query_async(&mut conn)
            .await?;

        if self.availability {
            let _: Option<String> = redis::cmd("HGET")
                .arg(availability_key(id))
                .arg(AVAILABLE_COUNT_FIELD)
                .query_async(&mut conn)
                .await?;
        }
        Ok(())
    }

    async fn update(&self, comic: &mut Comic) -> Result<()> {
        let id = require_id(comic)?;
        let (title, count) = {
            let mut rng = rand::thread_rng();
            (random_title(&mut rng), random_available_count(&mut rng))
        };
        let mut conn = self.conn();

        let _: () = redis::cmd("HSET")
            .arg(comic_key(id))
            .arg("title")
            .arg(&title)
            .query_async(&mut conn)
            .await?;
        comic.title = title;

        if self.availability {
            let _: () = redis::cmd("HSET")
                .arg(availability_key(id))
                .arg(AVAILABLE_COUNT_FIELD)
                .arg(count)
                .query_async(&mut conn)
                .await?;
        }
        Ok(())
    }

    async fn delete(&self, comic: &Comic) -> Result<()> {
        let id = require_id(comic)?;
        let mut conn = self.conn();

        let _: () = redis::cmd("DEL")
            .arg(comic_key(id))
            .query_async(&mut conn)
            .await?;
        if self.availability {
            let _: () = redis::cmd("DEL")
                .arg(availability_key(id))
                .query_async(&mut conn)
                .await?;
        }
        Ok(())
    }

    async fn record_count(&self) -> Result<u64> {
        let mut conn = self.conn();
        let pattern = format!("{COMIC_KEY_PREFIX}*");
        let mut cursor: u64 = 0;
        let mut count: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            count += keys.len() as u64;
            if next == 0 {
                return Ok(count);
            }
            cursor = next;
        }
    }
}
