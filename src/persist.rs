// used for the cache layer
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{PokedexError, Result};
use crate::model::CacheKey;

/// Where the cache lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

/// A string keyed, string valued store used as a best-effort accelerator.
///
/// Values are never expired. A failed `set` is reported as
/// [`PokedexError::CacheWrite`] so it can be observed in isolation, but no
/// caller inside the crate lets it escape, see [`remember`].
pub trait KeyValueCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ------------- SQLite -------------
pub struct SqliteCache {
    db: Mutex<Connection>,
    quota_bytes: Option<u64>,
}
impl SqliteCache {
    pub fn new(mode: PersistenceMode, quota_bytes: Option<u64>) -> Result<Self> {
        let connection = match &mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => Connection::open(path)?,
        };
        connection.execute_batch(
            "
            create table if not exists CacheEntry (
                CacheKey text not null,
                CacheValue text not null,
                constraint unique_and_referenceable_CacheKey primary key (
                    CacheKey
                )
            );
            ",
        )?;
        debug!(?mode, ?quota_bytes, "cache opened");
        Ok(Self {
            db: Mutex::new(connection),
            quota_bytes,
        })
    }
    pub fn in_memory() -> Result<Self> {
        Self::new(PersistenceMode::InMemory, None)
    }
    pub fn len(&self) -> Result<usize> {
        let db = self.db.lock()?;
        let count: i64 = db.query_row("select count(*) from CacheEntry", [], |r| r.get(0))?;
        Ok(count as usize)
    }
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
    fn try_get(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock()?;
        let mut statement = db.prepare_cached(
            "
            select CacheValue
                from CacheEntry
                where CacheKey = ?
            ",
        )?;
        Ok(statement
            .query_row(params![key], |r| r.get::<_, String>(0))
            .optional()?)
    }
    fn try_set(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock()?;
        if let Some(quota) = self.quota_bytes {
            // the entry being replaced does not count against the quota
            let used: i64 = db.query_row(
                "
                select coalesce(sum(length(cast(CacheValue as blob))), 0)
                    from CacheEntry
                    where CacheKey <> ?
                ",
                params![key],
                |r| r.get(0),
            )?;
            let needed = used as u64 + value.len() as u64;
            if needed > quota {
                return Err(PokedexError::CacheWrite(format!(
                    "quota of {quota} bytes exceeded by '{key}' ({needed} bytes needed)"
                )));
            }
        }
        let mut statement = db.prepare_cached(
            "
            insert or replace into CacheEntry (
                CacheKey,
                CacheValue
            ) values (?, ?)
            ",
        )?;
        statement.execute(params![key, value])?;
        Ok(())
    }
}
impl KeyValueCache for SqliteCache {
    fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "cache read failed");
                None
            }
        }
    }
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.try_set(key, value).map_err(|e| match e {
            PokedexError::CacheWrite(_) => e,
            other => PokedexError::CacheWrite(other.to_string()),
        })
    }
}

// ------------- Typed access -------------
/// Reads and deserializes an entry. Entries that cannot be deserialized count as misses.
pub fn recall<T: DeserializeOwned>(cache: &dyn KeyValueCache, key: &CacheKey) -> Option<T> {
    let key = key.to_string();
    let text = cache.get(&key)?;
    match serde_json::from_str(&text) {
        Ok(value) => {
            debug!(%key, "cache hit");
            Some(value)
        }
        Err(e) => {
            warn!(%key, error = %e, "unreadable cache entry ignored");
            None
        }
    }
}

/// Serializes and writes an entry, swallowing any failure.
/// Returns whether the entry was actually stored.
pub fn remember<T: Serialize>(cache: &dyn KeyValueCache, key: &CacheKey, value: &T) -> bool {
    let key = key.to_string();
    let outcome = serde_json::to_string(value)
        .map_err(|e| PokedexError::CacheWrite(e.to_string()))
        .and_then(|text| cache.set(&key, &text));
    match outcome {
        Ok(()) => true,
        Err(e) => {
            debug!(%key, error = %e, "cache write skipped");
            false
        }
    }
}
