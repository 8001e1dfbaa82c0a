//! In-memory store: DashMap with per-entry TTL, expired entries filtered
//! lazily on read and reaped by a background task on an interval.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time;

use crate::store::{KvStore, StoreError};

#[derive(Clone, Debug)]
struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

pub struct MemoryStore {
    strings: Arc<DashMap<String, Entry>>,
    hashes: Arc<DashMap<String, DashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new(cleanup_interval_secs: u64) -> Self {
        let strings = Arc::new(DashMap::new());

        // Background cleanup task (Cron)
        let strings_cleanup = Arc::clone(&strings);
        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(cleanup_interval_secs));
            interval.tick().await; // Skip first immediate tick
            loop {
                interval.tick().await;
                let now = Instant::now();
                strings_cleanup.retain(|_, entry: &mut Entry| {
                    match entry.expires_at {
                        Some(expiry) => expiry > now,
                        None => true,
                    }
                });
            }
        });

        Self {
            strings,
            hashes: Arc::new(DashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let entry_ref = self.strings.get(key)?;
        let entry = entry_ref.value();
        if let Some(expires_at) = entry.expires_at {
            if Instant::now() > expires_at {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    pub fn hget(&self, key: &str, field: &str) -> Option<String> {
        self.hashes.get(key)?.get(field).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set_ex(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<(), StoreError> {
        let entry = Entry {
            value,
            expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
        };
        self.strings.insert(key.to_string(), entry);
        Ok(())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.hashes
            .entry(key.to_string())
            .or_insert_with(DashMap::new)
            .insert(field.to_string(), value.to_string());
        Ok(())
    }
}
