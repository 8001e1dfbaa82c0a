//! Key-value store clients. The handler only ever needs two operations
//! (set-with-ttl and hash-field-set), so the trait stays that narrow and
//! everything else about durability and expiry is the store's problem.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;
use bytes::Bytes;

// ========================================
// ERRORS
// ========================================

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    /// The store answered with something we could not interpret.
    Protocol(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {}", e),
            StoreError::Protocol(msg) => write!(f, "store protocol error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::Io(error)
    }
}

// ========================================
// STORE TRAIT
// ========================================

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Set `key` to `value`, expiring after `ttl_secs`. Overwrites reset the TTL.
    async fn set_ex(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<(), StoreError>;

    /// Set `field` of hash `key` to `value`. Hash entries never expire.
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;
}
