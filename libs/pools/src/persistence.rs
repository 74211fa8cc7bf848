//! Registry persistence: versioned pool records behind a store trait.
//!
//! The registry's in-memory map is a cache over this store and is rebuilt
//! from `load_all` at process start. A production store is expected to
//! upsert atomically by pair key; the in-memory implementation here serves
//! tests and single-process deployments.

use async_trait::async_trait;
use basin_types::{PairKey, Token};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Schema version written into every record. Bump on layout changes so
/// stored records can be migrated deterministically.
pub const POOL_RECORD_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unsupported record version {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },
}

/// Persisted description of one pool; enough to rebuild the registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// Schema version, [`POOL_RECORD_VERSION`] when written by this build.
    pub version: u16,
    pub pair_key: PairKey,
    /// Ledger account holding the pool's reserves.
    pub pool_account: basin_types::Address,
    /// Companion LP token for the pool.
    pub lp_token: basin_types::Address,
    /// Tokens in canonical pair order.
    pub token_a: Token,
    pub token_b: Token,
    pub fee_bps: u16,
    /// Account that created the pool.
    pub creator: basin_types::Address,
}

impl PoolRecord {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.version != POOL_RECORD_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                supported: POOL_RECORD_VERSION,
            });
        }
        Ok(())
    }
}

/// Persistence collaborator for the pool registry.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Every stored pool record, in no particular order.
    async fn load_all(&self) -> Result<Vec<PoolRecord>, StoreError>;

    /// Persist one record, keyed by its pair key. Saving an existing key
    /// must be idempotent, not duplicating the entry.
    async fn save(&self, record: &PoolRecord) -> Result<(), StoreError>;
}

/// In-memory store for tests and single-process runs.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<String, PoolRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for InMemoryStore {
    async fn load_all(&self) -> Result<Vec<PoolRecord>, StoreError> {
        Ok(self.records.lock().values().cloned().collect())
    }

    async fn save(&self, record: &PoolRecord) -> Result<(), StoreError> {
        record.validate()?;
        self.records
            .lock()
            .insert(record.pair_key.to_string(), record.clone());
        Ok(())
    }
}
