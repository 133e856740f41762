//! Settings-store subsystem.
//!
//! The store is the source of truth for configured per-client limits; the
//! limiter's admission table is a runtime cache on top of it. Two
//! implementations: an in-memory map for single-instance deployments and
//! tests, and a PostgreSQL table for durable settings.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

/// Persisted limiter settings for one client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientLimit {
    pub capacity: u32,
    pub refill_rate: f64,
}

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid storage configuration: {0}")]
    Config(String),
}

/// Durable (or in-memory) per-client limiter settings.
///
/// Implementations are internally synchronized; every operation is its
/// own atomic step.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert or update the settings for a client.
    async fn save(
        &self,
        client_id: &str,
        capacity: u32,
        refill_rate: f64,
    ) -> Result<(), StorageError>;

    /// Fetch the settings for a client. `Ok(None)` is the normal
    /// missing-record result.
    async fn get(&self, client_id: &str) -> Result<Option<ClientLimit>, StorageError>;

    /// Snapshot all stored records.
    async fn load_all(&self) -> Result<HashMap<String, ClientLimit>, StorageError>;

    /// Remove the settings for a client. Deleting a missing key succeeds.
    async fn delete(&self, client_id: &str) -> Result<(), StorageError>;

    /// Release underlying resources.
    async fn close(&self) -> Result<(), StorageError>;
}
