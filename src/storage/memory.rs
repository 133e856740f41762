//! In-memory settings store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{ClientLimit, Storage, StorageError};

/// Settings store backed by a guarded map. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    limits: RwLock<HashMap<String, ClientLimit>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(
        &self,
        client_id: &str,
        capacity: u32,
        refill_rate: f64,
    ) -> Result<(), StorageError> {
        let mut limits = self.limits.write().expect("storage lock poisoned");
        limits.insert(
            client_id.to_string(),
            ClientLimit {
                capacity,
                refill_rate,
            },
        );
        Ok(())
    }

    async fn get(&self, client_id: &str) -> Result<Option<ClientLimit>, StorageError> {
        let limits = self.limits.read().expect("storage lock poisoned");
        Ok(limits.get(client_id).copied())
    }

    async fn load_all(&self) -> Result<HashMap<String, ClientLimit>, StorageError> {
        let limits = self.limits.read().expect("storage lock poisoned");
        Ok(limits.clone())
    }

    async fn delete(&self, client_id: &str) -> Result<(), StorageError> {
        let mut limits = self.limits.write().expect("storage lock poisoned");
        limits.remove(client_id);
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
