//! Per-client admission filter over the settings store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::lifecycle::Shutdown;
use crate::storage::{ClientLimit, Storage, StorageError};

use super::bucket::TokenBucket;

/// Period of the background refill pass.
const REFILL_TICK: Duration = Duration::from_secs(1);

/// Period of the idle-bucket eviction pass.
const EVICTION_TICK: Duration = Duration::from_secs(60);

/// Buckets untouched for this long are dropped from memory.
const IDLE_EVICTION_THRESHOLD: Duration = Duration::from_secs(30 * 60);

/// One row of the [`RateLimiter::list_clients`] snapshot.
#[derive(Debug, Clone)]
pub struct ClientLimitSnapshot {
    pub client_id: String,
    pub capacity: u32,
    pub refill_rate: f64,
}

/// Token-bucket admission filter for all clients.
///
/// The admission table caches one bucket per client ID; the settings
/// store is the source of truth for configured capacity and refill rate.
/// Buckets are created lazily on first admission (pulling stored settings
/// when present, defaults otherwise) or eagerly via [`set_limit`].
///
/// Deleting a client and then receiving traffic from it re-provisions a
/// default bucket and persists those defaults again, so deletion acts as
/// "reset to defaults" rather than a permanent ban on the ID.
///
/// [`set_limit`]: Self::set_limit
pub struct RateLimiter {
    buckets: RwLock<HashMap<String, Arc<Mutex<TokenBucket>>>>,
    default_capacity: u32,
    default_refill_rate: f64,
    storage: Arc<dyn Storage>,
}

impl RateLimiter {
    pub fn new(
        default_capacity: u32,
        default_refill_rate: f64,
        storage: Arc<dyn Storage>,
    ) -> Arc<Self> {
        Arc::new(Self {
            buckets: RwLock::new(HashMap::new()),
            default_capacity,
            default_refill_rate,
            storage,
        })
    }

    /// Pre-populate the admission table from the settings store. Each
    /// bucket starts full. A store failure here is fatal to startup.
    pub async fn warm_up(&self) -> Result<(), StorageError> {
        let stored = self.storage.load_all().await?;

        let mut buckets = self.buckets.write().expect("admission table lock poisoned");
        for (client_id, limit) in stored {
            tracing::debug!(
                client_id = %client_id,
                capacity = limit.capacity,
                refill_rate = limit.refill_rate,
                "loaded stored client limit"
            );
            buckets.insert(
                client_id,
                Arc::new(Mutex::new(TokenBucket::new(
                    limit.capacity,
                    limit.refill_rate,
                ))),
            );
        }

        Ok(())
    }

    /// Consume one token for the client if available.
    pub async fn admit(&self, client_id: &str) -> bool {
        let bucket = self.resolve_bucket(client_id).await;
        let mut bucket = bucket.lock().expect("bucket mutex poisoned");
        bucket.try_acquire()
    }

    /// Fetch the client's bucket, creating and installing it on first
    /// use. Creation consults the settings store with no locks held and
    /// double-checks under the write lock, reusing any bucket a
    /// concurrent caller installed first.
    async fn resolve_bucket(&self, client_id: &str) -> Arc<Mutex<TokenBucket>> {
        {
            let buckets = self.buckets.read().expect("admission table lock poisoned");
            if let Some(bucket) = buckets.get(client_id) {
                return Arc::clone(bucket);
            }
        }

        let (capacity, refill_rate, from_store) = match self.storage.get(client_id).await {
            Ok(Some(limit)) => (limit.capacity, limit.refill_rate, true),
            Ok(None) => (self.default_capacity, self.default_refill_rate, false),
            Err(err) => {
                tracing::warn!(
                    client_id = %client_id,
                    error = %err,
                    "failed to read stored limit, using defaults"
                );
                (self.default_capacity, self.default_refill_rate, false)
            }
        };

        let bucket = {
            let mut buckets = self.buckets.write().expect("admission table lock poisoned");
            if let Some(existing) = buckets.get(client_id) {
                return Arc::clone(existing);
            }
            let bucket = Arc::new(Mutex::new(TokenBucket::new(capacity, refill_rate)));
            buckets.insert(client_id.to_string(), Arc::clone(&bucket));
            bucket
        };

        tracing::debug!(
            client_id = %client_id,
            capacity,
            refill_rate,
            "created token bucket"
        );

        if !from_store {
            // Persist defaults off the request path; failures only log.
            let storage = Arc::clone(&self.storage);
            let client_id = client_id.to_string();
            tokio::spawn(async move {
                if let Err(err) = storage.save(&client_id, capacity, refill_rate).await {
                    tracing::warn!(
                        client_id = %client_id,
                        error = %err,
                        "failed to persist default client limit"
                    );
                }
            });
        }

        bucket
    }

    /// Install or update the client's limits, then persist them. A
    /// persistence failure is logged and the runtime change kept.
    pub async fn set_limit(&self, client_id: &str, capacity: u32, refill_rate: f64) {
        {
            let mut buckets = self.buckets.write().expect("admission table lock poisoned");
            match buckets.get(client_id) {
                Some(bucket) => {
                    bucket
                        .lock()
                        .expect("bucket mutex poisoned")
                        .update_limits(capacity, refill_rate);
                }
                None => {
                    buckets.insert(
                        client_id.to_string(),
                        Arc::new(Mutex::new(TokenBucket::new(capacity, refill_rate))),
                    );
                }
            }
        }

        if let Err(err) = self.storage.save(client_id, capacity, refill_rate).await {
            tracing::error!(
                client_id = %client_id,
                error = %err,
                "failed to persist client limit, keeping runtime value"
            );
        } else {
            tracing::info!(
                client_id = %client_id,
                capacity,
                refill_rate,
                "client limit set"
            );
        }
    }

    /// Read the client's current runtime limits.
    pub fn get_limit(&self, client_id: &str) -> Option<ClientLimit> {
        let bucket = {
            let buckets = self.buckets.read().expect("admission table lock poisoned");
            Arc::clone(buckets.get(client_id)?)
        };

        let bucket = bucket.lock().expect("bucket mutex poisoned");
        Some(ClientLimit {
            capacity: bucket.capacity(),
            refill_rate: bucket.refill_rate(),
        })
    }

    /// Drop the client's bucket and delete its stored settings. A store
    /// failure is propagated to the caller.
    pub async fn delete_limit(&self, client_id: &str) -> Result<(), StorageError> {
        {
            let mut buckets = self.buckets.write().expect("admission table lock poisoned");
            buckets.remove(client_id);
        }

        self.storage.delete(client_id).await?;

        tracing::info!(client_id = %client_id, "client limit deleted");
        Ok(())
    }

    /// Snapshot every known client with its configured limits.
    pub fn list_clients(&self) -> Vec<ClientLimitSnapshot> {
        let snapshot: Vec<(String, Arc<Mutex<TokenBucket>>)> = {
            let buckets = self.buckets.read().expect("admission table lock poisoned");
            buckets
                .iter()
                .map(|(id, bucket)| (id.clone(), Arc::clone(bucket)))
                .collect()
        };

        snapshot
            .into_iter()
            .map(|(client_id, bucket)| {
                let bucket = bucket.lock().expect("bucket mutex poisoned");
                ClientLimitSnapshot {
                    client_id,
                    capacity: bucket.capacity(),
                    refill_rate: bucket.refill_rate(),
                }
            })
            .collect()
    }

    /// Spawn the periodic refill and eviction tasks. Both stop at their
    /// next tick once draining begins.
    pub fn spawn_maintenance(self: Arc<Self>, shutdown: &Shutdown) {
        let limiter = Arc::clone(&self);
        let mut signal = shutdown.signal();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REFILL_TICK);
            loop {
                tokio::select! {
                    _ = ticker.tick() => limiter.refill_all(),
                    _ = signal.wait() => break,
                }
            }
        });

        let limiter = self;
        let mut signal = shutdown.signal();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(EVICTION_TICK);
            loop {
                tokio::select! {
                    _ = ticker.tick() => limiter.evict_older_than(IDLE_EVICTION_THRESHOLD),
                    _ = signal.wait() => break,
                }
            }
        });
    }

    /// Refill every bucket. Keeps [`list_clients`](Self::list_clients)
    /// token counts close to real time; the on-demand refill in admit is
    /// always sufficient for correctness.
    fn refill_all(&self) {
        let buckets = self.buckets.read().expect("admission table lock poisoned");
        for bucket in buckets.values() {
            bucket.lock().expect("bucket mutex poisoned").refill();
        }
    }

    /// Drop buckets idle beyond the threshold. The settings store is not
    /// touched; a returning client gets its stored limits back.
    fn evict_older_than(&self, idle_threshold: Duration) {
        let now = Instant::now();
        let mut buckets = self.buckets.write().expect("admission table lock poisoned");
        buckets.retain(|client_id, bucket| {
            let last_access = bucket.lock().expect("bucket mutex poisoned").last_access();
            let keep = now.duration_since(last_access) <= idle_threshold;
            if !keep {
                tracing::info!(client_id = %client_id, "evicted idle client bucket");
            }
            keep
        });
    }
}
