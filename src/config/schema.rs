//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from YAML config
//! files. Every section falls back to its defaults when omitted.

use std::time::Duration;

use serde::Deserialize;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Listener settings.
    pub server: ServerConfig,

    /// Origin pool, in order. Required and non-empty.
    pub backends: Vec<String>,

    /// Active health checking settings.
    pub healthcheck: HealthCheckConfig,

    /// Backend selection settings.
    pub balancer: BalancerConfig,

    /// Admission filter settings.
    pub ratelimit: RateLimitConfig,

    /// Settings-store selection.
    pub storage: StorageConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port.
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: "8080".to_string(),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Path probed on each backend.
    pub endpoint: String,

    /// Probe period (e.g. `5s`).
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            endpoint: "/health".to_string(),
            interval: Duration::from_secs(5),
        }
    }
}

/// Balancing algorithm selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// One of `round-robin`, `least-connections`.
    pub algorithm: String,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            algorithm: "round-robin".to_string(),
        }
    }
}

/// Admission filter configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Limits applied to clients without stored settings.
    #[serde(rename = "default")]
    pub defaults: DefaultLimits,
}

/// Default token bucket parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultLimits {
    /// Bucket size.
    pub capacity: u32,

    /// Tokens per second.
    pub refill_rate: f64,
}

impl Default for DefaultLimits {
    fn default() -> Self {
        Self {
            capacity: 100,
            refill_rate: 10.0,
        }
    }
}

/// Settings-store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// One of `memory`, `postgres`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Connection settings, used when `type` is `postgres`.
    pub postgres: PostgresConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: "memory".to_string(),
            postgres: PostgresConfig::default(),
        }
    }
}

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "loadbalancer".to_string(),
            sslmode: "disable".to_string(),
        }
    }
}
