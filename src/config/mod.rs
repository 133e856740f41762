//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML)
//!     → loader.rs (CONFIG env override, parse & deserialize)
//!     → semantic validation (non-empty backends, known storage type)
//!     → Config (validated, immutable)
//!     → shared by value / Arc with all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Syntactic checks live in serde, semantic checks in the loader

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{Config, HealthCheckConfig, PostgresConfig};
