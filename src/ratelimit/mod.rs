//! Admission filtering subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives with a client ID
//!     → limiter.rs (resolve bucket: table hit, or store lookup + install)
//!     → bucket.rs (refill, then consume one token under the bucket lock)
//!     → admit / reject
//!
//! Admin mutation (/clients...)
//!     → limiter.rs (update table)
//!     → storage (persist after releasing all locks)
//! ```
//!
//! # Design Decisions
//! - The admission table is a cache; the settings store holds configured
//!   values
//! - Table lock is acquired before any bucket lock and released before
//!   store I/O
//! - Buckets for idle clients are evicted after 30 minutes; eviction is
//!   memory hygiene only and never touches the store

pub mod bucket;
pub mod limiter;

pub use bucket::TokenBucket;
pub use limiter::{ClientLimitSnapshot, RateLimiter};
