//! HTTP load balancer with per-client rate limiting.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  LOADGATE                     │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│ limiter  │──▶│ balancer  │  │
//!                    │  │ server  │   │ (admit)  │   │  (pick)   │  │
//!                    │  └────┬────┘   └────┬─────┘   └─────┬─────┘  │
//!                    │       │             │               │        │
//!                    │  /clients...          ▼               ▼        │
//!                    │       │        ┌─────────┐    ┌──────────┐   │
//!                    │       └───────▶│  admin  │    │ backend  │───┼──▶ Origin
//!                    │                │   API   │    │  pool    │   │
//!                    │                └────┬────┘    └────▲─────┘   │
//!                    │                     │              │         │
//!                    │                ┌────▼────┐    ┌────┴─────┐   │
//!                    │                │ storage │    │  health  │   │
//!                    │                │(mem/sql)│    │ monitor  │   │
//!                    │                └─────────┘    └──────────┘   │
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! The data plane runs every request through the admission filter, then
//! through the configured balancing strategy, and proxies it to the chosen
//! origin. The `/clients` control plane administers per-client limiter
//! settings, kept consistent between the runtime admission table and the
//! settings store.

// Core subsystems
pub mod config;
pub mod http;

// Traffic management
pub mod balancer;
pub mod health;
pub mod ratelimit;

// Control plane
pub mod admin;
pub mod storage;

// Cross-cutting concerns
pub mod lifecycle;

pub use config::Config;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
