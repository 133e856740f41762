//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (first round fires immediately)
//!     → one probe task per backend
//!     → GET http://<backend>/<endpoint> with a 5s timeout
//!     → 200 ⇒ healthy, anything else ⇒ unhealthy
//!     → backend flag updated, transition logged once
//! ```
//!
//! # Design Decisions
//! - Probes run concurrently so one slow backend cannot delay the round
//! - Transitions are logged only on change to keep flapping out of logs
//! - Stopping the monitor halts at the next tick; in-flight probes may
//!   still land their result

pub mod monitor;

pub use monitor::HealthMonitor;
