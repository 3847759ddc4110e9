//! # bistro-live: Runtime Services for Bistro
//!
//! Everything around the pure order math that touches the outside world:
//! configuration files, realtime change feeds, request limits, and the
//! batch audit tool.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          bistro-live                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │    config      │  │   realtime     │  │     rate_limit         │    │
//! │  │                │  │                │  │                        │    │
//! │  │ defaults       │  │ ChangeFeed     │  │ keyed limiter per      │    │
//! │  │ bistro.toml    │  │ LiveSync       │  │ client, built once     │    │
//! │  │ BISTRO_* env   │  │ LiveList       │  │ and shared via Arc     │    │
//! │  └───────┬────────┘  └────────────────┘  └────────────────────────┘    │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  report: audit_batch ──► bistro_core::audit_order (per order)   │   │
//! │  │          used by the `audit-orders` binary                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Layered configuration (`BistroConfig`)
//! - [`error`] - Live error types
//! - [`rate_limit`] - Per-client request limits
//! - [`realtime`] - Live order and reservation lists
//! - [`report`] - Batch order audits

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod realtime;
pub mod report;

pub use config::{BistroConfig, RateLimitSettings, RealtimeSettings, RestaurantSettings};
pub use error::{LiveError, LiveResult};
pub use rate_limit::RateLimiter;
pub use realtime::{ApplyOutcome, ChangeEvent, ChangeFeed, LiveList, LiveRecord, LiveSync, RecordKey};
pub use report::{audit_batch, AuditReport, OrderWithItems};

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,bistro=debug";

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bistro_live=trace` - Trace this crate only
/// - Default: `info,bistro=debug`
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
