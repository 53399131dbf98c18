//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch, controllers, filters produce:
//!     → logging.rs (structured `tracing` events, pretty or JSON)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout / log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (controller, action, route) on every dispatch event
//! - The request ID is logged when a request begins and echoed on the response
//! - `RUST_LOG` overrides the configured level

pub mod logging;
pub mod metrics;
