//! Prometheus exporter around the statistics collector.
//!
//! - `config` - validated settings and collector construction
//! - `encode` - Prometheus text exposition of samples
//! - `server` - axum router, the serve loop and its runtime

pub mod config;
pub mod encode;
pub mod server;

pub use config::{ConfigError, ExporterConfig, parse_listen_addr};
pub use encode::encode;
pub use server::{ExporterState, SHUTDOWN_GRACE, ServeError, router, run, serve};
