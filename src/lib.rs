//! resolved-exporter - Prometheus exporter for systemd-resolved statistics.
//!
//! This library provides:
//! - `collector` - statistics acquisition (command output or system bus) and
//!   conversion into typed samples
//! - `exporter` - configuration, Prometheus text encoding and the HTTP server

pub mod collector;
pub mod exporter;
