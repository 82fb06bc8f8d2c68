//! Resolver statistics collection.
//!
//! This module obtains statistics from systemd-resolved and turns them into
//! typed samples, with mock channels for testing without a running resolver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       StatsCollector                        │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │   MetricRegistry    │   │   StatsSource (one of)      │  │
//! │  │  - base metrics     │   │  - TextStatsReader          │  │
//! │  │  - DNSSEC verdicts  │   │  - BusStatsReader           │  │
//! │  └─────────────────────┘   └──────────────┬──────────────┘  │
//! └───────────────────────────────────────────┼─────────────────┘
//!                                             │
//!                       ┌─────────────────────┴──────────┐
//!                       │                                │
//!               ┌───────▼───────┐                ┌───────▼───────┐
//!               │ CommandRunner │ (trait)        │  ResolverBus  │ (trait)
//!               └───────┬───────┘                └───────┬───────┘
//!              ┌────────┴────────┐              ┌────────┴────────┐
//!       ┌──────▼──────┐  ┌───────▼─────┐ ┌──────▼──────┐  ┌───────▼─────┐
//!       │ RealCommand │  │ MockCommand │ │  SystemBus  │  │   MockBus   │
//!       └─────────────┘  └─────────────┘ └─────────────┘  └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use resolved_exporter::collector::{StatsCollector, SystemBus};
//!
//! let collector = StatsCollector::dbus(SystemBus::new(), false);
//! let scrape = collector.collect()?;
//! ```
//!
//! ## Testing
//!
//! ```
//! use resolved_exporter::collector::{MockCommand, StatsCollector};
//!
//! let collector = StatsCollector::cli(MockCommand::typical_resolver(), true);
//! let scrape = collector.collect().unwrap();
//! assert_eq!(scrape.samples.len(), 9);
//! ```

pub mod bus;
#[allow(clippy::module_inception)]
mod collector;
pub mod error;
pub mod mock;
pub mod registry;
pub mod snapshot;
pub mod text;
pub mod traits;

pub use bus::{BusStatsReader, SystemBus};
pub use collector::{
    AcquisitionMode, CollectorTiming, MetricValue, Sample, Scrape, StatsCollector, StatsSource,
};
pub use error::{CollectError, FailureKind};
pub use mock::{MockBus, MockCommand};
pub use registry::{MetricGroup, MetricKind, MetricRegistry, MetricSpec};
pub use snapshot::StatSnapshot;
pub use text::TextStatsReader;
pub use traits::{CommandRunner, RealCommand, ResolverBus};
