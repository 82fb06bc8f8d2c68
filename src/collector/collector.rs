//! Scrape-time collector that turns a statistics snapshot into samples.
//!
//! The `StatsCollector` owns one acquisition source, chosen at startup, and
//! the metric registry. It keeps no state between scrapes, so a single
//! instance can serve concurrent scrapes from several threads.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::bus::BusStatsReader;
use crate::collector::error::CollectError;
use crate::collector::registry::{MetricKind, MetricRegistry, MetricSpec};
use crate::collector::snapshot::StatSnapshot;
use crate::collector::text::TextStatsReader;
use crate::collector::traits::{CommandRunner, ResolverBus};

/// How statistics are obtained from the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    /// Parse the output of the diagnostic command.
    Cli,
    /// Read manager properties over the system bus.
    #[default]
    Dbus,
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionMode::Cli => f.write_str("cli"),
            AcquisitionMode::Dbus => f.write_str("dbus"),
        }
    }
}

impl FromStr for AcquisitionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cli" => Ok(AcquisitionMode::Cli),
            "dbus" => Ok(AcquisitionMode::Dbus),
            other => Err(format!(
                "unknown acquisition mode '{}', expected 'cli' or 'dbus'",
                other
            )),
        }
    }
}

/// A source of statistics snapshots.
pub trait StatsSource: Send + Sync {
    fn mode(&self) -> AcquisitionMode;

    /// Acquires a fresh snapshot.
    fn read(&self) -> Result<StatSnapshot, CollectError>;
}

impl<C: CommandRunner> StatsSource for TextStatsReader<C> {
    fn mode(&self) -> AcquisitionMode {
        AcquisitionMode::Cli
    }

    fn read(&self) -> Result<StatSnapshot, CollectError> {
        TextStatsReader::read(self)
    }
}

impl<B: ResolverBus> StatsSource for BusStatsReader<B> {
    fn mode(&self) -> AcquisitionMode {
        AcquisitionMode::Dbus
    }

    fn read(&self) -> Result<StatSnapshot, CollectError> {
        BusStatsReader::read(self)
    }
}

/// Value of a sample, tagged with its metric type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Cumulative total as reported by the resolver.
    Counter(f64),
    /// Current value.
    Gauge(f64),
}

impl MetricValue {
    fn new(kind: MetricKind, value: f64) -> Self {
        match kind {
            MetricKind::Counter => MetricValue::Counter(value),
            MetricKind::Gauge => MetricValue::Gauge(value),
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            MetricValue::Counter(v) | MetricValue::Gauge(v) => v,
        }
    }
}

/// One exported sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    pub exported_name: &'static str,
    pub help: &'static str,
    pub value: MetricValue,
}

impl Sample {
    fn from_spec(spec: &MetricSpec, value: f64) -> Self {
        Self {
            name: spec.name,
            exported_name: spec.exported_name,
            help: spec.help,
            value: MetricValue::new(spec.kind, value),
        }
    }
}

/// Timing of a single scrape.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectorTiming {
    /// Total scrape time.
    pub total: Duration,
    /// Time spent in the acquisition source.
    pub acquisition: Duration,
}

/// Result of a successful scrape.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub samples: Vec<Sample>,
    /// Number of statistics the source reported, exported or not.
    pub statistics: usize,
    pub timing: CollectorTiming,
}

/// Collector combining one acquisition source with the metric registry.
pub struct StatsCollector {
    registry: MetricRegistry,
    source: Box<dyn StatsSource>,
}

impl StatsCollector {
    pub fn new(registry: MetricRegistry, source: impl StatsSource + 'static) -> Self {
        Self {
            registry,
            source: Box::new(source),
        }
    }

    /// Collector parsing `systemd-resolve --statistics` output.
    pub fn cli<C: CommandRunner + 'static>(runner: C, include_dnssec: bool) -> Self {
        Self::new(
            MetricRegistry::build(include_dnssec),
            TextStatsReader::new(runner),
        )
    }

    /// Collector reading manager properties over the bus.
    ///
    /// The DNSSEC property is only read when `include_dnssec` is set.
    pub fn dbus<B: ResolverBus + 'static>(bus: B, include_dnssec: bool) -> Self {
        Self::new(
            MetricRegistry::build(include_dnssec),
            BusStatsReader::new(bus, include_dnssec),
        )
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.source.mode()
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Acquires a fresh snapshot and converts it into samples.
    pub fn collect(&self) -> Result<Scrape, CollectError> {
        let total_start = Instant::now();

        let start = Instant::now();
        let snapshot = self.source.read()?;
        let acquisition = start.elapsed();

        let samples = self.samples(&snapshot);
        for (name, _) in snapshot.iter().filter(|(name, _)| self.registry.get(name).is_none()) {
            debug!(statistic = name, "statistic not exported");
        }
        let timing = CollectorTiming {
            total: total_start.elapsed(),
            acquisition,
        };

        debug!(
            mode = %self.mode(),
            statistics = snapshot.len(),
            samples = samples.len(),
            acquisition = ?timing.acquisition,
            elapsed = ?timing.total,
            "scrape complete"
        );

        Ok(Scrape {
            samples,
            statistics: snapshot.len(),
            timing,
        })
    }

    /// Emits one sample per registry entry present in `snapshot`, in
    /// registry order. Absent entries produce nothing.
    pub fn samples(&self, snapshot: &StatSnapshot) -> Vec<Sample> {
        self.registry
            .specs()
            .iter()
            .filter_map(|spec| {
                snapshot
                    .get(spec.name)
                    .map(|value| Sample::from_spec(spec, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::collector::error::FailureKind;
    use crate::collector::mock::{MockBus, MockCommand};

    fn find<'a>(samples: &'a [Sample], name: &str) -> Option<&'a Sample> {
        samples.iter().find(|s| s.name == name)
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("cli".parse::<AcquisitionMode>(), Ok(AcquisitionMode::Cli));
        assert_eq!("DBus".parse::<AcquisitionMode>(), Ok(AcquisitionMode::Dbus));
        assert!("snmp".parse::<AcquisitionMode>().is_err());
        assert_eq!(AcquisitionMode::default(), AcquisitionMode::Dbus);
        assert_eq!(AcquisitionMode::Cli.to_string(), "cli");
    }

    #[test]
    fn test_cli_scenario_emits_present_samples_only() {
        let runner = MockCommand::new().with_output(
            "systemd-resolve --statistics",
            "Current Transactions: 5\nGarbage line\nCache Hits: 120\n",
        );
        let collector = StatsCollector::cli(runner, false);
        assert_eq!(collector.mode(), AcquisitionMode::Cli);

        let scrape = collector.collect().unwrap();
        assert_eq!(scrape.samples.len(), 2);
        assert_eq!(scrape.statistics, 2);

        let current = find(&scrape.samples, "Current Transactions").unwrap();
        assert_eq!(current.value, MetricValue::Gauge(5.0));
        assert_eq!(current.exported_name, "systemd_resolved_current_transactions");

        let hits = find(&scrape.samples, "Cache Hits").unwrap();
        assert_eq!(hits.value, MetricValue::Counter(120.0));

        assert!(find(&scrape.samples, "Cache Misses").is_none());
    }

    #[test]
    fn test_dnssec_lines_ignored_without_flag() {
        let collector = StatsCollector::cli(MockCommand::typical_resolver(), false);
        let scrape = collector.collect().unwrap();
        assert_eq!(scrape.statistics, 9);
        assert_eq!(scrape.samples.len(), 5);
        assert!(find(&scrape.samples, "Bogus").is_none());
    }

    #[test]
    fn test_dnssec_samples_with_flag() {
        let collector = StatsCollector::cli(MockCommand::typical_resolver(), true);
        let scrape = collector.collect().unwrap();
        assert_eq!(scrape.samples.len(), 9);
        assert_eq!(
            find(&scrape.samples, "Bogus").unwrap().value,
            MetricValue::Counter(2.0)
        );
    }

    #[test]
    fn test_cardinality_is_intersection() {
        let collector = StatsCollector::cli(MockCommand::new(), false);
        let snapshot: StatSnapshot = [
            ("Cache Hits", 1.0),
            ("Cache Misses", 2.0),
            ("Secure", 3.0),
            ("Unrelated Statistic", 4.0),
        ]
        .into_iter()
        .collect();

        let samples = collector.samples(&snapshot);
        assert_eq!(samples.len(), 2);
        assert!(collector.samples(&StatSnapshot::new()).is_empty());
    }

    #[test]
    fn test_samples_follow_registry_order() {
        let collector = StatsCollector::dbus(MockBus::typical_resolver(), true);
        let scrape = collector.collect().unwrap();
        let names: Vec<&str> = scrape.samples.iter().map(|s| s.name).collect();
        let expected: Vec<&str> = collector.registry().specs().iter().map(|s| s.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_dbus_scenario() {
        let bus = MockBus::new()
            .with_property("CacheStatistics", vec![10, 100, 5])
            .with_property("TransactionStatistics", vec![2, 50]);
        let collector = StatsCollector::dbus(bus, false);
        assert_eq!(collector.mode(), AcquisitionMode::Dbus);

        let scrape = collector.collect().unwrap();
        assert_eq!(scrape.samples.len(), 5);
        assert_eq!(
            find(&scrape.samples, "Current Cache Size").unwrap().value,
            MetricValue::Gauge(10.0)
        );
        assert_eq!(
            find(&scrape.samples, "Total Transactions").unwrap().value,
            MetricValue::Counter(50.0)
        );
    }

    #[test]
    fn test_dbus_short_property_emits_nothing() {
        let bus = MockBus::new()
            .with_property("CacheStatistics", vec![10, 100])
            .with_property("TransactionStatistics", vec![2, 50]);
        let err = StatsCollector::dbus(bus, false).collect().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Protocol);
    }

    #[test]
    fn test_cli_failure_propagates() {
        let runner = MockCommand::new().with_exit("systemd-resolve --statistics", 1, "");
        let err = StatsCollector::cli(runner, false).collect().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Start);
    }

    #[test]
    fn test_each_scrape_acquires_fresh() {
        let runner = MockCommand::typical_resolver();
        let collector = StatsCollector::cli(runner.clone(), false);
        collector.collect().unwrap();
        collector.collect().unwrap();
        assert_eq!(runner.calls(), 2);
    }

    #[test]
    fn test_counters_do_not_decrease() {
        let bus = MockBus::new()
            .with_property("CacheStatistics", vec![0, 0, 0])
            .with_property("TransactionStatistics", vec![0, 0]);
        let collector = StatsCollector::dbus(bus.clone(), false);

        let mut previous: Vec<(&str, f64)> = Vec::new();
        for step in 0..20u64 {
            // Gauges move both ways, counters only grow.
            let cache_size = if step % 2 == 0 { step } else { 1 };
            bus.set_property("CacheStatistics", vec![cache_size, step * 3, step * 7]);
            bus.set_property("TransactionStatistics", vec![step % 3, step * 11]);

            let scrape = collector.collect().unwrap();
            let counters: Vec<(&str, f64)> = scrape
                .samples
                .iter()
                .filter_map(|s| match s.value {
                    MetricValue::Counter(v) => Some((s.name, v)),
                    MetricValue::Gauge(_) => None,
                })
                .collect();
            for ((name, before), (_, after)) in previous.iter().zip(&counters) {
                assert!(after >= before, "{} went from {} to {}", name, before, after);
            }
            previous = counters;
        }
        assert_eq!(previous.len(), 3);
    }

    #[test]
    fn test_concurrent_scrapes() {
        let collector = Arc::new(StatsCollector::dbus(MockBus::typical_resolver(), true));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let collector = Arc::clone(&collector);
                std::thread::spawn(move || collector.collect().map(|s| s.samples.len()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 9);
        }
    }
}
