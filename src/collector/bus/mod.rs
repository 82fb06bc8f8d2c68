//! Statistics acquisition from the `org.freedesktop.resolve1` bus object.
//!
//! systemd-resolved publishes three statistics properties on its manager
//! interface. Each is a fixed-width tuple of `u64` counters whose position
//! determines the statistic:
//!
//! | property                | values                                           |
//! |-------------------------|--------------------------------------------------|
//! | `CacheStatistics`       | current cache size, cache hits, cache misses     |
//! | `TransactionStatistics` | current transactions, total transactions         |
//! | `DNSSECStatistics`      | secure, insecure, bogus, indeterminate verdicts  |

mod system;

pub use system::{MANAGER_INTERFACE, OBJECT_PATH, SERVICE_NAME, SystemBus};

use tracing::debug;

use crate::collector::error::CollectError;
use crate::collector::snapshot::StatSnapshot;
use crate::collector::traits::ResolverBus;

/// A statistics property and the statistic names of its positions.
#[derive(Debug, Clone, Copy)]
pub struct StatProperty {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

pub const CACHE_STATISTICS: StatProperty = StatProperty {
    name: "CacheStatistics",
    fields: &["Current Cache Size", "Cache Hits", "Cache Misses"],
};

pub const TRANSACTION_STATISTICS: StatProperty = StatProperty {
    name: "TransactionStatistics",
    fields: &["Current Transactions", "Total Transactions"],
};

pub const DNSSEC_STATISTICS: StatProperty = StatProperty {
    name: "DNSSECStatistics",
    fields: &["Secure", "Insecure", "Bogus", "Indeterminate"],
};

/// Acquires statistics by reading properties over the bus.
pub struct BusStatsReader<B: ResolverBus> {
    bus: B,
    properties: Vec<StatProperty>,
}

impl<B: ResolverBus> BusStatsReader<B> {
    /// Creates a reader. `DNSSECStatistics` is only ever requested when
    /// `include_dnssec` is set.
    pub fn new(bus: B, include_dnssec: bool) -> Self {
        let mut properties = vec![CACHE_STATISTICS, TRANSACTION_STATISTICS];
        if include_dnssec {
            properties.push(DNSSEC_STATISTICS);
        }
        Self { bus, properties }
    }

    /// Reads all configured properties and maps them onto statistic names.
    ///
    /// Fails as a whole if any property is unreadable or too short.
    pub fn read(&self) -> Result<StatSnapshot, CollectError> {
        let names: Vec<&str> = self.properties.iter().map(|p| p.name).collect();
        let values = self.bus.read_statistics(&names)?;

        if values.len() != self.properties.len() {
            return Err(CollectError::PropertyRead {
                property: names.join(","),
                message: format!(
                    "bus returned {} properties, requested {}",
                    values.len(),
                    self.properties.len()
                ),
            });
        }

        let mut snapshot = StatSnapshot::new();
        for (property, raw) in self.properties.iter().zip(values) {
            if raw.len() < property.fields.len() {
                return Err(CollectError::ShortProperty {
                    property: property.name.to_string(),
                    expected: property.fields.len(),
                    actual: raw.len(),
                });
            }
            debug!(property = property.name, values = ?raw, "read statistics property");
            for (field, value) in property.fields.iter().zip(raw) {
                snapshot.insert(*field, value as f64);
            }
        }

        Ok(snapshot)
    }
}
