//! Canned resolver states for tests.

use super::bus::MockBus;
use super::command::MockCommand;

/// Output of `systemd-resolve --statistics` on a lightly used host.
pub fn typical_statistics_output() -> &'static str {
    "\
DNSSEC supported by current servers: no

Transactions
Current Transactions: 0
  Total Transactions: 1294

Cache
  Current Cache Size: 12
          Cache Hits: 391
        Cache Misses: 903

DNSSEC Verdicts
              Secure: 0
            Insecure: 88
               Bogus: 2
       Indeterminate: 1
"
}

impl MockCommand {
    /// `systemd-resolve --statistics` answering with [`typical_statistics_output`].
    pub fn typical_resolver() -> Self {
        Self::new().with_output(
            "systemd-resolve --statistics",
            typical_statistics_output(),
        )
    }
}

impl MockBus {
    /// Resolver manager object matching [`typical_statistics_output`].
    pub fn typical_resolver() -> Self {
        Self::new()
            .with_property("CacheStatistics", vec![12, 391, 903])
            .with_property("TransactionStatistics", vec![0, 1294])
            .with_property("DNSSECStatistics", vec![0, 88, 2, 1])
    }
}
