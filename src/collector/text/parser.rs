//! Parser for the resolver's human-readable statistics.
//!
//! The input looks like:
//!
//! ```text
//! DNSSEC supported by current servers: no
//!
//! Transactions
//! Current Transactions: 0
//!   Total Transactions: 1294
//!
//! Cache
//!   Current Cache Size: 12
//!           Cache Hits: 391
//!         Cache Misses: 903
//! ```
//!
//! Only `<label>: <digits>` lines are statistics; headings, blank lines and
//! `yes`/`no` flags are skipped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::collector::snapshot::StatSnapshot;

/// A label of letters and spaces, a colon, then a bare integer.
static STAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z ]+:\s*\d+\s*$").expect("stat line pattern is valid")
});

/// Parses a single statistics line.
///
/// Returns `None` for lines that are not statistics. A value that matches the
/// pattern but does not parse as a number (for example non-ASCII digits) is
/// reported as `0.0`.
pub fn parse_stat_line(line: &str) -> Option<(&str, f64)> {
    if !STAT_LINE.is_match(line) {
        return None;
    }

    let (label, raw) = line.split_once(':')?;
    let key = label.trim();
    let raw = raw.trim();
    let value = match raw.parse::<f64>() {
        Ok(v) => v,
        Err(e) => {
            debug!(key, raw, error = %e, "unparseable statistic value, using 0");
            0.0
        }
    };

    Some((key, value))
}

/// Parses the full command output into a snapshot.
pub fn parse_statistics(content: &str) -> StatSnapshot {
    let mut snapshot = StatSnapshot::new();
    for line in content.lines() {
        if let Some((key, value)) = parse_stat_line(line) {
            debug!(key, value, "parsed statistic");
            snapshot.insert(key, value);
        }
    }
    snapshot
}
