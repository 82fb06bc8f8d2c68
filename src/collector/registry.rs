//! Catalog of exported resolver metrics.
//!
//! The catalog is fixed at startup. `name` is the label systemd-resolved uses
//! in its `--statistics` output and is the key shared by both acquisition
//! strategies; `exported_name` is the Prometheus metric name.

/// Namespace prefix for every exported metric.
pub const NAMESPACE: &str = "systemd_resolved";

/// Prometheus metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// Group a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricGroup {
    Base,
    Dnssec,
}

/// Description of a single exported metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub name: &'static str,
    pub exported_name: &'static str,
    pub kind: MetricKind,
    pub help: &'static str,
    pub group: MetricGroup,
}

const fn spec(
    name: &'static str,
    exported_name: &'static str,
    kind: MetricKind,
    help: &'static str,
    group: MetricGroup,
) -> MetricSpec {
    MetricSpec {
        name,
        exported_name,
        kind,
        help,
        group,
    }
}

const BASE_METRICS: [MetricSpec; 5] = [
    spec(
        "Current Transactions",
        "systemd_resolved_current_transactions",
        MetricKind::Gauge,
        "Current Transactions",
        MetricGroup::Base,
    ),
    spec(
        "Total Transactions",
        "systemd_resolved_transactions_total",
        MetricKind::Counter,
        "Total Transactions",
        MetricGroup::Base,
    ),
    spec(
        "Current Cache Size",
        "systemd_resolved_current_cache_size",
        MetricKind::Gauge,
        "Current Cache Size",
        MetricGroup::Base,
    ),
    spec(
        "Cache Hits",
        "systemd_resolved_cache_hits_total",
        MetricKind::Counter,
        "Total Cache Hits",
        MetricGroup::Base,
    ),
    spec(
        "Cache Misses",
        "systemd_resolved_cache_misses_total",
        MetricKind::Counter,
        "Total Cache Misses",
        MetricGroup::Base,
    ),
];

const DNSSEC_METRICS: [MetricSpec; 4] = [
    spec(
        "Secure",
        "systemd_resolved_dnssec_secure_total",
        MetricKind::Counter,
        "Total DNSSEC Secure verdicts",
        MetricGroup::Dnssec,
    ),
    spec(
        "Insecure",
        "systemd_resolved_dnssec_insecure_total",
        MetricKind::Counter,
        "Total DNSSEC Insecure verdicts",
        MetricGroup::Dnssec,
    ),
    spec(
        "Bogus",
        "systemd_resolved_dnssec_bogus_total",
        MetricKind::Counter,
        "Total DNSSEC Bogus verdicts",
        MetricGroup::Dnssec,
    ),
    spec(
        "Indeterminate",
        "systemd_resolved_dnssec_indeterminate_total",
        MetricKind::Counter,
        "Total DNSSEC Indeterminate verdicts",
        MetricGroup::Dnssec,
    ),
];

/// The set of metrics exported by this process.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    specs: Vec<MetricSpec>,
    include_dnssec: bool,
}

impl MetricRegistry {
    /// Builds the catalog. DNSSEC verdict counters are added only when
    /// `include_dnssec` is set.
    pub fn build(include_dnssec: bool) -> Self {
        let mut specs = BASE_METRICS.to_vec();
        if include_dnssec {
            specs.extend_from_slice(&DNSSEC_METRICS);
        }
        Self {
            specs,
            include_dnssec,
        }
    }

    pub fn includes_dnssec(&self) -> bool {
        self.include_dnssec
    }

    pub fn specs(&self) -> &[MetricSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&MetricSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_registry() {
        let registry = MetricRegistry::build(false);
        assert_eq!(registry.len(), 5);
        assert!(!registry.includes_dnssec());
        assert!(
            registry
                .specs()
                .iter()
                .all(|s| s.group == MetricGroup::Base)
        );
        for name in ["Secure", "Insecure", "Bogus", "Indeterminate"] {
            assert!(registry.get(name).is_none(), "{} must not be exported", name);
        }
    }

    #[test]
    fn test_dnssec_registry() {
        let registry = MetricRegistry::build(true);
        assert_eq!(registry.len(), 9);
        let dnssec = registry
            .specs()
            .iter()
            .filter(|s| s.group == MetricGroup::Dnssec)
            .count();
        assert_eq!(dnssec, 4);
        assert_eq!(registry.get("Bogus").unwrap().kind, MetricKind::Counter);
    }

    #[test]
    fn test_kinds() {
        let registry = MetricRegistry::build(false);
        assert_eq!(
            registry.get("Current Transactions").unwrap().kind,
            MetricKind::Gauge
        );
        assert_eq!(
            registry.get("Current Cache Size").unwrap().kind,
            MetricKind::Gauge
        );
        assert_eq!(registry.get("Cache Hits").unwrap().kind, MetricKind::Counter);
        assert_eq!(
            registry.get("Total Transactions").unwrap().exported_name,
            "systemd_resolved_transactions_total"
        );
    }

    #[test]
    fn test_exported_names_are_namespaced() {
        let registry = MetricRegistry::build(true);
        for spec in registry.specs() {
            assert!(spec.exported_name.starts_with(NAMESPACE));
            let kind_suffix = spec.exported_name.ends_with("_total");
            assert_eq!(kind_suffix, spec.kind == MetricKind::Counter);
        }
    }
}
