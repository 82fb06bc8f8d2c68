//! Prometheus text exposition of scrape samples.
//!
//! Samples are loaded into a registry built for the single scrape, so nothing
//! from a previous scrape can leak into the output.

use prometheus::{Counter, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::collector::{MetricValue, Sample};

/// Content type of [`encode`] output.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Renders samples in the Prometheus text format.
pub fn encode(samples: &[Sample]) -> Result<String, prometheus::Error> {
    let registry = Registry::new();

    for sample in samples {
        let opts = Opts::new(sample.exported_name, sample.help);
        match sample.value {
            MetricValue::Counter(v) => {
                if v.is_nan() || v < 0.0 {
                    return Err(prometheus::Error::Msg(format!(
                        "counter {} has invalid value {}",
                        sample.exported_name, v
                    )));
                }
                let counter = Counter::with_opts(opts)?;
                counter.inc_by(v);
                registry.register(Box::new(counter))?;
            }
            MetricValue::Gauge(v) => {
                let gauge = Gauge::with_opts(opts)?;
                gauge.set(v);
                registry.register(Box::new(gauge))?;
            }
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockCommand, StatsCollector};

    #[test]
    fn test_encode_types_and_values() {
        let collector = StatsCollector::cli(MockCommand::typical_resolver(), false);
        let scrape = collector.collect().unwrap();
        let text = encode(&scrape.samples).unwrap();

        assert!(text.contains("# HELP systemd_resolved_cache_hits_total Total Cache Hits"));
        assert!(text.contains("# TYPE systemd_resolved_cache_hits_total counter"));
        assert!(text.contains("systemd_resolved_cache_hits_total 391"));
        assert!(text.contains("# TYPE systemd_resolved_current_cache_size gauge"));
        assert!(text.contains("systemd_resolved_current_cache_size 12"));
        assert!(text.contains("systemd_resolved_transactions_total 1294"));
        assert!(!text.contains("dnssec"));
    }

    #[test]
    fn test_encode_only_present_metrics() {
        let runner = MockCommand::new().with_output(
            "systemd-resolve --statistics",
            "Current Transactions: 5\nGarbage line\nCache Hits: 120\n",
        );
        let scrape = StatsCollector::cli(runner, false).collect().unwrap();
        let text = encode(&scrape.samples).unwrap();

        let sample_lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(
            sample_lines,
            vec![
                "systemd_resolved_cache_hits_total 120",
                "systemd_resolved_current_transactions 5",
            ]
        );
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[]).unwrap(), "");
    }

    #[test]
    fn test_encode_rejects_negative_counter() {
        let sample = Sample {
            name: "Cache Hits",
            exported_name: "systemd_resolved_cache_hits_total",
            help: "Total Cache Hits",
            value: MetricValue::Counter(-1.0),
        };
        assert!(encode(&[sample]).is_err());
    }
}
