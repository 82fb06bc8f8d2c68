//! Per-scrape statistics snapshot.

use std::collections::HashMap;

/// Mapping from statistic name to value, produced fresh by every acquisition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSnapshot {
    values: HashMap<String, f64>,
}

impl StatSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value. A later insert for the same name wins.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for StatSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (name, value) in iter {
            snapshot.insert(name, value);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_iter() {
        let mut snapshot = StatSnapshot::new();
        snapshot.insert("Cache Hits", 1.0);
        snapshot.insert("Cache Hits", 2.0);
        snapshot.insert("Cache Misses", 3.0);

        let mut entries: Vec<(&str, f64)> = snapshot.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        assert_eq!(entries, vec![("Cache Hits", 2.0), ("Cache Misses", 3.0)]);
    }

    #[test]
    fn test_from_iter() {
        let snapshot: StatSnapshot = [("Bogus", 4.0)].into_iter().collect();
        assert!(snapshot.contains("Bogus"));
        assert_eq!(snapshot.get("Secure"), None);
    }
}
