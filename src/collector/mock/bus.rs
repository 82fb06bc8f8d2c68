//! Mock resolver bus.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::collector::error::CollectError;
use crate::collector::traits::ResolverBus;

#[derive(Debug, Default)]
struct State {
    properties: HashMap<String, Vec<u64>>,
    requests: Vec<Vec<String>>,
}

/// Bus that serves statistics properties from memory.
///
/// Clones share state, so a test can keep a handle, hand a clone to a
/// collector, then update properties or inspect the requests made.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<State>>,
    unavailable: bool,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus on which the resolver service is not running.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_property(self, name: &str, values: Vec<u64>) -> Self {
        self.set_property(name, values);
        self
    }

    pub fn set_property(&self, name: &str, values: Vec<u64>) {
        self.lock().properties.insert(name.to_string(), values);
    }

    /// Property names requested by each read, oldest first.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResolverBus for MockBus {
    fn read_statistics(&self, properties: &[&str]) -> Result<Vec<Vec<u64>>, CollectError> {
        if self.unavailable {
            return Err(CollectError::ServiceUnavailable(
                "org.freedesktop.resolve1 is not activatable".to_string(),
            ));
        }

        let mut state = self.lock();
        state
            .requests
            .push(properties.iter().map(|p| p.to_string()).collect());

        properties
            .iter()
            .map(|name| {
                state
                    .properties
                    .get(*name)
                    .cloned()
                    .ok_or_else(|| CollectError::PropertyRead {
                        property: name.to_string(),
                        message: "unknown property".to_string(),
                    })
            })
            .collect()
    }
}
