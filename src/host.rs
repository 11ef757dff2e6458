//! Collaborators supplied by the automation host.
//!
//! Adapters never own configuration, timers, or displayed values. They read a
//! fresh [`ConfigStore`] snapshot per operation, ask a [`Scheduler`] to arm or
//! disarm named one-shot timers, and publish values through a [`ValueStore`].
//! The in-memory implementations here are enough for embedding and tests.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

/// Read access to an instance's stored properties.
pub trait ConfigStore<T>: Send + Sync {
    /// Read the current settings. Called once per operation.
    fn snapshot(&self) -> Result<T, Box<dyn StdError + Send + Sync>>;
}

/// Arms and disarms named timers owned by the host.
pub trait Scheduler: Send + Sync {
    /// Set the interval of timer `name`; [`Duration::ZERO`] disarms it.
    fn set_interval(&self, name: &str, interval: Duration);
}

/// Persists values the host displays (for example the account balance).
pub trait ValueStore: Send + Sync {
    fn set_value(&self, key: &str, value: String);
}

impl<T, C> ConfigStore<T> for Arc<C>
where
    C: ConfigStore<T> + ?Sized,
{
    fn snapshot(&self) -> Result<T, Box<dyn StdError + Send + Sync>> {
        (**self).snapshot()
    }
}

#[derive(Debug, Default)]
/// [`ConfigStore`] backed by a value held in memory.
pub struct StaticConfig<T> {
    current: RwLock<T>,
}

impl<T> StaticConfig<T> {
    pub fn new(settings: T) -> Self {
        Self {
            current: RwLock::new(settings),
        }
    }

    /// Swap in new settings; later operations see them.
    pub fn replace(&self, settings: T) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }
}

impl<T: Clone + Send + Sync> ConfigStore<T> for StaticConfig<T> {
    fn snapshot(&self) -> Result<T, Box<dyn StdError + Send + Sync>> {
        Ok(self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[derive(Debug, Default)]
/// [`Scheduler`] that only records the requested intervals.
pub struct MemoryScheduler {
    intervals: Mutex<HashMap<String, Duration>>,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last interval requested for `name` ([`Duration::ZERO`] if never armed).
    pub fn interval(&self, name: &str) -> Duration {
        self.intervals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_armed(&self, name: &str) -> bool {
        !self.interval(name).is_zero()
    }
}

impl Scheduler for MemoryScheduler {
    fn set_interval(&self, name: &str, interval: Duration) {
        self.intervals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), interval);
    }
}

#[derive(Debug, Default)]
/// [`ValueStore`] keeping the latest value per key.
pub struct MemoryValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl ValueStore for MemoryValueStore {
    fn set_value(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_records_arm_and_disarm() {
        let scheduler = MemoryScheduler::new();
        assert!(!scheduler.is_armed("t"));
        scheduler.set_interval("t", Duration::from_secs(30));
        assert_eq!(scheduler.interval("t"), Duration::from_secs(30));
        scheduler.set_interval("t", Duration::ZERO);
        assert!(!scheduler.is_armed("t"));
    }

    #[test]
    fn static_config_returns_replaced_settings() {
        let config = StaticConfig::new(1_u32);
        assert_eq!(config.snapshot().unwrap(), 1);
        config.replace(2);
        assert_eq!(config.snapshot().unwrap(), 2);
    }

    #[test]
    fn value_store_overwrites() {
        let store = MemoryValueStore::new();
        store.set_value("k", "a".to_owned());
        store.set_value("k", "b".to_owned());
        assert_eq!(store.get("k").as_deref(), Some("b"));
        assert_eq!(store.get("other"), None);
    }
}
