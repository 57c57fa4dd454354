use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;

use super::KvStore;

/// In-memory key-value store.
///
/// The storage double for tests, and the backing for deployments that do
/// not want state to survive a restart.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("user").unwrap(), None);

        kv.set("user", "{}").unwrap();
        assert_eq!(kv.get("user").unwrap().as_deref(), Some("{}"));

        kv.remove("user").unwrap();
        assert_eq!(kv.get("user").unwrap(), None);
    }
}
