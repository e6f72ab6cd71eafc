use crate::application::ports::KeyValueStore;
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local key value slots, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let values = self
            .values
            .read()
            .map_err(|_| AppError::Storage("key value store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| AppError::Storage("key value store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| AppError::Storage("key value store lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}
