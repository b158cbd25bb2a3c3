use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}

/// Named string slots, the durable side of the cart.
///
/// Slots hold raw text; encoding is the caller's concern.
pub trait SlotStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: SlotStore + ?Sized> SlotStore for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

/// Process-local slots; nothing survives the process. Test builds also count
/// writes.
#[derive(Debug, Default)]
pub struct MemorySlot {
    slots: HashMap<String, String>,
    #[cfg(test)]
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot without counting it as a write.
    #[cfg(test)]
    pub fn with_slot(mut self, key: &str, value: &str) -> Self {
        self.slots.insert(key.to_string(), value.to_string());
        self
    }

    #[cfg(test)]
    pub fn writes(&self) -> usize {
        self.writes
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl SlotStore for MemorySlot {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        #[cfg(test)]
        {
            self.writes += 1;
        }
        Ok(())
    }
}
