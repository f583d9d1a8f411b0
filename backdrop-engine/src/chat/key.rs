// key.rs - Visitor-supplied access key
//
// The key lives in one named slot of a KeyStore (local storage in the
// browser). ApiKeyContext is handed to the chat widget at construction
// instead of living in a page global.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub trait KeyStore {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, name: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, name: &str) -> Result<(), StorageError>;
}

impl<S: KeyStore + ?Sized> KeyStore for Box<S> {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError> {
        (**self).read(name)
    }

    fn write(&self, name: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(name, value)
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        (**self).remove(name)
    }
}

/// In-memory store; clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(name).cloned())
    }

    fn write(&self, name: &str, value: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().remove(name);
        Ok(())
    }
}

pub struct ApiKeyContext<S> {
    store: S,
    name: String,
    current: Option<String>,
}

impl<S: KeyStore> ApiKeyContext<S> {
    /// Read the stored key. An unreadable store behaves like an empty one.
    pub fn load(store: S, name: impl Into<String>) -> Self {
        let name = name.into();
        let current = match store.read(&name) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(err) => {
                log::warn!("could not read stored key: {err}");
                None
            }
        };
        Self { store, name, current }
    }

    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    /// Persist `key`; a blank key clears instead.
    pub fn set(&mut self, key: &str) -> Result<(), StorageError> {
        let key = key.trim();
        if key.is_empty() {
            return self.clear();
        }
        self.store.write(&self.name, key)?;
        self.current = Some(key.to_owned());
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(&self.name)?;
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_survives_reload() {
        let store = MemoryKeyStore::new();
        let mut ctx = ApiKeyContext::load(store.clone(), "scholarAiApiKey");
        assert_eq!(ctx.get(), None);

        ctx.set("abc123").unwrap();
        let reloaded = ApiKeyContext::load(store.clone(), "scholarAiApiKey");
        assert_eq!(reloaded.get(), Some("abc123"));

        ctx.clear().unwrap();
        let reloaded = ApiKeyContext::load(store, "scholarAiApiKey");
        assert_eq!(reloaded.get(), None);
    }

    #[test]
    fn blank_key_clears() {
        let store = MemoryKeyStore::new();
        let mut ctx = ApiKeyContext::load(store.clone(), "k");
        ctx.set("value").unwrap();
        ctx.set("   ").unwrap();
        assert!(!ctx.is_set());
        assert_eq!(store.read("k").unwrap(), None);
    }

    struct Broken;

    impl KeyStore for Broken {
        fn read(&self, _: &str) -> Result<Option<String>, StorageError> { Err(StorageError::Unavailable) }
        fn write(&self, _: &str, _: &str) -> Result<(), StorageError> { Err(StorageError::Unavailable) }
        fn remove(&self, _: &str) -> Result<(), StorageError> { Err(StorageError::Unavailable) }
    }

    #[test]
    fn unavailable_store_degrades() {
        let mut ctx = ApiKeyContext::load(Broken, "k");
        assert_eq!(ctx.get(), None);
        assert!(ctx.set("x").is_err());
        assert_eq!(ctx.get(), None);
    }
}
