// storage.rs - KeyStore over window.localStorage

use web_sys::Storage;

use crate::chat::{KeyStore, StorageError};

pub struct LocalStorageKeyStore {
    storage: Storage,
}

impl LocalStorageKeyStore {
    /// Fails when storage is disabled (private mode, blocked cookies).
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|e| StorageError::Backend(super::js_message(&e)))?
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl KeyStore for LocalStorageKeyStore {
    fn read(&self, name: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(name).map_err(|e| StorageError::Backend(super::js_message(&e)))
    }

    fn write(&self, name: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(name, value).map_err(|e| StorageError::Backend(super::js_message(&e)))
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        self.storage.remove_item(name).map_err(|e| StorageError::Backend(super::js_message(&e)))
    }
}
