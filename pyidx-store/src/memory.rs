use crate::{validate_key, ObjectStore, PutOptions, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    options: Option<PutOptions>,
}

/// Objects held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object without going through [`ObjectStore::store`].
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects().insert(
            key.into(),
            StoredObject {
                body: body.into(),
                options: None,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects().get(key).map(|object| object.body.clone())
    }

    /// Options recorded by the last `store` at `key`.
    pub fn options(&self, key: &str) -> Option<PutOptions> {
        self.objects().get(key).and_then(|object| object.options.clone())
    }

    /// Every key, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn fetch(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn store(&self, key: &str, body: &[u8], options: &PutOptions) -> StoreResult<()> {
        validate_key(key)?;
        self.objects().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                options: Some(options.clone()),
            },
        );
        Ok(())
    }
}
