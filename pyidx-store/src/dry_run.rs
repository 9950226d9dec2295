use crate::{MemoryStore, ObjectStore, PutOptions, StoreResult};
use tracing::info;

/// Reads from the wrapped store; writes go to an in-memory overlay instead.
///
/// Later reads see earlier overlay writes, so a whole publish can be
/// rehearsed and the would-be objects inspected through [`DryRunStore::writes`].
pub struct DryRunStore<S> {
    inner: S,
    writes: MemoryStore,
}

impl<S: ObjectStore> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: MemoryStore::new(),
        }
    }

    pub fn writes(&self) -> &MemoryStore {
        &self.writes
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ObjectStore> ObjectStore for DryRunStore<S> {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn fetch(&self, key: &str) -> StoreResult<Vec<u8>> {
        match self.writes.get(key) {
            Some(body) => Ok(body),
            None => self.inner.fetch(key),
        }
    }

    fn store(&self, key: &str, body: &[u8], options: &PutOptions) -> StoreResult<()> {
        info!(
            key = %key,
            size = body.len(),
            content_type = %options.content_type,
            backend = self.inner.name(),
            "Dry run: not storing object"
        );
        self.writes.store(key, body, options)
    }
}
