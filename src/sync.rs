use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::catalog::{CatalogBatch, PgAttributeRow, PgProcRow, PgTypeRow};
use crate::error::Result;
use crate::oid::Oid;
use crate::registry::PgTypeRegistry;
use crate::type_info::PgType;

/// A [`PgTypeRegistry`] that can be shared between threads.
///
/// Each call holds the lock for its whole duration, so a lookup never observes a
/// half-applied ingestion batch. Use [`with`](Self::with) to group several calls.
///
/// A panic while the lock is held releases it; the visible cache only ever holds fully
/// resolved types, so the registry stays usable.
#[derive(Debug, Clone)]
pub struct SharedPgTypeRegistry {
    inner: Arc<Mutex<PgTypeRegistry>>,
}

impl SharedPgTypeRegistry {
    #[allow(missing_docs)]
    pub fn new(registry: PgTypeRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// See [`PgTypeRegistry::lookup`].
    pub fn lookup(&self, oid: Oid) -> Result<Option<Arc<PgType>>> {
        self.lock().lookup(oid)
    }

    /// See [`PgTypeRegistry::ingest`].
    pub fn ingest(
        &self,
        types: impl IntoIterator<Item = PgTypeRow>,
        attributes: impl IntoIterator<Item = PgAttributeRow>,
        procs: impl IntoIterator<Item = PgProcRow>,
    ) -> Result<()> {
        self.lock().ingest(types, attributes, procs)
    }

    /// See [`PgTypeRegistry::ingest_batch`].
    pub fn ingest_batch(&self, batch: CatalogBatch) -> Result<()> {
        self.lock().ingest_batch(batch)
    }

    /// Run `f` with exclusive access to the registry.
    pub fn with<R>(&self, f: impl FnOnce(&mut PgTypeRegistry) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, PgTypeRegistry> {
        self.inner.lock()
    }
}

impl From<PgTypeRegistry> for SharedPgTypeRegistry {
    fn from(registry: PgTypeRegistry) -> Self {
        Self::new(registry)
    }
}
