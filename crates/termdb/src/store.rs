//! The document store: database handle plus JSON-LD processor.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use termdb_storage::backends::redb::{RedbConfig, RedbEngine};

use crate::collection::Collection;
use crate::error::Result;
use crate::jsonld::{InlineContextProcessor, JsonLdProcessor};

/// Configuration for opening a [`Store`].
///
/// # Example
///
/// ```no_run
/// use termdb::{Store, StoreConfig};
///
/// # fn main() -> Result<(), termdb::Error> {
/// let store = Store::open_with_config(
///     "documents.db",
///     StoreConfig::new().sync_writes(false),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    sync_writes: bool,
    cache_size: Option<usize>,
    processor: Option<Arc<dyn JsonLdProcessor>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { sync_writes: true, cache_size: None, processor: None }
    }
}

impl StoreConfig {
    /// A configuration with default values: synchronous commits, default
    /// cache, the built-in inline-context processor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether commits fsync before returning. Turn off for tests.
    #[must_use]
    pub const fn sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Set the storage cache size in bytes.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Inject a JSON-LD processor, replacing the built-in one.
    #[must_use]
    pub fn processor(mut self, processor: Arc<dyn JsonLdProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }
}

/// The entry point: owns the database handle and the JSON-LD processor, and
/// hands out [`Collection`]s.
///
/// A store is cheap to share behind the collections it creates; dropping
/// the store and all collections closes the database.
pub struct Store {
    engine: Arc<RedbEngine>,
    processor: Arc<dyn JsonLdProcessor>,
}

impl Store {
    /// Open or create a store at `path` with default configuration.
    ///
    /// # Errors
    ///
    /// Propagates storage open errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open or create a store at `path`.
    ///
    /// On Unix the database file is restricted to the owning user (mode
    /// `0600`).
    ///
    /// # Errors
    ///
    /// Propagates storage open errors.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let mut redb_config = RedbConfig::new().sync_writes(config.sync_writes);
        if let Some(cache_size) = config.cache_size {
            redb_config = redb_config.cache_size(cache_size);
        }

        let engine = RedbEngine::open_with_config(path.as_ref(), redb_config)?;

        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path.as_ref(), Permissions::from_mode(0o600))
                .map_err(termdb_storage::StorageError::Io)?;
        }

        info!(path = %path.as_ref().display(), "opened document store");

        Ok(Self {
            engine: Arc::new(engine),
            processor: config
                .processor
                .unwrap_or_else(|| Arc::new(InlineContextProcessor::new())),
        })
    }

    /// An in-memory store for tests; contents are lost on drop.
    ///
    /// # Errors
    ///
    /// Propagates storage open errors.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            engine: Arc::new(RedbEngine::in_memory()?),
            processor: Arc::new(InlineContextProcessor::new()),
        })
    }

    /// An in-memory store with a custom JSON-LD processor.
    ///
    /// # Errors
    ///
    /// Propagates storage open errors.
    pub fn in_memory_with_processor(processor: Arc<dyn JsonLdProcessor>) -> Result<Self> {
        Ok(Self { engine: Arc::new(RedbEngine::in_memory()?), processor })
    }

    /// A handle onto the named collection. Handles start with no attached
    /// indices; attach them with [`Collection::add_index`].
    #[must_use]
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(name.to_owned(), Arc::clone(&self.engine), Arc::clone(&self.processor))
    }

    /// The underlying storage engine.
    ///
    /// This is primarily for advanced use cases and tests.
    #[must_use]
    pub fn engine(&self) -> Arc<RedbEngine> {
        Arc::clone(&self.engine)
    }
}
