//! Read-through cache for the loaded dataset.
//!
//! The trade sheet is read at most once per process. The first caller runs
//! the loader; concurrent callers block on the same initializer and then
//! share the resulting `Arc<Dataset>`. A failed load is not cached, so the
//! error goes back to whoever asked and the next request tries again.

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::error::LoadResult;
use crate::loader::{self, DataSource, Dataset};

type Loader = Box<dyn Fn() -> LoadResult<Dataset> + Send + Sync>;

/// Memoized dataset shared by every request.
pub struct DatasetCache {
    loader: Loader,
    dataset: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    /// Cache backed by a file on disk.
    pub fn new(source: DataSource) -> Self {
        Self::with_loader(move || loader::load(&source))
    }

    /// Cache backed by an arbitrary loader.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> LoadResult<Dataset> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            dataset: OnceCell::new(),
        }
    }

    /// Cache that starts out populated.
    pub fn preloaded(dataset: Dataset) -> Self {
        let dataset = Arc::new(dataset);
        let fallback = dataset.clone();
        let cache = Self::with_loader(move || Ok(Dataset::clone(&fallback)));
        let _ = cache.dataset.set(dataset);
        cache
    }

    /// The dataset, loading it on first use.
    pub fn get(&self) -> LoadResult<Arc<Dataset>> {
        self.dataset
            .get_or_try_init(|| (self.loader)().map(Arc::new))
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }
}
