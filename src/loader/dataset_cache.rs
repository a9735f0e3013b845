use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::csv_loader::{CsvLoader, DataLoadError, DataSource};
use crate::models::Dataset;

/// Path-keyed cache of loaded datasets, owned by whoever drives the pipeline.
///
/// Entries live until invalidated; the file is not watched for changes.
pub struct DatasetCache {
    loader: CsvLoader,
    entries: HashMap<PathBuf, Dataset>,
}

impl DatasetCache {
    pub fn new(loader: CsvLoader) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
        }
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Dataset, DataLoadError> {
        let path = path.as_ref();

        if let Some(dataset) = self.entries.get(path) {
            debug!("Cache hit for {}", path.display());
            return Ok(dataset.clone());
        }

        let dataset = self.loader.load_path(path)?;
        self.entries.insert(path.to_path_buf(), dataset.clone());
        info!("Cached {} ({} entries)", path.display(), self.entries.len());

        Ok(dataset)
    }

    /// Path sources go through the cache, uploads never do.
    pub fn load_source(&mut self, source: DataSource<'_>) -> Result<Dataset, DataLoadError> {
        match source {
            DataSource::Path(path) => self.load(path),
            DataSource::Upload(bytes) => self.loader.load_upload(bytes),
        }
    }

    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        let removed = self.entries.remove(path.as_ref()).is_some();
        if removed {
            info!("Invalidated cache entry for {}", path.as_ref().display());
        }
        removed
    }

    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<Dataset, DataLoadError> {
        self.invalidate(path.as_ref());
        self.load(path)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
