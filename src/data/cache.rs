use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::LoadError;
use super::loader::load_file;
use super::model::Table;

/// Loaded tables keyed by source path.
///
/// A source is read once and then served from memory until it is
/// invalidated. Failed loads are not remembered.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, Arc<Table>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Table>, LoadError> {
        if let Some(table) = self.entries.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Forget one source. Returns whether it was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn serves_cached_table_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "a.csv", "Country,Confirmed\nA,1\n");

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap();
        write_csv(dir.path(), "a.csv", "Country,Confirmed\nA,1\nB,2\n");
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);

        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let mut cache = TableCache::new();
        assert!(cache.get_or_load(&path).unwrap_err().is_not_found());
        assert!(cache.is_empty());

        write_csv(dir.path(), "missing.csv", "location,confirmed\nA,3\n");
        assert!(cache.get_or_load(&path).is_ok());
        assert!(cache.contains(&path));
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
