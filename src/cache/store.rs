//! File-backed gas-table store with an atomic merge contract.
//!
//! The store keeps one JSON object mapping contract address to its latest
//! accepted gas table. Callers never see the read-compare-write sequence:
//! `merge_entry` decides and reports whether the new table won.

use crate::aggregator::GasTable;
use crate::utils::error::CacheError;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persisted mapping from contract address to gas table
pub struct GasCacheStore {
    path: PathBuf,
}

impl GasCacheStore {
    /// Create a store over the given cache file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries.
    ///
    /// An absent file is an empty cache. A file that fails to parse is
    /// also treated as empty: the next successful merge rewrites it, so a
    /// damaged cache self-heals instead of wedging every future run.
    pub fn load(&self) -> Result<BTreeMap<String, GasTable>, CacheError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("cache file {} does not exist yet", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(CacheError::Io(e)),
        };

        match serde_json::from_reader(file) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    "cache file {} is unreadable ({}); treating as empty",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Stored table for one address, if any
    pub fn get(&self, address: &str) -> Result<Option<GasTable>, CacheError> {
        Ok(self.load()?.remove(&address.to_ascii_lowercase()))
    }

    /// Merge one address's freshly computed table
    ///
    /// **Public** - the only write operation on the store
    ///
    /// The new table replaces the stored entry iff no entry exists yet or
    /// the new table is backed by strictly more transactions. Equal
    /// evidence keeps the stored entry, so re-merging the same table is a
    /// no-op and two runs over the same window cannot flap.
    ///
    /// # Returns
    /// Whether the stored entry was replaced.
    pub fn merge_entry(&self, address: &str, table: &GasTable) -> Result<bool, CacheError> {
        if table.is_empty() {
            // An empty table is "nothing to contribute", never evidence.
            warn!("refusing to merge empty gas table for {}", address);
            return Ok(false);
        }

        let address = address.to_ascii_lowercase();
        let mut entries = self.load()?;

        if let Some(stored) = entries.get(&address) {
            if table.count <= stored.count {
                info!(
                    "keeping entry for {} ({} transactions stored, {} offered)",
                    address, stored.count, table.count
                );
                return Ok(false);
            }
        }

        entries.insert(address.clone(), table.clone());
        self.write_atomic(&entries)?;

        info!(
            "stored entry for {} backed by {} transactions",
            address, table.count
        );
        Ok(true)
    }

    /// Rewrite the whole object via temp file + rename.
    ///
    /// A concurrent reader sees either the old file or the new one, never
    /// a partial write, and a failed write leaves the old file intact.
    ///
    /// **Private** - internal write path
    fn write_atomic(&self, entries: &BTreeMap<String, GasTable>) -> Result<(), CacheError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CacheError::Io(e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::MethodStats;

    fn table(count: u64) -> GasTable {
        let mut methods = BTreeMap::new();
        methods.insert(
            "0x3df02124".to_string(),
            MethodStats {
                avg_gas: 90_000.0,
                count,
            },
        );
        GasTable { methods, count }
    }

    #[test]
    fn test_missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = GasCacheStore::new(dir.path().join("cache.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_first_merge_creates_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = GasCacheStore::new(dir.path().join("cache.json"));

        let replaced = store.merge_entry("0xPool", &table(1)).unwrap();

        assert!(replaced);
        let stored = store.get("0xpool").unwrap().unwrap();
        assert_eq!(stored.count, 1);
    }

    #[test]
    fn test_empty_table_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = GasCacheStore::new(dir.path().join("cache.json"));

        let empty = GasTable {
            methods: BTreeMap::new(),
            count: 0,
        };
        assert!(!store.merge_entry("0xpool", &empty).unwrap());
        assert!(store.get("0xpool").unwrap().is_none());
    }

    #[test]
    fn test_addresses_merge_independently() {
        let dir = tempfile::tempdir().unwrap();
        let store = GasCacheStore::new(dir.path().join("cache.json"));

        store.merge_entry("0xaaa", &table(5)).unwrap();
        store.merge_entry("0xbbb", &table(3)).unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["0xaaa"].count, 5);
        assert_eq!(entries["0xbbb"].count, 3);
    }
}
