//! Lazily loaded, read-only division datasets.
//!
//! Three JSON documents back the store:
//!   data.json     { "110101": "东城区", ... }          current divisions
//!   history.json  { "110103": "崇文区", ... }          superseded divisions
//!   diff.json     { "410928": ["410927"], ... }        code reassignments
//!
//! The copies under `data/` are a sample; see the crate docs.
//!
//! Each is read at most once per store, on first access, and never mutated
//! afterwards. A missing file is an error; a file that does not parse as the
//! expected object is treated as an empty table.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::config::DataConfig;
use crate::error::{DivisionError, Result};

// ── CodeTable ────────────────────────────────────────────────────────────

/// A code-keyed table that remembers the order entries appeared in the
/// source document. Lookups are O(1); iteration follows file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

/// Division code → display name.
pub type DivisionMap = CodeTable<String>;

/// Superseded code → replacement ID-number prefixes.
pub type DiffMap = CodeTable<Vec<String>>;

impl<V> Default for CodeTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> CodeTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwritten entry keeps its original position.
    pub fn insert(&mut self, code: impl Into<String>, value: V) {
        let code = code.into();
        match self.index.get(&code) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(code.clone(), self.entries.len());
                self.entries.push((code, value));
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&V> {
        self.index.get(code).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CodeTable<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (code, value) in iter {
            table.insert(code, value);
        }
        table
    }
}

impl<V: Serialize> Serialize for CodeTable<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, value) in &self.entries {
            map.serialize_entry(code, value)?;
        }
        map.end()
    }
}

struct CodeTableVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for CodeTableVisitor<V> {
    type Value = CodeTable<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object keyed by division code")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut table = CodeTable::new();
        while let Some((code, value)) = access.next_entry::<String, V>()? {
            table.insert(code, value);
        }
        Ok(table)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for CodeTable<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(CodeTableVisitor(PhantomData))
    }
}

// ── Loading ──────────────────────────────────────────────────────────────

/// Read one dataset. Only an unreadable file is an error.
fn load_table<V: DeserializeOwned>(dataset: &'static str, path: &Path) -> Result<CodeTable<V>> {
    let bytes = fs::read(path).map_err(|source| DivisionError::DataUnavailable {
        dataset,
        path: path.to_path_buf(),
        source,
    })?;

    let table = match serde_json::from_slice::<CodeTable<V>>(&bytes) {
        Ok(table) => table,
        Err(e) => {
            warn!(dataset, path = %path.display(), error = %e, "malformed dataset, using an empty table");
            CodeTable::new()
        }
    };

    debug!(dataset, path = %path.display(), entries = table.len(), "loaded division dataset");
    Ok(table)
}

// ── DataStore ────────────────────────────────────────────────────────────

/// Owner of the three division tables.
///
/// Tables are populated on first access and then only read. Concurrent first
/// access is serialized by `load_guard`, so every file is parsed once.
#[derive(Debug)]
pub struct DataStore {
    config: DataConfig,
    current: OnceLock<DivisionMap>,
    historical: OnceLock<DivisionMap>,
    diff: OnceLock<DiffMap>,
    load_guard: Mutex<()>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new(DataConfig::default())
    }
}

impl DataStore {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            current: OnceLock::new(),
            historical: OnceLock::new(),
            diff: OnceLock::new(),
            load_guard: Mutex::new(()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(DataConfig::from_env())
    }

    /// A store whose tables are already populated; it never touches disk.
    pub fn preloaded(current: DivisionMap, historical: DivisionMap, diff: DiffMap) -> Self {
        let store = Self::default();
        let _ = store.current.set(current);
        let _ = store.historical.set(historical);
        let _ = store.diff.set(diff);
        store
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Current divisions (`data.json`).
    pub fn current(&self) -> Result<&DivisionMap> {
        self.get_or_load(&self.current, "current", DataConfig::current_path)
    }

    /// Superseded divisions (`history.json`).
    pub fn historical(&self) -> Result<&DivisionMap> {
        self.get_or_load(&self.historical, "historical", DataConfig::history_path)
    }

    /// Code reassignments (`diff.json`).
    pub fn diff(&self) -> Result<&DiffMap> {
        self.get_or_load(&self.diff, "diff", DataConfig::diff_path)
    }

    /// Number of tables populated so far (0..=3).
    pub fn loaded_count(&self) -> usize {
        [
            self.current.get().is_some(),
            self.historical.get().is_some(),
            self.diff.get().is_some(),
        ]
        .into_iter()
        .filter(|&loaded| loaded)
        .count()
    }

    /// Drop every cached table; the next access reads the files again.
    pub fn reset(&mut self) {
        self.current.take();
        self.historical.take();
        self.diff.take();
        debug!("division caches reset");
    }

    fn get_or_load<'a, V: DeserializeOwned>(
        &'a self,
        cell: &'a OnceLock<CodeTable<V>>,
        dataset: &'static str,
        path_of: fn(&DataConfig) -> PathBuf,
    ) -> Result<&'a CodeTable<V>> {
        if let Some(table) = cell.get() {
            return Ok(table);
        }

        let _guard = self
            .load_guard
            .lock()
            .map_err(|_| DivisionError::LockPoisoned)?;
        // Another thread may have finished loading while we waited.
        if let Some(table) = cell.get() {
            return Ok(table);
        }

        let table = load_table(dataset, &path_of(&self.config))?;
        Ok(cell.get_or_init(|| table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn write_datasets(dir: &Path, data: &str, history: &str, diff: &str) {
        fs::write(dir.join("data.json"), data).unwrap();
        fs::write(dir.join("history.json"), history).unwrap();
        fs::write(dir.join("diff.json"), diff).unwrap();
    }

    // ── CodeTable ────────────────────────────────────────────────────

    #[test]
    fn test_code_table_keeps_file_order() {
        let table: DivisionMap =
            serde_json::from_str(r#"{"130000":"河北省","110000":"北京市","120000":"天津市"}"#)
                .unwrap();
        let codes: Vec<&str> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["130000", "110000", "120000"]);
    }

    #[test]
    fn test_code_table_duplicate_key_last_wins_in_place() {
        let table: DivisionMap =
            serde_json::from_str(r#"{"110000":"旧","120000":"天津市","110000":"北京市"}"#)
                .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("110000").map(String::as_str), Some("北京市"));
        assert_eq!(table.iter().next().map(|(c, _)| c), Some("110000"));
    }

    #[test]
    fn test_code_table_serializes_as_object() {
        let table: DiffMap = [("410928", vec!["410927".to_string()])].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"{"410928":["410927"]}"#
        );
    }

    // ── Loading ──────────────────────────────────────────────────────

    #[test]
    fn test_loads_all_three_datasets() {
        let dir = tempfile::tempdir().unwrap();
        write_datasets(
            dir.path(),
            r#"{"110000":"北京市","110101":"东城区"}"#,
            r#"{"110103":"崇文区"}"#,
            r#"{"410928":["410927"]}"#,
        );
        let store = DataStore::new(DataConfig::with_dir(dir.path()));

        assert_eq!(store.loaded_count(), 0);
        assert_eq!(store.current().unwrap().len(), 2);
        assert_eq!(store.loaded_count(), 1);
        assert_eq!(
            store.historical().unwrap().get("110103").map(String::as_str),
            Some("崇文区")
        );
        assert_eq!(
            store.diff().unwrap().get("410928"),
            Some(&vec!["410927".to_string()])
        );
        assert_eq!(store.loaded_count(), 3);
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(DataConfig::with_dir(dir.path()));
        match store.current() {
            Err(DivisionError::DataUnavailable { dataset, path, .. }) => {
                assert_eq!(dataset, "current");
                assert!(path.ends_with("data.json"));
            }
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
        // Not cached: still failing on the next call.
        assert!(store.current().is_err());
        assert_eq!(store.loaded_count(), 0);
    }

    #[test]
    fn test_malformed_json_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        write_datasets(dir.path(), "{not json", "", r#"["410927"]"#);
        let store = DataStore::new(DataConfig::with_dir(dir.path()));
        assert!(store.current().unwrap().is_empty());
        assert!(store.historical().unwrap().is_empty());
        // valid JSON, wrong shape
        assert!(store.diff().unwrap().is_empty());
    }

    #[test]
    fn test_null_document_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        write_datasets(dir.path(), "null", "{}", "{}");
        let store = DataStore::new(DataConfig::with_dir(dir.path()));
        assert!(store.current().unwrap().is_empty());
    }

    #[test]
    fn test_loads_once_until_reset() {
        let dir = tempfile::tempdir().unwrap();
        write_datasets(dir.path(), r#"{"110000":"北京市"}"#, "{}", "{}");
        let mut store = DataStore::new(DataConfig::with_dir(dir.path()));
        assert_eq!(store.current().unwrap().len(), 1);

        fs::write(
            dir.path().join("data.json"),
            r#"{"110000":"北京市","120000":"天津市"}"#,
        )
        .unwrap();
        assert_eq!(store.current().unwrap().len(), 1);

        store.reset();
        assert_eq!(store.loaded_count(), 0);
        assert_eq!(store.current().unwrap().len(), 2);
    }

    #[test]
    fn test_concurrent_first_access_sees_one_table() {
        let dir = tempfile::tempdir().unwrap();
        write_datasets(dir.path(), r#"{"110000":"北京市"}"#, "{}", "{}");
        let store = Arc::new(DataStore::new(DataConfig::with_dir(dir.path())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.current().unwrap() as *const DivisionMap as usize)
            })
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_preloaded_never_reads_disk() {
        let store = DataStore::preloaded(
            [("110000", "北京市".to_string())].into_iter().collect(),
            DivisionMap::new(),
            DiffMap::new(),
        );
        assert_eq!(store.loaded_count(), 3);
        assert_eq!(store.current().unwrap().len(), 1);
    }
}
