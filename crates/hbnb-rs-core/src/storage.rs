//! Whole-file JSON storage for live records.
//!
//! The backing file is a single JSON object mapping `"<TypeName>.<id>"` to the
//! record's persisted map. Every save rewrites the whole file through a
//! temporary sibling that is renamed over the target.

use crate::clock::{Clock, SystemClock};
use crate::error::{EntryError, StorageError};
use crate::model::{CLASS_KEY, Record, record_key};
use crate::types::TypeRegistry;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An entry that reload could not turn into a record.
#[derive(Debug)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: EntryError,
}

/// Outcome of a reload.
#[derive(Debug, Default)]
pub struct ReloadReport {
    /// Entries placed into the table.
    pub loaded: usize,
    /// Entries left out, with the reason.
    pub skipped: Vec<SkippedEntry>,
}

/// Process-wide table of live records plus its backing file.
pub struct FileStorage {
    /// Location of the backing file.
    path: PathBuf,
    /// Pretty-print the backing file.
    pretty: bool,
    /// Live records keyed by `"<TypeName>.<id>"`, in insertion order.
    objects: IndexMap<String, Record>,
    /// Kinds known to reload and `create`.
    types: TypeRegistry,
    /// Time source for creation and saves.
    clock: Arc<dyn Clock>,
}

impl FileStorage {
    /// Create an empty storage backed by `path`; nothing is read yet.
    pub fn new(path: impl AsRef<Path>, types: TypeRegistry) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!("initialized file storage (path={})", path.display());
        Self {
            path,
            pretty: false,
            objects: IndexMap::new(),
            types,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a storage and load whatever the backing file holds.
    pub fn open(path: impl AsRef<Path>, types: TypeRegistry) -> Result<Self, StorageError> {
        let mut storage = Self::new(path, types);
        storage.reload()?;
        Ok(storage)
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Toggle pretty-printed output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Current time from the configured clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// The live table.
    pub fn all(&self) -> &IndexMap<String, Record> {
        &self.objects
    }

    /// Mutable access to the live table itself, not a copy.
    ///
    /// Removing entries here is how the console destroys records. Changes are
    /// only written by the next `save`.
    pub fn all_mut(&mut self) -> &mut IndexMap<String, Record> {
        &mut self.objects
    }

    /// Insert a record at its key, replacing any record already there.
    pub fn register(&mut self, record: Record) {
        let key = record.key();
        debug!("registering record (key={key})");
        self.objects.insert(key, record);
    }

    /// Build a fresh record of `kind` and register it.
    pub fn create(&mut self, kind: &str) -> Result<&Record, StorageError> {
        let model = self
            .types
            .get(kind)
            .ok_or_else(|| StorageError::UnknownType(kind.to_string()))?;
        let record = model.instantiate(self.clock.now());
        let key = record.key();
        info!("created record (key={key})");
        let (index, _) = self.objects.insert_full(key, record);
        Ok(&self.objects[index])
    }

    pub fn get(&self, kind: &str, id: &str) -> Option<&Record> {
        self.objects.get(&record_key(kind, id))
    }

    pub fn get_mut(&mut self, kind: &str, id: &str) -> Option<&mut Record> {
        self.objects.get_mut(&record_key(kind, id))
    }

    /// Remove a record from the table without saving.
    pub fn remove(&mut self, kind: &str, id: &str) -> Option<Record> {
        let removed = self.objects.shift_remove(&record_key(kind, id));
        if removed.is_some() {
            info!("removed record (key={})", record_key(kind, id));
        }
        removed
    }

    /// Records of one kind, in table order.
    pub fn all_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.objects
            .values()
            .filter(move |record| record.kind() == kind)
    }

    /// Number of records, optionally restricted to one kind.
    pub fn count(&self, kind: Option<&str>) -> usize {
        match kind {
            Some(kind) => self.all_of(kind).count(),
            None => self.objects.len(),
        }
    }

    /// Stamp a record's `updated_at` and write the whole table.
    pub fn save_record(&mut self, key: &str) -> Result<(), StorageError> {
        let now = self.clock.now();
        let record = self
            .objects
            .get_mut(key)
            .ok_or_else(|| StorageError::UnknownKey(key.to_string()))?;
        record.touch(now);
        self.save()
    }

    /// Serialize the entire table to the backing file.
    pub fn save(&self) -> Result<(), StorageError> {
        let mut document = Map::new();
        for (key, record) in &self.objects {
            document.insert(key.clone(), Value::Object(record.to_map()));
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        if let Err(err) = self.write_document(&temp_path, &document) {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::Io(err));
        }
        debug!(
            "saved storage (path={}, records={})",
            self.path.display(),
            document.len()
        );
        Ok(())
    }

    /// Write pending state on shutdown.
    pub fn flush(&self) -> Result<(), StorageError> {
        info!("flushing storage (path={})", self.path.display());
        self.save()
    }

    /// Load the backing file into the table.
    ///
    /// A missing file leaves the table untouched. Stored entries replace live
    /// records with the same key; entries with an unknown or missing type, or
    /// that fail to rebuild, are skipped and reported.
    pub fn reload(&mut self) -> Result<ReloadReport, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("storage file missing (path={})", self.path.display());
                return Ok(ReloadReport::default());
            }
            Err(err) => return Err(StorageError::Io(err)),
        };

        let document: Value = serde_json::from_str(&contents)?;
        let Value::Object(entries) = document else {
            return Err(StorageError::Corrupt {
                path: self.path.clone(),
                reason: "top level is not an object".to_string(),
            });
        };

        let now = self.clock.now();
        let mut report = ReloadReport::default();
        for (key, entry) in entries {
            match self.reconstruct_entry(&entry, now) {
                Ok(record) => {
                    self.objects.insert(key, record);
                    report.loaded += 1;
                }
                Err(reason) => {
                    warn!("skipping stored entry (key={key}): {reason}");
                    report.skipped.push(SkippedEntry { key, reason });
                }
            }
        }
        info!(
            "reloaded storage (path={}, loaded={}, skipped={})",
            self.path.display(),
            report.loaded,
            report.skipped.len()
        );
        Ok(report)
    }

    fn reconstruct_entry(&self, entry: &Value, now: NaiveDateTime) -> Result<Record, EntryError> {
        let map = entry.as_object().ok_or(EntryError::NotAnObject)?;
        let kind = map
            .get(CLASS_KEY)
            .and_then(Value::as_str)
            .ok_or(EntryError::MissingClass)?;
        let model = self
            .types
            .get(kind)
            .ok_or_else(|| EntryError::UnknownType(kind.to_string()))?;
        Ok(model.reconstruct(map, now)?)
    }

    fn write_document(
        &self,
        path: &Path,
        document: &Map<String, Value>,
    ) -> Result<(), StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, document)?;
        } else {
            serde_json::to_writer(&mut writer, document)?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Sibling path the next save is staged in.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .field("pretty", &self.pretty)
            .field("records", &self.objects.len())
            .field("types", &self.types)
            .finish()
    }
}
