use crate::clock::ManualClock;
use hbnb_rs_core::{FileStorage, builtin_type_registry};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Storage backed by a file in a temporary directory, driven by a manual clock.
pub struct TempStorage {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
}

impl TempStorage {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
            clock: Arc::new(ManualClock::default()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("file.json")
    }

    /// A fresh, empty storage over the shared backing file.
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.path(), builtin_type_registry()).with_clock(self.clock.clone())
    }

    /// A fresh storage loaded from the backing file.
    pub fn reopen(&self) -> FileStorage {
        let mut storage = self.storage();
        storage.reload().expect("reload");
        storage
    }
}

impl Default for TempStorage {
    fn default() -> Self {
        Self::new()
    }
}
