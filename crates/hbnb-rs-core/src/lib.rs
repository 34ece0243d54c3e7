//! Core object model and file-backed storage for hbnb.
//!
//! This crate owns the record lifecycle (identity, timestamps, attribute bag),
//! the type registry used to rebuild records on reload, and the whole-file
//! JSON storage engine the console drives.

pub mod clock;
pub mod error;
pub mod model;
pub mod storage;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::{EntryError, RecordError, StorageError};
pub use model::{AttrValue, CLASS_KEY, Record, record_key};
pub use storage::{FileStorage, ReloadReport, SkippedEntry};
pub use types::{BuiltinModel, ModelType, TypeRegistry, builtin_type_registry};
