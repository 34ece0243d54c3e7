//! Registry of record kinds used to rebuild records on reload.

use crate::error::RecordError;
use crate::model::Record;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use log::debug;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A concrete record kind that can be created and reconstructed by name.
pub trait ModelType: Send + Sync + fmt::Debug {
    /// Type name used in storage keys and the `__class__` discriminator.
    fn name(&self) -> &str;

    /// Conventional attribute names, for help output only.
    fn fields(&self) -> &[&str] {
        &[]
    }

    /// Build a fresh, unregistered record of this kind.
    fn instantiate(&self, now: NaiveDateTime) -> Record {
        Record::new(self.name(), now)
    }

    /// Rebuild a record of this kind from its persisted map.
    fn reconstruct(
        &self,
        map: &Map<String, Value>,
        now: NaiveDateTime,
    ) -> Result<Record, RecordError> {
        Record::from_map(self.name(), map, now)
    }
}

/// Built-in record kind described by a name and its documented fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinModel {
    name: &'static str,
    fields: &'static [&'static str],
}

impl BuiltinModel {
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    pub const BASE_MODEL: Self = Self::new("BaseModel", &[]);
    pub const USER: Self = Self::new(
        "User",
        &["email", "password", "first_name", "last_name"],
    );
    pub const STATE: Self = Self::new("State", &["name"]);
    pub const CITY: Self = Self::new("City", &["state_id", "name"]);
    pub const AMENITY: Self = Self::new("Amenity", &["name"]);
    pub const PLACE: Self = Self::new(
        "Place",
        &[
            "city_id",
            "user_id",
            "name",
            "description",
            "number_rooms",
            "number_bathrooms",
            "max_guest",
            "price_by_night",
            "latitude",
            "longitude",
        ],
    );
    pub const REVIEW: Self = Self::new("Review", &["place_id", "user_id", "text"]);

    /// Every built-in kind, in registration order.
    pub const ALL: [Self; 7] = [
        Self::BASE_MODEL,
        Self::USER,
        Self::STATE,
        Self::CITY,
        Self::AMENITY,
        Self::PLACE,
        Self::REVIEW,
    ];
}

impl ModelType for BuiltinModel {
    fn name(&self) -> &str {
        self.name
    }

    fn fields(&self) -> &[&str] {
        self.fields
    }
}

/// Name-to-kind mapping shared by the storage engine and the console.
#[derive(Default, Clone)]
pub struct TypeRegistry {
    types: Arc<RwLock<IndexMap<String, Arc<dyn ModelType>>>>,
}

impl TypeRegistry {
    /// Create an empty type registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind by name, replacing any kind with the same name.
    pub fn register(&self, model: Arc<dyn ModelType>) {
        debug!("registering model type (name={})", model.name());
        self.types.write().insert(model.name().to_string(), model);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ModelType>> {
        self.types.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

/// Registry holding every built-in kind.
pub fn builtin_type_registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    for model in BuiltinModel::ALL {
        registry.register(Arc::new(model));
    }
    registry
}
