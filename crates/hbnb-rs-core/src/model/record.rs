//! Record identity, timestamps and persisted representation.

use super::timestamp::{format_timestamp, parse_timestamp};
use super::value::AttrValue;
use crate::clock::truncate_to_micros;
use crate::error::RecordError;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Discriminator naming the concrete type in the persisted map.
pub const CLASS_KEY: &str = "__class__";
pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "created_at";
pub const UPDATED_AT_KEY: &str = "updated_at";
/// Names that cannot live in the attribute bag.
pub const RESERVED_KEYS: [&str; 4] = [ID_KEY, CREATED_AT_KEY, UPDATED_AT_KEY, CLASS_KEY];

/// Storage key for a record: `"<TypeName>.<id>"`.
pub fn record_key(kind: &str, id: &str) -> String {
    format!("{kind}.{id}")
}

/// A typed entity with identity, timestamps and an ordered attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: String,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    attributes: IndexMap<String, AttrValue>,
}

impl Record {
    /// Build a fresh record with a random id and `created_at == updated_at`.
    ///
    /// The record is not stored anywhere; `FileStorage::create` builds and
    /// registers in one step.
    pub fn new(kind: impl Into<String>, now: NaiveDateTime) -> Self {
        let now = truncate_to_micros(now);
        Self {
            kind: kind.into(),
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            attributes: IndexMap::new(),
        }
    }

    /// Rebuild a record from its persisted map.
    ///
    /// The `__class__` entry is ignored; every other key other than the fixed
    /// fields lands in the attribute bag in map order. Fields absent from the
    /// map keep fresh defaults (new id, `now` timestamps), clamped so that a
    /// lone stored timestamp still satisfies `created_at <= updated_at`. Two
    /// stored timestamps in the wrong order are rejected.
    pub fn from_map(
        kind: impl Into<String>,
        map: &Map<String, Value>,
        now: NaiveDateTime,
    ) -> Result<Self, RecordError> {
        let mut record = Self::new(kind, now);
        let (mut has_created, mut has_updated) = (false, false);
        for (key, value) in map {
            match key.as_str() {
                CLASS_KEY => {}
                ID_KEY => {
                    record.id = expect_str(key, value)?.to_string();
                }
                CREATED_AT_KEY => {
                    record.created_at = parse_timestamp(key, expect_str(key, value)?)?;
                    has_created = true;
                }
                UPDATED_AT_KEY => {
                    record.updated_at = parse_timestamp(key, expect_str(key, value)?)?;
                    has_updated = true;
                }
                _ => {
                    let value = AttrValue::from_json(key, value)?;
                    record.attributes.insert(key.clone(), value);
                }
            }
        }
        match (has_created, has_updated) {
            (true, false) => record.updated_at = record.updated_at.max(record.created_at),
            (false, true) => record.created_at = record.created_at.min(record.updated_at),
            _ => {}
        }
        if record.updated_at < record.created_at {
            return Err(RecordError::InvalidField {
                field: UPDATED_AT_KEY.to_string(),
                expected: "timestamp not before created_at",
            });
        }
        Ok(record)
    }

    /// Concrete type name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Storage key for this record.
    pub fn key(&self) -> String {
        record_key(&self.kind, &self.id)
    }

    /// Dynamic attributes in insertion order.
    pub fn attributes(&self) -> &IndexMap<String, AttrValue> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Set a dynamic attribute, returning the previous value.
    ///
    /// Replacing an existing attribute keeps its position.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Result<Option<AttrValue>, RecordError> {
        let name = name.into();
        if RESERVED_KEYS.contains(&name.as_str()) {
            return Err(RecordError::ReservedAttribute(name));
        }
        Ok(self.attributes.insert(name, value.into()))
    }

    /// Stamp `updated_at` with `now`, never moving it before `created_at`.
    pub fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = truncate_to_micros(now).max(self.created_at);
    }

    /// Persisted representation: fixed fields, attributes, then `__class__`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(ID_KEY.to_string(), Value::String(self.id.clone()));
        map.insert(
            CREATED_AT_KEY.to_string(),
            Value::String(format_timestamp(&self.created_at)),
        );
        map.insert(
            UPDATED_AT_KEY.to_string(),
            Value::String(format_timestamp(&self.updated_at)),
        );
        for (name, value) in &self.attributes {
            map.insert(name.clone(), value.to_json());
        }
        map.insert(CLASS_KEY.to_string(), Value::String(self.kind.clone()));
        map
    }

    /// Human-readable rendering: `[<Type>] (<id>) {<fields>}`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{'{ID_KEY}': {}, '{CREATED_AT_KEY}': {}, '{UPDATED_AT_KEY}': {}",
            self.kind,
            self.id,
            AttrValue::Str(self.id.clone()),
            AttrValue::Str(format_timestamp(&self.created_at)),
            AttrValue::Str(format_timestamp(&self.updated_at)),
        )?;
        for (name, value) in &self.attributes {
            write!(f, ", '{name}': {value}")?;
        }
        write!(f, "}}")
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, RecordError> {
    value.as_str().ok_or_else(|| RecordError::InvalidField {
        field: field.to_string(),
        expected: "string",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;

    fn at(seconds: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_micro_opt(0, 0, 0, 500))
            .expect("timestamp")
            + TimeDelta::seconds(seconds)
    }

    #[test]
    fn fresh_records_have_unique_ids_and_equal_timestamps() {
        let records: Vec<Record> = (0..64).map(|_| Record::new("BaseModel", at(0))).collect();
        let ids: HashSet<&str> = records.iter().map(Record::id).collect();
        assert_eq!(ids.len(), records.len());
        for record in &records {
            assert_eq!(record.id().len(), 36);
            assert_eq!(record.created_at(), record.updated_at());
        }
    }

    #[test]
    fn touch_advances_updated_at_only() {
        let mut record = Record::new("BaseModel", at(0));
        let created = record.created_at();
        record.touch(at(1));
        assert!(record.updated_at() > created);
        assert_eq!(record.created_at(), created);
    }

    #[test]
    fn touch_never_moves_before_creation() {
        let mut record = Record::new("BaseModel", at(10));
        record.touch(at(0));
        assert_eq!(record.updated_at(), record.created_at());
    }

    #[test]
    fn to_map_carries_discriminator_and_formatted_timestamps() {
        let mut record = Record::new("User", at(0));
        record.set("name", "John").expect("set");
        record.set("age", 20).expect("set");
        let map = record.to_map();

        assert_eq!(map[CLASS_KEY], json!("User"));
        assert_eq!(map[ID_KEY], json!(record.id()));
        assert_eq!(map[CREATED_AT_KEY], json!("2024-01-01T00:00:00.000500"));
        assert_eq!(map["name"], json!("John"));
        assert_eq!(map["age"], json!(20));
        assert_eq!(map, record.to_map());
    }

    #[test]
    fn round_trip_through_map_preserves_everything() {
        let mut record = Record::new("Place", at(0));
        record.set("number_rooms", 3).expect("set");
        record.set("latitude", 37.77).expect("set");
        record.set("pets", true).expect("set");
        record.touch(at(5));

        let rebuilt = Record::from_map("Place", &record.to_map(), at(99)).expect("rebuild");
        assert_eq!(rebuilt, record);
        assert_eq!(rebuilt.to_map(), record.to_map());
    }

    #[test]
    fn reconstruction_accepts_unknown_attributes_verbatim() {
        let map = json!({
            "id": "abc",
            "created_at": "2017-09-28T21:03:54.052298",
            "updated_at": "2017-09-28T21:03:54.052302",
            "my_number": 89,
            "name": "My_First_Model",
            "__class__": "BaseModel",
        });
        let record =
            Record::from_map("BaseModel", map.as_object().expect("object"), at(0)).expect("record");
        assert_eq!(record.id(), "abc");
        assert_eq!(record.get("my_number"), Some(&AttrValue::Int(89)));
        assert_eq!(record.get(CLASS_KEY), None);
        let names: Vec<&str> = record.attributes().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["my_number", "name"]);
    }

    #[test]
    fn reconstruction_defaults_missing_fields() {
        let map = json!({ "name": "partial" });
        let record =
            Record::from_map("State", map.as_object().expect("object"), at(3)).expect("record");
        assert_eq!(record.id().len(), 36);
        assert_eq!(record.created_at(), at(3));
        assert_eq!(record.get("name"), Some(&AttrValue::from("partial")));
    }

    #[test]
    fn reconstruction_rejects_malformed_timestamp() {
        let map = json!({ "id": "abc", "created_at": "yesterday" });
        let err = Record::from_map("BaseModel", map.as_object().expect("object"), at(0))
            .expect_err("malformed");
        assert!(matches!(err, RecordError::InvalidTimestamp { ref field, .. } if field == "created_at"));
    }

    #[test]
    fn reconstruction_rejects_updated_before_created() {
        let map = json!({
            "id": "abc",
            "created_at": "2024-01-02T00:00:00.000000",
            "updated_at": "2024-01-01T00:00:00.000000",
        });
        let err = Record::from_map("BaseModel", map.as_object().expect("object"), at(0))
            .expect_err("out of order");
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "updated_at"));
    }

    #[test]
    fn reconstruction_clamps_a_missing_timestamp() {
        let map = json!({ "id": "abc", "created_at": "2030-01-01T00:00:00.000000" });
        let record =
            Record::from_map("BaseModel", map.as_object().expect("object"), at(0)).expect("record");
        assert_eq!(record.updated_at(), record.created_at());

        let map = json!({ "id": "abc", "updated_at": "2020-01-01T00:00:00.000000" });
        let record =
            Record::from_map("BaseModel", map.as_object().expect("object"), at(0)).expect("record");
        assert_eq!(record.created_at(), record.updated_at());
    }

    #[test]
    fn reconstruction_rejects_non_string_id() {
        let map = json!({ "id": 7 });
        let err = Record::from_map("BaseModel", map.as_object().expect("object"), at(0))
            .expect_err("bad id");
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "id"));
    }

    #[test]
    fn set_rejects_reserved_names() {
        let mut record = Record::new("BaseModel", at(0));
        for name in RESERVED_KEYS {
            let err = record.set(name, "x").expect_err("reserved");
            assert!(matches!(err, RecordError::ReservedAttribute(_)));
        }
        assert!(record.attributes().is_empty());
    }

    #[test]
    fn describe_renders_fixed_fields_then_attributes_in_order() {
        let mut record = Record::from_map(
            "User",
            json!({
                "id": "1234",
                "created_at": "2024-01-01T00:00:00.000001",
                "updated_at": "2024-01-01T00:00:00.000002",
            })
            .as_object()
            .expect("object"),
            at(0),
        )
        .expect("record");
        record.set("first_name", "Betty").expect("set");
        record.set("age", 5).expect("set");

        assert_eq!(
            record.describe(),
            "[User] (1234) {'id': '1234', 'created_at': '2024-01-01T00:00:00.000001', \
             'updated_at': '2024-01-01T00:00:00.000002', 'first_name': 'Betty', 'age': 5}"
        );
        assert_eq!(record.key(), "User.1234");
    }
}
