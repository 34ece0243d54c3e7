//! Persist/reload round-trip integration tests.

use chrono::TimeDelta;
use hbnb_rs_core::{AttrValue, Record, builtin_type_registry};
use hbnb_rs_test_utils::{TempStorage, fixed_time};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

/// Every key and every persisted map survives a save and a reload into a new table.
#[test]
fn save_then_reload_reproduces_table() {
    let fixture = TempStorage::new();
    let mut storage = fixture.storage();

    for kind in builtin_type_registry().names() {
        let key = storage.create(&kind).expect("create").key();
        let record = storage.all_mut().get_mut(&key).expect("record");
        record.set("name", format!("{kind} one")).expect("set");
        record.set("rating", 4.5).expect("set");
        record.set("visits", 12).expect("set");
        record.set("active", true).expect("set");
        fixture.clock.advance(TimeDelta::milliseconds(3));
    }
    storage.save().expect("save");

    let reloaded = fixture.reopen();
    let original_keys: Vec<&String> = storage.all().keys().collect();
    let reloaded_keys: Vec<&String> = reloaded.all().keys().collect();
    assert_eq!(reloaded_keys, original_keys);
    for (key, record) in storage.all() {
        assert_eq!(reloaded.all()[key].to_map(), record.to_map());
        assert_eq!(reloaded.all()[key].kind(), record.kind());
    }
}

/// Saving a record strictly advances `updated_at` and leaves `created_at` alone.
#[test]
fn save_record_advances_updated_at() {
    let fixture = TempStorage::new();
    let mut storage = fixture.storage();
    let key = storage.create("BaseModel").expect("create").key();
    let created = storage.all()[&key].created_at();
    assert_eq!(storage.all()[&key].updated_at(), created);

    fixture.clock.advance(TimeDelta::seconds(1));
    storage.save_record(&key).expect("save");

    let record = &storage.all()[&key];
    assert!(record.updated_at() > created);
    assert_eq!(record.created_at(), created);
    assert_eq!(record.updated_at(), fixed_time(1));

    let reloaded = fixture.reopen();
    assert_eq!(reloaded.all()[&key].updated_at(), fixed_time(1));
}

/// Records of the same kind never share a key.
#[test]
fn keys_are_unique_within_a_kind() {
    let fixture = TempStorage::new();
    let mut storage = fixture.storage();
    let keys: HashSet<String> = (0..200)
        .map(|_| storage.create("User").expect("create").key())
        .collect();
    assert_eq!(keys.len(), 200);
    assert_eq!(storage.count(Some("User")), 200);
}

/// Reloading replaces same-keyed live records and keeps unsaved ones.
#[test]
fn reload_merges_into_live_table() {
    let fixture = TempStorage::new();
    let mut storage = fixture.storage();
    let (key, id) = {
        let city = storage.create("City").expect("create");
        (city.key(), city.id().to_string())
    };
    storage.save().expect("save");

    storage
        .get_mut("City", &id)
        .expect("record")
        .set("name", "unsaved")
        .expect("set");
    let unsaved = storage.create("State").expect("create").key();

    let report = storage.reload().expect("reload");
    assert_eq!(report.loaded, 1);
    assert_eq!(storage.all()[&key].get("name"), None);
    assert!(storage.all().contains_key(&unsaved));
}

/// A record registered from outside keeps its identity through storage.
#[test]
fn registered_records_round_trip() {
    let fixture = TempStorage::new();
    let mut storage = fixture.storage();
    let mut record = Record::new("Review", fixed_time(42));
    record.set("text", "Lovely stay, would return").expect("set");
    storage.register(record.clone());
    storage.flush().expect("flush");

    let reloaded = fixture.reopen();
    let stored = reloaded.get("Review", record.id()).expect("stored");
    assert_eq!(stored, &record);
    assert_eq!(
        stored.get("text"),
        Some(&AttrValue::from("Lovely stay, would return"))
    );
}

/// Destroying through the live table is visible after the next save.
#[test]
fn remove_then_save_drops_entry_from_file() {
    let fixture = TempStorage::new();
    let mut storage = fixture.storage();
    let id = storage.create("Amenity").expect("create").id().to_string();
    storage.save().expect("save");

    assert!(storage.remove("Amenity", &id).is_some());
    assert!(storage.remove("Amenity", &id).is_none());
    storage.save().expect("save");

    let reloaded = fixture.reopen();
    assert!(reloaded.get("Amenity", &id).is_none());
    assert_eq!(reloaded.count(None), 0);
}

/// A clock stepping backwards never stamps a save before creation.
#[test]
fn save_record_with_clock_behind_creation_keeps_order() {
    let fixture = TempStorage::new();
    fixture.clock.set(fixed_time(60));
    let mut storage = fixture.storage();
    let key = storage.create("User").expect("create").key();

    fixture.clock.set(fixed_time(0));
    storage.save_record(&key).expect("save");

    let reopened = fixture.reopen();
    let record = &reopened.all()[&key];
    assert_eq!(record.created_at(), fixed_time(60));
    assert_eq!(record.updated_at(), fixed_time(60));
}
