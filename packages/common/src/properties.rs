//! # Property Maps
//!
//! The record-shaped snapshot: string keys mapped to JSON values.
//!
//! A `null` value and a missing key are the same thing. Reads of an absent key
//! yield `Value::Null`, and writing `null` removes the key, so two maps that
//! agree on every non-null property compare equal.

use std::collections::BTreeMap;

pub use serde_json::Value;

/// Record snapshot keyed by property name
pub type PropertyMap = BTreeMap<String, Value>;

static NULL: Value = Value::Null;

/// Read a property, treating absence as `null`
pub fn read_property<'a>(map: &'a PropertyMap, property: &str) -> &'a Value {
    map.get(property).unwrap_or(&NULL)
}

/// Write a property; `null` removes it
pub fn write_property(map: &mut PropertyMap, property: &str, value: &Value) {
    if value.is_null() {
        map.remove(property);
    } else {
        map.insert(property.to_string(), value.clone());
    }
}

/// Build a property map from `(key, value)` pairs, skipping `null` values
pub fn properties<I, K>(pairs: I) -> PropertyMap
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let mut map = PropertyMap::new();
    for (key, value) in pairs {
        write_property(&mut map, &key.into(), &value);
    }
    map
}
