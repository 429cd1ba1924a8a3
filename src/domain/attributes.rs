use serde::{Deserialize, Serialize};

/// Opaque attribute document attached to a hub entity. Decoded from JSON once
/// at the boundary and carried as-is; readers go through the typed accessors
/// instead of re-parsing blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(serde_json::Value);

impl Attributes {
    pub fn new(value: serde_json::Value) -> Self {
        Attributes(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.as_object().and_then(|m| m.get(key))
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.str_field("friendly_name")
    }

    pub fn unit_of_measurement(&self) -> Option<&str> {
        self.str_field("unit_of_measurement")
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Attributes(serde_json::Value::Object(serde_json::Map::new()))
    }
}
