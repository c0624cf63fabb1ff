//! Terraform State Management
//!
//! Handles encoding and decoding of Terraform values using msgpack,
//! with JSON accepted for raw state.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Dynamic value that can be encoded/decoded from Terraform state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(HashMap<String, DynamicValue>),
}

impl DynamicValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }
}

impl Default for DynamicValue {
    fn default() -> Self {
        DynamicValue::Null
    }
}

/// Value as exchanged with the host: msgpack normally, JSON for raw state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireValue {
    pub msgpack: Vec<u8>,
    pub json: Vec<u8>,
}

impl WireValue {
    pub fn encode(value: &DynamicValue) -> Result<Self> {
        Ok(Self {
            msgpack: encode_dynamic_value(value)?,
            json: vec![],
        })
    }

    pub fn decode(&self) -> Result<DynamicValue> {
        if !self.msgpack.is_empty() {
            decode_dynamic_value(&self.msgpack)
        } else {
            decode_json_value(&self.json)
        }
    }
}

/// Decode a Terraform DynamicValue from msgpack bytes
pub fn decode_dynamic_value(data: &[u8]) -> Result<DynamicValue> {
    if data.is_empty() {
        return Ok(DynamicValue::Null);
    }
    Ok(rmp_serde::from_slice(data)?)
}

/// Encode a value to Terraform DynamicValue msgpack bytes
pub fn encode_dynamic_value(value: &DynamicValue) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec(value)?)
}

/// Decode a JSON-encoded raw state
pub fn decode_json_value(data: &[u8]) -> Result<DynamicValue> {
    if data.is_empty() {
        return Ok(DynamicValue::Null);
    }
    Ok(serde_json::from_slice(data)?)
}

/// Helper to extract a string attribute from a DynamicValue
pub fn get_string_attr(value: &DynamicValue, key: &str) -> String {
    value.get(key)
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string()
}

/// Helper to extract an optional string attribute from a DynamicValue
pub fn get_optional_string_attr(value: &DynamicValue, key: &str) -> Option<String> {
    value.get(key)
        .and_then(|v| match v {
            DynamicValue::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Helper to extract a bool attribute, `None` when unset or null
pub fn get_optional_bool_attr(value: &DynamicValue, key: &str) -> Option<bool> {
    value.get(key).and_then(|v| v.as_bool())
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    let mut map = HashMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    DynamicValue::Map(map)
}

/// Create a string DynamicValue
pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}

/// Create a string DynamicValue, null when absent
pub fn optional_string_value(s: Option<impl Into<String>>) -> DynamicValue {
    s.map(string_value).unwrap_or(DynamicValue::Null)
}

/// Create a bool DynamicValue
pub fn bool_value(b: bool) -> DynamicValue {
    DynamicValue::Bool(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_state() -> DynamicValue {
        make_state(vec![
            ("id", string_value("acme/engineers")),
            ("name", string_value("Engineers")),
            ("auto_add", bool_value(true)),
            ("permission", DynamicValue::Null),
        ])
    }

    #[test]
    fn test_msgpack_wire_value() {
        let state = group_state();
        let wire = WireValue::encode(&state).unwrap();
        assert!(wire.json.is_empty());
        assert_eq!(wire.decode().unwrap(), state);
    }

    #[test]
    fn test_json_raw_state() {
        let wire = WireValue {
            msgpack: vec![],
            json: br#"{"id":"acme/engineers","auto_add":false,"permission":null}"#.to_vec(),
        };
        let value = wire.decode().unwrap();
        assert_eq!(get_string_attr(&value, "id"), "acme/engineers");
        assert_eq!(get_optional_bool_attr(&value, "auto_add"), Some(false));
        assert_eq!(get_optional_string_attr(&value, "permission"), None);
    }

    #[test]
    fn test_empty_wire_value_is_null() {
        assert!(WireValue::default().decode().unwrap().is_null());
    }

    #[test]
    fn test_attribute_helpers() {
        let state = make_state(vec![
            ("permission", string_value("")),
            ("auto_add", DynamicValue::Null),
        ]);
        assert_eq!(get_optional_string_attr(&state, "permission"), None);
        assert_eq!(get_optional_bool_attr(&state, "auto_add"), None);
        assert_eq!(get_string_attr(&state, "missing"), "");
        assert_eq!(optional_string_value(Some("write")), string_value("write"));
        assert!(optional_string_value(None::<String>).is_null());
    }
}
