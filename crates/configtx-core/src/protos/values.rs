//! Well-known channel configuration values.
//!
//! A [`ConfigValue`](super::ConfigValue) only carries bytes; which message
//! those bytes hold is decided by the key the value is stored under. The
//! registry here covers the common channel-level and orderer-level values.
//! Values under any other key are passed through as base64.

use std::collections::BTreeMap;

use prost::{Enumeration, Message};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::json;

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingAlgorithm {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockDataHashingStructure {
    #[prost(uint32, tag = "1")]
    pub width: u32,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdererAddresses {
    #[prost(string, repeated, tag = "1")]
    pub addresses: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Consortium {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// A single named capability. Carries no fields.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
pub struct Capability {}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    #[prost(btree_map = "string, message", tag = "1")]
    pub capabilities: BTreeMap<String, Capability>,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSize {
    #[prost(uint32, tag = "1")]
    pub max_message_count: u32,
    #[prost(uint32, tag = "2")]
    pub absolute_max_bytes: u32,
    #[prost(uint32, tag = "3")]
    pub preferred_max_bytes: u32,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchTimeout {
    #[prost(string, tag = "1")]
    pub timeout: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum ConsensusState {
    StateNormal = 0,
    StateMaintenance = 1,
}

impl ConsensusState {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ConsensusState::StateNormal => "STATE_NORMAL",
            ConsensusState::StateMaintenance => "STATE_MAINTENANCE",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "STATE_NORMAL" => Some(ConsensusState::StateNormal),
            "STATE_MAINTENANCE" => Some(ConsensusState::StateMaintenance),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusType {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub metadata: Vec<u8>,
    #[prost(enumeration = "ConsensusState", tag = "3")]
    #[serde(with = "json::consensus_state")]
    pub state: i32,
}

/// Value keys with a known message type.
pub const KNOWN_VALUE_KEYS: &[&str] = &[
    "HashingAlgorithm",
    "BlockDataHashingStructure",
    "OrdererAddresses",
    "Consortium",
    "Capabilities",
    "BatchSize",
    "BatchTimeout",
    "ConsensusType",
];

fn expand<M: Message + Default + Serialize>(bytes: &[u8]) -> Result<serde_json::Value, String> {
    let message = M::decode(bytes).map_err(|e| e.to_string())?;
    serde_json::to_value(&message).map_err(|e| e.to_string())
}

fn collapse<M: Message + DeserializeOwned>(value: serde_json::Value) -> Result<Vec<u8>, String> {
    let message: M = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok(message.encode_to_vec())
}

/// Render value bytes stored under `key`.
pub fn value_to_json(key: &str, bytes: &[u8]) -> Result<serde_json::Value, String> {
    let expanded = match key {
        "HashingAlgorithm" => expand::<HashingAlgorithm>(bytes),
        "BlockDataHashingStructure" => expand::<BlockDataHashingStructure>(bytes),
        "OrdererAddresses" => expand::<OrdererAddresses>(bytes),
        "Consortium" => expand::<Consortium>(bytes),
        "Capabilities" => expand::<Capabilities>(bytes),
        "BatchSize" => expand::<BatchSize>(bytes),
        "BatchTimeout" => expand::<BatchTimeout>(bytes),
        "ConsensusType" => expand::<ConsensusType>(bytes),
        _ => return Ok(serde_json::Value::String(json::encode_base64(bytes))),
    };
    expanded.map_err(|e| format!("cannot unmarshal value '{}': {}", key, e))
}

/// Parse a JSON value stored under `key` back into bytes.
///
/// A JSON string is always taken as base64, so unknown and known keys can
/// both be given opaquely.
pub fn value_from_json(key: &str, value: serde_json::Value) -> Result<Vec<u8>, String> {
    let structured = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::String(text) => return json::decode_base64(&text),
        structured => structured,
    };

    let collapsed = match key {
        "HashingAlgorithm" => collapse::<HashingAlgorithm>(structured),
        "BlockDataHashingStructure" => collapse::<BlockDataHashingStructure>(structured),
        "OrdererAddresses" => collapse::<OrdererAddresses>(structured),
        "Consortium" => collapse::<Consortium>(structured),
        "Capabilities" => collapse::<Capabilities>(structured),
        "BatchSize" => collapse::<BatchSize>(structured),
        "BatchTimeout" => collapse::<BatchTimeout>(structured),
        "ConsensusType" => collapse::<ConsensusType>(structured),
        _ => Err("no message type registered for this key; give the value as base64".into()),
    };
    collapsed.map_err(|e| format!("invalid value '{}': {}", key, e))
}

/// Serde adapter for `ConfigGroup.values`, resolving each value by its key.
pub(crate) mod config_values {
    use std::collections::BTreeMap;

    use serde::de::{self, Deserializer};
    use serde::ser::{self, SerializeMap, Serializer};
    use serde::Deserialize;
    use serde_json::json;

    use super::{value_from_json, value_to_json};
    use crate::json::int_string;
    use crate::protos::ConfigValue;

    pub fn serialize<S: Serializer>(
        values: &BTreeMap<String, ConfigValue>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(values.len()))?;
        for (key, entry) in values {
            let value = value_to_json(key, &entry.value).map_err(ser::Error::custom)?;
            map.serialize_entry(
                key,
                &json!({
                    "mod_policy": entry.mod_policy,
                    "value": value,
                    "version": entry.version.to_string(),
                }),
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, ConfigValue>, D::Error> {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct RawValue {
            #[serde(with = "int_string")]
            version: u64,
            mod_policy: String,
            value: serde_json::Value,
        }

        let raw =
            Option::<BTreeMap<String, RawValue>>::deserialize(deserializer)?.unwrap_or_default();
        raw.into_iter()
            .map(|(key, entry)| {
                let value = value_from_json(&key, entry.value).map_err(de::Error::custom)?;
                Ok((
                    key,
                    ConfigValue {
                        version: entry.version,
                        value,
                        mod_policy: entry.mod_policy,
                    },
                ))
            })
            .collect()
    }
}
