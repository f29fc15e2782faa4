//! Channel configuration messages.

use std::collections::BTreeMap;

use prost::{Enumeration, Message};
use serde::de::{self, Deserializer};
use serde::ser::{self, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::canonical::config_signature_message;
use crate::crypto::Digest;
use crate::json;
use crate::protos::{values, Envelope};

/// A full channel configuration snapshot.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[prost(uint64, tag = "1")]
    #[serde(with = "json::int_string")]
    pub sequence: u64,
    #[prost(message, optional, tag = "2")]
    pub channel_group: Option<ConfigGroup>,
}

/// A committed configuration plus the update that produced it.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigEnvelope {
    #[prost(message, optional, tag = "1")]
    pub config: Option<Config>,
    #[prost(message, optional, tag = "2")]
    pub last_update: Option<Envelope>,
}

/// A node of the configuration tree.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigGroup {
    #[prost(uint64, tag = "1")]
    #[serde(with = "json::int_string")]
    pub version: u64,
    #[prost(btree_map = "string, message", tag = "2")]
    pub groups: BTreeMap<String, ConfigGroup>,
    #[prost(btree_map = "string, message", tag = "3")]
    #[serde(with = "values::config_values")]
    pub values: BTreeMap<String, ConfigValue>,
    #[prost(btree_map = "string, message", tag = "4")]
    pub policies: BTreeMap<String, ConfigPolicy>,
    #[prost(string, tag = "5")]
    pub mod_policy: String,
}

impl ConfigGroup {
    /// An empty group at the given version.
    pub fn at_version(version: u64) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// True when the group has no members at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.values.is_empty() && self.policies.is_empty()
    }
}

/// A typed value in the configuration tree.
///
/// The value bytes are interpreted according to the key the value is stored
/// under in its parent group (see [`values`]).
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigValue {
    #[prost(uint64, tag = "1")]
    #[serde(with = "json::int_string")]
    pub version: u64,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub value: Vec<u8>,
    #[prost(string, tag = "3")]
    pub mod_policy: String,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPolicy {
    #[prost(uint64, tag = "1")]
    #[serde(with = "json::int_string")]
    pub version: u64,
    #[prost(message, optional, tag = "2")]
    pub policy: Option<Policy>,
    #[prost(string, tag = "3")]
    pub mod_policy: String,
}

/// Policy type discriminant stored in [`Policy::type`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum PolicyType {
    Unknown = 0,
    Signature = 1,
    Msp = 2,
    ImplicitMeta = 3,
}

/// A policy: a type tag and the type-specific serialized body.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct Policy {
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

impl Policy {
    /// Build an implicit-meta policy (`ANY Readers`, `MAJORITY Admins`, ...).
    pub fn implicit_meta(rule: ImplicitMetaRule, sub_policy: &str) -> Self {
        let body = ImplicitMetaPolicy {
            sub_policy: sub_policy.to_string(),
            rule: rule.into(),
        };
        Self {
            r#type: PolicyType::ImplicitMeta.into(),
            value: body.encode_to_vec(),
        }
    }
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match PolicyType::try_from(self.r#type) {
            Ok(PolicyType::ImplicitMeta) => {
                let body = ImplicitMetaPolicy::decode(self.value.as_slice()).map_err(|e| {
                    ser::Error::custom(format!("cannot unmarshal ImplicitMetaPolicy: {}", e))
                })?;
                serde_json::to_value(&body).map_err(ser::Error::custom)?
            }
            _ => serde_json::Value::String(json::encode_base64(&self.value)),
        };

        let mut state = serializer.serialize_struct("Policy", 2)?;
        state.serialize_field("type", &self.r#type)?;
        state.serialize_field("value", &value)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct RawPolicy {
            r#type: i32,
            value: serde_json::Value,
        }

        let raw = RawPolicy::deserialize(deserializer)?;
        let value = match raw.value {
            serde_json::Value::Null => Vec::new(),
            serde_json::Value::String(text) => {
                json::decode_base64(&text).map_err(de::Error::custom)?
            }
            structured => match PolicyType::try_from(raw.r#type) {
                Ok(PolicyType::ImplicitMeta) => {
                    let body: ImplicitMetaPolicy =
                        serde_json::from_value(structured).map_err(de::Error::custom)?;
                    body.encode_to_vec()
                }
                _ => {
                    return Err(de::Error::custom(format!(
                        "policy value for type {} must be base64",
                        raw.r#type
                    )))
                }
            },
        };

        Ok(Policy {
            r#type: raw.r#type,
            value,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum ImplicitMetaRule {
    Any = 0,
    All = 1,
    Majority = 2,
}

impl ImplicitMetaRule {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ImplicitMetaRule::Any => "ANY",
            ImplicitMetaRule::All => "ALL",
            ImplicitMetaRule::Majority => "MAJORITY",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "ANY" => Some(ImplicitMetaRule::Any),
            "ALL" => Some(ImplicitMetaRule::All),
            "MAJORITY" => Some(ImplicitMetaRule::Majority),
            _ => None,
        }
    }
}

/// A policy evaluated over the same-named policies of child groups.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplicitMetaPolicy {
    #[prost(string, tag = "1")]
    pub sub_policy: String,
    #[prost(enumeration = "ImplicitMetaRule", tag = "2")]
    #[serde(with = "json::implicit_meta_rule")]
    pub rule: i32,
}

/// The delta between two configuration snapshots.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    #[prost(string, tag = "1")]
    pub channel_id: String,
    #[prost(message, optional, tag = "2")]
    pub read_set: Option<ConfigGroup>,
    #[prost(message, optional, tag = "3")]
    pub write_set: Option<ConfigGroup>,
    #[prost(btree_map = "string, bytes", tag = "5")]
    #[serde(with = "json::base64_map")]
    pub isolated_data: BTreeMap<String, Vec<u8>>,
}

/// A serialized config update plus the signatures collected over it.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdateEnvelope {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::config_update_bytes")]
    pub config_update: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub signatures: Vec<ConfigSignature>,
}

impl ConfigUpdateEnvelope {
    /// Start a signing session for an update: serialized update, no signatures.
    pub fn new(update: &ConfigUpdate) -> Self {
        Self {
            config_update: update.encode_to_vec(),
            signatures: Vec::new(),
        }
    }

    /// Append a signature. Existing signatures are never replaced.
    pub fn push_signature(&mut self, signature: ConfigSignature) {
        self.signatures.push(signature);
    }

    /// BLAKE3 digest of the config update bytes every signer signs.
    pub fn update_digest(&self) -> Digest {
        Digest::hash(&self.config_update)
    }
}

/// One signature over a config update.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSignature {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::signature_header_bytes")]
    pub signature_header: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub signature: Vec<u8>,
}

impl ConfigSignature {
    /// The exact bytes this signature covers.
    pub fn signed_message(&self, config_update: &[u8]) -> Vec<u8> {
        config_signature_message(&self.signature_header, config_update)
    }
}
