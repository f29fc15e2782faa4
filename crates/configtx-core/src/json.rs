//! Serde helpers for the JSON projection of the wire model.
//!
//! The projection follows the conventions operators already know from the
//! protobuf JSON mapping:
//! - snake_case field names, every field emitted
//! - 64-bit integers as decimal strings (numbers accepted on input)
//! - enums by name (numbers accepted on input)
//! - opaque bytes as standard base64
//!
//! Bytes fields that carry a serialized message are expanded into that
//! message, so an envelope reads as one nested tree instead of a base64 blob.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

/// A JSON scalar that may arrive quoted or bare.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum NameOrNumber<T> {
    Number(T),
    Name(String),
}

/// Encode bytes as standard base64.
pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64.
pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>, String> {
    STANDARD
        .decode(text)
        .map_err(|e| format!("invalid base64: {}", e))
}

/// Opaque `bytes` fields.
pub(crate) mod base64_bytes {
    use super::*;

    pub fn serialize<S, B>(bytes: &B, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        B: AsRef<[u8]>,
    {
        serializer.serialize_str(&encode_base64(bytes.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => decode_base64(&text).map_err(de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

/// Repeated opaque `bytes` fields.
pub(crate) mod base64_bytes_seq {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&encode_base64(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let items = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        items
            .iter()
            .map(|item| decode_base64(item).map_err(de::Error::custom))
            .collect()
    }
}

/// `map<string, bytes>` fields.
pub(crate) mod base64_map {
    use super::*;
    use serde::ser::SerializeMap;
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            out.serialize_entry(key, &encode_base64(value))?;
        }
        out.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let raw =
            Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default();
        raw.into_iter()
            .map(|(key, value)| {
                decode_base64(&value)
                    .map(|bytes| (key, bytes))
                    .map_err(de::Error::custom)
            })
            .collect()
    }
}

/// 64-bit integers, emitted as strings.
pub(crate) mod int_string {
    use super::*;
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + Deserialize<'de> + Default,
        T::Err: Display,
    {
        match Option::<NameOrNumber<T>>::deserialize(deserializer)? {
            Some(NameOrNumber::Number(n)) => Ok(n),
            Some(NameOrNumber::Name(text)) => text.trim().parse().map_err(de::Error::custom),
            None => Ok(T::default()),
        }
    }
}

/// Protobuf enums carried as `int32`, emitted by name.
macro_rules! named_enum {
    ($module:ident, $ty:ty) => {
        pub(crate) mod $module {
            use serde::{de, Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
                match <$ty>::try_from(*value) {
                    Ok(known) => serializer.serialize_str(known.as_str_name()),
                    Err(_) => serializer.serialize_i32(*value),
                }
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<i32, D::Error> {
                match Option::<super::NameOrNumber<i32>>::deserialize(deserializer)? {
                    Some(super::NameOrNumber::Number(n)) => Ok(n),
                    Some(super::NameOrNumber::Name(name)) => <$ty>::from_str_name(&name)
                        .map(i32::from)
                        .ok_or_else(|| {
                            de::Error::custom(format!(
                                "unknown {} value '{}'",
                                stringify!($ty),
                                name
                            ))
                        }),
                    None => Ok(0),
                }
            }
        }
    };
}

named_enum!(header_type, crate::protos::HeaderType);
named_enum!(implicit_meta_rule, crate::protos::ImplicitMetaRule);
named_enum!(consensus_state, crate::protos::ConsensusState);

/// `bytes` fields that hold a serialized message of a fixed type.
macro_rules! nested_message {
    ($module:ident, $ty:ty) => {
        pub(crate) mod $module {
            use prost::Message;
            use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};

            pub fn serialize<S, B>(bytes: &B, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
                B: AsRef<[u8]>,
            {
                let message = <$ty>::decode(bytes.as_ref()).map_err(|e| {
                    ser::Error::custom(format!("cannot unmarshal {}: {}", stringify!($ty), e))
                })?;
                message.serialize(serializer)
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Vec<u8>, D::Error> {
                let message = Option::<$ty>::deserialize(deserializer)?;
                Ok(message.map(|m| m.encode_to_vec()).unwrap_or_default())
            }
        }
    };
}

nested_message!(payload_bytes, crate::protos::Payload);
nested_message!(channel_header_bytes, crate::protos::ChannelHeader);
nested_message!(signature_header_bytes, crate::protos::SignatureHeader);
nested_message!(serialized_identity_bytes, crate::protos::SerializedIdentity);
nested_message!(config_update_bytes, crate::protos::ConfigUpdate);

/// `repeated bytes` holding serialized envelopes (block data).
pub(crate) mod envelope_seq {
    use super::*;
    use crate::protos::Envelope;
    use prost::Message;
    use serde::ser::{self, SerializeSeq};

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            let envelope = Envelope::decode(item.as_slice())
                .map_err(|e| ser::Error::custom(format!("cannot unmarshal Envelope: {}", e)))?;
            seq.serialize_element(&envelope)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let items = Option::<Vec<Envelope>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(items.iter().map(Message::encode_to_vec).collect())
    }
}
