//! Transaction framing messages: headers, payloads, envelopes, blocks.

use prost::{Enumeration, Message};
use serde::de::{self, Deserializer};
use serde::ser::{self, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::json;
use crate::protos::{ConfigEnvelope, ConfigUpdateEnvelope};

/// What kind of message a payload carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HeaderType {
    Message = 0,
    Config = 1,
    ConfigUpdate = 2,
    EndorserTransaction = 3,
    OrdererTransaction = 4,
    DeliverSeekInfo = 5,
    ChaincodePackage = 6,
    PeerAdminOperation = 8,
}

impl HeaderType {
    /// The protobuf enum value name.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            HeaderType::Message => "MESSAGE",
            HeaderType::Config => "CONFIG",
            HeaderType::ConfigUpdate => "CONFIG_UPDATE",
            HeaderType::EndorserTransaction => "ENDORSER_TRANSACTION",
            HeaderType::OrdererTransaction => "ORDERER_TRANSACTION",
            HeaderType::DeliverSeekInfo => "DELIVER_SEEK_INFO",
            HeaderType::ChaincodePackage => "CHAINCODE_PACKAGE",
            HeaderType::PeerAdminOperation => "PEER_ADMIN_OPERATION",
        }
    }

    /// Parse a protobuf enum value name.
    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "MESSAGE" => Some(HeaderType::Message),
            "CONFIG" => Some(HeaderType::Config),
            "CONFIG_UPDATE" => Some(HeaderType::ConfigUpdate),
            "ENDORSER_TRANSACTION" => Some(HeaderType::EndorserTransaction),
            "ORDERER_TRANSACTION" => Some(HeaderType::OrdererTransaction),
            "DELIVER_SEEK_INFO" => Some(HeaderType::DeliverSeekInfo),
            "CHAINCODE_PACKAGE" => Some(HeaderType::ChaincodePackage),
            "PEER_ADMIN_OPERATION" => Some(HeaderType::PeerAdminOperation),
            _ => None,
        }
    }
}

/// `google.protobuf.Timestamp`.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    #[serde(with = "json::int_string")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

/// Identifies what a payload carries and on which channel.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelHeader {
    #[prost(enumeration = "HeaderType", tag = "1")]
    #[serde(with = "json::header_type")]
    pub r#type: i32,
    #[prost(int32, tag = "2")]
    pub version: i32,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<Timestamp>,
    #[prost(string, tag = "4")]
    pub channel_id: String,
    #[prost(string, tag = "5")]
    pub tx_id: String,
    #[prost(uint64, tag = "6")]
    #[serde(with = "json::int_string")]
    pub epoch: u64,
    #[prost(bytes = "vec", tag = "7")]
    #[serde(with = "json::base64_bytes")]
    pub extension: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    #[serde(with = "json::base64_bytes")]
    pub tls_cert_hash: Vec<u8>,
}

impl ChannelHeader {
    /// Build a channel header from the four scalars that identify a payload.
    ///
    /// No timestamp or transaction id is set, so the result depends only on
    /// its arguments.
    pub fn new(header_type: HeaderType, version: i32, channel_id: &str, epoch: u64) -> Self {
        Self {
            r#type: header_type.into(),
            version,
            channel_id: channel_id.to_string(),
            epoch,
            ..Default::default()
        }
    }

    /// The header type, if it is one this crate knows.
    pub fn header_type(&self) -> Option<HeaderType> {
        HeaderType::try_from(self.r#type).ok()
    }
}

/// Carries the serialized channel header and the signer's header.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::channel_header_bytes")]
    pub channel_header: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::signature_header_bytes")]
    pub signature_header: Vec<u8>,
}

/// Signer identity plus per-signature freshness material.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureHeader {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::serialized_identity_bytes")]
    pub creator: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub nonce: Vec<u8>,
}

/// A header paired with the serialized inner message.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct Payload {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

impl Payload {
    /// Decode the channel header, if the payload has one.
    pub fn channel_header(&self) -> Option<ChannelHeader> {
        let header = self.header.as_ref()?;
        ChannelHeader::decode(header.channel_header.as_slice()).ok()
    }
}

/// Render `Payload.data` according to the type announced in the header.
fn payload_data_to_json(
    header_type: Option<HeaderType>,
    data: &[u8],
) -> Result<serde_json::Value, String> {
    fn expand<M: Message + Default + Serialize>(data: &[u8]) -> Result<serde_json::Value, String> {
        let message = M::decode(data).map_err(|e| format!("cannot unmarshal Payload.data: {}", e))?;
        serde_json::to_value(&message).map_err(|e| e.to_string())
    }

    match header_type {
        Some(HeaderType::Config) => expand::<ConfigEnvelope>(data),
        Some(HeaderType::ConfigUpdate) => expand::<ConfigUpdateEnvelope>(data),
        _ => Ok(serde_json::Value::String(json::encode_base64(data))),
    }
}

fn payload_data_from_json(
    header_type: Option<HeaderType>,
    value: serde_json::Value,
) -> Result<Vec<u8>, String> {
    fn collapse<M: Message + serde::de::DeserializeOwned>(
        value: serde_json::Value,
    ) -> Result<Vec<u8>, String> {
        let message: M = serde_json::from_value(value).map_err(|e| e.to_string())?;
        Ok(message.encode_to_vec())
    }

    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::String(text) => json::decode_base64(&text),
        structured => match header_type {
            Some(HeaderType::Config) => collapse::<ConfigEnvelope>(structured),
            Some(HeaderType::ConfigUpdate) => collapse::<ConfigUpdateEnvelope>(structured),
            other => Err(format!(
                "payload data for header type {:?} must be base64",
                other
            )),
        },
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let header_type = self.channel_header().and_then(|ch| ch.header_type());
        let data = payload_data_to_json(header_type, &self.data).map_err(ser::Error::custom)?;

        let mut state = serializer.serialize_struct("Payload", 2)?;
        state.serialize_field("data", &data)?;
        state.serialize_field("header", &self.header)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct RawPayload {
            header: Option<Header>,
            data: serde_json::Value,
        }

        let raw = RawPayload::deserialize(deserializer)?;
        let header_type = raw
            .header
            .as_ref()
            .and_then(|h| ChannelHeader::decode(h.channel_header.as_slice()).ok())
            .and_then(|ch| ch.header_type());
        let data = payload_data_from_json(header_type, raw.data).map_err(de::Error::custom)?;

        Ok(Payload {
            header: raw.header,
            data,
        })
    }
}

/// The outermost transport unit.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(with = "json::payload_bytes")]
    pub payload: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub signature: Vec<u8>,
}

/// A block as delivered by the ordering service.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    #[prost(message, optional, tag = "1")]
    pub header: Option<BlockHeader>,
    #[prost(message, optional, tag = "2")]
    pub data: Option<BlockData>,
    #[prost(message, optional, tag = "3")]
    pub metadata: Option<BlockMetadata>,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockHeader {
    #[prost(uint64, tag = "1")]
    #[serde(with = "json::int_string")]
    pub number: u64,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub previous_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(with = "json::base64_bytes")]
    pub data_hash: Vec<u8>,
}

/// Block contents: one serialized envelope per transaction.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockData {
    #[prost(bytes = "vec", repeated, tag = "1")]
    #[serde(with = "json::envelope_seq")]
    pub data: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockMetadata {
    #[prost(bytes = "vec", repeated, tag = "1")]
    #[serde(with = "json::base64_bytes_seq")]
    pub metadata: Vec<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protos::{ConfigUpdate, ConfigUpdateEnvelope};

    #[test]
    fn test_header_type_names_roundtrip() {
        for ty in [
            HeaderType::Message,
            HeaderType::Config,
            HeaderType::ConfigUpdate,
            HeaderType::EndorserTransaction,
            HeaderType::OrdererTransaction,
            HeaderType::DeliverSeekInfo,
            HeaderType::ChaincodePackage,
            HeaderType::PeerAdminOperation,
        ] {
            assert_eq!(HeaderType::from_str_name(ty.as_str_name()), Some(ty));
        }
        assert_eq!(HeaderType::from_str_name("BOGUS"), None);
    }

    #[test]
    fn test_channel_header_binary_layout() {
        let ch = ChannelHeader::new(HeaderType::ConfigUpdate, 0, "mychannel", 0);
        let bytes = ch.encode_to_vec();
        // type=2, channel_id="mychannel"; zero version/epoch are omitted
        assert_eq!(hex::encode(bytes), "080222096d796368616e6e656c");
    }

    #[test]
    fn test_payload_data_expanded_for_config_update() {
        let inner = ConfigUpdateEnvelope {
            config_update: ConfigUpdate {
                channel_id: "mychannel".into(),
                ..Default::default()
            }
            .encode_to_vec(),
            signatures: Vec::new(),
        };
        let payload = Payload {
            header: Some(Header {
                channel_header: ChannelHeader::new(HeaderType::ConfigUpdate, 0, "mychannel", 0)
                    .encode_to_vec(),
                signature_header: Vec::new(),
            }),
            data: inner.encode_to_vec(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["data"]["config_update"]["channel_id"], "mychannel");

        let back: Payload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_payload_data_opaque_for_other_types() {
        let payload = Payload {
            header: Some(Header {
                channel_header: ChannelHeader::new(HeaderType::Message, 0, "c", 0).encode_to_vec(),
                signature_header: Vec::new(),
            }),
            data: b"hello".to_vec(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["data"], "aGVsbG8=");

        let back: Payload = serde_json::from_value(value).unwrap();
        assert_eq!(back.data, b"hello");
    }
}
