//! Identity messages.

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::json;

/// An identity as it appears inside signature headers: the owning MSP and
/// the identity's credential bytes (a PEM certificate or public key).
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub mspid: String,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "json::base64_bytes")]
    pub id_bytes: Vec<u8>,
}
