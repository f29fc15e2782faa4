//! Binary and JSON encodings of the wire messages.

use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// Decode protobuf binary.
pub fn decode_binary<M: Message + Default>(bytes: &[u8]) -> Result<M> {
    M::decode(bytes).map_err(CoreError::binary)
}

/// Encode to protobuf binary.
pub fn encode_binary<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

/// Decode the JSON projection.
pub fn from_json<M: DeserializeOwned>(bytes: &[u8]) -> Result<M> {
    serde_json::from_slice(bytes).map_err(CoreError::json)
}

/// Encode the JSON projection, pretty-printed.
pub fn to_json<M: Serialize>(message: &M) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(message).map_err(|e| CoreError::Encode(e.to_string()))?;
    out.push(b'\n');
    Ok(out)
}
