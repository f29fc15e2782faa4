//! Golden test vectors for envelope framing.
//!
//! Each vector pins the exact protobuf bytes `wrap` must produce, so any
//! implementation of the framing can be checked byte for byte.

use configtx_core::envelope;
use configtx_core::HeaderType;
use prost::Message;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Header type announced in the channel header.
    pub header_type: HeaderType,
    /// Channel header version.
    pub version: i32,
    /// Channel id.
    pub channel_id: &'static str,
    /// Epoch.
    pub epoch: u64,
    /// Inner payload data.
    pub data: &'static [u8],
    /// Expected serialized Envelope (hex).
    pub expected_hex: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "config update with hello payload",
            header_type: HeaderType::ConfigUpdate,
            version: 0,
            channel_id: "mychannel",
            epoch: 0,
            data: b"hello",
            expected_hex: "0a180a0f0a0d080222096d796368616e6e656c120568656c6c6f",
        },
        GoldenVector {
            name: "config update with version and epoch, empty data",
            header_type: HeaderType::ConfigUpdate,
            version: 1,
            channel_id: "mychannel",
            epoch: 7,
            data: b"",
            expected_hex: "0a150a130a110802100122096d796368616e6e656c3007",
        },
        GoldenVector {
            name: "config with empty channel id",
            header_type: HeaderType::Config,
            version: 0,
            channel_id: "",
            epoch: 0,
            data: b"",
            expected_hex: "0a060a040a020801",
        },
        GoldenVector {
            name: "message type is omitted on the wire",
            header_type: HeaderType::Message,
            version: 0,
            channel_id: "c",
            epoch: 0,
            data: &[0x01],
            expected_hex: "0a0a0a050a03220163120101",
        },
        GoldenVector {
            name: "multi-byte epoch varint",
            header_type: HeaderType::PeerAdminOperation,
            version: 0,
            channel_id: "ch",
            epoch: 300,
            data: b"ab",
            expected_hex: "0a110a0b0a0908082202636830ac0212026162",
        },
    ]
}

/// Wrap a vector's inputs and return the serialized envelope.
pub fn wrap_vector(vector: &GoldenVector) -> Vec<u8> {
    envelope::wrap(
        vector.data,
        vector.header_type,
        vector.version,
        vector.channel_id,
        vector.epoch,
    )
    .encode_to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_match() {
        for vector in all_vectors() {
            assert_eq!(
                hex::encode(wrap_vector(&vector)),
                vector.expected_hex,
                "Vector '{}' produced different bytes",
                vector.name
            );
        }
    }

    #[test]
    fn test_vectors_unwrap_to_data() {
        for vector in all_vectors() {
            let bytes = hex::decode(vector.expected_hex).unwrap();
            let env = configtx_core::Envelope::decode(bytes.as_slice()).unwrap();
            assert_eq!(envelope::unwrap_data(&env).unwrap(), vector.data);
        }
    }
}
