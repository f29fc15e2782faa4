//! Protobuf wire model.
//!
//! Messages are declared with `prost` derives so the binary encoding is the
//! standard protobuf encoding the ordering service verifies against. Field
//! tags must never change.
//!
//! Every message also derives (or hand-implements) serde for the JSON
//! projection (see the crate-level JSON helpers).

pub mod common;
pub mod configtx;
pub mod msp;
pub mod values;

pub use common::{
    Block, BlockData, BlockHeader, BlockMetadata, ChannelHeader, Envelope, Header, HeaderType,
    Payload, SignatureHeader, Timestamp,
};
pub use configtx::{
    Config, ConfigEnvelope, ConfigGroup, ConfigPolicy, ConfigSignature, ConfigUpdate,
    ConfigUpdateEnvelope, ConfigValue, ImplicitMetaPolicy, ImplicitMetaRule, Policy, PolicyType,
};
pub use msp::SerializedIdentity;
pub use values::{
    BatchSize, BatchTimeout, BlockDataHashingStructure, Capabilities, Capability, ConsensusState,
    ConsensusType, Consortium, HashingAlgorithm, OrdererAddresses,
};
